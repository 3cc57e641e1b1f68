//! Canned replies used when the remote responder is not consulted.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::language::{Language, Text};
use crate::quiz::CategoryTag;

pub const GREETING: Text = Text::new(
    "Hello! I am the AI assistant from Error 20. How can I help you today in your journey to overcome the quarter-life crisis?",
    "مرحباً! أنا المساعد الذكي من Error 20. كيف يمكنني مساعدتك اليوم في رحلتك لتخطي أزمة ربع العمر؟",
);

/// Appended to the transcript when a remote call fails.
pub const APOLOGY: Text = Text::new(
    "Sorry, an error occurred while connecting to the AI assistant. Please try again.",
    "عذراً، حدث خطأ أثناء الاتصال بالمساعد الذكي. يرجى المحاولة مرة أخرى.",
);

pub const NOTICE_TITLE: Text = Text::new("Error", "خطأ");

pub const NOTICE_BODY: Text = Text::new(
    "An error occurred while connecting to the AI assistant. Please check your internet connection and try again.",
    "حدث خطأ أثناء الاتصال بالمساعد الذكي. يرجى التحقق من اتصالك بالإنترنت والمحاولة مرة أخرى.",
);

pub const DISCLAIMER: Text = Text::new(
    "This is an AI assistant providing general advice. For emergencies, please contact a professional.",
    "هذا مساعد ذكي يقدم نصائح عامة. للحالات الطارئة، يرجى الاتصال بمختص.",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordFamily {
    Distress,
    Resources,
    Motivation,
}

impl KeywordFamily {
    /// Checked in this order; the first family with a hit wins.
    pub const ALL: [KeywordFamily; 3] = [
        KeywordFamily::Distress,
        KeywordFamily::Resources,
        KeywordFamily::Motivation,
    ];

    /// Whole words, or stems when they end in `*`. Spaces separate the words of a phrase.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            KeywordFamily::Distress => &[
                "sad", "lost", "confused", "anxious", "anxiety", "stress*", "depress*",
                "hopeless", "overwhelm*", "stuck", "don't know", "afraid", "scared",
                "حزين", "حزينة", "ضائع", "ضائعة", "تائه", "تائهة", "محتار", "مشوش", "قلق",
                "قلقة", "توتر", "مكتئب", "خائف", "يائس", "لا أعرف", "عالق",
            ],
            KeywordFamily::Resources => &[
                "resource*", "book", "books", "article*", "course*", "video*", "podcast*",
                "workshop*", "read", "reading", "learn*", "مصادر", "مصدر", "كتاب", "كتب",
                "مقال", "مقالات", "دورة", "فيديو", "بودكاست", "ورشة", "أتعلم", "أقرأ",
            ],
            KeywordFamily::Motivation => &[
                "motivat*", "inspir*", "give up", "tired", "lazy", "procrastinat*", "energy",
                "goal", "goals", "تحفيز", "حافز", "إلهام", "أستسلم", "متعب", "تعبان", "كسل",
                "هدف", "أهداف", "طاقة",
            ],
        }
    }

    fn replies(&self) -> &'static [Text] {
        match self {
            KeywordFamily::Distress => &DISTRESS_REPLIES,
            KeywordFamily::Resources => &RESOURCE_REPLIES,
            KeywordFamily::Motivation => &MOTIVATION_REPLIES,
        }
    }

    /// The first family with a keyword among the words of `message`.
    pub fn detect(message: &str) -> Option<KeywordFamily> {
        let words = words(message);
        Self::ALL.into_iter().find(|family| {
            family
                .keywords()
                .iter()
                .any(|keyword| contains_phrase(&words, keyword))
        })
    }
}

/// Arabic prefixes glued onto a word: conjunctions, prepositions and the article.
const CLITICS: [&str; 9] = ["وال", "فال", "بال", "لل", "ال", "و", "ف", "ب", "ل"];

/// Lowercased words of `message`. Apostrophes stay inside words.
fn words(message: &str) -> Vec<String> {
    let message = message.to_lowercase().replace('\u{2019}', "'");
    message
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn word_matches(word: &str, pattern: &str) -> bool {
    if let Some(stem) = pattern.strip_suffix('*') {
        return word.starts_with(stem);
    }
    word == pattern
        || CLITICS
            .iter()
            .any(|clitic| word.strip_prefix(clitic) == Some(pattern))
}

fn contains_phrase(words: &[String], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split(' ').collect();
    words.windows(parts.len()).any(|window| {
        window
            .iter()
            .zip(&parts)
            .all(|(word, part)| word_matches(word, part))
    })
}

const DISTRESS_REPLIES: [Text; 3] = [
    Text::new(
        "It sounds like you're going through a hard time, and that's okay. Many people in their twenties feel this way. What is weighing on you the most right now?",
        "يبدو أنك تمر بوقت صعب، وهذا طبيعي. كثيرون في العشرينات يشعرون بذلك. ما الذي يثقل كاهلك أكثر الآن؟",
    ),
    Text::new(
        "Feeling lost is often the first sign that you're ready for something new. Try writing down one thing that felt meaningful this week.",
        "الشعور بالضياع غالباً ما يكون أول علامة على أنك مستعد لشيء جديد. حاول أن تكتب شيئاً واحداً شعرت أنه ذو معنى هذا الأسبوع.",
    ),
    Text::new(
        "You're not alone in this. If these feelings become overwhelming, please reach out to a mental health professional. Would you like to talk about what triggered them?",
        "لست وحدك في هذا. إذا أصبحت هذه المشاعر مرهقة، يرجى التواصل مع مختص في الصحة النفسية. هل تود التحدث عما أثارها؟",
    ),
];

const RESOURCE_REPLIES: [Text; 3] = [
    Text::new(
        "The Resources tab has books and articles picked for the quarter-life crisis. \"Designing Your Life\" is a great place to start.",
        "يحتوي قسم المصادر على كتب ومقالات مختارة حول أزمة ربع العمر. كتاب \"صمم حياتك\" بداية رائعة.",
    ),
    Text::new(
        "Our podcast episodes and videos cover career doubts, identity and relationships. Pick the one closest to what you're facing.",
        "تتناول حلقات البودكاست والفيديوهات لدينا الشكوك المهنية والهوية والعلاقات. اختر الأقرب لما تواجهه.",
    ),
    Text::new(
        "Interactive workshops are a good way to learn with others going through the same thing. Check the Workshops section for upcoming dates.",
        "ورش العمل التفاعلية طريقة جيدة للتعلم مع آخرين يمرون بالتجربة نفسها. اطلع على قسم الورش لمعرفة المواعيد القادمة.",
    ),
];

const MOTIVATION_REPLIES: [Text; 3] = [
    Text::new(
        "Progress doesn't have to be big to count. What is one small step you could take today?",
        "لا يجب أن يكون التقدم كبيراً ليُحتسب. ما الخطوة الصغيرة التي يمكنك القيام بها اليوم؟",
    ),
    Text::new(
        "Feeling tired is a signal, not a failure. Rest, then return to your goal with fresh eyes.",
        "الشعور بالتعب إشارة وليس فشلاً. استرح، ثم عد إلى هدفك برؤية جديدة.",
    ),
    Text::new(
        "Remember why you started. Write your goal somewhere you'll see it every morning.",
        "تذكّر لماذا بدأت. اكتب هدفك في مكان تراه كل صباح.",
    ),
];

const GENERIC_REPLIES: [Text; 3] = [
    Text::new(
        "Thank you for sharing that. Can you tell me more about how it makes you feel?",
        "شكراً لمشاركتك ذلك. هل يمكنك أن تخبرني المزيد عن شعورك حياله؟",
    ),
    Text::new(
        "That's an important question. What do you think is holding you back?",
        "هذا سؤال مهم. ما الذي تعتقد أنه يعيقك؟",
    ),
    Text::new(
        "Every journey through the quarter-life crisis is different. What would a good outcome look like for you?",
        "كل رحلة عبر أزمة ربع العمر مختلفة. كيف تبدو النتيجة الجيدة بالنسبة لك؟",
    ),
];

fn stage_reply(stage: &CategoryTag) -> Option<Text> {
    let reply = match stage.as_str() {
        "a" => Text::new(
            "Your test suggests you're in the Lost stage. It's a confusing place, but it's also where change begins. Let's take it one question at a time.",
            "تشير نتيجة اختبارك إلى أنك في مرحلة التيه. إنها مرحلة محيرة، لكنها أيضاً حيث يبدأ التغيير. لنأخذ الأمور سؤالاً تلو الآخر.",
        ),
        "b" => Text::new(
            "You're in the Awareness stage: you already know something needs to change. What is the first thing you'd like to change?",
            "أنت في مرحلة الإدراك: تعرف بالفعل أن شيئاً ما يجب أن يتغير. ما أول شيء تود تغييره؟",
        ),
        "c" => Text::new(
            "You're in the Growth stage. Keep experimenting, and notice which experiences give you energy.",
            "أنت في مرحلة النمو. استمر في التجربة، ولاحظ أي التجارب تمنحك الطاقة.",
        ),
        "d" => Text::new(
            "You're in the Alignment stage. How can you protect the balance you've built while you keep growing?",
            "أنت في مرحلة الاتساق. كيف يمكنك الحفاظ على التوازن الذي بنيته مع الاستمرار في النمو؟",
        ),
        _ => return None,
    };
    Some(reply)
}

fn pick<R: Rng>(set: &'static [Text], rng: &mut R) -> &'static Text {
    &set[rng.gen_range(0..set.len())]
}

/// Picks a canned reply for `message`.
///
/// A keyword match picks randomly within its family. Without a match, a
/// known stage answers deterministically; otherwise a random generic reply.
pub fn local_reply<R: Rng>(
    message: &str,
    language: Language,
    stage: Option<&CategoryTag>,
    rng: &mut R,
) -> &'static str {
    if let Some(family) = KeywordFamily::detect(message) {
        return pick(family.replies(), rng).pick(language);
    }
    match stage.and_then(stage_reply) {
        Some(reply) => reply.pick(language),
        None => pick(&GENERIC_REPLIES, rng).pick(language),
    }
}

/// Owns the random source behind [`local_reply`].
#[derive(Debug)]
pub struct FallbackReplies {
    rng: StdRng,
}

impl FallbackReplies {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn reply(
        &mut self,
        message: &str,
        language: Language,
        stage: Option<&CategoryTag>,
    ) -> &'static str {
        local_reply(message, language, stage, &mut self.rng)
    }
}
