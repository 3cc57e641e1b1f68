//! The self-awareness test shipped with the bot.
//!
//! Every option is tagged with the stage it points at:
//! "a" lost, "b" awareness, "c" growth, "d" alignment.

use super::{CategoryTag, Question, QuizData, QuizOption, ResultRecord};
use crate::language::Text;

pub const LOST: CategoryTag = CategoryTag::from_static("a");
pub const AWARENESS: CategoryTag = CategoryTag::from_static("b");
pub const GROWTH: CategoryTag = CategoryTag::from_static("c");
pub const ALIGNMENT: CategoryTag = CategoryTag::from_static("d");

pub fn standard() -> QuizData {
    QuizData::new(questions(), results())
}

fn questions() -> Vec<Question> {
    vec![
        Question::new(
            Text::new(
                "How do you feel about your current career path?",
                "ما شعورك تجاه مسارك المهني الحالي؟",
            ),
            vec![
                QuizOption::new("a", "I have no idea where I'm heading", "لا أعرف إلى أين أتجه"),
                QuizOption::new("b", "I'm starting to see it isn't right for me", "بدأت أدرك أنه لا يناسبني"),
                QuizOption::new("c", "I'm actively trying new directions", "أجرب اتجاهات جديدة بنشاط"),
                QuizOption::new("d", "It fits who I am", "إنه يناسب شخصيتي"),
            ],
        ),
        Question::new(
            Text::new(
                "When you compare yourself to your peers, you usually...",
                "عندما تقارن نفسك بأقرانك، فإنك عادةً...",
            ),
            vec![
                QuizOption::new("a", "Feel left behind", "أشعر أنني متأخر عنهم"),
                QuizOption::new("b", "Notice I want different things", "ألاحظ أنني أريد أشياء مختلفة"),
                QuizOption::new("c", "Use it as a source of ideas", "أستخدم ذلك كمصدر للأفكار"),
                QuizOption::new("d", "Rarely compare at all", "نادراً ما أقارن نفسي بأحد"),
            ],
        ),
        Question::new(
            Text::new(
                "How clear are your personal values to you?",
                "ما مدى وضوح قيمك الشخصية بالنسبة لك؟",
            ),
            vec![
                QuizOption::new("a", "Not clear at all", "غير واضحة إطلاقاً"),
                QuizOption::new("b", "I'm questioning the ones I grew up with", "أعيد التفكير في القيم التي نشأت عليها"),
                QuizOption::new("c", "I'm testing them in real decisions", "أختبرها في قراراتي الفعلية"),
                QuizOption::new("d", "Clear, and I live by them", "واضحة وأعيش وفقها"),
            ],
        ),
        Question::new(
            Text::new(
                "How do you handle big decisions lately?",
                "كيف تتعامل مع القرارات الكبيرة مؤخراً؟",
            ),
            vec![
                QuizOption::new("a", "I avoid them", "أتجنبها"),
                QuizOption::new("b", "I overthink them", "أفرط في التفكير فيها"),
                QuizOption::new("c", "I take small experimental steps", "أخطو خطوات تجريبية صغيرة"),
                QuizOption::new("d", "I decide with confidence", "أقرر بثقة"),
            ],
        ),
        Question::new(
            Text::new(
                "What best describes your relationships right now?",
                "ما الذي يصف علاقاتك حالياً بشكل أفضل؟",
            ),
            vec![
                QuizOption::new("a", "I feel isolated", "أشعر بالعزلة"),
                QuizOption::new("b", "Some no longer feel right", "بعضها لم يعد مناسباً لي"),
                QuizOption::new("c", "I'm building new connections", "أبني علاقات جديدة"),
                QuizOption::new("d", "Supportive and stable", "داعمة ومستقرة"),
            ],
        ),
        Question::new(
            Text::new(
                "When you think about the next five years, you feel...",
                "عندما تفكر في السنوات الخمس القادمة، تشعر...",
            ),
            vec![
                QuizOption::new("a", "Anxious", "بالقلق"),
                QuizOption::new("b", "Uncertain but curious", "بعدم اليقين مع الفضول"),
                QuizOption::new("c", "Excited to explore", "بالحماس للاستكشاف"),
                QuizOption::new("d", "Calm and prepared", "بالهدوء والاستعداد"),
            ],
        ),
        Question::new(
            Text::new(
                "How do you spend most of your free time?",
                "كيف تقضي معظم وقت فراغك؟",
            ),
            vec![
                QuizOption::new("a", "Scrolling and distracting myself", "في التصفح وإلهاء نفسي"),
                QuizOption::new("b", "Reflecting on my life", "في التأمل في حياتي"),
                QuizOption::new("c", "Learning new skills", "في تعلم مهارات جديدة"),
                QuizOption::new("d", "On things that matter to me", "في أشياء تهمني"),
            ],
        ),
        Question::new(
            Text::new(
                "Which sentence sounds most like you?",
                "أي جملة تشبهك أكثر؟",
            ),
            vec![
                QuizOption::new("a", "\"I feel stuck.\"", "\"أشعر أنني عالق.\""),
                QuizOption::new("b", "\"Something needs to change.\"", "\"شيء ما يجب أن يتغير.\""),
                QuizOption::new("c", "\"I'm finding my way.\"", "\"أنا أجد طريقي.\""),
                QuizOption::new("d", "\"I know who I am.\"", "\"أعرف من أنا.\""),
            ],
        ),
    ]
}

fn results() -> Vec<ResultRecord> {
    vec![
        ResultRecord {
            tag: LOST,
            title: Text::new("Lost", "التيه"),
            description: Text::new(
                "You are in a period of confusion and uncertainty. You may feel stuck, unsure of what you want, and pressured by expectations around you.",
                "أنت في مرحلة من الحيرة وعدم اليقين. قد تشعر بأنك عالق ولا تعرف ما تريده، وتضغط عليك توقعات من حولك.",
            ),
            advice: Text::new(
                "Be gentle with yourself. Start small: write down what drains you and what gives you energy, and talk to someone you trust.",
                "كن لطيفاً مع نفسك. ابدأ بخطوات صغيرة: دوّن ما يستنزفك وما يمنحك الطاقة، وتحدث مع شخص تثق به.",
            ),
        },
        ResultRecord {
            tag: AWARENESS,
            title: Text::new("Awareness", "الإدراك"),
            description: Text::new(
                "You have started to recognize that something in your life does not fit anymore. This realization is the first real step toward change.",
                "بدأت تدرك أن شيئاً ما في حياتك لم يعد مناسباً. هذا الإدراك هو الخطوة الحقيقية الأولى نحو التغيير.",
            ),
            advice: Text::new(
                "Turn your questions into a list. Identify which ones you can explore this month, and give yourself permission to let go of what no longer serves you.",
                "حوّل أسئلتك إلى قائمة. حدد ما يمكنك استكشافه هذا الشهر، وامنح نفسك الإذن بالتخلي عما لم يعد يخدمك.",
            ),
        },
        ResultRecord {
            tag: GROWTH,
            title: Text::new("Growth", "النمو"),
            description: Text::new(
                "You are exploring, experimenting and learning. You are building the skills and connections that will shape your next chapter.",
                "أنت تستكشف وتجرب وتتعلم. تبني المهارات والعلاقات التي ستشكل فصلك القادم.",
            ),
            advice: Text::new(
                "Keep experimenting, but reflect on what each experience teaches you. A mentor or a workshop can speed up your growth.",
                "استمر في التجربة، لكن تأمل فيما تعلمك إياه كل تجربة. يمكن لمرشد أو ورشة عمل أن تسرّع نموك.",
            ),
        },
        ResultRecord {
            tag: ALIGNMENT,
            title: Text::new("Alignment", "الاتساق"),
            description: Text::new(
                "Your choices are in harmony with your values. You have a clear sense of direction and the confidence to follow it.",
                "خياراتك منسجمة مع قيمك. لديك إحساس واضح بالاتجاه والثقة لاتباعه.",
            ),
            advice: Text::new(
                "Protect what you have built and keep checking in with yourself. Consider supporting others who are still finding their way.",
                "حافظ على ما بنيته واستمر في مراجعة نفسك. فكّر في دعم الآخرين الذين ما زالوا يبحثون عن طريقهم.",
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_offered_tag_has_a_result() {
        let data = standard();
        for question in &data.questions {
            assert_eq!(question.options.len(), 4);
            for option in &question.options {
                assert!(
                    data.result_for(&option.tag).is_some(),
                    "missing result for {}",
                    option.tag
                );
            }
        }
    }

    #[test]
    fn labels_are_unique_within_a_question() {
        let data = standard();
        for question in &data.questions {
            for option in &question.options {
                let same = question
                    .options
                    .iter()
                    .filter(|o| {
                        o.label.matches(option.label.en) || o.label.matches(option.label.ar)
                    })
                    .count();
                assert_eq!(same, 1);
            }
        }
    }

    #[test]
    fn scenario_answers_resolve() {
        let data = standard();
        let mut answers = data.empty_answers();
        for (i, tag) in [LOST, AWARENESS, LOST, AWARENESS].into_iter().enumerate() {
            data.select_option(&mut answers, i, tag);
        }
        let outcome = data.compute_outcome(&answers).unwrap();
        assert_eq!(outcome.category, LOST);
        assert_eq!(outcome.record.title.ar, "التيه");
    }
}
