use std::sync::{Arc, Mutex, PoisonError};

use dotenv::dotenv;
use error20::assistant::fallback::{FallbackReplies, DISCLAIMER};
use error20::assistant::gemini::GeminiResponder;
use error20::assistant::gpt::GptResponder;
use error20::assistant::responder::{call_remote, RemoteResponder};
use error20::assistant::{
    Completion, ConversationSession, PendingTurn, Rejection, Submission,
};
use error20::config::{Config, Provider};
use error20::error::ResponderError;
use error20::language::{Language, Text};
use error20::profile::UserProfile;
use error20::quiz::{self, QuizData, QuizOutcome};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{ChatAction, KeyboardButton, KeyboardMarkup},
};

type BotDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    Menu {
        profile: UserProfile,
    },
    Quiz {
        profile: UserProfile,
        question_number: usize,
    },
    Chat {
        profile: UserProfile,
        session: ConversationSession,
    },
}

struct App {
    data: QuizData,
    responder: Arc<dyn RemoteResponder>,
    replies: Mutex<FallbackReplies>,
    config: Config,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    pretty_env_logger::init();
    log::info!("Starting Error 20 bot...");

    let config = Config::from_env().expect("Invalid configuration");

    let responder: Arc<dyn RemoteResponder> = match &config.provider {
        Provider::Gemini { api_key, model } => {
            Arc::new(GeminiResponder::new(api_key.clone(), model.clone()))
        }
        Provider::ChatGpt { api_key } => Arc::new(
            GptResponder::new(api_key, config.remote_timeout)
                .expect("Unable to connect with ChatGPT"),
        ),
    };
    log::info!(
        "Using {} with {:?} chat policy",
        responder.name(),
        config.policy
    );

    let replies = match config.rng_seed {
        Some(seed) => FallbackReplies::seeded(seed),
        None => FallbackReplies::from_entropy(),
    };

    let app = Arc::new(App {
        data: quiz::data::standard(),
        responder,
        replies: Mutex::new(replies),
        config,
    });

    let bot = Bot::from_env();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::Menu { profile }].endpoint(menu))
            .branch(dptree::case![State::Quiz { profile, question_number }].endpoint(quiz_answer))
            .branch(dptree::case![State::Chat { profile, session }].endpoint(chat)),
    )
    .dependencies(dptree::deps![InMemStorage::<State>::new(), app])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const WELCOME: Text = Text::new(
    "Navigate your quarter-life crisis with awareness.\n\nDiscover yourself, identify your passion, and overcome the psychological and professional challenges facing young adults.",
    "تخطَّ أزمة ربع العمر بوعي.\n\nاكتشف نفسك، وحدد شغفك، وتغلب على التحديات النفسية والمهنية التي تواجه الشباب.",
);
const MENU_PROMPT: Text = Text::new("What would you like to do?", "ماذا تود أن تفعل؟");
const MENU_QUIZ: Text = Text::new("Self-Awareness Test", "اختبار الوعي الذاتي");
const MENU_ASSISTANT: Text = Text::new("AI Assistant", "المساعد الذكي");
const MENU_RESULT: Text = Text::new("My Result", "نتيجتي");
const MENU_LANGUAGE: Text = Text::new("Switch Language", "تغيير اللغة");

const PREVIOUS: Text = Text::new("Previous", "السابق");
const CHOOSE_OPTION: Text = Text::new(
    "Please choose one of the options",
    "يرجى اختيار أحد الخيارات",
);
const COMPLETED: Text = Text::new("You've completed the test!", "لقد أكملت الاختبار!");
const NO_RESULT: Text = Text::new(
    "You haven't taken the test yet.",
    "لم تقم بإجراء الاختبار بعد.",
);
const STAGE_DESCRIPTION: Text = Text::new("Stage Description", "وصف المرحلة");
const ADVICE: Text = Text::new("Advice and Guidance", "نصائح وإرشادات");

const LEAVE_CHAT: Text = Text::new("Back", "رجوع");
const TEXT_ONLY: Text = Text::new(
    "Please send your message as text",
    "يرجى إرسال رسالتك كنص",
);
const BUSY: Text = Text::new(
    "Please wait for the current reply.",
    "يرجى انتظار الرد الحالي.",
);

fn menu_keyboard(language: Language) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(MENU_QUIZ.pick(language))],
        vec![KeyboardButton::new(MENU_ASSISTANT.pick(language))],
        vec![
            KeyboardButton::new(MENU_RESULT.pick(language)),
            KeyboardButton::new(MENU_LANGUAGE.pick(language)),
        ],
    ])
}

async fn show_menu(bot: &Bot, chat_id: ChatId, language: Language) -> HandlerResult {
    bot.send_message(chat_id, MENU_PROMPT.pick(language))
        .reply_markup(menu_keyboard(language))
        .await?;
    Ok(())
}

async fn start(bot: Bot, dialogue: BotDialogue, app: Arc<App>, msg: Message) -> HandlerResult {
    let profile = UserProfile::new(app.config.default_language, &app.data);
    log::info!("New chat {} in '{}'", msg.chat.id.0, profile.language.code());

    bot.send_message(msg.chat.id, WELCOME.pick(profile.language)).await?;
    show_menu(&bot, msg.chat.id, profile.language).await?;

    dialogue.update(State::Menu { profile }).await?;
    Ok(())
}

async fn menu(
    bot: Bot,
    dialogue: BotDialogue,
    app: Arc<App>,
    mut profile: UserProfile,
    msg: Message,
) -> HandlerResult {
    let language = profile.language;
    match msg.text() {
        Some(text) if MENU_QUIZ.matches(text) => {
            profile.reset_quiz(&app.data);
            ask_question(&bot, msg.chat.id, &app.data, &profile, 0).await?;
            dialogue
                .update(State::Quiz {
                    profile,
                    question_number: 0,
                })
                .await?;
        }
        Some(text) if MENU_ASSISTANT.matches(text) => {
            let outcome = profile.last_outcome(&app.data);
            let session = ConversationSession::new(language, app.config.policy, outcome.as_ref());
            let greeting = session
                .messages()
                .first()
                .map(|m| m.text.clone())
                .unwrap_or_default();

            bot.send_message(
                msg.chat.id,
                format!("{}\n\n{}", greeting, DISCLAIMER.pick(language)),
            )
            .reply_markup(KeyboardMarkup::new(vec![vec![KeyboardButton::new(
                LEAVE_CHAT.pick(language),
            )]]))
            .await?;

            dialogue.update(State::Chat { profile, session }).await?;
        }
        Some(text) if MENU_RESULT.matches(text) => {
            match profile.last_outcome(&app.data) {
                Some(outcome) => send_result(&bot, msg.chat.id, &outcome, language).await?,
                None => {
                    bot.send_message(msg.chat.id, NO_RESULT.pick(language)).await?;
                }
            }
            show_menu(&bot, msg.chat.id, language).await?;
        }
        Some(text) if MENU_LANGUAGE.matches(text) => {
            profile.language = language.toggled();
            show_menu(&bot, msg.chat.id, profile.language).await?;
            dialogue.update(State::Menu { profile }).await?;
        }
        _ => show_menu(&bot, msg.chat.id, language).await?,
    }
    Ok(())
}

async fn ask_question(
    bot: &Bot,
    chat_id: ChatId,
    data: &QuizData,
    profile: &UserProfile,
    index: usize,
) -> HandlerResult {
    let Some(question) = data.question(index) else {
        return Ok(());
    };
    let language = profile.language;

    let header = match language {
        Language::En => format!("Question {} of {}", index + 1, data.question_count()),
        Language::Ar => format!("السؤال {} من {}", index + 1, data.question_count()),
    };
    let mut text = format!("{}\n\n{}", header, question.text.pick(language));

    // Going back shows what was picked before
    if let Some(chosen) = profile
        .answers
        .get(index)
        .and_then(|tag| question.options.iter().find(|o| &o.tag == tag))
    {
        text.push_str(&format!("\n\n✓ {}", chosen.label.pick(language)));
    }

    let mut rows: Vec<Vec<KeyboardButton>> = question
        .options
        .iter()
        .map(|o| vec![KeyboardButton::new(o.label.pick(language))])
        .collect();
    if index > 0 {
        rows.push(vec![KeyboardButton::new(PREVIOUS.pick(language))]);
    }

    bot.send_message(chat_id, text)
        .reply_markup(KeyboardMarkup::new(rows))
        .await?;
    Ok(())
}

async fn send_result(
    bot: &Bot,
    chat_id: ChatId,
    outcome: &QuizOutcome,
    language: Language,
) -> HandlerResult {
    let record = &outcome.record;
    let text = format!(
        "{}\n\n{}:\n{}\n\n{}:\n{}",
        record.title.pick(language),
        STAGE_DESCRIPTION.pick(language),
        record.description.pick(language),
        ADVICE.pick(language),
        record.advice.pick(language),
    );
    bot.send_message(chat_id, text).await?;
    bot.send_message(chat_id, outcome.share_text(language)).await?;
    Ok(())
}

async fn quiz_answer(
    bot: Bot,
    dialogue: BotDialogue,
    app: Arc<App>,
    (mut profile, question_number): (UserProfile, usize),
    msg: Message,
) -> HandlerResult {
    let language = profile.language;
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, CHOOSE_OPTION.pick(language)).await?;
        return Ok(());
    };

    if PREVIOUS.matches(text) && question_number > 0 {
        let previous = question_number - 1;
        ask_question(&bot, msg.chat.id, &app.data, &profile, previous).await?;
        dialogue
            .update(State::Quiz {
                profile,
                question_number: previous,
            })
            .await?;
        return Ok(());
    }

    let Some(question) = app.data.question(question_number) else {
        show_menu(&bot, msg.chat.id, language).await?;
        dialogue.update(State::Menu { profile }).await?;
        return Ok(());
    };

    let Some(option) = question.option_by_label(text) else {
        bot.send_message(msg.chat.id, CHOOSE_OPTION.pick(language)).await?;
        return Ok(());
    };
    app.data
        .select_option(&mut profile.answers, question_number, option.tag.clone());

    let next = question_number + 1;
    if next < app.data.question_count() {
        ask_question(&bot, msg.chat.id, &app.data, &profile, next).await?;
        dialogue
            .update(State::Quiz {
                profile,
                question_number: next,
            })
            .await?;
        return Ok(());
    }

    // Every question needs an answer before the result is shown
    if let Some(missing) = profile.answers.first_unanswered() {
        ask_question(&bot, msg.chat.id, &app.data, &profile, missing).await?;
        dialogue
            .update(State::Quiz {
                profile,
                question_number: missing,
            })
            .await?;
        return Ok(());
    }

    if let Some(outcome) = profile.submit_quiz(&app.data) {
        log::debug!(
            "Quiz finished in chat {} with {} answers, category {}",
            msg.chat.id.0,
            profile.answers.answered_count(),
            outcome.category
        );
        bot.send_message(msg.chat.id, COMPLETED.pick(language)).await?;
        send_result(&bot, msg.chat.id, &outcome, language).await?;
    }
    show_menu(&bot, msg.chat.id, language).await?;
    dialogue.update(State::Menu { profile }).await?;
    Ok(())
}

/// Keeps the fallback lock out of any `.await`.
fn submit_message(app: &App, session: &mut ConversationSession, text: &str) -> Submission {
    let mut replies = app.replies.lock().unwrap_or_else(PoisonError::into_inner);
    session.submit(text, &mut replies)
}

async fn chat(
    bot: Bot,
    dialogue: BotDialogue,
    app: Arc<App>,
    (profile, mut session): (UserProfile, ConversationSession),
    msg: Message,
) -> HandlerResult {
    let language = session.language();
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, TEXT_ONLY.pick(language)).await?;
        return Ok(());
    };

    if LEAVE_CHAT.matches(text) {
        session.dispose();
        show_menu(&bot, msg.chat.id, profile.language).await?;
        dialogue.update(State::Menu { profile }).await?;
        return Ok(());
    }

    match submit_message(&app, &mut session, text) {
        Submission::Rejected(Rejection::Empty) => {}
        Submission::Rejected(Rejection::Busy) => {
            bot.send_message(msg.chat.id, BUSY.pick(language)).await?;
        }
        Submission::Rejected(Rejection::Disposed) => {
            show_menu(&bot, msg.chat.id, profile.language).await?;
            dialogue.update(State::Menu { profile }).await?;
        }
        Submission::Answered(reply) => {
            dialogue.update(State::Chat { profile, session }).await?;
            bot.send_message(msg.chat.id, reply.text).await?;
        }
        Submission::Pending(turn) => {
            dialogue.update(State::Chat { profile, session }).await?;

            // The typing indicator is cosmetic, so a failure here is ignored
            let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

            let limit = app.config.remote_timeout;
            let result = call_remote(app.responder.as_ref(), &turn.request, limit).await;
            resolve_turn(&bot, &dialogue, msg.chat.id, turn, result).await?;
        }
    }
    Ok(())
}

/// Applies a finished remote call to whatever session the chat holds now.
async fn resolve_turn(
    bot: &Bot,
    dialogue: &BotDialogue,
    chat_id: ChatId,
    turn: PendingTurn,
    result: Result<String, ResponderError>,
) -> HandlerResult {
    let (profile, mut session) = match dialogue.get().await? {
        Some(State::Chat { profile, session })
            if session.id() == turn.session_id && !session.is_disposed() =>
        {
            (profile, session)
        }
        _ => {
            log::info!("Chat session {} closed before its reply arrived", turn.session_id);
            return Ok(());
        }
    };

    let completion = session.complete(turn, result);
    // Stored before sending, so a failed send cannot leave the chat awaiting
    dialogue.update(State::Chat { profile, session }).await?;

    match completion {
        Completion::Replied(reply) => {
            bot.send_message(chat_id, reply.text).await?;
        }
        Completion::Failed { reply, notice } => {
            bot.send_message(chat_id, reply.text).await?;
            let warning = format!("⚠️ {}\n{}", notice.title, notice.body);
            bot.send_message(chat_id, warning).await?;
        }
        Completion::Discarded => {}
    }
    Ok(())
}
