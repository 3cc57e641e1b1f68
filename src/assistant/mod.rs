pub mod fallback;
pub mod gemini;
pub mod gpt;
pub mod history;
pub mod responder;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ResponderError;
use crate::language::{Language, Text};
use crate::quiz::{CategoryTag, QuizOutcome};
use fallback::{FallbackReplies, APOLOGY, GREETING, NOTICE_BODY, NOTICE_TITLE};
use history::format_history;
use responder::RemoteRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }
}

/// How a deployment uses the remote responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPolicy {
    /// Always try the remote; a failure only affects that one turn.
    #[default]
    PerCallFallback,
    /// After the first failure, answer locally for the rest of the session.
    StickyDegrade,
    /// Never call the remote.
    LocalOnly,
}

impl FromStr for ChatPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per-call" | "per_call" | "remote" => Ok(ChatPolicy::PerCallFallback),
            "sticky" | "sticky-degrade" => Ok(ChatPolicy::StickyDegrade),
            "local" | "local-only" => Ok(ChatPolicy::LocalOnly),
            other => Err(format!("unknown chat policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Input enabled, the next send goes to the remote (unless local-only).
    Idle,
    /// A remote call is in flight; input is disabled.
    AwaitingRemote,
    /// The remote failed earlier; sends are answered locally.
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    Busy,
    Disposed,
}

/// A remote turn waiting to be resolved with [`ConversationSession::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub session_id: Uuid,
    pub request: RemoteRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Rejected(Rejection),
    /// Answered on the spot by the local generator.
    Answered(ChatMessage),
    Pending(PendingTurn),
}

/// A one-shot, non-blocking error message for the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Replied(ChatMessage),
    Failed { reply: ChatMessage, notice: Notice },
    /// The session was gone or did not issue the turn.
    Discarded,
}

/// The transcript and call state of one visit to the assistant.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: Uuid,
    language: Language,
    policy: ChatPolicy,
    stage: Option<CategoryTag>,
    /// English title of the last result. The model gets this instead of the category tag.
    stage_hint: Option<String>,
    messages: Vec<ChatMessage>,
    status: SessionStatus,
    disposed: bool,
}

impl ConversationSession {
    /// Opens a session seeded with the greeting.
    pub fn new(language: Language, policy: ChatPolicy, outcome: Option<&QuizOutcome>) -> Self {
        Self {
            id: Uuid::new_v4(),
            language,
            policy,
            stage: outcome.map(|o| o.category.clone()),
            stage_hint: outcome.map(|o| o.record.title.en.to_string()),
            messages: vec![ChatMessage::assistant(GREETING.pick(language))],
            status: SessionStatus::Idle,
            disposed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn localized(&self, text: Text) -> &'static str {
        text.pick(self.language)
    }

    /// Appends the user's message and decides who answers it.
    ///
    /// Blank input, a send while a remote call is in flight, and a send on a
    /// disposed session are rejected without touching the transcript.
    pub fn submit(&mut self, text: &str, replies: &mut FallbackReplies) -> Submission {
        if self.disposed {
            return Submission::Rejected(Rejection::Disposed);
        }
        if text.trim().is_empty() {
            return Submission::Rejected(Rejection::Empty);
        }
        if self.status == SessionStatus::AwaitingRemote {
            return Submission::Rejected(Rejection::Busy);
        }

        let use_remote =
            self.policy != ChatPolicy::LocalOnly && self.status != SessionStatus::Degraded;

        if use_remote {
            let history = format_history(&self.messages);
            self.messages.push(ChatMessage::user(text));
            self.status = SessionStatus::AwaitingRemote;
            return Submission::Pending(PendingTurn {
                session_id: self.id,
                request: RemoteRequest {
                    message: text.to_string(),
                    history,
                    language: self.language,
                    stage_hint: self.stage_hint.clone(),
                },
            });
        }

        self.messages.push(ChatMessage::user(text));
        let reply = ChatMessage::assistant(replies.reply(text, self.language, self.stage.as_ref()));
        self.messages.push(reply.clone());
        Submission::Answered(reply)
    }

    /// Resolves a pending turn with the remote result.
    pub fn complete(
        &mut self,
        turn: PendingTurn,
        result: Result<String, ResponderError>,
    ) -> Completion {
        if self.disposed
            || turn.session_id != self.id
            || self.status != SessionStatus::AwaitingRemote
        {
            log::debug!("Discarding reply for session {}", turn.session_id);
            return Completion::Discarded;
        }

        match result {
            Ok(text) => {
                let reply = ChatMessage::assistant(text);
                self.messages.push(reply.clone());
                self.status = SessionStatus::Idle;
                Completion::Replied(reply)
            }
            Err(e) => {
                log::warn!("AI response error in session {}: {}", self.id, e);
                let reply = ChatMessage::assistant(self.localized(APOLOGY));
                self.messages.push(reply.clone());
                self.status = match self.policy {
                    ChatPolicy::StickyDegrade => SessionStatus::Degraded,
                    _ => SessionStatus::Idle,
                };
                Completion::Failed {
                    reply,
                    notice: Notice {
                        title: self.localized(NOTICE_TITLE),
                        body: self.localized(NOTICE_BODY),
                    },
                }
            }
        }
    }

    /// Tears the session down; any reply still in flight will be discarded.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.status = SessionStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::assistant::history::{HistoryEntry, HistoryRole};
    use crate::assistant::responder::{call_remote, RemoteResponder};
    use crate::quiz::data::{self, GROWTH};

    struct Scripted {
        reply: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(reply: &'static str) -> Self {
            Self { reply: Some(reply), calls: AtomicUsize::new(0) }
        }

        fn failing() -> Self {
            Self { reply: None, calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RemoteResponder for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn respond(&self, _request: &RemoteRequest) -> Result<String, ResponderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Some(text) => Ok(text.to_string()),
                None => Err(ResponderError::Malformed("scripted failure".to_string())),
            }
        }
    }

    /// Drives one send through the remote path the way the bot does.
    async fn send(
        session: &mut ConversationSession,
        text: &str,
        responder: &Scripted,
        replies: &mut FallbackReplies,
    ) -> Option<Completion> {
        match session.submit(text, replies) {
            Submission::Pending(turn) => {
                let result = call_remote(responder, &turn.request, Duration::from_secs(1)).await;
                Some(session.complete(turn, result))
            }
            _ => None,
        }
    }

    fn session(policy: ChatPolicy) -> ConversationSession {
        ConversationSession::new(Language::En, policy, None)
    }

    #[test]
    fn starts_with_greeting() {
        let session = session(ChatPolicy::PerCallFallback);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].sender, Sender::Assistant);
        assert_eq!(session.messages()[0].text, GREETING.en);
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut session = session(ChatPolicy::PerCallFallback);
        let mut replies = FallbackReplies::seeded(0);
        assert_eq!(session.submit("   ", &mut replies), Submission::Rejected(Rejection::Empty));
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[test]
    fn submit_is_optimistic_and_excludes_current_message() {
        let mut session = session(ChatPolicy::PerCallFallback);
        let mut replies = FallbackReplies::seeded(0);
        let turn = match session.submit("hi", &mut replies) {
            Submission::Pending(turn) => turn,
            other => panic!("expected a pending turn, got {:?}", other),
        };

        assert_eq!(session.status(), SessionStatus::AwaitingRemote);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].sender, Sender::User);
        assert_eq!(turn.request.message, "hi");
        assert!(turn.request.history.is_empty());
        assert_eq!(turn.session_id, session.id());
    }

    #[test]
    fn busy_session_rejects_sends() {
        let mut session = session(ChatPolicy::PerCallFallback);
        let mut replies = FallbackReplies::seeded(0);
        session.submit("one", &mut replies);
        assert_eq!(session.submit("two", &mut replies), Submission::Rejected(Rejection::Busy));
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn successful_turns_build_history() {
        let mut session = session(ChatPolicy::PerCallFallback);
        let mut replies = FallbackReplies::seeded(0);
        let responder = Scripted::ok("hello");

        let completion = send(&mut session, "hi", &responder, &mut replies).await;
        assert!(matches!(completion, Some(Completion::Replied(ref m)) if m.text == "hello"));
        assert_eq!(session.status(), SessionStatus::Idle);

        let turn = match session.submit("again", &mut replies) {
            Submission::Pending(turn) => turn,
            other => panic!("expected a pending turn, got {:?}", other),
        };
        assert_eq!(
            turn.request.history,
            vec![
                HistoryEntry::new(HistoryRole::User, "hi"),
                HistoryEntry::new(HistoryRole::Model, "hello"),
            ]
        );
    }

    #[tokio::test]
    async fn failure_appends_one_apology_and_returns_to_idle() {
        let mut session = ConversationSession::new(Language::Ar, ChatPolicy::PerCallFallback, None);
        let mut replies = FallbackReplies::seeded(0);
        let responder = Scripted::failing();

        let completion = send(&mut session, "مرحبا", &responder, &mut replies).await;
        match completion {
            Some(Completion::Failed { reply, notice }) => {
                assert_eq!(reply.text, APOLOGY.ar);
                assert_eq!(notice.title, NOTICE_TITLE.ar);
            }
            other => panic!("expected a failure, got {:?}", other),
        }
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.status(), SessionStatus::Idle);

        // per-call policy keeps trying the remote
        send(&mut session, "again", &responder, &mut replies).await;
        assert_eq!(responder.calls(), 2);
    }

    #[tokio::test]
    async fn sticky_policy_stops_calling_remote() {
        let mut session = session(ChatPolicy::StickyDegrade);
        let mut replies = FallbackReplies::seeded(0);
        let responder = Scripted::failing();

        send(&mut session, "hi", &responder, &mut replies).await;
        assert_eq!(session.status(), SessionStatus::Degraded);

        let submission = session.submit("I feel lost", &mut replies);
        assert!(matches!(submission, Submission::Answered(ref m) if m.sender == Sender::Assistant));
        assert_eq!(responder.calls(), 1);
        assert_eq!(session.messages().len(), 5);
        assert_eq!(session.status(), SessionStatus::Degraded);
    }

    #[test]
    fn local_only_answers_with_stage_reply() {
        let data = data::standard();
        let mut answers = data.empty_answers();
        data.select_option(&mut answers, 0, GROWTH);
        let outcome = data.compute_outcome(&answers).unwrap();

        let mut session =
            ConversationSession::new(Language::En, ChatPolicy::LocalOnly, Some(&outcome));
        let mut replies = FallbackReplies::seeded(0);
        match session.submit("hello", &mut replies) {
            Submission::Answered(reply) => assert!(reply.text.contains("Growth stage")),
            other => panic!("expected a local answer, got {:?}", other),
        }
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn stage_hint_is_result_title() {
        let data = data::standard();
        let mut answers = data.empty_answers();
        data.select_option(&mut answers, 0, GROWTH);
        let outcome = data.compute_outcome(&answers).unwrap();

        let mut session =
            ConversationSession::new(Language::Ar, ChatPolicy::PerCallFallback, Some(&outcome));
        let mut replies = FallbackReplies::seeded(0);
        match session.submit("hi", &mut replies) {
            Submission::Pending(turn) => {
                assert_eq!(turn.request.stage_hint.as_deref(), Some("Growth"));
                assert_eq!(turn.request.language, Language::Ar);
            }
            other => panic!("expected a pending turn, got {:?}", other),
        }
    }

    #[test]
    fn reply_after_dispose_is_discarded() {
        let mut session = session(ChatPolicy::PerCallFallback);
        let mut replies = FallbackReplies::seeded(0);
        let turn = match session.submit("hi", &mut replies) {
            Submission::Pending(turn) => turn,
            other => panic!("expected a pending turn, got {:?}", other),
        };

        session.dispose();
        assert_eq!(session.complete(turn, Ok("late".to_string())), Completion::Discarded);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.submit("more", &mut replies), Submission::Rejected(Rejection::Disposed));
    }

    #[test]
    fn reply_for_another_session_is_discarded() {
        let mut first = session(ChatPolicy::PerCallFallback);
        let mut second = session(ChatPolicy::PerCallFallback);
        let mut replies = FallbackReplies::seeded(0);
        let turn = match first.submit("hi", &mut replies) {
            Submission::Pending(turn) => turn,
            other => panic!("expected a pending turn, got {:?}", other),
        };
        second.submit("hey", &mut replies);

        assert_eq!(second.complete(turn, Ok("wrong".to_string())), Completion::Discarded);
        assert_eq!(second.status(), SessionStatus::AwaitingRemote);
    }

    #[test]
    fn message_ids_are_unique() {
        let a = ChatMessage::user("x");
        let b = ChatMessage::user("x");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn parses_policies() {
        assert_eq!("per-call".parse::<ChatPolicy>(), Ok(ChatPolicy::PerCallFallback));
        assert_eq!("Sticky".parse::<ChatPolicy>(), Ok(ChatPolicy::StickyDegrade));
        assert_eq!("local-only".parse::<ChatPolicy>(), Ok(ChatPolicy::LocalOnly));
        assert!("sometimes".parse::<ChatPolicy>().is_err());
    }
}
