use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::history::HistoryEntry;
use crate::error::ResponderError;
use crate::language::Language;

/// Returned when no text could be recovered from a response.
pub const UNAVAILABLE_TEXT: &str =
    "I'm sorry, I couldn't generate a proper response. Please try again.";

const PERSONA: &str = "You are an empathetic AI assistant specialized in helping young adults navigate quarter-life crises.
Your purpose is to provide thoughtful, supportive responses about career uncertainty, identity questions,
relationship challenges, and life transitions that people typically face in their 20s and early 30s.
Be compassionate, non-judgmental, and offer practical advice when appropriate.
Avoid generic platitudes and focus on helping the person feel understood and providing actionable insights.
If someone appears to be in distress or mentions harmful thoughts, always encourage them to seek
professional help and provide appropriate disclaimers.";

/// Everything a responder needs for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    pub message: String,
    /// Earlier turns, oldest first, without the current message.
    pub history: Vec<HistoryEntry>,
    pub language: Language,
    pub stage_hint: Option<String>,
}

impl RemoteRequest {
    pub fn persona(&self) -> String {
        persona_prompt(self.language, self.stage_hint.as_deref())
    }
}

pub fn persona_prompt(language: Language, stage_hint: Option<&str>) -> String {
    let mut prompt = PERSONA.to_string();
    if language == Language::Ar {
        prompt.push_str(
            "\nRespond in Arabic language. Make sure your responses are culturally appropriate.",
        );
    }
    if let Some(stage) = stage_hint {
        prompt.push_str(&format!(
            "\nThe user is currently in the \"{}\" stage of their quarter-life crisis journey.",
            stage
        ));
    }
    prompt
}

/// A generative-language service that answers one chat turn.
///
/// Implementations turn their provider's response into plain text with
/// [`extract_response_text`]; anything that is not a usable reply is an error.
#[async_trait]
pub trait RemoteResponder: Send + Sync {
    fn name(&self) -> &str;

    async fn respond(&self, request: &RemoteRequest) -> Result<String, ResponderError>;
}

/// Runs `responder` with an upper bound on how long the turn may take.
pub async fn call_remote(
    responder: &dyn RemoteResponder,
    request: &RemoteRequest,
    limit: Duration,
) -> Result<String, ResponderError> {
    match tokio::time::timeout(limit, responder.respond(request)).await {
        Ok(result) => result,
        Err(_) => Err(ResponderError::Timeout(limit)),
    }
}

/// The shapes a provider may hand back for the reply text.
pub enum ResponsePayload {
    Text(String),
    /// A nullary accessor producing the text on demand.
    Accessor(Box<dyn Fn() -> String + Send + Sync>),
    Other(Value),
    Missing,
}

impl fmt::Debug for ResponsePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponsePayload::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ResponsePayload::Accessor(_) => f.write_str("Accessor(..)"),
            ResponsePayload::Other(value) => f.debug_tuple("Other").field(value).finish(),
            ResponsePayload::Missing => f.write_str("Missing"),
        }
    }
}

impl From<Value> for ResponsePayload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ResponsePayload::Missing,
            Value::String(text) => ResponsePayload::Text(text),
            other => ResponsePayload::Other(other),
        }
    }
}

/// Best-effort conversion of a payload into reply text. Never panics.
pub fn extract_response_text(payload: ResponsePayload) -> String {
    match payload {
        ResponsePayload::Text(text) => text,
        ResponsePayload::Accessor(accessor) => {
            match panic::catch_unwind(AssertUnwindSafe(|| accessor())) {
                Ok(text) => text,
                Err(_) => {
                    log::error!("Response text accessor panicked");
                    UNAVAILABLE_TEXT.to_string()
                }
            }
        }
        ResponsePayload::Other(Value::Null) | ResponsePayload::Missing => {
            log::warn!("Could not extract text from AI response");
            UNAVAILABLE_TEXT.to_string()
        }
        ResponsePayload::Other(Value::String(text)) => text,
        ResponsePayload::Other(other) => other.to_string(),
    }
}
