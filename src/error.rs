use std::time::Duration;

/// Why a call to the remote responder produced no usable reply.
///
/// None of these escape the conversation: every variant ends up as the
/// localized apology appended to the transcript.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Response blocked by safety filter: {0}")]
    Blocked(String),

    #[error("ChatGPT client error: {0}")]
    ChatGpt(#[from] chatgpt::err::Error),

    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
