use std::time::Duration;

use async_trait::async_trait;
use chatgpt::client::ChatGPT;
use chatgpt::config::ChatGPTEngine;
use chatgpt::types::{ChatMessage as GptMessage, CompletionResponse, Role};

use super::history::HistoryRole;
use super::responder::{extract_response_text, RemoteRequest, RemoteResponder, ResponsePayload};
use crate::error::ResponderError;

/// Answers chat turns through the OpenAI chat completion API.
pub struct GptResponder {
    chat_gpt: ChatGPT,
}

impl GptResponder {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, ResponderError> {
        let mut gpt = ChatGPT::new(api_key)?;

        gpt.config.engine = ChatGPTEngine::Gpt35Turbo;
        gpt.config.timeout = timeout;

        Ok(Self { chat_gpt: gpt })
    }
}

/// Persona first as the system message, then history, then the new message.
fn build_messages(request: &RemoteRequest) -> Vec<GptMessage> {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(GptMessage {
        role: Role::System,
        content: request.persona(),
    });
    for entry in &request.history {
        let role = match entry.role {
            HistoryRole::User => Role::User,
            HistoryRole::Model => Role::Assistant,
        };
        messages.push(GptMessage {
            role,
            content: entry.text.clone(),
        });
    }
    messages.push(GptMessage {
        role: Role::User,
        content: request.message.clone(),
    });
    messages
}

#[async_trait]
impl RemoteResponder for GptResponder {
    fn name(&self) -> &str {
        "gpt-3.5-turbo"
    }

    async fn respond(&self, request: &RemoteRequest) -> Result<String, ResponderError> {
        let messages = build_messages(request);
        log::debug!("Sending {} messages to ChatGPT", messages.len());

        let response: CompletionResponse = self.chat_gpt.send_history(&messages).await?;
        let content = response.message().clone().content;

        log::debug!("Completion: {:?}", content);

        Ok(extract_response_text(ResponsePayload::Text(content)))
    }
}
