//! Google Gemini `generateContent` responder.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::history::{HistoryEntry, HistoryRole};
use super::responder::{extract_response_text, RemoteRequest, RemoteResponder, ResponsePayload};
use crate::error::ResponderError;

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

const MAX_OUTPUT_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;
const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";
const SAFETY_CATEGORIES: [&str; 2] = ["HARM_CATEGORY_HARASSMENT", "HARM_CATEGORY_HATE_SPEECH"];

pub struct GeminiResponder {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiResponder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn url(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

fn content<'a>(role: HistoryRole, text: &'a str) -> Content<'a> {
    Content {
        role: Some(role.as_str()),
        parts: vec![Part { text }],
    }
}

fn build_request<'a>(request: &'a RemoteRequest, persona: &'a str) -> GenerateRequest<'a> {
    let mut contents: Vec<Content<'a>> = request
        .history
        .iter()
        .map(|HistoryEntry { role, text }| content(*role, text))
        .collect();
    contents.push(content(HistoryRole::User, &request.message));

    GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part { text: persona }],
        },
        contents,
        generation_config: GenerationConfig {
            max_output_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        },
        safety_settings: SAFETY_CATEGORIES
            .into_iter()
            .map(|category| SafetySetting {
                category,
                threshold: SAFETY_THRESHOLD,
            })
            .collect(),
    }
}

/// Pulls the reply out of a `generateContent` body.
///
/// Blocked prompts and candidates stopped for safety are errors; a
/// candidate whose text has an unexpected shape is passed on as-is for
/// [`extract_response_text`] to coerce.
fn payload_from_body(body: &Value) -> Result<ResponsePayload, ResponderError> {
    if let Some(reason) = body.pointer("/promptFeedback/blockReason").and_then(Value::as_str) {
        return Err(ResponderError::Blocked(reason.to_string()));
    }

    let candidate = body
        .pointer("/candidates/0")
        .ok_or_else(|| ResponderError::Malformed("response has no candidates".to_string()))?;

    if candidate.get("finishReason").and_then(Value::as_str) == Some("SAFETY") {
        return Err(ResponderError::Blocked("SAFETY".to_string()));
    }

    let parts = match candidate.pointer("/content/parts").and_then(Value::as_array) {
        Some(parts) if !parts.is_empty() => parts,
        Some(_) | None => return Ok(ResponsePayload::Missing),
    };

    if parts.iter().all(|p| p.get("text").map_or(false, Value::is_string)) {
        let text = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("");
        return Ok(ResponsePayload::Text(text));
    }

    Ok(parts
        .first()
        .and_then(|p| p.get("text"))
        .cloned()
        .map(ResponsePayload::from)
        .unwrap_or(ResponsePayload::Missing))
}

#[async_trait]
impl RemoteResponder for GeminiResponder {
    fn name(&self) -> &str {
        &self.model
    }

    async fn respond(&self, request: &RemoteRequest) -> Result<String, ResponderError> {
        let persona = request.persona();
        let body = build_request(request, &persona);
        log::debug!(
            "Sending message to {} with {} history entries",
            self.model,
            request.history.len()
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResponderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ResponderError::Malformed(format!("failed to parse response: {}", e)))?;

        let text = extract_response_text(payload_from_body(&body)?);
        log::debug!("Completion: {:?}", text);
        Ok(text)
    }
}
