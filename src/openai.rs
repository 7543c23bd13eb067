use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::Settings;
use crate::log::LogSink;

const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f64 = 0.7;

/// Whole-call failures of the generation step. Surfaced to the user as
/// `lastError`; never retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("openai api error: {0}")]
    Api(String),
    #[error("no response choices returned")]
    Empty,
    #[error("{0}")]
    Io(String),
}

/// Seam between prompt assembly and the chat-completions API, so generation
/// runs can be driven by a stub in tests.
pub trait CompletionSource: Send + Sync {
    fn complete(&self, system: &str, user: &str) -> Result<String, GenerationError>;
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

pub struct OpenAiClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    model: String,
    log: LogSink,
}

impl OpenAiClient {
    pub fn new(settings: &Settings, log: LogSink) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
            .http_status_as_error(false)
            .build()
            .new_agent();

        Self {
            agent,
            base_url: settings.openai_api.trim_end_matches('/').to_string(),
            api_key: settings.openai_api_key.clone(),
            model: settings.model.clone(),
            log,
        }
    }
}

impl CompletionSource for OpenAiClient {
    /// One chat-completions call; the caller owns retries (there are none).
    fn complete(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        })
        .to_string();

        self.log.info(format!("POST {} (model {})", url, self.model));
        let resp = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("User-Agent", "cvgen/0.1")
            .send(body.as_str())
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .into_body()
            .read_to_string()
            .map_err(|e| GenerationError::Http(format!("read body failed: {}", e)))?;

        if status != 200 {
            self.log.error(format!("OpenAI HTTP {}: {}", status, text.trim()));
            return Err(GenerationError::Api(format!("HTTP {}", status)));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Api(format!("response parse error: {}", e)))?;

        match parsed.choices.into_iter().next() {
            Some(choice) => Ok(choice.message.content),
            None => Err(GenerationError::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_parses() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Dear hiring manager,"}}
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Dear hiring manager,");
    }

    #[test]
    fn test_empty_choices_is_distinct_error() {
        let body = r#"{"choices": []}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices.is_empty());
        let err = GenerationError::Empty;
        assert_eq!(err.to_string(), "no response choices returned");
    }
}
