//! OpenAI-compatible chat completions (OpenAI, OpenRouter, local gateways)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::build_plan::FileRecord;
use crate::collaborator::prompt::{build_plan_prompt, parse_candidate, sha256_hex};
use crate::collaborator::{Collaborator, CollaboratorError};
use crate::config::CollaboratorConfig;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

pub struct OpenAiCollaborator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: Option<f64>,
}

impl OpenAiCollaborator {
    pub fn new(config: &CollaboratorConfig) -> Result<Self, CollaboratorError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                CollaboratorError::Config("API key required for the openai provider".to_string())
            })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CollaboratorError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            api_key,
            temperature: config.temperature,
        })
    }

    async fn complete(&self, system: Option<&str>, user: &str) -> Result<String, CollaboratorError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user,
        });

        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };
        debug!(
            model = %self.model,
            prompt_hash = %sha256_hex(user.as_bytes()),
            "chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "chat completion returned an error status");
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Decode(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CollaboratorError::Decode("response contained no message".to_string()))
    }
}

#[async_trait]
impl Collaborator for OpenAiCollaborator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate_build_plan(&self, files: &[FileRecord]) -> Result<Value, CollaboratorError> {
        let prompt = build_plan_prompt(files);
        let text = self
            .complete(Some("You only answer with JSON."), &prompt)
            .await?;
        parse_candidate(&text)
    }

    async fn consult_oracle(&self, query: &str) -> Result<String, CollaboratorError> {
        let text = self.complete(None, query).await?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::canned_http::CannedServer;
    use crate::config::ProviderKind;
    use serde_json::json;

    fn collaborator(server: &CannedServer) -> OpenAiCollaborator {
        OpenAiCollaborator::new(&CollaboratorConfig {
            provider: ProviderKind::OpenAI,
            base_url: Some(format!("{}/v1", server.base_url)),
            api_key: Some("test-key".to_string()),
            timeout_seconds: Some(5),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_oracle_answer_taken_from_first_choice() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Breathe.\n" } }]
        })
        .to_string();
        let server = CannedServer::respond("200 OK", &body);

        let answer = collaborator(&server).consult_oracle("what now").await.unwrap();
        assert_eq!(answer, "Breathe.");

        let request = server.received();
        assert!(request.starts_with("POST /v1/chat/completions "));
        assert!(request.to_lowercase().contains("authorization: bearer test-key"));
        assert!(request.contains("\"content\":\"what now\""));
    }

    #[tokio::test]
    async fn test_empty_choices_is_a_decode_error() {
        let server = CannedServer::respond("200 OK", r#"{"choices":[]}"#);

        let err = collaborator(&server).consult_oracle("hello").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Decode(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_status_is_reported() {
        let server = CannedServer::respond("429 Too Many Requests", r#"{"error":"slow down"}"#);

        let err = collaborator(&server).consult_oracle("hello").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Status { status: 429, .. }));
    }
}
