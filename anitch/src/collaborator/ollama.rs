//! Local Ollama server (`/api/generate`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::build_plan::FileRecord;
use crate::collaborator::prompt::{build_plan_prompt, parse_candidate, sha256_hex};
use crate::collaborator::{Collaborator, CollaboratorError};
use crate::config::CollaboratorConfig;

pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "mixtral";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaCollaborator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: Option<f64>,
}

impl OllamaCollaborator {
    pub fn new(config: &CollaboratorConfig) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CollaboratorError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            temperature: config.temperature,
        })
    }

    async fn generate(&self, prompt: &str, format: Option<&str>) -> Result<String, CollaboratorError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format,
            options: self.temperature.map(|temperature| GenerateOptions { temperature }),
        };
        debug!(
            model = %self.model,
            prompt_hash = %sha256_hex(prompt.as_bytes()),
            "ollama request"
        );

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "ollama returned an error status");
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Decode(e.to_string()))?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl Collaborator for OllamaCollaborator {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate_build_plan(&self, files: &[FileRecord]) -> Result<Value, CollaboratorError> {
        let prompt = build_plan_prompt(files);
        let text = self.generate(&prompt, Some("json")).await?;
        parse_candidate(&text)
    }

    async fn consult_oracle(&self, query: &str) -> Result<String, CollaboratorError> {
        let text = self.generate(query, None).await?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::canned_http::CannedServer;
    use crate::config::ProviderKind;
    use serde_json::json;

    fn collaborator(server: &CannedServer) -> OllamaCollaborator {
        OllamaCollaborator::new(&CollaboratorConfig {
            provider: ProviderKind::Ollama,
            base_url: Some(format!("{}/", server.base_url)),
            timeout_seconds: Some(5),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_plan_decoded_from_generate_response() {
        let plan = json!({
            "projectName": "weather-app",
            "language": "Python",
            "dependencies": [],
            "buildTool": "pip",
            "buildCommands": ["pip install flask"],
            "runCommand": "python app.py",
            "analysisSummary": "Flask service."
        });
        let body = json!({ "response": plan.to_string(), "done": true }).to_string();
        let server = CannedServer::respond("200 OK", &body);

        let files = vec![FileRecord::new("app.py", "print('hi')")];
        let candidate = collaborator(&server).generate_build_plan(&files).await.unwrap();
        assert_eq!(candidate["projectName"], "weather-app");

        let request = server.received();
        assert!(request.starts_with("POST /api/generate "));
        assert!(request.contains("\"model\":\"mixtral\""));
        assert!(request.contains("\"stream\":false"));
        assert!(request.contains("\"format\":\"json\""));
    }

    #[tokio::test]
    async fn test_error_status_is_reported_with_body() {
        let server = CannedServer::respond("500 Internal Server Error", "model not loaded");

        let err = collaborator(&server).consult_oracle("why").await.unwrap_err();
        match err {
            CollaboratorError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model not loaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
