//! Collaborators
//!
//! The build-plan generator and the oracle are language-model calls behind
//! the [`Collaborator`] trait. The core never trusts what comes back: plans
//! are returned as raw JSON and validated by [`crate::build_plan::validate`].

pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod stub;

#[cfg(test)]
mod canned_http;

pub use ollama::OllamaCollaborator;
pub use openai::OpenAiCollaborator;
pub use stub::StubCollaborator;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::build_plan::FileRecord;
use crate::config::{CollaboratorConfig, ProviderKind};

/// Failures talking to a collaborator
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("collaborator returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode collaborator response: {0}")]
    Decode(String),
    #[error("no JSON object found in collaborator response")]
    NoJson,
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("collaborator misconfigured: {0}")]
    Config(String),
}

/// External language-model collaborator
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Produce a build-plan candidate for the given project files
    async fn generate_build_plan(&self, files: &[FileRecord]) -> Result<Value, CollaboratorError>;

    /// Answer a free-text question
    async fn consult_oracle(&self, query: &str) -> Result<String, CollaboratorError>;
}

/// Build the collaborator selected in `config`
pub fn create_collaborator(
    config: &CollaboratorConfig,
) -> Result<Arc<dyn Collaborator>, CollaboratorError> {
    let collaborator: Arc<dyn Collaborator> = match config.provider {
        ProviderKind::Stub => Arc::new(StubCollaborator::new()),
        ProviderKind::Ollama => Arc::new(OllamaCollaborator::new(config)?),
        ProviderKind::OpenAI => Arc::new(OpenAiCollaborator::new(config)?),
    };
    tracing::info!(provider = collaborator.name(), "collaborator ready");
    Ok(collaborator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_stub_and_ollama() {
        let mut config = CollaboratorConfig {
            provider: ProviderKind::Stub,
            ..Default::default()
        };
        assert_eq!(create_collaborator(&config).unwrap().name(), "stub");

        config.provider = ProviderKind::Ollama;
        assert_eq!(create_collaborator(&config).unwrap().name(), "ollama");
    }

    #[test]
    fn test_openai_with_explicit_key() {
        let config = CollaboratorConfig {
            provider: ProviderKind::OpenAI,
            api_key: Some("sk-test".into()),
            ..Default::default()
        };
        assert_eq!(create_collaborator(&config).unwrap().name(), "openai");
    }
}
