use crate::build_plan::ValidationError;
use crate::collaborator::CollaboratorError;
use crate::config::ConfigError;

/// Top-level error for the library
#[derive(Debug, thiserror::Error)]
pub enum AnitchError {
    #[error("invalid build plan: {0}")]
    Validation(#[from] ValidationError),
    #[error("collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("session is no longer running")]
    SessionClosed,
}

pub type AnitchResult<T> = Result<T, AnitchError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check_plan(value: serde_json::Value) -> AnitchResult<crate::build_plan::BuildPlan> {
        Ok(crate::build_plan::validate(&value)?)
    }

    #[test]
    fn test_validation_errors_convert() {
        let err = check_plan(json!("not a plan")).unwrap_err();
        assert!(matches!(err, AnitchError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "invalid build plan: build plan must be a JSON object, got a string"
        );
    }

    #[test]
    fn test_collaborator_errors_convert() {
        let err: AnitchError = CollaboratorError::NoJson.into();
        assert!(err.to_string().starts_with("collaborator error"));
    }
}
