//! Offline shape checks for a collaborator's build plan

use serde_json::{Map, Value};

use crate::build_plan::types::BuildPlan;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("build plan must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },
    #[error("build plan is missing required field '{field}'")]
    MissingField { field: &'static str },
    #[error("field '{field}' must be {expected}, got {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("buildCommands[{index}] is blank")]
    BlankCommand { index: usize },
    #[error("runCommand is blank")]
    BlankRunCommand,
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn field<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, ValidationError> {
    obj.get(name)
        .ok_or(ValidationError::MissingField { field: name })
}

fn string_field(obj: &Map<String, Value>, name: &'static str) -> Result<String, ValidationError> {
    match field(obj, name)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(ValidationError::WrongType {
            field: name.to_string(),
            expected: "a string",
            found: type_name(other),
        }),
    }
}

fn string_array(obj: &Map<String, Value>, name: &'static str) -> Result<Vec<String>, ValidationError> {
    let items = match field(obj, name)? {
        Value::Array(items) => items,
        other => {
            return Err(ValidationError::WrongType {
                field: name.to_string(),
                expected: "an array of strings",
                found: type_name(other),
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(ValidationError::WrongType {
                field: format!("{}[{}]", name, i),
                expected: "a string",
                found: type_name(other),
            }),
        })
        .collect()
}

/// Validate an untyped candidate and produce a [`BuildPlan`].
///
/// Total and deterministic: every input yields a plan or an error, and no
/// field is defaulted. Unknown extra fields are ignored.
pub fn validate(candidate: &Value) -> Result<BuildPlan, ValidationError> {
    let obj = candidate.as_object().ok_or(ValidationError::NotAnObject {
        found: type_name(candidate),
    })?;

    let project_name = string_field(obj, "projectName")?;
    let language = string_field(obj, "language")?;
    let dependencies = string_array(obj, "dependencies")?;
    let build_tool = string_field(obj, "buildTool")?;
    let build_commands = string_array(obj, "buildCommands")?;
    let run_command = string_field(obj, "runCommand")?;
    let analysis_summary = string_field(obj, "analysisSummary")?;

    if let Some(index) = build_commands.iter().position(|c| c.trim().is_empty()) {
        return Err(ValidationError::BlankCommand { index });
    }
    if run_command.trim().is_empty() {
        return Err(ValidationError::BlankRunCommand);
    }

    Ok(BuildPlan {
        project_name,
        language,
        dependencies,
        build_tool,
        build_commands,
        run_command,
        analysis_summary,
    })
}
