//! Prompt construction and response parsing shared by the HTTP providers

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::build_plan::{BuildPlan, FileRecord};
use crate::collaborator::CollaboratorError;

const BUILD_ENGINEER_BRIEF: &str = "\
You are a build engineer expert. Your task is to analyze a set of project files and \
determine the best way to build and run the project.";

const BUILD_ENGINEER_RULES: &str = "\
Based on the files provided:
1. Determine a suitable project name.
2. Identify the primary programming language.
3. List the key dependencies. If there is a dependency file (like requirements.txt or package.json), use it.
4. Identify the primary build tool (like pip, npm, yarn, make or py2app).
5. Provide the shell commands that install dependencies and build the project, in order.
6. Provide the command that runs the application.
7. Write a short summary explaining your analysis and the steps.

If a known build file like 'setup.py', 'package.json' (with scripts) or a 'Makefile' is present, \
prioritize its instructions for the build commands.
For Python projects never require administrative ('sudo') privileges: always create a virtual \
environment first (e.g. 'python -m venv venv'), activate it, then install dependencies inside it.
For Node.js projects prefer 'npm' unless 'yarn.lock' is present.";

/// Prompt asking for a build plan for `files`
pub fn build_plan_prompt(files: &[FileRecord]) -> String {
    let mut prompt = String::new();
    prompt.push_str(BUILD_ENGINEER_BRIEF);
    prompt.push_str("\n\nAnalyze the following files:\n");
    for file in files {
        prompt.push_str(&format!(
            "File: {}\nContent:\n'''\n{}\n'''\n---\n",
            file.name, file.content
        ));
    }
    prompt.push('\n');
    prompt.push_str(BUILD_ENGINEER_RULES);

    let schema = serde_json::to_string_pretty(&BuildPlan::json_schema())
        .unwrap_or_else(|_| "{}".to_string());
    prompt.push_str(
        "\n\nRespond with a single JSON object and nothing else. It must match this JSON schema:\n",
    );
    prompt.push_str(&schema);
    prompt
}

/// Locate the JSON object inside free model text (fenced or bare)
pub fn extract_json(response: &str) -> Option<&str> {
    if let Some(start) = response.find("```json") {
        let after = &response[start + 7..];
        if let Some(end) = after.find("```") {
            return Some(after[..end].trim());
        }
    }

    if let Some(start) = response.find("```") {
        let after = &response[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return Some(inner);
            }
        }
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

/// Extract and decode the build-plan candidate. Shape checks happen later.
pub fn parse_candidate(response: &str) -> Result<Value, CollaboratorError> {
    let json = extract_json(response).ok_or(CollaboratorError::NoJson)?;
    serde_json::from_str(json).map_err(|e| CollaboratorError::Decode(e.to_string()))
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_json_variants() {
        assert_eq!(
            extract_json("Here:\n```json\n{\"a\": 1}\n```\nDone"),
            Some("{\"a\": 1}")
        );
        assert_eq!(extract_json("```\n{\"a\": 2}\n```"), Some("{\"a\": 2}"));
        assert_eq!(extract_json("sure! {\"a\": 3} hope it helps"), Some("{\"a\": 3}"));
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn test_parse_candidate_errors() {
        assert!(matches!(parse_candidate("nothing"), Err(CollaboratorError::NoJson)));
        assert!(matches!(
            parse_candidate("{ not json }"),
            Err(CollaboratorError::Decode(_))
        ));
        let value = parse_candidate("```json\n{\"projectName\": \"x\"}\n```").unwrap();
        assert_eq!(value["projectName"], "x");
    }

    #[test]
    fn test_prompt_includes_files_and_schema() {
        let prompt = build_plan_prompt(&[FileRecord::new("requirements.txt", "flask==3.0")]);
        assert!(prompt.contains("File: requirements.txt"));
        assert!(prompt.contains("flask==3.0"));
        assert!(prompt.contains("python -m venv venv"));
        assert!(prompt.contains("\"buildCommands\""));
    }

    #[test]
    fn test_sha256_hex_is_stable() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
