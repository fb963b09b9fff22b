use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Structured build instructions produced by the collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    /// Name of the analyzed project
    pub project_name: String,
    /// Primary language, e.g. `Python` or `JavaScript`
    pub language: String,
    /// Declared dependencies; may be empty
    pub dependencies: Vec<String>,
    /// Tool driving the build, e.g. `pip`, `npm`, `make`
    pub build_tool: String,
    /// Shell commands in execution order
    pub build_commands: Vec<String>,
    /// Command that launches the built application
    pub run_command: String,
    /// Short natural-language summary of the analysis
    pub analysis_summary: String,
}

impl BuildPlan {
    /// JSON schema a collaborator response has to follow
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(BuildPlan)
    }
}

/// One project file handed to the collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub content: String,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}
