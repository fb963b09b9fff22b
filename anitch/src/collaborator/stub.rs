//! Deterministic offline collaborator
//!
//! Picks a plan from the submitted file names, answers the oracle with a
//! fixed template and can be scripted to fail or respond slowly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::build_plan::FileRecord;
use crate::collaborator::{Collaborator, CollaboratorError};

#[derive(Debug, Default)]
pub struct StubCollaborator {
    latency: Duration,
    fail_analysis: bool,
    fail_oracle: bool,
    plan_override: Option<Value>,
    plan_calls: AtomicUsize,
    oracle_calls: AtomicUsize,
}

impl StubCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Return `plan` verbatim instead of the inferred plan
    pub fn with_plan(mut self, plan: Value) -> Self {
        self.plan_override = Some(plan);
        self
    }

    pub fn failing_analysis(mut self) -> Self {
        self.fail_analysis = true;
        self
    }

    pub fn failing_oracle(mut self) -> Self {
        self.fail_oracle = true;
        self
    }

    pub fn plan_calls(&self) -> usize {
        self.plan_calls.load(Ordering::SeqCst)
    }

    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn has_file(files: &[FileRecord], name: &str) -> bool {
    files.iter().any(|f| {
        f.name == name || f.name.ends_with(&format!("/{}", name))
    })
}

fn infer_plan(files: &[FileRecord]) -> Value {
    let project_name = "simulated-project";

    if has_file(files, "package.json") {
        let tool = if has_file(files, "yarn.lock") { "yarn" } else { "npm" };
        return json!({
            "projectName": project_name,
            "language": "JavaScript",
            "dependencies": [],
            "buildTool": tool,
            "buildCommands": [format!("{} install", tool), format!("{} run build", tool)],
            "runCommand": format!("{} start", tool),
            "analysisSummary": format!("Node.js project driven by package.json scripts using {}.", tool),
        });
    }

    if has_file(files, "Makefile") {
        return json!({
            "projectName": project_name,
            "language": "C",
            "dependencies": [],
            "buildTool": "make",
            "buildCommands": ["make"],
            "runCommand": "./app",
            "analysisSummary": "Makefile project built with make.",
        });
    }

    if has_file(files, "requirements.txt")
        || has_file(files, "setup.py")
        || files.iter().any(|f| f.name.ends_with(".py"))
    {
        let entry = files
            .iter()
            .map(|f| f.name.as_str())
            .find(|n| n.ends_with(".py") && !n.ends_with("setup.py"))
            .unwrap_or("main.py");
        let mut commands = vec![
            "python -m venv venv".to_string(),
            "source venv/bin/activate".to_string(),
        ];
        if has_file(files, "requirements.txt") {
            commands.push("pip install -r requirements.txt".to_string());
        }
        if has_file(files, "setup.py") {
            commands.push("python setup.py py2app".to_string());
        }
        return json!({
            "projectName": project_name,
            "language": "Python",
            "dependencies": [],
            "buildTool": "pip",
            "buildCommands": commands,
            "runCommand": format!("python {}", entry),
            "analysisSummary": "Python project installed into a virtual environment.",
        });
    }

    json!({
        "projectName": project_name,
        "language": "Shell",
        "dependencies": [],
        "buildTool": "sh",
        "buildCommands": [],
        "runCommand": "./run.sh",
        "analysisSummary": "No known build file found; running the project directly.",
    })
}

#[async_trait]
impl Collaborator for StubCollaborator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate_build_plan(&self, files: &[FileRecord]) -> Result<Value, CollaboratorError> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_analysis {
            return Err(CollaboratorError::Unavailable(
                "stub analysis failure".to_string(),
            ));
        }
        Ok(self
            .plan_override
            .clone()
            .unwrap_or_else(|| infer_plan(files)))
    }

    async fn consult_oracle(&self, query: &str) -> Result<String, CollaboratorError> {
        self.oracle_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_oracle {
            return Err(CollaboratorError::Unavailable(
                "stub oracle failure".to_string(),
            ));
        }
        Ok(format!(
            "The oracle contemplates \"{}\" and answers: coherence follows attention.",
            query
        ))
    }
}
