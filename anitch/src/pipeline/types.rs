use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stages in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    Setup,
    Dependencies,
    Build,
    Run,
}

impl PipelineStage {
    pub fn all() -> &'static [PipelineStage] {
        &[
            PipelineStage::Setup,
            PipelineStage::Dependencies,
            PipelineStage::Build,
            PipelineStage::Run,
        ]
    }

    /// Heading shown for the stage
    pub fn title(&self) -> &'static str {
        match self {
            PipelineStage::Setup => "Setup",
            PipelineStage::Dependencies => "Dependencies",
            PipelineStage::Build => "Build",
            PipelineStage::Run => "Run Simulation",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Progress of one stage, derived from the simulator cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
}

impl StageStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Running => "running",
            StageStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A non-empty stage and its commands in plan order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCommands {
    pub stage: PipelineStage,
    pub commands: Vec<String>,
}

/// A stage as presented to the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageView {
    pub stage: PipelineStage,
    pub commands: Vec<String>,
    pub status: StageStatus,
}
