use serde::{Deserialize, Serialize};

/// Non-command triggers of the state machine: collaborator results, timers
/// and presentation-layer actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MachineEvent {
    /// Project files were submitted
    FilesDropped { count: usize },
    /// The collaborator returned a plan that passed validation
    AnalysisSucceeded,
    /// The collaborator failed or its plan was rejected
    AnalysisFailed { reason: String },
    /// The first stage started running
    PipelineStarted,
    /// The last stage finished
    PipelineCompleted,
    OracleSucceeded,
    OracleFailed { reason: String },
    MeditationTick,
    ExitMeditation,
    Reset,
}

impl MachineEvent {
    pub fn label(&self) -> &'static str {
        match self {
            MachineEvent::FilesDropped { .. } => "files_dropped",
            MachineEvent::AnalysisSucceeded => "analysis_succeeded",
            MachineEvent::AnalysisFailed { .. } => "analysis_failed",
            MachineEvent::PipelineStarted => "pipeline_started",
            MachineEvent::PipelineCompleted => "pipeline_completed",
            MachineEvent::OracleSucceeded => "oracle_succeeded",
            MachineEvent::OracleFailed { .. } => "oracle_failed",
            MachineEvent::MeditationTick => "meditation_tick",
            MachineEvent::ExitMeditation => "exit_meditation",
            MachineEvent::Reset => "reset",
        }
    }
}
