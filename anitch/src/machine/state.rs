use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level application state. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    #[default]
    Idle,
    AwaitingInput,
    Analyzing,
    AnalysisComplete,
    ExecutingPipeline,
    BuildComplete,
    ConsultingOracle,
    DisplayingOracleResponse,
    Restoring,
}

impl AppState {
    pub fn all() -> &'static [AppState] {
        &[
            AppState::Idle,
            AppState::AwaitingInput,
            AppState::Analyzing,
            AppState::AnalysisComplete,
            AppState::ExecutingPipeline,
            AppState::BuildComplete,
            AppState::ConsultingOracle,
            AppState::DisplayingOracleResponse,
            AppState::Restoring,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppState::Idle => "idle",
            AppState::AwaitingInput => "awaiting_input",
            AppState::Analyzing => "analyzing",
            AppState::AnalysisComplete => "analysis_complete",
            AppState::ExecutingPipeline => "executing_pipeline",
            AppState::BuildComplete => "build_complete",
            AppState::ConsultingOracle => "consulting_oracle",
            AppState::DisplayingOracleResponse => "displaying_oracle_response",
            AppState::Restoring => "restoring",
        }
    }

    /// Left only through an explicit reset
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppState::BuildComplete)
    }

    /// A collaborator request is in flight
    pub fn is_awaiting_collaborator(&self) -> bool {
        matches!(self, AppState::Analyzing | AppState::ConsultingOracle)
    }

    /// Part of the analyze → build sequence
    pub fn is_build_flow(&self) -> bool {
        matches!(
            self,
            AppState::Analyzing
                | AppState::AnalysisComplete
                | AppState::ExecutingPipeline
                | AppState::BuildComplete
        )
    }

    /// Accepts side actions such as manifesting objects
    pub fn is_interactive(&self) -> bool {
        !self.is_terminal() && !self.is_awaiting_collaborator()
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the state machine decides on besides coherence
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    pub app_state: AppState,
    pub bridge_connected: bool,
}

impl MachineState {
    pub fn new(app_state: AppState, bridge_connected: bool) -> Self {
        Self {
            app_state,
            bridge_connected,
        }
    }

    /// Same bridge flag, different application state
    pub fn with_state(self, app_state: AppState) -> Self {
        Self { app_state, ..self }
    }
}
