use serde::{Deserialize, Serialize};
use std::fmt;

use crate::command::Shape;
use crate::machine::state::AppState;

/// Outcome signals of a transition. The session turns some of them into work
/// (collaborator requests, timers, scene objects); all of them can be shown
/// to the user through [`Effect::notification`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    InsufficientCoherence {
        action: String,
        required: u8,
        available: u8,
        shortfall: u8,
    },
    IgnoredInState {
        action: String,
        state: AppState,
    },
    AnalysisRequested,
    BeginAnalysis { file_count: usize },
    AnalysisComplete,
    AnalysisFailed { reason: String },
    PipelineStarted,
    BuildComplete,
    BeginOracle { query: String },
    OracleAnswered,
    OracleFailed { reason: String },
    ObjectManifested { shape: Shape },
    BridgeConnected,
    BridgeDisconnected,
    MeditationStarted,
    MeditationEnded,
    UnknownCommand { raw: String },
    SessionReset,
}

/// Severity shown with a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// Short user-facing message for the presentation layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

impl Effect {
    /// User-facing message for this effect, if it has one
    pub fn notification(&self) -> Option<Notification> {
        use NotificationLevel::*;

        let n = match self {
            Effect::InsufficientCoherence {
                action,
                required,
                available,
                shortfall,
            } => Notification::new(
                Warning,
                "Insufficient Coherence",
                format!(
                    "Need at least {}% coherence to {} (have {}%, short by {}).",
                    required, action, available, shortfall
                ),
            ),
            Effect::IgnoredInState { action, state } => Notification::new(
                Info,
                "Command Ignored",
                format!("Cannot {} while {}.", action, state),
            ),
            Effect::AnalysisRequested => Notification::new(
                Info,
                "Analysis Protocol Initiated",
                "Awaiting project file submission.",
            ),
            Effect::BeginAnalysis { file_count } => Notification::new(
                Info,
                "Analyzing Project",
                format!("Submitted {} file(s) to the AI core.", file_count),
            ),
            Effect::AnalysisComplete => Notification::new(
                Success,
                "Analysis Complete",
                "Build pipeline has been constructed.",
            ),
            Effect::AnalysisFailed { reason } => Notification::new(
                Error,
                "Analysis Failed",
                format!(
                    "The AI core could not process the project files. Coherence destabilized. ({})",
                    reason
                ),
            ),
            Effect::PipelineStarted => return None,
            Effect::BuildComplete => Notification::new(
                Success,
                "Build Simulation Complete",
                "Application artifact has been manifested.",
            ),
            Effect::BeginOracle { .. } => return None,
            Effect::OracleAnswered => Notification::new(
                Success,
                "Oracle Responded",
                "Holographic response panel materialized.",
            ),
            Effect::OracleFailed { reason } => Notification::new(
                Error,
                "Oracle Interface Error",
                format!(
                    "The connection to the AI core was unstable. Coherence lost. ({})",
                    reason
                ),
            ),
            Effect::ObjectManifested { shape } => Notification::new(
                Success,
                "Manifestation Successful",
                format!("A {} has been materialized in the scene.", shape),
            ),
            Effect::BridgeConnected => Notification::new(
                Success,
                "Bridge Connected",
                "Secure connection is now active.",
            ),
            Effect::BridgeDisconnected => Notification::new(
                Info,
                "Bridge Disconnected",
                "The secure connection has been terminated.",
            ),
            Effect::MeditationStarted => Notification::new(
                Info,
                "Entering Meditation",
                "Focusing energy to restore coherence.",
            ),
            Effect::MeditationEnded => Notification::new(
                Success,
                "Meditation Complete",
                "You feel refreshed and coherent.",
            ),
            Effect::UnknownCommand { .. } => Notification::new(
                Error,
                "Command Unrecognized",
                "The reality matrix did not resolve the command. Coherence lost.",
            ),
            Effect::SessionReset => return None,
        };
        Some(n)
    }
}
