use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::build_plan::BuildPlan;
use crate::command::Shape;
use crate::machine::AppState;
use crate::pipeline::StageView;

/// One submitted command
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn now(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An object manifested into the scene
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: Uuid,
    pub shape: Shape,
}

impl SceneObject {
    pub fn new(shape: Shape) -> Self {
        Self {
            id: Uuid::new_v4(),
            shape,
        }
    }
}

/// Tag carried by an outbound collaborator request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestToken(pub u64);

/// Everything the presentation layer renders
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: AppState,
    pub coherence: u8,
    pub bridge_connected: bool,
    pub stages: Vec<StageView>,
    pub history: Vec<HistoryEntry>,
    pub scene: Vec<SceneObject>,
    pub plan: Option<BuildPlan>,
    pub oracle_response: Option<String>,
}
