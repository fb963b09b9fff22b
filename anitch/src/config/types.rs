use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::command::Shape;

/// Top-level configuration for a simulator session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnitchConfig {
    pub coherence: CoherenceConfig,
    pub costs: CostTable,
    pub timing: TimingConfig,
    pub collaborator: CollaboratorConfig,
}

/// Starting coherence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoherenceConfig {
    /// Value at session start (clamped into 0..=100)
    pub initial: u8,
}

impl Default for CoherenceConfig {
    fn default() -> Self {
        Self { initial: 100 }
    }
}

/// Coherence cost of every gated action and penalty, in points.
///
/// Values are positive here; the state machine turns them into negative deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTable {
    pub analyze: u8,
    pub consult_oracle: u8,
    pub oracle_failure_penalty: u8,
    pub bridge_connect: u8,
    pub unknown_command: u8,
    pub file_processing: u8,
    pub analysis_success: u8,
    pub analysis_failure_penalty: u8,
    pub build_complete: u8,
    /// Points restored per meditation tick
    pub meditation_restore: u8,
    pub manifest: ManifestCosts,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            analyze: 15,
            consult_oracle: 10,
            oracle_failure_penalty: 15,
            bridge_connect: 25,
            unknown_command: 5,
            file_processing: 5,
            analysis_success: 20,
            analysis_failure_penalty: 25,
            build_complete: 30,
            meditation_restore: 2,
            manifest: ManifestCosts::default(),
        }
    }
}

/// Manifestation cost keyed by shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestCosts {
    pub cube: u8,
    pub sphere: u8,
    pub pyramid: u8,
}

impl ManifestCosts {
    /// Flat table charging the same for every shape
    pub fn flat(cost: u8) -> Self {
        Self {
            cube: cost,
            sphere: cost,
            pyramid: cost,
        }
    }

    pub fn cost_for(&self, shape: Shape) -> u8 {
        match shape {
            Shape::Cube => self.cube,
            Shape::Sphere => self.sphere,
            Shape::Pyramid => self.pyramid,
        }
    }
}

impl Default for ManifestCosts {
    fn default() -> Self {
        Self::flat(20)
    }
}

/// Timer intervals, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between plan receipt and the first stage starting
    pub plan_start_delay_ms: u64,
    /// How long each stage stays running
    pub stage_dwell_ms: u64,
    /// Meditation restoration tick
    pub meditation_tick_ms: u64,
}

impl TimingConfig {
    pub fn plan_start_delay(&self) -> Duration {
        Duration::from_millis(self.plan_start_delay_ms)
    }

    pub fn stage_dwell(&self) -> Duration {
        Duration::from_millis(self.stage_dwell_ms)
    }

    pub fn meditation_tick(&self) -> Duration {
        // A zero period would make tokio's interval panic
        Duration::from_millis(self.meditation_tick_ms.max(1))
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            plan_start_delay_ms: 500,
            stage_dwell_ms: 2500,
            meditation_tick_ms: 1000,
        }
    }
}

/// Supported collaborator backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Deterministic offline responses
    Stub,
    /// Local Ollama server
    #[default]
    Ollama,
    /// OpenAI-compatible chat completions (OpenAI, OpenRouter, ...)
    #[serde(alias = "openrouter")]
    OpenAI,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stub" => Ok(ProviderKind::Stub),
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" | "openrouter" => Ok(ProviderKind::OpenAI),
            _ => Err(format!(
                "Unknown provider '{}'. Valid options: stub, ollama, openai",
                s
            )),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Stub => write!(f, "stub"),
            ProviderKind::Ollama => write!(f, "ollama"),
            ProviderKind::OpenAI => write!(f, "openai"),
        }
    }
}

/// Settings for the language-model collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// API key; falls back to `OPENAI_API_KEY` for the openai provider
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub temperature: Option<f64>,
}

impl CollaboratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(60))
    }
}
