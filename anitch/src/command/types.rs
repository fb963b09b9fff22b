use serde::{Deserialize, Serialize};
use std::fmt;

/// Shapes that can be manifested into the scene
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Cube,
    Sphere,
    Pyramid,
}

impl Shape {
    pub fn all() -> &'static [Shape] {
        &[Shape::Cube, Shape::Sphere, Shape::Pyramid]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Cube => "cube",
            Shape::Sphere => "sphere",
            Shape::Pyramid => "pyramid",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cube" => Ok(Shape::Cube),
            "sphere" => Ok(Shape::Sphere),
            "pyramid" => Ok(Shape::Pyramid),
            other => Err(format!(
                "Unknown shape '{}'. Valid options: cube, sphere, pyramid",
                other
            )),
        }
    }
}

/// What a submitted command means
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentKind {
    /// Start the analysis protocol (awaiting project files)
    Analyze,
    /// Enter restoration mode
    Meditate,
    /// Ask the oracle a free-text question
    ConsultOracle(String),
    /// Materialize an object in the scene
    ManifestObject(Shape),
    /// Connect or disconnect the bridge
    ToggleBridge,
    /// Nothing matched
    Unknown,
}

impl IntentKind {
    pub fn label(&self) -> &'static str {
        match self {
            IntentKind::Analyze => "analyze",
            IntentKind::Meditate => "meditate",
            IntentKind::ConsultOracle(_) => "consult_oracle",
            IntentKind::ManifestObject(_) => "manifest_object",
            IntentKind::ToggleBridge => "toggle_bridge",
            IntentKind::Unknown => "unknown",
        }
    }
}

/// The parsed outcome of one command string
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    /// The command exactly as submitted
    pub raw: String,
}

impl Intent {
    pub fn new(kind: IntentKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }
}
