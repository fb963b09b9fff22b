//! Build pipeline: stage classification and the timed simulator

pub mod classifier;
pub mod simulator;
pub mod types;

pub use classifier::{classify, classify_plan};
pub use simulator::{PipelineEvent, PipelineSimulator, ScheduledEvent, SimulatorStep};
pub use types::{PipelineStage, StageCommands, StageStatus, StageView};
