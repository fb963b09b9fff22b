//! anitch: a coherence-gated build pipeline simulator
//!
//! Free-text commands are parsed into intents and interpreted against a
//! single application state machine. Every action is paid for with
//! *coherence*, a bounded resource. Project files are turned into a build
//! plan by an external collaborator, validated, split into stages and
//! replayed on a timer.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use anitch::{spawn_session, AnitchConfig, StubCollaborator};
//!
//! # async fn demo() -> anitch::AnitchResult<()> {
//! let session = spawn_session(AnitchConfig::default(), Arc::new(StubCollaborator::new()));
//! session.submit_command("analyze project").await?;
//! let snapshot = session.snapshot().await?;
//! assert_eq!(snapshot.coherence, 85);
//! # Ok(())
//! # }
//! ```

pub mod build_plan;
pub mod collaborator;
pub mod command;
pub mod config;
pub mod error;
pub mod ledger;
pub mod machine;
pub mod pipeline;
pub mod session;

pub use build_plan::{validate, BuildPlan, FileRecord, ValidationError};
pub use collaborator::{create_collaborator, Collaborator, CollaboratorError, StubCollaborator};
pub use command::{parse, Intent, IntentKind, Shape};
pub use config::{AnitchConfig, ConfigError, CostTable, ProviderKind, TimingConfig};
pub use error::{AnitchError, AnitchResult};
pub use ledger::CoherenceLedger;
pub use machine::{AppState, Effect, Interpreter, MachineEvent, MachineState, Notification, NotificationLevel};
pub use pipeline::{classify, classify_plan, PipelineSimulator, PipelineStage, StageStatus};
pub use session::{spawn_session, Session, SessionHandle, SessionSnapshot};
