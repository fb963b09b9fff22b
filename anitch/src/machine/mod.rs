//! Application State Machine
//!
//! Commands and machine events both go through pure functions
//! ([`interpret`] and [`transition`]) that return a [`Transition`]: the next
//! [`MachineState`], a coherence delta and a list of [`Effect`]s. Gating is
//! always checked against the coherence held *before* the delta. The
//! [`Interpreter`] owns the state and the ledger and applies transitions as a
//! unit.

pub mod effects;
pub mod events;
pub mod interpreter;
pub mod state;

pub use effects::{Effect, Notification, NotificationLevel};
pub use events::MachineEvent;
pub use interpreter::{interpret, transition, Applied, Interpreter, Transition};
pub use state::{AppState, MachineState};
