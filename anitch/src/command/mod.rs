//! Command Parser
//!
//! Maps a raw command line to a typed [`Intent`]. Parsing is pure and total;
//! see [`parser::RULE_ORDER`] for the rule priority.

pub mod parser;
pub mod types;

pub use parser::{parse, rules, CommandRule, RULE_ORDER};
pub use types::{Intent, IntentKind, Shape};
