//! Build-Plan Validator
//!
//! The collaborator hands back untyped JSON. [`validate`] is the only way to
//! obtain a [`BuildPlan`] from it, so everything downstream can rely on the
//! shape: all seven fields present, `buildCommands` an ordered list of
//! non-blank strings and a non-blank `runCommand`.

pub mod types;
pub mod validate;

pub use types::{BuildPlan, FileRecord};
pub use validate::{validate, ValidationError};
