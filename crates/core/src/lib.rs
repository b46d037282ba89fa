//! `fieldflow-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{WorkflowError, WorkflowResult};
pub use id::{AccountId, DisciplineId, ReportId};
