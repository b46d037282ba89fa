//! Workflow error model.

use thiserror::Error;

/// Result type used across the workflow layers.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Outcome of a workflow operation that did not succeed.
///
/// Every variant except `DependencyFailure` is an expected, caller-recoverable
/// outcome (wrong actor, double-click, bad input). `DependencyFailure` is the
/// only infrastructure-shaped variant and maps to a generic "try again" message
/// at the presentation layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// The conditional update matched no row: the report was already handled
    /// by someone else, or is not in the expected state.
    #[error("report already handled or not in the expected state")]
    StaleTransition,

    /// The acting account is not licensed for this discipline and role.
    #[error("not licensed for this discipline and role")]
    Unauthorized,

    /// A value failed validation (e.g. empty rejection reason, malformed id).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The report or roster row is absent.
    #[error("not found")]
    NotFound,

    /// The store or notifier failed for an infrastructure reason.
    #[error("dependency failure: {0}")]
    DependencyFailure(String),
}

impl WorkflowError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn dependency(msg: impl Into<String>) -> Self {
        Self::DependencyFailure(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Whether the caller can act on this outcome directly (as opposed to an
    /// infrastructure hiccup worth a generic retry message).
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::DependencyFailure(_))
    }
}
