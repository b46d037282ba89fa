//! Store capabilities the workflow core is given.
//!
//! The engine never sees SQL; it sees these traits. The one hard requirement
//! on any implementation is that `apply_transition` is a genuinely atomic
//! conditional update reporting an accurate affected-row count — that count is
//! the exactly-once guarantee for concurrent transitions of the same report.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use fieldflow_core::{AccountId, DisciplineId, ReportId, WorkflowError};
use fieldflow_reports::{NewReport, ReportStatus, ReportSummary, Stage, TransitionKind};
use fieldflow_roster::Roster;
use fieldflow_routing::ReviewRole;

pub use in_memory::InMemoryStore;
pub use postgres::{PostgresRoleDirectory, PostgresStore};

/// Infrastructure failure in a store implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("database error in {operation}: {message}")]
    Database { operation: String, message: String },

    #[error("connection pool closed in {0}")]
    PoolClosed(String),

    #[error("failed to decode row in {operation}: {message}")]
    Decode { operation: String, message: String },
}

impl StoreError {
    pub fn database(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Database {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn decode(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        WorkflowError::DependencyFailure(err.to_string())
    }
}

/// Everything a single conditional update writes alongside the status flip.
///
/// Built from the transition table; the store applies all of it in one
/// statement guarded by `WHERE id = ? AND workflow_status = expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionUpdate {
    pub target: ReportStatus,
    pub stage: Stage,
    pub signer: AccountId,
    pub signed_at: DateTime<Utc>,
    /// Merged into the structured payload (rejection notes).
    pub payload_patch: Option<serde_json::Value>,
    /// Inspection-stage columns; `None` leaves the column untouched.
    pub inspection_number: Option<String>,
    pub inspection_notes: Option<String>,
    pub inspection_attachments: Option<Vec<String>>,
    pub remark_document: Option<String>,
}

impl TransitionUpdate {
    pub fn from_kind(kind: &TransitionKind, signer: &AccountId, at: DateTime<Utc>) -> Self {
        let mut update = Self {
            target: kind.target_status(),
            stage: kind.stage(),
            signer: signer.clone(),
            signed_at: at,
            payload_patch: kind.payload_patch(signer, at),
            inspection_number: None,
            inspection_notes: None,
            inspection_attachments: None,
            remark_document: None,
        };

        match kind {
            TransitionKind::ApproveInspection(a) => {
                update.inspection_number = Some(a.inspection_number.clone());
                update.inspection_notes = Some(a.notes.clone());
                update.inspection_attachments = Some(a.attachments.clone());
            }
            TransitionKind::RejectInspection(r) => {
                update.inspection_notes = Some(r.reason.clone());
                update.inspection_attachments = Some(r.attachments.clone());
                update.remark_document = r.remark_document.clone();
            }
            TransitionKind::ApproveLineReview | TransitionKind::RejectLineReview { .. } => {}
        }

        update
    }
}

/// Report rows and their embedded structured payload.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a new report directly in `pending-line-review` and return its
    /// store-assigned id.
    async fn insert_report(&self, report: &NewReport) -> Result<ReportId, StoreError>;

    /// The summary slice the engine guards transitions with.
    async fn fetch_summary(&self, id: ReportId) -> Result<Option<ReportSummary>, StoreError>;

    /// Single conditional update: apply `update` where the report currently
    /// holds `expected`. Returns the affected-row count (0 or 1); 0 means the
    /// guard did not match and nothing changed.
    async fn apply_transition(
        &self,
        id: ReportId,
        expected: ReportStatus,
        update: &TransitionUpdate,
    ) -> Result<u64, StoreError>;

    /// Sum of the payload `people_count` over every non-rejected report for
    /// the brigade and day. Pending reports count; rejected claims are void.
    async fn committed_headcount(
        &self,
        brigade_name: &str,
        date: NaiveDate,
    ) -> Result<u32, StoreError>;

    /// Delete every report for the brigade and day regardless of status.
    /// Returns the number of rows removed.
    async fn delete_for_brigade_date(
        &self,
        brigade_name: &str,
        date: NaiveDate,
    ) -> Result<u64, StoreError>;

    /// Worklist for one role: reports awaiting that role's stage within one
    /// discipline. Line reviewers see submissions oldest-first; inspectors see
    /// reports ordered by when line review signed them off.
    async fn pending_for_role(
        &self,
        discipline: DisciplineId,
        role: ReviewRole,
    ) -> Result<Vec<ReportSummary>, StoreError>;
}

/// Daily roster rows.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Fully replace the roster for (brigade, date) with `roster`'s lines.
    async fn replace_roster(&self, roster: &Roster) -> Result<(), StoreError>;

    /// The stored roster for (brigade, date), if any.
    async fn fetch_roster(
        &self,
        brigade_id: &AccountId,
        date: NaiveDate,
    ) -> Result<Option<Roster>, StoreError>;
}
