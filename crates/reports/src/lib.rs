//! `fieldflow-reports` — the report entity and its approval lifecycle.
//!
//! Pure domain: the five-state status machine, the typed structured payload,
//! and the transition table the workflow engine executes. No storage or
//! transport concerns here.

pub mod payload;
pub mod report;
pub mod status;
pub mod transition;

pub use payload::{RejectionNote, WorkPayload};
pub use report::{NewReport, Report, ReportSummary, StageSignature};
pub use status::ReportStatus;
pub use transition::{
    InspectionApproval, InspectionRejection, Stage, TransitionKind, TransitionOutcome,
};
