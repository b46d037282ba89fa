//! The approval transition table.
//!
//! A transition is data: which stage acts, which status it expects to find,
//! which status it produces, and what gets merged into the payload. The engine
//! executes it as a single conditional update; nothing here touches a store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use fieldflow_core::{AccountId, DisciplineId, ReportId, WorkflowError, WorkflowResult};

use crate::payload::{INSPECTION_REJECTION_KEY, LINE_REJECTION_KEY, RejectionNote};
use crate::status::ReportStatus;

/// The two review stages a report passes through after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    LineReview,
    Inspection,
}

/// Stage data recorded by an inspector approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionApproval {
    /// External inspection reference, required.
    pub inspection_number: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Stage data recorded by an inspector rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionRejection {
    pub reason: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark_document: Option<String>,
}

/// One row of the transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionKind {
    ApproveLineReview,
    RejectLineReview { reason: String },
    ApproveInspection(InspectionApproval),
    RejectInspection(InspectionRejection),
}

impl TransitionKind {
    /// Which stage's licence the signer must hold.
    pub fn stage(&self) -> Stage {
        match self {
            Self::ApproveLineReview | Self::RejectLineReview { .. } => Stage::LineReview,
            Self::ApproveInspection(_) | Self::RejectInspection(_) => Stage::Inspection,
        }
    }

    /// Status the report must currently hold for this transition to match.
    pub fn expected_status(&self) -> ReportStatus {
        match self.stage() {
            Stage::LineReview => ReportStatus::PendingLineReview,
            Stage::Inspection => ReportStatus::PendingInspection,
        }
    }

    /// Status the report holds after this transition commits.
    pub fn target_status(&self) -> ReportStatus {
        match self {
            Self::ApproveLineReview => ReportStatus::PendingInspection,
            Self::ApproveInspection(_) => ReportStatus::Approved,
            Self::RejectLineReview { .. } | Self::RejectInspection(_) => ReportStatus::Rejected,
        }
    }

    /// Rejection reason, where this transition carries one.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::RejectLineReview { reason } => Some(reason),
            Self::RejectInspection(r) => Some(&r.reason),
            _ => None,
        }
    }

    /// Validate stage input before anything is attempted against the store.
    pub fn validate(&self) -> WorkflowResult<()> {
        match self {
            Self::ApproveLineReview => Ok(()),
            Self::RejectLineReview { reason } => require_reason(reason),
            Self::ApproveInspection(a) => {
                if a.inspection_number.trim().is_empty() {
                    return Err(WorkflowError::invalid_input("inspection number is empty"));
                }
                Ok(())
            }
            Self::RejectInspection(r) => require_reason(&r.reason),
        }
    }

    /// The payload merge this transition carries, if any. Applied by the store
    /// inside the same conditional update that flips the status.
    pub fn payload_patch(
        &self,
        signer: &AccountId,
        at: DateTime<Utc>,
    ) -> Option<serde_json::Value> {
        let (key, note) = match self {
            Self::RejectLineReview { reason } => (
                LINE_REJECTION_KEY,
                RejectionNote {
                    reason: reason.clone(),
                    rejected_by: signer.clone(),
                    rejected_at: at,
                    attachments: Vec::new(),
                    remark_document: None,
                },
            ),
            Self::RejectInspection(r) => (
                INSPECTION_REJECTION_KEY,
                RejectionNote {
                    reason: r.reason.clone(),
                    rejected_by: signer.clone(),
                    rejected_at: at,
                    attachments: r.attachments.clone(),
                    remark_document: r.remark_document.clone(),
                },
            ),
            _ => return None,
        };

        // RejectionNote serialization is infallible (plain strings and times).
        let note = serde_json::to_value(note).ok()?;
        Some(serde_json::json!({ key: note }))
    }
}

fn require_reason(reason: &str) -> WorkflowResult<()> {
    if reason.trim().is_empty() {
        return Err(WorkflowError::invalid_input("rejection reason is empty"));
    }
    Ok(())
}

/// What a committed transition hands back: everything the notification
/// dispatcher needs to address and phrase the fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub report_id: ReportId,
    pub new_status: ReportStatus,
    pub discipline_id: DisciplineId,
    pub supervisor_id: AccountId,
    pub brigade_name: String,
    pub work_type_name: String,
    pub report_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approve_inspection() -> TransitionKind {
        TransitionKind::ApproveInspection(InspectionApproval {
            inspection_number: "INS-2024-117".into(),
            notes: String::new(),
            attachments: vec![],
        })
    }

    #[test]
    fn table_maps_expected_and_target_statuses() {
        let approve = TransitionKind::ApproveLineReview;
        assert_eq!(approve.expected_status(), ReportStatus::PendingLineReview);
        assert_eq!(approve.target_status(), ReportStatus::PendingInspection);

        let reject = TransitionKind::RejectLineReview {
            reason: "missing welding log".into(),
        };
        assert_eq!(reject.expected_status(), ReportStatus::PendingLineReview);
        assert_eq!(reject.target_status(), ReportStatus::Rejected);

        let approve = approve_inspection();
        assert_eq!(approve.expected_status(), ReportStatus::PendingInspection);
        assert_eq!(approve.target_status(), ReportStatus::Approved);

        let reject = TransitionKind::RejectInspection(InspectionRejection {
            reason: "wrong volume".into(),
            attachments: vec![],
            remark_document: None,
        });
        assert_eq!(reject.expected_status(), ReportStatus::PendingInspection);
        assert_eq!(reject.target_status(), ReportStatus::Rejected);
    }

    #[test]
    fn every_transition_leaves_its_expected_status() {
        let kinds = [
            TransitionKind::ApproveLineReview,
            TransitionKind::RejectLineReview { reason: "r".into() },
            approve_inspection(),
            TransitionKind::RejectInspection(InspectionRejection {
                reason: "r".into(),
                attachments: vec![],
                remark_document: None,
            }),
        ];
        for kind in kinds {
            assert_ne!(kind.expected_status(), kind.target_status());
            assert!(!kind.expected_status().is_terminal());
        }
    }

    #[test]
    fn empty_rejection_reason_is_invalid_input() {
        let reject = TransitionKind::RejectLineReview { reason: "  ".into() };
        assert!(matches!(
            reject.validate(),
            Err(WorkflowError::InvalidInput(_))
        ));

        let reject = TransitionKind::RejectInspection(InspectionRejection {
            reason: String::new(),
            attachments: vec![],
            remark_document: None,
        });
        assert!(reject.validate().is_err());
    }

    #[test]
    fn inspection_approval_requires_a_reference() {
        let approve = TransitionKind::ApproveInspection(InspectionApproval {
            inspection_number: " ".into(),
            notes: String::new(),
            attachments: vec![],
        });
        assert!(approve.validate().is_err());
        assert!(approve_inspection().validate().is_ok());
    }

    #[test]
    fn rejection_patch_lands_under_the_stage_key() {
        let signer = AccountId::new("insp-9");
        let at = chrono::Utc::now();
        let kind = TransitionKind::RejectInspection(InspectionRejection {
            reason: "missing welding log".into(),
            attachments: vec!["photo_1.jpg".into()],
            remark_document: Some("remarks.pdf".into()),
        });

        let patch = kind.payload_patch(&signer, at).unwrap();
        let note = &patch[INSPECTION_REJECTION_KEY];
        assert_eq!(note["reason"], "missing welding log");
        assert_eq!(note["rejected_by"], "insp-9");
        assert_eq!(note["attachments"][0], "photo_1.jpg");
        assert_eq!(note["remark_document"], "remarks.pdf");

        assert!(TransitionKind::ApproveLineReview.payload_patch(&signer, at).is_none());
    }
}
