//! Logical notification content and the send capability.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fieldflow_core::{AccountId, ReportId};
use fieldflow_reports::{ReportStatus, TransitionOutcome};

/// What a recipient is told. One variant per fan-out target; the structured
/// fields are handed to the presentation layer for formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// To line reviewers of the discipline: a fresh report awaits first-stage
    /// review.
    AwaitingLineReview {
        report_id: ReportId,
        supervisor_id: AccountId,
        brigade_name: String,
        work_type_name: String,
        report_date: NaiveDate,
    },
    /// To inspectors of the discipline: a report passed line review.
    AwaitingInspection {
        report_id: ReportId,
        brigade_name: String,
        work_type_name: String,
        report_date: NaiveDate,
    },
    /// To the submitting supervisor: final approval.
    ReportApproved {
        report_id: ReportId,
        brigade_name: String,
        work_type_name: String,
        report_date: NaiveDate,
    },
    /// To the submitting supervisor: rejection, with the reviewer's reason.
    ReportRejected {
        report_id: ReportId,
        brigade_name: String,
        work_type_name: String,
        report_date: NaiveDate,
        reason: String,
    },
}

impl Notification {
    /// Build the notification a committed transition fans out. `None` only for
    /// statuses that trigger no notification (`draft` never reaches here).
    pub fn for_outcome(outcome: &TransitionOutcome) -> Option<Self> {
        match outcome.new_status {
            ReportStatus::PendingLineReview => Some(Self::AwaitingLineReview {
                report_id: outcome.report_id,
                supervisor_id: outcome.supervisor_id.clone(),
                brigade_name: outcome.brigade_name.clone(),
                work_type_name: outcome.work_type_name.clone(),
                report_date: outcome.report_date,
            }),
            ReportStatus::PendingInspection => Some(Self::AwaitingInspection {
                report_id: outcome.report_id,
                brigade_name: outcome.brigade_name.clone(),
                work_type_name: outcome.work_type_name.clone(),
                report_date: outcome.report_date,
            }),
            ReportStatus::Approved => Some(Self::ReportApproved {
                report_id: outcome.report_id,
                brigade_name: outcome.brigade_name.clone(),
                work_type_name: outcome.work_type_name.clone(),
                report_date: outcome.report_date,
            }),
            ReportStatus::Rejected => Some(Self::ReportRejected {
                report_id: outcome.report_id,
                brigade_name: outcome.brigade_name.clone(),
                work_type_name: outcome.work_type_name.clone(),
                report_date: outcome.report_date,
                reason: outcome.rejection_reason.clone().unwrap_or_default(),
            }),
            ReportStatus::Draft => None,
        }
    }
}

/// A single send failed. Per-recipient failures are logged by the dispatcher
/// and never abort the rest of the fan-out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    Send(String),
    #[error("send timed out")]
    Timeout,
}

/// Delivery capability, one call per recipient. Fire-and-forget from the
/// workflow's point of view: no retry, at most one attempt per recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        recipient: &AccountId,
        notification: &Notification,
    ) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldflow_core::DisciplineId;

    fn outcome(status: ReportStatus, reason: Option<&str>) -> TransitionOutcome {
        TransitionOutcome {
            report_id: ReportId::new(102),
            new_status: status,
            discipline_id: DisciplineId::new(1),
            supervisor_id: AccountId::new("sup-1"),
            brigade_name: "B-7".into(),
            work_type_name: "Welding".into(),
            report_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            rejection_reason: reason.map(str::to_owned),
        }
    }

    #[test]
    fn rejection_notification_carries_the_reason_text() {
        let note = Notification::for_outcome(&outcome(
            ReportStatus::Rejected,
            Some("missing welding log"),
        ))
        .unwrap();
        match note {
            Notification::ReportRejected { reason, report_id, .. } => {
                assert_eq!(reason, "missing welding log");
                assert_eq!(report_id, ReportId::new(102));
            }
            other => panic!("expected ReportRejected, got {other:?}"),
        }
    }

    #[test]
    fn each_status_maps_to_its_fan_out_variant() {
        assert!(matches!(
            Notification::for_outcome(&outcome(ReportStatus::PendingLineReview, None)),
            Some(Notification::AwaitingLineReview { .. })
        ));
        assert!(matches!(
            Notification::for_outcome(&outcome(ReportStatus::PendingInspection, None)),
            Some(Notification::AwaitingInspection { .. })
        ));
        assert!(matches!(
            Notification::for_outcome(&outcome(ReportStatus::Approved, None)),
            Some(Notification::ReportApproved { .. })
        ));
        assert!(Notification::for_outcome(&outcome(ReportStatus::Draft, None)).is_none());
    }
}
