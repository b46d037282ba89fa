//! Fan-out of committed transitions to their recipients.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use fieldflow_core::{AccountId, WorkflowResult};
use fieldflow_reports::{ReportStatus, TransitionOutcome};
use fieldflow_routing::{ReviewRole, RoleDirectory};

use crate::notification::{Notification, Notifier};

/// Default per-recipient send timeout.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// What a fan-out actually delivered. Observability only; the triggering
/// transition is already committed regardless of these numbers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchSummary {
    pub attempted: usize,
    pub delivered: usize,
    /// Recipients whose send failed or timed out.
    pub failed: Vec<AccountId>,
}

/// Resolves recipients for a transition outcome and sends one message each.
///
/// Sends are isolated: a failure or timeout for one recipient is logged and
/// the remaining recipients are still attempted. Nothing is retried and
/// nothing rolls back — delivery is best-effort, at most once per recipient.
pub struct Dispatcher {
    directory: Arc<dyn RoleDirectory>,
    notifier: Arc<dyn Notifier>,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(directory: Arc<dyn RoleDirectory>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_timeout(directory, notifier, DEFAULT_SEND_TIMEOUT)
    }

    pub fn with_timeout(
        directory: Arc<dyn RoleDirectory>,
        notifier: Arc<dyn Notifier>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            notifier,
            send_timeout,
        }
    }

    /// Fan out a committed transition.
    ///
    /// Role-scoped stages notify every account the directory resolves for the
    /// next actor's role; approvals and rejections notify the stored
    /// submitting supervisor directly. Only directory lookups can fail here —
    /// send failures are absorbed into the summary.
    #[instrument(skip(self, outcome), fields(report_id = %outcome.report_id, status = %outcome.new_status))]
    pub async fn dispatch(&self, outcome: &TransitionOutcome) -> WorkflowResult<DispatchSummary> {
        let Some(notification) = Notification::for_outcome(outcome) else {
            return Ok(DispatchSummary::default());
        };

        let recipients = match outcome.new_status {
            ReportStatus::PendingLineReview => {
                self.directory
                    .resolve_recipients(outcome.discipline_id, ReviewRole::LineReviewer)
                    .await?
            }
            ReportStatus::PendingInspection => {
                self.directory
                    .resolve_recipients(outcome.discipline_id, ReviewRole::Inspector)
                    .await?
            }
            // Home notification: addressed to the submitter, not role-scoped.
            ReportStatus::Approved | ReportStatus::Rejected => {
                vec![outcome.supervisor_id.clone()]
            }
            ReportStatus::Draft => Vec::new(),
        };

        if recipients.is_empty() {
            warn!(
                report_id = %outcome.report_id,
                discipline = %outcome.discipline_id,
                "no recipients resolved for transition, nothing sent"
            );
            return Ok(DispatchSummary::default());
        }

        let mut summary = DispatchSummary {
            attempted: recipients.len(),
            ..DispatchSummary::default()
        };

        for recipient in &recipients {
            let send = self.notifier.send(recipient, &notification);
            match tokio::time::timeout(self.send_timeout, send).await {
                Ok(Ok(())) => summary.delivered += 1,
                Ok(Err(err)) => {
                    warn!(recipient = %recipient, error = %err, "notification send failed");
                    summary.failed.push(recipient.clone());
                }
                Err(_) => {
                    warn!(
                        recipient = %recipient,
                        timeout_ms = self.send_timeout.as_millis() as u64,
                        "notification send timed out"
                    );
                    summary.failed.push(recipient.clone());
                }
            }
        }

        info!(
            report_id = %outcome.report_id,
            attempted = summary.attempted,
            delivered = summary.delivered,
            "transition fan-out finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use fieldflow_core::{DisciplineId, ReportId};
    use fieldflow_routing::StaticRoleDirectory;

    use super::*;
    use crate::notification::NotifyError;

    /// Records sends; fails (or hangs) for configured recipients.
    #[derive(Default)]
    struct ScriptedNotifier {
        sent: Mutex<Vec<(AccountId, Notification)>>,
        fail_for: HashSet<AccountId>,
        hang_for: HashSet<AccountId>,
    }

    #[async_trait]
    impl Notifier for ScriptedNotifier {
        async fn send(
            &self,
            recipient: &AccountId,
            notification: &Notification,
        ) -> Result<(), NotifyError> {
            if self.hang_for.contains(recipient) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fail_for.contains(recipient) {
                return Err(NotifyError::Send("chat unreachable".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient.clone(), notification.clone()));
            Ok(())
        }
    }

    fn piping() -> DisciplineId {
        DisciplineId::new(1)
    }

    fn outcome(status: ReportStatus, reason: Option<&str>) -> TransitionOutcome {
        TransitionOutcome {
            report_id: ReportId::new(101),
            new_status: status,
            discipline_id: piping(),
            supervisor_id: AccountId::new("sup-1"),
            brigade_name: "B-7".into(),
            work_type_name: "Welding".into(),
            report_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            rejection_reason: reason.map(str::to_owned),
        }
    }

    fn inspectors_directory() -> Arc<StaticRoleDirectory> {
        let dir = StaticRoleDirectory::new();
        dir.insert(ReviewRole::Inspector, AccountId::new("insp-1"), piping());
        dir.insert(ReviewRole::Inspector, AccountId::new("insp-2"), piping());
        dir.insert(ReviewRole::Inspector, AccountId::new("insp-3"), piping());
        Arc::new(dir)
    }

    #[tokio::test]
    async fn line_approval_notifies_every_inspector_of_the_discipline() {
        let notifier = Arc::new(ScriptedNotifier::default());
        let dispatcher = Dispatcher::new(inspectors_directory(), notifier.clone());

        let summary = dispatcher
            .dispatch(&outcome(ReportStatus::PendingInspection, None))
            .await
            .unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.delivered, 3);
        let sent = notifier.sent.lock().unwrap();
        let recipients: Vec<&str> = sent.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(recipients, vec!["insp-1", "insp-2", "insp-3"]);
        assert!(matches!(sent[0].1, Notification::AwaitingInspection { .. }));
    }

    #[tokio::test]
    async fn one_failed_recipient_does_not_stop_the_rest() {
        let notifier = Arc::new(ScriptedNotifier {
            fail_for: HashSet::from([AccountId::new("insp-2")]),
            ..ScriptedNotifier::default()
        });
        let dispatcher = Dispatcher::new(inspectors_directory(), notifier.clone());

        let summary = dispatcher
            .dispatch(&outcome(ReportStatus::PendingInspection, None))
            .await
            .unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.failed, vec![AccountId::new("insp-2")]);
        // Recipient 3 was still attempted after recipient 2 failed.
        let sent = notifier.sent.lock().unwrap();
        assert!(sent.iter().any(|(r, _)| r.as_str() == "insp-3"));
    }

    #[tokio::test]
    async fn a_hung_send_times_out_and_counts_as_failed() {
        let notifier = Arc::new(ScriptedNotifier {
            hang_for: HashSet::from([AccountId::new("insp-1")]),
            ..ScriptedNotifier::default()
        });
        let dispatcher = Dispatcher::with_timeout(
            inspectors_directory(),
            notifier.clone(),
            Duration::from_millis(20),
        );

        let summary = dispatcher
            .dispatch(&outcome(ReportStatus::PendingInspection, None))
            .await
            .unwrap();

        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.failed, vec![AccountId::new("insp-1")]);
    }

    #[tokio::test]
    async fn rejection_goes_home_to_the_supervisor_with_the_reason() {
        let notifier = Arc::new(ScriptedNotifier::default());
        // Directory deliberately empty: home notifications never consult it.
        let dispatcher = Dispatcher::new(Arc::new(StaticRoleDirectory::new()), notifier.clone());

        let summary = dispatcher
            .dispatch(&outcome(ReportStatus::Rejected, Some("missing welding log")))
            .await
            .unwrap();

        assert_eq!(summary.delivered, 1);
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent[0].0, AccountId::new("sup-1"));
        match &sent[0].1 {
            Notification::ReportRejected { reason, .. } => {
                assert_eq!(reason, "missing welding log")
            }
            other => panic!("expected ReportRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_recipients_delivers_nothing_and_succeeds() {
        let notifier = Arc::new(ScriptedNotifier::default());
        let dispatcher = Dispatcher::new(Arc::new(StaticRoleDirectory::new()), notifier.clone());

        let summary = dispatcher
            .dispatch(&outcome(ReportStatus::PendingInspection, None))
            .await
            .unwrap();

        assert_eq!(summary, DispatchSummary::default());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
