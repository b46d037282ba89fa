//! Workflow engine: guarded report transitions.
//!
//! Each operation is a pure function of (report id, acting account, stage
//! data) over the injected capabilities; there is no per-conversation state
//! and no retry. Authorization is checked against the role directory before
//! any write; the write itself is a single conditional update, and a zero
//! affected-row count surfaces as `StaleTransition` — that is the whole
//! exactly-once story for concurrent actors.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use fieldflow_core::{AccountId, ReportId, WorkflowError, WorkflowResult};
use fieldflow_reports::{
    InspectionApproval, InspectionRejection, NewReport, ReportStatus, ReportSummary, Stage,
    TransitionKind, TransitionOutcome,
};
use fieldflow_routing::{ReviewRole, RoleDirectory};

use crate::store::{ReportStore, TransitionUpdate};

fn role_for(stage: Stage) -> ReviewRole {
    match stage {
        Stage::LineReview => ReviewRole::LineReviewer,
        Stage::Inspection => ReviewRole::Inspector,
    }
}

/// Owns the report status state machine.
pub struct WorkflowEngine {
    store: Arc<dyn ReportStore>,
    directory: Arc<dyn RoleDirectory>,
}

impl WorkflowEngine {
    pub fn new(store: Arc<dyn ReportStore>, directory: Arc<dyn RoleDirectory>) -> Self {
        Self { store, directory }
    }

    /// Create a report directly in `pending-line-review`. The payload is
    /// frozen here; later stages never re-validate it. The returned outcome
    /// fans out to the discipline's line reviewers.
    #[instrument(skip(self, report), fields(supervisor = %report.supervisor_id))]
    pub async fn submit(&self, report: NewReport) -> WorkflowResult<TransitionOutcome> {
        report.validate()?;
        let id = self.store.insert_report(&report).await?;
        info!(report_id = %id, discipline = %report.discipline_id, "report submitted");
        Ok(TransitionOutcome {
            report_id: id,
            new_status: ReportStatus::PendingLineReview,
            discipline_id: report.discipline_id,
            supervisor_id: report.supervisor_id,
            brigade_name: report.brigade_name,
            work_type_name: report.work_type_name,
            report_date: report.report_date,
            rejection_reason: None,
        })
    }

    /// Line reviewer approves: `pending-line-review` → `pending-inspection`.
    pub async fn approve_line_review(
        &self,
        id: ReportId,
        signer: &AccountId,
    ) -> WorkflowResult<TransitionOutcome> {
        self.transition(id, signer, TransitionKind::ApproveLineReview)
            .await
    }

    /// Line reviewer rejects with a reason: `pending-line-review` → `rejected`.
    pub async fn reject_line_review(
        &self,
        id: ReportId,
        signer: &AccountId,
        reason: impl Into<String>,
    ) -> WorkflowResult<TransitionOutcome> {
        self.transition(
            id,
            signer,
            TransitionKind::RejectLineReview {
                reason: reason.into(),
            },
        )
        .await
    }

    /// Inspector approves with an inspection reference:
    /// `pending-inspection` → `approved`.
    pub async fn approve_inspection(
        &self,
        id: ReportId,
        signer: &AccountId,
        approval: InspectionApproval,
    ) -> WorkflowResult<TransitionOutcome> {
        self.transition(id, signer, TransitionKind::ApproveInspection(approval))
            .await
    }

    /// Inspector rejects with a reason and optional attachments:
    /// `pending-inspection` → `rejected`.
    pub async fn reject_inspection(
        &self,
        id: ReportId,
        signer: &AccountId,
        rejection: InspectionRejection,
    ) -> WorkflowResult<TransitionOutcome> {
        self.transition(id, signer, TransitionKind::RejectInspection(rejection))
            .await
    }

    /// Worklist for a reviewer: the reports awaiting their stage in the
    /// discipline they are licensed for.
    pub async fn pending_for(
        &self,
        account: &AccountId,
        role: ReviewRole,
    ) -> WorkflowResult<Vec<ReportSummary>> {
        let Some(discipline) = self.directory.resolve_discipline(account, role).await? else {
            return Err(WorkflowError::Unauthorized);
        };
        Ok(self.store.pending_for_role(discipline, role).await?)
    }

    #[instrument(skip(self, kind), fields(report_id = %id, signer = %signer))]
    async fn transition(
        &self,
        id: ReportId,
        signer: &AccountId,
        kind: TransitionKind,
    ) -> WorkflowResult<TransitionOutcome> {
        // Stage input first: an empty reason must not touch the store.
        kind.validate()?;

        let summary = self
            .store
            .fetch_summary(id)
            .await?
            .ok_or(WorkflowError::NotFound)?;

        // Authorization before any write attempt.
        let role = role_for(kind.stage());
        let licensed = self.directory.resolve_discipline(signer, role).await?;
        if licensed != Some(summary.discipline_id) {
            return Err(WorkflowError::Unauthorized);
        }

        let update = TransitionUpdate::from_kind(&kind, signer, Utc::now());
        let affected = self
            .store
            .apply_transition(id, kind.expected_status(), &update)
            .await?;
        if affected == 0 {
            // Someone else already handled it, or the status moved on.
            return Err(WorkflowError::StaleTransition);
        }

        info!(
            report_id = %id,
            from = %kind.expected_status(),
            to = %kind.target_status(),
            signer = %signer,
            "report transition committed"
        );

        Ok(TransitionOutcome {
            report_id: id,
            new_status: kind.target_status(),
            discipline_id: summary.discipline_id,
            supervisor_id: summary.supervisor_id,
            brigade_name: summary.brigade_name,
            work_type_name: summary.work_type_name,
            report_date: summary.report_date,
            rejection_reason: kind.rejection_reason().map(str::to_owned),
        })
    }
}
