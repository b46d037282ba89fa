//! In-memory report and roster store.
//!
//! Intended for tests/dev. The transition guard is a check-and-set under a
//! single mutex guard, which gives the same exactly-once behaviour as the
//! Postgres conditional update.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use fieldflow_core::{AccountId, DisciplineId, ReportId};
use fieldflow_reports::{
    NewReport, Report, ReportStatus, ReportSummary, Stage, StageSignature,
};
use fieldflow_roster::Roster;
use fieldflow_routing::ReviewRole;

use super::{ReportStore, RosterStore, StoreError, TransitionUpdate};

#[derive(Debug, Default)]
struct State {
    reports: HashMap<ReportId, Report>,
    rosters: HashMap<(AccountId, NaiveDate), Roster>,
    next_report_id: i64,
}

/// In-memory store implementing both store capabilities.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full report row, for test assertions.
    pub fn report(&self, id: ReportId) -> Option<Report> {
        self.lock().ok()?.reports.get(&id).cloned()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::database("lock", "in-memory store lock poisoned"))
    }

    fn summary_of(report: &Report) -> ReportSummary {
        ReportSummary {
            id: report.id,
            discipline_id: report.discipline_id,
            supervisor_id: report.supervisor_id.clone(),
            brigade_name: report.brigade_name.clone(),
            work_type_name: report.work_type_name.clone(),
            report_date: report.report_date,
            status: report.status,
        }
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn insert_report(&self, report: &NewReport) -> Result<ReportId, StoreError> {
        let mut state = self.lock()?;
        state.next_report_id += 1;
        let id = ReportId::new(state.next_report_id);
        state.reports.insert(
            id,
            Report {
                id,
                discipline_id: report.discipline_id,
                supervisor_id: report.supervisor_id.clone(),
                brigade_name: report.brigade_name.clone(),
                corpus_name: report.corpus_name.clone(),
                work_type_name: report.work_type_name.clone(),
                report_date: report.report_date,
                status: ReportStatus::PendingLineReview,
                payload: report.payload.clone(),
                created_at: Utc::now(),
                line_review: None,
                inspection: None,
                inspection_number: None,
                inspection_notes: None,
                inspection_attachments: Vec::new(),
                remark_document: None,
            },
        );
        Ok(id)
    }

    async fn fetch_summary(&self, id: ReportId) -> Result<Option<ReportSummary>, StoreError> {
        let state = self.lock()?;
        Ok(state.reports.get(&id).map(Self::summary_of))
    }

    async fn apply_transition(
        &self,
        id: ReportId,
        expected: ReportStatus,
        update: &TransitionUpdate,
    ) -> Result<u64, StoreError> {
        // Guard and mutation happen under one lock acquisition; a concurrent
        // caller sees either the old or the new status, never in between.
        let mut state = self.lock()?;
        let Some(report) = state.reports.get_mut(&id) else {
            return Ok(0);
        };
        if report.status != expected {
            return Ok(0);
        }

        report.status = update.target;
        let signature = StageSignature {
            signer: update.signer.clone(),
            signed_at: update.signed_at,
        };
        match update.stage {
            Stage::LineReview => report.line_review = Some(signature),
            Stage::Inspection => {
                report.inspection = Some(signature);
                if let Some(number) = &update.inspection_number {
                    report.inspection_number = Some(number.clone());
                }
                if let Some(notes) = &update.inspection_notes {
                    report.inspection_notes = Some(notes.clone());
                }
                if let Some(attachments) = &update.inspection_attachments {
                    report.inspection_attachments = attachments.clone();
                }
                if let Some(remark) = &update.remark_document {
                    report.remark_document = Some(remark.clone());
                }
            }
        }

        if let Some(serde_json::Value::Object(patch)) = &update.payload_patch {
            for (key, value) in patch {
                report.payload.extra.insert(key.clone(), value.clone());
            }
        }

        Ok(1)
    }

    async fn committed_headcount(
        &self,
        brigade_name: &str,
        date: NaiveDate,
    ) -> Result<u32, StoreError> {
        let state = self.lock()?;
        Ok(state
            .reports
            .values()
            .filter(|r| {
                r.brigade_name == brigade_name
                    && r.report_date == date
                    && r.status != ReportStatus::Rejected
            })
            .map(|r| r.payload.people_count)
            .sum())
    }

    async fn delete_for_brigade_date(
        &self,
        brigade_name: &str,
        date: NaiveDate,
    ) -> Result<u64, StoreError> {
        let mut state = self.lock()?;
        let before = state.reports.len();
        state
            .reports
            .retain(|_, r| !(r.brigade_name == brigade_name && r.report_date == date));
        Ok((before - state.reports.len()) as u64)
    }

    async fn pending_for_role(
        &self,
        discipline: DisciplineId,
        role: ReviewRole,
    ) -> Result<Vec<ReportSummary>, StoreError> {
        let wanted = match role {
            ReviewRole::LineReviewer => ReportStatus::PendingLineReview,
            ReviewRole::Inspector => ReportStatus::PendingInspection,
        };
        let state = self.lock()?;
        let mut matching: Vec<&Report> = state
            .reports
            .values()
            .filter(|r| r.discipline_id == discipline && r.status == wanted)
            .collect();
        match role {
            ReviewRole::LineReviewer => matching.sort_by_key(|r| r.created_at),
            ReviewRole::Inspector => {
                matching.sort_by_key(|r| r.line_review.as_ref().map(|s| s.signed_at))
            }
        }
        Ok(matching.into_iter().map(Self::summary_of).collect())
    }
}

#[async_trait]
impl RosterStore for InMemoryStore {
    async fn replace_roster(&self, roster: &Roster) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state
            .rosters
            .insert((roster.brigade_id().clone(), roster.date()), roster.clone());
        Ok(())
    }

    async fn fetch_roster(
        &self,
        brigade_id: &AccountId,
        date: NaiveDate,
    ) -> Result<Option<Roster>, StoreError> {
        let state = self.lock()?;
        Ok(state.rosters.get(&(brigade_id.clone(), date)).cloned())
    }
}
