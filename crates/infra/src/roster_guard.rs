//! Roster guard: headcount conservation ahead of a roster write.
//!
//! `check_safety` and the subsequent write are **not** atomic as a pair: a
//! report submitted between the two can invalidate the check. Roster
//! submission is a human-rate operation (one brigade lead, a few times a
//! day), so this window is accepted rather than locked around.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use fieldflow_core::WorkflowResult;
use fieldflow_roster::{Roster, SafetyCheck};

use crate::store::{ReportStore, RosterStore};

/// Guards roster revisions against reports that already committed headcount.
pub struct RosterGuard {
    reports: Arc<dyn ReportStore>,
    rosters: Arc<dyn RosterStore>,
}

impl RosterGuard {
    pub fn new(reports: Arc<dyn ReportStore>, rosters: Arc<dyn RosterStore>) -> Self {
        Self { reports, rosters }
    }

    /// Compare a newly declared total against the headcount already committed
    /// by non-rejected reports for that brigade and day. Read-only; the
    /// caller decides between `submit` and `force_override`.
    #[instrument(skip(self))]
    pub async fn check_safety(
        &self,
        brigade_name: &str,
        date: NaiveDate,
        new_total: u32,
    ) -> WorkflowResult<SafetyCheck> {
        let committed = self.reports.committed_headcount(brigade_name, date).await?;
        let check = SafetyCheck::evaluate(new_total, committed);
        if !check.is_safe {
            warn!(
                brigade = brigade_name,
                %date,
                committed,
                new_total,
                "roster revision below committed headcount"
            );
        }
        Ok(check)
    }

    /// The safe path: full replacement of the (brigade, date) roster.
    #[instrument(skip(self, roster), fields(brigade = %roster.brigade_id(), date = %roster.date()))]
    pub async fn submit(&self, roster: &Roster) -> WorkflowResult<()> {
        self.rosters.replace_roster(roster).await?;
        info!(total = roster.total_people(), "roster stored");
        Ok(())
    }

    /// The destructive path: delete every report for the brigade and day
    /// (any status), then write the roster. Irreversible; returns how many
    /// reports were sacrificed.
    #[instrument(skip(self, roster), fields(brigade = %roster.brigade_id(), date = %roster.date()))]
    pub async fn force_override(
        &self,
        brigade_name: &str,
        roster: &Roster,
    ) -> WorkflowResult<u64> {
        let deleted = self
            .reports
            .delete_for_brigade_date(brigade_name, roster.date())
            .await?;
        self.rosters.replace_roster(roster).await?;
        warn!(
            brigade = brigade_name,
            deleted,
            total = roster.total_people(),
            "roster force-written over conflicting reports"
        );
        Ok(deleted)
    }
}
