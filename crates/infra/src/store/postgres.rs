//! Postgres-backed stores and role directory.
//!
//! The transition guard is a single `UPDATE ... WHERE id = $n AND
//! workflow_status = $m`; Postgres reports the affected-row count, which is
//! what makes two concurrent attempts on the same report resolve to exactly
//! one winner. Rejection notes are merged into the `report_data` jsonb column
//! inside the same statement, so there is no partial state to clean up.
//!
//! Schema: `migrations/0001_workflow.sql`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use tracing::instrument;

use fieldflow_core::{AccountId, DisciplineId, ReportId, WorkflowResult};
use fieldflow_reports::{NewReport, ReportStatus, ReportSummary, Stage};
use fieldflow_roster::{Roster, RosterLine};
use fieldflow_routing::{ReviewRole, RoleDirectory};

use super::{ReportStore, RosterStore, StoreError, TransitionUpdate};

/// Report and roster store over a sqlx connection pool.
///
/// Safe to clone and share; the pool handles concurrent connections. No
/// in-process caching: every call goes to the database.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PostgresStore {
    #[instrument(skip(self, report), fields(discipline = %report.discipline_id), err)]
    async fn insert_report(&self, report: &NewReport) -> Result<ReportId, StoreError> {
        let payload = serde_json::to_value(&report.payload)
            .map_err(|e| StoreError::decode("insert_report", e.to_string()))?;

        let row = sqlx::query(
            r#"
            INSERT INTO reports (
                discipline_id,
                supervisor_id,
                brigade_name,
                corpus_name,
                work_type_name,
                report_date,
                workflow_status,
                report_data
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(report.discipline_id.value())
        .bind(report.supervisor_id.as_str())
        .bind(&report.brigade_name)
        .bind(&report.corpus_name)
        .bind(&report.work_type_name)
        .bind(report.report_date)
        .bind(ReportStatus::PendingLineReview.as_str())
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_report", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| StoreError::decode("insert_report", e.to_string()))?;
        Ok(ReportId::new(id))
    }

    #[instrument(skip(self), fields(report_id = %id), err)]
    async fn fetch_summary(&self, id: ReportId) -> Result<Option<ReportSummary>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, discipline_id, supervisor_id, brigade_name,
                   work_type_name, report_date, workflow_status
            FROM reports
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_summary", e))?;

        row.map(|r| summary_from_row(&r, "fetch_summary")).transpose()
    }

    #[instrument(
        skip(self, update),
        fields(report_id = %id, expected = %expected, target = %update.target),
        err
    )]
    async fn apply_transition(
        &self,
        id: ReportId,
        expected: ReportStatus,
        update: &TransitionUpdate,
    ) -> Result<u64, StoreError> {
        // `report_data || patch` merges the rejection note in the same
        // conditional statement that flips the status.
        let patch = update
            .payload_patch
            .clone()
            .unwrap_or_else(|| serde_json::json!({}));

        let result = match update.stage {
            Stage::LineReview => {
                sqlx::query(
                    r#"
                    UPDATE reports
                    SET workflow_status = $1,
                        line_reviewer_id = $2,
                        line_reviewed_at = $3,
                        report_data = report_data || $4
                    WHERE id = $5 AND workflow_status = $6
                    "#,
                )
                .bind(update.target.as_str())
                .bind(update.signer.as_str())
                .bind(update.signed_at)
                .bind(patch)
                .bind(id.value())
                .bind(expected.as_str())
                .execute(&self.pool)
                .await
            }
            Stage::Inspection => {
                let attachments = update
                    .inspection_attachments
                    .as_ref()
                    .map(|a| serde_json::json!(a));
                sqlx::query(
                    r#"
                    UPDATE reports
                    SET workflow_status = $1,
                        inspector_id = $2,
                        inspected_at = $3,
                        inspection_number = COALESCE($4, inspection_number),
                        inspection_notes = COALESCE($5, inspection_notes),
                        inspection_attachments = COALESCE($6, inspection_attachments),
                        remark_document = COALESCE($7, remark_document),
                        report_data = report_data || $8
                    WHERE id = $9 AND workflow_status = $10
                    "#,
                )
                .bind(update.target.as_str())
                .bind(update.signer.as_str())
                .bind(update.signed_at)
                .bind(update.inspection_number.as_deref())
                .bind(update.inspection_notes.as_deref())
                .bind(attachments)
                .bind(update.remark_document.as_deref())
                .bind(patch)
                .bind(id.value())
                .bind(expected.as_str())
                .execute(&self.pool)
                .await
            }
        };

        let result = result.map_err(|e| map_sqlx_error("apply_transition", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn committed_headcount(
        &self,
        brigade_name: &str,
        date: NaiveDate,
    ) -> Result<u32, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM((report_data->>'people_count')::integer), 0) AS committed
            FROM reports
            WHERE brigade_name = $1 AND report_date = $2 AND workflow_status <> $3
            "#,
        )
        .bind(brigade_name)
        .bind(date)
        .bind(ReportStatus::Rejected.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("committed_headcount", e))?;

        let committed: i64 = row
            .try_get("committed")
            .map_err(|e| StoreError::decode("committed_headcount", e.to_string()))?;
        Ok(committed.max(0) as u32)
    }

    #[instrument(skip(self), err)]
    async fn delete_for_brigade_date(
        &self,
        brigade_name: &str,
        date: NaiveDate,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM reports WHERE brigade_name = $1 AND report_date = $2",
        )
        .bind(brigade_name)
        .bind(date)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_for_brigade_date", e))?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(discipline = %discipline, role = %role), err)]
    async fn pending_for_role(
        &self,
        discipline: DisciplineId,
        role: ReviewRole,
    ) -> Result<Vec<ReportSummary>, StoreError> {
        // Line reviewers work submissions oldest-first; inspectors work in the
        // order line review released the reports.
        let (status, sql) = match role {
            ReviewRole::LineReviewer => (
                ReportStatus::PendingLineReview,
                r#"
                SELECT id, discipline_id, supervisor_id, brigade_name,
                       work_type_name, report_date, workflow_status
                FROM reports
                WHERE workflow_status = $1 AND discipline_id = $2
                ORDER BY created_at ASC
                "#,
            ),
            ReviewRole::Inspector => (
                ReportStatus::PendingInspection,
                r#"
                SELECT id, discipline_id, supervisor_id, brigade_name,
                       work_type_name, report_date, workflow_status
                FROM reports
                WHERE workflow_status = $1 AND discipline_id = $2
                ORDER BY line_reviewed_at ASC
                "#,
            ),
        };

        let rows = sqlx::query(sql)
            .bind(status.as_str())
            .bind(discipline.value())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("pending_for_role", e))?;

        rows.iter()
            .map(|r| summary_from_row(r, "pending_for_role"))
            .collect()
    }
}

#[async_trait]
impl RosterStore for PostgresStore {
    #[instrument(skip(self, roster), fields(brigade = %roster.brigade_id(), date = %roster.date()), err)]
    async fn replace_roster(&self, roster: &Roster) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("replace_roster", e))?;

        // Full replacement per (brigade, date); earlier days are untouched.
        sqlx::query(
            "DELETE FROM daily_rosters WHERE brigade_account_id = $1 AND roster_date = $2",
        )
        .bind(roster.brigade_id().as_str())
        .bind(roster.date())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("replace_roster", e))?;

        let row = sqlx::query(
            r#"
            INSERT INTO daily_rosters (brigade_account_id, roster_date)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(roster.brigade_id().as_str())
        .bind(roster.date())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("replace_roster", e))?;

        let roster_id: i64 = row
            .try_get("id")
            .map_err(|e| StoreError::decode("replace_roster", e.to_string()))?;

        for line in roster.lines() {
            sqlx::query(
                r#"
                INSERT INTO daily_roster_lines (roster_id, role_name, people_count)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(roster_id)
            .bind(&line.role_name)
            .bind(line.people_count as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("replace_roster", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("replace_roster", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(brigade = %brigade_id), err)]
    async fn fetch_roster(
        &self,
        brigade_id: &AccountId,
        date: NaiveDate,
    ) -> Result<Option<Roster>, StoreError> {
        let header = sqlx::query(
            "SELECT id FROM daily_rosters WHERE brigade_account_id = $1 AND roster_date = $2",
        )
        .bind(brigade_id.as_str())
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_roster", e))?;

        let Some(header) = header else {
            return Ok(None);
        };
        let roster_id: i64 = header
            .try_get("id")
            .map_err(|e| StoreError::decode("fetch_roster", e.to_string()))?;

        let rows = sqlx::query(
            "SELECT role_name, people_count FROM daily_roster_lines WHERE roster_id = $1",
        )
        .bind(roster_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_roster", e))?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let role_name: String = row
                .try_get("role_name")
                .map_err(|e| StoreError::decode("fetch_roster", e.to_string()))?;
            let people_count: i32 = row
                .try_get("people_count")
                .map_err(|e| StoreError::decode("fetch_roster", e.to_string()))?;
            lines.push(RosterLine {
                role_name,
                people_count: people_count.max(0) as u32,
            });
        }

        let roster = Roster::new(brigade_id.clone(), date, lines)
            .map_err(|e| StoreError::decode("fetch_roster", e.to_string()))?;
        Ok(Some(roster))
    }
}

/// Role directory over the `line_reviewers` / `inspectors` tables.
///
/// Pure read-only projection; no caching beyond the connection pool.
#[derive(Debug, Clone)]
pub struct PostgresRoleDirectory {
    pool: PgPool,
}

impl PostgresRoleDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleDirectory for PostgresRoleDirectory {
    #[instrument(skip(self), fields(account = %account, role = %role), err)]
    async fn resolve_discipline(
        &self,
        account: &AccountId,
        role: ReviewRole,
    ) -> WorkflowResult<Option<DisciplineId>> {
        let sql = match role {
            ReviewRole::LineReviewer => {
                "SELECT discipline_id FROM line_reviewers
                 WHERE account_id = $1 AND is_active AND can_approve"
            }
            ReviewRole::Inspector => {
                "SELECT discipline_id FROM inspectors
                 WHERE account_id = $1 AND is_active"
            }
        };

        let row = sqlx::query(sql)
            .bind(account.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("resolve_discipline", e))?;

        row.map(|r| {
            let id: i32 = r
                .try_get("discipline_id")
                .map_err(|e| StoreError::decode("resolve_discipline", e.to_string()))?;
            Ok::<DisciplineId, StoreError>(DisciplineId::new(id))
        })
        .transpose()
        .map_err(Into::into)
    }

    #[instrument(skip(self), fields(discipline = %discipline, role = %role), err)]
    async fn resolve_recipients(
        &self,
        discipline: DisciplineId,
        role: ReviewRole,
    ) -> WorkflowResult<Vec<AccountId>> {
        let sql = match role {
            ReviewRole::LineReviewer => {
                "SELECT account_id FROM line_reviewers
                 WHERE discipline_id = $1 AND is_active AND can_approve
                 ORDER BY account_id"
            }
            ReviewRole::Inspector => {
                "SELECT account_id FROM inspectors
                 WHERE discipline_id = $1 AND is_active
                 ORDER BY account_id"
            }
        };

        let rows = sqlx::query(sql)
            .bind(discipline.value())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("resolve_recipients", e))?;

        let mut recipients = Vec::with_capacity(rows.len());
        for row in rows {
            let account: String = row
                .try_get("account_id")
                .map_err(|e| StoreError::decode("resolve_recipients", e.to_string()))?;
            recipients.push(AccountId::new(account));
        }
        Ok(recipients)
    }
}

fn summary_from_row(row: &sqlx::postgres::PgRow, operation: &str) -> Result<ReportSummary, StoreError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| StoreError::decode(operation, e.to_string()))?;
    let discipline_id: i32 = row
        .try_get("discipline_id")
        .map_err(|e| StoreError::decode(operation, e.to_string()))?;
    let supervisor_id: String = row
        .try_get("supervisor_id")
        .map_err(|e| StoreError::decode(operation, e.to_string()))?;
    let brigade_name: String = row
        .try_get("brigade_name")
        .map_err(|e| StoreError::decode(operation, e.to_string()))?;
    let work_type_name: String = row
        .try_get("work_type_name")
        .map_err(|e| StoreError::decode(operation, e.to_string()))?;
    let report_date: NaiveDate = row
        .try_get("report_date")
        .map_err(|e| StoreError::decode(operation, e.to_string()))?;
    let status: String = row
        .try_get("workflow_status")
        .map_err(|e| StoreError::decode(operation, e.to_string()))?;
    let status = status
        .parse::<ReportStatus>()
        .map_err(|e| StoreError::decode(operation, e.to_string()))?;

    Ok(ReportSummary {
        id: ReportId::new(id),
        discipline_id: DisciplineId::new(discipline_id),
        supervisor_id: AccountId::new(supervisor_id),
        brigade_name,
        work_type_name,
        report_date,
        status,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::database(operation, db_err.message()),
        sqlx::Error::PoolClosed => StoreError::PoolClosed(operation.to_string()),
        other => StoreError::database(operation, other.to_string()),
    }
}
