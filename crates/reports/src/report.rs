//! Report entity and the summary view the workflow engine operates on.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use fieldflow_core::{AccountId, DisciplineId, ReportId, WorkflowError, WorkflowResult};

use crate::payload::WorkPayload;
use crate::status::ReportStatus;

/// Signer id + time recorded when a stage acts on a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSignature {
    pub signer: AccountId,
    pub signed_at: DateTime<Utc>,
}

/// One unit of completed work submitted for approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub discipline_id: DisciplineId,
    pub supervisor_id: AccountId,
    /// Free text, not normalized.
    pub brigade_name: String,
    pub corpus_name: String,
    pub work_type_name: String,
    /// Calendar date the work was performed, no time component.
    pub report_date: NaiveDate,
    pub status: ReportStatus,
    pub payload: WorkPayload,
    pub created_at: DateTime<Utc>,
    pub line_review: Option<StageSignature>,
    pub inspection: Option<StageSignature>,
    /// Recorded by inspector approval.
    pub inspection_number: Option<String>,
    pub inspection_notes: Option<String>,
    /// Attachment references recorded at the inspection stage.
    pub inspection_attachments: Vec<String>,
    pub remark_document: Option<String>,
}

/// Input for creating a report. The payload is frozen at submission time;
/// later stages never re-validate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub discipline_id: DisciplineId,
    pub supervisor_id: AccountId,
    pub brigade_name: String,
    pub corpus_name: String,
    pub work_type_name: String,
    pub report_date: NaiveDate,
    pub payload: WorkPayload,
}

impl NewReport {
    /// Check the free-text identity fields before anything touches the store.
    pub fn validate(&self) -> WorkflowResult<()> {
        if self.supervisor_id.as_str().trim().is_empty() {
            return Err(WorkflowError::invalid_input("supervisor id is empty"));
        }
        if self.brigade_name.trim().is_empty() {
            return Err(WorkflowError::invalid_input("brigade name is empty"));
        }
        if self.corpus_name.trim().is_empty() {
            return Err(WorkflowError::invalid_input("corpus name is empty"));
        }
        if self.work_type_name.trim().is_empty() {
            return Err(WorkflowError::invalid_input("work type name is empty"));
        }
        Ok(())
    }
}

/// The slice of a report the engine needs to guard a transition and the
/// dispatcher needs to address its recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: ReportId,
    pub discipline_id: DisciplineId,
    pub supervisor_id: AccountId,
    pub brigade_name: String,
    pub work_type_name: String,
    pub report_date: NaiveDate,
    pub status: ReportStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_report() -> NewReport {
        NewReport {
            discipline_id: DisciplineId::new(1),
            supervisor_id: AccountId::new("sup-1"),
            brigade_name: "B-7".into(),
            corpus_name: "Corpus 3".into(),
            work_type_name: "Welding".into(),
            report_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            payload: WorkPayload::new(10),
        }
    }

    #[test]
    fn validate_accepts_a_complete_report() {
        assert!(new_report().validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_identity_fields() {
        let mut r = new_report();
        r.brigade_name = "  ".into();
        assert!(matches!(
            r.validate(),
            Err(WorkflowError::InvalidInput(_))
        ));

        let mut r = new_report();
        r.supervisor_id = AccountId::new("");
        assert!(r.validate().is_err());
    }
}
