//! Report approval status.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use fieldflow_core::WorkflowError;

/// Lifecycle status of a report.
///
/// The persisted string forms are read directly by external export tooling
/// (spreadsheets, dashboards); renaming any of the five literals requires a
/// data migration. Inside the workflow code only this enum is branched on,
/// never the raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "pending_master")]
    PendingLineReview,
    #[serde(rename = "pending_kiok")]
    PendingInspection,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "rejected")]
    Rejected,
}

impl ReportStatus {
    /// The persisted/wire form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingLineReview => "pending_master",
            Self::PendingInspection => "pending_kiok",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Terminal statuses never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// All statuses, in lifecycle order.
    pub const ALL: [ReportStatus; 5] = [
        Self::Draft,
        Self::PendingLineReview,
        Self::PendingInspection,
        Self::Approved,
        Self::Rejected,
    ];
}

impl core::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending_master" => Ok(Self::PendingLineReview),
            "pending_kiok" => Ok(Self::PendingInspection),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(WorkflowError::invalid_input(format!(
                "unknown report status '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_strings_are_stable() {
        // Compatibility surface: external tooling reads these literals.
        assert_eq!(ReportStatus::Draft.as_str(), "draft");
        assert_eq!(ReportStatus::PendingLineReview.as_str(), "pending_master");
        assert_eq!(ReportStatus::PendingInspection.as_str(), "pending_kiok");
        assert_eq!(ReportStatus::Approved.as_str(), "approved");
        assert_eq!(ReportStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn every_status_round_trips_through_its_wire_form() {
        for status in ReportStatus::ALL {
            assert_eq!(status.as_str().parse::<ReportStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(serde_json::from_str::<ReportStatus>(&json).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_invalid_input() {
        assert!("pending".parse::<ReportStatus>().is_err());
    }

    proptest::proptest! {
        #[test]
        fn arbitrary_strings_never_alias_a_status(s in "[a-z_]{0,16}") {
            let known = ReportStatus::ALL.iter().any(|st| st.as_str() == s);
            proptest::prop_assert_eq!(s.parse::<ReportStatus>().is_ok(), known);
        }
    }

    #[test]
    fn only_approved_and_rejected_are_terminal() {
        assert!(ReportStatus::Approved.is_terminal());
        assert!(ReportStatus::Rejected.is_terminal());
        assert!(!ReportStatus::Draft.is_terminal());
        assert!(!ReportStatus::PendingLineReview.is_terminal());
        assert!(!ReportStatus::PendingInspection.is_terminal());
    }
}
