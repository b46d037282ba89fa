//! Roster entity: one brigade's declared headcount-by-role for one day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use fieldflow_core::{AccountId, WorkflowError, WorkflowResult};

/// One (role, count) line of a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterLine {
    pub role_name: String,
    pub people_count: u32,
}

/// A brigade's declared headcount for one calendar day.
///
/// Identity is (brigade account, date); each submission fully replaces the
/// previous roster for that day. The total is derived, never stored
/// independently of the lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    brigade_id: AccountId,
    date: NaiveDate,
    lines: Vec<RosterLine>,
}

impl Roster {
    /// Build a roster from its lines. Lines must be non-empty, each with a
    /// named role and a positive count.
    pub fn new(
        brigade_id: AccountId,
        date: NaiveDate,
        lines: Vec<RosterLine>,
    ) -> WorkflowResult<Self> {
        if lines.is_empty() {
            return Err(WorkflowError::invalid_input("roster has no lines"));
        }
        for line in &lines {
            if line.role_name.trim().is_empty() {
                return Err(WorkflowError::invalid_input("roster line has no role name"));
            }
            if line.people_count == 0 {
                return Err(WorkflowError::invalid_input(format!(
                    "roster line '{}' has zero people",
                    line.role_name
                )));
            }
        }
        Ok(Self {
            brigade_id,
            date,
            lines,
        })
    }

    pub fn brigade_id(&self) -> &AccountId {
        &self.brigade_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn lines(&self) -> &[RosterLine] {
        &self.lines
    }

    /// Declared total headcount: the sum of all line counts.
    pub fn total_people(&self) -> u32 {
        self.lines.iter().map(|l| l.people_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(role: &str, count: u32) -> RosterLine {
        RosterLine {
            role_name: role.into(),
            people_count: count,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn total_is_the_sum_of_lines() {
        let roster = Roster::new(
            AccountId::new("brigade-7"),
            day(),
            vec![line("welder", 4), line("fitter", 3), line("rigger", 1)],
        )
        .unwrap();
        assert_eq!(roster.total_people(), 8);
    }

    #[test]
    fn empty_and_zero_count_lines_are_rejected() {
        assert!(Roster::new(AccountId::new("b"), day(), vec![]).is_err());
        assert!(Roster::new(AccountId::new("b"), day(), vec![line("welder", 0)]).is_err());
        assert!(Roster::new(AccountId::new("b"), day(), vec![line(" ", 2)]).is_err());
    }
}
