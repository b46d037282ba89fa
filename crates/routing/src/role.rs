//! Review roles.

use serde::{Deserialize, Serialize};

/// The two reviewer roles a report routes through.
///
/// Each account holds a role for at most one discipline per role table; the
/// submitting supervisor is not a review role (home notifications address the
/// stored supervisor id directly).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewRole {
    /// First-stage approver.
    LineReviewer,
    /// Second-stage, final approver.
    Inspector,
}

impl ReviewRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LineReviewer => "line_reviewer",
            Self::Inspector => "inspector",
        }
    }
}

impl core::fmt::Display for ReviewRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
