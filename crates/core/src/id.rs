//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Identifier of a chat account (supervisor, line reviewer, inspector or
/// brigade). Opaque external id; never parsed, only compared and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an externally-issued account identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(WorkflowError::invalid_input("AccountId: empty"));
        }
        Ok(Self(s.to_owned()))
    }
}

/// Identifier of a report row (store-assigned, immutable once created).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(i64);

/// Identifier of a trade/discipline catalog entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisciplineId(i32);

macro_rules! impl_int_newtype {
    ($t:ty, $inner:ty, $name:literal) => {
        impl $t {
            pub fn new(id: $inner) -> Self {
                Self(id)
            }

            pub fn value(&self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$inner> for $t {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$t> for $inner {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = WorkflowError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let id = s.parse::<$inner>().map_err(|e| {
                    WorkflowError::invalid_input(format!("{}: {}", $name, e))
                })?;
                Ok(Self(id))
            }
        }
    };
}

impl_int_newtype!(ReportId, i64, "ReportId");
impl_int_newtype!(DisciplineId, i32, "DisciplineId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_rejects_empty_input() {
        assert!("".parse::<AccountId>().is_err());
        assert!("   ".parse::<AccountId>().is_err());
        assert_eq!("7420".parse::<AccountId>().unwrap().as_str(), "7420");
    }

    #[test]
    fn report_id_parses_from_callback_data() {
        assert_eq!("101".parse::<ReportId>().unwrap(), ReportId::new(101));
        assert!("abc".parse::<ReportId>().is_err());
    }
}
