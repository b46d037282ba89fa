//! Headcount conservation check.
//!
//! A roster revision may not silently drop below what reports for the same
//! brigade and day have already claimed; otherwise the sum of people across
//! reports would exceed the people actually present.

use serde::{Deserialize, Serialize};

/// Result of comparing a newly declared total against the headcount reports
/// have already committed for that brigade and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyCheck {
    pub is_safe: bool,
    /// Sum of `people_count` over all non-rejected reports for the day.
    pub already_committed: u32,
    /// Headroom left after the committed reports; 0 when unsafe.
    pub reserve: u32,
    pub new_total: u32,
}

impl SafetyCheck {
    /// Pure comparison; the committed sum comes from the report store.
    pub fn evaluate(new_total: u32, already_committed: u32) -> Self {
        let is_safe = new_total >= already_committed;
        Self {
            is_safe,
            already_committed,
            reserve: if is_safe { new_total - already_committed } else { 0 },
            new_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrinking_below_committed_headcount_is_unsafe() {
        let check = SafetyCheck::evaluate(10, 12);
        assert!(!check.is_safe);
        assert_eq!(check.already_committed, 12);
        assert_eq!(check.reserve, 0);
    }

    #[test]
    fn surplus_headcount_is_reported_as_reserve() {
        let check = SafetyCheck::evaluate(15, 12);
        assert!(check.is_safe);
        assert_eq!(check.reserve, 3);
    }

    #[test]
    fn exact_match_is_safe_with_no_reserve() {
        let check = SafetyCheck::evaluate(10, 10);
        assert!(check.is_safe);
        assert_eq!(check.reserve, 0);
    }

    proptest::proptest! {
        #[test]
        fn reserve_is_the_surplus_or_zero(new_total in 0u32..10_000, committed in 0u32..10_000) {
            let check = SafetyCheck::evaluate(new_total, committed);
            proptest::prop_assert_eq!(check.is_safe, new_total >= committed);
            if check.is_safe {
                proptest::prop_assert_eq!(check.reserve, new_total - committed);
            } else {
                proptest::prop_assert_eq!(check.reserve, 0);
            }
        }
    }
}
