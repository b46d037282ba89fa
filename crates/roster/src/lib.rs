//! `fieldflow-roster` — daily labor rosters and the headcount safety check.
//!
//! Pure domain. The store-facing guard that applies these rules lives in
//! `fieldflow-infra`.

pub mod roster;
pub mod safety;

pub use roster::{Roster, RosterLine};
pub use safety::SafetyCheck;
