//! Infrastructure layer: stores, the workflow engine and the roster guard.
//!
//! Everything here composes the pure domain crates with injected capabilities
//! (`ReportStore`, `RosterStore`, `RoleDirectory`, `Notifier`). The Postgres
//! implementations live under `store::postgres`; `store::in_memory` backs
//! tests and single-process setups.

pub mod engine;
pub mod roster_guard;
pub mod store;


pub use engine::WorkflowEngine;
pub use roster_guard::RosterGuard;
pub use store::{ReportStore, RosterStore, StoreError, TransitionUpdate};
