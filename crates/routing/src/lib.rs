//! `fieldflow-routing` — discipline-scoped role resolution.
//!
//! The role directory answers two read-only questions: which discipline an
//! account is licensed to review for, and which accounts may act as a given
//! role for a discipline. It is constructed once per process and handed to the
//! workflow engine and the dispatcher explicitly — no hidden account caches.

pub mod directory;
pub mod role;

pub use directory::{RoleDirectory, StaticRoleDirectory};
pub use role::ReviewRole;
