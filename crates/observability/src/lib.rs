//! Process-wide tracing setup for fieldflow services.

pub mod tracing;

pub use tracing::{init, init_with_default};
