//! `fieldflow-notify` — notification fan-out for committed transitions.
//!
//! The dispatcher turns a `TransitionOutcome` into one best-effort send per
//! recipient. Content here is logical (ids, names, dates, reasons); transport
//! formatting belongs to the presentation layer behind the `Notifier` trait.

pub mod dispatcher;
pub mod notification;

pub use dispatcher::{DispatchSummary, Dispatcher};
pub use notification::{Notification, Notifier, NotifyError};
