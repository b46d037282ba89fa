//! Structured report payload.
//!
//! Work quantities vary by work type; only `people_count` (and, where present,
//! `volume`) have workflow meaning. Everything else is carried opaquely under
//! its original keys so export tooling sees exactly what was submitted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldflow_core::AccountId;

/// Typed view of the per-report work quantities.
///
/// `people_count` is the one field the roster guard sums; it is a typed access
/// here, never a string-keyed lookup into an untyped map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPayload {
    pub people_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Work-type specific fields (pipe diameter, concrete grade, ...), passed
    /// through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl WorkPayload {
    pub fn new(people_count: u32) -> Self {
        Self {
            people_count,
            volume: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Rejection detail merged into the payload at rejection time.
///
/// Kept inside the payload (not a separate table) so the full history of a
/// rejected report travels with its row. Attachment references and the remark
/// document only occur at the inspection stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionNote {
    pub reason: String,
    pub rejected_by: AccountId,
    pub rejected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark_document: Option<String>,
}

/// Payload key the line-review rejection note is merged under.
pub const LINE_REJECTION_KEY: &str = "line_rejection";
/// Payload key the inspection rejection note is merged under.
pub const INSPECTION_REJECTION_KEY: &str = "inspection_rejection";
