//! Structured view of the progress endpoint's status string.
//!
//! The backend reports job state as free text. The exact literal
//! `"completed"` ends a job successfully, a `"Failed:"` prefix ends it with an
//! error, and anything else is a progress label. [`JobStatus::from_wire`] is
//! the only place that inspects the string for terminal state.

use std::fmt;

use crate::UnitId;

pub const COMPLETED_STATUS: &str = "completed";
pub const FAILED_PREFIX: &str = "Failed:";

/// Opaque job identifier issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// One polled progress report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub progress: u64,
    pub total: u64,
    pub status: String,
    /// Batch *number* (not identifier) currently being processed.
    pub current_batch: Option<i64>,
    pub current_chapter_id: Option<UnitId>,
}

impl ProgressSnapshot {
    pub fn percent(&self) -> u8 {
        aggregate_percent(self.progress, self.total)
    }

    pub fn job_status(&self) -> JobStatus {
        JobStatus::from_wire(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    Failed { detail: String },
    InProgress { label: String },
}

impl JobStatus {
    pub fn from_wire(raw: &str) -> Self {
        if raw == COMPLETED_STATUS {
            JobStatus::Completed
        } else if let Some(detail) = raw.strip_prefix(FAILED_PREFIX) {
            JobStatus::Failed {
                detail: detail.trim_start().to_string(),
            }
        } else {
            JobStatus::InProgress {
                label: raw.to_string(),
            }
        }
    }
}

/// `round(100 * progress / total)` with halves rounded up, clamped to 100.
/// A zero total reports 0%.
pub fn aggregate_percent(progress: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let total = u128::from(total);
    let scaled = (200 * u128::from(progress) + total) / (2 * total);
    scaled.min(100) as u8
}
