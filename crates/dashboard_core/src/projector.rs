//! Maps a progress snapshot onto the single card currently in flight.
//!
//! [`project`] is pure; `AppState` applies the resulting [`Projection`] to
//! its card indicators. Per-unit fractional progress is not reported by the
//! backend, so active bars use a fixed percentage.

use crate::{
    BarTone, BatchUnit, ProgressSnapshot, UnitBar, UnitId, ViewKind, COMPLETED_STATUS,
};

pub const BATCH_ACTIVE_PERCENT: u8 = 100;
pub const CHAPTER_ACTIVE_PERCENT: u8 = 50;

const TRANSLATING_MARKER: &str = "Translating";
const ERROR_MARKER: &str = "Error";

/// Per-unit state distinguished by the status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSignal {
    Translating,
    Errored,
    Completed,
}

impl UnitSignal {
    pub fn classify(status: &str) -> Option<Self> {
        if status.contains(TRANSLATING_MARKER) {
            Some(UnitSignal::Translating)
        } else if status.contains(ERROR_MARKER) {
            Some(UnitSignal::Errored)
        } else if status == COMPLETED_STATUS {
            Some(UnitSignal::Completed)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub kind: ViewKind,
    /// Identifier of the card to update; `None` when the locator is absent
    /// or names no known card.
    pub target: Option<UnitId>,
    /// New bar for the target; `None` leaves its current bar alone.
    pub bar: Option<UnitBar>,
}

pub fn project(snapshot: &ProgressSnapshot, kind: ViewKind, batches: &[BatchUnit]) -> Projection {
    let target = match kind {
        ViewKind::Batch => snapshot.current_batch.and_then(|number| {
            batches
                .iter()
                .find(|batch| batch.batch_number == number)
                .map(|batch| batch.id)
        }),
        ViewKind::Chapter => snapshot.current_chapter_id,
    };
    let bar = target
        .and(UnitSignal::classify(&snapshot.status))
        .map(|signal| unit_bar(kind, signal));
    Projection { kind, target, bar }
}

pub fn unit_bar(kind: ViewKind, signal: UnitSignal) -> UnitBar {
    match (kind, signal) {
        (ViewKind::Batch, UnitSignal::Translating) => UnitBar {
            percent: BATCH_ACTIVE_PERCENT,
            tone: BarTone::Active,
            label: "Currently translating...".to_string(),
        },
        (ViewKind::Batch, UnitSignal::Errored) => UnitBar {
            percent: 100,
            tone: BarTone::Danger,
            label: "Translation error".to_string(),
        },
        (ViewKind::Batch, UnitSignal::Completed) => UnitBar {
            percent: 100,
            tone: BarTone::Success,
            label: "Translated".to_string(),
        },
        (ViewKind::Chapter, UnitSignal::Translating) => UnitBar {
            percent: CHAPTER_ACTIVE_PERCENT,
            tone: BarTone::Active,
            label: format!("Progress: {CHAPTER_ACTIVE_PERCENT}% (Translating...)"),
        },
        (ViewKind::Chapter, UnitSignal::Errored) => UnitBar {
            percent: 0,
            tone: BarTone::Danger,
            label: "Progress: 0% (Error)".to_string(),
        },
        (ViewKind::Chapter, UnitSignal::Completed) => UnitBar {
            percent: 100,
            tone: BarTone::Success,
            label: "Progress: 100% (Completed)".to_string(),
        },
    }
}
