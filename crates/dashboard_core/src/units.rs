use std::fmt;
use std::str::FromStr;

pub type UnitId = i64;
pub type NovelId = i64;

/// Which list of work units is active. Mirrors the kind of a launched job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ViewKind {
    #[default]
    Batch,
    Chapter,
}

impl ViewKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::Batch => "batch",
            ViewKind::Chapter => "chapter",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view kind {0:?} (expected \"batch\" or \"chapter\")")]
pub struct ParseViewKindError(String);

impl FromStr for ViewKind {
    type Err = ParseViewKindError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "batch" | "batches" => Ok(ViewKind::Batch),
            "chapter" | "chapters" => Ok(ViewKind::Chapter),
            _ => Err(ParseViewKindError(raw.to_string())),
        }
    }
}

/// A group of chapters translated together, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchUnit {
    pub id: UnitId,
    pub batch_number: i64,
    pub chapter_start: i64,
    pub chapter_end: i64,
    pub translated: bool,
    pub content_preview: String,
}

/// A single chapter, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterUnit {
    pub id: UnitId,
    pub chapter_number: i64,
    pub title: String,
    pub translated: bool,
    /// Server-side translation progress, clamped to 0..=100.
    pub progress: u8,
    pub content_preview: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarTone {
    /// Nothing translated yet.
    #[default]
    Idle,
    /// Striped, animated bar.
    Active,
    Success,
    Danger,
}

/// Visual state of a per-unit progress bar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnitBar {
    pub percent: u8,
    pub tone: BarTone,
    pub label: String,
}

impl UnitBar {
    /// Bar shown for a chapter straight after the list is loaded.
    pub fn from_chapter_progress(progress: u8) -> Self {
        let percent = progress.min(100);
        let tone = match percent {
            100 => BarTone::Success,
            0 => BarTone::Idle,
            _ => BarTone::Active,
        };
        Self {
            percent,
            tone,
            label: format!("Progress: {percent}%"),
        }
    }

    /// Indicator a batch card reveals before any status has been matched.
    pub fn batch_pending() -> Self {
        Self {
            percent: 0,
            tone: BarTone::Active,
            label: "Currently translating...".to_string(),
        }
    }
}
