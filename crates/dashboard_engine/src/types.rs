use std::fmt;

use serde::{Deserialize, Serialize};

pub type UnitId = i64;

/// Which list a launch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Batch,
    Chapter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub kind: UnitKind,
    pub unit_ids: Vec<UnitId>,
    pub target_language: String,
}

/// Body of the two launch endpoints.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum LaunchBody<'a> {
    Batches {
        batch_ids: &'a [UnitId],
        target_language: &'a str,
    },
    Chapters {
        chapter_ids: &'a [UnitId],
        target_language: &'a str,
    },
}

impl<'a> LaunchBody<'a> {
    pub(crate) fn for_spec(spec: &'a LaunchSpec) -> Self {
        match spec.kind {
            UnitKind::Batch => LaunchBody::Batches {
                batch_ids: &spec.unit_ids,
                target_language: &spec.target_language,
            },
            UnitKind::Chapter => LaunchBody::Chapters {
                chapter_ids: &spec.unit_ids,
                target_language: &spec.target_language,
            },
        }
    }

    pub(crate) fn path(&self) -> &'static [&'static str] {
        match self {
            LaunchBody::Batches { .. } => &["api", "translate"],
            LaunchBody::Chapters { .. } => &["api", "translate_chapters"],
        }
    }
}

/// Servers have answered with both numeric and string task ids.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTaskId {
    Text(String),
    Number(i64),
}

impl From<RawTaskId> for String {
    fn from(raw: RawTaskId) -> Self {
        match raw {
            RawTaskId::Text(text) => text,
            RawTaskId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LaunchReply {
    #[serde(default)]
    pub task_id: Option<RawTaskId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchRecord {
    pub id: UnitId,
    pub batch_number: i64,
    pub chapter_start: i64,
    pub chapter_end: i64,
    #[serde(default)]
    pub translated: bool,
    #[serde(default)]
    pub content_preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChapterRecord {
    pub id: UnitId,
    pub chapter_number: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub translated: bool,
    #[serde(default)]
    pub translation_progress: Option<f64>,
    #[serde(default)]
    pub content_preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressReport {
    #[serde(default)]
    pub progress: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub current_batch: Option<i64>,
    #[serde(default)]
    pub current_chapter_id: Option<UnitId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchContentReply {
    #[serde(default)]
    pub content: Option<String>,
    pub batch_number: i64,
    pub chapter_start: i64,
    pub chapter_end: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChapterContentReply {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub translated_content: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub chapter_number: Option<i64>,
}

/// Full text of one unit as shown by the content viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDocument {
    pub title: String,
    pub original: String,
    pub translated: Option<String>,
}

pub const NO_TRANSLATION_PLACEHOLDER: &str = "No translation available yet.";

impl ContentDocument {
    pub fn translated_or_placeholder(&self) -> &str {
        match self.translated.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => NO_TRANSLATION_PLACEHOLDER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body was not JSON.
    Decode,
    /// JSON of the wrong shape.
    Unexpected,
    /// The server answered with an `error` field.
    Application,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Unexpected => write!(f, "unexpected response"),
            FailureKind::Application => write!(f, "server error"),
        }
    }
}

/// Identifies a timer owned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Next poll of the job launched under `generation`.
    Poll { generation: u64, task_id: String },
    SurfaceHide,
    Notice(u64),
}

#[derive(Debug)]
pub enum EngineEvent {
    Launched {
        ticket: u64,
        result: Result<String, ApiError>,
    },
    Progress {
        generation: u64,
        task_id: String,
        result: Result<ProgressReport, ApiError>,
    },
    BatchesLoaded {
        novel_id: i64,
        result: Result<Vec<BatchRecord>, ApiError>,
    },
    ChaptersLoaded {
        novel_id: i64,
        result: Result<Vec<ChapterRecord>, ApiError>,
    },
    TimerFired(TimerKey),
    Interrupted,
}
