use crate::{
    JobOutcome, Notice, NovelId, ProgressSurface, TaskId, ToggleAffordance, UnitBar, UnitId,
    ViewKind,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    /// Launch request sent, no task id yet.
    Launching,
    Running {
        task_id: TaskId,
        kind: ViewKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub novel_id: Option<NovelId>,
    /// List currently shown; the other one is hidden.
    pub view: ViewKind,
    pub target_language: String,
    pub toggle: ToggleAffordance,
    pub surface: ProgressSurface,
    pub batches: Vec<BatchRowView>,
    pub chapters: Vec<ChapterRowView>,
    pub notices: Vec<Notice>,
    pub phase: JobPhase,
    pub last_outcome: Option<JobOutcome>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRowView {
    pub id: UnitId,
    pub batch_number: i64,
    pub chapter_start: i64,
    pub chapter_end: i64,
    pub translated: bool,
    pub content_preview: String,
    pub selected: bool,
    /// Shown only for the batch currently in flight.
    pub indicator: Option<UnitBar>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRowView {
    pub id: UnitId,
    pub chapter_number: i64,
    pub title: String,
    pub translated: bool,
    pub content_preview: String,
    pub selected: bool,
    pub bar: UnitBar,
}
