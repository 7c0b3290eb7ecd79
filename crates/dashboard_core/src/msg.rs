use crate::{
    BatchUnit, ChapterUnit, JobRef, NoticeId, NovelId, ProgressSnapshot, RemoteFailure, TaskId,
    UnitId, ViewKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User opened a novel; its unit lists are (re)loaded.
    NovelOpened(NovelId),
    BatchesLoaded {
        novel_id: NovelId,
        result: Result<Vec<BatchUnit>, RemoteFailure>,
    },
    ChaptersLoaded {
        novel_id: NovelId,
        result: Result<Vec<ChapterUnit>, RemoteFailure>,
    },
    /// User picked the batch or chapter list.
    ViewSwitched(ViewKind),
    /// User clicked a unit card.
    UnitToggled { kind: ViewKind, id: UnitId },
    TargetLanguageChanged(String),
    /// User clicked the start/stop control.
    ToggleClicked,
    StartRequested,
    CancelRequested,
    /// Launch endpoint answered.
    JobLaunched {
        ticket: u64,
        result: Result<TaskId, RemoteFailure>,
    },
    /// Poll schedule for `job` elapsed.
    PollTick { job: JobRef },
    /// Status endpoint answered.
    ProgressPolled {
        job: JobRef,
        result: Result<ProgressSnapshot, RemoteFailure>,
    },
    /// Grace delay after a reset elapsed.
    SurfaceHideDue,
    NoticeExpired(NoticeId),
}
