//! Dashboard core: pure translation-job state machine and view-model helpers.
mod effect;
mod error;
mod idle;
mod launcher;
mod monitor;
mod msg;
mod notify;
mod projector;
mod selection;
mod settings;
mod state;
mod status;
mod units;
mod update;
mod view;
mod view_model;

pub use effect::Effect;
pub use error::{DashboardError, RemoteFailure};
pub use idle::{ProgressSurface, ToggleAffordance};
pub use launcher::LaunchRequest;
pub use monitor::{ActiveJob, JobMonitor, JobOutcome, JobRef, MonitorError};
pub use msg::Msg;
pub use notify::{Notice, NoticeId, NoticeLevel};
pub use projector::{
    project, unit_bar, Projection, UnitSignal, BATCH_ACTIVE_PERCENT, CHAPTER_ACTIVE_PERCENT,
};
pub use selection::Selection;
pub use settings::{
    MonitorSettings, DEFAULT_HIDE_DELAY, DEFAULT_NOTICE_TTL, DEFAULT_POLL_PERIOD,
};
pub use state::{AppState, DEFAULT_TARGET_LANGUAGE};
pub use status::{
    aggregate_percent, JobStatus, ProgressSnapshot, TaskId, COMPLETED_STATUS, FAILED_PREFIX,
};
pub use units::{
    BarTone, BatchUnit, ChapterUnit, NovelId, ParseViewKindError, UnitBar, UnitId, ViewKind,
};
pub use update::update;
pub use view::ViewMode;
pub use view_model::{AppViewModel, BatchRowView, ChapterRowView, JobPhase};
