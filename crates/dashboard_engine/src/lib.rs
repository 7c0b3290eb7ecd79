//! Dashboard engine: the translation server's HTTP client plus the runtime
//! that executes requests and timers for the event loop.
mod client;
mod engine;
mod types;

pub use client::{ApiSettings, DashboardApi, ReqwestApi};
pub use engine::EngineHandle;
pub use types::{
    ApiError, BatchRecord, ChapterRecord, ContentDocument, EngineEvent, FailureKind, LaunchSpec,
    ProgressReport, TimerKey, UnitId, UnitKind, NO_TRANSLATION_PLACEHOLDER,
};
