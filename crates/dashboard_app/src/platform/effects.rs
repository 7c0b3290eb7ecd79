use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use dashboard_core::{
    BatchUnit, ChapterUnit, Effect, JobRef, Msg, NoticeId, ProgressSnapshot, RemoteFailure,
    TaskId, ViewKind,
};
use dashboard_engine::{
    ApiError, BatchRecord, ChapterRecord, EngineEvent, EngineHandle, FailureKind, LaunchSpec,
    ProgressReport, TimerKey, UnitKind,
};
use dashboard_logging::{dash_debug, dash_info, dash_warn};

#[derive(Debug, thiserror::Error)]
#[error("engine thread stopped")]
pub struct EngineGone;

/// Executes core effects on the engine and turns engine events back into
/// messages for `update`.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadUnits { novel_id } => {
                    dash_debug!("LoadUnits novel_id={novel_id}");
                    self.engine.load_units(novel_id);
                }
                Effect::LaunchJob { ticket, request } => {
                    dash_info!(
                        "LaunchJob ticket={} kind={} units={:?} lang={}",
                        ticket,
                        request.kind,
                        request.unit_ids,
                        request.target_language
                    );
                    self.engine.launch(
                        ticket,
                        LaunchSpec {
                            kind: map_kind(request.kind),
                            unit_ids: request.unit_ids,
                            target_language: request.target_language,
                        },
                    );
                }
                Effect::SchedulePoll { job, after } => {
                    self.engine.schedule(poll_key(&job), after);
                }
                Effect::FetchProgress { job } => {
                    self.engine
                        .fetch_progress(job.generation, job.task_id.as_str());
                }
                Effect::StopPolling { job } => {
                    dash_debug!("StopPolling generation={}", job.generation);
                    self.engine.cancel_polls(job.generation);
                }
                Effect::ScheduleSurfaceHide { after } => {
                    self.engine.schedule(TimerKey::SurfaceHide, after);
                }
                Effect::DismissNotice { id, after } => {
                    self.engine.schedule(TimerKey::Notice(id.0), after);
                }
            }
        }
    }

    /// Forwards Ctrl-C as a cancel request.
    pub fn watch_interrupt(&self) {
        self.engine.watch_interrupt();
    }

    /// Waits up to `wait` for the next engine event.
    pub fn next_msg(&self, wait: Duration) -> Result<Option<Msg>, EngineGone> {
        match self.engine.recv_timeout(wait) {
            Ok(event) => Ok(Some(map_event(event))),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(EngineGone),
        }
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Launched { ticket, result } => Msg::JobLaunched {
            ticket,
            result: result.map(TaskId::new).map_err(map_failure),
        },
        EngineEvent::Progress {
            generation,
            task_id,
            result,
        } => Msg::ProgressPolled {
            job: JobRef {
                generation,
                task_id: TaskId::new(task_id),
            },
            result: result.map(map_snapshot).map_err(map_failure),
        },
        EngineEvent::BatchesLoaded { novel_id, result } => Msg::BatchesLoaded {
            novel_id,
            result: result
                .map(|records| records.into_iter().map(map_batch).collect())
                .map_err(map_failure),
        },
        EngineEvent::ChaptersLoaded { novel_id, result } => Msg::ChaptersLoaded {
            novel_id,
            result: result
                .map(|records| records.into_iter().map(map_chapter).collect())
                .map_err(map_failure),
        },
        EngineEvent::TimerFired(TimerKey::Poll {
            generation,
            task_id,
        }) => Msg::PollTick {
            job: JobRef {
                generation,
                task_id: TaskId::new(task_id),
            },
        },
        EngineEvent::TimerFired(TimerKey::SurfaceHide) => Msg::SurfaceHideDue,
        EngineEvent::TimerFired(TimerKey::Notice(id)) => Msg::NoticeExpired(NoticeId(id)),
        EngineEvent::Interrupted => Msg::CancelRequested,
    }
}

fn poll_key(job: &JobRef) -> TimerKey {
    TimerKey::Poll {
        generation: job.generation,
        task_id: job.task_id.as_str().to_string(),
    }
}

fn map_kind(kind: ViewKind) -> UnitKind {
    match kind {
        ViewKind::Batch => UnitKind::Batch,
        ViewKind::Chapter => UnitKind::Chapter,
    }
}

pub(crate) fn map_failure(err: ApiError) -> RemoteFailure {
    match err.kind {
        FailureKind::Application => RemoteFailure::Rejected(Some(err.message)),
        FailureKind::Unexpected => {
            dash_warn!("unexpected response: {}", err.message);
            RemoteFailure::Rejected(None)
        }
        _ => RemoteFailure::Transport(err.to_string()),
    }
}

fn map_snapshot(report: ProgressReport) -> ProgressSnapshot {
    ProgressSnapshot {
        progress: report.progress,
        total: report.total,
        status: report.status,
        current_batch: report.current_batch,
        current_chapter_id: report.current_chapter_id,
    }
}

fn map_batch(record: BatchRecord) -> BatchUnit {
    BatchUnit {
        id: record.id,
        batch_number: record.batch_number,
        chapter_start: record.chapter_start,
        chapter_end: record.chapter_end,
        translated: record.translated,
        content_preview: record.content_preview.unwrap_or_default(),
    }
}

fn map_chapter(record: ChapterRecord) -> ChapterUnit {
    let title = match record.title {
        Some(title) if !title.is_empty() => title,
        _ => format!("Chapter {}", record.chapter_number),
    };
    ChapterUnit {
        id: record.id,
        chapter_number: record.chapter_number,
        title,
        translated: record.translated,
        progress: clamp_progress(record.translation_progress),
        content_preview: record.content_preview.unwrap_or_default(),
    }
}

/// Missing or non-finite progress counts as 0.
fn clamp_progress(raw: Option<f64>) -> u8 {
    match raw {
        Some(value) if value.is_finite() => value.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}
