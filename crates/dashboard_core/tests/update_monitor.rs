use std::sync::Once;

use dashboard_core::{
    update, AppState, BarTone, BatchUnit, ChapterUnit, Effect, JobOutcome, JobPhase, JobRef,
    MonitorSettings, Msg, NoticeLevel, ProgressSnapshot, RemoteFailure, TaskId,
    ToggleAffordance, ViewKind, BATCH_ACTIVE_PERCENT, CHAPTER_ACTIVE_PERCENT,
    DEFAULT_POLL_PERIOD,
};
use pretty_assertions::assert_eq;

const NOVEL: i64 = 42;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(dashboard_logging::initialize_for_tests);
}

fn loaded(settings: MonitorSettings) -> AppState {
    // Batch ids deliberately differ from batch numbers.
    let batches = (1..=3)
        .map(|n| BatchUnit {
            id: 10 + n,
            batch_number: n,
            chapter_start: n * 10 - 9,
            chapter_end: n * 10,
            translated: false,
            content_preview: String::new(),
        })
        .collect();
    let chapters = (1..=3)
        .map(|n| ChapterUnit {
            id: 200 + n,
            chapter_number: n,
            title: format!("Chapter {n}"),
            translated: false,
            progress: 0,
            content_preview: String::new(),
        })
        .collect();
    let (state, _) = update(AppState::with_settings(settings), Msg::NovelOpened(NOVEL));
    let (state, _) = update(
        state,
        Msg::BatchesLoaded {
            novel_id: NOVEL,
            result: Ok(batches),
        },
    );
    let (state, _) = update(
        state,
        Msg::ChaptersLoaded {
            novel_id: NOVEL,
            result: Ok(chapters),
        },
    );
    state
}

/// Launches a job over the first unit of `kind` and issues the first tick.
fn polling(settings: MonitorSettings, kind: ViewKind) -> (AppState, JobRef) {
    let state = loaded(settings);
    let (state, _) = update(state, Msg::ViewSwitched(kind));
    let id = match kind {
        ViewKind::Batch => 11,
        ViewKind::Chapter => 201,
    };
    let (state, _) = update(state, Msg::UnitToggled { kind, id });
    let (state, _) = update(state, Msg::StartRequested);
    let (state, _) = update(
        state,
        Msg::JobLaunched {
            ticket: 1,
            result: Ok(TaskId::new("t1")),
        },
    );
    let job = JobRef {
        generation: 1,
        task_id: TaskId::new("t1"),
    };
    let (state, effects) = update(state, Msg::PollTick { job: job.clone() });
    assert_eq!(effects, vec![Effect::FetchProgress { job: job.clone() }]);
    (state, job)
}

fn snapshot(
    progress: u64,
    total: u64,
    status: &str,
    current_batch: Option<i64>,
    current_chapter_id: Option<i64>,
) -> ProgressSnapshot {
    ProgressSnapshot {
        progress,
        total,
        status: status.to_string(),
        current_batch,
        current_chapter_id,
    }
}

fn polled(state: AppState, job: &JobRef, snapshot: ProgressSnapshot) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::ProgressPolled {
            job: job.clone(),
            result: Ok(snapshot),
        },
    )
}

fn count_reloads(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::LoadUnits { .. }))
        .count()
}

#[test]
fn progress_updates_aggregate_and_single_batch_card() {
    init_logging();
    let (state, job) = polling(MonitorSettings::default(), ViewKind::Batch);
    let (state, effects) = polled(
        state,
        &job,
        snapshot(1, 3, "Translating batch 2", Some(2), None),
    );

    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            job: job.clone(),
            after: DEFAULT_POLL_PERIOD,
        }]
    );
    let view = state.view();
    assert_eq!(view.surface.percent, 33);
    assert_eq!(view.surface.status_text, "Translating batch 2");
    let shown: Vec<_> = view
        .batches
        .iter()
        .filter_map(|row| row.indicator.as_ref().map(|bar| (row.id, bar.clone())))
        .collect();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].0, 12);
    assert_eq!(shown[0].1.percent, BATCH_ACTIVE_PERCENT);
    assert_eq!(shown[0].1.tone, BarTone::Active);

    // Next batch: the previous indicator is hidden first.
    let (state, _) = update(state, Msg::PollTick { job: job.clone() });
    let (state, _) = polled(
        state,
        &job,
        snapshot(2, 3, "Error translating batch 3", Some(3), None),
    );
    let view = state.view();
    assert_eq!(view.surface.percent, 67);
    let shown: Vec<_> = view
        .batches
        .iter()
        .filter(|row| row.indicator.is_some())
        .map(|row| row.id)
        .collect();
    assert_eq!(shown, vec![13]);
    assert_eq!(
        view.batches[2].indicator.as_ref().map(|bar| bar.tone),
        Some(BarTone::Danger)
    );
}

#[test]
fn unmatched_status_still_reveals_the_batch() {
    init_logging();
    let (state, job) = polling(MonitorSettings::default(), ViewKind::Batch);
    let (state, _) = polled(state, &job, snapshot(0, 3, "Queued", Some(1), None));
    let view = state.view();
    let indicator = view.batches[0].indicator.clone().expect("indicator shown");
    assert_eq!(indicator.label, "Currently translating...");
}

#[test]
fn completed_transitions_once_and_reloads_once() {
    init_logging();
    let (state, job) = polling(MonitorSettings::default(), ViewKind::Batch);
    let (state, effects) = polled(state, &job, snapshot(3, 3, "completed", Some(1), None));

    assert_eq!(count_reloads(&effects), 1);
    assert!(effects.contains(&Effect::LoadUnits { novel_id: NOVEL }));
    let stops = effects
        .iter()
        .filter(|effect| matches!(effect, Effect::StopPolling { .. }))
        .count();
    assert_eq!(stops, 1);
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::SchedulePoll { .. })));

    let view = state.view();
    assert_eq!(view.last_outcome, Some(JobOutcome::Completed));
    assert_eq!(view.phase, JobPhase::Idle);
    assert_eq!(view.toggle, ToggleAffordance::Start);
    assert_eq!(view.surface.percent, 100);
    assert_eq!(view.notices.last().unwrap().level, NoticeLevel::Success);
    assert_eq!(
        view.notices.last().unwrap().message,
        "Translation completed successfully!"
    );

    // A duplicate answer or tick after completion changes nothing.
    let before = state.clone();
    let (state, effects) = polled(state, &job, snapshot(3, 3, "completed", Some(1), None));
    assert!(effects.is_empty());
    assert_eq!(state, before);
    let (state, effects) = update(state, Msg::PollTick { job });
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn failed_status_is_surfaced_verbatim() {
    init_logging();
    let (state, job) = polling(MonitorSettings::default(), ViewKind::Batch);
    let (state, effects) = polled(state, &job, snapshot(1, 3, "Failed: disk full", None, None));

    assert_eq!(count_reloads(&effects), 0);
    let view = state.view();
    assert_eq!(
        view.last_outcome,
        Some(JobOutcome::Failed {
            detail: "disk full".to_string()
        })
    );
    let notice = view.notices.last().expect("failure notice");
    assert_eq!(notice.message, "Failed: disk full");
    assert_eq!(notice.level, NoticeLevel::Danger);
    assert_eq!(view.toggle, ToggleAffordance::Start);
}

#[test]
fn poll_failure_tears_down_monitoring() {
    init_logging();
    let (state, job) = polling(MonitorSettings::default(), ViewKind::Batch);
    let (state, effects) = update(
        state,
        Msg::ProgressPolled {
            job: job.clone(),
            result: Err(RemoteFailure::Transport("connection reset".to_string())),
        },
    );

    assert_eq!(effects.len(), 3);
    assert_eq!(effects[0], Effect::StopPolling { job: job.clone() });
    assert!(matches!(effects[2], Effect::ScheduleSurfaceHide { .. }));
    let view = state.view();
    assert_eq!(view.last_outcome, Some(JobOutcome::PollFailed));
    assert_eq!(
        view.notices.last().unwrap().message,
        "Error tracking translation progress"
    );
    assert_eq!(view.notices.last().unwrap().level, NoticeLevel::Warning);
    assert!(!state.monitor().is_running());

    let (_state, effects) = update(state, Msg::PollTick { job });
    assert!(effects.is_empty());
}

#[test]
fn tolerated_poll_failure_keeps_polling() {
    init_logging();
    let settings = MonitorSettings {
        max_poll_failures: 2,
        ..MonitorSettings::default()
    };
    let (state, job) = polling(settings, ViewKind::Batch);
    let (state, effects) = update(
        state,
        Msg::ProgressPolled {
            job: job.clone(),
            result: Err(RemoteFailure::Rejected(None)),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            job,
            after: DEFAULT_POLL_PERIOD,
        }]
    );
    assert!(state.monitor().is_running());
    assert!(state.view().notices.is_empty());
}

#[test]
fn cancel_stops_polling_and_discards_in_flight_answer() {
    init_logging();
    let (state, job) = polling(MonitorSettings::default(), ViewKind::Batch);
    let (mut state, effects) = update(state, Msg::ToggleClicked);

    assert_eq!(effects[0], Effect::StopPolling { job: job.clone() });
    assert!(matches!(effects[1], Effect::DismissNotice { .. }));
    assert!(matches!(effects[2], Effect::ScheduleSurfaceHide { .. }));
    let view = state.view();
    assert_eq!(view.toggle, ToggleAffordance::Start);
    assert_eq!(view.last_outcome, Some(JobOutcome::Cancelled));
    assert_eq!(view.surface.status_text, "Translation stopped by user");
    assert_eq!(view.notices.last().unwrap().message, "Translation stopped");
    assert!(state.monitor().cancel_requested());
    state.consume_dirty();

    // The request sent before the cancel answers afterwards.
    let before = state.clone();
    let (mut state, effects) = polled(
        state,
        &job,
        snapshot(2, 3, "Translating batch 2", Some(2), None),
    );
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state, before);

    // A tick that was already scheduled issues no request.
    let (state, effects) = update(state, Msg::PollTick { job });
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn chapter_projection_updates_named_chapter_only() {
    init_logging();
    let (state, job) = polling(MonitorSettings::default(), ViewKind::Chapter);
    let (state, _) = polled(
        state,
        &job,
        snapshot(0, 2, "Translating Chapter 2", None, Some(202)),
    );
    let view = state.view();
    assert_eq!(view.chapters[1].bar.percent, CHAPTER_ACTIVE_PERCENT);
    assert_eq!(view.chapters[1].bar.label, "Progress: 50% (Translating...)");
    assert_eq!(view.chapters[0].bar.percent, 0);
    assert_eq!(view.chapters[0].bar.tone, BarTone::Idle);

    let (state, _) = update(state, Msg::PollTick { job: job.clone() });
    let (state, effects) = polled(state, &job, snapshot(2, 2, "completed", None, Some(202)));
    assert_eq!(count_reloads(&effects), 1);
    let view = state.view();
    assert_eq!(view.chapters[1].bar.percent, 100);
    assert_eq!(view.chapters[1].bar.tone, BarTone::Success);
}

#[test]
fn active_view_drives_projection_after_view_switch() {
    init_logging();
    let (state, job) = polling(MonitorSettings::default(), ViewKind::Batch);
    let (state, _) = update(state, Msg::ViewSwitched(ViewKind::Chapter));
    let (state, effects) = polled(
        state,
        &job,
        snapshot(1, 3, "Translating", Some(3), Some(202)),
    );
    assert!(matches!(effects.as_slice(), [Effect::SchedulePoll { .. }]));
    let view = state.view();
    assert_eq!(view.view, ViewKind::Chapter);
    assert_eq!(view.chapters[1].bar.percent, CHAPTER_ACTIVE_PERCENT);
    assert!(view.batches.iter().all(|row| row.indicator.is_none()));

    let (state, _) = update(state, Msg::ViewSwitched(ViewKind::Batch));
    let (state, _) = update(state, Msg::PollTick { job: job.clone() });
    let (state, _) = polled(state, &job, snapshot(2, 3, "Translating", Some(3), Some(203)));
    let view = state.view();
    assert!(view.batches[2].indicator.is_some());
    assert_eq!(view.chapters[2].bar.tone, BarTone::Idle);
}
