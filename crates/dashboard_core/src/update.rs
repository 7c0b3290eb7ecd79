use crate::launcher::Launcher;
use crate::monitor::{PollOutcome, TickDecision};
use crate::{
    AppState, DashboardError, Effect, JobOutcome, JobRef, Msg, NoticeLevel, ProgressSnapshot,
    RemoteFailure, TaskId, ViewKind,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::NovelOpened(novel_id) => {
            state.open_novel(novel_id);
            vec![Effect::LoadUnits { novel_id }]
        }
        Msg::BatchesLoaded { novel_id, result } => {
            if state.novel_id() != Some(novel_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(batches) => {
                    state.replace_batches(batches);
                    Vec::new()
                }
                Err(failure) => vec![state.report(&DashboardError::ListLoad {
                    kind: ViewKind::Batch,
                    failure,
                })],
            }
        }
        Msg::ChaptersLoaded { novel_id, result } => {
            if state.novel_id() != Some(novel_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(chapters) => {
                    state.replace_chapters(chapters);
                    Vec::new()
                }
                Err(failure) => vec![state.report(&DashboardError::ListLoad {
                    kind: ViewKind::Chapter,
                    failure,
                })],
            }
        }
        Msg::ViewSwitched(mode) => {
            state.switch_view(mode);
            Vec::new()
        }
        Msg::UnitToggled { kind, id } => {
            state.toggle_unit(kind, id);
            Vec::new()
        }
        Msg::TargetLanguageChanged(language) => {
            state.set_target_language(language);
            Vec::new()
        }
        Msg::ToggleClicked => {
            if state.is_translating() {
                cancel(&mut state)
            } else {
                start(&mut state)
            }
        }
        Msg::StartRequested => start(&mut state),
        Msg::CancelRequested => cancel(&mut state),
        Msg::JobLaunched { ticket, result } => job_launched(&mut state, ticket, result),
        Msg::PollTick { job } => match state.monitor.on_tick(&job) {
            TickDecision::Poll(effect) => vec![effect],
            TickDecision::Cancelled | TickDecision::Stale => Vec::new(),
        },
        Msg::ProgressPolled { job, result } => progress_polled(&mut state, &job, result),
        Msg::SurfaceHideDue => {
            state.hide_surface_if_idle();
            Vec::new()
        }
        Msg::NoticeExpired(id) => {
            state.dismiss_notice(id);
            Vec::new()
        }
    };

    (state, effects)
}

fn start(state: &mut AppState) -> Vec<Effect> {
    // A second job may not start while one is launching or running.
    if state.is_translating() {
        return Vec::new();
    }
    let kind = state.active_view();
    let prepared = Launcher::prepare(
        state.selection(),
        kind,
        state.display_order(kind),
        state.target_language(),
    );
    match prepared {
        Ok(request) => {
            state.show_launching();
            vec![state.launcher.start(request)]
        }
        Err(err) => vec![state.report(&err)],
    }
}

fn cancel(state: &mut AppState) -> Vec<Effect> {
    let mut effects = Vec::new();
    if let Some(job) = state.monitor.cancel() {
        effects.push(Effect::StopPolling { job });
    } else if !state.launcher.abandon() {
        return effects;
    }
    state.set_status_text("Translation stopped by user");
    state.record_outcome(JobOutcome::Cancelled);
    effects.push(state.notify(NoticeLevel::Warning, "Translation stopped"));
    effects.push(state.reset_translation_button());
    effects
}

fn job_launched(
    state: &mut AppState,
    ticket: u64,
    result: Result<TaskId, RemoteFailure>,
) -> Vec<Effect> {
    // Answers to abandoned launches are ignored.
    let Some(pending) = state.launcher.resolve(ticket) else {
        return Vec::new();
    };
    let failure = match result {
        Ok(task_id) => {
            let job = JobRef {
                generation: ticket,
                task_id,
            };
            let request = pending.request;
            match state
                .monitor
                .begin(job, request.kind, request.target_language)
            {
                Ok(effect) => {
                    state.mark_dirty();
                    return vec![effect];
                }
                Err(err) => RemoteFailure::Rejected(Some(err.to_string())),
            }
        }
        Err(failure) => failure,
    };
    state.record_outcome(JobOutcome::LaunchFailed);
    vec![
        state.report(&DashboardError::Launch(failure)),
        state.reset_translation_button(),
    ]
}

fn progress_polled(
    state: &mut AppState,
    job: &JobRef,
    result: Result<ProgressSnapshot, RemoteFailure>,
) -> Vec<Effect> {
    match state.monitor.on_response(job, result) {
        PollOutcome::Discarded => Vec::new(),
        PollOutcome::Continue { snapshot, next } => {
            let kind = state.active_view();
            state.apply_snapshot(&snapshot, kind);
            vec![next]
        }
        PollOutcome::Retrying { next, .. } => vec![next],
        PollOutcome::Finished {
            snapshot,
            job,
            outcome,
        } => {
            let kind = state.active_view();
            state.apply_snapshot(&snapshot, kind);
            let mut effects = vec![Effect::StopPolling { job }];
            match &outcome {
                JobOutcome::Completed => {
                    effects.push(state.notify(
                        NoticeLevel::Success,
                        "Translation completed successfully!",
                    ));
                    effects.push(state.reset_translation_button());
                    // Translated flags and chapter progress changed server-side.
                    if let Some(novel_id) = state.novel_id() {
                        effects.push(Effect::LoadUnits { novel_id });
                    }
                }
                _ => {
                    effects.push(state.report(&DashboardError::JobFailed {
                        status: snapshot.status.clone(),
                    }));
                    effects.push(state.reset_translation_button());
                }
            }
            state.record_outcome(outcome);
            effects
        }
        PollOutcome::Lost { failure, job } => {
            state.record_outcome(JobOutcome::PollFailed);
            vec![
                Effect::StopPolling { job },
                state.report(&DashboardError::Poll(failure)),
                state.reset_translation_button(),
            ]
        }
    }
}
