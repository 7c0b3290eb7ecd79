//! Job monitor: owns the active job, its poll schedule and the cancel flag.
//!
//! Polling is a cooperative loop. `begin` schedules one tick; each tick issues
//! one status request; the next tick is scheduled only after that request
//! settled. So at most one tick or one request is outstanding per job, and a
//! response that no longer matches the active job is discarded.

use std::time::Duration;

use crate::{
    Effect, JobStatus, MonitorSettings, ProgressSnapshot, RemoteFailure, TaskId, ViewKind,
};

/// Identifies one launched job. `generation` distinguishes runs that happen to
/// reuse a task id and makes late answers from earlier runs detectable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobRef {
    pub generation: u64,
    pub task_id: TaskId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed { detail: String },
    Cancelled,
    /// Monitoring stopped after failed polls; the server-side job may still run.
    PollFailed,
    /// The job never started.
    LaunchFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonitorError {
    #[error("job {task_id} is still running")]
    AlreadyRunning { task_id: TaskId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    Tick,
    Response,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveJob {
    pub job: JobRef,
    pub kind: ViewKind,
    pub target_language: String,
    awaiting: Awaiting,
    consecutive_failures: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickDecision {
    /// Tick belongs to no active job, or a request is already out.
    Stale,
    /// Cancel flag was set; nothing is sent.
    Cancelled,
    Poll(Effect),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Discarded,
    Continue {
        snapshot: ProgressSnapshot,
        next: Effect,
    },
    Finished {
        snapshot: ProgressSnapshot,
        job: JobRef,
        outcome: JobOutcome,
    },
    Retrying {
        failure: RemoteFailure,
        next: Effect,
    },
    Lost {
        failure: RemoteFailure,
        job: JobRef,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobMonitor {
    poll_period: Duration,
    max_poll_failures: u32,
    active: Option<ActiveJob>,
    cancel_requested: bool,
}

impl JobMonitor {
    pub fn new(settings: &MonitorSettings) -> Self {
        Self {
            poll_period: settings.poll_period,
            max_poll_failures: settings.max_poll_failures,
            active: None,
            cancel_requested: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveJob> {
        self.active.as_ref()
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    /// Enters `Running` and schedules the first tick one period from now.
    pub fn begin(
        &mut self,
        job: JobRef,
        kind: ViewKind,
        target_language: String,
    ) -> Result<Effect, MonitorError> {
        if let Some(active) = &self.active {
            return Err(MonitorError::AlreadyRunning {
                task_id: active.job.task_id.clone(),
            });
        }
        self.cancel_requested = false;
        self.active = Some(ActiveJob {
            job: job.clone(),
            kind,
            target_language,
            awaiting: Awaiting::Tick,
            consecutive_failures: 0,
        });
        Ok(self.schedule(job))
    }

    pub fn on_tick(&mut self, job: &JobRef) -> TickDecision {
        if self.cancel_requested {
            return TickDecision::Cancelled;
        }
        match self.active.as_mut() {
            Some(active) if active.job == *job && active.awaiting == Awaiting::Tick => {
                active.awaiting = Awaiting::Response;
                TickDecision::Poll(Effect::FetchProgress { job: job.clone() })
            }
            _ => TickDecision::Stale,
        }
    }

    pub fn on_response(
        &mut self,
        job: &JobRef,
        result: Result<ProgressSnapshot, RemoteFailure>,
    ) -> PollOutcome {
        if self.cancel_requested {
            return PollOutcome::Discarded;
        }
        let Some(active) = self.active.as_mut() else {
            return PollOutcome::Discarded;
        };
        if active.job != *job || active.awaiting != Awaiting::Response {
            return PollOutcome::Discarded;
        }

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(failure) => {
                active.consecutive_failures += 1;
                if active.consecutive_failures <= self.max_poll_failures {
                    active.awaiting = Awaiting::Tick;
                    let next = self.schedule(job.clone());
                    return PollOutcome::Retrying { failure, next };
                }
                self.active = None;
                return PollOutcome::Lost {
                    failure,
                    job: job.clone(),
                };
            }
        };

        active.consecutive_failures = 0;
        let outcome = match snapshot.job_status() {
            JobStatus::Completed => JobOutcome::Completed,
            JobStatus::Failed { detail } => JobOutcome::Failed { detail },
            JobStatus::InProgress { .. } => {
                active.awaiting = Awaiting::Tick;
                let next = self.schedule(job.clone());
                return PollOutcome::Continue { snapshot, next };
            }
        };
        self.active = None;
        PollOutcome::Finished {
            snapshot,
            job: job.clone(),
            outcome,
        }
    }

    /// Raises the cancel flag and releases the active job. Returns the job
    /// whose schedule must be stopped, or `None` when nothing is running.
    pub fn cancel(&mut self) -> Option<JobRef> {
        let active = self.active.take()?;
        self.cancel_requested = true;
        Some(active.job)
    }

    fn schedule(&self, job: JobRef) -> Effect {
        Effect::SchedulePoll {
            job,
            after: self.poll_period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(generation: u64) -> JobRef {
        JobRef {
            generation,
            task_id: TaskId::new(format!("t{generation}")),
        }
    }

    fn snapshot(status: &str) -> ProgressSnapshot {
        ProgressSnapshot {
            progress: 1,
            total: 2,
            status: status.to_string(),
            current_batch: None,
            current_chapter_id: None,
        }
    }

    fn running_monitor(settings: MonitorSettings) -> JobMonitor {
        let mut monitor = JobMonitor::new(&settings);
        monitor
            .begin(job(1), ViewKind::Batch, "fr".to_string())
            .expect("begin");
        monitor
    }

    #[test]
    fn begin_rejects_second_job() {
        let mut monitor = running_monitor(MonitorSettings::default());
        let err = monitor
            .begin(job(2), ViewKind::Batch, "fr".to_string())
            .unwrap_err();
        assert_eq!(
            err,
            MonitorError::AlreadyRunning {
                task_id: TaskId::new("t1")
            }
        );
    }

    #[test]
    fn duplicate_tick_does_not_issue_second_request() {
        let mut monitor = running_monitor(MonitorSettings::default());
        assert!(matches!(monitor.on_tick(&job(1)), TickDecision::Poll(_)));
        assert_eq!(monitor.on_tick(&job(1)), TickDecision::Stale);
    }

    #[test]
    fn tick_after_cancel_sends_nothing() {
        let mut monitor = running_monitor(MonitorSettings::default());
        assert_eq!(monitor.cancel(), Some(job(1)));
        assert_eq!(monitor.on_tick(&job(1)), TickDecision::Cancelled);
        assert_eq!(monitor.cancel(), None);
    }

    #[test]
    fn failures_are_retried_up_to_the_limit() {
        let settings = MonitorSettings {
            max_poll_failures: 1,
            ..MonitorSettings::default()
        };
        let mut monitor = running_monitor(settings);
        let failure = RemoteFailure::Transport("reset".to_string());

        monitor.on_tick(&job(1));
        let first = monitor.on_response(&job(1), Err(failure.clone()));
        assert!(matches!(first, PollOutcome::Retrying { .. }));

        monitor.on_tick(&job(1));
        let second = monitor.on_response(&job(1), Err(failure));
        assert!(matches!(second, PollOutcome::Lost { .. }));
        assert!(!monitor.is_running());
    }

    #[test]
    fn success_resets_failure_streak() {
        let settings = MonitorSettings {
            max_poll_failures: 1,
            ..MonitorSettings::default()
        };
        let mut monitor = running_monitor(settings);
        let failure = RemoteFailure::Transport("reset".to_string());

        monitor.on_tick(&job(1));
        monitor.on_response(&job(1), Err(failure.clone()));
        monitor.on_tick(&job(1));
        monitor.on_response(&job(1), Ok(snapshot("Translating")));
        monitor.on_tick(&job(1));
        let outcome = monitor.on_response(&job(1), Err(failure));
        assert!(matches!(outcome, PollOutcome::Retrying { .. }));
    }

    #[test]
    fn response_for_other_generation_is_discarded() {
        let mut monitor = running_monitor(MonitorSettings::default());
        monitor.on_tick(&job(1));
        let outcome = monitor.on_response(&job(9), Ok(snapshot("completed")));
        assert_eq!(outcome, PollOutcome::Discarded);
        assert!(monitor.is_running());
    }
}
