use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use dashboard_logging::{dash_debug, dash_error, dash_info};
use tokio_util::sync::CancellationToken;

use crate::client::{ApiSettings, DashboardApi, ReqwestApi};
use crate::{ApiError, EngineEvent, LaunchSpec, TimerKey};

enum EngineCommand {
    Launch { ticket: u64, spec: LaunchSpec },
    FetchProgress { generation: u64, task_id: String },
    LoadUnits { novel_id: i64 },
    Schedule { key: TimerKey, after: Duration },
    CancelPolls { generation: u64 },
    WatchInterrupt,
}

/// Runs requests and timers on a background tokio runtime and reports back
/// through [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    shutdown: CancellationToken,
}

impl EngineHandle {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let api = ReqwestApi::new(settings)?;
        Ok(Self::with_api(Arc::new(api)))
    }

    pub fn with_api(api: Arc<dyn DashboardApi>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let shutdown = CancellationToken::new();
        let root = shutdown.clone();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    dash_error!("engine runtime failed to start: {err}");
                    return;
                }
            };
            // Poll timers per job generation, so a stop can cancel them.
            let mut poll_timers: HashMap<u64, CancellationToken> = HashMap::new();
            let mut watching_interrupt = false;

            while let Ok(command) = cmd_rx.recv() {
                let event_tx = event_tx.clone();
                match command {
                    EngineCommand::Schedule { key, after } => {
                        let token = match &key {
                            TimerKey::Poll { generation, .. } => poll_timers
                                .entry(*generation)
                                .or_insert_with(|| root.child_token())
                                .clone(),
                            _ => root.child_token(),
                        };
                        runtime.spawn(run_timer(key, after, token, event_tx));
                    }
                    EngineCommand::CancelPolls { generation } => {
                        if let Some(token) = poll_timers.remove(&generation) {
                            dash_debug!("cancelling poll timers of job generation {generation}");
                            token.cancel();
                        }
                    }
                    EngineCommand::WatchInterrupt if !watching_interrupt => {
                        watching_interrupt = true;
                        runtime.spawn(watch_interrupt(root.clone(), event_tx));
                    }
                    EngineCommand::WatchInterrupt => {}
                    command => {
                        let api = api.clone();
                        runtime.spawn(async move {
                            handle_request(api.as_ref(), command, event_tx).await;
                        });
                    }
                }
            }
            root.cancel();
        });

        Self {
            cmd_tx,
            event_rx,
            shutdown,
        }
    }

    pub fn launch(&self, ticket: u64, spec: LaunchSpec) {
        self.send(EngineCommand::Launch { ticket, spec });
    }

    pub fn fetch_progress(&self, generation: u64, task_id: impl Into<String>) {
        self.send(EngineCommand::FetchProgress {
            generation,
            task_id: task_id.into(),
        });
    }

    /// Requests both unit lists of a novel; each answers with its own event.
    pub fn load_units(&self, novel_id: i64) {
        self.send(EngineCommand::LoadUnits { novel_id });
    }

    pub fn schedule(&self, key: TimerKey, after: Duration) {
        self.send(EngineCommand::Schedule { key, after });
    }

    /// Drops any pending poll timer of the given job generation.
    pub fn cancel_polls(&self, generation: u64) {
        self.send(EngineCommand::CancelPolls { generation });
    }

    /// Reports every Ctrl-C as [`EngineEvent::Interrupted`] until the engine
    /// stops. Repeated calls keep a single watcher.
    pub fn watch_interrupt(&self) {
        self.send(EngineCommand::WatchInterrupt);
    }

    /// Fails with `Disconnected` once the engine thread is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            dash_error!("engine thread is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run_timer(
    key: TimerKey,
    after: Duration,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep(after) => {
            let _ = event_tx.send(EngineEvent::TimerFired(key));
        }
    }
}

async fn watch_interrupt(token: CancellationToken, event_tx: mpsc::Sender<EngineEvent>) {
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    dash_info!("interrupt received");
                    if event_tx.send(EngineEvent::Interrupted).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    dash_error!("cannot listen for Ctrl-C: {err}");
                    return;
                }
            },
        }
    }
}

async fn handle_request(
    api: &dyn DashboardApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Launch { ticket, spec } => {
            let result = api.launch(&spec).await;
            let _ = event_tx.send(EngineEvent::Launched { ticket, result });
        }
        EngineCommand::FetchProgress {
            generation,
            task_id,
        } => {
            let result = api.progress(&task_id).await;
            let _ = event_tx.send(EngineEvent::Progress {
                generation,
                task_id,
                result,
            });
        }
        EngineCommand::LoadUnits { novel_id } => {
            let (batches, chapters) = tokio::join!(api.batches(novel_id), api.chapters(novel_id));
            let _ = event_tx.send(EngineEvent::BatchesLoaded {
                novel_id,
                result: batches,
            });
            let _ = event_tx.send(EngineEvent::ChaptersLoaded {
                novel_id,
                result: chapters,
            });
        }
        EngineCommand::Schedule { .. }
        | EngineCommand::CancelPolls { .. }
        | EngineCommand::WatchInterrupt => {}
    }
}
