use std::io::Write;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use dashboard_core::{update, AppState, JobOutcome, MonitorSettings, Msg, NovelId, UnitId, ViewKind};
use dashboard_engine::EngineHandle;
use dashboard_logging::{dash_debug, dash_info, dash_warn, set_job_tag};

use super::effects::EffectRunner;
use super::render::Renderer;

/// How long one wait for an engine event may block before re-checking.
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// The event loop: feeds messages through `update`, runs the resulting
/// effects and renders whenever the state changed.
pub struct Dashboard<W: Write> {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer<W>,
    list_loads_seen: usize,
}

impl<W: Write> Dashboard<W> {
    pub fn new(settings: MonitorSettings, engine: EngineHandle, renderer: Renderer<W>) -> Self {
        Self {
            state: AppState::with_settings(settings),
            runner: EffectRunner::new(engine),
            renderer,
            list_loads_seen: 0,
        }
    }

    pub fn set_target_language(&mut self, language: &str) -> Result<()> {
        self.dispatch(Msg::TargetLanguageChanged(language.to_string()))
    }

    /// Opens a novel and waits until both unit lists answered.
    pub fn open_novel(&mut self, novel_id: NovelId) -> Result<()> {
        self.list_loads_seen = 0;
        self.dispatch(Msg::NovelOpened(novel_id))?;
        self.pump_until(|dashboard| dashboard.list_loads_seen >= 2)
    }

    pub fn show_units(&mut self, kind: ViewKind) -> Result<()> {
        self.dispatch(Msg::ViewSwitched(kind))?;
        self.renderer
            .render_units(&self.state.view(), kind)
            .context("writing unit list")
    }

    /// Selects `units` in the `kind` list, starts a job and follows it until
    /// the controls are idle again.
    pub fn translate(&mut self, kind: ViewKind, units: &[UnitId]) -> Result<JobOutcome> {
        self.dispatch(Msg::ViewSwitched(kind))?;
        for &id in units {
            self.dispatch(Msg::UnitToggled { kind, id })?;
        }
        let selected = self.state.current_selection(kind);
        for id in units.iter().filter(|id| !selected.contains(id)) {
            dash_warn!("{kind} {id} is not part of this novel; skipped");
        }

        self.runner.watch_interrupt();
        self.dispatch(Msg::StartRequested)?;
        if !self.state.is_translating() {
            let reason = self
                .state
                .view()
                .notices
                .last()
                .map(|notice| notice.message.clone())
                .unwrap_or_else(|| "nothing to translate".to_string());
            bail!(reason);
        }

        self.follow_job()?;
        self.state
            .last_outcome()
            .cloned()
            .ok_or_else(|| anyhow!("job ended without an outcome"))
    }

    /// Waits until the outcome is recorded and the progress surface is hidden.
    fn follow_job(&mut self) -> Result<()> {
        loop {
            let state = &self.state;
            if state.last_outcome().is_some() && !state.is_translating() && !state.surface().visible
            {
                return Ok(());
            }
            if let Some(msg) = self.runner.next_msg(IDLE_WAIT)? {
                if !self.accept_during_job(msg)? {
                    return Ok(());
                }
            }
        }
    }

    /// Returns false for an interrupt that arrives after the job stopped; the
    /// caller then leaves without waiting out the grace delay.
    fn accept_during_job(&mut self, msg: Msg) -> Result<bool> {
        if matches!(msg, Msg::CancelRequested) && !self.state.is_translating() {
            dash_info!("interrupted again; not waiting for the progress surface to hide");
            return Ok(false);
        }
        self.dispatch(msg)?;
        Ok(true)
    }

    fn pump_until(&mut self, done: impl Fn(&Self) -> bool) -> Result<()> {
        while !done(self) {
            if let Some(msg) = self.runner.next_msg(IDLE_WAIT)? {
                self.dispatch(msg)?;
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: Msg) -> Result<()> {
        if matches!(msg, Msg::BatchesLoaded { .. } | Msg::ChaptersLoaded { .. }) {
            self.list_loads_seen += 1;
        }
        dash_debug!("dispatch {msg:?}");

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.sync_job_tag(&state);
        let was_dirty = state.consume_dirty();
        let view = was_dirty.then(|| state.view());
        self.state = state;

        self.runner.enqueue(effects);
        if let Some(view) = view {
            self.renderer.render(&view).context("writing dashboard output")?;
        }
        Ok(())
    }

    /// Tags log lines with the task id of the job being followed.
    fn sync_job_tag(&self, state: &AppState) {
        let next = state
            .monitor()
            .active()
            .map(|active| active.job.task_id.as_str().to_string());
        if next != dashboard_logging::job_tag() {
            match &next {
                Some(task_id) => dash_info!("following job {task_id}"),
                None => dash_info!("no job running"),
            }
            set_job_tag(next.as_deref());
        }
    }
}
