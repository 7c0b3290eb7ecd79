use std::collections::BTreeMap;

use crate::idle::IdleController;
use crate::launcher::Launcher;
use crate::notify::Notices;
use crate::projector::{project, Projection};
use crate::view_model::{AppViewModel, BatchRowView, ChapterRowView, JobPhase};
use crate::{
    BatchUnit, ChapterUnit, DashboardError, Effect, JobMonitor, JobOutcome, MonitorSettings,
    NoticeId, NoticeLevel, NovelId, ProgressSnapshot, ProgressSurface, Selection,
    ToggleAffordance, UnitBar, UnitId, ViewKind, ViewMode,
};

pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    novel_id: Option<NovelId>,
    target_language: String,
    view_mode: ViewMode,
    selection: Selection,
    batches: Vec<BatchUnit>,
    chapters: Vec<ChapterUnit>,
    /// Visible batch indicators; at most one entry.
    batch_indicators: BTreeMap<UnitId, UnitBar>,
    /// Chapter bars set by progress polls, overriding the loaded progress.
    chapter_bars: BTreeMap<UnitId, UnitBar>,
    toggle: ToggleAffordance,
    surface: ProgressSurface,
    pub(crate) launcher: Launcher,
    pub(crate) monitor: JobMonitor,
    pub(crate) idle: IdleController,
    pub(crate) notices: Notices,
    last_outcome: Option<JobOutcome>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(MonitorSettings::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: MonitorSettings) -> Self {
        Self {
            novel_id: None,
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            view_mode: ViewMode::default(),
            selection: Selection::new(),
            batches: Vec::new(),
            chapters: Vec::new(),
            batch_indicators: BTreeMap::new(),
            chapter_bars: BTreeMap::new(),
            toggle: ToggleAffordance::Start,
            surface: ProgressSurface::default(),
            launcher: Launcher::default(),
            monitor: JobMonitor::new(&settings),
            idle: IdleController::new(settings.hide_delay),
            notices: Notices::new(settings.notice_ttl),
            last_outcome: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let view = self.view_mode.active();
        let batches = self
            .batches
            .iter()
            .map(|batch| BatchRowView {
                id: batch.id,
                batch_number: batch.batch_number,
                chapter_start: batch.chapter_start,
                chapter_end: batch.chapter_end,
                translated: batch.translated,
                content_preview: batch.content_preview.clone(),
                selected: self.selection.is_selected(ViewKind::Batch, batch.id),
                indicator: self.batch_indicators.get(&batch.id).cloned(),
            })
            .collect();
        let chapters = self
            .chapters
            .iter()
            .map(|chapter| ChapterRowView {
                id: chapter.id,
                chapter_number: chapter.chapter_number,
                title: chapter.title.clone(),
                translated: chapter.translated,
                content_preview: chapter.content_preview.clone(),
                selected: self.selection.is_selected(ViewKind::Chapter, chapter.id),
                bar: self
                    .chapter_bars
                    .get(&chapter.id)
                    .cloned()
                    .unwrap_or_else(|| UnitBar::from_chapter_progress(chapter.progress)),
            })
            .collect();
        let phase = match self.monitor.active() {
            Some(active) => JobPhase::Running {
                task_id: active.job.task_id.clone(),
                kind: active.kind,
            },
            None if self.launcher.is_pending() => JobPhase::Launching,
            None => JobPhase::Idle,
        };

        AppViewModel {
            novel_id: self.novel_id,
            view,
            target_language: self.target_language.clone(),
            toggle: self.toggle,
            surface: self.surface.clone(),
            batches,
            chapters,
            notices: self.notices.active().to_vec(),
            phase,
            last_outcome: self.last_outcome.clone(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn novel_id(&self) -> Option<NovelId> {
        self.novel_id
    }

    pub fn active_view(&self) -> ViewKind {
        self.view_mode.active()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn monitor(&self) -> &JobMonitor {
        &self.monitor
    }

    /// The running flag: a launch is pending or a job is being monitored.
    pub fn is_translating(&self) -> bool {
        self.launcher.is_pending() || self.monitor.is_running()
    }

    /// How the most recent job ended; cleared when a new launch starts.
    pub fn last_outcome(&self) -> Option<&JobOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn surface(&self) -> &ProgressSurface {
        &self.surface
    }

    /// Checked identifiers of `kind` in list order.
    pub fn current_selection(&self, kind: ViewKind) -> Vec<UnitId> {
        self.selection.current_selection(kind, self.display_order(kind))
    }

    pub(crate) fn display_order(&self, kind: ViewKind) -> Vec<UnitId> {
        match kind {
            ViewKind::Batch => self.batches.iter().map(|batch| batch.id).collect(),
            ViewKind::Chapter => self.chapters.iter().map(|chapter| chapter.id).collect(),
        }
    }

    pub(crate) fn target_language(&self) -> &str {
        &self.target_language
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn open_novel(&mut self, novel_id: NovelId) {
        self.novel_id = Some(novel_id);
        self.mark_dirty();
    }

    pub(crate) fn replace_batches(&mut self, batches: Vec<BatchUnit>) {
        self.batches = batches;
        self.batch_indicators.clear();
        self.reapply_view();
    }

    pub(crate) fn replace_chapters(&mut self, chapters: Vec<ChapterUnit>) {
        self.chapters = chapters;
        self.chapter_bars.clear();
        self.reapply_view();
    }

    fn reapply_view(&mut self) {
        let active = self.view_mode.active();
        self.switch_view(active);
    }

    pub(crate) fn switch_view(&mut self, mode: ViewKind) {
        self.view_mode.switch(mode, &mut self.selection);
        self.mark_dirty();
    }

    /// Flips selection of a card in the active list. Units of the hidden
    /// list and unknown identifiers are ignored.
    pub(crate) fn toggle_unit(&mut self, kind: ViewKind, id: UnitId) -> bool {
        if !self.view_mode.is_shown(kind) || !self.display_order(kind).contains(&id) {
            return false;
        }
        self.selection.toggle(kind, id);
        self.mark_dirty();
        true
    }

    pub(crate) fn set_target_language(&mut self, language: String) {
        let language = language.trim();
        if language.is_empty() || language == self.target_language {
            return;
        }
        self.target_language = language.to_string();
        self.mark_dirty();
    }

    /// Optimistic UI shown before the launch request resolves.
    pub(crate) fn show_launching(&mut self) {
        self.toggle = ToggleAffordance::Stop;
        self.surface = ProgressSurface {
            visible: true,
            percent: 0,
            status_text: "Starting translation...".to_string(),
        };
        self.last_outcome = None;
        self.mark_dirty();
    }

    pub(crate) fn set_status_text(&mut self, text: &str) {
        self.surface.status_text = text.to_string();
        self.mark_dirty();
    }

    pub(crate) fn record_outcome(&mut self, outcome: JobOutcome) {
        self.last_outcome = Some(outcome);
        self.mark_dirty();
    }

    /// Updates the aggregate bar and the one card the snapshot names.
    pub(crate) fn apply_snapshot(&mut self, snapshot: &ProgressSnapshot, kind: ViewKind) {
        self.surface.percent = snapshot.percent();
        self.surface.status_text = snapshot.status.clone();
        let projection = project(snapshot, kind, &self.batches);
        self.apply_projection(projection);
        self.mark_dirty();
    }

    fn apply_projection(&mut self, projection: Projection) {
        match projection.kind {
            ViewKind::Batch => {
                let previous = projection
                    .target
                    .and_then(|id| self.batch_indicators.get(&id).cloned());
                self.batch_indicators.clear();
                if let Some(id) = projection.target {
                    let bar = projection
                        .bar
                        .or(previous)
                        .unwrap_or_else(UnitBar::batch_pending);
                    self.batch_indicators.insert(id, bar);
                }
            }
            ViewKind::Chapter => {
                let known = projection
                    .target
                    .filter(|id| self.chapters.iter().any(|chapter| chapter.id == *id));
                if let (Some(id), Some(bar)) = (known, projection.bar) {
                    self.chapter_bars.insert(id, bar);
                }
            }
        }
    }

    /// Idle controller entry point; idempotent.
    pub(crate) fn reset_translation_button(&mut self) -> Effect {
        self.mark_dirty();
        self.idle.reset_translation_button(&mut self.toggle)
    }

    pub(crate) fn hide_surface_if_idle(&mut self) {
        let translating = self.is_translating();
        if self.idle.hide_due(&mut self.surface, translating) {
            self.mark_dirty();
        }
    }

    pub(crate) fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) -> Effect {
        self.mark_dirty();
        self.notices.push(level, message)
    }

    pub(crate) fn report(&mut self, error: &DashboardError) -> Effect {
        self.notify(error.level(), error.to_string())
    }

    pub(crate) fn dismiss_notice(&mut self, id: NoticeId) {
        if self.notices.dismiss(id) {
            self.mark_dirty();
        }
    }
}
