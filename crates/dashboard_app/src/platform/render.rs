use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::sync::Arc;

use chrono::Local;
use dashboard_core::{
    AppViewModel, BarTone, NoticeId, NoticeLevel, ProgressSurface, UnitBar, UnitId, ViewKind,
};
use dashboard_engine::ContentDocument;

const BAR_WIDTH: usize = 20;

pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Prints what changed between successive view models as terminal lines.
pub struct Renderer<W: Write> {
    out: W,
    clock: Clock,
    seen_notices: BTreeSet<NoticeId>,
    last_surface: Option<ProgressSurface>,
    last_bars: BTreeMap<(ViewKind, UnitId), UnitBar>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self::with_clock(out, Arc::new(|| Local::now().format("%H:%M:%S").to_string()))
    }

    pub fn with_clock(out: W, clock: Clock) -> Self {
        Self {
            out,
            clock,
            seen_notices: BTreeSet::new(),
            last_surface: None,
            last_bars: BTreeMap::new(),
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        for notice in &view.notices {
            if self.seen_notices.insert(notice.id) {
                writeln!(
                    self.out,
                    "[{}] {:<5} {}",
                    (self.clock)(),
                    level_label(notice.level),
                    notice.message
                )?;
            }
        }

        if view.surface.visible && self.last_surface.as_ref() != Some(&view.surface) {
            writeln!(
                self.out,
                "[{}] {:>3}% {}",
                progress_bar(view.surface.percent),
                view.surface.percent,
                view.surface.status_text
            )?;
        }
        self.last_surface = Some(view.surface.clone());

        self.render_bar_changes(view)?;
        self.out.flush()
    }

    /// Prints the list of the given kind as a table.
    pub fn render_units(&mut self, view: &AppViewModel, kind: ViewKind) -> io::Result<()> {
        match kind {
            ViewKind::Batch => {
                writeln!(
                    self.out,
                    "{:>6}  {:>5}  {:<11}  {:<10}  preview",
                    "id", "batch", "chapters", "status"
                )?;
                for row in &view.batches {
                    writeln!(
                        self.out,
                        "{:>6}  {:>5}  {:<11}  {:<10}  {}",
                        row.id,
                        row.batch_number,
                        format!("{}-{}", row.chapter_start, row.chapter_end),
                        translated_label(row.translated),
                        preview(&row.content_preview)
                    )?;
                }
            }
            ViewKind::Chapter => {
                writeln!(
                    self.out,
                    "{:>6}  {:>7}  {:<10}  {:>4}  title",
                    "id", "chapter", "status", "done"
                )?;
                for row in &view.chapters {
                    writeln!(
                        self.out,
                        "{:>6}  {:>7}  {:<10}  {:>3}%  {}",
                        row.id,
                        row.chapter_number,
                        translated_label(row.translated),
                        row.bar.percent,
                        row.title
                    )?;
                }
            }
        }
        self.out.flush()
    }

    pub fn render_content(&mut self, document: &ContentDocument) -> io::Result<()> {
        writeln!(self.out, "== {} ==", document.title)?;
        writeln!(self.out)?;
        writeln!(self.out, "-- Original --")?;
        writeln!(self.out, "{}", document.original)?;
        writeln!(self.out)?;
        writeln!(self.out, "-- Translation --")?;
        writeln!(self.out, "{}", document.translated_or_placeholder())?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_bar_changes(&mut self, view: &AppViewModel) -> io::Result<()> {
        let mut current = BTreeMap::new();
        for row in &view.batches {
            if let Some(bar) = &row.indicator {
                current.insert((ViewKind::Batch, row.id), bar.clone());
            }
        }
        for row in &view.chapters {
            if row.bar.tone != BarTone::Idle {
                current.insert((ViewKind::Chapter, row.id), row.bar.clone());
            }
        }

        for (key, bar) in &current {
            if self.last_bars.get(key) == Some(bar) {
                continue;
            }
            let name = match key.0 {
                ViewKind::Batch => view
                    .batches
                    .iter()
                    .find(|row| row.id == key.1)
                    .map(|row| format!("Batch {}", row.batch_number)),
                ViewKind::Chapter => view
                    .chapters
                    .iter()
                    .find(|row| row.id == key.1)
                    .map(|row| row.title.clone()),
            };
            if let Some(name) = name {
                writeln!(self.out, "  {name}: {}", bar.label)?;
            }
        }
        self.last_bars = current;
        Ok(())
    }
}

fn level_label(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "OK",
        NoticeLevel::Warning => "WARN",
        NoticeLevel::Danger => "ERROR",
    }
}

fn translated_label(translated: bool) -> &'static str {
    if translated {
        "translated"
    } else {
        "pending"
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 48;
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= LIMIT {
        flat
    } else {
        let cut: String = flat.chars().take(LIMIT).collect();
        format!("{cut}...")
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
