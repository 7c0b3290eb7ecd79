use std::collections::BTreeSet;

use crate::{UnitId, ViewKind};

/// Checked work units, one set per list.
///
/// Only the active list may hold checked units; [`crate::ViewMode::switch`]
/// clears both sets so a residual selection never leaks across modes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    batches: BTreeSet<UnitId>,
    chapters: BTreeSet<UnitId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id` and returns whether it is now selected.
    pub fn toggle(&mut self, kind: ViewKind, id: UnitId) -> bool {
        let set = self.set_mut(kind);
        if set.remove(&id) {
            false
        } else {
            set.insert(id);
            true
        }
    }

    pub fn is_selected(&self, kind: ViewKind, id: UnitId) -> bool {
        self.set(kind).contains(&id)
    }

    /// Checked identifiers of `kind`, in the order the list displays them.
    pub fn current_selection<I>(&self, kind: ViewKind, display_order: I) -> Vec<UnitId>
    where
        I: IntoIterator<Item = UnitId>,
    {
        let set = self.set(kind);
        display_order
            .into_iter()
            .filter(|id| set.contains(id))
            .collect()
    }

    pub fn clear_all(&mut self) {
        self.batches.clear();
        self.chapters.clear();
    }

    fn set(&self, kind: ViewKind) -> &BTreeSet<UnitId> {
        match kind {
            ViewKind::Batch => &self.batches,
            ViewKind::Chapter => &self.chapters,
        }
    }

    fn set_mut(&mut self, kind: ViewKind) -> &mut BTreeSet<UnitId> {
        match kind {
            ViewKind::Batch => &mut self.batches,
            ViewKind::Chapter => &mut self.chapters,
        }
    }
}
