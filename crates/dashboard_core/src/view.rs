use crate::{Selection, ViewKind};

/// Binary batch/chapter switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewMode {
    active: ViewKind,
}

impl ViewMode {
    pub fn active(&self) -> ViewKind {
        self.active
    }

    pub fn is_shown(&self, kind: ViewKind) -> bool {
        self.active == kind
    }

    /// Activates `mode` and unconditionally clears every checked unit.
    pub fn switch(&mut self, mode: ViewKind, selection: &mut Selection) {
        self.active = mode;
        selection.clear_all();
    }
}
