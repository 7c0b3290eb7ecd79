use std::time::Duration;

use crate::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoticeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub level: NoticeLevel,
    pub message: String,
}

/// Transient, auto-dismissing notifications shown above the lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notices {
    next_id: u64,
    ttl: Duration,
    active: Vec<Notice>,
}

impl Notices {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            next_id: 1,
            ttl,
            active: Vec::new(),
        }
    }

    /// Adds a notice and returns the effect that dismisses it later.
    pub(crate) fn push(&mut self, level: NoticeLevel, message: impl Into<String>) -> Effect {
        let id = NoticeId(self.next_id);
        self.next_id += 1;
        self.active.push(Notice {
            id,
            level,
            message: message.into(),
        });
        Effect::DismissNotice {
            id,
            after: self.ttl,
        }
    }

    pub(crate) fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.active.len();
        self.active.retain(|notice| notice.id != id);
        self.active.len() != before
    }

    pub(crate) fn active(&self) -> &[Notice] {
        &self.active
    }
}
