use crate::{DashboardError, Effect, Selection, UnitId, ViewKind};

/// Body of a launch request; the kind picks the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub kind: ViewKind,
    pub unit_ids: Vec<UnitId>,
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingLaunch {
    pub(crate) ticket: u64,
    pub(crate) request: LaunchRequest,
}

/// Turns the active selection into a launch request and tracks the one
/// request that may be in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Launcher {
    last_ticket: u64,
    pending: Option<PendingLaunch>,
}

impl Launcher {
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn prepare(
        selection: &Selection,
        kind: ViewKind,
        display_order: impl IntoIterator<Item = UnitId>,
        target_language: &str,
    ) -> Result<LaunchRequest, DashboardError> {
        let unit_ids = selection.current_selection(kind, display_order);
        if unit_ids.is_empty() {
            return Err(DashboardError::Validation { kind });
        }
        Ok(LaunchRequest {
            kind,
            unit_ids,
            target_language: target_language.to_string(),
        })
    }

    pub(crate) fn start(&mut self, request: LaunchRequest) -> Effect {
        self.last_ticket += 1;
        let ticket = self.last_ticket;
        self.pending = Some(PendingLaunch {
            ticket,
            request: request.clone(),
        });
        Effect::LaunchJob { ticket, request }
    }

    /// Takes the pending launch if `ticket` answers it.
    pub(crate) fn resolve(&mut self, ticket: u64) -> Option<PendingLaunch> {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => self.pending.take(),
            _ => None,
        }
    }

    /// Forgets the pending launch; its answer will be ignored.
    pub(crate) fn abandon(&mut self) -> bool {
        self.pending.take().is_some()
    }
}
