use std::time::Duration;

use crate::{JobRef, LaunchRequest, NoticeId, NovelId};

/// Side effects requested by [`crate::update`]. The app executes them and
/// reports results back as [`crate::Msg`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch both unit lists for a novel.
    LoadUnits { novel_id: NovelId },
    LaunchJob { ticket: u64, request: LaunchRequest },
    /// Deliver `Msg::PollTick` for `job` once `after` has elapsed.
    SchedulePoll { job: JobRef, after: Duration },
    /// Issue one status request and deliver `Msg::ProgressPolled`.
    FetchProgress { job: JobRef },
    /// Drop any pending tick for `job`.
    StopPolling { job: JobRef },
    /// Deliver `Msg::SurfaceHideDue` once `after` has elapsed.
    ScheduleSurfaceHide { after: Duration },
    DismissNotice { id: NoticeId, after: Duration },
}
