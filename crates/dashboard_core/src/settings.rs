use std::time::Duration;

pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_millis(2000);
pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_millis(3000);
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(5000);

/// Timing knobs of the monitor and idle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub poll_period: Duration,
    /// Grace delay before the aggregate progress surface is hidden.
    pub hide_delay: Duration,
    pub notice_ttl: Duration,
    /// Consecutive failed polls tolerated before monitoring is torn down.
    pub max_poll_failures: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_period: DEFAULT_POLL_PERIOD,
            hide_delay: DEFAULT_HIDE_DELAY,
            notice_ttl: DEFAULT_NOTICE_TTL,
            max_poll_failures: 0,
        }
    }
}
