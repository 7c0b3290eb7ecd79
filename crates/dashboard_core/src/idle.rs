use std::time::Duration;

use crate::Effect;

/// Affordance shown on the single start/stop control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleAffordance {
    #[default]
    Start,
    Stop,
}

/// Aggregate progress bar shown while a job is launching or running.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSurface {
    pub visible: bool,
    pub percent: u8,
    pub status_text: String,
}

/// Restores the controls after a job ends for any reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IdleController {
    hide_delay: Duration,
}

impl IdleController {
    pub(crate) fn new(hide_delay: Duration) -> Self {
        Self { hide_delay }
    }

    /// Flips the control back to "start" and schedules the surface hide.
    pub(crate) fn reset_translation_button(&self, toggle: &mut ToggleAffordance) -> Effect {
        *toggle = ToggleAffordance::Start;
        Effect::ScheduleSurfaceHide {
            after: self.hide_delay,
        }
    }

    /// Hides the surface unless a job started while the delay ran.
    /// The running flag is read now, at expiry.
    pub(crate) fn hide_due(&self, surface: &mut ProgressSurface, translating: bool) -> bool {
        if translating || !surface.visible {
            return false;
        }
        surface.visible = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_twice_matches_reset_once() {
        let idle = IdleController::new(Duration::from_millis(3000));
        let mut once = ToggleAffordance::Stop;
        let first = idle.reset_translation_button(&mut once);

        let mut twice = ToggleAffordance::Stop;
        idle.reset_translation_button(&mut twice);
        let second = idle.reset_translation_button(&mut twice);

        assert_eq!(once, twice);
        assert_eq!(first, second);
        assert_eq!(twice, ToggleAffordance::Start);
    }

    #[test]
    fn hide_rechecks_running_flag_at_expiry() {
        let idle = IdleController::new(Duration::from_millis(3000));
        let mut surface = ProgressSurface {
            visible: true,
            percent: 40,
            status_text: "Translating".to_string(),
        };
        assert!(!idle.hide_due(&mut surface, true));
        assert!(surface.visible);
        assert!(idle.hide_due(&mut surface, false));
        assert!(!surface.visible);
        assert!(!idle.hide_due(&mut surface, false));
    }
}
