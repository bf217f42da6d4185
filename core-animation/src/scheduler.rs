//! # Frame Display Scheduler
//!
//! Converts frame-rate metadata into timer decisions without busy-waiting or
//! double-scheduling. The step function is pure: it takes the current
//! schedule, the timer state and "now", and returns the next schedule plus a
//! single action for the caller to apply. This keeps the three control
//! states ("no frame available yet", "frame not yet due", "frame already
//! due") unit-testable without real timers.

use bridge_traits::time::TimeMs;

// ============================================================================
// Schedule State
// ============================================================================

/// Scheduler state between heartbeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// No known due time; poll the shared state for availability.
    #[default]
    Idle,
    /// The next frame's due time is known and pending.
    Pending {
        /// Monotonic timestamp at which the next frame becomes current.
        due: TimeMs,
    },
}

/// Action the façade must apply after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do until the next heartbeat.
    Wait,
    /// Arm the one-shot timer for `due`. Only ever produced when no timer is
    /// currently active.
    Arm { due: TimeMs },
    /// Cancel any armed timer, commit the due frame and emit a display
    /// update.
    Display,
}

/// One scheduler step.
///
/// Availability-poll branch (`Idle`): with no known due time, a `None`
/// availability answer means wait for the next heartbeat; a `Some` answer is
/// immediately re-evaluated as pending so a just-discovered frame does not
/// lose a heartbeat.
///
/// Timed-render branch (`Pending`): a frame not yet due arms the timer
/// (never re-arming an active one); a due frame resets the schedule and
/// requests display.
pub fn step(
    schedule: Schedule,
    timer_active: bool,
    now: TimeMs,
    next_display: Option<TimeMs>,
) -> (Schedule, Action) {
    match schedule {
        Schedule::Idle => match next_display {
            None => (Schedule::Idle, Action::Wait),
            Some(due) => step(Schedule::Pending { due }, timer_active, now, next_display),
        },
        Schedule::Pending { due } => {
            if now < due {
                let action = if timer_active {
                    Action::Wait
                } else {
                    Action::Arm { due }
                };
                (Schedule::Pending { due }, action)
            } else {
                (Schedule::Idle, Action::Display)
            }
        }
    }
}

// ============================================================================
// Frame Timer
// ============================================================================

/// One-shot timer bookkeeping.
///
/// The façade is heartbeat-driven, so the "timer" is an explicit deadline
/// the embedder can observe (via [`Animation::next_wake`]) to schedule its
/// own wakeup between heartbeats. Arming is idempotent: an active timer is
/// never re-armed.
///
/// [`Animation::next_wake`]: crate::Animation::next_wake
#[derive(Debug, Default)]
pub struct FrameTimer {
    deadline: Option<TimeMs>,
}

impl FrameTimer {
    /// Arm the timer for `due` unless it is already active.
    pub fn call_once(&mut self, due: TimeMs) {
        if self.deadline.is_none() {
            self.deadline = Some(due);
        }
    }

    /// Disarm the timer.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// The armed deadline, if any.
    pub fn deadline(&self) -> Option<TimeMs> {
        self.deadline
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_without_availability_waits() {
        assert_eq!(
            step(Schedule::Idle, false, 50, None),
            (Schedule::Idle, Action::Wait)
        );
    }

    #[test]
    fn idle_with_future_frame_arms_immediately() {
        // A just-discovered pending frame is evaluated in the same step.
        assert_eq!(
            step(Schedule::Idle, false, 50, Some(120)),
            (Schedule::Pending { due: 120 }, Action::Arm { due: 120 })
        );
    }

    #[test]
    fn idle_with_overdue_frame_displays_immediately() {
        assert_eq!(
            step(Schedule::Idle, false, 200, Some(120)),
            (Schedule::Idle, Action::Display)
        );
    }

    #[test]
    fn pending_before_due_with_timer_is_noop() {
        assert_eq!(
            step(Schedule::Pending { due: 120 }, true, 60, None),
            (Schedule::Pending { due: 120 }, Action::Wait)
        );
    }

    #[test]
    fn pending_at_due_time_displays() {
        assert_eq!(
            step(Schedule::Pending { due: 120 }, true, 120, None),
            (Schedule::Idle, Action::Display)
        );
    }

    #[test]
    fn timer_never_double_arms() {
        let mut timer = FrameTimer::default();
        timer.call_once(100);
        timer.call_once(300);
        assert_eq!(timer.deadline(), Some(100));

        timer.cancel();
        assert!(!timer.is_active());
        timer.call_once(300);
        assert_eq!(timer.deadline(), Some(300));
    }

    #[test]
    fn repeated_steps_keep_timer_state_stable() {
        let mut timer = FrameTimer::default();
        let mut schedule = Schedule::Idle;
        for now in [10, 20, 30] {
            let (next, action) = step(schedule, timer.is_active(), now, Some(120));
            schedule = next;
            match action {
                Action::Arm { due } => timer.call_once(due),
                Action::Wait => {}
                Action::Display => panic!("frame not due yet"),
            }
        }
        assert_eq!(timer.deadline(), Some(120));
        assert_eq!(schedule, Schedule::Pending { due: 120 });
    }
}
