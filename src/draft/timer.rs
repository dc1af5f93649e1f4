// Per-turn countdown, modeled as a free-standing state machine.
//
// The timer owns no clock. The engine loop feeds it `tick` once per second
// in production; tests drive it directly. Expiry is observable but commits
// nothing — advancing the turn stays an explicit action.

use serde::{Deserialize, Serialize};

/// Default full duration of a turn, in ticks.
pub const DEFAULT_TURN_DURATION: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerState {
    /// Not counting; the draft has not started or was reset.
    Idle,
    Running,
    Paused,
    /// Reached zero without an action being committed.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownTimer {
    duration: u32,
    remaining: u32,
    state: TimerState,
}

impl CountdownTimer {
    pub fn new(duration: u32) -> Self {
        CountdownTimer {
            duration,
            remaining: duration,
            state: TimerState::Idle,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Begin counting from the full duration. Only meaningful from `Idle`
    /// or `Expired`; a running or paused timer is left alone.
    pub fn start(&mut self) {
        if matches!(self.state, TimerState::Idle | TimerState::Expired) {
            self.remaining = self.duration;
            self.state = TimerState::Running;
        }
    }

    /// Suspend a running timer without touching the remaining count.
    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    /// Resume a paused timer where it left off.
    pub fn resume(&mut self) {
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
        }
    }

    /// Force the remaining count back to full and the timer to `Running`.
    /// Called on every committed turn, whatever state the timer was in.
    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.state = TimerState::Running;
    }

    /// Return the timer to `Idle` at full duration (draft reset or
    /// completion).
    pub fn stop(&mut self) {
        self.remaining = self.duration;
        self.state = TimerState::Idle;
    }

    /// Advance one tick. Returns `true` exactly when this tick drove the
    /// timer from `Running` to `Expired`. Ticks in any other state are
    /// ignored.
    pub fn tick(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = TimerState::Expired;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timer_is_idle_at_full_duration() {
        let timer = CountdownTimer::new(30);
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining(), 30);
    }

    #[test]
    fn start_transitions_idle_to_running() {
        let mut timer = CountdownTimer::new(30);
        timer.start();
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.remaining(), 30);
    }

    #[test]
    fn tick_decrements_while_running() {
        let mut timer = CountdownTimer::new(30);
        timer.start();
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert_eq!(timer.remaining(), 28);
    }

    #[test]
    fn tick_is_ignored_when_not_running() {
        let mut timer = CountdownTimer::new(30);
        assert!(!timer.tick());
        assert_eq!(timer.remaining(), 30);

        timer.start();
        timer.pause();
        assert!(!timer.tick());
        assert_eq!(timer.remaining(), 30);
    }

    #[test]
    fn reaching_zero_expires_exactly_once() {
        let mut timer = CountdownTimer::new(3);
        timer.start();
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(timer.tick(), "third tick should expire");
        assert_eq!(timer.state(), TimerState::Expired);
        assert_eq!(timer.remaining(), 0);
        // Further ticks are no-ops and never report expiry again.
        assert!(!timer.tick());
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn pause_and_resume_preserve_remaining() {
        let mut timer = CountdownTimer::new(30);
        timer.start();
        timer.tick();
        timer.tick();
        timer.pause();
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.remaining(), 28);

        timer.resume();
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.remaining(), 28);
    }

    #[test]
    fn resume_without_pause_is_a_no_op() {
        let mut timer = CountdownTimer::new(30);
        timer.resume();
        assert_eq!(timer.state(), TimerState::Idle);
        timer.start();
        timer.resume();
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[test]
    fn start_from_expired_restarts_full() {
        let mut timer = CountdownTimer::new(2);
        timer.start();
        timer.tick();
        timer.tick();
        assert_eq!(timer.state(), TimerState::Expired);

        timer.start();
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.remaining(), 2);
    }

    #[test]
    fn start_while_running_does_not_refill() {
        let mut timer = CountdownTimer::new(30);
        timer.start();
        timer.tick();
        timer.start();
        assert_eq!(timer.remaining(), 29, "start must not restart a running timer");
    }

    #[test]
    fn reset_refills_and_runs_from_any_state() {
        let mut timer = CountdownTimer::new(10);

        timer.reset();
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.remaining(), 10);

        timer.tick();
        timer.pause();
        timer.reset();
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.remaining(), 10);

        for _ in 0..10 {
            timer.tick();
        }
        assert_eq!(timer.state(), TimerState::Expired);
        timer.reset();
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.remaining(), 10);
    }

    #[test]
    fn stop_returns_to_idle_at_full_duration() {
        let mut timer = CountdownTimer::new(10);
        timer.start();
        timer.tick();
        timer.stop();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining(), 10);
    }
}
