//! Level clock state machine and broadcast cadence.

use std::mem;
use std::time::Duration;

use gridfall_core::LevelError;

/// Minimum elapsed-time gap between successive time broadcasts.
///
/// Capping the fan-out rate bounds notification overhead on the per-frame
/// path; the duration boundary is still announced the moment it is crossed.
const TIME_BROADCAST_QUANTUM: Duration = Duration::from_secs(1);

/// Lifecycle state of the level clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    /// The clock advances on every tick.
    Running,
    /// The clock holds its elapsed time until resumed.
    Paused,
    /// The clock reached its duration. Terminal: never exited.
    Ended,
}

/// Pausable clock that accumulates simulated time up to a fixed duration.
///
/// Invariant: `elapsed` is monotonically non-decreasing while running and
/// clamped to `duration`; once the clamp triggers the clock enters
/// [`ClockState::Ended`] and never advances again.
#[derive(Clone, Debug)]
pub(crate) struct LevelClock {
    elapsed: Duration,
    duration: Duration,
    last_broadcast: Duration,
    state: ClockState,
    ended_this_tick: bool,
}

impl LevelClock {
    pub(crate) fn new(duration: Duration) -> Result<Self, LevelError> {
        if duration.is_zero() {
            return Err(LevelError::InvalidDuration);
        }

        Ok(Self {
            elapsed: Duration::ZERO,
            duration,
            last_broadcast: Duration::ZERO,
            state: ClockState::Running,
            ended_this_tick: false,
        })
    }

    pub(crate) const fn state(&self) -> ClockState {
        self.state
    }

    pub(crate) const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub(crate) const fn duration(&self) -> Duration {
        self.duration
    }

    /// Advances the clock; a no-op unless the clock is running.
    pub(crate) fn advance(&mut self, dt: Duration) {
        if self.state != ClockState::Running {
            return;
        }

        let advanced = self.elapsed.saturating_add(dt);
        if advanced >= self.duration {
            self.elapsed = self.duration;
            self.state = ClockState::Ended;
            self.ended_this_tick = true;
        } else {
            self.elapsed = advanced;
        }
    }

    /// Reports whether a time broadcast is due, and records it as sent.
    ///
    /// Due when at least [`TIME_BROADCAST_QUANTUM`] of elapsed time has
    /// accumulated since the previous broadcast, or when the duration
    /// boundary is reached and has not been announced yet.
    pub(crate) fn should_broadcast_tick(&mut self) -> bool {
        let quantum_crossed =
            self.elapsed.saturating_sub(self.last_broadcast) >= TIME_BROADCAST_QUANTUM;
        let boundary_unannounced =
            self.elapsed == self.duration && self.last_broadcast != self.duration;

        if quantum_crossed || boundary_unannounced {
            self.last_broadcast = self.elapsed;
            return true;
        }
        false
    }

    /// True exactly once: on the tick whose `advance` entered
    /// [`ClockState::Ended`].
    pub(crate) fn reached_duration(&mut self) -> bool {
        mem::take(&mut self.ended_this_tick)
    }

    pub(crate) fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
        }
    }

    pub(crate) fn resume(&mut self) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Running;
        }
    }
}
