//! Timed-event schedule walked on every time broadcast.

use std::time::Duration;

/// A named event that starts once the level clock crosses a percentage of
/// the configured duration.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedEvent {
    name: String,
    start_percent: f32,
}

impl TimedEvent {
    /// Creates a timed event starting at `start_percent` (0–100) of the
    /// level duration.
    #[must_use]
    pub fn new(name: String, start_percent: f32) -> Self {
        Self {
            name,
            start_percent,
        }
    }

    /// Name broadcast when the event starts.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start threshold as a percentage of the level duration.
    #[must_use]
    pub const fn start_percent(&self) -> f32 {
        self.start_percent
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EventPhase {
    Pending,
    Started,
}

#[derive(Clone, Debug)]
struct ScheduledEvent {
    event: TimedEvent,
    phase: EventPhase,
}

/// Tracks which configured events have started.
///
/// Each entry is an explicit `Pending -> Started` transition, so an event
/// firing at most once is structural rather than a convention.
#[derive(Clone, Debug, Default)]
pub(crate) struct EventSchedule {
    entries: Vec<ScheduledEvent>,
}

impl EventSchedule {
    pub(crate) fn new(events: Vec<TimedEvent>) -> Self {
        Self {
            entries: events
                .into_iter()
                .map(|event| ScheduledEvent {
                    event,
                    phase: EventPhase::Pending,
                })
                .collect(),
        }
    }

    /// Marks every pending event whose threshold `elapsed` has crossed as
    /// started, appending their names to `out` in configuration order.
    pub(crate) fn collect_started(
        &mut self,
        elapsed: Duration,
        duration: Duration,
        out: &mut Vec<String>,
    ) {
        let progress = elapsed.as_secs_f32() / duration.as_secs_f32() * 100.0;
        for entry in &mut self.entries {
            if entry.phase == EventPhase::Pending && progress >= entry.event.start_percent() {
                entry.phase = EventPhase::Started;
                out.push(entry.event.name().to_owned());
            }
        }
    }

    /// Names of the events that have not started yet, in configuration
    /// order.
    pub(crate) fn pending_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.phase == EventPhase::Pending)
            .map(|entry| entry.event.name())
            .collect()
    }
}
