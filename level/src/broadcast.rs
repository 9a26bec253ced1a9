//! Listener registry and synchronous event fan-out.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use gridfall_core::{CellCoord, CellState, Event};

/// Receiver half of the level's broadcast surface.
///
/// Every handler has a default no-op body, so a collaborator opts in to an
/// event kind by defining the matching method; the registry silently skips
/// the rest. Handlers run synchronously during the fan-out and must not
/// call back into the level that delivered the event: fan-outs are strictly
/// nested and reentrancy is not supported.
pub trait LevelListener {
    /// Identity reported in collaborator checks and failure logs.
    fn name(&self) -> &'static str;

    /// Called when the level clock crosses a broadcast threshold.
    fn on_level_time_changed(&mut self, elapsed: Duration) -> Result<()> {
        let _ = elapsed;
        Ok(())
    }

    /// Called exactly once, when the level clock reaches its duration.
    fn on_level_duration_reached(&mut self, duration: Duration) -> Result<()> {
        let _ = duration;
        Ok(())
    }

    /// Called when a cell transitions to a different state.
    fn on_cell_state_changed(
        &mut self,
        cell: CellCoord,
        old_state: CellState,
        new_state: CellState,
    ) -> Result<()> {
        let _ = (cell, old_state, new_state);
        Ok(())
    }

    /// Called when a scheduled timed event crosses its start threshold.
    fn on_timed_event_started(&mut self, name: &str) -> Result<()> {
        let _ = name;
        Ok(())
    }
}

impl<L: LevelListener> LevelListener for Rc<RefCell<L>> {
    fn name(&self) -> &'static str {
        self.borrow().name()
    }

    fn on_level_time_changed(&mut self, elapsed: Duration) -> Result<()> {
        self.borrow_mut().on_level_time_changed(elapsed)
    }

    fn on_level_duration_reached(&mut self, duration: Duration) -> Result<()> {
        self.borrow_mut().on_level_duration_reached(duration)
    }

    fn on_cell_state_changed(
        &mut self,
        cell: CellCoord,
        old_state: CellState,
        new_state: CellState,
    ) -> Result<()> {
        self.borrow_mut()
            .on_cell_state_changed(cell, old_state, new_state)
    }

    fn on_timed_event_started(&mut self, name: &str) -> Result<()> {
        self.borrow_mut().on_timed_event_started(name)
    }
}

/// Ordered registry delivering each event to every attached listener.
#[derive(Default)]
pub(crate) struct Broadcaster {
    listeners: Vec<Box<dyn LevelListener>>,
}

impl Broadcaster {
    pub(crate) fn attach(&mut self, listener: Box<dyn LevelListener>) {
        self.listeners.push(listener);
    }

    pub(crate) fn detach(&mut self, name: &str) -> Option<Box<dyn LevelListener>> {
        let position = self
            .listeners
            .iter()
            .position(|listener| listener.name() == name)?;
        Some(self.listeners.remove(position))
    }

    pub(crate) fn is_attached(&self, name: &str) -> bool {
        self.listeners
            .iter()
            .any(|listener| listener.name() == name)
    }

    /// Delivers `event` synchronously, in registration order.
    ///
    /// A failing handler is reported with the listener's identity and the
    /// event kind; delivery to the remaining listeners continues.
    pub(crate) fn broadcast(&mut self, event: &Event) {
        for listener in &mut self.listeners {
            let outcome = match event {
                Event::LevelTimeChanged { elapsed } => listener.on_level_time_changed(*elapsed),
                Event::LevelDurationReached { duration } => {
                    listener.on_level_duration_reached(*duration)
                }
                Event::CellStateChanged {
                    cell,
                    old_state,
                    new_state,
                } => listener.on_cell_state_changed(*cell, *old_state, *new_state),
                Event::TimedEventStarted { name } => listener.on_timed_event_started(name),
            };

            if let Err(error) = outcome {
                log::error!(
                    "listener `{}` failed to handle {}: {error:#}",
                    listener.name(),
                    event.kind()
                );
            }
        }
    }
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.listeners.iter().map(|listener| listener.name()))
            .finish()
    }
}
