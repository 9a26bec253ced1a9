#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Environment decoration collaborator for Gridfall levels.
//!
//! The environment listens for timed events and switches the matching
//! decoration groups on. It never instantiates assets itself; the
//! references it carries are opaque strings resolved by whichever rendering
//! adapter is attached to the host.

use std::time::Duration;

use anyhow::Result;
use gridfall_level::LevelListener;

/// Name under which the environment registers on the level.
pub const LISTENER_NAME: &str = "environment";

/// A set of decoration asset references switched on by one timed event.
#[derive(Clone, Debug)]
pub struct DecorationGroup {
    event: String,
    decorations: Vec<String>,
    active: bool,
}

impl DecorationGroup {
    /// Creates an inactive group bound to the named timed event.
    #[must_use]
    pub fn new(event: String, decorations: Vec<String>) -> Self {
        Self {
            event,
            decorations,
            active: false,
        }
    }

    /// Name of the timed event that activates this group.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Opaque asset references belonging to the group.
    #[must_use]
    pub fn decorations(&self) -> &[String] {
        &self.decorations
    }

    /// Whether the group's timed event has started.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

/// Decoration state for one level, driven entirely by level broadcasts.
#[derive(Debug, Default)]
pub struct Environment {
    groups: Vec<DecorationGroup>,
    finale_reached: bool,
}

impl Environment {
    /// Creates an environment owning the provided decoration groups.
    #[must_use]
    pub fn new(groups: Vec<DecorationGroup>) -> Self {
        Self {
            groups,
            finale_reached: false,
        }
    }

    /// Names of the events whose groups are currently active, in
    /// configuration order.
    #[must_use]
    pub fn active_groups(&self) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|group| group.is_active())
            .map(DecorationGroup::event)
            .collect()
    }

    /// Whether the level announced that its duration was reached.
    #[must_use]
    pub const fn finale_reached(&self) -> bool {
        self.finale_reached
    }
}

impl LevelListener for Environment {
    fn name(&self) -> &'static str {
        LISTENER_NAME
    }

    fn on_timed_event_started(&mut self, name: &str) -> Result<()> {
        for group in &mut self.groups {
            if group.event == name && !group.active {
                group.active = true;
                log::info!("decoration group `{name}` activated");
            }
        }
        Ok(())
    }

    fn on_level_duration_reached(&mut self, duration: Duration) -> Result<()> {
        self.finale_reached = true;
        log::info!(
            "level finale reached after {:.1}s; decoration frozen",
            duration.as_secs_f32()
        );
        Ok(())
    }
}
