#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Gridfall.
//!
//! The [`GridLevel`] object owns the cell grid, the level clock, the
//! timed-event schedule, the listener registry, and the level's random
//! generator. The host drives it with [`GridLevel::tick`] once per frame;
//! collaborators call the query and mutation API directly and receive
//! [`gridfall_core::Event`] broadcasts through registered
//! [`LevelListener`] implementations. Everything is single-threaded and
//! synchronous: a tick completes deterministically for a given `dt`, and
//! fan-outs are strictly nested.

mod broadcast;
mod clock;
mod grid;
mod sample;
mod schedule;

pub use broadcast::LevelListener;
pub use clock::ClockState;
pub use schedule::TimedEvent;

use std::time::Duration;

use glam::Vec2;
use gridfall_core::{CellCoord, CellState, Event, LevelError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use broadcast::Broadcaster;
use clock::LevelClock;
use grid::CellGrid;
use schedule::EventSchedule;

/// Configuration required to construct a [`GridLevel`].
#[derive(Clone, Debug)]
pub struct LevelParams {
    /// Number of grid columns.
    pub width: u32,
    /// Number of grid rows.
    pub height: u32,
    /// Edge length of a square cell in world units.
    pub cell_size: f32,
    /// Simulated time the level runs for.
    pub duration: Duration,
    /// Optional seed string; identical seeds reproduce every random draw.
    pub seed: Option<String>,
    /// Timed events scheduled against the level duration.
    pub timed_events: Vec<TimedEvent>,
}

impl LevelParams {
    /// Creates parameters with no seed and no timed events.
    #[must_use]
    pub fn new(width: u32, height: u32, cell_size: f32, duration: Duration) -> Self {
        Self {
            width,
            height,
            cell_size,
            duration,
            seed: None,
            timed_events: Vec::new(),
        }
    }
}

/// Authoritative level object composing the grid, clock, schedule, and
/// listener registry.
///
/// The level is the single owner of all simulation state. Cell writes go
/// through [`GridLevel::set_cell_state`] so that every actual transition
/// produces exactly one [`Event::CellStateChanged`] broadcast; the clock is
/// mutated only by [`GridLevel::tick`].
#[derive(Debug)]
pub struct GridLevel {
    grid: CellGrid,
    clock: LevelClock,
    schedule: EventSchedule,
    broadcaster: Broadcaster,
    rng: ChaCha8Rng,
    cell_size: f32,
}

impl GridLevel {
    /// Constructs a level from the provided parameters.
    ///
    /// Every cell starts [`CellState::Usable`] and the clock starts
    /// running. Fails when the grid has a zero-sized edge, the cell size is
    /// not a positive finite number, or the duration is zero.
    pub fn new(params: LevelParams) -> Result<Self, LevelError> {
        let LevelParams {
            width,
            height,
            cell_size,
            duration,
            seed,
            timed_events,
        } = params;

        let grid = CellGrid::new(width, height)?;
        let clock = LevelClock::new(duration)?;
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(LevelError::InvalidCellSize { cell_size });
        }

        Ok(Self {
            grid,
            clock,
            schedule: EventSchedule::new(timed_events),
            broadcaster: Broadcaster::default(),
            rng: seeded_rng(seed.as_deref()),
            cell_size,
        })
    }

    /// Advances the level clock by `dt` of simulated time.
    ///
    /// A no-op while the clock is paused or ended. When a broadcast
    /// threshold is crossed the level fans out, in order:
    /// [`Event::LevelTimeChanged`], one [`Event::TimedEventStarted`] per
    /// newly started timed event, and, on the tick that reaches the
    /// duration boundary, exactly one [`Event::LevelDurationReached`].
    pub fn tick(&mut self, dt: Duration) {
        if self.clock.state() != ClockState::Running {
            return;
        }

        self.clock.advance(dt);

        if self.clock.should_broadcast_tick() {
            let elapsed = self.clock.elapsed();
            self.broadcaster
                .broadcast(&Event::LevelTimeChanged { elapsed });

            let mut started = Vec::new();
            self.schedule
                .collect_started(elapsed, self.clock.duration(), &mut started);
            for name in started {
                self.broadcaster
                    .broadcast(&Event::TimedEventStarted { name });
            }
        }

        if self.clock.reached_duration() {
            self.broadcaster.broadcast(&Event::LevelDurationReached {
                duration: self.clock.duration(),
            });
        }
    }

    /// Pauses the level clock. A no-op once the level has ended.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Resumes a paused level clock. A no-op once the level has ended.
    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Returns the current state of the addressed cell.
    pub fn cell_state(&self, cell: CellCoord) -> Result<CellState, LevelError> {
        self.grid.state(cell)
    }

    /// Writes `new_state` and returns the state the cell held before.
    ///
    /// Broadcasts [`Event::CellStateChanged`] if and only if the state
    /// actually changed; writing the current state back is a silent no-op.
    pub fn set_cell_state(
        &mut self,
        cell: CellCoord,
        new_state: CellState,
    ) -> Result<CellState, LevelError> {
        let (old_state, changed) = self.grid.set_state(cell, new_state)?;
        if changed {
            self.broadcaster.broadcast(&Event::CellStateChanged {
                cell,
                old_state,
                new_state,
            });
        }
        Ok(old_state)
    }

    /// Draws up to `count` distinct cells whose state is a member of
    /// `states`.
    ///
    /// Candidates are enumerated in row-major order before the draw, so for
    /// a fixed seed, identical grid contents, and a deterministic call
    /// order the result is reproducible across runs.
    pub fn random_cells_with_state(
        &mut self,
        states: &[CellState],
        count: usize,
    ) -> Vec<CellCoord> {
        let candidates = self.grid.coordinates_with_state_in(states);
        sample::sample_cells(&mut self.rng, candidates, count)
    }

    /// Maps a grid coordinate to the world-space centre of its cell.
    ///
    /// Column `x` grows rightward from a centre-relative origin and row `y`
    /// grows downward with row zero topmost: the cell's grid-relative
    /// corner is `(x - width / 2, (height - 1 - y) - height / 2)` in
    /// integer math, and its centre sits half a cell beyond that corner.
    /// The mapping is pure, so visual collaborators can reproduce any
    /// placement exactly.
    pub fn cell_world_center(&self, cell: CellCoord) -> Result<Vec2, LevelError> {
        let _ = self.grid.checked_index(cell)?;
        let (width, height) = self.grid.dimensions();
        let grid_x = i64::from(cell.x()) - i64::from(width / 2);
        let grid_y = i64::from(height - 1 - cell.y()) - i64::from(height / 2);

        Ok(Vec2::new(
            (grid_x as f32 + 0.5) * self.cell_size,
            (grid_y as f32 + 0.5) * self.cell_size,
        ))
    }

    /// Attaches a listener to the end of the registry.
    ///
    /// Broadcasts reach listeners in attachment order. Zero, one, or many
    /// listeners are all tolerated for every event kind.
    pub fn attach_listener(&mut self, listener: Box<dyn LevelListener>) {
        self.broadcaster.attach(listener);
    }

    /// Detaches and returns the listener registered under `name`, if any.
    pub fn detach_listener(&mut self, name: &str) -> Option<Box<dyn LevelListener>> {
        self.broadcaster.detach(name)
    }

    /// Verifies that every listener named in `required` is attached.
    ///
    /// Fails with [`LevelError::MissingCollaborator`] naming the first
    /// absent listener; hosts call this at startup because the level cannot
    /// function without its environment and gameplay collaborators.
    pub fn ensure_collaborators(&self, required: &[&str]) -> Result<(), LevelError> {
        for name in required {
            if !self.broadcaster.is_attached(name) {
                return Err(LevelError::MissingCollaborator {
                    name: (*name).to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Query functions that provide read-only access to the level state.
pub mod query {
    use std::time::Duration;

    use gridfall_core::{CellCoord, CellState};

    use super::{ClockState, GridLevel};

    /// Grid dimensions as `(width, height)`.
    #[must_use]
    pub fn dimensions(level: &GridLevel) -> (u32, u32) {
        level.grid.dimensions()
    }

    /// Edge length of a square cell in world units.
    #[must_use]
    pub fn cell_size(level: &GridLevel) -> f32 {
        level.cell_size
    }

    /// Simulated time elapsed since the level started.
    #[must_use]
    pub fn elapsed(level: &GridLevel) -> Duration {
        level.clock.elapsed()
    }

    /// Simulated time the level runs for.
    #[must_use]
    pub fn duration(level: &GridLevel) -> Duration {
        level.clock.duration()
    }

    /// Current lifecycle state of the level clock.
    #[must_use]
    pub fn clock_state(level: &GridLevel) -> ClockState {
        level.clock.state()
    }

    /// Names of the timed events that have not started yet, in
    /// configuration order.
    #[must_use]
    pub fn pending_timed_events(level: &GridLevel) -> Vec<&str> {
        level.schedule.pending_names()
    }

    /// Coordinates whose state is a member of `states`, in row-major
    /// order.
    #[must_use]
    pub fn cells_with_state_in(level: &GridLevel, states: &[CellState]) -> Vec<CellCoord> {
        level.grid.coordinates_with_state_in(states)
    }
}

fn seeded_rng(seed: Option<&str>) -> ChaCha8Rng {
    match seed {
        Some(text) => ChaCha8Rng::seed_from_u64(derive_seed(text)),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn derive_seed(seed: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}
