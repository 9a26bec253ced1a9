#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridfall level simulation.
//!
//! This crate defines the vocabulary that connects the authoritative level
//! object, its registered collaborators, and the host adapters: the closed
//! set of cell states, grid coordinates, the tagged [`Event`] payloads that
//! the level broadcasts to listeners, and the error taxonomy surfaced by the
//! level's query and mutation API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gameplay state held by a single grid cell.
///
/// Every cell carries exactly one state at all times; freshly constructed
/// grids mark every cell [`CellState::Usable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// The cell is permanently impassable, typically because an obstacle
    /// occupies it.
    Blocked,
    /// The cell is free for gameplay to claim.
    Usable,
    /// The cell has been claimed by gameplay and is no longer free.
    Used,
    /// The cell's occupant was destroyed and the cell is out of play.
    Destroyed,
    /// The cell's occupant took damage but remains in play.
    Damaged,
    /// The cell hosts an anomaly effect.
    Anomaly,
}

impl CellState {
    /// Every cell state in declaration order.
    pub const ALL: [CellState; 6] = [
        CellState::Blocked,
        CellState::Usable,
        CellState::Used,
        CellState::Destroyed,
        CellState::Damaged,
        CellState::Anomaly,
    ];
}

/// Location of a single grid cell.
///
/// Column `x` grows rightward and row `y` grows downward; row zero is the
/// topmost row. Negative coordinates are unrepresentable by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Difficulty rating attached to a level definition.
///
/// Carried through configuration for collaborators; the core simulation
/// never interprets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Forgiving pacing intended for the opening levels.
    Easy,
    /// The baseline experience.
    Normal,
    /// Tightened pacing for practised players.
    Hard,
    /// The hardest rating the campaign ships with.
    Nightmare,
}

/// Events broadcast by the level to its registered listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The level clock crossed a broadcast threshold.
    LevelTimeChanged {
        /// Simulated time elapsed since the level started.
        elapsed: Duration,
    },
    /// The level clock reached its configured duration. Broadcast exactly
    /// once for the lifetime of a level.
    LevelDurationReached {
        /// The configured level duration.
        duration: Duration,
    },
    /// A cell transitioned to a different state. Never broadcast for
    /// writes that leave the state unchanged.
    CellStateChanged {
        /// Coordinate of the affected cell.
        cell: CellCoord,
        /// State the cell held before the write.
        old_state: CellState,
        /// State the cell holds after the write.
        new_state: CellState,
    },
    /// A scheduled timed event crossed its start threshold. Broadcast at
    /// most once per configured event.
    TimedEventStarted {
        /// Name of the event as configured.
        name: String,
    },
}

impl Event {
    /// Stable label identifying the event kind, used in listener failure
    /// reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LevelTimeChanged { .. } => "LevelTimeChanged",
            Self::LevelDurationReached { .. } => "LevelDurationReached",
            Self::CellStateChanged { .. } => "CellStateChanged",
            Self::TimedEventStarted { .. } => "TimedEventStarted",
        }
    }
}

/// Errors surfaced by the level's construction, query, and mutation API.
///
/// Configuration errors are fatal at startup; [`LevelError::OutOfBounds`]
/// flags a programming error in the caller and is surfaced immediately
/// rather than clamped.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LevelError {
    /// The requested grid had a zero-sized edge.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// The requested cell edge length was not a positive world-unit count.
    #[error("cell size must be a positive number of world units, got {cell_size}")]
    InvalidCellSize {
        /// Requested cell edge length.
        cell_size: f32,
    },
    /// The requested level duration was zero.
    #[error("level duration must be positive")]
    InvalidDuration,
    /// A coordinate lay outside the configured grid.
    #[error("cell ({x}, {y}) lies outside the {width}x{height} grid")]
    OutOfBounds {
        /// Column index of the rejected coordinate.
        x: u32,
        /// Row index of the rejected coordinate.
        y: u32,
        /// Number of columns in the grid.
        width: u32,
        /// Number of rows in the grid.
        height: u32,
    },
    /// A listener the level cannot function without was absent at startup.
    #[error("required collaborator `{name}` is not attached to the level")]
    MissingCollaborator {
        /// Name the missing listener would have registered under.
        name: String,
    },
}
