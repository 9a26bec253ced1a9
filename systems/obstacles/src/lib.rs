#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Obstacle collaborator for Gridfall levels.
//!
//! Placement happens once at startup through the level's public sampling
//! and mutation API, before gameplay listeners attach, so the resulting
//! cell writes are not observed as gameplay. During play the
//! [`ObstacleFactory`] listener tracks which placed obstacles were damaged
//! or destroyed.

use anyhow::Result;
use gridfall_core::{CellCoord, CellState, LevelError};
use gridfall_level::{GridLevel, LevelListener};

/// Name under which the obstacle factory registers on the level.
pub const LISTENER_NAME: &str = "obstacle-factory";

/// A batch of identical obstacles to scatter across the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObstacleSpawn {
    /// Number of obstacles to place.
    pub count: u32,
    /// Opaque asset reference resolved by the rendering adapter.
    pub prefab: String,
}

/// Scatters the configured obstacles over usable cells, marking each
/// claimed cell [`CellState::Blocked`].
///
/// Draws go through the level's shared RNG, so placement is reproducible
/// for a seeded level. When fewer usable cells remain than a batch asks
/// for, the shortfall is logged and the batch places what it can.
pub fn place_obstacles(
    level: &mut GridLevel,
    spawns: &[ObstacleSpawn],
) -> Result<Vec<CellCoord>, LevelError> {
    let mut placed = Vec::new();
    for spawn in spawns {
        let requested = spawn.count as usize;
        let cells = level.random_cells_with_state(&[CellState::Usable], requested);
        if cells.len() < requested {
            log::warn!(
                "only {} usable cells left for {} `{}` obstacles",
                cells.len(),
                requested,
                spawn.prefab
            );
        }

        for cell in cells {
            let _ = level.set_cell_state(cell, CellState::Blocked)?;
            placed.push(cell);
        }
    }
    Ok(placed)
}

/// Tracks the fate of placed obstacles by observing cell transitions.
#[derive(Debug, Default)]
pub struct ObstacleFactory {
    live: Vec<CellCoord>,
    damaged: Vec<CellCoord>,
    destroyed: Vec<CellCoord>,
}

impl ObstacleFactory {
    /// Creates a factory owning the obstacles at the provided cells.
    #[must_use]
    pub fn new(placed: Vec<CellCoord>) -> Self {
        Self {
            live: placed,
            damaged: Vec::new(),
            destroyed: Vec::new(),
        }
    }

    /// Cells whose obstacles are still standing.
    #[must_use]
    pub fn live(&self) -> &[CellCoord] {
        &self.live
    }

    /// Cells whose obstacles took damage but remain standing.
    #[must_use]
    pub fn damaged(&self) -> &[CellCoord] {
        &self.damaged
    }

    /// Cells whose obstacles were destroyed.
    #[must_use]
    pub fn destroyed(&self) -> &[CellCoord] {
        &self.destroyed
    }
}

impl LevelListener for ObstacleFactory {
    fn name(&self) -> &'static str {
        LISTENER_NAME
    }

    fn on_cell_state_changed(
        &mut self,
        cell: CellCoord,
        _old_state: CellState,
        new_state: CellState,
    ) -> Result<()> {
        if !self.live.contains(&cell) {
            return Ok(());
        }

        match new_state {
            CellState::Destroyed => {
                self.live.retain(|candidate| *candidate != cell);
                self.damaged.retain(|candidate| *candidate != cell);
                self.destroyed.push(cell);
            }
            CellState::Damaged => {
                if !self.damaged.contains(&cell) {
                    self.damaged.push(cell);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_tracks_damage_and_destruction() {
        let placed = vec![CellCoord::new(0, 0), CellCoord::new(1, 1)];
        let mut factory = ObstacleFactory::new(placed);

        factory
            .on_cell_state_changed(
                CellCoord::new(1, 1),
                CellState::Blocked,
                CellState::Damaged,
            )
            .expect("handler");
        assert_eq!(factory.damaged(), &[CellCoord::new(1, 1)]);
        assert_eq!(factory.live().len(), 2);

        factory
            .on_cell_state_changed(
                CellCoord::new(1, 1),
                CellState::Damaged,
                CellState::Destroyed,
            )
            .expect("handler");
        assert_eq!(factory.destroyed(), &[CellCoord::new(1, 1)]);
        assert_eq!(factory.live(), &[CellCoord::new(0, 0)]);
        assert!(factory.damaged().is_empty());
    }

    #[test]
    fn transitions_on_foreign_cells_are_ignored() {
        let mut factory = ObstacleFactory::new(vec![CellCoord::new(0, 0)]);

        factory
            .on_cell_state_changed(
                CellCoord::new(3, 3),
                CellState::Usable,
                CellState::Destroyed,
            )
            .expect("handler");
        assert!(factory.destroyed().is_empty());
        assert_eq!(factory.live(), &[CellCoord::new(0, 0)]);
    }
}
