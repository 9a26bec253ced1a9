//! Dense cell-state storage backing the level grid.

use gridfall_core::{CellCoord, CellState, LevelError};

/// Fixed-size mapping from grid coordinates to cell states.
///
/// Dimensions are immutable after construction and every coordinate holds
/// exactly one state at all times. The grid is a pure data structure: it
/// never broadcasts, so the orchestrator alone decides which writes become
/// notifications.
#[derive(Clone, Debug)]
pub(crate) struct CellGrid {
    width: u32,
    height: u32,
    cells: Vec<CellState>,
}

impl CellGrid {
    /// Creates a grid with every cell marked [`CellState::Usable`].
    pub(crate) fn new(width: u32, height: u32) -> Result<Self, LevelError> {
        if width == 0 || height == 0 {
            return Err(LevelError::InvalidDimensions { width, height });
        }

        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64)
            .map_err(|_| LevelError::InvalidDimensions { width, height })?;

        Ok(Self {
            width,
            height,
            cells: vec![CellState::Usable; capacity],
        })
    }

    /// Grid dimensions as `(width, height)`.
    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the current state of the addressed cell.
    pub(crate) fn state(&self, cell: CellCoord) -> Result<CellState, LevelError> {
        let index = self.checked_index(cell)?;
        Ok(self.cells[index])
    }

    /// Writes `new_state` and reports `(old_state, changed)`.
    pub(crate) fn set_state(
        &mut self,
        cell: CellCoord,
        new_state: CellState,
    ) -> Result<(CellState, bool), LevelError> {
        let index = self.checked_index(cell)?;
        let old_state = self.cells[index];
        self.cells[index] = new_state;
        Ok((old_state, old_state != new_state))
    }

    /// Enumerates the coordinates whose state is a member of `states`.
    ///
    /// The order is row-major (`y` outer, `x` inner) and therefore
    /// deterministic for fixed grid contents, which the sampler relies on
    /// for reproducible draws.
    pub(crate) fn coordinates_with_state_in(&self, states: &[CellState]) -> Vec<CellCoord> {
        let width = self.width as usize;
        let mut matches = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let index = y as usize * width + x as usize;
                if states.contains(&self.cells[index]) {
                    matches.push(CellCoord::new(x, y));
                }
            }
        }
        matches
    }

    /// Resolves `cell` to its dense storage index, rejecting coordinates
    /// outside the grid.
    pub(crate) fn checked_index(&self, cell: CellCoord) -> Result<usize, LevelError> {
        self.index(cell).ok_or(LevelError::OutOfBounds {
            x: cell.x(),
            y: cell.y(),
            width: self.width,
            height: self.height,
        })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.x() < self.width && cell.y() < self.height {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
