//! Uniform sampling over candidate cell pools.

use gridfall_core::CellCoord;
use rand::seq::SliceRandom;
use rand::Rng;

/// Draws up to `count` distinct coordinates from `candidates`.
///
/// When the pool is not larger than `count` the whole pool is returned with
/// caller order preserved. Otherwise exactly `count` coordinates are chosen
/// by a uniform partial shuffle, so repeated calls are reproducible given a
/// fixed seed and deterministic caller order.
pub(crate) fn sample_cells<R>(
    rng: &mut R,
    mut candidates: Vec<CellCoord>,
    count: usize,
) -> Vec<CellCoord>
where
    R: Rng + ?Sized,
{
    if candidates.len() <= count {
        return candidates;
    }

    let (chosen, _remainder) = candidates.partial_shuffle(rng, count);
    chosen.to_vec()
}
