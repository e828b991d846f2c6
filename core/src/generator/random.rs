use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::types::{NeighborIterExt, neighbors};

use super::*;

/// Sampling budget per requested mine before generation is abandoned with
/// [`GameError::PlacementStalled`].
const ATTEMPTS_PER_MINE: u32 = 2048;

/// Transient cell contents tracked while mines are being placed. Never
/// escapes this module; [`BoardGenerator::generate`] resolves every site to a
/// final [`TileValue`] before returning.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Site {
    /// Not a mine (yet), tracking how many placed mines touch it so far.
    Open(u8),
    Mine,
    /// The player's first click, held back from placement entirely.
    Reserved,
}

/// Rejection-sampling mine placement with a fairness bound: a candidate site
/// is accepted only if none of its open neighbors would end up touching more
/// than `config.fairness` mines. The bound keeps the region around the first
/// reveal from being walled in by high numbers.
#[derive(Clone, Debug)]
pub struct FairRandomGenerator {
    rng: SmallRng,
}

impl FairRandomGenerator {
    pub fn new() -> Self {
        Self::from_seed(rand::rng().random())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for FairRandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardGenerator for FairRandomGenerator {
    fn generate(&mut self, config: &GameConfig, start: Coord2) -> Result<Board> {
        let (rows, cols) = config.size();
        if start.0 >= rows || start.1 >= cols {
            return Err(GameError::InvalidCoords);
        }

        let mut sites = Array2::from_elem((rows as usize, cols as usize), Site::Open(0));
        sites[start.to_nd_index()] = Site::Reserved;

        let budget = u32::from(config.mines) * ATTEMPTS_PER_MINE;
        let mut attempts: u32 = 0;
        let mut placed: CellCount = 0;

        while placed < config.mines {
            if attempts >= budget {
                log::warn!(
                    "Mine placement stalled after {attempts} attempts, {placed}/{} placed",
                    config.mines
                );
                return Err(GameError::PlacementStalled);
            }
            attempts += 1;

            let candidate = (
                self.rng.random_range(0..rows),
                self.rng.random_range(0..cols),
            );
            if !matches!(sites[candidate.to_nd_index()], Site::Open(_)) {
                continue;
            }
            if !is_fair_site(&sites, config.fairness, candidate) {
                continue;
            }

            sites[candidate.to_nd_index()] = Site::Mine;
            placed += 1;
            for pos in neighbors(candidate, (rows, cols)) {
                if let Site::Open(count) = sites[pos.to_nd_index()] {
                    sites[pos.to_nd_index()] = Site::Open(count + 1);
                }
            }
        }

        log::debug!("Placed {placed} mines in {attempts} attempts");

        // The reserved tile gets its true adjacency count; it is never a mine.
        let start_count = neighbors(start, (rows, cols))
            .filter(|&pos| sites[pos.to_nd_index()] == Site::Mine)
            .count() as u8;

        let values = sites.map(|&site| match site {
            Site::Open(count) => TileValue::Count(count),
            Site::Mine => TileValue::Mine,
            Site::Reserved => TileValue::Count(start_count),
        });

        Ok(Board::new(values))
    }
}

/// True iff a mine at `candidate` would leave every in-bounds open neighbor
/// at or below the `fairness` bound. Mine and reserved neighbors are exempt.
fn is_fair_site(sites: &Array2<Site>, fairness: u8, candidate: Coord2) -> bool {
    sites
        .iter_neighbors(candidate)
        .all(|pos| match sites[pos.to_nd_index()] {
            Site::Open(count) => count + 1 <= fairness,
            Site::Mine | Site::Reserved => true,
        })
}
