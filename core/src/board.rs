use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::types::neighbors;
use crate::*;

/// Resolved contents of a single board cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileValue {
    Mine,
    /// Number of adjacent mines, always in `0..=8`.
    Count(u8),
}

impl TileValue {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

/// Fully generated board: every cell holds either a mine or its final
/// adjacency count. Immutable for the lifetime of one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    values: Array2<TileValue>,
    mine_count: CellCount,
}

impl Board {
    pub(crate) fn new(values: Array2<TileValue>) -> Self {
        let mine_count = values
            .iter()
            .filter(|value| value.is_mine())
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        Self { values, mine_count }
    }

    /// Builds a board with mines at exactly `mine_coords` and adjacency
    /// counts filled in for every other cell.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut values = Array2::from_elem(size.to_nd_index(), TileValue::Count(0));

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            values[coords.to_nd_index()] = TileValue::Mine;
        }

        for row in 0..size.0 {
            for col in 0..size.1 {
                if values[(row, col).to_nd_index()].is_mine() {
                    continue;
                }
                let count = neighbors((row, col), size)
                    .filter(|&pos| values[pos.to_nd_index()].is_mine())
                    .count() as u8;
                values[(row, col).to_nd_index()] = TileValue::Count(count);
            }
        }

        Ok(Self::new(values))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.values.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.values.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn value_at(&self, coords: Coord2) -> TileValue {
        self.values[coords.to_nd_index()]
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.value_at(coords).is_mine()
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> {
        neighbors(coords, self.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_counts_match_mine_neighbors() {
        let board = Board::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();

        assert_eq!(board.mine_count(), 2);
        assert_eq!(board.value_at((1, 1)), TileValue::Count(2));
        assert_eq!(board.value_at((0, 1)), TileValue::Count(1));
        assert_eq!(board.value_at((0, 2)), TileValue::Count(0));
        assert!(board.contains_mine((2, 2)));
    }

    #[test]
    fn out_of_bounds_mine_is_rejected() {
        let result = Board::from_mine_coords((3, 3), &[(3, 0)]);
        assert_eq!(result, Err(GameError::InvalidCoords));
    }

    #[test]
    fn safe_cell_count_excludes_mines() {
        let board = Board::from_mine_coords((4, 4), &[(0, 0), (1, 1), (2, 2)]).unwrap();
        assert_eq!(board.total_cells(), 16);
        assert_eq!(board.safe_cell_count(), 13);
    }
}
