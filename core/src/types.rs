use ndarray::Array2;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts, cell totals, and reveal counters.
pub type CellCount = u16;

/// Board position as `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// In-bounds 8-connected neighbors of `center` within `bounds` (exclusive).
pub(crate) fn neighbors(center: Coord2, bounds: Coord2) -> impl Iterator<Item = Coord2> {
    DISPLACEMENTS.iter().filter_map(move |&(dr, dc)| {
        let row = center.0.checked_add_signed(dr)?;
        let col = center.1.checked_add_signed(dc)?;
        (row < bounds.0 && col < bounds.1).then_some((row, col))
    })
}

pub(crate) trait NeighborIterExt {
    fn iter_neighbors(&self, center: Coord2) -> impl Iterator<Item = Coord2>;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, center: Coord2) -> impl Iterator<Item = Coord2> {
        let dim = self.dim();
        let bounds = (
            dim.0.try_into().unwrap_or(Coord::MAX),
            dim.1.try_into().unwrap_or(Coord::MAX),
        );
        neighbors(center, bounds)
    }
}
