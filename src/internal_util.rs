use std::cmp::min;

use itertools::iproduct;

use crate::{BoardInfo, Coord};

/// Cells adjacent to `cell` that lie on the board, excluding `cell` itself
pub(crate) fn adjacent(
    (row, col): Coord,
    info: BoardInfo,
) -> impl Iterator<Item = Coord> {
    let rows = row.saturating_sub(1)..min(row + 2, info.height);
    let cols = col.saturating_sub(1)..min(col + 2, info.width);
    iproduct!(rows, cols).filter(move |&adj| adj != (row, col))
}

/// Every cell on the board, in row-major order
pub(crate) fn all_cells(info: BoardInfo) -> impl Iterator<Item = Coord> {
    iproduct!(0..info.height, 0..info.width)
}
