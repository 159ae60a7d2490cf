use std::fmt;

/// A `(row, col)` coordinate on the minesweeper board.
///
/// Cells order row-major, so sets of cells have one canonical sorted form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }

    /// Whether the cell lies on a `height` x `width` board.
    pub fn in_bounds(self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }

    /// The Moore neighbourhood of this cell: up to 8 adjacent cells,
    /// clipped to the board edges. The cell itself is never yielded.
    pub fn neighbors(self, height: usize, width: usize) -> impl Iterator<Item = Cell> {
        (-1isize..=1).flat_map(move |dr| {
            (-1isize..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let nr = self.row as isize + dr;
                let nc = self.col as isize + dc;

                if nr >= 0 && nr < height as isize && nc >= 0 && nc < width as isize {
                    Some(Cell::new(nr as usize, nc as usize))
                } else {
                    None
                }
            })
        })
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell::new(row, col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
