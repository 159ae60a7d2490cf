use crate::cell::Cell;
use crate::error::BoardError;
use rand::Rng;
use std::collections::BTreeSet;
use std::fmt;

/// The hidden ground truth of a game: where the mines are, and which of them
/// the player has flagged so far.
///
/// The knowledge base never looks at this. Only the game loop does, to answer
/// "was that a mine" and "how many mines border this cell".
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Board {
    height: usize,
    width: usize,
    mines: BTreeSet<Cell>,
    /// Mines the player has flagged.
    mines_found: BTreeSet<Cell>,
}

impl Board {
    /// Places `mines` mines uniformly at random.
    pub fn new(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, BoardError> {
        let cells = cell_count(height, width)?;
        if mines >= cells {
            return Err(BoardError::TooManyMines { mines, cells });
        }

        let mines = rand::seq::index::sample(rng, cells, mines)
            .into_iter()
            .map(|i| Cell::new(i / width, i % width))
            .collect();

        Ok(Board {
            height,
            width,
            mines,
            mines_found: BTreeSet::new(),
        })
    }

    /// A board with a fixed mine layout.
    pub fn with_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, BoardError> {
        let cells = cell_count(height, width)?;

        let mines: BTreeSet<Cell> = mines.into_iter().collect();
        if let Some(&cell) = mines.iter().find(|c| !c.in_bounds(height, width)) {
            return Err(BoardError::OutOfBounds {
                cell,
                height,
                width,
            });
        }
        if mines.len() >= cells {
            return Err(BoardError::TooManyMines {
                mines: mines.len(),
                cells,
            });
        }

        Ok(Board {
            height,
            width,
            mines,
            mines_found: BTreeSet::new(),
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub fn mines_found(&self) -> &BTreeSet<Cell> {
        &self.mines_found
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines among the in-bounds neighbours of `cell`.
    pub fn nearby_mines(&self, cell: Cell) -> usize {
        cell.neighbors(self.height, self.width)
            .filter(|n| self.mines.contains(n))
            .count()
    }

    /// Records a flag placed by the player.
    pub fn flag(&mut self, cell: Cell) {
        self.mines_found.insert(cell);
    }

    /// The game is won once the flags are exactly the mines.
    pub fn won(&self) -> bool {
        self.mines_found == self.mines
    }
}

/// Number of cells on a `height` x `width` board, which must be non-empty and
/// addressable.
fn cell_count(height: usize, width: usize) -> Result<usize, BoardError> {
    match height.checked_mul(width) {
        Some(0) => Err(BoardError::EmptyBoard),
        Some(cells) => Ok(cells),
        None => Err(BoardError::TooLarge { height, width }),
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "--".repeat(self.width) + "-";
        for row in 0..self.height {
            writeln!(f, "{rule}")?;
            for col in 0..self.width {
                let mark = if self.is_mine(Cell::new(row, col)) { "|X" } else { "| " };
                f.write_str(mark)?;
            }
            writeln!(f, "|")?;
        }
        write!(f, "{rule}")
    }
}
