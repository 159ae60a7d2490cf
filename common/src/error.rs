use crate::cell::Cell;
use thiserror::Error;

/// A knowledge base that produced one of these can no longer be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnowledgeError {
    #[error("cell {cell} is outside the {height}x{width} board")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },

    #[error("cell {0} has already been observed")]
    AlreadyObserved(Cell),

    /// Accounting for a mine would leave fewer than zero mines in a constraint.
    #[error("marking {cell} as a mine drives a constraint count below zero")]
    NegativeCount { cell: Cell },

    /// Subset resolution where the smaller cell set holds more mines.
    #[error("a subset claims {subset} mines but its superset only {superset}")]
    Underflow { subset: usize, superset: usize },

    /// More mines than cells.
    #[error("constraint claims {count} mines among {size} cells")]
    Overfull { size: usize, count: usize },

    #[error("cell {0} is known to be both safe and a mine")]
    Conflict(Cell),

    /// A constraint still mentions a cell whose status is settled.
    #[error("a constraint still mentions {0}, which is already known")]
    Stale(Cell),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board must have at least one row and one column")]
    EmptyBoard,

    #[error("a {height}x{width} board has more cells than can be addressed")]
    TooLarge { height: usize, width: usize },

    #[error("total mines ({mines}) must be less than the number of cells ({cells})")]
    TooManyMines { mines: usize, cells: usize },

    #[error("mine {cell} is outside the {height}x{width} board")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },
}
