//! A minesweeper agent that plays from a knowledge base of
//! "exactly N mines among these cells" constraints.
//!
//! Each revealed number becomes a [`Constraint`] over the cell's neighbours.
//! The [`KnowledgeBase`] strips known cells out of it, then alternates two
//! rules until nothing changes: a constraint whose count is zero (or equals
//! its size) proves all its cells safe (or mines), and a constraint whose cells
//! contain another's yields a smaller constraint over the difference.

pub mod board;
pub mod cell;
pub mod constraint;
pub mod error;
pub mod game;
pub mod inference;
pub mod knowledge;
pub mod moves;

pub use board::Board;
pub use cell::Cell;
pub use constraint::Constraint;
pub use error::{BoardError, KnowledgeError};
pub use game::{Game, GameState, Tile, Turn};
pub use inference::Inference;
pub use knowledge::KnowledgeBase;
pub use moves::{Move, MoveKind, make_random_move, make_safe_move, next_move};
