use crate::board::Board;
use crate::cell::Cell;
use crate::inference::Inference;
use crate::knowledge::KnowledgeBase;
use crate::moves::{Move, next_move};
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;

/// What the player sees of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Tile {
    Hidden,
    Flagged,
    Revealed(u8), // The u8 is the number of adjacent mines.
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// The outcome of one agent turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// The cell was safe; `count` of its neighbours are mines.
    Revealed {
        mv: Move,
        count: usize,
        inference: Inference,
    },
    /// The cell was a mine.
    Exploded(Move),
    /// Every cell is either revealed or a known mine.
    Exhausted,
}

/// One game played by the knowledge-base agent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Game {
    /// Hidden mine layout and the agent's flags.
    pub board: Board,
    /// What the agent has learned so far.
    pub knowledge: KnowledgeBase,
    /// Numbers shown on revealed cells.
    pub revealed: BTreeMap<Cell, u8>,
    pub game_state: GameState,
}

impl Game {
    pub fn new(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut impl Rng,
    ) -> anyhow::Result<Self> {
        let board = Board::new(height, width, mines, rng)?;
        Ok(Game::from_board(board))
    }

    pub fn from_board(board: Board) -> Self {
        Game {
            knowledge: KnowledgeBase::new(board.height(), board.width()),
            board,
            revealed: BTreeMap::new(),
            game_state: GameState::Playing,
        }
    }

    /// Deserializes a game state from bytes.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the game state to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn height(&self) -> usize {
        self.board.height()
    }

    pub fn width(&self) -> usize {
        self.board.width()
    }

    /// Plays a single turn:
    /// 1. Picks a proven-safe cell, or guesses.
    /// 2. Ends the game if the cell is a mine.
    /// 3. Otherwise feeds the cell's number to the knowledge base.
    /// 4. Flags every mine the knowledge base has proven.
    /// 5. Checks for a win.
    pub fn step(&mut self, rng: &mut impl Rng) -> anyhow::Result<Turn> {
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        let Some(mv) = next_move(&self.knowledge, rng) else {
            tracing::info!("no moves left");
            return Ok(Turn::Exhausted);
        };

        if self.board.is_mine(mv.cell) {
            tracing::info!(cell = %mv.cell, kind = ?mv.kind, "revealed a mine");
            self.game_state = GameState::Lost;
            return Ok(Turn::Exploded(mv));
        }

        let count = self.board.nearby_mines(mv.cell);
        let inference = self.knowledge.record_observation(mv.cell, count)?;
        self.revealed.insert(mv.cell, count as u8);

        for &mine in self.knowledge.mines() {
            self.board.flag(mine);
        }

        if self.board.won() {
            tracing::info!(moves = self.knowledge.moves_made().len(), "all mines flagged");
            self.game_state = GameState::Won;
        }

        tracing::debug!(
            cell = %mv.cell,
            kind = ?mv.kind,
            count,
            new_safes = inference.safes.len(),
            new_mines = inference.mines.len(),
            "turn played"
        );
        Ok(Turn::Revealed {
            mv,
            count,
            inference,
        })
    }

    /// Steps until the game is decided or no move is left.
    pub fn play(&mut self, rng: &mut impl Rng) -> anyhow::Result<GameState> {
        while self.game_state == GameState::Playing {
            if let Turn::Exhausted = self.step(rng)? {
                break;
            }
        }
        Ok(self.game_state)
    }

    pub fn tile(&self, cell: Cell) -> Tile {
        if let Some(&n) = self.revealed.get(&cell) {
            Tile::Revealed(n)
        } else if self.board.mines_found().contains(&cell) {
            Tile::Flagged
        } else {
            Tile::Hidden
        }
    }

    /// All tiles, row by row.
    pub fn tiles(&self) -> Vec<Vec<Tile>> {
        (0..self.height())
            .map(|row| {
                (0..self.width())
                    .map(|col| self.tile(Cell::new(row, col)))
                    .collect()
            })
            .collect()
    }
}

/// The player's view: column numbers across the top, row numbers down the
/// side, `■` hidden, `F` flagged, digits for revealed cells.
impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.width() {
            write!(f, "{col:^3}")?;
        }
        writeln!(f, "\n  +{}", "---".repeat(self.width()))?;

        for (row, tiles) in self.tiles().iter().enumerate() {
            write!(f, "{row:^2}|")?;
            for tile in tiles {
                match tile {
                    Tile::Hidden => f.write_str(" ■ ")?,
                    Tile::Flagged => f.write_str(" F ")?,
                    Tile::Revealed(n) => write!(f, " {n} ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
