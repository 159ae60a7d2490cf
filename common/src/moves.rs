use crate::cell::Cell;
use crate::knowledge::KnowledgeBase;
use itertools::iproduct;
use rand::Rng;
use rand::prelude::IndexedRandom;

/// How a move was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MoveKind {
    Safe,   // Proven mine-free by the knowledge base.
    Random, // A guess among cells not known to be mines.
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Move {
    pub cell: Cell,
    pub kind: MoveKind,
}

/// A cell known to be safe that has not been revealed yet, if any.
///
/// Which one is returned when several qualify is not part of the contract.
pub fn make_safe_move(kb: &KnowledgeBase) -> Option<Cell> {
    kb.safes()
        .iter()
        .find(|&&cell| !kb.moves_made().contains(&cell))
        .copied()
}

/// A uniformly random cell that is neither revealed nor a known mine.
/// Cells of unknown safety are fair game.
pub fn make_random_move(kb: &KnowledgeBase, rng: &mut impl Rng) -> Option<Cell> {
    let candidates: Vec<Cell> = iproduct!(0..kb.height(), 0..kb.width())
        .map(Cell::from)
        .filter(|cell| !kb.moves_made().contains(cell) && !kb.is_mine(cell))
        .collect();

    candidates.choose(rng).copied()
}

/// Prefers a proven-safe cell, guesses otherwise. `None` once every cell is
/// either revealed or a known mine.
pub fn next_move(kb: &KnowledgeBase, rng: &mut impl Rng) -> Option<Move> {
    if let Some(cell) = make_safe_move(kb) {
        return Some(Move {
            cell,
            kind: MoveKind::Safe,
        });
    }

    make_random_move(kb, rng).map(|cell| Move {
        cell,
        kind: MoveKind::Random,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_safe_move_skips_revealed_cells() {
        let mut kb = KnowledgeBase::new(8, 8);
        kb.record_observation(Cell::new(2, 2), 0).unwrap();

        let cell = make_safe_move(&kb).unwrap();
        assert!(kb.is_safe(&cell));
        assert!(!kb.moves_made().contains(&cell));
        assert!(!kb.is_mine(&cell));
    }

    #[test]
    fn test_safe_move_none_without_unrevealed_safes() {
        let mut kb = KnowledgeBase::new(8, 8);
        assert_eq!(make_safe_move(&kb), None);

        // The only safe cell is the one just revealed
        kb.record_observation(Cell::new(4, 4), 3).unwrap();
        assert_eq!(make_safe_move(&kb), None);
    }

    #[test]
    fn test_random_move_avoids_revealed_and_mines() {
        let mut kb = KnowledgeBase::new(3, 3);
        kb.record_observation(Cell::new(0, 1), 5).unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let cell = make_random_move(&kb, &mut rng).unwrap();
            assert!(!kb.moves_made().contains(&cell));
            assert!(!kb.is_mine(&cell));
        }
    }

    #[test]
    fn test_random_move_covers_every_candidate() {
        let kb = KnowledgeBase::new(2, 2);
        let mut rng = StdRng::seed_from_u64(11);

        let seen: HashSet<Cell> = (0..200)
            .filter_map(|_| make_random_move(&kb, &mut rng))
            .collect();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_random_move_none_when_exhausted() {
        // Revealing a corner of a 2x2 board with count 3 leaves only mines
        let mut kb = KnowledgeBase::new(2, 2);
        kb.record_observation(Cell::new(0, 0), 3).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(make_random_move(&kb, &mut rng), None);
        assert_eq!(next_move(&kb, &mut rng), None);
    }

    #[test]
    fn test_random_move_some_while_unknown_cells_remain() {
        let mut kb = KnowledgeBase::new(2, 2);
        kb.record_observation(Cell::new(0, 0), 1).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        let cell = make_random_move(&kb, &mut rng).unwrap();
        assert_ne!(cell, Cell::new(0, 0));
    }

    #[test]
    fn test_next_move_prefers_safe_cells() {
        let mut kb = KnowledgeBase::new(8, 8);
        kb.record_observation(Cell::new(2, 2), 0).unwrap();

        let mut rng = StdRng::seed_from_u64(5);
        let mv = next_move(&kb, &mut rng).unwrap();
        assert_eq!(mv.kind, MoveKind::Safe);
        assert!(kb.is_safe(&mv.cell));
    }

    #[test]
    fn test_next_move_guesses_when_nothing_is_proven() {
        let kb = KnowledgeBase::new(8, 8);
        let mut rng = StdRng::seed_from_u64(5);
        let mv = next_move(&kb, &mut rng).unwrap();
        assert_eq!(mv.kind, MoveKind::Random);
    }
}
