use crate::cell::Cell;
use crate::constraint::Constraint;
use crate::error::KnowledgeError;
use std::collections::{BTreeSet, HashMap};

/// Everything the agent knows about one game.
///
/// `moves_made`, `safes` and `mines` only ever grow. `constraints` is
/// append-only; constraints are shrunk in place as cells become known, so no
/// constraint ever mentions a cell in `safes` or `mines`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawKnowledgeBase")]
pub struct KnowledgeBase {
    height: usize,
    width: usize,
    /// Cells the agent has revealed.
    moves_made: BTreeSet<Cell>,
    /// Cells proven mine-free.
    safes: BTreeSet<Cell>,
    /// Cells proven to be mines.
    mines: BTreeSet<Cell>,
    /// Constraints in insertion order, never two structurally equal on insert.
    constraints: Vec<Constraint>,
    /// How many entries of `constraints` hold each distinct value.
    #[serde(skip)]
    index: HashMap<Constraint, usize>,
}

/// Wire shape of a [`KnowledgeBase`]. Decoded state is checked before use.
#[derive(serde::Deserialize)]
struct RawKnowledgeBase {
    height: usize,
    width: usize,
    moves_made: BTreeSet<Cell>,
    safes: BTreeSet<Cell>,
    mines: BTreeSet<Cell>,
    constraints: Vec<Constraint>,
}

impl TryFrom<RawKnowledgeBase> for KnowledgeBase {
    type Error = KnowledgeError;

    fn try_from(raw: RawKnowledgeBase) -> Result<Self, Self::Error> {
        let mut kb = KnowledgeBase::new(raw.height, raw.width);

        for &cell in raw.moves_made.iter().chain(&raw.safes).chain(&raw.mines) {
            kb.check_bounds(cell)?;
        }
        if let Some(&cell) = raw.safes.intersection(&raw.mines).next() {
            return Err(KnowledgeError::Conflict(cell));
        }
        for constraint in &raw.constraints {
            for &cell in constraint.cells() {
                kb.check_bounds(cell)?;
                if raw.safes.contains(&cell) || raw.mines.contains(&cell) {
                    return Err(KnowledgeError::Stale(cell));
                }
            }
        }

        kb.moves_made = raw.moves_made;
        kb.safes = raw.safes;
        kb.mines = raw.mines;
        for constraint in raw.constraints {
            *kb.index.entry(constraint.clone()).or_default() += 1;
            kb.constraints.push(constraint);
        }
        Ok(kb)
    }
}

impl KnowledgeBase {
    pub fn new(height: usize, width: usize) -> Self {
        KnowledgeBase {
            height,
            width,
            moves_made: BTreeSet::new(),
            safes: BTreeSet::new(),
            mines: BTreeSet::new(),
            constraints: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn moves_made(&self) -> &BTreeSet<Cell> {
        &self.moves_made
    }

    pub fn safes(&self) -> &BTreeSet<Cell> {
        &self.safes
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_safe(&self, cell: &Cell) -> bool {
        self.safes.contains(cell)
    }

    pub fn is_mine(&self, cell: &Cell) -> bool {
        self.mines.contains(cell)
    }

    /// Whether a structurally equal constraint is already held.
    pub fn contains(&self, constraint: &Constraint) -> bool {
        self.index.contains_key(constraint)
    }

    /// Marks `cell` as a mine and removes it from every constraint.
    ///
    /// Returns `Ok(true)` if the cell was not known to be a mine before.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, KnowledgeError> {
        if self.safes.contains(&cell) {
            return Err(KnowledgeError::Conflict(cell));
        }
        if !self.mines.insert(cell) {
            return Ok(false);
        }
        for constraint in &mut self.constraints {
            if !constraint.contains(&cell) {
                continue;
            }
            let before = constraint.clone();
            constraint.mark_mine(cell)?;
            reindex(&mut self.index, before, constraint);
        }
        tracing::trace!(%cell, "marked mine");
        Ok(true)
    }

    /// Marks `cell` as safe and removes it from every constraint.
    ///
    /// Returns `Ok(true)` if the cell was not known to be safe before.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, KnowledgeError> {
        if self.mines.contains(&cell) {
            return Err(KnowledgeError::Conflict(cell));
        }
        if !self.safes.insert(cell) {
            return Ok(false);
        }
        for constraint in &mut self.constraints {
            if !constraint.contains(&cell) {
                continue;
            }
            let before = constraint.clone();
            constraint.mark_safe(cell)?;
            reindex(&mut self.index, before, constraint);
        }
        tracing::trace!(%cell, "marked safe");
        Ok(true)
    }

    pub(crate) fn check_bounds(&self, cell: Cell) -> Result<(), KnowledgeError> {
        if cell.in_bounds(self.height, self.width) {
            Ok(())
        } else {
            Err(KnowledgeError::OutOfBounds {
                cell,
                height: self.height,
                width: self.width,
            })
        }
    }

    pub(crate) fn record_move(&mut self, cell: Cell) -> Result<(), KnowledgeError> {
        if !self.moves_made.insert(cell) {
            return Err(KnowledgeError::AlreadyObserved(cell));
        }
        Ok(())
    }

    /// Appends `constraint` unless an equal one is already held.
    pub(crate) fn insert(&mut self, constraint: Constraint) -> bool {
        if self.contains(&constraint) {
            return false;
        }
        self.index.insert(constraint.clone(), 1);
        self.constraints.push(constraint);
        true
    }

    /// Strips already-known cells out of a fresh constraint so it can be
    /// admitted without mentioning any of them.
    pub(crate) fn normalize(&self, constraint: Constraint) -> Result<Constraint, KnowledgeError> {
        let mut normalized = constraint;
        for cell in normalized.cells().clone() {
            if self.safes.contains(&cell) {
                normalized.mark_safe(cell)?;
            } else if self.mines.contains(&cell) {
                normalized.mark_mine(cell)?;
            }
        }
        Ok(normalized)
    }
}

/// Moves one index entry from the value a constraint had to the value it has.
fn reindex(index: &mut HashMap<Constraint, usize>, before: Constraint, after: &Constraint) {
    if let Some(n) = index.get_mut(&before) {
        *n -= 1;
        if *n == 0 {
            index.remove(&before);
        }
    }
    *index.entry(after.clone()).or_default() += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(coords: &[(usize, usize)], count: usize) -> Constraint {
        Constraint::new(coords.iter().copied().map(Cell::from), count).unwrap()
    }

    #[test]
    fn test_mark_mine_propagates_to_constraints() {
        let mut kb = KnowledgeBase::new(4, 4);
        kb.insert(constraint(&[(0, 0), (0, 1), (1, 0)], 2));
        kb.insert(constraint(&[(0, 1), (1, 1)], 1));

        assert_eq!(kb.mark_mine(Cell::new(0, 1)), Ok(true));
        assert!(kb.is_mine(&Cell::new(0, 1)));
        assert_eq!(kb.constraints()[0], constraint(&[(0, 0), (1, 0)], 1));
        assert_eq!(kb.constraints()[1], constraint(&[(1, 1)], 0));
    }

    #[test]
    fn test_mark_safe_propagates_to_constraints() {
        let mut kb = KnowledgeBase::new(4, 4);
        kb.insert(constraint(&[(0, 0), (0, 1), (1, 0)], 1));

        assert_eq!(kb.mark_safe(Cell::new(1, 0)), Ok(true));
        assert!(kb.is_safe(&Cell::new(1, 0)));
        assert_eq!(kb.constraints()[0], constraint(&[(0, 0), (0, 1)], 1));
    }

    #[test]
    fn test_marking_is_idempotent() {
        let mut kb = KnowledgeBase::new(4, 4);
        kb.insert(constraint(&[(0, 0), (0, 1), (1, 0)], 2));

        assert_eq!(kb.mark_mine(Cell::new(0, 0)), Ok(true));
        assert_eq!(kb.mark_mine(Cell::new(0, 0)), Ok(false));
        assert_eq!(kb.constraints()[0], constraint(&[(0, 1), (1, 0)], 1));

        assert_eq!(kb.mark_safe(Cell::new(3, 3)), Ok(true));
        assert_eq!(kb.mark_safe(Cell::new(3, 3)), Ok(false));
        assert_eq!(kb.safes().len(), 1);
    }

    #[test]
    fn test_safe_and_mine_never_overlap() {
        let mut kb = KnowledgeBase::new(3, 3);
        kb.mark_safe(Cell::new(1, 1)).unwrap();
        assert_eq!(
            kb.mark_mine(Cell::new(1, 1)),
            Err(KnowledgeError::Conflict(Cell::new(1, 1)))
        );

        kb.mark_mine(Cell::new(2, 2)).unwrap();
        assert_eq!(
            kb.mark_safe(Cell::new(2, 2)),
            Err(KnowledgeError::Conflict(Cell::new(2, 2)))
        );
        assert!(kb.safes().is_disjoint(kb.mines()));
    }

    #[test]
    fn test_insert_skips_duplicates() {
        let mut kb = KnowledgeBase::new(3, 3);
        assert!(kb.insert(constraint(&[(0, 0), (0, 1)], 1)));
        assert!(!kb.insert(constraint(&[(0, 1), (0, 0)], 1)));
        assert!(kb.insert(constraint(&[(0, 1), (0, 0)], 2)));
        assert_eq!(kb.constraints().len(), 2);
    }

    #[test]
    fn test_normalize_removes_known_cells() {
        let mut kb = KnowledgeBase::new(3, 3);
        kb.mark_safe(Cell::new(0, 0)).unwrap();
        kb.mark_mine(Cell::new(0, 1)).unwrap();

        let raw = constraint(&[(0, 0), (0, 1), (1, 0), (1, 1)], 2);
        let normalized = kb.normalize(raw).unwrap();
        assert_eq!(normalized, constraint(&[(1, 0), (1, 1)], 1));
    }

    #[test]
    fn test_normalize_detects_contradiction() {
        let mut kb = KnowledgeBase::new(3, 3);
        kb.mark_mine(Cell::new(0, 1)).unwrap();

        // A neighbour claims no mines, yet one of its cells is a known mine
        let raw = constraint(&[(0, 0), (0, 1)], 0);
        assert_eq!(
            kb.normalize(raw),
            Err(KnowledgeError::NegativeCount {
                cell: Cell::new(0, 1)
            })
        );
    }

    #[test]
    fn test_index_follows_in_place_shrinking() {
        let mut kb = KnowledgeBase::new(4, 4);
        kb.insert(constraint(&[(0, 0), (0, 1)], 1));
        kb.insert(constraint(&[(0, 0), (0, 1), (0, 2)], 1));

        kb.mark_safe(Cell::new(0, 2)).unwrap();

        // Both entries now hold {(0,0),(0,1)} = 1
        assert!(kb.contains(&constraint(&[(0, 0), (0, 1)], 1)));
        assert!(!kb.contains(&constraint(&[(0, 0), (0, 1), (0, 2)], 1)));
        assert!(!kb.insert(constraint(&[(0, 0), (0, 1)], 1)));

        kb.mark_mine(Cell::new(0, 0)).unwrap();
        assert!(kb.contains(&constraint(&[(0, 1)], 0)));
        assert!(!kb.contains(&constraint(&[(0, 0), (0, 1)], 1)));
        assert_eq!(kb.constraints().len(), 2);
    }

    #[test]
    fn test_decoding_round_trip_rebuilds_index() {
        let mut kb = KnowledgeBase::new(4, 4);
        kb.insert(constraint(&[(1, 1), (1, 2), (2, 1)], 1));
        kb.mark_safe(Cell::new(0, 0)).unwrap();
        kb.mark_mine(Cell::new(3, 3)).unwrap();

        let restored: KnowledgeBase = bcs::from_bytes(&bcs::to_bytes(&kb).unwrap()).unwrap();
        assert_eq!(restored, kb);
        assert!(restored.contains(&constraint(&[(1, 1), (1, 2), (2, 1)], 1)));
    }

    fn encode_raw(
        safes: &[(usize, usize)],
        mines: &[(usize, usize)],
        constraints: Vec<Constraint>,
    ) -> Vec<u8> {
        let set = |coords: &[(usize, usize)]| -> BTreeSet<Cell> {
            coords.iter().copied().map(Cell::from).collect()
        };
        bcs::to_bytes(&(
            3usize,
            3usize,
            BTreeSet::<Cell>::new(),
            set(safes),
            set(mines),
            constraints,
        ))
        .unwrap()
    }

    #[test]
    fn test_decoding_rejects_cell_both_safe_and_mine() {
        let bts = encode_raw(&[(1, 1)], &[(1, 1)], Vec::new());
        let err = bcs::from_bytes::<KnowledgeBase>(&bts).unwrap_err();
        assert!(
            err.to_string()
                .contains(&KnowledgeError::Conflict(Cell::new(1, 1)).to_string()),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_decoding_rejects_constraint_over_known_cell() {
        let bts = encode_raw(&[], &[(0, 0)], vec![constraint(&[(0, 0), (0, 1)], 1)]);
        let err = bcs::from_bytes::<KnowledgeBase>(&bts).unwrap_err();
        assert!(
            err.to_string()
                .contains(&KnowledgeError::Stale(Cell::new(0, 0)).to_string()),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_decoding_rejects_off_board_cells() {
        let bts = encode_raw(&[(5, 0)], &[], Vec::new());
        assert!(bcs::from_bytes::<KnowledgeBase>(&bts).is_err());
    }

    #[test]
    fn test_bounds_check() {
        let kb = KnowledgeBase::new(2, 3);
        assert!(kb.check_bounds(Cell::new(1, 2)).is_ok());
        assert_eq!(
            kb.check_bounds(Cell::new(2, 0)),
            Err(KnowledgeError::OutOfBounds {
                cell: Cell::new(2, 0),
                height: 2,
                width: 3
            })
        );
    }
}
