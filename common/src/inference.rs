use crate::cell::Cell;
use crate::constraint::Constraint;
use crate::error::KnowledgeError;
use crate::knowledge::KnowledgeBase;
use itertools::Itertools;
use std::collections::BTreeSet;

/// What a single round of inference taught the knowledge base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inference {
    /// Cells newly proven safe.
    pub safes: BTreeSet<Cell>,
    /// Cells newly proven to be mines.
    pub mines: BTreeSet<Cell>,
    /// Constraints appended to the knowledge base.
    pub constraints_added: usize,
    /// Deduction passes run before nothing changed.
    pub passes: usize,
}

impl Inference {
    /// True if nothing new was learned.
    pub fn is_empty(&self) -> bool {
        self.safes.is_empty() && self.mines.is_empty() && self.constraints_added == 0
    }
}

impl KnowledgeBase {
    /// Records that `cell` was revealed safely and borders `count` mines, then
    /// draws every consequence the constraints allow.
    ///
    /// The process for a single observation:
    /// 1. Remembers the move and marks the cell safe.
    /// 2. Builds a constraint over the cell's in-bounds neighbours.
    /// 3. Strips neighbours that are already known out of it.
    /// 4. Adds it unless an equal constraint is already held.
    /// 5. Runs [`KnowledgeBase::deduce`] to a fixpoint.
    pub fn record_observation(
        &mut self,
        cell: Cell,
        count: usize,
    ) -> Result<Inference, KnowledgeError> {
        self.check_bounds(cell)?;
        self.record_move(cell)?;

        let mut inference = Inference::default();
        if self.mark_safe(cell)? {
            inference.safes.insert(cell);
        }

        let observed = Constraint::new(cell.neighbors(self.height(), self.width()), count)?;
        let observed = self.normalize(observed)?;
        tracing::debug!(%cell, count, constraint = %observed, "recorded observation");

        if self.insert(observed) {
            inference.constraints_added += 1;
        }

        let deduced = self.deduce()?;
        inference.safes.extend(deduced.safes);
        inference.mines.extend(deduced.mines);
        inference.constraints_added += deduced.constraints_added;
        inference.passes = deduced.passes;

        tracing::debug!(
            safes = self.safes().len(),
            mines = self.mines().len(),
            constraints = self.constraints().len(),
            passes = inference.passes,
            "knowledge updated"
        );
        Ok(inference)
    }

    /// Alternates trivial deduction and subset resolution until a full pass
    /// neither marks a cell nor adds a constraint.
    pub fn deduce(&mut self) -> Result<Inference, KnowledgeError> {
        let mut inference = Inference::default();

        loop {
            inference.passes += 1;

            let mut changed = self.mark_known_cells(&mut inference)?;

            for derived in self.derive_subset_constraints()? {
                tracing::trace!(constraint = %derived, "derived constraint");
                if self.insert(derived) {
                    inference.constraints_added += 1;
                    changed = true;
                }
            }

            if !changed {
                return Ok(inference);
            }
        }
    }

    /// Marks every cell some constraint pins down as all-mine or all-safe.
    fn mark_known_cells(&mut self, inference: &mut Inference) -> Result<bool, KnowledgeError> {
        let mut safes = BTreeSet::new();
        let mut mines = BTreeSet::new();
        for constraint in self.constraints() {
            safes.extend(constraint.known_safes());
            mines.extend(constraint.known_mines());
        }

        let mut changed = false;
        for cell in safes {
            if self.mark_safe(cell)? {
                inference.safes.insert(cell);
                changed = true;
            }
        }
        for cell in mines {
            if self.mark_mine(cell)? {
                inference.mines.insert(cell);
                changed = true;
            }
        }
        Ok(changed)
    }

    /// Compares every pair of live constraints. Where one cell set contains the
    /// other, the leftover cells carry the difference of the counts.
    fn derive_subset_constraints(&self) -> Result<Vec<Constraint>, KnowledgeError> {
        let mut derived = Vec::new();

        for (a, b) in self
            .constraints()
            .iter()
            .filter(|c| !c.is_empty())
            .tuple_combinations()
        {
            if a == b {
                continue;
            }
            if a.is_subset(b) {
                derived.push(a.resolve(b)?);
            } else if b.is_subset(a) {
                derived.push(b.resolve(a)?);
            }
        }

        Ok(derived)
    }
}
