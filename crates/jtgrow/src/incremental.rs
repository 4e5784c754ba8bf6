//! Incremental clique insertion that keeps the running intersection property.
//!
//! Each accepted variable appends one clique whose context is the set of its
//! already-inserted in-neighbors. If an ancestor on the path to the root does
//! not yet carry that context, it is widened ("bubbled") until the context is
//! resolved. An insertion either completes in full or leaves the state
//! untouched: every hop is first simulated against the budget, and only a
//! fully admissible walk is committed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

use crate::elimination::EliminationClique;
use crate::error::{BudgetExceeded, Result};
use crate::junction_tree::JunctionTree;
use crate::mrf::MarkovNetwork;
use crate::var_set::{VarId, VarSet};

/// Limits applied to every clique an insertion creates or widens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Maximum number of variables in a clique.
    pub max_width: usize,
    /// Maximum product of arities over a clique scope.
    pub max_factor_size: u64,
}

impl Budget {
    pub fn new(max_width: usize, max_factor_size: u64) -> Self {
        Self {
            max_width,
            max_factor_size,
        }
    }

    fn check_width(&self, clique_size: usize) -> std::result::Result<(), BudgetExceeded> {
        if clique_size > self.max_width {
            return Err(BudgetExceeded::Width {
                clique_size,
                limit: self.max_width,
            });
        }
        Ok(())
    }

    fn check_factor_size(&self, size: u64) -> std::result::Result<(), BudgetExceeded> {
        if size > self.max_factor_size {
            return Err(BudgetExceeded::FactorSize {
                size,
                limit: self.max_factor_size,
            });
        }
        Ok(())
    }
}

/// Arity used as a size multiplier; unknown or zero arities count as one.
fn weight<N>(mrf: &N, var: VarId) -> u64
where
    N: MarkovNetwork + ?Sized,
{
    u64::from(mrf.arity(var).max(1))
}

/// Cliques accepted so far, indexed by elimination time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EliminationState {
    cliques: Vec<EliminationClique>,
    elim_time: BTreeMap<VarId, usize>,
}

impl EliminationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cliques.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cliques.is_empty()
    }

    pub fn cliques(&self) -> &[EliminationClique] {
        &self.cliques
    }

    pub fn elim_time(&self) -> &BTreeMap<VarId, usize> {
        &self.elim_time
    }

    pub fn contains(&self, var: VarId) -> bool {
        self.elim_time.contains_key(&var)
    }

    /// Clique holding the latest-inserted member of `vars`; `None` when empty.
    ///
    /// # Panics
    ///
    /// Panics if a member of `vars` has not been inserted.
    pub fn parent_of(&self, vars: &VarSet) -> Option<usize> {
        vars.iter()
            .map(|var| match self.elim_time.get(&var) {
                Some(&time) => time,
                None => panic!("variable {} has no elimination time", var),
            })
            .max()
    }

    /// Insert `var` as a new clique if the budget allows it.
    ///
    /// Returns the elimination time of the new clique. On rejection the state
    /// is left exactly as it was.
    ///
    /// # Panics
    ///
    /// Panics if `var` was already inserted.
    pub fn try_insert<N>(
        &mut self,
        mrf: &N,
        var: VarId,
        budget: &Budget,
    ) -> std::result::Result<usize, BudgetExceeded>
    where
        N: MarkovNetwork + ?Sized,
    {
        assert!(!self.contains(var), "variable {} inserted twice", var);

        let mut vertices = VarSet::new();
        let mut factor_size = weight(mrf, var);
        budget.check_factor_size(factor_size)?;
        for &neighbor in mrf.in_neighbors(var) {
            if self.contains(neighbor) && vertices.insert(neighbor) {
                factor_size = factor_size.saturating_mul(weight(mrf, neighbor));
                budget.check_width(vertices.len() + 1)?;
                budget.check_factor_size(factor_size)?;
            }
        }

        let parent = if self.cliques.is_empty() {
            None
        } else {
            Some(self.parent_of(&vertices).unwrap_or(0))
        };

        self.simulate_bubbling(mrf, parent, &vertices, budget)?;

        let time = self.cliques.len();
        let mut clique = EliminationClique::new(var, vertices.clone());
        clique.parent = parent;
        self.cliques.push(clique);
        self.elim_time.insert(var, time);
        self.commit_bubbling(parent, vertices);

        Ok(time)
    }

    /// Walk the ancestors that would be widened without touching them.
    fn simulate_bubbling<N>(
        &self,
        mrf: &N,
        start: Option<usize>,
        vertices: &VarSet,
        budget: &Budget,
    ) -> std::result::Result<(), BudgetExceeded>
    where
        N: MarkovNetwork + ?Sized,
    {
        let mut pending = vertices.clone();
        let mut cursor = start;
        while let Some(idx) = cursor.filter(|_| !pending.is_empty()) {
            let ancestor = &self.cliques[idx];
            pending.union_with(&ancestor.vertices);
            pending.remove(ancestor.elim_vertex);

            budget.check_width(pending.len() + 1)?;
            let size = pending
                .iter()
                .fold(weight(mrf, ancestor.elim_vertex), |acc, v| {
                    acc.saturating_mul(weight(mrf, v))
                });
            budget.check_factor_size(size)?;

            cursor = self.parent_of(&pending);
        }
        Ok(())
    }

    /// Repeat the simulated walk, widening each visited ancestor.
    fn commit_bubbling(&mut self, start: Option<usize>, mut pending: VarSet) {
        let mut cursor = start;
        while let Some(idx) = cursor.filter(|_| !pending.is_empty()) {
            let ancestor = &self.cliques[idx];
            pending.union_with(&ancestor.vertices);
            pending.remove(ancestor.elim_vertex);

            let next = self.parent_of(&pending);
            let ancestor = &mut self.cliques[idx];
            trace!(
                clique = idx,
                widened = ancestor.vertices != pending,
                vertices = %pending,
                "bubbling hop"
            );
            ancestor.vertices = pending.clone();
            if idx > 0 {
                ancestor.parent = Some(next.unwrap_or(0));
            }
            cursor = next;
        }
    }

    /// Assemble the accepted cliques into a junction tree.
    pub fn to_tree<N>(&self, mrf: &N) -> Result<JunctionTree>
    where
        N: MarkovNetwork + ?Sized,
    {
        JunctionTree::assemble_with_times(mrf, &self.elim_time, self.cliques.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mrf::Mrf;

    fn roomy() -> Budget {
        Budget::new(8, 1 << 20)
    }

    #[test]
    fn test_first_insert_is_root() {
        let mrf = Mrf::chain(3, 2);
        let mut state = EliminationState::new();
        assert_eq!(state.try_insert(&mrf, 1, &roomy()), Ok(0));
        let root = &state.cliques()[0];
        assert_eq!(root.parent, None);
        assert!(root.vertices.is_empty());
    }

    #[test]
    fn test_child_of_root_needs_no_bubbling() {
        let mrf = Mrf::chain(3, 2);
        let mut state = EliminationState::new();
        state.try_insert(&mrf, 1, &roomy()).unwrap();
        let before = state.cliques()[0].clone();

        assert_eq!(state.try_insert(&mrf, 0, &roomy()), Ok(1));
        let child = &state.cliques()[1];
        assert_eq!(child.parent, Some(0));
        assert_eq!(child.vertices.as_slice(), &[1]);
        assert_eq!(state.cliques()[0], before);
    }

    #[test]
    fn test_bubbling_widens_ancestors() {
        // 0 - 1 - 2 and 0 - 3 - 2: inserting 2 last closes a 4-cycle
        let mrf = Mrf::cycle(4, 2);
        let mut state = EliminationState::new();
        for var in [0, 1, 3] {
            state.try_insert(&mrf, var, &roomy()).unwrap();
        }
        let time = state.try_insert(&mrf, 2, &roomy()).unwrap();
        assert_eq!(time, 3);

        // context {1, 3}; parent is the clique of 3, which must now carry 1
        let clique = &state.cliques()[3];
        assert_eq!(clique.vertices.as_slice(), &[1, 3]);
        assert_eq!(clique.parent, Some(2));
        let widened = &state.cliques()[2];
        assert_eq!(widened.elim_vertex, 3);
        assert_eq!(widened.vertices.as_slice(), &[0, 1]);
        assert_eq!(widened.parent, Some(1));

        let tree = state.to_tree(&mrf).unwrap();
        assert!(tree.verify_running_intersection_property());
        assert_eq!(tree.treewidth(), 2);
    }

    #[test]
    fn test_rejected_bubbling_leaves_state_untouched() {
        let mrf = Mrf::cycle(4, 2);
        let mut state = EliminationState::new();
        let tight = Budget::new(2, 1 << 20);
        for var in [0, 1, 3] {
            state.try_insert(&mrf, var, &tight).unwrap();
        }
        let snapshot = state.clone();

        // the new clique {2, 1, 3} is already too wide
        let err = state.try_insert(&mrf, 2, &tight).unwrap_err();
        assert_eq!(err.clique_size(), Some(3));
        assert_eq!(state, snapshot);
    }

    /// Triangle-free model where 3 sits under 1 with context {0, 1}, and 4
    /// joins 2 and 3: the new clique fits, widening the clique of 3 does not.
    fn walk_model() -> Mrf {
        let mut mrf = Mrf::new();
        for _ in 0..5 {
            mrf.add_variable(2);
        }
        for scope in [[0, 1], [0, 2], [0, 3], [1, 3], [2, 4], [3, 4]] {
            mrf.add_factor(&scope).unwrap();
        }
        mrf
    }

    #[test]
    fn test_rejected_only_during_walk() {
        let mrf = walk_model();
        let budget = Budget::new(3, 1 << 20);
        let mut state = EliminationState::new();
        for var in 0..4 {
            state.try_insert(&mrf, var, &budget).unwrap();
        }
        assert_eq!(state.cliques()[3].vertices.as_slice(), &[0, 1]);
        let snapshot = state.clone();

        // {4, 2, 3} fits; pushing 2 into the clique of 3 gives {3, 0, 1, 2}
        let err = state.try_insert(&mrf, 4, &budget).unwrap_err();
        assert_eq!(err.clique_size(), Some(4));
        assert_eq!(state, snapshot);

        let wider = Budget::new(4, 1 << 20);
        let mut state = snapshot;
        state.try_insert(&mrf, 4, &wider).unwrap();
        assert_eq!(state.cliques()[3].vertices.as_slice(), &[0, 1, 2]);
        assert_eq!(state.cliques()[3].parent, Some(2));
        assert_eq!(state.cliques()[2].vertices.as_slice(), &[0, 1]);
        assert!(state
            .to_tree(&mrf)
            .unwrap()
            .verify_running_intersection_property());
    }

    #[test]
    fn test_factor_size_limit() {
        let mut mrf = Mrf::new();
        let a = mrf.add_variable(4);
        let b = mrf.add_variable(4);
        mrf.add_factor(&[a, b]).unwrap();

        let mut state = EliminationState::new();
        let budget = Budget::new(4, 8);
        state.try_insert(&mrf, a, &budget).unwrap();
        let err = state.try_insert(&mrf, b, &budget).unwrap_err();
        assert_eq!(err, BudgetExceeded::FactorSize { size: 16, limit: 8 });
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_zero_arity_counts_as_one() {
        let mut mrf = Mrf::new();
        let a = mrf.add_variable(0);
        let b = mrf.add_variable(2);
        mrf.add_factor(&[a, b]).unwrap();

        let mut state = EliminationState::new();
        let budget = Budget::new(2, 2);
        state.try_insert(&mrf, a, &budget).unwrap();
        state.try_insert(&mrf, b, &budget).unwrap();
        assert_eq!(state.len(), 2);
    }

    #[test]
    #[should_panic(expected = "inserted twice")]
    fn test_double_insert_panics() {
        let mrf = Mrf::chain(2, 2);
        let mut state = EliminationState::new();
        state.try_insert(&mrf, 0, &roomy()).unwrap();
        let _ = state.try_insert(&mrf, 0, &roomy());
    }
}
