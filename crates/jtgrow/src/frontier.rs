//! Breadth-first growth of a junction tree from a root variable.
//!
//! Variables are offered to an [`AdmissionPolicy`] in BFS order. An accepted
//! variable opens its neighbors to the frontier; a rejected one stays
//! rejected and is never offered again.
//!
//! ```no_run
//! use jtgrow::{grow_junction_tree, GrowthConfig, Mrf};
//!
//! let mrf = Mrf::grid(16, 16, 2);
//! let growth = grow_junction_tree(&mrf, 0, &GrowthConfig::default())?;
//! println!("{} accepted, treewidth {}", growth.accepted.len(), growth.tree.treewidth());
//! # Ok::<(), jtgrow::JtError>(())
//! ```

use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info_span};

use crate::config::{AdmissionStrategy, GrowthConfig};
use crate::elimination::{evaluate_order, Incidence};
use crate::error::{BudgetExceeded, JtError, Result};
use crate::incremental::{Budget, EliminationState};
use crate::junction_tree::JunctionTree;
use crate::min_fill::min_fill_order;
use crate::mrf::MarkovNetwork;
use crate::var_set::VarId;

/// Decides, one variable at a time, whether the growing tree can absorb it.
pub trait AdmissionPolicy {
    /// Try to add `var`. A rejection must leave the policy as it was.
    fn offer<N>(&mut self, mrf: &N, var: VarId) -> std::result::Result<(), BudgetExceeded>
    where
        N: MarkovNetwork + ?Sized;

    /// Assemble the accepted variables into a junction tree.
    fn finish<N>(self, mrf: &N) -> Result<JunctionTree>
    where
        N: MarkovNetwork + ?Sized;
}

/// Inserts each variable into the live clique list.
#[derive(Debug, Clone)]
pub struct IncrementalAdmission {
    state: EliminationState,
    budget: Budget,
}

impl IncrementalAdmission {
    pub fn new(budget: Budget) -> Self {
        Self {
            state: EliminationState::new(),
            budget,
        }
    }

    pub fn state(&self) -> &EliminationState {
        &self.state
    }
}

impl AdmissionPolicy for IncrementalAdmission {
    fn offer<N>(&mut self, mrf: &N, var: VarId) -> std::result::Result<(), BudgetExceeded>
    where
        N: MarkovNetwork + ?Sized,
    {
        self.state.try_insert(mrf, var, &self.budget).map(|_| ())
    }

    fn finish<N>(self, mrf: &N) -> Result<JunctionTree>
    where
        N: MarkovNetwork + ?Sized,
    {
        self.state.to_tree(mrf)
    }
}

/// Appends to the accepted order and replays it after every addition.
///
/// The tree is rooted at the first accepted variable.
#[derive(Debug, Clone)]
pub struct ReplayAdmission {
    incidence: Incidence,
    order: Vec<VarId>,
    max_width: usize,
}

impl ReplayAdmission {
    pub fn new(max_width: usize) -> Self {
        Self {
            incidence: Incidence::new(),
            order: Vec::new(),
            max_width,
        }
    }
}

impl AdmissionPolicy for ReplayAdmission {
    fn offer<N>(&mut self, mrf: &N, var: VarId) -> std::result::Result<(), BudgetExceeded>
    where
        N: MarkovNetwork + ?Sized,
    {
        let factors = mrf
            .variable(var)
            .map(|data| data.factor_ids.clone())
            .unwrap_or_default();
        self.incidence.admit(var, &factors);
        self.order.push(var);

        if let Err(err) = evaluate_order(&self.incidence, &self.order, self.max_width) {
            self.order.pop();
            self.incidence.retract(var, &factors);
            return Err(err);
        }
        Ok(())
    }

    fn finish<N>(self, mrf: &N) -> Result<JunctionTree>
    where
        N: MarkovNetwork + ?Sized,
    {
        let run = evaluate_order(&self.incidence, &self.order, self.max_width)?;
        JunctionTree::assemble(mrf, run.into_tree_order())
    }
}

/// Appends to the accepted set and recomputes a min-fill order from scratch.
#[derive(Debug, Clone)]
pub struct MinFillAdmission {
    incidence: Incidence,
    max_width: usize,
}

impl MinFillAdmission {
    pub fn new(max_width: usize) -> Self {
        Self {
            incidence: Incidence::new(),
            max_width,
        }
    }
}

impl AdmissionPolicy for MinFillAdmission {
    fn offer<N>(&mut self, mrf: &N, var: VarId) -> std::result::Result<(), BudgetExceeded>
    where
        N: MarkovNetwork + ?Sized,
    {
        let factors = mrf
            .variable(var)
            .map(|data| data.factor_ids.clone())
            .unwrap_or_default();
        self.incidence.admit(var, &factors);

        if let Err(err) = min_fill_order(&self.incidence, self.max_width) {
            self.incidence.retract(var, &factors);
            return Err(err);
        }
        Ok(())
    }

    fn finish<N>(self, mrf: &N) -> Result<JunctionTree>
    where
        N: MarkovNetwork + ?Sized,
    {
        let run = min_fill_order(&self.incidence, self.max_width)?;
        JunctionTree::assemble(mrf, run.into_tree_order())
    }
}

/// Outcome of a growth run.
#[derive(Debug, Clone, Serialize)]
pub struct Growth {
    pub tree: JunctionTree,
    /// Accepted variables in acceptance order.
    pub accepted: Vec<VarId>,
    /// Variables offered and rejected, in rejection order.
    pub rejected: Vec<VarId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    Enqueued,
    Accepted,
    Rejected,
}

/// Grow a tree from `root` with an explicit policy.
pub fn grow_with<N, P>(
    mrf: &N,
    root: VarId,
    mut policy: P,
    max_vertices: Option<usize>,
) -> Result<Growth>
where
    N: MarkovNetwork + ?Sized,
    P: AdmissionPolicy,
{
    if !mrf.contains(root) {
        return Err(JtError::VariableNotFound(root));
    }

    let mut visit = vec![Visit::Unvisited; mrf.num_variables()];
    let mut queue = VecDeque::new();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    visit[root as usize] = Visit::Enqueued;
    queue.push_back(root);

    while let Some(var) = queue.pop_front() {
        if max_vertices.is_some_and(|cap| accepted.len() >= cap) {
            debug!(cap = accepted.len(), "vertex cap reached");
            break;
        }

        match policy.offer(mrf, var) {
            Ok(()) => {
                debug!(var, "accepted");
                visit[var as usize] = Visit::Accepted;
                accepted.push(var);
                for &next in mrf.out_neighbors(var) {
                    let slot = visit.get_mut(next as usize).ok_or_else(|| {
                        JtError::InvalidModel(format!(
                            "variable {} has unknown neighbor {}",
                            var, next
                        ))
                    })?;
                    if *slot == Visit::Unvisited {
                        *slot = Visit::Enqueued;
                        queue.push_back(next);
                    }
                }
            }
            Err(reason) => {
                debug!(var, %reason, "rejected");
                visit[var as usize] = Visit::Rejected;
                rejected.push(var);
            }
        }
    }

    let tree = policy.finish(mrf)?;
    Ok(Growth {
        tree,
        accepted,
        rejected,
    })
}

/// Grow a tree from `root` using the strategy and budget in `config`.
pub fn grow_junction_tree<N>(mrf: &N, root: VarId, config: &GrowthConfig) -> Result<Growth>
where
    N: MarkovNetwork + ?Sized,
{
    config.validate()?;
    let span = info_span!("grow", root, strategy = %config.strategy);
    let _enter = span.enter();

    let cap = config.max_vertices;
    match config.strategy {
        AdmissionStrategy::Incremental => {
            grow_with(mrf, root, IncrementalAdmission::new(config.budget()), cap)
        }
        AdmissionStrategy::Replay => grow_with(mrf, root, ReplayAdmission::new(config.max_width), cap),
        AdmissionStrategy::MinFill => {
            grow_with(mrf, root, MinFillAdmission::new(config.max_width), cap)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mrf::Mrf;

    #[test]
    fn test_unknown_root() {
        let mrf = Mrf::chain(3, 2);
        let err = grow_junction_tree(&mrf, 7, &GrowthConfig::default()).unwrap_err();
        assert_eq!(err, JtError::VariableNotFound(7));
    }

    #[test]
    fn test_invalid_config() {
        let mrf = Mrf::chain(3, 2);
        let config = GrowthConfig::default().with_max_width(0);
        assert!(matches!(
            grow_junction_tree(&mrf, 0, &config),
            Err(JtError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_chain_accepts_everything() {
        let mrf = Mrf::chain(6, 2);
        for strategy in AdmissionStrategy::ALL {
            let config = GrowthConfig::default()
                .with_max_width(2)
                .with_strategy(strategy);
            let growth = grow_junction_tree(&mrf, 2, &config).unwrap();
            assert_eq!(growth.accepted.len(), 6, "{}", strategy);
            assert!(growth.rejected.is_empty());
            assert_eq!(growth.tree.num_vertices(), 6);
            assert_eq!(growth.tree.treewidth(), 1);
        }
    }

    #[test]
    fn test_bfs_order() {
        let mrf = Mrf::chain(5, 2);
        let growth = grow_junction_tree(&mrf, 2, &GrowthConfig::default()).unwrap();
        assert_eq!(growth.accepted, vec![2, 1, 3, 0, 4]);
        assert_eq!(growth.tree.vertex(0).unwrap().elim_vertex, 2);
    }

    #[test]
    fn test_cycle_rejects_closing_vertex() {
        let mrf = Mrf::cycle(4, 2);
        for strategy in AdmissionStrategy::ALL {
            let config = GrowthConfig::default()
                .with_max_width(2)
                .with_strategy(strategy);
            let growth = grow_junction_tree(&mrf, 0, &config).unwrap();
            assert_eq!(growth.accepted, vec![0, 1, 3], "{}", strategy);
            assert_eq!(growth.rejected, vec![2]);
            assert!(growth.tree.verify_running_intersection_property());
        }
    }

    #[test]
    fn test_vertex_cap() {
        let mrf = Mrf::grid(4, 4, 2);
        let config = GrowthConfig::default().with_max_vertices(5);
        let growth = grow_junction_tree(&mrf, 0, &config).unwrap();
        assert_eq!(growth.accepted.len(), 5);
        assert_eq!(growth.tree.num_vertices(), 5);
    }

    #[test]
    fn test_replay_roots_at_first_accepted() {
        let mrf = Mrf::grid(3, 3, 2);
        let config = GrowthConfig::default().with_strategy(AdmissionStrategy::Replay);
        let growth = grow_junction_tree(&mrf, 4, &config).unwrap();
        assert_eq!(growth.tree.vertex(0).unwrap().elim_vertex, 4);
    }
}
