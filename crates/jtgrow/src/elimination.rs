//! Variable elimination simulation over factor scopes.
//!
//! Eliminating a variable merges every factor that touches it into one
//! synthetic factor over the remaining variables. The eliminated variable
//! plus those remaining variables form an elimination clique; the largest
//! clique seen bounds the width of the resulting tree decomposition.
//!
//! The simulator works on private copies of the incidence maps, so a caller's
//! [`Incidence`] is never mutated and repeated runs over the same input give
//! identical results.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

use crate::error::{BudgetExceeded, JtError, Result};
use crate::mrf::MarkovNetwork;
use crate::var_set::{FactorId, FactorSet, VarId, VarSet};

/// Clique produced by eliminating one variable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EliminationClique {
    /// The variable this clique eliminates.
    pub elim_vertex: VarId,
    /// Other variables still connected to `elim_vertex` when it was eliminated.
    pub vertices: VarSet,
    /// Index of the parent clique; `None` marks the root.
    pub parent: Option<usize>,
    /// Original factors attributed to this clique.
    pub factor_ids: FactorSet,
}

impl EliminationClique {
    pub fn new(elim_vertex: VarId, vertices: VarSet) -> Self {
        Self {
            elim_vertex,
            vertices,
            parent: None,
            factor_ids: FactorSet::new(),
        }
    }

    /// `{elim_vertex} ∪ vertices`.
    pub fn scope(&self) -> VarSet {
        let mut scope = self.vertices.clone();
        scope.insert(self.elim_vertex);
        scope
    }

    /// Number of variables in the scope.
    pub fn size(&self) -> usize {
        self.vertices.len() + 1
    }
}

/// Variable/factor incidence of the collection being decomposed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Incidence {
    var_to_factors: BTreeMap<VarId, FactorSet>,
    factor_to_vars: BTreeMap<FactorId, VarSet>,
}

impl Incidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict a network to `vars`: factor scopes only mention listed variables.
    pub fn from_network<N, I>(mrf: &N, vars: I) -> Result<Self>
    where
        N: MarkovNetwork + ?Sized,
        I: IntoIterator<Item = VarId>,
    {
        let mut incidence = Self::new();
        for var in vars {
            let data = mrf.variable(var).ok_or(JtError::VariableNotFound(var))?;
            incidence.admit(var, &data.factor_ids);
        }
        Ok(incidence)
    }

    /// Add `var` with its incident factors.
    pub fn admit(&mut self, var: VarId, factors: &FactorSet) {
        self.var_to_factors.insert(var, factors.clone());
        for fid in factors {
            self.factor_to_vars.entry(fid).or_default().insert(var);
        }
    }

    /// Undo [`admit`](Self::admit) for `var`.
    pub fn retract(&mut self, var: VarId, factors: &FactorSet) {
        self.var_to_factors.remove(&var);
        for fid in factors {
            if let Some(scope) = self.factor_to_vars.get_mut(&fid) {
                scope.remove(var);
                if scope.is_empty() {
                    self.factor_to_vars.remove(&fid);
                }
            }
        }
    }

    pub fn contains(&self, var: VarId) -> bool {
        self.var_to_factors.contains_key(&var)
    }

    pub fn num_variables(&self) -> usize {
        self.var_to_factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.var_to_factors.is_empty()
    }

    /// Variables in ascending id order.
    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        self.var_to_factors.keys().copied()
    }

    pub fn factors_of(&self, var: VarId) -> Option<&FactorSet> {
        self.var_to_factors.get(&var)
    }

    pub fn scope_of(&self, factor: FactorId) -> Option<&VarSet> {
        self.factor_to_vars.get(&factor)
    }

    /// Largest factor id referenced, `None` when there are no factors.
    pub fn max_factor_id(&self) -> Option<FactorId> {
        self.factor_to_vars.keys().next_back().copied()
    }
}

/// Replays eliminations on scratch copies of an [`Incidence`].
#[derive(Clone, Debug)]
pub struct EliminationSimulator {
    var_to_factors: BTreeMap<VarId, FactorSet>,
    factor_to_vars: BTreeMap<FactorId, VarSet>,
    next_factor_id: FactorId,
    eliminated: VarSet,
    max_width: usize,
    max_clique_size: usize,
}

impl EliminationSimulator {
    /// Start a simulation; cliques larger than `max_width` are rejected.
    pub fn new(incidence: &Incidence, max_width: usize) -> Self {
        Self {
            var_to_factors: incidence.var_to_factors.clone(),
            factor_to_vars: incidence.factor_to_vars.clone(),
            // Synthetic factors never collide with real ones.
            next_factor_id: incidence.max_factor_id().map_or(0, |id| id + 1),
            eliminated: VarSet::new(),
            max_width,
            max_clique_size: 0,
        }
    }

    /// Union of the scopes of every factor currently incident to `var`.
    pub fn fill_clique(&self, var: VarId) -> VarSet {
        let mut clique = VarSet::new();
        if let Some(factors) = self.var_to_factors.get(&var) {
            for fid in factors {
                if let Some(scope) = self.factor_to_vars.get(&fid) {
                    clique.union_with(scope);
                }
            }
        }
        clique
    }

    /// Edges a complete graph over `fill_clique(var)` would need.
    pub fn fill_cost(&self, var: VarId) -> usize {
        let n = self.fill_clique(var).len();
        n * n.saturating_sub(1) / 2
    }

    /// Eliminate `var` and return the variables it was still connected to.
    ///
    /// Fails fast, leaving the simulation unusable, once a clique exceeds the
    /// width limit.
    ///
    /// # Panics
    ///
    /// Panics if `var` was already eliminated in this simulation.
    pub fn eliminate(&mut self, var: VarId) -> std::result::Result<VarSet, BudgetExceeded> {
        assert!(self.eliminated.insert(var), "variable {} eliminated twice", var);

        let factors = self.var_to_factors.remove(&var).unwrap_or_default();
        let mut affected = VarSet::new();
        for fid in &factors {
            if let Some(scope) = self.factor_to_vars.get_mut(&fid) {
                scope.remove(var);
                affected.union_with(scope);
            }
        }

        let clique_size = affected.len() + 1;
        self.max_clique_size = self.max_clique_size.max(clique_size);
        if clique_size > self.max_width {
            return Err(BudgetExceeded::Width {
                clique_size,
                limit: self.max_width,
            });
        }

        if factors.len() > 1 {
            let merged = self.next_factor_id;
            self.next_factor_id += 1;
            self.factor_to_vars.insert(merged, affected.clone());
            for other in &affected {
                let incident = self.var_to_factors.entry(other).or_default();
                incident.difference_with(&factors);
                incident.insert(merged);
            }
        }

        trace!(var, affected = %affected, "eliminated variable");
        Ok(affected)
    }

    /// Largest clique produced so far.
    pub fn max_clique_size(&self) -> usize {
        self.max_clique_size
    }
}

/// Outcome of a complete elimination within budget.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EliminationRun {
    /// Variables in the order they were eliminated.
    pub order: Vec<VarId>,
    /// One clique per eliminated variable, in elimination order.
    pub cliques: Vec<EliminationClique>,
    /// Size of the largest clique.
    pub max_clique_size: usize,
}

impl EliminationRun {
    /// Largest clique size minus one.
    pub fn treewidth(&self) -> usize {
        self.max_clique_size.saturating_sub(1)
    }

    /// Cliques with the last-eliminated one first.
    ///
    /// In this order every clique's `vertices` were eliminated later, so they
    /// sit at smaller indices: the form [`JunctionTree::assemble`] expects.
    ///
    /// [`JunctionTree::assemble`]: crate::JunctionTree::assemble
    pub fn into_tree_order(self) -> Vec<EliminationClique> {
        let mut cliques = self.cliques;
        cliques.reverse();
        cliques
    }
}

/// Replay a caller-supplied order, consuming it from the back.
///
/// The most recently proposed variable is eliminated first, so a growing list
/// of accepted variables can be revalidated after each tentative addition.
pub fn evaluate_order(
    incidence: &Incidence,
    order: &[VarId],
    max_width: usize,
) -> std::result::Result<EliminationRun, BudgetExceeded> {
    let mut sim = EliminationSimulator::new(incidence, max_width);
    let mut run = EliminationRun::default();
    for &var in order.iter().rev() {
        let affected = sim.eliminate(var)?;
        run.order.push(var);
        run.cliques.push(EliminationClique::new(var, affected));
    }
    run.max_clique_size = sim.max_clique_size();
    Ok(run)
}
