//! Markov random field adjacency consumed by tree construction.
//!
//! Construction only needs the structure of the model: each variable's arity,
//! the factors incident to it, its neighbors, and each factor's scope. Numeric
//! potentials live elsewhere. [`MarkovNetwork`] is that seam; [`Mrf`] is the
//! in-crate implementation used by the CLI, the benches and the tests.

use serde::Serialize;

use crate::error::{JtError, Result};
use crate::var_set::{FactorId, FactorSet, VarId, VarSet};

/// Per-variable data visible to tree construction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VariableData {
    /// Number of discrete states.
    pub arity: u32,
    /// Factors whose scope contains this variable.
    pub factor_ids: FactorSet,
}

/// Structural view of a discrete MRF.
pub trait MarkovNetwork {
    /// Number of variables; ids are `0..num_variables()`.
    fn num_variables(&self) -> usize;

    /// Variable data, or `None` for an unknown id.
    fn variable(&self, var: VarId) -> Option<&VariableData>;

    /// Variables reachable along outgoing edges.
    fn out_neighbors(&self, var: VarId) -> &[VarId];

    /// Variables with an edge into `var`.
    fn in_neighbors(&self, var: VarId) -> &[VarId];

    /// Scope of a factor.
    fn factor_scope(&self, factor: FactorId) -> Option<&VarSet>;

    fn contains(&self, var: VarId) -> bool {
        self.variable(var).is_some()
    }

    /// Arity of `var`, `0` when unknown.
    fn arity(&self, var: VarId) -> u32 {
        self.variable(var).map_or(0, |data| data.arity)
    }
}

/// Undirected MRF where two variables are neighbors iff they share a factor.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Mrf {
    variables: Vec<VariableData>,
    neighbors: Vec<Vec<VarId>>,
    factors: Vec<VarSet>,
}

impl Mrf {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable with the given arity and return its id.
    pub fn add_variable(&mut self, arity: u32) -> VarId {
        let id = self.variables.len() as VarId;
        self.variables.push(VariableData {
            arity,
            factor_ids: FactorSet::new(),
        });
        self.neighbors.push(Vec::new());
        id
    }

    /// Add a factor over `scope` and return its id.
    pub fn add_factor(&mut self, scope: &[VarId]) -> Result<FactorId> {
        if scope.is_empty() {
            return Err(JtError::InvalidModel("factor with empty scope".to_string()));
        }
        if let Some(&missing) = scope.iter().find(|&&v| !self.contains(v)) {
            return Err(JtError::VariableNotFound(missing));
        }
        Ok(self.link(VarSet::from_slice(scope)))
    }

    fn link(&mut self, scope: VarSet) -> FactorId {
        let fid = self.factors.len() as FactorId;
        for var in &scope {
            self.variables[var as usize].factor_ids.insert(fid);
            let adjacent = &mut self.neighbors[var as usize];
            for other in &scope {
                if other != var {
                    if let Err(pos) = adjacent.binary_search(&other) {
                        adjacent.insert(pos, other);
                    }
                }
            }
        }
        self.factors.push(scope);
        fid
    }

    fn with_variables(n: usize, arity: u32) -> Self {
        let mut mrf = Self::new();
        for var in 0..n {
            mrf.add_variable(arity);
            mrf.link(VarSet::singleton(var as VarId));
        }
        mrf
    }

    /// Path `0 - 1 - ... - (n-1)` with a unary factor per variable.
    pub fn chain(n: usize, arity: u32) -> Self {
        let mut mrf = Self::with_variables(n, arity);
        for var in 1..n as VarId {
            mrf.link(VarSet::from_slice(&[var - 1, var]));
        }
        mrf
    }

    /// Cycle `0 - 1 - ... - (n-1) - 0` with a unary factor per variable.
    ///
    /// Fewer than three variables cannot close a cycle and yield a chain.
    pub fn cycle(n: usize, arity: u32) -> Self {
        let mut mrf = Self::chain(n, arity);
        if n >= 3 {
            mrf.link(VarSet::from_slice(&[0, (n - 1) as VarId]));
        }
        mrf
    }

    /// Four-connected `rows x cols` lattice, the shape of an image model.
    ///
    /// Variable `(r, c)` has id `r * cols + c`.
    pub fn grid(rows: usize, cols: usize, arity: u32) -> Self {
        let mut mrf = Self::with_variables(rows * cols, arity);
        for r in 0..rows {
            for c in 0..cols {
                let var = (r * cols + c) as VarId;
                if c + 1 < cols {
                    mrf.link(VarSet::from_slice(&[var, var + 1]));
                }
                if r + 1 < rows {
                    mrf.link(VarSet::from_slice(&[var, var + cols as VarId]));
                }
            }
        }
        mrf
    }

    pub fn num_factors(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterate `(id, data)` over all variables.
    pub fn variables(&self) -> impl Iterator<Item = (VarId, &VariableData)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(id, data)| (id as VarId, data))
    }

    /// Iterate `(id, scope)` over all factors.
    pub fn factors(&self) -> impl Iterator<Item = (FactorId, &VarSet)> {
        self.factors
            .iter()
            .enumerate()
            .map(|(id, scope)| (id as FactorId, scope))
    }
}

impl MarkovNetwork for Mrf {
    fn num_variables(&self) -> usize {
        self.variables.len()
    }

    fn variable(&self, var: VarId) -> Option<&VariableData> {
        self.variables.get(var as usize)
    }

    fn out_neighbors(&self, var: VarId) -> &[VarId] {
        self.neighbors
            .get(var as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn in_neighbors(&self, var: VarId) -> &[VarId] {
        self.out_neighbors(var)
    }

    fn factor_scope(&self, factor: FactorId) -> Option<&VarSet> {
        self.factors.get(factor as usize)
    }
}
