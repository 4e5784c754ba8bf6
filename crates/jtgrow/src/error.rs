//! Error types for junction tree construction.

use thiserror::Error;

use crate::var_set::{FactorId, VarId};

/// A candidate was rejected because it would exceed the construction budget.
///
/// This is an expected outcome of greedy growth, not a failure: callers treat
/// it as "inadmissible right now" and move on to the next candidate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetExceeded {
    /// A clique would hold more variables than the width limit allows.
    #[error("clique of size {clique_size} exceeds width limit {limit}")]
    Width { clique_size: usize, limit: usize },

    /// The product of arities over a clique scope exceeds the factor-size limit.
    #[error("factor size {size} exceeds limit {limit}")]
    FactorSize { size: u64, limit: u64 },
}

impl BudgetExceeded {
    /// Clique size that triggered a width rejection, if any.
    pub fn clique_size(&self) -> Option<usize> {
        match self {
            Self::Width { clique_size, .. } => Some(*clique_size),
            Self::FactorSize { .. } => None,
        }
    }
}

/// Errors that can occur while building or running a junction tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JtError {
    /// Variable not present in the model.
    #[error("variable not found: {0}")]
    VariableNotFound(VarId),

    /// Factor not present in the model.
    #[error("factor not found: {0}")]
    FactorNotFound(FactorId),

    /// The model itself is malformed.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Construction parameters are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A structural contract was broken. Never expected under correct use.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// The execution engine reported a failure.
    #[error("engine error: {0}")]
    Engine(String),

    /// A budget rejection escalated by a caller that required success.
    #[error("budget exceeded: {0}")]
    Budget(#[from] BudgetExceeded),
}

/// Result type for junction tree operations.
pub type Result<T> = std::result::Result<T, JtError>;
