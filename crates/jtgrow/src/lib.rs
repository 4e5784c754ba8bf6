//! Junction tree construction for discrete Markov random fields.
//!
//! This crate turns the structure of an MRF into a junction tree whose
//! cliques respect a width budget (and, for incremental growth, a factor-size
//! budget), ready to be handed to a calibration and sampling engine.
//!
//! # Core Concepts
//!
//! - **Elimination simulation**: eliminating a variable merges its factors;
//!   the eliminated variable plus its remaining neighbors form a clique
//! - **Min-fill ordering**: greedy order that keeps fill-in, and so width, low
//! - **Assembly**: cliques become tree vertices, each linked to the clique of
//!   its latest-eliminated neighbor, with every factor placed exactly once
//! - **Incremental growth**: variables join one at a time in BFS order from a
//!   root, widening ancestor cliques so the running intersection property holds
//!
//! # Architecture
//!
//! ```text
//! Mrf ──► frontier (BFS) ──► AdmissionPolicy ──► cliques ──► JunctionTree ──► TreeEngine
//!                              │ incremental: EliminationState::try_insert
//!                              │ replay:      evaluate_order
//!                              │ min-fill:    min_fill_order
//! ```
//!
//! # Example
//!
//! ```
//! use jtgrow::{grow_junction_tree, GrowthConfig, Mrf};
//!
//! let mrf = Mrf::cycle(4, 2);
//! let config = GrowthConfig::default().with_max_width(3);
//! let growth = grow_junction_tree(&mrf, 0, &config)?;
//!
//! assert_eq!(growth.tree.num_vertices(), 4);
//! assert_eq!(growth.tree.treewidth(), 2);
//! assert!(growth.tree.verify_running_intersection_property());
//! # Ok::<(), jtgrow::JtError>(())
//! ```

mod config;
mod elimination;
mod engine;
mod error;
mod frontier;
mod incremental;
mod junction_tree;
mod min_fill;
mod mrf;
mod var_set;

pub use config::{AdmissionStrategy, GrowthConfig};
pub use elimination::{
    evaluate_order, EliminationClique, EliminationRun, EliminationSimulator, Incidence,
};
pub use engine::{sample_once, InferenceReport, Phase, SequentialEngine, TreeEngine};
pub use error::{BudgetExceeded, JtError, Result};
pub use frontier::{
    grow_junction_tree, grow_with, AdmissionPolicy, Growth, IncrementalAdmission,
    MinFillAdmission, ReplayAdmission,
};
pub use incremental::{Budget, EliminationState};
pub use junction_tree::{JunctionTree, TreeEdge, TreeSummary, TreeVertex};
pub use min_fill::{build_min_fill_tree, min_fill_order};
pub use mrf::{MarkovNetwork, Mrf, VariableData};
pub use var_set::{FactorId, FactorSet, IdSet, VarId, VarSet};
