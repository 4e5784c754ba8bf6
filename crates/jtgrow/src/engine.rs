//! Execution-engine seam and the sampling orchestrator.
//!
//! Once a tree is built it is handed to an engine that calibrates it
//! (collect, leaves to root) and then samples it (distribute, root to
//! leaves), flagging each vertex as it goes. [`sample_once`] grows the tree,
//! runs the engine and checks that every vertex came back sampled.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::GrowthConfig;
use crate::error::{JtError, Result};
use crate::frontier::grow_junction_tree;
use crate::junction_tree::{JunctionTree, TreeSummary};
use crate::mrf::MarkovNetwork;
use crate::var_set::VarId;

/// Consumer of a finished junction tree.
pub trait TreeEngine {
    /// Calibrate then sample `tree`, marking each vertex as it completes.
    fn run(&mut self, tree: &mut JunctionTree) -> Result<()>;
}

impl<F> TreeEngine for F
where
    F: FnMut(&mut JunctionTree) -> Result<()>,
{
    fn run(&mut self, tree: &mut JunctionTree) -> Result<()> {
        self(tree)
    }
}

/// Pass of the two-phase schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Calibrate,
    Sample,
}

/// Single-threaded engine that performs the collect/distribute schedule and
/// records the order in which vertices were visited.
///
/// Vertex indices put every parent before its children, so a reverse index
/// scan is a post-order and a forward scan is a pre-order.
#[derive(Debug, Clone, Default)]
pub struct SequentialEngine {
    schedule: Vec<(Phase, usize)>,
}

impl SequentialEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visits of the last run, in order.
    pub fn schedule(&self) -> &[(Phase, usize)] {
        &self.schedule
    }

    fn collect(&mut self, tree: &mut JunctionTree) -> Result<()> {
        for id in (0..tree.num_vertices()).rev() {
            let pending_child = tree
                .children(id)
                .find(|&child| tree.vertex(child).is_some_and(|c| !c.calibrated));
            if let Some(child) = pending_child {
                return Err(JtError::Engine(format!(
                    "vertex {} calibrated before child {}",
                    id, child
                )));
            }
            if let Some(vertex) = tree.vertex_mut(id) {
                vertex.calibrated = true;
            }
            self.schedule.push((Phase::Calibrate, id));
        }
        Ok(())
    }

    fn distribute(&mut self, tree: &mut JunctionTree) -> Result<()> {
        for id in 0..tree.num_vertices() {
            let (parent, calibrated) = match tree.vertex(id) {
                Some(vertex) => (vertex.parent, vertex.calibrated),
                None => continue,
            };
            if !calibrated {
                return Err(JtError::Engine(format!(
                    "vertex {} sampled before calibration",
                    id
                )));
            }
            if let Some(parent) = parent {
                if !tree.vertex(parent).is_some_and(|p| p.sampled) {
                    return Err(JtError::Engine(format!(
                        "vertex {} sampled before parent {}",
                        id, parent
                    )));
                }
            }
            if let Some(vertex) = tree.vertex_mut(id) {
                vertex.sampled = true;
            }
            self.schedule.push((Phase::Sample, id));
        }
        Ok(())
    }
}

impl TreeEngine for SequentialEngine {
    fn run(&mut self, tree: &mut JunctionTree) -> Result<()> {
        self.schedule.clear();
        self.collect(tree)?;
        self.distribute(tree)?;
        debug!(visits = self.schedule.len(), "sequential engine finished");
        Ok(())
    }
}

/// What one sampling pass built and visited.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceReport {
    pub root: VarId,
    pub tree: TreeSummary,
    pub accepted: Vec<VarId>,
    pub rejected: Vec<VarId>,
}

/// Grow a tree from `root`, run `engine` over it and verify completion.
///
/// An engine that returns without sampling every vertex is an
/// [`JtError::Invariant`] failure, not a budget outcome.
pub fn sample_once<N, E>(
    mrf: &N,
    root: VarId,
    config: &GrowthConfig,
    engine: &mut E,
) -> Result<InferenceReport>
where
    N: MarkovNetwork + ?Sized,
    E: TreeEngine + ?Sized,
{
    let growth = grow_junction_tree(mrf, root, config)?;
    let mut tree = growth.tree;
    let summary = tree.summary();
    info!(
        root,
        vertices = summary.vertices,
        treewidth = summary.treewidth,
        rejected = growth.rejected.len(),
        "junction tree built"
    );

    engine.run(&mut tree)?;

    if let Some(vertex) = tree.vertices().iter().find(|v| !v.sampled) {
        return Err(JtError::Invariant(format!(
            "vertex {} was not sampled",
            vertex.id
        )));
    }
    info!(root, "engine finished");

    Ok(InferenceReport {
        root,
        tree: summary,
        accepted: growth.accepted,
        rejected: growth.rejected,
    })
}
