//! Junction trees assembled from elimination cliques.
//!
//! A junction tree (clique tree) has one vertex per elimination clique. Each
//! vertex links to the clique holding the latest-eliminated member of its
//! context, and each edge is labeled with the separator shared by its two
//! endpoints. Every original factor is attached to exactly one vertex.
//!
//! # Clique order
//!
//! [`JunctionTree::assemble`] takes cliques in *tree order*: the root first,
//! and every clique's `vertices` at strictly smaller indices. The index of a
//! clique is its elimination time. Picking the parent as the clique with the
//! largest elimination time among a clique's context gives the running
//! intersection property by construction, and every parent precedes its
//! children, so index order is a valid root-to-leaves schedule.
//!
//! ```text
//! cliques (tree order)          junction tree
//!   0: 3 | {}                      {3}
//!   1: 2 | {3}                      |  sep {3}
//!   2: 1 | {2}                    {2,3}
//!   3: 0 | {1}                      |  sep {2}
//!                                 {1,2}
//!                                   |  sep {1}
//!                                 {0,1}
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::elimination::EliminationClique;
use crate::error::{JtError, Result};
use crate::mrf::MarkovNetwork;
use crate::var_set::{FactorSet, VarId, VarSet};

/// A vertex of the junction tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeVertex {
    /// Index of this vertex (its elimination time).
    pub id: usize,
    /// Variable whose elimination produced the clique.
    pub elim_vertex: VarId,
    /// Variables in the clique.
    pub scope: VarSet,
    /// Parent vertex; `None` for the root.
    pub parent: Option<usize>,
    /// Original factors assigned to this vertex.
    pub factor_ids: FactorSet,
    /// Set by the execution engine once messages have been collected.
    pub calibrated: bool,
    /// Set by the execution engine once the clique has been sampled.
    pub sampled: bool,
}

/// A directed edge; every tree link is stored in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEdge {
    pub source: usize,
    pub target: usize,
    /// Variables shared by both endpoints.
    pub separator: VarSet,
}

/// Shape statistics of a junction tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeSummary {
    pub vertices: usize,
    pub edges: usize,
    pub treewidth: usize,
    pub max_clique_size: usize,
    pub max_separator_size: usize,
    pub factors: usize,
}

/// Junction tree over an MRF.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JunctionTree {
    vertices: Vec<TreeVertex>,
    edges: Vec<TreeEdge>,
    /// Outgoing edge indices per vertex.
    #[serde(skip)]
    adjacency: Vec<Vec<usize>>,
}

impl JunctionTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from cliques in tree order.
    pub fn assemble<N>(mrf: &N, cliques: Vec<EliminationClique>) -> Result<Self>
    where
        N: MarkovNetwork + ?Sized,
    {
        let mut elim_time = BTreeMap::new();
        for (time, clique) in cliques.iter().enumerate() {
            if elim_time.insert(clique.elim_vertex, time).is_some() {
                return Err(JtError::Invariant(format!(
                    "variable {} eliminated twice",
                    clique.elim_vertex
                )));
            }
        }
        Self::assemble_with_times(mrf, &elim_time, cliques)
    }

    /// Build a tree from cliques in tree order and their elimination times.
    pub fn assemble_with_times<N>(
        mrf: &N,
        elim_time: &BTreeMap<VarId, usize>,
        mut cliques: Vec<EliminationClique>,
    ) -> Result<Self>
    where
        N: MarkovNetwork + ?Sized,
    {
        for (time, clique) in cliques.iter_mut().enumerate() {
            clique.parent = if time == 0 {
                None
            } else {
                Some(latest_eliminated(elim_time, &clique.vertices, time)?)
            };
        }

        let mut tree = Self::new();
        for (id, clique) in cliques.into_iter().enumerate() {
            if !mrf.contains(clique.elim_vertex) {
                return Err(JtError::VariableNotFound(clique.elim_vertex));
            }
            let scope = clique.scope();
            tree.vertices.push(TreeVertex {
                id,
                elim_vertex: clique.elim_vertex,
                scope,
                parent: clique.parent,
                factor_ids: FactorSet::new(),
                calibrated: false,
                sampled: false,
            });
            tree.adjacency.push(Vec::new());

            if let Some(parent) = clique.parent {
                let separator = tree.vertices[id]
                    .scope
                    .intersect(&tree.vertices[parent].scope);
                tree.link(id, parent, separator.clone());
                tree.link(parent, id, separator);
            }
        }

        tree.assign_factors(mrf);

        debug!(
            vertices = tree.num_vertices(),
            treewidth = tree.treewidth(),
            "assembled junction tree"
        );
        Ok(tree)
    }

    fn link(&mut self, source: usize, target: usize, separator: VarSet) {
        self.adjacency[source].push(self.edges.len());
        self.edges.push(TreeEdge {
            source,
            target,
            separator,
        });
    }

    /// Scanning from the last vertex back, each vertex claims the unclaimed
    /// factors of its eliminated variable, so a factor lands on the vertex of
    /// its latest member in tree order.
    fn assign_factors<N>(&mut self, mrf: &N)
    where
        N: MarkovNetwork + ?Sized,
    {
        let mut claimed = FactorSet::new();
        for vertex in self.vertices.iter_mut().rev() {
            let Some(data) = mrf.variable(vertex.elim_vertex) else {
                continue;
            };
            for fid in &data.factor_ids {
                if claimed.insert(fid) {
                    vertex.factor_ids.insert(fid);
                }
            }
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, id: usize) -> Option<&TreeVertex> {
        self.vertices.get(id)
    }

    pub fn vertex_mut(&mut self, id: usize) -> Option<&mut TreeVertex> {
        self.vertices.get_mut(id)
    }

    pub fn vertices(&self) -> &[TreeVertex] {
        &self.vertices
    }

    /// All directed edges (two per tree link).
    pub fn edges(&self) -> &[TreeEdge] {
        &self.edges
    }

    /// The root vertex, if the tree is non-empty.
    pub fn root(&self) -> Option<usize> {
        if self.vertices.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// Vertices adjacent to `id`.
    pub fn neighbors(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&edge| self.edges[edge].target)
    }

    /// Vertices whose parent is `id`.
    pub fn children(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        let parent = self.vertices.get(id).and_then(|v| v.parent);
        self.neighbors(id).filter(move |&n| Some(n) != parent)
    }

    /// Edge from `source` to `target`.
    pub fn edge(&self, source: usize, target: usize) -> Option<&TreeEdge> {
        self.adjacency
            .get(source)?
            .iter()
            .map(|&edge| &self.edges[edge])
            .find(|edge| edge.target == target)
    }

    /// Size of the largest clique.
    pub fn max_clique_size(&self) -> usize {
        self.vertices
            .iter()
            .map(|v| v.scope.len())
            .max()
            .unwrap_or(0)
    }

    /// Largest clique size minus one.
    pub fn treewidth(&self) -> usize {
        self.max_clique_size().saturating_sub(1)
    }

    /// Union of the factors assigned across all vertices.
    pub fn assigned_factors(&self) -> FactorSet {
        let mut all = FactorSet::new();
        for vertex in &self.vertices {
            all.union_with(&vertex.factor_ids);
        }
        all
    }

    /// Variables covered by at least one vertex.
    pub fn variables(&self) -> VarSet {
        let mut all = VarSet::new();
        for vertex in &self.vertices {
            all.union_with(&vertex.scope);
        }
        all
    }

    /// Check that the vertices containing each variable form a connected subtree.
    ///
    /// In a rooted tree a vertex set is connected iff exactly one of its
    /// members has a parent outside the set.
    pub fn verify_running_intersection_property(&self) -> bool {
        let mut entry_points: BTreeMap<VarId, usize> = BTreeMap::new();
        for vertex in &self.vertices {
            let parent_scope = vertex.parent.and_then(|p| self.vertices.get(p));
            for var in &vertex.scope {
                if !parent_scope.is_some_and(|p| p.scope.contains(var)) {
                    *entry_points.entry(var).or_insert(0) += 1;
                }
            }
        }
        entry_points.values().all(|&count| count == 1)
    }

    /// Shape statistics.
    pub fn summary(&self) -> TreeSummary {
        TreeSummary {
            vertices: self.vertices.len(),
            edges: self.edges.len() / 2,
            treewidth: self.treewidth(),
            max_clique_size: self.max_clique_size(),
            max_separator_size: self
                .edges
                .iter()
                .map(|e| e.separator.len())
                .max()
                .unwrap_or(0),
            factors: self.assigned_factors().len(),
        }
    }
}

/// Index of the latest-eliminated variable in `vertices`, root when empty.
fn latest_eliminated(
    elim_time: &BTreeMap<VarId, usize>,
    vertices: &VarSet,
    time: usize,
) -> Result<usize> {
    let mut parent = 0;
    for var in vertices {
        let var_time = *elim_time.get(&var).ok_or_else(|| {
            JtError::Invariant(format!("variable {} has no elimination time", var))
        })?;
        parent = parent.max(var_time);
    }
    if parent >= time {
        return Err(JtError::Invariant(format!(
            "clique {} has parent {} that does not precede it",
            time, parent
        )));
    }
    Ok(parent)
}
