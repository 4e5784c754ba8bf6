//! Greedy min-fill elimination ordering.
//!
//! At every step the variable whose elimination would add the fewest edges is
//! removed next. Fill is approximated by the edge count of a complete graph
//! over the union of the variable's current factor scopes, `C(|fill|, 2)`,
//! kept in a keyed priority queue and refreshed for every variable an
//! elimination touches.
//!
//! Only the width bound is enforced here. The factor-size bound is applied by
//! the incremental path alone.

use keyed_priority_queue::KeyedPriorityQueue;
use std::cmp::Reverse;
use tracing::{debug, trace};

use crate::elimination::{EliminationClique, EliminationRun, EliminationSimulator, Incidence};
use crate::error::{BudgetExceeded, Result};
use crate::junction_tree::JunctionTree;
use crate::mrf::MarkovNetwork;
use crate::var_set::VarId;

/// Queue priority: lowest cost first, ties toward the smaller variable id.
type FillPriority = Reverse<(usize, VarId)>;

/// Decide an elimination order for every variable in `incidence`.
///
/// Returns as soon as any clique exceeds `max_width`.
pub fn min_fill_order(
    incidence: &Incidence,
    max_width: usize,
) -> std::result::Result<EliminationRun, BudgetExceeded> {
    let mut sim = EliminationSimulator::new(incidence, max_width);

    let mut queue: KeyedPriorityQueue<VarId, FillPriority> = KeyedPriorityQueue::new();
    for var in incidence.variables() {
        queue.push(var, Reverse((sim.fill_cost(var), var)));
    }

    let mut run = EliminationRun::default();
    while let Some((var, Reverse((cost, _)))) = queue.pop() {
        let affected = sim.eliminate(var)?;

        for other in &affected {
            // Variables outside the collection are never queued.
            let _ = queue.set_priority(&other, Reverse((sim.fill_cost(other), other)));
        }

        trace!(var, cost, "min-fill pick");
        run.order.push(var);
        run.cliques.push(EliminationClique::new(var, affected));
    }

    run.max_clique_size = sim.max_clique_size();
    Ok(run)
}

/// One-shot batch build: min-fill over every variable of `mrf`, then assembly.
///
/// A width rejection is escalated to [`JtError::Budget`](crate::JtError::Budget).
pub fn build_min_fill_tree<N>(mrf: &N, max_width: usize) -> Result<JunctionTree>
where
    N: MarkovNetwork + ?Sized,
{
    let incidence = Incidence::from_network(mrf, 0..mrf.num_variables() as VarId)?;
    let run = min_fill_order(&incidence, max_width)?;
    debug!(
        variables = run.order.len(),
        treewidth = run.treewidth(),
        "min-fill order found"
    );
    JunctionTree::assemble(mrf, run.into_tree_order())
}
