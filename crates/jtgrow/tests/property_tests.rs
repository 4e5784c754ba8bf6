//! Property-based tests for junction tree construction.
//!
//! This module uses proptest to verify, over random sparse models:
//! - Running intersection and width bounds of every built tree
//! - Exactly-once factor placement
//! - Purity of order evaluation
//! - All-or-nothing incremental insertion

use jtgrow::*;
use proptest::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

/// Random model: `n` variables with unary factors plus the given pairs.
fn build_mrf(n: usize, arities: &[u32], pairs: &[(usize, usize)]) -> Mrf {
    let mut mrf = Mrf::new();
    for i in 0..n {
        let var = mrf.add_variable(arities[i % arities.len()]);
        mrf.add_factor(&[var]).unwrap();
    }
    for &(a, b) in pairs {
        let (a, b) = ((a % n) as VarId, (b % n) as VarId);
        if a != b {
            mrf.add_factor(&[a, b]).unwrap();
        }
    }
    mrf
}

fn model_strategy() -> impl Strategy<Value = Mrf> {
    (2usize..14).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec(1u32..4, 1..4),
            prop::collection::vec((0..n, 0..n), 0..(2 * n)),
        )
            .prop_map(|(n, arities, pairs)| build_mrf(n, &arities, &pairs))
    })
}

fn strategy_strategy() -> impl Strategy<Value = AdmissionStrategy> {
    prop_oneof![
        Just(AdmissionStrategy::Incremental),
        Just(AdmissionStrategy::Replay),
        Just(AdmissionStrategy::MinFill),
    ]
}

fn factors_of(mrf: &Mrf, vars: &[VarId]) -> FactorSet {
    let mut all = FactorSet::new();
    for &var in vars {
        all.union_with(&mrf.variable(var).unwrap().factor_ids);
    }
    all
}

// ============================================================================
// Tree Shape Properties
// ============================================================================

proptest! {
    /// Property: every grown tree satisfies the running intersection property
    #[test]
    fn grown_tree_has_rip(
        mrf in model_strategy(),
        strategy in strategy_strategy(),
        max_width in 1usize..6,
        root_seed in 0u32..64,
    ) {
        let root = root_seed % mrf.num_variables() as VarId;
        let config = GrowthConfig::default()
            .with_max_width(max_width)
            .with_max_factor_size(1 << 8)
            .with_strategy(strategy);
        let growth = grow_junction_tree(&mrf, root, &config).unwrap();

        prop_assert!(growth.tree.verify_running_intersection_property());
        prop_assert!(growth.tree.max_clique_size() <= max_width);
        prop_assert_eq!(growth.tree.num_vertices(), growth.accepted.len());
    }

    /// Property: each factor touched by the accepted variables lands on exactly one vertex
    #[test]
    fn factors_placed_exactly_once(
        mrf in model_strategy(),
        strategy in strategy_strategy(),
        max_width in 2usize..6,
    ) {
        let config = GrowthConfig::default()
            .with_max_width(max_width)
            .with_strategy(strategy);
        let growth = grow_junction_tree(&mrf, 0, &config).unwrap();

        let expected = factors_of(&mrf, &growth.accepted);
        let placed: usize = growth.tree.vertices().iter().map(|v| v.factor_ids.len()).sum();
        prop_assert_eq!(growth.tree.assigned_factors(), expected.clone());
        prop_assert_eq!(placed, expected.len());
    }

    /// Property: factors entirely inside the tree sit on a vertex covering their scope
    #[test]
    fn factor_scope_within_vertex(mrf in model_strategy(), max_width in 2usize..8) {
        if let Ok(tree) = build_min_fill_tree(&mrf, max_width) {
            for vertex in tree.vertices() {
                for fid in &vertex.factor_ids {
                    let scope = mrf.factor_scope(fid).unwrap();
                    prop_assert!(scope.is_subset_of(&vertex.scope));
                }
            }
        }
    }

    /// Property: the factor-size budget holds on every incremental clique
    #[test]
    fn incremental_respects_factor_size(
        mrf in model_strategy(),
        max_factor_size in 1u64..32,
    ) {
        let config = GrowthConfig::default()
            .with_max_width(6)
            .with_max_factor_size(max_factor_size);
        let growth = grow_junction_tree(&mrf, 0, &config).unwrap();

        for vertex in growth.tree.vertices() {
            let size: u64 = vertex
                .scope
                .iter()
                .map(|v| u64::from(mrf.arity(v).max(1)))
                .product();
            prop_assert!(size <= max_factor_size);
        }
    }
}

// ============================================================================
// Elimination Properties
// ============================================================================

proptest! {
    /// Property: evaluating the same order twice gives the same run
    #[test]
    fn evaluate_is_pure(mrf in model_strategy(), seed in any::<u64>()) {
        let n = mrf.num_variables() as VarId;
        let mut order: Vec<VarId> = (0..n).collect();
        let len = order.len();
        order.rotate_left((seed % len as u64) as usize);

        let incidence = Incidence::from_network(&mrf, 0..n).unwrap();
        let first = evaluate_order(&incidence, &order, 64);
        let second = evaluate_order(&incidence, &order, 64);
        prop_assert_eq!(first, second);
    }

    /// Property: min-fill width never exceeds the width of the identity order
    #[test]
    fn min_fill_is_a_valid_order(mrf in model_strategy()) {
        let n = mrf.num_variables() as VarId;
        let incidence = Incidence::from_network(&mrf, 0..n).unwrap();
        let run = min_fill_order(&incidence, 64).unwrap();

        let mut order = run.order.clone();
        order.sort_unstable();
        prop_assert_eq!(order, (0..n).collect::<Vec<_>>());

        let tree = JunctionTree::assemble(&mrf, run.clone().into_tree_order()).unwrap();
        prop_assert!(tree.verify_running_intersection_property());
        prop_assert_eq!(tree.max_clique_size(), run.max_clique_size);
    }
}

// ============================================================================
// Incremental Insertion Properties
// ============================================================================

proptest! {
    /// Property: a rejected insertion leaves the state unchanged
    #[test]
    fn rejection_leaves_state_untouched(
        mrf in model_strategy(),
        max_width in 1usize..4,
        max_factor_size in 1u64..16,
    ) {
        let budget = Budget::new(max_width, max_factor_size);
        let mut state = EliminationState::new();
        for var in 0..mrf.num_variables() as VarId {
            let before = state.clone();
            match state.try_insert(&mrf, var, &budget) {
                Ok(time) => {
                    prop_assert_eq!(time, before.len());
                    prop_assert!(state.contains(var));
                }
                Err(_) => prop_assert_eq!(&state, &before),
            }
        }

        let tree = state.to_tree(&mrf).unwrap();
        prop_assert!(tree.verify_running_intersection_property());
        prop_assert!(tree.max_clique_size() <= max_width);
    }
}
