//! Integration tests for the concrete construction scenarios.

mod common;

use mpg_core::{
    EdgeWeightEvaluator, FibrationOptions, InMemoryWeightedGraph, MarkovProcessGraph,
    MpgErrorCode, NodeWeightEvaluator, SeedOptions,
};

#[test]
fn s1_empty_graph_fails_with_zero_mint() {
    let graph = InMemoryWeightedGraph::new();
    let weights = mpg_core::PrefixWeightRules::new();
    let result = MarkovProcessGraph::new(
        &graph,
        &weights,
        &weights,
        &FibrationOptions::new(vec![], 0.0, 0.0, 0.0),
        &SeedOptions::new(0.1),
    );
    assert_eq!(result.unwrap_err().code(), MpgErrorCode::ZeroTotalMint);
}

#[test]
fn s2_two_base_nodes_produce_expected_probabilities() {
    let (graph, weights) = common::two_node_graph();
    let mpg = MarkovProcessGraph::new(
        &graph,
        &weights,
        &weights,
        &FibrationOptions::new(vec![], 0.0, 0.0, 0.0),
        &SeedOptions::new(0.1),
    )
    .expect("construction must succeed");

    let seed = mpg
        .nodes()
        .find(|node| node.address().has_prefix(&["sourcecred", "core", "SEED"]))
        .expect("seed node present");
    let a = mpg_core::NodeAddress::from_parts(&["a"]);
    let b = mpg_core::NodeAddress::from_parts(&["b"]);

    let mint = mpg
        .edges()
        .find(|edge| edge.src() == seed.address() && edge.dst() == &a)
        .expect("minting edge to a");
    assert!((mint.probability() - 1.0).abs() < 1e-9);

    let base = mpg
        .edges()
        .find(|edge| edge.src() == &a && edge.dst() == &b)
        .expect("base edge a -> b");
    assert!((base.probability() - 0.9).abs() < 1e-9);

    let radiation_a = mpg
        .edges()
        .find(|edge| edge.src() == &a && edge.dst() == seed.address())
        .expect("radiation from a");
    assert!((radiation_a.probability() - 0.1).abs() < 1e-9);

    let radiation_b = mpg
        .edges()
        .find(|edge| edge.src() == &b && edge.dst() == seed.address())
        .expect("radiation from b");
    assert!((radiation_b.probability() - 1.0).abs() < 1e-9);
}

#[test]
fn s3_scoring_node_routes_through_epoch_not_bare_address() {
    let (graph, weights, fibration) = common::scoring_pair_graph();
    let mpg = MarkovProcessGraph::new(
        &graph,
        &weights,
        &weights,
        &fibration,
        &SeedOptions::new(0.0),
    )
    .expect("construction must succeed");

    let owner = mpg_core::NodeAddress::from_parts(&["github", "user", "a"]);
    let b = mpg_core::NodeAddress::from_parts(&["b"]);

    assert!(mpg.scoring_addresses().contains(&owner));
    assert!(
        mpg.edges()
            .filter(|edge| edge.dst() == &b)
            .all(|edge| edge.src() != &owner),
        "the base edge must leave an epoch, not the bare scoring address"
    );
    let payout = mpg
        .edges()
        .find(|edge| edge.dst() == &owner)
        .expect("payout edge from some epoch to owner");
    assert!((payout.probability() - 0.2).abs() < 1e-9);
}

#[test]
fn s4_overlarge_teleportation_sum_is_a_configuration_error() {
    let graph = InMemoryWeightedGraph::new();
    let weights = mpg_core::PrefixWeightRules::new();
    let result = MarkovProcessGraph::new(
        &graph,
        &weights,
        &weights,
        &FibrationOptions::new(vec![], 0.2, 0.2, 0.2),
        &SeedOptions::new(0.5),
    );
    assert_eq!(
        result.unwrap_err().code(),
        MpgErrorCode::InvalidTeleportation
    );
}

#[test]
fn prefix_weight_rules_reject_unmatched_addresses_with_zero() {
    let rules = mpg_core::PrefixWeightRules::new();
    let address = mpg_core::NodeAddress::from_parts(&["unmatched"]);
    assert_eq!(NodeWeightEvaluator::weight(&rules, &address), 0.0);
    let edge_address = mpg_core::EdgeAddress::from_parts(&["unmatched"]);
    assert_eq!(
        EdgeWeightEvaluator::weight(&rules, &edge_address),
        (0.0, 0.0)
    );
}
