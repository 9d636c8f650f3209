//! Shared fixtures for the Markov process graph integration tests.

use mpg_core::{
    EdgeAddress, FibrationOptions, GraphEdge, GraphNode, InMemoryWeightedGraph, NodeAddress,
    PrefixWeightRules, SeedOptions,
};

/// Two non-scoring base nodes `a` (weight 1) and `b` (weight 0) joined by a
/// single forward-weight-1 edge at timestamp 0, matching scenario S2.
#[must_use]
pub fn two_node_graph() -> (InMemoryWeightedGraph, PrefixWeightRules) {
    let graph = InMemoryWeightedGraph::new()
        .with_node(GraphNode::new(NodeAddress::from_parts(&["a"]), "a"))
        .with_node(GraphNode::new(NodeAddress::from_parts(&["b"]), "b"))
        .with_edge(GraphEdge::new(
            EdgeAddress::from_parts(&["e"]),
            NodeAddress::from_parts(&["a"]),
            NodeAddress::from_parts(&["b"]),
            0,
        ));
    let weights = PrefixWeightRules::new()
        .with_node_rule(&["a"], 1.0)
        .with_node_rule(&["b"], 0.0)
        .with_edge_rule(&["e"], 1.0, 0.0);
    (graph, weights)
}

/// A single scoring node `a` whose base edge to non-scoring `b` must be
/// routed through the epoch covering its timestamp, matching scenario S3.
#[must_use]
pub fn scoring_pair_graph() -> (InMemoryWeightedGraph, PrefixWeightRules, FibrationOptions) {
    let graph = InMemoryWeightedGraph::new()
        .with_node(GraphNode::new(
            NodeAddress::from_parts(&["github", "user", "a"]),
            "a",
        ))
        .with_node(GraphNode::new(NodeAddress::from_parts(&["b"]), "b"))
        .with_edge(GraphEdge::new(
            EdgeAddress::from_parts(&["e"]),
            NodeAddress::from_parts(&["github", "user", "a"]),
            NodeAddress::from_parts(&["b"]),
            0,
        ));
    let weights = PrefixWeightRules::new()
        .with_node_rule(&["github", "user", "a"], 1.0)
        .with_edge_rule(&["e"], 1.0, 0.0);
    let fibration = FibrationOptions::new(
        vec![vec!["github".to_owned(), "user".to_owned()]],
        0.2,
        0.1,
        0.1,
    );
    (graph, weights, fibration)
}

/// Default seed options used across scenarios that don't care about the
/// specific value of `alpha`.
#[must_use]
pub fn default_seed() -> SeedOptions {
    SeedOptions::new(0.1)
}
