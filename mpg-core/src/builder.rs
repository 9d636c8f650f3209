//! The MPG builder: the orchestrating constructor.
//!
//! [`MarkovProcessGraph::new`] is a single, pure construction from a
//! weighted input graph, a pair of weight evaluators, and the
//! teleportation parameters of [`FibrationOptions`] and [`SeedOptions`].
//! Construction order matters for diagnostic consistency; the resulting
//! graph does not depend on it.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{instrument, warn};

use crate::address::{
    Direction, EdgeAddress, MarkovEdgeAddress, NodeAddress,
    constants::{
        CONTRIBUTION_RADIATION_PREFIX, CORE_PREFIX, EPOCH_PAYOUT_PREFIX, EPOCH_RADIATION_PREFIX,
        EPOCH_SUFFIX, EPOCH_WEBBING_PREFIX, SEED_MINT_PREFIX, SEED_SUFFIX,
    },
};
use crate::error::{MpgError, Result};
use crate::fibration::{FibrationOptions, OwnerPlan, scoring_addresses};
use crate::graph::WeightedGraph;
use crate::interval;
use crate::mpg::{MarkovProcessGraph, MpgEdge, MpgNode};
use crate::weights::{EdgeWeightEvaluator, NodeWeightEvaluator};

/// The seed node's teleportation share: the probability mass every
/// non-epoch base node radiates back to the seed regardless of its other
/// outflow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeedOptions {
    alpha: f64,
}

impl SeedOptions {
    /// Builds seed options from the seed radiation share `alpha`.
    ///
    /// # Examples
    /// ```
    /// use mpg_core::SeedOptions;
    ///
    /// let options = SeedOptions::new(0.15);
    /// assert_eq!(options.alpha(), 0.15);
    /// ```
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    /// Returns the configured seed radiation share.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

fn seed_address() -> NodeAddress {
    let mut parts: Vec<&str> = CORE_PREFIX.to_vec();
    parts.push(SEED_SUFFIX);
    NodeAddress::from_parts(&parts)
}

fn is_epoch_address(address: &NodeAddress) -> bool {
    let mut parts: Vec<&str> = CORE_PREFIX.to_vec();
    parts.push(EPOCH_SUFFIX);
    address.has_prefix(&parts)
}

fn synthetic_edge_address(prefix: &[&str], src: &NodeAddress, dst: &NodeAddress) -> EdgeAddress {
    let mut parts: Vec<&str> = prefix.to_vec();
    let src_parts: Vec<&str> = src.parts().iter().map(AsRef::as_ref).collect();
    let dst_parts: Vec<&str> = dst.parts().iter().map(AsRef::as_ref).collect();
    parts.extend(src_parts);
    parts.push("->");
    parts.extend(dst_parts);
    EdgeAddress::from_parts(&parts)
}

/// Clamps a probability that should mathematically land in `[0, 1]` but may
/// carry floating-point noise from accumulated sums, and rejects anything
/// further out of range as a genuine invariant violation.
#[expect(
    clippy::float_arithmetic,
    reason = "tolerance bounds around the [0, 1] probability range require floating-point arithmetic"
)]
fn clamp_unit_probability(address: &str, probability: f64) -> Result<f64> {
    const NOISE: f64 = 1e-9;
    if !probability.is_finite() {
        return Err(MpgError::ProbabilityOutOfRange {
            address: address.to_owned(),
            probability,
        });
    }
    if (-NOISE..0.0).contains(&probability) {
        return Ok(0.0);
    }
    if (1.0..=1.0 + NOISE).contains(&probability) {
        return Ok(1.0);
    }
    if !(0.0..=1.0).contains(&probability) {
        return Err(MpgError::ProbabilityOutOfRange {
            address: address.to_owned(),
            probability,
        });
    }
    Ok(probability)
}

/// Accumulates per-node bookkeeping while the builder synthesizes edges:
/// the running sum of outgoing probability, used both to normalize base
/// edges sharing a source and to compute the closing radiation edge.
#[derive(Default)]
struct OutflowLedger {
    sums: IndexMap<NodeAddress, f64>,
}

impl OutflowLedger {
    #[expect(
        clippy::float_arithmetic,
        reason = "accumulating per-node outflow requires floating-point addition"
    )]
    fn add(&mut self, address: &NodeAddress, probability: f64) {
        *self.sums.entry(address.clone()).or_insert(0.0) += probability;
    }

    fn sum_for(&self, address: &NodeAddress) -> f64 {
        self.sums.get(address).copied().unwrap_or(0.0)
    }
}

/// Staging area mutated while the graph is synthesized; converted into an
/// immutable [`MarkovProcessGraph`] once every invariant has been checked.
struct Staging {
    nodes: IndexMap<NodeAddress, MpgNode>,
    edges: IndexMap<MarkovEdgeAddress, MpgEdge>,
    in_index: IndexMap<NodeAddress, Vec<MarkovEdgeAddress>>,
    outflow: OutflowLedger,
}

impl Staging {
    fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            in_index: IndexMap::new(),
            outflow: OutflowLedger::default(),
        }
    }

    fn insert_node(&mut self, node: MpgNode) -> Result<()> {
        if self.nodes.contains_key(&node.address) {
            return Err(MpgError::DuplicateNode {
                address: node.address.to_string(),
            });
        }
        self.nodes.insert(node.address.clone(), node);
        Ok(())
    }

    fn insert_edge(
        &mut self,
        direction: Direction,
        underlying: EdgeAddress,
        src: NodeAddress,
        dst: NodeAddress,
        probability: f64,
        reversed: bool,
    ) -> Result<()> {
        let key = MarkovEdgeAddress::new(direction, underlying);
        if self.edges.contains_key(&key) {
            return Err(MpgError::DuplicateEdge {
                address: key.to_string(),
            });
        }
        let probability = clamp_unit_probability(&key.to_string(), probability)?;
        self.outflow.add(&src, probability);
        self.in_index.entry(dst.clone()).or_default().push(key.clone());
        self.edges.insert(
            key.clone(),
            MpgEdge {
                key,
                src,
                dst,
                probability,
                reversed,
            },
        );
        Ok(())
    }
}

/// One unidirectional candidate derived from an input edge: either the
/// forward half `src -> dst` or the backward half `dst -> src`.
struct BaseCandidate {
    underlying: EdgeAddress,
    direction: Direction,
    rewritten_src: NodeAddress,
    rewritten_dst: NodeAddress,
    weight: f64,
}

fn rewrite_endpoint(
    address: &NodeAddress,
    timestamp_ms: i64,
    scoring: &BTreeSet<NodeAddress>,
    boundaries: &interval::Boundaries,
) -> NodeAddress {
    if scoring.contains(address) {
        let boundary = boundaries.interval_for(timestamp_ms);
        crate::fibration::epoch_node_address(address, boundary)
    } else {
        address.clone()
    }
}

impl MarkovProcessGraph {
    /// Constructs a Markov process graph from a weighted contribution graph
    /// and the teleportation parameters governing seeding and fibration.
    ///
    /// This is the single entry point for construction: it performs the
    /// pre-checks, synthesizes nodes and edges in the prescribed order,
    /// normalizes per-source transition probabilities, and closes every
    /// node's outflow with a radiation edge back to the seed.
    ///
    /// # Errors
    /// Returns an [`MpgError`]: a configuration error for invalid
    /// teleportation parameters, an input error for reserved addresses or
    /// invalid node weights, or an invariant error for duplicate addresses,
    /// out-of-range probabilities, or zero total mint.
    #[instrument(
        name = "mpg.build",
        err,
        skip(graph, node_weight, edge_weight, fibration, seed),
        fields(
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            alpha = seed.alpha(),
            beta = fibration.beta(),
            gamma_forward = fibration.gamma_forward(),
            gamma_backward = fibration.gamma_backward(),
        ),
    )]
    #[expect(
        clippy::float_arithmetic,
        reason = "teleportation bookkeeping and per-source probability normalization are \
                  inherently floating-point"
    )]
    pub fn new(
        graph: &impl WeightedGraph,
        node_weight: &impl NodeWeightEvaluator,
        edge_weight: &impl EdgeWeightEvaluator,
        fibration: &FibrationOptions,
        seed: &SeedOptions,
    ) -> Result<Self> {
        let alpha = seed.alpha();
        let beta = fibration.beta();
        let gamma_forward = fibration.gamma_forward();
        let gamma_backward = fibration.gamma_backward();
        let sum = alpha + beta + gamma_forward + gamma_backward;
        if alpha < 0.0 || beta < 0.0 || gamma_forward < 0.0 || gamma_backward < 0.0 || sum > 1.0 {
            warn!(sum, "teleportation parameters are invalid");
            return Err(MpgError::InvalidTeleportation {
                alpha,
                beta,
                gamma_forward,
                gamma_backward,
                sum,
            });
        }
        let tau_epoch = 1.0 - sum;

        let scoring = scoring_addresses(graph, fibration);
        let boundaries = interval::partition(
            graph
                .edges()
                .iter()
                .filter(|edge| !edge.is_dangling())
                .map(crate::graph::GraphEdge::timestamp_ms),
        );
        let boundary_list = boundaries.intervals();

        let mut staging = Staging::new();

        let seed_addr = seed_address();
        staging.insert_node(MpgNode {
            address: seed_addr.clone(),
            description: Arc::from("seed"),
            mint: 0.0,
        })?;

        for node in graph.nodes() {
            let address = node.address();
            if address.has_prefix(CORE_PREFIX) {
                return Err(MpgError::ReservedAddress {
                    address: address.to_string(),
                });
            }
            let weight = node_weight.weight(address);
            if !weight.is_finite() || weight < 0.0 {
                return Err(MpgError::InvalidNodeWeight {
                    address: address.to_string(),
                    weight,
                });
            }
            staging.insert_node(MpgNode {
                address: address.clone(),
                description: Arc::from(node.description()),
                mint: weight,
            })?;
        }

        for owner in &scoring {
            let plan = OwnerPlan::new(owner.clone(), &boundary_list);
            for slot in &plan.slots {
                staging.insert_node(MpgNode {
                    address: slot.address.clone(),
                    description: Arc::from(format!("epoch of {owner} at {}", slot.boundary)),
                    mint: 0.0,
                })?;
                let payout_address =
                    synthetic_edge_address(EPOCH_PAYOUT_PREFIX, &slot.address, owner);
                staging.insert_edge(
                    Direction::Forward,
                    payout_address,
                    slot.address.clone(),
                    owner.clone(),
                    beta,
                    false,
                )?;
            }
            for (prev, curr) in plan.webbing_pairs() {
                let forward_address =
                    synthetic_edge_address(EPOCH_WEBBING_PREFIX, &prev.address, &curr.address);
                staging.insert_edge(
                    Direction::Forward,
                    forward_address,
                    prev.address.clone(),
                    curr.address.clone(),
                    gamma_forward,
                    false,
                )?;
                let backward_address =
                    synthetic_edge_address(EPOCH_WEBBING_PREFIX, &curr.address, &prev.address);
                staging.insert_edge(
                    Direction::Forward,
                    backward_address,
                    curr.address.clone(),
                    prev.address.clone(),
                    gamma_backward,
                    false,
                )?;
            }
        }

        let total_mint: f64 = staging.nodes.values().map(|node| node.mint).sum();
        if total_mint <= 0.0 {
            warn!("total mint across all nodes is zero");
            return Err(MpgError::ZeroTotalMint);
        }
        let mint_targets: Vec<(NodeAddress, f64)> = staging
            .nodes
            .values()
            .filter(|node| node.mint > 0.0)
            .map(|node| (node.address.clone(), node.mint))
            .collect();
        for (address, mint) in mint_targets {
            let mint_edge_address = synthetic_edge_address(SEED_MINT_PREFIX, &seed_addr, &address);
            staging.insert_edge(
                Direction::Forward,
                mint_edge_address,
                seed_addr.clone(),
                address,
                mint / total_mint,
                false,
            )?;
        }

        let mut grouped: IndexMap<NodeAddress, Vec<BaseCandidate>> = IndexMap::new();
        for edge in graph.edges().iter().filter(|edge| !edge.is_dangling()) {
            let (forward_weight, backward_weight) = edge_weight.weight(edge.address());
            if forward_weight > 0.0 {
                let rewritten_src =
                    rewrite_endpoint(edge.src(), edge.timestamp_ms(), &scoring, &boundaries);
                let rewritten_dst =
                    rewrite_endpoint(edge.dst(), edge.timestamp_ms(), &scoring, &boundaries);
                grouped.entry(rewritten_src.clone()).or_default().push(BaseCandidate {
                    underlying: edge.address().clone(),
                    direction: Direction::Forward,
                    rewritten_src,
                    rewritten_dst,
                    weight: forward_weight,
                });
            }
            if backward_weight > 0.0 {
                let rewritten_src =
                    rewrite_endpoint(edge.dst(), edge.timestamp_ms(), &scoring, &boundaries);
                let rewritten_dst =
                    rewrite_endpoint(edge.src(), edge.timestamp_ms(), &scoring, &boundaries);
                grouped.entry(rewritten_src.clone()).or_default().push(BaseCandidate {
                    underlying: edge.address().clone(),
                    direction: Direction::Backward,
                    rewritten_src,
                    rewritten_dst,
                    weight: backward_weight,
                });
            }
        }

        for (source, candidates) in grouped {
            let total_weight: f64 = candidates.iter().map(|candidate| candidate.weight).sum();
            let remainder = if is_epoch_address(&source) {
                tau_epoch
            } else {
                1.0 - alpha
            };
            for candidate in candidates {
                let probability = (candidate.weight / total_weight) * remainder;
                staging.insert_edge(
                    candidate.direction,
                    candidate.underlying,
                    candidate.rewritten_src,
                    candidate.rewritten_dst,
                    probability,
                    candidate.direction.is_reversed(),
                )?;
            }
        }

        let non_seed: Vec<NodeAddress> = staging
            .nodes
            .keys()
            .filter(|address| **address != seed_addr)
            .cloned()
            .collect();
        for address in non_seed {
            let consumed = staging.outflow.sum_for(&address);
            let radiation_probability = 1.0 - consumed;
            let prefix = if is_epoch_address(&address) {
                EPOCH_RADIATION_PREFIX
            } else {
                CONTRIBUTION_RADIATION_PREFIX
            };
            let radiation_address = synthetic_edge_address(prefix, &address, &seed_addr);
            staging.insert_edge(
                Direction::Forward,
                radiation_address,
                address,
                seed_addr.clone(),
                radiation_probability,
                false,
            )?;
        }

        Ok(Self {
            nodes: staging.nodes,
            edges: staging.edges,
            in_index: staging.in_index,
            scoring,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphEdge, GraphNode, InMemoryWeightedGraph};
    use crate::weights::PrefixWeightRules;

    fn options(beta: f64, gf: f64, gb: f64) -> FibrationOptions {
        FibrationOptions::new(vec![vec!["github".to_owned(), "user".to_owned()]], beta, gf, gb)
    }

    #[test]
    fn empty_graph_fails_with_zero_mint() {
        let graph = InMemoryWeightedGraph::new();
        let weights = PrefixWeightRules::new();
        let result = MarkovProcessGraph::new(
            &graph,
            &weights,
            &weights,
            &options(0.0, 0.0, 0.0),
            &SeedOptions::new(0.1),
        );
        assert_eq!(result.unwrap_err().code(), crate::error::MpgErrorCode::ZeroTotalMint);
    }

    #[test]
    fn s2_two_base_nodes_with_one_forward_edge() {
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
        let mpg = MarkovProcessGraph::new(
            &graph,
            &weights,
            &weights,
            &options(0.0, 0.0, 0.0),
            &SeedOptions::new(0.1),
        )
        .expect("construction must succeed");

        let seed = seed_address();
        let a = NodeAddress::from_parts(&["a"]);
        let b = NodeAddress::from_parts(&["b"]);

        let mint_edge = mpg
            .edges()
            .find(|edge| edge.src() == &seed && edge.dst() == &a)
            .expect("minting edge to a");
        assert!((mint_edge.probability() - 1.0).abs() < 1e-9);

        let base_edge = mpg
            .edges()
            .find(|edge| edge.src() == &a && edge.dst() == &b)
            .expect("base edge a -> b");
        assert!((base_edge.probability() - 0.9).abs() < 1e-9);

        let radiation_a = mpg
            .edges()
            .find(|edge| edge.src() == &a && edge.dst() == &seed)
            .expect("radiation from a");
        assert!((radiation_a.probability() - 0.1).abs() < 1e-9);

        let radiation_b = mpg
            .edges()
            .find(|edge| edge.src() == &b && edge.dst() == &seed)
            .expect("radiation from b");
        assert!((radiation_b.probability() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn s4_configuration_error_when_teleportation_exceeds_one() {
        let graph = InMemoryWeightedGraph::new()
            .with_node(GraphNode::new(NodeAddress::from_parts(&["a"]), "a"));
        let weights = PrefixWeightRules::new().with_node_rule(&["a"], 1.0);
        let result = MarkovProcessGraph::new(
            &graph,
            &weights,
            &weights,
            &options(0.2, 0.2, 0.2),
            &SeedOptions::new(0.5),
        );
        assert_eq!(
            result.unwrap_err().code(),
            crate::error::MpgErrorCode::InvalidTeleportation
        );
    }

    #[test]
    fn s5_parallel_edges_are_preserved_and_normalized_together() {
        let graph = InMemoryWeightedGraph::new()
            .with_node(GraphNode::new(NodeAddress::from_parts(&["a"]), "a"))
            .with_node(GraphNode::new(NodeAddress::from_parts(&["b"]), "b"))
            .with_edge(GraphEdge::new(
                EdgeAddress::from_parts(&["e1"]),
                NodeAddress::from_parts(&["a"]),
                NodeAddress::from_parts(&["b"]),
                0,
            ))
            .with_edge(GraphEdge::new(
                EdgeAddress::from_parts(&["e2"]),
                NodeAddress::from_parts(&["a"]),
                NodeAddress::from_parts(&["b"]),
                0,
            ));
        let weights = PrefixWeightRules::new()
            .with_node_rule(&["a"], 1.0)
            .with_edge_rule(&["e1"], 1.0, 0.0)
            .with_edge_rule(&["e2"], 3.0, 0.0);
        let mpg = MarkovProcessGraph::new(
            &graph,
            &weights,
            &weights,
            &options(0.0, 0.0, 0.0),
            &SeedOptions::new(0.0),
        )
        .expect("construction must succeed");

        let a = NodeAddress::from_parts(&["a"]);
        let b = NodeAddress::from_parts(&["b"]);
        let mut probs: Vec<f64> = mpg
            .edges()
            .filter(|edge| edge.src() == &a && edge.dst() == &b)
            .map(MpgEdge::probability)
            .collect();
        probs.sort_by(|x, y| x.partial_cmp(y).expect("finite"));
        assert_eq!(probs.len(), 2);
        assert!((probs[0] - 0.25).abs() < 1e-9);
        assert!((probs[1] - 0.75).abs() < 1e-9);
    }

    #[test]
    fn s6_bidirectional_edge_yields_two_directed_edges() {
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
            .with_node_rule(&["b"], 1.0)
            .with_edge_rule(&["e"], 2.0, 1.0);
        let mpg = MarkovProcessGraph::new(
            &graph,
            &weights,
            &weights,
            &options(0.0, 0.0, 0.0),
            &SeedOptions::new(0.0),
        )
        .expect("construction must succeed");

        let forward = mpg
            .edges()
            .find(|edge| !edge.reversed() && edge.key().edge().parts() == EdgeAddress::from_parts(&["e"]).parts())
            .expect("forward half");
        let backward = mpg
            .edges()
            .find(|edge| edge.reversed() && edge.key().edge().parts() == EdgeAddress::from_parts(&["e"]).parts())
            .expect("backward half");
        assert_eq!(forward.src(), &NodeAddress::from_parts(&["a"]));
        assert_eq!(forward.dst(), &NodeAddress::from_parts(&["b"]));
        assert_eq!(backward.src(), &NodeAddress::from_parts(&["b"]));
        assert_eq!(backward.dst(), &NodeAddress::from_parts(&["a"]));
    }

    #[test]
    fn epoch_routing_uses_epoch_node_not_bare_scoring_address() {
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
        let mpg = MarkovProcessGraph::new(
            &graph,
            &weights,
            &weights,
            &options(0.0, 0.0, 0.0),
            &SeedOptions::new(0.1),
        )
        .expect("construction must succeed");

        let owner = NodeAddress::from_parts(&["github", "user", "a"]);
        assert!(
            mpg.edges()
                .filter(|edge| edge.dst() == &NodeAddress::from_parts(&["b"]))
                .all(|edge| edge.src() != &owner)
        );
        assert!(
            mpg.edges()
                .any(|edge| edge.dst() == &NodeAddress::from_parts(&["b"]) && is_epoch_address(edge.src()))
        );
    }
}
