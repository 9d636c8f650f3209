//! The Markov process graph itself: node and edge storage plus its
//! read-only query surface.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::address::{MarkovEdgeAddress, NodeAddress};
use std::collections::BTreeSet;

/// One node of the Markov process graph: an address, a diagnostic
/// description, and a non-negative mint weight.
#[derive(Clone, Debug, PartialEq)]
pub struct MpgNode {
    pub(crate) address: NodeAddress,
    pub(crate) description: Arc<str>,
    pub(crate) mint: f64,
}

impl MpgNode {
    /// Returns the node's address.
    #[must_use]
    pub fn address(&self) -> &NodeAddress {
        &self.address
    }

    /// Returns the node's diagnostic description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the node's mint weight; always finite and non-negative.
    #[must_use]
    pub fn mint(&self) -> f64 {
        self.mint
    }
}

/// One directed, weighted edge of the Markov process graph.
///
/// `key()` — the pairing of the underlying edge address and direction tag —
/// is the edge's primary key; parallel input edges yield parallel MPG edges
/// that are never collapsed.
#[derive(Clone, Debug, PartialEq)]
pub struct MpgEdge {
    pub(crate) key: MarkovEdgeAddress,
    pub(crate) src: NodeAddress,
    pub(crate) dst: NodeAddress,
    pub(crate) probability: f64,
    pub(crate) reversed: bool,
}

impl MpgEdge {
    /// Returns the edge's primary key.
    #[must_use]
    pub fn key(&self) -> &MarkovEdgeAddress {
        &self.key
    }

    /// Returns the edge's source node address.
    #[must_use]
    pub fn src(&self) -> &NodeAddress {
        &self.src
    }

    /// Returns the edge's destination node address.
    #[must_use]
    pub fn dst(&self) -> &NodeAddress {
        &self.dst
    }

    /// Returns the edge's transition probability, always in `[0, 1]`.
    #[must_use]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Returns whether this edge runs opposite to the direction its
    /// underlying input edge was recorded in.
    #[must_use]
    pub fn reversed(&self) -> bool {
        self.reversed
    }
}

/// A well-formed, stochastic, unidirectional transition graph synthesized
/// from a weighted contribution graph.
///
/// Immutable once constructed by [`crate::builder`]; see that module for the
/// construction algorithm.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkovProcessGraph {
    pub(crate) nodes: IndexMap<NodeAddress, MpgNode>,
    pub(crate) edges: IndexMap<MarkovEdgeAddress, MpgEdge>,
    pub(crate) in_index: IndexMap<NodeAddress, Vec<MarkovEdgeAddress>>,
    pub(crate) scoring: BTreeSet<NodeAddress>,
}

impl MarkovProcessGraph {
    /// Looks up a single node by address.
    #[must_use]
    pub fn node(&self, address: &NodeAddress) -> Option<&MpgNode> {
        self.nodes.get(address)
    }

    /// Iterates every node, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &MpgNode> {
        self.nodes.values()
    }

    /// Iterates every node whose address has the given prefix, in insertion
    /// order.
    pub fn nodes_with_prefix<'a>(&'a self, prefix: &'a [&'a str]) -> impl Iterator<Item = &'a MpgNode> {
        self.nodes.values().filter(move |node| node.address.has_prefix(prefix))
    }

    /// Iterates every edge, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &MpgEdge> {
        self.edges.values()
    }

    /// Iterates the incoming edges of `address`, in the order they were
    /// synthesized.
    pub fn in_edges<'a>(&'a self, address: &NodeAddress) -> impl Iterator<Item = &'a MpgEdge> {
        self.in_index
            .get(address)
            .into_iter()
            .flatten()
            .filter_map(move |key| self.edges.get(key))
    }

    /// Returns the set of scoring addresses identified by the fibration
    /// planner during construction.
    #[must_use]
    pub fn scoring_addresses(&self) -> &BTreeSet<NodeAddress> {
        &self.scoring
    }

    /// Returns the total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
