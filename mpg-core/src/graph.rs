//! The weighted-graph input contract consumed by the builder.
//!
//! The core does not own the graph/weight data model; it only consumes a
//! finite sequence of nodes and edges and a pair of weight evaluators.
//! [`WeightedGraph`] pins down exactly the shape the builder needs.

use std::sync::Arc;

use crate::address::{EdgeAddress, NodeAddress};

/// A node in the input contribution graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    address: NodeAddress,
    description: Arc<str>,
}

impl GraphNode {
    /// Builds a graph node from its address and a human-readable description.
    #[must_use]
    pub fn new(address: NodeAddress, description: impl Into<Arc<str>>) -> Self {
        Self {
            address,
            description: description.into(),
        }
    }

    /// Returns the node's address.
    #[must_use]
    pub fn address(&self) -> &NodeAddress {
        &self.address
    }

    /// Returns the node's human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// An edge in the input contribution graph.
///
/// An edge marked [`GraphEdge::dangling`] references an endpoint the graph
/// does not actually contain; the builder filters these out before
/// synthesizing base edges.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    address: EdgeAddress,
    src: NodeAddress,
    dst: NodeAddress,
    timestamp_ms: i64,
    dangling: bool,
}

impl GraphEdge {
    /// Builds a non-dangling edge from its address, endpoints, and timestamp.
    #[must_use]
    pub fn new(address: EdgeAddress, src: NodeAddress, dst: NodeAddress, timestamp_ms: i64) -> Self {
        Self {
            address,
            src,
            dst,
            timestamp_ms,
            dangling: false,
        }
    }

    /// Marks this edge as dangling, i.e. referencing a node the graph does
    /// not actually contain.
    #[must_use]
    pub fn dangling(mut self) -> Self {
        self.dangling = true;
        self
    }

    /// Returns the edge's address.
    #[must_use]
    pub fn address(&self) -> &EdgeAddress {
        &self.address
    }

    /// Returns the edge's source node address, as recorded in the input graph.
    #[must_use]
    pub fn src(&self) -> &NodeAddress {
        &self.src
    }

    /// Returns the edge's destination node address, as recorded in the input graph.
    #[must_use]
    pub fn dst(&self) -> &NodeAddress {
        &self.dst
    }

    /// Returns the edge's timestamp, in milliseconds since the Unix epoch.
    #[must_use]
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Returns whether this edge is dangling and must be excluded from base
    /// edge synthesis.
    #[must_use]
    pub fn is_dangling(&self) -> bool {
        self.dangling
    }
}

/// The weighted contribution graph the builder consumes.
///
/// The core treats the underlying data model as an external collaborator
/// and only reads this interface.
pub trait WeightedGraph {
    /// Returns every node in the graph, in an arbitrary but stable order.
    fn nodes(&self) -> &[GraphNode];

    /// Returns every edge in the graph, in an arbitrary but stable order,
    /// including dangling edges (callers filter with [`GraphEdge::is_dangling`]).
    fn edges(&self) -> &[GraphEdge];
}

/// A simple in-memory [`WeightedGraph`] implementation, useful for tests and
/// for callers with no bespoke graph store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InMemoryWeightedGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl InMemoryWeightedGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns `self` for chained construction.
    #[must_use]
    pub fn with_node(mut self, node: GraphNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Adds an edge and returns `self` for chained construction.
    #[must_use]
    pub fn with_edge(mut self, edge: GraphEdge) -> Self {
        self.edges.push(edge);
        self
    }
}

impl WeightedGraph for InMemoryWeightedGraph {
    fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }
}
