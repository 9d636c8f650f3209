//! Chain emitter: converts a [`MarkovProcessGraph`] into an indexed sparse
//! column-stochastic representation suitable for power-iteration.

use std::collections::HashMap;

use tracing::{instrument, warn};

use crate::address::{NodeAddress, constants::STOCHASTICITY_TOLERANCE};
use crate::error::{MpgError, Result};
use crate::mpg::MarkovProcessGraph;

/// The incoming edges of a single destination node: two equal-length,
/// parallel arrays of source index and transition weight.
///
/// Parallel incoming edges (repeated source indices) are preserved rather
/// than merged; downstream power-iteration code must tolerate repeats.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InList {
    /// Index into [`MarkovChain::node_order`] of each incoming edge's source.
    pub source_index: Vec<usize>,
    /// Transition weight of each incoming edge, parallel to `source_index`.
    pub weight: Vec<f64>,
}

/// The sparse column-stochastic chain emitted from a [`MarkovProcessGraph`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkovChain {
    node_order: Vec<NodeAddress>,
    in_lists: Vec<InList>,
}

impl MarkovChain {
    /// Returns the node addresses in canonical total order; `in_lists()[i]`
    /// describes the incoming edges of `node_order()[i]`.
    #[must_use]
    pub fn node_order(&self) -> &[NodeAddress] {
        &self.node_order
    }

    /// Returns the per-destination incoming-edge lists, indexed identically
    /// to [`Self::node_order`].
    #[must_use]
    pub fn in_lists(&self) -> &[InList] {
        &self.in_lists
    }

    /// Returns the incoming edges of the node at `node_order()[index]`, if
    /// `index` is in bounds.
    #[must_use]
    pub fn in_list_at(&self, index: usize) -> Option<&InList> {
        self.in_lists.get(index)
    }
}

/// Converts `mpg` into a [`MarkovChain`], checking stochasticity first.
///
/// # Errors
/// Returns [`MpgError::NotStochastic`] if any node's outgoing transition
/// probabilities do not sum to `1` within [`STOCHASTICITY_TOLERANCE`], or
/// [`MpgError::UnknownAddress`] if an edge references a source address with
/// no corresponding node.
#[instrument(
    name = "mpg.to_markov_chain",
    err,
    skip(mpg),
    fields(nodes = mpg.node_count(), edges = mpg.edge_count()),
)]
#[expect(
    clippy::float_arithmetic,
    reason = "the stochasticity pre-check sums and compares transition probabilities"
)]
pub fn to_markov_chain(mpg: &MarkovProcessGraph) -> Result<MarkovChain> {
    let mut out_sums: HashMap<NodeAddress, f64> = HashMap::with_capacity(mpg.node_count());
    for edge in mpg.edges() {
        *out_sums.entry(edge.src().clone()).or_insert(0.0) += edge.probability();
    }
    for node in mpg.nodes() {
        let sum = out_sums.get(node.address()).copied().unwrap_or(0.0);
        if (sum - 1.0).abs() >= STOCHASTICITY_TOLERANCE {
            warn!(address = %node.address(), sum, "node is not stochastic");
            return Err(MpgError::NotStochastic {
                address: node.address().to_string(),
                sum,
                tolerance: STOCHASTICITY_TOLERANCE,
            });
        }
    }

    let mut node_order: Vec<NodeAddress> = mpg.nodes().map(|node| node.address().clone()).collect();
    node_order.sort();

    let mut index_of: HashMap<NodeAddress, usize> = HashMap::with_capacity(node_order.len());
    for (index, address) in node_order.iter().enumerate() {
        index_of.insert(address.clone(), index);
    }

    let mut in_lists = Vec::with_capacity(node_order.len());
    for address in &node_order {
        let mut list = InList::default();
        for edge in mpg.in_edges(address) {
            let Some(&source_index) = index_of.get(edge.src()) else {
                return Err(MpgError::UnknownAddress {
                    edge: edge.key().to_string(),
                    address: edge.src().to_string(),
                });
            };
            list.source_index.push(source_index);
            list.weight.push(edge.probability());
        }
        in_lists.push(list);
    }

    Ok(MarkovChain {
        node_order,
        in_lists,
    })
}
