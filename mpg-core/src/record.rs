//! Portable record form for a [`MarkovProcessGraph`].
//!
//! The serializer converts an in-memory graph to and from the
//! `sourcecred/markovProcessGraph` JSON-compatible record shape. It does not
//! re-validate stochasticity on the way out; the deserializer trusts the
//! payload it is handed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::{Direction, EdgeAddress, MarkovEdgeAddress, NodeAddress};
use crate::error::{MpgError, Result};
use crate::mpg::{MarkovProcessGraph, MpgEdge, MpgNode};

const RECORD_TYPE: &str = "sourcecred/markovProcessGraph";
const RECORD_VERSION: &str = "0.1.0";

/// One serialized node entry (a `payload.nodes` value).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializedNode {
    address: Vec<String>,
    description: String,
    mint: f64,
}

/// One serialized edge entry (a `payload.edges` value).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializedEdge {
    address: Vec<String>,
    reversed: bool,
    src: Vec<String>,
    dst: Vec<String>,
    #[serde(rename = "transitionProbability")]
    transition_probability: f64,
}

/// The `payload` object of the record shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Payload {
    nodes: BTreeMap<String, SerializedNode>,
    edges: BTreeMap<String, SerializedEdge>,
    #[serde(rename = "scoringAddresses")]
    scoring_addresses: Vec<Vec<String>>,
}

/// The self-describing, versioned record wrapper.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MpgRecord {
    #[serde(rename = "type")]
    type_tag: String,
    version: String,
    payload: Payload,
}

fn parts_of(address: &NodeAddress) -> Vec<String> {
    address.parts().iter().map(ToString::to_string).collect()
}

fn node_address_from_parts(parts: &[String]) -> NodeAddress {
    let borrowed: Vec<&str> = parts.iter().map(String::as_str).collect();
    NodeAddress::from_parts(&borrowed)
}

fn edge_address_from_parts(parts: &[String]) -> EdgeAddress {
    let borrowed: Vec<&str> = parts.iter().map(String::as_str).collect();
    EdgeAddress::from_parts(&borrowed)
}

impl MarkovProcessGraph {
    /// Converts this graph into its portable record form.
    ///
    /// Does not re-validate stochasticity: a graph that already violates an
    /// invariant serializes exactly as it stands.
    #[must_use]
    pub fn to_record(&self) -> MpgRecord {
        let nodes = self
            .nodes
            .values()
            .map(|node: &MpgNode| {
                (
                    node.address.to_string(),
                    SerializedNode {
                        address: parts_of(&node.address),
                        description: node.description.to_string(),
                        mint: node.mint,
                    },
                )
            })
            .collect();
        let edges = self
            .edges
            .values()
            .map(|edge: &MpgEdge| {
                (
                    edge.key.to_string(),
                    SerializedEdge {
                        address: edge.key.edge().parts().iter().map(ToString::to_string).collect(),
                        reversed: edge.reversed,
                        src: parts_of(&edge.src),
                        dst: parts_of(&edge.dst),
                        transition_probability: edge.probability,
                    },
                )
            })
            .collect();
        let scoring_addresses = self.scoring.iter().map(parts_of).collect();
        MpgRecord {
            type_tag: RECORD_TYPE.to_owned(),
            version: RECORD_VERSION.to_owned(),
            payload: Payload {
                nodes,
                edges,
                scoring_addresses,
            },
        }
    }

    /// Reconstructs a graph from a record produced by [`Self::to_record`] (or
    /// an equivalent external payload in the same shape).
    ///
    /// Trusts the payload: does not recompute or check stochasticity, and
    /// does not reject duplicate keys beyond what the map representation
    /// itself collapses.
    ///
    /// # Errors
    /// Returns [`MpgError::WrongType`] if `type` is not
    /// `sourcecred/markovProcessGraph`, or [`MpgError::UnknownVersion`] if
    /// `version` is not one this crate understands.
    pub fn from_record(record: &MpgRecord) -> Result<Self> {
        if record.type_tag != RECORD_TYPE {
            return Err(MpgError::WrongType {
                found: record.type_tag.clone(),
            });
        }
        if record.version != RECORD_VERSION {
            return Err(MpgError::UnknownVersion {
                version: record.version.clone(),
            });
        }

        let mut nodes = indexmap::IndexMap::with_capacity(record.payload.nodes.len());
        for serialized in record.payload.nodes.values() {
            let address = node_address_from_parts(&serialized.address);
            nodes.insert(
                address.clone(),
                MpgNode {
                    address,
                    description: std::sync::Arc::from(serialized.description.as_str()),
                    mint: serialized.mint,
                },
            );
        }

        let mut edges = indexmap::IndexMap::with_capacity(record.payload.edges.len());
        let mut in_index: indexmap::IndexMap<NodeAddress, Vec<MarkovEdgeAddress>> =
            indexmap::IndexMap::new();
        for serialized in record.payload.edges.values() {
            let direction = if serialized.reversed {
                Direction::Backward
            } else {
                Direction::Forward
            };
            let underlying = edge_address_from_parts(&serialized.address);
            let key = MarkovEdgeAddress::new(direction, underlying);
            let dst = node_address_from_parts(&serialized.dst);
            in_index.entry(dst.clone()).or_default().push(key.clone());
            edges.insert(
                key.clone(),
                MpgEdge {
                    key,
                    src: node_address_from_parts(&serialized.src),
                    dst,
                    probability: serialized.transition_probability,
                    reversed: serialized.reversed,
                },
            );
        }

        let scoring = record
            .payload
            .scoring_addresses
            .iter()
            .map(|parts| node_address_from_parts(parts))
            .collect();

        Ok(Self {
            nodes,
            edges,
            in_index,
            scoring,
        })
    }
}
