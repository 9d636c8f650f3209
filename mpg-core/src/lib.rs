//! Markov process graph construction for contribution-graph reputation
//! scoring.
//!
//! This crate synthesizes a weighted, bidirectional contribution graph plus
//! a small set of teleportation/fibration parameters into a well-formed,
//! stochastic, unidirectional transition graph (a [`MarkovProcessGraph`])
//! suitable for power-iteration. It does not itself run the iteration, load
//! data, or persist state across invocations; see the crate's module docs
//! for the construction algorithm.

mod address;
mod builder;
mod chain;
mod error;
mod fibration;
mod graph;
mod interval;
mod mpg;
mod record;
mod weights;

pub use crate::address::{
    Direction, EdgeAddress, MarkovEdgeAddress, NodeAddress, constants as address_constants,
};
pub use crate::builder::SeedOptions;
pub use crate::chain::{InList, MarkovChain, to_markov_chain};
pub use crate::error::{MpgError, MpgErrorCode, Result};
pub use crate::fibration::{EpochSlot, FibrationOptions, OwnerPlan};
pub use crate::graph::{GraphEdge, GraphNode, InMemoryWeightedGraph, WeightedGraph};
pub use crate::interval::{Boundaries, Boundary, partition as partition_timestamps};
pub use crate::mpg::{MarkovProcessGraph, MpgEdge, MpgNode};
pub use crate::record::MpgRecord;
pub use crate::weights::{EdgeWeightEvaluator, NodeWeightEvaluator, PrefixWeightRules};
