//! Address algebra for node and edge identifiers.
//!
//! Node and edge addresses are opaque, ordered sequences of string parts.
//! The two kinds are disjoint: a [`NodeAddress`] and an [`EdgeAddress`] built
//! from identical parts never compare equal to one another because they are
//! distinct Rust types. A third, derived kind — [`MarkovEdgeAddress`] — tags
//! an [`EdgeAddress`] with a [`Direction`], distinguishing the forward and
//! backward halves of a bidirectional input edge.

use std::fmt;
use std::sync::Arc;

/// Sentinel used only when rendering a canonical diagnostic string; never
/// used to encode identity (identity is the part sequence itself).
const SEPARATOR: char = '/';
const ESCAPE: char = '\\';

fn push_escaped(out: &mut String, part: &str) {
    for ch in part.chars() {
        if ch == SEPARATOR || ch == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(ch);
    }
}

fn canonical_string(parts: &[Arc<str>]) -> String {
    let mut out = String::new();
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            out.push(SEPARATOR);
        }
        push_escaped(&mut out, part);
    }
    out
}

/// Returns whether `parts` starts with every element of `prefix`, in order.
fn has_prefix(parts: &[Arc<str>], prefix: &[&str]) -> bool {
    parts.len() >= prefix.len() && parts.iter().zip(prefix).all(|(a, b)| a.as_ref() == *b)
}

fn append(parts: &[Arc<str>], suffix: &[&str]) -> Vec<Arc<str>> {
    let mut out = Vec::with_capacity(parts.len() + suffix.len());
    out.extend(parts.iter().cloned());
    out.extend(suffix.iter().map(|part| Arc::from(*part)));
    out
}

/// Identifies a node in the input contribution graph or in the synthesized
/// Markov process graph.
///
/// # Examples
/// ```
/// use mpg_core::NodeAddress;
///
/// let base = NodeAddress::from_parts(&["github", "user", "alice"]);
/// let seed = NodeAddress::from_parts(&["sourcecred", "core", "SEED"]);
/// assert!(base.has_prefix(&["github"]));
/// assert_ne!(base, seed);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct NodeAddress(Vec<Arc<str>>);

/// Identifies an edge in the input contribution graph.
///
/// # Examples
/// ```
/// use mpg_core::EdgeAddress;
///
/// let edge = EdgeAddress::from_parts(&["github", "pull", "42"]);
/// assert_eq!(edge.parts().len(), 3);
/// assert_eq!(edge.parts()[2].as_ref(), "42");
/// ```
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct EdgeAddress(Vec<Arc<str>>);

macro_rules! impl_address {
    ($ty:ident) => {
        impl $ty {
            /// Builds an address from a sequence of string parts.
            #[must_use]
            pub fn from_parts(parts: &[&str]) -> Self {
                Self(parts.iter().map(|part| Arc::from(*part)).collect())
            }

            /// Builds an address directly from owned, reference-counted parts.
            #[must_use]
            pub fn from_arc_parts(parts: Vec<Arc<str>>) -> Self {
                Self(parts)
            }

            /// Returns the part sequence, the address's only notion of identity.
            #[must_use]
            pub fn parts(&self) -> &[Arc<str>] {
                &self.0
            }

            /// Returns a new address with `suffix` appended to this address's parts.
            #[must_use]
            pub fn append(&self, suffix: &[&str]) -> Self {
                Self(append(&self.0, suffix))
            }

            /// Returns whether this address begins with every part of `prefix`, in order.
            #[must_use]
            pub fn has_prefix(&self, prefix: &[&str]) -> bool {
                has_prefix(&self.0, prefix)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&canonical_string(&self.0))
            }
        }
    };
}

impl_address!(NodeAddress);
impl_address!(EdgeAddress);

/// Distinguishes the forward and backward halves of a bidirectional input
/// edge once it has been lifted into the Markov process graph.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// The edge runs `src -> dst`, as recorded in the input graph.
    Forward,
    /// The edge runs `dst -> src`, the reverse of the input graph recording.
    Backward,
}

impl Direction {
    /// Returns the single-character tag used in the markov edge address and
    /// in the serialized `reversed` flag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Forward => "F",
            Self::Backward => "B",
        }
    }

    /// Returns whether this direction represents the reverse of the
    /// underlying input edge.
    #[must_use]
    pub const fn is_reversed(self) -> bool {
        matches!(self, Self::Backward)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The primary key of a Markov process graph edge: a direction tag prepended
/// to the parts of an underlying [`EdgeAddress`].
///
/// # Examples
/// ```
/// use mpg_core::{Direction, EdgeAddress, MarkovEdgeAddress};
///
/// let underlying = EdgeAddress::from_parts(&["github", "pull", "42"]);
/// let forward = MarkovEdgeAddress::new(Direction::Forward, underlying.clone());
/// let backward = MarkovEdgeAddress::new(Direction::Backward, underlying);
/// assert_ne!(forward, backward);
/// assert_eq!(forward.direction(), Direction::Forward);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct MarkovEdgeAddress {
    edge: EdgeAddress,
    direction: Direction,
}

impl MarkovEdgeAddress {
    /// Builds a markov edge address from an underlying edge address and a direction tag.
    #[must_use]
    pub fn new(direction: Direction, edge: EdgeAddress) -> Self {
        Self { edge, direction }
    }

    /// Returns the underlying edge address.
    #[must_use]
    pub fn edge(&self) -> &EdgeAddress {
        &self.edge
    }

    /// Returns the direction tag.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for MarkovEdgeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.direction, self.edge)
    }
}

/// Process-wide address constants.
pub mod constants {
    /// Reserved prefix under which no input graph node may be addressed.
    pub const CORE_PREFIX: &[&str] = &["sourcecred", "core"];
    /// Suffix identifying the single seed node, appended to [`CORE_PREFIX`].
    pub const SEED_SUFFIX: &str = "SEED";
    /// Suffix identifying epoch nodes, appended to [`CORE_PREFIX`].
    pub const EPOCH_SUFFIX: &str = "EPOCH";

    /// Edge address prefix for epoch-to-owner payout edges.
    pub const EPOCH_PAYOUT_PREFIX: &[&str] = &["sourcecred", "core", "fibration", "EPOCH_PAYOUT"];
    /// Edge address prefix for epoch-to-epoch webbing edges.
    pub const EPOCH_WEBBING_PREFIX: &[&str] =
        &["sourcecred", "core", "fibration", "EPOCH_WEBBING"];
    /// Edge address prefix for radiation edges leaving an epoch node.
    pub const EPOCH_RADIATION_PREFIX: &[&str] =
        &["sourcecred", "core", "fibration", "EPOCH_RADIATION"];
    /// Edge address prefix for radiation edges leaving a non-epoch node.
    pub const CONTRIBUTION_RADIATION_PREFIX: &[&str] =
        &["sourcecred", "core", "CONTRIBUTION_RADIATION"];
    /// Edge address prefix for seed-to-node minting edges.
    pub const SEED_MINT_PREFIX: &[&str] = &["sourcecred", "core", "SEED_MINT"];

    /// Numerical tolerance for the stochasticity checks performed during
    /// construction and chain emission.
    pub const STOCHASTICITY_TOLERANCE: f64 = 1e-3;
}
