//! Error types for the Markov process graph core.
//!
//! Defines the error taxonomy (`ConfigurationError`, `InputError`,
//! `InvariantError`, `LookupError`) unified behind [`MpgError`], plus a
//! stable, machine-readable [`MpgErrorCode`] and a crate-level [`Result`]
//! alias.

use std::fmt;

use thiserror::Error;

/// Stable codes describing [`MpgError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum MpgErrorCode {
    /// Teleportation parameters are negative or sum to more than one.
    InvalidTeleportation,
    /// The serialized record carries an unknown format version.
    UnknownVersion,
    /// The serialized record carries a type tag that is not ours.
    WrongType,
    /// An input node address lies under the reserved core prefix.
    ReservedAddress,
    /// A node weight was non-finite or negative.
    InvalidNodeWeight,
    /// Two nodes share an address.
    DuplicateNode,
    /// Two edges share a primary key.
    DuplicateEdge,
    /// A transition probability fell outside `[0, 1]`.
    ProbabilityOutOfRange,
    /// The out-transitions of some node do not sum to `1` within tolerance.
    NotStochastic,
    /// Every node has zero mint, so the seed has no outflow.
    ZeroTotalMint,
    /// A chain-emission or lookup step referenced an address with no node.
    UnknownAddress,
}

impl MpgErrorCode {
    /// Returns the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidTeleportation => "MPG_INVALID_TELEPORTATION",
            Self::UnknownVersion => "MPG_UNKNOWN_VERSION",
            Self::WrongType => "MPG_WRONG_TYPE",
            Self::ReservedAddress => "MPG_RESERVED_ADDRESS",
            Self::InvalidNodeWeight => "MPG_INVALID_NODE_WEIGHT",
            Self::DuplicateNode => "MPG_DUPLICATE_NODE",
            Self::DuplicateEdge => "MPG_DUPLICATE_EDGE",
            Self::ProbabilityOutOfRange => "MPG_PROBABILITY_OUT_OF_RANGE",
            Self::NotStochastic => "MPG_NOT_STOCHASTIC",
            Self::ZeroTotalMint => "MPG_ZERO_TOTAL_MINT",
            Self::UnknownAddress => "MPG_UNKNOWN_ADDRESS",
        }
    }
}

impl fmt::Display for MpgErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type produced while constructing, emitting, or deserializing a
/// Markov process graph.
///
/// Every variant is fatal at its construction site; none is recovered
/// internally.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MpgError {
    /// `alpha + beta + gamma_forward + gamma_backward` is negative or
    /// exceeds one.
    #[error(
        "teleportation parameters alpha={alpha}, beta={beta}, gamma_forward={gamma_forward}, \
         gamma_backward={gamma_backward} must be non-negative and sum to at most 1 (sum={sum})"
    )]
    InvalidTeleportation {
        alpha: f64,
        beta: f64,
        gamma_forward: f64,
        gamma_backward: f64,
        sum: f64,
    },
    /// A serialized record's `version` field is not one this crate understands.
    #[error("unknown markov process graph record version `{version}`")]
    UnknownVersion { version: String },
    /// A serialized record's `type` field is not `sourcecred/markovProcessGraph`.
    #[error("expected record type `sourcecred/markovProcessGraph`, got `{found}`")]
    WrongType { found: String },
    /// An input graph node's address lies under the reserved core prefix.
    #[error("input node address `{address}` lies under the reserved core prefix")]
    ReservedAddress { address: String },
    /// A node weight evaluated to a non-finite or negative value.
    #[error("node `{address}` has invalid weight {weight} (must be finite and non-negative)")]
    InvalidNodeWeight { address: String, weight: f64 },
    /// Two nodes were emitted with the same address.
    #[error("duplicate node address `{address}`")]
    DuplicateNode { address: String },
    /// Two edges were emitted with the same primary key.
    #[error("duplicate edge address `{address}`")]
    DuplicateEdge { address: String },
    /// A computed transition probability fell outside `[0, 1]`.
    #[error("edge `{address}` has transition probability {probability} outside [0, 1]")]
    ProbabilityOutOfRange { address: String, probability: f64 },
    /// A node's out-transitions do not sum to `1` within the configured
    /// stochasticity tolerance.
    #[error(
        "node `{address}` has out-transitions summing to {sum}, which is not within \
         {tolerance} of 1.0"
    )]
    NotStochastic {
        address: String,
        sum: f64,
        tolerance: f64,
    },
    /// Every node has zero mint, so the seed node would have no outflow.
    #[error("total mint across all nodes is zero; the seed node would have no outflow")]
    ZeroTotalMint,
    /// A chain-emission step referenced an address no node was ever emitted for.
    #[error("edge `{edge}` references unknown node address `{address}`")]
    UnknownAddress { edge: String, address: String },
}

impl MpgError {
    /// Retrieves the stable [`MpgErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> MpgErrorCode {
        match self {
            Self::InvalidTeleportation { .. } => MpgErrorCode::InvalidTeleportation,
            Self::UnknownVersion { .. } => MpgErrorCode::UnknownVersion,
            Self::WrongType { .. } => MpgErrorCode::WrongType,
            Self::ReservedAddress { .. } => MpgErrorCode::ReservedAddress,
            Self::InvalidNodeWeight { .. } => MpgErrorCode::InvalidNodeWeight,
            Self::DuplicateNode { .. } => MpgErrorCode::DuplicateNode,
            Self::DuplicateEdge { .. } => MpgErrorCode::DuplicateEdge,
            Self::ProbabilityOutOfRange { .. } => MpgErrorCode::ProbabilityOutOfRange,
            Self::NotStochastic { .. } => MpgErrorCode::NotStochastic,
            Self::ZeroTotalMint => MpgErrorCode::ZeroTotalMint,
            Self::UnknownAddress { .. } => MpgErrorCode::UnknownAddress,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, MpgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_round_trips_through_as_str() {
        let error = MpgError::ZeroTotalMint;
        assert_eq!(error.code().as_str(), "MPG_ZERO_TOTAL_MINT");
        assert_eq!(error.code().to_string(), "MPG_ZERO_TOTAL_MINT");
    }

    #[test]
    fn invalid_teleportation_reports_inputs() {
        let error = MpgError::InvalidTeleportation {
            alpha: 0.5,
            beta: 0.2,
            gamma_forward: 0.2,
            gamma_backward: 0.2,
            sum: 1.1,
        };
        assert_eq!(error.code(), MpgErrorCode::InvalidTeleportation);
        assert!(error.to_string().contains("1.1"));
    }
}
