//! Weight evaluators: pure functions from addresses to scalar weights.
//!
//! The concrete rule language that produces these weights is external to the
//! core; the [`PrefixWeightRules`] implementation below is a small
//! convenience evaluator for tests and simple callers, not part of the
//! contract itself.

use crate::address::{EdgeAddress, NodeAddress};

/// Maps a node address to a non-negative mint weight.
pub trait NodeWeightEvaluator {
    /// Returns the mint weight for `address`. Implementations must return a
    /// finite, non-negative value; the builder rejects any other value.
    fn weight(&self, address: &NodeAddress) -> f64;
}

/// Maps an edge address to a `(forward, backward)` pair of non-negative
/// weights.
pub trait EdgeWeightEvaluator {
    /// Returns the forward and backward weights for `address`. A zero weight
    /// on either side suppresses the corresponding MPG edge.
    fn weight(&self, address: &EdgeAddress) -> (f64, f64);
}

/// A longest-prefix-match weight evaluator over a small rule table, useful
/// for tests and for callers with no bespoke rule engine.
///
/// # Examples
/// ```
/// use mpg_core::{NodeAddress, NodeWeightEvaluator, PrefixWeightRules};
///
/// let rules = PrefixWeightRules::new()
///     .with_node_rule(&["github"], 2.0)
///     .with_node_rule(&["github", "bot"], 0.0);
///
/// assert_eq!(
///     NodeWeightEvaluator::weight(&rules, &NodeAddress::from_parts(&["github", "user", "alice"])),
///     2.0
/// );
/// assert_eq!(
///     NodeWeightEvaluator::weight(&rules, &NodeAddress::from_parts(&["github", "bot", "ci"])),
///     0.0
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrefixWeightRules {
    node_rules: Vec<(Vec<String>, f64)>,
    edge_rules: Vec<(Vec<String>, (f64, f64))>,
}

impl PrefixWeightRules {
    /// Creates an empty rule table; unmatched addresses weigh `0.0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node weight rule matched by prefix; longer prefixes win ties.
    #[must_use]
    pub fn with_node_rule(mut self, prefix: &[&str], weight: f64) -> Self {
        self.node_rules
            .push((prefix.iter().map(|part| (*part).to_owned()).collect(), weight));
        self
    }

    /// Adds an edge weight rule matched by prefix; longer prefixes win ties.
    #[must_use]
    pub fn with_edge_rule(mut self, prefix: &[&str], forward: f64, backward: f64) -> Self {
        self.edge_rules.push((
            prefix.iter().map(|part| (*part).to_owned()).collect(),
            (forward, backward),
        ));
        self
    }
}

/// Returns the value attached to the longest rule prefix matching `parts`.
fn longest_prefix_match<'a, T>(
    rules: &'a [(Vec<String>, T)],
    parts: &[std::sync::Arc<str>],
) -> Option<&'a T> {
    rules
        .iter()
        .filter(|(prefix, _)| {
            parts.len() >= prefix.len()
                && prefix
                    .iter()
                    .zip(parts.iter())
                    .all(|(rule_part, part)| rule_part.as_str() == part.as_ref())
        })
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, value)| value)
}

impl NodeWeightEvaluator for PrefixWeightRules {
    fn weight(&self, address: &NodeAddress) -> f64 {
        longest_prefix_match(&self.node_rules, address.parts()).map_or(0.0, |weight| *weight)
    }
}

impl EdgeWeightEvaluator for PrefixWeightRules {
    fn weight(&self, address: &EdgeAddress) -> (f64, f64) {
        longest_prefix_match(&self.edge_rules, address.parts())
            .map_or((0.0, 0.0), |(forward, backward)| (*forward, *backward))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_node_address_weighs_zero() {
        let rules = PrefixWeightRules::new();
        assert_eq!(
            NodeWeightEvaluator::weight(&rules, &NodeAddress::from_parts(&["a"])),
            0.0
        );
    }

    #[test]
    fn longer_prefix_takes_precedence() {
        let rules = PrefixWeightRules::new()
            .with_node_rule(&["a"], 1.0)
            .with_node_rule(&["a", "b"], 5.0);
        assert_eq!(
            NodeWeightEvaluator::weight(&rules, &NodeAddress::from_parts(&["a", "b", "c"])),
            5.0
        );
        assert_eq!(
            NodeWeightEvaluator::weight(&rules, &NodeAddress::from_parts(&["a", "x"])),
            1.0
        );
    }

    #[test]
    fn edge_rule_yields_forward_and_backward() {
        let rules = PrefixWeightRules::new().with_edge_rule(&["github", "pull"], 2.0, 1.0);
        let (forward, backward) =
            EdgeWeightEvaluator::weight(&rules, &EdgeAddress::from_parts(&["github", "pull", "1"]));
        assert_eq!((forward, backward), (2.0, 1.0));
    }
}
