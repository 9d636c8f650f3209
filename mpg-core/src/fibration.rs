//! Fibration planner: identifies scoring addresses and plans the epoch-node
//! and epoch-webbing structure the builder synthesizes for each.

use std::collections::BTreeSet;

use crate::address::{NodeAddress, constants::CORE_PREFIX, constants::EPOCH_SUFFIX};
use crate::graph::{GraphNode, WeightedGraph};
use crate::interval::Boundary;

/// Teleportation parameters governing epoch webbing and payout, plus the
/// address prefixes that mark a node address as "scoring".
///
/// All four probabilities must be non-negative; the builder enforces that
/// their sum does not exceed one.
#[derive(Clone, Debug, PartialEq)]
pub struct FibrationOptions {
    scoring_prefixes: Vec<Vec<String>>,
    beta: f64,
    gamma_forward: f64,
    gamma_backward: f64,
}

impl FibrationOptions {
    /// Builds fibration options from scoring prefixes and teleportation shares.
    ///
    /// # Examples
    /// ```
    /// use mpg_core::FibrationOptions;
    ///
    /// let options = FibrationOptions::new(vec![vec!["github".to_owned()]], 0.2, 0.1, 0.1);
    /// assert_eq!(options.beta(), 0.2);
    /// ```
    #[must_use]
    pub fn new(
        scoring_prefixes: Vec<Vec<String>>,
        beta: f64,
        gamma_forward: f64,
        gamma_backward: f64,
    ) -> Self {
        Self {
            scoring_prefixes,
            beta,
            gamma_forward,
            gamma_backward,
        }
    }

    /// Returns the configured scoring prefixes.
    #[must_use]
    pub fn scoring_prefixes(&self) -> &[Vec<String>] {
        &self.scoring_prefixes
    }

    /// Returns the epoch-to-owner payout share.
    #[must_use]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Returns the epoch-to-next-epoch webbing share.
    #[must_use]
    pub fn gamma_forward(&self) -> f64 {
        self.gamma_forward
    }

    /// Returns the epoch-to-previous-epoch webbing share.
    #[must_use]
    pub fn gamma_backward(&self) -> f64 {
        self.gamma_backward
    }

    /// Returns whether `address` matches any configured scoring prefix.
    #[must_use]
    pub fn matches(&self, address: &NodeAddress) -> bool {
        self.scoring_prefixes.iter().any(|prefix| {
            let borrowed: Vec<&str> = prefix.iter().map(String::as_str).collect();
            address.has_prefix(&borrowed)
        })
    }
}

/// Returns every input graph node address matching any of `options`'s
/// scoring prefixes, in ascending address order.
#[must_use]
pub fn scoring_addresses(
    graph: &impl WeightedGraph,
    options: &FibrationOptions,
) -> BTreeSet<NodeAddress> {
    graph
        .nodes()
        .iter()
        .map(GraphNode::address)
        .filter(|address| options.matches(address))
        .cloned()
        .collect()
}

/// Returns the node address of the epoch incarnation of `owner` at `boundary`.
///
/// This is the reserved core prefix, the epoch suffix, the boundary's
/// canonical string, and finally the owner's own parts.
#[must_use]
pub fn epoch_node_address(owner: &NodeAddress, boundary: Boundary) -> NodeAddress {
    let canonical = boundary.canonical();
    let mut parts: Vec<&str> = CORE_PREFIX.to_vec();
    parts.push(EPOCH_SUFFIX);
    parts.push(&canonical);
    let mut address = NodeAddress::from_parts(&parts);
    let owner_parts: Vec<&str> = owner.parts().iter().map(AsRef::as_ref).collect();
    address = address.append(&owner_parts);
    address
}

/// One epoch incarnation of a scoring address, together with its neighbours
/// in the per-owner temporal chain: epoch nodes form a fully connected
/// chain across time for each owner.
#[derive(Clone, Debug, PartialEq)]
pub struct EpochSlot {
    /// Boundary this epoch covers.
    pub boundary: Boundary,
    /// This epoch's own node address.
    pub address: NodeAddress,
}

/// The full epoch plan for one scoring address: its epoch slots in boundary
/// order, ready for the builder to synthesize payout and webbing edges over.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnerPlan {
    /// The scoring address these epochs belong to.
    pub owner: NodeAddress,
    /// Epoch slots in ascending boundary order; never empty.
    pub slots: Vec<EpochSlot>,
}

impl OwnerPlan {
    /// Builds the epoch plan for `owner` over every boundary in `boundaries`.
    #[must_use]
    pub fn new(owner: NodeAddress, boundaries: &[Boundary]) -> Self {
        let slots = boundaries
            .iter()
            .map(|&boundary| EpochSlot {
                boundary,
                address: epoch_node_address(&owner, boundary),
            })
            .collect();
        Self { owner, slots }
    }

    /// Returns the consecutive `(previous, current)` epoch slot pairs for
    /// which webbing edges must be emitted.
    #[must_use]
    pub fn webbing_pairs(&self) -> impl Iterator<Item = (&EpochSlot, &EpochSlot)> {
        self.slots.windows(2).map(|pair| {
            #[expect(
                clippy::indexing_slicing,
                reason = "windows(2) guarantees exactly two elements"
            )]
            (&pair[0], &pair[1])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphNode, InMemoryWeightedGraph};
    use crate::interval;

    #[test]
    fn matches_honours_configured_prefixes() {
        let options = FibrationOptions::new(vec![vec!["github".to_owned()]], 0.1, 0.1, 0.1);
        assert!(options.matches(&NodeAddress::from_parts(&["github", "user", "a"])));
        assert!(!options.matches(&NodeAddress::from_parts(&["gitlab", "user", "a"])));
    }

    #[test]
    fn scoring_addresses_filters_graph_nodes() {
        let graph = InMemoryWeightedGraph::new()
            .with_node(GraphNode::new(
                NodeAddress::from_parts(&["github", "user", "alice"]),
                "alice",
            ))
            .with_node(GraphNode::new(
                NodeAddress::from_parts(&["github", "pull", "1"]),
                "pr 1",
            ));
        let options = FibrationOptions::new(
            vec![vec!["github".to_owned(), "user".to_owned()]],
            0.1,
            0.1,
            0.1,
        );
        let found = scoring_addresses(&graph, &options);
        assert_eq!(found.len(), 1);
        assert!(found.contains(&NodeAddress::from_parts(&["github", "user", "alice"])));
    }

    #[test]
    fn epoch_node_address_is_under_core_prefix_and_unique_per_owner() {
        let owner_a = NodeAddress::from_parts(&["github", "user", "a"]);
        let owner_b = NodeAddress::from_parts(&["github", "user", "b"]);
        let addr_a = epoch_node_address(&owner_a, Boundary::NegInf);
        let addr_b = epoch_node_address(&owner_b, Boundary::NegInf);
        assert!(addr_a.has_prefix(CORE_PREFIX));
        assert!(addr_a.has_prefix(&["sourcecred", "core", "EPOCH"]));
        assert_ne!(addr_a, addr_b);
    }

    #[test]
    fn owner_plan_yields_webbing_pairs_between_consecutive_slots() {
        const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;
        let boundaries = interval::partition([0, WEEK_MS]).intervals();
        let plan = OwnerPlan::new(NodeAddress::from_parts(&["owner"]), &boundaries);
        assert_eq!(plan.slots.len(), boundaries.len());
        let pairs: Vec<_> = plan.webbing_pairs().collect();
        assert_eq!(pairs.len(), boundaries.len() - 1);
    }
}
