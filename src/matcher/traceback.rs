use crate::newtypes::NodeId;
use std::collections::BTreeMap;

fn idx(node: NodeId) -> usize {
    usize::try_from(node).expect("node id must be within range")
}

/// One site's worth of forward-pass traceback: whether each explicit
/// likelihood node required a recombination to reach its value, which
/// node held the overall maximum likelihood, and a parent-array
/// snapshot of the marginal tree so a node absent from the bit map can
/// be resolved by climbing to its nearest explicit ancestor.
struct SiteRecord {
    recombination_required: BTreeMap<NodeId, bool>,
    max_likelihood_node: NodeId,
    parent: Vec<NodeId>,
}

/// Per-site recombination-decision records from a forward pass, reset
/// at the start of every [`super::AncestorMatcher::find_path`] call.
/// The backward pass walks this right to left, following the current
/// copying node's own recorded bit rather than a single global
/// best-node track, switching node only where that bit says a
/// recombination was required to reach the node's likelihood.
pub(super) struct Traceback {
    sites: Vec<SiteRecord>,
}

impl Traceback {
    pub(super) fn new(num_sites: usize) -> Self {
        Self {
            sites: Vec::with_capacity(num_sites),
        }
    }

    /// Appends the next site's record. Sites must be recorded in
    /// ascending order, matching the forward pass's left-to-right scan.
    pub(super) fn record_site(
        &mut self,
        recombination_required: BTreeMap<NodeId, bool>,
        max_likelihood_node: NodeId,
        parent: Vec<NodeId>,
    ) {
        self.sites.push(SiteRecord {
            recombination_required,
            max_likelihood_node,
            parent,
        });
    }

    /// Resolves `node`'s effective recombination-required bit at this
    /// site by climbing to the nearest ancestor with an explicit entry.
    /// A node with no explicit ancestor at this site (it sits above
    /// everything ever recorded there) is treated as not having
    /// required a recombination.
    fn effective_bit(site: &SiteRecord, mut node: NodeId) -> bool {
        loop {
            if let Some(&bit) = site.recombination_required.get(&node) {
                return bit;
            }
            let parent = site.parent.get(idx(node)).copied().unwrap_or(NodeId::NULL);
            if parent.is_null() {
                return false;
            }
            node = parent;
        }
    }

    /// Walks sites from the last down to the first, starting at the
    /// last site's overall best node. At each site, if the current
    /// node's effective bit is set, the open edge closes here and the
    /// walk switches to the previous site's best node; otherwise the
    /// edge continues leftward unchanged. Edges are accumulated
    /// right-to-left then reversed.
    pub(super) fn backward_walk(&self, num_sites: u32) -> Vec<(u32, u32, NodeId)> {
        if self.sites.is_empty() {
            return Vec::new();
        }
        let last = self.sites.len() - 1;
        let mut current = self.sites[last].max_likelihood_node;
        let mut right = num_sites;
        let mut edges = Vec::new();
        for site in (0..=last).rev() {
            if Self::effective_bit(&self.sites[site], current) && site > 0 {
                edges.push((site as u32, right, current));
                right = site as u32;
                current = self.sites[site - 1].max_likelihood_node;
            }
        }
        edges.push((0, right, current));
        edges.reverse();
        edges
    }
}
