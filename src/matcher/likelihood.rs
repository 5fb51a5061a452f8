use super::quintuple_tree::QuintupleTree;
use crate::newtypes::NodeId;
use std::collections::BTreeMap;

/// A sparse likelihood map over tree nodes: a node absent from the map
/// inherits its nearest ancestor's value rather than storing a
/// redundant copy. After [`Self::compress`], no node's stored value
/// equals its nearest ancestor's resolved value.
pub(super) struct Likelihoods {
    explicit: BTreeMap<NodeId, f64>,
}

impl Likelihoods {
    pub(super) fn new() -> Self {
        Self {
            explicit: BTreeMap::new(),
        }
    }

    pub(super) fn seed(&mut self, root: NodeId, value: f64) {
        self.explicit.clear();
        self.explicit.insert(root, value);
    }

    pub(super) fn get(&self, tree: &QuintupleTree, mut node: NodeId) -> f64 {
        loop {
            if let Some(&value) = self.explicit.get(&node) {
                return value;
            }
            let parent = tree.parent_of(node);
            if parent.is_null() {
                return 0.0;
            }
            node = parent;
        }
    }

    pub(super) fn set(&mut self, node: NodeId, value: f64) {
        self.explicit.insert(node, value);
    }

    /// The node's own stored value, without walking up to an ancestor
    /// when it has none. Used to test whether a node is itself
    /// explicit, e.g. to decide whether its value should propagate to
    /// a child newly attached beneath it.
    pub(super) fn explicit_value(&self, node: NodeId) -> Option<f64> {
        self.explicit.get(&node).copied()
    }

    pub(super) fn explicit_nodes(&self) -> Vec<NodeId> {
        self.explicit.keys().copied().collect()
    }

    /// Divides every explicit value by `max` so the largest becomes 1,
    /// preventing underflow over long haplotypes. `max` must be the
    /// current (positive, finite) result of [`Self::max`].
    pub(super) fn normalize(&mut self, max: f64) {
        for value in self.explicit.values_mut() {
            *value /= max;
        }
    }

    /// Drops any node whose stored value equals its nearest ancestor's
    /// resolved value, since it would resolve to the same value if
    /// dropped entirely.
    pub(super) fn compress(&mut self, tree: &QuintupleTree) {
        let mut redundant = Vec::new();
        for (&node, &value) in self.explicit.iter() {
            let parent = tree.parent_of(node);
            if parent.is_null() {
                continue;
            }
            if (self.get(tree, parent) - value).abs() < 1e-12 {
                redundant.push(node);
            }
        }
        for node in redundant {
            self.explicit.remove(&node);
        }
    }

    pub(super) fn max(&self) -> f64 {
        self.explicit.values().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// The candidate with the greatest resolved likelihood, ties broken
    /// toward whichever candidate is seen first. `candidates` is every
    /// node presently eligible to be a copying source — not just nodes
    /// with an explicit entry, since an unset node can still tie or win
    /// by inheriting its nearest ancestor's value.
    pub(super) fn best_node(&self, tree: &QuintupleTree, candidates: impl Iterator<Item = NodeId>) -> NodeId {
        let mut best = NodeId::VIRTUAL_ROOT;
        let mut best_value = f64::NEG_INFINITY;
        for node in candidates {
            let value = self.get(tree, node);
            if value > best_value {
                best_value = value;
                best = node;
            }
        }
        best
    }
}
