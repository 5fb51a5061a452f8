use crate::newtypes::{EdgeId, NodeId};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

type OF = OrderedFloat<f64>;

/// `left_index`, keyed by `(left, time[parent], child)`.
///
/// Used by the matcher's forward pass to find, in `(time, child)`
/// order, every edge that begins at a given site.
#[derive(Default)]
pub(crate) struct LeftIndex(BTreeMap<(u32, OF, NodeId), EdgeId>);

impl LeftIndex {
    pub(crate) fn insert(&mut self, left: u32, parent_time: f64, child: NodeId, edge: EdgeId) {
        self.0.insert((left, OrderedFloat(parent_time), child), edge);
    }

    pub(crate) fn remove(&mut self, left: u32, parent_time: f64, child: NodeId) {
        self.0.remove(&(left, OrderedFloat(parent_time), child));
    }

    /// Edges whose `left == site`, in `(time[parent], child)` order.
    pub(crate) fn at(&self, site: u32) -> impl Iterator<Item = EdgeId> + '_ {
        self.0
            .range((site, OrderedFloat(f64::NEG_INFINITY), NodeId::NULL)..(site + 1, OrderedFloat(f64::NEG_INFINITY), NodeId::NULL))
            .map(|(_, v)| *v)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

/// `right_index`, keyed by `(right, −time[parent], child)`.
///
/// Used by the matcher's forward pass to find, at a given site, every
/// edge whose interval just closed.
#[derive(Default)]
pub(crate) struct RightIndex(BTreeMap<(u32, OF, NodeId), EdgeId>);

impl RightIndex {
    pub(crate) fn insert(&mut self, right: u32, parent_time: f64, child: NodeId, edge: EdgeId) {
        self.0.insert((right, OrderedFloat(-parent_time), child), edge);
    }

    pub(crate) fn remove(&mut self, right: u32, parent_time: f64, child: NodeId) {
        self.0.remove(&(right, OrderedFloat(-parent_time), child));
    }

    /// Edges whose `right == site`, in `(−time[parent], child)` order.
    pub(crate) fn at(&self, site: u32) -> impl Iterator<Item = EdgeId> + '_ {
        self.0
            .range((site, OrderedFloat(f64::NEG_INFINITY), NodeId::NULL)..(site + 1, OrderedFloat(f64::NEG_INFINITY), NodeId::NULL))
            .map(|(_, v)| *v)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

/// `path_index`, keyed by `(parent, child, left)`, used to detect
/// shared recombination breakpoints and to relocate an edge when its
/// left endpoint is extended — the only mutation ever made to a
/// previously inserted edge.
#[derive(Default)]
pub(crate) struct PathIndex(BTreeMap<(NodeId, NodeId, u32), EdgeId>);

impl PathIndex {
    pub(crate) fn insert(&mut self, parent: NodeId, child: NodeId, left: u32, edge: EdgeId) {
        self.0.insert((parent, child, left), edge);
    }

    pub(crate) fn remove(&mut self, parent: NodeId, child: NodeId, left: u32) -> Option<EdgeId> {
        self.0.remove(&(parent, child, left))
    }

    pub(crate) fn get(&self, parent: NodeId, child: NodeId, left: u32) -> Option<EdgeId> {
        self.0.get(&(parent, child, left)).copied()
    }

    /// Finds another child's edge starting at this exact `(parent,
    /// left)` breakpoint, if one is registered. This is the detection
    /// mechanism for shared recombination: two children whose paths
    /// both name an edge from `parent` starting at `left` are copying
    /// the same recombination event, regardless of what either path
    /// does before or after it. Scans every child registered under
    /// `parent`, since the index's primary key is `parent` rather than
    /// `left`.
    pub(crate) fn find_sibling_at(&self, parent: NodeId, left: u32, exclude: NodeId) -> Option<(NodeId, EdgeId)> {
        let lower = (parent, NodeId::NULL, u32::MIN);
        let upper = (parent, NodeId::from(i64::MAX), u32::MAX);
        self.0.range(lower..=upper).find_map(|(&(_, other_child, other_left), &edge)| {
            (other_child != exclude && other_left == left).then_some((other_child, edge))
        })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}
