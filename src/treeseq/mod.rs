//! Tree Sequence Builder.
//!
//! An incremental edge database keyed by three sorted interval
//! indices, supporting node insertion, path insertion, shared-
//! recombination resolution, and dumping. Nodes and edges, once
//! inserted, are never individually removed — only a shared
//! recombination's rewrite extends an edge's left endpoint in place.

mod edge;
mod indices;
mod shared_recomb;

use crate::arena::{BumpArena, ObjectPool, SinglyLinkedList};
use crate::error::{TsinferError, TsinferResult};
use crate::flags::BuilderFlags;
use crate::newtypes::{EdgeId, MutationId, NodeId, SiteId, Time};
use indices::{LeftIndex, PathIndex, RightIndex};
use std::collections::{HashMap, HashSet};

pub use edge::Edge;

#[derive(Debug, Clone, Copy)]
struct MutationRecord {
    site: SiteId,
    node: NodeId,
    derived_state: i8,
    parent_mutation: MutationId,
}

/// A read-only view of one row of the (conceptual) mutation table,
/// returned by [`TreeSequenceBuilder::mutations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRow {
    pub site: SiteId,
    pub node: NodeId,
    pub derived_state: i8,
    pub parent_mutation: MutationId,
}

impl From<&MutationRecord> for MutationRow {
    fn from(record: &MutationRecord) -> Self {
        Self {
            site: record.site,
            node: record.node,
            derived_state: record.derived_state,
            parent_mutation: record.parent_mutation,
        }
    }
}

/// A read-only view of one row of the (conceptual) node table, returned
/// by [`TreeSequenceBuilder::nodes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRow {
    pub id: NodeId,
    pub time: Time,
    pub is_sample: bool,
}

/// A flat, dump-ordered snapshot of builder state: node, edge, and
/// mutation tables as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dump {
    pub node_is_sample: Vec<bool>,
    pub node_time: Vec<f64>,
    pub edge_left: Vec<u32>,
    pub edge_right: Vec<u32>,
    pub edge_parent: Vec<i64>,
    pub edge_child: Vec<i64>,
    pub mutation_site: Vec<i64>,
    pub mutation_node: Vec<i64>,
    pub mutation_derived_state: Vec<i8>,
    pub mutation_parent: Vec<i64>,
}

pub struct TreeSequenceBuilder {
    flags: BuilderFlags,
    num_sites: u32,
    node_time: Vec<Time>,
    node_is_sample: Vec<bool>,
    edges: ObjectPool<Edge>,
    /// Insertion order of edges currently live, for dump ordering.
    /// Shared-recombination resolution is the one path that removes an
    /// edge after insertion (to rewrite its parent via a synthesized
    /// hub), so this is tracked explicitly rather than assumed to equal
    /// pool allocation order.
    edge_insertion_order: Vec<EdgeId>,
    /// Each child's path, ordered by `left` ascending.
    child_paths: Vec<Vec<EdgeId>>,
    left_index: LeftIndex,
    right_index: RightIndex,
    path_index: PathIndex,
    mutations: BumpArena<MutationRecord>,
    site_mutation_lists: Vec<SinglyLinkedList<MutationId>>,
    latest_mutation_at: HashMap<(SiteId, NodeId), MutationId>,
    /// Nodes synthesized by shared-recombination resolution. Sharing
    /// itself is detected by probing `path_index`; this set only
    /// distinguishes reusing an existing hub from synthesizing a new
    /// one when a breakpoint is first found to be shared.
    shared_recomb_hubs: HashSet<NodeId>,
}

impl TreeSequenceBuilder {
    pub fn new(num_sites: u32, flags: BuilderFlags) -> TsinferResult<Self> {
        if !flags.is_valid() {
            return Err(TsinferError::UnknownFlag { bits: flags.bits() });
        }
        let mut builder = Self::empty(num_sites, flags);
        // Node 0 is the virtual root: time = +∞, not a sample.
        builder.push_node_raw(Time::INFINITY, false);
        Ok(builder)
    }

    fn empty(num_sites: u32, flags: BuilderFlags) -> Self {
        Self {
            flags,
            num_sites,
            node_time: Vec::new(),
            node_is_sample: Vec::new(),
            edges: ObjectPool::new(),
            edge_insertion_order: Vec::new(),
            child_paths: Vec::new(),
            left_index: LeftIndex::default(),
            right_index: RightIndex::default(),
            path_index: PathIndex::default(),
            mutations: BumpArena::new(),
            site_mutation_lists: (0..num_sites).map(|_| SinglyLinkedList::new()).collect(),
            latest_mutation_at: HashMap::new(),
            shared_recomb_hubs: HashSet::new(),
        }
    }

    pub fn num_sites(&self) -> u32 {
        self.num_sites
    }

    pub fn num_nodes(&self) -> usize {
        self.node_time.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_insertion_order.len()
    }

    pub fn flags(&self) -> BuilderFlags {
        self.flags
    }

    pub fn time(&self, node: NodeId) -> TsinferResult<Time> {
        let idx = self.node_index(node)?;
        Ok(self.node_time[idx])
    }

    pub fn is_sample(&self, node: NodeId) -> TsinferResult<bool> {
        let idx = self.node_index(node)?;
        Ok(self.node_is_sample[idx])
    }

    /// Every sample node, in allocation order.
    pub fn samples(&self) -> Vec<NodeId> {
        self.node_is_sample
            .iter()
            .enumerate()
            .filter_map(|(idx, &is_sample)| is_sample.then(|| NodeId::from(idx)))
            .collect()
    }

    pub fn num_samples(&self) -> usize {
        self.node_is_sample.iter().filter(|&&is_sample| is_sample).count()
    }

    /// Every node row, in allocation order (node `0` is the virtual root).
    pub fn nodes(&self) -> impl Iterator<Item = NodeRow> + '_ {
        self.node_time
            .iter()
            .zip(&self.node_is_sample)
            .enumerate()
            .map(|(idx, (&time, &is_sample))| NodeRow {
                id: NodeId::from(idx),
                time,
                is_sample,
            })
    }

    /// Every edge row currently live, in dump order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edge_insertion_order.iter().map(|&id| self.edge(id))
    }

    /// Every mutation row, in allocation order.
    pub fn mutations(&self) -> impl Iterator<Item = MutationRow> + '_ {
        self.mutations.iter().map(MutationRow::from)
    }

    fn node_index(&self, node: NodeId) -> TsinferResult<usize> {
        usize::try_from(node).ok().filter(|&idx| idx < self.node_time.len()).ok_or_else(|| {
            TsinferError::bad_param(format!("node {node} is out of range"))
        })
    }

    fn push_node_raw(&mut self, time: Time, is_sample: bool) -> NodeId {
        let id = NodeId::from(self.node_time.len());
        self.node_time.push(time);
        self.node_is_sample.push(is_sample);
        self.child_paths.push(Vec::new());
        id
    }

    /// Appends a node. Time ordering against other nodes is enforced
    /// only indirectly, by `add_path` rejecting an edge whose parent
    /// is not strictly older than its child — `add_node` itself
    /// performs no ordering check.
    pub fn add_node(&mut self, time: Time, is_sample: bool) -> TsinferResult<NodeId> {
        if !f64::from(time).is_finite() {
            return Err(TsinferError::bad_param("node time must be finite"));
        }
        Ok(self.push_node_raw(time, is_sample))
    }

    fn validate_edge_bounds(&self, left: u32, right: u32, parent: NodeId, child: NodeId) -> TsinferResult<()> {
        if left >= right {
            return Err(TsinferError::bad_param(format!(
                "edge interval [{left}, {right}) is empty or inverted"
            )));
        }
        if right > self.num_sites {
            return Err(TsinferError::bad_param(format!(
                "edge right endpoint {right} exceeds num_sites {}",
                self.num_sites
            )));
        }
        let parent_idx = self.node_index(parent)?;
        let child_idx = self.node_index(child)?;
        if self.node_time[parent_idx] <= self.node_time[child_idx] {
            return Err(TsinferError::bad_param(format!(
                "time[parent={parent}]={:?} does not exceed time[child={child}]={:?}",
                self.node_time[parent_idx], self.node_time[child_idx]
            )));
        }
        Ok(())
    }

    /// Validates that `edges` are sorted by `left`, pairwise
    /// non-overlapping, and cover one contiguous interval.
    fn validate_path_shape(&self, edges: &[(u32, u32, NodeId)]) -> TsinferResult<()> {
        if edges.is_empty() {
            return Err(TsinferError::bad_param("add_path requires at least one edge"));
        }
        for window in edges.windows(2) {
            let (_, right0, _) = window[0];
            let (left1, _, _) = window[1];
            if right0 != left1 {
                return Err(TsinferError::bad_param(
                    "add_path edges must be contiguous and non-overlapping",
                ));
            }
        }
        Ok(())
    }

    fn edge_pool_id(id: EdgeId) -> u32 {
        i64::from(id) as u32
    }

    /// Inserts one edge directly into storage and all three indices,
    /// bypassing shared-recombination resolution. Used both by
    /// `add_path`'s non-colliding case and by `restore`.
    fn insert_edge_raw(&mut self, left: u32, right: u32, parent: NodeId, child: NodeId) -> TsinferResult<EdgeId> {
        self.validate_edge_bounds(left, right, parent, child)?;
        let parent_time = self.time(parent)?;
        let edge = Edge::new(left, right, parent, parent_time, child);
        let id = EdgeId::from(self.edges.alloc(edge) as i64);
        self.edge_insertion_order.push(id);
        self.left_index.insert(left, parent_time.into(), child, id);
        self.right_index.insert(right, parent_time.into(), child, id);
        self.path_index.insert(parent, child, left, id);

        let child_idx = usize::try_from(child)?;
        let path = &mut self.child_paths[child_idx];
        let insert_at =
            path.partition_point(|&existing| self.edges.get(Self::edge_pool_id(existing)).left < left);
        path.insert(insert_at, id);
        Ok(id)
    }

    /// Removes a previously inserted edge from storage, all three
    /// indices, and its child's path. Used only by shared-recombination
    /// resolution, to detach an edge before reinserting it under a
    /// synthesized parent.
    fn remove_edge_raw(&mut self, id: EdgeId) {
        let e = *self.edges.get(Self::edge_pool_id(id));
        self.left_index.remove(e.left, e.parent_time.into(), e.child);
        self.right_index.remove(e.right, e.parent_time.into(), e.child);
        self.path_index.remove(e.parent, e.child, e.left);
        if let Ok(child_idx) = usize::try_from(e.child) {
            self.child_paths[child_idx].retain(|&existing| existing != id);
        }
        self.edge_insertion_order.retain(|&existing| existing != id);
        self.edges.free(Self::edge_pool_id(id));
    }

    /// Relocates an edge's left endpoint, the only mutation ever made
    /// in place to a previously inserted edge, keeping all three
    /// indices consistent.
    fn extend_edge_left(&mut self, edge: EdgeId, new_left: u32) {
        let raw = *self.edges.get(Self::edge_pool_id(edge));
        self.left_index.remove(raw.left, raw.parent_time.into(), raw.child);
        self.path_index.remove(raw.parent, raw.child, raw.left);
        let updated = Edge {
            left: new_left,
            ..raw
        };
        *self.edges.get_mut(Self::edge_pool_id(edge)) = updated;
        self.left_index.insert(new_left, raw.parent_time.into(), raw.child, edge);
        self.path_index.insert(raw.parent, raw.child, new_left, edge);
    }

    pub fn edge(&self, id: EdgeId) -> Edge {
        *self.edges.get(Self::edge_pool_id(id))
    }

    pub fn path(&self, child: NodeId) -> TsinferResult<&[EdgeId]> {
        let idx = self.node_index(child)?;
        Ok(&self.child_paths[idx])
    }

    pub(crate) fn left_index(&self) -> &LeftIndex {
        &self.left_index
    }

    pub(crate) fn right_index(&self) -> &RightIndex {
        &self.right_index
    }

    /// Inserts a path for `child`. With
    /// [`BuilderFlags::RESOLVE_SHARED_RECOMBS`] set, breakpoints shared
    /// with an existing, distinct child's path are collapsed per
    /// [`shared_recomb`].
    pub fn add_path(&mut self, child: NodeId, edges: &[(u32, u32, NodeId)]) -> TsinferResult<()> {
        self.node_index(child)?;
        self.validate_path_shape(edges)?;
        for &(left, right, parent) in edges {
            self.validate_edge_bounds(left, right, parent, child)?;
        }

        if self.flags.contains(BuilderFlags::RESOLVE_SHARED_RECOMBS) && edges.len() > 1 {
            shared_recomb::resolve_and_insert(self, child, edges)
        } else {
            for &(left, right, parent) in edges {
                self.insert_edge_raw(left, right, parent, child)?;
            }
            Ok(())
        }
    }

    /// Standalone shared-recombination resolution over an already
    /// validated path, exposed independently of `add_path` so it can
    /// be property-tested in isolation.
    pub fn resolve_shared_recombinations(&mut self, child: NodeId, edges: &[(u32, u32, NodeId)]) -> TsinferResult<()> {
        self.node_index(child)?;
        self.validate_path_shape(edges)?;
        for &(left, right, parent) in edges {
            self.validate_edge_bounds(left, right, parent, child)?;
        }
        shared_recomb::resolve_and_insert(self, child, edges)
    }

    /// Finds the edge in `node`'s path covering `site`, if any.
    fn edge_covering(&self, node: NodeId, site: u32) -> Option<Edge> {
        let idx = usize::try_from(node).ok()?;
        let path = self.child_paths.get(idx)?;
        let pos = path.partition_point(|&id| self.edge(id).right <= site);
        path.get(pos).map(|&id| self.edge(id)).filter(|e| e.left <= site && site < e.right)
    }

    fn tree_parent_at(&self, site: u32, node: NodeId) -> NodeId {
        self.edge_covering(node, site).map(|e| e.parent).unwrap_or(NodeId::NULL)
    }

    fn mutation_pool_id(id: MutationId) -> u32 {
        i64::from(id) as u32
    }

    fn derived_state_of(&self, id: MutationId) -> i8 {
        self.mutations.get(Self::mutation_pool_id(id)).derived_state
    }

    /// The node a mutation was recorded against.
    pub fn mutation_node(&self, id: MutationId) -> NodeId {
        self.mutations.get(Self::mutation_pool_id(id)).node
    }

    /// The allele `node` carries at `site`: the derived state of the
    /// nearest mutation on `node` or one of its ancestors, or the
    /// ancestral allele `0` if none exists.
    pub fn allele_at(&self, site: SiteId, node: NodeId) -> TsinferResult<i8> {
        self.node_index(node)?;
        let site_idx = usize::try_from(site)
            .map_err(|_| TsinferError::bad_param(format!("site {site} out of range")))?;
        if site_idx >= self.num_sites as usize {
            return Err(TsinferError::bad_param(format!("site {site} out of range")));
        }
        let mut cursor = node;
        loop {
            if let Some(&mutation) = self.latest_mutation_at.get(&(site, cursor)) {
                return Ok(self.derived_state_of(mutation));
            }
            let next = self.tree_parent_at(site_idx as u32, cursor);
            if next.is_null() {
                return Ok(0);
            }
            cursor = next;
        }
    }

    /// Prepends mutation records for `node`. No ordering guarantee
    /// holds across nodes, but insertion order is stable within one
    /// call.
    pub fn add_mutations(&mut self, node: NodeId, sites: &[SiteId], derived_state: &[i8]) -> TsinferResult<()> {
        self.node_index(node)?;
        if sites.len() != derived_state.len() {
            return Err(TsinferError::bad_param("sites and derived_state length mismatch"));
        }
        for (&site, &state) in sites.iter().zip(derived_state) {
            let site_idx = usize::try_from(site)
                .map_err(|_| TsinferError::bad_param(format!("site {site} out of range")))?;
            if site_idx >= self.num_sites as usize {
                return Err(TsinferError::bad_param(format!("site {site} out of range")));
            }

            let mut cursor = node;
            let mut parent_mutation = MutationId::NULL;
            loop {
                if let Some(&existing) = self.latest_mutation_at.get(&(site, cursor)) {
                    parent_mutation = existing;
                    break;
                }
                let next = self.tree_parent_at(site_idx as u32, cursor);
                if next.is_null() {
                    break;
                }
                cursor = next;
            }

            let record_id = self.mutations.alloc(MutationRecord {
                site,
                node,
                derived_state: state,
                parent_mutation,
            });
            let mutation_id = MutationId::from(record_id as i64);
            self.site_mutation_lists[site_idx].prepend(mutation_id);
            self.latest_mutation_at.insert((site, node), mutation_id);
        }
        Ok(())
    }

    /// Every mutation recorded at `site`, most recently added first.
    pub fn mutations_at(&self, site: SiteId) -> TsinferResult<Vec<MutationId>> {
        let site_idx = usize::try_from(site)
            .map_err(|_| TsinferError::bad_param(format!("site {site} out of range")))?;
        let list = self
            .site_mutation_lists
            .get(site_idx)
            .ok_or_else(|| TsinferError::bad_param(format!("site {site} out of range")))?;
        Ok(list.iter().copied().collect())
    }

    pub fn dump(&self) -> Dump {
        let mut dump = Dump {
            node_is_sample: self.node_is_sample.clone(),
            node_time: self.node_time.iter().map(|&t| t.into()).collect(),
            edge_left: Vec::with_capacity(self.num_edges()),
            edge_right: Vec::with_capacity(self.num_edges()),
            edge_parent: Vec::with_capacity(self.num_edges()),
            edge_child: Vec::with_capacity(self.num_edges()),
            mutation_site: Vec::new(),
            mutation_node: Vec::new(),
            mutation_derived_state: Vec::new(),
            mutation_parent: Vec::new(),
        };
        for &id in &self.edge_insertion_order {
            let e = self.edge(id);
            dump.edge_left.push(e.left);
            dump.edge_right.push(e.right);
            dump.edge_parent.push(e.parent.into());
            dump.edge_child.push(e.child.into());
        }
        for record in self.mutations.iter() {
            dump.mutation_site.push(record.site.into());
            dump.mutation_node.push(record.node.into());
            dump.mutation_derived_state.push(record.derived_state);
            dump.mutation_parent.push(record.parent_mutation.into());
        }
        dump
    }

    /// Rebuilds a fresh builder from a [`Dump`], reconstructing all
    /// three interval indices. `restore` is the inverse of `dump`: a
    /// dump-restore-dump round trip reproduces the same [`Dump`].
    pub fn restore(num_sites: u32, flags: BuilderFlags, dump: &Dump) -> TsinferResult<Self> {
        if !flags.is_valid() {
            return Err(TsinferError::UnknownFlag { bits: flags.bits() });
        }
        if dump.node_is_sample.len() != dump.node_time.len() {
            return Err(TsinferError::bad_param("node dump arrays have mismatched length"));
        }
        let mut builder = Self::empty(num_sites, flags);
        for (&is_sample, &time) in dump.node_is_sample.iter().zip(&dump.node_time) {
            builder.push_node_raw(Time::from(time), is_sample);
        }

        let edge_arrays_len = dump.edge_left.len();
        if dump.edge_right.len() != edge_arrays_len
            || dump.edge_parent.len() != edge_arrays_len
            || dump.edge_child.len() != edge_arrays_len
        {
            return Err(TsinferError::bad_param("edge dump arrays have mismatched length"));
        }
        for i in 0..edge_arrays_len {
            builder.insert_edge_raw(
                dump.edge_left[i],
                dump.edge_right[i],
                NodeId::from(dump.edge_parent[i]),
                NodeId::from(dump.edge_child[i]),
            )?;
        }

        let mutation_arrays_len = dump.mutation_site.len();
        if dump.mutation_node.len() != mutation_arrays_len
            || dump.mutation_derived_state.len() != mutation_arrays_len
            || dump.mutation_parent.len() != mutation_arrays_len
        {
            return Err(TsinferError::bad_param("mutation dump arrays have mismatched length"));
        }
        for i in 0..mutation_arrays_len {
            let site = SiteId::from(dump.mutation_site[i]);
            let site_idx = usize::try_from(site)
                .map_err(|_| TsinferError::bad_param("mutation dump site out of range"))?;
            let node = NodeId::from(dump.mutation_node[i]);
            let record_id = builder.mutations.alloc(MutationRecord {
                site,
                node,
                derived_state: dump.mutation_derived_state[i],
                parent_mutation: MutationId::from(dump.mutation_parent[i]),
            });
            let mutation_id = MutationId::from(record_id as i64);
            builder
                .site_mutation_lists
                .get_mut(site_idx)
                .ok_or_else(|| TsinferError::bad_param("mutation dump site out of range"))?
                .prepend(mutation_id);
            builder.latest_mutation_at.insert((site, node), mutation_id);
        }

        Ok(builder)
    }

    /// Human-readable summary for introspection; never a wire format.
    pub fn print_state(&self) -> String {
        format!(
            "TreeSequenceBuilder {{ nodes: {}, edges: {}, sites: {} }}",
            self.num_nodes(),
            self.num_edges(),
            self.num_sites
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ts(num_sites: u32) -> TreeSequenceBuilder {
        TreeSequenceBuilder::new(num_sites, BuilderFlags::NONE).unwrap()
    }

    #[test]
    fn virtual_root_exists_at_construction() {
        let t = ts(10);
        assert_eq!(t.num_nodes(), 1);
        assert_eq!(t.time(NodeId::VIRTUAL_ROOT).unwrap(), Time::INFINITY);
        assert!(!t.is_sample(NodeId::VIRTUAL_ROOT).unwrap());
    }

    #[test]
    fn add_node_does_not_enforce_time_order() {
        let mut t = ts(10);
        let a = t.add_node(Time::from(1.0), true).unwrap();
        let b = t.add_node(Time::from(5.0), true).unwrap();
        assert!(i64::from(b) > i64::from(a));
    }

    #[test]
    fn add_path_rejects_parent_not_older_than_child() {
        let mut t = ts(10);
        let parent = t.add_node(Time::from(1.0), false).unwrap();
        let child = t.add_node(Time::from(5.0), true).unwrap();
        let err = t.add_path(child, &[(0, 10, parent)]).unwrap_err();
        assert!(matches!(err, TsinferError::BadParam { .. }));
    }

    #[test]
    fn add_path_rejects_noncontiguous_edges() {
        let mut t = ts(10);
        let parent = t.add_node(Time::from(5.0), false).unwrap();
        let child = t.add_node(Time::from(1.0), true).unwrap();
        let err = t.add_path(child, &[(0, 4, parent), (5, 10, parent)]).unwrap_err();
        assert!(matches!(err, TsinferError::BadParam { .. }));
    }

    #[test]
    fn single_edge_path_round_trips_through_indices() {
        let mut t = ts(10);
        let parent = t.add_node(Time::from(5.0), false).unwrap();
        let child = t.add_node(Time::from(0.0), true).unwrap();
        t.add_path(child, &[(0, 10, parent)]).unwrap();
        assert_eq!(t.num_edges(), 1);
        let path = t.path(child).unwrap();
        assert_eq!(path.len(), 1);
        let e = t.edge(path[0]);
        assert_eq!((e.left, e.right, e.parent, e.child), (0, 10, parent, child));
    }

    #[test]
    fn row_iterators_cover_every_node_edge_and_mutation() {
        let mut t = ts(5);
        let parent = t.add_node(Time::from(5.0), false).unwrap();
        let child = t.add_node(Time::from(0.0), true).unwrap();
        t.add_path(child, &[(0, 5, parent)]).unwrap();
        t.add_mutations(child, &[SiteId::from(2i64)], &[1]).unwrap();

        assert_eq!(t.nodes().count(), 3); // virtual root + parent + child
        assert_eq!(t.num_samples(), 1);
        let edges: Vec<_> = t.edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].child, child);
        let mutations: Vec<_> = t.mutations().collect();
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].node, child);
        assert_eq!(mutations[0].derived_state, 1);
    }

    #[test]
    fn dump_then_restore_round_trip_is_byte_equal() {
        let mut t = ts(10);
        let a = t.add_node(Time::from(10.0), false).unwrap();
        let b = t.add_node(Time::from(5.0), false).unwrap();
        let c = t.add_node(Time::from(0.0), true).unwrap();
        t.add_path(b, &[(0, 10, a)]).unwrap();
        t.add_path(c, &[(0, 5, b), (5, 10, a)]).unwrap();
        t.add_mutations(c, &[SiteId::from(2i64)], &[1]).unwrap();

        let dump1 = t.dump();
        let restored = TreeSequenceBuilder::restore(10, BuilderFlags::NONE, &dump1).unwrap();
        let dump2 = restored.dump();
        assert_eq!(dump1, dump2);
    }

    #[test]
    fn mutation_parent_resolves_to_nearest_ancestor_mutation() {
        let mut t = ts(5);
        let root = t.add_node(Time::from(10.0), false).unwrap();
        let mid = t.add_node(Time::from(5.0), false).unwrap();
        let leaf = t.add_node(Time::from(0.0), true).unwrap();
        t.add_path(mid, &[(0, 5, root)]).unwrap();
        t.add_path(leaf, &[(0, 5, mid)]).unwrap();

        t.add_mutations(mid, &[SiteId::from(1i64)], &[1]).unwrap();
        let first = t.mutations_at(SiteId::from(1i64)).unwrap()[0];

        t.add_mutations(leaf, &[SiteId::from(1i64)], &[0]).unwrap();
        let dump = t.dump();
        let leaf_row = dump.mutation_node.iter().position(|&n| n == i64::from(leaf)).unwrap();
        assert_eq!(dump.mutation_parent[leaf_row], i64::from(first));
    }
}
