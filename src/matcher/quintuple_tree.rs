use crate::newtypes::NodeId;

/// A tree maintained incrementally as edges are inserted and removed
/// while scanning sites left to right: five parallel arrays (parent,
/// left/right child, left/right sibling) indexed by node id, updated
/// in place rather than rebuilt from scratch at each site.
pub(super) struct QuintupleTree {
    parent: Vec<NodeId>,
    left_child: Vec<NodeId>,
    right_child: Vec<NodeId>,
    left_sib: Vec<NodeId>,
    right_sib: Vec<NodeId>,
}

fn idx(node: NodeId) -> usize {
    usize::try_from(node).expect("node id must be within range")
}

impl QuintupleTree {
    pub(super) fn new(num_nodes: usize) -> Self {
        Self {
            parent: vec![NodeId::NULL; num_nodes],
            left_child: vec![NodeId::NULL; num_nodes],
            right_child: vec![NodeId::NULL; num_nodes],
            left_sib: vec![NodeId::NULL; num_nodes],
            right_sib: vec![NodeId::NULL; num_nodes],
        }
    }

    pub(super) fn parent_of(&self, node: NodeId) -> NodeId {
        self.parent.get(idx(node)).copied().unwrap_or(NodeId::NULL)
    }

    /// Every node currently attached to the tree by an edge, i.e. every
    /// valid copying source at this site, in ascending id order. The
    /// virtual root is never included since it carries no haplotype.
    pub(super) fn nodes_with_parent(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.parent
            .iter()
            .enumerate()
            .filter(|(_, &p)| !p.is_null())
            .map(|(i, _)| NodeId::from(i))
    }

    /// Number of distinct lineages attached directly below the virtual
    /// root at the current site: the denominator of the forward pass's
    /// recombination term. Walked via the root's sibling chain rather
    /// than scanning every node.
    pub(super) fn num_extant_lineages(&self) -> usize {
        let mut count = 0;
        let mut child = self.left_child[idx(NodeId::VIRTUAL_ROOT)];
        while !child.is_null() {
            count += 1;
            child = self.right_sib[idx(child)];
        }
        count
    }

    /// A snapshot of the parent array at the current site, kept by the
    /// traceback so the backward pass can climb from an arbitrary node
    /// to its nearest explicit ancestor under that site's topology.
    pub(super) fn parent_snapshot(&self) -> Vec<NodeId> {
        self.parent.clone()
    }

    pub(super) fn insert_edge(&mut self, parent: NodeId, child: NodeId) {
        let p = idx(parent);
        let c = idx(child);
        self.parent[c] = parent;
        let old_head = self.left_child[p];
        self.right_sib[c] = old_head;
        self.left_sib[c] = NodeId::NULL;
        if old_head.is_null() {
            self.right_child[p] = child;
        } else {
            self.left_sib[idx(old_head)] = child;
        }
        self.left_child[p] = child;
    }

    pub(super) fn remove_edge(&mut self, parent: NodeId, child: NodeId) {
        let p = idx(parent);
        let c = idx(child);
        let left_sib = self.left_sib[c];
        let right_sib = self.right_sib[c];
        if left_sib.is_null() {
            self.left_child[p] = right_sib;
        } else {
            self.right_sib[idx(left_sib)] = right_sib;
        }
        if right_sib.is_null() {
            self.right_child[p] = left_sib;
        } else {
            self.left_sib[idx(right_sib)] = left_sib;
        }
        self.parent[c] = NodeId::NULL;
        self.left_sib[c] = NodeId::NULL;
        self.right_sib[c] = NodeId::NULL;
    }
}
