//! Ancestor Matcher: Li-Stephens haplotype copying against a growing
//! tree sequence.
//!
//! `find_path` runs a Viterbi-style forward pass over sites left to
//! right, maintaining the local tree incrementally via edge diffs and
//! a sparse, nearest-ancestor-compressed likelihood map, recording for
//! every explicit node whether reaching its likelihood required a
//! recombination. The backward pass then follows the current copying
//! node's own recorded bit, site by site, to recover the
//! maximum-likelihood path as a minimal set of edges.

mod likelihood;
mod quintuple_tree;
mod traceback;

use crate::error::{TsinferError, TsinferResult};
use crate::newtypes::{NodeId, SiteId};
use crate::treeseq::TreeSequenceBuilder;
use likelihood::Likelihoods;
use quintuple_tree::QuintupleTree;
use std::collections::BTreeMap;
use traceback::Traceback;

/// Sentinel for a site whose observed state is unknown (missing data);
/// contributes no emission evidence either way.
pub const UNKNOWN_ALLELE: i8 = -1;

/// The outcome of matching one haplotype against a tree sequence: the
/// path it copies (as `add_path`-ready edges) and the sites where it
/// disagrees with what it copies (as `add_mutations`-ready pairs).
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub edges: Vec<(u32, u32, NodeId)>,
    pub sites: Vec<SiteId>,
    pub derived_state: Vec<i8>,
}

pub struct AncestorMatcher {
    recombination_rate: f64,
    mismatch_rate: f64,
}

impl AncestorMatcher {
    pub fn new(recombination_rate: f64, mismatch_rate: f64) -> TsinferResult<Self> {
        if !(0.0..1.0).contains(&recombination_rate) {
            return Err(TsinferError::bad_param("recombination_rate must be in [0, 1)"));
        }
        if !(0.0..1.0).contains(&mismatch_rate) {
            return Err(TsinferError::bad_param("mismatch_rate must be in [0, 1)"));
        }
        Ok(Self {
            recombination_rate,
            mismatch_rate,
        })
    }

    /// Finds the maximum-likelihood copying path for `haplotype`
    /// against the tree sequence currently recorded in `builder`.
    /// `builder` itself is not modified; the caller is responsible for
    /// feeding the result into `add_path`/`add_mutations`.
    pub fn find_path(&self, builder: &TreeSequenceBuilder, haplotype: &[i8]) -> TsinferResult<MatchResult> {
        let num_sites = builder.num_sites();
        if haplotype.len() != num_sites as usize {
            return Err(TsinferError::bad_param("haplotype length does not match num_sites"));
        }

        let mut tree = QuintupleTree::new(builder.num_nodes());
        let mut likelihoods = Likelihoods::new();
        likelihoods.seed(NodeId::VIRTUAL_ROOT, 1.0);
        let mut traceback = Traceback::new(num_sites as usize);

        for site in 0..num_sites {
            for id in builder.right_index().at(site) {
                let e = builder.edge(id);
                tree.remove_edge(e.parent, e.child);
            }
            for id in builder.left_index().at(site) {
                let e = builder.edge(id);
                tree.insert_edge(e.parent, e.child);
                // A newly exposed child under an explicit parent starts
                // out tied to that parent's value; `compress` will drop
                // it again once the next site's update actually differs.
                if let Some(value) = likelihoods.explicit_value(e.parent) {
                    likelihoods.set(e.child, value);
                }
            }

            let site_id = SiteId::from(site as i64);
            for node in self.mutated_nodes_at(builder, site_id)? {
                let base = likelihoods.get(&tree, node);
                likelihoods.set(node, base);
            }

            let n_e = tree.num_extant_lineages().max(1) as f64;
            let recomb = self.recombination_rate / n_e;
            let query_allele = haplotype[site as usize];
            let mut recombination_required = BTreeMap::new();
            let updates: Vec<(NodeId, f64)> = likelihoods
                .explicit_nodes()
                .into_iter()
                .map(|node| {
                    let current = likelihoods.get(&tree, node);
                    let no_recomb = current * (1.0 - self.recombination_rate);
                    recombination_required.insert(node, recomb > no_recomb);
                    let transitioned = no_recomb.max(recomb);
                    let emission = if query_allele == UNKNOWN_ALLELE {
                        1.0
                    } else {
                        let allele = builder.allele_at(site_id, node).unwrap_or(0);
                        if allele == query_allele {
                            1.0 - self.mismatch_rate
                        } else {
                            self.mismatch_rate
                        }
                    };
                    (node, transitioned * emission)
                })
                .collect();
            for (node, value) in updates {
                likelihoods.set(node, value);
            }

            let max_value = likelihoods.max();
            if max_value.is_finite() && max_value > 0.0 {
                likelihoods.normalize(max_value);
            }
            let max_likelihood_node = likelihoods.best_node(&tree, tree.nodes_with_parent());
            likelihoods.compress(&tree);
            traceback.record_site(recombination_required, max_likelihood_node, tree.parent_snapshot());
        }

        let edges = traceback.backward_walk(num_sites);
        let (sites, derived_state) = self.find_mismatches(builder, &edges, haplotype)?;
        Ok(MatchResult {
            edges,
            sites,
            derived_state,
        })
    }

    /// Human-readable summary for introspection; never a wire format.
    pub fn print_state(&self) -> String {
        format!(
            "AncestorMatcher {{ recombination_rate: {}, mismatch_rate: {} }}",
            self.recombination_rate, self.mismatch_rate
        )
    }

    /// Nodes carrying a mutation at `site`, looked up via the builder's
    /// per-site mutation table. Needed so a mutated node's likelihood
    /// can be split off from its ancestor's before emission is applied.
    fn mutated_nodes_at(&self, builder: &TreeSequenceBuilder, site: SiteId) -> TsinferResult<Vec<NodeId>> {
        Ok(builder
            .mutations_at(site)?
            .into_iter()
            .map(|id| builder.mutation_node(id))
            .collect())
    }

    /// The sites along `edges` where the haplotype disagrees with what
    /// it copies, in ascending site order.
    fn find_mismatches(
        &self,
        builder: &TreeSequenceBuilder,
        edges: &[(u32, u32, NodeId)],
        haplotype: &[i8],
    ) -> TsinferResult<(Vec<SiteId>, Vec<i8>)> {
        let mut sites = Vec::new();
        let mut derived_state = Vec::new();
        for &(left, right, parent) in edges {
            for site in left..right {
                let observed = haplotype[site as usize];
                if observed == UNKNOWN_ALLELE {
                    continue;
                }
                let site_id = SiteId::from(site as i64);
                let copied = builder.allele_at(site_id, parent)?;
                if copied != observed {
                    sites.push(site_id);
                    derived_state.push(observed);
                }
            }
        }
        Ok((sites, derived_state))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::flags::BuilderFlags;
    use crate::newtypes::Time;

    fn ts(num_sites: u32) -> TreeSequenceBuilder {
        TreeSequenceBuilder::new(num_sites, BuilderFlags::NONE).unwrap()
    }

    #[test]
    fn perfect_match_copies_from_the_only_ancestor_with_no_mismatches() {
        let mut t = ts(4);
        let ancestor = t.add_node(Time::from(10.0), false).unwrap();
        t.add_path(ancestor, &[(0, 4, NodeId::VIRTUAL_ROOT)]).unwrap();
        t.add_mutations(ancestor, &[SiteId::from(1i64), SiteId::from(3i64)], &[1, 1])
            .unwrap();

        let matcher = AncestorMatcher::new(1e-8, 1e-8).unwrap();
        let haplotype = vec![0, 1, 0, 1];
        let result = matcher.find_path(&t, &haplotype).unwrap();

        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].2, ancestor);
        assert!(result.sites.is_empty());
    }

    #[test]
    fn a_single_disagreement_is_reported_as_a_mutation() {
        let mut t = ts(3);
        let ancestor = t.add_node(Time::from(10.0), false).unwrap();
        t.add_path(ancestor, &[(0, 3, NodeId::VIRTUAL_ROOT)]).unwrap();

        let matcher = AncestorMatcher::new(1e-8, 1e-2).unwrap();
        let haplotype = vec![0, 1, 0];
        let result = matcher.find_path(&t, &haplotype).unwrap();

        assert_eq!(result.sites, vec![SiteId::from(1i64)]);
        assert_eq!(result.derived_state, vec![1]);
    }

    #[test]
    fn find_path_rejects_wrong_length_haplotype() {
        let t = ts(4);
        let matcher = AncestorMatcher::new(1e-8, 1e-8).unwrap();
        let err = matcher.find_path(&t, &[0, 1]).unwrap_err();
        assert!(matches!(err, TsinferError::BadParam { .. }));
    }

    #[test]
    fn missing_data_contributes_no_mismatch() {
        let mut t = ts(3);
        let ancestor = t.add_node(Time::from(10.0), false).unwrap();
        t.add_path(ancestor, &[(0, 3, NodeId::VIRTUAL_ROOT)]).unwrap();

        let matcher = AncestorMatcher::new(1e-8, 1e-2).unwrap();
        let haplotype = vec![0, UNKNOWN_ALLELE, 0];
        let result = matcher.find_path(&t, &haplotype).unwrap();
        assert!(result.sites.is_empty());
    }

    #[test]
    fn a_haplotype_spanning_two_disjoint_ancestors_switches_copying_node_at_the_boundary() {
        let mut t = ts(10);
        let a = t.add_node(Time::from(10.0), false).unwrap();
        let b = t.add_node(Time::from(10.0), false).unwrap();
        t.add_path(a, &[(0, 5, NodeId::VIRTUAL_ROOT)]).unwrap();
        t.add_path(b, &[(5, 10, NodeId::VIRTUAL_ROOT)]).unwrap();
        t.add_mutations(a, &[SiteId::from(0i64), SiteId::from(2i64), SiteId::from(4i64)], &[1, 1, 1])
            .unwrap();
        t.add_mutations(b, &[SiteId::from(5i64), SiteId::from(7i64), SiteId::from(9i64)], &[1, 1, 1])
            .unwrap();

        let matcher = AncestorMatcher::new(1e-8, 1e-8).unwrap();
        let haplotype = vec![1, 0, 1, 0, 1, 1, 0, 1, 0, 1];
        let result = matcher.find_path(&t, &haplotype).unwrap();

        assert_eq!(result.edges, vec![(0, 5, a), (5, 10, b)]);
        assert!(result.sites.is_empty());
    }
}
