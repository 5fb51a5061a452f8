//! End-to-end exercise of ancestor synthesis, tree-sequence recording,
//! and haplotype matching together.

use tsinfer_core::{AncestorBuilder, AncestorMatcher, BuilderFlags, NodeId, SiteId, Time, TreeSequenceBuilder};

fn site(n: i64) -> SiteId {
    SiteId::from(n)
}

#[test]
fn an_ancestor_built_from_genotypes_is_recoverable_by_matching() {
    let mut builder = AncestorBuilder::new(4);
    // Two carriers (samples 0, 1) share a derived allele at sites 1..3;
    // site 0 is invariant so the leftward extension should stop there.
    builder.add_site(site(0), 0, &[0, 0, 0, 0]).unwrap();
    builder.add_site(site(1), 2, &[1, 1, 0, 0]).unwrap();
    builder.add_site(site(2), 2, &[1, 1, 0, 0]).unwrap();

    let groups: Vec<_> = builder.ancestor_groups().collect();
    assert_eq!(groups.len(), 1);
    let ancestor = builder.make_ancestor(&groups[0]).unwrap();
    assert_eq!((ancestor.start, ancestor.end), (site(0), site(3)));
    assert_eq!(ancestor.haplotype, vec![0, 1, 1]);

    let mut ts = TreeSequenceBuilder::new(3, BuilderFlags::NONE).unwrap();
    let ancestor_node = ts.add_node(Time::from(10.0), false).unwrap();
    let start = i64::from(ancestor.start) as u32;
    let end = i64::from(ancestor.end) as u32;
    ts.add_path(ancestor_node, &[(start, end, NodeId::VIRTUAL_ROOT)]).unwrap();
    let derived_sites: Vec<SiteId> = (start..end)
        .filter(|&s| ancestor.haplotype[(s - start) as usize] == 1)
        .map(|s| SiteId::from(s as i64))
        .collect();
    let derived_state = vec![1i8; derived_sites.len()];
    ts.add_mutations(ancestor_node, &derived_sites, &derived_state).unwrap();

    let matcher = AncestorMatcher::new(1e-8, 1e-8).unwrap();
    let query = vec![0, 1, 1];
    let result = matcher.find_path(&ts, &query).unwrap();
    assert!(result.sites.is_empty());
    assert!(result.edges.iter().all(|&(_, _, parent)| parent == ancestor_node));

    let new_node = ts.add_node(Time::from(0.0), true).unwrap();
    ts.add_path(new_node, &result.edges).unwrap();
    let dump = ts.dump();
    let restored = TreeSequenceBuilder::restore(3, BuilderFlags::NONE, &dump).unwrap();
    assert_eq!(restored.dump(), dump);
}

#[test]
fn samples_sharing_a_recombination_breakpoint_collapse_onto_one_hub() {
    let mut ts = TreeSequenceBuilder::new(10, BuilderFlags::RESOLVE_SHARED_RECOMBS).unwrap();
    let left_ancestor = ts.add_node(Time::from(20.0), false).unwrap();
    let right_ancestor = ts.add_node(Time::from(15.0), false).unwrap();
    ts.add_path(left_ancestor, &[(0, 10, NodeId::VIRTUAL_ROOT)]).unwrap();
    ts.add_path(right_ancestor, &[(0, 10, NodeId::VIRTUAL_ROOT)]).unwrap();

    let path = vec![(0, 5, left_ancestor), (5, 10, right_ancestor)];
    let first_child = ts.add_node(Time::from(5.0), true).unwrap();
    let second_child = ts.add_node(Time::from(4.0), true).unwrap();
    ts.add_path(first_child, &path).unwrap();
    let nodes_after_first = ts.num_nodes();

    ts.add_path(second_child, &path).unwrap();
    // The second identical path synthesizes exactly one hub node.
    assert_eq!(ts.num_nodes(), nodes_after_first + 1);

    let dump = ts.dump();
    let restored = TreeSequenceBuilder::restore(10, BuilderFlags::RESOLVE_SHARED_RECOMBS, &dump).unwrap();
    assert_eq!(restored.dump(), dump);
}
