//! Shared-recombination resolution.
//!
//! When two or more children independently copy the same parent over
//! the same breakpoint, each of their paths repeats the exact same
//! recombination event. Left unresolved, every such child gets its own
//! private copy of that event; resolving it means recognizing the
//! repetition and routing all but the first child through one shared
//! internal node, so the tree sequence records the recombination once
//! rather than once per child.
//!
//! Detection is `path_index` itself: a new edge's `(parent, left)`
//! names a breakpoint, and `path_index.find_sibling_at` finds any
//! other child already recorded at that same breakpoint. A match is
//! then extended greedily across the new path's subsequent edges, so a
//! path that agrees with another child's over a whole contiguous run
//! collapses onto one hub spanning the run, not one hub per edge; a
//! path that only agrees on a prefix (the rest recombining onto
//! different parents) collapses only that prefix.

use super::TreeSequenceBuilder;
use crate::error::TsinferResult;
use crate::newtypes::{NodeId, Time};

/// Inserts `child`'s path, collapsing any breakpoint it shares with an
/// existing child's path onto a synthesized (or already-synthesized)
/// hub node.
pub(super) fn resolve_and_insert(
    builder: &mut TreeSequenceBuilder,
    child: NodeId,
    edges: &[(u32, u32, NodeId)],
) -> TsinferResult<()> {
    let mut i = 0;
    while i < edges.len() {
        let (left, right, parent) = edges[i];
        let sibling = builder
            .path_index
            .find_sibling_at(parent, left, child)
            .filter(|&(_, edge_id)| builder.edge(edge_id).right == right);

        let Some((partner, _)) = sibling else {
            builder.insert_edge_raw(left, right, parent, child)?;
            i += 1;
            continue;
        };

        let run_len = matching_run_len(builder, &edges[i..], partner);
        let run = &edges[i..i + run_len];
        let run_left = run.first().unwrap().0;
        let run_right = run.last().unwrap().1;

        let hub = if builder.shared_recomb_hubs.contains(&partner) {
            partner
        } else {
            let hub_time = synthesis_time(builder, partner, child, run)?;
            let hub = builder.add_node(hub_time, false)?;
            builder.shared_recomb_hubs.insert(hub);
            reparent_run_onto_hub(builder, partner, run, hub)?;
            hub
        };
        builder.insert_edge_raw(run_left, run_right, hub, child)?;
        i += run_len;
    }
    Ok(())
}

/// How many of `remaining`'s leading edges line up exactly (same
/// `left`, `right`, and `parent`) with `partner`'s own edges starting
/// from its copy of `remaining[0]`. Always at least 1: the caller only
/// calls this after `path_index` has already confirmed `remaining[0]`
/// matches one of `partner`'s edges.
fn matching_run_len(builder: &TreeSequenceBuilder, remaining: &[(u32, u32, NodeId)], partner: NodeId) -> usize {
    let partner_path = builder.path(partner).expect("partner must be a valid node");
    let (first_left, _, first_parent) = remaining[0];
    let start = partner_path
        .iter()
        .position(|&id| {
            let e = builder.edge(id);
            e.left == first_left && e.parent == first_parent
        })
        .expect("path_index lookup guarantees a matching edge exists");

    let mut len = 0;
    while len < remaining.len() && start + len < partner_path.len() {
        let e = builder.edge(partner_path[start + len]);
        let (left, right, parent) = remaining[len];
        if e.left != left || e.right != right || e.parent != parent {
            break;
        }
        len += 1;
    }
    len
}

/// A synthesized hub's time sits strictly between the youngest of the
/// two children it will carry (the existing path's owner and the new
/// child) and the youngest parent on the shared run, so it can legally
/// parent both children while still copying from every parent on the
/// run.
fn synthesis_time(
    builder: &TreeSequenceBuilder,
    partner: NodeId,
    child: NodeId,
    run: &[(u32, u32, NodeId)],
) -> TsinferResult<Time> {
    let mut youngest_parent = f64::INFINITY;
    for &(_, _, parent) in run {
        let t: f64 = builder.time(parent)?.into();
        if t < youngest_parent {
            youngest_parent = t;
        }
    }
    let partner_time: f64 = builder.time(partner)?.into();
    let child_time: f64 = builder.time(child)?.into();
    let floor = partner_time.max(child_time);
    Ok(Time::from((floor + youngest_parent) / 2.0))
}

/// Removes `partner`'s edges over `run`'s span and reinserts each one
/// with `hub` as parent instead, then gives `partner` a single edge
/// copying from `hub` over the whole run.
fn reparent_run_onto_hub(
    builder: &mut TreeSequenceBuilder,
    partner: NodeId,
    run: &[(u32, u32, NodeId)],
    hub: NodeId,
) -> TsinferResult<()> {
    let partner_path = builder.path(partner).expect("partner must be a valid node").to_vec();
    let run_left = run.first().unwrap().0;
    let start = partner_path
        .iter()
        .position(|&id| builder.edge(id).left == run_left)
        .expect("matching_run_len guarantees partner has a corresponding edge");

    for (offset, &(left, right, parent)) in run.iter().enumerate() {
        builder.remove_edge_raw(partner_path[start + offset]);
        builder.insert_edge_raw(left, right, parent, hub)?;
    }
    let run_right = run.last().unwrap().1;
    builder.insert_edge_raw(run_left, run_right, hub, partner)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::flags::BuilderFlags;
    use crate::newtypes::Time;

    fn ts(num_sites: u32) -> TreeSequenceBuilder {
        TreeSequenceBuilder::new(num_sites, BuilderFlags::RESOLVE_SHARED_RECOMBS).unwrap()
    }

    #[test]
    fn two_children_with_identical_recombination_share_one_hub() {
        let mut t = ts(10);
        let p0 = t.add_node(Time::from(10.0), false).unwrap();
        let p1 = t.add_node(Time::from(10.0), false).unwrap();
        let a = t.add_node(Time::from(1.0), true).unwrap();
        let b = t.add_node(Time::from(1.0), true).unwrap();

        t.add_path(a, &[(0, 5, p0), (5, 10, p1)]).unwrap();
        let nodes_after_first = t.num_nodes();

        t.add_path(b, &[(0, 5, p0), (5, 10, p1)]).unwrap();
        assert_eq!(t.num_nodes(), nodes_after_first + 1, "exactly one hub synthesized");

        let a_path = t.path(a).unwrap();
        let b_path = t.path(b).unwrap();
        assert_eq!(a_path.len(), 1);
        assert_eq!(b_path.len(), 1);
        assert_eq!(t.edge(a_path[0]).parent, t.edge(b_path[0]).parent);
    }

    #[test]
    fn distinct_paths_are_not_collapsed() {
        let mut t = ts(10);
        let p0 = t.add_node(Time::from(10.0), false).unwrap();
        let p1 = t.add_node(Time::from(10.0), false).unwrap();
        let a = t.add_node(Time::from(1.0), true).unwrap();
        let b = t.add_node(Time::from(1.0), true).unwrap();

        t.add_path(a, &[(0, 5, p0), (5, 10, p1)]).unwrap();
        t.add_path(b, &[(0, 3, p0), (3, 10, p1)]).unwrap();

        assert_eq!(t.path(a).unwrap().len(), 2);
        assert_eq!(t.path(b).unwrap().len(), 2);
    }

    #[test]
    fn a_third_identical_path_joins_the_existing_hub() {
        let mut t = ts(10);
        let p0 = t.add_node(Time::from(10.0), false).unwrap();
        let p1 = t.add_node(Time::from(10.0), false).unwrap();
        let a = t.add_node(Time::from(1.0), true).unwrap();
        let b = t.add_node(Time::from(1.0), true).unwrap();
        let c = t.add_node(Time::from(1.0), true).unwrap();

        t.add_path(a, &[(0, 5, p0), (5, 10, p1)]).unwrap();
        t.add_path(b, &[(0, 5, p0), (5, 10, p1)]).unwrap();
        let nodes_after_second = t.num_nodes();

        t.add_path(c, &[(0, 5, p0), (5, 10, p1)]).unwrap();
        assert_eq!(t.num_nodes(), nodes_after_second, "no second hub synthesized");

        let b_hub = t.edge(t.path(b).unwrap()[0]).parent;
        let c_hub = t.edge(t.path(c).unwrap()[0]).parent;
        assert_eq!(b_hub, c_hub);
    }

    #[test]
    fn sharing_only_the_first_of_two_breakpoints_collapses_just_that_edge() {
        let mut t = ts(10);
        let shared_parent = t.add_node(Time::from(10.0), false).unwrap();
        let b1 = t.add_node(Time::from(8.0), false).unwrap();
        let b2 = t.add_node(Time::from(8.0), false).unwrap();
        let a = t.add_node(Time::from(1.0), true).unwrap();
        let b = t.add_node(Time::from(1.0), true).unwrap();

        t.add_path(a, &[(0, 5, shared_parent), (5, 10, b1)]).unwrap();
        t.add_path(b, &[(0, 5, shared_parent), (5, 10, b2)]).unwrap();

        let a_path = t.path(a).unwrap().to_vec();
        let b_path = t.path(b).unwrap().to_vec();
        assert_eq!(a_path.len(), 2, "the second, non-shared edge must survive unmerged");
        assert_eq!(b_path.len(), 2);

        let a_first = t.edge(a_path[0]);
        let b_first = t.edge(b_path[0]);
        assert_eq!(a_first.parent, b_first.parent, "the shared breakpoint collapses onto one hub");
        assert_ne!(a_first.parent, shared_parent, "the hub is a newly synthesized node");

        let a_second = t.edge(a_path[1]);
        let b_second = t.edge(b_path[1]);
        assert_eq!(a_second.parent, b1, "the diverging edge keeps its own original parent");
        assert_eq!(b_second.parent, b2);
    }

    #[test]
    fn hub_time_stays_strictly_between_a_young_owner_and_the_youngest_parent() {
        let mut t = ts(10);
        let p0 = t.add_node(Time::from(10.0), false).unwrap();
        let p1 = t.add_node(Time::from(9.0), false).unwrap();
        // The owner sits close in time to the youngest parent, so a
        // naive `youngest_parent / 2.0` hub time would fall below it.
        let a = t.add_node(Time::from(8.5), true).unwrap();
        let b = t.add_node(Time::from(8.5), true).unwrap();

        t.add_path(a, &[(0, 5, p0), (5, 10, p1)]).unwrap();
        t.add_path(b, &[(0, 5, p0), (5, 10, p1)]).unwrap();

        let hub = t.edge(t.path(a).unwrap()[0]).parent;
        let hub_time: f64 = t.time(hub).unwrap().into();
        assert!(hub_time > 8.5, "hub must be older than both children");
        assert!(hub_time < 9.0, "hub must be younger than the youngest parent");
    }
}
