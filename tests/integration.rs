//! End-to-end scenarios and the universal algebraic properties a NodeSet
//! implementation must satisfy, regardless of which templates or ranges
//! are involved.

use nodeset::{NodeSet, NodeSetConfig, NodeSetError, StaticResolver};
use std::sync::Arc;

fn ns(s: &str) -> NodeSet {
    NodeSet::new(s).unwrap()
}

// ---------------------------------------------------------------------
// Seed scenarios (literal)
// ---------------------------------------------------------------------

#[test]
fn seed_union_then_difference() {
    let mut n = ns("cluster[1-30]");
    n.update("cluster32").unwrap();
    n.difference_update("cluster[2-5]", false).unwrap();
    assert_eq!(n.to_string(), "cluster[1,6-30,32]");
}

#[test]
fn seed_difference() {
    assert_eq!(ns("node[0-10]!node[8-10]").to_string(), "node[0-7]");
}

#[test]
fn seed_intersection() {
    assert_eq!(ns("node[0-10]&node[5-13]").to_string(), "node[5-10]");
}

#[test]
fn seed_symmetric_difference() {
    assert_eq!(ns("node[0-10]^node[5-13]").to_string(), "node[0-4,11-13]");
}

#[test]
fn seed_expand_preserves_padding() {
    let n = ns("forbin[03-05]-ilo");
    let nodes: Vec<String> = n.iter().collect();
    assert_eq!(nodes, vec!["forbin03-ilo", "forbin04-ilo", "forbin05-ilo"]);
}

#[test]
fn seed_split() {
    let n = ns("foo[1-5]");
    let parts = n.split(3).unwrap();
    let rendered: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
    assert_eq!(rendered, vec!["foo[1-2]", "foo[3-4]", "foo5"]);
}

#[test]
fn seed_autostep_expand() {
    let config = NodeSetConfig::new(3);
    let mut n = NodeSet::with_config(config);
    n.update("cluster[0-10/2]").unwrap();
    let nodes: Vec<String> = n.iter().collect();
    assert_eq!(nodes, vec!["cluster0", "cluster2", "cluster4", "cluster6", "cluster8", "cluster10"]);
}

// ---------------------------------------------------------------------
// Boundary tests
// ---------------------------------------------------------------------

#[test]
fn boundary_empty_set() {
    let n = NodeSet::empty();
    assert!(n.is_empty());
    assert_eq!(n.len(), 0);
    assert_eq!(n.to_string(), "");
}

#[test]
fn boundary_single_unnumbered_node() {
    let n = ns("login");
    assert_eq!(n.len(), 1);
    assert_eq!(n.to_string(), "login");
}

#[test]
fn boundary_mixed_numbered_and_unnumbered_same_prefix() {
    let n = ns("login,login2");
    assert_eq!(n.len(), 2);
    let nodes: Vec<String> = n.iter().collect();
    assert_eq!(nodes, vec!["login", "login2"]);
}

#[test]
fn boundary_percent_in_user_input() {
    let n = ns("100%-node1");
    assert_eq!(n.to_string(), "100%-node1");
}

#[test]
fn boundary_missing_closing_bracket() {
    let err = NodeSet::new("node[1-10").unwrap_err();
    assert!(err.is_parse_error());
}

#[test]
fn boundary_negative_step_slice_with_bounds_fails() {
    let n = ns("node[0-10]");
    assert!(n.slice(Some(0), None, Some(-1)).is_err());
    assert!(n.slice(None, Some(5), Some(-1)).is_err());
}

#[test]
fn boundary_strict_remove_of_absent_element_fails() {
    let mut n = ns("node[1-5]");
    let err = n.remove("node10").unwrap_err();
    assert_eq!(err, NodeSetError::MissingMember(10));
}

// ---------------------------------------------------------------------
// Universal properties
// ---------------------------------------------------------------------

fn sample_sets() -> Vec<NodeSet> {
    vec![
        ns("node[1-10]"),
        ns("node[5-20]"),
        ns("node[15-25]"),
        ns("rack1-node[1-4]"),
        ns("login,node[1-3]"),
    ]
}

#[test]
fn property_round_trip_fold_parse() {
    for a in sample_sets() {
        let folded = a.to_string();
        let reparsed = NodeSet::new(folded.as_str()).unwrap();
        assert_eq!(a, reparsed, "fold/parse round-trip failed for {folded}");
    }
}

#[test]
fn property_idempotent_union_and_intersection() {
    for a in sample_sets() {
        assert_eq!(a.union(&a).unwrap(), a);
        assert_eq!(a.intersection(&a).unwrap(), a);
    }
}

#[test]
fn property_commutative_and_associative() {
    let a = ns("node[1-10]");
    let b = ns("node[5-20]");
    let c = ns("node[15-30]");

    assert_eq!(a.union(&b).unwrap(), b.union(&a).unwrap());
    assert_eq!(a.intersection(&b).unwrap(), b.intersection(&a).unwrap());
    assert_eq!(a.symmetric_difference(&b).unwrap(), b.symmetric_difference(&a).unwrap());

    assert_eq!(
        a.union(&b).unwrap().union(&c).unwrap(),
        a.union(&b.union(&c).unwrap()).unwrap()
    );
    assert_eq!(
        a.intersection(&b).unwrap().intersection(&c).unwrap(),
        a.intersection(&b.intersection(&c).unwrap()).unwrap()
    );
}

#[test]
fn property_distributivity() {
    let a = ns("node[1-15]");
    let b = ns("node[5-20]");
    let c = ns("node[10-30]");

    let lhs = a.intersection(&b.union(&c).unwrap()).unwrap();
    let rhs = a.intersection(&b).unwrap().union(&a.intersection(&c).unwrap()).unwrap();
    assert_eq!(lhs, rhs);
}

#[test]
fn property_cardinality() {
    let a = ns("node[1-10]");
    let b = ns("node[5-20]");

    assert_eq!(a.len(), a.iter().count());

    let union_len = a.union(&b).unwrap().len();
    let inter_len = a.intersection(&b).unwrap().len();
    assert_eq!(union_len + inter_len, a.len() + b.len());
}

#[test]
fn property_padding_preservation() {
    let a = ns("node[001-010]");
    assert_eq!(a.to_string(), "node[001-010]");
    let reparsed = NodeSet::new(a.to_string().as_str()).unwrap();
    assert_eq!(reparsed.to_string(), "node[001-010]");
}

#[test]
fn property_ordering_is_strictly_increasing() {
    let a = ns("rack1-node[1-5]");
    let nodes: Vec<String> = a.iter().collect();
    let mut sorted = nodes.clone();
    sorted.sort();
    assert_eq!(nodes, sorted);
    let mut deduped = nodes.clone();
    deduped.dedup();
    assert_eq!(nodes, deduped, "iteration must never repeat a node");
}

#[test]
fn property_slice_law() {
    let a = ns("node[0-30]");
    let i = 3;
    let j = 20;
    let sub = a.slice(Some(i), Some(j), None).unwrap();
    for k in 0..(j - i) {
        assert_eq!(a.get(i + k).unwrap(), sub.get(k).unwrap());
    }
}

#[test]
fn property_regroup_soundness() {
    let resolver: Arc<dyn nodeset::GroupResolver> = Arc::new(
        StaticResolver::new()
            .with_group("compute", vec!["node1".into(), "node2".into(), "node3".into()])
            .with_group("gpu", vec!["node10".into(), "node11".into()]),
    );

    let mut a = NodeSet::empty().with_resolver(resolver.clone());
    a.update("node[1-3],node[10-11],node99").unwrap();

    let regrouped = a.regroup(None, false, false).unwrap();

    let mut b = NodeSet::empty().with_resolver(resolver);
    b.update(regrouped.as_str()).unwrap();

    assert_eq!(a, b);
}

// ---------------------------------------------------------------------
// Group reference parsing, split/get consistency, from_list
// ---------------------------------------------------------------------

#[test]
fn group_reference_resolves_through_static_resolver() {
    let resolver: Arc<dyn nodeset::GroupResolver> =
        Arc::new(StaticResolver::new().with_group("gpu", vec!["node1".into(), "node2".into()]));
    let mut n = NodeSet::empty().with_resolver(resolver);
    n.update("@gpu,node5").unwrap();
    assert_eq!(n.to_string(), "node[1-2,5]");
}

#[test]
fn from_list_merges_shared_templates_once() {
    let items = vec!["node[1-5]", "node[8-10]", "login"];
    let n = NodeSet::from_list(&items, NodeSetConfig::default()).unwrap();
    assert_eq!(n.to_string(), "login,node[1-5,8-10]");
}

#[test]
fn split_sizes_differ_by_at_most_one() {
    let n = ns("node[1-11]");
    let parts = n.split(4).unwrap();
    let sizes: Vec<usize> = parts.iter().map(NodeSet::len).collect();
    assert_eq!(sizes.iter().sum::<usize>(), n.len());
    assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
}

#[test]
fn to_base_and_from_base_round_trip() {
    let n = ns("node[1-10],login");
    let base = n.to_base();
    let restored = NodeSet::from_base(base, NodeSetConfig::default());
    assert_eq!(n, restored);
}
