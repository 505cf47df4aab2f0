//! Property suites for the merge tree invariants.
//!
//! Random merge scripts drive the tree through arbitrary bottom-up
//! constructions and verify:
//!
//! - **Weight monotonicity** — `weight(parent) >= weight(child)` on every
//!   edge, regardless of the order the driver hands weights over.
//! - **Leaf-count additivity** — every internal node's count equals the sum
//!   of its children's counts, and root counts sum to the leaf total.
//! - **Cut agreement** — cutting at infinity reproduces the forest's
//!   highest-ancestor assignment, and cutting below every merge weight is
//!   the identity.
//! - **Split accounting** — removing an LCA decrements each surviving
//!   ancestor by exactly the removed subtree's leaf count, and disconnected
//!   pairs leave the forest untouched.

use proptest::prelude::*;

use crate::Ultrametric;

/// A random bottom-up construction: leaves `0..leaf_count` plus a sequence
/// of merge picks. Picks index into the shrinking set of live roots, so any
/// raw `usize` pair is a valid step.
#[derive(Clone, Debug)]
struct MergeScript {
    leaf_count: usize,
    steps: Vec<(usize, usize, f64)>,
}

fn merge_script() -> impl Strategy<Value = MergeScript> {
    (2usize..=16).prop_flat_map(|leaf_count| {
        proptest::collection::vec((any::<usize>(), any::<usize>(), 0.0f64..1.0), 0..=leaf_count)
            .prop_map(move |steps| MergeScript { leaf_count, steps })
    })
}

/// Replays a script, merging live roots only. Returns the tree and its
/// remaining roots.
fn build(script: &MergeScript) -> (Ultrametric, Vec<usize>) {
    let mut tree = Ultrametric::new(0..script.leaf_count);
    let mut roots: Vec<usize> = (0..script.leaf_count).collect();
    for &(pick_a, pick_b, weight) in &script.steps {
        if roots.len() < 2 {
            break;
        }
        let i = pick_a % roots.len();
        let mut j = pick_b % (roots.len() - 1);
        if j >= i {
            j += 1;
        }
        let merged = tree
            .merge(roots[i], roots[j], weight)
            .expect("live roots always merge");
        let (hi, lo) = if i > j { (i, j) } else { (j, i) };
        roots.swap_remove(hi);
        roots.swap_remove(lo);
        roots.push(merged);
    }
    (tree, roots)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn weights_never_decrease_towards_the_root(script in merge_script()) {
        let (tree, _) = build(&script);
        for node in tree.nodes().collect::<Vec<_>>() {
            if let Some(parent) = tree.parent(node) {
                let node_weight = tree.weight(node).expect("node is live");
                let parent_weight = tree.weight(parent).expect("parent is live");
                prop_assert!(
                    parent_weight >= node_weight,
                    "edge {parent} -> {node} decreases weight: {parent_weight} < {node_weight}",
                );
            }
        }
    }

    #[test]
    fn leaf_counts_are_additive(script in merge_script()) {
        let (tree, roots) = build(&script);

        let total: usize = roots
            .iter()
            .map(|&root| tree.leaf_count(root).expect("root is live"))
            .sum();
        prop_assert_eq!(total, script.leaf_count);

        for node in tree.nodes().collect::<Vec<_>>() {
            let children = tree.children(node);
            if children.is_empty() {
                continue;
            }
            let sum: usize = children
                .iter()
                .map(|&child| tree.leaf_count(child).expect("child is live"))
                .sum();
            prop_assert_eq!(tree.leaf_count(node), Some(sum));
        }
    }

    #[test]
    fn cut_at_infinity_matches_highest_ancestors(script in merge_script()) {
        let (tree, _) = build(&script);
        let cut = tree.cut(f64::INFINITY).expect("forest is non-empty");
        for leaf in 0..script.leaf_count {
            prop_assert_eq!(cut.root_of(leaf), Some(tree.highest_ancestor(leaf)));
        }
    }

    #[test]
    fn cut_below_all_merges_is_the_identity(script in merge_script()) {
        let (tree, _) = build(&script);
        // Merge weights are non-negative, so -1.0 keeps only the leaves.
        let cut = tree.cut(-1.0).expect("leaves survive any finite threshold");
        prop_assert_eq!(cut.cluster_count(), script.leaf_count);
        for leaf in 0..script.leaf_count {
            prop_assert_eq!(cut.root_of(leaf), Some(leaf));
        }
    }

    #[test]
    fn split_decrements_surviving_ancestors(
        script in merge_script(),
        pick_u in any::<usize>(),
        pick_v in any::<usize>(),
    ) {
        let (mut tree, _) = build(&script);
        let u = pick_u % script.leaf_count;
        let v = pick_v % script.leaf_count;
        let nodes_before = tree.node_count();

        match tree.lowest_common_ancestor(u, v) {
            Some(lca) => {
                let removed_count = tree.leaf_count(lca).expect("lca is live");
                let chain = tree.ancestors(lca);
                let counts: Vec<usize> = chain
                    .iter()
                    .map(|&a| tree.leaf_count(a).expect("ancestor is live"))
                    .collect();

                prop_assert_eq!(tree.split(u, v), Some(lca));
                prop_assert!(!tree.contains(lca));
                prop_assert_eq!(tree.node_count(), nodes_before - 1);
                for (&ancestor, before) in chain.iter().zip(counts) {
                    prop_assert_eq!(
                        tree.leaf_count(ancestor),
                        Some(before - removed_count),
                    );
                }
            }
            None => {
                prop_assert_eq!(tree.split(u, v), None);
                prop_assert_eq!(tree.node_count(), nodes_before);
            }
        }
    }
}
