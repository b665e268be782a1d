//! Property-based tests for the permission tree model.
//!
//! Trees are generated from a random parent assignment: node `i` is either
//! a new root or a child of some node `j < i`, so every generated shape is a
//! valid forest.

use permtree_core::{
    LockedSet,
    PermissionNode,
    PermissionTree,
    PermissionTreeError,
    SelectionPolicy,
    SelectionSet,
    SelectionState,
};
use proptest::prelude::*;
use proptest::sample::Index;

const MAX_NODES: usize = 40;


fn node_id(position: usize) -> String {
    format!("n{}", position)
}

fn build_tree(shape: &[(bool, Index)]) -> PermissionTree {
    let parents = shape
        .iter()
        .enumerate()
        .map(|(position, (is_root, parent))| {
            if position == 0 || *is_root {
                None
            } else {
                Some(parent.index(position))
            }
        })
        .collect::<Vec<_>>();

    fn nest(position: usize, parents: &[Option<usize>]) -> PermissionNode {
        let children = (position + 1..parents.len())
            .filter(|child| parents[*child] == Some(position))
            .map(|child| nest(child, parents))
            .collect();

        PermissionNode::branch(node_id(position), format!("Node {}", position), children)
    }

    let roots = (0..parents.len())
        .filter(|position| parents[*position].is_none())
        .map(|position| nest(position, &parents))
        .collect();

    PermissionTree::from_roots(roots).unwrap()
}

fn tree_strategy() -> impl Strategy<Value = PermissionTree> {
    prop::collection::vec((prop::bool::weighted(0.1), any::<Index>()), 1..MAX_NODES)
        .prop_map(|shape| build_tree(&shape))
}

fn mask_to_set(tree: &PermissionTree, mask: &[bool]) -> SelectionSet {
    tree.iter()
        .zip(mask.iter())
        .filter(|(_, is_set)| **is_set)
        .map(|(node, _)| node.id())
        .collect()
}

fn scenario_strategy() -> impl Strategy<Value = (PermissionTree, SelectionSet, String)> {
    (
        tree_strategy(),
        prop::collection::vec(any::<bool>(), MAX_NODES),
        any::<Index>(),
    )
        .prop_map(|(tree, mask, node)| {
            let selected = mask_to_set(&tree, &mask);
            let node_id = tree.iter().nth(node.index(tree.len())).unwrap().id().to_string();

            (tree, selected, node_id)
        })
}


proptest! {
    #[test]
    fn descendants_always_include_the_node_itself(
        (tree, _selected, node) in scenario_strategy()
    ) {
        let descendants = tree.descendant_ids(&node).unwrap();

        prop_assert!(descendants.contains(node.as_str()));
        prop_assert_eq!(descendants.len(), tree.find(&node).unwrap().subtree_len());
    }

    #[test]
    fn ancestor_count_equals_depth(
        (tree, _selected, node) in scenario_strategy()
    ) {
        let ancestors = tree.ancestor_ids(&node).unwrap();

        prop_assert_eq!(ancestors.len(), tree.depth(&node).unwrap());

        if let Some(parent) = tree.find(&node).unwrap().parent() {
            prop_assert_eq!(ancestors[0], parent.id());
        }
    }

    #[test]
    fn selecting_makes_node_selected_and_ancestors_visible(
        (tree, selected, node) in scenario_strategy()
    ) {
        prop_assume!(tree.selection_state(&node, &selected).unwrap() != SelectionState::Selected);

        let result = tree.toggle(&selected, &node).unwrap();

        prop_assert_eq!(
            tree.selection_state(&node, &result).unwrap(),
            SelectionState::Selected
        );

        for ancestor in tree.ancestor_ids(&node).unwrap() {
            prop_assert_ne!(
                tree.selection_state(ancestor, &result).unwrap(),
                SelectionState::Unselected
            );
        }

        prop_assert!(selected.is_subset_of(&result));
    }

    #[test]
    fn deselecting_clears_the_subtree_only(
        (tree, selected, node) in scenario_strategy()
    ) {
        let descendants = tree.descendant_ids(&node).unwrap();
        let selected = descendants
            .iter()
            .copied()
            .chain(selected.iter())
            .collect::<SelectionSet>();

        let result = tree.toggle(&selected, &node).unwrap();

        prop_assert_eq!(
            tree.selection_state(&node, &result).unwrap(),
            SelectionState::Unselected
        );

        for id in selected.iter() {
            prop_assert_eq!(result.contains(id), !descendants.contains(id));
        }
    }

    #[test]
    fn toggling_twice_is_a_round_trip_on_ancestor_closed_selections(
        (tree, selected, node) in scenario_strategy()
    ) {
        let selected = tree.close_over_ancestors(&selected).unwrap();
        let state = tree.selection_state(&node, &selected).unwrap();
        let ancestors_selected = tree
            .ancestor_ids(&node)
            .unwrap()
            .into_iter()
            .all(|ancestor| selected.contains(ancestor));

        prop_assume!(
            state == SelectionState::Selected
                || (state == SelectionState::Unselected && ancestors_selected)
        );

        let once = tree.toggle(&selected, &node).unwrap();
        let twice = tree.toggle(&once, &node).unwrap();

        prop_assert_eq!(twice, selected);
    }

    #[test]
    fn subtree_only_policy_never_touches_outside_the_subtree(
        (tree, selected, node) in scenario_strategy()
    ) {
        let descendants = tree.descendant_ids(&node).unwrap();

        let result = tree
            .toggle_with_policy(&selected, &node, SelectionPolicy::SubtreeOnly, &LockedSet::new_empty())
            .unwrap();

        for other in tree.iter().filter(|other| !descendants.contains(other.id())) {
            prop_assert_eq!(result.contains(other.id()), selected.contains(other.id()));
        }
    }

    #[test]
    fn locked_membership_never_changes(
        (tree, selected, node) in scenario_strategy(),
        lock_mask in prop::collection::vec(prop::bool::weighted(0.2), MAX_NODES),
    ) {
        let locked = tree.locked_node_ids(mask_to_set(&tree, &lock_mask).iter());

        match tree.toggle_respecting_locks(&selected, &node, &locked) {
            Ok(result) => {
                prop_assert!(!locked.contains(&node));

                for id in locked.iter() {
                    prop_assert_eq!(result.contains(id), selected.contains(id));
                }
            }
            Err(error) => {
                prop_assert!(locked.contains(&node));
                prop_assert_eq!(error, PermissionTreeError::Locked { id: node.clone() });
            }
        }
    }
}
