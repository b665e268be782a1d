use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::tree::{NodeRef, PermissionTree, PermissionTreeError};


/// A set of selected permission ids, usually the permissions granted to a role.
///
/// The tree never owns or mutates a selection set: every toggle returns a new one.
/// Ids are kept sorted, which is also their serialized form (a plain sorted array).
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq, Debug)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    #[inline]
    pub fn new_empty() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns `true` if the id was not already present.
    pub fn insert<S>(&mut self, id: S) -> bool
    where
        S: Into<String>,
    {
        self.ids.insert(id.into())
    }

    /// Returns `true` if the id was present.
    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.ids.is_subset(&other.ids)
    }

    /// Iterates over the ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids.iter().map(String::as_str)
    }

    /// Consumes the set and returns its ids, sorted.
    pub fn into_sorted_ids(self) -> Vec<String> {
        self.ids.into_iter().collect()
    }
}

impl<S> FromIterator<S> for SelectionSet
where
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::from_ids(iter)
    }
}



/// Derived, per-node display state of a selection.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionState {
    /// Neither the node nor any of its descendants are selected.
    Unselected,

    /// The node and all of its descendants are selected.
    Selected,

    /// Some, but not all, of the node and its descendants are selected.
    Partial,
}


/// What selecting a node implies for the rest of the tree.
///
/// Deselection always behaves the same: the node and its subtree are removed,
/// ancestors are left alone.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Selecting a node selects its whole subtree and all of its ancestors,
    /// since a permission implies access to its category.
    #[default]
    IncludeAncestors,

    /// Selecting a node selects only its subtree.
    /// This is how simple filter trees (e.g. event action types) behave.
    SubtreeOnly,
}

impl SelectionPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "include-ancestors" => Some(Self::IncludeAncestors),
            "subtree-only" => Some(Self::SubtreeOnly),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::IncludeAncestors => "include-ancestors",
            Self::SubtreeOnly => "subtree-only",
        }
    }
}



/// Set of node ids that must not be edited, typically permissions
/// inherited from a parent role or profile.
///
/// Obtained through [`PermissionTree::locked_node_ids`], which guarantees
/// that every id in it exists in the tree.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct LockedSet {
    ids: BTreeSet<String>,
}

impl LockedSet {
    #[inline]
    pub fn new_empty() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids.iter().map(String::as_str)
    }
}



impl NodeRef<'_> {
    /// Derives this node's display state from `selected`.
    pub fn selection_state(&self, selected: &SelectionSet) -> SelectionState {
        let mut total = 0usize;
        let mut selected_count = 0usize;

        for id in self.tree().subtree_ids(self.position()) {
            total += 1;

            if selected.contains(id) {
                selected_count += 1;
            }
        }

        if selected_count == 0 {
            SelectionState::Unselected
        } else if selected_count == total {
            SelectionState::Selected
        } else {
            SelectionState::Partial
        }
    }
}


impl PermissionTree {
    /// Derives the display state of the given node from `selected`.
    ///
    /// `Selected` if the node and all of its descendants are in `selected`,
    /// `Unselected` if none of them are, `Partial` otherwise.
    /// Nothing is cached, so the result always reflects the current `selected`.
    pub fn selection_state(
        &self,
        node_id: &str,
        selected: &SelectionSet,
    ) -> Result<SelectionState, PermissionTreeError> {
        self.node(node_id)
            .map(|node| node.selection_state(selected))
    }

    /// Display state of every node, in pre-order.
    pub fn states<'t>(&'t self, selected: &SelectionSet) -> Vec<(NodeRef<'t>, SelectionState)> {
        self.iter()
            .map(|node| (node, node.selection_state(selected)))
            .collect()
    }

    /// Builds the set of locked nodes from a caller-supplied list of inherited ids.
    ///
    /// Ids that do not occur in this tree are dropped.
    pub fn locked_node_ids<I, S>(&self, inherited_ids: I) -> LockedSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = inherited_ids
            .into_iter()
            .filter(|id| self.contains(id.as_ref()))
            .map(|id| id.as_ref().to_string())
            .collect();

        LockedSet { ids }
    }

    /// Toggles a node with the default [`SelectionPolicy`] and no locked nodes.
    ///
    /// If the node is fully selected, it is deselected together with its subtree.
    /// Otherwise the node, its subtree and all of its ancestors are selected.
    /// The input set is left untouched; the updated set is returned.
    pub fn toggle(
        &self,
        selected: &SelectionSet,
        node_id: &str,
    ) -> Result<SelectionSet, PermissionTreeError> {
        self.toggle_with_policy(
            selected,
            node_id,
            SelectionPolicy::IncludeAncestors,
            &LockedSet::new_empty(),
        )
    }

    /// Toggles a node with the default [`SelectionPolicy`], refusing to edit locked nodes.
    pub fn toggle_respecting_locks(
        &self,
        selected: &SelectionSet,
        node_id: &str,
        locked: &LockedSet,
    ) -> Result<SelectionSet, PermissionTreeError> {
        self.toggle_with_policy(
            selected,
            node_id,
            SelectionPolicy::IncludeAncestors,
            locked,
        )
    }

    /// Toggles a node.
    ///
    /// Fails with [`PermissionTreeError::Locked`] if the node itself is locked.
    /// Membership of locked ids is never changed by a toggle on another node:
    /// the "fully selected" test only looks at the editable part of the subtree,
    /// and both removal and addition (ancestors included) skip locked ids.
    pub fn toggle_with_policy(
        &self,
        selected: &SelectionSet,
        node_id: &str,
        policy: SelectionPolicy,
        locked: &LockedSet,
    ) -> Result<SelectionSet, PermissionTreeError> {
        let position = self.position_of(node_id)?;

        if locked.contains(node_id) {
            return Err(PermissionTreeError::Locked {
                id: node_id.to_string(),
            });
        }

        let editable_subtree = self
            .subtree_ids(position)
            .filter(|id| !locked.contains(id))
            .collect::<Vec<_>>();

        let is_fully_selected = editable_subtree
            .iter()
            .all(|id| selected.contains(id));

        let mut next_selection = selected.clone();

        if is_fully_selected {
            for id in editable_subtree {
                next_selection.remove(id);
            }

            return Ok(next_selection);
        }

        for id in editable_subtree {
            next_selection.insert(id);
        }

        if policy == SelectionPolicy::IncludeAncestors {
            for ancestor in self.ancestor_positions(position) {
                let ancestor_id = self.id_at(ancestor);

                if !locked.contains(ancestor_id) {
                    next_selection.insert(ancestor_id);
                }
            }
        }

        Ok(next_selection)
    }

    /// Adds every missing ancestor of every selected id.
    ///
    /// Fails on the first id that does not occur in the tree.
    pub fn close_over_ancestors(
        &self,
        selected: &SelectionSet,
    ) -> Result<SelectionSet, PermissionTreeError> {
        let mut closed = selected.clone();

        for id in selected.iter() {
            let position = self.position_of(id)?;

            for ancestor in self.ancestor_positions(position) {
                closed.insert(self.id_at(ancestor));
            }
        }

        Ok(closed)
    }

    /// Splits `selected` into the ids that exist in this tree and the ones that don't.
    ///
    /// Useful when a stored selection was created against an older catalogue.
    pub fn normalize(&self, selected: &SelectionSet) -> (SelectionSet, Vec<String>) {
        let mut known = SelectionSet::new_empty();
        let mut unknown = Vec::new();

        for id in selected.iter() {
            if self.contains(id) {
                known.insert(id);
            } else {
                unknown.push(id.to_string());
            }
        }

        (known, unknown)
    }
}



#[cfg(test)]
mod test {
    use super::*;
    use crate::tree::PermissionNode;

    fn sample_tree() -> PermissionTree {
        PermissionTree::from_root(PermissionNode::branch(
            "root",
            "Root",
            vec![
                PermissionNode::branch(
                    "a",
                    "A",
                    vec![
                        PermissionNode::leaf("a1", "A1"),
                        PermissionNode::leaf("a2", "A2"),
                    ],
                ),
                PermissionNode::leaf("b", "B"),
            ],
        ))
        .unwrap()
    }

    fn set(ids: &[&str]) -> SelectionSet {
        SelectionSet::from_ids(ids.iter().copied())
    }

    #[test]
    fn selecting_a_leaf_adds_its_ancestors() {
        let tree = sample_tree();

        let selected = tree.toggle(&SelectionSet::new_empty(), "a1").unwrap();

        assert_eq!(selected, set(&["a1", "a", "root"]));
        assert_eq!(
            tree.selection_state("a1", &selected).unwrap(),
            SelectionState::Selected
        );
        assert_eq!(
            tree.selection_state("a", &selected).unwrap(),
            SelectionState::Partial
        );
        assert_eq!(
            tree.selection_state("root", &selected).unwrap(),
            SelectionState::Partial
        );
        assert_eq!(
            tree.selection_state("b", &selected).unwrap(),
            SelectionState::Unselected
        );
    }

    #[test]
    fn deselecting_keeps_ancestors() {
        let tree = sample_tree();
        let selected = set(&["root", "a", "a1", "a2", "b"]);

        let next = tree.toggle(&selected, "a").unwrap();

        assert_eq!(next, set(&["root", "b"]));
        assert_eq!(
            tree.selection_state("a", &next).unwrap(),
            SelectionState::Unselected
        );
        assert_eq!(
            tree.selection_state("root", &next).unwrap(),
            SelectionState::Partial
        );
    }

    #[test]
    fn partial_node_becomes_fully_selected() {
        let tree = sample_tree();
        let selected = set(&["root", "a", "a1"]);

        let next = tree.toggle(&selected, "a").unwrap();

        assert_eq!(next, set(&["root", "a", "a1", "a2"]));
    }

    #[test]
    fn toggle_does_not_mutate_input() {
        let tree = sample_tree();
        let selected = set(&["b"]);

        let _ = tree.toggle(&selected, "a2").unwrap();

        assert_eq!(selected, set(&["b"]));
    }

    #[test]
    fn subtree_only_policy_skips_ancestors() {
        let tree = sample_tree();

        let next = tree
            .toggle_with_policy(
                &SelectionSet::new_empty(),
                "a",
                SelectionPolicy::SubtreeOnly,
                &LockedSet::new_empty(),
            )
            .unwrap();

        assert_eq!(next, set(&["a", "a1", "a2"]));
        assert_eq!(
            tree.selection_state("root", &next).unwrap(),
            SelectionState::Partial
        );
    }

    #[test]
    fn locked_node_cannot_be_toggled() {
        let tree = sample_tree();
        let locked = tree.locked_node_ids(["a2"]);
        let selected = set(&["root", "a", "a1"]);

        let result = tree.toggle_respecting_locks(&selected, "a2", &locked);

        assert_eq!(
            result,
            Err(PermissionTreeError::Locked {
                id: "a2".to_string()
            })
        );
    }

    #[test]
    fn locked_descendants_keep_their_membership() {
        let tree = sample_tree();
        let locked = tree.locked_node_ids(["a2"]);

        // a2 is inherited and present: deselecting "a" must leave it in place.
        let selected = set(&["root", "a", "a1", "a2"]);
        let next = tree
            .toggle_respecting_locks(&selected, "a", &locked)
            .unwrap();
        assert_eq!(next, set(&["root", "a2"]));

        // a2 is inherited but absent: selecting "a" must not add it.
        let next = tree
            .toggle_respecting_locks(&SelectionSet::new_empty(), "a", &locked)
            .unwrap();
        assert_eq!(next, set(&["root", "a", "a1"]));

        // ...and the editable part now counts as fully selected.
        let next = tree.toggle_respecting_locks(&next, "a", &locked).unwrap();
        assert_eq!(next, set(&["root"]));
    }

    #[test]
    fn locked_set_drops_unknown_ids() {
        let tree = sample_tree();

        let locked = tree.locked_node_ids(vec!["a1".to_string(), "missing".to_string()]);

        assert_eq!(locked.len(), 1);
        assert!(locked.contains("a1"));
        assert!(!locked.contains("missing"));
    }

    #[test]
    fn unknown_node_fails_without_changes() {
        let tree = sample_tree();

        assert_eq!(
            tree.toggle(&SelectionSet::new_empty(), "nope"),
            Err(PermissionTreeError::NotFound {
                id: "nope".to_string()
            })
        );
        assert!(tree
            .selection_state("nope", &SelectionSet::new_empty())
            .is_err());
    }

    #[test]
    fn closes_over_ancestors() {
        let tree = sample_tree();

        let closed = tree.close_over_ancestors(&set(&["a2", "b"])).unwrap();

        assert_eq!(closed, set(&["root", "a", "a2", "b"]));
    }

    #[test]
    fn normalizes_stale_ids() {
        let tree = sample_tree();

        let (known, unknown) = tree.normalize(&set(&["a", "legacy.view", "b"]));

        assert_eq!(known, set(&["a", "b"]));
        assert_eq!(unknown, vec!["legacy.view".to_string()]);
    }

    #[test]
    fn lists_states_in_pre_order() {
        let tree = sample_tree();
        let selected = set(&["a1", "a2"]);

        let states = tree
            .states(&selected)
            .into_iter()
            .map(|(node, state)| (node.id(), state))
            .collect::<Vec<_>>();

        assert_eq!(
            states,
            vec![
                ("root", SelectionState::Partial),
                ("a", SelectionState::Partial),
                ("a1", SelectionState::Selected),
                ("a2", SelectionState::Selected),
                ("b", SelectionState::Unselected),
            ]
        );
    }

    #[test]
    fn selection_serializes_as_sorted_array() {
        let selected = set(&["b", "a2", "a"]);

        assert_eq!(
            serde_json::to_string(&selected).unwrap(),
            r#"["a","a2","b"]"#
        );
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!(
            SelectionPolicy::from_name("subtree-only"),
            Some(SelectionPolicy::SubtreeOnly)
        );
        assert_eq!(
            SelectionPolicy::from_name(SelectionPolicy::IncludeAncestors.name()),
            Some(SelectionPolicy::IncludeAncestors)
        );
        assert_eq!(SelectionPolicy::from_name("parents"), None);
    }
}
