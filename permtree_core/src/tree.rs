use std::collections::{hash_map::Entry, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;


/// A single entry in a hierarchical permission catalogue (e.g. "Customers → View").
///
/// This is the nested, externally-defined form of a node, which is what
/// catalogue files contain. Once handed to [`PermissionTree::from_roots`],
/// nodes are validated and flattened, and are never mutated again.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct PermissionNode {
    /// Unique (across the entire tree) identifier, also used as the permission key.
    pub id: String,

    /// Human-readable display text.
    pub label: String,

    /// Ordered child nodes. Empty for leaves.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PermissionNode>,
}

impl PermissionNode {
    pub fn leaf<I, L>(id: I, label: L) -> Self
    where
        I: Into<String>,
        L: Into<String>,
    {
        Self {
            id: id.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn branch<I, L>(id: I, label: L, children: Vec<PermissionNode>) -> Self
    where
        I: Into<String>,
        L: Into<String>,
    {
        Self {
            id: id.into(),
            label: label.into(),
            children,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}



#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeConstructionError {
    #[error("permission node labelled \"{}\" has an empty id", .label)]
    EmptyId { label: String },

    #[error("permission id \"{}\" occurs more than once in the tree", .id)]
    DuplicateId { id: String },
}


/// Errors returned by queries and toggles on a [`PermissionTree`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionTreeError {
    /// The referenced node id does not occur in the tree.
    /// This indicates a mismatch between the caller's data and the tree
    /// and should be propagated, not swallowed.
    #[error("no permission node with id \"{}\" exists in the tree", .id)]
    NotFound { id: String },

    /// A toggle was attempted on an inherited (non-editable) node.
    /// Nothing was changed.
    #[error("permission \"{}\" is inherited and cannot be edited here", .id)]
    Locked { id: String },
}



#[derive(Clone, Debug)]
struct FlatNode {
    id: String,
    label: String,
    parent: Option<usize>,
    children: Vec<usize>,
    depth: usize,

    /// Exclusive end of this node's subtree in the pre-order arena.
    /// The subtree of the node at position `p` is exactly `nodes[p..subtree_end]`.
    subtree_end: usize,
}


/// An immutable, validated forest of permission nodes.
///
/// Nodes are stored in pre-order in a flat arena, which means that
/// every subtree is a contiguous slice. Each top-level node is a root
/// (it has no ancestors).
///
/// The tree itself holds no selection state; see the `selection` module
/// for the operations that work with a caller-owned [`SelectionSet`][crate::SelectionSet].
#[derive(Clone, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(
    try_from = "Vec<PermissionNode>",
    into = "Vec<PermissionNode>"
)]
pub struct PermissionTree {
    nodes: Vec<FlatNode>,
    roots: Vec<usize>,
    index: HashMap<String, usize>,
}

impl PermissionTree {
    /// Validates and flattens the given top-level nodes into a tree.
    ///
    /// Fails if any id is empty (or whitespace-only) or occurs more than once.
    pub fn from_roots(roots: Vec<PermissionNode>) -> Result<Self, TreeConstructionError> {
        let mut tree = Self {
            nodes: Vec::new(),
            roots: Vec::with_capacity(roots.len()),
            index: HashMap::new(),
        };

        for root in roots {
            let root_position = tree.push_subtree(root, None, 0)?;
            tree.roots.push(root_position);
        }

        Ok(tree)
    }

    /// Shorthand for a tree with a single root.
    pub fn from_root(root: PermissionNode) -> Result<Self, TreeConstructionError> {
        Self::from_roots(vec![root])
    }

    fn push_subtree(
        &mut self,
        node: PermissionNode,
        parent: Option<usize>,
        depth: usize,
    ) -> Result<usize, TreeConstructionError> {
        let PermissionNode {
            id,
            label,
            children,
        } = node;

        if id.trim().is_empty() {
            return Err(TreeConstructionError::EmptyId { label });
        }

        let position = self.nodes.len();

        match self.index.entry(id.clone()) {
            Entry::Occupied(_) => return Err(TreeConstructionError::DuplicateId { id }),
            Entry::Vacant(entry) => {
                entry.insert(position);
            }
        }

        self.nodes.push(FlatNode {
            id,
            label,
            parent,
            children: Vec::with_capacity(children.len()),
            depth,
            subtree_end: position + 1,
        });

        for child in children {
            let child_position = self.push_subtree(child, Some(position), depth + 1)?;
            self.nodes[position].children.push(child_position);
        }

        self.nodes[position].subtree_end = self.nodes.len();

        Ok(position)
    }


    /// Number of nodes in the whole tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, node_id: &str) -> bool {
        self.index.contains_key(node_id)
    }

    /// Returns a view of the node with the given id, if it exists.
    pub fn find(&self, node_id: &str) -> Option<NodeRef<'_>> {
        self.index
            .get(node_id)
            .map(|position| self.node_at(*position))
    }

    /// Like [`Self::find`], but fails with [`PermissionTreeError::NotFound`].
    pub fn node(&self, node_id: &str) -> Result<NodeRef<'_>, PermissionTreeError> {
        self.find(node_id)
            .ok_or_else(|| PermissionTreeError::NotFound {
                id: node_id.to_string(),
            })
    }

    /// Top-level nodes, in their original order.
    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.roots
            .iter()
            .map(|position| self.node_at(*position))
    }

    /// All nodes in pre-order (each parent directly before its subtree).
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        (0..self.nodes.len()).map(|position| self.node_at(position))
    }

    /// Depth of the given node (roots have depth 0).
    pub fn depth(&self, node_id: &str) -> Result<usize, PermissionTreeError> {
        self.node(node_id).map(|node| node.depth())
    }

    /// Returns the id of the node itself plus the ids of every node in its subtree.
    pub fn descendant_ids(&self, node_id: &str) -> Result<BTreeSet<&str>, PermissionTreeError> {
        let position = self.position_of(node_id)?;

        Ok(self
            .subtree(position)
            .iter()
            .map(|node| node.id.as_str())
            .collect())
    }

    /// Returns the ids of all strict ancestors of the given node,
    /// ordered from the nearest parent to the root. Empty for roots.
    pub fn ancestor_ids(&self, node_id: &str) -> Result<Vec<&str>, PermissionTreeError> {
        let position = self.position_of(node_id)?;

        Ok(self
            .ancestor_positions(position)
            .map(|ancestor| self.nodes[ancestor].id.as_str())
            .collect())
    }

    /// Reconstructs the nested form of the tree.
    pub fn to_permission_nodes(&self) -> Vec<PermissionNode> {
        self.roots
            .iter()
            .map(|position| self.nest(*position))
            .collect()
    }

    fn nest(&self, position: usize) -> PermissionNode {
        let node = &self.nodes[position];

        PermissionNode {
            id: node.id.clone(),
            label: node.label.clone(),
            children: node
                .children
                .iter()
                .map(|child| self.nest(*child))
                .collect(),
        }
    }


    pub(crate) fn position_of(&self, node_id: &str) -> Result<usize, PermissionTreeError> {
        self.index
            .get(node_id)
            .copied()
            .ok_or_else(|| PermissionTreeError::NotFound {
                id: node_id.to_string(),
            })
    }

    #[inline]
    pub(crate) fn node_at(&self, position: usize) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            position,
        }
    }

    #[inline]
    pub(crate) fn id_at(&self, position: usize) -> &str {
        &self.nodes[position].id
    }

    /// Ids of the node at `position` and its whole subtree, in pre-order.
    pub(crate) fn subtree_ids(&self, position: usize) -> impl Iterator<Item = &str> + '_ {
        self.subtree(position)
            .iter()
            .map(|node| node.id.as_str())
    }

    pub(crate) fn ancestor_positions(&self, position: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.nodes[position].parent, |ancestor| {
            self.nodes[*ancestor].parent
        })
    }

    #[inline]
    fn subtree(&self, position: usize) -> &[FlatNode] {
        &self.nodes[position..self.nodes[position].subtree_end]
    }
}

impl TryFrom<Vec<PermissionNode>> for PermissionTree {
    type Error = TreeConstructionError;

    fn try_from(roots: Vec<PermissionNode>) -> Result<Self, Self::Error> {
        Self::from_roots(roots)
    }
}

impl From<PermissionTree> for Vec<PermissionNode> {
    fn from(tree: PermissionTree) -> Self {
        tree.to_permission_nodes()
    }
}



/// A borrowed view of a single node inside a [`PermissionTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t PermissionTree,
    position: usize,
}

impl<'t> NodeRef<'t> {
    #[inline]
    fn flat(&self) -> &'t FlatNode {
        &self.tree.nodes[self.position]
    }

    #[inline]
    pub fn id(&self) -> &'t str {
        &self.flat().id
    }

    #[inline]
    pub fn label(&self) -> &'t str {
        &self.flat().label
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.flat().depth
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.flat().children.is_empty()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.flat().parent.is_none()
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.flat()
            .parent
            .map(|parent| self.tree.node_at(parent))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;

        self.flat()
            .children
            .iter()
            .map(move |child| tree.node_at(*child))
    }

    /// Number of nodes in this node's subtree, including the node itself.
    #[inline]
    pub fn subtree_len(&self) -> usize {
        self.flat().subtree_end - self.position
    }

    #[inline]
    pub(crate) fn tree(&self) -> &'t PermissionTree {
        self.tree
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.position
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id())
            .field("label", &self.label())
            .field("depth", &self.depth())
            .finish()
    }
}



#[cfg(test)]
mod test {
    use super::*;

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

    #[test]
    fn collects_descendants_including_self() {
        let tree = sample_tree();

        assert_eq!(
            tree.descendant_ids("a").unwrap(),
            BTreeSet::from(["a", "a1", "a2"])
        );
        assert_eq!(
            tree.descendant_ids("b").unwrap(),
            BTreeSet::from(["b"])
        );
        assert_eq!(tree.descendant_ids("root").unwrap().len(), 5);
    }

    #[test]
    fn orders_ancestors_from_parent_to_root() {
        let tree = sample_tree();

        assert_eq!(tree.ancestor_ids("a2").unwrap(), vec!["a", "root"]);
        assert_eq!(tree.ancestor_ids("b").unwrap(), vec!["root"]);
        assert!(tree.ancestor_ids("root").unwrap().is_empty());
    }

    #[test]
    fn reports_unknown_ids() {
        let tree = sample_tree();

        assert_eq!(
            tree.descendant_ids("zzz"),
            Err(PermissionTreeError::NotFound {
                id: "zzz".to_string()
            })
        );
        assert!(matches!(
            tree.ancestor_ids("zzz"),
            Err(PermissionTreeError::NotFound { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = PermissionTree::from_roots(vec![
            PermissionNode::branch("x", "X", vec![PermissionNode::leaf("y", "Y")]),
            PermissionNode::leaf("y", "Another Y"),
        ]);

        assert_eq!(
            result.unwrap_err(),
            TreeConstructionError::DuplicateId {
                id: "y".to_string()
            }
        );
    }

    #[test]
    fn rejects_blank_ids() {
        let result = PermissionTree::from_root(PermissionNode::leaf("  ", "Blank"));

        assert!(matches!(
            result,
            Err(TreeConstructionError::EmptyId { .. })
        ));
    }

    #[test]
    fn preserves_structure_and_order() {
        let tree = sample_tree();

        let pre_order = tree.iter().map(|node| node.id()).collect::<Vec<_>>();
        assert_eq!(pre_order, vec!["root", "a", "a1", "a2", "b"]);

        let a = tree.find("a").unwrap();
        assert_eq!(a.label(), "A");
        assert_eq!(a.depth(), 1);
        assert_eq!(a.subtree_len(), 3);
        assert_eq!(a.parent().unwrap().id(), "root");
        assert_eq!(
            a.children().map(|child| child.id()).collect::<Vec<_>>(),
            vec!["a1", "a2"]
        );

        assert_eq!(tree.depth("a1").unwrap(), 2);
        assert!(tree.find("root").unwrap().is_root());
    }

    #[test]
    fn nested_form_survives_serde() {
        let tree = sample_tree();

        let serialized = serde_json::to_string(&tree).unwrap();
        let deserialized: PermissionTree = serde_json::from_str(&serialized).unwrap();

        assert_eq!(
            deserialized.to_permission_nodes(),
            tree.to_permission_nodes()
        );
    }

    #[test]
    fn deserialization_validates_ids() {
        let json = r#"[{"id": "a", "label": "A"}, {"id": "a", "label": "Again"}]"#;

        assert!(serde_json::from_str::<PermissionTree>(json).is_err());
    }
}
