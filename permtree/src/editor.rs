use permtree_core::{
    LockedSet,
    NodeRef,
    PermissionTree,
    PermissionTreeError,
    Role,
    SelectionPolicy,
    SelectionSet,
    SelectionState,
};
use tracing::{debug, info};


/// An editing session for the permissions of a single role.
///
/// Every successful toggle replaces the role's selection with a new snapshot
/// and keeps the previous one for [`Self::undo`]. Failed toggles (unknown or
/// locked nodes) leave both the role and the history untouched.
pub struct RoleEditor<'t> {
    tree: &'t PermissionTree,
    policy: SelectionPolicy,
    locked: LockedSet,
    role: Role,

    /// Permissions the role had when the session started.
    initial_permissions: SelectionSet,

    undo_stack: Vec<SelectionSet>,
    redo_stack: Vec<SelectionSet>,
}

impl<'t> RoleEditor<'t> {
    /// Starts a session. The role's inherited permissions become its locked nodes.
    pub fn new(tree: &'t PermissionTree, role: Role, policy: SelectionPolicy) -> Self {
        let locked = role.locked_node_ids(tree);
        let initial_permissions = role.permissions().clone();

        Self {
            tree,
            policy,
            locked,
            role,
            initial_permissions,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Toggles a node and returns its new display state.
    pub fn toggle(&mut self, node_id: &str) -> Result<SelectionState, PermissionTreeError> {
        let next_permissions = match self.tree.toggle_with_policy(
            self.role.permissions(),
            node_id,
            self.policy,
            &self.locked,
        ) {
            Ok(next_permissions) => next_permissions,
            Err(error) => {
                debug!(
                    role = self.role.name(),
                    node_id,
                    %error,
                    "Toggle rejected."
                );

                return Err(error);
            }
        };

        let previous_permissions = self.role.permissions().clone();
        self.role.set_permissions(next_permissions);

        self.undo_stack.push(previous_permissions);
        self.redo_stack.clear();

        let new_state = self.tree.selection_state(node_id, self.role.permissions())?;

        info!(
            role = self.role.name(),
            node_id,
            state = ?new_state,
            granted = self.role.permissions().len(),
            "Toggled permission."
        );

        Ok(new_state)
    }

    /// Restores the selection from before the last toggle.
    /// Returns `false` if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous_permissions) = self.undo_stack.pop() else {
            return false;
        };

        let current_permissions = self.role.permissions().clone();
        self.role.set_permissions(previous_permissions);
        self.redo_stack.push(current_permissions);

        debug!(role = self.role.name(), "Undid last toggle.");

        true
    }

    /// Re-applies the last undone toggle.
    /// Returns `false` if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next_permissions) = self.redo_stack.pop() else {
            return false;
        };

        let current_permissions = self.role.permissions().clone();
        self.role.set_permissions(next_permissions);
        self.undo_stack.push(current_permissions);

        debug!(role = self.role.name(), "Redid toggle.");

        true
    }

    /// Whether the role's permissions differ from the ones the session started with.
    pub fn has_changes(&self) -> bool {
        self.role.permissions() != &self.initial_permissions
    }

    #[inline]
    pub fn role(&self) -> &Role {
        &self.role
    }

    #[inline]
    pub fn selected(&self) -> &SelectionSet {
        self.role.permissions()
    }

    #[inline]
    pub fn locked(&self) -> &LockedSet {
        &self.locked
    }

    #[inline]
    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Display state of every node, in pre-order.
    pub fn states(&self) -> Vec<(NodeRef<'t>, SelectionState)> {
        self.tree.states(self.role.permissions())
    }

    /// Ends the session and returns the edited role.
    pub fn into_role(self) -> Role {
        self.role
    }
}



#[cfg(test)]
mod test {
    use permtree_core::catalogue::{dealing_desk_permissions, default_roles};
    use permtree_core::RoleId;

    use super::*;

    fn dealer() -> Role {
        default_roles()
            .into_iter()
            .find(|role| role.name() == "Dealer")
            .unwrap()
    }

    #[test]
    fn toggles_and_reports_new_state() {
        let tree = dealing_desk_permissions();
        let mut editor = RoleEditor::new(&tree, dealer(), SelectionPolicy::IncludeAncestors);

        assert_eq!(
            editor.toggle("customers").unwrap(),
            SelectionState::Selected
        );
        assert!(editor.selected().contains("customers.enroll"));
        assert!(editor.has_changes());

        assert_eq!(
            editor.toggle("customers").unwrap(),
            SelectionState::Unselected
        );
        assert!(editor.selected().is_empty());
    }

    #[test]
    fn undo_and_redo_walk_snapshots() {
        let tree = dealing_desk_permissions();
        let mut editor = RoleEditor::new(&tree, dealer(), SelectionPolicy::IncludeAncestors);
        let initial = editor.selected().clone();

        editor.toggle("chat.start").unwrap();
        let after_first = editor.selected().clone();
        editor.toggle("reports").unwrap();

        assert!(editor.undo());
        assert_eq!(editor.selected(), &after_first);

        assert!(editor.undo());
        assert_eq!(editor.selected(), &initial);
        assert!(!editor.has_changes());
        assert!(!editor.undo());

        assert!(editor.redo());
        assert_eq!(editor.selected(), &after_first);

        // A new toggle discards the redo history.
        editor.toggle("users.view").unwrap();
        assert!(!editor.redo());
    }

    #[test]
    fn failed_toggles_leave_history_alone() {
        let tree = dealing_desk_permissions();
        let role = Role::new(RoleId::new("9"), "Auditor", "EFX_Audit_Group")
            .unwrap()
            .with_inherited_permissions(SelectionSet::from_ids(["reports.events"]));
        let mut editor = RoleEditor::new(&tree, role, SelectionPolicy::IncludeAncestors);

        assert_eq!(editor.locked().len(), 1);
        assert!(matches!(
            editor.toggle("reports.events"),
            Err(PermissionTreeError::Locked { .. })
        ));
        assert!(matches!(
            editor.toggle("reports.unknown"),
            Err(PermissionTreeError::NotFound { .. })
        ));

        assert!(!editor.has_changes());
        assert!(!editor.undo());
    }

    #[test]
    fn respects_subtree_only_policy() {
        let tree = dealing_desk_permissions();
        let mut editor = RoleEditor::new(&tree, dealer(), SelectionPolicy::SubtreeOnly);

        editor.toggle("management.marginGroups").unwrap();

        assert!(editor.selected().contains("management.marginGroups.view"));
        assert!(!editor.selected().contains("management"));

        let role = editor.into_role();
        assert_eq!(role.name(), "Dealer");
    }

    #[test]
    fn lists_states_for_rendering() {
        let tree = dealing_desk_permissions();
        let editor = RoleEditor::new(&tree, dealer(), SelectionPolicy::IncludeAncestors);

        let states = editor.states();
        assert_eq!(states.len(), tree.len());

        let (customers, state) = states[0];
        assert_eq!(customers.id(), "customers");
        assert_eq!(state, SelectionState::Partial);
    }
}
