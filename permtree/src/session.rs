//! Role selection and batch toggling, as used by the command-line interface.

use itertools::Itertools;
use permtree_core::{
    PermissionTree,
    PermissionTreeError,
    Role,
    RoleDirectory,
    SelectionPolicy,
    SelectionSet,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::editor::RoleEditor;


#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleSelectionError {
    #[error(
        "no role named \"{}\" (available roles: {})",
        .name,
        .available.join(", ")
    )]
    UnknownRole {
        name: String,
        available: Vec<String>,
    },
}


/// A role prepared for editing against a specific tree.
#[derive(Clone, Debug)]
pub struct SelectedRole {
    pub role: Role,

    /// Permissions the role had that are not part of the tree. They were dropped.
    pub dropped_permissions: Vec<String>,

    /// Inherited ids that are not part of the tree. They are not locked.
    pub unknown_inherited: Vec<String>,
}


/// Result of [`apply_toggles`].
#[derive(Clone, Debug)]
pub struct ToggleOutcome {
    pub role: Role,

    /// Node ids that were skipped because they are inherited.
    pub skipped: Vec<String>,

    /// Whether the permissions differ from the ones the role started with.
    pub changed: bool,
}


/// Returns the inherited ids that do not occur in `tree`, warning about each of them.
pub fn unknown_inherited_ids<S>(tree: &PermissionTree, inherited_ids: &[S]) -> Vec<String>
where
    S: AsRef<str>,
{
    let mut unknown_ids = Vec::new();

    for inherited_id in inherited_ids {
        let inherited_id = inherited_id.as_ref();

        if !tree.contains(inherited_id) {
            warn!(
                permission = inherited_id,
                "Inherited permission is not part of the current tree, it will not be locked."
            );

            unknown_ids.push(inherited_id.to_string());
        }
    }

    unknown_ids
}


/// Picks a role from `directory` by name, or creates a new one if `role_name` is `None`.
///
/// Permissions of the role that do not exist in `tree` are dropped with a warning,
/// and `inherited_ids` become the role's inherited permissions.
pub fn select_role<S>(
    tree: &PermissionTree,
    directory: &mut RoleDirectory,
    role_name: Option<&str>,
    inherited_ids: &[S],
) -> Result<SelectedRole, RoleSelectionError>
where
    S: AsRef<str>,
{
    let role = match role_name {
        Some(role_name) => match directory.get_by_name(role_name) {
            Some(role) => role.clone(),
            None => {
                return Err(RoleSelectionError::UnknownRole {
                    name: role_name.to_string(),
                    available: directory
                        .iter()
                        .map(|role| role.name().to_string())
                        .collect(),
                });
            }
        },
        None => directory.create_role().clone(),
    };

    let (known_permissions, dropped_permissions) = tree.normalize(role.permissions());
    if !dropped_permissions.is_empty() {
        warn!(
            role = role.name(),
            unknown = %dropped_permissions.iter().join(", "),
            "Role has permissions that are not part of the current tree, ignoring them."
        );
    }

    let unknown_inherited = unknown_inherited_ids(tree, inherited_ids);
    let inherited_permissions =
        SelectionSet::from_ids(inherited_ids.iter().map(|id| id.as_ref().to_string()));

    Ok(SelectedRole {
        role: role
            .with_permissions(known_permissions)
            .with_inherited_permissions(inherited_permissions),
        dropped_permissions,
        unknown_inherited,
    })
}


/// Toggles `node_ids` in order.
///
/// Inherited (locked) nodes are skipped with a warning. An unknown node
/// aborts the whole batch.
pub fn apply_toggles<S>(
    tree: &PermissionTree,
    role: Role,
    policy: SelectionPolicy,
    node_ids: &[S],
) -> Result<ToggleOutcome, PermissionTreeError>
where
    S: AsRef<str>,
{
    let mut editor = RoleEditor::new(tree, role, policy);
    let mut skipped = Vec::new();

    for node_id in node_ids {
        match editor.toggle(node_id.as_ref()) {
            Ok(_) => {}
            Err(PermissionTreeError::Locked { id }) => {
                warn!(
                    node_id = id.as_str(),
                    "Permission is inherited and cannot be toggled, skipping."
                );

                skipped.push(id);
            }
            Err(error @ PermissionTreeError::NotFound { .. }) => return Err(error),
        }
    }

    let changed = editor.has_changes();

    info!(
        role = editor.role().name(),
        changed,
        policy = policy.name(),
        "Finished toggling."
    );

    Ok(ToggleOutcome {
        role: editor.into_role(),
        skipped,
        changed,
    })
}
