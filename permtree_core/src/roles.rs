use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::RoleId;
use crate::selection::{LockedSet, SelectionSet};
use crate::tree::PermissionTree;


/// Name given to roles created through [`RoleDirectory::create_role`].
pub const NEW_ROLE_NAME: &str = "New Role";

/// Directory group given to roles created through [`RoleDirectory::create_role`].
pub const NEW_ROLE_AD_GROUP_NAME: &str = "EFX_NewRole_Group";


#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("role name cannot be empty")]
    EmptyRoleName,

    #[error("a role named \"{}\" already exists", .name)]
    DuplicateRoleName { name: String },

    #[error("no role with id {} exists", .id)]
    RoleNotFound { id: RoleId },
}



#[derive(Deserialize)]
struct UnvalidatedRole {
    id: RoleId,
    name: String,
    ad_group_name: String,
    #[serde(default)]
    permissions: SelectionSet,
    #[serde(default)]
    inherited_permissions: SelectionSet,
}

impl TryFrom<UnvalidatedRole> for Role {
    type Error = RoleError;

    fn try_from(role: UnvalidatedRole) -> Result<Self, Self::Error> {
        Ok(Role::new(role.id, role.name, role.ad_group_name)?
            .with_permissions(role.permissions)
            .with_inherited_permissions(role.inherited_permissions))
    }
}


/// A named set of granted permissions.
///
/// The selected permissions are replaced wholesale whenever they change
/// (see [`PermissionTree::toggle`]); the role never edits them in place.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(try_from = "UnvalidatedRole")]
pub struct Role {
    id: RoleId,

    name: String,

    /// Name of the directory (AD) group members of this role belong to.
    ad_group_name: String,

    /// Permissions granted to this role.
    permissions: SelectionSet,

    /// Permissions inherited from a parent role or profile.
    /// These are displayed, but cannot be edited through this role.
    inherited_permissions: SelectionSet,
}

impl Role {
    /// Creates a role with no permissions. The name must not be blank.
    pub fn new<N, G>(id: RoleId, name: N, ad_group_name: G) -> Result<Self, RoleError>
    where
        N: Into<String>,
        G: Into<String>,
    {
        let name = validate_role_name(name.into())?;

        Ok(Self {
            id,
            name,
            ad_group_name: ad_group_name.into(),
            permissions: SelectionSet::new_empty(),
            inherited_permissions: SelectionSet::new_empty(),
        })
    }

    pub fn with_permissions(mut self, permissions: SelectionSet) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_inherited_permissions(mut self, inherited_permissions: SelectionSet) -> Self {
        self.inherited_permissions = inherited_permissions;
        self
    }

    #[inline]
    pub fn id(&self) -> &RoleId {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ad_group_name(&self) -> &str {
        &self.ad_group_name
    }

    #[inline]
    pub fn permissions(&self) -> &SelectionSet {
        &self.permissions
    }

    #[inline]
    pub fn inherited_permissions(&self) -> &SelectionSet {
        &self.inherited_permissions
    }

    /// Replaces the role's selected permissions.
    pub fn set_permissions(&mut self, permissions: SelectionSet) {
        self.permissions = permissions;
    }

    /// Returns the nodes of `tree` this role is not allowed to edit.
    pub fn locked_node_ids(&self, tree: &PermissionTree) -> LockedSet {
        tree.locked_node_ids(self.inherited_permissions.iter())
    }
}


fn validate_role_name(name: String) -> Result<String, RoleError> {
    let trimmed_name = name.trim();

    if trimmed_name.is_empty() {
        return Err(RoleError::EmptyRoleName);
    }

    Ok(trimmed_name.to_string())
}



/// An ordered, in-memory collection of roles with unique (case-insensitive) names.
#[derive(Clone, Default, Debug)]
pub struct RoleDirectory {
    roles: Vec<Role>,
}

impl RoleDirectory {
    #[inline]
    pub fn new_empty() -> Self {
        Self { roles: Vec::new() }
    }

    /// Builds a directory from existing roles, rejecting duplicate names.
    pub fn from_roles(roles: Vec<Role>) -> Result<Self, RoleError> {
        let mut directory = Self::new_empty();

        for role in roles {
            directory.insert(role)?;
        }

        Ok(directory)
    }

    /// Adds a role, rejecting it if its name is already taken.
    pub fn insert(&mut self, role: Role) -> Result<&Role, RoleError> {
        if self.get_by_name(role.name()).is_some() {
            return Err(RoleError::DuplicateRoleName {
                name: role.name().to_string(),
            });
        }

        self.roles.push(role);

        let last_index = self.roles.len() - 1;
        Ok(&self.roles[last_index])
    }

    /// Creates a new empty role with a generated id.
    ///
    /// The role is named [`NEW_ROLE_NAME`], suffixed with a number
    /// if that name is already taken.
    pub fn create_role(&mut self) -> &Role {
        let mut name = NEW_ROLE_NAME.to_string();
        let mut suffix = 2usize;

        while self.get_by_name(&name).is_some() {
            name = format!("{} {}", NEW_ROLE_NAME, suffix);
            suffix += 1;
        }

        self.roles.push(Role {
            id: RoleId::generate(),
            name,
            ad_group_name: NEW_ROLE_AD_GROUP_NAME.to_string(),
            permissions: SelectionSet::new_empty(),
            inherited_permissions: SelectionSet::new_empty(),
        });

        let last_index = self.roles.len() - 1;
        &self.roles[last_index]
    }

    pub fn get(&self, id: &RoleId) -> Option<&Role> {
        self.roles.iter().find(|role| role.id() == id)
    }

    /// Looks a role up by its name, ignoring (Unicode) case and surrounding whitespace.
    pub fn get_by_name(&self, name: &str) -> Option<&Role> {
        let name = name.trim().to_lowercase();

        self.roles
            .iter()
            .find(|role| role.name().to_lowercase() == name)
    }

    pub fn rename<N>(&mut self, id: &RoleId, new_name: N) -> Result<(), RoleError>
    where
        N: Into<String>,
    {
        let new_name = validate_role_name(new_name.into())?;

        if let Some(existing) = self.get_by_name(&new_name) {
            if existing.id() != id {
                return Err(RoleError::DuplicateRoleName { name: new_name });
            }
        }

        let role = self.get_mut(id)?;
        role.name = new_name;

        Ok(())
    }

    /// Replaces the permissions of a role, e.g. with the result of a toggle.
    pub fn replace_permissions(
        &mut self,
        id: &RoleId,
        permissions: SelectionSet,
    ) -> Result<(), RoleError> {
        self.get_mut(id)?.set_permissions(permissions);

        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> + '_ {
        self.roles.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    fn get_mut(&mut self, id: &RoleId) -> Result<&mut Role, RoleError> {
        self.roles
            .iter_mut()
            .find(|role| role.id() == id)
            .ok_or_else(|| RoleError::RoleNotFound { id: id.clone() })
    }
}
