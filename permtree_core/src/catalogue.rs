//! Built-in permission trees and fixture roles of the dealing desk.

use serde::{Deserialize, Serialize};

use crate::id::RoleId;
use crate::roles::Role;
use crate::selection::{SelectionPolicy, SelectionSet};
use crate::tree::{PermissionNode, PermissionTree};


/// Trees that ship with the crate.
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum BuiltinCatalogue {
    /// The role-management permission tree.
    #[serde(rename = "dealing-desk")]
    DealingDesk,

    /// Action types used to filter the event log.
    #[serde(rename = "event-log")]
    EventLog,
}

impl BuiltinCatalogue {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dealing-desk" => Some(Self::DealingDesk),
            "event-log" => Some(Self::EventLog),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DealingDesk => "dealing-desk",
            Self::EventLog => "event-log",
        }
    }

    #[rustfmt::skip]
    pub fn description(&self) -> &'static str {
        match self {
            Self::DealingDesk =>
                "Permissions that can be granted to dealing-desk roles.",
            Self::EventLog =>
                "Event log action types, used as a filter.",
        }
    }

    /// The selection policy the screens using this tree apply.
    pub fn selection_policy(&self) -> SelectionPolicy {
        match self {
            Self::DealingDesk => SelectionPolicy::IncludeAncestors,
            Self::EventLog => SelectionPolicy::SubtreeOnly,
        }
    }

    pub fn tree(&self) -> PermissionTree {
        match self {
            Self::DealingDesk => dealing_desk_permissions(),
            Self::EventLog => event_action_types(),
        }
    }
}


/// Shorthand for a node whose children are all leaves named `{id}{separator}{suffix}`.
fn group(id: &str, label: &str, separator: char, leaves: &[(&str, &str)]) -> PermissionNode {
    PermissionNode::branch(
        id,
        label,
        leaves
            .iter()
            .map(|(suffix, leaf_label)| {
                PermissionNode::leaf(format!("{}{}{}", id, separator, suffix), *leaf_label)
            })
            .collect(),
    )
}

fn category(id: &str, label: &str, leaves: &[(&str, &str)]) -> PermissionNode {
    group(id, label, '.', leaves)
}

fn action_group(id: &str, label: &str, leaves: &[(&str, &str)]) -> PermissionNode {
    group(id, label, '-', leaves)
}

fn view_and_manage(id: &str, label: &str) -> PermissionNode {
    category(id, label, &[("view", "View"), ("manage", "Manage")])
}

fn view_create_cancel(id: &str, label: &str) -> PermissionNode {
    category(
        id,
        label,
        &[("view", "View"), ("create", "Create"), ("cancel", "Cancel")],
    )
}


pub fn dealing_desk_permission_nodes() -> Vec<PermissionNode> {
    vec![
        category(
            "customers",
            "Customers",
            &[("view", "View"), ("update", "Update"), ("enroll", "Enroll")],
        ),
        category(
            "users",
            "Users",
            &[("view", "View"), ("lock", "Lock/Unlock")],
        ),
        category(
            "rolePermissions",
            "Role Permissions",
            &[("view", "View"), ("map", "Map")],
        ),
        PermissionNode::branch(
            "transactions",
            "Transactions",
            vec![
                view_create_cancel("transactions.spot", "Spot"),
                view_create_cancel("transactions.forward", "Forward"),
                view_create_cancel("transactions.deposit", "Deposit"),
            ],
        ),
        PermissionNode::branch(
            "management",
            "Management",
            vec![
                view_and_manage("management.currencyPairs", "Currency Pairs"),
                view_and_manage("management.marginGroups", "Margin Groups"),
                view_and_manage("management.businessParams", "Business Parameters"),
                view_and_manage("management.technicalParams", "Technical Parameters"),
            ],
        ),
        category(
            "chat",
            "Chat",
            &[("start", "Start"), ("takePart", "Take Part"), ("history", "History")],
        ),
        category(
            "reports",
            "Reports",
            &[("activity", "Activity"), ("groups", "Groups"), ("events", "Events")],
        ),
    ]
}

/// Event log action types. Ids here are hyphen-separated, unlike the permission tree.
pub fn event_action_type_nodes() -> Vec<PermissionNode> {
    let lifecycle = [
        ("create", "Create"),
        ("update", "Update"),
        ("activation", "Activation"),
        ("deactivation", "Deactivation"),
    ];

    vec![
        action_group(
            "user-visit",
            "User Visit",
            &[("enter", "Enter"), ("exit", "Exit")],
        ),
        action_group(
            "dealer",
            "Dealer",
            &[("login", "Login"), ("logout", "Logout")],
        ),
        action_group(
            "transaction",
            "Transaction",
            &[("spot", "Spot"), ("forward", "Forward"), ("deposit", "Deposit")],
        ),
        action_group(
            "alert",
            "Alert",
            &[("create", "Create"), ("delete", "Delete"), ("activation", "Activation")],
        ),
        action_group(
            "standing-order",
            "Standing Order",
            &[("create", "Create"), ("delete", "Delete"), ("execution", "Execution")],
        ),
        action_group(
            "conditional-order",
            "Conditional Order",
            &[
                ("create", "Create"),
                ("update", "Update"),
                ("delete", "Delete"),
                ("execution", "Execution"),
            ],
        ),
        action_group("customer", "Customer", &lifecycle),
        action_group("customer-agreement", "Customer Agreement", &lifecycle),
    ]
}

/// The role-management permission tree.
pub fn dealing_desk_permissions() -> PermissionTree {
    // PANIC SAFETY: the built-in nodes have unique, non-empty ids (covered by tests below).
    PermissionTree::from_roots(dealing_desk_permission_nodes())
        .expect("built-in dealing desk tree is valid")
}

/// The event log action type filter tree.
pub fn event_action_types() -> PermissionTree {
    // PANIC SAFETY: the built-in nodes have unique, non-empty ids (covered by tests below).
    PermissionTree::from_roots(event_action_type_nodes())
        .expect("built-in event action type tree is valid")
}


/// The roles the dealing desk starts out with.
///
/// These are fixture values: their permission sets list only leaves,
/// so their category nodes show up as partially selected.
pub fn default_roles() -> Vec<Role> {
    vec![
        role(
            "1",
            "Admin",
            "EFX_Admin_Group",
            &["customers.view", "customers.update", "customers.enroll"],
        ),
        role(
            "2",
            "Main Dealer",
            "EFX_MainDealer_Group",
            &[
                "customers.view",
                "transactions.spot.view",
                "transactions.spot.create",
            ],
        ),
        role(
            "3",
            "Senior Dealer",
            "EFX_SeniorDealer_Group",
            &["customers.view", "transactions.spot.view"],
        ),
        role("4", "Dealer", "EFX_Dealer_Group", &["customers.view"]),
    ]
}

fn role(id: &str, name: &str, ad_group_name: &str, permissions: &[&str]) -> Role {
    // PANIC SAFETY: all fixture names are non-empty.
    Role::new(RoleId::new(id), name, ad_group_name)
        .expect("fixture role names are non-empty")
        .with_permissions(SelectionSet::from_ids(permissions.iter().copied()))
}
