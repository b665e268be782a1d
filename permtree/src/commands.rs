use itertools::Itertools;
use miette::{Context, IntoDiagnostic, Result};
use permtree::render::render_tree;
use permtree::session::{apply_toggles, select_role, unknown_inherited_ids};
use permtree::tree_source::load_tree_file;
use permtree_core::catalogue::default_roles;
use permtree_core::{PermissionTree, RoleDirectory, SelectionPolicy, SelectionSet};

use crate::cli::{ToggleArgs, TreeArgs, ValidateArgs};



fn role_directory() -> Result<RoleDirectory> {
    RoleDirectory::from_roles(default_roles())
        .into_diagnostic()
        .wrap_err("Failed to set up role directory.")
}


pub fn print_tree(tree: &PermissionTree, arguments: &TreeArgs) -> Result<()> {
    let role_selection = &arguments.role_selection;

    let (selected, locked) = match role_selection.role.as_deref() {
        Some(role_name) => {
            let mut directory = role_directory()?;
            let role = select_role(tree, &mut directory, Some(role_name), &role_selection.inherited)
                .into_diagnostic()?
                .role;

            println!("Role: {} ({})", role.name(), role.ad_group_name());
            (role.permissions().clone(), role.locked_node_ids(tree))
        }
        None => {
            unknown_inherited_ids(tree, &role_selection.inherited);

            (
                SelectionSet::new_empty(),
                tree.locked_node_ids(role_selection.inherited.iter()),
            )
        }
    };

    print!("{}", render_tree(tree, &selected, &locked));

    Ok(())
}


pub fn toggle(
    tree: &PermissionTree,
    configured_policy: SelectionPolicy,
    arguments: &ToggleArgs,
) -> Result<()> {
    let mut directory = role_directory()?;
    let role = select_role(
        tree,
        &mut directory,
        arguments.role_selection.role.as_deref(),
        &arguments.role_selection.inherited,
    )
    .into_diagnostic()?
    .role;

    let policy = arguments
        .policy
        .map(SelectionPolicy::from)
        .unwrap_or(configured_policy);

    let outcome = apply_toggles(tree, role, policy, &arguments.node_ids)
        .into_diagnostic()
        .wrap_err("Failed to toggle permissions.")?;

    if arguments.json {
        let serialized_role = serde_json::to_string_pretty(&outcome.role)
            .into_diagnostic()
            .wrap_err("Failed to serialize role.")?;

        println!("{}", serialized_role);
    } else {
        for permission in outcome.role.permissions().iter() {
            println!("{}", permission);
        }
    }

    Ok(())
}


pub fn list_roles() -> Result<()> {
    let directory = role_directory()?;

    for role in directory.iter() {
        println!(
            "{:<4} {:<16} {:<24} {} permission(s): {}",
            role.id(),
            role.name(),
            role.ad_group_name(),
            role.permissions().len(),
            role.permissions().iter().join(", ")
        );
    }

    Ok(())
}


pub fn validate(arguments: &ValidateArgs) -> Result<()> {
    let tree = load_tree_file(&arguments.tree_file_path)
        .into_diagnostic()
        .wrap_err_with(|| {
            format!(
                "{} is not a valid permission tree.",
                arguments.tree_file_path.display()
            )
        })?;

    let maximum_depth = tree.iter().map(|node| node.depth()).max().unwrap_or(0);

    println!(
        "{} is valid: {} node(s) in {} root(s), maximum depth {}.",
        arguments.tree_file_path.display(),
        tree.len(),
        tree.roots().count(),
        maximum_depth
    );

    Ok(())
}
