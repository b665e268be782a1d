use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};
use permtree::logging::initialize_tracing;
use permtree::tree_source::load_tree;
use permtree_configuration::{get_default_configuration_file_path, Configuration};
use permtree_core::PermissionTree;
use tracing::info;

mod cli;
mod commands;

use crate::cli::{CLIArgs, CLICommand};



fn load_configuration(arguments: &CLIArgs) -> Result<Configuration> {
    match arguments.configuration_file_path.as_ref() {
        Some(path) => Configuration::load_from_path(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to load configuration file at {}.", path.display())),
        None => {
            if get_default_configuration_file_path().exists() {
                Configuration::load_from_default_path()
                    .into_diagnostic()
                    .wrap_err("Failed to load configuration file at default path.")
            } else {
                Ok(Configuration::default())
            }
        }
    }
}


fn load_configured_tree(configuration: &Configuration) -> Result<PermissionTree> {
    let tree = load_tree(&configuration.tree.source)
        .into_diagnostic()
        .wrap_err("Failed to load permission tree.")?;

    info!(
        nodes = tree.len(),
        policy = configuration.tree.selection_policy.name(),
        "Permission tree ready."
    );

    Ok(tree)
}


fn main() -> Result<()> {
    // Parse CLI arguments.
    let arguments = CLIArgs::parse();

    // Load configuration.
    let configuration = load_configuration(&arguments)?;

    configuration
        .logging
        .create_log_file_output_directory_if_missing()
        .into_diagnostic()
        .wrap_err("Failed to create logging directory.")?;

    let guard = initialize_tracing(
        configuration.logging.console_output_level_filter(),
        configuration.logging.log_file_output_level_filter(),
        &configuration.logging.log_file_output_directory,
        "permtree.log",
    )
    .wrap_err("Failed to initialize tracing.")?;

    match configuration.configuration_file_path.as_ref() {
        Some(path) => info!(
            file_path = %path.display(),
            "Configuration loaded."
        ),
        None => info!("No configuration file found, using defaults."),
    }


    let result = match &arguments.command {
        CLICommand::Tree(tree_arguments) => load_configured_tree(&configuration)
            .and_then(|tree| commands::print_tree(&tree, tree_arguments)),
        CLICommand::Toggle(toggle_arguments) => {
            load_configured_tree(&configuration).and_then(|tree| {
                commands::toggle(
                    &tree,
                    configuration.tree.selection_policy,
                    toggle_arguments,
                )
            })
        }
        CLICommand::Roles => commands::list_roles(),
        CLICommand::Validate(validate_arguments) => commands::validate(validate_arguments),
    };


    drop(guard);

    result
}
