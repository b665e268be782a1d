//! Command-line interface definitions for the `permtree` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use permtree_core::SelectionPolicy;


/// Command-line arguments.
#[derive(Parser)]
#[command(
    name = "permtree",
    author,
    about = "Inspect and edit dealing-desk role permissions.",
    version
)]
pub struct CLIArgs {
    /// This is the path to the configuration file to use.
    /// If unspecified, this defaults to `./data/configuration.toml`
    /// (or built-in defaults, if that file does not exist).
    #[arg(
        short = 'c',
        long = "configuration-file-path",
        global = true,
        help = "Path to the configuration file to use. Defaults to ./data/configuration.toml"
    )]
    pub configuration_file_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CLICommand,
}


#[derive(Subcommand)]
pub enum CLICommand {
    /// Print the permission tree, optionally with a role's selection.
    Tree(TreeArgs),

    /// Toggle permissions of a role and print the resulting selection.
    Toggle(ToggleArgs),

    /// List the built-in roles.
    Roles,

    /// Check that a TOML or JSON tree file describes a valid tree.
    Validate(ValidateArgs),
}


#[derive(Args)]
pub struct RoleSelectionArgs {
    /// Name of the role (case-insensitive).
    #[arg(short = 'r', long = "role")]
    pub role: Option<String>,

    /// Permission ids inherited by the role. These are shown, but cannot be toggled.
    #[arg(long = "inherited", value_name = "ID")]
    pub inherited: Vec<String>,
}


#[derive(Args)]
pub struct TreeArgs {
    #[command(flatten)]
    pub role_selection: RoleSelectionArgs,
}


#[derive(Args)]
pub struct ToggleArgs {
    #[command(flatten)]
    pub role_selection: RoleSelectionArgs,

    /// Overrides the configured selection policy.
    #[arg(long = "policy", value_enum)]
    pub policy: Option<PolicyArgument>,

    /// Print the resulting role as JSON instead of a list of ids.
    #[arg(long = "json", action = clap::ArgAction::SetTrue)]
    pub json: bool,

    /// Ids of the nodes to toggle, applied in order.
    #[arg(required = true, value_name = "NODE_ID")]
    pub node_ids: Vec<String>,
}


#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the tree file (`.toml` or `.json`).
    pub tree_file_path: PathBuf,
}


#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PolicyArgument {
    IncludeAncestors,
    SubtreeOnly,
}

impl From<PolicyArgument> for SelectionPolicy {
    fn from(argument: PolicyArgument) -> Self {
        match argument {
            PolicyArgument::IncludeAncestors => SelectionPolicy::IncludeAncestors,
            PolicyArgument::SubtreeOnly => SelectionPolicy::SubtreeOnly,
        }
    }
}
