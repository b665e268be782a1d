//! Loading permission trees from configuration.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use permtree_configuration::TreeSource;
use permtree_core::{PermissionNode, PermissionTree, TreeConstructionError};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;


#[derive(Debug, Error)]
pub enum TreeLoadingError {
    #[error("unable to read tree file at {}", .path.display())]
    UnableToReadTreeFile {
        path: PathBuf,

        #[source]
        error: io::Error,
    },

    #[error(
        "tree file {} has an unsupported extension (expected .toml or .json)",
        .path.display()
    )]
    UnsupportedExtension { path: PathBuf },

    #[error("failed to parse tree file as TOML")]
    TomlParsingError {
        #[from]
        #[source]
        error: toml::de::Error,
    },

    #[error("failed to parse tree file as JSON")]
    JsonParsingError {
        #[from]
        #[source]
        error: serde_json::Error,
    },

    #[error("tree file does not describe a valid permission tree")]
    InvalidTree {
        #[from]
        #[source]
        error: TreeConstructionError,
    },
}


/// Top-level structure of a TOML tree file.
///
/// ```toml
/// [[roots]]
/// id = "customers"
/// label = "Customers"
///
/// [[roots.children]]
/// id = "customers.view"
/// label = "View"
/// ```
///
/// JSON tree files are simply an array of root nodes.
#[derive(Deserialize)]
struct TomlTreeFile {
    roots: Vec<PermissionNode>,
}


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TreeFileFormat {
    Toml,
    Json,
}

impl TreeFileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;

        if extension.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if extension.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}


pub fn parse_tree(contents: &str, format: TreeFileFormat) -> Result<PermissionTree, TreeLoadingError> {
    let roots = match format {
        TreeFileFormat::Toml => toml::from_str::<TomlTreeFile>(contents)?.roots,
        TreeFileFormat::Json => serde_json::from_str::<Vec<PermissionNode>>(contents)?,
    };

    Ok(PermissionTree::from_roots(roots)?)
}

pub fn load_tree_file<P>(path: P) -> Result<PermissionTree, TreeLoadingError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let format = TreeFileFormat::from_path(path).ok_or_else(|| {
        TreeLoadingError::UnsupportedExtension {
            path: path.to_path_buf(),
        }
    })?;

    let contents =
        fs::read_to_string(path).map_err(|error| TreeLoadingError::UnableToReadTreeFile {
            path: path.to_path_buf(),
            error,
        })?;

    let tree = parse_tree(&contents, format)?;

    debug!(
        path = %path.display(),
        nodes = tree.len(),
        "Loaded permission tree from file."
    );

    Ok(tree)
}

/// Loads the tree the configuration points at.
pub fn load_tree(source: &TreeSource) -> Result<PermissionTree, TreeLoadingError> {
    match source {
        TreeSource::Builtin(catalogue) => {
            debug!(
                catalogue = catalogue.name(),
                "Using built-in permission tree."
            );

            Ok(catalogue.tree())
        }
        TreeSource::File(path) => load_tree_file(path),
    }
}
