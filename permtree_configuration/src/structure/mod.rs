use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

mod logging;
mod tree;

pub use logging::*;
pub use tree::*;

use crate::traits::TryResolveWithContext;
use crate::utilities::get_default_configuration_file_path;
use crate::{ConfigurationLoadingError, ConfigurationResolutionError};



#[derive(Deserialize, Debug)]
pub(crate) struct UnresolvedConfiguration {
    /// Logging-related configuration.
    logging: UnresolvedLoggingConfiguration,

    /// Which permission tree to work with, and how selections behave in it.
    tree: UnresolvedTreeConfiguration,
}


/// The entire permtree configuration.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    /// This is the file path this [`Configuration`] instance was loaded from,
    /// or `None` if it was built from defaults.
    pub configuration_file_path: Option<PathBuf>,

    /// Logging-related configuration.
    pub logging: LoggingConfiguration,

    /// Permission tree configuration.
    pub tree: TreeConfiguration,
}



pub(crate) struct ConfigurationResolutionContext {
    configuration_file_path: Option<PathBuf>,
}


impl<'r> TryResolveWithContext<'r> for UnresolvedConfiguration {
    type Resolved = Configuration;
    type Context = ConfigurationResolutionContext;
    type Error = ConfigurationResolutionError;

    fn try_resolve_with_context(
        self,
        context: Self::Context,
    ) -> Result<Self::Resolved, Self::Error> {
        // Relative paths in the configuration are relative to the file they were written in.
        let base_directory = context
            .configuration_file_path
            .as_deref()
            .and_then(Path::parent);

        let logging = self.logging.try_resolve_with_context(base_directory)?;
        let tree = self.tree.try_resolve_with_context(base_directory)?;

        Ok(Configuration {
            configuration_file_path: context.configuration_file_path,
            logging,
            tree,
        })
    }
}


impl Configuration {
    /// Load the configuration from a specific file path.
    pub fn load_from_path<S: AsRef<Path>>(
        configuration_file_path: S,
    ) -> Result<Self, ConfigurationLoadingError> {
        // Read the configuration file into memory as a string.
        let configuration_string =
            fs::read_to_string(configuration_file_path.as_ref()).map_err(|error| {
                ConfigurationLoadingError::UnableToReadConfigurationFile {
                    path: configuration_file_path.as_ref().to_path_buf(),
                    error,
                }
            })?;

        let canonical_configuration_file_path = dunce::canonicalize(configuration_file_path.as_ref())
            .unwrap_or_else(|_| configuration_file_path.as_ref().to_path_buf());

        Self::load_from_str(
            &configuration_string,
            Some(canonical_configuration_file_path),
        )
    }

    /// Parse and resolve the configuration from a TOML string.
    ///
    /// `configuration_file_path` is used to resolve relative paths; if `None`,
    /// they are left relative to the current directory.
    pub fn load_from_str(
        configuration_string: &str,
        configuration_file_path: Option<PathBuf>,
    ) -> Result<Self, ConfigurationLoadingError> {
        // Parse the string into the [`UnresolvedConfiguration`] structure and then resolve it.
        let unresolved_configuration =
            toml::from_str::<UnresolvedConfiguration>(configuration_string)
                .map_err(|error| ConfigurationLoadingError::ParsingError { error })?;

        let resolved_configuration =
            unresolved_configuration.try_resolve_with_context(ConfigurationResolutionContext {
                configuration_file_path,
            })?;

        Ok(resolved_configuration)
    }

    /// Load the configuration from the default path (`./data/configuration.toml`).
    pub fn load_from_default_path() -> Result<Self, ConfigurationLoadingError> {
        Configuration::load_from_path(get_default_configuration_file_path())
    }
}
