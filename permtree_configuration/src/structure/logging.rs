use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::traits::TryResolveWithContext;
use crate::utilities::resolve_relative_to;
use crate::{LoggingConfigurationError, MissingLoggingDirectoryCreationError};


#[derive(Deserialize, Clone, Debug)]
pub(super) struct UnresolvedLoggingConfiguration {
    console_output_level_filter: String,

    log_file_output_level_filter: String,

    log_file_output_directory: String,
}


#[derive(Clone, Debug)]
pub struct LoggingConfiguration {
    pub console_output_level_filter: String,

    pub log_file_output_level_filter: String,

    /// Directory the log file is written into.
    /// Relative paths are resolved against the configuration file's directory.
    pub log_file_output_directory: PathBuf,
}


impl<'r> TryResolveWithContext<'r> for UnresolvedLoggingConfiguration {
    type Resolved = LoggingConfiguration;
    type Context = Option<&'r Path>;
    type Error = LoggingConfigurationError;

    fn try_resolve_with_context(
        self,
        context: Self::Context,
    ) -> Result<Self::Resolved, Self::Error> {
        // Validate the file and console level filters.
        validate_filter(&self.console_output_level_filter, "console")?;
        validate_filter(&self.log_file_output_level_filter, "log file")?;

        let log_file_output_directory =
            resolve_relative_to(context, Path::new(&self.log_file_output_directory));

        Ok(Self::Resolved {
            console_output_level_filter: self.console_output_level_filter,
            log_file_output_level_filter: self.log_file_output_level_filter,
            log_file_output_directory,
        })
    }
}

fn validate_filter(filter: &str, kind: &'static str) -> Result<(), LoggingConfigurationError> {
    EnvFilter::try_new(filter)
        .map(|_| ())
        .map_err(|error| LoggingConfigurationError::InvalidTracingFilter {
            invalid_filter: filter.to_string(),
            kind: kind.into(),
            error,
        })
}


impl Default for LoggingConfiguration {
    fn default() -> Self {
        Self {
            console_output_level_filter: "info".to_string(),
            log_file_output_level_filter: "debug".to_string(),
            log_file_output_directory: PathBuf::from("./data/logs"),
        }
    }
}

impl LoggingConfiguration {
    pub fn console_output_level_filter(&self) -> EnvFilter {
        // PANIC SAFETY: This is safe because we checked that the input is valid in `try_resolve_with_context`.
        EnvFilter::try_new(&self.console_output_level_filter).unwrap()
    }

    pub fn log_file_output_level_filter(&self) -> EnvFilter {
        // PANIC SAFETY: This is safe because we checked that the input is valid in `try_resolve_with_context`.
        EnvFilter::try_new(&self.log_file_output_level_filter).unwrap()
    }

    pub fn create_log_file_output_directory_if_missing(
        &self,
    ) -> Result<(), MissingLoggingDirectoryCreationError> {
        if self.log_file_output_directory.exists() && !self.log_file_output_directory.is_dir() {
            return Err(MissingLoggingDirectoryCreationError::NotADirectory {
                path: self.log_file_output_directory.clone(),
            });
        }

        std::fs::create_dir_all(&self.log_file_output_directory).map_err(|error| {
            MissingLoggingDirectoryCreationError::UnableToCreateDirectory {
                directory_path: self.log_file_output_directory.clone(),
                error,
            }
        })
    }
}
