use std::{
    env::current_dir,
    path::{Path, PathBuf},
};


/// Returns the default configuration filepath, which is at
/// `{current directory}/data/configuration.toml`.
pub fn get_default_configuration_file_path() -> PathBuf {
    let mut configuration_filepath = current_dir().unwrap_or_else(|_| PathBuf::from("."));
    configuration_filepath.push("data/configuration.toml");

    configuration_filepath
}


/// Resolves `path` against `base_directory`, unless it is already absolute.
pub(crate) fn resolve_relative_to(base_directory: Option<&Path>, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    match base_directory {
        Some(base_directory) => base_directory.join(path),
        None => path.to_path_buf(),
    }
}
