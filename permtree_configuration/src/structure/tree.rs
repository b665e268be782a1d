use std::path::{Path, PathBuf};

use permtree_core::catalogue::BuiltinCatalogue;
use permtree_core::SelectionPolicy;
use serde::Deserialize;

use crate::traits::TryResolveWithContext;
use crate::utilities::resolve_relative_to;
use crate::TreeConfigurationError;


#[derive(Deserialize, Clone, Debug)]
pub(super) struct UnresolvedTreeConfiguration {
    /// Either the name of a built-in catalogue (e.g. `dealing-desk`)
    /// or a path to a TOML or JSON tree file.
    source: String,

    /// Overrides the selection policy. Built-in catalogues bring their own,
    /// tree files default to `include-ancestors`.
    #[serde(default)]
    selection_policy: Option<String>,
}


/// Where the permission tree comes from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TreeSource {
    Builtin(BuiltinCatalogue),

    /// Tree file, already resolved against the configuration file's directory.
    File(PathBuf),
}


#[derive(Clone, Debug)]
pub struct TreeConfiguration {
    pub source: TreeSource,

    pub selection_policy: SelectionPolicy,
}


impl<'r> TryResolveWithContext<'r> for UnresolvedTreeConfiguration {
    type Resolved = TreeConfiguration;
    type Context = Option<&'r Path>;
    type Error = TreeConfigurationError;

    fn try_resolve_with_context(
        self,
        context: Self::Context,
    ) -> Result<Self::Resolved, Self::Error> {
        let source_name = self.source.trim();

        if source_name.is_empty() {
            return Err(TreeConfigurationError::EmptyTreeSource);
        }

        let source = match BuiltinCatalogue::from_name(source_name) {
            Some(catalogue) => TreeSource::Builtin(catalogue),
            None => TreeSource::File(resolve_relative_to(
                context,
                Path::new(source_name),
            )),
        };

        let selection_policy = match self.selection_policy {
            Some(policy_name) => SelectionPolicy::from_name(policy_name.trim()).ok_or(
                TreeConfigurationError::UnknownSelectionPolicy { name: policy_name },
            )?,
            None => match &source {
                TreeSource::Builtin(catalogue) => catalogue.selection_policy(),
                TreeSource::File(_) => SelectionPolicy::default(),
            },
        };

        Ok(Self::Resolved {
            source,
            selection_policy,
        })
    }
}


impl Default for TreeConfiguration {
    fn default() -> Self {
        let catalogue = BuiltinCatalogue::DealingDesk;

        Self {
            source: TreeSource::Builtin(catalogue),
            selection_policy: catalogue.selection_policy(),
        }
    }
}
