//! Errors raised while loading walkthrough authoring files

use std::path::PathBuf;
use thiserror::Error;

/// Problems with an authored walkthrough definition.
///
/// Missing references are not errors. A trigger or visual that names an
/// unknown object loads fine and never participates.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("failed to read walkthrough file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse walkthrough definition: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("entity '{entity}' has unknown parent '{parent}'")]
    UnknownParent { entity: String, parent: String },

    #[error("entity '{0}' is its own ancestor")]
    ParentCycle(String),
}
