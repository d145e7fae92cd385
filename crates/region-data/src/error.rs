use std::path::{Path, PathBuf};

/// Errors that abort an aggregation.
///
/// Missing image assets are not errors; see [`crate::assets::AssetWarning`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A required localized text file is absent.
    #[error("missing content file {file} for {entity}")]
    MissingContent { file: PathBuf, entity: PathBuf },

    /// A `data.json` file is absent, unreadable or does not parse.
    #[error("malformed metadata in {file}: {detail}")]
    MalformedMetadata { file: PathBuf, detail: String },

    /// An I/O failure other than a clean end of file.
    #[error("read {file}: {source}")]
    Read {
        file: PathBuf,
        source: std::io::Error,
    },

    /// A collection directory exists but could not be listed.
    #[error("list collection {dir}: {source}")]
    Collection {
        dir: PathBuf,
        source: std::io::Error,
    },

    /// A child entity failed to load; `path` is that entity's directory.
    #[error("load {path}: {source}")]
    Entity {
        path: PathBuf,
        source: Box<LoadError>,
    },

    /// The aggregation was cancelled before it finished.
    #[error("aggregation cancelled")]
    Cancelled,
}

impl LoadError {
    /// Wrap `self` with the directory of the entity being loaded.
    ///
    /// Cancellation is never wrapped so that a cancelled run surfaces exactly
    /// one [`LoadError::Cancelled`].
    pub fn in_entity(self, path: &Path) -> Self {
        match self {
            LoadError::Cancelled => LoadError::Cancelled,
            other => LoadError::Entity {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with every [`LoadError::Entity`] layer removed.
    pub fn root_cause(&self) -> &LoadError {
        let mut current = self;
        while let LoadError::Entity { source, .. } = current {
            current = source;
        }
        current
    }

    /// The outermost entity directory this error was raised in, if any.
    pub fn entity_path(&self) -> Option<&Path> {
        match self {
            LoadError::Entity { path, .. } => Some(path),
            LoadError::MissingContent { entity, .. } => Some(entity),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }
}
