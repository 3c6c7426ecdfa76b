//! Configuration error types.

use std::path::PathBuf;

/// Errors from loading, saving or parsing `config.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file or its directory could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// File or directory that was being written.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for [`Config`](crate::Config).
    #[error("invalid config in {}: {source}", .path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// The config could not be turned into RON text.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] ron::Error),
}

impl ConfigError {
    /// Path of the file involved, if the error concerns one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } | Self::Parse { path, .. } => {
                Some(path.as_path())
            }
            Self::Serialize(_) => None,
        }
    }
}
