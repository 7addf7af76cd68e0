//! CLI error types.

use std::path::PathBuf;

use mdweave_config::ConfigError;
use mdweave_filter::FilterError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("failed to read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Filter(#[from] FilterError),

    #[error("failed to write document: {0}")]
    Json(#[from] serde_json::Error),
}
