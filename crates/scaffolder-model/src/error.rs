//! Error types for metadata loading.

use std::path::PathBuf;

/// Errors that can occur while loading a metadata document.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// JSON parse or shape error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error reading the metadata file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata file not found.
    #[error("metadata file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// File extension does not map to a known document format.
    #[error("unsupported metadata format: '{extension}' (expected json, yaml, yml or toml)")]
    UnsupportedFormat {
        /// The offending extension.
        extension: String,
    },

    /// `${VAR}` interpolation failed.
    #[error("environment expansion failed: {detail}")]
    EnvExpand {
        /// Description of the failure.
        detail: String,
    },
}

/// Result type for metadata operations.
pub type Result<T> = std::result::Result<T, ModelError>;
