//! Error types for manifest operations.
//!
//! Covers every failure mode of loading, saving and compiling a manifest:
//! I/O, serialization, manifest structure and option declarations.

use std::path::PathBuf;

use argdispatch_core::ConfigError;
use thiserror::Error;

/// Errors that can occur while handling manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The option declarations are invalid.
    #[error("invalid option declarations: {0}")]
    ConfigError(#[from] ConfigError),

    /// Manifest structure failure (e.g., empty version).
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// File extension is not one of `.yml`, `.yaml` or `.json`.
    #[error("unsupported manifest format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Convenience alias for results with [`ManifestError`].
pub type Result<T> = std::result::Result<T, ManifestError>;
