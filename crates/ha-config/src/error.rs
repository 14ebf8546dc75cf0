//! Error types for YAML document handling

use std::path::PathBuf;
use thiserror::Error;

/// Result type for document operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while reading, parsing or writing YAML documents
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Input file does not exist
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Failed to read a file
    #[error("failed to read file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML
    #[error("failed to parse YAML in {}: {source}", path.display())]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to scan the layout of a YAML source
    #[error("failed to scan YAML layout: {0}")]
    ScanYaml(#[from] yaml_rust2::scanner::ScanError),

    /// Failed to serialize YAML
    #[error("failed to serialize YAML: {0}")]
    SerializeYaml(#[source] serde_yaml::Error),

    /// Directory not found or not a directory
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Invalid file-name pattern
    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// A text edit does not fit the line it targets
    #[error("invalid edit at line {line}: {reason}")]
    InvalidEdit { line: usize, reason: String },
}
