#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use deprecator_core::AppError;
use derive_more::{Display, From};

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Configuration file could not be parsed as YAML.
    #[display("Config Error: {}", _0)]
    Yaml(serde_yaml::Error),

    /// Configuration file could not be parsed as JSON, or the report could not be encoded.
    #[display("JSON Error: {}", _0)]
    Json(serde_json::Error),

    /// Error raised by the patcher itself.
    #[display("{}", _0)]
    Core(AppError),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
