//! CLI error types.

use std::path::PathBuf;

use calagg_api::{ApiError, ApiErrorKind};
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing, unreadable or incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// A `pass::` or `env::` reference could not be resolved.
    #[error("secret resolution failed: {0}")]
    Secret(String),

    /// Bad command-line input (unparseable time, malformed event file).
    #[error("invalid input: {0}")]
    Input(String),

    /// The API call failed.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Reading or writing a local file failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    ///
    /// Credential problems get their own code so scripts can tell "log in
    /// again" apart from other failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Api(err) => match err.kind() {
                ApiErrorKind::CredentialsMissing
                | ApiErrorKind::AuthenticationFailure
                | ApiErrorKind::AuthorizationFailure => 3,
                _ => 1,
            },
            Self::Config(_) | Self::Secret(_) | Self::Input(_) => 2,
            Self::Io { .. } => 1,
        }
    }
}
