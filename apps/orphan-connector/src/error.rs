//! CLI error types and exit codes

use thiserror::Error;
use xavyo_connector_orphan::{ConfigError, ConnectorError};
use xavyo_isc_client::IscError;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication failed
/// - 3: Network error
/// - 4: Validation error
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Io(_) | CliError::Output(_) => 1,
            CliError::Validation(_) => 4,
            CliError::Connector(e) => match e {
                ConnectorError::UnableToConnect { .. } => 3,
                ConnectorError::AccountNotFound { .. }
                | ConnectorError::IdentityNotFound { .. }
                | ConnectorError::UnsupportedOperation { .. }
                | ConnectorError::InvalidInput { .. } => 4,
                ConnectorError::Config(_) => 1,
                ConnectorError::Client(client) => client_exit_code(client),
            },
        }
    }

    /// Stable classification code printed with the error
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "INVALID_CONFIG",
            CliError::Io(_) => "IO_ERROR",
            CliError::Output(_) => "OUTPUT_ERROR",
            CliError::Validation(_) => "INVALID_INPUT",
            CliError::Connector(e) => e.error_code(),
        }
    }

    /// Print the error and its causes to stderr
    pub fn print(&self) {
        eprintln!("Error [{}]: {self}", self.code());

        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
    }
}

fn client_exit_code(error: &IscError) -> i32 {
    match error {
        IscError::Auth(_) => 2,
        IscError::Network(_) => 3,
        _ => match error.status() {
            Some(429) => 3,
            Some(401 | 403) => 2,
            Some(status) if status >= 500 => 5,
            Some(_) => 4,
            None => 1,
        },
    }
}
