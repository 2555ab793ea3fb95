//! Orphan connector error types

use thiserror::Error;
use xavyo_isc_client::IscError;

use crate::config::ConfigError;

/// Error returned to the connector host.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Connectivity check failed.
    #[error("Unable to connect to Identity Security Cloud")]
    UnableToConnect {
        #[source]
        source: IscError,
    },

    /// Account does not exist (or could not be read).
    #[error("account not found: {account_id}")]
    AccountNotFound { account_id: String },

    /// No identity matched the lookup.
    #[error("identity not found: {name}")]
    IdentityNotFound { name: String },

    /// Attribute change operation the connector does not handle.
    #[error("Operation not supported: {operation}")]
    UnsupportedOperation { operation: String },

    /// Host input cannot be applied.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Connector configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Upstream API error.
    #[error(transparent)]
    Client(#[from] IscError),
}

impl ConnectorError {
    /// Whether the failure came from a transient upstream condition.
    pub fn is_transient(&self) -> bool {
        match self {
            ConnectorError::Client(e) | ConnectorError::UnableToConnect { source: e } => {
                e.is_transient()
            }
            _ => false,
        }
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectorError::UnableToConnect { .. } => "UNABLE_TO_CONNECT",
            ConnectorError::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            ConnectorError::IdentityNotFound { .. } => "IDENTITY_NOT_FOUND",
            ConnectorError::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            ConnectorError::InvalidInput { .. } => "INVALID_INPUT",
            ConnectorError::Config(_) => "INVALID_CONFIG",
            ConnectorError::Client(IscError::Auth(_)) => "AUTH_FAILED",
            ConnectorError::Client(IscError::NotFound(_)) => "NOT_FOUND",
            ConnectorError::Client(IscError::Parse(_) | IscError::Json(_)) => "PARSE_ERROR",
            ConnectorError::Client(e) if e.is_transient() => "TRANSIENT_ERROR",
            ConnectorError::Client(_) => "API_ERROR",
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ConnectorError::InvalidInput {
            message: message.into(),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
