use thiserror::Error;

use crate::ErrorType;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to open {port}: {source}")]
    Connection {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Connect to a serial port first.")]
    NotConnected,

    #[error("Disconnect from the current port first.")]
    AlreadyConnected,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Modal category for pre-condition failures. `Io` errors are reported
    /// inline in the session log instead, so they have no modal.
    pub fn error_type(&self) -> ErrorType {
        match self {
            SessionError::Validation(_) => ErrorType::ValidationError,
            SessionError::Connection { .. } => ErrorType::ConnectionError,
            SessionError::NotConnected => ErrorType::NotConnected,
            SessionError::AlreadyConnected => ErrorType::AlreadyConnected,
            SessionError::Io(_) => ErrorType::None,
        }
    }
}
