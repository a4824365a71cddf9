//! Error types for SMTP operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type for SMTP operations
pub type SmtpResult<T> = Result<T, SmtpError>;

/// Errors that can occur while composing or sending mail
#[derive(Debug, Error)]
pub enum SmtpError {
    /// `send` was called before `set_sender`
    #[error("Sender is not defined")]
    SenderNotDefined,

    /// `send` was called before `set_recipients`
    #[error("Destination is not defined")]
    RecipientsNotDefined,

    /// Invalid email address
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// An attachment file could not be read
    #[error("Failed to read attachment {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection failed
    #[error("Failed to connect to SMTP server: {0}")]
    ConnectionFailed(String),

    /// TLS error
    #[error("TLS error: {0}")]
    TlsError(String),

    /// Authentication failed
    #[error("SMTP authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to send message to a recipient
    #[error("Failed to send message to {recipient}: {reason}")]
    SendFailed { recipient: String, reason: String },

    /// Message building error
    #[error("Failed to build message: {0}")]
    MessageBuildError(String),
}
