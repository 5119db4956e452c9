//! Error types for the mailer crate.

use std::time::Duration;

/// Errors that can occur while relaying an inquiry.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MailerError {
    /// A configured or submitted address could not be parsed.
    #[error("invalid {field} address '{value}': {reason}")]
    InvalidAddress {
        field: String,
        value: String,
        reason: String,
    },

    /// The outbound message could not be assembled.
    #[error("failed to build message: {0}")]
    Build(String),

    /// The relay answered with a negative reply (authentication, quota, policy).
    #[error("mail relay rejected the message: {0}")]
    Rejected(String),

    /// The relay could not be reached or the session broke down.
    #[error("mail relay unreachable: {0}")]
    Transport(String),

    /// No answer from the relay within the configured bound.
    #[error("mail relay timed out after {0:?}")]
    Timeout(Duration),
}
