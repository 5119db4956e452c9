//! Mail transport abstraction.
//!
//! Separates message composition from the wire so the relay client can be
//! driven by SMTP in production and by in-process fakes in tests.

use std::fmt;

use async_trait::async_trait;

use crate::MailerError;

/// A fully composed message, independent of any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    /// Address replies should go to, when the inquirer supplied a usable one.
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Opaque identifier of a message the relay accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryId(pub String);

impl DeliveryId {
    /// Creates a `DeliveryId` from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery of composed messages to an external relay.
///
/// Implementations must be `Send + Sync` to be shared across request tasks.
///
/// # Cancel Safety
/// Dropping a pending future abandons the attempt. The relay may or may not
/// have accepted the message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Make exactly one delivery attempt.
    ///
    /// # Errors
    /// Returns [`MailerError::InvalidAddress`] if an address does not parse,
    /// [`MailerError::Rejected`] on a negative relay reply and
    /// [`MailerError::Transport`] if the relay cannot be reached.
    async fn deliver(&self, mail: &OutgoingMail) -> Result<DeliveryId, MailerError>;

    /// Open a session with the relay and authenticate, without sending.
    ///
    /// # Errors
    /// Returns [`MailerError::Rejected`] or [`MailerError::Transport`] if no
    /// usable session can be established.
    async fn verify(&self) -> Result<(), MailerError>;
}
