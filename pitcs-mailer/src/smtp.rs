//! SMTP relay transport over implicit TLS.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use pitcs_core::RelayConfig;
use uuid::Uuid;

use crate::transport::{DeliveryId, MailTransport, OutgoingMail};
use crate::MailerError;

/// Authenticated SMTP submission to a single relay host.
///
/// Connections are pooled and reused across sends.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    timeout: Duration,
}

impl SmtpRelay {
    /// Prepare a relay session factory from configuration. Does not connect.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns [`MailerError::Transport`] if TLS parameters for the host
    /// cannot be prepared.
    pub fn new(config: &RelayConfig) -> Result<Self, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| {
                MailerError::Transport(format!("cannot prepare TLS for {}: {e}", config.host))
            })?
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .timeout(Some(config.timeout))
            .build();

        Ok(Self { transport, host: config.host.clone(), timeout: config.timeout })
    }

    fn classify(&self, err: &SmtpError) -> MailerError {
        if err.is_timeout() {
            MailerError::Timeout(self.timeout)
        } else if err.is_permanent() || err.is_transient() {
            MailerError::Rejected(err.to_string())
        } else {
            MailerError::Transport(format!("{}: {err}", self.host))
        }
    }
}

#[async_trait]
impl MailTransport for SmtpRelay {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<DeliveryId, MailerError> {
        let (message, id) = build_message(mail)?;
        let response = self.transport.send(message).await.map_err(|e| self.classify(&e))?;
        tracing::debug!(
            host = %self.host,
            code = %response.code(),
            delivery_id = %id,
            "relay accepted message"
        );
        Ok(id)
    }

    async fn verify(&self) -> Result<(), MailerError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailerError::Transport(format!(
                "{} did not accept the session",
                self.host
            ))),
            Err(e) => Err(self.classify(&e)),
        }
    }
}

/// Convert a composed message into a MIME `multipart/alternative` message.
///
/// The returned [`DeliveryId`] is the `Message-ID` assigned to the message.
///
/// # Errors
/// Returns [`MailerError::InvalidAddress`] if the sender, recipient or
/// reply-to address does not parse, or [`MailerError::Build`] if the message
/// cannot be assembled.
pub fn build_message(mail: &OutgoingMail) -> Result<(Message, DeliveryId), MailerError> {
    let from = parse_mailbox("sender", &mail.from)?;
    let to = parse_mailbox("recipient", &mail.to)?;
    let id = DeliveryId::new(format!("<{}@{}>", Uuid::new_v4(), from.email.domain()));

    let mut builder = Message::builder()
        .message_id(Some(id.0.clone()))
        .from(from)
        .to(to)
        .subject(mail.subject.clone());
    if let Some(reply_to) = &mail.reply_to {
        builder = builder.reply_to(parse_mailbox("reply-to", reply_to)?);
    }

    let message = builder
        .multipart(MultiPart::alternative_plain_html(mail.text.clone(), mail.html.clone()))
        .map_err(|e| MailerError::Build(e.to_string()))?;
    Ok((message, id))
}

fn parse_mailbox(field: &str, value: &str) -> Result<Mailbox, MailerError> {
    value
        .trim()
        .parse()
        .map_err(|e: lettre::address::AddressError| MailerError::InvalidAddress {
            field: field.to_owned(),
            value: value.to_owned(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use pitcs_core::AppConfig;

    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "bot@example.com".to_owned(),
            to: "hr@example.com".to_owned(),
            reply_to: Some("ana@x.com".to_owned()),
            subject: "New Website Inquiry: Sales from Ana".to_owned(),
            text: "Name: Ana\n".to_owned(),
            html: "<p><strong>Name:</strong> Ana</p>\n".to_owned(),
        }
    }

    fn formatted(mail: &OutgoingMail) -> (String, DeliveryId) {
        match build_message(mail) {
            Ok((message, id)) => (String::from_utf8_lossy(&message.formatted()).into_owned(), id),
            Err(e) => panic!("failed to build message: {e}"),
        }
    }

    #[test]
    fn built_message_carries_envelope_headers() {
        let (raw, _) = formatted(&mail());
        assert!(raw.contains("From: bot@example.com"), "missing From:\n{raw}");
        assert!(raw.contains("To: hr@example.com"), "missing To:\n{raw}");
        assert!(raw.contains("Reply-To: ana@x.com"), "missing Reply-To:\n{raw}");
        assert!(
            raw.contains("Subject: New Website Inquiry: Sales from Ana"),
            "missing Subject:\n{raw}"
        );
        assert!(raw.contains("multipart/alternative"), "expected alternative parts:\n{raw}");
    }

    #[test]
    fn delivery_id_is_the_message_id() {
        let (raw, id) = formatted(&mail());
        assert!(id.0.starts_with('<') && id.0.ends_with("@example.com>"), "unexpected id {id}");
        assert!(raw.contains(&id.0), "Message-ID header must match the delivery id");
    }

    #[test]
    fn message_without_reply_to_omits_header() {
        let (raw, _) = formatted(&OutgoingMail { reply_to: None, ..mail() });
        assert!(!raw.contains("Reply-To:"), "unexpected Reply-To:\n{raw}");
    }

    #[test]
    fn unset_sender_is_invalid_address() {
        let result = build_message(&OutgoingMail { from: String::new(), ..mail() });
        match result {
            Err(MailerError::InvalidAddress { field, .. }) => assert_eq!(field, "sender"),
            Err(other) => panic!("expected InvalidAddress, got {other:?}"),
            Ok(_) => panic!("expected InvalidAddress, got a message"),
        }
    }

    #[test]
    fn unset_recipient_is_invalid_address() {
        let result = build_message(&OutgoingMail { to: "  ".to_owned(), ..mail() });
        match result {
            Err(MailerError::InvalidAddress { field, .. }) => assert_eq!(field, "recipient"),
            Err(other) => panic!("expected InvalidAddress, got {other:?}"),
            Ok(_) => panic!("blank recipient must be rejected"),
        }
    }

    #[tokio::test]
    async fn relay_builds_from_default_config_without_connecting() {
        let config = match AppConfig::from_lookup(|_| None) {
            Ok(c) => c,
            Err(e) => panic!("unexpected config error: {e}"),
        };
        assert!(SmtpRelay::new(&config.relay).is_ok(), "building the relay must not need network");
    }
}
