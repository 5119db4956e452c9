//! Relay client: turns an inquiry into one bounded delivery attempt.

use std::sync::Arc;
use std::time::Duration;

use lettre::Address;
use pitcs_core::{Inquiry, RelayConfig};

use crate::render::render;
use crate::transport::{DeliveryId, MailTransport, OutgoingMail};
use crate::MailerError;

/// Sends inquiries to the fixed destination mailbox.
///
/// Wraps a [`MailTransport`] with the sender, recipient and timeout fixed at
/// startup. Cheap to share behind an `Arc`; holds no per-request state.
pub struct RelayClient {
    transport: Arc<dyn MailTransport>,
    sender: String,
    recipient: String,
    timeout: Duration,
}

impl RelayClient {
    /// Create a client delivering through `transport` with the sender,
    /// recipient and timeout from `config`.
    #[must_use]
    pub fn new(transport: Arc<dyn MailTransport>, config: &RelayConfig) -> Self {
        Self {
            transport,
            sender: config.username.clone(),
            recipient: config.recipient.clone(),
            timeout: config.timeout,
        }
    }

    /// Compose the message for `inquiry` without sending it.
    ///
    /// Reply-To is the inquirer's address when it parses; otherwise it is
    /// left out.
    #[must_use]
    pub fn compose(&self, inquiry: &Inquiry) -> OutgoingMail {
        let rendered = render(inquiry);
        let reply_to = match inquiry.email.trim().parse::<Address>() {
            Ok(address) => Some(address.to_string()),
            Err(e) => {
                tracing::warn!(
                    email = %inquiry.email,
                    error = %e,
                    "inquirer address unusable, sending without Reply-To"
                );
                None
            }
        };

        OutgoingMail {
            from: self.sender.clone(),
            to: self.recipient.clone(),
            reply_to,
            subject: rendered.subject,
            text: rendered.text,
            html: rendered.html,
        }
    }

    /// Make exactly one delivery attempt for `inquiry`.
    ///
    /// # Errors
    /// Returns [`MailerError::Timeout`] if the relay does not answer within
    /// the configured timeout, otherwise propagates the transport error.
    pub async fn send(&self, inquiry: &Inquiry) -> Result<DeliveryId, MailerError> {
        let mail = self.compose(inquiry);
        tracing::info!(subject = %mail.subject, "attempting to send email");

        let id = tokio::time::timeout(self.timeout, self.transport.deliver(&mail))
            .await
            .map_err(|_| MailerError::Timeout(self.timeout))??;

        tracing::info!(delivery_id = %id, "email sent");
        Ok(id)
    }

    /// Check that a session with the relay can be established.
    ///
    /// # Errors
    /// Returns [`MailerError::Timeout`] if the check does not finish within
    /// the configured timeout, otherwise propagates the transport error.
    pub async fn self_check(&self) -> Result<(), MailerError> {
        tokio::time::timeout(self.timeout, self.transport.verify())
            .await
            .map_err(|_| MailerError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Records every delivered message and accepts it.
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<OutgoingMail>>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn deliver(&self, mail: &OutgoingMail) -> Result<DeliveryId, MailerError> {
            let mut sent = self.sent.lock().expect("recording lock poisoned");
            sent.push(mail.clone());
            Ok(DeliveryId::new(format!("<{}@test>", sent.len())))
        }

        async fn verify(&self) -> Result<(), MailerError> {
            Ok(())
        }
    }

    struct RejectingTransport;

    #[async_trait]
    impl MailTransport for RejectingTransport {
        async fn deliver(&self, _mail: &OutgoingMail) -> Result<DeliveryId, MailerError> {
            Err(MailerError::Rejected("535 5.7.8 credentials rejected".to_owned()))
        }

        async fn verify(&self) -> Result<(), MailerError> {
            Err(MailerError::Rejected("535 5.7.8 credentials rejected".to_owned()))
        }
    }

    struct StalledTransport;

    #[async_trait]
    impl MailTransport for StalledTransport {
        async fn deliver(&self, _mail: &OutgoingMail) -> Result<DeliveryId, MailerError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(DeliveryId::new("<late@test>"))
        }

        async fn verify(&self) -> Result<(), MailerError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    fn relay_config(timeout: Duration) -> RelayConfig {
        RelayConfig {
            host: "smtp.example.com".to_owned(),
            port: 465,
            username: "bot@example.com".to_owned(),
            password: "secret".to_owned(),
            recipient: "hr@example.com".to_owned(),
            timeout,
        }
    }

    fn ana() -> Inquiry {
        Inquiry {
            name: "Ana".to_owned(),
            email: "ana@x.com".to_owned(),
            contact: "555-1234".to_owned(),
            option: "Sales".to_owned(),
            message: "Hi".to_owned(),
            timestamp: "2024-01-01T00:00:00Z".to_owned(),
        }
    }

    #[tokio::test]
    async fn send_delivers_exactly_one_composed_message() {
        let transport = Arc::new(RecordingTransport::default());
        let client = RelayClient::new(transport.clone(), &relay_config(Duration::from_secs(5)));

        let id = match client.send(&ana()).await {
            Ok(id) => id,
            Err(e) => panic!("send failed: {e}"),
        };
        assert_eq!(id.to_string(), "<1@test>");

        let sent = transport.sent.lock().expect("recording lock poisoned");
        assert_eq!(sent.len(), 1, "exactly one delivery attempt");
        let mail = &sent[0];
        assert_eq!(mail.subject, "New Website Inquiry: Sales from Ana");
        assert_eq!(mail.reply_to.as_deref(), Some("ana@x.com"));
        assert_eq!(mail.from, "bot@example.com");
        assert_eq!(mail.to, "hr@example.com");
    }

    #[test]
    fn compose_drops_unusable_reply_to() {
        let client =
            RelayClient::new(Arc::new(RejectingTransport), &relay_config(Duration::from_secs(5)));
        for email in ["", "not an address"] {
            let inquiry = Inquiry { email: email.to_owned(), ..ana() };
            let mail = client.compose(&inquiry);
            assert_eq!(mail.reply_to, None, "'{email}' must not become Reply-To");
        }
    }

    #[test]
    fn compose_trims_reply_to() {
        let client =
            RelayClient::new(Arc::new(RejectingTransport), &relay_config(Duration::from_secs(5)));
        let inquiry = Inquiry { email: " ana@x.com ".to_owned(), ..ana() };
        assert_eq!(client.compose(&inquiry).reply_to.as_deref(), Some("ana@x.com"));
    }

    #[tokio::test]
    async fn send_propagates_relay_rejection() {
        let client =
            RelayClient::new(Arc::new(RejectingTransport), &relay_config(Duration::from_secs(5)));
        let result = client.send(&ana()).await;
        assert!(
            matches!(result, Err(MailerError::Rejected(_))),
            "rejection must reach the caller unchanged"
        );
    }

    #[tokio::test]
    async fn send_times_out_on_stalled_relay() {
        let timeout = Duration::from_millis(50);
        let client = RelayClient::new(Arc::new(StalledTransport), &relay_config(timeout));
        match client.send(&ana()).await {
            Err(MailerError::Timeout(t)) => assert_eq!(t, timeout),
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn self_check_reports_success_and_failure() {
        let ok = RelayClient::new(
            Arc::new(RecordingTransport::default()),
            &relay_config(Duration::from_secs(5)),
        );
        assert!(ok.self_check().await.is_ok());

        let rejected =
            RelayClient::new(Arc::new(RejectingTransport), &relay_config(Duration::from_secs(5)));
        assert!(rejected.self_check().await.is_err());

        let stalled =
            RelayClient::new(Arc::new(StalledTransport), &relay_config(Duration::from_millis(50)));
        assert!(matches!(stalled.self_check().await, Err(MailerError::Timeout(_))));
    }
}
