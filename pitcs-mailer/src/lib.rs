//! Mail relay client for the PITCS contact backend.
//!
//! Renders an inquiry into a plain-text and HTML email and hands it to an
//! external SMTP relay, one bounded attempt per inquiry.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod client;
pub mod error;
pub mod render;
pub mod smtp;
pub mod transport;

pub use client::RelayClient;
pub use error::MailerError;
pub use render::{render, RenderedInquiry};
pub use smtp::SmtpRelay;
pub use transport::{DeliveryId, MailTransport, OutgoingMail};
