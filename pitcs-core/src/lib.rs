//! Core types for the PITCS contact backend.
//!
//! Defines the inquiry submitted through the website contact form, the fixed
//! job listing, and the process configuration shared by the mailer and the
//! HTTP gateway.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod inquiry;
pub mod job;

pub use config::{AppConfig, OriginMode, RelayConfig, ValidationMode};
pub use error::CoreError;
pub use inquiry::Inquiry;
pub use job::{Job, JOB_LISTINGS};
