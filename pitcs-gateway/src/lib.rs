//! HTTP gateway for the PITCS contact backend.
//!
//! Serves the job listing, health and diagnostic endpoints, and relays
//! contact-form inquiries by email behind a configurable origin policy.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod origin;
pub mod routes;
