//! Cross-origin access policy.
//!
//! The decision itself lives in [`OriginPolicy::decide`]. Two layers apply
//! it: [`enforce_origin`] rejects requests under strict policy, and
//! [`cors_layer`] emits the `Access-Control-*` headers and answers
//! preflights for everything that got through.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, request::Parts, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use indexmap::IndexSet;
use pitcs_core::{AppConfig, OriginMode};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::GatewayError;

/// Outcome of checking one request origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginDecision {
    /// No origin, outside production, or allow-listed.
    Allow,
    /// Outside the allow-list in production, granted under permissive policy.
    AllowUnlisted,
    /// Outside the allow-list in production, refused under strict policy.
    Reject,
}

/// Allow-list, environment and mode, fixed at startup.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: IndexSet<String>,
    production: bool,
    mode: OriginMode,
}

impl OriginPolicy {
    #[must_use]
    pub fn new(allowed: IndexSet<String>, production: bool, mode: OriginMode) -> Self {
        Self { allowed, production, mode }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.allowed_origins.clone(), config.is_production(), config.origin_mode)
    }

    /// Decide whether a request declaring `origin` may proceed.
    #[must_use]
    pub fn decide(&self, origin: Option<&str>) -> OriginDecision {
        match origin {
            None => OriginDecision::Allow,
            Some(_) if !self.production => OriginDecision::Allow,
            Some(o) if self.allowed.contains(o) => OriginDecision::Allow,
            Some(_) => match self.mode {
                OriginMode::Permissive => OriginDecision::AllowUnlisted,
                OriginMode::Strict => OriginDecision::Reject,
            },
        }
    }
}

/// Middleware that logs unlisted origins and rejects them under strict policy.
///
/// # Errors
/// Returns [`GatewayError::OriginRejected`] when the policy decides
/// [`OriginDecision::Reject`].
pub async fn enforce_origin(
    State(policy): State<Arc<OriginPolicy>>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    match policy.decide(origin.as_deref()) {
        OriginDecision::Allow => {}
        OriginDecision::AllowUnlisted => {
            tracing::warn!(origin = ?origin, "origin outside allow-list, allowing");
        }
        OriginDecision::Reject => {
            tracing::warn!(origin = ?origin, "origin outside allow-list, rejecting");
            return Err(GatewayError::OriginRejected(origin.unwrap_or_default()));
        }
    }

    Ok(next.run(request).await)
}

/// Answer `OPTIONS` requests that are not CORS preflights with `204`.
///
/// Preflights never get here; [`cors_layer`] answers them first.
pub async fn answer_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    next.run(request).await
}

/// CORS headers for every origin the policy does not reject.
///
/// The granted origin is reflected back together with
/// `Access-Control-Allow-Credentials: true`.
#[must_use]
pub fn cors_layer(policy: Arc<OriginPolicy>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
            origin
                .to_str()
                .is_ok_and(|o| policy.decide(Some(o)) != OriginDecision::Reject)
        }))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}
