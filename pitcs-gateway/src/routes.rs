//! Axum route handlers for the PITCS gateway API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use pitcs_core::{AppConfig, Inquiry, Job, ValidationMode, JOB_LISTINGS};
use pitcs_mailer::RelayClient;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::{
    error::GatewayError,
    origin::{answer_options, cors_layer, enforce_origin, OriginPolicy},
};

// ── Shared state ─────────────────────────────────────────────────────────────

/// Read-only state shared by all requests.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub relay: RelayClient,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<AppConfig>, relay: RelayClient) -> Self {
        Self { config, relay }
    }
}

type Shared = Arc<AppState>;

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Result of `GET /api/test`.
#[derive(Debug, Serialize)]
pub struct TestResponse {
    pub success: bool,
    pub message: &'static str,
    pub environment: String,
    /// Current UTC time, RFC 3339 with milliseconds.
    pub timestamp: String,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router.
///
/// The origin policy is derived from `state.config` and wraps every route.
pub fn create_router(state: Shared) -> Router {
    let policy = Arc::new(OriginPolicy::from_config(&state.config));

    Router::new()
        .route("/api/send-email", post(send_email))
        .route("/api/jobs", get(jobs))
        .route("/api/test", get(api_test))
        .route("/health", get(health))
        .with_state(state)
        .layer(middleware::from_fn(answer_options))
        .layer(cors_layer(Arc::clone(&policy)))
        .layer(middleware::from_fn_with_state(policy, enforce_origin))
        .layer(TraceLayer::new_for_http())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health` — liveness probe, plain text `OK`.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// `GET /api/jobs` — the fixed list of open positions.
pub async fn jobs() -> Json<[Job; 3]> {
    Json(JOB_LISTINGS)
}

/// `GET /api/test` — reports the environment mode and the server clock.
pub async fn api_test(State(state): State<Shared>) -> Json<TestResponse> {
    Json(TestResponse {
        success: true,
        message: "Server is running correctly",
        environment: state.config.environment.clone(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// `POST /api/send-email` — relay one inquiry to the destination mailbox.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] if the body is not a JSON
/// inquiry, [`GatewayError::InvalidInquiry`] if strict validation is enabled
/// and the inquiry fails it, and [`GatewayError::Relay`] if the relay does
/// not accept the message.
pub async fn send_email(
    State(state): State<Shared>,
    payload: Result<Json<Inquiry>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(inquiry) = payload.map_err(|e| {
        tracing::warn!(error = %e.body_text(), "unreadable inquiry body");
        GatewayError::InvalidRequest(e.body_text())
    })?;

    tracing::debug!(?inquiry, "received form data");
    tracing::info!(name = %inquiry.name, option = %inquiry.option, "received inquiry");

    if state.config.validation == ValidationMode::Strict {
        inquiry.validate().map_err(|e| {
            tracing::warn!(error = %e, "inquiry rejected");
            GatewayError::InvalidInquiry(e)
        })?;
    }

    if let Err(e) = state.relay.send(&inquiry).await {
        tracing::error!(error = %e, "error sending email");
        return Err(e.into());
    }

    Ok(Json(SendEmailResponse { success: true, message: "Email sent successfully" }))
}
