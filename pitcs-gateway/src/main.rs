//! Entry point for the `pitcs-gateway` HTTP server.

use std::{net::SocketAddr, sync::Arc};

use pitcs_core::AppConfig;
use pitcs_gateway::routes::{create_router, AppState};
use pitcs_mailer::{RelayClient, SmtpRelay};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A missing .env file is normal outside local development.
    let _ = dotenv::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match AppConfig::from_env() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let missing = config.missing_relay_settings();
    if !missing.is_empty() {
        warn!(?missing, "mail relay settings unset, sending will fail");
    }

    let smtp = match SmtpRelay::new(&config.relay) {
        Ok(s) => s,
        Err(e) => {
            error!(host = %config.relay.host, error = %e, "failed to prepare mail relay");
            std::process::exit(1);
        }
    };
    let state = Arc::new(AppState::new(
        Arc::clone(&config),
        RelayClient::new(Arc::new(smtp), &config.relay),
    ));

    let check = Arc::clone(&state);
    tokio::spawn(async move {
        let host = &check.config.relay.host;
        match check.relay.self_check().await {
            Ok(()) => info!(%host, "server is ready to send emails"),
            Err(e) => error!(%host, error = %e, "mail relay self-check failed"),
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(
        addr = %addr,
        environment = %config.environment,
        origin_mode = ?config.origin_mode,
        validation = ?config.validation,
        "pitcs-gateway listening"
    );
    info!("local URL: http://localhost:{}", config.port);

    if let Err(e) = axum::serve(listener, create_router(state)).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
