//! Portico HTTP Server
//!
//! Serves the gateway's own health endpoints behind the full middleware
//! stack. Applications embed the library and register their routes on a
//! [`GatewayRouter`] the same way.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use domain::RoutePolicy;
use infrastructure::{
    ApiKeyIdentityAdapter, AppConfig, TemplateEngine, TemplateFunctionRegistry,
    WkhtmltopdfAdapter, init_logging,
};
use presentation_http::{GatewayRouter, handlers::health, state::AppState};
use tokio::{net::TcpListener, signal, sync::oneshot};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load_from(config_path.as_deref()).context("loading configuration")?;

    init_logging(&config.server)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Portico starting"
    );

    let settings = config.gateway_settings()?;

    let identity = ApiKeyIdentityAdapter::from_entries(&config.security.api_keys);
    if identity.is_empty() {
        warn!("No API keys configured; every caller is anonymous");
    }

    let registry = TemplateFunctionRegistry::with_defaults();
    let templates =
        TemplateEngine::new(&config.templates, &registry).context("loading templates")?;

    let pdf = WkhtmltopdfAdapter::new(config.pdf.clone());

    let state = AppState::new(settings, Arc::new(identity))
        .with_templates(Arc::new(templates))
        .with_pdf(Arc::new(pdf));

    let app = GatewayRouter::new(state)
        .get("/health", health::health_check, RoutePolicy::Open)
        .get("/ready", health::readiness_check, RoutePolicy::Open)
        .into_router()
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(%addr, "Server listening");

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));

    let (signalled_tx, signalled_rx) = oneshot::channel();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    serve_until_drained(server, signalled_rx, shutdown_timeout).await?;

    info!("Server shutdown complete");

    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

/// Run the server until it has drained, giving up `timeout` after shutdown starts
async fn serve_until_drained<F>(
    server: F,
    signalled: oneshot::Receiver<()>,
    timeout: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(server);
    tokio::select! {
        result = &mut server => return result,
        Ok(()) = signalled => {},
    }

    info!(?timeout, "Waiting for connections to close");
    if let Ok(result) = tokio::time::timeout(timeout, server).await {
        result
    } else {
        warn!(?timeout, "Connections still open at shutdown timeout, exiting");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drained_server_result_is_returned() {
        let (_tx, rx) = oneshot::channel();
        let result = serve_until_drained(
            async { Err(std::io::Error::other("accept failed")) },
            rx,
            Duration::from_secs(30),
        )
        .await;
        assert_eq!(result.unwrap_err().to_string(), "accept failed");
    }

    #[tokio::test]
    async fn stuck_connections_are_abandoned_after_the_timeout() {
        let (tx, rx) = oneshot::channel();
        tx.send(()).unwrap();
        let result = serve_until_drained(
            std::future::pending::<std::io::Result<()>>(),
            rx,
            Duration::from_millis(20),
        )
        .await;
        assert!(result.is_ok());
    }
}
