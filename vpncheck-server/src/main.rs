//! vpncheck HTTP server binary

use std::sync::Arc;
use tracing::{error, info};
use vpncheck_core::{Config, VpnApiClient};
use vpncheck_server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let enable_otel = std::env::var("OTEL_ENABLED")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if enable_otel {
        vpncheck_server::tracing::init_tracing_stack("vpncheck-server")?;
        info!("OpenTelemetry tracing enabled");
    } else {
        vpncheck_server::tracing::init_console_logging()?;
        info!("Console logging enabled (set OTEL_ENABLED=true for OpenTelemetry)");
    }

    info!("Starting vpncheck server v{}", env!("CARGO_PKG_VERSION"));

    // Refuse to start without both secrets
    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        anyhow::anyhow!(e)
    })?;
    info!(?config, "Configuration loaded");

    vpncheck_server::metrics::init_prometheus()?;
    vpncheck_server::metrics::init_metrics();

    let provider = Arc::new(VpnApiClient::new(&config.upstream)?);
    let addr = config.bind_address;
    let state = AppState::new(Arc::new(config), provider);

    let app = vpncheck_server::router(state);

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, shutting down gracefully...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    if enable_otel {
        info!("Flushing OpenTelemetry traces...");
        vpncheck_server::tracing::shutdown_telemetry();
    }

    info!("Server shutdown complete");
    Ok(())
}
