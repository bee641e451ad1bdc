//! metalprice gateway
//!
//! - `GET /prices[/:base]`: inverted metal prices, cached per base currency
//! - Config: optional YAML (`METALPRICE_CONFIG`) + `API_KEY` / `PORT` env
//! - Startup validation fails fast before the listener binds

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use metalprice_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.client_code().as_str(), "metalprice-gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> metalprice_core::Result<()> {
    let cfg = config::load_from_env()?;
    let listen = cfg.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| metalprice_core::PriceProxyError::Config(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "metalprice-gateway starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| metalprice_core::PriceProxyError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
