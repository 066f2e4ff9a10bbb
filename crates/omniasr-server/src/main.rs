//! omniasr-server - OpenAI Whisper-compatible gateway for Omnilingual-ASR.

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use omniasr_core::{AsrEngine, EngineConfig, ServerConfig};
use omniasr_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "omniasr_server=debug,omniasr_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Omnilingual-ASR gateway");

    let engine_config = EngineConfig::from_env();
    info!(
        model = %engine_config.model_card,
        max_batch_size = engine_config.max_batch_size,
        batch_timeout_ms = engine_config.batch_timeout_ms,
        workers = engine_config.workers_per_device,
        "Engine configuration"
    );

    // Model load failure is fatal: nothing can be served without it.
    let engine = AsrEngine::load(engine_config)?;
    let state = AppState::new(engine);
    let app = create_router(state);

    let server_config = ServerConfig::from_env();
    let addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }
}
