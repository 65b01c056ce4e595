use clap::Parser;
use std::path::PathBuf;
use values_api::api::router;
use values_api::config::{BackendKind, DEFAULT_SETTINGS_FILE, RawSettings, ServerSettings};
use values_api::storage::open_store;
use values_api::telemetry;

/// Values API server.
#[derive(Parser, Debug)]
#[command(name = "values-api")]
struct Args {
    /// Path to the JSON settings file.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// Overrides the `Backend` setting.
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1. Settings (fatal when missing or malformed):
    let raw = RawSettings::load(&args.settings)?;
    let settings = ServerSettings::from_raw(&raw, args.backend)?;

    telemetry::init(settings.log_level);

    // 2. Storage backend:
    let store = open_store(&settings.backend)?;

    // 3. HTTP Router:
    let app = router(store.clone());

    // 4. Start HTTP server:
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(
        "Values API starting at {} (listening on {}, backend: {})",
        settings.api_url,
        listener.local_addr()?,
        store.backend_name()
    );
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Values API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
