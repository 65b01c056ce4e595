use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use values_api::client::WorkloadDriver;
use values_api::config::{ClientSettings, DEFAULT_SETTINGS_FILE, RawSettings};
use values_api::telemetry;

/// Randomized workload client for the values API.
#[derive(Parser, Debug)]
#[command(name = "values-workload")]
struct Args {
    /// Path to the JSON settings file.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// Stop after this many commands instead of running until Ctrl+C.
    #[arg(long)]
    iterations: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let raw = RawSettings::load(&args.settings)?;
    let settings = ClientSettings::from_raw(&raw)?;

    telemetry::init(settings.log_level);

    let mut driver = WorkloadDriver::new(&settings)?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            signal_cancel.cancel();
        }
    });

    driver.run_iterations(args.iterations, cancel).await;

    Ok(())
}
