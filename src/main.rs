use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use devwatch::Settings;
use devwatch_store::{DeviceStore, Gateway};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "devwatch")]
#[command(about = "Aggregate device heartbeats and upload timings into uptime stats")]
struct Args {
    /// Config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (e.g., "0.0.0.0:6733")
    #[arg(short, long)]
    listen: Option<String>,

    /// CSV roster of known device ids
    #[arg(short, long)]
    devices: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings =
        Settings::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(listen) = args.listen {
        settings.listen_addr = listen;
    }
    if let Some(devices) = args.devices {
        settings.devices_csv = devices;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)))
        .init();

    info!("devwatch device telemetry service starting");

    let gateway_config = settings.gateway_config()?;

    // A missing or broken roster keeps the process up; every device
    // endpoint then reports the configuration error.
    let gateway = match DeviceStore::from_csv(&settings.devices_csv) {
        Ok(store) => {
            info!(
                devices = store.device_count(),
                path = %settings.devices_csv.display(),
                "loaded device roster"
            );
            Gateway::new(Arc::new(store), gateway_config)
        }
        Err(e) => {
            error!(error = %e, "failed to load device roster");
            Gateway::new(Arc::new(DeviceStore::default()), gateway_config).with_config_error(&e)
        }
    };

    let listener = gateway.bind().await?;
    let addr = listener.local_addr()?;
    info!(%addr, "server listening");
    info!("base URL: http://127.0.0.1:{}/api/v1", addr.port());

    tokio::select! {
        result = gateway.serve(listener) => result?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}
