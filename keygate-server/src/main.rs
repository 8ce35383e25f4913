//! Keygate license verification server.
//!
//! Serves a single verification endpoint over HTTP and runs a
//! periodic sweep that evicts expired licenses and compacts the
//! device log.
//!
//! Usage:
//!   keygate-server --port 6190

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use keygate_license::LicenseService;
use keygate_server::build_router;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "keygate-server")]
#[command(about = "Device-bound license verification server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "6190")]
    port: u16,

    /// Path to the license key file
    #[arg(long, default_value = "license-keys.txt")]
    license_file: PathBuf,

    /// Path to the device log file
    #[arg(long, default_value = "device-log.txt")]
    device_log: PathBuf,

    /// Seconds between expiry sweeps
    #[arg(long, default_value = "300")]
    sweep_interval: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Keygate server starting...");
    let service = Arc::new(LicenseService::open(&args.license_file, &args.device_log));
    info!(
        "Loaded {} license records from {}",
        service.with_store(|store| store.len()),
        args.license_file.display()
    );

    let sweeper = Arc::clone(&service);
    let sweep_interval = Duration::from_secs(args.sweep_interval);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        // The first tick fires immediately; skip it so startup is quiet.
        interval.tick().await;
        loop {
            interval.tick().await;
            match sweeper.sweep() {
                Ok(report) if !report.evicted.is_empty() || report.log_lines_removed > 0 => {
                    info!(
                        evicted = report.evicted.len(),
                        log_lines_removed = report.log_lines_removed,
                        "sweep completed"
                    );
                }
                Ok(_) => {}
                Err(err) => warn!("sweep failed: {err}"),
            }
        }
    });

    println!("\n========================================");
    println!("  Keygate License Server");
    println!("========================================");
    println!("  Port:          {}", args.port);
    println!("  License file:  {}", args.license_file.display());
    println!("  Device log:    {}", args.device_log.display());
    println!("  Sweep every:   {}s", args.sweep_interval);
    println!("========================================\n");

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind port {}", args.port))?;
    info!("Listening on {addr}");
    axum::serve(
        listener,
        build_router(service).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server failed")?;

    Ok(())
}
