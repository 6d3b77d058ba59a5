use anyhow::{Context, Result};
use clap::Parser;
use cotreport::logging::init_tracing;
use cotreport::{run, CotReporter, LineMailSource, UdpMailSource};
use cotreport_core::ReporterConfig;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, info_span, Instrument};

/// cotreport - forwards vehicle node reports to a TAK server as CoT events
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mission file with tak_server, tak_port and tak_uid_base
    mission_file: Option<PathBuf>,

    /// Process name shown in log output
    name: Option<String>,

    /// Configuration file (alternative to the positional mission file)
    #[arg(short, long, conflicts_with = "mission_file")]
    config: Option<PathBuf>,

    /// Override TAK server host
    #[arg(long)]
    server: Option<String>,

    /// Override TAK server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override UID prefix
    #[arg(long)]
    uid_base: Option<String>,

    /// Override tick period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Receive bus mail over UDP on this address instead of stdin
    #[arg(long)]
    udp_listen: Option<String>,
}

fn load_config(args: &Args) -> Result<ReporterConfig> {
    let mut config = match args.config.as_ref().or(args.mission_file.as_ref()) {
        Some(path) => ReporterConfig::from_config_builder(path)
            .with_context(|| format!("Failed to load config file: {:?}", path))?,
        None => ReporterConfig::default(),
    };

    if let Some(server) = &args.server {
        config.tak_server = server.clone();
    }
    if let Some(port) = args.port {
        config.tak_port = port;
    }
    if let Some(uid_base) = &args.uid_base {
        config.tak_uid_base = uid_base.clone();
    }
    if let Some(tick_ms) = args.tick_ms {
        config.app_tick_ms = tick_ms;
    }
    if let Some(addr) = &args.udp_listen {
        config.bus.udp_listen = Some(addr.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal, stopping reporter..."),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

async fn run_reporter(config: ReporterConfig) -> Result<()> {
    info!(
        server = %config.server_address(),
        uid_base = %config.tak_uid_base,
        tick_ms = config.app_tick_ms,
        "Starting CoT reporter"
    );

    let mut reporter = CotReporter::from_config(&config);
    let period = config.tick_period();

    let summary = match &config.bus.udp_listen {
        Some(addr) => {
            let source = UdpMailSource::bind(addr)
                .await
                .with_context(|| format!("Failed to bind UDP mail listener on {}", addr))?;
            info!(addr = %addr, "Reading bus mail from UDP");
            run(&mut reporter, source, period, shutdown_signal()).await
        }
        None => {
            info!("Reading bus mail from stdin");
            run(&mut reporter, LineMailSource::stdin(), period, shutdown_signal()).await
        }
    };

    info!(
        ticks = summary.ticks,
        mail = summary.mail_delivered,
        "Reporter stopped"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    init_tracing(&config.logging)?;

    let name = args.name.clone().unwrap_or_else(|| "cotreport".to_string());
    run_reporter(config)
        .instrument(info_span!("app", name = %name))
        .await
}
