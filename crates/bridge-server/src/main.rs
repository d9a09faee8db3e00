use anyhow::{Context, Result};
use application::{PrinterService, PrinterSettings};
use clap::Parser;
use domain::event::DeviceEvent;
use domain::transport::SdkTransport;
use infrastructure::{BridgeConfig, CallCorrelator, WebSocketTransport};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bridge_server::api;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding `default.*` and `<RUN_MODE>.*` config files
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// HTTP bind host
    #[arg(long)]
    host: Option<String>,

    /// HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Jingchen print service WebSocket URL
    #[arg(long)]
    ws_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,bridge_server=debug,application=debug,infrastructure=debug")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("Jingchen Bridge starting...");

    let mut config =
        BridgeConfig::load(&args.config_dir).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ws_url) = args.ws_url {
        config.sdk.ws_url = ws_url;
    }
    if config.server.api_key.is_some() {
        info!("API key authentication enabled");
    }
    if !config.server.allowed_ips.is_empty() {
        info!(allowed = ?config.server.allowed_ips, "IP allow-list enabled");
    }

    // 1. Print service connection
    let (transport, inbound) =
        WebSocketTransport::new(config.sdk.ws_url.clone(), config.sdk.reconnect_interval());
    let correlator = Arc::new(CallCorrelator::new(transport.clone(), inbound));
    let service = PrinterService::new(correlator, PrinterSettings::from(&config));

    info!(url = %config.sdk.ws_url, "Connecting to Jingchen print service...");
    transport.connect().await?;

    // 2. Device notifications -> log
    let mut events = service.subscribe_events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_device_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Device event logger fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // 3. HTTP API
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = bridge_server::setup_app_state(service.clone(), config);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Jingchen Bridge running on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutting down...");
    service.shutdown().await;
    Ok(())
}

fn log_device_event(event: &DeviceEvent) {
    match event {
        DeviceEvent::ServiceConnected { .. } => info!("Connected to Jingchen print service"),
        DeviceEvent::ServiceDisconnected { .. } => warn!("Jingchen print service disconnected"),
        DeviceEvent::PrinterOffline { .. } => warn!("Printer went offline"),
        DeviceEvent::CoverStatusChanged { status, .. } => {
            info!(status = %status, "Printer cover status changed")
        }
        DeviceEvent::PowerLevelChanged { level, .. } => {
            debug!(level = %level, "Printer power level changed")
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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
}
