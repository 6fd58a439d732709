//! L3 Vitals API Server
//!
//! REST API serving chain health snapshots on demand
//!
//! Usage:
//!   cargo run --bin l3_vitals_api
//!
//! Environment:
//!   PORT / L3_VITALS_PORT - Server port (default: 8080)
//!   L3_VITALS_HOST        - Server host (default: 0.0.0.0)
//!   L3_RPC_URL            - Default node when a request names none
//!   RUST_LOG              - Log filter (default: info)

use l3_vitals::api::{create_router, handlers::AppState, start_cleanup_task};
use l3_vitals::utils::constants::{APP_NAME, APP_VERSION};
use l3_vitals::{MonitorConfig, ServerConfig, SnapshotTelemetry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let monitor = MonitorConfig::from_env()?;
    let server = ServerConfig::from_env()?;

    let telemetry = Arc::new(SnapshotTelemetry::new());
    let telemetry_for_shutdown = telemetry.clone();

    let state = Arc::new(AppState::new(monitor, telemetry));

    // Start background cleanup task for rate limiter
    start_cleanup_task();
    info!("🧹 Background cleanup task started");

    let app = create_router(state, &server);

    let addr: SocketAddr = server.bind_addr().parse()?;

    info!("🚀 {} API starting on http://{}", APP_NAME, addr);
    info!("");
    info!("Endpoints:");
    info!("  GET  /v1/chain/health?rpc_url=...  - Chain health snapshot");
    info!("  POST /v1/chain/health              - Chain health snapshot (JSON body)");
    info!("  POST /v1/alerts/telegram           - Push an alert to Telegram");
    info!("  GET  /v1/stats                     - Snapshot statistics");
    info!("  GET  /v1/health                    - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("");
    info!("🛑 Shutdown signal received, cleaning up...");

    let stats = telemetry_for_shutdown.get_stats();
    info!("   Snapshots served: {}", stats.total_snapshots);
    info!("   Alerting snapshots: {}", stats.alert_snapshots);
    info!("   Failed snapshots: {}", stats.failed_snapshots);

    info!("👋 {} API shutdown complete", APP_NAME);

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ==============================================================
       L 3   V I T A L S   v{}
       Rollup health & analytics over JSON-RPC
    ==============================================================
    "#,
        APP_VERSION
    );
}
