//! L3 Vitals - one-shot chain health check
//!
//! Usage:
//!   l3_vitals [RPC_URL]
//!
//! Environment:
//!   L3_RPC_URL        - endpoint when no argument is given
//!   L3_OUTPUT_PATH    - where the JSON report is written (default: l3_health_data.json)
//!   TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID - push alerts when both are set
//!   RUST_LOG          - log filter (default: info)

use l3_vitals::models::OverallStatus;
use l3_vitals::providers::{AlertSink, TelegramNotifier};
use l3_vitals::utils::constants::DEFAULT_OUTPUT_PATH;
use l3_vitals::{get_chain_health, MonitorConfig};

use eyre::{eyre, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let config = MonitorConfig::from_env()?;
    let rpc_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.default_rpc_url.clone());
    let output_path =
        std::env::var("L3_OUTPUT_PATH").unwrap_or_else(|_| DEFAULT_OUTPUT_PATH.to_string());

    info!("🩺 Checking L3 health at {}", rpc_url);

    match get_chain_health(&rpc_url, &config).await {
        Ok(snapshot) => {
            let json = serde_json::to_string_pretty(&snapshot)?;
            println!("{}", json);
            tokio::fs::write(&output_path, &json).await?;
            info!("💾 Report written to {}", output_path);

            if snapshot.overall_status == OverallStatus::ALERT {
                warn!("🚨 Health alerts detected:");
                for alert in &snapshot.health_alerts {
                    warn!("   - {}", alert.description());
                }

                if let (Some(telegram), Some(report)) = (&config.telegram, snapshot.alert_report()) {
                    let notifier = TelegramNotifier::from_config(telegram)?;
                    if let Err(e) = notifier.send(&report).await {
                        warn!("⚠️ Could not push alert to Telegram: {}", e);
                    }
                }
            } else {
                info!("✅ No health alerts");
            }
            Ok(())
        }
        Err(e) => {
            let json = serde_json::to_string_pretty(&e.envelope())?;
            println!("{}", json);
            tokio::fs::write(&output_path, &json).await?;
            error!("❌ {}", e);
            Err(eyre!(e.message))
        }
    }
}
