//! API Request Handlers

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::types::*;
use crate::core::health::get_chain_health;
use crate::models::config::MonitorConfig;
use crate::models::errors::{AppError, AppResult};
use crate::providers::telegram::{AlertSink, TelegramNotifier};
use crate::utils::constants::TELEGRAM_API_BASE;
use crate::utils::telemetry::SnapshotTelemetry;

/// Shared application state
pub struct AppState {
    pub telemetry: Arc<SnapshotTelemetry>,
    pub config: MonitorConfig,
    pub telegram_api_base: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: MonitorConfig, telemetry: Arc<SnapshotTelemetry>) -> Self {
        Self {
            telemetry,
            config,
            telegram_api_base: TELEGRAM_API_BASE.to_string(),
            start_time: Instant::now(),
        }
    }

    /// Send Telegram calls somewhere else (self-hosted Bot API, tests)
    pub fn with_telegram_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.telegram_api_base = api_base.into();
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn error_response(status: StatusCode, error: ApiError, start: Instant) -> Response {
    (status, Json(ApiResponse::error(error, elapsed_ms(start)))).into_response()
}

/// Accept non-empty http(s)/ws(s) URLs only
pub fn validate_rpc_url(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request("rpc_url must not be empty"));
    }
    let url = reqwest::Url::parse(trimmed)
        .map_err(|e| AppError::bad_request(format!("Invalid rpc_url: {}", e)))?;
    match url.scheme() {
        "http" | "https" | "ws" | "wss" => Ok(trimmed.to_string()),
        other => Err(AppError::bad_request(format!(
            "Unsupported rpc_url scheme: {}",
            other
        ))),
    }
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Chain Health
// ============================================

pub async fn chain_health_query(
    State(state): State<Arc<AppState>>,
    Query(req): Query<ChainHealthRequest>,
) -> Response {
    run_chain_health(&state, req).await
}

pub async fn chain_health_body(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChainHealthRequest>,
) -> Response {
    run_chain_health(&state, req).await
}

/// 200 with the snapshot, 400 on a bad URL, the error envelope otherwise
async fn run_chain_health(state: &AppState, req: ChainHealthRequest) -> Response {
    let start = Instant::now();

    let raw_url = req
        .rpc_url
        .unwrap_or_else(|| state.config.default_rpc_url.clone());
    let rpc_url = match validate_rpc_url(&raw_url) {
        Ok(url) => url,
        Err(e) => {
            warn!("⚠️ Rejected chain health request: {}", e);
            return error_response(StatusCode::BAD_REQUEST, ApiError::from(&e), start);
        }
    };

    info!("🩺 Chain health requested for {}", rpc_url);

    match get_chain_health(&rpc_url, &state.config).await {
        Ok(snapshot) => {
            state
                .telemetry
                .record_snapshot(start.elapsed().as_millis() as u64, snapshot.health_alerts.len());
            (StatusCode::OK, Json(snapshot)).into_response()
        }
        Err(e) => {
            state.telemetry.record_failure();
            error!("❌ Chain health failed for {}: {}", rpc_url, e);
            let status = StatusCode::from_u16(e.code.http_status())
                .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
            (status, Json(e.envelope())).into_response()
        }
    }
}

// ============================================
// Telegram Alert
// ============================================

pub async fn send_telegram_alert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TelegramAlertRequest>,
) -> Result<Json<ApiResponse<TelegramAlertData>>, Response> {
    let start = Instant::now();

    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(bot_token), Some(chat_id), Some(message)) = (
        non_empty(req.bot_token),
        non_empty(req.chat_id),
        non_empty(req.message),
    ) else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            ApiError::bad_request("bot_token, chat_id and message are required"),
            start,
        ));
    };

    let notifier =
        TelegramNotifier::with_api_base(state.telegram_api_base.clone(), bot_token, chat_id.clone())
            .map_err(|e| {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, ApiError::internal(e.message), start)
            })?;

    notifier.send(&message).await.map_err(|e| {
        let status = StatusCode::from_u16(e.code.http_status()).unwrap_or(StatusCode::BAD_GATEWAY);
        error_response(status, ApiError::from(&e), start)
    })?;

    Ok(Json(ApiResponse::success(
        TelegramAlertData {
            delivered: true,
            chat_id,
        },
        elapsed_ms(start),
    )))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let stats = state.telemetry.get_stats();

    let data = StatsData {
        total_snapshots: stats.total_snapshots,
        alert_snapshots: stats.alert_snapshots,
        failed_snapshots: stats.failed_snapshots,
        total_alerts: stats.total_alerts,
        alert_rate_percent: stats.alert_rate(),
        avg_latency_ms: stats.avg_latency_ms,
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    info!(
        "📊 Snapshot stats: {} served, {} alerting, {} failed",
        stats.total_snapshots, stats.alert_snapshots, stats.failed_snapshots
    );

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
