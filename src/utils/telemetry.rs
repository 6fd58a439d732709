//! Telemetry Module
//!
//! In-process counters for snapshots served by this instance:
//! totals, how many ended in ALERT, fatal failures and average latency.
//! Nothing here is persisted.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryStats {
    /// Snapshots successfully assembled
    pub total_snapshots: u64,
    /// Snapshots whose overall status was ALERT
    pub alert_snapshots: u64,
    /// Invocations that ended in a fatal error
    pub failed_snapshots: u64,
    /// Alerts emitted across all snapshots
    pub total_alerts: u64,
    /// Average end-to-end latency (ms) over successful snapshots
    pub avg_latency_ms: f64,
    /// Period start timestamp
    pub period_start: u64,
    /// Period end timestamp
    pub period_end: u64,
}

impl TelemetryStats {
    /// Share of snapshots that raised at least one alert, in percent
    pub fn alert_rate(&self) -> f64 {
        if self.total_snapshots == 0 {
            return 0.0;
        }
        self.alert_snapshots as f64 / self.total_snapshots as f64 * 100.0
    }
}

/// Lock-free snapshot counters
pub struct SnapshotTelemetry {
    total_snapshots: AtomicU64,
    alert_snapshots: AtomicU64,
    failed_snapshots: AtomicU64,
    total_alerts: AtomicU64,
    total_latency_ms: AtomicU64,
    session_start: u64,
}

impl SnapshotTelemetry {
    pub fn new() -> Self {
        Self {
            total_snapshots: AtomicU64::new(0),
            alert_snapshots: AtomicU64::new(0),
            failed_snapshots: AtomicU64::new(0),
            total_alerts: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            session_start: current_timestamp(),
        }
    }

    /// Record a completed snapshot
    pub fn record_snapshot(&self, latency_ms: u64, alert_count: usize) {
        self.total_snapshots.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        if alert_count > 0 {
            self.alert_snapshots.fetch_add(1, Ordering::Relaxed);
            self.total_alerts
                .fetch_add(alert_count as u64, Ordering::Relaxed);
        }
    }

    /// Record an invocation that returned the error envelope
    pub fn record_failure(&self) {
        self.failed_snapshots.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let total_snapshots = self.total_snapshots.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency_ms = if total_snapshots > 0 {
            total_latency as f64 / total_snapshots as f64
        } else {
            0.0
        };

        TelemetryStats {
            total_snapshots,
            alert_snapshots: self.alert_snapshots.load(Ordering::Relaxed),
            failed_snapshots: self.failed_snapshots.load(Ordering::Relaxed),
            total_alerts: self.total_alerts.load(Ordering::Relaxed),
            avg_latency_ms,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }
}

impl Default for SnapshotTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
