//! Service configuration types.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployed Apps Script web app URL (the system of record).
    #[serde(default)]
    pub script_url: String,

    /// Sheet holding tenant booking rows.
    #[serde(default = "default_bookings_sheet")]
    pub bookings_sheet: String,

    /// Sheet holding Fun Run registrations.
    #[serde(default = "default_funrun_sheet")]
    pub funrun_sheet: String,

    /// Timing parameters.
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Timing configuration (all values in seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Booking snapshot poll interval.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Fun Run snapshot poll interval.
    #[serde(default = "default_funrun_poll_interval")]
    pub funrun_poll_interval_secs: u64,

    /// Heartbeat log interval.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    /// Per-request timeout for the sheet service.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_bookings_sheet() -> String {
    "tenants".into()
}

fn default_funrun_sheet() -> String {
    "FunRun".into()
}

fn default_poll_interval() -> u64 {
    60
}
fn default_funrun_poll_interval() -> u64 {
    90
}
fn default_heartbeat_interval() -> u64 {
    30
}
fn default_request_timeout() -> u64 {
    15
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            funrun_poll_interval_secs: default_funrun_poll_interval(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            script_url: String::new(),
            bookings_sheet: default_bookings_sheet(),
            funrun_sheet: default_funrun_sheet(),
            timing: TimingConfig::default(),
        }
    }
}
