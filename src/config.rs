//! Configuration loader — merges env vars, .env file, and config.toml.

use common::{AppConfig, Error};
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.script_url.trim().is_empty() {
        issues.push("script_url is required (set SHEETS_SCRIPT_URL or config.toml)".into());
    } else if !config.script_url.starts_with("http://")
        && !config.script_url.starts_with("https://")
    {
        issues.push("script_url must be an http(s) URL".into());
    }

    if config.bookings_sheet.trim().is_empty() {
        issues.push("bookings_sheet must not be empty".into());
    }
    if config.funrun_sheet.trim().is_empty() {
        issues.push("funrun_sheet must not be empty".into());
    }

    // The script deployment throttles aggressive polling; anything under
    // 30s gets requests rejected at the edge.
    if config.timing.poll_interval_secs < 30 {
        issues.push("timing.poll_interval_secs must be >= 30".into());
    }
    if config.timing.funrun_poll_interval_secs < 30 {
        issues.push("timing.funrun_poll_interval_secs must be >= 30".into());
    }
    if config.timing.heartbeat_interval_secs == 0 {
        issues.push("timing.heartbeat_interval_secs must be > 0".into());
    }
    if config.timing.request_timeout_secs == 0 {
        issues.push("timing.request_timeout_secs must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(url) = std::env::var("SHEETS_SCRIPT_URL") {
        config.script_url = url;
    }
    if let Ok(sheet) = std::env::var("BOOKINGS_SHEET") {
        config.bookings_sheet = sheet;
    }
    if let Ok(sheet) = std::env::var("FUNRUN_SHEET") {
        config.funrun_sheet = sheet;
    }
    if let Ok(raw) = std::env::var("POLL_INTERVAL_SECS") {
        config.timing.poll_interval_secs = parse_positive_u64(&raw, "POLL_INTERVAL_SECS")?;
    }
    if let Ok(raw) = std::env::var("FUNRUN_POLL_INTERVAL_SECS") {
        config.timing.funrun_poll_interval_secs =
            parse_positive_u64(&raw, "FUNRUN_POLL_INTERVAL_SECS")?;
    }
    if let Ok(raw) = std::env::var("HEARTBEAT_INTERVAL_SECS") {
        config.timing.heartbeat_interval_secs =
            parse_positive_u64(&raw, "HEARTBEAT_INTERVAL_SECS")?;
    }
    if let Ok(raw) = std::env::var("REQUEST_TIMEOUT_SECS") {
        config.timing.request_timeout_secs = parse_positive_u64(&raw, "REQUEST_TIMEOUT_SECS")?;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
