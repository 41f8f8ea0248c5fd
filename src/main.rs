//! booking-bot: availability daemon for the Lucky Launch event site.
//!
//! Single-binary Tokio application that:
//! 1. Polls the spreadsheet web app for tenant bookings and Fun Run rows
//! 2. Keeps shared in-memory snapshots fresh for availability queries
//! 3. Logs a heartbeat with spot and slot availability summaries

mod config;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tokio::time::sleep;
use tracing::{error, info, warn};

use booking::{availability, BookingCache, FunRunCache, SheetCache};
use common::{AppConfig, SheetStore, SPOTS};
use sheets_client::SheetsClient;

/// Lucky Launch booking availability daemon
#[derive(Parser)]
#[command(name = "booking-bot", about = "Lucky Launch booking availability daemon")]
struct Cli {
    /// Fetch both sheets once to verify connectivity, then exit.
    #[arg(long)]
    check_connection: bool,

    /// Print a one-shot availability report and exit.
    #[arg(long)]
    snapshot: bool,
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booking_bot=info,sheets_client=info,booking=info".into()),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("🎪 Booking bot starting up...");

    // Load configuration.
    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Sheets: bookings={} funrun={}",
        cfg.bookings_sheet, cfg.funrun_sheet
    );
    info!(
        "Timing: poll={}s funrun_poll={}s heartbeat={}s timeout={}s",
        cfg.timing.poll_interval_secs,
        cfg.timing.funrun_poll_interval_secs,
        cfg.timing.heartbeat_interval_secs,
        cfg.timing.request_timeout_secs,
    );

    let client = Arc::new(SheetsClient::new(
        &cfg.script_url,
        cfg.timing.request_timeout_secs,
    ));

    // ── Check-connection mode ────────────────────────────────────────
    if cli.check_connection {
        run_check_connection(&client, &cfg).await;
        return;
    }

    // ── Shared state ─────────────────────────────────────────────────
    let bookings: Arc<BookingCache> = Arc::new(SheetCache::new(
        client.clone() as Arc<dyn SheetStore>,
        cfg.bookings_sheet.clone(),
    ));
    let funrun: Arc<FunRunCache> = Arc::new(SheetCache::new(
        client.clone() as Arc<dyn SheetStore>,
        cfg.funrun_sheet.clone(),
    ));

    // ── Snapshot mode ────────────────────────────────────────────────
    if cli.snapshot {
        info!("Running one-shot availability snapshot...");
        if let Err(e) = bookings.ensure_loaded().await {
            error!("Failed to fetch bookings: {}", e);
            std::process::exit(1);
        }
        if let Err(e) = funrun.ensure_loaded().await {
            error!("Failed to fetch Fun Run rows: {}", e);
            std::process::exit(1);
        }
        print_availability(&bookings, &funrun).await;
        return;
    }

    // ── Spawn tasks ──────────────────────────────────────────────────
    info!("Spawning tasks...");

    // Task 1: bookings poll
    let poll_bookings = bookings.clone();
    let poll_secs = cfg.timing.poll_interval_secs;
    let bookings_handle = tokio::spawn(async move {
        loop {
            if poll_bookings.refresh().await.is_ok() {
                info!(
                    "Bookings snapshot refreshed: {} rows",
                    poll_bookings.snapshot().await.len()
                );
            }
            sleep(Duration::from_secs(poll_secs)).await;
        }
    });

    // Task 2: Fun Run poll
    let poll_funrun = funrun.clone();
    let funrun_secs = cfg.timing.funrun_poll_interval_secs;
    let funrun_handle = tokio::spawn(async move {
        loop {
            if poll_funrun.refresh().await.is_ok() {
                let usage = poll_funrun.slot_usage().await;
                info!(
                    "Fun Run snapshot refreshed: {}/{} slots used",
                    usage.consumed, usage.capacity
                );
            }
            sleep(Duration::from_secs(funrun_secs)).await;
        }
    });

    // Task 3: heartbeat
    let hb_bookings = bookings.clone();
    let hb_funrun = funrun.clone();
    let hb_secs = cfg.timing.heartbeat_interval_secs;
    let heartbeat_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(hb_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let records = hb_bookings.snapshot().await;
            let spots_full = SPOTS
                .iter()
                .filter(|s| availability::is_spot_completely_booked(&records, s.id))
                .count();
            let usage = availability::fun_run_slot_usage(&hb_funrun.snapshot().await);
            let age_secs = hb_bookings
                .last_updated()
                .await
                .map(|t| (Utc::now() - t).num_seconds());
            info!(
                "HEARTBEAT: bookings={} spots_full={}/{} funrun={}/{}{} age={}s",
                records.len(),
                spots_full,
                SPOTS.len(),
                usage.consumed,
                usage.capacity,
                if usage.is_full { " (FULL)" } else { "" },
                age_secs.map_or_else(|| "-".into(), |a| a.to_string()),
            );
        }
    });

    // ── Wait for shutdown ────────────────────────────────────────────
    info!("🚀 Booking bot is running. Press Ctrl+C to stop.");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        r = bookings_handle => {
            error!("Bookings poll task exited: {:?}", r);
        }
        r = funrun_handle => {
            error!("Fun Run poll task exited: {:?}", r);
        }
        r = heartbeat_handle => {
            error!("Heartbeat task exited: {:?}", r);
        }
    }

    info!("Booking bot shut down.");
}

// ── Mode implementations ────────────────────────────────────────────

async fn run_check_connection(client: &SheetsClient, cfg: &AppConfig) {
    info!("Checking sheet service connectivity...");

    let mut ok = true;
    for sheet in [&cfg.bookings_sheet, &cfg.funrun_sheet] {
        match client.fetch_rows(sheet).await {
            Ok(rows) => {
                info!("✅ Sheet {}: {} rows", sheet, rows.len());
            }
            Err(e) => {
                error!("❌ Sheet {}: {}", sheet, e);
                ok = false;
            }
        }
    }

    if !ok {
        std::process::exit(1);
    }
}

async fn print_availability(bookings: &BookingCache, funrun: &FunRunCache) {
    let records = bookings.snapshot().await;
    info!("Bookings: {} rows", records.len());

    for spot in &SPOTS {
        let durations = availability::booked_durations_for_spot(&records, spot.id);
        if availability::is_spot_completely_booked(&records, spot.id) {
            info!("  {} ({}): FULLY BOOKED", spot.id, spot.area);
        } else if !durations.is_empty() {
            info!("  {} ({}): booked {}", spot.id, spot.area, durations.join(", "));
        }
    }

    let usage = availability::fun_run_slot_usage(&funrun.snapshot().await);
    info!(
        "Fun Run: {}/{} slots used, {} available{}",
        usage.consumed,
        usage.capacity,
        usage.available,
        if usage.is_full { " — FULL" } else { "" }
    );

    if let Some(err) = bookings.last_error().await {
        warn!("Last bookings fetch error: {}", err);
    }
}
