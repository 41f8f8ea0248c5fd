//! Synchronized sheet snapshot cache.
//!
//! One `SheetCache` per sheet holds the latest fetched row set, shared by
//! every task in the process. Consumers read `snapshot()`; freshness comes
//! from `refresh()` after a successful submit and from the poll task in
//! the binary. Snapshots are replaced wholesale — a reader holding an
//! `Arc` to the previous list is never exposed to a half-updated one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{BookingRecord, Error, FunRunRecord, SheetStore, SlotUsage};
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::availability;

/// Where the cache is in its fetch lifecycle.
///
/// `Error` keeps the previous snapshot readable — stale availability
/// beats a blank form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePhase {
    Empty,
    Loading,
    Ready,
    Error,
}

struct CacheState<T> {
    records: Arc<Vec<T>>,
    phase: CachePhase,
    last_updated: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Lazily-populated snapshot of one sheet, parsed into `T`.
pub struct SheetCache<T> {
    store: Arc<dyn SheetStore>,
    sheet: String,
    state: RwLock<CacheState<T>>,
    /// Serializes fetches. The guarded value is the start-stamp of the
    /// most recently completed fetch.
    fetch_gate: Mutex<u64>,
    /// Count of fetches ever started. Read before taking the gate so a
    /// waiter can tell whether the fetch it waited on began after the
    /// waiter's own call.
    started: AtomicU64,
}

pub type BookingCache = SheetCache<BookingRecord>;
pub type FunRunCache = SheetCache<FunRunRecord>;

impl<T: DeserializeOwned + Send + Sync> SheetCache<T> {
    pub fn new(store: Arc<dyn SheetStore>, sheet: impl Into<String>) -> Self {
        Self {
            store,
            sheet: sheet.into(),
            state: RwLock::new(CacheState {
                records: Arc::new(Vec::new()),
                phase: CachePhase::Empty,
                last_updated: None,
                last_error: None,
            }),
            fetch_gate: Mutex::new(0),
            started: AtomicU64::new(0),
        }
    }

    /// Latest good snapshot (empty before the first successful fetch).
    pub async fn snapshot(&self) -> Arc<Vec<T>> {
        self.state.read().await.records.clone()
    }

    pub async fn phase(&self) -> CachePhase {
        self.state.read().await.phase
    }

    /// When the snapshot was last replaced; `None` until the first
    /// successful fetch. Staleness display is the consumer's call.
    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_updated
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// Fetch once if nothing has been loaded yet.
    ///
    /// A no-op while a fetch is in flight or after one has completed, so
    /// any number of consumers can call this on startup and exactly one
    /// request reaches the sheet service.
    pub async fn ensure_loaded(&self) -> Result<(), Error> {
        if self.state.read().await.phase != CachePhase::Empty {
            return Ok(());
        }
        self.refresh().await
    }

    /// Unconditionally re-fetch the sheet.
    ///
    /// Callers that overlap an in-flight fetch wait for it. A waiter then
    /// issues its own request only if the fetch it waited on started
    /// before the waiter's call: a refresh issued after a successful
    /// submit always observes that submit, while callers that raced in
    /// together collapse into a single request.
    ///
    /// Not an `async fn`: the call-time stamp must be taken when
    /// `refresh()` is invoked, before the returned future is first
    /// polled, or two futures created together could not tell they
    /// overlap.
    pub fn refresh(&self) -> impl std::future::Future<Output = Result<(), Error>> + '_ {
        let seen = self.started.load(Ordering::Acquire);
        self.refresh_from(seen)
    }

    async fn refresh_from(&self, seen: u64) -> Result<(), Error> {
        let mut completed = self.fetch_gate.lock().await;
        if *completed > seen {
            // A fetch that started after this call already finished.
            return Ok(());
        }

        let stamp = self.started.fetch_add(1, Ordering::AcqRel) + 1;

        {
            let mut st = self.state.write().await;
            st.phase = CachePhase::Loading;
        }

        let result = self.store.fetch_rows(&self.sheet).await;
        *completed = stamp;

        let mut st = self.state.write().await;
        match result {
            Ok(rows) => {
                let total = rows.len();
                let records: Vec<T> = rows
                    .into_iter()
                    .filter_map(|row| match serde_json::from_value(row) {
                        Ok(rec) => Some(rec),
                        Err(e) => {
                            warn!("Skipping malformed row in sheet {}: {}", self.sheet, e);
                            None
                        }
                    })
                    .collect();
                debug!("Sheet {}: {} rows fetched, {} parsed", self.sheet, total, records.len());
                st.records = Arc::new(records);
                st.phase = CachePhase::Ready;
                st.last_updated = Some(Utc::now());
                st.last_error = None;
                Ok(())
            }
            Err(e) => {
                // Keep the previous snapshot readable.
                warn!("Refresh failed for sheet {}: {}", self.sheet, e);
                st.phase = CachePhase::Error;
                st.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

// ── Snapshot-bound availability helpers ───────────────────────────────

impl SheetCache<BookingRecord> {
    pub async fn is_duration_booked(&self, spot_id: &str, duration: &str) -> bool {
        availability::is_duration_booked_for_spot(&self.snapshot().await, spot_id, duration)
    }

    pub async fn is_spot_completely_booked(&self, spot_id: &str) -> bool {
        availability::is_spot_completely_booked(&self.snapshot().await, spot_id)
    }

    pub async fn booked_durations(&self, spot_id: &str) -> Vec<String> {
        availability::booked_durations_for_spot(&self.snapshot().await, spot_id)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

impl SheetCache<FunRunRecord> {
    pub async fn slot_usage(&self) -> SlotUsage {
        availability::fun_run_slot_usage(&self.snapshot().await)
    }
}
