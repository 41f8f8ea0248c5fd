//! REST client for the spreadsheet web app.
//!
//! The deployed script exposes a single endpoint: GET with a `sheet`
//! query parameter returns every row of that sheet as `{ "data": [...] }`,
//! POST with `{ "action": "create", "data": {...} }` appends one row.
//! Responses carry no schema guarantees and the script answers 200 even
//! for some handled failures, so bodies are inspected, not trusted.

use async_trait::async_trait;
use chrono::Utc;
use common::{Error, SheetStore};
use serde_json::Value;
use tracing::debug;

/// Async client for the sheet web app.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    base_url: String,
}

impl SheetsClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            // The script deployment rejects requests without a
            // browser-like agent.
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36")
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build sheets HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Cache-busting timestamp — the script sits behind an edge cache
    /// that otherwise serves minutes-old reads.
    fn cache_bust() -> String {
        Utc::now().timestamp_millis().to_string()
    }

    // ── Read ──────────────────────────────────────────────────────────

    /// Fetch all rows of a sheet.
    pub async fn fetch_rows(&self, sheet: &str) -> Result<Vec<Value>, Error> {
        let ts = Self::cache_bust();

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("sheet", sheet), ("t", ts.as_str())])
            .header("Cache-Control", "no-cache, no-store, must-revalidate")
            .header("Pragma", "no-cache")
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Sheets {
                status,
                message: truncate(&body),
            });
        }

        let text = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        #[derive(serde::Deserialize)]
        struct QueryBody {
            #[serde(default)]
            data: Option<Vec<Value>>,
            #[serde(default)]
            error: Option<String>,
        }

        let body: QueryBody = serde_json::from_str(&text)
            .map_err(|_| Error::InvalidResponse(format!("non-JSON body for sheet {sheet}")))?;

        if let Some(err) = body.error {
            return Err(Error::Sheets {
                status,
                message: err,
            });
        }

        let rows = body.data.ok_or_else(|| {
            Error::InvalidResponse(format!("missing data array for sheet {sheet}"))
        })?;

        debug!("Fetched {} rows from sheet {}", rows.len(), sheet);
        Ok(rows)
    }

    // ── Write ─────────────────────────────────────────────────────────

    /// Append one row to a sheet.
    pub async fn append_row(&self, sheet: &str, row: Value) -> Result<(), Error> {
        let ts = Self::cache_bust();
        let body = serde_json::json!({ "action": "create", "data": row });

        let resp = self
            .client
            .post(&self.base_url)
            .query(&[("sheet", sheet), ("t", ts.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Sheets {
                status,
                message: truncate(&body),
            });
        }

        let text = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        #[derive(serde::Deserialize)]
        struct SubmitBody {
            #[serde(default)]
            success: Option<bool>,
            #[serde(default)]
            error: Option<String>,
        }

        let parsed: SubmitBody = serde_json::from_str(&text)
            .map_err(|_| Error::InvalidResponse(format!("non-JSON body for sheet {sheet}")))?;

        if parsed.success == Some(false) {
            return Err(Error::Sheets {
                status,
                message: parsed.error.unwrap_or_else(|| "submit rejected".into()),
            });
        }

        debug!("Appended row to sheet {}", sheet);
        Ok(())
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn fetch_rows(&self, sheet: &str) -> Result<Vec<Value>, Error> {
        SheetsClient::fetch_rows(self, sheet).await
    }

    async fn append_row(&self, sheet: &str, row: Value) -> Result<(), Error> {
        SheetsClient::append_row(self, sheet, row).await
    }
}

/// Clip error bodies to something loggable.
fn truncate(body: &str) -> String {
    body.chars().take(500).collect()
}
