//! Port to the external spreadsheet service.

use async_trait::async_trait;
use serde_json::Value;

use crate::Error;

/// Durable row storage backed by the spreadsheet web app.
///
/// `fetch_rows` returns every row of a sheet as loose JSON objects — the
/// service offers no server-side filtering or pagination. `append_row`
/// appends one record with no idempotency guarantee; a retried submit can
/// land twice and is reconciled by staff, not by this layer.
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn fetch_rows(&self, sheet: &str) -> Result<Vec<Value>, Error>;
    async fn append_row(&self, sheet: &str, row: Value) -> Result<(), Error>;
}
