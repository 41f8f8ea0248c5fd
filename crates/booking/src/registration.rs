//! Registration submissions: validation, pricing, and sheet-row assembly.
//!
//! Mirrors what the event's two forms collect. Validation returns a
//! field → message map (messages in Indonesian, as shown to visitors).
//! `RegistrationService` pre-checks conflicts against the cached snapshot
//! before appending, and refreshes the snapshot only after a successful
//! append — a failed write must never be followed by a refresh that looks
//! like confirmation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use common::{spot, DurationCode, Error, SheetStore};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::availability;
use crate::cache::{BookingCache, FunRunCache};

/// Chair rental price per unit (rupiah).
pub const CHAIR_PRICE: i64 = 10_000;
/// Table rental price per unit (rupiah).
pub const TABLE_PRICE: i64 = 25_000;

/// Field name → user-facing message.
pub type FieldErrors = BTreeMap<&'static str, String>;

// ── Tenant bookings ───────────────────────────────────────────────────

/// A pop-up market / trunk package booking submission.
#[derive(Debug, Clone)]
pub struct TenantSubmission {
    pub company_name: String,
    pub pic_name: String,
    pub whatsapp_number: String,
    pub purpose: String,
    pub product_type: String,
    pub product_detail: String,
    pub spot_id: String,
    pub duration: DurationCode,
    pub chair_count: u32,
    pub table_count: u32,
    pub payment_method: Option<String>,
    pub payment_proof_url: Option<String>,
}

impl TenantSubmission {
    /// Pure field validation; empty map means the submission is clean.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.company_name.trim().is_empty() {
            errors.insert("company_name", "Nama Perusahaan/Brand harus diisi".into());
        }
        if self.pic_name.trim().is_empty() {
            errors.insert("pic_name", "Nama PIC/Penanggung Jawab harus diisi".into());
        }
        if self.whatsapp_number.trim().is_empty() {
            errors.insert("whatsapp_number", "Nomor WhatsApp harus diisi".into());
        } else if !self.whatsapp_number.chars().all(|c| c.is_ascii_digit()) {
            errors.insert(
                "whatsapp_number",
                "Nomor WhatsApp hanya boleh berisi angka".into(),
            );
        }
        if self.purpose.trim().is_empty() {
            errors.insert("purpose", "Tujuan Pemesan harus dipilih".into());
        }
        if self.product_type.trim().is_empty() {
            errors.insert("product_type", "Jenis Product harus dipilih".into());
        }
        if self.product_detail.trim().is_empty() {
            errors.insert("product_detail", "Detail Produk harus diisi".into());
        }

        match spot(&self.spot_id) {
            None => {
                errors.insert("spot_id", "Posisi Tenan harus dipilih".into());
            }
            Some(info) if info.category().dates_for(self.duration).is_none() => {
                errors.insert("duration", "Durasi tidak tersedia untuk spot ini".into());
            }
            Some(_) => {}
        }

        errors
    }

    /// Calendar dates this booking occupies, derived from the spot's
    /// category and the chosen duration — never picked by the booker.
    /// Trunk packages never include 25 Oktober.
    pub fn dates_covered(&self) -> &'static [&'static str] {
        spot(&self.spot_id)
            .and_then(|s| s.category().dates_for(self.duration))
            .unwrap_or(&[])
    }

    pub fn base_price(&self) -> i64 {
        spot(&self.spot_id)
            .and_then(|s| s.base_price(self.duration))
            .unwrap_or(0)
    }

    pub fn additional_costs(&self) -> i64 {
        i64::from(self.chair_count) * CHAIR_PRICE + i64::from(self.table_count) * TABLE_PRICE
    }

    pub fn total_payment(&self) -> i64 {
        self.base_price() + self.additional_costs()
    }

    /// `"Kursi: 2 (Rp 20.000), Meja: 1 (Rp 25.000)"`, or `"Tidak ada"`.
    fn additions_label(&self) -> String {
        let mut parts = Vec::new();
        if self.chair_count > 0 {
            parts.push(format!(
                "Kursi: {} (Rp {})",
                self.chair_count,
                format_rupiah(i64::from(self.chair_count) * CHAIR_PRICE)
            ));
        }
        if self.table_count > 0 {
            parts.push(format!(
                "Meja: {} (Rp {})",
                self.table_count,
                format_rupiah(i64::from(self.table_count) * TABLE_PRICE)
            ));
        }
        if parts.is_empty() {
            "Tidak ada".into()
        } else {
            parts.join(", ")
        }
    }

    /// The row appended to the `tenants` sheet, keyed by the sheet's
    /// Indonesian column headers. `Booked` is left for staff to set after
    /// payment is confirmed.
    pub fn sheet_row(&self) -> Value {
        json!({
            "Nama Perusahaan/Brand": self.company_name,
            "Nama PIC/Penanggung Jawab": self.pic_name,
            "Nomor WhatsApp": self.whatsapp_number,
            "Tujuan Pemesan": self.purpose,
            "Jenis Product": self.product_type,
            "Detail Produk": self.product_detail,
            "Posisi Tenan": self.spot_id,
            "Tanggal": self.dates_covered().join(", "),
            "Durasi": self.duration.as_str(),
            "Tambahan Kebutuhan": self.additions_label(),
            "Total Pembayaran": self.total_payment(),
            "Metode Pembayaran": self.payment_method.clone().unwrap_or_else(|| "Transfer Bank".into()),
            "Tanggal Pendaftaran": Utc::now().format("%d/%m/%Y %H:%M").to_string(),
            "Status": "Pending",
            "Bukti Pembayaran URL": self.payment_proof_url.clone().unwrap_or_default(),
        })
    }
}

// ── Fun Run registrations ─────────────────────────────────────────────

/// A Fun Run participant (or community group) registration.
#[derive(Debug, Clone)]
pub struct FunRunSubmission {
    pub participant_name: String,
    pub gender: String,
    pub is_community: bool,
    pub responsible_person: Option<String>,
    /// Group size; only meaningful when `is_community`. 1..=25.
    pub community_quantity: u32,
    pub health_history: String,
    pub whatsapp_number: String,
    pub emergency_number: String,
    pub email: String,
    pub health_declaration: bool,
    pub photo_video_consent: bool,
    pub liability_waiver: bool,
}

impl FunRunSubmission {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.participant_name.trim().is_empty() {
            errors.insert(
                "participant_name",
                "Nama Perorangan/Komunitas harus diisi".into(),
            );
        }
        if self.gender.trim().is_empty() {
            errors.insert("gender", "Jenis Kelamin harus dipilih".into());
        }
        if self.is_community {
            if self
                .responsible_person
                .as_deref()
                .unwrap_or("")
                .trim()
                .is_empty()
            {
                errors.insert(
                    "responsible_person",
                    "Nama Penanggung Jawab harus diisi".into(),
                );
            }
            if self.community_quantity < 1 {
                errors.insert("community_quantity", "Jumlah orang minimal 1".into());
            } else if self.community_quantity > 25 {
                errors.insert("community_quantity", "Jumlah orang maksimal 25".into());
            }
        }
        if self.health_history.trim().is_empty() {
            errors.insert("health_history", "Riwayat Kesehatan harus diisi".into());
        }
        if self.whatsapp_number.trim().is_empty() {
            errors.insert("whatsapp_number", "Nomor WhatsApp harus diisi".into());
        } else if self.whatsapp_number.trim().len() < 10 {
            errors.insert("whatsapp_number", "Nomor WhatsApp minimal 10 digit".into());
        }
        if self.emergency_number.trim().is_empty() {
            errors.insert("emergency_number", "Nomor Emergency harus diisi".into());
        } else if self.emergency_number.trim().len() < 10 {
            errors.insert("emergency_number", "Nomor Emergency minimal 10 digit".into());
        }
        if self.email.trim().is_empty() {
            errors.insert("email", "Email harus diisi".into());
        } else if !looks_like_email(&self.email) {
            errors.insert("email", "Format email tidak valid".into());
        }
        if !self.health_declaration {
            errors.insert(
                "health_declaration",
                "Pernyataan kesehatan harus disetujui".into(),
            );
        }
        if !self.photo_video_consent {
            errors.insert(
                "photo_video_consent",
                "Persetujuan foto/video harus disetujui".into(),
            );
        }
        if !self.liability_waiver {
            errors.insert(
                "liability_waiver",
                "Pernyataan tanggung jawab harus disetujui".into(),
            );
        }

        errors
    }

    /// Slots this registration consumes against the 200-slot capacity.
    pub fn slots_requested(&self) -> i64 {
        if self.is_community {
            i64::from(self.community_quantity.max(1))
        } else {
            1
        }
    }

    pub fn sheet_row(&self) -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "participantName": self.participant_name,
            "gender": self.gender,
            "responsiblePerson": self.responsible_person.clone().unwrap_or_default(),
            "communityQuantity": if self.is_community { self.community_quantity.max(1) } else { 1 },
            "healthHistory": self.health_history,
            "whatsappNumber": self.whatsapp_number,
            "emergencyNumber": self.emergency_number,
            "email": self.email,
            "isCommunity": self.is_community,
            "healthDeclaration": self.health_declaration,
            "photoVideoConsent": self.photo_video_consent,
            "liabilityWaiver": self.liability_waiver,
            "created_at": Utc::now().to_rfc3339(),
        })
    }
}

// ── Service ───────────────────────────────────────────────────────────

/// Accepts validated submissions, appends them to the sheet, and keeps
/// the shared snapshots in sync.
pub struct RegistrationService {
    store: Arc<dyn SheetStore>,
    bookings: Arc<BookingCache>,
    funrun: Arc<FunRunCache>,
    bookings_sheet: String,
    funrun_sheet: String,
}

impl RegistrationService {
    pub fn new(
        store: Arc<dyn SheetStore>,
        bookings: Arc<BookingCache>,
        funrun: Arc<FunRunCache>,
        bookings_sheet: impl Into<String>,
        funrun_sheet: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bookings,
            funrun,
            bookings_sheet: bookings_sheet.into(),
            funrun_sheet: funrun_sheet.into(),
        }
    }

    /// Validate and append a tenant booking.
    ///
    /// The conflict pre-check runs against the cached snapshot; two
    /// visitors racing for the same spot can both pass it, and the
    /// resulting double booking is reconciled by staff.
    pub async fn submit_tenant(&self, submission: &TenantSubmission) -> Result<(), Error> {
        let errors = submission.validate();
        if !errors.is_empty() {
            return Err(validation_error(errors));
        }

        if let Err(e) = self.bookings.ensure_loaded().await {
            // Best-effort pre-check: without a snapshot the submit still
            // goes through and conflicts surface on reconciliation.
            warn!("Could not load bookings before submit: {}", e);
        }
        let snapshot = self.bookings.snapshot().await;
        if availability::is_duration_booked_for_spot(
            &snapshot,
            &submission.spot_id,
            submission.duration.as_str(),
        ) {
            return Err(Error::SlotTaken(format!(
                "{} / {}",
                submission.spot_id,
                submission.duration.as_str()
            )));
        }

        self.store
            .append_row(&self.bookings_sheet, submission.sheet_row())
            .await?;
        info!(
            "Tenant booking recorded: {} ({}) — Rp {}",
            submission.spot_id,
            submission.duration.as_str(),
            format_rupiah(submission.total_payment())
        );

        if let Err(e) = self.bookings.refresh().await {
            warn!("Post-submit refresh failed: {}", e);
        }
        Ok(())
    }

    /// Validate and append a Fun Run registration.
    pub async fn submit_fun_run(&self, submission: &FunRunSubmission) -> Result<(), Error> {
        let errors = submission.validate();
        if !errors.is_empty() {
            return Err(validation_error(errors));
        }

        if let Err(e) = self.funrun.ensure_loaded().await {
            warn!("Could not load Fun Run rows before submit: {}", e);
        }
        if self.funrun.slot_usage().await.is_full {
            return Err(Error::CapacityFull);
        }

        self.store
            .append_row(&self.funrun_sheet, submission.sheet_row())
            .await?;
        info!(
            "Fun Run registration recorded: {} ({} slot(s))",
            submission.participant_name,
            submission.slots_requested()
        );

        if let Err(e) = self.funrun.refresh().await {
            warn!("Post-submit refresh failed: {}", e);
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────

fn validation_error(errors: FieldErrors) -> Error {
    let joined = errors
        .iter()
        .map(|(field, msg)| format!("{field}: {msg}"))
        .collect::<Vec<_>>()
        .join("\n - ");
    Error::Validation(joined)
}

/// Id-ID thousands grouping: 325000 → "325.000".
fn format_rupiah(amount: i64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Same shape the registration form accepts: one `@`, a dotted domain,
/// no whitespace.
fn looks_like_email(s: &str) -> bool {
    let s = s.trim();
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use crate::cache::SheetCache;

    fn tenant_submission() -> TenantSubmission {
        TenantSubmission {
            company_name: "Kopi Tujuh".into(),
            pic_name: "Rina".into(),
            whatsapp_number: "08123456789".into(),
            purpose: "Jualan".into(),
            product_type: "Minuman".into(),
            product_detail: "Kopi susu gula aren".into(),
            spot_id: "spot-3".into(),
            duration: DurationCode::OneDay,
            chair_count: 0,
            table_count: 0,
            payment_method: None,
            payment_proof_url: None,
        }
    }

    fn fun_run_submission() -> FunRunSubmission {
        FunRunSubmission {
            participant_name: "Budi".into(),
            gender: "Laki-laki".into(),
            is_community: false,
            responsible_person: None,
            community_quantity: 1,
            health_history: "Tidak ada".into(),
            whatsapp_number: "0812345678901".into(),
            emergency_number: "0812345678902".into(),
            email: "budi@example.com".into(),
            health_declaration: true,
            photo_video_consent: true,
            liability_waiver: true,
        }
    }

    struct MockStore {
        rows: Mutex<Vec<Value>>,
        fail_append: AtomicBool,
    }

    impl MockStore {
        fn new(rows: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(rows),
                fail_append: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl SheetStore for MockStore {
        async fn fetch_rows(&self, _sheet: &str) -> Result<Vec<Value>, Error> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn append_row(&self, _sheet: &str, row: Value) -> Result<(), Error> {
            if self.fail_append.load(Ordering::SeqCst) {
                return Err(Error::Http("connection reset".into()));
            }
            self.rows.lock().unwrap().push(row);
            Ok(())
        }
    }

    fn service(store: Arc<MockStore>) -> RegistrationService {
        let bookings = Arc::new(SheetCache::new(
            store.clone() as Arc<dyn SheetStore>,
            "tenants",
        ));
        let funrun = Arc::new(SheetCache::new(
            store.clone() as Arc<dyn SheetStore>,
            "FunRun",
        ));
        RegistrationService::new(store, bookings, funrun, "tenants", "FunRun")
    }

    #[test]
    fn clean_tenant_submission_validates() {
        assert!(tenant_submission().validate().is_empty());
    }

    #[test]
    fn tenant_validation_flags_bad_fields() {
        let mut s = tenant_submission();
        s.company_name = "  ".into();
        s.whatsapp_number = "0812-345".into();
        let errors = s.validate();
        assert_eq!(
            errors.get("company_name").map(String::as_str),
            Some("Nama Perusahaan/Brand harus diisi")
        );
        assert_eq!(
            errors.get("whatsapp_number").map(String::as_str),
            Some("Nomor WhatsApp hanya boleh berisi angka")
        );
    }

    #[test]
    fn tenant_validation_rejects_category_mismatch() {
        let mut s = tenant_submission();
        // twoDay is a Trunk-only code; spot-3 is a regular hallway spot.
        s.duration = DurationCode::TwoDay;
        assert!(s.validate().contains_key("duration"));

        s.spot_id = "spot-19".into();
        assert!(s.validate().is_empty());
    }

    #[test]
    fn trunk_rows_never_include_the_middle_day() {
        let mut s = tenant_submission();
        s.spot_id = "spot-21".into();
        s.duration = DurationCode::TwoDay;
        let row = s.sheet_row();
        assert_eq!(row["Tanggal"], "24 Oktober, 26 Oktober");
        assert_eq!(row["Durasi"], "twoDay");
        assert_eq!(row["Status"], "Pending");
    }

    #[test]
    fn pricing_sums_base_and_extras() {
        let mut s = tenant_submission();
        s.duration = DurationCode::ThreeDayFull;
        s.chair_count = 2;
        s.table_count = 1;
        // spot-3: 300.000 base + 2×10.000 + 1×25.000
        assert_eq!(s.base_price(), 300_000);
        assert_eq!(s.additional_costs(), 45_000);
        assert_eq!(s.total_payment(), 345_000);

        let row = s.sheet_row();
        assert_eq!(row["Total Pembayaran"], 345_000);
        assert_eq!(
            row["Tambahan Kebutuhan"],
            "Kursi: 2 (Rp 20.000), Meja: 1 (Rp 25.000)"
        );
    }

    #[test]
    fn no_extras_reads_tidak_ada() {
        let row = tenant_submission().sheet_row();
        assert_eq!(row["Tambahan Kebutuhan"], "Tidak ada");
    }

    #[test]
    fn clean_fun_run_submission_validates() {
        assert!(fun_run_submission().validate().is_empty());
    }

    #[test]
    fn community_quantity_range_is_enforced_at_submission() {
        let mut s = fun_run_submission();
        s.is_community = true;
        s.responsible_person = Some("Rina".into());

        s.community_quantity = 0;
        assert_eq!(
            s.validate().get("community_quantity").map(String::as_str),
            Some("Jumlah orang minimal 1")
        );

        s.community_quantity = 26;
        assert_eq!(
            s.validate().get("community_quantity").map(String::as_str),
            Some("Jumlah orang maksimal 25")
        );

        s.community_quantity = 25;
        assert!(s.validate().is_empty());
    }

    #[test]
    fn declarations_must_all_be_accepted() {
        let mut s = fun_run_submission();
        s.liability_waiver = false;
        assert!(s.validate().contains_key("liability_waiver"));
    }

    #[test]
    fn email_shape_is_checked() {
        for bad in ["", "no-at-sign", "a@b", "a b@c.com", "a@.com"] {
            let mut s = fun_run_submission();
            s.email = bad.into();
            assert!(s.validate().contains_key("email"), "{bad:?} should fail");
        }
    }

    #[tokio::test]
    async fn submit_tenant_appends_and_refreshes() {
        let store = MockStore::new(Vec::new());
        let svc = service(store.clone());

        svc.submit_tenant(&tenant_submission()).await.unwrap();

        assert_eq!(store.rows.lock().unwrap().len(), 1);
        // The pending row is visible after the post-submit refresh, but
        // does not conflict until staff mark it booked.
        assert_eq!(svc.bookings.snapshot().await.len(), 1);
        assert!(!svc.bookings.is_duration_booked("spot-3", "oneDay").await);
    }

    #[tokio::test]
    async fn submit_tenant_rejects_taken_duration() {
        let store = MockStore::new(vec![json!({
            "Posisi Tenan": "spot-3",
            "Durasi": "oneDay",
            "Booked": true,
        })]);
        let svc = service(store.clone());

        let err = svc.submit_tenant(&tenant_submission()).await.unwrap_err();
        assert!(matches!(err, Error::SlotTaken(_)));
        assert_eq!(store.rows.lock().unwrap().len(), 1, "nothing appended");
    }

    #[tokio::test]
    async fn failed_append_does_not_refresh() {
        let store = MockStore::new(Vec::new());
        let svc = service(store.clone());

        // Prime the snapshot, then make the append fail.
        svc.bookings.ensure_loaded().await.unwrap();
        let before = svc.bookings.last_updated().await;
        store.fail_append.store(true, Ordering::SeqCst);

        assert!(svc.submit_tenant(&tenant_submission()).await.is_err());
        assert_eq!(
            svc.bookings.last_updated().await,
            before,
            "no refresh after a failed write"
        );
    }

    #[tokio::test]
    async fn submit_fun_run_rejects_when_full() {
        let rows: Vec<Value> = (0..200)
            .map(|i| json!({ "id": i.to_string(), "isCommunity": false }))
            .collect();
        let store = MockStore::new(rows);
        let svc = service(store.clone());

        let err = svc.submit_fun_run(&fun_run_submission()).await.unwrap_err();
        assert!(matches!(err, Error::CapacityFull));
        assert_eq!(store.rows.lock().unwrap().len(), 200);
    }

    #[tokio::test]
    async fn submit_fun_run_appends_and_updates_usage() {
        let store = MockStore::new(Vec::new());
        let svc = service(store.clone());

        let mut s = fun_run_submission();
        s.is_community = true;
        s.responsible_person = Some("Rina".into());
        s.community_quantity = 12;

        svc.submit_fun_run(&s).await.unwrap();

        let usage = svc.funrun.slot_usage().await;
        assert_eq!(usage.consumed, 12);
        assert_eq!(usage.available, 188);
    }
}
