//! Domain types shared across the booking core.

use serde::{Deserialize, Deserializer, Serialize};

// ── Sheet records ─────────────────────────────────────────────────────

/// A tenant booking row as stored in the `tenants` sheet.
///
/// Column headers are the Indonesian labels the spreadsheet uses. Every
/// field is defaulted: the sheet has no schema enforcement and rows edited
/// by staff arrive with cells missing or retyped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(rename = "Nama Perusahaan/Brand", default)]
    pub company: String,

    /// Venue spot identifier, e.g. `spot-19`. Not unique per row — a spot
    /// carries one row per booked duration.
    #[serde(rename = "Posisi Tenan", default)]
    pub spot_id: String,

    /// Comma-separated date labels, e.g. `"24 Oktober, 26 Oktober"`.
    #[serde(rename = "Tanggal", default)]
    pub dates: String,

    /// Duration code as stored (`threeDayFull`, `twoDay`, ...). Compared
    /// as an opaque string.
    #[serde(rename = "Durasi", default)]
    pub duration: String,

    #[serde(rename = "Status", default)]
    pub status: String,

    /// Set by staff once payment is confirmed. Only booked rows count
    /// toward conflicts.
    #[serde(rename = "Booked", default, deserialize_with = "flexible_bool")]
    pub booked: bool,
}

impl BookingRecord {
    /// Date labels covered by this row. Empty or missing cells yield an
    /// empty list rather than an error.
    pub fn dates_covered(&self) -> Vec<&str> {
        self.dates
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .collect()
    }
}

/// A Fun Run registration row from the `FunRun` sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunRunRecord {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "participantName", default)]
    pub participant_name: String,

    /// A community registration books slots for a whole group.
    #[serde(rename = "isCommunity", default, deserialize_with = "flexible_bool")]
    pub is_community: bool,

    /// Raw cell value — number, numeric string, `"0"`, empty, or absent.
    /// Coerced by the availability engine at aggregation time.
    #[serde(rename = "communityQuantity", default)]
    pub community_quantity: serde_json::Value,
}

/// Aggregated Fun Run capacity usage.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SlotUsage {
    pub consumed: i64,
    pub capacity: i64,
    pub available: i64,
    pub is_full: bool,
}

// ── Duration codes ────────────────────────────────────────────────────

/// The bookable time-window categories.
///
/// Stored in the sheet as the camelCase string. Regular spots sell the
/// three-day variants plus `oneDay`; Trunk Package spots sell `twoDay`
/// and `oneDay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DurationCode {
    ThreeDayFull,
    ThreeDayPartial,
    TwoDay,
    OneDay,
}

impl DurationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DurationCode::ThreeDayFull => "threeDayFull",
            DurationCode::ThreeDayPartial => "threeDayPartial",
            DurationCode::TwoDay => "twoDay",
            DurationCode::OneDay => "oneDay",
        }
    }

    /// Human label used on the registration form.
    pub fn label(self) -> &'static str {
        match self {
            DurationCode::ThreeDayFull => "3 Hari Full",
            DurationCode::ThreeDayPartial => "3 Hari Partial",
            DurationCode::TwoDay => "2 Hari",
            DurationCode::OneDay => "1 Hari",
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────

/// Accepts `true`/`false`, `"TRUE"`/`"true"`, and 0/1 — checkbox columns
/// come back in all three encodings depending on how the row was entered.
fn flexible_bool<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(de)?;
    Ok(match v {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        serde_json::Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn booking_record_parses_sheet_row() {
        let row = json!({
            "Nama Perusahaan/Brand": "Kopi Tujuh",
            "Posisi Tenan": "spot-3",
            "Tanggal": "24 Oktober, 25 Oktober, 26 Oktober",
            "Durasi": "threeDayFull",
            "Status": "Pending",
            "Booked": true,
        });
        let rec: BookingRecord = serde_json::from_value(row).unwrap();
        assert_eq!(rec.spot_id, "spot-3");
        assert!(rec.booked);
        assert_eq!(
            rec.dates_covered(),
            vec!["24 Oktober", "25 Oktober", "26 Oktober"]
        );
    }

    #[test]
    fn booking_record_tolerates_missing_cells() {
        let rec: BookingRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(rec.spot_id, "");
        assert!(!rec.booked);
        assert!(rec.dates_covered().is_empty());
    }

    #[test]
    fn booked_flag_accepts_string_and_number_encodings() {
        for raw in [json!("TRUE"), json!("true"), json!(1), json!(true)] {
            let rec: BookingRecord =
                serde_json::from_value(json!({ "Booked": raw })).unwrap();
            assert!(rec.booked, "expected booked for {:?}", rec);
        }
        for raw in [json!("FALSE"), json!(""), json!(0), json!(false), json!(null)] {
            let rec: BookingRecord =
                serde_json::from_value(json!({ "Booked": raw })).unwrap();
            assert!(!rec.booked, "expected not booked for {:?}", rec);
        }
    }

    #[test]
    fn duration_code_round_trips_as_camel_case() {
        let s = serde_json::to_string(&DurationCode::ThreeDayPartial).unwrap();
        assert_eq!(s, "\"threeDayPartial\"");
        assert_eq!(DurationCode::TwoDay.as_str(), "twoDay");
    }
}
