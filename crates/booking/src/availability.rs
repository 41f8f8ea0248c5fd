//! Availability queries over sheet snapshots.
//!
//! Pure functions: the cache hands these a snapshot and they answer
//! conflict and capacity questions. Every function is total over
//! malformed rows — the sheet has no schema enforcement, so absent or
//! garbage cells degrade to "not booked" / "counts as one" instead of
//! erroring.

use std::collections::HashSet;

use common::{BookingRecord, FunRunRecord, SlotUsage, EVENT_DATES};
use serde_json::Value;

/// Fixed Fun Run capacity for the event.
pub const FUN_RUN_CAPACITY: i64 = 200;

/// Whether `duration` is already taken for `spot_id`.
///
/// Exact string match on the duration code; validating that the code
/// belongs to the spot's category is the caller's job. Unknown spots and
/// empty snapshots read as available.
pub fn is_duration_booked_for_spot(
    records: &[BookingRecord],
    spot_id: &str,
    duration: &str,
) -> bool {
    records
        .iter()
        .any(|r| r.booked && r.spot_id == spot_id && r.duration == duration)
}

/// Duration codes already booked for `spot_id`, in row order.
///
/// Not deduplicated — a spot legitimately carries several rows and the
/// presentation layer decides how to collapse them.
pub fn booked_durations_for_spot<'a>(
    records: &'a [BookingRecord],
    spot_id: &str,
) -> Vec<&'a str> {
    records
        .iter()
        .filter(|r| r.booked && r.spot_id == spot_id)
        .map(|r| r.duration.as_str())
        .collect()
}

/// Every date label occupied on `spot_id`, split out of the `Tanggal`
/// cells of its booked rows.
pub fn booked_dates_for_spot(records: &[BookingRecord], spot_id: &str) -> Vec<String> {
    records
        .iter()
        .filter(|r| r.booked && r.spot_id == spot_id)
        .flat_map(|r| {
            r.dates_covered()
                .into_iter()
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn is_date_booked_for_spot(records: &[BookingRecord], spot_id: &str, date: &str) -> bool {
    records
        .iter()
        .filter(|r| r.booked && r.spot_id == spot_id)
        .any(|r| r.dates_covered().iter().any(|d| *d == date))
}

/// Whether every event date is occupied on `spot_id`.
///
/// Union of the booked rows' date cells checked against the full 3-date
/// universe. Rows with empty or mangled date cells contribute nothing,
/// pushing the answer toward "not fully booked" — for a spot that might
/// still be sellable, under-reporting beats over-reporting.
pub fn is_spot_completely_booked(records: &[BookingRecord], spot_id: &str) -> bool {
    let covered: HashSet<&str> = records
        .iter()
        .filter(|r| r.booked && r.spot_id == spot_id)
        .flat_map(|r| r.dates_covered())
        .collect();
    EVENT_DATES.iter().all(|d| covered.contains(d))
}

/// Coerce a raw `communityQuantity` cell into a slot count.
///
/// Missing, empty, zero, and unparseable cells count as one participant.
/// Anything else is used as stored — the 1..=25 range is a submission
/// rule, not an aggregation rule, and rows already in the sheet are
/// summed as-is.
fn coerce_quantity(raw: &Value) -> i64 {
    let parsed = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        None | Some(0) => 1,
        Some(q) => q,
    }
}

/// Aggregate Fun Run slot consumption against the fixed capacity.
///
/// Recomputed over the full record set on every call. Volume is a few
/// hundred rows at most; recomputation avoids keeping a running counter
/// consistent with a sheet that staff edit by hand.
pub fn fun_run_slot_usage(records: &[FunRunRecord]) -> SlotUsage {
    let consumed: i64 = records
        .iter()
        .map(|r| {
            if r.is_community {
                coerce_quantity(&r.community_quantity)
            } else {
                1
            }
        })
        .sum();
    let available = (FUN_RUN_CAPACITY - consumed).max(0);
    SlotUsage {
        consumed,
        capacity: FUN_RUN_CAPACITY,
        available,
        is_full: available <= 0,
    }
}
