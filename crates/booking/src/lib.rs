//! Booking availability core.
//!
//! Pure availability queries over sheet snapshots, the synchronized
//! snapshot cache shared across tasks, and the registration submission
//! layer.

pub mod availability;
pub mod cache;
pub mod registration;

pub use availability::{
    booked_dates_for_spot, booked_durations_for_spot, fun_run_slot_usage,
    is_date_booked_for_spot, is_duration_booked_for_spot, is_spot_completely_booked,
    FUN_RUN_CAPACITY,
};
pub use cache::{BookingCache, CachePhase, FunRunCache, SheetCache};
pub use registration::{FieldErrors, FunRunSubmission, RegistrationService, TenantSubmission};
