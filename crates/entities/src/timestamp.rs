//! Timestamp precision shared by every entity.

use chrono::{DateTime, SubsecRound, Utc};

/// Fractional-second digits kept on entity timestamps. SQLite stores
/// microseconds, so anything finer would not survive a round trip.
pub const TIMESTAMP_PRECISION: u16 = 6;

/// Truncates `time` to [`TIMESTAMP_PRECISION`].
pub fn truncate_timestamp(time: DateTime<Utc>) -> DateTime<Utc> {
    time.trunc_subsecs(TIMESTAMP_PRECISION)
}

/// The current time at entity precision.
pub fn now() -> DateTime<Utc> {
    truncate_timestamp(Utc::now())
}
