/// Sample staleness detection.
///
/// USGS gauges report every 15 minutes and NWRFC bulletins hourly. A river
/// whose newest flow sample is hours old usually means a gauge outage, which
/// is worth a warning even though the record is still served as-is.
///
/// # Clock injection
/// Functions take a `now: DateTime<Utc>` parameter rather than calling
/// `Utc::now()` internally, so tests stay deterministic.

use chrono::{DateTime, Utc};

use crate::model::Sample;

/// Default age after which the newest flow sample is reported as stale.
pub const DEFAULT_STALE_AFTER_MINUTES: i64 = 180;

/// Whole minutes between the sample and `now`. Negative for samples
/// stamped in the future.
pub fn age_minutes_at(sample: &Sample, now: DateTime<Utc>) -> i64 {
    (now - sample.time.with_timezone(&Utc)).num_minutes()
}

/// Returns `true` if the sample is strictly older than `max_age_minutes`.
pub fn is_stale_at(sample: &Sample, max_age_minutes: i64, now: DateTime<Utc>) -> bool {
    age_minutes_at(sample, now) > max_age_minutes
}
