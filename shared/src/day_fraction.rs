//! Day fraction conversions
//!
//! Positions within a day are stored as fractions in [0, 1), 0 being local
//! midnight. Hosts talk in milliseconds since midnight.

use chrono::{Duration, NaiveTime};

/// Length of a day in milliseconds
pub const DAY_LENGTH_MS: i64 = 86_400_000;

/// Convert milliseconds to a day fraction.
///
/// Values outside a single day wrap around, so -1h becomes 23:00.
pub fn millis_to_fraction(millis: i64) -> f64 {
    millis.rem_euclid(DAY_LENGTH_MS) as f64 / DAY_LENGTH_MS as f64
}

/// Convert a day fraction to milliseconds since midnight
pub fn fraction_to_millis(fraction: f64) -> i64 {
    (fraction * DAY_LENGTH_MS as f64).round() as i64
}

/// Format milliseconds since midnight as "HH:MM"
pub fn format_clock(millis: i64) -> String {
    let time = NaiveTime::MIN + Duration::milliseconds(millis.rem_euclid(DAY_LENGTH_MS));
    time.format("%H:%M").to_string()
}
