//! Time Engine - wall-clock readings for the widget
//!
//! Supplies the local hour that separates past from future, resolved in a
//! chosen IANA time zone.

use chrono::{DateTime, Local, Timelike, Utc};
use chrono_tz::Tz;

use crate::day_fraction::DAY_LENGTH_MS;

/// Wall-clock reading for a single frame
#[derive(Debug, Clone)]
pub struct WallClock {
    /// Hour in 24-hour format (0-23)
    pub hour24: u32,
    /// Minute (0-59)
    pub minute: u32,
    /// Second (0-59)
    pub second: u32,
    /// Milliseconds since local midnight
    pub millis_since_midnight: i64,
    /// Time zone abbreviation (e.g., "PST", "CEST")
    pub tz_abbrev: String,
}

impl WallClock {
    /// Position of this instant within the day, in [0, 1)
    pub fn day_fraction(&self) -> f64 {
        self.millis_since_midnight as f64 / DAY_LENGTH_MS as f64
    }

    /// Format the time as "HH:MM:SS"
    pub fn format_time(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour24, self.minute, self.second)
    }
}

/// Read the wall clock in `tz` right now
pub fn compute_wall_clock(tz: Tz) -> WallClock {
    compute_wall_clock_at(tz, Utc::now())
}

/// Read the wall clock in `tz` at a specific instant
pub fn compute_wall_clock_at(tz: Tz, now_utc: DateTime<Utc>) -> WallClock {
    let local = now_utc.with_timezone(&tz);

    // Leap seconds report nanos >= 1e9; keep the reading inside the day
    let millis_in_second = (local.nanosecond() / 1_000_000).min(999) as i64;
    let millis_since_midnight =
        local.num_seconds_from_midnight() as i64 * 1000 + millis_in_second;

    WallClock {
        hour24: local.hour(),
        minute: local.minute(),
        second: local.second(),
        millis_since_midnight,
        tz_abbrev: local.format("%Z").to_string(),
    }
}

/// Get the system's local timezone as a chrono-tz Tz
pub fn system_timezone() -> Option<Tz> {
    if let Ok(name) = std::env::var("TZ") {
        if let Ok(tz) = name.trim_start_matches(':').parse::<Tz>() {
            return Some(tz);
        }
    }

    // Abbreviations rarely parse, but "UTC" and a few others do
    let local_now = Local::now();
    let tz_name = local_now.format("%Z").to_string();
    tz_name.parse::<Tz>().ok()
}

/// Parse a timezone string into a Tz
pub fn parse_timezone(tz_str: &str) -> Result<Tz, String> {
    tz_str
        .parse::<Tz>()
        .map_err(|_| format!("Invalid timezone: {}", tz_str))
}
