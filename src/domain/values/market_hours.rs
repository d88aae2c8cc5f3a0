//! US equity market-hours detection.
//!
//! Uses a fixed UTC-5 offset for Eastern Time year-round, so sessions drift
//! by one hour during daylight saving. Known simplification carried from the
//! deployed configuration; swap in a tz-aware offset if DST accuracy matters.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};

const ET_UTC_OFFSET_HOURS: i32 = -5;

fn to_eastern(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    // Offset constant is in range; FixedOffset::east_opt only fails past ±24h.
    let offset = FixedOffset::east_opt(ET_UTC_OFFSET_HOURS * 3600).unwrap();
    now.with_timezone(&offset)
}

pub fn is_weekend(now: DateTime<Utc>) -> bool {
    matches!(to_eastern(now).weekday(), Weekday::Sat | Weekday::Sun)
}

/// NYSE core session: Monday-Friday 09:30-16:00 ET.
pub fn is_market_hours(now: DateTime<Utc>) -> bool {
    let et = to_eastern(now);
    if matches!(et.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let minutes = et.hour() * 60 + et.minute();
    (9 * 60 + 30..=16 * 60).contains(&minutes)
}
