//! Timestamp utilities and recency classification

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Millisecond count as a std `Duration`
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

/// Calendar-day recency bucket for session list grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyBucket {
    Today,
    Yesterday,
    ThisWeek,
    Older,
}

/// Classify `then` relative to `now` using midnight-aligned boundaries:
/// today since the current midnight, yesterday the one calendar day
/// before, this week within seven calendar days, everything earlier older.
///
/// Timestamps at or after the current midnight (including future ones)
/// classify as today.
pub fn recency_bucket(now: DateTime<Utc>, then: DateTime<Utc>) -> RecencyBucket {
    let today_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let yesterday_start = today_start - Duration::days(1);
    let week_start = today_start - Duration::days(7);

    if then >= today_start {
        RecencyBucket::Today
    } else if then >= yesterday_start {
        RecencyBucket::Yesterday
    } else if then >= week_start {
        RecencyBucket::ThisWeek
    } else {
        RecencyBucket::Older
    }
}
