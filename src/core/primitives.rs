use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

/// Epoch values below this bound are treated as seconds.
pub const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Returns `true` when a batch whose largest timestamp is `max_timestamp`
/// is expressed in seconds.
#[must_use]
pub fn is_seconds_scale(max_timestamp: i64) -> bool {
    max_timestamp < MILLIS_THRESHOLD
}

/// Normalizes a single epoch value to milliseconds.
#[must_use]
pub fn epoch_to_millis(timestamp: i64) -> i64 {
    if is_seconds_scale(timestamp) {
        timestamp.saturating_mul(1_000)
    } else {
        timestamp
    }
}

/// Zero-based month counter (`year * 12 + month0`) for an epoch in seconds.
#[must_use]
pub fn month_ordinal(epoch_seconds: i64) -> Option<i64> {
    let time = Utc.timestamp_opt(epoch_seconds, 0).single()?;
    Some(i64::from(time.year()) * 12 + i64::from(time.month0()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_are_promoted_to_millis() {
        assert_eq!(epoch_to_millis(1_700_000_000), 1_700_000_000_000);
        assert_eq!(epoch_to_millis(1_700_000_000_000), 1_700_000_000_000);
    }

    #[test]
    fn month_ordinal_counts_calendar_months() {
        // 2024-03-15T12:00:00Z and 2024-03-01T00:00:00Z
        assert_eq!(month_ordinal(1_710_504_000), Some(2024 * 12 + 2));
        assert_eq!(month_ordinal(1_709_251_200), month_ordinal(1_710_504_000));
        assert_eq!(month_ordinal(1_709_251_199), Some(2024 * 12 + 1));
    }
}
