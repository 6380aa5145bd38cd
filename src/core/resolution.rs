use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Series, SeriesStage};

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Unit of a bar resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    /// Approximated as 30 days for duration math; live merging compares
    /// calendar months instead.
    Month,
}

impl ResolutionUnit {
    #[must_use]
    pub const fn millis(self) -> i64 {
        match self {
            Self::Second => MILLIS_PER_SECOND,
            Self::Minute => MILLIS_PER_MINUTE,
            Self::Hour => MILLIS_PER_HOUR,
            Self::Day => MILLIS_PER_DAY,
            Self::Week => 7 * MILLIS_PER_DAY,
            Self::Month => 30 * MILLIS_PER_DAY,
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Second => "S",
            Self::Minute => "",
            Self::Hour => "H",
            Self::Day => "D",
            Self::Week => "W",
            Self::Month => "M",
        }
    }
}

/// Nominal bar duration, e.g. `"5"` (5 minutes), `"4H"`, `"1D"`, `"1M"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    count: u32,
    unit: ResolutionUnit,
}

impl Default for Resolution {
    fn default() -> Self {
        Self::minutes(1)
    }
}

impl Resolution {
    #[must_use]
    pub const fn new(count: u32, unit: ResolutionUnit) -> Self {
        Self { count, unit }
    }

    #[must_use]
    pub const fn minutes(count: u32) -> Self {
        Self::new(count, ResolutionUnit::Minute)
    }

    #[must_use]
    pub const fn hours(count: u32) -> Self {
        Self::new(count, ResolutionUnit::Hour)
    }

    #[must_use]
    pub const fn days(count: u32) -> Self {
        Self::new(count, ResolutionUnit::Day)
    }

    #[must_use]
    pub const fn weeks(count: u32) -> Self {
        Self::new(count, ResolutionUnit::Week)
    }

    #[must_use]
    pub const fn months(count: u32) -> Self {
        Self::new(count, ResolutionUnit::Month)
    }

    /// Parses a resolution string.
    ///
    /// A bare integer means minutes; suffixes `S`, `H`, `D`, `W` (any case),
    /// `M` (months) and `m` (minutes) select the unit. A missing count means
    /// one. Anything unparseable, including a zero count, falls back to one
    /// minute.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::try_parse(text).unwrap_or_else(|| {
            trace!(resolution = text, "unparseable resolution, using 1 minute");
            Self::default()
        })
    }

    #[must_use]
    pub fn try_parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits_end = text
            .char_indices()
            .find(|(_, ch)| !ch.is_ascii_digit())
            .map_or(text.len(), |(index, _)| index);
        let (digits, suffix) = text.split_at(digits_end);

        let unit = match suffix {
            "" if !digits.is_empty() => ResolutionUnit::Minute,
            "m" => ResolutionUnit::Minute,
            "M" => ResolutionUnit::Month,
            "S" | "s" => ResolutionUnit::Second,
            "H" | "h" => ResolutionUnit::Hour,
            "D" | "d" => ResolutionUnit::Day,
            "W" | "w" => ResolutionUnit::Week,
            _ => return None,
        };
        let count = if digits.is_empty() {
            1
        } else {
            digits.parse::<u32>().ok()?
        };
        if count == 0 {
            return None;
        }
        Some(Self { count, unit })
    }

    #[must_use]
    pub const fn count(self) -> u32 {
        self.count
    }

    #[must_use]
    pub const fn unit(self) -> ResolutionUnit {
        self.unit
    }

    #[must_use]
    pub const fn is_month_based(self) -> bool {
        matches!(self.unit, ResolutionUnit::Month)
    }

    #[must_use]
    pub fn duration_ms(self) -> i64 {
        i64::from(self.count).saturating_mul(self.unit.millis())
    }

    #[must_use]
    pub fn duration_seconds(self) -> i64 {
        self.duration_ms() / MILLIS_PER_SECOND
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.suffix())
    }
}

/// Chart period selected by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChartPeriod {
    /// Intraday session; the only period with market-hours handling.
    OneDay,
    OneWeek,
    OneMonth,
    OneYear,
    FiveYear,
    YearToDate,
    /// Any other period: data passes through unbucketed.
    #[default]
    All,
}

impl ChartPeriod {
    /// Parses a period key (`1D`, `1W`, `1M`, `1Y`, `5Y`, `YTD`), case-insensitive.
    /// Unknown keys map to [`ChartPeriod::All`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_uppercase().as_str() {
            "1D" => Self::OneDay,
            "1W" => Self::OneWeek,
            "1M" => Self::OneMonth,
            "1Y" => Self::OneYear,
            "5Y" => Self::FiveYear,
            "YTD" => Self::YearToDate,
            _ => Self::All,
        }
    }

    #[must_use]
    pub const fn is_intraday(self) -> bool {
        matches!(self, Self::OneDay)
    }

    /// Bucket resolution for this period, or `None` for pass-through periods.
    ///
    /// Year-to-date depends on how far into the year `now` is.
    #[must_use]
    pub fn bucket_resolution(self, now: DateTime<Utc>) -> Option<Resolution> {
        match self {
            Self::OneDay => Some(Resolution::minutes(1)),
            Self::OneWeek => Some(Resolution::minutes(15)),
            Self::OneMonth => Some(Resolution::hours(1)),
            Self::OneYear => Some(Resolution::days(1)),
            Self::FiveYear => Some(Resolution::weeks(1)),
            Self::YearToDate => Some(year_to_date_resolution(now)),
            Self::All => None,
        }
    }
}

fn year_to_date_resolution(now: DateTime<Utc>) -> Resolution {
    let day_of_year = now.ordinal();
    match (now.month(), now.day()) {
        (1, 1) => Resolution::minutes(1),
        (1, day) if day <= 7 => Resolution::minutes(15),
        (1, _) => Resolution::hours(1),
        (month, _) if month <= 3 || day_of_year <= 90 => Resolution::hours(4),
        _ => Resolution::days(1),
    }
}

/// Buckets a normalized series by the period's resolution.
///
/// Series without timestamps and pass-through periods are returned unchanged.
#[must_use]
pub fn bucket_series(series: &Series, period: ChartPeriod, now: DateTime<Utc>) -> SeriesStage {
    match period.bucket_resolution(now) {
        Some(resolution) => bucket_by_duration(series, resolution.duration_ms()),
        None => SeriesStage::identity(series.clone()),
    }
}

/// Groups samples into `floor(timestamp / bucket_ms)` buckets keeping the
/// latest-timestamped sample of each bucket. Ties keep the later sample.
#[must_use]
pub fn bucket_by_duration(series: &Series, bucket_ms: i64) -> SeriesStage {
    let Some(timestamps) = series.timestamps() else {
        return SeriesStage::identity(series.clone());
    };
    if bucket_ms <= 0 {
        return SeriesStage::identity(series.clone());
    }

    let mut buckets: BTreeMap<i64, usize> = BTreeMap::new();
    for (index, timestamp) in timestamps.iter().copied().enumerate() {
        let key = timestamp.div_euclid(bucket_ms);
        buckets
            .entry(key)
            .and_modify(|kept| {
                if timestamp >= timestamps[*kept] {
                    *kept = index;
                }
            })
            .or_insert(index);
    }

    let source_indices: Vec<usize> = buckets.into_values().collect();
    trace!(
        input = series.len(),
        buckets = source_indices.len(),
        bucket_ms,
        "bucketed series"
    );
    SeriesStage {
        series: series.select(&source_indices),
        source_indices,
    }
}
