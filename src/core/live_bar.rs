use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::Resolution;
use crate::core::primitives::{decimal_to_f64, month_ordinal};
use crate::error::{ChartError, ChartResult};

const MICROS_PER_SECOND: i64 = 1_000_000;
const SECONDS_PER_MINUTE: i64 = 60;

/// OHLC(V) aggregate over one resolution-sized bucket. `time` is epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl OhlcBar {
    #[must_use]
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    #[must_use]
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// One streaming tick. `timestamp` is epoch microseconds; prices are in the
/// feed's raw units until converted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LiveUpdate {
    pub timestamp: i64,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub bucket_volume: Option<f64>,
}

impl LiveUpdate {
    #[must_use]
    pub fn new(timestamp_micros: i64) -> Self {
        Self {
            timestamp: timestamp_micros,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ohlc(mut self, open: f64, high: f64, low: f64, close: f64) -> Self {
        self.open = Some(open);
        self.high = Some(high);
        self.low = Some(low);
        self.close = Some(close);
        self
    }

    #[must_use]
    pub fn with_close(mut self, close: f64) -> Self {
        self.close = Some(close);
        self
    }

    #[must_use]
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.bucket_volume = Some(volume);
        self
    }

    /// Builds a tick from strongly-typed temporal/decimal input.
    pub fn from_decimal_time(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> ChartResult<Self> {
        Ok(Self::new(time.timestamp_micros()).with_ohlc(
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
        ))
    }

    /// Tick time in whole epoch seconds.
    #[must_use]
    pub fn seconds(self) -> i64 {
        self.timestamp.div_euclid(MICROS_PER_SECOND)
    }
}

/// Conversion applied to tick prices before they enter a bar, e.g. feeds
/// that publish integer minor units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum PriceConversion {
    #[default]
    Identity,
    Divide(f64),
}

impl PriceConversion {
    pub fn divisor(divisor: f64) -> ChartResult<Self> {
        if !divisor.is_finite() || divisor == 0.0 {
            return Err(ChartError::InvalidConfig(
                "price divisor must be finite and non-zero".to_owned(),
            ));
        }
        if divisor == 1.0 {
            return Ok(Self::Identity);
        }
        Ok(Self::Divide(divisor))
    }

    #[must_use]
    pub fn apply(self, price: f64) -> f64 {
        match self {
            Self::Identity => price,
            Self::Divide(divisor) => price / divisor,
        }
    }
}

/// Merge decision for one tick against the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarDecision {
    /// First tick without history.
    Bootstrap,
    /// Tick folds into the current bar.
    Merge,
    /// Tick opens a new bar.
    NewBar,
}

/// Decides whether a tick at `current_seconds` belongs to `last_bar`.
///
/// Month resolutions compare calendar months; everything else compares the
/// elapsed seconds against the resolution duration.
#[must_use]
pub fn should_merge(last_bar_time: i64, current_seconds: i64, resolution: Resolution) -> bool {
    if resolution.is_month_based() {
        return match (month_ordinal(last_bar_time), month_ordinal(current_seconds)) {
            (Some(last), Some(current)) => current - last < i64::from(resolution.count()),
            _ => false,
        };
    }
    current_seconds - last_bar_time < resolution.duration_seconds()
}

/// Folds one tick into the bar stream without price conversion.
///
/// See [`process_live_update_with`].
#[must_use]
pub fn process_live_update(
    update: &LiveUpdate,
    last_bar: Option<&OhlcBar>,
    resolution: Resolution,
) -> Option<OhlcBar> {
    process_live_update_with(update, last_bar, resolution, PriceConversion::Identity)
        .map(|(bar, _)| bar)
}

/// Folds one tick into the bar stream.
///
/// Returns `None` for ticks whose timestamp is not positive once truncated to
/// seconds, and for a bootstrap tick carrying no price at all; callers must
/// ignore such ticks. Otherwise returns either the merged current bar (same
/// `time` as `last_bar`) or a new bar aligned to the minute, or to the
/// resolution itself when it is shorter than a minute.
///
/// Missing tick fields fall back to `close`; a tick without any price reuses
/// the current bar's close when merging.
#[must_use]
pub fn process_live_update_with(
    update: &LiveUpdate,
    last_bar: Option<&OhlcBar>,
    resolution: Resolution,
    conversion: PriceConversion,
) -> Option<(OhlcBar, BarDecision)> {
    let current_seconds = update.seconds();
    if current_seconds <= 0 {
        return None;
    }

    let alignment = bar_alignment_seconds(resolution);
    let aligned = current_seconds.div_euclid(alignment) * alignment;
    let Some(last_bar) = last_bar else {
        let bar = candidate_bar(update, aligned, None, conversion)?;
        return Some((bar, BarDecision::Bootstrap));
    };

    if !should_merge(last_bar.time, current_seconds, resolution) {
        let bar = candidate_bar(update, aligned, Some(last_bar.close), conversion)?;
        return Some((bar, BarDecision::NewBar));
    }

    let candidate = candidate_bar(update, last_bar.time, Some(last_bar.close), conversion)?;
    let volume = match (last_bar.volume, candidate.volume) {
        (None, None) => None,
        (left, right) => Some(left.unwrap_or(0.0) + right.unwrap_or(0.0)),
    };
    let merged = OhlcBar {
        time: last_bar.time,
        open: last_bar.open,
        high: last_bar.high.max(candidate.high),
        low: last_bar.low.min(candidate.low),
        close: candidate.close,
        volume,
    };
    Some((merged, BarDecision::Merge))
}

// Sub-minute bars align to their own duration so a new bar never lands on
// the current bar's minute.
fn bar_alignment_seconds(resolution: Resolution) -> i64 {
    if resolution.is_month_based() {
        return SECONDS_PER_MINUTE;
    }
    resolution.duration_seconds().clamp(1, SECONDS_PER_MINUTE)
}

fn candidate_bar(
    update: &LiveUpdate,
    time: i64,
    fallback_close: Option<f64>,
    conversion: PriceConversion,
) -> Option<OhlcBar> {
    let convert = |price: Option<f64>| {
        price
            .filter(|value| value.is_finite())
            .map(|value| conversion.apply(value))
    };
    let (open, high, low, close) = (
        convert(update.open),
        convert(update.high),
        convert(update.low),
        convert(update.close),
    );

    let close = close.or(open).or(high).or(low).or(fallback_close)?;
    let open = open.unwrap_or(close);
    let high = high.unwrap_or(open.max(close));
    let low = low.unwrap_or(open.min(close));
    Some(OhlcBar {
        time,
        open,
        high,
        low,
        close,
        volume: update.bucket_volume.filter(|value| value.is_finite()),
    })
}
