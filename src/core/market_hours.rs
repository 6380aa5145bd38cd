use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_millis, epoch_to_millis};
use crate::core::{ChartPeriod, Series};

/// Trading-session bound supplied by the host, either as a raw epoch
/// (seconds or milliseconds) or as a UTC date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketBound {
    Epoch(i64),
    DateTime(DateTime<Utc>),
}

impl MarketBound {
    #[must_use]
    pub fn to_millis(self) -> i64 {
        match self {
            Self::Epoch(value) => epoch_to_millis(value),
            Self::DateTime(time) => datetime_to_unix_millis(time),
        }
    }
}

impl From<DateTime<Utc>> for MarketBound {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<i64> for MarketBound {
    fn from(value: i64) -> Self {
        Self::Epoch(value)
    }
}

/// Session window in epoch milliseconds, `start_time <= close_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketHoursRange {
    pub start_time: i64,
    pub close_time: i64,
}

impl MarketHoursRange {
    #[must_use]
    pub fn new(start: MarketBound, close: MarketBound) -> Self {
        let start = start.to_millis();
        let close = close.to_millis();
        Self {
            start_time: start.min(close),
            close_time: start.max(close),
        }
    }

    #[must_use]
    pub fn contains(self, timestamp: i64) -> bool {
        (self.start_time..=self.close_time).contains(&timestamp)
    }

    /// Uniformly spaced timestamp for sample `index` of `len` samples spread
    /// across the session.
    #[must_use]
    pub fn synthesized_timestamp(self, index: usize, len: usize) -> i64 {
        if len <= 1 {
            return self.start_time;
        }
        if index >= len - 1 {
            return self.close_time;
        }
        // f64 span: the i64 difference overflows for bounds near the extremes.
        let span = self.close_time as f64 - self.start_time as f64;
        let ratio = index as f64 / (len - 1) as f64;
        let offset = (span * ratio).round() as i64;
        self.start_time.saturating_add(offset).min(self.close_time)
    }
}

/// Result of the market-hours stage.
///
/// `filtered_*` is the full session (drives the Y domain and axis width),
/// `plotted_*` is the session so far (what is actually drawn). Both index
/// lists point into the input series. `plotted_times` carries the session
/// timestamp of every plotted sample, real or synthesized, and is present
/// only when a session range applies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketHoursSelection {
    pub filtered: Series,
    pub filtered_indices: Vec<usize>,
    pub plotted: Series,
    pub plotted_indices: Vec<usize>,
    pub plotted_times: Option<Vec<i64>>,
    pub range: Option<MarketHoursRange>,
}

impl MarketHoursSelection {
    fn unfiltered(series: &Series) -> Self {
        let indices: Vec<usize> = (0..series.len()).collect();
        Self {
            filtered: series.clone(),
            filtered_indices: indices.clone(),
            plotted: series.clone(),
            plotted_indices: indices,
            plotted_times: None,
            range: None,
        }
    }
}

/// Restricts an intraday series to its trading session.
///
/// Any period other than [`ChartPeriod::OneDay`], or a missing bound,
/// returns the full series with `range = None`. `now_ms` is the current
/// epoch in milliseconds.
#[must_use]
pub fn filter_market_hours(
    series: &Series,
    period: ChartPeriod,
    market_start: Option<MarketBound>,
    market_close: Option<MarketBound>,
    now_ms: i64,
) -> MarketHoursSelection {
    let (Some(start), Some(close)) = (market_start, market_close) else {
        return MarketHoursSelection::unfiltered(series);
    };
    if !period.is_intraday() {
        return MarketHoursSelection::unfiltered(series);
    }

    let range = MarketHoursRange::new(start, close);
    let len = series.len();
    let timestamps: Vec<i64> = match series.timestamps() {
        Some(timestamps) => timestamps.to_vec(),
        None => (0..len)
            .map(|index| range.synthesized_timestamp(index, len))
            .collect(),
    };

    let filtered_indices: Vec<usize> = (0..len)
        .filter(|&index| range.contains(timestamps[index]))
        .collect();
    let plotted_indices: Vec<usize> = filtered_indices
        .iter()
        .copied()
        .filter(|&index| timestamps[index] <= now_ms)
        .collect();
    let plotted_times = plotted_indices
        .iter()
        .map(|&index| timestamps[index])
        .collect();

    MarketHoursSelection {
        filtered: series.select(&filtered_indices),
        plotted: series.select(&plotted_indices),
        filtered_indices,
        plotted_indices,
        plotted_times: Some(plotted_times),
        range: Some(range),
    }
}
