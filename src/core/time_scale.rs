use serde::{Deserialize, Serialize};

use crate::core::{LinearScale, MarketHoursRange};
use crate::error::ChartResult;

/// Continuous epoch-millisecond axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    linear: LinearScale,
}

impl TimeScale {
    pub fn new(start_ms: i64, end_ms: i64, range: (f64, f64)) -> ChartResult<Self> {
        Ok(Self {
            linear: LinearScale::new((start_ms as f64, end_ms as f64), range)?,
        })
    }

    /// Scale spanning a whole trading session, so time that has not elapsed
    /// yet stays visible as blank space.
    pub fn for_session(range: MarketHoursRange, width_px: f64) -> ChartResult<Self> {
        Self::new(range.start_time, range.close_time, (0.0, width_px))
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.linear.domain()
    }

    #[must_use]
    pub fn time_to_pixel(self, time_ms: f64) -> f64 {
        self.linear.domain_to_pixel(time_ms)
    }

    #[must_use]
    pub fn pixel_to_time(self, pixel: f64) -> f64 {
        self.linear.pixel_to_domain(pixel)
    }
}

/// Horizontal axis: continuous time for intraday sessions, sample index otherwise.
///
/// The index axis compresses weekends, holidays and multi-day buckets into
/// uniform spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum XScale {
    Time(TimeScale),
    Index(LinearScale),
}

impl XScale {
    /// Index scale over `[0, len - 1]`.
    pub fn index(len: usize, width_px: f64) -> ChartResult<Self> {
        let last = len.saturating_sub(1) as f64;
        Ok(Self::Index(LinearScale::new((0.0, last), (0.0, width_px))?))
    }

    #[must_use]
    pub fn is_time(self) -> bool {
        matches!(self, Self::Time(_))
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        match self {
            Self::Time(scale) => scale.domain(),
            Self::Index(scale) => scale.domain(),
        }
    }

    #[must_use]
    pub fn to_pixel(self, domain_value: f64) -> f64 {
        match self {
            Self::Time(scale) => scale.time_to_pixel(domain_value),
            Self::Index(scale) => scale.domain_to_pixel(domain_value),
        }
    }

    #[must_use]
    pub fn to_domain(self, pixel: f64) -> f64 {
        match self {
            Self::Time(scale) => scale.pixel_to_time(pixel),
            Self::Index(scale) => scale.pixel_to_domain(pixel),
        }
    }
}
