use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Invertible linear mapping between a domain interval and a pixel range.
///
/// A zero-width domain is widened by half a unit on each side so the mapping
/// stays invertible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        let (mut domain_start, mut domain_end) = domain;
        if !domain_start.is_finite() || !domain_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale domain must be finite".to_owned(),
            ));
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        if domain_start == domain_end {
            domain_start -= 0.5;
            domain_end += 0.5;
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start: range.0,
            range_end: range.1,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn domain_to_pixel(self, value: f64) -> f64 {
        let normalized = (value / 2.0 - self.domain_start / 2.0) / self.half_domain_span();
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn pixel_to_domain(self, pixel: f64) -> f64 {
        let range_span = self.range_end - self.range_start;
        if range_span == 0.0 {
            return self.domain_start;
        }
        let normalized = (pixel - self.range_start) / range_span;
        self.domain_start + normalized * self.half_domain_span() * 2.0
    }

    // Halved so domains spanning most of the f64 range stay finite.
    fn half_domain_span(self) -> f64 {
        self.domain_end / 2.0 - self.domain_start / 2.0
    }
}
