use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::ticks::nice_step;
use crate::core::{LinearScale, Viewport};
use crate::error::{ChartError, ChartResult};

/// Exchange price band that must stay visible on intraday charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircuitLimits {
    pub lower: f64,
    pub upper: f64,
}

impl CircuitLimits {
    #[must_use]
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }
}

/// Tuning controls for the value (Y) axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceScaleTuning {
    /// Requested number of ticks, at least 2.
    pub tick_count: usize,
    /// Extra room above the maximum as a ratio of the raw span.
    pub headroom_ratio: f64,
    /// Pixels kept free at the top and bottom so the stroke never clips.
    pub vertical_inset_px: f64,
}

impl Default for PriceScaleTuning {
    fn default() -> Self {
        Self {
            tick_count: 5,
            headroom_ratio: 0.02,
            vertical_inset_px: 4.0,
        }
    }
}

impl PriceScaleTuning {
    pub fn validate(self) -> ChartResult<Self> {
        if self.tick_count < 2 {
            return Err(ChartError::InvalidConfig(
                "price tick count must be >= 2".to_owned(),
            ));
        }
        if !self.headroom_ratio.is_finite() || self.headroom_ratio < 0.0 {
            return Err(ChartError::InvalidConfig(
                "headroom ratio must be finite and >= 0".to_owned(),
            ));
        }
        if !self.vertical_inset_px.is_finite() || self.vertical_inset_px < 0.0 {
            return Err(ChartError::InvalidConfig(
                "vertical inset must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Value axis anchored at the data minimum.
///
/// Ticks start exactly at `min` and are spaced by a nice step; the last tick
/// may sit above the raw maximum. The pixel mapping covers `[min, top]`
/// where `top` is the larger of the last tick and the headroom target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceScale {
    min: f64,
    max: f64,
    target_max: f64,
    step: f64,
    ticks: Vec<f64>,
    linear: LinearScale,
}

impl PriceScale {
    /// Builds the value axis from the full-session values.
    ///
    /// `circuit_limits` widen the domain only for intraday charts. Empty input
    /// yields an empty tick list over a unit domain around zero.
    pub fn from_values(
        values: &[f64],
        circuit_limits: Option<CircuitLimits>,
        intraday: bool,
        tuning: PriceScaleTuning,
        viewport: Viewport,
    ) -> ChartResult<Self> {
        let tuning = tuning.validate()?;
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let finite = values
            .iter()
            .copied()
            .filter(|value| value.is_finite())
            .map(OrderedFloat);
        let extent = finite.clone().min().zip(finite.max());
        let has_data = extent.is_some();
        let (mut min, mut max) = extent.map_or((0.0, 0.0), |(min, max)| (min.0, max.0));

        if intraday {
            if let Some(limits) = circuit_limits {
                for bound in [limits.lower, limits.upper] {
                    if bound.is_finite() {
                        min = min.min(bound);
                        max = max.max(bound);
                    }
                }
            }
        }

        if min == max {
            min -= 1.0;
            max += 1.0;
        }

        // Spans are taken over halves so extreme finite extents cannot overflow.
        let half_span = max / 2.0 - min / 2.0;
        let target_max = clamp_finite(max + half_span * (2.0 * tuning.headroom_ratio));
        let half_target_span = target_max / 2.0 - min / 2.0;
        let raw_step = clamp_finite(half_target_span / (tuning.tick_count - 1) as f64 * 2.0);
        let step = clamp_finite(nice_step(raw_step));
        let ticks: Vec<f64> = if has_data {
            (0..tuning.tick_count)
                .map(|i| clamp_finite(min + step * i as f64))
                .collect()
        } else {
            Vec::new()
        };
        let top = ticks.last().copied().unwrap_or(target_max).max(target_max);

        let height = f64::from(viewport.height);
        let inset = tuning.vertical_inset_px.min(height / 2.0);
        let linear = LinearScale::new((min, top), (height - inset, inset))?;

        Ok(Self {
            min,
            max,
            target_max,
            step,
            ticks,
            linear,
        })
    }

    /// Domain actually mapped to pixels.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.linear.domain()
    }

    /// Raw extent after circuit widening and degenerate-domain handling.
    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    #[must_use]
    pub fn target_max(&self) -> f64 {
        self.target_max
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn ticks(&self) -> &[f64] {
        &self.ticks
    }

    #[must_use]
    pub fn price_to_pixel(&self, price: f64) -> f64 {
        self.linear.domain_to_pixel(price)
    }

    #[must_use]
    pub fn pixel_to_price(&self, pixel: f64) -> f64 {
        self.linear.pixel_to_domain(pixel)
    }
}

fn clamp_finite(value: f64) -> f64 {
    value.clamp(f64::MIN, f64::MAX)
}
