use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_CURVE_SUBDIVISIONS, PriceConversion, PriceScaleTuning, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::CrosshairMode;

/// Public engine bootstrap configuration.
///
/// This type is serializable so host applications can persist/load chart setup
/// without inventing their own ad-hoc format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartEngineConfig {
    pub viewport: Viewport,
    #[serde(default = "default_y_tick_count")]
    pub y_tick_count: usize,
    #[serde(default = "default_x_tick_count")]
    pub x_tick_count: usize,
    #[serde(default = "default_headroom_ratio")]
    pub headroom_ratio: f64,
    #[serde(default = "default_vertical_inset_px")]
    pub vertical_inset_px: f64,
    #[serde(default = "default_curve_subdivisions")]
    pub curve_subdivisions: usize,
    #[serde(default = "default_max_bars")]
    pub max_bars: Option<usize>,
    #[serde(default = "default_x_label_gap_px")]
    pub x_label_gap_px: f64,
    #[serde(default = "default_price_divisor")]
    pub price_divisor: f64,
    /// Offset applied to time labels, in seconds east of UTC.
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub crosshair_mode: CrosshairMode,
}

impl ChartEngineConfig {
    /// Creates a config with default axis, curve and feed settings.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            y_tick_count: default_y_tick_count(),
            x_tick_count: default_x_tick_count(),
            headroom_ratio: default_headroom_ratio(),
            vertical_inset_px: default_vertical_inset_px(),
            curve_subdivisions: default_curve_subdivisions(),
            max_bars: default_max_bars(),
            x_label_gap_px: default_x_label_gap_px(),
            price_divisor: default_price_divisor(),
            utc_offset_seconds: 0,
            crosshair_mode: CrosshairMode::default(),
        }
    }

    #[must_use]
    pub fn with_tick_counts(mut self, x_tick_count: usize, y_tick_count: usize) -> Self {
        self.x_tick_count = x_tick_count;
        self.y_tick_count = y_tick_count;
        self
    }

    #[must_use]
    pub fn with_headroom_ratio(mut self, headroom_ratio: f64) -> Self {
        self.headroom_ratio = headroom_ratio;
        self
    }

    #[must_use]
    pub fn with_vertical_inset(mut self, vertical_inset_px: f64) -> Self {
        self.vertical_inset_px = vertical_inset_px;
        self
    }

    #[must_use]
    pub fn with_curve_subdivisions(mut self, curve_subdivisions: usize) -> Self {
        self.curve_subdivisions = curve_subdivisions;
        self
    }

    #[must_use]
    pub fn with_max_bars(mut self, max_bars: Option<usize>) -> Self {
        self.max_bars = max_bars;
        self
    }

    #[must_use]
    pub fn with_price_divisor(mut self, price_divisor: f64) -> Self {
        self.price_divisor = price_divisor;
        self
    }

    #[must_use]
    pub fn with_utc_offset_seconds(mut self, utc_offset_seconds: i32) -> Self {
        self.utc_offset_seconds = utc_offset_seconds;
        self
    }

    #[must_use]
    pub fn with_crosshair_mode(mut self, crosshair_mode: CrosshairMode) -> Self {
        self.crosshair_mode = crosshair_mode;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        self.price_scale_tuning().validate()?;
        if self.x_tick_count < 2 {
            return Err(ChartError::InvalidConfig(
                "x tick count must be >= 2".to_owned(),
            ));
        }
        if self.curve_subdivisions == 0 {
            return Err(ChartError::InvalidConfig(
                "curve subdivisions must be > 0".to_owned(),
            ));
        }
        if self.max_bars == Some(0) {
            return Err(ChartError::InvalidConfig(
                "max bars must be > 0 when set".to_owned(),
            ));
        }
        if !self.x_label_gap_px.is_finite() || self.x_label_gap_px < 0.0 {
            return Err(ChartError::InvalidConfig(
                "x label gap must be finite and >= 0".to_owned(),
            ));
        }
        self.price_conversion()?;
        self.utc_offset()?;
        Ok(self)
    }

    #[must_use]
    pub fn price_scale_tuning(self) -> PriceScaleTuning {
        PriceScaleTuning {
            tick_count: self.y_tick_count,
            headroom_ratio: self.headroom_ratio,
            vertical_inset_px: self.vertical_inset_px,
        }
    }

    pub fn price_conversion(self) -> ChartResult<PriceConversion> {
        PriceConversion::divisor(self.price_divisor)
    }

    pub fn utc_offset(self) -> ChartResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_seconds).ok_or_else(|| {
            ChartError::InvalidConfig(format!(
                "utc offset {}s is out of range",
                self.utc_offset_seconds
            ))
        })
    }

    pub fn to_json(self) -> ChartResult<String> {
        Ok(serde_json::to_string(&self)?)
    }

    pub fn from_json(json: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }
}

fn default_y_tick_count() -> usize {
    5
}

fn default_x_tick_count() -> usize {
    5
}

fn default_headroom_ratio() -> f64 {
    0.02
}

fn default_vertical_inset_px() -> f64 {
    4.0
}

fn default_curve_subdivisions() -> usize {
    DEFAULT_CURVE_SUBDIVISIONS
}

fn default_max_bars() -> Option<usize> {
    Some(500)
}

fn default_x_label_gap_px() -> f64 {
    8.0
}

fn default_price_divisor() -> f64 {
    1.0
}
