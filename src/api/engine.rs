use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{
    ChartPeriod, CircuitLimits, CurveGeometry, LabeledTick, LiveUpdate, MarketBound,
    MarketHoursRange, OhlcBar, PriceScale, Resolution, Sample, Series, TimeScale, Viewport,
    XScale, bucket_series, build_curve, evenly_spaced_ticks, filter_market_hours,
    normalize_series, project_points, select_ticks_with_label_spacing,
};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{CrosshairMode, CrosshairState, InteractionState, TooltipState};

use super::axis_label_format::{format_date_label, format_tick_label, format_time_label};
use super::{BarFeed, BarUpdate, ChartEngineConfig};

/// Label width callback (`measureText`) used to thin out X-axis labels.
pub type TextMeasurer = Arc<dyn Fn(&str) -> f64 + Send + Sync>;

/// Width estimate used when the host supplies no measurer.
const FALLBACK_CHAR_WIDTH_PX: f64 = 7.0;

/// Axis tick with its pixel position and rendered label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub value: f64,
    pub pixel: f64,
    pub label: String,
}

/// Everything a presentation layer needs to draw one chart state.
///
/// Index lists point into the normalized input series, so the original
/// timestamp of any plotted point stays recoverable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub viewport: Viewport,
    pub period: ChartPeriod,
    pub x_scale: XScale,
    pub price_domain: (f64, f64),
    pub price_step: f64,
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
    pub curve: CurveGeometry,
    pub market_hours: Option<MarketHoursRange>,
    pub plotted_values: Vec<f64>,
    pub plotted_source_indices: Vec<usize>,
    pub filtered_source_indices: Vec<usize>,
    pub plotted_timestamps: Option<Vec<i64>>,
    pub series_metadata: IndexMap<String, String>,
}

impl ChartFrame {
    #[must_use]
    pub fn x_tick_values(&self) -> Vec<f64> {
        self.x_ticks.iter().map(|tick| tick.value).collect()
    }

    #[must_use]
    pub fn y_tick_values(&self) -> Vec<f64> {
        self.y_ticks.iter().map(|tick| tick.value).collect()
    }

    /// Pixel X of every plotted point, ascending.
    #[must_use]
    pub fn x_positions(&self) -> Vec<f64> {
        self.curve.points.iter().map(|point| point.x).collect()
    }
}

/// Chart data engine façade.
///
/// Holds the caller-facing inputs, rebuilds a [`ChartFrame`] from scratch on
/// every [`ChartEngine::refresh`] and keeps the live bar stream when enabled.
pub struct ChartEngine {
    config: ChartEngineConfig,
    series: Series,
    period: ChartPeriod,
    market_start: Option<MarketBound>,
    market_close: Option<MarketBound>,
    circuit_limits: Option<CircuitLimits>,
    series_metadata: IndexMap<String, String>,
    text_measurer: Option<TextMeasurer>,
    interaction: InteractionState,
    feed: Option<BarFeed>,
    frame: Option<ChartFrame>,
}

impl ChartEngine {
    pub fn new(config: ChartEngineConfig) -> ChartResult<Self> {
        let config = config
            .validate()
            .inspect_err(|err| warn!(error = %err, "rejected engine config"))?;
        let mut interaction = InteractionState::default();
        interaction.set_crosshair_mode(config.crosshair_mode);

        Ok(Self {
            config,
            series: Series::default(),
            period: ChartPeriod::default(),
            market_start: None,
            market_close: None,
            circuit_limits: None,
            series_metadata: IndexMap::new(),
            text_measurer: None,
            interaction,
            feed: None,
            frame: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> ChartEngineConfig {
        self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> ChartResult<()> {
        let config = ChartEngineConfig {
            viewport,
            ..self.config
        };
        self.config = config
            .validate()
            .inspect_err(|err| warn!(error = %err, "rejected viewport"))?;
        Ok(())
    }

    /// Replaces the historical series. Timestamps are normalized (seconds
    /// promoted to milliseconds, sorted, deduplicated); a length mismatch
    /// drops them.
    pub fn set_data(&mut self, values: Vec<f64>, timestamps: Option<Vec<i64>>) {
        let original_count = values.len();
        let had_timestamps = timestamps.is_some();
        let stage = normalize_series(values, timestamps);
        if had_timestamps && !stage.series.has_timestamps() {
            warn!(original_count, "timestamp count mismatch, falling back to index axis");
        }
        debug!(
            original_count,
            canonical_count = stage.series.len(),
            "set data"
        );
        self.series = stage.series;
    }

    pub fn set_samples(&mut self, samples: &[Sample]) {
        self.series = Series::from_samples(samples);
        debug!(canonical_count = self.series.len(), "set samples");
    }

    #[must_use]
    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn set_period(&mut self, period: &str) {
        self.period = ChartPeriod::parse(period);
    }

    #[must_use]
    pub fn period(&self) -> ChartPeriod {
        self.period
    }

    /// Sets the trading-session bounds used by intraday charts.
    pub fn set_market_hours(&mut self, start: Option<MarketBound>, close: Option<MarketBound>) {
        self.market_start = start;
        self.market_close = close;
    }

    pub fn set_circuit_limits(&mut self, limits: Option<CircuitLimits>) {
        self.circuit_limits = limits;
    }

    /// Installs the label width callback used for X-label thinning.
    pub fn set_text_measurer(&mut self, measurer: Option<TextMeasurer>) {
        self.text_measurer = measurer;
    }

    /// Sets metadata carried verbatim into frames and snapshots.
    ///
    /// `IndexMap` preserves insertion order for stable snapshots.
    pub fn set_series_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.series_metadata.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn series_metadata(&self) -> &IndexMap<String, String> {
        &self.series_metadata
    }

    /// Most recently built frame.
    #[must_use]
    pub fn frame(&self) -> Option<&ChartFrame> {
        self.frame.as_ref()
    }

    /// Rebuilds the frame for the given wall-clock time and keeps it for
    /// pointer lookups.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> ChartResult<&ChartFrame> {
        let frame = self.build_frame(now)?;
        Ok(&*self.frame.insert(frame))
    }

    /// Runs the full pipeline: bucketing, market-hours filtering, scales,
    /// ticks and curve generation.
    pub fn build_frame(&self, now: DateTime<Utc>) -> ChartResult<ChartFrame> {
        let viewport = self.config.viewport;
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);
        let offset = self.config.utc_offset()?;

        let bucketed = bucket_series(&self.series, self.period, now);
        let selection = filter_market_hours(
            &bucketed.series,
            self.period,
            self.market_start,
            self.market_close,
            now.timestamp_millis(),
        );

        let price_scale = PriceScale::from_values(
            selection.filtered.values(),
            self.circuit_limits,
            self.period.is_intraday(),
            self.config.price_scale_tuning(),
            viewport,
        )?;

        let plotted_len = selection.plotted.len();
        let (x_scale, x_domain): (XScale, Vec<f64>) =
            match (selection.range, selection.plotted_times.as_ref()) {
                (Some(range), Some(times)) => (
                    XScale::Time(TimeScale::for_session(range, width)?),
                    times.iter().map(|time| *time as f64).collect(),
                ),
                _ => (
                    XScale::index(plotted_len, width)?,
                    (0..plotted_len).map(|index| index as f64).collect(),
                ),
            };

        let points = project_points(selection.plotted.values(), &x_domain, x_scale, &price_scale);
        let baseline_y = height - self.config.vertical_inset_px.min(height / 2.0);
        let curve = build_curve(points, self.config.curve_subdivisions, baseline_y);

        let to_source = |indices: &[usize]| -> Vec<usize> {
            indices
                .iter()
                .map(|&index| bucketed.source_indices[index])
                .collect()
        };
        let plotted_source_indices = to_source(&selection.plotted_indices);
        let filtered_source_indices = to_source(&selection.filtered_indices);
        let plotted_timestamps = self.series.timestamps().map(|timestamps| {
            plotted_source_indices
                .iter()
                .map(|&index| timestamps[index])
                .collect::<Vec<_>>()
        });

        let y_ticks = price_scale
            .ticks()
            .iter()
            .map(|&value| AxisTick {
                value,
                pixel: price_scale.price_to_pixel(value),
                label: format_tick_label(value, price_scale.step()),
            })
            .collect();
        let x_ticks = if plotted_len == 0 {
            Vec::new()
        } else {
            self.x_ticks(x_scale, plotted_timestamps.as_deref(), offset)
        };

        debug!(
            period = ?self.period,
            plotted = plotted_len,
            filtered = selection.filtered.len(),
            time_axis = x_scale.is_time(),
            price_min = price_scale.domain().0,
            price_max = price_scale.domain().1,
            "built chart frame"
        );

        Ok(ChartFrame {
            viewport,
            period: self.period,
            x_scale,
            price_domain: price_scale.domain(),
            price_step: price_scale.step(),
            x_ticks,
            y_ticks,
            curve,
            market_hours: selection.range,
            plotted_values: selection.plotted.values().to_vec(),
            plotted_source_indices,
            filtered_source_indices,
            plotted_timestamps,
            series_metadata: self.series_metadata.clone(),
        })
    }

    fn x_ticks(
        &self,
        x_scale: XScale,
        plotted_timestamps: Option<&[i64]>,
        offset: FixedOffset,
    ) -> Vec<AxisTick> {
        let (start, end) = x_scale.domain();
        let mut values = evenly_spaced_ticks(start, end, self.config.x_tick_count);
        if !x_scale.is_time() {
            for value in &mut values {
                *value = value.round();
            }
            values.dedup();
            values.retain(|value| *value >= 0.0);
        }

        let label_for = |value: f64| -> String {
            if x_scale.is_time() {
                return format_time_label(value.round() as i64, offset);
            }
            let index = value as usize;
            match plotted_timestamps.and_then(|timestamps| timestamps.get(index)) {
                Some(timestamp) => format_date_label(*timestamp, offset),
                None => index.to_string(),
            }
        };

        let labeled: Vec<(LabeledTick, String)> = values
            .into_iter()
            .map(|value| {
                let label = label_for(value);
                let tick = LabeledTick {
                    value,
                    pixel: x_scale.to_pixel(value),
                    label_width: self.measure_text(&label),
                };
                (tick, label)
            })
            .collect();

        let selected = select_ticks_with_label_spacing(
            labeled.iter().map(|(tick, _)| *tick).collect(),
            self.config.x_label_gap_px,
        );
        selected
            .into_iter()
            .filter_map(|tick| {
                labeled
                    .iter()
                    .find(|(candidate, _)| candidate.value == tick.value)
                    .map(|(_, label)| AxisTick {
                        value: tick.value,
                        pixel: tick.pixel,
                        label: label.clone(),
                    })
            })
            .collect()
    }

    fn measure_text(&self, text: &str) -> f64 {
        match &self.text_measurer {
            Some(measurer) => measurer(text),
            None => text.chars().count() as f64 * FALLBACK_CHAR_WIDTH_PX,
        }
    }

    /// Tooltip for a pointer at `x` pixels, using the last refreshed frame.
    #[must_use]
    pub fn tooltip_at(&self, x: f64) -> Option<TooltipState> {
        let frame = self.frame.as_ref()?;
        super::tooltip::resolve_tooltip(frame, x)
    }

    #[must_use]
    pub fn crosshair_mode(&self) -> CrosshairMode {
        self.interaction.crosshair_mode()
    }

    pub fn set_crosshair_mode(&mut self, mode: CrosshairMode) {
        self.interaction.set_crosshair_mode(mode);
    }

    #[must_use]
    pub fn crosshair(&self) -> CrosshairState {
        self.interaction.crosshair()
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let resolved = self
            .frame
            .as_ref()
            .and_then(|frame| super::tooltip::resolve_crosshair(frame, x, self.crosshair_mode()));
        let (snapped, tooltip) = match resolved {
            Some((snapped, tooltip)) => (Some(snapped), Some(tooltip)),
            None => (None, None),
        };
        self.interaction.on_pointer_move((x, y), snapped, tooltip);
    }

    pub fn pointer_leave(&mut self) {
        self.interaction.on_pointer_leave();
    }

    /// Switches the engine to a live bar stream at `resolution`, seeded with
    /// `history`. The series is rebuilt from bar closes.
    pub fn enable_live_feed(&mut self, resolution: &str, history: Vec<OhlcBar>) -> ChartResult<()> {
        let mut feed = BarFeed::new(Resolution::parse(resolution))
            .with_max_bars(self.config.max_bars)
            .with_conversion(self.config.price_conversion()?);
        feed.seed(history);
        debug!(
            resolution = %feed.resolution(),
            bars = feed.bars().len(),
            "enabled live feed"
        );
        self.series = feed.to_series();
        self.feed = Some(feed);
        Ok(())
    }

    pub fn disable_live_feed(&mut self) {
        self.feed = None;
    }

    #[must_use]
    pub fn live_feed(&self) -> Option<&BarFeed> {
        self.feed.as_ref()
    }

    /// Folds a streaming tick into the live bar stream.
    ///
    /// Returns `Ok(None)` when the tick is ignored (invalid timestamp or no
    /// price). Fails when no live feed is enabled.
    pub fn apply_live_update(&mut self, update: &LiveUpdate) -> ChartResult<Option<BarUpdate>> {
        let feed = self.feed.as_mut().ok_or_else(|| {
            ChartError::InvalidData("live feed is not enabled".to_owned())
        })?;
        let Some(applied) = feed.apply(update) else {
            return Ok(None);
        };
        trace!(bars = feed.bars().len(), "applied live update");
        self.series = feed.to_series();
        Ok(Some(applied))
    }

    /// Pretty JSON of the last refreshed frame.
    pub fn snapshot_json_pretty(&self) -> ChartResult<String> {
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| ChartError::InvalidData("no frame has been built".to_owned()))?;
        Ok(serde_json::to_string_pretty(frame)?)
    }
}
