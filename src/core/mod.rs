pub mod curve;
pub mod live_bar;
pub mod market_hours;
pub mod path;
pub mod price_scale;
pub mod primitives;
pub mod resolution;
pub mod scale;
pub mod series;
pub mod ticks;
pub mod time_scale;
pub mod types;

pub use curve::{
    CurveGeometry, DEFAULT_CURVE_SUBDIVISIONS, build_curve, close_to_baseline,
    monotone_curve_path, project_points,
};
pub use live_bar::{
    BarDecision, LiveUpdate, OhlcBar, PriceConversion, process_live_update,
    process_live_update_with, should_merge,
};
pub use market_hours::{MarketBound, MarketHoursRange, MarketHoursSelection, filter_market_hours};
pub use path::{Path, PathCommand, interpolate_path_strings};
pub use price_scale::{CircuitLimits, PriceScale, PriceScaleTuning};
pub use resolution::{
    ChartPeriod, Resolution, ResolutionUnit, bucket_by_duration, bucket_series,
};
pub use scale::LinearScale;
pub use series::{Series, SeriesStage, normalize_series};
pub use ticks::{LabeledTick, evenly_spaced_ticks, nice_step, select_ticks_with_label_spacing};
pub use time_scale::{TimeScale, XScale};
pub use types::{Point, Sample, Viewport};
