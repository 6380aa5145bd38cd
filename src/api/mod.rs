mod axis_label_format;
mod engine;
mod engine_config;
mod live_feed;
mod tooltip;

pub use axis_label_format::{
    format_date_label, format_tick_label, format_time_label, format_value_label,
};
pub use engine::{AxisTick, ChartEngine, ChartFrame, TextMeasurer};
pub use engine_config::ChartEngineConfig;
pub use live_feed::{BarFeed, BarUpdate};
