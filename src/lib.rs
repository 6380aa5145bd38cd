//! line-chart-engine: charting data engine for interactive line charts.
//!
//! Turns raw price samples and streaming ticks into renderable geometry:
//! resolution-aware bucketing, market-hours-aware scaling, monotone curve
//! paths with shape-morph interpolation, a live-bar state machine and
//! nearest-point lookup for crosshairs and tooltips.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod telemetry;

pub use api::{ChartEngine, ChartEngineConfig};
pub use error::{ChartError, ChartResult};
