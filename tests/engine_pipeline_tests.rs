use std::sync::Arc;

use approx::assert_abs_diff_eq;
use chrono::{DateTime, Utc};
use line_chart_engine::api::BarUpdate;
use line_chart_engine::core::{
    ChartPeriod, CircuitLimits, LiveUpdate, MarketBound, OhlcBar, Viewport,
};
use line_chart_engine::interaction::CrosshairMode;
use line_chart_engine::{ChartEngine, ChartEngineConfig, ChartError};

const OPEN_SECONDS: i64 = 1_710_494_100; // 2024-03-15 09:15 UTC
const CLOSE_SECONDS: i64 = OPEN_SECONDS + 22_500; // 15:30

fn engine() -> ChartEngine {
    ChartEngine::new(ChartEngineConfig::new(Viewport::new(800, 200))).expect("engine")
}

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 1_000_000).expect("valid timestamp")
}

fn intraday_engine() -> ChartEngine {
    let mut engine = engine();
    engine.set_data(
        vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0],
        Some(vec![
            OPEN_SECONDS - 900,
            OPEN_SECONDS,
            OPEN_SECONDS + 1_800,
            OPEN_SECONDS + 3_600,
            OPEN_SECONDS + 5_400,
            CLOSE_SECONDS,
            CLOSE_SECONDS + 900,
        ]),
    );
    engine.set_period("1D");
    engine.set_market_hours(
        Some(MarketBound::Epoch(OPEN_SECONDS)),
        Some(MarketBound::Epoch(CLOSE_SECONDS)),
    );
    engine
}

#[test]
fn index_axis_chart_spans_every_sample() {
    let mut engine = engine();
    engine.set_data(vec![1.0, 2.0, 3.0, 2.0, 1.0], None);
    engine.set_period("1M");

    let frame = engine.refresh(Utc::now()).expect("frame");

    assert_eq!(frame.period, ChartPeriod::OneMonth);
    assert!(!frame.x_scale.is_time());
    assert_eq!(frame.x_scale.domain(), (0.0, 4.0));
    assert_eq!(frame.price_domain.0, 1.0);
    assert!(frame.price_domain.1 > 3.0);
    assert_eq!(frame.x_tick_values(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);

    let y_labels: Vec<&str> = frame.y_ticks.iter().map(|tick| tick.label.as_str()).collect();
    assert_eq!(y_labels, vec!["1.0", "1.5", "2.0", "2.5", "3.0"]);

    let points = &frame.curve.points;
    assert_eq!(points.len(), 5);
    assert_abs_diff_eq!(points[0].x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(points[4].x, 800.0, epsilon = 1e-9);
    assert_abs_diff_eq!(points[0].y, 196.0, epsilon = 1e-9);
    assert!(frame.curve.line.to_string().starts_with("M0,196"));
    assert!(frame.curve.area.to_string().ends_with('Z'));
}

#[test]
fn extreme_values_still_build_a_frame() {
    let mut engine = engine();
    engine.set_data(vec![-1e308, 1e308], None);
    engine.set_period("1M");

    let frame = engine.refresh(Utc::now()).expect("frame");

    assert!(frame.price_domain.0.is_finite() && frame.price_domain.1.is_finite());
    assert!(frame.y_ticks.iter().all(|tick| tick.value.is_finite() && tick.pixel.is_finite()));
    assert_eq!(frame.curve.points.len(), 2);
    assert!(frame.curve.points.iter().all(|point| point.x.is_finite() && point.y.is_finite()));
    assert!(!frame.curve.line.is_empty());
}

#[test]
fn intraday_chart_uses_a_session_time_axis() {
    let mut engine = intraday_engine();
    engine.set_circuit_limits(Some(CircuitLimits::new(5.0, 20.0)));

    let frame = engine.refresh(at(OPEN_SECONDS + 3_600)).expect("frame");

    assert!(frame.x_scale.is_time());
    assert_eq!(
        frame.x_scale.domain(),
        ((OPEN_SECONDS * 1_000) as f64, (CLOSE_SECONDS * 1_000) as f64)
    );
    assert_eq!(frame.plotted_values, vec![11.0, 12.0, 13.0]);
    assert_eq!(frame.plotted_source_indices, vec![1, 2, 3]);
    assert_eq!(frame.filtered_source_indices, vec![1, 2, 3, 4, 5]);
    assert_eq!(frame.price_domain.0, 5.0);

    let points = &frame.curve.points;
    assert_abs_diff_eq!(points[0].x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(points[2].x, 128.0, epsilon = 1e-9);

    let labels: Vec<&str> = frame.x_ticks.iter().map(|tick| tick.label.as_str()).collect();
    assert_eq!(labels.first(), Some(&"9:15 AM"));
    assert_eq!(labels.last(), Some(&"3:30 PM"));
}

#[test]
fn tooltip_recovers_the_original_timestamp() {
    let mut engine = intraday_engine();
    engine.refresh(at(OPEN_SECONDS + 3_600)).expect("frame");

    let tooltip = engine.tooltip_at(130.0).expect("tooltip");
    assert_eq!(tooltip.selected_index, 2);
    assert_eq!(tooltip.value, 13.0);
    assert_eq!(
        tooltip.x_domain_value,
        Some(((OPEN_SECONDS + 3_600) * 1_000) as f64)
    );
}

#[test]
fn crosshair_follows_the_selected_mode() {
    let mut engine = intraday_engine();
    engine.refresh(at(OPEN_SECONDS + 3_600)).expect("frame");
    let snapped_y = engine.frame().expect("frame").curve.points[2].y;

    engine.pointer_move(130.0, 10.0);
    let crosshair = engine.crosshair();
    assert!(crosshair.visible);
    assert_abs_diff_eq!(crosshair.x, 128.0, epsilon = 1e-9);
    assert_abs_diff_eq!(crosshair.y, snapped_y, epsilon = 1e-9);

    engine.set_crosshair_mode(CrosshairMode::Normal);
    engine.pointer_move(100.0, 10.0);
    let crosshair = engine.crosshair();
    assert_abs_diff_eq!(crosshair.x, 100.0, epsilon = 1e-9);
    assert_eq!(crosshair.tooltip.map(|tooltip| tooltip.selected_index), Some(2));

    engine.pointer_leave();
    assert!(!engine.crosshair().visible);

    engine.set_crosshair_mode(CrosshairMode::Hidden);
    engine.pointer_move(130.0, 10.0);
    assert!(!engine.crosshair().visible);
}

#[test]
fn mismatched_timestamps_fall_back_to_an_index_axis() {
    let mut engine = engine();
    engine.set_data(vec![3.0, 1.0, 2.0], Some(vec![1, 2]));
    engine.set_period("1D");

    let frame = engine.refresh(Utc::now()).expect("frame");
    assert!(!frame.x_scale.is_time());
    assert_eq!(frame.plotted_timestamps, None);
    assert_eq!(frame.plotted_values, vec![3.0, 1.0, 2.0]);

    let tooltip = engine.tooltip_at(800.0).expect("tooltip");
    assert_eq!(tooltip.selected_index, 2);
    assert_eq!(tooltip.x_domain_value, Some(2.0));
}

#[test]
fn empty_series_builds_an_empty_frame() {
    let mut engine = engine();
    let frame = engine.refresh(Utc::now()).expect("frame");

    assert!(frame.y_ticks.is_empty());
    assert!(frame.x_ticks.is_empty());
    assert!(frame.curve.line.is_empty());
    assert_eq!(engine.tooltip_at(10.0), None);
}

#[test]
fn wide_labels_keep_only_the_last_tick() {
    let mut engine = engine();
    engine.set_data(vec![1.0, 2.0, 3.0, 2.0, 1.0], None);
    engine.set_text_measurer(Some(Arc::new(|_: &str| 1_000.0)));

    let frame = engine.refresh(Utc::now()).expect("frame");
    assert_eq!(frame.x_tick_values(), vec![4.0]);
}

#[test]
fn live_ticks_rebuild_the_series() {
    let mut engine = engine();
    let error = engine
        .apply_live_update(&LiveUpdate::new(61_000_000).with_close(1.0))
        .expect_err("feed disabled");
    assert!(matches!(error, ChartError::InvalidData(_)));

    engine
        .enable_live_feed("1", vec![OhlcBar::new(0, 1.0, 1.0, 1.0, 1.0)])
        .expect("enable feed");
    assert_eq!(engine.series().len(), 1);

    let update = engine
        .apply_live_update(&LiveUpdate::new(60_500_000).with_close(2.0))
        .expect("live update");
    assert!(matches!(update, Some(BarUpdate::Appended { .. })));

    let update = engine
        .apply_live_update(&LiveUpdate::new(90_000_000).with_close(2.5))
        .expect("live update");
    assert!(matches!(update, Some(BarUpdate::Replaced(_))));

    assert_eq!(engine.series().values(), &[1.0, 2.5]);
    assert_eq!(engine.series().timestamps(), Some(&[0, 60_000][..]));

    let ignored = engine
        .apply_live_update(&LiveUpdate::new(0).with_close(9.0))
        .expect("ignored tick");
    assert_eq!(ignored, None);

    let frame = engine.refresh(Utc::now()).expect("frame");
    assert_eq!(frame.plotted_values, vec![1.0, 2.5]);

    engine.disable_live_feed();
    assert!(engine.live_feed().is_none());
}

#[test]
fn invalid_configuration_is_rejected() {
    let error = ChartEngine::new(ChartEngineConfig::new(Viewport::new(0, 100)))
        .err()
        .expect("zero width");
    assert!(matches!(error, ChartError::InvalidViewport { width: 0, height: 100 }));

    let config = ChartEngineConfig::new(Viewport::new(100, 100)).with_tick_counts(5, 1);
    assert!(matches!(
        ChartEngine::new(config).err(),
        Some(ChartError::InvalidConfig(_))
    ));

    let config = ChartEngineConfig::new(Viewport::new(100, 100)).with_price_divisor(0.0);
    assert!(ChartEngine::new(config).is_err());

    let mut engine = engine();
    assert!(engine.set_viewport(Viewport::new(10, 0)).is_err());
    assert_eq!(engine.viewport(), Viewport::new(800, 200));
}

#[test]
fn config_round_trips_through_json() {
    let config = ChartEngineConfig::new(Viewport::new(640, 320))
        .with_curve_subdivisions(4)
        .with_max_bars(Some(120))
        .with_utc_offset_seconds(19_800)
        .with_crosshair_mode(CrosshairMode::Normal);

    let json = config.to_json().expect("serialize");
    let restored = ChartEngineConfig::from_json(&json).expect("deserialize");
    assert_eq!(restored, config);

    let minimal = ChartEngineConfig::from_json(r#"{"viewport":{"width":10,"height":20}}"#)
        .expect("defaults");
    assert_eq!(minimal, ChartEngineConfig::new(Viewport::new(10, 20)));

    assert!(ChartEngineConfig::from_json(r#"{"viewport":{"width":0,"height":20}}"#).is_err());
    assert!(matches!(
        ChartEngineConfig::from_json("not json"),
        Err(ChartError::Serialization(_))
    ));
}

#[test]
fn snapshot_contains_paths_and_metadata() {
    let mut engine = engine();
    assert!(engine.snapshot_json_pretty().is_err());

    engine.set_data(vec![1.0, 2.0], None);
    engine.set_series_metadata("symbol", "ACME");
    engine.refresh(Utc::now()).expect("frame");

    let json = engine.snapshot_json_pretty().expect("snapshot");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["series_metadata"]["symbol"], "ACME");
    assert_eq!(value["x_scale"]["kind"], "index");
    assert!(
        value["curve"]["line"]
            .as_str()
            .is_some_and(|line| line.starts_with("M0,"))
    );
}
