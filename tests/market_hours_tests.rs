use line_chart_engine::core::{
    ChartPeriod, MarketBound, MarketHoursRange, Series, filter_market_hours,
};
use proptest::prelude::*;

const OPEN_SECONDS: i64 = 1_710_494_100; // 2024-03-15 09:15 UTC
const CLOSE_SECONDS: i64 = OPEN_SECONDS + 22_500; // 15:30

fn session_series() -> Series {
    Series::normalized(
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
    )
}

#[test]
fn bounds_accept_seconds_milliseconds_and_datetimes() {
    let from_seconds = MarketBound::Epoch(OPEN_SECONDS).to_millis();
    let from_millis = MarketBound::Epoch(OPEN_SECONDS * 1_000).to_millis();
    let from_datetime = MarketBound::from(
        chrono::DateTime::from_timestamp(OPEN_SECONDS, 0).expect("valid timestamp"),
    )
    .to_millis();

    assert_eq!(from_seconds, OPEN_SECONDS * 1_000);
    assert_eq!(from_millis, OPEN_SECONDS * 1_000);
    assert_eq!(from_datetime, OPEN_SECONDS * 1_000);
}

#[test]
fn reversed_bounds_are_swapped() {
    let range = MarketHoursRange::new(
        MarketBound::Epoch(CLOSE_SECONDS),
        MarketBound::Epoch(OPEN_SECONDS),
    );
    assert_eq!(range.start_time, OPEN_SECONDS * 1_000);
    assert_eq!(range.close_time, CLOSE_SECONDS * 1_000);
}

#[test]
fn intraday_series_is_split_into_session_and_elapsed_part() {
    let series = session_series();
    let now_ms = (OPEN_SECONDS + 3_600) * 1_000 + 1;

    let selection = filter_market_hours(
        &series,
        ChartPeriod::OneDay,
        Some(MarketBound::Epoch(OPEN_SECONDS)),
        Some(MarketBound::Epoch(CLOSE_SECONDS)),
        now_ms,
    );

    assert_eq!(selection.filtered_indices, vec![1, 2, 3, 4, 5]);
    assert_eq!(selection.filtered.values(), &[11.0, 12.0, 13.0, 14.0, 15.0]);
    assert_eq!(selection.plotted_indices, vec![1, 2, 3]);
    assert_eq!(selection.plotted.values(), &[11.0, 12.0, 13.0]);
    assert_eq!(
        selection.plotted_times,
        Some(vec![
            OPEN_SECONDS * 1_000,
            (OPEN_SECONDS + 1_800) * 1_000,
            (OPEN_SECONDS + 3_600) * 1_000,
        ])
    );
    assert!(selection.range.is_some());
}

#[test]
fn non_intraday_period_is_not_filtered() {
    let series = session_series();

    let selection = filter_market_hours(
        &series,
        ChartPeriod::OneWeek,
        Some(MarketBound::Epoch(OPEN_SECONDS)),
        Some(MarketBound::Epoch(CLOSE_SECONDS)),
        0,
    );

    assert!(selection.range.is_none());
    assert!(selection.plotted_times.is_none());
    assert_eq!(selection.plotted, series);
    assert_eq!(selection.filtered_indices, (0..series.len()).collect::<Vec<_>>());
}

#[test]
fn missing_bound_disables_filtering() {
    let series = session_series();

    let selection = filter_market_hours(
        &series,
        ChartPeriod::OneDay,
        Some(MarketBound::Epoch(OPEN_SECONDS)),
        None,
        i64::MAX,
    );

    assert!(selection.range.is_none());
    assert_eq!(selection.filtered.len(), series.len());
}

#[test]
fn series_without_timestamps_is_spread_across_the_session() {
    let series = Series::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], None);
    let start_ms = OPEN_SECONDS * 1_000;
    let close_ms = start_ms + 4_000;

    let selection = filter_market_hours(
        &series,
        ChartPeriod::OneDay,
        Some(MarketBound::Epoch(start_ms)),
        Some(MarketBound::Epoch(close_ms)),
        start_ms + 2_000,
    );

    assert_eq!(selection.filtered.len(), 5);
    assert_eq!(selection.plotted_indices, vec![0, 1, 2]);
    assert_eq!(
        selection.plotted_times,
        Some(vec![start_ms, start_ms + 1_000, start_ms + 2_000])
    );
}

#[test]
fn extreme_bounds_synthesize_timestamps_without_overflow() {
    let range = MarketHoursRange::new(MarketBound::Epoch(i64::MIN), MarketBound::Epoch(i64::MAX));
    assert_eq!(range.start_time, i64::MIN);

    let times: Vec<i64> = (0..5).map(|i| range.synthesized_timestamp(i, 5)).collect();
    assert_eq!(times[0], range.start_time);
    assert_eq!(times[4], range.close_time);
    assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn datetime_bounds_round_trip_through_json() {
    let bound = MarketBound::DateTime(
        chrono::DateTime::from_timestamp(OPEN_SECONDS, 0).expect("valid timestamp"),
    );

    let json = serde_json::to_string(&bound).expect("serialize bound");
    let restored: MarketBound = serde_json::from_str(&json).expect("deserialize bound");

    assert_eq!(restored, bound);
    assert_eq!(restored.to_millis(), OPEN_SECONDS * 1_000);
}

proptest! {
    #[test]
    fn filtered_samples_lie_inside_the_session(
        offsets in prop::collection::vec(-20_000i64..40_000, 0..60),
        now_offset in -1_000i64..30_000,
    ) {
        let timestamps: Vec<i64> = offsets.iter().map(|offset| OPEN_SECONDS + offset).collect();
        let values = vec![1.0; timestamps.len()];
        let series = Series::normalized(values, Some(timestamps));
        let start_ms = OPEN_SECONDS * 1_000;
        let close_ms = CLOSE_SECONDS * 1_000;
        let now_ms = (OPEN_SECONDS + now_offset) * 1_000;

        let selection = filter_market_hours(
            &series,
            ChartPeriod::OneDay,
            Some(MarketBound::Epoch(OPEN_SECONDS)),
            Some(MarketBound::Epoch(CLOSE_SECONDS)),
            now_ms,
        );
        let timestamps = series.timestamps().unwrap_or_default();

        for &index in &selection.filtered_indices {
            prop_assert!((start_ms..=close_ms).contains(&timestamps[index]));
        }
        for &index in &selection.plotted_indices {
            prop_assert!(selection.filtered_indices.contains(&index));
            prop_assert!(timestamps[index] <= now_ms);
        }
    }
}
