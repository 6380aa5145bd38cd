use chrono::FixedOffset;
use line_chart_engine::api::{
    format_date_label, format_tick_label, format_time_label, format_value_label,
};

const MARCH_15_2024_MS: i64 = 1_710_460_800_000;
const HOUR_MS: i64 = 3_600_000;
const MINUTE_MS: i64 = 60_000;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).expect("utc offset")
}

#[test]
fn value_labels_scale_precision_with_magnitude() {
    assert_eq!(format_value_label(1_234.0), "1.2k");
    assert_eq!(format_value_label(-2_500.0), "-2.5k");
    assert_eq!(format_value_label(150.4), "150");
    assert_eq!(format_value_label(12.345), "12.3");
    assert_eq!(format_value_label(1.234), "1.23");
    assert_eq!(format_value_label(-0.5), "-0.50");
    assert_eq!(format_value_label(f64::NAN), "-");
}

#[test]
fn tick_labels_follow_the_step() {
    assert_eq!(format_tick_label(1.5, 0.5), "1.5");
    assert_eq!(format_tick_label(2.0, 0.5), "2.0");
    assert_eq!(format_tick_label(100.0, 20.0), "100");
    assert_eq!(format_tick_label(0.001, 0.0005), "0.0010");
    assert_eq!(format_tick_label(2.3, 0.1), "2.3");
    assert_eq!(format_tick_label(1.0, 1e-9), "1.000000");
}

#[test]
fn large_tick_labels_use_thousands() {
    assert_eq!(format_tick_label(1_500.0, 500.0), "1.5k");
    assert_eq!(format_tick_label(2_000.0, 500.0), "2.0k");
    assert_eq!(format_tick_label(20_000.0, 5_000.0), "20k");
}

#[test]
fn adjacent_ticks_never_share_a_label() {
    let step = 0.25;
    let labels: Vec<String> = (0..5)
        .map(|i| format_tick_label(10.0 + step * f64::from(i), step))
        .collect();
    let mut unique = labels.clone();
    unique.dedup();
    assert_eq!(unique, labels);
}

#[test]
fn time_labels_use_a_twelve_hour_clock() {
    assert_eq!(
        format_time_label(MARCH_15_2024_MS + 9 * HOUR_MS + 15 * MINUTE_MS, utc()),
        "9:15 AM"
    );
    assert_eq!(format_time_label(MARCH_15_2024_MS + 14 * HOUR_MS, utc()), "2 PM");
    assert_eq!(format_time_label(MARCH_15_2024_MS + 12 * HOUR_MS, utc()), "12 PM");
    assert_eq!(format_time_label(MARCH_15_2024_MS + 5 * MINUTE_MS, utc()), "12:05 AM");
}

#[test]
fn time_labels_honour_the_offset() {
    let ist = FixedOffset::east_opt(19_800).expect("ist offset");
    let utc_0345 = MARCH_15_2024_MS + 3 * HOUR_MS + 45 * MINUTE_MS;
    assert_eq!(format_time_label(utc_0345, ist), "9:15 AM");
}

#[test]
fn date_labels_show_month_and_day() {
    assert_eq!(format_date_label(MARCH_15_2024_MS, utc()), "Mar 15");
    assert_eq!(
        format_date_label(MARCH_15_2024_MS - 14 * 24 * HOUR_MS, utc()),
        "Mar 1"
    );
}
