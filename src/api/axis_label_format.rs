use chrono::{DateTime, FixedOffset, TimeZone, Timelike};

const MAX_TICK_DECIMALS: usize = 6;

/// Compact label for tooltips and last-value badges.
///
/// Magnitudes of at least 1000 render as `x.xk`, at least 100 with no
/// decimals, at least 10 with one decimal, anything smaller with two.
#[must_use]
pub fn format_value_label(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_owned();
    }
    let magnitude = value.abs();
    if magnitude >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else if magnitude >= 100.0 {
        format!("{value:.0}")
    } else if magnitude >= 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}

/// Axis tick label whose precision follows the tick `step`, so adjacent
/// ticks never render identical text. Values of magnitude 1000 or more are
/// shown in thousands with a `k` suffix.
#[must_use]
pub fn format_tick_label(value: f64, step: f64) -> String {
    if !value.is_finite() {
        return "-".to_owned();
    }
    if value.abs() >= 1_000.0 {
        let decimals = decimals_for_step(step / 1_000.0);
        return format!("{:.*}k", decimals, value / 1_000.0);
    }
    let decimals = decimals_for_step(step);
    format!("{value:.decimals$}")
}

fn decimals_for_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 || step >= 1.0 {
        return 0;
    }
    let decimals = (-step.log10() - 1e-9).ceil();
    (decimals.max(0.0) as usize).min(MAX_TICK_DECIMALS)
}

/// 12-hour clock label such as `9:15 AM` or `10 AM`; minutes are omitted
/// when exactly on the hour.
#[must_use]
pub fn format_time_label(epoch_ms: i64, offset: FixedOffset) -> String {
    match offset.timestamp_millis_opt(epoch_ms).single() {
        Some(time) => format_clock(time),
        None => "-".to_owned(),
    }
}

fn format_clock(time: DateTime<FixedOffset>) -> String {
    let (is_pm, hour) = time.hour12();
    let suffix = if is_pm { "PM" } else { "AM" };
    match time.minute() {
        0 => format!("{hour} {suffix}"),
        minute => format!("{hour}:{minute:02} {suffix}"),
    }
}

/// Day label (`Mar 5`) for index-axis ticks backed by a timestamp.
#[must_use]
pub fn format_date_label(epoch_ms: i64, offset: FixedOffset) -> String {
    match offset.timestamp_millis_opt(epoch_ms).single() {
        Some(time) => time.format("%b %-d").to_string(),
        None => "-".to_owned(),
    }
}
