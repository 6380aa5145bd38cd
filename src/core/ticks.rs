/// Rounds a raw step to the nearest `{1, 2, 5} x 10^k`.
///
/// Non-finite or non-positive input yields `1.0`.
#[must_use]
pub fn nice_step(raw_step: f64) -> f64 {
    if !raw_step.is_finite() || raw_step <= 0.0 {
        return 1.0;
    }

    let magnitude = 10f64.powf(raw_step.log10().floor());
    let fraction = raw_step / magnitude;
    let nice = if fraction < 1.5 {
        1.0
    } else if fraction < 3.5 {
        2.0
    } else if fraction < 7.5 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// `count` ticks evenly spaced across `[start, end]`, both ends included.
#[must_use]
pub fn evenly_spaced_ticks(start: f64, end: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !end.is_finite() || count == 0 {
        return Vec::new();
    }
    if count == 1 || start == end {
        return vec![start];
    }

    let step = (end - start) / (count - 1) as f64;
    (0..count)
        .map(|i| {
            if i == count - 1 {
                end
            } else {
                start + step * i as f64
            }
        })
        .collect()
}

/// Candidate tick with its pixel center and measured label width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledTick {
    pub value: f64,
    pub pixel: f64,
    pub label_width: f64,
}

/// Drops ticks whose labels would overlap their left neighbour.
///
/// Labels are centred on the tick pixel and need `min_gap_px` of space
/// between them. The final tick is always retained; earlier selected ticks
/// that collide with it are removed instead.
#[must_use]
pub fn select_ticks_with_label_spacing(
    mut ticks: Vec<LabeledTick>,
    min_gap_px: f64,
) -> Vec<LabeledTick> {
    ticks.retain(|tick| tick.pixel.is_finite());
    ticks.sort_by(|left, right| left.pixel.total_cmp(&right.pixel));
    let Some(last_tick) = ticks.last().copied() else {
        return ticks;
    };
    let min_gap_px = if min_gap_px.is_finite() {
        min_gap_px.max(0.0)
    } else {
        0.0
    };

    let fits = |left: &LabeledTick, right: &LabeledTick| {
        let left_edge = right.pixel - right.label_width / 2.0;
        let right_edge = left.pixel + left.label_width / 2.0;
        left_edge - right_edge >= min_gap_px
    };

    let mut selected: Vec<LabeledTick> = Vec::with_capacity(ticks.len());
    for tick in ticks.iter().take(ticks.len() - 1) {
        match selected.last() {
            Some(previous) if !fits(previous, tick) => {}
            _ => selected.push(*tick),
        }
    }

    while let Some(previous) = selected.last() {
        if fits(previous, &last_tick) {
            break;
        }
        selected.pop();
    }
    selected.push(last_tick);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_step_rounds_to_nearest_candidate() {
        assert_eq!(nice_step(0.9), 1.0);
        assert_eq!(nice_step(1.4), 1.0);
        assert_eq!(nice_step(1.6), 2.0);
        assert_eq!(nice_step(4.0), 5.0);
        assert_eq!(nice_step(8.0), 10.0);
        assert!((nice_step(0.03) - 0.02).abs() < 1e-12);
        assert_eq!(nice_step(0.0), 1.0);
    }

    #[test]
    fn evenly_spaced_ticks_keep_both_ends() {
        assert_eq!(evenly_spaced_ticks(0.0, 4.0, 5), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(evenly_spaced_ticks(3.0, 3.0, 4), vec![3.0]);
        assert!(evenly_spaced_ticks(0.0, 1.0, 0).is_empty());
    }
}
