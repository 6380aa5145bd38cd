use crate::interaction::{CrosshairMode, TooltipState, interpolate_y, nearest_index};

use super::ChartFrame;

/// Selects the plotted sample nearest to pointer `x`.
pub(super) fn resolve_tooltip(frame: &ChartFrame, x: f64) -> Option<TooltipState> {
    let positions = frame.x_positions();
    let selected_index = nearest_index(&positions, x)?;
    let value = *frame.plotted_values.get(selected_index)?;
    let x_domain_value = match &frame.plotted_timestamps {
        Some(timestamps) => timestamps.get(selected_index).map(|time| *time as f64),
        None => Some(selected_index as f64),
    };
    Some(TooltipState {
        selected_index,
        value,
        x_domain_value,
    })
}

/// Crosshair position and tooltip for pointer `x`.
///
/// Magnet mode snaps onto the selected sample; normal mode keeps the pointer
/// X and follows the curve by linear interpolation.
pub(super) fn resolve_crosshair(
    frame: &ChartFrame,
    x: f64,
    mode: CrosshairMode,
) -> Option<((f64, f64), TooltipState)> {
    let tooltip = resolve_tooltip(frame, x)?;
    let points = &frame.curve.points;
    match mode {
        CrosshairMode::Hidden => None,
        CrosshairMode::Magnet => {
            let point = points.get(tooltip.selected_index)?;
            Some(((point.x, point.y), tooltip))
        }
        CrosshairMode::Normal => {
            let first = points.first()?.x;
            let last = points.last()?.x;
            let clamped = x.clamp(first.min(last), first.max(last));
            let y = interpolate_y(points, clamped)?;
            Some(((clamped, y), tooltip))
        }
    }
}
