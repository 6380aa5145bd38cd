mod locator;

use serde::{Deserialize, Serialize};

pub use locator::{interpolate_y, nearest_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CrosshairMode {
    /// Crosshair Y follows the nearest plotted sample.
    #[default]
    Magnet,
    /// Crosshair Y is interpolated along the curve under the pointer.
    Normal,
    /// Crosshair remains hidden regardless of pointer movement.
    Hidden,
}

/// Selection exposed to tooltips.
///
/// `x_domain_value` is the original timestamp (epoch ms) of the selected
/// sample when the series has timestamps, otherwise its plotted index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipState {
    pub selected_index: usize,
    pub value: f64,
    #[serde(default)]
    pub x_domain_value: Option<f64>,
}

/// Public crosshair state exposed to host applications.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CrosshairState {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub tooltip: Option<TooltipState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    crosshair_mode: CrosshairMode,
    cursor_x: f64,
    cursor_y: f64,
    crosshair: CrosshairState,
}

impl InteractionState {
    #[must_use]
    pub fn crosshair_mode(self) -> CrosshairMode {
        self.crosshair_mode
    }

    pub fn set_crosshair_mode(&mut self, mode: CrosshairMode) {
        self.crosshair_mode = mode;
        if mode == CrosshairMode::Hidden {
            self.on_pointer_leave();
        }
    }

    #[must_use]
    pub fn cursor(self) -> (f64, f64) {
        (self.cursor_x, self.cursor_y)
    }

    #[must_use]
    pub fn crosshair(self) -> CrosshairState {
        self.crosshair
    }

    /// Records the raw pointer and the resolved crosshair position.
    pub fn on_pointer_move(
        &mut self,
        pointer: (f64, f64),
        snapped: Option<(f64, f64)>,
        tooltip: Option<TooltipState>,
    ) {
        self.cursor_x = pointer.0;
        self.cursor_y = pointer.1;
        if self.crosshair_mode == CrosshairMode::Hidden {
            return;
        }
        let (x, y) = snapped.unwrap_or(pointer);
        self.crosshair = CrosshairState {
            visible: tooltip.is_some(),
            x,
            y,
            tooltip,
        };
    }

    pub fn on_pointer_leave(&mut self) {
        self.crosshair = CrosshairState::default();
    }
}
