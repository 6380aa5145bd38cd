use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{
    LiveUpdate, OhlcBar, PriceConversion, Resolution, Series, process_live_update_with,
};

/// How an accepted tick changed the bar collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BarUpdate {
    /// The latest bar was rewritten in place.
    Replaced(OhlcBar),
    /// A bar was appended; `trimmed` counts the oldest bars dropped to stay
    /// within the configured cap.
    Appended { bar: OhlcBar, trimmed: usize },
}

impl BarUpdate {
    #[must_use]
    pub fn bar(self) -> OhlcBar {
        match self {
            Self::Replaced(bar) | Self::Appended { bar, .. } => bar,
        }
    }
}

/// Append-only bar history whose last entry is the single mutable bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarFeed {
    bars: Vec<OhlcBar>,
    resolution: Resolution,
    max_bars: Option<usize>,
    conversion: PriceConversion,
}

impl BarFeed {
    #[must_use]
    pub fn new(resolution: Resolution) -> Self {
        Self {
            bars: Vec::new(),
            resolution,
            max_bars: None,
            conversion: PriceConversion::Identity,
        }
    }

    #[must_use]
    pub fn with_max_bars(mut self, max_bars: Option<usize>) -> Self {
        self.max_bars = max_bars.filter(|max| *max > 0);
        self.trim();
        self
    }

    #[must_use]
    pub fn with_conversion(mut self, conversion: PriceConversion) -> Self {
        self.conversion = conversion;
        self
    }

    /// Replaces the history with already-finalized bars, sorted by time.
    pub fn seed(&mut self, mut bars: Vec<OhlcBar>) {
        bars.sort_by_key(|bar| bar.time);
        bars.dedup_by(|later, earlier| {
            if later.time == earlier.time {
                *earlier = *later;
                true
            } else {
                false
            }
        });
        self.bars = bars;
        self.trim();
    }

    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    #[must_use]
    pub fn bars(&self) -> &[OhlcBar] {
        &self.bars
    }

    #[must_use]
    pub fn last_bar(&self) -> Option<&OhlcBar> {
        self.bars.last()
    }

    /// Folds a tick into the history. Returns `None` when the tick is ignored.
    pub fn apply(&mut self, update: &LiveUpdate) -> Option<BarUpdate> {
        let Some((bar, decision)) =
            process_live_update_with(update, self.bars.last(), self.resolution, self.conversion)
        else {
            trace!(timestamp = update.timestamp, "ignored live update");
            return None;
        };
        trace!(time = bar.time, ?decision, close = bar.close, "live update");

        if let Some(last) = self.bars.last_mut().filter(|last| last.time == bar.time) {
            *last = bar;
            return Some(BarUpdate::Replaced(bar));
        }
        self.bars.push(bar);
        let trimmed = self.trim();
        Some(BarUpdate::Appended { bar, trimmed })
    }

    /// Bar close prices, oldest first.
    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Bar times in epoch seconds, oldest first.
    #[must_use]
    pub fn times(&self) -> Vec<i64> {
        self.bars.iter().map(|bar| bar.time).collect()
    }

    /// Close-price series with millisecond timestamps, ready for bucketing.
    #[must_use]
    pub fn to_series(&self) -> Series {
        let timestamps = self
            .bars
            .iter()
            .map(|bar| bar.time.saturating_mul(1_000))
            .collect();
        Series::new(self.closes(), Some(timestamps))
    }

    fn trim(&mut self) -> usize {
        let Some(max) = self.max_bars else {
            return 0;
        };
        let excess = self.bars.len().saturating_sub(max);
        if excess > 0 {
            self.bars.drain(..excess);
        }
        excess
    }
}
