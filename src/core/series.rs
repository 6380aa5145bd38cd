use serde::{Deserialize, Serialize};

use crate::core::Sample;
use crate::core::primitives::is_seconds_scale;

/// Ordered value series with optional parallel timestamps (epoch milliseconds
/// once normalized).
///
/// `timestamps`, when present, always has the same length as `values`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Series {
    values: Vec<f64>,
    #[serde(default)]
    timestamps: Option<Vec<i64>>,
}

impl Series {
    /// Builds a series without reordering. Timestamps whose length does not
    /// match `values` are dropped.
    #[must_use]
    pub fn new(values: Vec<f64>, timestamps: Option<Vec<i64>>) -> Self {
        let timestamps = timestamps.filter(|ts| ts.len() == values.len());
        Self { values, timestamps }
    }

    /// Builds a normalized series: see [`normalize_series`].
    #[must_use]
    pub fn normalized(values: Vec<f64>, timestamps: Option<Vec<i64>>) -> Self {
        normalize_series(values, timestamps).series
    }

    /// Builds a normalized series from raw samples. Timestamps are kept only
    /// when every sample carries one.
    #[must_use]
    pub fn from_samples(samples: &[Sample]) -> Self {
        let values = samples.iter().map(|sample| sample.value).collect();
        let timestamps = samples
            .iter()
            .map(|sample| sample.timestamp)
            .collect::<Option<Vec<_>>>();
        Self::normalized(values, timestamps)
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn timestamps(&self) -> Option<&[i64]> {
        self.timestamps.as_deref()
    }

    #[must_use]
    pub fn has_timestamps(&self) -> bool {
        self.timestamps.is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn timestamp_at(&self, index: usize) -> Option<i64> {
        self.timestamps
            .as_ref()
            .and_then(|ts| ts.get(index).copied())
    }

    #[must_use]
    pub fn samples(&self) -> Vec<Sample> {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| Sample::new(*value, self.timestamp_at(index)))
            .collect()
    }

    /// Returns a new series made of the samples at `indices`, in that order.
    /// Out-of-range indices are skipped.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        let values = indices
            .iter()
            .filter_map(|&index| self.values.get(index).copied())
            .collect();
        let timestamps = self.timestamps.as_ref().map(|ts| {
            indices
                .iter()
                .filter_map(|&index| ts.get(index).copied())
                .collect()
        });
        Self { values, timestamps }
    }
}

/// Output of a pipeline stage: a fresh series plus, for each of its samples,
/// the position of the sample it came from in the stage input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesStage {
    pub series: Series,
    pub source_indices: Vec<usize>,
}

impl SeriesStage {
    #[must_use]
    pub fn identity(series: Series) -> Self {
        let source_indices = (0..series.len()).collect();
        Self {
            series,
            source_indices,
        }
    }
}

/// Sorts and deduplicates a raw batch.
///
/// - mismatched `timestamps`/`values` lengths drop the timestamps entirely
/// - a batch whose largest timestamp is below `10^12` is promoted from
///   seconds to milliseconds
/// - pairs are sorted ascending by timestamp and equal timestamps collapse
///   into one entry holding the last value in input order
pub fn normalize_series(values: Vec<f64>, timestamps: Option<Vec<i64>>) -> SeriesStage {
    let Some(mut timestamps) = timestamps.filter(|ts| ts.len() == values.len()) else {
        return SeriesStage::identity(Series::new(values, None));
    };

    if let Some(max) = timestamps.iter().copied().max() {
        if is_seconds_scale(max) {
            for timestamp in &mut timestamps {
                *timestamp = timestamp.saturating_mul(1_000);
            }
        }
    }

    let mut order: Vec<usize> = (0..values.len()).collect();
    // Stable sort keeps input order among equal timestamps.
    order.sort_by_key(|&index| timestamps[index]);

    let mut source_indices: Vec<usize> = Vec::with_capacity(order.len());
    for index in order {
        if let Some(last) = source_indices.last_mut() {
            if timestamps[*last] == timestamps[index] {
                *last = index;
                continue;
            }
        }
        source_indices.push(index);
    }

    let series = Series {
        values: source_indices.iter().map(|&index| values[index]).collect(),
        timestamps: Some(
            source_indices
                .iter()
                .map(|&index| timestamps[index])
                .collect(),
        ),
    };
    SeriesStage {
        series,
        source_indices,
    }
}
