//! Core data types shared by sources, the manager and display consumers
//!
//! A [`Part`] is the unit handed to one display slot: a channel × tick block of
//! samples, the ids of its channels, and the tick metadata of the readout.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Timing of the tick axis: `(start, period, count)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickInfo {
    /// Time of the first tick
    pub start: f64,
    /// Time between two ticks
    pub period: f64,
    /// Number of ticks the readout claims to hold
    pub count: usize,
}

impl TickInfo {
    pub fn new(start: f64, period: f64, count: usize) -> Self {
        Self {
            start,
            period,
            count,
        }
    }

    /// Default timing for data without metadata: start 0, unit period.
    pub fn unit(count: usize) -> Self {
        Self::new(0.0, 1.0, count)
    }

    /// Build from the archived `[start, period, count]` vector.
    ///
    /// Returns `None` unless the vector holds exactly three values.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [start, period, count] => {
                let count = if count.is_finite() && *count > 0.0 {
                    *count as usize
                } else {
                    0
                };
                Some(Self::new(*start, *period, count))
            }
            _ => None,
        }
    }

    /// Absolute time of a tick column.
    pub fn time_at(&self, column: usize) -> f64 {
        self.start + column as f64 * self.period
    }
}

/// One channel-plane slice of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Samples, `[channels × ticks]`
    pub samples: Array2<f32>,
    /// One id per sample row
    pub channel_ids: Array1<i64>,
    /// Timing shared by every part of one generation
    pub tick_info: TickInfo,
}

impl Part {
    /// Build a part, returning `None` if the channel ids do not match the rows.
    pub fn new(samples: Array2<f32>, channel_ids: Array1<i64>, tick_info: TickInfo) -> Option<Self> {
        if channel_ids.len() != samples.nrows() {
            return None;
        }
        Some(Self {
            samples,
            channel_ids,
            tick_info,
        })
    }

    /// Build a part whose channel ids are `0..rows`.
    pub fn with_sequential_channels(samples: Array2<f32>, tick_info: TickInfo) -> Self {
        let channel_ids = Array1::from_iter(0..samples.nrows() as i64);
        Self {
            samples,
            channel_ids,
            tick_info,
        }
    }

    pub fn channels(&self) -> usize {
        self.samples.nrows()
    }

    pub fn ticks(&self) -> usize {
        self.samples.ncols()
    }

    /// `(channels, ticks)`
    pub fn shape(&self) -> (usize, usize) {
        self.samples.dim()
    }

    /// Whether the tick metadata agrees with the sample columns.
    ///
    /// Archives do not guarantee this, so it is advisory only.
    pub fn tick_count_matches(&self) -> bool {
        self.tick_info.count == self.samples.ncols()
    }

    /// Smallest and largest finite sample, if any.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.samples
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Parts of one generation, index-aligned to detector planes.
///
/// `None` marks a plane the detector does not have.
pub type PartList = Vec<Option<Part>>;

/// Number of populated slots in a part list.
pub fn populated(parts: &[Option<Part>]) -> usize {
    parts.iter().filter(|p| p.is_some()).count()
}
