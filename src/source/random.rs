//! Synthetic source
//!
//! Generates Gaussian noise with a few amplified rows per plane. The
//! generator is seeded from the index, so the same index always yields the
//! same samples.

use super::DataSource;
use crate::error::Result;
use crate::types::{Part, PartList, TickInfo};
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

pub const NOISE_MEAN: f32 = 100.0;
pub const NOISE_SIGMA: f32 = 10.0;
/// Spike rows per plane are drawn from this range.
pub const SPIKES: std::ops::Range<usize> = 1..5;
/// Spike amplitudes are drawn from this range.
pub const SPIKE_AMPLITUDE: std::ops::Range<f32> = 20.0..50.0;

/// Plane shapes matching the default three-plane layout.
pub fn default_shapes() -> Vec<(usize, usize)> {
    vec![(800, 1500), (800, 1500), (960, 1500)]
}

#[derive(Debug, Clone)]
pub struct RandomSource {
    shapes: Vec<(usize, usize)>,
    index: usize,
    layer: usize,
    display_name: Option<String>,
    parts: PartList,
}

impl RandomSource {
    /// One plane per `(channels, ticks)` shape.
    pub fn new(shapes: Vec<(usize, usize)>) -> Self {
        Self {
            shapes,
            index: 0,
            layer: 0,
            display_name: None,
            parts: Vec::new(),
        }
    }

    pub fn shapes(&self) -> &[(usize, usize)] {
        &self.shapes
    }

    /// Generate the parts for `index` without moving.
    pub fn sample(&self, index: usize) -> PartList {
        let mut rng = ChaCha8Rng::seed_from_u64(index as u64);
        self.shapes
            .iter()
            .map(|&(rows, cols)| Some(sample_plane(&mut rng, rows, cols)))
            .collect()
    }

    fn generate_at(&mut self, index: usize) -> PartList {
        let parts = self.sample(index);
        self.index = index;
        self.parts = parts.clone();
        parts
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new(default_shapes())
    }
}

fn sample_plane(rng: &mut ChaCha8Rng, rows: usize, cols: usize) -> Part {
    let mut samples = Array2::from_shape_simple_fn((rows, cols), || {
        NOISE_MEAN + NOISE_SIGMA * rng.sample::<f32, _>(StandardNormal)
    });
    if rows > 0 {
        for _ in 0..rng.gen_range(SPIKES) {
            let row = rng.gen_range(0..rows);
            let amplitude = rng.gen_range(SPIKE_AMPLITUDE);
            samples.row_mut(row).mapv_inplace(|v| v + amplitude);
        }
    }
    Part::with_sequential_channels(samples, TickInfo::unit(cols))
}

impl DataSource for RandomSource {
    fn name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| format!("random_{}", self.index))
    }

    fn set_display_name(&mut self, name: Option<String>) {
        self.display_name = name;
    }

    fn index(&self) -> usize {
        self.index
    }

    fn layer(&self) -> usize {
        self.layer
    }

    fn inventory_len(&self) -> Option<usize> {
        None
    }

    fn parts(&self) -> PartList {
        self.parts.clone()
    }

    fn generate(&mut self) -> Result<PartList> {
        Ok(self.generate_at(self.index))
    }

    fn jump(&mut self, index: usize) -> Result<PartList> {
        Ok(self.generate_at(index))
    }

    fn set_layer(&mut self, layer: usize) -> Result<PartList> {
        self.layer = layer;
        Ok(self.generate_at(self.index))
    }
}
