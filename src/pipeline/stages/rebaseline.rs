//! Rebaseline: per-row median subtraction.

use ndarray::Array2;

/// Subtracts each row's median from that row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rebaseline;

impl Rebaseline {
    pub fn name(&self) -> &str {
        "Rebaseline"
    }

    pub fn apply(&self, samples: &mut Array2<f32>) {
        let mut scratch = Vec::with_capacity(samples.ncols());
        for mut row in samples.rows_mut() {
            scratch.clear();
            scratch.extend(row.iter().copied());
            if let Some(median) = median(&mut scratch) {
                row.mapv_inplace(|v| v - median);
            }
        }
    }
}

/// Median of a buffer, averaging the two middle values for even lengths.
///
/// The buffer is reordered.
pub fn median(values: &mut [f32]) -> Option<f32> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    values.sort_unstable_by(f32::total_cmp);
    let mid = n / 2;
    if n % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}
