//! UnitNorm: rescale each array to `[0, 1]`.

use ndarray::Array2;

/// Maps `x` to `(x - min) / (max - min)`; constant arrays become all zero.
///
/// The range is taken over finite samples only and computed in `f64`, so
/// extreme magnitudes cannot overflow. Infinities map to the nearer bound;
/// NaN samples stay NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitNorm;

impl UnitNorm {
    pub fn name(&self) -> &str {
        "UnitNorm"
    }

    pub fn apply(&self, samples: &mut Array2<f32>) {
        let range = samples
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f32, f32)>, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            });
        let Some((lo, hi)) = range.filter(|(lo, hi)| hi > lo) else {
            samples.mapv_inplace(|v| {
                if v.is_nan() {
                    v
                } else if v == f32::INFINITY {
                    1.0
                } else {
                    0.0
                }
            });
            return;
        };
        let (lo, span) = (f64::from(lo), f64::from(hi) - f64::from(lo));
        samples.mapv_inplace(|v| {
            if v.is_nan() {
                v
            } else {
                ((f64::from(v) - lo) / span).clamp(0.0, 1.0) as f32
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_constant_array_is_zero() {
        let mut data = Array2::from_elem((3, 4), 7.5f32);
        UnitNorm.apply(&mut data);
        assert!(data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rescale() {
        let mut data = array![[2.0f32, 4.0], [6.0, 10.0]];
        UnitNorm.apply(&mut data);
        assert_eq!(data, array![[0.0, 0.25], [0.5, 1.0]]);
    }

    #[test]
    fn test_nan_ignored_for_range() {
        let mut data = array![[0.0f32, f32::NAN, 2.0]];
        UnitNorm.apply(&mut data);
        assert_eq!(data[[0, 0]], 0.0);
        assert_eq!(data[[0, 2]], 1.0);
        assert!(data[[0, 1]].is_nan());
    }

    #[test]
    fn test_infinities_map_to_bounds() {
        let mut data = array![[f32::NEG_INFINITY, 0.0, 1.0, f32::INFINITY]];
        UnitNorm.apply(&mut data);
        assert_eq!(data, array![[0.0, 0.0, 1.0, 1.0]]);

        let mut data = array![[f32::NEG_INFINITY, 0.0, f32::INFINITY]];
        UnitNorm.apply(&mut data);
        assert_eq!(data, array![[0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_extreme_range_does_not_overflow() {
        let mut data = array![[-3.0e38f32, 0.0, 3.0e38]];
        UnitNorm.apply(&mut data);
        assert_eq!(data, array![[0.0, 0.5, 1.0]]);
    }

    fn any_sample() -> impl Strategy<Value = f32> {
        prop_oneof![
            8 => prop::num::f32::NORMAL | prop::num::f32::SUBNORMAL | prop::num::f32::ZERO,
            1 => Just(f32::INFINITY),
            1 => Just(f32::NEG_INFINITY),
        ]
    }

    proptest! {
        #[test]
        fn test_output_within_unit_interval(
            values in prop::collection::vec(any_sample(), 1..64)
        ) {
            // Property: any non-NaN input lands in [0, 1]
            let mut data = Array2::from_shape_vec((1, values.len()), values).unwrap();
            UnitNorm.apply(&mut data);
            prop_assert!(data.iter().all(|&v| (0.0..=1.0).contains(&v)), "{:?}", data);
        }
    }
}
