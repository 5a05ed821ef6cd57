// This software is licensed under a dual license model:
//
// GNU Affero General Public License v3 (AGPLv3): You may use, modify, and
// distribute this software under the terms of the AGPLv3.
//
// Elastic License v2 (ELv2): You may also use, modify, and distribute this
// software under the Elastic License v2, which has specific restrictions.
//
// We welcome any commercial collaboration or support. For inquiries
// regarding the licenses, please contact us at:
// vectorchord-inquiry@tensorchord.ai
//
// Copyright (c) 2025 TensorChord Inc.

use crate::error::{Result, check_power_of_two};
use serde::{Deserialize, Serialize};
use simd::Floating;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Low,
    #[default]
    High,
}

/// Expands each projected value `v` into the pair `(cos v, sin v)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GaussianFinalizer {
    precision: Precision,
}

impl GaussianFinalizer {
    pub fn new(use_low_precision: bool) -> Self {
        Self {
            precision: if use_low_precision {
                Precision::Low
            } else {
                Precision::High
            },
        }
    }

    pub fn with_precision(precision: Precision) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn set_use_low_precision(&mut self, use_low_precision: bool) {
        *self = Self::new(use_low_precision);
    }

    /// Reads the first half of `buffer` and overwrites the whole buffer with
    /// `buffer[2i] = cos(v_i)`, `buffer[2i + 1] = sin(v_i)`.
    pub fn apply<T: Floating>(&self, buffer: &mut [T]) -> Result<()> {
        check_power_of_two("the length of a finalized buffer", buffer.len())?;
        match self.precision {
            Precision::Low => T::sincos_expand_u35(buffer),
            Precision::High => T::sincos_expand_u10(buffer),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn check<T: Floating>(finalizer: GaussianFinalizer, n: usize, epsilon: f64) {
        let mut rng = rand::rng();
        let v = (0..n / 2)
            .map(|_| rng.random_range(-20.0..=20.0))
            .collect::<Vec<f64>>();
        let mut buffer = vec![T::zero(); n];
        for i in 0..n / 2 {
            buffer[i] = T::from_f64(v[i]);
        }
        finalizer.apply(&mut buffer).unwrap();
        for i in 0..n / 2 {
            let x = T::from_f64(v[i]).to_f64();
            let (c, s) = (buffer[2 * i].to_f64(), buffer[2 * i + 1].to_f64());
            assert!((c - x.cos()).abs() < epsilon, "n = {n}, i = {i}, cos = {c}");
            assert!((s - x.sin()).abs() < epsilon, "n = {n}, i = {i}, sin = {s}");
            assert!((c * c + s * s - 1.0).abs() < 2.0 * epsilon);
        }
    }

    #[test]
    fn interleaves_cos_and_sin() {
        for log in 1..=12 {
            let n = 1 << log;
            check::<f64>(GaussianFinalizer::new(false), n, 1e-14);
            check::<f64>(GaussianFinalizer::new(true), n, 1e-10);
            check::<f32>(GaussianFinalizer::new(false), n, 1e-7);
            check::<f32>(GaussianFinalizer::new(true), n, 5e-6);
        }
    }

    #[test]
    fn known_values() {
        let mut buffer = vec![0.0_f64, std::f64::consts::FRAC_PI_2, 0.0, 0.0];
        GaussianFinalizer::default().apply(&mut buffer).unwrap();
        assert!((buffer[0] - 1.0).abs() < 1e-15);
        assert!(buffer[1].abs() < 1e-15);
        assert!(buffer[2].abs() < 1e-15);
        assert!((buffer[3] - 1.0).abs() < 1e-15);
    }

    #[test]
    fn large_values_stay_on_the_unit_circle() {
        let values = [1e10_f64, -1e15, 1e20, 3.5e9, 123456.789, -2e5, 1e300, 0.0];
        for precision in [Precision::High, Precision::Low] {
            let mut buffer = vec![0.0_f64; 16];
            buffer[..8].copy_from_slice(&values);
            GaussianFinalizer::with_precision(precision)
                .apply(&mut buffer)
                .unwrap();
            for (i, v) in values.iter().enumerate() {
                let (es, ec) = v.sin_cos();
                assert!((buffer[2 * i] - ec).abs() < 1e-10, "v = {v}, cos = {}", buffer[2 * i]);
                assert!((buffer[2 * i + 1] - es).abs() < 1e-10, "v = {v}, sin = {}", buffer[2 * i + 1]);
            }
            assert!(buffer.iter().all(|x| (-1.0..=1.0).contains(x)));
        }
        let mut buffer = vec![1e6_f32, 1e8, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        GaussianFinalizer::new(true).apply(&mut buffer).unwrap();
        for (i, v) in [1e6_f32, 1e8].iter().enumerate() {
            let (es, ec) = (*v as f64).sin_cos();
            assert!((buffer[2 * i] as f64 - ec).abs() < 5e-6, "v = {v}");
            assert!((buffer[2 * i + 1] as f64 - es).abs() < 5e-6, "v = {v}");
        }
    }

    #[test]
    fn non_finite_values_become_nan() {
        let mut buffer = vec![f64::INFINITY, f64::NAN, 0.0, 0.0];
        GaussianFinalizer::default().apply(&mut buffer).unwrap();
        assert!(buffer.iter().all(|x| x.is_nan()));
    }

    #[test]
    fn rejects_non_power_of_two() {
        let mut buffer = vec![0.0_f32; 6];
        assert!(matches!(
            GaussianFinalizer::new(true).apply(&mut buffer),
            Err(crate::Error::InvalidDimension { size: 6, .. })
        ));
    }

    #[test]
    fn precision_switch() {
        let mut finalizer = GaussianFinalizer::default();
        assert_eq!(finalizer.precision(), Precision::High);
        finalizer.set_use_low_precision(true);
        assert_eq!(finalizer.precision(), Precision::Low);
    }
}
