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

use crate::Floating;

macro_rules! kernels {
    ($t:ident, $reduce_sum_of_x2:ident, $vector_mul_inplace:ident, $vector_mul_scalar_inplace:ident) => {
        mod $reduce_sum_of_x2 {
            #[crate::multiversion("v4", "v3", "v2:fma", "a2")]
            pub fn $reduce_sum_of_x2(this: &[$t]) -> f64 {
                const LANES: usize = 16;
                let mut sum = [0.0 as $t; LANES];
                let (chunks, remainder) = this.as_chunks::<LANES>();
                for chunk in chunks {
                    for i in 0..LANES {
                        sum[i] += chunk[i] * chunk[i];
                    }
                }
                let mut total = 0.0_f64;
                for i in 0..LANES {
                    total += sum[i] as f64;
                }
                for &x in remainder {
                    total += (x * x) as f64;
                }
                total
            }
        }

        mod $vector_mul_inplace {
            #[crate::multiversion("v4", "v3", "v2", "a2")]
            pub fn $vector_mul_inplace(lhs: &mut [$t], rhs: &[$t]) {
                assert!(lhs.len() == rhs.len());
                let n = lhs.len();
                for i in 0..n {
                    lhs[i] *= rhs[i];
                }
            }
        }

        mod $vector_mul_scalar_inplace {
            #[crate::multiversion("v4", "v3", "v2", "a2")]
            pub fn $vector_mul_scalar_inplace(lhs: &mut [$t], rhs: $t) {
                let n = lhs.len();
                for i in 0..n {
                    lhs[i] *= rhs;
                }
            }
        }
    };
}

kernels!(
    f32,
    reduce_sum_of_x2_f32,
    vector_mul_inplace_f32,
    vector_mul_scalar_inplace_f32
);

kernels!(
    f64,
    reduce_sum_of_x2_f64,
    vector_mul_inplace_f64,
    vector_mul_scalar_inplace_f64
);

impl Floating for f32 {
    #[inline(always)]
    fn zero() -> Self {
        0.0f32
    }

    #[inline(always)]
    fn one() -> Self {
        1.0f32
    }

    #[inline(always)]
    fn from_f64(x: f64) -> Self {
        x as f32
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline(always)]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }

    #[inline(always)]
    fn reduce_sum_of_x2(this: &[f32]) -> f64 {
        reduce_sum_of_x2_f32::reduce_sum_of_x2_f32(this)
    }

    #[inline(always)]
    fn vector_mul_inplace(lhs: &mut [f32], rhs: &[f32]) {
        vector_mul_inplace_f32::vector_mul_inplace_f32(lhs, rhs);
    }

    #[inline(always)]
    fn vector_mul_scalar_inplace(lhs: &mut [f32], rhs: f32) {
        vector_mul_scalar_inplace_f32::vector_mul_scalar_inplace_f32(lhs, rhs);
    }

    #[inline(always)]
    fn fht(this: &mut [f32]) {
        crate::fht::fht_f32(this);
    }

    #[inline(always)]
    fn sincos_expand_u10(this: &mut [f32]) {
        crate::trig::sincos_expand_f32_u10(this);
    }

    #[inline(always)]
    fn sincos_expand_u35(this: &mut [f32]) {
        crate::trig::sincos_expand_f32_u35(this);
    }
}

impl Floating for f64 {
    #[inline(always)]
    fn zero() -> Self {
        0.0f64
    }

    #[inline(always)]
    fn one() -> Self {
        1.0f64
    }

    #[inline(always)]
    fn from_f64(x: f64) -> Self {
        x
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline(always)]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    #[inline(always)]
    fn reduce_sum_of_x2(this: &[f64]) -> f64 {
        reduce_sum_of_x2_f64::reduce_sum_of_x2_f64(this)
    }

    #[inline(always)]
    fn vector_mul_inplace(lhs: &mut [f64], rhs: &[f64]) {
        vector_mul_inplace_f64::vector_mul_inplace_f64(lhs, rhs);
    }

    #[inline(always)]
    fn vector_mul_scalar_inplace(lhs: &mut [f64], rhs: f64) {
        vector_mul_scalar_inplace_f64::vector_mul_scalar_inplace_f64(lhs, rhs);
    }

    #[inline(always)]
    fn fht(this: &mut [f64]) {
        crate::fht::fht_f64(this);
    }

    #[inline(always)]
    fn sincos_expand_u10(this: &mut [f64]) {
        crate::trig::sincos_expand_f64_u10(this);
    }

    #[inline(always)]
    fn sincos_expand_u35(this: &mut [f64]) {
        crate::trig::sincos_expand_f64_u35(this);
    }
}

#[test]
fn reduce_sum_of_x2() {
    use rand::Rng;
    const EPSILON: f64 = 1e-3;
    let mut rng = rand::rng();
    for n in [0_usize, 1, 7, 16, 33, 4016] {
        let this = (0..n)
            .map(|_| rng.random_range(-1.0_f32..=1.0_f32))
            .collect::<Vec<_>>();
        let expected = this.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>();
        let got = f32::reduce_sum_of_x2(&this);
        assert!(
            (expected - got).abs() < EPSILON,
            "n = {n}, expected = {expected}, got = {got}."
        );
    }
}

#[test]
fn vector_mul() {
    let mut lhs = vec![1.0_f64, -2.0, 3.0, 0.5];
    f64::vector_mul_inplace(&mut lhs, &[2.0, 2.0, -1.0, 4.0]);
    assert_eq!(lhs, vec![2.0, -4.0, -3.0, 2.0]);
    f64::vector_mul_scalar_inplace(&mut lhs, 0.5);
    assert_eq!(lhs, vec![1.0, -2.0, -1.5, 1.0]);
}
