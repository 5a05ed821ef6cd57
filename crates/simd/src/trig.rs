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

use std::f64::consts::FRAC_2_PI;

const LANES: usize = 16;

// Above these magnitudes the Cody-Waite constants no longer reduce exactly.
const REDUCTION_LIMIT_F64: f64 = 1e5;
const REDUCTION_LIMIT_F32: f32 = 1e3;

#[inline(always)]
fn quadrant<T: Copy + std::ops::Neg<Output = T>>(q: i64, s: T, c: T) -> (T, T) {
    let (sin, cos) = if q & 1 == 0 { (s, c) } else { (c, s) };
    let sin = if q & 2 == 0 { sin } else { -sin };
    let cos = if q.wrapping_add(1) & 2 == 0 { cos } else { -cos };
    (sin, cos)
}

#[inline(always)]
fn sincos_f64_u10(x: f64) -> (f64, f64) {
    if !(x.abs() <= REDUCTION_LIMIT_F64) {
        return x.sin_cos();
    }
    const PIO2_1: f64 = 1.57079632673412561417e+00;
    const PIO2_2: f64 = 6.07710050630396597660e-11;
    const PIO2_3: f64 = 2.02226624871116645580e-21;
    let q = (x * FRAC_2_PI).round_ties_even();
    let r = ((x - q * PIO2_1) - q * PIO2_2) - q * PIO2_3;
    let z = r * r;
    let s = r
        + r * z
            * (((((1.58962301576546568060e-10 * z - 2.50507477628578072866e-8) * z
                + 2.75573136213857245213e-6)
                * z
                - 1.98412698295895385996e-4)
                * z
                + 8.33333333332211858878e-3)
                * z
                - 1.66666666666666307295e-1);
    let c = 1.0 - 0.5 * z
        + z * z
            * (((((-1.13585365213876817300e-11 * z + 2.08757008419747316778e-9) * z
                - 2.75573141792967388112e-7)
                * z
                + 2.48015872888517045348e-5)
                * z
                - 1.38888888888730564116e-3)
                * z
                + 4.16666666666665929218e-2);
    quadrant(q as i64, s, c)
}

#[inline(always)]
fn sincos_f64_u35(x: f64) -> (f64, f64) {
    if !(x.abs() <= REDUCTION_LIMIT_F64) {
        return x.sin_cos();
    }
    const PIO2_1: f64 = 1.57079632673412561417e+00;
    const PIO2_1T: f64 = 6.07710050650619224932e-11;
    let q = (x * FRAC_2_PI).round_ties_even();
    let r = (x - q * PIO2_1) - q * PIO2_1T;
    let z = r * r;
    let s = r
        + r * z
            * ((((-2.50507477628578072866e-8 * z + 2.75573136213857245213e-6) * z
                - 1.98412698295895385996e-4)
                * z
                + 8.33333333332211858878e-3)
                * z
                - 1.66666666666666307295e-1);
    let c = 1.0 - 0.5 * z
        + z * z
            * ((((2.08757008419747316778e-9 * z - 2.75573141792967388112e-7) * z
                + 2.48015872888517045348e-5)
                * z
                - 1.38888888888730564116e-3)
                * z
                + 4.16666666666665929218e-2);
    quadrant(q as i64, s, c)
}

#[inline(always)]
fn sincos_f32_u10(x: f32) -> (f32, f32) {
    let (s, c) = sincos_f64_u10(x as f64);
    (s as f32, c as f32)
}

#[inline(always)]
fn sincos_f32_u35(x: f32) -> (f32, f32) {
    if !(x.abs() <= REDUCTION_LIMIT_F32) {
        return x.sin_cos();
    }
    const PIO2_A: f32 = 1.5703125;
    const PIO2_B: f32 = 4.837512969970703125e-4;
    const PIO2_C: f32 = 7.54978995489188216e-8;
    let q = (x * std::f32::consts::FRAC_2_PI).round_ties_even();
    let r = ((x - q * PIO2_A) - q * PIO2_B) - q * PIO2_C;
    let z = r * r;
    let s = ((-1.9515295891e-4 * z + 8.3321608736e-3) * z - 1.6666654611e-1) * z * r + r;
    let c = ((2.443315711809948e-5 * z - 1.388731625493765e-3) * z + 4.166664568298827e-2) * z * z
        - 0.5 * z
        + 1.0;
    quadrant(q as i64, s, c)
}

macro_rules! expand {
    ($name:ident, $t:ty, $kernel:ident) => {
        mod $name {
            #[crate::multiversion("v4", "v3", "v2", "a2")]
            pub fn $name(x: &mut [$t]) {
                use super::LANES;
                let mut end = x.len() >> 1;
                // The highest batch goes first: its writes land at or above `2 * start`,
                // and every unread source sits below `start`.
                while end > 0 {
                    let len = end.min(LANES);
                    let start = end - len;
                    let mut v = [0.0 as $t; LANES];
                    v[..len].copy_from_slice(&x[start..end]);
                    let mut s = [0.0 as $t; LANES];
                    let mut c = [0.0 as $t; LANES];
                    for i in 0..LANES {
                        (s[i], c[i]) = super::$kernel(v[i]);
                    }
                    let out = &mut x[start << 1..end << 1];
                    for i in 0..len {
                        out[i << 1] = c[i];
                        out[(i << 1) + 1] = s[i];
                    }
                    end = start;
                }
            }
        }
    };
}

expand!(expand_f32_u10, f32, sincos_f32_u10);
expand!(expand_f32_u35, f32, sincos_f32_u35);
expand!(expand_f64_u10, f64, sincos_f64_u10);
expand!(expand_f64_u35, f64, sincos_f64_u35);

pub fn sincos_expand_f32_u10(x: &mut [f32]) {
    expand_f32_u10::expand_f32_u10(x)
}

pub fn sincos_expand_f32_u35(x: &mut [f32]) {
    expand_f32_u35::expand_f32_u35(x)
}

pub fn sincos_expand_f64_u10(x: &mut [f64]) {
    expand_f64_u10::expand_f64_u10(x)
}

pub fn sincos_expand_f64_u35(x: &mut [f64]) {
    expand_f64_u35::expand_f64_u35(x)
}
