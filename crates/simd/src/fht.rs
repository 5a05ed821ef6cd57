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

#[inline(always)]
fn butterfly<T>(x: &mut [T], h: usize)
where
    T: Copy + std::ops::Add<Output = T> + std::ops::Sub<Output = T>,
{
    for chunk in x.chunks_exact_mut(h << 1) {
        let (l, r) = chunk.split_at_mut(h);
        for j in 0..h {
            (l[j], r[j]) = (l[j] + r[j], l[j] - r[j]);
        }
    }
}

macro_rules! walk {
    ($name:ident, $t:ty) => {
        mod $name {
            #[crate::multiversion("v4", "v3", "v2", "a2")]
            pub fn $name(x: &mut [$t]) {
                let n = x.len();
                let mut h = 1_usize;
                while h < n {
                    super::butterfly(x, h);
                    h <<= 1;
                }
            }
        }
    };
}

walk!(walk_f32, f32);
walk!(walk_f64, f64);

fn check(n: usize) {
    let Some(i) = n.checked_ilog2() else {
        panic!("the dimension of the vector is 0")
    };
    if n != (1 << i) {
        panic!("the dimension of the vector is not a power of 2");
    }
}

pub fn fht_f32(x: &mut [f32]) {
    check(x.len());
    walk_f32::walk_f32(x)
}

pub fn fht_f64(x: &mut [f64]) {
    check(x.len());
    walk_f64::walk_f64(x)
}

#[cfg(test)]
mod tests {
    fn native(x: &mut [f64]) {
        let n = x.len();
        assert!(n.is_power_of_two());
        let mut h = 1;
        while h < n {
            for i in (0..n).step_by(h * 2) {
                for j in i..i + h {
                    (x[j], x[j + h]) = (x[j] + x[j + h], x[j] - x[j + h]);
                }
            }
            h *= 2;
        }
    }

    #[test]
    fn fht() {
        use rand::Rng;
        use std::iter::zip;
        const EPSILON: f64 = 1e-6;
        let mut rng = rand::rng();
        let mut n = 1_usize;
        while n <= 65536 {
            let x = (0..n)
                .map(|_| rng.random_range(-1.0_f32..=1.0_f32))
                .collect::<Vec<_>>();
            let x_expected = {
                let mut x = x.iter().map(|&x| x as f64).collect::<Vec<_>>();
                native(x.as_mut_slice());
                x
            };
            let x_got = {
                let mut x = x.clone();
                super::fht_f32(x.as_mut_slice());
                x
            };
            let mse = zip(x_expected, x_got)
                .map(|(x, y)| (x - y as f64) * (x - y as f64))
                .sum::<f64>()
                / n as f64;
            eprintln!("n = {n}, mse = {mse:.12}");
            assert!(mse <= EPSILON);
            n *= 2;
        }
    }

    #[test]
    fn fht_twice_scales_by_n() {
        let x = vec![1.0_f64, -2.0, 0.5, 4.0, 3.0, -1.0, 0.0, 2.5];
        let mut y = x.clone();
        super::fht_f64(&mut y);
        super::fht_f64(&mut y);
        for (a, b) in x.iter().zip(y.iter()) {
            assert!((a * 8.0 - b).abs() < 1e-12, "{a} * 8 != {b}");
        }
    }

    #[test]
    #[should_panic(expected = "not a power of 2")]
    fn fht_rejects_non_power_of_two() {
        super::fht_f64(&mut [1.0, 2.0, 3.0]);
    }
}
