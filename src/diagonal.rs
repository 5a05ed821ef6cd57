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

use crate::error::{Error, Result, check_len};
use crate::seed::rng;
use rand::Rng;
use rand_distr::{ChiSquared, Distribution, StandardNormal};
use simd::Floating;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagonalKind {
    /// Entries are `+1` or `-1` with equal probability.
    Rademacher,
    /// Entries are drawn from `N(0, 1)`.
    Gaussian,
    /// Entries are chi(n) samples, the norm of an `n`-dimensional Gaussian row.
    ChiScaling,
    /// Every entry is `n^(1/4) / sigma`, before the block's variance correction.
    GaussianProduct,
}

/// Elementwise scaling by a fixed diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagonal<T> {
    kind: DiagonalKind,
    values: Vec<T>,
}

impl<T: Floating> Diagonal<T> {
    pub fn rademacher(n: usize, seed: u64) -> Self {
        let mut rng = rng(seed);
        let values = (0..n)
            .map(|_| if rng.random::<bool>() { T::one() } else { -T::one() })
            .collect();
        Self {
            kind: DiagonalKind::Rademacher,
            values,
        }
    }

    pub fn gaussian(n: usize, seed: u64) -> Self {
        let mut rng = rng(seed);
        let values = (0..n)
            .map(|_| T::from_f64(StandardNormal.sample(&mut rng)))
            .collect();
        Self {
            kind: DiagonalKind::Gaussian,
            values,
        }
    }

    /// Fails with [`Error::InvalidDimension`] when `n` is zero.
    pub fn chi_scaling(n: usize, seed: u64) -> Result<Self> {
        let chi_squared = ChiSquared::new(n as f64).map_err(|_| Error::InvalidDimension {
            what: "the dimension of a chi scaling diagonal",
            size: n,
        })?;
        let mut rng = rng(seed);
        let values = (0..n)
            .map(|_| T::from_f64(chi_squared.sample(&mut rng).sqrt()))
            .collect();
        Ok(Self {
            kind: DiagonalKind::ChiScaling,
            values,
        })
    }

    pub fn gaussian_product(n: usize, sigma: f64) -> Self {
        let value = T::from_f64((n as f64).sqrt().sqrt() / sigma);
        Self {
            kind: DiagonalKind::GaussianProduct,
            values: vec![value; n],
        }
    }

    pub fn kind(&self) -> DiagonalKind {
        self.kind
    }

    pub fn dims(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn apply(&self, buffer: &mut [T]) -> Result<()> {
        check_len(self.values.len(), buffer.len())?;
        T::vector_mul_inplace(buffer, &self.values);
        Ok(())
    }

    pub fn rescale(&mut self, factor: T) {
        T::vector_mul_scalar_inplace(&mut self.values, factor);
    }

    /// Euclidean norm of the stored entries.
    pub fn vector_norm(&self) -> f64 {
        T::reduce_sum_of_x2(&self.values).sqrt()
    }
}
