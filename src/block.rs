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

use crate::chain::Chain;
use crate::error::{Error, Result, check_power_of_two};
use simd::Floating;

/// One structured random projection of a padded power-of-two size.
#[derive(Debug, Clone, PartialEq)]
pub struct FastFoodBlock<T> {
    chain: Chain<T>,
}

impl<T: Floating> FastFoodBlock<T> {
    pub fn new(size: usize, sigma: f64, seed: u64) -> Result<Self> {
        Self::with_normalization(size, sigma, seed, true)
    }

    pub fn with_normalization(size: usize, sigma: f64, seed: u64, normalize: bool) -> Result<Self> {
        check_power_of_two("the size of a block", size)?;
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::Configuration(format!(
                "sigma must be positive and finite, but it is {sigma}"
            )));
        }
        let mut chain = Chain::new(size, sigma, seed, normalize)?;
        let norm = chain.gaussian().vector_norm();
        chain
            .gaussian_product_mut()
            .rescale(T::from_f64(1.0 / norm.sqrt()));
        Ok(Self { chain })
    }

    pub fn transform_size(&self) -> usize {
        self.chain.dims()
    }

    pub fn chain(&self) -> &Chain<T> {
        &self.chain
    }

    /// Zeroes `out`, copies `input` to its front and projects the first
    /// `transform_size()` entries in place.
    pub fn apply(&self, out: &mut [T], input: &[T]) -> Result<()> {
        let n = self.transform_size();
        if input.len().max(1).next_power_of_two() != n {
            return Err(Error::SizeMismatch {
                expected: n,
                actual: input.len(),
            });
        }
        if out.len() < n {
            return Err(Error::SizeMismatch {
                expected: n,
                actual: out.len(),
            });
        }
        out.fill(T::zero());
        out[..input.len()].copy_from_slice(input);
        self.chain.apply(&mut out[..n])
    }
}
