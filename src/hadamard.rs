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

use crate::error::{Result, check_len, check_power_of_two};
use simd::Floating;

/// In-place Walsh-Hadamard transform of a fixed power-of-two size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hadamard {
    n: usize,
    normalize: bool,
}

impl Hadamard {
    pub fn new(n: usize, normalize: bool) -> Result<Self> {
        check_power_of_two("the dimension of a Hadamard transform", n)?;
        Ok(Self { n, normalize })
    }

    pub fn dims(&self) -> usize {
        self.n
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    pub fn apply<T: Floating>(&self, buffer: &mut [T]) -> Result<()> {
        check_len(self.n, buffer.len())?;
        T::fht(buffer);
        if self.normalize {
            let scale = T::from_f64(1.0 / (self.n as f64).sqrt());
            T::vector_mul_scalar_inplace(buffer, scale);
        }
        Ok(())
    }
}
