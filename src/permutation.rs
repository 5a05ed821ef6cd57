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
use rand::seq::SliceRandom;

/// A fixed reordering `buffer'[j] = buffer[indices[j]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    indices: Vec<u32>,
    // smallest element of every cycle longer than one
    leaders: Vec<u32>,
}

impl Permutation {
    /// Indices are stored as `u32`, so `n` must not exceed `u32::MAX`.
    pub fn new(n: usize, seed: u64) -> Result<Self> {
        let Ok(end) = u32::try_from(n) else {
            return Err(Error::Configuration(format!(
                "a permutation of {n} elements does not fit 32-bit indices"
            )));
        };
        let mut indices = (0..end).collect::<Vec<_>>();
        indices.shuffle(&mut rng(seed));
        Ok(Self::from_indices(indices))
    }

    fn from_indices(indices: Vec<u32>) -> Self {
        let n = indices.len();
        let mut visited = vec![false; n];
        let mut leaders = Vec::new();
        for (i, leader) in (0..n).zip(0_u32..) {
            if visited[i] {
                continue;
            }
            let mut j = i;
            while !visited[j] {
                visited[j] = true;
                j = indices[j] as usize;
            }
            if indices[i] as usize != i {
                leaders.push(leader);
            }
        }
        Self { indices, leaders }
    }

    pub fn dims(&self) -> usize {
        self.indices.len()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn inverse(&self) -> Self {
        let mut inverse = vec![0_u32; self.indices.len()];
        for (&j, i) in self.indices.iter().zip(0_u32..) {
            inverse[j as usize] = i;
        }
        Self::from_indices(inverse)
    }

    pub fn apply<T: Copy>(&self, buffer: &mut [T]) -> Result<()> {
        check_len(self.indices.len(), buffer.len())?;
        for &leader in self.leaders.iter() {
            let leader = leader as usize;
            let first = buffer[leader];
            let mut j = leader;
            loop {
                let k = self.indices[j] as usize;
                if k == leader {
                    buffer[j] = first;
                    break;
                }
                buffer[j] = buffer[k];
                j = k;
            }
        }
        Ok(())
    }
}
