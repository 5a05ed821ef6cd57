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

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// Returns the `index`-th word of the ChaCha12 keystream keyed by `master`.
///
/// Random access into the stream, so `derive(m, i)` equals the `i`-th value
/// drawn from [`Seeds::new(m)`](Seeds::new).
pub fn derive(master: u64, index: u64) -> u64 {
    let mut rng = ChaCha12Rng::seed_from_u64(master);
    rng.set_word_pos(u128::from(index) << 1);
    rng.next_u64()
}

/// Sequential counterpart of [`derive`].
pub struct Seeds {
    rng: ChaCha12Rng,
}

impl Seeds {
    pub fn new(master: u64) -> Self {
        Self {
            rng: ChaCha12Rng::seed_from_u64(master),
        }
    }
}

impl Iterator for Seeds {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        Some(self.rng.next_u64())
    }
}

pub(crate) fn rng(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}

#[test]
fn random_access_matches_sequence() {
    let sequence = Seeds::new(42).take(8).collect::<Vec<_>>();
    for (i, &seed) in sequence.iter().enumerate() {
        assert_eq!(derive(42, i as u64), seed);
    }
}

#[test]
fn masters_are_independent() {
    let a = Seeds::new(1).take(64).collect::<Vec<_>>();
    let b = Seeds::new(2).take(64).collect::<Vec<_>>();
    assert!(a.iter().zip(b.iter()).all(|(x, y)| x != y));
    let mut sorted = a.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), a.len());
}
