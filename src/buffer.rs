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

use crate::error::{Error, Result};
use simd::Floating;

/// Output storage for a feature map.
///
/// Owned storage is resized to the required length; borrowed views must
/// already have it.
pub trait FeatureBuffer<T> {
    fn prepare(&mut self, len: usize) -> Result<&mut [T]>;
}

impl<T: Floating> FeatureBuffer<T> for Vec<T> {
    fn prepare(&mut self, len: usize) -> Result<&mut [T]> {
        if self.len() != len {
            log::warn!("resizing output from {} to {len}", self.len());
            self.resize(len, T::zero());
        }
        Ok(self.as_mut_slice())
    }
}

impl<T: Floating> FeatureBuffer<T> for &mut [T] {
    fn prepare(&mut self, len: usize) -> Result<&mut [T]> {
        if self.len() != len {
            return Err(Error::SizeMismatch {
                expected: len,
                actual: self.len(),
            });
        }
        Ok(&mut **self)
    }
}

#[test]
fn owned_resizes() {
    let mut out = vec![1.0_f32; 3];
    assert_eq!(out.prepare(8).unwrap().len(), 8);
    assert_eq!(out.len(), 8);
}

#[test]
fn borrowed_rejects() {
    let mut storage = vec![0.0_f64; 8];
    let mut view = &mut storage[..4];
    assert!(matches!(
        view.prepare(8),
        Err(Error::SizeMismatch {
            expected: 8,
            actual: 4
        })
    ));
    assert_eq!(view.prepare(4).unwrap().len(), 4);
}
