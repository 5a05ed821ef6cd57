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

pub mod block;
pub mod buffer;
pub mod chain;
pub mod diagonal;
pub mod error;
pub mod finalizer;
pub mod hadamard;
pub mod kernel;
pub mod options;
pub mod permutation;
pub mod seed;

pub use block::FastFoodBlock;
pub use buffer::FeatureBuffer;
pub use error::{Error, Result};
pub use finalizer::{GaussianFinalizer, Precision};
pub use kernel::KernelEnsemble;
pub use options::KernelOptions;
pub use simd::Floating;
