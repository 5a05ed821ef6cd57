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

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{what} must be a non-zero power of two, but it is {size}")]
    InvalidDimension { what: &'static str, size: usize },
    #[error("expected a buffer of length {expected}, but its length is {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn check_power_of_two(what: &'static str, size: usize) -> Result<()> {
    if size.is_power_of_two() {
        Ok(())
    } else {
        Err(Error::InvalidDimension { what, size })
    }
}

pub(crate) fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::SizeMismatch { expected, actual })
    }
}
