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

use crate::block::FastFoodBlock;
use crate::buffer::FeatureBuffer;
use crate::error::{Error, Result};
use crate::finalizer::GaussianFinalizer;
use crate::options::KernelOptions;
use crate::seed::Seeds;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;
use simd::Floating;

/// Random Fourier features of the Gaussian kernel, stacked from independent blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelEnsemble<T> {
    blocks: Vec<FastFoodBlock<T>>,
    finalizer: GaussianFinalizer,
    padded_input_size: usize,
}

impl<T: Floating> KernelEnsemble<T> {
    pub fn new(stacked_size: usize, input_size: usize, sigma: f64, seed: u64) -> Result<Self> {
        Self::with_finalizer(
            stacked_size,
            input_size,
            sigma,
            seed,
            GaussianFinalizer::default(),
        )
    }

    pub fn with_finalizer(
        stacked_size: usize,
        input_size: usize,
        sigma: f64,
        seed: u64,
        finalizer: GaussianFinalizer,
    ) -> Result<Self> {
        if input_size == 0 {
            return Err(Error::InvalidDimension {
                what: "the input size",
                size: input_size,
            });
        }
        let padded_input_size = input_size
            .checked_next_power_of_two()
            .ok_or_else(|| Error::Configuration(format!("input size {input_size} is too large")))?;
        let requested = stacked_size.max(padded_input_size);
        let stacked_size = requested
            .checked_next_multiple_of(padded_input_size)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "stacked size {requested} cannot be divided into blocks of {padded_input_size}"
                ))
            })?;
        if stacked_size != requested {
            log::warn!(
                "stacked size {requested} is not a multiple of {padded_input_size}, rounding up to {stacked_size}"
            );
        }
        let number_of_blocks = stacked_size / padded_input_size;
        if number_of_blocks
            .checked_mul(padded_input_size << 1)
            .is_none()
        {
            return Err(Error::Configuration(format!(
                "{number_of_blocks} blocks of {padded_input_size} overflow the output length"
            )));
        }
        log::debug!(
            "building {number_of_blocks} blocks of size {padded_input_size}, sigma = {sigma}, seed = {seed}"
        );
        let blocks = Seeds::new(seed)
            .take(number_of_blocks)
            .map(|block_seed| FastFoodBlock::new(padded_input_size, sigma, block_seed))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            blocks,
            finalizer,
            padded_input_size,
        })
    }

    pub fn from_options(options: &KernelOptions) -> Result<Self> {
        options.check()?;
        Self::with_finalizer(
            options.stacked_size(),
            options.input_size,
            options.sigma,
            options.seed,
            GaussianFinalizer::with_precision(options.precision),
        )
    }

    pub fn blocks(&self) -> &[FastFoodBlock<T>] {
        &self.blocks
    }

    pub fn number_of_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn padded_input_size(&self) -> usize {
        self.padded_input_size
    }

    pub fn finalizer(&self) -> GaussianFinalizer {
        self.finalizer
    }

    pub fn output_size(&self) -> usize {
        self.blocks.len() * (self.padded_input_size << 1)
    }

    fn apply_block(&self, i: usize, segment: &mut [T], input: &[T]) -> Result<()> {
        self.blocks[i].apply(segment, input)?;
        self.finalizer.apply(segment)
    }

    fn normalize(out: &mut [T]) {
        let scale = T::from_f64(1.0 / ((out.len() >> 1) as f64).sqrt());
        T::vector_mul_scalar_inplace(out, scale);
    }

    pub fn apply<O: FeatureBuffer<T> + ?Sized>(&self, out: &mut O, input: &[T]) -> Result<()> {
        self.check_input(input)?;
        let out = out.prepare(self.output_size())?;
        for (i, segment) in out.chunks_exact_mut(self.padded_input_size << 1).enumerate() {
            self.apply_block(i, segment, input)?;
        }
        Self::normalize(out);
        Ok(())
    }

    /// Same as [`KernelEnsemble::apply`], with blocks spread over a scoped pool of
    /// `num_threads` workers. The output is identical.
    pub fn apply_parallel<O: FeatureBuffer<T> + ?Sized>(
        &self,
        out: &mut O,
        input: &[T],
        num_threads: usize,
    ) -> Result<()> {
        self.check_input(input)?;
        let out = out.prepare(self.output_size())?;
        let segment_size = self.padded_input_size << 1;
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_scoped(
                |thread| thread.run(),
                |pool| {
                    pool.install(|| {
                        out.par_chunks_exact_mut(segment_size)
                            .enumerate()
                            .try_for_each(|(i, segment)| self.apply_block(i, segment, input))
                    })
                },
            )??;
        Self::normalize(out);
        Ok(())
    }

    /// Maps every row of `inputs` in parallel, one owned feature vector per row.
    pub fn apply_batch(&self, inputs: &[Vec<T>], num_threads: usize) -> Result<Vec<Vec<T>>> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_scoped(
                |thread| thread.run(),
                |pool| {
                    pool.install(|| {
                        inputs
                            .into_par_iter()
                            .map(|input| -> Result<Vec<T>> {
                                let mut out = vec![T::zero(); self.output_size()];
                                self.apply(&mut out, input)?;
                                Ok(out)
                            })
                            .collect::<Result<Vec<_>>>()
                    })
                },
            )?
    }

    fn check_input(&self, input: &[T]) -> Result<()> {
        if input.len().max(1).next_power_of_two() != self.padded_input_size {
            return Err(Error::SizeMismatch {
                expected: self.padded_input_size,
                actual: input.len(),
            });
        }
        Ok(())
    }
}
