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

use crate::diagonal::Diagonal;
use crate::error::Result;
use crate::hadamard::Hadamard;
use crate::permutation::Permutation;
use crate::seed::derive;
use simd::Floating;

/// A borrowed view of one stage of a [`Chain`].
#[derive(Debug, Clone, Copy)]
pub enum Operator<'a, T> {
    Diagonal(&'a Diagonal<T>),
    Hadamard(&'a Hadamard),
    Permutation(&'a Permutation),
}

impl<T: Floating> Operator<'_, T> {
    pub fn dims(&self) -> usize {
        match self {
            Operator::Diagonal(x) => x.dims(),
            Operator::Hadamard(x) => x.dims(),
            Operator::Permutation(x) => x.dims(),
        }
    }

    #[inline]
    pub fn apply(&self, buffer: &mut [T]) -> Result<()> {
        match self {
            Operator::Diagonal(x) => x.apply(buffer),
            Operator::Hadamard(x) => x.apply(buffer),
            Operator::Permutation(x) => x.apply(buffer),
        }
    }
}

// seed tags, equal to the stage positions
const CHI_SCALING: u64 = 1;
const GAUSSIAN: u64 = 3;
const PERMUTATION: u64 = 4;
const RADEMACHER: u64 = 6;

/// The seven stages of a block: Gaussian product, chi scaling, Hadamard,
/// Gaussian, permutation, Hadamard, Rademacher.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain<T> {
    gaussian_product: Diagonal<T>,
    chi_scaling: Diagonal<T>,
    hadamard: Hadamard,
    gaussian: Diagonal<T>,
    permutation: Permutation,
    rademacher: Diagonal<T>,
}

impl<T: Floating> Chain<T> {
    pub fn new(n: usize, sigma: f64, seed: u64, normalize: bool) -> Result<Self> {
        let hadamard = Hadamard::new(n, normalize)?;
        Ok(Self {
            gaussian_product: Diagonal::gaussian_product(n, sigma),
            chi_scaling: Diagonal::chi_scaling(n, derive(seed, CHI_SCALING))?,
            hadamard,
            gaussian: Diagonal::gaussian(n, derive(seed, GAUSSIAN)),
            permutation: Permutation::new(n, derive(seed, PERMUTATION))?,
            rademacher: Diagonal::rademacher(n, derive(seed, RADEMACHER)),
        })
    }

    pub fn dims(&self) -> usize {
        self.hadamard.dims()
    }

    pub fn stages(&self) -> [Operator<'_, T>; 7] {
        [
            Operator::Diagonal(&self.gaussian_product),
            Operator::Diagonal(&self.chi_scaling),
            Operator::Hadamard(&self.hadamard),
            Operator::Diagonal(&self.gaussian),
            Operator::Permutation(&self.permutation),
            Operator::Hadamard(&self.hadamard),
            Operator::Diagonal(&self.rademacher),
        ]
    }

    pub fn gaussian_product(&self) -> &Diagonal<T> {
        &self.gaussian_product
    }

    pub fn gaussian_product_mut(&mut self) -> &mut Diagonal<T> {
        &mut self.gaussian_product
    }

    pub fn chi_scaling(&self) -> &Diagonal<T> {
        &self.chi_scaling
    }

    pub fn gaussian(&self) -> &Diagonal<T> {
        &self.gaussian
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    pub fn rademacher(&self) -> &Diagonal<T> {
        &self.rademacher
    }

    pub fn apply(&self, buffer: &mut [T]) -> Result<()> {
        for stage in self.stages() {
            stage.apply(buffer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagonal::DiagonalKind;

    #[test]
    fn stage_order() {
        let chain = Chain::<f64>::new(16, 1.0, 42, true).unwrap();
        let kinds = chain
            .stages()
            .iter()
            .map(|stage| match stage {
                Operator::Diagonal(x) => Some(x.kind()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                Some(DiagonalKind::GaussianProduct),
                Some(DiagonalKind::ChiScaling),
                None,
                Some(DiagonalKind::Gaussian),
                None,
                None,
                Some(DiagonalKind::Rademacher),
            ]
        );
        let stages = chain.stages();
        assert!(matches!(stages[2], Operator::Hadamard(_)));
        assert!(matches!(stages[4], Operator::Permutation(_)));
        assert!(matches!(stages[5], Operator::Hadamard(_)));
        assert!(stages.iter().all(|stage| stage.dims() == 16));
        assert_eq!(chain.dims(), 16);
        assert_eq!(chain.gaussian().kind(), DiagonalKind::Gaussian);
        assert_eq!(chain.chi_scaling().kind(), DiagonalKind::ChiScaling);
        assert_eq!(chain.rademacher().kind(), DiagonalKind::Rademacher);
        assert_eq!(chain.permutation().dims(), 16);
    }

    #[test]
    fn stage_seeds_are_distinct() {
        let chain = Chain::<f64>::new(64, 1.0, 7, true).unwrap();
        assert_eq!(
            chain.gaussian(),
            &Diagonal::gaussian(64, derive(7, GAUSSIAN))
        );
        assert_eq!(
            chain.permutation(),
            &Permutation::new(64, derive(7, PERMUTATION)).unwrap()
        );
        assert_ne!(
            chain.rademacher(),
            &Diagonal::rademacher(64, derive(7, GAUSSIAN))
        );
    }

    #[test]
    fn apply_matches_manual_composition() {
        let chain = Chain::<f64>::new(8, 0.5, 9, true).unwrap();
        let x = vec![0.5, -1.0, 2.0, 0.0, 1.5, -0.25, 3.0, 1.0];
        let mut manual = x.clone();
        for stage in chain.stages() {
            stage.apply(&mut manual).unwrap();
        }
        let mut y = x.clone();
        chain.apply(&mut y).unwrap();
        assert_eq!(manual, y);
    }

    #[test]
    fn is_linear() {
        let chain = Chain::<f64>::new(32, 1.0, 3, true).unwrap();
        let x = (0..32).map(|i| (i as f64 * 0.3).cos()).collect::<Vec<_>>();
        let mut y = x.clone();
        chain.apply(&mut y).unwrap();
        let mut z = x.iter().map(|v| v * 3.0).collect::<Vec<_>>();
        chain.apply(&mut z).unwrap();
        for (a, b) in y.iter().zip(z.iter()) {
            assert!((a * 3.0 - b).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_non_power_of_two() {
        assert!(matches!(
            Chain::<f32>::new(12, 1.0, 0, true),
            Err(crate::Error::InvalidDimension { size: 12, .. })
        ));
    }
}
