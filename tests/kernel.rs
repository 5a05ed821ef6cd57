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

use fastfood::{Error, FastFoodBlock, GaussianFinalizer, KernelEnsemble, KernelOptions, Precision};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn dot(lhs: &[f64], rhs: &[f64]) -> f64 {
    lhs.iter().zip(rhs.iter()).map(|(x, y)| x * y).sum()
}

fn features(ensemble: &KernelEnsemble<f64>, input: &[f64]) -> Vec<f64> {
    let mut out = Vec::new();
    ensemble.apply(&mut out, input).unwrap();
    out
}

#[test]
fn small_ensemble() {
    let ensemble = KernelEnsemble::<f64>::new(8, 4, 1.0, 42).unwrap();
    assert_eq!(ensemble.number_of_blocks(), 2);
    assert_eq!(ensemble.padded_input_size(), 4);
    let input = [0.25, -1.0, 0.5, 2.0];
    let out = features(&ensemble, &input);
    assert_eq!(out.len(), 16);
    let scale = ((out.len() / 2) as f64).sqrt();
    for pair in out.chunks_exact(2) {
        let (c, s) = (pair[0] * scale, pair[1] * scale);
        assert!((-1.0..=1.0).contains(&c) && (-1.0..=1.0).contains(&s));
        assert!((c * c + s * s - 1.0).abs() < 1e-12);
    }
    let norm = dot(&out, &out).sqrt();
    assert!(norm.is_finite());
    assert!((norm - 1.0).abs() < 1e-12);

    let again = KernelEnsemble::<f64>::new(8, 4, 1.0, 42).unwrap();
    let repeated = features(&again, &input);
    assert_eq!(
        out.iter().map(|x| x.to_bits()).collect::<Vec<_>>(),
        repeated.iter().map(|x| x.to_bits()).collect::<Vec<_>>()
    );
    let other = KernelEnsemble::<f64>::new(8, 4, 1.0, 43).unwrap();
    assert_ne!(out, features(&other, &input));
}

#[test]
fn output_length() {
    for (stacked, input, blocks) in [
        (8, 4, 2),
        (1, 4, 1),
        (4096, 100, 32),
        (12, 8, 2),
        (100, 16, 7),
        (64, 5, 8),
    ] {
        let ensemble = KernelEnsemble::<f32>::new(stacked, input, 1.0, 0).unwrap();
        assert_eq!(ensemble.number_of_blocks(), blocks, "stacked = {stacked}, input = {input}");
        let mut out = Vec::new();
        ensemble.apply(&mut out, &vec![0.5; input]).unwrap();
        assert_eq!(
            out.len(),
            ensemble.number_of_blocks() * 2 * ensemble.padded_input_size()
        );
        assert_eq!(out.len(), ensemble.output_size());
    }
}

#[test]
fn approximates_gaussian_kernel() {
    let mut rng = StdRng::seed_from_u64(2024);
    let dims = 16;
    for (sigma, distance) in [(1.0, 1.0), (1.0, 0.5), (2.0, 3.0), (1.0, 3.0)] {
        let ensemble = KernelEnsemble::<f64>::new(8192, dims, sigma, 7).unwrap();
        let x = (0..dims)
            .map(|_| rng.random_range(-0.5..=0.5))
            .collect::<Vec<f64>>();
        let direction = (0..dims)
            .map(|_| rng.random_range(-1.0..=1.0))
            .collect::<Vec<f64>>();
        let length = dot(&direction, &direction).sqrt();
        let y = x
            .iter()
            .zip(direction.iter())
            .map(|(a, d)| a + d / length * distance)
            .collect::<Vec<_>>();
        let expected = (-distance * distance / (2.0 * sigma * sigma)).exp();
        let got = dot(&features(&ensemble, &x), &features(&ensemble, &y));
        assert!(
            (got - expected).abs() < 0.1,
            "sigma = {sigma}, distance = {distance}, expected = {expected}, got = {got}."
        );
    }
}

#[test]
fn parallel_matches_sequential() {
    let ensemble = KernelEnsemble::<f32>::new(1024, 60, 0.7, 99).unwrap();
    let input = (0..60).map(|i| (i as f32 * 0.1).sin()).collect::<Vec<_>>();
    let mut sequential = Vec::new();
    ensemble.apply(&mut sequential, &input).unwrap();
    let mut parallel = vec![0.0_f32; ensemble.output_size()];
    let mut view = parallel.as_mut_slice();
    ensemble.apply_parallel(&mut view, &input, 4).unwrap();
    assert_eq!(sequential, parallel);

    let batch = ensemble
        .apply_batch(&[input.clone(), input.clone()], 2)
        .unwrap();
    assert_eq!(batch.len(), 2);
    assert!(batch.iter().all(|row| *row == sequential));
}

#[test]
fn views_must_fit() {
    let ensemble = KernelEnsemble::<f64>::new(8, 4, 1.0, 42).unwrap();
    let mut storage = vec![0.0; 12];
    let mut view = storage.as_mut_slice();
    assert!(matches!(
        ensemble.apply(&mut view, &[1.0; 4]),
        Err(Error::SizeMismatch {
            expected: 16,
            actual: 12
        })
    ));
    let mut storage = vec![0.0; 16];
    let mut view = storage.as_mut_slice();
    ensemble.apply(&mut view, &[1.0; 4]).unwrap();
    assert_eq!(storage, features(&ensemble, &[1.0; 4]));

    let mut owned = vec![0.0; 3];
    ensemble.apply(&mut owned, &[1.0; 4]).unwrap();
    assert_eq!(owned.len(), 16);
}

#[test]
fn rejects_bad_inputs() {
    let ensemble = KernelEnsemble::<f64>::new(16, 8, 1.0, 0).unwrap();
    let mut out = Vec::new();
    assert!(matches!(
        ensemble.apply(&mut out, &[1.0; 3]),
        Err(Error::SizeMismatch {
            expected: 8,
            actual: 3
        })
    ));
    assert!(ensemble.apply(&mut out, &[1.0; 5]).is_ok());
    assert!(matches!(
        KernelEnsemble::<f64>::new(16, 0, 1.0, 0),
        Err(Error::InvalidDimension { size: 0, .. })
    ));
    assert!(matches!(
        KernelEnsemble::<f64>::new(16, 4, f64::NAN, 0),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        FastFoodBlock::<f64>::new(5, 1.0, 0),
        Err(Error::InvalidDimension { size: 5, .. })
    ));
    assert!(matches!(
        KernelEnsemble::<f64>::new(usize::MAX, 4, 1.0, 0),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn low_precision_is_close() {
    let high = KernelEnsemble::<f32>::new(256, 32, 1.0, 5).unwrap();
    let low = KernelEnsemble::<f32>::with_finalizer(256, 32, 1.0, 5, GaussianFinalizer::new(true))
        .unwrap();
    let input = (0..32).map(|i| i as f32 / 32.0 - 0.5).collect::<Vec<_>>();
    let mut a = Vec::new();
    let mut b = Vec::new();
    high.apply(&mut a, &input).unwrap();
    low.apply(&mut b, &input).unwrap();
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).abs() < 1e-5, "{x} != {y}");
    }
}

#[test]
fn from_options() {
    let options = KernelOptions::from_toml(
        r#"
        input_size = 4
        stacked_size = 8
        seed = 42
        precision = "low"
        "#,
    )
    .unwrap();
    let ensemble = KernelEnsemble::<f64>::from_options(&options).unwrap();
    assert_eq!(ensemble.number_of_blocks(), 2);
    assert_eq!(ensemble.finalizer().precision(), Precision::Low);
    let mut options = KernelOptions::new(4);
    options.sigma = 0.0;
    assert!(KernelEnsemble::<f64>::from_options(&options).is_err());
}

#[test]
fn narrow_bandwidth_keeps_features_bounded() {
    for sigma in [1e-12, 1e-6] {
        let ensemble = KernelEnsemble::<f64>::new(64, 8, sigma, 3).unwrap();
        let input = [1e3, -2e3, 5e2, 7.5e3, -1e3, 4e3, 2.5e3, -6e3];
        let out = features(&ensemble, &input);
        let scale = ((out.len() / 2) as f64).sqrt();
        for pair in out.chunks_exact(2) {
            let (c, s) = (pair[0] * scale, pair[1] * scale);
            assert!((-1.0..=1.0).contains(&c) && (-1.0..=1.0).contains(&s), "sigma = {sigma}");
            assert!((c * c + s * s - 1.0).abs() < 1e-12, "sigma = {sigma}");
        }
    }
    let ensemble = KernelEnsemble::<f32>::with_finalizer(64, 8, 1e-6, 3, GaussianFinalizer::new(true))
        .unwrap();
    let mut out = Vec::new();
    ensemble.apply(&mut out, &[1e2_f32; 8]).unwrap();
    let scale = ((out.len() / 2) as f32).sqrt();
    for pair in out.chunks_exact(2) {
        let (c, s) = (pair[0] * scale, pair[1] * scale);
        assert!((c * c + s * s - 1.0).abs() < 1e-4, "({c}, {s})");
    }
}
