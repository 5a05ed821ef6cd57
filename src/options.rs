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
use crate::finalizer::Precision;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "Self::validate_self"))]
pub struct KernelOptions {
    #[validate(range(min = 1, max = 16_777_216))]
    pub input_size: usize,
    #[serde(default)]
    pub stacked_size: Option<usize>,
    #[serde(default = "KernelOptions::default_sigma")]
    pub sigma: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub precision: Precision,
    #[serde(default = "KernelOptions::default_threads")]
    #[validate(range(min = 1, max = 256))]
    pub threads: usize,
}

impl KernelOptions {
    pub fn new(input_size: usize) -> Self {
        Self {
            input_size,
            stacked_size: None,
            sigma: Self::default_sigma(),
            seed: 0,
            precision: Precision::default(),
            threads: Self::default_threads(),
        }
    }

    fn default_sigma() -> f64 {
        1.0
    }

    fn default_threads() -> usize {
        1
    }

    pub fn validate_self(&self) -> std::result::Result<(), ValidationError> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(ValidationError::new("sigma must be positive and finite"));
        }
        if self.stacked_size == Some(0) {
            return Err(ValidationError::new("stacked_size must be positive"));
        }
        Ok(())
    }

    pub fn padded_input_size(&self) -> usize {
        self.input_size.max(1).next_power_of_two()
    }

    pub fn stacked_size(&self) -> usize {
        self.stacked_size.unwrap_or_else(|| self.padded_input_size())
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let options: Self =
            toml::from_str(text).map_err(|e| Error::Configuration(e.to_string()))?;
        options.check()?;
        Ok(options)
    }

    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::Configuration(e.to_string()))
    }
}
