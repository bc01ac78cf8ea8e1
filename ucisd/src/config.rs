//! Configuration management for UCISD calculations
//!
//! Solver parameters are read from YAML. Every field is optional; missing
//! values are filled in by `with_defaults`.

use crate::davidson_impl::DavidsonParams;
use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// CISD solver parameters
    #[serde(default)]
    pub cisd: CisdParams,
}

/// CISD solver parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CisdParams {
    /// Maximum number of Davidson iterations
    #[serde(default)]
    pub max_cycle: Option<usize>,

    /// Energy convergence threshold in Hartree
    #[serde(default)]
    pub conv_tol: Option<f64>,

    /// Davidson subspace size before a restart
    #[serde(default)]
    pub max_space: Option<usize>,

    /// Linear dependence threshold for new trial vectors
    #[serde(default)]
    pub lindep: Option<f64>,

    /// Shift applied to the preconditioner denominator
    #[serde(default)]
    pub level_shift: Option<f64>,

    /// Number of roots
    #[serde(default)]
    pub nroots: Option<usize>,

    /// Memory ceiling in MB for the blocked contractions
    #[serde(default)]
    pub max_memory: Option<f64>,
}

impl Default for CisdParams {
    fn default() -> Self {
        CisdParams {
            max_cycle: Some(50),
            conv_tol: Some(1e-9),
            max_space: Some(12),
            lindep: Some(1e-14),
            level_shift: Some(0.0),
            nroots: Some(1),
            max_memory: Some(4000.0),
        }
    }
}

impl CisdParams {
    /// Apply default values to any missing fields
    pub fn with_defaults(mut self) -> Self {
        let defaults = CisdParams::default();
        if self.max_cycle.is_none() {
            self.max_cycle = defaults.max_cycle;
        }
        if self.conv_tol.is_none() {
            self.conv_tol = defaults.conv_tol;
        }
        if self.max_space.is_none() {
            self.max_space = defaults.max_space;
        }
        if self.lindep.is_none() {
            self.lindep = defaults.lindep;
        }
        if self.level_shift.is_none() {
            self.level_shift = defaults.level_shift;
        }
        if self.nroots.is_none() {
            self.nroots = defaults.nroots;
        }
        if self.max_memory.is_none() {
            self.max_memory = defaults.max_memory;
        }
        self
    }

    pub fn level_shift(&self) -> f64 {
        self.level_shift.unwrap_or(0.0)
    }

    pub fn max_memory(&self) -> f64 {
        self.max_memory.unwrap_or(4000.0)
    }

    /// Davidson controls, with defaults for anything unset
    pub fn davidson(&self) -> DavidsonParams {
        let params = self.clone().with_defaults();
        let defaults = DavidsonParams::default();
        DavidsonParams {
            conv_tol: params.conv_tol.unwrap_or(defaults.conv_tol),
            max_cycle: params.max_cycle.unwrap_or(defaults.max_cycle),
            max_space: params.max_space.unwrap_or(defaults.max_space),
            lindep: params.lindep.unwrap_or(defaults.lindep),
            nroots: params.nroots.unwrap_or(defaults.nroots),
        }
    }
}

impl Config {
    /// Apply default values to any missing configuration fields
    pub fn with_defaults(mut self) -> Self {
        self.cisd = self.cisd.with_defaults();
        self
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config = serde_yml::from_str::<Config>(content)
            .wrap_err("Failed to parse configuration file")?
            .with_defaults();
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Unable to read configuration file: {}", path.display()))?;
        Self::from_yaml_str(&content)
    }
}
