// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. qustop.yaml file
//! 3. Environment variables (QUSTOP_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SDP solver options
    #[serde(default)]
    pub solver: SolverConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &["qustop.yaml", "qustop.yml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QUSTOP_SOLVER") {
            match val.parse() {
                Ok(id) => self.solver.solver = id,
                Err(_) => tracing::warn!(value = %val, "Ignoring unknown QUSTOP_SOLVER"),
            }
        }
        if let Ok(val) = env::var("QUSTOP_VERBOSE") {
            self.solver.verbose = parse_flag(&val);
        }
        if let Ok(val) = env::var("QUSTOP_TOLERANCE") {
            if let Ok(tol) = val.parse() {
                self.solver.tolerance = tol;
            }
        }
        if let Ok(val) = env::var("QUSTOP_LEVEL") {
            if let Ok(level) = val.parse() {
                self.solver.hierarchy_level = level;
            }
        }
        if let Ok(val) = env::var("QUSTOP_RETURN_MEASUREMENTS") {
            self.solver.return_measurements = parse_flag(&val);
        }
        if let Ok(val) = env::var("QUSTOP_MAX_ITERATIONS") {
            if let Ok(iters) = val.parse() {
                self.solver.max_iterations = iters;
            }
        }
        if let Ok(val) = env::var("QUSTOP_TIME_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.solver.time_limit_sec = Some(limit);
            }
        }
        if let Ok(val) = env::var("QUSTOP_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.solver.validate()
    }
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

/// Identifier of the conic solver used for every SDP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverId {
    /// Clarabel interior-point solver
    #[default]
    Clarabel,
}

impl fmt::Display for SolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverId::Clarabel => write!(f, "clarabel"),
        }
    }
}

impl FromStr for SolverId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "clarabel" => Ok(SolverId::Clarabel),
            other => Err(Error::Config(format!("unknown solver '{}'", other))),
        }
    }
}

/// Options controlling how each SDP is formulated and solved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Conic solver backend
    #[serde(default)]
    pub solver: SolverId,

    /// Print the backend's iteration log
    #[serde(default)]
    pub verbose: bool,

    /// Convergence tolerance handed to the backend
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Symmetric-extension level for separable measurements (k >= 1)
    #[serde(default = "default_hierarchy_level")]
    pub hierarchy_level: usize,

    /// Solve the primal problem and keep the optimal measurements.
    /// When false the cheaper dual problem is solved for the value only.
    #[serde(default = "default_true")]
    pub return_measurements: bool,

    /// Iteration budget for the backend
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Wall-clock limit for the backend in seconds
    #[serde(default)]
    pub time_limit_sec: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver: SolverId::default(),
            verbose: false,
            tolerance: default_tolerance(),
            hierarchy_level: default_hierarchy_level(),
            return_measurements: true,
            max_iterations: default_max_iterations(),
            time_limit_sec: None,
        }
    }
}

impl SolverConfig {
    /// Validate option values.
    pub fn validate(&self) -> Result<()> {
        if self.hierarchy_level == 0 {
            return Err(Error::Config("hierarchy_level must be >= 1".into()));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::Config(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::Config("max_iterations cannot be 0".into()));
        }
        if let Some(limit) = self.time_limit_sec {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(Error::Config(format!(
                    "time_limit_sec must be positive, got {}",
                    limit
                )));
            }
        }
        if self.tolerance > 1e-4 {
            tracing::warn!(
                tolerance = self.tolerance,
                "Loose solver tolerance; reported probabilities may be inaccurate"
            );
        }
        Ok(())
    }

    /// Builder-style setter for the hierarchy level.
    pub fn with_level(mut self, level: usize) -> Self {
        self.hierarchy_level = level;
        self
    }

    /// Builder-style setter for primal (measurements) vs dual (value only).
    pub fn with_measurements(mut self, return_measurements: bool) -> Self {
        self.return_measurements = return_measurements;
        self
    }
}

fn default_tolerance() -> f64 {
    1e-8
}

fn default_hierarchy_level() -> usize {
    2
}

fn default_max_iterations() -> u32 {
    200
}

fn default_true() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, compact, full)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}
