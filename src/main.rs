// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! QuStop command-line interface
//!
//! Solves distinguishability and exclusion SDPs for ensembles stored in
//! YAML or JSON files.
//!
//! # Usage
//!
//! ```bash
//! # PPT min-error distinguishability
//! qustop dist bell.yaml --class ppt --criterion min-error
//!
//! # Separable relaxation at level 3, value only, JSON output
//! qustop dist ydy.yaml --class separable --level 3 --dual --json
//!
//! # Unambiguous exclusion
//! qustop exclude trine.yaml --class positive --criterion unambiguous
//!
//! # Cloning over two independent rounds
//! qustop clone wiesner.yaml --reps 2
//!
//! # Show effective configuration
//! qustop config --config qustop.yaml
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ndarray::Array2;
use num_complex::Complex64;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qustop::{
    config::Config, load_ensemble, Criterion, MeasurementClass, OptClone, OptDist, OptExclude,
    Result, VERSION,
};

/// Optimal quantum state distinguishability and exclusion
#[derive(Parser)]
#[command(name = "qustop")]
#[command(author = "QuStop Contributors")]
#[command(version = VERSION)]
#[command(about = "Optimal state distinguishability under positive, PPT and separable measurements")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "QUSTOP_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimal probability of identifying the prepared state
    Dist {
        /// Ensemble file (YAML, or JSON by extension)
        ensemble: PathBuf,

        /// Measurement class (positive, ppt, separable)
        #[arg(long, default_value = "positive")]
        class: MeasurementClass,

        /// Criterion (min-error, unambiguous)
        #[arg(long, default_value = "min-error")]
        criterion: Criterion,

        /// Symmetric-extension level for separable measurements
        #[arg(long)]
        level: Option<usize>,

        /// Solve the dual problem for the value only
        #[arg(long)]
        dual: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Optimal probability of wrongly or inconclusively excluding a state
    Exclude {
        /// Ensemble file (YAML, or JSON by extension)
        ensemble: PathBuf,

        /// Measurement class (positive, ppt)
        #[arg(long, default_value = "positive")]
        class: MeasurementClass,

        /// Criterion (min-error, unambiguous)
        #[arg(long, default_value = "min-error")]
        criterion: Criterion,

        /// Solve the dual problem for the value only
        #[arg(long)]
        dual: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Optimal probability of producing two copies that both pass verification
    #[command(name = "clone")]
    Cloning {
        /// Ensemble file (YAML, or JSON by extension)
        ensemble: PathBuf,

        /// Number of independent repetitions
        #[arg(long, default_value_t = 1)]
        reps: usize,

        /// Solve the dual problem for the value only
        #[arg(long)]
        dual: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file and, optionally, an ensemble file
    Validate {
        /// Ensemble file to check
        ensemble: Option<PathBuf>,
    },
}

/// Result printed by `dist`, `exclude` and `clone`.
#[derive(Serialize)]
struct Report {
    task: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    class: Option<MeasurementClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    criterion: Option<Criterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reps: Option<usize>,
    value: f64,
    /// Each element as rows of `[re, im]` pairs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    measurements: Vec<Vec<Vec<[f64; 2]>>>,
}

impl Report {
    fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }
        let mut tags: Vec<String> = Vec::new();
        if let Some(class) = self.class {
            tags.push(class.to_string());
        }
        if let Some(criterion) = self.criterion {
            tags.push(criterion.to_string());
        }
        if let Some(level) = self.level {
            tags.push(format!("level {}", level));
        }
        if let Some(reps) = self.reps {
            tags.push(format!("{} reps", reps));
        }
        println!("{} [{}]: {:.8}", self.task, tags.join(", "), self.value);
        for (i, m) in self.measurements.iter().enumerate() {
            println!("M_{}:", i);
            for row in m {
                let cells: Vec<String> = row
                    .iter()
                    .map(|[re, im]| format!("{:>9.5}{:+.5}i", re, im))
                    .collect();
                println!("  {}", cells.join("  "));
            }
        }
        Ok(())
    }
}

fn to_rows(m: &Array2<Complex64>) -> Vec<Vec<[f64; 2]>> {
    m.rows()
        .into_iter()
        .map(|row| row.iter().map(|z| [z.re, z.im]).collect())
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;

    // Initialize logging
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    init_logging(level, &config.logging.format);

    match cli.command {
        Commands::Dist {
            ensemble,
            class,
            criterion,
            level,
            dual,
            json,
        } => {
            if let Some(level) = level {
                config.solver.hierarchy_level = level;
            }
            if dual {
                config.solver.return_measurements = false;
            }

            let ensemble = load(&ensemble)?;
            let mut task = OptDist::new(&ensemble, class, criterion, config.solver.clone())?;
            let value = task.solve()?;

            Report {
                task: "dist",
                class: Some(class),
                criterion: Some(criterion),
                level: (class == MeasurementClass::Separable)
                    .then_some(config.solver.hierarchy_level),
                reps: None,
                value,
                measurements: task.measurements().iter().map(to_rows).collect(),
            }
            .print(json)?;
        }

        Commands::Exclude {
            ensemble,
            class,
            criterion,
            dual,
            json,
        } => {
            if dual {
                config.solver.return_measurements = false;
            }

            let ensemble = load(&ensemble)?;
            let mut task = OptExclude::new(&ensemble, class, criterion, config.solver.clone())?;
            let value = task.solve()?;

            Report {
                task: "exclude",
                class: Some(class),
                criterion: Some(criterion),
                level: None,
                reps: None,
                value,
                measurements: task.measurements().iter().map(to_rows).collect(),
            }
            .print(json)?;
        }

        Commands::Cloning {
            ensemble,
            reps,
            dual,
            json,
        } => {
            if dual {
                config.solver.return_measurements = false;
            }

            let ensemble = load(&ensemble)?;
            let mut task = OptClone::new(&ensemble, reps, config.solver.clone())?;
            let value = task.solve()?;

            Report {
                task: "clone",
                class: None,
                criterion: None,
                level: None,
                reps: Some(reps),
                value,
                measurements: task.strategy().map(to_rows).into_iter().collect(),
            }
            .print(json)?;
        }

        Commands::Config => {
            // Show effective configuration
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate { ensemble } => {
            if let Err(e) = config.validate() {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
            println!("Configuration is valid");

            if let Some(path) = ensemble {
                match load_ensemble(&path) {
                    Ok(ensemble) => println!("{}", ensemble),
                    Err(e) => {
                        eprintln!("{}: {}", path.display(), e);
                        std::process::exit(1);
                    }
                }
            }
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<qustop::Ensemble> {
    let ensemble = load_ensemble(path)?;
    info!(
        path = %path.display(),
        states = ensemble.len(),
        dims = ?ensemble.dims(),
        "Loaded ensemble"
    );
    Ok(ensemble)
}

/// Initialize logging with tracing.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        "pretty" => registry.with(fmt::layer().pretty().with_writer(std::io::stderr)).init(),
        "compact" => registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init(),
        _ => registry.with(fmt::layer().with_target(true).with_writer(std::io::stderr)).init(),
    }
}
