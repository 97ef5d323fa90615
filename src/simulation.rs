/// Monte Carlo driver for the percolation model
///
/// A single run opens sites in a uniformly random order until the grid
/// percolates. A threshold estimate repeats that over independent trials and
/// summarises the fraction of open sites at the moment of percolation.
use anyhow::{ensure, Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::percolation::Percolation;

/// z-score of a two-sided 95% confidence interval
const CONFIDENCE_95: f64 = 1.96;

/// Settings for a simulation, filled from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Grid dimension
    pub size: usize,
    /// Number of independent runs
    pub trials: usize,
    /// Seed for reproducible runs; trial `i` uses `seed + i`
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            size: 100,
            trials: 1,
            seed: None,
        }
    }
}

impl SimulationConfig {
    fn rng_for_trial(&self, trial: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(trial as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

/// Result of opening sites until a grid percolates
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub model: Percolation,
    pub open_sites: usize,
    /// `open_sites / (n * n)`
    pub threshold: f64,
}

/// Open sites of an `n`-by-`n` grid in random order until it percolates
pub fn run_until_percolation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<RunOutcome> {
    let mut model =
        Percolation::new(n).with_context(|| format!("Failed to create a {n}x{n} grid"))?;

    let mut order: Vec<(usize, usize)> = (1..=n)
        .flat_map(|row| (1..=n).map(move |col| (row, col)))
        .collect();
    order.shuffle(rng);

    for (row, col) in order {
        model.open(row, col)?;
        if model.percolates() {
            break;
        }
    }
    // A fully open grid always percolates
    ensure!(model.percolates(), "Grid did not percolate with every site open");

    let open_sites = model.number_of_open_sites();
    Ok(RunOutcome {
        threshold: open_sites as f64 / (n * n) as f64,
        open_sites,
        model,
    })
}

/// Summary of the percolation threshold over many trials
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdEstimate {
    pub size: usize,
    pub trials: usize,
    pub mean: f64,
    /// Sample standard deviation; NaN for a single trial
    pub stddev: f64,
    pub confidence_low: f64,
    pub confidence_high: f64,
}

impl ThresholdEstimate {
    /// Summarise per-trial thresholds
    pub fn from_thresholds(size: usize, thresholds: &[f64]) -> Result<Self> {
        ensure!(!thresholds.is_empty(), "At least one trial is required");

        let trials = thresholds.len();
        let t = trials as f64;
        let mean = thresholds.iter().sum::<f64>() / t;
        let stddev = if trials > 1 {
            let variance = thresholds.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (t - 1.0);
            variance.sqrt()
        } else {
            f64::NAN
        };
        let margin = CONFIDENCE_95 * stddev / t.sqrt();

        Ok(ThresholdEstimate {
            size,
            trials,
            mean,
            stddev,
            confidence_low: mean - margin,
            confidence_high: mean + margin,
        })
    }
}

/// Run `config.trials` independent simulations in parallel and summarise them.
///
/// Each trial owns its own grid; with a seed the result is the same regardless
/// of how rayon schedules the trials.
pub fn estimate_threshold(config: &SimulationConfig) -> Result<ThresholdEstimate> {
    ensure!(config.trials > 0, "At least one trial is required");

    let thresholds = (0..config.trials)
        .into_par_iter()
        .map(|trial| {
            let mut rng = config.rng_for_trial(trial);
            let outcome = run_until_percolation(config.size, &mut rng)
                .with_context(|| format!("Trial {trial} failed"))?;
            debug!(
                "Trial {trial}: percolated after {} sites (threshold {:.4})",
                outcome.open_sites, outcome.threshold
            );
            Ok(outcome.threshold)
        })
        .collect::<Result<Vec<f64>>>()?;

    let estimate = ThresholdEstimate::from_thresholds(config.size, &thresholds)?;
    info!(
        "{} trials on {n}x{n}: mean threshold {:.6}",
        estimate.trials,
        estimate.mean,
        n = estimate.size
    );
    Ok(estimate)
}

/// Single run using the configured seed
pub fn run_single(config: &SimulationConfig) -> Result<RunOutcome> {
    let mut rng = config.rng_for_trial(0);
    run_until_percolation(config.size, &mut rng)
}
