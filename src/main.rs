use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

use percolation::simulation::{estimate_threshold, run_single, SimulationConfig};

/// Largest grid side the CLI accepts
const MAX_GRID_SIZE: usize = 10_000;

/// Parse a grid side: a plain integer in `1..=MAX_GRID_SIZE`
fn parse_grid_size(s: &str) -> Result<usize, String> {
    let size: usize = s
        .parse()
        .map_err(|e| format!("Invalid grid size '{s}': {e}"))?;
    if size == 0 || size > MAX_GRID_SIZE {
        return Err(format!(
            "Grid size must be at least 1 and at most {MAX_GRID_SIZE}, got {size}"
        ));
    }
    Ok(size)
}

/// Parse a count that may have a metric suffix (k/K=1000, m/M=1e6, g/G=1e9)
fn parse_metric_number(s: &str) -> Result<usize, String> {
    if s.is_empty() {
        return Err("Empty string".to_string());
    }

    let (num_part, suffix) = match s.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => (&s[..s.len() - c.len_utf8()], Some(c)),
        _ => (s, None),
    };

    let base: f64 = num_part
        .parse()
        .map_err(|e| format!("Invalid number: {e}"))?;

    let multiplier = match suffix {
        Some('k') | Some('K') => 1000.0,
        Some('m') | Some('M') => 1_000_000.0,
        Some('g') | Some('G') => 1_000_000_000.0,
        Some(c) => {
            return Err(format!(
                "Unknown suffix '{c}'. Use k/K (1000), m/M (1e6), or g/G (1e9)"
            ))
        }
        None => 1.0,
    };

    let result = base * multiplier;

    if result < 0.0 || result.fract() != 0.0 {
        return Err(format!("Value {result} is not a whole count"));
    }
    if result > usize::MAX as f64 {
        return Err(format!("Value {result} too large"));
    }

    Ok(result as usize)
}

/// percolation - Monte Carlo percolation on an n-by-n grid
///
/// Opens random sites until an open path joins the top row to the bottom row.
/// With one trial the final grid is printed; with several, the percolation
/// threshold is estimated.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Grid dimension
    #[clap(short = 'n', long = "size", default_value = "100", value_parser = parse_grid_size)]
    size: usize,

    /// Number of independent trials; more than one estimates the threshold
    #[clap(short = 't', long = "trials", default_value = "1", value_parser = parse_metric_number)]
    trials: usize,

    /// Seed for reproducible runs
    #[clap(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Write the final grid, or the threshold estimate, to this file (stdout if not specified)
    #[clap(short = 'o', long = "output")]
    output: Option<String>,

    /// Draw the final grid with symbols (# blocked, . open, ~ full) instead of codes
    #[clap(long = "render")]
    render: bool,

    /// Quiet mode (warnings and errors only)
    #[clap(long = "quiet")]
    quiet: bool,

    /// Number of threads for parallel trials
    #[clap(long = "threads", default_value = "8")]
    threads: usize,
}

impl Args {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            size: self.size,
            trials: self.trials,
            seed: self.seed,
        }
    }
}

fn write_output(path: Option<&str>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write output to {path}"))
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(text.as_bytes())?;
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    anyhow::ensure!(args.trials > 0, "At least one trial is required");

    // Set up rayon thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()?;

    let config = args.config();

    if config.trials > 1 {
        let estimate = estimate_threshold(&config)?;
        let text = format!(
            "mean                    = {:.6}\nstddev                  = {:.6}\n95% confidence interval = [{:.6}, {:.6}]\n",
            estimate.mean, estimate.stddev, estimate.confidence_low, estimate.confidence_high
        );
        return write_output(args.output.as_deref(), &text);
    }

    let outcome = run_single(&config)?;
    if !args.quiet {
        eprintln!(
            "The system percolated after {} of {} sites were opened (threshold {:.4})",
            outcome.open_sites,
            config.size * config.size,
            outcome.threshold
        );
    }

    let snapshot = outcome.model.snapshot();
    let grid = if args.render {
        snapshot.render()
    } else {
        snapshot.to_string()
    };
    write_output(args.output.as_deref(), &grid)
}
