//! Batch galaxy runner for economy statistics.
//!
//! Runs many seeds in parallel using rayon and folds their metrics into a
//! [`BatchSummary`].

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use galaxy_core::config::GalaxyConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{HeadlessError, Result};
use crate::metrics::{BatchSummary, RunMetrics};
use crate::runner::run_galaxy;

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of galaxies to run
    pub run_count: u32,
    /// Seed of the first run; run `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Ticks per run
    pub ticks: u64,
    /// Worker threads (0 = use rayon default)
    pub threads: usize,
    /// Galaxy parameters shared by every run
    pub galaxy: GalaxyConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            run_count: 100,
            seed_start: 0,
            ticks: 1000,
            threads: 0,
            galaxy: GalaxyConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Create config for `run_count` runs of `ticks` ticks.
    #[must_use]
    pub fn new(run_count: u32, ticks: u64) -> Self {
        Self {
            run_count,
            ticks,
            ..Default::default()
        }
    }

    /// Set seed start
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set worker thread count
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set galaxy parameters
    #[must_use]
    pub fn with_galaxy(mut self, galaxy: GalaxyConfig) -> Self {
        self.galaxy = galaxy;
        self
    }

    fn seed(&self, index: u32) -> u64 {
        self.seed_start.wrapping_add(u64::from(index))
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual run metrics, in seed order
    pub runs: Vec<RunMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| HeadlessError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| HeadlessError::io(path, e))
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| HeadlessError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// A run that stopped on an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Run index
    pub run_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Progress tracking for batch runs
#[derive(Debug)]
pub struct BatchProgress {
    total: u32,
    completed: AtomicU32,
    start_time: Instant,
}

impl BatchProgress {
    /// Create new progress tracker
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a finished run, returning the new completion count.
    pub fn record_completion(&self) -> u32 {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get current completion count
    #[must_use]
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get completion percentage
    #[must_use]
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Get estimated time remaining
    #[must_use]
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::ZERO;
        }
        let per_run = self.start_time.elapsed().as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_run * f64::from(remaining))
    }
}

/// Run a batch of galaxies.
///
/// Failed runs are collected as [`BatchError`]s rather than aborting the
/// batch; only a thread pool failure is returned as an error.
pub fn run_batch(config: BatchConfig) -> Result<BatchResults> {
    let start = Instant::now();
    let progress = BatchProgress::new(config.run_count);

    info!(
        runs = config.run_count,
        ticks = config.ticks,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let results: Vec<std::result::Result<RunMetrics, BatchError>> = pool.install(|| {
        (0..config.run_count)
            .into_par_iter()
            .map(|index| {
                let seed = config.seed(index);
                match run_galaxy(&config.galaxy, seed, config.ticks) {
                    Ok(metrics) => {
                        let completed = progress.record_completion();
                        if completed % 10 == 0 {
                            debug!(
                                completed,
                                total = config.run_count,
                                percent = progress.percentage(),
                                eta_secs = progress.eta().as_secs(),
                                "Batch progress"
                            );
                        }
                        Ok(metrics)
                    }
                    Err(e) => {
                        warn!(index, seed, error = %e, "Run failed");
                        Err(BatchError {
                            run_index: index,
                            seed,
                            message: e.to_string(),
                        })
                    }
                }
            })
            .collect()
    });

    let (runs, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(std::result::Result::is_ok);
    let runs: Vec<RunMetrics> = runs.into_iter().filter_map(std::result::Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(std::result::Result::err).collect();

    let summary = BatchSummary::from_runs(&runs);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        runs = runs.len(),
        errors = errors.len(),
        duration_seconds,
        "Batch complete"
    );

    Ok(BatchResults {
        config,
        runs,
        summary,
        duration_seconds,
        errors,
    })
}

/// Outcome of replaying one seed several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterminismCheck {
    /// Seed replayed
    pub seed: u64,
    /// Final hash of each run
    pub hashes: Vec<u64>,
}

impl DeterminismCheck {
    /// Whether every run ended on the same hash.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Verify determinism by running the same seed `runs` times.
pub fn verify_determinism(
    config: &GalaxyConfig,
    seed: u64,
    ticks: u64,
    runs: u32,
) -> Result<DeterminismCheck> {
    let hashes = (0..runs)
        .map(|_| run_galaxy(config, seed, ticks).map(|metrics| metrics.final_state_hash))
        .collect::<Result<Vec<_>>>()?;
    Ok(DeterminismCheck { seed, hashes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(runs: u32) -> BatchConfig {
        BatchConfig::new(runs, 30)
            .with_galaxy(GalaxyConfig::default().with_planet_count(6))
            .with_threads(2)
    }

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.run_count, 100);
        assert_eq!(config.threads, 0);
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(500, 20).with_seed(12345).with_threads(3);
        assert_eq!(config.run_count, 500);
        assert_eq!(config.ticks, 20);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.seed(2), 12347);
        assert_eq!(config.with_seed(u64::MAX).seed(1), 0);
    }

    #[test]
    fn test_progress_tracking() {
        let progress = BatchProgress::new(4);
        assert_eq!(progress.current(), 0);
        assert_eq!(progress.eta(), Duration::ZERO);

        assert_eq!(progress.record_completion(), 1);
        assert_eq!(progress.record_completion(), 2);
        assert_eq!(progress.current(), 2);
        assert!((progress.percentage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(small(6)).expect("batch");
        assert_eq!(results.runs.len(), 6);
        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_runs, 6);

        let seeds: Vec<u64> = results.runs.iter().map(|run| run.seed).collect();
        assert_eq!(seeds, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_batch_independent_of_threads() {
        let one = run_batch(small(4).with_threads(1)).expect("batch");
        let four = run_batch(small(4).with_threads(4)).expect("batch");
        assert_eq!(one.runs, four.runs);
    }

    #[test]
    fn test_failed_runs_are_collected() {
        let config = small(3).with_galaxy(GalaxyConfig::default().with_planet_count(1));
        let results = run_batch(config).expect("batch");
        assert!(results.runs.is_empty());
        assert_eq!(results.errors.len(), 3);
        assert_eq!(results.summary, BatchSummary::default());
    }

    #[test]
    fn test_verify_determinism() {
        let config = GalaxyConfig::default().with_planet_count(6);
        let check = verify_determinism(&config, 12345, 40, 3).expect("verify");
        assert_eq!(check.hashes.len(), 3);
        assert!(check.is_deterministic());
    }

    #[test]
    fn test_determinism_check_detects_mismatch() {
        let check = DeterminismCheck {
            seed: 1,
            hashes: vec![4, 4, 5],
        };
        assert!(!check.is_deterministic());
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(small(3)).expect("batch");

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("results.json");

        results.save(&path).expect("save");
        assert!(path.exists());

        let loaded = BatchResults::load(&path).expect("load");
        assert_eq!(loaded.runs.len(), 3);
        assert_eq!(loaded.config, results.config);
        assert_eq!(loaded.summary.distinct_hashes, results.summary.distinct_hashes);
    }
}
