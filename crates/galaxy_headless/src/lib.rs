//! Headless galaxy runner for economy statistics and CI verification.
//!
//! Galaxies run here without a player or any interface. This enables:
//!
//! - **Batch statistics**: many seeds in parallel, summarized as JSON
//! - **Config tuning**: load a RON config and see how prices and fights move
//! - **Determinism checks**: replay one seed and compare final hashes
//!
//! # Example
//!
//! ```bash
//! cargo run -p galaxy_headless -- --config my_galaxy.ron batch --count 50
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod config_loader;
pub mod error;
pub mod metrics;
pub mod runner;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, DeterminismCheck};
pub use config_loader::{default_config_path, load_config, load_or_default};
pub use error::{HeadlessError, Result};
pub use metrics::{BatchSummary, MetricsCollector, RunMetrics};
pub use runner::run_galaxy;
