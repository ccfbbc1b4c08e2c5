//! Single headless galaxy runs.
//!
//! Headless galaxies never carry a player: every ship is an NPC, so a run
//! always lasts the full tick count.

use galaxy_core::config::GalaxyConfig;
use galaxy_core::simulation::Galaxy;
use tracing::{debug, info};

use crate::error::Result;
use crate::metrics::{MetricsCollector, RunMetrics};

/// Generate an NPC-only galaxy from `seed` and simulate `ticks` ticks.
pub fn run_galaxy(config: &GalaxyConfig, seed: u64, ticks: u64) -> Result<RunMetrics> {
    let mut galaxy = Galaxy::generate(config.clone().with_player(false), seed)?;
    let mut collector = MetricsCollector::new(seed);

    for _ in 0..ticks {
        let report = galaxy.tick()?;
        if report.big_tick {
            debug!(
                seed,
                tick = report.tick,
                respawned = report.respawned.len(),
                "Big tick"
            );
        }
        collector.record_tick(&report, galaxy.criminals().len());
    }

    let metrics = collector.finish(&galaxy);
    info!(
        seed,
        ticks,
        battles = metrics.battles,
        kills = metrics.kills,
        hash = metrics.final_state_hash,
        "Run complete"
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GalaxyConfig {
        GalaxyConfig::default().with_planet_count(8)
    }

    #[test]
    fn test_run_covers_every_tick() {
        let metrics = run_galaxy(&small(), 3, 50).expect("run");
        assert_eq!(metrics.seed, 3);
        assert_eq!(metrics.ticks, 50);
        assert_eq!(metrics.big_ticks, 3);
        assert_eq!(metrics.planets, 8);
        assert!(metrics.kills + metrics.flights + metrics.stalemates <= metrics.battles);
    }

    #[test]
    fn test_run_never_has_player() {
        let metrics = run_galaxy(&small().with_player(true), 4, 10).expect("run");
        assert!(!metrics
            .credits_by_role
            .contains_key(&galaxy_core::entity::Role::Player));
    }

    #[test]
    fn test_same_seed_same_metrics() {
        let a = run_galaxy(&small(), 11, 40).expect("run");
        let b = run_galaxy(&small(), 11, 40).expect("run");
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_ticks() {
        let metrics = run_galaxy(&small(), 1, 0).expect("run");
        assert_eq!(metrics.ticks, 0);
        assert_eq!(metrics.battles, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GalaxyConfig::default().with_planet_count(1);
        assert!(run_galaxy(&config, 1, 5).is_err());
    }
}
