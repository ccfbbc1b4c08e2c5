//! Run metrics collection for economy and combat analysis.
//!
//! A [`MetricsCollector`] watches the [`TickReport`]s of one galaxy run and
//! turns the final galaxy into a [`RunMetrics`] record. Many records fold
//! into a [`BatchSummary`].

use std::collections::BTreeMap;

use galaxy_core::combat::BattleOutcome;
use galaxy_core::commodity::Commodity;
use galaxy_core::entity::Role;
use galaxy_core::simulation::{Galaxy, TickReport};
use serde::{Deserialize, Serialize};

/// Complete metrics for a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Seed the galaxy was generated from.
    pub seed: u64,
    /// Ticks simulated.
    pub ticks: u64,
    /// Planet count.
    pub planets: u32,
    /// Entity count.
    pub entities: usize,
    /// Battles fought.
    pub battles: u32,
    /// Battles ending in a destroyed ship.
    pub kills: u32,
    /// Battles ending in an escape.
    pub flights: u32,
    /// Battles nobody could finish.
    pub stalemates: u32,
    /// NPCs brought back by maintenance passes.
    pub respawns: u32,
    /// Maintenance passes run.
    pub big_ticks: u32,
    /// Most entities flagged at once.
    pub peak_criminals: usize,
    /// Credits held by every NPC at the end.
    pub npc_credits: u64,
    /// Credits at the end, per role.
    pub credits_by_role: BTreeMap<Role, u64>,
    /// Mean price across planets at the end, per commodity.
    pub average_prices: BTreeMap<Commodity, f64>,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

/// Accumulates tick reports for one run.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    metrics: RunMetrics,
}

impl MetricsCollector {
    /// Start collecting for a galaxy built from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            metrics: RunMetrics {
                seed,
                ..RunMetrics::default()
            },
        }
    }

    /// Record one tick.
    pub fn record_tick(&mut self, report: &TickReport, criminals: usize) {
        let metrics = &mut self.metrics;
        metrics.ticks = report.tick;
        if report.big_tick {
            metrics.big_ticks += 1;
        }
        metrics.respawns += count(report.respawned.len());
        for battle in &report.battles {
            metrics.battles += 1;
            if battle.is_kill() {
                metrics.kills += 1;
            } else if battle.is_flight() {
                metrics.flights += 1;
            } else if battle.outcome == BattleOutcome::Stalemate {
                metrics.stalemates += 1;
            }
        }
        metrics.peak_criminals = metrics.peak_criminals.max(criminals);
    }

    /// Close the run, snapshotting the final galaxy.
    #[must_use]
    pub fn finish(mut self, galaxy: &Galaxy) -> RunMetrics {
        let metrics = &mut self.metrics;
        metrics.planets = galaxy.world().planet_count();
        metrics.entities = galaxy.entities().len();
        metrics.final_state_hash = galaxy.state_hash();

        for entity in galaxy.entities().iter() {
            let credits = u64::from(entity.ledger().credits());
            *metrics.credits_by_role.entry(entity.role()).or_default() += credits;
            if entity.role() != Role::Player {
                metrics.npc_credits += credits;
            }
        }

        let planets = galaxy.world().planets();
        if !planets.is_empty() {
            for commodity in Commodity::ALL {
                let total: u64 = planets
                    .iter()
                    .map(|planet| u64::from(planet.market().price(commodity)))
                    .sum();
                metrics
                    .average_prices
                    .insert(commodity, total as f64 / planets.len() as f64);
            }
        }
        self.metrics
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Aggregate over many runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Runs summarized.
    pub total_runs: u32,
    /// Average battles per run.
    pub avg_battles: f64,
    /// Average kills per run.
    pub avg_kills: f64,
    /// Average flights per run.
    pub avg_flights: f64,
    /// Average respawns per run.
    pub avg_respawns: f64,
    /// Average final NPC credits.
    pub avg_npc_credits: f64,
    /// Poorest run's final NPC credits.
    pub min_npc_credits: u64,
    /// Richest run's final NPC credits.
    pub max_npc_credits: u64,
    /// Mean of each run's average price, per commodity.
    pub avg_prices: BTreeMap<Commodity, f64>,
    /// Distinct final hashes seen.
    pub distinct_hashes: usize,
}

impl BatchSummary {
    /// Calculate a summary from a list of run metrics.
    #[must_use]
    pub fn from_runs(runs: &[RunMetrics]) -> Self {
        if runs.is_empty() {
            return Self::default();
        }
        let n = runs.len() as f64;
        let mean = |f: fn(&RunMetrics) -> f64| runs.iter().map(f).sum::<f64>() / n;

        let mut avg_prices = BTreeMap::new();
        for commodity in Commodity::ALL {
            let total: f64 = runs
                .iter()
                .filter_map(|run| run.average_prices.get(&commodity))
                .sum();
            avg_prices.insert(commodity, total / n);
        }

        let mut hashes: Vec<u64> = runs.iter().map(|run| run.final_state_hash).collect();
        hashes.sort_unstable();
        hashes.dedup();

        Self {
            total_runs: count(runs.len()),
            avg_battles: mean(|run| f64::from(run.battles)),
            avg_kills: mean(|run| f64::from(run.kills)),
            avg_flights: mean(|run| f64::from(run.flights)),
            avg_respawns: mean(|run| f64::from(run.respawns)),
            avg_npc_credits: mean(|run| run.npc_credits as f64),
            min_npc_credits: runs.iter().map(|run| run.npc_credits).min().unwrap_or(0),
            max_npc_credits: runs.iter().map(|run| run.npc_credits).max().unwrap_or(0),
            avg_prices,
            distinct_hashes: hashes.len(),
        }
    }
}
