//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a galaxy produces identical
//! results given an identical seed and identical player orders.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism the core has to rule out:
//!
//! - **Hash map iteration order**: the default hasher is randomized, so the
//!   core only iterates `BTreeMap`/`BTreeSet` and dense vectors.
//!
//! - **System randomness**: every draw comes from the galaxy's seeded
//!   `ChaCha8Rng`.
//!
//! - **Thread scheduling**: the parallel planet update draws one seed per
//!   planet before fanning out, so the worker pool size never matters.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual mechanics (pricing, combat, travel)
//! 2. **Property tests**: arbitrary seeds and configs must replay exactly
//! 3. **Parallel tests**: N galaxies on N threads all end on the same hash

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use galaxy_core::simulation::Galaxy;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic galaxy).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Galaxy is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one tick
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Advance a galaxy one tick.
///
/// # Panics
///
/// Panics if the tick reports a broken invariant.
pub fn step_galaxy(galaxy: &mut Galaxy) {
    if let Err(err) = galaxy.tick() {
        panic!("tick {} failed: {err}", galaxy.current_tick());
    }
}

/// Run a galaxy `runs` times from the same setup and compare final hashes.
pub fn verify_galaxy_determinism<F>(setup_fn: F, runs: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Galaxy,
{
    verify_determinism(runs, num_ticks, setup_fn, step_galaxy, Galaxy::state_hash)
}

/// Run N galaxies on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling
/// variations, such as the parallel planet update.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_galaxies<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Galaxy + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut galaxy = setup_fn();
                    for _ in 0..num_ticks {
                        step_galaxy(&mut galaxy);
                    }
                    galaxy.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("galaxy thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two runs tick by tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(tick)` if they diverge at
/// that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Galaxy,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        step_galaxy(&mut first);
        step_galaxy(&mut second);

        if first.state_hash() != second.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for galaxy testing.
pub mod strategies {
    use galaxy_core::commodity::Commodity;
    use galaxy_core::config::GalaxyConfig;
    use galaxy_core::ship::ShipClass;
    use proptest::prelude::*;

    /// Any galaxy seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// A small galaxy config: 2 to 15 planets, with or without a player.
    pub fn arb_config() -> impl Strategy<Value = GalaxyConfig> {
        (2u32..16, any::<bool>()).prop_map(|(planets, player)| {
            GalaxyConfig::default()
                .with_planet_count(planets)
                .with_player(player)
        })
    }

    /// Any commodity.
    pub fn arb_commodity() -> impl Strategy<Value = Commodity> {
        proptest::sample::select(Commodity::ALL.to_vec())
    }

    /// Any ship class.
    pub fn arb_ship_class() -> impl Strategy<Value = ShipClass> {
        proptest::sample::select(ShipClass::ALL.to_vec())
    }

    /// Trade amounts (1-50 units).
    pub fn arb_amount() -> impl Strategy<Value = u32> {
        1u32..50u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_core::config::GalaxyConfig;
    use proptest::prelude::*;

    fn galaxy(seed: u64) -> Galaxy {
        Galaxy::generate(GalaxyConfig::default().with_planet_count(10), seed)
            .expect("generate galaxy")
    }

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_unique_hashes() {
        let result = DeterminismResult {
            is_deterministic: false,
            hashes: vec![3, 1, 3],
            ticks: 1,
        };
        assert_eq!(result.unique_hashes(), vec![1, 3]);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_deterministic_panics() {
        verify_determinism(3, 1, || 0u64, |n| *n += 1, |_| rand_hash())
            .assert_deterministic();
    }

    fn rand_hash() -> u64 {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }

    #[test]
    fn test_generated_galaxy_is_deterministic() {
        verify_galaxy_determinism(|| galaxy(5), 3, 100).assert_deterministic();
    }

    #[test]
    fn test_parallel_galaxies_match() {
        run_parallel_galaxies(|| galaxy(17), 4, 60).assert_deterministic();
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(|| galaxy(23), 80), None);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = galaxy(1);
        let mut b = galaxy(2);
        for _ in 0..20 {
            step_galaxy(&mut a);
            step_galaxy(&mut b);
        }
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_compute_hash_stable() {
        assert_eq!(compute_hash(&(1u32, "a")), compute_hash(&(1u32, "a")));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_any_galaxy_replays(config in strategies::arb_config(), seed in strategies::arb_seed()) {
            let result = verify_galaxy_determinism(
                || Galaxy::generate(config.clone(), seed).expect("generate"),
                2,
                40,
            );
            prop_assert!(result.is_deterministic, "hashes {:?}", result.hashes);
        }
    }
}
