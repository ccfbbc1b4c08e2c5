//! Whole-galaxy scenarios driven tick by tick.
//!
//! These tests build small hand-made galaxies with the fixtures from
//! `galaxy_test_utils` and check what agents do to each other over a few
//! ticks, plus long randomized runs that must never break an invariant.

use std::collections::BTreeSet;

use galaxy_core::combat::BattleOutcome;
use galaxy_core::commodity::Commodity;
use galaxy_core::config::GalaxyConfig;
use galaxy_core::entity::{Brain, Entity, Role};
use galaxy_core::simulation::{Galaxy, TickReport};
use galaxy_core::ship::ShipClass;
use galaxy_core::travel::TravelState;
use galaxy_test_utils::determinism::{step_galaxy, strategies};
use galaxy_test_utils::fixtures::{line_world, ship, two_planet_world, CastBuilder};
use galaxy_test_utils::proptest::prelude::*;

fn in_flight(id: u32, brain: Brain, class: ShipClass, credits: u32) -> Entity {
    Entity::new(
        id,
        brain,
        ship(class),
        credits,
        TravelState::Traveling {
            from: 0,
            to: 1,
            remaining: 4,
        },
    )
}

fn assert_engagements_disjoint(report: &TickReport) {
    let mut seen = BTreeSet::new();
    for (attacker, victim) in &report.engagements {
        assert!(seen.insert(*attacker), "{attacker} fights twice");
        assert!(seen.insert(*victim), "{victim} fights twice");
    }
    for battle in &report.battles {
        assert!(report
            .engagements
            .contains(&(battle.attacker, battle.defender)));
    }
}

// =============================================================================
// Agent encounters
// =============================================================================

/// Trader 0 and pirate 1 share a lane, police 2 waits on planet 0.
fn ambush_galaxy() -> Galaxy {
    let config = GalaxyConfig::default();
    let world = two_planet_world(&config, 4);
    CastBuilder::new(config)
        .entity(|id| in_flight(id, Brain::trader(), ShipClass::Firefly, 1500))
        .entity(|id| in_flight(id, Brain::Pirate, ShipClass::Mosquito, 300))
        .npc(Role::Police, 0)
        .build(world, 8)
}

#[test]
fn test_pirate_ambushes_trader_on_lane() {
    let mut galaxy = ambush_galaxy();
    let report = galaxy.tick().expect("tick");

    assert_eq!(report.engagements, vec![(1, 0)]);
    assert_eq!(report.battles.len(), 1);
    let battle = report.battles[0];
    assert!(
        matches!(
            battle.outcome,
            BattleOutcome::AttackerWon | BattleOutcome::DefenderFled
        ),
        "unexpected {battle:?}"
    );
    assert!(galaxy.criminals().is_criminal(1));

    let pirate = galaxy.entities().get(1).expect("pirate");
    let trader = galaxy.entities().get(0).expect("trader");
    if battle.outcome == BattleOutcome::AttackerWon {
        assert!(!trader.is_alive());
        assert_eq!(pirate.ledger().credits(), 1800);
        assert_eq!(trader.ledger().credits(), 0);
    } else {
        assert!(trader.is_alive());
        assert_eq!(pirate.ledger().credits(), 300);
    }
    galaxy.check_invariants().expect("invariants");
}

#[test]
fn test_police_hunt_flagged_pirate() {
    let mut galaxy = ambush_galaxy();
    galaxy.tick().expect("ambush tick");
    assert!(galaxy.entities().get(2).expect("police").travel().is_traveling());

    let report = galaxy.tick().expect("hunt tick");
    assert_eq!(report.engagements, vec![(2, 1)]);
    let battle = report.battles[0];
    assert!(
        matches!(
            battle.outcome,
            BattleOutcome::AttackerWon | BattleOutcome::DefenderFled
        ),
        "unexpected {battle:?}"
    );
    assert!(!galaxy.criminals().is_criminal(2));

    // Police confiscate cargo only.
    let pirate = galaxy.entities().get(1).expect("pirate");
    let police = galaxy.entities().get(2).expect("police");
    assert_eq!(police.ledger().credits(), 1000);
    if battle.outcome == BattleOutcome::AttackerWon {
        assert!(!pirate.is_alive());
        assert!(pirate.ledger().credits() >= 300);
    }
}

#[test]
fn test_pirate_ignores_small_fry() {
    let config = GalaxyConfig::default();
    let world = two_planet_world(&config, 4);
    let mut galaxy = CastBuilder::new(config)
        .entity(|id| in_flight(id, Brain::trader(), ShipClass::Gnat, 1500))
        .entity(|id| in_flight(id, Brain::Pirate, ShipClass::Mosquito, 300))
        .build(world, 2);

    let report = galaxy.tick().expect("tick");
    assert!(report.engagements.is_empty());
    assert!(galaxy.criminals().is_empty());
}

// =============================================================================
// Travel and maintenance
// =============================================================================

#[test]
fn test_player_journey_burns_fuel_per_tick() {
    let config = GalaxyConfig::default();
    let world = line_world(&config, &[3, 2]);
    let mut galaxy = CastBuilder::new(config).player(0).build(world, 4);
    let full = galaxy.player().expect("player").ship().fuel().current();

    galaxy.player_travel_to(1).expect("depart");
    for remaining in [2, 1] {
        step_galaxy(&mut galaxy);
        assert_eq!(galaxy.player().expect("player").travel().remaining(), remaining);
    }
    step_galaxy(&mut galaxy);

    let view = galaxy.player_view().expect("view");
    assert_eq!(view.location, 1);
    assert_eq!(view.destination, None);
    assert_eq!(view.ship.fuel.current(), full - 3);

    galaxy.player_travel_to(2).expect("depart again");
    step_galaxy(&mut galaxy);
    step_galaxy(&mut galaxy);
    assert_eq!(galaxy.player_view().expect("view").location, 2);
    galaxy.check_invariants().expect("invariants");
}

#[test]
fn test_big_tick_updates_markets() {
    let config = GalaxyConfig::default();
    let interval = config.rules.big_tick_interval;
    let world = line_world(&config, &[3]);
    let mut galaxy = CastBuilder::new(config).build(world, 12);

    for _ in 1..interval {
        step_galaxy(&mut galaxy);
    }
    let before = galaxy.planet_view(0).expect("view");
    assert_eq!(before.goods[Commodity::Water.index()].stock, 30);

    let report = galaxy.tick().expect("big tick");
    assert!(report.big_tick);

    // Agricultural water: 30 + 20 produced - 10 consumed.
    let water = galaxy.planet_view(0).expect("view").goods[Commodity::Water.index()];
    assert_eq!(water.stock, 40);
    assert!((20..=37).contains(&water.price), "price {}", water.price);
}

#[test]
fn test_dead_npc_respawns_with_fresh_loadout() {
    let config = GalaxyConfig::default();
    let interval = config.rules.big_tick_interval;
    let world = two_planet_world(&config, 3);
    let mut galaxy = CastBuilder::new(config)
        .npc_with(Role::Trader, 1, |trader| {
            trader.ship_mut().destroy();
            trader.ledger_mut().spend(1500).expect("spend");
        })
        .build(world, 6);

    let reports: Vec<_> = (0..interval).map(|_| galaxy.tick().expect("tick")).collect();
    assert_eq!(reports.last().expect("report").respawned, vec![0]);

    let trader = galaxy.entities().get(0).expect("trader");
    assert!(trader.is_alive());
    assert_eq!(trader.ship().class(), ShipClass::Firefly);
    assert!(trader.ship().hull().is_full());
    assert!(trader.ledger().credits() >= 1500);
    galaxy.check_invariants().expect("invariants");
}

// =============================================================================
// Long runs
// =============================================================================

#[test]
fn test_long_run_keeps_invariants() {
    let mut galaxy =
        Galaxy::generate(GalaxyConfig::default().with_planet_count(20), 2024).expect("galaxy");
    for _ in 0..400 {
        let report = galaxy.tick().expect("tick");
        assert_engagements_disjoint(&report);
        galaxy.check_invariants().expect("invariants");
        if !report.player_alive {
            break;
        }
    }
    assert!(galaxy.current_tick() > 0);
}

#[test]
fn test_npc_galaxy_runs_big_ticks() {
    let mut galaxy = Galaxy::generate(
        GalaxyConfig::default().with_planet_count(25).with_player(false),
        77,
    )
    .expect("galaxy");
    let reports = galaxy.run(600).expect("run");
    assert_eq!(reports.len(), 600);
    assert_eq!(reports.iter().filter(|r| r.big_tick).count(), 600 / 14);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_random_galaxies_stay_consistent(
        config in strategies::arb_config(),
        seed in strategies::arb_seed(),
    ) {
        let mut galaxy = Galaxy::generate(config, seed).expect("galaxy");
        for _ in 0..60 {
            let report = galaxy.tick().expect("tick");
            assert_engagements_disjoint(&report);
            prop_assert!(galaxy.check_invariants().is_ok());
        }
    }
}
