//! Two-party battle resolution.
//!
//! Battles alternate turns, starting with the attacker. On its turn a party
//! asks its own brain for a [`BattleDecision`] against the opponent:
//! - `Attack` lands a hit for a precomputed amount
//! - `Flee` rolls `0..=100` against the party's flee chance and ends the
//!   battle with no winner on success
//!
//! A battle ends as soon as one hull reaches zero. The survivor loots the
//! wreck through its `won` hook and the loser's `lost` hook runs.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{Entity, EntityId};

/// Safety stop for two parties that can neither hurt nor escape each other.
pub const MAX_ROUNDS: u32 = 10_000;

/// The player's standing choice when a battle asks for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BattleChoice {
    /// Shoot back.
    #[default]
    Attack,
    /// Try to get away.
    Flee,
}

/// One party's action for its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleDecision {
    /// Hit the opponent for this much damage.
    Attack {
        /// Damage dealt.
        damage: u32,
    },
    /// Try to escape with this percent chance.
    Flee {
        /// Escape chance in percent.
        chance: u32,
    },
}

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// The defender was destroyed.
    AttackerWon,
    /// The attacker was destroyed.
    DefenderWon,
    /// The attacker escaped.
    AttackerFled,
    /// The defender escaped.
    DefenderFled,
    /// Nobody could finish it.
    Stalemate,
}

/// Summary of a resolved battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleReport {
    /// Instigator.
    pub attacker: EntityId,
    /// Target.
    pub defender: EntityId,
    /// Result.
    pub outcome: BattleOutcome,
    /// Turns taken.
    pub rounds: u32,
}

impl BattleReport {
    /// Whether someone was destroyed.
    #[must_use]
    pub const fn is_kill(&self) -> bool {
        matches!(
            self.outcome,
            BattleOutcome::AttackerWon | BattleOutcome::DefenderWon
        )
    }

    /// Whether someone escaped.
    #[must_use]
    pub const fn is_flight(&self) -> bool {
        matches!(
            self.outcome,
            BattleOutcome::AttackerFled | BattleOutcome::DefenderFled
        )
    }
}

/// Fight until one party dies or escapes.
pub fn fight<R: Rng + ?Sized>(
    attacker: &mut Entity,
    defender: &mut Entity,
    rng: &mut R,
) -> BattleReport {
    let mut rounds = 0;
    let outcome = loop {
        if rounds == MAX_ROUNDS {
            break BattleOutcome::Stalemate;
        }
        let attacker_turn = rounds % 2 == 0;
        rounds += 1;

        let (acting, target) = if attacker_turn {
            (&mut *attacker, &mut *defender)
        } else {
            (&mut *defender, &mut *attacker)
        };

        match acting.battle_decision(target) {
            BattleDecision::Attack { damage } => {
                target.ship_mut().take_damage(damage);
                if !target.is_alive() {
                    acting.won(target);
                    target.lost();
                    break if attacker_turn {
                        BattleOutcome::AttackerWon
                    } else {
                        BattleOutcome::DefenderWon
                    };
                }
            }
            BattleDecision::Flee { chance } => {
                let roll: u32 = rng.gen_range(0..101);
                if roll <= chance {
                    break if attacker_turn {
                        BattleOutcome::AttackerFled
                    } else {
                        BattleOutcome::DefenderFled
                    };
                }
            }
        }
    };

    let report = BattleReport {
        attacker: attacker.id(),
        defender: defender.id(),
        outcome,
        rounds,
    };
    debug!(
        attacker = report.attacker,
        defender = report.defender,
        outcome = ?report.outcome,
        rounds = report.rounds,
        "Battle resolved"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commodity::Commodity;
    use crate::entity::{Brain, PlayerState};
    use crate::ship::{Ship, ShipClass, ShipSpec};
    use crate::travel::TravelState;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn entity(id: EntityId, brain: Brain, hull: u32, damage: u32, maneuver: u32) -> Entity {
        let spec = ShipSpec::new(ShipClass::Hornet, hull, 0, 40, 5, damage, maneuver, 1000);
        Entity::new(id, brain, Ship::new(&spec), 100, TravelState::at_rest(0))
    }

    fn player(stance: BattleChoice) -> Brain {
        Brain::Player(PlayerState {
            name: "Ace".into(),
            pending_attack: None,
            stance,
        })
    }

    #[test]
    fn test_police_kills_stationary_trader() {
        let mut police = entity(1, Brain::Police { home: 0 }, 100, 50, 0);
        // Zero maneuver gives a 20% flee chance; the trader is one hit from death.
        let mut trader = entity(2, Brain::trader(), 10, 0, 0);
        trader.ledger_mut().load(Commodity::Food, 5);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let report = fight(&mut police, &mut trader, &mut rng);

        assert_eq!(report.outcome, BattleOutcome::AttackerWon);
        assert_eq!(report.rounds, 1);
        assert!(!trader.is_alive());
        // Police confiscate cargo but leave credits.
        assert_eq!(police.ledger().cargo(Commodity::Food), 5);
        assert_eq!(police.ledger().credits(), 100);
    }

    #[test]
    fn test_winner_takes_credits() {
        let mut hunter = entity(1, player(BattleChoice::Attack), 100, 50, 0);
        let mut prey = entity(2, Brain::Police { home: 0 }, 10, 1, 0);

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let report = fight(&mut hunter, &mut prey, &mut rng);

        assert!(report.is_kill());
        assert_eq!(hunter.ledger().credits(), 200);
        assert_eq!(prey.ledger().credits(), 0);
    }

    #[test]
    fn test_perfect_dodger_always_escapes() {
        // Maneuver 100 means a 100% flee chance.
        let mut police = entity(1, Brain::Police { home: 0 }, 100, 50, 0);
        let mut trader = entity(2, Brain::trader(), 1000, 0, 100);

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let report = fight(&mut police, &mut trader, &mut rng);

        assert_eq!(report.outcome, BattleOutcome::DefenderFled);
        assert!(report.is_flight());
        assert_eq!(report.rounds, 2);
        assert!(trader.is_alive());
    }

    #[test]
    fn test_harmless_pair_stalls() {
        let mut a = entity(1, Brain::Police { home: 0 }, 100, 0, 0);
        let mut b = entity(2, Brain::Police { home: 0 }, 100, 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let report = fight(&mut a, &mut b, &mut rng);
        assert_eq!(report.outcome, BattleOutcome::Stalemate);
        assert_eq!(report.rounds, MAX_ROUNDS);
    }
}
