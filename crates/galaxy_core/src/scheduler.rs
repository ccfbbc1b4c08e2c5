//! Turning fight intents into conflict-free engagements.
//!
//! Every entity may ask to fight one other entity per tick. The player's
//! intent is considered first, then NPC intents in attacker id order. An
//! intent is accepted only if neither party is already part of an accepted
//! pairing, so each entity fights at most one battle per tick.

use std::collections::{BTreeMap, BTreeSet};

use crate::entity::EntityId;

/// A wish to attack someone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Intent {
    /// Who wants to fight.
    pub attacker: EntityId,
    /// Who they want to fight.
    pub victim: EntityId,
}

impl Intent {
    /// Create an intent.
    #[must_use]
    pub const fn new(attacker: EntityId, victim: EntityId) -> Self {
        Self { attacker, victim }
    }
}

/// Accepted attacker to victim pairings for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Engagements {
    pairs: BTreeMap<EntityId, EntityId>,
    victims: BTreeSet<EntityId>,
}

impl Engagements {
    /// Resolve a tick's intents. The player's intent takes priority.
    pub fn resolve(player: Option<Intent>, npc: impl IntoIterator<Item = Intent>) -> Self {
        let mut engagements = Self::default();
        if let Some(intent) = player {
            engagements.try_accept(intent);
        }

        let mut pending: Vec<Intent> = npc.into_iter().collect();
        pending.sort_by_key(|intent| intent.attacker);
        for intent in pending {
            engagements.try_accept(intent);
        }
        engagements
    }

    /// Accept an intent if it conflicts with nothing accepted so far.
    pub fn try_accept(&mut self, intent: Intent) -> bool {
        let Intent { attacker, victim } = intent;
        if attacker == victim
            || self.is_engaged(attacker)
            || self.is_engaged(victim)
        {
            return false;
        }
        self.pairs.insert(attacker, victim);
        self.victims.insert(victim);
        true
    }

    /// Whether an entity is already an attacker or a victim.
    #[must_use]
    pub fn is_engaged(&self, id: EntityId) -> bool {
        self.pairs.contains_key(&id) || self.victims.contains(&id)
    }

    /// The victim an attacker was paired with.
    #[must_use]
    pub fn victim_of(&self, attacker: EntityId) -> Option<EntityId> {
        self.pairs.get(&attacker).copied()
    }

    /// Accepted pairs in attacker id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.pairs.iter().map(|(a, v)| (*a, *v))
    }

    /// Number of accepted pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether nothing was accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_one_battle_per_victim() {
        let engagements = Engagements::resolve(
            None,
            [Intent::new(3, 7), Intent::new(1, 7), Intent::new(2, 5)],
        );
        assert_eq!(engagements.iter().collect::<Vec<_>>(), vec![(1, 7), (2, 5)]);
    }

    #[test]
    fn test_player_goes_first() {
        let engagements = Engagements::resolve(Some(Intent::new(9, 4)), [Intent::new(1, 4)]);
        assert_eq!(engagements.victim_of(9), Some(4));
        assert_eq!(engagements.victim_of(1), None);
    }

    #[test]
    fn test_victims_cannot_attack() {
        let engagements = Engagements::resolve(None, [Intent::new(1, 2), Intent::new(2, 3)]);
        assert_eq!(engagements.len(), 1);
        assert_eq!(engagements.victim_of(2), None);
    }

    #[test]
    fn test_attackers_cannot_be_victims() {
        let engagements = Engagements::resolve(None, [Intent::new(1, 2), Intent::new(3, 1)]);
        assert_eq!(engagements.iter().collect::<Vec<_>>(), vec![(1, 2)]);
    }

    #[test]
    fn test_self_attack_rejected() {
        let mut engagements = Engagements::default();
        assert!(!engagements.try_accept(Intent::new(4, 4)));
        assert!(engagements.is_empty());
    }

    proptest! {
        #[test]
        fn prop_engagements_are_disjoint(
            player in prop::option::of((0u32..20, 0u32..20)),
            npc in prop::collection::vec((0u32..20, 0u32..20), 0..40),
        ) {
            let engagements = Engagements::resolve(
                player.map(|(a, v)| Intent::new(a, v)),
                npc.into_iter().map(|(a, v)| Intent::new(a, v)),
            );

            let mut seen = BTreeSet::new();
            for (attacker, victim) in engagements.iter() {
                prop_assert_ne!(attacker, victim);
                prop_assert!(seen.insert(attacker), "{} appears twice", attacker);
                prop_assert!(seen.insert(victim), "{} appears twice", victim);
            }
        }
    }
}
