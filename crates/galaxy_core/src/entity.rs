//! Entities and the entity arena.
//!
//! Every actor in the galaxy is an [`Entity`]: a ship, a ledger of credits
//! and cargo, a travel state and a [`Brain`] holding the role-specific state.
//! Entities refer to planets and to each other only by id.
//!
//! [`EntityStorage`] is a dense arena indexed by id. During a turn the acting
//! entity is split off mutably while the rest stay readable through
//! [`Others`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::combat::BattleChoice;
use crate::commodity::{Commodity, CommodityTable};
use crate::error::{GameError, Result};
use crate::ship::Ship;
use crate::travel::{TravelProgress, TravelState};
use crate::world::{PlanetId, WorldGraph};

/// Entity identifier, the entity's index in [`EntityStorage`].
pub type EntityId = u32;

/// The kind of actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Buys low, sells high.
    Trader,
    /// Preys on traders in transit.
    Pirate,
    /// Hunts flagged criminals.
    Police,
    /// Human controlled.
    Player,
}

impl Role {
    /// All roles.
    pub const ALL: [Self; 4] = [Self::Trader, Self::Pirate, Self::Police, Self::Player];
}

/// What an entity did last, used to avoid re-deciding mid-travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PreviousAction {
    /// Nothing yet.
    #[default]
    None,
    /// Refueled, repaired or recharged at rest.
    Maintenance,
    /// Sold cargo.
    Sell,
    /// Bought goods and departed.
    TravelPrep,
    /// Looked around the current lane.
    Scan,
    /// Picked a fight.
    Battle,
}

/// Credits and cargo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Ledger {
    credits: u32,
    cargo: CommodityTable<u32>,
}

impl Ledger {
    /// An empty hold with some credits.
    #[must_use]
    pub fn new(credits: u32) -> Self {
        Self {
            credits,
            cargo: CommodityTable::default(),
        }
    }

    /// Credits on hand.
    #[must_use]
    pub const fn credits(&self) -> u32 {
        self.credits
    }

    /// Units carried of one commodity.
    #[must_use]
    pub fn cargo(&self, commodity: Commodity) -> u32 {
        self.cargo[commodity]
    }

    /// Units carried of every commodity.
    #[must_use]
    pub const fn cargo_table(&self) -> &CommodityTable<u32> {
        &self.cargo
    }

    /// Total units carried.
    #[must_use]
    pub fn total_cargo(&self) -> u32 {
        self.cargo.total()
    }

    /// Add credits.
    pub fn add_credits(&mut self, amount: u32) {
        self.credits = self.credits.saturating_add(amount);
    }

    /// Remove credits, failing untouched if there are not enough.
    pub fn spend(&mut self, amount: u32) -> Result<()> {
        if amount > self.credits {
            return Err(GameError::InsufficientFunds {
                required: amount,
                available: self.credits,
            });
        }
        self.credits -= amount;
        Ok(())
    }

    /// Add cargo. Capacity is the caller's concern.
    pub fn load(&mut self, commodity: Commodity, amount: u32) {
        self.cargo[commodity] = self.cargo[commodity].saturating_add(amount);
    }

    /// Remove cargo, failing untouched if there is not enough.
    pub fn unload(&mut self, commodity: Commodity, amount: u32) -> Result<()> {
        let available = self.cargo[commodity];
        if amount > available {
            return Err(GameError::InsufficientCargo {
                commodity,
                requested: amount,
                available,
            });
        }
        self.cargo[commodity] = available - amount;
        Ok(())
    }

    /// Move all of `other`'s credits here, returning the amount.
    pub fn take_credits_from(&mut self, other: &mut Self) -> u32 {
        let amount = std::mem::take(&mut other.credits);
        self.add_credits(amount);
        amount
    }

    /// Move up to `limit` units of `other`'s cargo here, in commodity order,
    /// returning how many moved.
    pub fn take_cargo_from(&mut self, other: &mut Self, limit: u32) -> u32 {
        let mut room = limit;
        let mut moved = 0;
        for commodity in Commodity::ALL {
            let taken = other.cargo[commodity].min(room);
            other.cargo[commodity] -= taken;
            self.load(commodity, taken);
            room -= taken;
            moved += taken;
        }
        moved
    }
}

/// The player's standing orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerState {
    /// Display name.
    pub name: String,
    /// Attack order to issue on the next tick.
    pub pending_attack: Option<EntityId>,
    /// What to do when a battle asks for a decision.
    pub stance: BattleChoice,
}

/// Role-specific state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Brain {
    /// Trader with its queued route hops.
    Trader {
        /// Planets still to visit, next first.
        route: VecDeque<PlanetId>,
    },
    /// Pirate.
    Pirate,
    /// Police with the planet it patrols from.
    Police {
        /// Patrol base.
        home: PlanetId,
    },
    /// The player.
    Player(PlayerState),
}

impl Brain {
    /// A trader with an empty route.
    #[must_use]
    pub const fn trader() -> Self {
        Self::Trader {
            route: VecDeque::new(),
        }
    }

    /// The role this brain plays.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Trader { .. } => Role::Trader,
            Self::Pirate => Role::Pirate,
            Self::Police { .. } => Role::Police,
            Self::Player(_) => Role::Player,
        }
    }
}

/// An actor in the galaxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    brain: Brain,
    ship: Ship,
    ledger: Ledger,
    travel: TravelState,
    previous_action: PreviousAction,
}

impl Entity {
    /// Create an entity. Its presence is registered separately.
    #[must_use]
    pub fn new(id: EntityId, brain: Brain, ship: Ship, credits: u32, travel: TravelState) -> Self {
        Self {
            id,
            brain,
            ship,
            ledger: Ledger::new(credits),
            travel,
            previous_action: PreviousAction::None,
        }
    }

    /// Entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.brain.role()
    }

    /// Role-specific state.
    #[must_use]
    pub const fn brain(&self) -> &Brain {
        &self.brain
    }

    /// Role-specific state, mutably.
    pub fn brain_mut(&mut self) -> &mut Brain {
        &mut self.brain
    }

    /// Ship.
    #[must_use]
    pub const fn ship(&self) -> &Ship {
        &self.ship
    }

    /// Ship, mutably.
    pub fn ship_mut(&mut self) -> &mut Ship {
        &mut self.ship
    }

    /// Replace the ship, returning the old one.
    pub fn swap_ship(&mut self, ship: Ship) -> Ship {
        std::mem::replace(&mut self.ship, ship)
    }

    /// Credits and cargo.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Credits and cargo, mutably.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Travel state.
    #[must_use]
    pub const fn travel(&self) -> &TravelState {
        &self.travel
    }

    /// Last recorded action.
    #[must_use]
    pub const fn previous_action(&self) -> PreviousAction {
        self.previous_action
    }

    /// Record an action.
    pub fn set_previous_action(&mut self, action: PreviousAction) {
        self.previous_action = action;
    }

    /// Whether the ship is intact.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.ship.is_alive()
    }

    /// Free units in the hold.
    #[must_use]
    pub fn free_cargo(&self) -> u32 {
        self.ship
            .cargo_capacity()
            .saturating_sub(self.ledger.total_cargo())
    }

    /// The player's orders, if this is the player.
    #[must_use]
    pub const fn player_state(&self) -> Option<&PlayerState> {
        match &self.brain {
            Brain::Player(state) => Some(state),
            _ => None,
        }
    }

    /// The player's orders, mutably.
    pub fn player_state_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.brain {
            Brain::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Depart for a neighboring planet.
    pub fn begin_travel(&mut self, world: &mut WorldGraph, destination: PlanetId) -> Result<()> {
        self.travel.begin_travel(world, self.id, destination)
    }

    /// Burn a tick of fuel and advance travel.
    pub fn travel_tick(&mut self, world: &mut WorldGraph) -> Result<TravelProgress> {
        if self.travel.is_traveling() {
            self.ship.burn_fuel();
        }
        self.travel.advance(world, self.id)
    }

    pub(crate) fn enter_world(&self, world: &mut WorldGraph) -> Result<()> {
        self.travel.enter_world(world, self.id)
    }

    pub(crate) fn leave_world(&self, world: &mut WorldGraph) -> bool {
        self.travel.leave_world(world, self.id)
    }
}

/// Dense arena of entities, indexed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStorage {
    entities: Vec<Entity>,
}

impl EntityStorage {
    /// An empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Id the next pushed entity must carry.
    #[must_use]
    pub fn next_id(&self) -> EntityId {
        EntityId::try_from(self.entities.len()).unwrap_or(EntityId::MAX)
    }

    /// Append an entity. Its id must be [`Self::next_id`].
    pub fn push(&mut self, entity: Entity) -> Result<()> {
        if entity.id() != self.next_id() {
            return Err(GameError::InvalidState(format!(
                "entity id {} pushed at index {}",
                entity.id(),
                self.entities.len()
            )));
        }
        self.entities.push(entity);
        Ok(())
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> {
        0..self.next_id()
    }

    /// All entities, by id.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter()
    }

    /// An entity by id.
    pub fn get(&self, id: EntityId) -> Result<&Entity> {
        self.entities
            .get(id as usize)
            .ok_or(GameError::UnknownEntity(id))
    }

    /// An entity by id, mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities
            .get_mut(id as usize)
            .ok_or(GameError::UnknownEntity(id))
    }

    /// Swap in a replacement with the same id, returning the old entity.
    pub fn replace(&mut self, entity: Entity) -> Result<Entity> {
        let slot = self.get_mut(entity.id())?;
        Ok(std::mem::replace(slot, entity))
    }

    /// The acting entity, mutably, with read access to everyone else.
    pub fn split_turn(&mut self, id: EntityId) -> Result<(&mut Entity, Others<'_>)> {
        let index = id as usize;
        if index >= self.entities.len() {
            return Err(GameError::UnknownEntity(id));
        }
        let (head, rest) = self.entities.split_at_mut(index);
        let (current, tail) = rest
            .split_first_mut()
            .ok_or(GameError::UnknownEntity(id))?;
        Ok((
            current,
            Others {
                head,
                tail,
                split: id,
            },
        ))
    }

    /// Two distinct entities, mutably.
    pub fn pair_mut(&mut self, a: EntityId, b: EntityId) -> Result<(&mut Entity, &mut Entity)> {
        if a == b {
            return Err(GameError::InvalidTarget(b));
        }
        self.get(a)?;
        self.get(b)?;
        let (low, high) = (a.min(b) as usize, a.max(b) as usize);
        let (left, right) = self.entities.split_at_mut(high);
        let (low_entity, high_entity) = (&mut left[low], &mut right[0]);
        if a < b {
            Ok((low_entity, high_entity))
        } else {
            Ok((high_entity, low_entity))
        }
    }
}

/// Read-only view of every entity except the one taking its turn.
#[derive(Debug, Clone, Copy)]
pub struct Others<'a> {
    head: &'a [Entity],
    tail: &'a [Entity],
    split: EntityId,
}

impl<'a> Others<'a> {
    /// An entity by id, `None` for the acting entity or unknown ids.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        match id.cmp(&self.split) {
            std::cmp::Ordering::Less => self.head.get(id as usize),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => self.tail.get((id - self.split - 1) as usize),
        }
    }
}
