//! The galaxy simulation.
//!
//! [`Galaxy`] owns the world, the entities, the criminal registry and the
//! random source, and advances them one discrete tick at a time. Front ends
//! drive the player between ticks through the `player_*` methods and read
//! state back through views.
//!
//! # Tick order
//!
//! 1. Advance the tick counter.
//! 2. Every `big_tick_interval` ticks: respawn dead NPCs and update every
//!    planet's economy.
//! 3. The player's turn.
//! 4. NPC turns in id order.
//! 5. Resolve fight intents into disjoint engagements.
//! 6. Flag attackers and fight each engagement.
//! 7. Age the criminal registry.
//!
//! # Determinism
//!
//! Every random draw comes from one [`ChaCha8Rng`] seeded from a `u64`.
//! Entities act in id order and all collections iterate in key order, so
//! the same seed and the same player orders always produce the same
//! [`Galaxy::state_hash`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::behavior::TurnContext;
use crate::combat::{fight, BattleChoice, BattleReport};
use crate::commodity::Commodity;
use crate::config::GalaxyConfig;
use crate::criminals::CriminalRegistry;
use crate::entity::{Entity, EntityId, EntityStorage, Role};
use crate::error::{GameError, Result};
use crate::generation::{generate_galaxy, spawn_entity};
use crate::scheduler::{Engagements, Intent};
use crate::ship::{Ship, ShipClass};
use crate::trade;
use crate::view::{ContactView, LocationView, PlanetView, PlayerView, ShipView};
use crate::world::{Location, PlanetId, WorldGraph};

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Whether the maintenance pass ran.
    pub big_tick: bool,
    /// NPCs brought back by the maintenance pass.
    pub respawned: Vec<EntityId>,
    /// Accepted attacker to victim pairs.
    pub engagements: Vec<(EntityId, EntityId)>,
    /// Battles actually fought.
    pub battles: Vec<BattleReport>,
    /// Whether the player is alive at the end of the tick. Always true for
    /// galaxies without a player.
    pub player_alive: bool,
}

impl TickReport {
    /// Battles that destroyed a ship.
    pub fn kills(&self) -> impl Iterator<Item = &BattleReport> + '_ {
        self.battles.iter().filter(|report| report.is_kill())
    }
}

/// A running galaxy.
#[derive(Debug, Clone)]
pub struct Galaxy {
    tick: u64,
    seed: u64,
    config: GalaxyConfig,
    world: WorldGraph,
    entities: EntityStorage,
    criminals: CriminalRegistry,
    player: Option<EntityId>,
    rng: ChaCha8Rng,
}

impl Galaxy {
    /// Generate a galaxy from a config and a seed.
    pub fn generate(config: GalaxyConfig, seed: u64) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let generated = generate_galaxy(&config, &mut rng)?;
        let galaxy = Self::assemble(
            config,
            generated.world,
            generated.entities,
            generated.player,
            seed,
            rng,
        )?;
        info!(
            seed,
            planets = galaxy.world.planet_count(),
            entities = galaxy.entities.len(),
            "Galaxy generated"
        );
        Ok(galaxy)
    }

    /// Build a galaxy from hand-made parts.
    ///
    /// `world` must have no presence registered yet; every entity is placed
    /// according to its travel state.
    pub fn from_parts(
        config: GalaxyConfig,
        mut world: WorldGraph,
        entities: EntityStorage,
        player: Option<EntityId>,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        if world.presence_count() != 0 {
            return Err(GameError::InvalidState(
                "world already has presence registered".into(),
            ));
        }
        for entity in entities.iter() {
            entity.enter_world(&mut world)?;
        }
        Self::assemble(
            config,
            world,
            entities,
            player,
            seed,
            ChaCha8Rng::seed_from_u64(seed),
        )
    }

    fn assemble(
        config: GalaxyConfig,
        world: WorldGraph,
        entities: EntityStorage,
        player: Option<EntityId>,
        seed: u64,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        if let Some(id) = player {
            if entities.get(id)?.role() != Role::Player {
                return Err(GameError::InvalidState(format!(
                    "entity {id} is not a player"
                )));
            }
        }
        let galaxy = Self {
            tick: 0,
            seed,
            criminals: CriminalRegistry::new(config.rules.criminal_timeout),
            config,
            world,
            entities,
            player,
            rng,
        };
        galaxy.check_invariants()?;
        Ok(galaxy)
    }

    /// Advance the galaxy one tick.
    ///
    /// Transactional failures inside a turn are logged and skipped; an
    /// error here means an invariant broke and the galaxy should be
    /// discarded.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            player_alive: true,
            ..TickReport::default()
        };

        if self.tick % self.config.rules.big_tick_interval.max(1) == 0 {
            report.big_tick = true;
            report.respawned = self.maintenance_pass()?;
        }

        let mut player_intent = None;
        if let Some(id) = self.player {
            if !self.entities.get(id)?.is_alive() {
                report.player_alive = false;
                debug!(tick = self.tick, "Player is dead, skipping turns");
                return Ok(report);
            }
            player_intent = self.take_turn(id)?.map(|victim| Intent::new(id, victim));
        }

        let mut npc_intents = Vec::new();
        for id in self.entities.ids() {
            if Some(id) == self.player {
                continue;
            }
            if let Some(victim) = self.take_turn(id)? {
                npc_intents.push(Intent::new(id, victim));
            }
        }

        let engagements = Engagements::resolve(player_intent, npc_intents);
        report.engagements = engagements.iter().collect();
        report.battles = self.run_battles(&engagements)?;
        self.criminals.update_criminals();

        if let Some(id) = self.player {
            report.player_alive = self.entities.get(id)?.is_alive();
        }
        trace!(
            tick = self.tick,
            engagements = report.engagements.len(),
            battles = report.battles.len(),
            criminals = self.criminals.len(),
            "Tick complete"
        );
        Ok(report)
    }

    /// Run `ticks` ticks, stopping early if the player dies.
    pub fn run(&mut self, ticks: u64) -> Result<Vec<TickReport>> {
        let mut reports = Vec::new();
        for _ in 0..ticks {
            let report = self.tick()?;
            let over = !report.player_alive;
            reports.push(report);
            if over {
                break;
            }
        }
        Ok(reports)
    }

    fn take_turn(&mut self, id: EntityId) -> Result<Option<EntityId>> {
        let (entity, others) = self.entities.split_turn(id)?;
        let mut ctx = TurnContext {
            world: &mut self.world,
            criminals: &self.criminals,
            others,
            rules: &self.config.rules,
            rng: &mut self.rng,
        };
        entity.play(&mut ctx)
    }

    fn maintenance_pass(&mut self) -> Result<Vec<EntityId>> {
        let mut respawned = Vec::new();
        for id in self.entities.ids() {
            if Some(id) == self.player {
                continue;
            }
            let entity = self.entities.get(id)?;
            if entity.is_alive() {
                continue;
            }
            let location = entity.travel().location();
            let role = entity.role();
            if !entity.leave_world(&mut self.world) {
                return Err(GameError::InvalidState(format!(
                    "dead entity {id} missing from {:?}",
                    entity.travel().presence()
                )));
            }

            let fresh = spawn_entity(&self.config, id, location, role)?;
            fresh.enter_world(&mut self.world)?;
            self.entities.replace(fresh)?;
            self.criminals.remove_criminal(id);
            respawned.push(id);
        }

        self.world
            .update_all_planets(&self.config.economy, &mut self.rng);
        info!(
            tick = self.tick,
            respawned = respawned.len(),
            "Maintenance pass"
        );
        Ok(respawned)
    }

    fn run_battles(&mut self, engagements: &Engagements) -> Result<Vec<BattleReport>> {
        let mut reports = Vec::with_capacity(engagements.len());
        for (attacker_id, victim_id) in engagements.iter() {
            let (attacker, victim) = self.entities.pair_mut(attacker_id, victim_id)?;
            if !attacker.is_alive() || !victim.is_alive() {
                self.criminals.remove_criminal(attacker_id);
                self.criminals.remove_criminal(victim_id);
                continue;
            }
            if attacker.role() != Role::Police {
                self.criminals.add_criminal(attacker_id);
            }
            reports.push(fight(attacker, victim, &mut self.rng));
        }
        Ok(reports)
    }

    /// Current tick number.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Seed the galaxy was built from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Configuration in force.
    #[must_use]
    pub const fn config(&self) -> &GalaxyConfig {
        &self.config
    }

    /// Planets, lanes and presence.
    #[must_use]
    pub const fn world(&self) -> &WorldGraph {
        &self.world
    }

    /// Every entity.
    #[must_use]
    pub const fn entities(&self) -> &EntityStorage {
        &self.entities
    }

    /// Flagged criminals.
    #[must_use]
    pub const fn criminals(&self) -> &CriminalRegistry {
        &self.criminals
    }

    /// Player id, if the galaxy has a player.
    #[must_use]
    pub const fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    /// The player entity.
    pub fn player(&self) -> Result<&Entity> {
        let id = self
            .player
            .ok_or(GameError::InvalidAction("galaxy has no player"))?;
        self.entities.get(id)
    }

    /// Whether the player has been destroyed.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.player().is_ok_and(|player| !player.is_alive())
    }

    /// Hash of everything that evolves between ticks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        for entity in self.entities.iter() {
            entity.hash(&mut hasher);
        }
        for planet in self.world.planets() {
            planet.hash(&mut hasher);
        }
        self.criminals.hash(&mut hasher);
        hasher.finish()
    }

    /// Verify lane symmetry, dense ids and that every entity sits in
    /// exactly the presence set its travel state names.
    pub fn check_invariants(&self) -> Result<()> {
        self.world.check_symmetry()?;
        for (index, entity) in self.entities.iter().enumerate() {
            if entity.id() as usize != index {
                return Err(GameError::InvalidState(format!(
                    "entity {} stored at index {index}",
                    entity.id()
                )));
            }
            let expected = entity.travel().presence();
            let found = self.world.locate(entity.id());
            if found != [expected] {
                return Err(GameError::InvalidState(format!(
                    "entity {} expected at {expected:?}, found at {found:?}",
                    entity.id()
                )));
            }
        }
        if self.world.presence_count() != self.entities.len() {
            return Err(GameError::InvalidState(format!(
                "{} presence entries for {} entities",
                self.world.presence_count(),
                self.entities.len()
            )));
        }
        Ok(())
    }

    fn live_player_id(&self) -> Result<EntityId> {
        let player = self.player()?;
        if !player.is_alive() {
            return Err(GameError::InvalidAction("player ship is destroyed"));
        }
        Ok(player.id())
    }

    fn resting_player_id(&self) -> Result<EntityId> {
        let id = self.live_player_id()?;
        if self.entities.get(id)?.travel().is_traveling() {
            return Err(GameError::InvalidAction("not available while traveling"));
        }
        Ok(id)
    }

    /// Rename the player.
    pub fn set_player_name(&mut self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(GameError::InvalidAction("player name must not be empty"));
        }
        let id = self.player()?.id();
        if let Some(state) = self.entities.get_mut(id)?.player_state_mut() {
            state.name = name.to_string();
        }
        Ok(())
    }

    /// Depart towards a neighboring planet.
    pub fn player_travel_to(&mut self, destination: PlanetId) -> Result<()> {
        let id = self.live_player_id()?;
        let player = self.entities.get_mut(id)?;
        let from = player.travel().location();
        if player.travel().is_traveling() || !self.world.is_neighbor(from, destination) {
            return Err(GameError::InvalidDestination {
                from,
                to: destination,
            });
        }
        let required = self.world.distance(from, destination)?;
        let available = player.ship().fuel().current();
        if available < required {
            return Err(GameError::InsufficientFuel {
                required,
                available,
            });
        }
        player.begin_travel(&mut self.world, destination)?;
        debug!(from, to = destination, "Player departed");
        Ok(())
    }

    /// Buy goods on the current planet, returning the credits spent.
    pub fn player_buy(&mut self, commodity: Commodity, amount: u32) -> Result<u32> {
        let id = self.resting_player_id()?;
        let player = self.entities.get_mut(id)?;
        let market = self
            .world
            .planet_mut(player.travel().location())?
            .market_mut();
        trade::buy(player, market, commodity, amount)
    }

    /// Sell goods on the current planet, returning the credits earned.
    pub fn player_sell(&mut self, commodity: Commodity, amount: u32) -> Result<u32> {
        let id = self.resting_player_id()?;
        let player = self.entities.get_mut(id)?;
        let market = self
            .world
            .planet_mut(player.travel().location())?
            .market_mut();
        trade::sell(player, market, commodity, amount)
    }

    /// Buy as much fuel as is affordable, returning the units bought.
    pub fn player_refuel(&mut self) -> Result<u32> {
        let id = self.resting_player_id()?;
        let cost = self.config.rules.fuel_cost;
        let player = self.entities.get_mut(id)?;
        let affordable = player
            .ledger()
            .credits()
            .checked_div(cost)
            .unwrap_or(u32::MAX);
        let units = player.ship().fuel().missing().min(affordable);
        player.ledger_mut().spend(units * cost)?;
        Ok(player.ship_mut().refuel(units))
    }

    /// Repair as much hull as is affordable, returning the points restored.
    pub fn player_repair(&mut self) -> Result<u32> {
        let id = self.resting_player_id()?;
        let cost = self.config.rules.repair_cost;
        let player = self.entities.get_mut(id)?;
        let affordable = player
            .ledger()
            .credits()
            .checked_div(cost)
            .unwrap_or(u32::MAX);
        let points = player.ship().hull().missing().min(affordable);
        player.ledger_mut().spend(points * cost)?;
        Ok(player.ship_mut().repair(points))
    }

    /// Trade the current ship in for a new one of `class`.
    ///
    /// The hold must be empty. The old ship's price is refunded after the
    /// new one is paid for.
    pub fn player_buy_ship(&mut self, class: ShipClass) -> Result<()> {
        let id = self.resting_player_id()?;
        let spec = self.config.ship_spec(class)?;
        let player = self.entities.get_mut(id)?;
        if player.ledger().total_cargo() > 0 {
            return Err(GameError::InvalidAction("sell all cargo before trading in"));
        }
        player.ledger_mut().spend(spec.price)?;
        let old = player.swap_ship(Ship::new(spec));
        player.ledger_mut().add_credits(old.price());
        debug!(from = ?old.class(), to = ?class, "Player bought a ship");
        Ok(())
    }

    /// Order an attack on a co-present entity for the next tick.
    pub fn player_attack(&mut self, target: EntityId) -> Result<()> {
        let id = self.live_player_id()?;
        let presence = self.entities.get(id)?.travel().presence();
        let victim = self.entities.get(target)?;
        if target == id || !victim.is_alive() || !self.world.is_present(target, presence) {
            return Err(GameError::InvalidTarget(target));
        }
        if let Some(state) = self.entities.get_mut(id)?.player_state_mut() {
            state.pending_attack = Some(target);
        }
        Ok(())
    }

    /// Choose what the player does when a battle asks.
    pub fn set_player_battle_choice(&mut self, choice: BattleChoice) -> Result<()> {
        let id = self.player()?.id();
        if let Some(state) = self.entities.get_mut(id)?.player_state_mut() {
            state.stance = choice;
        }
        Ok(())
    }

    /// Snapshot of a planet.
    pub fn planet_view(&self, id: PlanetId) -> Result<PlanetView> {
        PlanetView::build(&self.world, id)
    }

    /// Snapshot of the player's status.
    pub fn player_view(&self) -> Result<PlayerView> {
        let player = self.player()?;
        let state = player
            .player_state()
            .ok_or(GameError::InvalidState("player has no orders".into()))?;
        Ok(PlayerView {
            id: player.id(),
            name: state.name.clone(),
            credits: player.ledger().credits(),
            cargo: player.ledger().cargo_table().clone(),
            ship: ShipView::from(player.ship()),
            location: player.travel().location(),
            destination: player.travel().destination(),
            remaining: player.travel().remaining(),
            criminal: self.criminals.is_criminal(player.id()),
            stance: state.stance,
            alive: player.is_alive(),
        })
    }

    /// Who else shares `viewer`'s presence set.
    pub fn location_view(&self, viewer: EntityId) -> Result<LocationView> {
        let location: Location = self.entities.get(viewer)?.travel().presence();
        let contacts = self
            .world
            .present(location)
            .filter(|id| *id != viewer)
            .map(|id| {
                self.entities
                    .get(id)
                    .map(|entity| ContactView::of(entity, self.criminals.is_criminal(id)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(LocationView { location, contacts })
    }
}
