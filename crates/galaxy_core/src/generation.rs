//! Procedural galaxy generation and the entity factory.
//!
//! Generates seeded galaxies with:
//! - A chain of planets `i <-> i-1` so every planet is reachable
//! - Extra lanes skipping ahead along the chain
//! - One police ship and one trader per planet, a pirate every few planets
//! - An optional player in the middle of the chain
//!
//! The same factory functions build fresh replacements for destroyed NPCs.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GalaxyConfig;
use crate::economy::{Industry, Planet};
use crate::entity::{Brain, Entity, EntityId, EntityStorage, PlayerState, Role};
use crate::error::{GameError, Result};
use crate::ship::{Ship, ShipClass};
use crate::travel::TravelState;
use crate::world::{PlanetId, WorldGraph};

/// Name given to the player until they pick one.
pub const DEFAULT_PLAYER_NAME: &str = "Commander";

/// A freshly generated galaxy.
#[derive(Debug, Clone)]
pub struct GeneratedGalaxy {
    /// Planets, lanes and presence.
    pub world: WorldGraph,
    /// Every entity, player first when present.
    pub entities: EntityStorage,
    /// Player id, if a player was spawned.
    pub player: Option<EntityId>,
}

/// Generate a galaxy from a config.
pub fn generate_galaxy<R: Rng + ?Sized>(config: &GalaxyConfig, rng: &mut R) -> Result<GeneratedGalaxy> {
    config.validate()?;
    let mut world = generate_world(config, rng)?;
    let (entities, player) = populate(&mut world, config)?;
    Ok(GeneratedGalaxy {
        world,
        entities,
        player,
    })
}

/// Generate planets and lanes, with nobody present yet.
pub fn generate_world<R: Rng + ?Sized>(config: &GalaxyConfig, rng: &mut R) -> Result<WorldGraph> {
    let settings = &config.world;
    let count = settings.planet_count;

    let mut names = config.planet_names.clone();
    names.shuffle(rng);
    let mut names = names.into_iter();

    let planets = (0..count)
        .map(|id| {
            let industry = Industry::from_roll(rng.gen_range(0..=100));
            let name = names.next().unwrap_or_else(|| format!("Planet-{id}"));
            Planet::founded(id, name, industry, &config.economy)
        })
        .collect();
    let mut world = WorldGraph::new(planets)?;

    for id in 1..count {
        let distance = rng.gen_range(settings.min_distance..=settings.max_distance);
        world.connect(id, id - 1, distance)?;
    }

    // The last planet gets no extra lanes.
    for id in 0..count.saturating_sub(1) {
        let degree = u32::try_from(world.lanes_from(id)?.len()).unwrap_or(u32::MAX);
        let room = settings.max_neighbors.saturating_sub(degree);
        if room <= settings.min_neighbors {
            continue;
        }
        let extra = rng.gen_range(settings.min_neighbors..room);
        for offset in 2..extra {
            let other = id + offset;
            if other >= count {
                break;
            }
            let distance = rng.gen_range(settings.min_distance..=settings.max_distance);
            world.connect(id, other, distance)?;
        }
    }

    world.check_symmetry()?;
    Ok(world)
}

/// Spawn the starting population and register its presence.
pub fn populate(
    world: &mut WorldGraph,
    config: &GalaxyConfig,
) -> Result<(EntityStorage, Option<EntityId>)> {
    let mut entities = EntityStorage::new();
    let mut player = None;

    if config.world.spawn_player {
        let id = entities.next_id();
        let entity = spawn_player(config, id, world.planet_count() / 2, DEFAULT_PLAYER_NAME)?;
        entity.enter_world(world)?;
        entities.push(entity)?;
        player = Some(id);
    }

    let spacing = config.world.pirate_spacing.max(1);
    for planet in 0..world.planet_count() {
        let mut roles = vec![Role::Police, Role::Trader];
        if planet % spacing == 0 {
            roles.push(Role::Pirate);
        }
        for role in roles {
            let entity = spawn_entity(config, entities.next_id(), planet, role)?;
            entity.enter_world(world)?;
            entities.push(entity)?;
        }
    }

    Ok((entities, player))
}

/// Build a full-health ship of a class.
pub fn build_ship(config: &GalaxyConfig, class: ShipClass) -> Result<Ship> {
    Ok(Ship::new(config.ship_spec(class)?))
}

/// Build a fresh entity of a role, at rest on `location`.
///
/// Police take `location` as their home. Presence is not registered.
pub fn spawn_entity(
    config: &GalaxyConfig,
    id: EntityId,
    location: PlanetId,
    role: Role,
) -> Result<Entity> {
    let brain = match role {
        Role::Trader => Brain::trader(),
        Role::Pirate => Brain::Pirate,
        Role::Police => Brain::Police { home: location },
        Role::Player => Brain::Player(PlayerState {
            name: DEFAULT_PLAYER_NAME.to_string(),
            pending_attack: None,
            stance: Default::default(),
        }),
    };
    let loadout = config.roles.get(role);
    let ship = build_ship(config, loadout.ship)?;
    Ok(Entity::new(
        id,
        brain,
        ship,
        loadout.credits,
        TravelState::at_rest(location),
    ))
}

/// Build the player entity.
pub fn spawn_player(
    config: &GalaxyConfig,
    id: EntityId,
    location: PlanetId,
    name: &str,
) -> Result<Entity> {
    if name.trim().is_empty() {
        return Err(GameError::InvalidAction("player name must not be empty"));
    }
    let mut entity = spawn_entity(config, id, location, Role::Player)?;
    if let Some(state) = entity.player_state_mut() {
        state.name = name.to_string();
    }
    Ok(entity)
}
