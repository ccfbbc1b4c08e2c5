//! Test fixtures and helpers.
//!
//! Hand-built worlds, ships and entities for consistent testing. Worlds
//! come back with no presence registered; hand them to
//! [`Galaxy::from_parts`] together with the entities to place everyone.

use galaxy_core::config::GalaxyConfig;
use galaxy_core::economy::{Industry, Planet};
use galaxy_core::entity::{Entity, EntityId, EntityStorage, Role};
use galaxy_core::generation::{spawn_entity, spawn_player};
use galaxy_core::ship::{Ship, ShipClass};
use galaxy_core::simulation::Galaxy;
use galaxy_core::world::{PlanetId, WorldGraph};

/// Planets `0 - 1 - ... - n` joined in a line, lane `i` with `distances[i]`.
///
/// Industries cycle agricultural, industrial, technological.
///
/// # Panics
///
/// Panics if a distance is zero.
#[must_use]
pub fn line_world(config: &GalaxyConfig, distances: &[u32]) -> WorldGraph {
    let count = PlanetId::try_from(distances.len() + 1).expect("too many planets");
    let planets = (0..count)
        .map(|id| {
            let industry = Industry::ALL[id as usize % Industry::ALL.len()];
            Planet::founded(id, format!("Line-{id}"), industry, &config.economy)
        })
        .collect();
    let mut world = WorldGraph::new(planets).expect("planet ids are dense");
    for (index, distance) in (0..count).zip(distances) {
        world
            .connect(index, index + 1, *distance)
            .expect("valid lane");
    }
    world
}

/// Two planets one lane apart: agricultural 0 and technological 1.
#[must_use]
pub fn two_planet_world(config: &GalaxyConfig, distance: u32) -> WorldGraph {
    let planets = vec![
        Planet::founded(0, "Harvest".into(), Industry::Agricultural, &config.economy),
        Planet::founded(1, "Circuit".into(), Industry::Technological, &config.economy),
    ];
    let mut world = WorldGraph::new(planets).expect("planet ids are dense");
    world.connect(0, 1, distance).expect("valid lane");
    world
}

/// A full-health ship of a class from the default catalogue.
#[must_use]
pub fn ship(class: ShipClass) -> Ship {
    let config = GalaxyConfig::default();
    Ship::new(config.ship_spec(class).expect("default catalogue has every class"))
}

/// A freshly spawned NPC at rest on `planet`.
#[must_use]
pub fn npc(config: &GalaxyConfig, id: EntityId, planet: PlanetId, role: Role) -> Entity {
    spawn_entity(config, id, planet, role).expect("default loadout")
}

/// Builds an [`EntityStorage`] with dense ids.
#[derive(Debug, Clone)]
pub struct CastBuilder {
    config: GalaxyConfig,
    entities: EntityStorage,
    player: Option<EntityId>,
}

impl CastBuilder {
    /// Start an empty cast.
    #[must_use]
    pub fn new(config: GalaxyConfig) -> Self {
        Self {
            config,
            entities: EntityStorage::new(),
            player: None,
        }
    }

    /// Add the player at `planet`.
    ///
    /// # Panics
    ///
    /// Panics if a player was already added.
    #[must_use]
    pub fn player(mut self, planet: PlanetId) -> Self {
        assert!(self.player.is_none(), "only one player per galaxy");
        let id = self.entities.next_id();
        let entity = spawn_player(&self.config, id, planet, "Tester").expect("player loadout");
        self.entities.push(entity).expect("dense id");
        self.player = Some(id);
        self
    }

    /// Add an NPC of `role` at `planet`.
    #[must_use]
    pub fn npc(mut self, role: Role, planet: PlanetId) -> Self {
        let entity = npc(&self.config, self.entities.next_id(), planet, role);
        self.entities.push(entity).expect("dense id");
        self
    }

    /// Add an NPC and adjust it before it joins.
    #[must_use]
    pub fn npc_with(mut self, role: Role, planet: PlanetId, adjust: impl FnOnce(&mut Entity)) -> Self {
        let mut entity = npc(&self.config, self.entities.next_id(), planet, role);
        adjust(&mut entity);
        self.entities.push(entity).expect("dense id");
        self
    }

    /// Add a hand-made entity; `make` receives the id it must carry.
    #[must_use]
    pub fn entity(mut self, make: impl FnOnce(EntityId) -> Entity) -> Self {
        let entity = make(self.entities.next_id());
        self.entities.push(entity).expect("dense id");
        self
    }

    /// Place the cast into `world` and build a galaxy.
    ///
    /// # Panics
    ///
    /// Panics if the cast does not fit the world.
    #[must_use]
    pub fn build(self, world: WorldGraph, seed: u64) -> Galaxy {
        tracing::debug!(
            entities = self.entities.len(),
            planets = world.planet_count(),
            "Building fixture galaxy"
        );
        Galaxy::from_parts(self.config, world, self.entities, self.player, seed)
            .expect("fixture galaxy is consistent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_world() {
        let config = GalaxyConfig::default();
        let world = line_world(&config, &[2, 3, 4]);
        assert_eq!(world.planet_count(), 4);
        assert_eq!(world.distance(2, 3).expect("lane"), 4);
        assert!(!world.is_neighbor(0, 2));
        assert_eq!(world.planet(1).expect("planet").industry(), Industry::Industrial);
    }

    #[test]
    fn test_cast_builder() {
        let config = GalaxyConfig::default();
        let world = two_planet_world(&config, 3);
        let galaxy = CastBuilder::new(config)
            .player(0)
            .npc(Role::Trader, 0)
            .npc_with(Role::Pirate, 1, |pirate| pirate.ledger_mut().add_credits(5))
            .build(world, 1);

        assert_eq!(galaxy.player_id(), Some(0));
        assert_eq!(galaxy.entities().len(), 3);
        let pirate = galaxy.entities().get(2).expect("pirate");
        assert_eq!(pirate.ledger().credits(), 305);
        galaxy.check_invariants().expect("invariants");
    }

    #[test]
    fn test_ship_fixture() {
        assert!(ship(ShipClass::Wasp).is_alive());
    }
}
