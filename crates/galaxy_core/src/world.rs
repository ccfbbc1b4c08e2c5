//! The world graph.
//!
//! Planets connected by undirected lanes weighted with travel time in ticks,
//! plus the presence sets recording which entities sit on each planet or
//! fly along each lane.
//!
//! Presence is only ever changed through [`TravelState`](crate::travel::TravelState)
//! and the simulation's spawn logic, which keeps every entity in exactly one
//! set at a time.

use std::collections::{BTreeMap, BTreeSet};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EconomyConfig;
use crate::economy::Planet;
use crate::entity::EntityId;
use crate::error::{GameError, Result};

/// Planet identifier, the planet's index in the world.
pub type PlanetId = u32;

/// An undirected lane, stored with the smaller endpoint first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lane {
    low: PlanetId,
    high: PlanetId,
}

impl Lane {
    /// The lane between two planets, in either order.
    #[must_use]
    pub const fn between(a: PlanetId, b: PlanetId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Both endpoints, smaller first.
    #[must_use]
    pub const fn endpoints(&self) -> (PlanetId, PlanetId) {
        (self.low, self.high)
    }
}

/// Where an entity is present: on a planet or along a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    /// At rest on a planet.
    Planet(PlanetId),
    /// In transit along a lane.
    Lane(Lane),
}

/// Planets, lanes and presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldGraph {
    planets: Vec<Planet>,
    adjacency: Vec<BTreeMap<PlanetId, u32>>,
    planet_presence: Vec<BTreeSet<EntityId>>,
    lane_presence: BTreeMap<Lane, BTreeSet<EntityId>>,
}

impl WorldGraph {
    /// A world with the given planets and no lanes.
    ///
    /// Planet ids must equal their index.
    pub fn new(planets: Vec<Planet>) -> Result<Self> {
        for (index, planet) in planets.iter().enumerate() {
            if planet.id() as usize != index {
                return Err(GameError::InvalidState(format!(
                    "planet at index {index} has id {}",
                    planet.id()
                )));
            }
        }
        let count = planets.len();
        Ok(Self {
            planets,
            adjacency: vec![BTreeMap::new(); count],
            planet_presence: vec![BTreeSet::new(); count],
            lane_presence: BTreeMap::new(),
        })
    }

    /// Connect two planets with a lane of `distance` ticks.
    pub fn connect(&mut self, a: PlanetId, b: PlanetId, distance: u32) -> Result<()> {
        self.check_planet(a)?;
        self.check_planet(b)?;
        if a == b || distance == 0 {
            return Err(GameError::InvalidEdge { a, b });
        }
        self.adjacency[a as usize].insert(b, distance);
        self.adjacency[b as usize].insert(a, distance);
        Ok(())
    }

    /// Number of planets.
    #[must_use]
    pub fn planet_count(&self) -> u32 {
        u32::try_from(self.planets.len()).unwrap_or(u32::MAX)
    }

    /// All planets, by id.
    #[must_use]
    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    /// A planet by id.
    pub fn planet(&self, id: PlanetId) -> Result<&Planet> {
        self.planets
            .get(id as usize)
            .ok_or(GameError::UnknownPlanet(id))
    }

    /// A planet by id, mutably.
    pub fn planet_mut(&mut self, id: PlanetId) -> Result<&mut Planet> {
        self.planets
            .get_mut(id as usize)
            .ok_or(GameError::UnknownPlanet(id))
    }

    /// Ids of the planets one lane away, ascending.
    pub fn neighbors(&self, id: PlanetId) -> Result<Vec<PlanetId>> {
        Ok(self.lanes_from(id)?.keys().copied().collect())
    }

    /// Neighbor ids mapped to lane distance.
    pub fn lanes_from(&self, id: PlanetId) -> Result<&BTreeMap<PlanetId, u32>> {
        self.adjacency
            .get(id as usize)
            .ok_or(GameError::UnknownPlanet(id))
    }

    /// Whether a lane joins `a` and `b`.
    #[must_use]
    pub fn is_neighbor(&self, a: PlanetId, b: PlanetId) -> bool {
        self.adjacency
            .get(a as usize)
            .is_some_and(|lanes| lanes.contains_key(&b))
    }

    /// Travel time between two neighbors.
    pub fn distance(&self, a: PlanetId, b: PlanetId) -> Result<u32> {
        self.adjacency
            .get(a as usize)
            .and_then(|lanes| lanes.get(&b))
            .copied()
            .ok_or(GameError::InvalidEdge { a, b })
    }

    /// Every lane once, with its distance.
    pub fn lanes(&self) -> impl Iterator<Item = (Lane, u32)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(a, lanes)| {
            let a = a as PlanetId;
            lanes
                .iter()
                .filter(move |(b, _)| a < **b)
                .map(move |(b, distance)| (Lane::between(a, *b), *distance))
        })
    }

    /// Entities present at a location, ascending by id.
    pub fn present(&self, location: Location) -> impl Iterator<Item = EntityId> + '_ {
        let set = match location {
            Location::Planet(id) => self.planet_presence.get(id as usize),
            Location::Lane(lane) => self.lane_presence.get(&lane),
        };
        set.into_iter().flatten().copied()
    }

    /// Whether an entity is present at a location.
    #[must_use]
    pub fn is_present(&self, entity: EntityId, location: Location) -> bool {
        match location {
            Location::Planet(id) => self
                .planet_presence
                .get(id as usize)
                .is_some_and(|set| set.contains(&entity)),
            Location::Lane(lane) => self
                .lane_presence
                .get(&lane)
                .is_some_and(|set| set.contains(&entity)),
        }
    }

    /// Every presence set an entity is in.
    ///
    /// In a consistent world this is exactly one location per live entity.
    #[must_use]
    pub fn locate(&self, entity: EntityId) -> Vec<Location> {
        let on_planets = self
            .planet_presence
            .iter()
            .enumerate()
            .filter(|(_, set)| set.contains(&entity))
            .map(|(id, _)| Location::Planet(id as PlanetId));
        let on_lanes = self
            .lane_presence
            .iter()
            .filter(|(_, set)| set.contains(&entity))
            .map(|(lane, _)| Location::Lane(*lane));
        on_planets.chain(on_lanes).collect()
    }

    /// Total number of presence entries across planets and lanes.
    #[must_use]
    pub fn presence_count(&self) -> usize {
        self.planet_presence.iter().map(BTreeSet::len).sum::<usize>()
            + self.lane_presence.values().map(BTreeSet::len).sum::<usize>()
    }

    /// Add an entity to a presence set.
    pub(crate) fn place(&mut self, entity: EntityId, location: Location) -> Result<()> {
        match location {
            Location::Planet(id) => {
                self.check_planet(id)?;
                self.planet_presence[id as usize].insert(entity);
            }
            Location::Lane(lane) => {
                let (a, b) = lane.endpoints();
                if !self.is_neighbor(a, b) {
                    return Err(GameError::InvalidEdge { a, b });
                }
                self.lane_presence.entry(lane).or_default().insert(entity);
            }
        }
        Ok(())
    }

    /// Remove an entity from a presence set, returning whether it was there.
    pub(crate) fn unplace(&mut self, entity: EntityId, location: Location) -> bool {
        match location {
            Location::Planet(id) => self
                .planet_presence
                .get_mut(id as usize)
                .is_some_and(|set| set.remove(&entity)),
            Location::Lane(lane) => {
                let Some(set) = self.lane_presence.get_mut(&lane) else {
                    return false;
                };
                let removed = set.remove(&entity);
                if set.is_empty() {
                    self.lane_presence.remove(&lane);
                }
                removed
            }
        }
    }

    /// Move an entity between presence sets.
    ///
    /// Fails without changes if the entity is not present at `from` or `to`
    /// does not exist.
    pub(crate) fn move_presence(
        &mut self,
        entity: EntityId,
        from: Location,
        to: Location,
    ) -> Result<()> {
        if !self.is_present(entity, from) {
            return Err(GameError::InvalidState(format!(
                "entity {entity} is not present at {from:?}"
            )));
        }
        if from == to {
            return Ok(());
        }
        self.place(entity, to)?;
        self.unplace(entity, from);
        Ok(())
    }

    /// Run one economic cycle on every planet.
    ///
    /// One sub-seed per planet is drawn from `rng` in id order, then planets
    /// update in parallel. The outcome does not depend on thread scheduling.
    pub fn update_all_planets<R: RngCore + ?Sized>(&mut self, economy: &EconomyConfig, rng: &mut R) {
        let seeds: Vec<u64> = self.planets.iter().map(|_| rng.next_u64()).collect();
        self.planets
            .par_iter_mut()
            .zip(seeds)
            .for_each(|(planet, seed)| {
                let mut planet_rng = ChaCha8Rng::seed_from_u64(seed);
                planet.update(economy, &mut planet_rng);
            });
    }

    /// Verify that every lane is recorded from both ends with one distance.
    pub fn check_symmetry(&self) -> Result<()> {
        for (a, lanes) in self.adjacency.iter().enumerate() {
            let a = a as PlanetId;
            for (b, distance) in lanes {
                if *distance == 0 || self.distance(*b, a)? != *distance {
                    return Err(GameError::InvalidState(format!(
                        "lane {a} <-> {b} is asymmetric"
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_planet(&self, id: PlanetId) -> Result<()> {
        if (id as usize) < self.planets.len() {
            Ok(())
        } else {
            Err(GameError::UnknownPlanet(id))
        }
    }
}
