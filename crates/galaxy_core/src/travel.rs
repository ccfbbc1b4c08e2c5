//! Per-entity travel state machine.
//!
//! ```text
//! AtRest{a} --begin_travel(b)--> Traveling{a, b, d(a,b)}
//! Traveling{.., r} --advance--> Traveling{.., r-1}      (r > 1)
//! Traveling{.., b, 1} --advance--> AtRest{b}
//! ```
//!
//! Every transition moves the owner's presence in the [`WorldGraph`] along
//! with it. Travel cannot be cancelled once begun.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::error::{GameError, Result};
use crate::world::{Lane, Location, PlanetId, WorldGraph};

/// Where an entity is and where it is going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelState {
    /// Parked on a planet.
    AtRest {
        /// Planet the entity is on.
        location: PlanetId,
    },
    /// Flying along a lane.
    Traveling {
        /// Planet of departure.
        from: PlanetId,
        /// Destination planet.
        to: PlanetId,
        /// Ticks until arrival.
        remaining: u32,
    },
}

/// Result of one [`TravelState::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelProgress {
    /// Not traveling; nothing happened.
    Idle,
    /// Still in transit.
    EnRoute {
        /// Ticks until arrival.
        remaining: u32,
    },
    /// Landed on this planet.
    Arrived(PlanetId),
}

impl TravelState {
    /// At rest on a planet.
    #[must_use]
    pub const fn at_rest(location: PlanetId) -> Self {
        Self::AtRest { location }
    }

    /// Current planet: the resting planet, or the departure planet in transit.
    #[must_use]
    pub const fn location(&self) -> PlanetId {
        match *self {
            Self::AtRest { location } => location,
            Self::Traveling { from, .. } => from,
        }
    }

    /// Destination while in transit.
    #[must_use]
    pub const fn destination(&self) -> Option<PlanetId> {
        match *self {
            Self::AtRest { .. } => None,
            Self::Traveling { to, .. } => Some(to),
        }
    }

    /// Ticks until arrival, zero at rest.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        match *self {
            Self::AtRest { .. } => 0,
            Self::Traveling { remaining, .. } => remaining,
        }
    }

    /// Whether in transit.
    #[must_use]
    pub const fn is_traveling(&self) -> bool {
        matches!(self, Self::Traveling { .. })
    }

    /// The presence set this state corresponds to.
    #[must_use]
    pub const fn presence(&self) -> Location {
        match *self {
            Self::AtRest { location } => Location::Planet(location),
            Self::Traveling { from, to, .. } => Location::Lane(Lane::between(from, to)),
        }
    }

    /// Register the owner in the presence set matching this state.
    pub(crate) fn enter_world(&self, world: &mut WorldGraph, owner: EntityId) -> Result<()> {
        world.place(owner, self.presence())
    }

    /// Remove the owner from the presence set matching this state.
    pub(crate) fn leave_world(&self, world: &mut WorldGraph, owner: EntityId) -> bool {
        world.unplace(owner, self.presence())
    }

    /// Depart for a neighboring planet.
    ///
    /// Fails with [`GameError::InvalidDestination`] when already traveling, when
    /// `destination` is the current planet, or when no lane leads there. Nothing
    /// is changed on failure.
    pub fn begin_travel(
        &mut self,
        world: &mut WorldGraph,
        owner: EntityId,
        destination: PlanetId,
    ) -> Result<()> {
        let location = match *self {
            Self::AtRest { location } => location,
            Self::Traveling { from, .. } => {
                return Err(GameError::InvalidDestination {
                    from,
                    to: destination,
                })
            }
        };
        if destination == location || !world.is_neighbor(location, destination) {
            return Err(GameError::InvalidDestination {
                from: location,
                to: destination,
            });
        }

        let remaining = world.distance(location, destination)?;
        let next = Self::Traveling {
            from: location,
            to: destination,
            remaining,
        };
        world.move_presence(owner, self.presence(), next.presence())?;
        *self = next;
        Ok(())
    }

    /// Spend one tick of travel, landing when the countdown runs out.
    pub fn advance(&mut self, world: &mut WorldGraph, owner: EntityId) -> Result<TravelProgress> {
        match *self {
            Self::AtRest { .. } => Ok(TravelProgress::Idle),
            Self::Traveling {
                from,
                to,
                remaining,
            } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.complete(world, owner, to)?;
                    Ok(TravelProgress::Arrived(to))
                } else {
                    *self = Self::Traveling {
                        from,
                        to,
                        remaining,
                    };
                    Ok(TravelProgress::EnRoute { remaining })
                }
            }
        }
    }

    fn complete(&mut self, world: &mut WorldGraph, owner: EntityId, to: PlanetId) -> Result<()> {
        let landed = Self::AtRest { location: to };
        world.move_presence(owner, self.presence(), landed.presence())?;
        *self = landed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EconomyConfig;
    use crate::economy::{Industry, Planet};
    use proptest::prelude::*;

    fn line_world(distances: &[u32]) -> WorldGraph {
        let economy = EconomyConfig::default();
        let count = distances.len() as u32 + 1;
        let planets = (0..count)
            .map(|id| Planet::founded(id, format!("P{id}"), Industry::Industrial, &economy))
            .collect();
        let mut world = WorldGraph::new(planets).expect("world");
        for (i, distance) in distances.iter().enumerate() {
            let i = i as PlanetId;
            world.connect(i, i + 1, *distance).expect("connect");
        }
        world
    }

    #[test]
    fn test_full_trip() {
        let mut world = line_world(&[3]);
        let mut travel = TravelState::at_rest(0);
        travel.enter_world(&mut world, 1).expect("enter");

        travel.begin_travel(&mut world, 1, 1).expect("depart");
        let lane = Location::Lane(Lane::between(0, 1));
        assert_eq!(travel.remaining(), 3);
        assert_eq!(travel.destination(), Some(1));
        assert_eq!(world.locate(1), vec![lane]);

        assert_eq!(
            travel.advance(&mut world, 1),
            Ok(TravelProgress::EnRoute { remaining: 2 })
        );
        assert_eq!(
            travel.advance(&mut world, 1),
            Ok(TravelProgress::EnRoute { remaining: 1 })
        );
        assert_eq!(world.locate(1), vec![lane]);

        assert_eq!(travel.advance(&mut world, 1), Ok(TravelProgress::Arrived(1)));
        assert_eq!(travel, TravelState::at_rest(1));
        assert_eq!(world.locate(1), vec![Location::Planet(1)]);

        assert_eq!(travel.advance(&mut world, 1), Ok(TravelProgress::Idle));
    }

    #[test]
    fn test_invalid_destinations() {
        let mut world = line_world(&[3, 2]);
        let mut travel = TravelState::at_rest(0);
        travel.enter_world(&mut world, 4).expect("enter");

        assert_eq!(
            travel.begin_travel(&mut world, 4, 0),
            Err(GameError::InvalidDestination { from: 0, to: 0 })
        );
        assert_eq!(
            travel.begin_travel(&mut world, 4, 2),
            Err(GameError::InvalidDestination { from: 0, to: 2 })
        );
        assert_eq!(travel, TravelState::at_rest(0));
        assert_eq!(world.locate(4), vec![Location::Planet(0)]);

        travel.begin_travel(&mut world, 4, 1).expect("depart");
        assert_eq!(
            travel.begin_travel(&mut world, 4, 1),
            Err(GameError::InvalidDestination { from: 0, to: 1 })
        );
        assert_eq!(travel.remaining(), 3);
    }

    #[test]
    fn test_location_while_traveling_is_departure() {
        let mut world = line_world(&[2]);
        let mut travel = TravelState::at_rest(1);
        travel.enter_world(&mut world, 0).expect("enter");
        travel.begin_travel(&mut world, 0, 0).expect("depart");

        assert_eq!(travel.location(), 1);
        assert!(travel.is_traveling());
    }

    proptest! {
        #[test]
        fn prop_trip_takes_exactly_distance_ticks(distance in 1u32..12) {
            let mut world = line_world(&[distance]);
            let mut travel = TravelState::at_rest(0);
            travel.enter_world(&mut world, 9).expect("enter");
            travel.begin_travel(&mut world, 9, 1).expect("depart");

            for _ in 1..distance {
                let progress = travel.advance(&mut world, 9).expect("advance");
                prop_assert!(
                    matches!(progress, TravelProgress::EnRoute { .. }),
                    "arrived early"
                );
                prop_assert_eq!(world.locate(9).len(), 1);
            }
            prop_assert_eq!(travel.advance(&mut world, 9), Ok(TravelProgress::Arrived(1)));
            prop_assert_eq!(world.locate(9), vec![Location::Planet(1)]);
        }
    }
}
