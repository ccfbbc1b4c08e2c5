//! Error types for the galaxy simulation.
//!
//! Errors fall into two groups:
//! - Transactional failures (stock, funds, cargo, fuel, travel targets) are
//!   rejected before anything is mutated and the tick carries on.
//! - Invariant violations (unknown ids, missing edges, corrupted presence)
//!   abort the tick that hit them.

use thiserror::Error;

use crate::commodity::Commodity;
use crate::entity::EntityId;
use crate::world::PlanetId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all galaxy simulation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Travel requested to a planet that is not a neighbor, or to the
    /// planet the entity is already at, or while already in transit.
    #[error("Invalid destination: cannot travel from planet {from} to planet {to}")]
    InvalidDestination {
        /// Planet the entity is at.
        from: PlanetId,
        /// Requested destination.
        to: PlanetId,
    },

    /// Distance requested between two planets that share no lane.
    #[error("No lane between planet {a} and planet {b}")]
    InvalidEdge {
        /// First endpoint.
        a: PlanetId,
        /// Second endpoint.
        b: PlanetId,
    },

    /// Planet id out of range.
    #[error("Unknown planet: {0}")]
    UnknownPlanet(PlanetId),

    /// Entity id out of range.
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// A market does not hold enough of a commodity.
    #[error("Insufficient stock: requested {requested} {commodity}, planet has {available}")]
    InsufficientStock {
        /// Commodity requested.
        commodity: Commodity,
        /// Units requested.
        requested: u32,
        /// Units on hand.
        available: u32,
    },

    /// Not enough credits.
    #[error("Insufficient funds: need {required} credits, have {available}")]
    InsufficientFunds {
        /// Credits required.
        required: u32,
        /// Credits available.
        available: u32,
    },

    /// Not enough free cargo space in the hold.
    #[error("Insufficient cargo space: need {requested}, have {available} free")]
    InsufficientCargoSpace {
        /// Units that need to fit.
        requested: u32,
        /// Free units in the hold.
        available: u32,
    },

    /// Tried to sell more than the hold carries.
    #[error("Insufficient cargo: requested {requested} {commodity}, carrying {available}")]
    InsufficientCargo {
        /// Commodity requested.
        commodity: Commodity,
        /// Units requested.
        requested: u32,
        /// Units carried.
        available: u32,
    },

    /// Not enough fuel for the requested jump.
    #[error("Insufficient fuel: need {required}, have {available}")]
    InsufficientFuel {
        /// Fuel required.
        required: u32,
        /// Fuel in the tank.
        available: u32,
    },

    /// Attack target is dead, absent, or the attacker itself.
    #[error("Invalid target: {0}")]
    InvalidTarget(EntityId),

    /// Player action not allowed in the current state.
    #[error("Action not allowed: {0}")]
    InvalidAction(&'static str),

    /// Configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Configuration text failed to parse.
    #[error("Failed to parse configuration: {0}")]
    DataParseError(String),

    /// Invalid simulation state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Whether this error is a recoverable, rejected transaction rather than
    /// a broken invariant.
    #[must_use]
    pub const fn is_transactional(&self) -> bool {
        matches!(
            self,
            Self::InvalidDestination { .. }
                | Self::InsufficientStock { .. }
                | Self::InsufficientFunds { .. }
                | Self::InsufficientCargoSpace { .. }
                | Self::InsufficientCargo { .. }
                | Self::InsufficientFuel { .. }
                | Self::InvalidTarget(_)
                | Self::InvalidAction(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transactional_classification() {
        assert!(GameError::InsufficientFunds {
            required: 10,
            available: 5
        }
        .is_transactional());
        assert!(GameError::InvalidDestination { from: 1, to: 2 }.is_transactional());
        assert!(!GameError::UnknownPlanet(9).is_transactional());
        assert!(!GameError::InvalidState("presence".into()).is_transactional());
    }

    #[test]
    fn test_error_messages() {
        let err = GameError::InsufficientStock {
            commodity: Commodity::Food,
            requested: 40,
            available: 30,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock: requested 40 Food, planet has 30"
        );
        assert_eq!(
            GameError::InvalidEdge { a: 0, b: 3 }.to_string(),
            "No lane between planet 0 and planet 3"
        );
    }
}
