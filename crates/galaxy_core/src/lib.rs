//! # Galaxy Core
//!
//! Deterministic simulation core for a small trading galaxy.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No system randomness (one seeded [`rand_chacha::ChaCha8Rng`] per galaxy)
//! - No floating-point math (uses fixed-point where fractions appear)
//!
//! ## Crate Structure
//!
//! - [`world`] - Planets, lanes and presence sets
//! - [`travel`] - The per-entity travel state machine
//! - [`economy`] - Markets, production, consumption and pricing
//! - [`entity`] - Entities, ledgers and the entity arena
//! - [`behavior`] - What traders, pirates, police and the player do each turn
//! - [`route_planner`] - Bounded-lookahead trade route search
//! - [`scheduler`] - Resolving fight intents into disjoint engagements
//! - [`combat`] - Battle resolution
//! - [`simulation`] - The [`Galaxy`](simulation::Galaxy) tick loop and player API

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod behavior;
pub mod combat;
pub mod commodity;
pub mod config;
pub mod criminals;
pub mod economy;
pub mod entity;
pub mod error;
pub mod generation;
pub mod math;
pub mod route_planner;
pub mod scheduler;
pub mod ship;
pub mod simulation;
pub mod trade;
pub mod travel;
pub mod view;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{BattleChoice, BattleOutcome, BattleReport};
    pub use crate::commodity::{Commodity, CommodityTable};
    pub use crate::config::{EconomyConfig, GalaxyConfig, Rules, WorldGenConfig};
    pub use crate::criminals::CriminalRegistry;
    pub use crate::economy::{Industry, Market, Planet};
    pub use crate::entity::{Brain, Entity, EntityId, EntityStorage, Role};
    pub use crate::error::{GameError, Result};
    pub use crate::math::Fixed;
    pub use crate::route_planner::{plan_route, PlannerInput, TradePlan};
    pub use crate::ship::{Ship, ShipClass, ShipSpec};
    pub use crate::simulation::{Galaxy, TickReport};
    pub use crate::travel::TravelState;
    pub use crate::view::{LocationView, PlanetView, PlayerView, ShipView};
    pub use crate::world::{Location, PlanetId, WorldGraph};
}
