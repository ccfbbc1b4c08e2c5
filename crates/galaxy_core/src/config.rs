//! Galaxy configuration.
//!
//! Every static number the simulation consults lives here: economy tables,
//! ship classes, starting loadouts per role and the tuning rules. A config is
//! built once (from [`Default`] or RON text) and passed explicitly to the
//! generator and the [`Galaxy`](crate::simulation::Galaxy).

use serde::{Deserialize, Serialize};

use crate::commodity::CommodityTable;
use crate::economy::Industry;
use crate::entity::Role;
use crate::error::{GameError, Result};
use crate::ship::{ShipClass, ShipSpec};

/// Complete configuration for a galaxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
    /// World generation parameters.
    pub world: WorldGenConfig,
    /// Market tables.
    pub economy: EconomyConfig,
    /// Ship class statistics.
    pub ships: Vec<ShipSpec>,
    /// Starting loadout per role.
    pub roles: RoleTable,
    /// Tuning constants.
    pub rules: Rules,
    /// Names drawn for generated planets.
    pub planet_names: Vec<String>,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            world: WorldGenConfig::default(),
            economy: EconomyConfig::default(),
            ships: default_ships(),
            roles: RoleTable::default(),
            rules: Rules::default(),
            planet_names: DEFAULT_PLANET_NAMES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }
}

impl GalaxyConfig {
    /// Parse a configuration from RON text and validate it.
    ///
    /// Missing sections fall back to their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self =
            ron::from_str(text).map_err(|e| GameError::DataParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the number of generated planets.
    #[must_use]
    pub fn with_planet_count(mut self, count: u32) -> Self {
        self.world.planet_count = count;
        self
    }

    /// Enable or disable the player entity.
    #[must_use]
    pub fn with_player(mut self, spawn_player: bool) -> Self {
        self.world.spawn_player = spawn_player;
        self
    }

    /// Statistics for a ship class.
    pub fn ship_spec(&self, class: ShipClass) -> Result<&ShipSpec> {
        self.ships
            .iter()
            .find(|spec| spec.class == class)
            .ok_or_else(|| GameError::ConfigError(format!("no ship spec for {class:?}")))
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        if world.planet_count < 2 {
            return Err(GameError::ConfigError(
                "a galaxy needs at least two planets".into(),
            ));
        }
        if world.min_distance == 0 || world.min_distance > world.max_distance {
            return Err(GameError::ConfigError(format!(
                "lane distance range {}..={} is invalid",
                world.min_distance, world.max_distance
            )));
        }
        if world.min_neighbors > world.max_neighbors {
            return Err(GameError::ConfigError(format!(
                "neighbor range {}..{} is invalid",
                world.min_neighbors, world.max_neighbors
            )));
        }
        if world.pirate_spacing == 0 {
            return Err(GameError::ConfigError(
                "pirate spacing must be positive".into(),
            ));
        }
        if self.economy.surplus_divisor == 0 {
            return Err(GameError::ConfigError(
                "surplus divisor must be positive".into(),
            ));
        }
        if self.rules.big_tick_interval == 0 {
            return Err(GameError::ConfigError(
                "big tick interval must be positive".into(),
            ));
        }
        for (i, spec) in self.ships.iter().enumerate() {
            if spec.hull == 0 {
                return Err(GameError::ConfigError(format!(
                    "{:?} has no hull",
                    spec.class
                )));
            }
            if self.ships[..i].iter().any(|other| other.class == spec.class) {
                return Err(GameError::ConfigError(format!(
                    "{:?} is defined twice",
                    spec.class
                )));
            }
        }
        for role in Role::ALL {
            self.ship_spec(self.roles.get(role).ship)?;
        }
        Ok(())
    }
}

/// World generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Number of planets.
    pub planet_count: u32,
    /// Shortest lane, in ticks.
    pub min_distance: u32,
    /// Longest lane, in ticks (inclusive).
    pub max_distance: u32,
    /// Lower bound for the extra-lane roll.
    pub min_neighbors: u32,
    /// Upper bound (exclusive) for the extra-lane roll.
    pub max_neighbors: u32,
    /// A pirate spawns on every planet whose index is a multiple of this.
    pub pirate_spacing: u32,
    /// Whether a player entity is spawned.
    pub spawn_player: bool,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            planet_count: 20,
            min_distance: 2,
            max_distance: 6,
            min_neighbors: 2,
            max_neighbors: 5,
            pirate_spacing: 5,
            spawn_player: true,
        }
    }
}

/// Production and consumption of one industry, per big tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryProfile {
    /// Units added to stock.
    pub production: CommodityTable<u32>,
    /// Units removed from stock (floored at zero).
    pub consumption: CommodityTable<u32>,
}

/// Market tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Base price per commodity.
    pub base_prices: CommodityTable<u32>,
    /// Upper bound (inclusive) of the random price jitter.
    pub price_jitter: u32,
    /// Prices never drop below this.
    pub price_floor: u32,
    /// Every `surplus_divisor` units on hand knock one credit off the price.
    pub surplus_divisor: u32,
    /// Initial stock is this multiple of the industry's consumption.
    pub initial_stock_multiplier: u32,
    /// Agricultural worlds.
    pub agricultural: IndustryProfile,
    /// Industrial worlds.
    pub industrial: IndustryProfile,
    /// Technological worlds.
    pub technological: IndustryProfile,
}

impl EconomyConfig {
    /// Profile for an industry.
    #[must_use]
    pub const fn profile(&self, industry: Industry) -> &IndustryProfile {
        match industry {
            Industry::Agricultural => &self.agricultural,
            Industry::Industrial => &self.industrial,
            Industry::Technological => &self.technological,
        }
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_prices: CommodityTable::new([30, 50, 60, 80, 90, 150, 180, 250, 300]),
            price_jitter: 20,
            price_floor: 20,
            surplus_divisor: 3,
            initial_stock_multiplier: 3,
            agricultural: IndustryProfile {
                production: CommodityTable::new([20, 25, 10, 0, 8, 2, 0, 0, 0]),
                consumption: CommodityTable::new([10, 8, 4, 4, 3, 4, 6, 3, 1]),
            },
            industrial: IndustryProfile {
                production: CommodityTable::new([4, 2, 12, 20, 4, 3, 15, 4, 5]),
                consumption: CommodityTable::new([12, 14, 5, 10, 5, 4, 4, 5, 2]),
            },
            technological: IndustryProfile {
                production: CommodityTable::new([2, 0, 3, 0, 2, 10, 6, 15, 8]),
                consumption: CommodityTable::new([10, 12, 6, 12, 4, 3, 8, 4, 3]),
            },
        }
    }
}

/// Starting loadout for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    /// Ship class the role starts with.
    pub ship: ShipClass,
    /// Starting credits.
    pub credits: u32,
}

/// Starting loadouts for every role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleTable {
    /// Traders.
    pub trader: RoleSpec,
    /// Pirates.
    pub pirate: RoleSpec,
    /// Police.
    pub police: RoleSpec,
    /// The player.
    pub player: RoleSpec,
}

impl RoleTable {
    /// Loadout for a role.
    #[must_use]
    pub const fn get(&self, role: Role) -> RoleSpec {
        match role {
            Role::Trader => self.trader,
            Role::Pirate => self.pirate,
            Role::Police => self.police,
            Role::Player => self.player,
        }
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self {
            trader: RoleSpec {
                ship: ShipClass::Firefly,
                credits: 1500,
            },
            pirate: RoleSpec {
                ship: ShipClass::Mosquito,
                credits: 300,
            },
            police: RoleSpec {
                ship: ShipClass::Hornet,
                credits: 1000,
            },
            player: RoleSpec {
                ship: ShipClass::Flea,
                credits: 1000,
            },
        }
    }
}

/// Tuning constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Credits per unit of fuel.
    pub fuel_cost: u32,
    /// Credits per hull point repaired.
    pub repair_cost: u32,
    /// Ticks between maintenance passes.
    pub big_tick_interval: u64,
    /// Ticks an entity stays flagged after an attack.
    pub criminal_timeout: i32,
    /// Minimum fuel before a trader or pirate departs.
    pub fuel_reserve: u32,
    /// Credits granted when maintenance has nothing to buy or cannot afford it.
    pub idle_stipend: u32,
    /// Most units of one commodity a trader buys per route.
    pub max_units_per_commodity: u32,
    /// Hops explored by the route planner.
    pub search_depth: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            fuel_cost: 3,
            repair_cost: 5,
            big_tick_interval: 14,
            criminal_timeout: crate::criminals::DEFAULT_TIMEOUT,
            fuel_reserve: 13,
            idle_stipend: 50,
            max_units_per_commodity: 10,
            search_depth: 3,
        }
    }
}

fn default_ships() -> Vec<ShipSpec> {
    vec![
        ShipSpec::new(ShipClass::Gnat, 60, 20, 15, 5, 8, 70, 2000),
        ShipSpec::new(ShipClass::Flea, 80, 30, 25, 6, 10, 60, 4000),
        ShipSpec::new(ShipClass::Firefly, 120, 50, 40, 7, 16, 50, 9000),
        ShipSpec::new(ShipClass::Mosquito, 100, 60, 20, 8, 24, 75, 12000),
        ShipSpec::new(ShipClass::Hornet, 200, 100, 30, 8, 30, 45, 25000),
        ShipSpec::new(ShipClass::Wasp, 260, 140, 60, 9, 34, 35, 40000),
    ]
}

const DEFAULT_PLANET_NAMES: &[&str] = &[
    "Achenar", "Alioth", "Arcturus", "Bellatrix", "Betelgeuse", "Canopus", "Capella", "Deneb",
    "Diphda", "Elnath", "Enif", "Fomalhaut", "Gacrux", "Hadar", "Izar", "Kochab", "Lesath",
    "Markab", "Menkar", "Mirach", "Mizar", "Nunki", "Peacock", "Polaris", "Procyon", "Rigel",
    "Sabik", "Schedar", "Shaula", "Sirius", "Spica", "Suhail", "Vega", "Wezen", "Zosma",
];
