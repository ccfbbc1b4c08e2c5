//! Planetary markets.
//!
//! Every planet runs a [`Market`] holding stock and a unit price per
//! commodity. Once per big tick a planet:
//! - produces goods according to its [`Industry`]
//! - consumes goods (stock never goes negative)
//! - reprices every commodity from its base price, a fresh random jitter and
//!   the local surplus
//!
//! Surplus depresses prices and scarcity raises them. The resulting price
//! gaps between planets are what traders chase.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::commodity::{Commodity, CommodityTable};
use crate::config::{EconomyConfig, IndustryProfile};
use crate::error::{GameError, Result};
use crate::world::PlanetId;

/// What a planet's economy is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Industry {
    /// Farming worlds.
    Agricultural,
    /// Mining and manufacturing worlds.
    Industrial,
    /// High-tech worlds.
    Technological,
}

impl Industry {
    /// All industries.
    pub const ALL: [Self; 3] = [Self::Agricultural, Self::Industrial, Self::Technological];

    /// Industry for a d100 roll (`0..=100`).
    #[must_use]
    pub const fn from_roll(roll: u32) -> Self {
        if roll <= 50 {
            Self::Agricultural
        } else if roll <= 80 {
            Self::Industrial
        } else {
            Self::Technological
        }
    }
}

/// Stock and prices of one planet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Market {
    stock: CommodityTable<u32>,
    prices: CommodityTable<u32>,
}

impl Market {
    /// Create a market.
    #[must_use]
    pub const fn new(stock: CommodityTable<u32>, prices: CommodityTable<u32>) -> Self {
        Self { stock, prices }
    }

    /// Units on hand.
    #[must_use]
    pub fn stock(&self, commodity: Commodity) -> u32 {
        self.stock[commodity]
    }

    /// Current unit price.
    #[must_use]
    pub fn price(&self, commodity: Commodity) -> u32 {
        self.prices[commodity]
    }

    /// All stock levels.
    #[must_use]
    pub const fn stock_table(&self) -> &CommodityTable<u32> {
        &self.stock
    }

    /// All prices.
    #[must_use]
    pub const fn price_table(&self) -> &CommodityTable<u32> {
        &self.prices
    }

    /// What `amount` units cost at the current price.
    #[must_use]
    pub fn quote(&self, commodity: Commodity, amount: u32) -> u32 {
        amount.saturating_mul(self.prices[commodity])
    }

    /// Take `amount` units out of stock, returning their cost.
    pub fn buy(&mut self, commodity: Commodity, amount: u32) -> Result<u32> {
        let available = self.stock[commodity];
        if amount > available {
            return Err(GameError::InsufficientStock {
                commodity,
                requested: amount,
                available,
            });
        }
        self.stock[commodity] = available - amount;
        Ok(self.quote(commodity, amount))
    }

    /// Put `amount` units into stock, returning their value.
    ///
    /// Stock has no upper bound.
    pub fn sell(&mut self, commodity: Commodity, amount: u32) -> u32 {
        self.stock[commodity] = self.stock[commodity].saturating_add(amount);
        self.quote(commodity, amount)
    }

    fn produce(&mut self, profile: &IndustryProfile) {
        for (commodity, stock) in self.stock.iter_mut() {
            *stock = stock.saturating_add(profile.production[commodity]);
        }
    }

    fn consume(&mut self, profile: &IndustryProfile) {
        for (commodity, stock) in self.stock.iter_mut() {
            *stock = stock.saturating_sub(profile.consumption[commodity]);
        }
    }

    fn reprice<R: Rng + ?Sized>(&mut self, economy: &EconomyConfig, rng: &mut R) {
        for commodity in Commodity::ALL {
            let jitter = rng.gen_range(0..=economy.price_jitter);
            self.prices[commodity] = compute_price(
                economy.base_prices[commodity],
                jitter,
                self.stock[commodity],
                economy,
            );
        }
    }
}

/// `max(floor, base + jitter - stock / divisor)`.
#[must_use]
pub fn compute_price(base: u32, jitter: u32, stock: u32, economy: &EconomyConfig) -> u32 {
    let divisor = economy.surplus_divisor.max(1);
    let raw = i64::from(base) + i64::from(jitter) - i64::from(stock / divisor);
    let floored = raw.max(i64::from(economy.price_floor));
    u32::try_from(floored).unwrap_or(u32::MAX)
}

/// A planet: identity plus its market.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Planet {
    id: PlanetId,
    name: String,
    industry: Industry,
    market: Market,
}

impl Planet {
    /// Create a planet.
    #[must_use]
    pub const fn new(id: PlanetId, name: String, industry: Industry, market: Market) -> Self {
        Self {
            id,
            name,
            industry,
            market,
        }
    }

    /// A planet stocked with `multiplier` big ticks of its own consumption,
    /// selling at base prices.
    #[must_use]
    pub fn founded(id: PlanetId, name: String, industry: Industry, economy: &EconomyConfig) -> Self {
        let profile = economy.profile(industry);
        let stock = CommodityTable::from_fn(|c| {
            profile.consumption[c].saturating_mul(economy.initial_stock_multiplier)
        });
        Self::new(id, name, industry, Market::new(stock, economy.base_prices))
    }

    /// Planet id.
    #[must_use]
    pub const fn id(&self) -> PlanetId {
        self.id
    }

    /// Planet name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Industry.
    #[must_use]
    pub const fn industry(&self) -> Industry {
        self.industry
    }

    /// The local market.
    #[must_use]
    pub const fn market(&self) -> &Market {
        &self.market
    }

    /// The local market, mutably.
    pub fn market_mut(&mut self) -> &mut Market {
        &mut self.market
    }

    /// Run one economic cycle: production, consumption, then pricing.
    pub fn update<R: Rng + ?Sized>(&mut self, economy: &EconomyConfig, rng: &mut R) {
        let profile = economy.profile(self.industry);
        self.market.produce(profile);
        self.market.consume(profile);
        self.market.reprice(economy, rng);
    }
}
