//! Tradeable commodities and per-commodity tables.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// A tradeable good.
///
/// The order of variants is the table order used by [`CommodityTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Commodity {
    /// Water.
    Water,
    /// Food.
    Food,
    /// Textiles.
    Textiles,
    /// Minerals.
    Minerals,
    /// Alcohol.
    Alcohol,
    /// Medicine.
    Medicine,
    /// Machinery.
    Machinery,
    /// Electronics.
    Electronics,
    /// Weapons.
    Weapons,
}

impl Commodity {
    /// Number of commodities.
    pub const COUNT: usize = 9;

    /// All commodities in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Water,
        Self::Food,
        Self::Textiles,
        Self::Minerals,
        Self::Alcohol,
        Self::Medicine,
        Self::Machinery,
        Self::Electronics,
        Self::Weapons,
    ];

    /// Position of this commodity in a [`CommodityTable`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Water => "Water",
            Self::Food => "Food",
            Self::Textiles => "Textiles",
            Self::Minerals => "Minerals",
            Self::Alcohol => "Alcohol",
            Self::Medicine => "Medicine",
            Self::Machinery => "Machinery",
            Self::Electronics => "Electronics",
            Self::Weapons => "Weapons",
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per commodity, indexed by [`Commodity`].
///
/// Serializes as a plain array in [`Commodity::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommodityTable<T>(pub [T; Commodity::COUNT]);

impl<T> CommodityTable<T> {
    /// Build a table from values in [`Commodity::ALL`] order.
    #[must_use]
    pub const fn new(values: [T; Commodity::COUNT]) -> Self {
        Self(values)
    }

    /// Build a table by calling `f` for each commodity.
    pub fn from_fn(mut f: impl FnMut(Commodity) -> T) -> Self {
        Self(std::array::from_fn(|i| f(Commodity::ALL[i])))
    }

    /// Iterate `(commodity, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Commodity, &T)> + '_ {
        Commodity::ALL.into_iter().zip(self.0.iter())
    }

    /// Iterate `(commodity, value)` pairs mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Commodity, &mut T)> + '_ {
        Commodity::ALL.into_iter().zip(self.0.iter_mut())
    }
}

impl<T: Copy> CommodityTable<T> {
    /// Table with every entry set to `value`.
    #[must_use]
    pub const fn filled(value: T) -> Self {
        Self([value; Commodity::COUNT])
    }

    /// Value for a commodity.
    #[must_use]
    pub fn get(&self, commodity: Commodity) -> T {
        self.0[commodity.index()]
    }

    /// Overwrite the value for a commodity.
    pub fn set(&mut self, commodity: Commodity, value: T) {
        self.0[commodity.index()] = value;
    }
}

impl CommodityTable<u32> {
    /// Sum of all entries.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.iter().fold(0u32, |acc, v| acc.saturating_add(*v))
    }

    /// Whether every entry is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|v| *v == 0)
    }
}

impl<T: Default> Default for CommodityTable<T> {
    fn default() -> Self {
        Self(std::array::from_fn(|_| T::default()))
    }
}

impl<T> Index<Commodity> for CommodityTable<T> {
    type Output = T;

    fn index(&self, commodity: Commodity) -> &T {
        &self.0[commodity.index()]
    }
}

impl<T> IndexMut<Commodity> for CommodityTable<T> {
    fn index_mut(&mut self, commodity: Commodity) -> &mut T {
        &mut self.0[commodity.index()]
    }
}
