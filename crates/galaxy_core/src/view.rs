//! Read-only snapshots for presentation layers.
//!
//! Views copy what a front end needs to render (a planet's market, a ship's
//! gauges, the player's status, who else is around) so nothing outside the
//! core holds references into simulation state.

use serde::{Deserialize, Serialize};

use crate::combat::BattleChoice;
use crate::commodity::{Commodity, CommodityTable};
use crate::economy::Industry;
use crate::entity::{Entity, EntityId, Role};
use crate::error::Result;
use crate::ship::{Bounded, Ship, ShipClass};
use crate::world::{Location, PlanetId, WorldGraph};

/// One line of a market board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsQuote {
    /// Commodity.
    pub commodity: Commodity,
    /// Units on hand.
    pub stock: u32,
    /// Unit price.
    pub price: u32,
}

/// A lane out of a planet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborView {
    /// Neighbor id.
    pub id: PlanetId,
    /// Neighbor name.
    pub name: String,
    /// Ticks of travel.
    pub distance: u32,
}

/// A planet with its market and lanes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetView {
    /// Planet id.
    pub id: PlanetId,
    /// Planet name.
    pub name: String,
    /// Industry.
    pub industry: Industry,
    /// Market board in commodity order.
    pub goods: Vec<GoodsQuote>,
    /// Lanes, ascending by neighbor id.
    pub neighbors: Vec<NeighborView>,
}

impl PlanetView {
    /// Snapshot a planet.
    pub fn build(world: &WorldGraph, id: PlanetId) -> Result<Self> {
        let planet = world.planet(id)?;
        let market = planet.market();
        let goods = Commodity::ALL
            .into_iter()
            .map(|commodity| GoodsQuote {
                commodity,
                stock: market.stock(commodity),
                price: market.price(commodity),
            })
            .collect();
        let neighbors = world
            .lanes_from(id)?
            .iter()
            .map(|(&neighbor, &distance)| {
                Ok(NeighborView {
                    id: neighbor,
                    name: world.planet(neighbor)?.name().to_string(),
                    distance,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id,
            name: planet.name().to_string(),
            industry: planet.industry(),
            goods,
            neighbors,
        })
    }
}

/// A ship's gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipView {
    /// Hull class.
    pub class: ShipClass,
    /// Hull points.
    pub hull: Bounded,
    /// Shield points.
    pub shields: Bounded,
    /// Fuel units.
    pub fuel: Bounded,
    /// Cargo capacity.
    pub cargo_capacity: u32,
    /// Damage rating.
    pub damage: u32,
    /// Maneuver rating.
    pub maneuver: u32,
    /// Escape chance in percent.
    pub flee_chance: u32,
}

impl From<&Ship> for ShipView {
    fn from(ship: &Ship) -> Self {
        Self {
            class: ship.class(),
            hull: ship.hull(),
            shields: ship.shields(),
            fuel: ship.fuel(),
            cargo_capacity: ship.cargo_capacity(),
            damage: ship.damage(),
            maneuver: ship.maneuver(),
            flee_chance: ship.flee_chance(),
        }
    }
}

/// The player's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Player entity id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Credits.
    pub credits: u32,
    /// Cargo carried.
    pub cargo: CommodityTable<u32>,
    /// Ship gauges.
    pub ship: ShipView,
    /// Current (or departure) planet.
    pub location: PlanetId,
    /// Destination while traveling.
    pub destination: Option<PlanetId>,
    /// Ticks until arrival.
    pub remaining: u32,
    /// Whether police will hunt the player.
    pub criminal: bool,
    /// Battle stance.
    pub stance: BattleChoice,
    /// Whether the ship is intact.
    pub alive: bool,
}

/// Someone sharing a presence set with the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactView {
    /// Entity id.
    pub id: EntityId,
    /// Role.
    pub role: Role,
    /// Ship class.
    pub class: ShipClass,
    /// Whether the ship is intact.
    pub alive: bool,
    /// Whether the entity is flagged.
    pub criminal: bool,
}

impl ContactView {
    /// Snapshot a contact.
    #[must_use]
    pub fn of(entity: &Entity, criminal: bool) -> Self {
        Self {
            id: entity.id(),
            role: entity.role(),
            class: entity.ship().class(),
            alive: entity.is_alive(),
            criminal,
        }
    }
}

/// Who shares a presence set with the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationView {
    /// The viewer's presence set.
    pub location: Location,
    /// Everyone else there, ascending by id.
    pub contacts: Vec<ContactView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EconomyConfig;
    use crate::economy::Planet;
    use crate::ship::ShipSpec;

    #[test]
    fn test_planet_view() {
        let economy = EconomyConfig::default();
        let planets = vec![
            Planet::founded(0, "Vega".into(), Industry::Agricultural, &economy),
            Planet::founded(1, "Rigel".into(), Industry::Industrial, &economy),
        ];
        let mut world = WorldGraph::new(planets).expect("world");
        world.connect(0, 1, 4).expect("connect");

        let view = PlanetView::build(&world, 0).expect("view");
        assert_eq!(view.name, "Vega");
        assert_eq!(view.goods.len(), Commodity::COUNT);
        assert_eq!(view.goods[1].commodity, Commodity::Food);
        assert_eq!(view.goods[1].price, 50);
        assert_eq!(
            view.neighbors,
            vec![NeighborView {
                id: 1,
                name: "Rigel".into(),
                distance: 4
            }]
        );
        assert!(PlanetView::build(&world, 2).is_err());
    }

    #[test]
    fn test_ship_view() {
        let ship = Ship::new(&ShipSpec::new(ShipClass::Gnat, 60, 20, 15, 5, 8, 70, 2000));
        let view = ShipView::from(&ship);
        assert_eq!(view.fuel.max(), 15);
        assert_eq!(view.flee_chance, ship.flee_chance());
    }
}
