//! Trade route planning.
//!
//! A depth-bounded depth-first search from the trader's planet. Every planet
//! reached (other than the start) is rated by the arbitrage it offers against
//! the local market, minus the fuel burned getting there:
//!
//! 1. Collect positive price differentials `target - origin`. Equal
//!    differentials are kept apart by probing successively lower keys.
//! 2. Fill the hold greedily from the largest differential down, capping each
//!    commodity at `max_units` and at what the origin stocks and the trader
//!    can afford.
//! 3. `rating = sum(units * differential) - distance * fuel_cost`.
//!
//! The best plan across every branch wins; ties keep the first one found.
//! A planet is never visited twice in one search.

use std::collections::{BTreeMap, BTreeSet};

use crate::commodity::{Commodity, CommodityTable};
use crate::economy::Market;
use crate::error::Result;
use crate::world::{PlanetId, WorldGraph};

/// What the planner needs to know about the trader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerInput {
    /// Planet the search starts from.
    pub origin: PlanetId,
    /// Credits available for purchases.
    pub credits: u32,
    /// Free units in the hold.
    pub free_cargo: u32,
    /// Credits of fuel burned per tick of travel.
    pub fuel_cost: u32,
    /// Most units of one commodity to buy.
    pub max_units: u32,
    /// Most hops to explore.
    pub max_depth: u32,
}

/// Rating of one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    /// Net score.
    pub value: i64,
    /// Units to buy at the origin.
    pub purchases: CommodityTable<u32>,
}

/// The winning route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradePlan {
    /// Hops to fly, excluding the origin. Never empty.
    pub path: Vec<PlanetId>,
    /// Total ticks of travel.
    pub distance: u32,
    /// Net score.
    pub rating: i64,
    /// Units to buy at the origin before leaving.
    pub purchases: CommodityTable<u32>,
}

impl TradePlan {
    /// Whether the route is worth flying.
    #[must_use]
    pub const fn is_profitable(&self) -> bool {
        self.rating > 0
    }

    /// Final planet of the route.
    #[must_use]
    pub fn destination(&self) -> Option<PlanetId> {
        self.path.last().copied()
    }
}

/// Find the best-rated route from `input.origin`.
///
/// Returns `None` when no other planet is reachable.
pub fn plan_route(world: &WorldGraph, input: &PlannerInput) -> Result<Option<TradePlan>> {
    let origin = world.planet(input.origin)?.market();
    let mut search = Search {
        world,
        input,
        origin,
        visited: BTreeSet::new(),
        best: None,
    };
    search.explore(vec![input.origin], 0, 0)?;
    Ok(search.best)
}

/// Rate selling at `target` what can be bought at `origin`.
#[must_use]
pub fn rate_planet(origin: &Market, target: &Market, distance: u32, input: &PlannerInput) -> Rating {
    let mut differentials: BTreeMap<i64, Commodity> = BTreeMap::new();
    for commodity in Commodity::ALL {
        let mut diff = i64::from(target.price(commodity)) - i64::from(origin.price(commodity));
        while differentials.contains_key(&diff) {
            diff -= 1;
        }
        if diff > 0 {
            differentials.insert(diff, commodity);
        }
    }

    let mut purchases = CommodityTable::default();
    let mut value = -(i64::from(distance) * i64::from(input.fuel_cost));
    let mut credits = input.credits;
    let mut free = input.free_cargo;

    for (&diff, &commodity) in differentials.iter().rev() {
        let price = origin.price(commodity);
        let affordable = credits.checked_div(price).unwrap_or(u32::MAX);
        let buyable = input
            .max_units
            .min(origin.stock(commodity))
            .min(affordable);

        if free <= buyable {
            purchases[commodity] = free;
            value += i64::from(free) * diff;
            break;
        }

        purchases[commodity] = buyable;
        value += i64::from(buyable) * diff;
        free -= buyable;
        credits -= buyable * price;
    }

    Rating { value, purchases }
}

struct Search<'a> {
    world: &'a WorldGraph,
    input: &'a PlannerInput,
    origin: &'a Market,
    visited: BTreeSet<PlanetId>,
    best: Option<TradePlan>,
}

impl Search<'_> {
    fn explore(&mut self, path: Vec<PlanetId>, travelled: u32, depth: u32) -> Result<()> {
        let Some(&current) = path.last() else {
            return Ok(());
        };
        self.visited.insert(current);

        let world = self.world;
        if current != self.input.origin {
            let target = world.planet(current)?.market();
            let rating = rate_planet(self.origin, target, travelled, self.input);
            let improves = self
                .best
                .as_ref()
                .map_or(true, |best| rating.value > best.rating);
            if improves {
                self.best = Some(TradePlan {
                    path: path[1..].to_vec(),
                    distance: travelled,
                    rating: rating.value,
                    purchases: rating.purchases,
                });
            }
        }

        if depth >= self.input.max_depth {
            return Ok(());
        }

        for (&neighbor, &distance) in world.lanes_from(current)? {
            if self.visited.contains(&neighbor) {
                continue;
            }
            let mut next = path.clone();
            next.push(neighbor);
            self.explore(next, travelled + distance, depth + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::{Industry, Planet};

    fn market(stock: u32, price: u32, overrides: &[(Commodity, u32)]) -> Market {
        let mut prices = CommodityTable::filled(price);
        for (commodity, p) in overrides {
            prices[*commodity] = *p;
        }
        Market::new(CommodityTable::filled(stock), prices)
    }

    fn world_of(markets: Vec<Market>, lanes: &[(PlanetId, PlanetId, u32)]) -> WorldGraph {
        let planets = markets
            .into_iter()
            .enumerate()
            .map(|(id, m)| Planet::new(id as PlanetId, format!("P{id}"), Industry::Industrial, m))
            .collect();
        let mut world = WorldGraph::new(planets).expect("world");
        for (a, b, d) in lanes {
            world.connect(*a, *b, *d).expect("connect");
        }
        world
    }

    fn input(credits: u32, free_cargo: u32) -> PlannerInput {
        PlannerInput {
            origin: 0,
            credits,
            free_cargo,
            fuel_cost: 3,
            max_units: 10,
            max_depth: 3,
        }
    }

    #[test]
    fn test_two_planet_route() {
        let world = world_of(
            vec![
                market(30, 50, &[]),
                market(30, 50, &[(Commodity::Food, 80)]),
            ],
            &[(0, 1, 4)],
        );

        let plan = plan_route(&world, &input(1000, 40))
            .expect("search")
            .expect("plan");

        assert_eq!(plan.path, vec![1]);
        assert_eq!(plan.purchases[Commodity::Food], 10);
        assert_eq!(plan.purchases.total(), 10);
        assert_eq!(plan.rating, 10 * 30 - 4 * 3);
        assert!(plan.is_profitable());
    }

    #[test]
    fn test_purchase_limited_by_credits_and_stock() {
        let origin = market(30, 50, &[]);
        let target = market(30, 50, &[(Commodity::Food, 80)]);

        let poor = rate_planet(&origin, &target, 1, &input(120, 40));
        assert_eq!(poor.purchases[Commodity::Food], 2);

        let scarce = market(4, 50, &[]);
        let rating = rate_planet(&scarce, &target, 1, &input(1000, 40));
        assert_eq!(rating.purchases[Commodity::Food], 4);
    }

    #[test]
    fn test_hold_fills_best_first() {
        let origin = market(30, 50, &[]);
        let target = market(
            30,
            50,
            &[(Commodity::Food, 80), (Commodity::Weapons, 150)],
        );

        let rating = rate_planet(&origin, &target, 0, &input(10_000, 14));
        assert_eq!(rating.purchases[Commodity::Weapons], 10);
        assert_eq!(rating.purchases[Commodity::Food], 4);
        assert_eq!(rating.value, 10 * 100 + 4 * 30);
    }

    #[test]
    fn test_equal_differentials_are_both_kept() {
        let origin = market(30, 50, &[]);
        let target = market(30, 50, &[(Commodity::Water, 70), (Commodity::Food, 70)]);

        let rating = rate_planet(&origin, &target, 0, &input(10_000, 40));
        assert_eq!(rating.purchases[Commodity::Water], 10);
        assert_eq!(rating.purchases[Commodity::Food], 10);
        // Water keeps 20, Food probes down to 19.
        assert_eq!(rating.value, 10 * 20 + 10 * 19);
    }

    #[test]
    fn test_no_differential_only_costs_fuel() {
        let origin = market(30, 50, &[]);
        let rating = rate_planet(&origin, &origin.clone(), 5, &input(1000, 40));
        assert!(rating.purchases.is_empty());
        assert_eq!(rating.value, -15);
    }

    #[test]
    fn test_isolated_planet_has_no_plan() {
        let world = world_of(vec![market(30, 50, &[]), market(30, 50, &[])], &[]);
        assert_eq!(plan_route(&world, &input(1000, 40)), Ok(None));
    }

    #[test]
    fn test_unprofitable_plan_is_flagged() {
        let world = world_of(vec![market(30, 50, &[]), market(30, 50, &[])], &[(0, 1, 2)]);
        let plan = plan_route(&world, &input(1000, 40))
            .expect("search")
            .expect("plan");
        assert!(!plan.is_profitable());
        assert_eq!(plan.rating, -6);
    }

    #[test]
    fn test_depth_is_bounded() {
        // 0 - 1 - 2 - 3 - 4, only planet 4 pays.
        let world = world_of(
            vec![
                market(30, 50, &[]),
                market(30, 50, &[]),
                market(30, 50, &[]),
                market(30, 50, &[]),
                market(30, 50, &[(Commodity::Weapons, 500)]),
            ],
            &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 4, 1)],
        );
        let plan = plan_route(&world, &input(10_000, 40))
            .expect("search")
            .expect("plan");
        assert!(!plan.path.contains(&4));
        assert_eq!(plan.path, vec![1]);
    }

    #[test]
    fn test_multi_hop_route() {
        // 0 - 1 - 2, planet 2 pays well enough to cover the extra hop.
        let world = world_of(
            vec![
                market(30, 50, &[]),
                market(30, 50, &[]),
                market(30, 50, &[(Commodity::Medicine, 90)]),
            ],
            &[(0, 1, 2), (1, 2, 3)],
        );
        let plan = plan_route(&world, &input(10_000, 40))
            .expect("search")
            .expect("plan");
        assert_eq!(plan.path, vec![1, 2]);
        assert_eq!(plan.distance, 5);
        assert_eq!(plan.destination(), Some(2));
        assert_eq!(plan.rating, 10 * 40 - 15);
    }
}
