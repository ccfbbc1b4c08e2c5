//! Agent behavior.
//!
//! Each role decides its turn in [`Entity::play`], which may return the id
//! of an entity it wants to fight. Battle hooks ([`Entity::battle_decision`],
//! [`Entity::won`], [`Entity::lost`]) dispatch on the same [`Brain`].
//!
//! - Traders plan arbitrage routes and never pick fights.
//! - Pirates roam at random and ambush the first lane they fly.
//! - Police patrol out from home and pounce on flagged criminals.
//! - The player follows orders set between ticks.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};

use crate::combat::{BattleChoice, BattleDecision};
use crate::config::Rules;
use crate::criminals::CriminalRegistry;
use crate::entity::{Brain, Entity, EntityId, Others, PreviousAction, Role};
use crate::error::Result;
use crate::route_planner::{plan_route, PlannerInput};
use crate::ship::{damage_output, out_sustain};
use crate::trade;
use crate::world::WorldGraph;

/// Everything an entity may consult or touch during its turn.
pub struct TurnContext<'a> {
    /// The world; presence changes only through travel.
    pub world: &'a mut WorldGraph,
    /// Flagged criminals.
    pub criminals: &'a CriminalRegistry,
    /// Every other entity, read-only.
    pub others: Others<'a>,
    /// Tuning constants.
    pub rules: &'a Rules,
    /// The simulation's random source.
    pub rng: &'a mut ChaCha8Rng,
}

impl Entity {
    /// Take a turn, returning the id of an entity to attack, if any.
    ///
    /// Dead entities do nothing.
    pub fn play(&mut self, ctx: &mut TurnContext<'_>) -> Result<Option<EntityId>> {
        if !self.is_alive() {
            return Ok(None);
        }
        match self.role() {
            Role::Trader => self.play_trader(ctx).map(|()| None),
            Role::Pirate => self.play_pirate(ctx),
            Role::Police => self.play_police(ctx),
            Role::Player => self.play_player(ctx),
        }
    }

    /// What to do on this entity's battle turn against `opponent`.
    #[must_use]
    pub fn battle_decision(&self, opponent: &Entity) -> BattleDecision {
        let attack = BattleDecision::Attack {
            damage: damage_output(self.ship(), opponent.ship()),
        };
        let flee = BattleDecision::Flee {
            chance: self.ship().flee_chance(),
        };
        match self.brain() {
            Brain::Trader { .. } => flee,
            Brain::Pirate => {
                if out_sustain(self.ship(), opponent.ship()) > 0 {
                    attack
                } else {
                    flee
                }
            }
            Brain::Police { .. } => attack,
            Brain::Player(state) => match state.stance {
                BattleChoice::Attack => attack,
                BattleChoice::Flee => flee,
            },
        }
    }

    /// Loot a destroyed opponent.
    ///
    /// Cargo is taken up to free capacity. Everyone but police also takes the
    /// credits.
    pub fn won(&mut self, loser: &mut Entity) {
        let room = self.free_cargo();
        let cargo = self.ledger_mut().take_cargo_from(loser.ledger_mut(), room);
        let credits = if self.role() == Role::Police {
            0
        } else {
            self.ledger_mut().take_credits_from(loser.ledger_mut())
        };
        debug!(
            winner = self.id(),
            loser = loser.id(),
            cargo,
            credits,
            "Wreck looted"
        );
    }

    /// Hook for the destroyed party. Drops any plans in flight.
    pub fn lost(&mut self) {
        match self.brain_mut() {
            Brain::Trader { route } => route.clear(),
            Brain::Player(state) => state.pending_attack = None,
            Brain::Pirate | Brain::Police { .. } => {}
        }
        trace!(entity = self.id(), "Destroyed");
    }

    fn play_trader(&mut self, ctx: &mut TurnContext<'_>) -> Result<()> {
        if self.travel().is_traveling() {
            self.travel_tick(ctx.world)?;
            return Ok(());
        }

        self.maintenance(ctx.rules);

        let next_hop = match self.brain_mut() {
            Brain::Trader { route } => route.pop_front(),
            _ => None,
        };
        if let Some(hop) = next_hop {
            self.begin_travel(ctx.world, hop)?;
            self.set_previous_action(PreviousAction::TravelPrep);
            return Ok(());
        }

        if self.previous_action() != PreviousAction::Sell {
            let earned = self.sell_cargo(ctx.world)?;
            self.set_previous_action(PreviousAction::Sell);
            trace!(entity = self.id(), earned, "Trader sold cargo");
            return Ok(());
        }

        if self.ship().fuel().current() < ctx.rules.fuel_reserve {
            return Ok(());
        }

        self.run_trade_plan(ctx)
    }

    fn run_trade_plan(&mut self, ctx: &mut TurnContext<'_>) -> Result<()> {
        let origin = self.travel().location();
        let input = PlannerInput {
            origin,
            credits: self.ledger().credits(),
            free_cargo: self.free_cargo(),
            fuel_cost: ctx.rules.fuel_cost,
            max_units: ctx.rules.max_units_per_commodity,
            max_depth: ctx.rules.search_depth,
        };

        let plan = match plan_route(ctx.world, &input)? {
            Some(plan) if plan.is_profitable() => plan,
            _ => {
                trace!(entity = self.id(), planet = origin, "No profitable route");
                return Ok(());
            }
        };

        let market = ctx.world.planet_mut(origin)?.market_mut();
        for (commodity, &units) in plan.purchases.iter() {
            if units == 0 {
                continue;
            }
            if let Err(err) = trade::buy(self, market, commodity, units) {
                warn!(entity = self.id(), %commodity, units, %err, "Planned purchase rejected");
            }
        }

        let mut hops = plan.path.into_iter();
        let Some(first) = hops.next() else {
            return Ok(());
        };
        self.begin_travel(ctx.world, first)?;
        if let Brain::Trader { route } = self.brain_mut() {
            route.extend(hops);
        }
        self.set_previous_action(PreviousAction::TravelPrep);

        debug!(
            entity = self.id(),
            from = origin,
            rating = plan.rating,
            distance = plan.distance,
            cargo = self.ledger().total_cargo(),
            "Trader departed on route"
        );
        Ok(())
    }

    fn play_pirate(&mut self, ctx: &mut TurnContext<'_>) -> Result<Option<EntityId>> {
        if self.travel().is_traveling() {
            if !matches!(
                self.previous_action(),
                PreviousAction::Scan | PreviousAction::Battle
            ) {
                return Ok(self.find_victim(ctx));
            }
            self.travel_tick(ctx.world)?;
            return Ok(None);
        }

        self.maintenance(ctx.rules);
        self.sell_cargo(ctx.world)?;
        self.set_previous_action(PreviousAction::Maintenance);

        if self.ship().fuel().current() >= ctx.rules.fuel_reserve {
            self.depart_randomly(ctx)?;
        }
        Ok(None)
    }

    fn find_victim(&mut self, ctx: &TurnContext<'_>) -> Option<EntityId> {
        let mut best: Option<(EntityId, i64)> = None;
        for id in ctx.world.present(self.travel().presence()) {
            let Some(other) = ctx.others.get(id) else {
                continue;
            };
            if !other.is_alive() || other.ship().class().is_small_fry() {
                continue;
            }
            let sustain = out_sustain(self.ship(), other.ship());
            if sustain > best.map_or(0, |(_, s)| s) {
                best = Some((id, sustain));
            }
        }

        let victim = best.map(|(id, _)| id);
        self.set_previous_action(if victim.is_some() {
            PreviousAction::Battle
        } else {
            PreviousAction::Scan
        });
        if let Some(victim) = victim {
            trace!(pirate = self.id(), victim, "Pirate picked a victim");
        }
        victim
    }

    fn play_police(&mut self, ctx: &mut TurnContext<'_>) -> Result<Option<EntityId>> {
        if self.travel().is_traveling() {
            if matches!(
                self.previous_action(),
                PreviousAction::Scan | PreviousAction::Battle
            ) {
                self.travel_tick(ctx.world)?;
                return Ok(None);
            }
            return Ok(self.find_criminal(ctx));
        }

        self.set_previous_action(PreviousAction::Maintenance);
        self.free_maintenance();
        self.sell_cargo(ctx.world)?;

        let location = self.travel().location();
        let home = match self.brain() {
            Brain::Police { home } => *home,
            _ => location,
        };
        if location != home && ctx.world.is_neighbor(location, home) {
            self.begin_travel(ctx.world, home)?;
        } else {
            self.depart_randomly(ctx)?;
        }
        Ok(None)
    }

    fn find_criminal(&mut self, ctx: &TurnContext<'_>) -> Option<EntityId> {
        let me = self.id();
        let found = ctx.world.present(self.travel().presence()).find(|id| {
            *id != me
                && ctx.criminals.is_criminal(*id)
                && ctx.others.get(*id).is_some_and(Entity::is_alive)
        });
        self.set_previous_action(if found.is_some() {
            PreviousAction::Battle
        } else {
            PreviousAction::Scan
        });
        found
    }

    fn play_player(&mut self, ctx: &mut TurnContext<'_>) -> Result<Option<EntityId>> {
        let order = self
            .player_state_mut()
            .and_then(|state| state.pending_attack.take());
        if let Some(target) = order {
            if self.can_engage(target, ctx) {
                self.set_previous_action(PreviousAction::Battle);
                return Ok(Some(target));
            }
            trace!(target, "Attack order dropped, target out of reach");
        }

        if self.travel().is_traveling() {
            self.travel_tick(ctx.world)?;
        } else {
            self.ship_mut().recharge_shields();
        }
        Ok(None)
    }

    /// Whether `target` is alive and shares this entity's presence set.
    fn can_engage(&self, target: EntityId, ctx: &TurnContext<'_>) -> bool {
        target != self.id()
            && ctx.others.get(target).is_some_and(Entity::is_alive)
            && ctx.world.is_present(target, self.travel().presence())
    }

    /// Paid upkeep at rest. Anything unaffordable, or not needed, pays the
    /// idle stipend instead.
    fn maintenance(&mut self, rules: &Rules) {
        self.ship_mut().recharge_shields();

        let fuel_missing = self.ship().fuel().missing();
        if fuel_missing > 0 && self.ledger_mut().spend(fuel_missing * rules.fuel_cost).is_ok() {
            self.ship_mut().refuel_full();
        } else {
            self.ledger_mut().add_credits(rules.idle_stipend);
        }

        let hull_missing = self.ship().hull().missing();
        if hull_missing > 0 && self.ledger_mut().spend(hull_missing * rules.repair_cost).is_ok() {
            self.ship_mut().repair_full();
        } else {
            self.ledger_mut().add_credits(rules.idle_stipend);
        }
    }

    /// Police upkeep is on the house.
    fn free_maintenance(&mut self) {
        let ship = self.ship_mut();
        ship.recharge_shields();
        ship.repair_full();
        ship.refuel_full();
    }

    fn sell_cargo(&mut self, world: &mut WorldGraph) -> Result<u32> {
        if self.ledger().total_cargo() == 0 {
            return Ok(0);
        }
        let market = world.planet_mut(self.travel().location())?.market_mut();
        Ok(trade::sell_all(self, market))
    }

    fn depart_randomly(&mut self, ctx: &mut TurnContext<'_>) -> Result<()> {
        let neighbors = ctx.world.neighbors(self.travel().location())?;
        let Some(&destination) = neighbors.choose(&mut *ctx.rng) else {
            return Ok(());
        };
        self.begin_travel(ctx.world, destination)?;
        self.set_previous_action(PreviousAction::TravelPrep);
        Ok(())
    }
}
