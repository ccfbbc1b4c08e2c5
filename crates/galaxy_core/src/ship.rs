//! Ships and ship combat math.
//!
//! A ship tracks hull, shields and fuel as [`Bounded`] pairs and carries
//! static ratings from its [`ShipSpec`]. Damage flows through shields first;
//! whatever the shields cannot absorb lands on the hull.
//!
//! Damage falloff uses fixed-point math so every platform computes the
//! same numbers.

use serde::{Deserialize, Serialize};

use crate::math::{ratio, round_to_u32, Fixed};

/// Added to 100 to form the maneuver divisor in [`damage_output`].
pub const BATTLE_COEFF: u32 = 130;

/// Floor for a landed hit while the defender can still be hurt.
pub const MIN_DAMAGE: u32 = 1;

/// Fuel units bought per jump of range.
pub const FUEL_PER_JUMP: u32 = 3;

/// A `(current, max)` pair with `current` clamped to `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounded {
    current: u32,
    max: u32,
}

impl Bounded {
    /// Create a pair, clamping `current` to `max`.
    #[must_use]
    pub const fn new(current: u32, max: u32) -> Self {
        let current = if current > max { max } else { current };
        Self { current, max }
    }

    /// Create a full pair.
    #[must_use]
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Current value.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum value.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// How much is missing to be full.
    #[must_use]
    pub const fn missing(&self) -> u32 {
        self.max - self.current
    }

    /// Whether current is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Whether current equals max.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current == self.max
    }

    /// Set current, clamped to `[0, max]`.
    pub fn set(&mut self, value: u32) {
        self.current = value.min(self.max);
    }

    /// Fill to max.
    pub fn fill(&mut self) {
        self.current = self.max;
    }

    /// Remove up to `amount`, returning how much was removed.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.current);
        self.current -= removed;
        removed
    }

    /// Add up to `amount`, returning how much was added.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.missing());
        self.current += added;
        added
    }
}

/// Ship hull class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShipClass {
    /// Tiny courier.
    Gnat,
    /// Starter hauler.
    Flea,
    /// Mid-size freighter.
    Firefly,
    /// Fast raider.
    Mosquito,
    /// Patrol cutter.
    Hornet,
    /// Heavy gunship.
    Wasp,
}

impl ShipClass {
    /// All classes, cheapest first.
    pub const ALL: [Self; 6] = [
        Self::Gnat,
        Self::Flea,
        Self::Firefly,
        Self::Mosquito,
        Self::Hornet,
        Self::Wasp,
    ];

    /// Whether pirates consider this class beneath their notice.
    #[must_use]
    pub const fn is_small_fry(self) -> bool {
        matches!(self, Self::Gnat | Self::Flea)
    }
}

/// Static statistics of a ship class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSpec {
    /// Class these stats describe.
    pub class: ShipClass,
    /// Maximum hull.
    pub hull: u32,
    /// Maximum shields.
    pub shields: u32,
    /// Cargo capacity in units.
    pub cargo: u32,
    /// Jumps of range on a full tank.
    pub max_jump: u32,
    /// Damage rating.
    pub damage: u32,
    /// Maneuver rating.
    pub maneuver: u32,
    /// Purchase price in credits.
    pub price: u32,
}

impl ShipSpec {
    /// Create a spec.
    #[must_use]
    pub const fn new(
        class: ShipClass,
        hull: u32,
        shields: u32,
        cargo: u32,
        max_jump: u32,
        damage: u32,
        maneuver: u32,
        price: u32,
    ) -> Self {
        Self {
            class,
            hull,
            shields,
            cargo,
            max_jump,
            damage,
            maneuver,
            price,
        }
    }
}

/// A ship in service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ship {
    class: ShipClass,
    hull: Bounded,
    shields: Bounded,
    fuel: Bounded,
    cargo_capacity: u32,
    damage: u32,
    maneuver: u32,
    flee_chance: u32,
    price: u32,
}

impl Ship {
    /// A freshly built ship: full hull, shields and tank.
    #[must_use]
    pub fn new(spec: &ShipSpec) -> Self {
        Self {
            class: spec.class,
            hull: Bounded::full(spec.hull),
            shields: Bounded::full(spec.shields),
            fuel: Bounded::full(spec.max_jump * FUEL_PER_JUMP),
            cargo_capacity: spec.cargo,
            damage: spec.damage,
            maneuver: spec.maneuver,
            flee_chance: flee_chance(spec.maneuver),
            price: spec.price,
        }
    }

    /// Hull class.
    #[must_use]
    pub const fn class(&self) -> ShipClass {
        self.class
    }

    /// Hull points.
    #[must_use]
    pub const fn hull(&self) -> Bounded {
        self.hull
    }

    /// Shield points.
    #[must_use]
    pub const fn shields(&self) -> Bounded {
        self.shields
    }

    /// Fuel units.
    #[must_use]
    pub const fn fuel(&self) -> Bounded {
        self.fuel
    }

    /// Cargo capacity in units.
    #[must_use]
    pub const fn cargo_capacity(&self) -> u32 {
        self.cargo_capacity
    }

    /// Damage rating.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Maneuver rating.
    #[must_use]
    pub const fn maneuver(&self) -> u32 {
        self.maneuver
    }

    /// Percent chance of escaping when fleeing.
    #[must_use]
    pub const fn flee_chance(&self) -> u32 {
        self.flee_chance
    }

    /// Purchase price, also the trade-in value.
    #[must_use]
    pub const fn price(&self) -> u32 {
        self.price
    }

    /// Hull plus shields.
    #[must_use]
    pub const fn effective_health(&self) -> u32 {
        self.hull.current() + self.shields.current()
    }

    /// Whether the hull is intact.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.hull.is_empty()
    }

    /// Apply incoming damage: shields absorb first, the overflow hits the hull.
    pub fn take_damage(&mut self, amount: u32) {
        let overflow = i64::from(self.shields.current()) - i64::from(amount);
        if overflow < 0 {
            self.shields.set(0);
            let hull = (i64::from(self.hull.current()) + overflow).max(0);
            self.hull.set(u32::try_from(hull).unwrap_or(0));
        } else {
            self.shields.set(u32::try_from(overflow).unwrap_or(0));
        }
    }

    /// Zero the hull.
    pub fn destroy(&mut self) {
        self.hull.set(0);
    }

    /// Burn one unit of fuel for a tick of travel.
    pub fn burn_fuel(&mut self) {
        self.fuel.drain(1);
    }

    /// Add fuel, returning how much fit in the tank.
    pub fn refuel(&mut self, amount: u32) -> u32 {
        self.fuel.restore(amount)
    }

    /// Fill the tank.
    pub fn refuel_full(&mut self) {
        self.fuel.fill();
    }

    /// Repair hull points, returning how many were restored.
    pub fn repair(&mut self, amount: u32) -> u32 {
        self.hull.restore(amount)
    }

    /// Repair the hull completely.
    pub fn repair_full(&mut self) {
        self.hull.fill();
    }

    /// Recharge shields completely.
    pub fn recharge_shields(&mut self) {
        self.shields.fill();
    }

    /// Overwrite current hull (clamped). Mostly for fixtures.
    pub fn set_hull(&mut self, value: u32) {
        self.hull.set(value);
    }

    /// Overwrite current shields (clamped). Mostly for fixtures.
    pub fn set_shields(&mut self, value: u32) {
        self.shields.set(value);
    }

    /// Overwrite current fuel (clamped). Mostly for fixtures.
    pub fn set_fuel(&mut self, value: u32) {
        self.fuel.set(value);
    }
}

/// Damage a hit from `attacker` deals to `defender`.
///
/// `round(damage * (1 - maneuver / (100 + BATTLE_COEFF)))`, never below
/// [`MIN_DAMAGE`] while the defender's maneuver is under the divisor.
#[must_use]
pub fn damage_output(attacker: &Ship, defender: &Ship) -> u32 {
    let divisor = 100 + BATTLE_COEFF;
    if attacker.damage == 0 || defender.maneuver >= divisor {
        return 0;
    }

    let multiplier = Fixed::ONE - ratio(defender.maneuver, divisor);
    let damage = round_to_u32(Fixed::from_num(attacker.damage) * multiplier);
    damage.max(MIN_DAMAGE)
}

/// Percent chance to escape for a maneuver rating.
///
/// `(0.8 * (maneuver / 100)^2 + 0.2) * 100` truncated: 20% at 0, 100% at 100.
/// Computed as `20 + 80 * m^2 / 10_000` so no fractional constant is rounded.
#[must_use]
pub fn flee_chance(maneuver: u32) -> u32 {
    let m = u64::from(maneuver);
    let chance = 20 + (80 * m * m) / 10_000;
    u32::try_from(chance).unwrap_or(u32::MAX)
}

/// How much longer `me` survives a duel with `victim` than the other way round.
///
/// Positive means `me` out-endures `victim`. The `+ 1` keeps harmless
/// opponents from dividing by zero.
#[must_use]
pub fn out_sustain(me: &Ship, victim: &Ship) -> i64 {
    let my_endurance =
        i64::from(me.effective_health()) / (i64::from(damage_output(victim, me)) + 1);
    let victim_endurance =
        i64::from(victim.effective_health()) / (i64::from(damage_output(me, victim)) + 1);
    my_endurance - victim_endurance
}
