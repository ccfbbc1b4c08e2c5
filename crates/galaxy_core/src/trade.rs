//! Trades between an entity and a planet's market.
//!
//! Every check runs before anything moves, so a rejected trade leaves both
//! sides untouched.

use crate::commodity::Commodity;
use crate::economy::Market;
use crate::entity::Entity;
use crate::error::{GameError, Result};

/// Buy `amount` units from `market`, returning the credits paid.
pub fn buy(entity: &mut Entity, market: &mut Market, commodity: Commodity, amount: u32) -> Result<u32> {
    let available = market.stock(commodity);
    if amount > available {
        return Err(GameError::InsufficientStock {
            commodity,
            requested: amount,
            available,
        });
    }
    let cost = market.quote(commodity, amount);
    if cost > entity.ledger().credits() {
        return Err(GameError::InsufficientFunds {
            required: cost,
            available: entity.ledger().credits(),
        });
    }
    let free = entity.free_cargo();
    if amount > free {
        return Err(GameError::InsufficientCargoSpace {
            requested: amount,
            available: free,
        });
    }

    let paid = market.buy(commodity, amount)?;
    entity.ledger_mut().spend(paid)?;
    entity.ledger_mut().load(commodity, amount);
    Ok(paid)
}

/// Sell `amount` units to `market`, returning the credits earned.
pub fn sell(entity: &mut Entity, market: &mut Market, commodity: Commodity, amount: u32) -> Result<u32> {
    entity.ledger_mut().unload(commodity, amount)?;
    let earned = market.sell(commodity, amount);
    entity.ledger_mut().add_credits(earned);
    Ok(earned)
}

/// Sell the whole hold, returning the credits earned.
pub fn sell_all(entity: &mut Entity, market: &mut Market) -> u32 {
    let mut earned = 0u32;
    for commodity in Commodity::ALL {
        let amount = entity.ledger().cargo(commodity);
        if amount == 0 {
            continue;
        }
        if let Ok(credits) = sell(entity, market, commodity, amount) {
            earned = earned.saturating_add(credits);
        }
    }
    earned
}
