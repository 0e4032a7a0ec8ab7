use contracts::{Oven, Player, Plot, Resource, ResourceBundle};
use serde::Serialize;

use crate::balance::GameBalance;
use crate::error::GameError;
use crate::progression::{self, LevelChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub resource: Resource,
    pub quantity: u32,
    pub coins: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExpansion {
    pub new_size: u32,
    pub cost: u32,
    pub new_plots: Vec<Plot>,
    pub level: LevelChange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitchenExpansion {
    pub new_slots: u32,
    pub cost: u32,
    pub new_ovens: Vec<Oven>,
    pub level: LevelChange,
}

pub fn buy(
    player: &mut Player,
    resource: Resource,
    quantity: u32,
    balance: &GameBalance,
) -> Result<Trade, GameError> {
    if quantity == 0 {
        return Err(GameError::InvalidQuantity);
    }
    let price = balance
        .buy_price(resource)
        .ok_or(GameError::NotForSale(resource))?;

    let required_level = balance.buy_level(resource);
    if player.level < required_level {
        return Err(GameError::LevelLocked {
            feature: format!("Buying {resource}"),
            required_level,
        });
    }

    let cost = price.checked_mul(quantity).ok_or(GameError::InsufficientFunds {
        required: u32::MAX,
        available: player.coins,
    })?;
    if player.coins < cost {
        return Err(GameError::InsufficientFunds {
            required: cost,
            available: player.coins,
        });
    }
    let stocked = player
        .count(resource)
        .checked_add(quantity)
        .ok_or(GameError::InvalidQuantity)?;

    player.coins -= cost;
    *player.counter_mut(resource) = stocked;

    Ok(Trade {
        resource,
        quantity,
        coins: cost,
    })
}

pub fn sell(
    player: &mut Player,
    resource: Resource,
    quantity: u32,
    balance: &GameBalance,
) -> Result<Trade, GameError> {
    if quantity == 0 {
        return Err(GameError::InvalidQuantity);
    }
    let price = balance
        .sell_price(resource)
        .ok_or(GameError::NotForSale(resource))?;

    let available = player.count(resource);
    if available < quantity {
        return Err(GameError::InsufficientInventory {
            resource,
            required: quantity,
            available,
        });
    }

    let proceeds = price
        .checked_mul(quantity)
        .and_then(|proceeds| player.coins.checked_add(proceeds).map(|_| proceeds))
        .ok_or(GameError::InvalidQuantity)?;

    *player.counter_mut(resource) -= quantity;
    player.coins += proceeds;

    Ok(Trade {
        resource,
        quantity,
        coins: proceeds,
    })
}

/// `base * 2^(size - pivot)`, halving below the pivot.
fn doubling_cost(base: u32, size: u32, pivot: u32) -> u32 {
    if size >= pivot {
        1_u32
            .checked_shl(size - pivot)
            .and_then(|multiplier| multiplier.checked_mul(base))
            .unwrap_or(u32::MAX)
    } else {
        base.checked_shr(pivot - size).unwrap_or(0)
    }
}

pub fn field_expansion_cost(new_size: u32, balance: &GameBalance) -> u32 {
    doubling_cost(balance.field_expansion_base_cost, new_size, 4)
}

pub fn kitchen_expansion_cost(new_slots: u32, balance: &GameBalance) -> u32 {
    doubling_cost(balance.kitchen_expansion_base_cost, new_slots, 2)
}

/// Grows the square field by one row and column. `has_plot` reports which
/// positions already exist so they are left untouched.
pub fn expand_field(
    player: &mut Player,
    has_plot: impl Fn(u32, u32) -> bool,
    balance: &GameBalance,
) -> Result<FieldExpansion, GameError> {
    if player.field_size >= balance.max_field_size {
        return Err(GameError::MaxSizeReached {
            what: "Field",
            max: balance.max_field_size,
        });
    }

    let new_size = player.field_size + 1;
    let cost = field_expansion_cost(new_size, balance);
    if player.coins < cost {
        return Err(GameError::InsufficientFunds {
            required: cost,
            available: player.coins,
        });
    }

    player.coins -= cost;
    player.field_size = new_size;

    let mut new_plots = Vec::new();
    for row in 0..new_size {
        for col in 0..new_size {
            if !has_plot(row, col) {
                new_plots.push(Plot::empty(player.id.as_str(), row, col));
            }
        }
    }

    let level = progression::add_experience(player, balance.xp.expand_field, balance);
    Ok(FieldExpansion {
        new_size,
        cost,
        new_plots,
        level,
    })
}

pub fn expand_kitchen(
    player: &mut Player,
    has_oven: impl Fn(u32) -> bool,
    balance: &GameBalance,
) -> Result<KitchenExpansion, GameError> {
    if player.kitchen_slots >= balance.max_kitchen_slots {
        return Err(GameError::MaxSizeReached {
            what: "Kitchen",
            max: balance.max_kitchen_slots,
        });
    }

    let new_slots = player.kitchen_slots + 1;
    let cost = kitchen_expansion_cost(new_slots, balance);
    if player.coins < cost {
        return Err(GameError::InsufficientFunds {
            required: cost,
            available: player.coins,
        });
    }

    player.coins -= cost;
    player.kitchen_slots = new_slots;

    let new_ovens = (0..new_slots)
        .filter(|slot| !has_oven(*slot))
        .map(|slot| Oven::empty(player.id.as_str(), slot))
        .collect();

    let level = progression::add_experience(player, balance.xp.expand_kitchen, balance);
    Ok(KitchenExpansion {
        new_slots,
        cost,
        new_ovens,
        level,
    })
}

/// Fails on the first entry the player cannot cover, in `Resource::ALL` order.
pub fn ensure_available(player: &Player, bundle: &ResourceBundle) -> Result<(), GameError> {
    for (resource, required) in bundle.entries() {
        let available = player.count(resource);
        if available < required {
            return Err(match resource {
                Resource::Coins => GameError::InsufficientFunds {
                    required,
                    available,
                },
                _ => GameError::InsufficientInventory {
                    resource,
                    required,
                    available,
                },
            });
        }
    }
    Ok(())
}

/// All-or-nothing debit.
pub fn debit(player: &mut Player, bundle: &ResourceBundle) -> Result<(), GameError> {
    ensure_available(player, bundle)?;
    for (resource, amount) in bundle.entries() {
        *player.counter_mut(resource) -= amount;
    }
    Ok(())
}

pub fn credit(player: &mut Player, bundle: &ResourceBundle) {
    for (resource, amount) in bundle.entries() {
        let counter = player.counter_mut(resource);
        *counter = counter.saturating_add(amount);
    }
}
