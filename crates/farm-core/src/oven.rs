//! Oven slots: empty -> baking -> ready -> empty.

use chrono::{DateTime, Utc};
use contracts::{Oven, OvenState, PieType, Player};

use crate::balance::GameBalance;
use crate::error::GameError;
use crate::progression::{self, LevelChange};

pub fn start_baking(
    player: &mut Player,
    oven: &mut Oven,
    pie: PieType,
    now: DateTime<Utc>,
) -> Result<(), GameError> {
    let ingredient = pie.ingredient();
    let available = player.count(ingredient);
    if available == 0 {
        return Err(GameError::InsufficientInventory {
            resource: ingredient,
            required: 1,
            available,
        });
    }
    if oven.state != OvenState::Empty {
        return Err(GameError::OvenNotEmpty);
    }

    *player.counter_mut(ingredient) -= 1;
    oven.state = OvenState::Baking;
    oven.pie_type = Some(pie);
    oven.started_at = Some(now);
    Ok(())
}

pub fn collect_pie(
    player: &mut Player,
    oven: &mut Oven,
    balance: &GameBalance,
) -> Result<(PieType, LevelChange), GameError> {
    if oven.state != OvenState::Ready {
        return Err(GameError::PieNotReady);
    }

    let pie = oven.pie_type.unwrap_or(PieType::Pumpkin);
    let counter = player.counter_mut(pie.pie());
    *counter = counter.saturating_add(1);

    oven.state = OvenState::Empty;
    oven.pie_type = None;
    oven.started_at = None;

    let change = progression::add_experience(player, balance.xp.bake, balance);
    Ok((pie, change))
}

pub fn recompute_baking(oven: &mut Oven, now: DateTime<Utc>, balance: &GameBalance) -> bool {
    if oven.state != OvenState::Baking {
        return false;
    }
    let Some(started_at) = oven.started_at else {
        return false;
    };
    let pie = oven.pie_type.unwrap_or(PieType::Pumpkin);

    let minutes_elapsed = (now - started_at).num_minutes().max(0);
    if minutes_elapsed < balance.bake_minutes(pie) {
        return false;
    }
    oven.state = OvenState::Ready;
    true
}

pub fn minutes_until_ready(oven: &Oven, now: DateTime<Utc>, balance: &GameBalance) -> Option<i64> {
    let started_at = oven.started_at?;
    let pie = oven.pie_type?;
    let minutes_elapsed = (now - started_at).num_minutes().max(0);
    Some((balance.bake_minutes(pie) - minutes_elapsed).max(0))
}
