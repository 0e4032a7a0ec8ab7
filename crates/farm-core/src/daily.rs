//! Daily coin grant behind a fixed cooldown.

use chrono::{DateTime, Utc};
use contracts::{DailyStatus, Player};

use crate::balance::GameBalance;
use crate::error::GameError;

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

pub fn daily_status(player: &Player, now: DateTime<Utc>, balance: &GameBalance) -> DailyStatus {
    let Some(last) = player.last_daily_collection else {
        return DailyStatus {
            can_collect: true,
            hours_until_next: 0,
        };
    };

    let cooldown_ms = balance.daily_cooldown_hours.saturating_mul(MILLIS_PER_HOUR);
    let elapsed_ms = (now - last).num_milliseconds().max(0);
    if elapsed_ms >= cooldown_ms {
        return DailyStatus {
            can_collect: true,
            hours_until_next: 0,
        };
    }

    let remaining_ms = cooldown_ms - elapsed_ms;
    let hours = (remaining_ms + MILLIS_PER_HOUR - 1) / MILLIS_PER_HOUR;
    DailyStatus {
        can_collect: false,
        hours_until_next: u32::try_from(hours).unwrap_or(u32::MAX),
    }
}

/// Returns the coins granted.
pub fn collect_daily_coins(
    player: &mut Player,
    now: DateTime<Utc>,
    balance: &GameBalance,
) -> Result<u32, GameError> {
    let status = daily_status(player, now, balance);
    if !status.can_collect {
        return Err(GameError::CooldownActive {
            hours_remaining: status.hours_until_next,
        });
    }

    player.coins = player.coins.saturating_add(balance.daily_coins);
    player.last_daily_collection = Some(now);
    Ok(balance.daily_coins)
}

pub fn reset_daily_timer(player: &mut Player) {
    player.last_daily_collection = None;
}
