//! Experience curve, automatic leveling, and the tool-gated manual tiers.

use contracts::{Player, Resource};
use serde::{Deserialize, Serialize};

use crate::balance::GameBalance;
use crate::error::GameError;

const BASE_LEVEL_XP: u128 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelChange {
    pub previous: u32,
    pub current: u32,
}

impl LevelChange {
    pub fn leveled_up(&self) -> bool {
        self.current > self.previous
    }
}

/// XP needed to go from `level - 1` to `level`: floor(100 * 1.2^(level-2)).
///
/// Computed as 100 * 6^k / 5^k in integers so the floor is exact.
pub fn level_increment(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }

    let mut numerator = BASE_LEVEL_XP;
    let mut denominator = 1_u128;
    for _ in 0..(level - 2) {
        match (numerator.checked_mul(6), denominator.checked_mul(5)) {
            (Some(n), Some(d)) => {
                numerator = n;
                denominator = d;
            }
            _ => return u64::MAX,
        }
    }

    u64::try_from(numerator / denominator).unwrap_or(u64::MAX)
}

/// Cumulative XP a player must hold to be at `level`.
pub fn xp_required_for_level(level: u32) -> u64 {
    (2..=level).fold(0_u64, |total, step| {
        total.saturating_add(level_increment(step))
    })
}

pub fn level_from_experience(total_xp: u64, max_level: u32) -> u32 {
    let mut level = 1;
    while level < max_level && xp_required_for_level(level + 1) <= total_xp {
        level += 1;
    }
    level
}

/// Credits XP and re-derives the level while the player is below the
/// automatic cap. Never lowers a level.
pub fn add_experience(player: &mut Player, amount: u64, balance: &GameBalance) -> LevelChange {
    let previous = player.level;
    player.experience = player.experience.saturating_add(amount);

    if player.level < balance.max_auto_level {
        let derived = level_from_experience(player.experience, balance.max_auto_level);
        player.level = player.level.max(derived);
    }

    apply_unlocks(player, balance);

    let change = LevelChange {
        previous,
        current: player.level,
    };
    if change.leveled_up() {
        tracing::info!(
            player_id = %player.id,
            from = previous,
            to = player.level,
            "player leveled up"
        );
    }
    change
}

/// Feature unlocks that follow from the current level. Idempotent.
pub fn apply_unlocks(player: &mut Player, balance: &GameBalance) {
    if player.level >= balance.kitchen_unlock_level {
        player.kitchen_unlocked = true;
    }
}

/// Tools consumed to reach `target_level` by hand. Zero within the automatic
/// range; `2^(target-first_manual) * 5` beyond it. `None` once the cost no
/// longer fits a counter.
pub fn tools_required_for_level(target_level: u32, max_auto_level: u32) -> Option<u32> {
    if target_level <= max_auto_level {
        return Some(0);
    }

    let first_manual = max_auto_level + 1;
    1_u32
        .checked_shl(target_level - first_manual)
        .and_then(|multiplier| multiplier.checked_mul(5))
}

pub fn unlock_next_level(player: &mut Player, balance: &GameBalance) -> Result<LevelChange, GameError> {
    if player.level < balance.max_auto_level {
        return Err(GameError::LevelTooLow {
            required_level: balance.max_auto_level,
            level: player.level,
        });
    }

    let target = player.level + 1;
    let required = tools_required_for_level(target, balance.max_auto_level).ok_or(
        GameError::MaxSizeReached {
            what: "Level",
            max: player.level,
        },
    )?;

    if player.tools < required {
        return Err(GameError::InsufficientInventory {
            resource: Resource::Tools,
            required,
            available: player.tools,
        });
    }

    let previous = player.level;
    player.tools -= required;
    player.level = target;
    apply_unlocks(player, balance);

    Ok(LevelChange {
        previous,
        current: player.level,
    })
}
