//! Tunable game constants. Defaults are the final-revision values.

use std::collections::BTreeMap;

use contracts::{CropType, PieType, Resource, ResourceBundle};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    #[error("sell price of {resource} ({sell}) must be below its buy price ({buy})")]
    NoTradeMargin {
        resource: Resource,
        buy: u32,
        sell: u32,
    },
    #[error("{0} must be at least 1")]
    ZeroDuration(&'static str),
    #[error("starting {what} {start} exceeds maximum {max}")]
    StartAboveMax {
        what: &'static str,
        start: u32,
        max: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpRewards {
    pub plant: u64,
    pub harvest: u64,
    pub bake: u64,
    pub expand_field: u64,
    pub expand_kitchen: u64,
}

impl Default for XpRewards {
    fn default() -> Self {
        Self {
            plant: 5,
            harvest: 10,
            bake: 15,
            expand_field: 25,
            expand_kitchen: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameBalance {
    /// Price tables merge over the defaults, so a config can retune one entry.
    #[serde(deserialize_with = "merge_buy_prices")]
    pub buy_prices: BTreeMap<Resource, u32>,
    #[serde(deserialize_with = "merge_sell_prices")]
    pub sell_prices: BTreeMap<Resource, u32>,
    /// Minimum player level to buy a resource. Missing means level 1.
    #[serde(deserialize_with = "merge_buy_level_gates")]
    pub buy_level_gates: BTreeMap<Resource, u32>,
    pub kitchen_unlock_level: u32,
    pub xp: XpRewards,
    pub pumpkin_growth_minutes: i64,
    pub apple_growth_minutes: i64,
    pub pumpkin_bake_minutes: i64,
    pub apple_bake_minutes: i64,
    pub daily_coins: u32,
    pub daily_cooldown_hours: i64,
    pub field_expansion_base_cost: u32,
    pub kitchen_expansion_base_cost: u32,
    pub starting_field_size: u32,
    pub max_field_size: u32,
    pub starting_kitchen_slots: u32,
    pub max_kitchen_slots: u32,
    pub max_auto_level: u32,
    pub starting_inventory: ResourceBundle,
    pub max_pending_orders: usize,
    pub challenges_per_batch: usize,
    pub challenge_lifetime_hours: i64,
}

impl Default for GameBalance {
    fn default() -> Self {
        Self {
            buy_prices: BTreeMap::from([
                (Resource::Seeds, 10),
                (Resource::AppleSeeds, 5),
                (Resource::Fertilizer, 10),
                (Resource::Tools, 50),
            ]),
            sell_prices: BTreeMap::from([
                (Resource::Seeds, 8),
                (Resource::AppleSeeds, 4),
                (Resource::Pumpkins, 25),
                (Resource::Apples, 12),
                (Resource::Pies, 60),
                (Resource::ApplePies, 40),
            ]),
            buy_level_gates: BTreeMap::from([(Resource::AppleSeeds, 2)]),
            kitchen_unlock_level: 2,
            xp: XpRewards::default(),
            pumpkin_growth_minutes: 60,
            apple_growth_minutes: 15,
            pumpkin_bake_minutes: 30,
            apple_bake_minutes: 15,
            daily_coins: 5,
            daily_cooldown_hours: 24,
            field_expansion_base_cost: 50,
            kitchen_expansion_base_cost: 100,
            starting_field_size: 3,
            max_field_size: 10,
            starting_kitchen_slots: 1,
            max_kitchen_slots: 5,
            max_auto_level: 10,
            starting_inventory: ResourceBundle::default()
                .with(Resource::Coins, 150)
                .with(Resource::Seeds, 25)
                .with(Resource::Pumpkins, 8),
            max_pending_orders: 3,
            challenges_per_batch: 3,
            challenge_lifetime_hours: 72,
        }
    }
}

fn merge_over<'de, D>(
    deserializer: D,
    mut base: BTreeMap<Resource, u32>,
) -> Result<BTreeMap<Resource, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    base.extend(BTreeMap::<Resource, u32>::deserialize(deserializer)?);
    Ok(base)
}

fn merge_buy_prices<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<Resource, u32>, D::Error> {
    merge_over(deserializer, GameBalance::default().buy_prices)
}

fn merge_sell_prices<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<Resource, u32>, D::Error> {
    merge_over(deserializer, GameBalance::default().sell_prices)
}

fn merge_buy_level_gates<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<Resource, u32>, D::Error> {
    merge_over(deserializer, GameBalance::default().buy_level_gates)
}

impl GameBalance {
    pub fn growth_minutes(&self, crop: CropType) -> i64 {
        match crop {
            CropType::Pumpkin => self.pumpkin_growth_minutes,
            CropType::Apple => self.apple_growth_minutes,
        }
    }

    pub fn bake_minutes(&self, pie: PieType) -> i64 {
        match pie {
            PieType::Pumpkin => self.pumpkin_bake_minutes,
            PieType::Apple => self.apple_bake_minutes,
        }
    }

    pub fn buy_price(&self, resource: Resource) -> Option<u32> {
        self.buy_prices.get(&resource).copied()
    }

    pub fn sell_price(&self, resource: Resource) -> Option<u32> {
        self.sell_prices.get(&resource).copied()
    }

    pub fn buy_level(&self, resource: Resource) -> u32 {
        self.buy_level_gates.get(&resource).copied().unwrap_or(1)
    }

    pub fn validate(&self) -> Result<(), BalanceError> {
        for (resource, sell) in &self.sell_prices {
            if let Some(buy) = self.buy_price(*resource) {
                if *sell >= buy {
                    return Err(BalanceError::NoTradeMargin {
                        resource: *resource,
                        buy,
                        sell: *sell,
                    });
                }
            }
        }

        for (label, minutes) in [
            ("pumpkin_growth_minutes", self.pumpkin_growth_minutes),
            ("apple_growth_minutes", self.apple_growth_minutes),
            ("pumpkin_bake_minutes", self.pumpkin_bake_minutes),
            ("apple_bake_minutes", self.apple_bake_minutes),
            ("daily_cooldown_hours", self.daily_cooldown_hours),
        ] {
            if minutes < 1 {
                return Err(BalanceError::ZeroDuration(label));
            }
        }

        if self.starting_field_size > self.max_field_size {
            return Err(BalanceError::StartAboveMax {
                what: "field size",
                start: self.starting_field_size,
                max: self.max_field_size,
            });
        }
        if self.starting_kitchen_slots > self.max_kitchen_slots {
            return Err(BalanceError::StartAboveMax {
                what: "kitchen slots",
                start: self.starting_kitchen_slots,
                max: self.max_kitchen_slots,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_balance_is_valid() {
        let balance = GameBalance::default();
        balance.validate().expect("defaults validate");
        assert_eq!(balance.buy_price(Resource::Seeds), Some(10));
        assert_eq!(balance.buy_price(Resource::Pumpkins), None);
        assert_eq!(balance.buy_level(Resource::AppleSeeds), 2);
        assert_eq!(balance.buy_level(Resource::Seeds), 1);
    }

    #[test]
    fn rejects_sell_price_at_or_above_buy_price() {
        let mut balance = GameBalance::default();
        balance.sell_prices.insert(Resource::Seeds, 10);
        assert_eq!(
            balance.validate(),
            Err(BalanceError::NoTradeMargin {
                resource: Resource::Seeds,
                buy: 10,
                sell: 10
            })
        );
    }

    #[test]
    fn partial_overrides_keep_remaining_defaults() {
        let parsed: GameBalance =
            serde_json::from_str(r#"{"daily_coins": 7, "buy_prices": {"fertilizer": 25}}"#)
                .expect("partial balance");
        assert_eq!(parsed.daily_coins, 7);
        assert_eq!(parsed.buy_price(Resource::Fertilizer), Some(25));
        assert_eq!(parsed.buy_price(Resource::Seeds), Some(10));
        assert_eq!(parsed.sell_price(Resource::Pies), Some(60));
        assert_eq!(parsed.pumpkin_growth_minutes, 60);
    }
}
