//! Customer orders: one-off requests for produce with their own expiry.

use chrono::{DateTime, Duration, Utc};
use contracts::{CustomerOrder, OrderRewards, OrderStatus, Player, Resource, ResourceBundle};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::balance::GameBalance;
use crate::economy;
use crate::error::GameError;
use crate::progression::{self, LevelChange};

#[derive(Debug, Clone, Copy)]
struct OrderTemplate {
    min_level: u32,
    weight: u32,
    required: &'static [(Resource, u32)],
    coins: u32,
    experience: u64,
    bonus: &'static [(Resource, u32)],
    time_limit_minutes: i64,
}

const ORDER_TEMPLATES: &[OrderTemplate] = &[
    OrderTemplate {
        min_level: 1,
        weight: 6,
        required: &[(Resource::Pumpkins, 3)],
        coins: 90,
        experience: 20,
        bonus: &[],
        time_limit_minutes: 60,
    },
    OrderTemplate {
        min_level: 1,
        weight: 3,
        required: &[(Resource::Pumpkins, 6)],
        coins: 190,
        experience: 40,
        bonus: &[(Resource::Seeds, 3)],
        time_limit_minutes: 120,
    },
    OrderTemplate {
        min_level: 2,
        weight: 4,
        required: &[(Resource::Apples, 4)],
        coins: 60,
        experience: 15,
        bonus: &[],
        time_limit_minutes: 45,
    },
    OrderTemplate {
        min_level: 2,
        weight: 3,
        required: &[(Resource::Pumpkins, 2), (Resource::Apples, 2)],
        coins: 110,
        experience: 30,
        bonus: &[(Resource::AppleSeeds, 2)],
        time_limit_minutes: 60,
    },
    OrderTemplate {
        min_level: 2,
        weight: 4,
        required: &[(Resource::Pies, 1)],
        coins: 120,
        experience: 35,
        bonus: &[],
        time_limit_minutes: 90,
    },
    OrderTemplate {
        min_level: 2,
        weight: 3,
        required: &[(Resource::ApplePies, 2)],
        coins: 180,
        experience: 45,
        bonus: &[(Resource::Fertilizer, 1)],
        time_limit_minutes: 90,
    },
    OrderTemplate {
        min_level: 4,
        weight: 2,
        required: &[(Resource::Pies, 2), (Resource::ApplePies, 1)],
        coins: 300,
        experience: 60,
        bonus: &[(Resource::Tools, 1)],
        time_limit_minutes: 120,
    },
];

const CUSTOMER_NAMES: &[&str] = &[
    "Granny Maple",
    "Farmer Joe",
    "Chef Olivia",
    "Little Timmy",
    "Mayor Hollis",
    "Baker Sue",
    "Old Man Briggs",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fulfillment {
    pub coins: u32,
    pub experience: u64,
    pub level: LevelChange,
}

fn bundle_from(entries: &[(Resource, u32)]) -> ResourceBundle {
    entries
        .iter()
        .fold(ResourceBundle::default(), |bundle, (resource, amount)| {
            bundle.with(*resource, *amount)
        })
}

pub(crate) fn random_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    uuid::Builder::from_random_bytes(rng.gen())
        .into_uuid()
        .to_string()
}

/// Tops the player up to `max_pending_orders` pending orders. Templates
/// above the player's level are never drawn.
pub fn generate_customer_orders<R: Rng + ?Sized>(
    player: &Player,
    pending_count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
    balance: &GameBalance,
) -> Vec<CustomerOrder> {
    if pending_count >= balance.max_pending_orders {
        return Vec::new();
    }

    let eligible = ORDER_TEMPLATES
        .iter()
        .filter(|template| template.min_level <= player.level)
        .collect::<Vec<_>>();
    let Ok(weights) = WeightedIndex::new(eligible.iter().map(|template| template.weight)) else {
        return Vec::new();
    };

    (pending_count..balance.max_pending_orders)
        .map(|_| {
            let template = eligible[weights.sample(rng)];
            let customer_name = CUSTOMER_NAMES
                .choose(rng)
                .copied()
                .unwrap_or("A neighbour");
            CustomerOrder {
                player_id: player.id.clone(),
                order_id: random_id(rng),
                customer_name: customer_name.to_string(),
                required_items: bundle_from(template.required),
                rewards: OrderRewards {
                    coins: template.coins,
                    experience: template.experience,
                    bonus: bundle_from(template.bonus),
                },
                status: OrderStatus::Pending,
                created_at: now,
                expires_at: now + Duration::minutes(template.time_limit_minutes),
                completed_at: None,
            }
        })
        .collect()
}

pub fn expire_if_due(order: &mut CustomerOrder, now: DateTime<Utc>) -> bool {
    if order.status == OrderStatus::Pending && order.expires_at < now {
        order.status = OrderStatus::Expired;
        return true;
    }
    false
}

/// Returns how many orders flipped to expired.
pub fn expire_old_orders<'a>(
    orders: impl IntoIterator<Item = &'a mut CustomerOrder>,
    now: DateTime<Utc>,
) -> usize {
    orders
        .into_iter()
        .map(|order| expire_if_due(order, now))
        .filter(|expired| *expired)
        .count()
}

pub fn fulfill_order(
    player: &mut Player,
    order: &mut CustomerOrder,
    now: DateTime<Utc>,
    balance: &GameBalance,
) -> Result<Fulfillment, GameError> {
    expire_if_due(order, now);
    if order.status != OrderStatus::Pending {
        return Err(GameError::OrderUnavailable);
    }

    economy::debit(player, &order.required_items)?;
    player.coins = player.coins.saturating_add(order.rewards.coins);
    economy::credit(player, &order.rewards.bonus);
    let level = progression::add_experience(player, order.rewards.experience, balance);

    order.status = OrderStatus::Completed;
    order.completed_at = Some(now);

    Ok(Fulfillment {
        coins: order.rewards.coins,
        experience: order.rewards.experience,
        level,
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::testkit::{epoch, player};

    fn pumpkin_order() -> CustomerOrder {
        CustomerOrder {
            player_id: "p1".to_string(),
            order_id: "o1".to_string(),
            customer_name: "Farmer Joe".to_string(),
            required_items: ResourceBundle::default().with(Resource::Pumpkins, 3),
            rewards: OrderRewards {
                coins: 90,
                experience: 20,
                bonus: ResourceBundle::default().with(Resource::Seeds, 2),
            },
            status: OrderStatus::Pending,
            created_at: epoch(),
            expires_at: epoch() + Duration::minutes(60),
            completed_at: None,
        }
    }

    #[test]
    fn generation_tops_up_to_three() {
        let balance = GameBalance::default();
        let mut rng = StdRng::seed_from_u64(7);
        let p = player();

        let fresh = generate_customer_orders(&p, 0, epoch(), &mut rng, &balance);
        assert_eq!(fresh.len(), 3);
        let topped = generate_customer_orders(&p, 2, epoch(), &mut rng, &balance);
        assert_eq!(topped.len(), 1);
        assert!(generate_customer_orders(&p, 3, epoch(), &mut rng, &balance).is_empty());

        for order in &fresh {
            assert_eq!(order.status, OrderStatus::Pending);
            assert!(order.expires_at > epoch());
            assert!(!order.required_items.is_empty());
        }
    }

    #[test]
    fn level_one_orders_never_ask_for_pies() {
        let balance = GameBalance::default();
        let mut rng = StdRng::seed_from_u64(99);
        let p = player();

        for _ in 0..50 {
            for order in generate_customer_orders(&p, 0, epoch(), &mut rng, &balance) {
                assert_eq!(order.required_items.get(Resource::Pies), 0);
                assert_eq!(order.required_items.get(Resource::ApplePies), 0);
                assert_eq!(order.required_items.get(Resource::Apples), 0);
            }
        }
    }

    #[test]
    fn fulfill_debits_and_rewards_once() {
        let balance = GameBalance::default();
        let mut p = player();
        p.pumpkins = 4;
        let mut order = pumpkin_order();

        let outcome = fulfill_order(&mut p, &mut order, epoch(), &balance).expect("fulfill");
        assert_eq!(outcome.coins, 90);
        assert_eq!(p.pumpkins, 1);
        assert_eq!(p.coins, 90);
        assert_eq!(p.seeds, 2);
        assert_eq!(p.experience, 20);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.completed_at, Some(epoch()));

        assert_eq!(
            fulfill_order(&mut p, &mut order, epoch(), &balance),
            Err(GameError::OrderUnavailable)
        );
        assert_eq!(p.coins, 90);
    }

    #[test]
    fn short_inventory_changes_nothing() {
        let balance = GameBalance::default();
        let mut p = player();
        p.pumpkins = 2;
        let before = p.clone();
        let mut order = pumpkin_order();

        assert_eq!(
            fulfill_order(&mut p, &mut order, epoch(), &balance),
            Err(GameError::InsufficientInventory {
                resource: Resource::Pumpkins,
                required: 3,
                available: 2
            })
        );
        assert_eq!(p, before);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn expiry_is_lazy_and_strict() {
        let balance = GameBalance::default();
        let mut orders = vec![pumpkin_order(), pumpkin_order()];
        orders[1].status = OrderStatus::Completed;

        let at_deadline = epoch() + Duration::minutes(60);
        assert_eq!(expire_old_orders(orders.iter_mut(), at_deadline), 0);

        let past = at_deadline + Duration::seconds(1);
        assert_eq!(expire_old_orders(orders.iter_mut(), past), 1);
        assert_eq!(orders[0].status, OrderStatus::Expired);
        assert_eq!(orders[1].status, OrderStatus::Completed);

        let mut p = player();
        p.pumpkins = 10;
        let mut late = pumpkin_order();
        assert_eq!(
            fulfill_order(&mut p, &mut late, past, &balance),
            Err(GameError::OrderUnavailable)
        );
        assert_eq!(late.status, OrderStatus::Expired);
        assert_eq!(p.pumpkins, 10);
    }
}
