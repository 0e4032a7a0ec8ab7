use chrono::{DateTime, Duration, Utc};
use contracts::{CropType, PieType, Resource};
use farm_core::plot::growth_stage;
use farm_core::progression::{add_experience, level_from_experience, xp_required_for_level};
use farm_core::{Farm, GameBalance, GameError};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
enum Op {
    Plant { row: u32, col: u32, apple: bool },
    Fertilize { row: u32, col: u32 },
    Harvest { row: u32, col: u32 },
    Bake { slot: u32, apple: bool },
    Collect { slot: u32 },
    Buy { resource: usize, quantity: u32 },
    Sell { resource: usize, quantity: u32 },
    ExpandField,
    ExpandKitchen,
    Daily,
    Fulfill { pick: usize },
    Wait { minutes: i64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0_u32..5, 0_u32..5, any::<bool>()).prop_map(|(row, col, apple)| Op::Plant { row, col, apple }),
        (0_u32..5, 0_u32..5).prop_map(|(row, col)| Op::Fertilize { row, col }),
        (0_u32..5, 0_u32..5).prop_map(|(row, col)| Op::Harvest { row, col }),
        (0_u32..3, any::<bool>()).prop_map(|(slot, apple)| Op::Bake { slot, apple }),
        (0_u32..3).prop_map(|slot| Op::Collect { slot }),
        (0_usize..9, 0_u32..40).prop_map(|(resource, quantity)| Op::Buy { resource, quantity }),
        (0_usize..9, 0_u32..40).prop_map(|(resource, quantity)| Op::Sell { resource, quantity }),
        Just(Op::ExpandField),
        Just(Op::ExpandKitchen),
        Just(Op::Daily),
        (0_usize..8).prop_map(|pick| Op::Fulfill { pick }),
        (1_i64..120).prop_map(|minutes| Op::Wait { minutes }),
    ]
}

fn start() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + Duration::days(1)
}

fn crop(apple: bool) -> CropType {
    if apple {
        CropType::Apple
    } else {
        CropType::Pumpkin
    }
}

fn apply(farm: &mut Farm, op: &Op, now: DateTime<Utc>, balance: &GameBalance) -> Result<(), GameError> {
    match *op {
        Op::Plant { row, col, apple } => farm.plant(row, col, crop(apple), now, balance).map(drop),
        Op::Fertilize { row, col } => farm.fertilize(row, col, now).map(drop),
        Op::Harvest { row, col } => farm.harvest(row, col, now, balance).map(drop),
        Op::Bake { slot, apple } => {
            let pie = if apple { PieType::Apple } else { PieType::Pumpkin };
            farm.start_baking(slot, pie, now, balance).map(drop)
        }
        Op::Collect { slot } => farm.collect_pie(slot, now, balance).map(drop),
        Op::Buy { resource, quantity } => farm
            .buy(Resource::ALL[resource], quantity, now, balance)
            .map(drop),
        Op::Sell { resource, quantity } => farm
            .sell(Resource::ALL[resource], quantity, now, balance)
            .map(drop),
        Op::ExpandField => farm.expand_field(now, balance).map(drop),
        Op::ExpandKitchen => farm.expand_kitchen(now, balance).map(drop),
        Op::Daily => farm.collect_daily_coins(now, balance).map(drop),
        Op::Fulfill { pick } => {
            let Some(id) = farm.orders.keys().nth(pick).cloned() else {
                return Ok(());
            };
            farm.fulfill_order(&id, now, balance).map(drop)
        }
        Op::Wait { .. } => Ok(()),
    }
}

proptest! {
    #[test]
    fn failed_operations_leave_the_farm_untouched(
        seed in 0_u64..1_000,
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let balance = GameBalance::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut now = start();
        let mut farm = Farm::new_player("prop", now, &balance);
        farm.generate_customer_orders(now, &mut rng, &balance);
        farm.generate_challenges(now, &mut rng, &balance);

        for op in &ops {
            if let Op::Wait { minutes } = op {
                now += Duration::minutes(*minutes);
            }

            let stale = farm.clone();
            farm.refresh(now, &balance);
            for (position, plot) in &farm.plots {
                prop_assert!(plot.state >= stale.plots[position].state);
            }
            for (slot, oven) in &farm.ovens {
                prop_assert!(oven.state >= stale.ovens[slot].state);
            }

            let before = farm.clone();
            if apply(&mut farm, op, now, &balance).is_err() {
                prop_assert_eq!(&farm, &before);
            }

            prop_assert!(farm.player.level <= balance.max_auto_level);
            prop_assert!(farm.player.field_size <= balance.max_field_size);
            prop_assert!(farm.player.kitchen_slots <= balance.max_kitchen_slots);
            prop_assert_eq!(farm.plots.len() as u32, farm.player.field_size * farm.player.field_size);
            prop_assert_eq!(farm.ovens.len() as u32, farm.player.kitchen_slots);
            prop_assert!(farm.player.experience >= before.player.experience);
        }
    }

    #[test]
    fn growth_never_goes_backwards(
        apple in any::<bool>(),
        fertilized in any::<bool>(),
        earlier in 0_i64..500,
        gap in 0_i64..500,
    ) {
        let balance = GameBalance::default();
        let planted = start();
        let first = growth_stage(crop(apple), planted, fertilized, planted + Duration::minutes(earlier), &balance);
        let later = growth_stage(crop(apple), planted, fertilized, planted + Duration::minutes(earlier + gap), &balance);
        prop_assert!(later >= first);
    }

    #[test]
    fn fertilizer_runs_the_clock_twice_as_fast(apple in any::<bool>(), minutes in 0_i64..200) {
        let balance = GameBalance::default();
        let planted = start();
        let fertilized = growth_stage(crop(apple), planted, true, planted + Duration::minutes(minutes), &balance);
        let plain = growth_stage(crop(apple), planted, false, planted + Duration::minutes(minutes * 2), &balance);
        prop_assert_eq!(fertilized, plain);
    }

    #[test]
    fn experience_alone_never_passes_the_cap(grants in prop::collection::vec(0_u64..1_000_000, 1..20)) {
        let balance = GameBalance::default();
        let mut farm = Farm::new_player("xp", start(), &balance);
        let mut last_level = farm.player.level;
        for amount in grants {
            let change = add_experience(&mut farm.player, amount, &balance);
            prop_assert!(change.current >= last_level);
            prop_assert!(farm.player.level <= 10);
            last_level = farm.player.level;
        }
    }

    #[test]
    fn level_is_monotone_in_experience(a in 0_u64..5_000, b in 0_u64..5_000) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(level_from_experience(low, 10) <= level_from_experience(high, 10));
        let level = level_from_experience(high, 10);
        prop_assert!(xp_required_for_level(level) <= high);
    }
}
