//! The per-player aggregate: one player record plus every child record it owns.
//!
//! A `Farm` is loaded, refreshed against `now`, mutated by exactly one
//! operation, and saved. Operations validate before they mutate, so an `Err`
//! leaves the aggregate untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use contracts::{
    ChallengeStatus, ChallengeType, CropType, CustomerOrder, DailyStatus, OrderStatus, Oven, PieType,
    Player, Plot, Resource, SeasonalChallenge,
};
use rand::Rng;
use serde::Serialize;

use crate::balance::GameBalance;
use crate::challenges::{self, ProgressOutcome};
use crate::daily;
use crate::economy;
use crate::error::GameError;
use crate::orders;
use crate::oven;
use crate::plot;
use crate::progression::{self, LevelChange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Farm {
    pub player: Player,
    pub plots: BTreeMap<(u32, u32), Plot>,
    pub ovens: BTreeMap<u32, Oven>,
    pub orders: BTreeMap<String, CustomerOrder>,
    pub challenges: BTreeMap<String, SeasonalChallenge>,
}

/// Counts of records that lazily changed during [`Farm::refresh`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub plots_advanced: usize,
    pub ovens_ready: usize,
    pub orders_expired: usize,
    pub challenges_failed: usize,
    pub challenges_unlocked: usize,
}

impl RefreshSummary {
    pub fn changed(&self) -> bool {
        self.plots_advanced
            + self.ovens_ready
            + self.orders_expired
            + self.challenges_failed
            + self.challenges_unlocked
            > 0
    }
}

/// What a successful action reports back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReport {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_up: Option<LevelChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub completed_challenges: Vec<String>,
}

impl ActionReport {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    fn with_level(mut self, change: LevelChange) -> Self {
        if change.leveled_up() {
            self.level_up = Some(match self.level_up {
                Some(earlier) => LevelChange {
                    previous: earlier.previous,
                    current: change.current,
                },
                None => change,
            });
        }
        self
    }

    fn with_completed(mut self, completed: Vec<String>) -> Self {
        self.completed_challenges.extend(completed);
        self
    }
}

fn crop_name(crop: CropType) -> &'static str {
    match crop {
        CropType::Pumpkin => "Pumpkin",
        CropType::Apple => "Apple",
    }
}

fn pie_name(pie: PieType) -> &'static str {
    match pie {
        PieType::Pumpkin => "Pumpkin pie",
        PieType::Apple => "Apple pie",
    }
}

fn locate_plot<'a>(
    plots: &'a mut BTreeMap<(u32, u32), Plot>,
    player: &Player,
    row: u32,
    col: u32,
) -> Result<&'a mut Plot, GameError> {
    if row >= player.field_size || col >= player.field_size {
        return Err(GameError::InvalidPosition {
            row,
            col,
            size: player.field_size,
        });
    }
    plots
        .get_mut(&(row, col))
        .ok_or_else(|| GameError::not_found("Plot", format!("{row},{col}")))
}

fn locate_oven<'a>(
    ovens: &'a mut BTreeMap<u32, Oven>,
    player: &Player,
    slot_number: u32,
) -> Result<&'a mut Oven, GameError> {
    if slot_number >= player.kitchen_slots {
        return Err(GameError::not_found("Oven", slot_number.to_string()));
    }
    ovens
        .get_mut(&slot_number)
        .ok_or_else(|| GameError::not_found("Oven", slot_number.to_string()))
}

fn ensure_kitchen(player: &Player, feature: &str, balance: &GameBalance) -> Result<(), GameError> {
    if player.kitchen_unlocked {
        return Ok(());
    }
    Err(GameError::LevelLocked {
        feature: feature.to_string(),
        required_level: balance.kitchen_unlock_level,
    })
}

impl Farm {
    /// A brand-new player with the starting inventory, an empty field and
    /// an empty kitchen.
    pub fn new_player(id: impl Into<String>, now: DateTime<Utc>, balance: &GameBalance) -> Self {
        let inventory = &balance.starting_inventory;
        let player = Player {
            id: id.into(),
            level: 1,
            experience: 0,
            coins: inventory.get(Resource::Coins),
            seeds: inventory.get(Resource::Seeds),
            apple_seeds: inventory.get(Resource::AppleSeeds),
            pumpkins: inventory.get(Resource::Pumpkins),
            apples: inventory.get(Resource::Apples),
            pies: inventory.get(Resource::Pies),
            apple_pies: inventory.get(Resource::ApplePies),
            fertilizer: inventory.get(Resource::Fertilizer),
            tools: inventory.get(Resource::Tools),
            day: 1,
            field_size: balance.starting_field_size,
            kitchen_slots: balance.starting_kitchen_slots,
            kitchen_unlocked: false,
            last_daily_collection: None,
            last_updated: now,
        };

        let size = player.field_size;
        let plots = (0..size)
            .flat_map(|row| (0..size).map(move |col| (row, col)))
            .map(|(row, col)| ((row, col), Plot::empty(player.id.as_str(), row, col)))
            .collect();
        let ovens = (0..player.kitchen_slots)
            .map(|slot| (slot, Oven::empty(player.id.as_str(), slot)))
            .collect();

        let mut farm = Self {
            player,
            plots,
            ovens,
            orders: BTreeMap::new(),
            challenges: BTreeMap::new(),
        };
        progression::apply_unlocks(&mut farm.player, balance);
        farm
    }

    pub fn from_parts(
        player: Player,
        plots: impl IntoIterator<Item = Plot>,
        ovens: impl IntoIterator<Item = Oven>,
        orders: impl IntoIterator<Item = CustomerOrder>,
        challenges: impl IntoIterator<Item = SeasonalChallenge>,
    ) -> Self {
        Self {
            player,
            plots: plots.into_iter().map(|p| (p.position(), p)).collect(),
            ovens: ovens.into_iter().map(|o| (o.slot_number, o)).collect(),
            orders: orders
                .into_iter()
                .map(|o| (o.order_id.clone(), o))
                .collect(),
            challenges: challenges
                .into_iter()
                .map(|c| (c.challenge_id.clone(), c))
                .collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.player.id
    }

    /// Applies every time-derived transition that is due at `now`.
    pub fn refresh(&mut self, now: DateTime<Utc>, balance: &GameBalance) -> RefreshSummary {
        let plots_advanced = self
            .plots
            .values_mut()
            .map(|p| plot::recompute_growth(p, now, balance))
            .filter(|advanced| *advanced)
            .count();
        let ovens_ready = self
            .ovens
            .values_mut()
            .map(|o| oven::recompute_baking(o, now, balance))
            .filter(|ready| *ready)
            .count();
        let orders_expired = orders::expire_old_orders(self.orders.values_mut(), now);

        let mut challenges_failed = 0;
        let mut challenges_unlocked = 0;
        for challenge in self.challenges.values_mut() {
            if challenges::expire_if_due(challenge, now) {
                challenges_failed += 1;
            } else if challenges::promote_if_unlocked(challenge, &self.player) {
                challenges_unlocked += 1;
            }
        }

        RefreshSummary {
            plots_advanced,
            ovens_ready,
            orders_expired,
            challenges_failed,
            challenges_unlocked,
        }
    }

    pub fn daily_status(&self, now: DateTime<Utc>, balance: &GameBalance) -> DailyStatus {
        daily::daily_status(&self.player, now, balance)
    }

    pub fn plots(&self) -> impl Iterator<Item = &Plot> {
        self.plots.values()
    }

    pub fn ovens(&self) -> impl Iterator<Item = &Oven> {
        self.ovens.values()
    }

    pub fn orders(&self) -> impl Iterator<Item = &CustomerOrder> {
        self.orders.values()
    }

    pub fn challenges(&self) -> impl Iterator<Item = &SeasonalChallenge> {
        self.challenges.values()
    }

    pub fn pending_orders(&self) -> usize {
        self.orders
            .values()
            .filter(|order| order.status == OrderStatus::Pending)
            .count()
    }

    fn record(&mut self, challenge_type: ChallengeType, amount: u32, now: DateTime<Utc>) -> Vec<String> {
        if amount == 0 {
            return Vec::new();
        }
        challenges::record_activity(
            &mut self.player,
            self.challenges.values_mut(),
            challenge_type,
            amount,
            now,
        )
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.player.last_updated = now;
    }

    pub fn plant(
        &mut self,
        row: u32,
        col: u32,
        crop: CropType,
        now: DateTime<Utc>,
        balance: &GameBalance,
    ) -> Result<ActionReport, GameError> {
        let target = locate_plot(&mut self.plots, &self.player, row, col)?;
        let change = plot::plant(&mut self.player, target, crop, now, balance)?;
        // Unlocks from the plant XP can promote a locked challenge before it is fed.
        self.promote_challenges();
        let completed = self.record(ChallengeType::Plant, 1, now);
        self.touch(now);

        Ok(ActionReport::new("Seed planted successfully!")
            .with_level(change)
            .with_completed(completed))
    }

    pub fn fertilize(
        &mut self,
        row: u32,
        col: u32,
        now: DateTime<Utc>,
    ) -> Result<ActionReport, GameError> {
        let target = locate_plot(&mut self.plots, &self.player, row, col)?;
        plot::fertilize(&mut self.player, target)?;
        self.touch(now);
        Ok(ActionReport::new("Crop fertilized! It will grow twice as fast."))
    }

    pub fn harvest(
        &mut self,
        row: u32,
        col: u32,
        now: DateTime<Utc>,
        balance: &GameBalance,
    ) -> Result<ActionReport, GameError> {
        let target = locate_plot(&mut self.plots, &self.player, row, col)?;
        let (crop, change) = plot::harvest(&mut self.player, target, balance)?;
        self.promote_challenges();
        let completed = self.record(ChallengeType::Harvest, 1, now);
        self.touch(now);

        Ok(ActionReport::new(format!("{} harvested!", crop_name(crop)))
            .with_level(change)
            .with_completed(completed))
    }

    pub fn start_baking(
        &mut self,
        slot_number: u32,
        pie: PieType,
        now: DateTime<Utc>,
        balance: &GameBalance,
    ) -> Result<ActionReport, GameError> {
        ensure_kitchen(&self.player, "Baking", balance)?;
        let target = locate_oven(&mut self.ovens, &self.player, slot_number)?;
        oven::start_baking(&mut self.player, target, pie, now)?;
        self.touch(now);
        Ok(ActionReport::new(format!("{} is in the oven!", pie_name(pie))))
    }

    pub fn collect_pie(
        &mut self,
        slot_number: u32,
        now: DateTime<Utc>,
        balance: &GameBalance,
    ) -> Result<ActionReport, GameError> {
        let target = locate_oven(&mut self.ovens, &self.player, slot_number)?;
        let (pie, change) = oven::collect_pie(&mut self.player, target, balance)?;
        let completed = self.record(ChallengeType::Bake, 1, now);
        self.touch(now);

        Ok(ActionReport::new(format!("{} collected!", pie_name(pie)))
            .with_level(change)
            .with_completed(completed))
    }

    pub fn buy(
        &mut self,
        resource: Resource,
        quantity: u32,
        now: DateTime<Utc>,
        balance: &GameBalance,
    ) -> Result<ActionReport, GameError> {
        let trade = economy::buy(&mut self.player, resource, quantity, balance)?;
        self.touch(now);
        Ok(ActionReport::new(format!(
            "Bought {} {} for {} coins!",
            trade.quantity, trade.resource, trade.coins
        )))
    }

    pub fn sell(
        &mut self,
        resource: Resource,
        quantity: u32,
        now: DateTime<Utc>,
        balance: &GameBalance,
    ) -> Result<ActionReport, GameError> {
        let trade = economy::sell(&mut self.player, resource, quantity, balance)?;
        let completed = self.record(ChallengeType::Earn, trade.coins, now);
        self.touch(now);
        Ok(ActionReport::new(format!(
            "Sold {} {} for {} coins!",
            trade.quantity, trade.resource, trade.coins
        ))
        .with_completed(completed))
    }

    /// Returns the report plus the plots the expansion created.
    pub fn expand_field(
        &mut self,
        now: DateTime<Utc>,
        balance: &GameBalance,
    ) -> Result<(ActionReport, Vec<Plot>), GameError> {
        let plots = &self.plots;
        let expansion = economy::expand_field(
            &mut self.player,
            |row, col| plots.contains_key(&(row, col)),
            balance,
        )?;
        for new_plot in &expansion.new_plots {
            self.plots.insert(new_plot.position(), new_plot.clone());
        }
        self.promote_challenges();
        let completed = self.record(ChallengeType::Expand, 1, now);
        self.touch(now);

        let size = expansion.new_size;
        let report = ActionReport::new(format!(
            "Field expanded to {size}x{size} for {} coins!",
            expansion.cost
        ))
        .with_level(expansion.level)
        .with_completed(completed);
        Ok((report, expansion.new_plots))
    }

    pub fn expand_kitchen(
        &mut self,
        now: DateTime<Utc>,
        balance: &GameBalance,
    ) -> Result<(ActionReport, Vec<Oven>), GameError> {
        ensure_kitchen(&self.player, "Kitchen expansion", balance)?;
        let ovens = &self.ovens;
        let expansion =
            economy::expand_kitchen(&mut self.player, |slot| ovens.contains_key(&slot), balance)?;
        for new_oven in &expansion.new_ovens {
            self.ovens.insert(new_oven.slot_number, new_oven.clone());
        }
        self.promote_challenges();
        let completed = self.record(ChallengeType::Expand, 1, now);
        self.touch(now);

        let report = ActionReport::new(format!(
            "Kitchen expanded to {} ovens for {} coins!",
            expansion.new_slots, expansion.cost
        ))
        .with_level(expansion.level)
        .with_completed(completed);
        Ok((report, expansion.new_ovens))
    }

    pub fn collect_daily_coins(
        &mut self,
        now: DateTime<Utc>,
        balance: &GameBalance,
    ) -> Result<ActionReport, GameError> {
        let granted = daily::collect_daily_coins(&mut self.player, now, balance)?;
        self.touch(now);
        Ok(ActionReport::new(format!("Collected {granted} daily coins!")))
    }

    pub fn reset_daily_timer(&mut self, now: DateTime<Utc>) -> ActionReport {
        daily::reset_daily_timer(&mut self.player);
        self.touch(now);
        ActionReport::new("Daily coins timer reset")
    }

    pub fn fulfill_order(
        &mut self,
        order_id: &str,
        now: DateTime<Utc>,
        balance: &GameBalance,
    ) -> Result<ActionReport, GameError> {
        let order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| GameError::not_found("Order", order_id))?;
        let outcome = orders::fulfill_order(&mut self.player, order, now, balance)?;
        let customer = order.customer_name.clone();

        self.promote_challenges();
        let completed = self.record(ChallengeType::Earn, outcome.coins, now);
        self.touch(now);

        Ok(ActionReport::new(format!(
            "Order for {customer} fulfilled! +{} coins, +{} XP",
            outcome.coins, outcome.experience
        ))
        .with_level(outcome.level)
        .with_completed(completed))
    }

    /// Tops pending orders back up to the configured maximum. Returns how
    /// many were created.
    pub fn generate_customer_orders<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
        balance: &GameBalance,
    ) -> usize {
        orders::expire_old_orders(self.orders.values_mut(), now);
        let fresh =
            orders::generate_customer_orders(&self.player, self.pending_orders(), now, rng, balance);
        let created = fresh.len();
        for order in fresh {
            self.orders.insert(order.order_id.clone(), order);
        }
        created
    }

    /// Replaces every unfinished challenge with a fresh batch. Completed
    /// challenges stay as history.
    pub fn generate_challenges<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
        balance: &GameBalance,
    ) -> usize {
        self.challenges
            .retain(|_, challenge| challenge.status == ChallengeStatus::Completed);
        let batch = challenges::generate_challenges(&self.player, now, rng, balance);
        let created = batch.len();
        for challenge in batch {
            self.challenges.insert(challenge.challenge_id.clone(), challenge);
        }
        self.touch(now);
        created
    }

    /// Missing or inactive challenges are left alone.
    pub fn update_challenge_progress(
        &mut self,
        challenge_id: &str,
        delta: u32,
        now: DateTime<Utc>,
    ) -> ActionReport {
        let Some(challenge) = self.challenges.get_mut(challenge_id) else {
            return ActionReport::new("Challenge is not active");
        };
        let still_active =
            challenge.status == ChallengeStatus::Active && challenge.expires_at >= now;
        if delta == 0 && still_active {
            return ActionReport::new("No progress to record");
        }
        let report = match challenges::update_challenge_progress(&mut self.player, challenge, delta, now) {
            ProgressOutcome::Ignored => return ActionReport::new("Challenge is not active"),
            ProgressOutcome::Progressed { current, target } => {
                ActionReport::new(format!("Challenge progress: {current}/{target}"))
            }
            ProgressOutcome::Completed { .. } => ActionReport::new(format!(
                "Challenge \"{}\" completed! Rewards added.",
                challenge.title
            ))
            .with_completed(vec![challenge.challenge_id.clone()]),
        };
        self.touch(now);
        report
    }

    pub fn unlock_next_level(
        &mut self,
        now: DateTime<Utc>,
        balance: &GameBalance,
    ) -> Result<ActionReport, GameError> {
        let change = progression::unlock_next_level(&mut self.player, balance)?;
        self.touch(now);
        Ok(ActionReport::new(format!("Unlocked level {}!", change.current)).with_level(change))
    }

    fn promote_challenges(&mut self) {
        for challenge in self.challenges.values_mut() {
            challenges::promote_if_unlocked(challenge, &self.player);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use contracts::{OvenState, PlotState};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::testkit::epoch;

    fn farm() -> Farm {
        Farm::new_player("p1", epoch(), &GameBalance::default())
    }

    #[test]
    fn new_player_gets_starting_layout() {
        let farm = farm();
        assert_eq!(farm.player.coins, 150);
        assert_eq!(farm.player.seeds, 25);
        assert_eq!(farm.player.pumpkins, 8);
        assert_eq!(farm.player.level, 1);
        assert!(!farm.player.kitchen_unlocked);
        assert_eq!(farm.plots.len(), 9);
        assert_eq!(farm.ovens.len(), 1);
        assert!(farm.plots().all(|p| p.state == PlotState::Empty));
    }

    #[test]
    fn out_of_field_positions_are_rejected() {
        let balance = GameBalance::default();
        let mut farm = farm();
        let before = farm.clone();
        assert_eq!(
            farm.plant(3, 0, CropType::Pumpkin, epoch(), &balance),
            Err(GameError::InvalidPosition { row: 3, col: 0, size: 3 })
        );
        assert_eq!(farm, before);
    }

    #[test]
    fn refresh_advances_everything_that_is_due() {
        let balance = GameBalance::default();
        let mut farm = farm();
        farm.plant(0, 0, CropType::Pumpkin, epoch(), &balance)
            .expect("plant");
        farm.player.kitchen_unlocked = true;
        farm.start_baking(0, PieType::Pumpkin, epoch(), &balance)
            .expect("bake");

        let summary = farm.refresh(epoch() + Duration::minutes(59), &balance);
        assert_eq!(summary.plots_advanced, 1);
        assert_eq!(summary.ovens_ready, 1);
        assert_eq!(farm.plots[&(0, 0)].state, PlotState::Growing);
        assert_eq!(farm.ovens[&0].state, OvenState::Ready);

        let summary = farm.refresh(epoch() + Duration::minutes(60), &balance);
        assert_eq!(summary.plots_advanced, 1);
        assert!(!farm.refresh(epoch() + Duration::minutes(61), &balance).changed());
    }

    #[test]
    fn baking_needs_kitchen() {
        let balance = GameBalance::default();
        let mut farm = farm();
        assert_eq!(
            farm.start_baking(0, PieType::Pumpkin, epoch(), &balance),
            Err(GameError::LevelLocked {
                feature: "Baking".to_string(),
                required_level: 2
            })
        );
        assert_eq!(farm.player.pumpkins, 8);
        assert!(matches!(
            farm.expand_kitchen(epoch(), &balance),
            Err(GameError::LevelLocked { required_level: 2, .. })
        ));
    }

    #[test]
    fn actions_feed_matching_challenges() {
        let balance = GameBalance::default();
        let mut farm = farm();
        let mut rng = StdRng::seed_from_u64(3);
        farm.generate_challenges(epoch(), &mut rng, &balance);
        assert_eq!(farm.challenges.len(), 3);

        let plant_id = farm
            .challenges()
            .find(|c| c.challenge_type == ChallengeType::Plant)
            .map(|c| c.challenge_id.clone());

        farm.plant(0, 0, CropType::Pumpkin, epoch(), &balance)
            .expect("plant");
        if let Some(id) = plant_id {
            assert_eq!(farm.challenges[&id].current_progress, 1);
        }
        for challenge in farm.challenges() {
            if challenge.challenge_type != ChallengeType::Plant {
                assert_eq!(challenge.current_progress, 0);
            }
        }
    }

    #[test]
    fn regenerating_challenges_keeps_history_only() {
        let balance = GameBalance::default();
        let mut farm = farm();
        let mut rng = StdRng::seed_from_u64(11);
        farm.generate_challenges(epoch(), &mut rng, &balance);

        let finished = farm
            .challenges
            .keys()
            .next()
            .cloned()
            .expect("one challenge");
        if let Some(challenge) = farm.challenges.get_mut(&finished) {
            challenge.status = ChallengeStatus::Completed;
        }

        farm.generate_challenges(epoch(), &mut rng, &balance);
        assert_eq!(farm.challenges.len(), 4);
        assert_eq!(
            farm.challenges[&finished].status,
            ChallengeStatus::Completed
        );
        assert_eq!(
            farm.challenges()
                .filter(|c| c.status != ChallengeStatus::Completed)
                .count(),
            3
        );
    }

    #[test]
    fn progress_on_unknown_challenge_is_a_no_op() {
        let mut farm = farm();
        let before = farm.clone();
        let report = farm.update_challenge_progress("missing", 5, epoch());
        assert_eq!(report.message, "Challenge is not active");
        assert_eq!(farm, before);
    }

    #[test]
    fn zero_progress_on_active_challenge_is_reported_separately() {
        let balance = GameBalance::default();
        let mut farm = farm();
        let mut rng = StdRng::seed_from_u64(11);
        farm.generate_challenges(epoch(), &mut rng, &balance);
        let active = farm
            .challenges()
            .find(|c| c.status == ChallengeStatus::Active)
            .map(|c| c.challenge_id.clone())
            .expect("an active challenge");

        let before = farm.clone();
        let report = farm.update_challenge_progress(&active, 0, epoch());
        assert_eq!(report.message, "No progress to record");
        assert_eq!(farm, before);

        if let Some(challenge) = farm.challenges.get_mut(&active) {
            challenge.status = ChallengeStatus::Failed;
        }
        let report = farm.update_challenge_progress(&active, 0, epoch());
        assert_eq!(report.message, "Challenge is not active");
    }

    #[test]
    fn orders_top_up_and_fulfill_by_id() {
        let balance = GameBalance::default();
        let mut farm = farm();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(farm.generate_customer_orders(epoch(), &mut rng, &balance), 3);
        assert_eq!(farm.generate_customer_orders(epoch(), &mut rng, &balance), 0);

        assert_eq!(
            farm.fulfill_order("nope", epoch(), &balance),
            Err(GameError::not_found("Order", "nope"))
        );

        farm.player.pumpkins = 100;
        let id = farm.orders.keys().next().cloned().expect("order");
        let coins = farm.player.coins;
        farm.fulfill_order(&id, epoch(), &balance).expect("fulfill");
        assert_eq!(farm.orders[&id].status, OrderStatus::Completed);
        assert!(farm.player.coins > coins);
        assert_eq!(farm.pending_orders(), 2);
    }

    #[test]
    fn expand_field_adds_plots_and_keeps_existing() {
        let balance = GameBalance::default();
        let mut farm = farm();
        farm.plant(1, 1, CropType::Pumpkin, epoch(), &balance)
            .expect("plant");

        let (report, created) = farm.expand_field(epoch(), &balance).expect("expand");
        assert_eq!(report.message, "Field expanded to 4x4 for 50 coins!");
        assert_eq!(created.len(), 7);
        assert_eq!(farm.plots.len(), 16);
        assert_eq!(farm.plots[&(1, 1)].state, PlotState::Seedling);
        assert_eq!(farm.player.coins, 100);
    }
}
