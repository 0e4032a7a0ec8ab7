use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use contracts::{CropType, PieType, Resource};
use farm_core::{ActionReport, Clock, Farm, GameBalance, GameError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::locks::PlayerLocks;
use crate::store::{FarmStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The farm after an operation, plus what the operation produced.
#[derive(Debug, Clone)]
pub struct Applied<T> {
    pub farm: Farm,
    pub outcome: T,
}

/// Load -> refresh -> apply -> save, serialized per player.
pub struct FarmService {
    store: Arc<dyn FarmStore>,
    locks: PlayerLocks,
    clock: Arc<dyn Clock>,
    balance: GameBalance,
    rng: Mutex<StdRng>,
}

impl FarmService {
    pub fn new(store: Arc<dyn FarmStore>, clock: Arc<dyn Clock>, balance: GameBalance) -> Self {
        Self::with_rng(store, clock, balance, StdRng::from_entropy())
    }

    pub fn with_rng(
        store: Arc<dyn FarmStore>,
        clock: Arc<dyn Clock>,
        balance: GameBalance,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            locks: PlayerLocks::new(),
            clock,
            balance,
            rng: Mutex::new(rng),
        }
    }

    pub fn balance(&self) -> &GameBalance {
        &self.balance
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn store(&self) -> &dyn FarmStore {
        self.store.as_ref()
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        // The generator has no invariants a panic could break.
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates the player with starting inventory unless it already exists.
    /// Returns whether a new farm was written.
    pub async fn ensure_player(&self, player_id: &str) -> Result<bool, ServiceError> {
        let _guard = self.locks.acquire(player_id).await;
        if self.store.player_exists(player_id)? {
            return Ok(false);
        }
        let farm = Farm::new_player(player_id, self.now(), &self.balance);
        self.store.save_farm(&farm)?;
        tracing::info!(player_id, "player created");
        Ok(true)
    }

    pub async fn create_player(&self) -> Result<Farm, ServiceError> {
        let player_id = uuid::Builder::from_random_bytes(self.rng().gen())
            .into_uuid()
            .to_string();
        self.ensure_player(&player_id).await?;
        self.view(&player_id).await
    }

    /// Runs `op` against the refreshed farm while holding the player's lock.
    /// The refreshed state is saved even when `op` rejects the action.
    pub async fn apply<T>(
        &self,
        player_id: &str,
        op: impl FnOnce(&mut Farm, DateTime<Utc>, &GameBalance, &mut StdRng) -> Result<T, GameError>,
    ) -> Result<Applied<T>, ServiceError> {
        let _guard = self.locks.acquire(player_id).await;
        let mut farm = self
            .store
            .load_farm(player_id)?
            .ok_or_else(|| GameError::not_found("Player", player_id))?;

        let now = self.now();
        let refreshed = farm.refresh(now, &self.balance);

        let result = {
            let mut rng = self.rng();
            op(&mut farm, now, &self.balance, &mut rng)
        };

        match result {
            Ok(outcome) => {
                self.store.save_farm(&farm)?;
                Ok(Applied { farm, outcome })
            }
            Err(err) => {
                if refreshed.changed() {
                    self.store.save_farm(&farm)?;
                }
                tracing::debug!(player_id, error = %err, "action rejected");
                Err(err.into())
            }
        }
    }

    /// Refreshed farm without applying an action. Lazily derived changes are
    /// persisted so later reads agree.
    pub async fn view(&self, player_id: &str) -> Result<Farm, ServiceError> {
        let _guard = self.locks.acquire(player_id).await;
        let mut farm = self
            .store
            .load_farm(player_id)?
            .ok_or_else(|| GameError::not_found("Player", player_id))?;
        if farm.refresh(self.now(), &self.balance).changed() {
            self.store.save_farm(&farm)?;
        }
        Ok(farm)
    }

    pub async fn plant(
        &self,
        player_id: &str,
        row: u32,
        col: u32,
        crop: CropType,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, balance, _| {
            farm.plant(row, col, crop, now, balance)
        })
        .await
    }

    pub async fn harvest(
        &self,
        player_id: &str,
        row: u32,
        col: u32,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, balance, _| {
            farm.harvest(row, col, now, balance)
        })
        .await
    }

    pub async fn fertilize(
        &self,
        player_id: &str,
        row: u32,
        col: u32,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, _, _| farm.fertilize(row, col, now))
            .await
    }

    pub async fn start_baking(
        &self,
        player_id: &str,
        slot_number: u32,
        pie: PieType,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, balance, _| {
            farm.start_baking(slot_number, pie, now, balance)
        })
        .await
    }

    pub async fn collect_pie(
        &self,
        player_id: &str,
        slot_number: u32,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, balance, _| {
            farm.collect_pie(slot_number, now, balance)
        })
        .await
    }

    pub async fn buy(
        &self,
        player_id: &str,
        resource: Resource,
        quantity: u32,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, balance, _| {
            farm.buy(resource, quantity, now, balance)
        })
        .await
    }

    pub async fn sell(
        &self,
        player_id: &str,
        resource: Resource,
        quantity: u32,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, balance, _| {
            farm.sell(resource, quantity, now, balance)
        })
        .await
    }

    pub async fn expand_field(&self, player_id: &str) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, balance, _| {
            farm.expand_field(now, balance).map(|(report, _)| report)
        })
        .await
    }

    pub async fn expand_kitchen(
        &self,
        player_id: &str,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, balance, _| {
            farm.expand_kitchen(now, balance).map(|(report, _)| report)
        })
        .await
    }

    pub async fn collect_daily_coins(
        &self,
        player_id: &str,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, balance, _| {
            farm.collect_daily_coins(now, balance)
        })
        .await
    }

    pub async fn reset_daily_timer(
        &self,
        player_id: &str,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, _, _| Ok(farm.reset_daily_timer(now)))
            .await
    }

    pub async fn fulfill_order(
        &self,
        player_id: &str,
        order_id: &str,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, balance, _| {
            farm.fulfill_order(order_id, now, balance)
        })
        .await
    }

    /// Returns how many orders were created.
    pub async fn generate_orders(&self, player_id: &str) -> Result<Applied<usize>, ServiceError> {
        self.apply(player_id, |farm, now, balance, rng| {
            Ok(farm.generate_customer_orders(now, rng, balance))
        })
        .await
    }

    pub async fn generate_challenges(
        &self,
        player_id: &str,
    ) -> Result<Applied<usize>, ServiceError> {
        self.apply(player_id, |farm, now, balance, rng| {
            Ok(farm.generate_challenges(now, rng, balance))
        })
        .await
    }

    pub async fn update_challenge_progress(
        &self,
        player_id: &str,
        challenge_id: &str,
        delta: u32,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, _, _| {
            Ok(farm.update_challenge_progress(challenge_id, delta, now))
        })
        .await
    }

    pub async fn unlock_next_level(
        &self,
        player_id: &str,
    ) -> Result<Applied<ActionReport>, ServiceError> {
        self.apply(player_id, |farm, now, balance, _| {
            farm.unlock_next_level(now, balance)
        })
        .await
    }
}
