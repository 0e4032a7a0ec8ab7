//! v1 cross-boundary contracts for the farm engine, store, and HTTP API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod bundle;

pub use bundle::{OrderRewards, ResourceBundle};

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Every counter a player can hold. Also names the tradeable items.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Coins,
    Seeds,
    #[serde(alias = "apple-seeds", alias = "apple_seeds")]
    AppleSeeds,
    Pumpkins,
    Apples,
    Pies,
    #[serde(alias = "apple-pies", alias = "apple_pies")]
    ApplePies,
    Fertilizer,
    Tools,
}

impl Resource {
    pub const ALL: [Resource; 9] = [
        Resource::Coins,
        Resource::Seeds,
        Resource::AppleSeeds,
        Resource::Pumpkins,
        Resource::Apples,
        Resource::Pies,
        Resource::ApplePies,
        Resource::Fertilizer,
        Resource::Tools,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Coins => "coins",
            Self::Seeds => "seeds",
            Self::AppleSeeds => "apple seeds",
            Self::Pumpkins => "pumpkins",
            Self::Apples => "apples",
            Self::Pies => "pies",
            Self::ApplePies => "apple pies",
            Self::Fertilizer => "fertilizer",
            Self::Tools => "tools",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    Pumpkin,
    Apple,
}

impl CropType {
    pub fn seed(self) -> Resource {
        match self {
            Self::Pumpkin => Resource::Seeds,
            Self::Apple => Resource::AppleSeeds,
        }
    }

    pub fn produce(self) -> Resource {
        match self {
            Self::Pumpkin => Resource::Pumpkins,
            Self::Apple => Resource::Apples,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PieType {
    Pumpkin,
    Apple,
}

impl PieType {
    pub fn ingredient(self) -> Resource {
        match self {
            Self::Pumpkin => Resource::Pumpkins,
            Self::Apple => Resource::Apples,
        }
    }

    pub fn pie(self) -> Resource {
        match self {
            Self::Pumpkin => Resource::Pies,
            Self::Apple => Resource::ApplePies,
        }
    }
}

/// Ordered by lifecycle position; `Ord` is what keeps growth forward-only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlotState {
    Empty,
    Seedling,
    Growing,
    Mature,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OvenState {
    Empty,
    Baking,
    Ready,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    Harvest,
    Plant,
    Bake,
    Earn,
    Expand,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    Active,
    Completed,
    Failed,
    Locked,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub level: u32,
    pub experience: u64,
    pub coins: u32,
    pub seeds: u32,
    pub apple_seeds: u32,
    pub pumpkins: u32,
    pub apples: u32,
    pub pies: u32,
    pub apple_pies: u32,
    pub fertilizer: u32,
    pub tools: u32,
    pub day: u32,
    pub field_size: u32,
    pub kitchen_slots: u32,
    pub kitchen_unlocked: bool,
    pub last_daily_collection: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

impl Player {
    pub fn count(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Coins => self.coins,
            Resource::Seeds => self.seeds,
            Resource::AppleSeeds => self.apple_seeds,
            Resource::Pumpkins => self.pumpkins,
            Resource::Apples => self.apples,
            Resource::Pies => self.pies,
            Resource::ApplePies => self.apple_pies,
            Resource::Fertilizer => self.fertilizer,
            Resource::Tools => self.tools,
        }
    }

    pub fn counter_mut(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Coins => &mut self.coins,
            Resource::Seeds => &mut self.seeds,
            Resource::AppleSeeds => &mut self.apple_seeds,
            Resource::Pumpkins => &mut self.pumpkins,
            Resource::Apples => &mut self.apples,
            Resource::Pies => &mut self.pies,
            Resource::ApplePies => &mut self.apple_pies,
            Resource::Fertilizer => &mut self.fertilizer,
            Resource::Tools => &mut self.tools,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "player={} level={} xp={} coins={} seeds={} apple_seeds={} pumpkins={} apples={} pies={} apple_pies={} fertilizer={} tools={} field={}x{} ovens={}",
            self.id,
            self.level,
            self.experience,
            self.coins,
            self.seeds,
            self.apple_seeds,
            self.pumpkins,
            self.apples,
            self.pies,
            self.apple_pies,
            self.fertilizer,
            self.tools,
            self.field_size,
            self.field_size,
            self.kitchen_slots
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    pub player_id: String,
    pub row: u32,
    pub col: u32,
    pub state: PlotState,
    pub crop_type: Option<CropType>,
    pub planted_at: Option<DateTime<Utc>>,
    pub fertilized: bool,
}

impl Plot {
    pub fn empty(player_id: impl Into<String>, row: u32, col: u32) -> Self {
        Self {
            player_id: player_id.into(),
            row,
            col,
            state: PlotState::Empty,
            crop_type: None,
            planted_at: None,
            fertilized: false,
        }
    }

    pub fn position(&self) -> (u32, u32) {
        (self.row, self.col)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Oven {
    pub player_id: String,
    pub slot_number: u32,
    pub state: OvenState,
    pub pie_type: Option<PieType>,
    pub started_at: Option<DateTime<Utc>>,
}

impl Oven {
    pub fn empty(player_id: impl Into<String>, slot_number: u32) -> Self {
        Self {
            player_id: player_id.into(),
            slot_number,
            state: OvenState::Empty,
            pie_type: None,
            started_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalChallenge {
    pub player_id: String,
    pub challenge_id: String,
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub title: String,
    pub description: String,
    pub target_value: u32,
    pub current_progress: u32,
    pub rewards: ResourceBundle,
    pub status: ChallengeStatus,
    pub difficulty: u8,
    pub expires_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrder {
    pub player_id: String,
    pub order_id: String,
    pub customer_name: String,
    pub required_items: ResourceBundle,
    pub rewards: OrderRewards,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatus {
    pub can_collect: bool,
    pub hours_until_next: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    InsufficientInventory,
    InvalidState,
    LimitReached,
    LevelLocked,
    CooldownActive,
    InvalidRequest,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_until_next: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_level: Option<u32>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
            hours_until_next: None,
            required_level: None,
        }
    }
}
