use contracts::{ErrorCode, Resource};

/// The taxonomy every engine failure folds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InsufficientInventory,
    InvalidState,
    LimitReached,
    LevelLocked,
    CooldownActive,
    InvalidRequest,
}

impl ErrorKind {
    pub fn code(self) -> ErrorCode {
        match self {
            Self::NotFound => ErrorCode::NotFound,
            Self::InsufficientInventory => ErrorCode::InsufficientInventory,
            Self::InvalidState => ErrorCode::InvalidState,
            Self::LimitReached => ErrorCode::LimitReached,
            Self::LevelLocked => ErrorCode::LevelLocked,
            Self::CooldownActive => ErrorCode::CooldownActive,
            Self::InvalidRequest => ErrorCode::InvalidRequest,
        }
    }
}

/// Expected, caller-recoverable outcomes of engine operations.
///
/// Display strings are the messages the web client shows verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Not enough {resource}")]
    InsufficientInventory {
        resource: Resource,
        required: u32,
        available: u32,
    },

    #[error("Not enough coins. This costs {required} coins")]
    InsufficientFunds { required: u32, available: u32 },

    #[error("Plot is not available for planting")]
    PlotNotEmpty,

    #[error("Only growing crops can be fertilized")]
    InvalidPlotState,

    #[error("This crop has already been fertilized")]
    AlreadyFertilized,

    #[error("Plot is not ready for harvest")]
    PlotNotMature,

    #[error("Oven is already in use")]
    OvenNotEmpty,

    #[error("Pie is not ready yet")]
    PieNotReady,

    #[error("{what} is already at maximum size ({max})")]
    MaxSizeReached { what: &'static str, max: u32 },

    #[error("{feature} unlocks at level {required_level}")]
    LevelLocked {
        feature: String,
        required_level: u32,
    },

    #[error("Level {required_level} is required to unlock further levels with tools")]
    LevelTooLow { required_level: u32, level: u32 },

    #[error("Daily coins already collected. Come back in {hours_remaining} hours")]
    CooldownActive { hours_remaining: u32 },

    #[error("Order is no longer available")]
    OrderUnavailable,

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("{0} cannot be traded here")]
    NotForSale(Resource),

    #[error("Position ({row}, {col}) is outside the {size}x{size} field")]
    InvalidPosition { row: u32, col: u32, size: u32 },
}

impl GameError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientInventory { .. } | Self::InsufficientFunds { .. } => {
                ErrorKind::InsufficientInventory
            }
            Self::PlotNotEmpty
            | Self::InvalidPlotState
            | Self::AlreadyFertilized
            | Self::PlotNotMature
            | Self::OvenNotEmpty
            | Self::PieNotReady
            | Self::OrderUnavailable => ErrorKind::InvalidState,
            Self::MaxSizeReached { .. } => ErrorKind::LimitReached,
            Self::LevelLocked { .. } | Self::LevelTooLow { .. } => ErrorKind::LevelLocked,
            Self::CooldownActive { .. } => ErrorKind::CooldownActive,
            Self::InvalidQuantity | Self::NotForSale(_) | Self::InvalidPosition { .. } => {
                ErrorKind::InvalidRequest
            }
        }
    }

    pub fn required_level(&self) -> Option<u32> {
        match self {
            Self::LevelLocked { required_level, .. } | Self::LevelTooLow { required_level, .. } => {
                Some(*required_level)
            }
            _ => None,
        }
    }

    pub fn hours_remaining(&self) -> Option<u32> {
        match self {
            Self::CooldownActive { hours_remaining } => Some(*hours_remaining),
            _ => None,
        }
    }
}
