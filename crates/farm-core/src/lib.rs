//! Time-driven progression engine: crop growth, baking, economy, daily coins,
//! orders, challenges and leveling, all as pure functions of `(record, now)`.

pub mod balance;
pub mod challenges;
pub mod clock;
pub mod daily;
pub mod economy;
pub mod error;
pub mod farm;
pub mod orders;
pub mod oven;
pub mod plot;
pub mod progression;

pub use balance::{BalanceError, GameBalance, XpRewards};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ErrorKind, GameError};
pub use farm::{ActionReport, Farm, RefreshSummary};
pub use progression::LevelChange;
