use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Slot = Arc<Mutex<()>>;

/// One async mutex per player id. Requests for the same player run one at a
/// time; different players never wait on each other. A slot lives only while
/// someone holds or waits for it.
#[derive(Debug, Default, Clone)]
pub struct PlayerLocks {
    slots: Arc<DashMap<String, Slot>>,
}

/// Holds a player's lock. Releasing the last interest in the slot removes it
/// from the map.
#[derive(Debug)]
pub struct PlayerGuard {
    guard: Option<OwnedMutexGuard<()>>,
    slots: Arc<DashMap<String, Slot>>,
    player_id: String,
}

impl PlayerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, player_id: &str) -> PlayerGuard {
        // Clone the slot out so the map shard is not held across the await.
        let slot = self
            .slots
            .entry(player_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = slot.lock_owned().await;
        PlayerGuard {
            guard: Some(guard),
            slots: Arc::clone(&self.slots),
            player_id: player_id.to_string(),
        }
    }

    pub fn tracked(&self) -> usize {
        self.slots.len()
    }
}

impl Drop for PlayerGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map still points at the slot: no holder, no waiter.
        self.slots
            .remove_if(&self.player_id, |_, slot| Arc::strong_count(slot) == 1);
    }
}
