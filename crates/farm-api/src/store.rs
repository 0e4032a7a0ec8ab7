use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use contracts::{CustomerOrder, Oven, Player, Plot, SeasonalChallenge};
use farm_core::Farm;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("store connection lock was poisoned")]
    Poisoned,
}

/// Keyed record storage for whole farms. One player and its child rows are
/// always written together.
pub trait FarmStore: Send + Sync {
    fn load_farm(&self, player_id: &str) -> Result<Option<Farm>, StoreError>;
    fn save_farm(&self, farm: &Farm) -> Result<(), StoreError>;
    fn player_exists(&self, player_id: &str) -> Result<bool, StoreError>;
    fn list_player_ids(&self) -> Result<Vec<String>, StoreError>;
}

#[derive(Debug)]
pub struct SqliteFarmStore {
    conn: Mutex<Connection>,
}

impl SqliteFarmStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl FarmStore for SqliteFarmStore {
    fn load_farm(&self, player_id: &str) -> Result<Option<Farm>, StoreError> {
        let conn = self.conn()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload_json FROM players WHERE player_id = ?1",
                params![player_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(raw) = payload else {
            return Ok(None);
        };
        let player = serde_json::from_str::<Player>(&raw)?;

        let plots = load_payloads::<Plot>(
            &conn,
            "SELECT payload_json FROM plots WHERE player_id = ?1 ORDER BY plot_row ASC, plot_col ASC",
            player_id,
        )?;
        let ovens = load_payloads::<Oven>(
            &conn,
            "SELECT payload_json FROM ovens WHERE player_id = ?1 ORDER BY slot_number ASC",
            player_id,
        )?;
        let orders = load_payloads::<CustomerOrder>(
            &conn,
            "SELECT payload_json FROM orders WHERE player_id = ?1 ORDER BY created_at ASC",
            player_id,
        )?;
        let challenges = load_payloads::<SeasonalChallenge>(
            &conn,
            "SELECT payload_json FROM challenges WHERE player_id = ?1 ORDER BY challenge_id ASC",
            player_id,
        )?;

        Ok(Some(Farm::from_parts(player, plots, ovens, orders, challenges)))
    }

    fn save_farm(&self, farm: &Farm) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let player = &farm.player;

        tx.execute(
            "INSERT INTO players (player_id, level, payload_json, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(player_id) DO UPDATE SET
                level = excluded.level,
                payload_json = excluded.payload_json,
                updated_at = excluded.updated_at",
            params![
                player.id.as_str(),
                i64::from(player.level),
                serde_json::to_string(player)?,
                player.last_updated.to_rfc3339(),
            ],
        )?;

        for plot in farm.plots() {
            tx.execute(
                "INSERT INTO plots (player_id, plot_row, plot_col, state, payload_json)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(player_id, plot_row, plot_col) DO UPDATE SET
                    state = excluded.state,
                    payload_json = excluded.payload_json",
                params![
                    player.id.as_str(),
                    i64::from(plot.row),
                    i64::from(plot.col),
                    label(&plot.state)?,
                    serde_json::to_string(plot)?,
                ],
            )?;
        }
        tx.execute(
            "DELETE FROM plots WHERE player_id = ?1 AND (plot_row >= ?2 OR plot_col >= ?2)",
            params![player.id.as_str(), i64::from(player.field_size)],
        )?;

        for oven in farm.ovens() {
            tx.execute(
                "INSERT INTO ovens (player_id, slot_number, state, payload_json)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(player_id, slot_number) DO UPDATE SET
                    state = excluded.state,
                    payload_json = excluded.payload_json",
                params![
                    player.id.as_str(),
                    i64::from(oven.slot_number),
                    label(&oven.state)?,
                    serde_json::to_string(oven)?,
                ],
            )?;
        }
        tx.execute(
            "DELETE FROM ovens WHERE player_id = ?1 AND slot_number >= ?2",
            params![player.id.as_str(), i64::from(player.kitchen_slots)],
        )?;

        for order in farm.orders() {
            tx.execute(
                "INSERT INTO orders (player_id, order_id, status, created_at, payload_json)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(player_id, order_id) DO UPDATE SET
                    status = excluded.status,
                    payload_json = excluded.payload_json",
                params![
                    player.id.as_str(),
                    order.order_id.as_str(),
                    label(&order.status)?,
                    order.created_at.to_rfc3339(),
                    serde_json::to_string(order)?,
                ],
            )?;
        }
        let keep = farm.orders.keys().cloned().collect();
        prune(&tx, "orders", "order_id", &player.id, &keep)?;

        for challenge in farm.challenges() {
            tx.execute(
                "INSERT INTO challenges (player_id, challenge_id, status, payload_json)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(player_id, challenge_id) DO UPDATE SET
                    status = excluded.status,
                    payload_json = excluded.payload_json",
                params![
                    player.id.as_str(),
                    challenge.challenge_id.as_str(),
                    label(&challenge.status)?,
                    serde_json::to_string(challenge)?,
                ],
            )?;
        }
        let keep = farm.challenges.keys().cloned().collect();
        prune(&tx, "challenges", "challenge_id", &player.id, &keep)?;

        tx.commit()?;
        Ok(())
    }

    fn player_exists(&self, player_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM players WHERE player_id = ?1",
                params![player_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn list_player_ids(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT player_id FROM players ORDER BY player_id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}

fn load_payloads<T: DeserializeOwned>(
    conn: &Connection,
    sql: &str,
    player_id: &str,
) -> Result<Vec<T>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![player_id], |row| row.get::<_, String>(0))?;

    let mut records = Vec::new();
    for row in rows {
        let payload = row?;
        records.push(serde_json::from_str::<T>(&payload)?);
    }
    Ok(records)
}

/// Deletes child rows whose key is no longer part of the aggregate.
fn prune(
    tx: &Transaction<'_>,
    table: &str,
    key_column: &str,
    player_id: &str,
    keep: &BTreeSet<String>,
) -> Result<(), StoreError> {
    let stale = {
        let mut stmt = tx.prepare(&format!(
            "SELECT {key_column} FROM {table} WHERE player_id = ?1"
        ))?;
        let rows = stmt.query_map(params![player_id], |row| row.get::<_, String>(0))?;
        let mut stale = Vec::new();
        for row in rows {
            let key = row?;
            if !keep.contains(&key) {
                stale.push(key);
            }
        }
        stale
    };

    for key in stale {
        tx.execute(
            &format!("DELETE FROM {table} WHERE player_id = ?1 AND {key_column} = ?2"),
            params![player_id, key],
        )?;
    }
    Ok(())
}

/// The serde spelling of an enum, used for the indexed status columns.
fn label<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?.trim_matches('"').to_string())
}

fn migrate(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS players (
            player_id TEXT PRIMARY KEY,
            level INTEGER NOT NULL,
            payload_json TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS plots (
            player_id TEXT NOT NULL REFERENCES players(player_id) ON DELETE CASCADE,
            plot_row INTEGER NOT NULL,
            plot_col INTEGER NOT NULL,
            state TEXT NOT NULL,
            payload_json TEXT NOT NULL,
            PRIMARY KEY (player_id, plot_row, plot_col)
        );

        CREATE TABLE IF NOT EXISTS ovens (
            player_id TEXT NOT NULL REFERENCES players(player_id) ON DELETE CASCADE,
            slot_number INTEGER NOT NULL,
            state TEXT NOT NULL,
            payload_json TEXT NOT NULL,
            PRIMARY KEY (player_id, slot_number)
        );

        CREATE TABLE IF NOT EXISTS orders (
            player_id TEXT NOT NULL REFERENCES players(player_id) ON DELETE CASCADE,
            order_id TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            payload_json TEXT NOT NULL,
            PRIMARY KEY (player_id, order_id)
        );

        CREATE TABLE IF NOT EXISTS challenges (
            player_id TEXT NOT NULL REFERENCES players(player_id) ON DELETE CASCADE,
            challenge_id TEXT NOT NULL,
            status TEXT NOT NULL,
            payload_json TEXT NOT NULL,
            PRIMARY KEY (player_id, challenge_id)
        );

        CREATE INDEX IF NOT EXISTS idx_orders_player_status ON orders(player_id, status);
        CREATE INDEX IF NOT EXISTS idx_challenges_player_status ON challenges(player_id, status);
        ",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations(version, name, applied_at)
         VALUES(1, 'initial_v1', ?1)",
        params![Utc::now().to_rfc3339()],
    )?;

    Ok(())
}
