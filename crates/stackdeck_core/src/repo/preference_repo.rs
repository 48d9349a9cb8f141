//! Display preference storage.

use crate::config::DisplayPreferences;
use crate::repo::{ensure_connection_ready, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};

const DISPLAY_PREFERENCES_KEY: &str = "display";

pub trait PreferenceRepository {
    fn load_preferences(&self) -> StoreResult<Option<DisplayPreferences>>;
    fn save_preferences(&self, preferences: &DisplayPreferences) -> StoreResult<()>;
}

pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PreferenceRepository for SqlitePreferenceRepository<'_> {
    fn load_preferences(&self) -> StoreResult<Option<DisplayPreferences>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1;",
                params![DISPLAY_PREFERENCES_KEY],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(raw) => {
                let preferences: DisplayPreferences = serde_json::from_str(&raw)?;
                Ok(Some(preferences.clamped()))
            }
            None => Ok(None),
        }
    }

    fn save_preferences(&self, preferences: &DisplayPreferences) -> StoreResult<()> {
        let raw = serde_json::to_string(&preferences.clamped())?;
        self.conn.execute(
            "INSERT INTO preferences (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![DISPLAY_PREFERENCES_KEY, raw],
        )?;
        Ok(())
    }
}
