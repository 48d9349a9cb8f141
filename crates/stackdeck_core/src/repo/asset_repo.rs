//! Keyed binary or text assets, such as the board background image.
//!
//! # Invariants
//! - One record per key; `put_asset` overwrites.
//! - `binary` rows carry `bytes`, `data_url` rows carry `text`.

use crate::model::AssetValue;
use crate::repo::{ensure_connection_ready, StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};

const KIND_BINARY: &str = "binary";
const KIND_DATA_URL: &str = "data_url";

pub trait AssetRepository {
    fn put_asset(&self, key: &str, value: &AssetValue) -> StoreResult<()>;
    fn get_asset(&self, key: &str) -> StoreResult<Option<AssetValue>>;
    /// Returns whether a record was removed.
    fn delete_asset(&self, key: &str) -> StoreResult<bool>;
}

pub struct SqliteAssetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssetRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AssetRepository for SqliteAssetRepository<'_> {
    fn put_asset(&self, key: &str, value: &AssetValue) -> StoreResult<()> {
        let (kind, bytes, text) = match value {
            AssetValue::Binary(bytes) => (KIND_BINARY, Some(bytes.as_slice()), None),
            AssetValue::DataUrl(url) => (KIND_DATA_URL, None, Some(url.as_str())),
        };
        self.conn.execute(
            "INSERT INTO assets (key, kind, bytes, text, updated_at)
             VALUES (?1, ?2, ?3, ?4, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                kind = excluded.kind,
                bytes = excluded.bytes,
                text = excluded.text,
                updated_at = excluded.updated_at;",
            params![key, kind, bytes, text],
        )?;
        Ok(())
    }

    fn get_asset(&self, key: &str) -> StoreResult<Option<AssetValue>> {
        let row = self
            .conn
            .query_row(
                "SELECT kind, bytes, text FROM assets WHERE key = ?1;",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<Vec<u8>>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((kind, bytes, text)) = row else {
            return Ok(None);
        };
        match (kind.as_str(), bytes, text) {
            (KIND_BINARY, Some(bytes), _) => Ok(Some(AssetValue::Binary(bytes))),
            (KIND_DATA_URL, _, Some(text)) => Ok(Some(AssetValue::DataUrl(text))),
            (other, _, _) => Err(StoreError::InvalidData(format!(
                "asset `{key}` has kind `{other}` without matching payload"
            ))),
        }
    }

    fn delete_asset(&self, key: &str) -> StoreResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM assets WHERE key = ?1;", params![key])?;
        Ok(removed > 0)
    }
}
