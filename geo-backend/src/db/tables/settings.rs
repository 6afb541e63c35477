//! App settings (single row) and per-provider API keys

use rusqlite::Result as SqliteResult;

use super::parse_ts;
use crate::db::Database;
use crate::models::{AppSettings, ProviderKey, UpdateAppSettingsRequest};

impl Database {
    pub fn get_app_settings(&self) -> SqliteResult<AppSettings> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, brand, active_provider, default_platform, default_word_count,
                    created_at, updated_at
             FROM app_settings ORDER BY id LIMIT 1",
            [],
            |row| {
                let created_at: String = row.get(5)?;
                let updated_at: String = row.get(6)?;
                Ok(AppSettings {
                    id: row.get(0)?,
                    brand: row.get(1)?,
                    active_provider: row.get(2)?,
                    default_platform: row.get(3)?,
                    default_word_count: row.get(4)?,
                    created_at: parse_ts(&created_at),
                    updated_at: parse_ts(&updated_at),
                })
            },
        )
    }

    /// Partial update: only the fields present in the request change.
    pub fn update_app_settings(&self, req: &UpdateAppSettingsRequest) -> SqliteResult<AppSettings> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "UPDATE app_settings SET
                     brand = COALESCE(?1, brand),
                     active_provider = COALESCE(?2, active_provider),
                     default_platform = COALESCE(?3, default_platform),
                     default_word_count = COALESCE(?4, default_word_count),
                     updated_at = ?5
                 WHERE id = (SELECT id FROM app_settings ORDER BY id LIMIT 1)",
                rusqlite::params![
                    req.brand,
                    req.active_provider,
                    req.default_platform,
                    req.default_word_count,
                    chrono::Utc::now().to_rfc3339(),
                ],
            )?;
        }
        self.get_app_settings()
    }

    pub fn upsert_provider_key(
        &self,
        provider: &str,
        api_key: &str,
        model: Option<&str>,
        endpoint: Option<&str>,
        enabled: bool,
    ) -> SqliteResult<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO provider_keys (provider, api_key, model, endpoint, enabled,
                                        created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(provider) DO UPDATE SET
                 api_key = excluded.api_key,
                 model = excluded.model,
                 endpoint = excluded.endpoint,
                 enabled = excluded.enabled,
                 updated_at = excluded.updated_at",
            rusqlite::params![provider, api_key, model, endpoint, enabled as i64, now],
        )?;
        Ok(())
    }

    pub fn get_provider_key(&self, provider: &str) -> SqliteResult<Option<ProviderKey>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, provider, api_key, model, endpoint, enabled, created_at, updated_at
             FROM provider_keys WHERE provider = ?1",
        )?;
        let mut rows = stmt.query_map([provider], map_provider_key)?;
        rows.next().transpose()
    }

    pub fn list_provider_keys(&self) -> SqliteResult<Vec<ProviderKey>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, provider, api_key, model, endpoint, enabled, created_at, updated_at
             FROM provider_keys ORDER BY provider",
        )?;
        let rows = stmt.query_map([], map_provider_key)?;
        rows.collect()
    }

    pub fn delete_provider_key(&self, provider: &str) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM provider_keys WHERE provider = ?1", [provider])?;
        Ok(changed > 0)
    }
}

fn map_provider_key(row: &rusqlite::Row<'_>) -> SqliteResult<ProviderKey> {
    let enabled: i64 = row.get(5)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(ProviderKey {
        id: row.get(0)?,
        provider: row.get(1)?,
        api_key: row.get(2)?,
        model: row.get(3)?,
        endpoint: row.get(4)?,
        enabled: enabled != 0,
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
    })
}
