//! Platform accounts and publish records

use rusqlite::Result as SqliteResult;

use super::parse_ts;
use crate::db::Database;
use crate::models::{PlatformAccount, PublishRecord};

impl Database {
    /// Upsert on (platform, username).
    pub fn save_platform_account(&self, account: &PlatformAccount) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO platform_accounts (id, platform, username, credential, enabled, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(platform, username) DO UPDATE SET
                 credential = excluded.credential,
                 enabled = excluded.enabled",
            rusqlite::params![
                account.id,
                account.platform,
                account.username,
                account.credential,
                account.enabled as i64,
                account.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_platform_accounts(&self) -> SqliteResult<Vec<PlatformAccount>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, platform, username, credential, enabled, created_at
             FROM platform_accounts
             ORDER BY platform, username",
        )?;
        let rows = stmt.query_map([], |row| {
            let enabled: i64 = row.get(4)?;
            let created_at: String = row.get(5)?;
            Ok(PlatformAccount {
                id: row.get(0)?,
                platform: row.get(1)?,
                username: row.get(2)?,
                credential: row.get(3)?,
                enabled: enabled != 0,
                created_at: parse_ts(&created_at),
            })
        })?;
        rows.collect()
    }

    pub fn delete_platform_account(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM platform_accounts WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    pub fn save_publish_record(&self, record: &PublishRecord) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO publish_records (id, article_id, platform, url, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                record.id,
                record.article_id,
                record.platform,
                record.url,
                record.status,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_publish_records(&self, article_id: Option<&str>) -> SqliteResult<Vec<PublishRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, article_id, platform, url, status, created_at
             FROM publish_records
             WHERE (?1 IS NULL OR article_id = ?1)
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([article_id], |row| {
            let created_at: String = row.get(5)?;
            Ok(PublishRecord {
                id: row.get(0)?,
                article_id: row.get(1)?,
                platform: row.get(2)?,
                url: row.get(3)?,
                status: row.get(4)?,
                created_at: parse_ts(&created_at),
            })
        })?;
        rows.collect()
    }
}
