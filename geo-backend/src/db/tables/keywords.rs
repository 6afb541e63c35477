//! Keyword table operations

use rusqlite::Result as SqliteResult;

use super::parse_ts;
use crate::db::Database;
use crate::models::{Keyword, KeywordSource};

impl Database {
    pub fn save_keyword(&self, kw: &Keyword) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO keywords (id, brand, keyword, source, category, intent, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                kw.id,
                kw.brand,
                kw.keyword,
                kw.source.as_str(),
                kw.category,
                kw.intent,
                kw.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// List keywords, newest first, optionally filtered by brand
    pub fn list_keywords(&self, brand: Option<&str>) -> SqliteResult<Vec<Keyword>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, brand, keyword, source, category, intent, created_at
             FROM keywords
             WHERE (?1 IS NULL OR brand = ?1)
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([brand], |row| {
            let source: String = row.get(3)?;
            let created_at: String = row.get(6)?;
            Ok(Keyword {
                id: row.get(0)?,
                brand: row.get(1)?,
                keyword: row.get(2)?,
                source: KeywordSource::from_str(&source),
                category: row.get(4)?,
                intent: row.get(5)?,
                created_at: parse_ts(&created_at),
            })
        })?;
        rows.collect()
    }
}
