//! Verification-result table operations

use rusqlite::Result as SqliteResult;

use super::parse_ts;
use crate::db::Database;
use crate::models::{VerifyRatePoint, VerifyResult};

impl Database {
    pub fn save_verify_result(&self, result: &VerifyResult) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO verify_results (id, brand, keyword, provider, question,
                                         mentioned, mention_count, excerpt, error, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                result.id,
                result.brand,
                result.keyword,
                result.provider,
                result.question,
                result.mentioned as i64,
                result.mention_count,
                result.excerpt,
                result.error,
                result.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_verify_results(&self, brand: Option<&str>) -> SqliteResult<Vec<VerifyResult>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, brand, keyword, provider, question, mentioned, mention_count,
                    excerpt, error, created_at
             FROM verify_results
             WHERE (?1 IS NULL OR brand = ?1)
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([brand], |row| {
            let mentioned: i64 = row.get(5)?;
            let created_at: String = row.get(9)?;
            Ok(VerifyResult {
                id: row.get(0)?,
                brand: row.get(1)?,
                keyword: row.get(2)?,
                provider: row.get(3)?,
                question: row.get(4)?,
                mentioned: mentioned != 0,
                mention_count: row.get(6)?,
                excerpt: row.get(7)?,
                error: row.get(8)?,
                created_at: parse_ts(&created_at),
            })
        })?;
        rows.collect()
    }

    /// Daily mention-rate buckets per provider, oldest day first. Errored
    /// rows count toward `errors` but stay out of the rate denominator.
    pub fn verify_rate_over_time(
        &self,
        brand: Option<&str>,
    ) -> SqliteResult<Vec<VerifyRatePoint>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT substr(created_at, 1, 10) AS day, provider,
                    SUM(CASE WHEN error IS NULL THEN 1 ELSE 0 END),
                    SUM(CASE WHEN error IS NULL AND mentioned != 0 THEN 1 ELSE 0 END),
                    SUM(CASE WHEN error IS NOT NULL THEN 1 ELSE 0 END)
             FROM verify_results
             WHERE (?1 IS NULL OR brand = ?1)
             GROUP BY day, provider
             ORDER BY day, provider",
        )?;
        let rows = stmt.query_map([brand], |row| {
            let checked: i64 = row.get(2)?;
            let mentioned: i64 = row.get(3)?;
            Ok(VerifyRatePoint {
                day: row.get(0)?,
                provider: row.get(1)?,
                checked,
                mentioned,
                errors: row.get(4)?,
                mention_rate: if checked == 0 {
                    0.0
                } else {
                    mentioned as f64 / checked as f64
                },
            })
        })?;
        rows.collect()
    }
}
