//! API-call ledger and cost aggregation

use rusqlite::Result as SqliteResult;

use super::parse_ts;
use crate::db::Database;
use crate::models::{ApiCall, CostSummary, ProviderCost};

impl Database {
    pub fn log_api_call(&self, call: &ApiCall) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO api_calls (id, provider, model, operation, prompt_tokens,
                                    completion_tokens, cost_usd, success, error, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                call.id,
                call.provider,
                call.model,
                call.operation,
                call.prompt_tokens,
                call.completion_tokens,
                call.cost_usd,
                call.success as i64,
                call.error,
                call.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_api_calls(&self, limit: i64) -> SqliteResult<Vec<ApiCall>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, provider, model, operation, prompt_tokens, completion_tokens,
                    cost_usd, success, error, created_at
             FROM api_calls
             ORDER BY created_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], |row| {
            let success: i64 = row.get(7)?;
            let created_at: String = row.get(9)?;
            Ok(ApiCall {
                id: row.get(0)?,
                provider: row.get(1)?,
                model: row.get(2)?,
                operation: row.get(3)?,
                prompt_tokens: row.get(4)?,
                completion_tokens: row.get(5)?,
                cost_usd: row.get(6)?,
                success: success != 0,
                error: row.get(8)?,
                created_at: parse_ts(&created_at),
            })
        })?;
        rows.collect()
    }

    /// Totals plus a per-provider breakdown over an optional RFC3339 date range.
    pub fn cost_summary(
        &self,
        since: Option<&str>,
        until: Option<&str>,
    ) -> SqliteResult<CostSummary> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT provider,
                    COUNT(*),
                    SUM(CASE WHEN success = 0 THEN 1 ELSE 0 END),
                    COALESCE(SUM(prompt_tokens), 0),
                    COALESCE(SUM(completion_tokens), 0),
                    COALESCE(SUM(cost_usd), 0.0)
             FROM api_calls
             WHERE (?1 IS NULL OR created_at >= ?1)
               AND (?2 IS NULL OR created_at <= ?2)
             GROUP BY provider
             ORDER BY SUM(cost_usd) DESC",
        )?;
        let rows = stmt.query_map([since, until], |row| {
            Ok(ProviderCost {
                provider: row.get(0)?,
                calls: row.get(1)?,
                failed: row.get(2)?,
                prompt_tokens: row.get(3)?,
                completion_tokens: row.get(4)?,
                cost_usd: row.get(5)?,
            })
        })?;
        let providers: Vec<ProviderCost> = rows.collect::<SqliteResult<_>>()?;

        let mut summary = CostSummary {
            by_provider: providers,
            ..Default::default()
        };
        for p in &summary.by_provider {
            summary.total_calls += p.calls;
            summary.failed_calls += p.failed;
            summary.total_prompt_tokens += p.prompt_tokens;
            summary.total_completion_tokens += p.completion_tokens;
            summary.total_cost_usd += p.cost_usd;
        }
        Ok(summary)
    }
}
