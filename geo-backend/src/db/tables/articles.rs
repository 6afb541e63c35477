//! Article and optimization table operations

use rusqlite::Result as SqliteResult;

use super::parse_ts;
use crate::db::Database;
use crate::models::{Article, Optimization, Platform};

impl Database {
    pub fn save_article(&self, article: &Article) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO articles (id, brand, keyword, platform, title, content, word_count,
                                   provider, model, score, score_source, brand_missing, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                article.id,
                article.brand,
                article.keyword,
                article.platform.as_str(),
                article.title,
                article.content,
                article.word_count,
                article.provider,
                article.model,
                article.score,
                article.score_source,
                article.brand_missing as i64,
                article.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Write a computed GEO score and how it was produced back onto the
    /// article row.
    pub fn update_article_score(&self, id: &str, score: f64, source: &str) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE articles SET score = ?2, score_source = ?3 WHERE id = ?1",
            rusqlite::params![id, score, source],
        )?;
        Ok(changed > 0)
    }

    pub fn get_article(&self, id: &str) -> SqliteResult<Option<Article>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, brand, keyword, platform, title, content, word_count,
                    provider, model, score, score_source, brand_missing, created_at
             FROM articles WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map([id], map_article)?;
        rows.next().transpose()
    }

    /// List articles, newest first, with optional brand and keyword filters
    pub fn list_articles(
        &self,
        brand: Option<&str>,
        keyword: Option<&str>,
    ) -> SqliteResult<Vec<Article>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, brand, keyword, platform, title, content, word_count,
                    provider, model, score, score_source, brand_missing, created_at
             FROM articles
             WHERE (?1 IS NULL OR brand = ?1) AND (?2 IS NULL OR keyword = ?2)
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([brand, keyword], map_article)?;
        rows.collect()
    }

    pub fn save_optimization(&self, opt: &Optimization) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        let directives = serde_json::to_string(&opt.directives).unwrap_or_else(|_| "[]".to_string());
        conn.execute(
            "INSERT INTO optimizations (id, article_id, brand, keyword, directives,
                                        original_content, optimized_content,
                                        original_score, optimized_score, provider, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                opt.id,
                opt.article_id,
                opt.brand,
                opt.keyword,
                directives,
                opt.original_content,
                opt.optimized_content,
                opt.original_score,
                opt.optimized_score,
                opt.provider,
                opt.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_optimizations(&self, brand: Option<&str>) -> SqliteResult<Vec<Optimization>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, article_id, brand, keyword, directives, original_content,
                    optimized_content, original_score, optimized_score, provider, created_at
             FROM optimizations
             WHERE (?1 IS NULL OR brand = ?1)
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([brand], |row| {
            let directives_json: String = row.get(4)?;
            let created_at: String = row.get(10)?;
            Ok(Optimization {
                id: row.get(0)?,
                article_id: row.get(1)?,
                brand: row.get(2)?,
                keyword: row.get(3)?,
                directives: serde_json::from_str(&directives_json).unwrap_or_default(),
                original_content: row.get(5)?,
                optimized_content: row.get(6)?,
                original_score: row.get(7)?,
                optimized_score: row.get(8)?,
                provider: row.get(9)?,
                created_at: parse_ts(&created_at),
            })
        })?;
        rows.collect()
    }
}

fn map_article(row: &rusqlite::Row<'_>) -> rusqlite::Result<Article> {
    let platform: String = row.get(3)?;
    let brand_missing: i64 = row.get(11)?;
    let created_at: String = row.get(12)?;
    Ok(Article {
        id: row.get(0)?,
        brand: row.get(1)?,
        keyword: row.get(2)?,
        platform: Platform::from_str(&platform).unwrap_or(Platform::Blog),
        title: row.get(4)?,
        content: row.get(5)?,
        word_count: row.get(6)?,
        provider: row.get(7)?,
        model: row.get(8)?,
        score: row.get(9)?,
        score_source: row.get(10)?,
        brand_missing: brand_missing != 0,
        created_at: parse_ts(&created_at),
    })
}
