//! SQLite database - schema definitions and connection management
//!
//! This file contains:
//! - Database struct definition
//! - Connection management (new, init)
//! - Schema creation and migrations
//!
//! All per-entity operations live in the tables/ subdirectory.

use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

/// Main database wrapper with connection pooling via Mutex
pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    /// Create a new database connection and initialize schema
    pub fn new(database_url: &str) -> SqliteResult<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let conn = Connection::open(database_url)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;
        Ok(db)
    }

    /// Initialize all database tables and run migrations
    fn init(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS keywords (
                id TEXT PRIMARY KEY,
                brand TEXT NOT NULL,
                keyword TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT 'manual',
                category TEXT,
                intent TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_keywords_brand ON keywords(brand, created_at DESC)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS articles (
                id TEXT PRIMARY KEY,
                brand TEXT NOT NULL,
                keyword TEXT NOT NULL,
                platform TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                word_count INTEGER NOT NULL DEFAULT 0,
                provider TEXT NOT NULL,
                model TEXT NOT NULL,
                score REAL,
                score_source TEXT,
                brand_missing INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_articles_brand ON articles(brand, created_at DESC)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS optimizations (
                id TEXT PRIMARY KEY,
                article_id TEXT NOT NULL,
                brand TEXT NOT NULL,
                keyword TEXT NOT NULL,
                directives TEXT NOT NULL DEFAULT '[]',
                original_content TEXT NOT NULL,
                optimized_content TEXT NOT NULL,
                original_score REAL NOT NULL DEFAULT 0,
                optimized_score REAL NOT NULL DEFAULT 0,
                provider TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS verify_results (
                id TEXT PRIMARY KEY,
                brand TEXT NOT NULL,
                keyword TEXT NOT NULL,
                provider TEXT NOT NULL,
                question TEXT NOT NULL,
                mentioned INTEGER NOT NULL DEFAULT 0,
                mention_count INTEGER NOT NULL DEFAULT 0,
                excerpt TEXT,
                error TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_verify_results_brand ON verify_results(brand, created_at DESC)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS api_calls (
                id TEXT PRIMARY KEY,
                provider TEXT NOT NULL,
                model TEXT NOT NULL,
                operation TEXT NOT NULL,
                prompt_tokens INTEGER NOT NULL DEFAULT 0,
                completion_tokens INTEGER NOT NULL DEFAULT 0,
                cost_usd REAL NOT NULL DEFAULT 0,
                success INTEGER NOT NULL DEFAULT 1,
                error TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_api_calls_created ON api_calls(created_at)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                brand TEXT NOT NULL,
                steps TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS workflow_executions (
                id TEXT PRIMARY KEY,
                workflow_id TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'running',
                step_results TEXT NOT NULL DEFAULT '[]',
                started_at TEXT NOT NULL,
                finished_at TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_workflow_executions_workflow ON workflow_executions(workflow_id, started_at DESC)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS platform_accounts (
                id TEXT PRIMARY KEY,
                platform TEXT NOT NULL,
                username TEXT NOT NULL,
                credential TEXT NOT NULL,
                enabled INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                UNIQUE(platform, username)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS publish_records (
                id TEXT PRIMARY KEY,
                article_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                url TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                brand TEXT NOT NULL DEFAULT '',
                active_provider TEXT NOT NULL DEFAULT 'deepseek',
                default_platform TEXT NOT NULL DEFAULT 'blog',
                default_word_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS provider_keys (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                provider TEXT UNIQUE NOT NULL,
                api_key TEXT NOT NULL,
                model TEXT,
                endpoint TEXT,
                enabled INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        // Migration: Add intent column to keywords if it doesn't exist (for old DBs)
        let has_intent: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('keywords') WHERE name='intent'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|c| c > 0)
            .unwrap_or(false);

        if !has_intent {
            conn.execute("ALTER TABLE keywords ADD COLUMN intent TEXT", [])?;
        }

        // Migration: Add brand_missing column to articles if it doesn't exist
        let has_brand_missing: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('articles') WHERE name='brand_missing'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|c| c > 0)
            .unwrap_or(false);

        if !has_brand_missing {
            conn.execute(
                "ALTER TABLE articles ADD COLUMN brand_missing INTEGER NOT NULL DEFAULT 0",
                [],
            )?;
        }

        // Migration: Add score_source column to articles if it doesn't exist
        let has_score_source: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('articles') WHERE name='score_source'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|c| c > 0)
            .unwrap_or(false);

        if !has_score_source {
            conn.execute("ALTER TABLE articles ADD COLUMN score_source TEXT", [])?;
        }

        // Migration: Add model/endpoint override columns to provider_keys
        let _ = conn.execute("ALTER TABLE provider_keys ADD COLUMN model TEXT", []);
        let _ = conn.execute("ALTER TABLE provider_keys ADD COLUMN endpoint TEXT", []);

        // Initialize app_settings with defaults if empty
        let settings_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM app_settings", [], |row| row.get(0))
            .unwrap_or(0);

        if settings_count == 0 {
            let now = chrono::Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO app_settings (brand, created_at, updated_at) VALUES ('', ?1, ?2)",
                [&now, &now],
            )?;
        }

        Ok(())
    }
}
