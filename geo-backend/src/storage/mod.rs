//! Storage facade over the sqlite and JSON backends.
//!
//! Everything above this layer talks to `DataStorage` and gets `String`
//! errors, so callers never see which backend is active.

pub mod json;

pub use json::JsonStore;

use log::info;

use crate::config::Config;
use crate::db::Database;
use crate::models::{
    ApiCall, AppSettings, Article, CostSummary, Keyword, Optimization, PlatformAccount,
    ProviderKey, PublishRecord, UpdateAppSettingsRequest, VerifyRatePoint, VerifyResult,
    Workflow, WorkflowExecution,
};

fn db_err(e: rusqlite::Error) -> String {
    format!("Database error: {}", e)
}

pub enum DataStorage {
    Sqlite(Database),
    Json(JsonStore),
}

impl DataStorage {
    pub fn from_config(config: &Config) -> Result<Self, String> {
        match config.storage_backend.as_str() {
            "json" => Ok(DataStorage::Json(JsonStore::new(&config.data_dir)?)),
            _ => {
                info!("[STORAGE] sqlite at {}", config.database_url);
                let db = Database::new(&config.database_url)
                    .map_err(|e| format!("Failed to open database: {}", e))?;
                Ok(DataStorage::Sqlite(db))
            }
        }
    }

    /// Backend label for diagnostics
    pub fn backend_name(&self) -> &'static str {
        match self {
            DataStorage::Sqlite(_) => "sqlite",
            DataStorage::Json(_) => "json",
        }
    }

    // --- keywords ---

    pub fn save_keyword(&self, keyword: &Keyword) -> Result<(), String> {
        match self {
            DataStorage::Sqlite(db) => db.save_keyword(keyword).map_err(db_err),
            DataStorage::Json(store) => store.save_keyword(keyword),
        }
    }

    pub fn save_keywords(&self, keywords: &[Keyword]) -> Result<(), String> {
        for keyword in keywords {
            self.save_keyword(keyword)?;
        }
        Ok(())
    }

    pub fn list_keywords(&self, brand: Option<&str>) -> Result<Vec<Keyword>, String> {
        match self {
            DataStorage::Sqlite(db) => db.list_keywords(brand).map_err(db_err),
            DataStorage::Json(store) => store.list_keywords(brand),
        }
    }

    // --- articles / optimizations ---

    pub fn save_article(&self, article: &Article) -> Result<(), String> {
        match self {
            DataStorage::Sqlite(db) => db.save_article(article).map_err(db_err),
            DataStorage::Json(store) => store.save_article(article),
        }
    }

    pub fn update_article_score(&self, id: &str, score: f64, source: &str) -> Result<bool, String> {
        match self {
            DataStorage::Sqlite(db) => db.update_article_score(id, score, source).map_err(db_err),
            DataStorage::Json(store) => store.update_article_score(id, score, source),
        }
    }

    pub fn get_article(&self, id: &str) -> Result<Option<Article>, String> {
        match self {
            DataStorage::Sqlite(db) => db.get_article(id).map_err(db_err),
            DataStorage::Json(store) => store.get_article(id),
        }
    }

    pub fn list_articles(
        &self,
        brand: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<Vec<Article>, String> {
        match self {
            DataStorage::Sqlite(db) => db.list_articles(brand, keyword).map_err(db_err),
            DataStorage::Json(store) => store.list_articles(brand, keyword),
        }
    }

    pub fn save_optimization(&self, optimization: &Optimization) -> Result<(), String> {
        match self {
            DataStorage::Sqlite(db) => db.save_optimization(optimization).map_err(db_err),
            DataStorage::Json(store) => store.save_optimization(optimization),
        }
    }

    pub fn list_optimizations(&self, brand: Option<&str>) -> Result<Vec<Optimization>, String> {
        match self {
            DataStorage::Sqlite(db) => db.list_optimizations(brand).map_err(db_err),
            DataStorage::Json(store) => store.list_optimizations(brand),
        }
    }

    // --- verification / cost ledger ---

    pub fn save_verify_result(&self, result: &VerifyResult) -> Result<(), String> {
        match self {
            DataStorage::Sqlite(db) => db.save_verify_result(result).map_err(db_err),
            DataStorage::Json(store) => store.save_verify_result(result),
        }
    }

    pub fn list_verify_results(&self, brand: Option<&str>) -> Result<Vec<VerifyResult>, String> {
        match self {
            DataStorage::Sqlite(db) => db.list_verify_results(brand).map_err(db_err),
            DataStorage::Json(store) => store.list_verify_results(brand),
        }
    }

    pub fn verify_rate_over_time(
        &self,
        brand: Option<&str>,
    ) -> Result<Vec<VerifyRatePoint>, String> {
        match self {
            DataStorage::Sqlite(db) => db.verify_rate_over_time(brand).map_err(db_err),
            DataStorage::Json(store) => store.verify_rate_over_time(brand),
        }
    }

    pub fn log_api_call(&self, call: &ApiCall) -> Result<(), String> {
        match self {
            DataStorage::Sqlite(db) => db.log_api_call(call).map_err(db_err),
            DataStorage::Json(store) => store.log_api_call(call),
        }
    }

    pub fn list_api_calls(&self, limit: usize) -> Result<Vec<ApiCall>, String> {
        match self {
            DataStorage::Sqlite(db) => db.list_api_calls(limit as i64).map_err(db_err),
            DataStorage::Json(store) => store.list_api_calls(limit),
        }
    }

    pub fn cost_summary(
        &self,
        since: Option<&str>,
        until: Option<&str>,
    ) -> Result<CostSummary, String> {
        match self {
            DataStorage::Sqlite(db) => db.cost_summary(since, until).map_err(db_err),
            DataStorage::Json(store) => store.cost_summary(since, until),
        }
    }

    // --- workflows ---

    pub fn save_workflow(&self, workflow: &Workflow) -> Result<(), String> {
        match self {
            DataStorage::Sqlite(db) => db.save_workflow(workflow).map_err(db_err),
            DataStorage::Json(store) => store.save_workflow(workflow),
        }
    }

    pub fn get_workflow(&self, id: &str) -> Result<Option<Workflow>, String> {
        match self {
            DataStorage::Sqlite(db) => db.get_workflow(id).map_err(db_err),
            DataStorage::Json(store) => store.get_workflow(id),
        }
    }

    pub fn list_workflows(&self, brand: Option<&str>) -> Result<Vec<Workflow>, String> {
        match self {
            DataStorage::Sqlite(db) => db.list_workflows(brand).map_err(db_err),
            DataStorage::Json(store) => store.list_workflows(brand),
        }
    }

    pub fn delete_workflow(&self, id: &str) -> Result<bool, String> {
        match self {
            DataStorage::Sqlite(db) => db.delete_workflow(id).map_err(db_err),
            DataStorage::Json(store) => store.delete_workflow(id),
        }
    }

    pub fn save_workflow_execution(&self, execution: &WorkflowExecution) -> Result<(), String> {
        match self {
            DataStorage::Sqlite(db) => db.save_workflow_execution(execution).map_err(db_err),
            DataStorage::Json(store) => store.save_workflow_execution(execution),
        }
    }

    pub fn list_workflow_executions(
        &self,
        workflow_id: Option<&str>,
    ) -> Result<Vec<WorkflowExecution>, String> {
        match self {
            DataStorage::Sqlite(db) => db.list_workflow_executions(workflow_id).map_err(db_err),
            DataStorage::Json(store) => store.list_workflow_executions(workflow_id),
        }
    }

    // --- accounts / publishing ---

    pub fn save_platform_account(&self, account: &PlatformAccount) -> Result<(), String> {
        match self {
            DataStorage::Sqlite(db) => db.save_platform_account(account).map_err(db_err),
            DataStorage::Json(store) => store.save_platform_account(account),
        }
    }

    pub fn list_platform_accounts(&self) -> Result<Vec<PlatformAccount>, String> {
        match self {
            DataStorage::Sqlite(db) => db.list_platform_accounts().map_err(db_err),
            DataStorage::Json(store) => store.list_platform_accounts(),
        }
    }

    pub fn delete_platform_account(&self, id: &str) -> Result<bool, String> {
        match self {
            DataStorage::Sqlite(db) => db.delete_platform_account(id).map_err(db_err),
            DataStorage::Json(store) => store.delete_platform_account(id),
        }
    }

    pub fn save_publish_record(&self, record: &PublishRecord) -> Result<(), String> {
        match self {
            DataStorage::Sqlite(db) => db.save_publish_record(record).map_err(db_err),
            DataStorage::Json(store) => store.save_publish_record(record),
        }
    }

    pub fn list_publish_records(
        &self,
        article_id: Option<&str>,
    ) -> Result<Vec<PublishRecord>, String> {
        match self {
            DataStorage::Sqlite(db) => db.list_publish_records(article_id).map_err(db_err),
            DataStorage::Json(store) => store.list_publish_records(article_id),
        }
    }

    // --- settings ---

    pub fn get_app_settings(&self) -> Result<AppSettings, String> {
        match self {
            DataStorage::Sqlite(db) => db.get_app_settings().map_err(db_err),
            DataStorage::Json(store) => store.get_app_settings(),
        }
    }

    pub fn update_app_settings(
        &self,
        req: &UpdateAppSettingsRequest,
    ) -> Result<AppSettings, String> {
        match self {
            DataStorage::Sqlite(db) => db.update_app_settings(req).map_err(db_err),
            DataStorage::Json(store) => store.update_app_settings(req),
        }
    }

    pub fn upsert_provider_key(
        &self,
        provider: &str,
        api_key: &str,
        model: Option<&str>,
        endpoint: Option<&str>,
        enabled: bool,
    ) -> Result<(), String> {
        match self {
            DataStorage::Sqlite(db) => db
                .upsert_provider_key(provider, api_key, model, endpoint, enabled)
                .map_err(db_err),
            DataStorage::Json(store) => {
                store.upsert_provider_key(provider, api_key, model, endpoint, enabled)
            }
        }
    }

    pub fn get_provider_key(&self, provider: &str) -> Result<Option<ProviderKey>, String> {
        match self {
            DataStorage::Sqlite(db) => db.get_provider_key(provider).map_err(db_err),
            DataStorage::Json(store) => store.get_provider_key(provider),
        }
    }

    pub fn list_provider_keys(&self) -> Result<Vec<ProviderKey>, String> {
        match self {
            DataStorage::Sqlite(db) => db.list_provider_keys().map_err(db_err),
            DataStorage::Json(store) => store.list_provider_keys(),
        }
    }

    pub fn delete_provider_key(&self, provider: &str) -> Result<bool, String> {
        match self {
            DataStorage::Sqlite(db) => db.delete_provider_key(provider).map_err(db_err),
            DataStorage::Json(store) => store.delete_provider_key(provider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeywordSource, Platform};

    fn sqlite_storage() -> (tempfile::TempDir, DataStorage) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        (dir, DataStorage::Sqlite(db))
    }

    fn article(id: &str) -> Article {
        Article {
            id: id.to_string(),
            brand: "Acme".to_string(),
            keyword: "acme widgets".to_string(),
            platform: Platform::Blog,
            title: "t".to_string(),
            content: "body".to_string(),
            word_count: 1,
            provider: "deepseek".to_string(),
            model: "deepseek-chat".to_string(),
            score: None,
            score_source: None,
            brand_missing: false,
            created_at: chrono::Utc::now(),
        }
    }

    fn verify_row(provider: &str, day: &str, mentioned: bool, error: Option<&str>) -> VerifyResult {
        VerifyResult {
            id: uuid::Uuid::new_v4().to_string(),
            brand: "Acme".to_string(),
            keyword: "acme review".to_string(),
            provider: provider.to_string(),
            question: "best acme alternative?".to_string(),
            mentioned,
            mention_count: mentioned as i64,
            excerpt: None,
            error: error.map(str::to_string),
            created_at: chrono::DateTime::parse_from_rfc3339(&format!("{}T10:00:00Z", day))
                .unwrap()
                .with_timezone(&chrono::Utc),
        }
    }

    #[test]
    fn sqlite_score_write_back_records_source() {
        let (_dir, storage) = sqlite_storage();
        assert_eq!(storage.backend_name(), "sqlite");

        let article = article("a-1");
        storage.save_article(&article).unwrap();
        assert!(storage.update_article_score("a-1", 72.5, "heuristic").unwrap());

        let found = storage.get_article("a-1").unwrap().unwrap();
        assert_eq!(found.score, Some(72.5));
        assert_eq!(found.score_source.as_deref(), Some("heuristic"));
        assert!(!storage.update_article_score("missing", 1.0, "llm").unwrap());
    }

    #[test]
    fn sqlite_verify_rate_buckets_by_day_and_provider() {
        let (_dir, storage) = sqlite_storage();
        for row in [
            verify_row("deepseek", "2026-08-27", true, None),
            verify_row("deepseek", "2026-08-27", false, None),
            verify_row("deepseek", "2026-08-28", true, None),
            verify_row("openai", "2026-08-28", false, Some("timeout")),
        ] {
            storage.save_verify_result(&row).unwrap();
        }

        let points = storage.verify_rate_over_time(Some("Acme")).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].day, "2026-08-27");
        assert_eq!(points[0].provider, "deepseek");
        assert_eq!(points[0].checked, 2);
        assert!((points[0].mention_rate - 0.5).abs() < 1e-9);
        // errored rows bucket under errors but stay out of the rate
        assert_eq!(points[2].provider, "openai");
        assert_eq!(points[2].checked, 0);
        assert_eq!(points[2].errors, 1);
        assert_eq!(points[2].mention_rate, 0.0);
        assert!(storage.verify_rate_over_time(Some("Nobody")).unwrap().is_empty());
    }

    #[test]
    fn sqlite_keyword_round_trip() {
        let (_dir, storage) = sqlite_storage();
        storage
            .save_keyword(
                &Keyword::new("Acme", "acme alternatives", KeywordSource::Expansion)
                    .with_intent("commercial"),
            )
            .unwrap();

        let all = storage.list_keywords(Some("Acme")).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].source, KeywordSource::Expansion);
        assert_eq!(all[0].intent.as_deref(), Some("commercial"));
        assert!(storage.list_keywords(Some("Nobody")).unwrap().is_empty());
    }

    #[test]
    fn sqlite_settings_partial_update() {
        let (_dir, storage) = sqlite_storage();
        let before = storage.get_app_settings().unwrap();
        assert_eq!(before.active_provider, "deepseek");

        let after = storage
            .update_app_settings(&UpdateAppSettingsRequest {
                brand: Some("Acme".to_string()),
                active_provider: None,
                default_platform: None,
                default_word_count: Some(800),
            })
            .unwrap();
        assert_eq!(after.brand, "Acme");
        assert_eq!(after.active_provider, "deepseek");
        assert_eq!(after.default_word_count, 800);
    }

    #[test]
    fn sqlite_workflow_overwrite_and_delete() {
        let (_dir, storage) = sqlite_storage();
        let mut wf = Workflow {
            id: "wf-1".to_string(),
            name: "pipeline".to_string(),
            brand: "Acme".to_string(),
            steps: Vec::new(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        storage.save_workflow(&wf).unwrap();
        wf.name = "pipeline v2".to_string();
        storage.save_workflow(&wf).unwrap();

        let found = storage.get_workflow("wf-1").unwrap().unwrap();
        assert_eq!(found.name, "pipeline v2");
        assert_eq!(storage.list_workflows(None).unwrap().len(), 1);
        assert!(storage.delete_workflow("wf-1").unwrap());
        assert!(storage.get_workflow("wf-1").unwrap().is_none());
    }

    #[test]
    fn sqlite_provider_key_upsert() {
        let (_dir, storage) = sqlite_storage();
        storage
            .upsert_provider_key("moonshot", "sk-1", None, None, true)
            .unwrap();
        storage
            .upsert_provider_key("moonshot", "sk-2", Some("moonshot-v1-32k"), None, true)
            .unwrap();

        let key = storage.get_provider_key("moonshot").unwrap().unwrap();
        assert_eq!(key.api_key, "sk-2");
        assert_eq!(key.model.as_deref(), Some("moonshot-v1-32k"));
        assert_eq!(storage.list_provider_keys().unwrap().len(), 1);
    }
}
