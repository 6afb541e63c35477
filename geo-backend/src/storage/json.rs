//! File-backed JSON storage, one array file per entity under the data dir.
//!
//! A missing file reads as an empty list. Reads and mutations both take the
//! store lock (mutations rewrite the whole file, so an unlocked read could
//! observe a half-written file); fine for the dataset sizes this backend is
//! meant for (local use without sqlite).

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{
    ApiCall, AppSettings, Article, CostSummary, Keyword, Optimization, PlatformAccount,
    ProviderCost, ProviderKey, PublishRecord, UpdateAppSettingsRequest, VerifyRatePoint,
    VerifyResult, Workflow, WorkflowExecution,
};

pub struct JsonStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(data_dir: &str) -> Result<Self, String> {
        fs::create_dir_all(data_dir)
            .map_err(|e| format!("Failed to create data dir {}: {}", data_dir, e))?;
        info!("[STORAGE] JSON store at {}", data_dir);
        Ok(Self {
            dir: PathBuf::from(data_dir),
            lock: Mutex::new(()),
        })
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn read_list<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, String> {
        let _guard = self.lock.lock();
        self.read_list_unlocked(file)
    }

    /// Read without taking the lock; callers must already hold the guard
    /// (the lock is not reentrant).
    fn read_list_unlocked<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, String> {
        read_json_list(&self.path(file))
    }

    fn write_list<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), String> {
        let path = self.path(file);
        let body = serde_json::to_string_pretty(items)
            .map_err(|e| format!("Failed to serialize {}: {}", file, e))?;
        fs::write(&path, body).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }

    fn append<T: Serialize + DeserializeOwned + Clone>(
        &self,
        file: &str,
        item: &T,
    ) -> Result<(), String> {
        let _guard = self.lock.lock();
        let mut items: Vec<T> = self.read_list_unlocked(file)?;
        items.push(item.clone());
        self.write_list(file, &items)
    }

    // --- keywords ---

    pub fn save_keyword(&self, keyword: &Keyword) -> Result<(), String> {
        self.append("keywords.json", keyword)
    }

    pub fn list_keywords(&self, brand: Option<&str>) -> Result<Vec<Keyword>, String> {
        let mut items: Vec<Keyword> = self.read_list("keywords.json")?;
        if let Some(brand) = brand {
            items.retain(|k| k.brand == brand);
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    // --- articles / optimizations ---

    pub fn save_article(&self, article: &Article) -> Result<(), String> {
        self.append("articles.json", article)
    }

    pub fn update_article_score(&self, id: &str, score: f64, source: &str) -> Result<bool, String> {
        let _guard = self.lock.lock();
        let mut items: Vec<Article> = self.read_list_unlocked("articles.json")?;
        let mut found = false;
        for article in items.iter_mut().filter(|a| a.id == id) {
            article.score = Some(score);
            article.score_source = Some(source.to_string());
            found = true;
        }
        if found {
            self.write_list("articles.json", &items)?;
        }
        Ok(found)
    }

    pub fn get_article(&self, id: &str) -> Result<Option<Article>, String> {
        let items: Vec<Article> = self.read_list("articles.json")?;
        Ok(items.into_iter().find(|a| a.id == id))
    }

    pub fn list_articles(
        &self,
        brand: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<Vec<Article>, String> {
        let mut items: Vec<Article> = self.read_list("articles.json")?;
        if let Some(brand) = brand {
            items.retain(|a| a.brand == brand);
        }
        if let Some(keyword) = keyword {
            items.retain(|a| a.keyword == keyword);
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    pub fn save_optimization(&self, optimization: &Optimization) -> Result<(), String> {
        self.append("optimizations.json", optimization)
    }

    pub fn list_optimizations(&self, brand: Option<&str>) -> Result<Vec<Optimization>, String> {
        let mut items: Vec<Optimization> = self.read_list("optimizations.json")?;
        if let Some(brand) = brand {
            items.retain(|o| o.brand == brand);
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    // --- verification / cost ledger ---

    pub fn save_verify_result(&self, result: &VerifyResult) -> Result<(), String> {
        self.append("verify_results.json", result)
    }

    pub fn list_verify_results(&self, brand: Option<&str>) -> Result<Vec<VerifyResult>, String> {
        let mut items: Vec<VerifyResult> = self.read_list("verify_results.json")?;
        if let Some(brand) = brand {
            items.retain(|v| v.brand == brand);
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    /// Daily mention-rate buckets per provider, oldest day first
    pub fn verify_rate_over_time(
        &self,
        brand: Option<&str>,
    ) -> Result<Vec<VerifyRatePoint>, String> {
        let items: Vec<VerifyResult> = self.read_list("verify_results.json")?;
        let mut points: Vec<VerifyRatePoint> = Vec::new();
        for result in items {
            if brand.is_some_and(|b| result.brand != b) {
                continue;
            }
            let day = result.created_at.format("%Y-%m-%d").to_string();
            let idx = match points
                .iter()
                .position(|p| p.day == day && p.provider == result.provider)
            {
                Some(i) => i,
                None => {
                    points.push(VerifyRatePoint {
                        day,
                        provider: result.provider.clone(),
                        checked: 0,
                        mentioned: 0,
                        errors: 0,
                        mention_rate: 0.0,
                    });
                    points.len() - 1
                }
            };
            let point = &mut points[idx];
            if result.error.is_some() {
                point.errors += 1;
            } else {
                point.checked += 1;
                if result.mentioned {
                    point.mentioned += 1;
                }
            }
        }
        for point in points.iter_mut() {
            if point.checked > 0 {
                point.mention_rate = point.mentioned as f64 / point.checked as f64;
            }
        }
        points.sort_by(|a, b| a.day.cmp(&b.day).then_with(|| a.provider.cmp(&b.provider)));
        Ok(points)
    }

    pub fn log_api_call(&self, call: &ApiCall) -> Result<(), String> {
        self.append("api_calls.json", call)
    }

    pub fn list_api_calls(&self, limit: usize) -> Result<Vec<ApiCall>, String> {
        let mut items: Vec<ApiCall> = self.read_list("api_calls.json")?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit);
        Ok(items)
    }

    pub fn cost_summary(
        &self,
        since: Option<&str>,
        until: Option<&str>,
    ) -> Result<CostSummary, String> {
        let items: Vec<ApiCall> = self.read_list("api_calls.json")?;
        let mut summary = CostSummary::default();
        for call in items {
            let ts = call.created_at.to_rfc3339();
            if since.is_some_and(|s| ts.as_str() < s) || until.is_some_and(|u| ts.as_str() > u) {
                continue;
            }
            summary.total_calls += 1;
            if !call.success {
                summary.failed_calls += 1;
            }
            summary.total_prompt_tokens += call.prompt_tokens;
            summary.total_completion_tokens += call.completion_tokens;
            summary.total_cost_usd += call.cost_usd;

            match summary
                .by_provider
                .iter_mut()
                .find(|p| p.provider == call.provider)
            {
                Some(p) => {
                    p.calls += 1;
                    if !call.success {
                        p.failed += 1;
                    }
                    p.prompt_tokens += call.prompt_tokens;
                    p.completion_tokens += call.completion_tokens;
                    p.cost_usd += call.cost_usd;
                }
                None => summary.by_provider.push(ProviderCost {
                    provider: call.provider.clone(),
                    calls: 1,
                    failed: if call.success { 0 } else { 1 },
                    prompt_tokens: call.prompt_tokens,
                    completion_tokens: call.completion_tokens,
                    cost_usd: call.cost_usd,
                }),
            }
        }
        summary
            .by_provider
            .sort_by(|a, b| b.cost_usd.partial_cmp(&a.cost_usd).unwrap_or(std::cmp::Ordering::Equal));
        Ok(summary)
    }

    // --- workflows ---

    pub fn save_workflow(&self, workflow: &Workflow) -> Result<(), String> {
        let _guard = self.lock.lock();
        let mut items: Vec<Workflow> = self.read_list_unlocked("workflows.json")?;
        items.retain(|w| w.id != workflow.id);
        items.push(workflow.clone());
        self.write_list("workflows.json", &items)
    }

    pub fn get_workflow(&self, id: &str) -> Result<Option<Workflow>, String> {
        let items: Vec<Workflow> = self.read_list("workflows.json")?;
        Ok(items.into_iter().find(|w| w.id == id))
    }

    pub fn list_workflows(&self, brand: Option<&str>) -> Result<Vec<Workflow>, String> {
        let mut items: Vec<Workflow> = self.read_list("workflows.json")?;
        if let Some(brand) = brand {
            items.retain(|w| w.brand == brand);
        }
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(items)
    }

    pub fn delete_workflow(&self, id: &str) -> Result<bool, String> {
        let _guard = self.lock.lock();
        let mut items: Vec<Workflow> = self.read_list_unlocked("workflows.json")?;
        let before = items.len();
        items.retain(|w| w.id != id);
        let removed = items.len() < before;
        if removed {
            self.write_list("workflows.json", &items)?;
        }
        Ok(removed)
    }

    pub fn save_workflow_execution(&self, execution: &WorkflowExecution) -> Result<(), String> {
        let _guard = self.lock.lock();
        let mut items: Vec<WorkflowExecution> = self.read_list_unlocked("workflow_executions.json")?;
        items.retain(|e| e.id != execution.id);
        items.push(execution.clone());
        self.write_list("workflow_executions.json", &items)
    }

    pub fn list_workflow_executions(
        &self,
        workflow_id: Option<&str>,
    ) -> Result<Vec<WorkflowExecution>, String> {
        let mut items: Vec<WorkflowExecution> = self.read_list("workflow_executions.json")?;
        if let Some(workflow_id) = workflow_id {
            items.retain(|e| e.workflow_id == workflow_id);
        }
        items.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(items)
    }

    // --- accounts / publishing ---

    pub fn save_platform_account(&self, account: &PlatformAccount) -> Result<(), String> {
        let _guard = self.lock.lock();
        let mut items: Vec<PlatformAccount> = self.read_list_unlocked("platform_accounts.json")?;
        items.retain(|a| !(a.platform == account.platform && a.username == account.username));
        items.push(account.clone());
        self.write_list("platform_accounts.json", &items)
    }

    pub fn list_platform_accounts(&self) -> Result<Vec<PlatformAccount>, String> {
        let mut items: Vec<PlatformAccount> = self.read_list("platform_accounts.json")?;
        items.sort_by(|a, b| {
            a.platform
                .cmp(&b.platform)
                .then_with(|| a.username.cmp(&b.username))
        });
        Ok(items)
    }

    pub fn delete_platform_account(&self, id: &str) -> Result<bool, String> {
        let _guard = self.lock.lock();
        let mut items: Vec<PlatformAccount> = self.read_list_unlocked("platform_accounts.json")?;
        let before = items.len();
        items.retain(|a| a.id != id);
        let removed = items.len() < before;
        if removed {
            self.write_list("platform_accounts.json", &items)?;
        }
        Ok(removed)
    }

    pub fn save_publish_record(&self, record: &PublishRecord) -> Result<(), String> {
        self.append("publish_records.json", record)
    }

    pub fn list_publish_records(
        &self,
        article_id: Option<&str>,
    ) -> Result<Vec<PublishRecord>, String> {
        let mut items: Vec<PublishRecord> = self.read_list("publish_records.json")?;
        if let Some(article_id) = article_id {
            items.retain(|r| r.article_id == article_id);
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    // --- settings ---

    pub fn get_app_settings(&self) -> Result<AppSettings, String> {
        let _guard = self.lock.lock();
        self.read_settings_unlocked()
    }

    fn read_settings_unlocked(&self) -> Result<AppSettings, String> {
        let path = self.path("settings.json");
        if !path.exists() {
            return Ok(AppSettings::default());
        }
        let body = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        serde_json::from_str(&body).map_err(|e| format!("Failed to parse settings.json: {}", e))
    }

    pub fn update_app_settings(
        &self,
        req: &UpdateAppSettingsRequest,
    ) -> Result<AppSettings, String> {
        let _guard = self.lock.lock();
        let mut settings = self.read_settings_unlocked()?;
        if let Some(brand) = &req.brand {
            settings.brand = brand.clone();
        }
        if let Some(provider) = &req.active_provider {
            settings.active_provider = provider.clone();
        }
        if let Some(platform) = &req.default_platform {
            settings.default_platform = platform.clone();
        }
        if let Some(count) = req.default_word_count {
            settings.default_word_count = count;
        }
        settings.updated_at = chrono::Utc::now();
        let body = serde_json::to_string_pretty(&settings).map_err(|e| e.to_string())?;
        fs::write(self.path("settings.json"), body)
            .map_err(|e| format!("Failed to write settings.json: {}", e))?;
        Ok(settings)
    }

    pub fn upsert_provider_key(
        &self,
        provider: &str,
        api_key: &str,
        model: Option<&str>,
        endpoint: Option<&str>,
        enabled: bool,
    ) -> Result<(), String> {
        let _guard = self.lock.lock();
        let mut items: Vec<ProviderKey> = self.read_list_unlocked("provider_keys.json")?;
        let now = chrono::Utc::now();
        match items.iter_mut().find(|k| k.provider == provider) {
            Some(key) => {
                key.api_key = api_key.to_string();
                key.model = model.map(str::to_string);
                key.endpoint = endpoint.map(str::to_string);
                key.enabled = enabled;
                key.updated_at = now;
            }
            None => {
                let next_id = items.iter().map(|k| k.id).max().unwrap_or(0) + 1;
                items.push(ProviderKey {
                    id: next_id,
                    provider: provider.to_string(),
                    api_key: api_key.to_string(),
                    model: model.map(str::to_string),
                    endpoint: endpoint.map(str::to_string),
                    enabled,
                    created_at: now,
                    updated_at: now,
                });
            }
        }
        self.write_list("provider_keys.json", &items)
    }

    pub fn get_provider_key(&self, provider: &str) -> Result<Option<ProviderKey>, String> {
        let items: Vec<ProviderKey> = self.read_list("provider_keys.json")?;
        Ok(items.into_iter().find(|k| k.provider == provider))
    }

    pub fn list_provider_keys(&self) -> Result<Vec<ProviderKey>, String> {
        let mut items: Vec<ProviderKey> = self.read_list("provider_keys.json")?;
        items.sort_by(|a, b| a.provider.cmp(&b.provider));
        Ok(items)
    }

    pub fn delete_provider_key(&self, provider: &str) -> Result<bool, String> {
        let _guard = self.lock.lock();
        let mut items: Vec<ProviderKey> = self.read_list_unlocked("provider_keys.json")?;
        let before = items.len();
        items.retain(|k| k.provider != provider);
        let removed = items.len() < before;
        if removed {
            self.write_list("provider_keys.json", &items)?;
        }
        Ok(removed)
    }
}

fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, String> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let body = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&body).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeywordSource;

    fn store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().to_str().unwrap()).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_files_read_as_empty() {
        let (_dir, store) = store();
        assert!(store.list_keywords(None).unwrap().is_empty());
        assert!(store.get_article("nope").unwrap().is_none());
    }

    #[test]
    fn keywords_round_trip_with_brand_filter() {
        let (_dir, store) = store();
        store
            .save_keyword(&Keyword::new("Acme", "acme pricing", KeywordSource::Manual))
            .unwrap();
        store
            .save_keyword(&Keyword::new("Other", "other thing", KeywordSource::Manual))
            .unwrap();

        assert_eq!(store.list_keywords(None).unwrap().len(), 2);
        let acme = store.list_keywords(Some("Acme")).unwrap();
        assert_eq!(acme.len(), 1);
        assert_eq!(acme[0].keyword, "acme pricing");
    }

    #[test]
    fn workflow_save_overwrites_by_id() {
        let (_dir, store) = store();
        let mut wf = Workflow {
            id: "wf-1".to_string(),
            name: "first".to_string(),
            brand: "Acme".to_string(),
            steps: Vec::new(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        store.save_workflow(&wf).unwrap();
        wf.name = "renamed".to_string();
        store.save_workflow(&wf).unwrap();

        let all = store.list_workflows(None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "renamed");
        assert!(store.delete_workflow("wf-1").unwrap());
        assert!(!store.delete_workflow("wf-1").unwrap());
    }

    #[test]
    fn provider_key_upsert_replaces_existing() {
        let (_dir, store) = store();
        store
            .upsert_provider_key("deepseek", "sk-old", None, None, true)
            .unwrap();
        store
            .upsert_provider_key("deepseek", "sk-new", Some("deepseek-chat"), None, false)
            .unwrap();

        let key = store.get_provider_key("deepseek").unwrap().unwrap();
        assert_eq!(key.api_key, "sk-new");
        assert!(!key.enabled);
        assert_eq!(store.list_provider_keys().unwrap().len(), 1);
    }

    #[test]
    fn verify_rate_buckets_by_day_and_provider() {
        let (_dir, store) = store();
        for (day, mentioned, error) in [
            ("2026-08-27", true, None),
            ("2026-08-27", false, None),
            ("2026-08-28", false, Some("timeout")),
        ] {
            store
                .save_verify_result(&VerifyResult {
                    id: uuid::Uuid::new_v4().to_string(),
                    brand: "Acme".to_string(),
                    keyword: "acme review".to_string(),
                    provider: "deepseek".to_string(),
                    question: "best acme alternative?".to_string(),
                    mentioned,
                    mention_count: mentioned as i64,
                    excerpt: None,
                    error: error.map(str::to_string),
                    created_at: chrono::DateTime::parse_from_rfc3339(&format!(
                        "{}T10:00:00Z",
                        day
                    ))
                    .unwrap()
                    .with_timezone(&chrono::Utc),
                })
                .unwrap();
        }

        let points = store.verify_rate_over_time(None).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].day, "2026-08-27");
        assert_eq!(points[0].checked, 2);
        assert!((points[0].mention_rate - 0.5).abs() < 1e-9);
        assert_eq!(points[1].checked, 0);
        assert_eq!(points[1].errors, 1);
        assert_eq!(points[1].mention_rate, 0.0);
    }

    #[test]
    fn concurrent_reads_and_writes_stay_consistent() {
        let (_dir, store) = store();
        let store = std::sync::Arc::new(store);

        let mut handles = Vec::new();
        for t in 0..4 {
            let store = std::sync::Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for i in 0..25 {
                    store
                        .save_keyword(&Keyword::new(
                            "Acme",
                            &format!("kw {} {}", t, i),
                            KeywordSource::Manual,
                        ))
                        .unwrap();
                    // must never observe a half-written file
                    store.list_keywords(Some("Acme")).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.list_keywords(None).unwrap().len(), 100);
    }

    #[test]
    fn cost_summary_groups_by_provider() {
        let (_dir, store) = store();
        for (provider, cost, success) in [
            ("deepseek", 0.002, true),
            ("deepseek", 0.003, false),
            ("openai", 0.010, true),
        ] {
            store
                .log_api_call(&ApiCall {
                    id: uuid::Uuid::new_v4().to_string(),
                    provider: provider.to_string(),
                    model: "m".to_string(),
                    operation: "generate".to_string(),
                    prompt_tokens: 100,
                    completion_tokens: 50,
                    cost_usd: cost,
                    success,
                    error: None,
                    created_at: chrono::Utc::now(),
                })
                .unwrap();
        }

        let summary = store.cost_summary(None, None).unwrap();
        assert_eq!(summary.total_calls, 3);
        assert_eq!(summary.failed_calls, 1);
        assert_eq!(summary.by_provider.len(), 2);
        assert_eq!(summary.by_provider[0].provider, "openai");
        assert!((summary.total_cost_usd - 0.015).abs() < 1e-9);
    }
}
