//! Workflow engine: a saved workflow is a linear list of typed steps.
//!
//! Execution walks the steps in order, merging each step's params and then
//! its output JSON into a shared context, so later steps can pick up what
//! earlier steps produced (e.g. expand keywords, then generate from the
//! first one). A failed step stops the run; the remaining steps are recorded
//! as skipped. The cancellation token is polled between steps.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{info, warn};
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use crate::ai::{ChatService, ProviderId};
use crate::content::{ArticleOptimizer, ContentGenerator, ContentScorer, GenerateRequest};
use crate::keywords::SemanticExpander;
use crate::models::{
    ExecutionStatus, Keyword, KeywordSource, Platform, PublishRecord, StepResult, StepStatus,
    StepType, Workflow, WorkflowExecution, WorkflowStep,
};
use crate::storage::DataStorage;
use crate::verify::BrandVerifier;

pub struct WorkflowExecutor {
    storage: Arc<DataStorage>,
}

impl WorkflowExecutor {
    pub fn new(storage: Arc<DataStorage>) -> Self {
        Self { storage }
    }

    /// Run a workflow to completion (or failure / cancellation), persisting
    /// the execution record before the first step and again after the last.
    pub async fn execute(
        &self,
        workflow: &Workflow,
        token: &CancellationToken,
    ) -> Result<WorkflowExecution, String> {
        let mut execution = WorkflowExecution {
            id: uuid::Uuid::new_v4().to_string(),
            workflow_id: workflow.id.clone(),
            status: ExecutionStatus::Running,
            step_results: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        };
        self.storage.save_workflow_execution(&execution)?;
        info!(
            "[WORKFLOW] Executing \"{}\" ({} steps)",
            workflow.name,
            workflow.steps.len()
        );

        let mut context = Map::new();
        context.insert("brand".to_string(), json!(workflow.brand));

        let mut stop_at: Option<(usize, ExecutionStatus)> = None;
        for (index, step) in workflow.steps.iter().enumerate() {
            if token.is_cancelled() {
                stop_at = Some((index, ExecutionStatus::Cancelled));
                break;
            }

            merge_params(&mut context, &step.params);
            let started = Instant::now();
            let outcome = self.run_step(step, &context).await;
            let duration_ms = started.elapsed().as_millis() as i64;

            match outcome {
                Ok(output) => {
                    if let Value::Object(fields) = &output {
                        for (k, v) in fields {
                            context.insert(k.clone(), v.clone());
                        }
                    }
                    execution.step_results.push(StepResult {
                        step_type: step.step_type,
                        status: StepStatus::Completed,
                        output: Some(output),
                        error: None,
                        duration_ms,
                    });
                }
                Err(e) => {
                    warn!(
                        "[WORKFLOW] Step {} ({}) failed: {}",
                        index + 1,
                        step.step_type.as_str(),
                        e
                    );
                    execution.step_results.push(StepResult {
                        step_type: step.step_type,
                        status: StepStatus::Failed,
                        output: None,
                        error: Some(e),
                        duration_ms,
                    });
                    stop_at = Some((index + 1, ExecutionStatus::Failed));
                    break;
                }
            }
        }

        execution.status = match stop_at {
            Some((stopped_at, status)) => {
                for step in &workflow.steps[stopped_at..] {
                    execution.step_results.push(StepResult {
                        step_type: step.step_type,
                        status: StepStatus::Skipped,
                        output: None,
                        error: None,
                        duration_ms: 0,
                    });
                }
                status
            }
            None => ExecutionStatus::Completed,
        };
        execution.finished_at = Some(Utc::now());
        self.storage.save_workflow_execution(&execution)?;
        info!(
            "[WORKFLOW] \"{}\" finished: {}",
            workflow.name,
            execution.status.as_str()
        );
        Ok(execution)
    }

    async fn run_step(&self, step: &WorkflowStep, context: &Map<String, Value>) -> Result<Value, String> {
        match step.step_type {
            StepType::KeywordExpand => self.step_keyword_expand(context).await,
            StepType::GenerateContent => self.step_generate(context).await,
            StepType::ScoreContent => self.step_score(context).await,
            StepType::Optimize => self.step_optimize(context).await,
            StepType::Verify => self.step_verify(context).await,
            StepType::Publish => self.step_publish(context),
        }
    }

    async fn step_keyword_expand(&self, context: &Map<String, Value>) -> Result<Value, String> {
        let brand = ctx_str(context, "brand").ok_or("Missing brand in context")?;
        let seed = ctx_str(context, "keyword").unwrap_or(brand);
        let count = ctx_usize(context, "count").unwrap_or(10);

        let service = ChatService::from_storage(&self.storage, provider_from(context))?;
        let expansion = SemanticExpander::new(service).expand(seed, count).await;

        let saved: Vec<Keyword> = expansion
            .keywords
            .iter()
            .map(|k| Keyword::new(brand, k, KeywordSource::Expansion))
            .collect();
        self.storage.save_keywords(&saved)?;

        Ok(json!({
            "keywords": expansion.keywords,
            "keyword_source": expansion.source,
        }))
    }

    async fn step_generate(&self, context: &Map<String, Value>) -> Result<Value, String> {
        let brand = ctx_str(context, "brand").ok_or("Missing brand in context")?;
        let keyword = context_keyword(context).ok_or("No keyword in context for generation")?;
        let platform = context_platform(context, &self.storage)?;

        let service = ChatService::from_storage(&self.storage, provider_from(context))?
            .ok_or("Content generation requires a configured API key")?;
        let generator = ContentGenerator::new(service, self.storage.clone(), brand);
        let article = generator
            .generate(&GenerateRequest {
                keyword: keyword.to_string(),
                platform,
                word_count: ctx_usize(context, "word_count"),
            })
            .await?;

        Ok(json!({
            "article_id": article.id,
            "keyword": article.keyword,
            "title": article.title,
            "brand_missing": article.brand_missing,
        }))
    }

    async fn step_score(&self, context: &Map<String, Value>) -> Result<Value, String> {
        let brand = ctx_str(context, "brand").ok_or("Missing brand in context")?;
        let article_id = ctx_str(context, "article_id").ok_or("No article_id in context")?;
        let article = self
            .storage
            .get_article(article_id)?
            .ok_or_else(|| format!("Article not found: {}", article_id))?;

        let service = ChatService::from_storage(&self.storage, provider_from(context))?;
        let score = ContentScorer::new(service)
            .score(&article.content, &article.keyword, brand)
            .await;
        self.storage
            .update_article_score(&article.id, score.overall, score.source)?;

        Ok(json!({
            "score": score.overall,
            "score_source": score.source,
            "suggestions": score.suggestions,
        }))
    }

    async fn step_optimize(&self, context: &Map<String, Value>) -> Result<Value, String> {
        let article_id = ctx_str(context, "article_id").ok_or("No article_id in context")?;
        let article = self
            .storage
            .get_article(article_id)?
            .ok_or_else(|| format!("Article not found: {}", article_id))?;

        let directives: Vec<String> = context
            .get("directives")
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let service = ChatService::from_storage(&self.storage, provider_from(context))?
            .ok_or("Optimization requires a configured API key")?;
        let optimization = ArticleOptimizer::new(service, self.storage.clone())
            .optimize(&article, &directives)
            .await?;

        Ok(json!({
            "optimization_id": optimization.id,
            "original_score": optimization.original_score,
            "optimized_score": optimization.optimized_score,
        }))
    }

    async fn step_verify(&self, context: &Map<String, Value>) -> Result<Value, String> {
        let brand = ctx_str(context, "brand").ok_or("Missing brand in context")?;
        let keyword = context_keyword(context).ok_or("No keyword in context for verification")?;

        let services = ChatService::all_enabled(&self.storage)?;
        let report = BrandVerifier::new(self.storage.clone())
            .verify(&services, brand, keyword)
            .await?;

        Ok(json!({
            "mention_rate": report.mention_rate,
            "providers_checked": report.providers_checked,
            "providers_mentioning": report.providers_mentioning,
        }))
    }

    fn step_publish(&self, context: &Map<String, Value>) -> Result<Value, String> {
        let article_id = ctx_str(context, "article_id").ok_or("No article_id in context")?;
        let article = self
            .storage
            .get_article(article_id)?
            .ok_or_else(|| format!("Article not found: {}", article_id))?;
        let platform = ctx_str(context, "platform").unwrap_or(article.platform.as_str());

        let record = PublishRecord::pending(article_id, platform);
        self.storage.save_publish_record(&record)?;

        Ok(json!({
            "publish_record_id": record.id,
            "publish_status": record.status,
        }))
    }
}

fn merge_params(context: &mut Map<String, Value>, params: &Value) {
    if let Value::Object(fields) = params {
        for (k, v) in fields {
            context.insert(k.clone(), v.clone());
        }
    }
}

fn ctx_str<'a>(context: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    context.get(key).and_then(Value::as_str)
}

fn ctx_usize(context: &Map<String, Value>, key: &str) -> Option<usize> {
    context.get(key).and_then(Value::as_u64).map(|n| n as usize)
}

fn provider_from(context: &Map<String, Value>) -> Option<ProviderId> {
    ctx_str(context, "provider").and_then(ProviderId::from_str)
}

/// Explicit `keyword` wins; otherwise the first entry of a `keywords` list
/// produced by an earlier expansion step.
fn context_keyword(context: &Map<String, Value>) -> Option<&str> {
    ctx_str(context, "keyword").or_else(|| {
        context
            .get("keywords")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .and_then(Value::as_str)
    })
}

fn context_platform(
    context: &Map<String, Value>,
    storage: &DataStorage,
) -> Result<Platform, String> {
    if let Some(s) = ctx_str(context, "platform") {
        return Platform::from_str(s).ok_or_else(|| format!("Unknown platform: {}", s));
    }
    let settings = storage.get_app_settings()?;
    Ok(Platform::from_str(&settings.default_platform).unwrap_or(Platform::Blog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn storage() -> (tempfile::TempDir, Arc<DataStorage>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        (dir, Arc::new(DataStorage::Sqlite(db)))
    }

    fn workflow(brand: &str, steps: Vec<WorkflowStep>) -> Workflow {
        Workflow {
            id: uuid::Uuid::new_v4().to_string(),
            name: "test".to_string(),
            brand: brand.to_string(),
            steps,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn expand_step_completes_without_api_key() {
        let (_dir, storage) = storage();
        let wf = workflow(
            "Acme",
            vec![WorkflowStep {
                step_type: StepType::KeywordExpand,
                params: json!({"keyword": "acme widgets", "count": 5}),
            }],
        );

        let executor = WorkflowExecutor::new(storage.clone());
        let execution = executor
            .execute(&wf, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(execution.status, ExecutionStatus::Completed);
        assert_eq!(execution.step_results.len(), 1);
        assert_eq!(execution.step_results[0].status, StepStatus::Completed);
        // fallback templates still produce saved keywords
        assert_eq!(storage.list_keywords(Some("Acme")).unwrap().len(), 5);
    }

    #[tokio::test]
    async fn failed_step_skips_the_rest() {
        let (_dir, storage) = storage();
        // generation fails without an API key; verify after it must be skipped
        let wf = workflow(
            "Acme",
            vec![
                WorkflowStep {
                    step_type: StepType::GenerateContent,
                    params: json!({"keyword": "acme widgets"}),
                },
                WorkflowStep {
                    step_type: StepType::Verify,
                    params: json!({}),
                },
            ],
        );

        let execution = WorkflowExecutor::new(storage.clone())
            .execute(&wf, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(execution.status, ExecutionStatus::Failed);
        assert_eq!(execution.step_results[0].status, StepStatus::Failed);
        assert!(execution.step_results[0].error.is_some());
        assert_eq!(execution.step_results[1].status, StepStatus::Skipped);
        assert!(execution.finished_at.is_some());

        // both the running and final records persist under the same id
        let history = storage.list_workflow_executions(Some(&wf.id)).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ExecutionStatus::Failed);
    }

    #[tokio::test]
    async fn cancelled_token_marks_execution_cancelled() {
        let (_dir, storage) = storage();
        let wf = workflow(
            "Acme",
            vec![WorkflowStep {
                step_type: StepType::KeywordExpand,
                params: json!({}),
            }],
        );

        let token = CancellationToken::new();
        token.cancel();
        let execution = WorkflowExecutor::new(storage)
            .execute(&wf, &token)
            .await
            .unwrap();

        assert_eq!(execution.status, ExecutionStatus::Cancelled);
        assert_eq!(execution.step_results.len(), 1);
        assert_eq!(execution.step_results[0].status, StepStatus::Skipped);
    }

    #[tokio::test]
    async fn publish_step_records_pending() {
        let (_dir, storage) = storage();
        let article = crate::models::Article {
            id: "a-1".to_string(),
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
            created_at: Utc::now(),
        };
        storage.save_article(&article).unwrap();

        let wf = workflow(
            "Acme",
            vec![WorkflowStep {
                step_type: StepType::Publish,
                params: json!({"article_id": "a-1"}),
            }],
        );
        let execution = WorkflowExecutor::new(storage.clone())
            .execute(&wf, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(execution.status, ExecutionStatus::Completed);
        let records = storage.list_publish_records(Some("a-1")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, "pending");
    }
}
