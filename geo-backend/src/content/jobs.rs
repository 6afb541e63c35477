//! Batch-job tracking for content generation. Jobs run as detached tokio
//! tasks; the registry exposes progress and cooperative cancellation.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::models::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Cancelled,
}

pub struct BatchJob {
    pub id: String,
    pub token: CancellationToken,
    total: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    status: parking_lot::Mutex<JobStatus>,
    article_ids: parking_lot::Mutex<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub id: String,
    pub status: JobStatus,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub article_ids: Vec<String>,
}

impl BatchJob {
    fn new(id: String, total: usize) -> Self {
        Self {
            id,
            token: CancellationToken::new(),
            total: AtomicUsize::new(total),
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            status: parking_lot::Mutex::new(JobStatus::Running),
            article_ids: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Fold one generation outcome into the counters. Called per item, so
    /// snapshots show progress while the batch is still running.
    pub fn record(&self, result: &Result<Article, String>) {
        match result {
            Ok(article) => self.record_success(&article.id),
            Err(_) => self.record_failure(),
        }
    }

    pub fn record_success(&self, article_id: &str) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.article_ids.lock().push(article_id.to_string());
    }

    pub fn record_failure(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn finish(&self) {
        let mut status = self.status.lock();
        *status = if self.token.is_cancelled() {
            JobStatus::Cancelled
        } else {
            JobStatus::Completed
        };
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id.clone(),
            status: *self.status.lock(),
            total: self.total.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            article_ids: self.article_ids.lock().clone(),
        }
    }
}

/// Process-wide registry of batch jobs
#[derive(Default)]
pub struct JobRegistry {
    jobs: DashMap<String, Arc<BatchJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, total: usize) -> Arc<BatchJob> {
        let id = uuid::Uuid::new_v4().to_string();
        let job = Arc::new(BatchJob::new(id.clone(), total));
        self.jobs.insert(id, job.clone());
        job
    }

    pub fn get(&self, id: &str) -> Option<Arc<BatchJob>> {
        self.jobs.get(id).map(|j| j.clone())
    }

    /// Request cooperative cancellation; the generation loop notices between
    /// iterations. Returns false for unknown job ids.
    pub fn cancel(&self, id: &str) -> bool {
        match self.jobs.get(id) {
            Some(job) => {
                job.token.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

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

    #[test]
    fn test_job_lifecycle() {
        let registry = JobRegistry::new();
        let job = registry.create(3);

        job.record_success("a1");
        job.record_failure();
        let snap = job.snapshot();
        assert_eq!(snap.status, JobStatus::Running);
        assert_eq!(snap.completed, 2);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.article_ids, vec!["a1"]);

        job.finish();
        assert_eq!(job.snapshot().status, JobStatus::Completed);
    }

    #[test]
    fn test_results_recorded_while_running() {
        let registry = JobRegistry::new();
        let job = registry.create(2);

        job.record(&Ok(article("a1")));
        let snap = job.snapshot();
        assert_eq!(snap.status, JobStatus::Running);
        assert_eq!(snap.completed, 1);
        assert_eq!(snap.failed, 0);
        assert_eq!(snap.article_ids, vec!["a1"]);

        job.record(&Err("provider timeout".to_string()));
        let snap = job.snapshot();
        assert_eq!(snap.status, JobStatus::Running);
        assert_eq!(snap.completed, 2);
        assert_eq!(snap.failed, 1);
    }

    #[test]
    fn test_cancel_marks_job_cancelled() {
        let registry = JobRegistry::new();
        let job = registry.create(5);
        assert!(registry.cancel(&job.id));
        assert!(job.token.is_cancelled());
        job.finish();
        assert_eq!(job.snapshot().status, JobStatus::Cancelled);
    }

    #[test]
    fn test_cancel_unknown_job() {
        let registry = JobRegistry::new();
        assert!(!registry.cancel("nope"));
    }
}
