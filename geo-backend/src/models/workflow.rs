use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Step kinds a workflow can chain together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    KeywordExpand,
    GenerateContent,
    ScoreContent,
    Optimize,
    Verify,
    Publish,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::KeywordExpand => "keyword_expand",
            StepType::GenerateContent => "generate_content",
            StepType::ScoreContent => "score_content",
            StepType::Optimize => "optimize",
            StepType::Verify => "verify",
            StepType::Publish => "publish",
        }
    }

    pub fn from_str(s: &str) -> Option<StepType> {
        match s {
            "keyword_expand" => Some(StepType::KeywordExpand),
            "generate_content" => Some(StepType::GenerateContent),
            "score_content" => Some(StepType::ScoreContent),
            "optimize" => Some(StepType::Optimize),
            "verify" => Some(StepType::Verify),
            "publish" => Some(StepType::Publish),
            _ => None,
        }
    }
}

/// One step in a workflow definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub step_type: StepType,
    /// Step-specific parameters, merged over the execution context at run time
    #[serde(default)]
    pub params: Value,
}

/// A saved workflow. The only entity with in-place update (overwrite-by-id)
/// and delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub steps: Vec<WorkflowStep>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<ExecutionStatus> {
        match s {
            "running" => Some(ExecutionStatus::Running),
            "completed" => Some(ExecutionStatus::Completed),
            "failed" => Some(ExecutionStatus::Failed),
            "cancelled" => Some(ExecutionStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Failed,
    Skipped,
}

/// Per-step outcome recorded on the execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_type: StepType,
    pub status: StepStatus,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub duration_ms: i64,
}

/// A single run of a workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: String,
    pub workflow_id: String,
    pub status: ExecutionStatus,
    pub step_results: Vec<StepResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
