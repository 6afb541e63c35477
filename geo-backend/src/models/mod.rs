pub mod account;
pub mod article;
pub mod keyword;
pub mod settings;
pub mod verify;
pub mod workflow;

pub use account::{PlatformAccount, PublishRecord};
pub use article::{Article, Optimization, Platform};
pub use keyword::{Keyword, KeywordSource};
pub use settings::{
    AppSettings, ProviderKey, UpdateAppSettingsRequest, UpsertProviderKeyRequest,
};
pub use verify::{ApiCall, CostSummary, ProviderCost, VerifyRatePoint, VerifyResult};
pub use workflow::{
    StepResult, StepStatus, StepType, Workflow, WorkflowExecution, WorkflowStep,
    ExecutionStatus,
};
