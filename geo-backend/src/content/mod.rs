pub mod eeat;
pub mod facts;
pub mod generator;
pub mod jobs;
pub mod metrics;
pub mod optimizer;
pub mod prompts;
pub mod scorer;

pub use eeat::EeatEnhancer;
pub use facts::FactDensityEnhancer;
pub use generator::{ContentGenerator, GenerateRequest};
pub use jobs::{BatchJob, JobRegistry, JobSnapshot, JobStatus};
pub use metrics::ContentMetrics;
pub use optimizer::ArticleOptimizer;
pub use scorer::{ContentScorer, GeoScore};
