pub mod cluster;
pub mod combinator;
pub mod expander;
pub mod mining;
pub mod similarity;

pub use cluster::{ClusterResult, TopicCluster};
pub use combinator::{generate_combinations, CombinationRequest, Wordbank};
pub use expander::{ExpansionResult, SemanticExpander};
pub use mining::{KeywordMining, MinedKeyword, MiningResult};
