//! Topic clustering over a keyword list: LLM grouping with a greedy
//! similarity fallback. Every input keyword lands in exactly one cluster.

use serde::Serialize;
use std::collections::BTreeMap;

use super::similarity::cluster_similarity;
use crate::ai::{extract, ChatService, Message};

/// Fallback assignment threshold for the greedy pass
pub const CLUSTER_THRESHOLD: f64 = 0.5;

const CLUSTER_SYSTEM: &str = "You are an SEO topic analyst. \
    You group keywords into topical clusters. \
    You MUST respond with a valid JSON object mapping cluster names to \
    arrays of keywords. Every input keyword must appear in exactly one \
    cluster. Do NOT include any text outside the JSON object.";

#[derive(Debug, Clone, Serialize)]
pub struct ClusterResult {
    /// Cluster name -> member keywords; BTreeMap keeps report output stable
    pub clusters: BTreeMap<String, Vec<String>>,
    /// "llm" or "fallback"
    pub source: &'static str,
}

pub struct TopicCluster {
    service: Option<ChatService>,
}

impl TopicCluster {
    pub fn new(service: Option<ChatService>) -> Self {
        Self { service }
    }

    pub async fn cluster(&self, keywords: &[String], max_clusters: usize) -> ClusterResult {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        if keywords.is_empty() {
            return ClusterResult {
                clusters: BTreeMap::new(),
                source: "fallback",
            };
        }

        if let Some(service) = &self.service {
            let prompt = format!(
                "Group these keywords into at most {} topical clusters. \
                 Return a JSON object mapping cluster names to keyword arrays.\n\n{}",
                max_clusters.max(1),
                keywords.join("\n")
            );
            match service
                .chat(
                    "cluster",
                    vec![Message::system(CLUSTER_SYSTEM), Message::user(prompt)],
                )
                .await
            {
                Ok(reply) => {
                    if let Some(clusters) = parse_clusters(&reply, &keywords) {
                        return ClusterResult {
                            clusters,
                            source: "llm",
                        };
                    }
                    log::warn!("[CLUSTER] Unparseable cluster reply, using greedy fallback");
                }
                Err(e) => {
                    log::warn!("[CLUSTER] LLM clustering failed: {}", e);
                }
            }
        }

        ClusterResult {
            clusters: greedy_clusters(&keywords, max_clusters),
            source: "fallback",
        }
    }
}

/// Accept the LLM reply only when it covers the inputs; stray keywords the
/// model invented are dropped, missing ones are filed under "other".
fn parse_clusters(reply: &str, keywords: &[String]) -> Option<BTreeMap<String, Vec<String>>> {
    let value = extract::extract_object(reply)?;
    let obj = value.as_object()?;

    let mut clusters: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut assigned: Vec<String> = Vec::new();

    for (name, members) in obj {
        let members = members.as_array()?;
        for m in members {
            let m = m.as_str()?.trim().to_string();
            let known = keywords.iter().any(|k| k.eq_ignore_ascii_case(&m));
            if !known || assigned.iter().any(|a| a.eq_ignore_ascii_case(&m)) {
                continue;
            }
            assigned.push(m.clone());
            clusters.entry(name.trim().to_string()).or_default().push(m);
        }
    }

    if assigned.is_empty() {
        return None;
    }

    // File anything the model dropped under "other"
    for k in keywords {
        if !assigned.iter().any(|a| a.eq_ignore_ascii_case(k)) {
            clusters
                .entry("other".to_string())
                .or_default()
                .push(k.clone());
        }
    }

    Some(clusters)
}

/// Greedy pairwise-similarity clustering: seed with the first unassigned
/// keyword, pull in everything similar enough, repeat. Deterministic given
/// input order; no optimality guarantees.
pub fn greedy_clusters(keywords: &[String], max_clusters: usize) -> BTreeMap<String, Vec<String>> {
    let max_clusters = max_clusters.max(1);
    let mut clusters: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut assigned = vec![false; keywords.len()];
    let mut formed = 0usize;

    for i in 0..keywords.len() {
        if assigned[i] {
            continue;
        }

        // Once at the cluster cap, everything left joins the last cluster
        if formed + 1 >= max_clusters {
            let rest: Vec<String> = keywords
                .iter()
                .zip(&assigned)
                .filter(|(_, done)| !**done)
                .map(|(k, _)| k.clone())
                .collect();
            if !rest.is_empty() {
                let name = rest[0].clone();
                clusters.insert(name, rest);
            }
            break;
        }

        let seed = &keywords[i];
        assigned[i] = true;
        let mut members = vec![seed.clone()];

        for j in (i + 1)..keywords.len() {
            if assigned[j] {
                continue;
            }
            if cluster_similarity(seed, &keywords[j]) >= CLUSTER_THRESHOLD {
                assigned[j] = true;
                members.push(keywords[j].clone());
            }
        }

        formed += 1;
        clusters.insert(seed.clone(), members);
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_greedy_groups_similar_keywords() {
        let keywords = kws(&[
            "best crm software",
            "best crm tools",
            "email marketing tips",
            "email marketing guide",
        ]);
        let clusters = greedy_clusters(&keywords, 10);
        assert_eq!(clusters.len(), 2);
        assert_eq!(
            clusters["best crm software"],
            kws(&["best crm software", "best crm tools"])
        );
        assert_eq!(
            clusters["email marketing tips"],
            kws(&["email marketing tips", "email marketing guide"])
        );
    }

    #[test]
    fn test_greedy_every_keyword_assigned_once() {
        let keywords = kws(&["alpha one", "beta two", "gamma three", "alpha ones"]);
        let clusters = greedy_clusters(&keywords, 10);
        let total: usize = clusters.values().map(|v| v.len()).sum();
        assert_eq!(total, keywords.len());
    }

    #[test]
    fn test_greedy_respects_max_clusters() {
        let keywords = kws(&["aa bb", "cc dd", "ee ff", "gg hh"]);
        let clusters = greedy_clusters(&keywords, 2);
        assert!(clusters.len() <= 2);
        let total: usize = clusters.values().map(|v| v.len()).sum();
        assert_eq!(total, keywords.len());
    }

    #[test]
    fn test_parse_clusters_files_missing_under_other() {
        let keywords = kws(&["crm software", "email tips"]);
        let reply = r#"{"CRM": ["crm software"]}"#;
        let clusters = parse_clusters(reply, &keywords).unwrap();
        assert_eq!(clusters["CRM"], kws(&["crm software"]));
        assert_eq!(clusters["other"], kws(&["email tips"]));
    }

    #[test]
    fn test_parse_clusters_drops_invented_keywords() {
        let keywords = kws(&["crm software"]);
        let reply = r#"{"CRM": ["crm software", "made up keyword"]}"#;
        let clusters = parse_clusters(reply, &keywords).unwrap();
        assert_eq!(clusters["CRM"], kws(&["crm software"]));
        assert!(!clusters.contains_key("other"));
    }

    #[tokio::test]
    async fn test_cluster_without_service_uses_fallback() {
        let tc = TopicCluster::new(None);
        let result = tc.cluster(&kws(&["aa bb", "aa bb cc"]), 5).await;
        assert_eq!(result.source, "fallback");
        assert_eq!(result.clusters.len(), 1);
    }
}
