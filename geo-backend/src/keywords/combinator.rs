//! Wordbank combinator: Cartesian-product keyword synthesis from categorized
//! term lists, with a fuzzy-similarity dedup pass over the result.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::similarity::levenshtein_ratio;

/// Two phrases at or above this ratio are considered duplicates
pub const DEDUP_THRESHOLD: f64 = 0.85;

/// Named term lists the combinator draws from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wordbank {
    pub categories: HashMap<String, Vec<String>>,
}

impl Wordbank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in starter bank for brand-keyword synthesis
    pub fn default_bank(brand: &str) -> Self {
        let mut categories = HashMap::new();
        categories.insert("brand".to_string(), vec![brand.to_string()]);
        categories.insert(
            "modifier".to_string(),
            ["best", "top", "professional", "affordable", "trusted"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        categories.insert(
            "intent".to_string(),
            ["review", "pricing", "alternatives", "tutorial", "comparison"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        Self { categories }
    }

    pub fn add_category(&mut self, name: &str, terms: Vec<String>) {
        self.categories.insert(name.to_string(), terms);
    }
}

/// Options controlling a combination run
#[derive(Debug, Clone, Deserialize)]
pub struct CombinationRequest {
    /// Category names, in the order their terms are joined
    pub pattern: Vec<String>,
    /// Truncate the deduped output to this many phrases
    pub limit: Option<usize>,
    /// Joining separator; when absent, a space is used between terms that
    /// contain ASCII alphabetics and nothing otherwise (CJK phrases glue)
    pub separator: Option<String>,
}

/// Walk the Cartesian product of the pattern categories, join terms, and
/// dedup with an O(n²) similarity pass. First occurrence wins; input order
/// is preserved.
pub fn generate_combinations(bank: &Wordbank, req: &CombinationRequest) -> Vec<String> {
    let mut lists: Vec<Vec<String>> = Vec::new();
    for name in &req.pattern {
        match bank.categories.get(name) {
            Some(terms) if !terms.is_empty() => {
                lists.push(dedup_exact(terms));
            }
            // Empty or missing categories contribute nothing
            _ => {
                log::debug!("[WORDBANK] Skipping empty category '{}'", name);
            }
        }
    }

    if lists.is_empty() {
        return Vec::new();
    }

    let mut combos: Vec<Vec<&str>> = vec![Vec::new()];
    for list in &lists {
        let mut next = Vec::with_capacity(combos.len() * list.len());
        for combo in &combos {
            for term in list {
                let mut c = combo.clone();
                c.push(term.as_str());
                next.push(c);
            }
        }
        combos = next;
    }

    let phrases: Vec<String> = combos.iter().map(|c| join_terms(c, &req.separator)).collect();
    let mut deduped = dedup_fuzzy(phrases, DEDUP_THRESHOLD);

    if let Some(limit) = req.limit {
        deduped.truncate(limit);
    }
    deduped
}

/// Remove exact duplicates (after trim), preserving order
fn dedup_exact(terms: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in terms {
        let t = t.trim();
        if t.is_empty() {
            continue;
        }
        if !out.iter().any(|x| x == t) {
            out.push(t.to_string());
        }
    }
    out
}

fn join_terms(terms: &[&str], separator: &Option<String>) -> String {
    if let Some(sep) = separator {
        return terms.join(sep);
    }
    let spaced = terms
        .iter()
        .any(|t| t.contains(|c: char| c.is_ascii_alphabetic()));
    if spaced {
        terms.join(" ")
    } else {
        terms.concat()
    }
}

/// O(n²) fuzzy dedup: drop any phrase whose similarity to an already-kept
/// phrase reaches the threshold
pub fn dedup_fuzzy(phrases: Vec<String>, threshold: f64) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for phrase in phrases {
        let duplicate = kept
            .iter()
            .any(|k| levenshtein_ratio(k, &phrase) >= threshold);
        if !duplicate {
            kept.push(phrase);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank(pairs: &[(&str, &[&str])]) -> Wordbank {
        let mut b = Wordbank::new();
        for (name, terms) in pairs {
            b.add_category(name, terms.iter().map(|s| s.to_string()).collect());
        }
        b
    }

    fn req(pattern: &[&str]) -> CombinationRequest {
        CombinationRequest {
            pattern: pattern.iter().map(|s| s.to_string()).collect(),
            limit: None,
            separator: None,
        }
    }

    #[test]
    fn test_cartesian_product_order() {
        let b = bank(&[
            ("modifier", &["best", "top"][..]),
            ("brand", &["Acme"][..]),
            ("intent", &["review", "pricing"][..]),
        ]);
        let out = generate_combinations(&b, &req(&["modifier", "brand", "intent"]));
        assert_eq!(
            out,
            vec![
                "best Acme review",
                "best Acme pricing",
                "top Acme review",
                "top Acme pricing",
            ]
        );
    }

    #[test]
    fn test_empty_category_skipped_not_fatal() {
        let b = bank(&[("brand", &["Acme"][..]), ("empty", &[][..])]);
        let out = generate_combinations(&b, &req(&["empty", "brand"]));
        assert_eq!(out, vec!["Acme"]);
    }

    #[test]
    fn test_missing_category_skipped() {
        let b = bank(&[("brand", &["Acme"][..])]);
        let out = generate_combinations(&b, &req(&["nope", "brand"]));
        assert_eq!(out, vec!["Acme"]);
    }

    #[test]
    fn test_empty_pattern_empty_output() {
        let b = bank(&[("brand", &["Acme"][..])]);
        assert!(generate_combinations(&b, &req(&[])).is_empty());
    }

    #[test]
    fn test_duplicate_input_terms_removed() {
        let b = bank(&[("modifier", &["best", "best", " best "][..]), ("brand", &["Acme"][..])]);
        let out = generate_combinations(&b, &req(&["modifier", "brand"]));
        assert_eq!(out, vec!["best Acme"]);
    }

    #[test]
    fn test_fuzzy_dedup_first_wins() {
        let phrases = vec![
            "best project tracker".to_string(),
            "best project trackers".to_string(),
            "cloud backup service".to_string(),
        ];
        let out = dedup_fuzzy(phrases, DEDUP_THRESHOLD);
        assert_eq!(
            out,
            vec!["best project tracker", "cloud backup service"]
        );
    }

    #[test]
    fn test_limit_applies_after_dedup() {
        let b = bank(&[
            ("modifier", &["best", "top", "trusted"][..]),
            ("brand", &["Acme"][..]),
        ]);
        let mut r = req(&["modifier", "brand"]);
        r.limit = Some(2);
        let out = generate_combinations(&b, &r);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], "best Acme");
    }

    #[test]
    fn test_cjk_terms_join_without_separator() {
        let b = bank(&[("brand", &["智能云"][..]), ("intent", &["评测"][..])]);
        let out = generate_combinations(&b, &req(&["brand", "intent"]));
        assert_eq!(out, vec!["智能云评测"]);
    }

    #[test]
    fn test_explicit_separator() {
        let b = bank(&[("a", &["x"][..]), ("b", &["y"][..])]);
        let mut r = req(&["a", "b"]);
        r.separator = Some("-".to_string());
        assert_eq!(generate_combinations(&b, &r), vec!["x-y"]);
    }
}
