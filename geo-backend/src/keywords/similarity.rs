//! String-similarity primitives shared by the dedup and clustering passes.

/// Normalized similarity in [0, 1]: 1 - levenshtein / max_len
pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return 1.0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let max_len = a_chars.len().max(b_chars.len());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein(&a_chars, &b_chars);
    1.0 - distance as f64 / max_len as f64
}

/// Classic DP edit distance over chars
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Jaccard similarity used by the clustering fallback: whitespace tokens for
/// text with ASCII words, character bigrams otherwise (CJK phrases have no
/// whitespace tokens to compare).
pub fn cluster_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let has_ascii_words =
        a.contains(|c: char| c.is_ascii_alphabetic()) && a.contains(char::is_whitespace);

    if has_ascii_words {
        let sa: Vec<&str> = a.split_whitespace().collect();
        let sb: Vec<&str> = b.split_whitespace().collect();
        jaccard(&sa, &sb)
    } else {
        let ba = bigrams(&a);
        let bb = bigrams(&b);
        jaccard(&ba, &bb)
    }
}

fn bigrams(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.len() < 2 {
        return chars.iter().map(|c| c.to_string()).collect();
    }
    chars.windows(2).map(|w| w.iter().collect()).collect()
}

fn jaccard<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let mut uniq_a: Vec<&T> = Vec::new();
    for x in a {
        if !uniq_a.contains(&x) {
            uniq_a.push(x);
        }
    }
    let mut uniq_b: Vec<&T> = Vec::new();
    for x in b {
        if !uniq_b.contains(&x) {
            uniq_b.push(x);
        }
    }
    let intersection = uniq_a.iter().filter(|x| uniq_b.contains(x)).count();
    let union = uniq_a.len() + uniq_b.len() - intersection;
    if union == 0 {
        return 1.0;
    }
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_ratio_identical() {
        assert_eq!(levenshtein_ratio("rust tools", "Rust Tools"), 1.0);
    }

    #[test]
    fn test_levenshtein_ratio_near_duplicate() {
        // one char off in a 20-char phrase scores above the 0.85 dedup band
        let r = levenshtein_ratio("best project tracker", "best project trackers");
        assert!(r > 0.85, "got {}", r);
    }

    #[test]
    fn test_levenshtein_ratio_distinct() {
        let r = levenshtein_ratio("cloud backup", "bicycle repair");
        assert!(r < 0.5, "got {}", r);
    }

    #[test]
    fn test_short_cjk_phrases_stay_distinct() {
        // 4-char phrases differing in one char must survive a 0.85 threshold
        let r = levenshtein_ratio("智能写作", "智能创作");
        assert!((r - 0.75).abs() < 1e-9, "got {}", r);
    }

    #[test]
    fn test_cluster_similarity_token_overlap() {
        let s = cluster_similarity("best crm software", "best crm tools");
        // overlap {best, crm} of union {best, crm, software, tools}
        assert!((s - 0.5).abs() < 1e-9, "got {}", s);
    }

    #[test]
    fn test_cluster_similarity_cjk_bigrams() {
        let s = cluster_similarity("智能写作工具", "智能写作软件");
        assert!(s > 0.3, "got {}", s);
        assert!(s < 1.0);
    }

    #[test]
    fn test_cluster_similarity_disjoint() {
        assert_eq!(cluster_similarity("alpha beta", "gamma delta"), 0.0);
    }
}
