//! Rule-based content metrics. No LLM involved: everything here is counting
//! and regex over the text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+\S").unwrap());
static LIST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*([-*•]|\d+[.)])\s+\S").unwrap());
static QA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^\s*(Q[:：]|A[:：]|问[:：]|答[:：])").unwrap());

#[derive(Debug, Clone, Serialize)]
pub struct ContentMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_len: f64,
    pub paragraph_count: usize,
    /// Keyword occurrences per 100 words
    pub keyword_density: f64,
    /// Rough grade level from sentence length and long-word share
    pub readability_grade: f64,
    pub has_headers: bool,
    pub has_lists: bool,
    pub has_qa: bool,
}

/// Count words: whitespace-separated ASCII tokens plus one per CJK character
pub fn word_count(text: &str) -> usize {
    let mut count = 0usize;
    for token in text.split_whitespace() {
        let cjk = token.chars().filter(|c| is_cjk(*c)).count();
        let has_alnum = token.chars().any(|c| c.is_alphanumeric() && !is_cjk(c));
        count += cjk + usize::from(has_alnum);
    }
    count
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32, 0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0xF900..=0xFAFF)
}

pub fn sentence_count(text: &str) -> usize {
    text.split(|c| matches!(c, '.' | '!' | '?' | '。' | '！' | '？'))
        .filter(|s| s.trim().chars().any(|c| c.is_alphanumeric()))
        .count()
}

/// Keyword occurrences per 100 words (case-insensitive substring)
pub fn keyword_density(text: &str, keyword: &str) -> f64 {
    let words = word_count(text);
    if words == 0 || keyword.trim().is_empty() {
        return 0.0;
    }
    let occurrences = count_occurrences(text, keyword);
    occurrences as f64 * 100.0 / words as f64
}

pub fn count_occurrences(text: &str, needle: &str) -> usize {
    let text = text.to_lowercase();
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    text.matches(&needle).count()
}

pub fn analyze(text: &str, keyword: &str) -> ContentMetrics {
    let words = word_count(text);
    let sentences = sentence_count(text);
    let paragraphs = text
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .count();

    let avg_sentence_len = if sentences == 0 {
        0.0
    } else {
        words as f64 / sentences as f64
    };

    let long_words = text
        .split_whitespace()
        .filter(|w| w.chars().filter(|c| c.is_alphabetic()).count() >= 7)
        .count();
    let long_share = if words == 0 {
        0.0
    } else {
        long_words as f64 / words as f64
    };
    // Simplified grade estimate in the Flesch-Kincaid family
    let readability_grade = 0.39 * avg_sentence_len + 11.8 * long_share;

    ContentMetrics {
        word_count: words,
        sentence_count: sentences,
        avg_sentence_len,
        paragraph_count: paragraphs,
        keyword_density: keyword_density(text, keyword),
        readability_grade,
        has_headers: HEADER_RE.is_match(text),
        has_lists: LIST_RE.is_match(text),
        has_qa: QA_RE.is_match(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_ascii() {
        assert_eq!(word_count("the quick brown fox"), 4);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  \n  "), 0);
    }

    #[test]
    fn test_word_count_cjk() {
        assert_eq!(word_count("智能云服务"), 5);
        // Mixed: 2 CJK chars + 1 ascii word
        assert_eq!(word_count("云端 backup"), 3);
    }

    #[test]
    fn test_sentence_count() {
        assert_eq!(sentence_count("One. Two! Three?"), 3);
        assert_eq!(sentence_count("第一句。第二句！"), 2);
        assert_eq!(sentence_count("..."), 0);
    }

    #[test]
    fn test_keyword_density() {
        let text = "acme is great. everyone loves acme here today";
        // 2 occurrences over 8 words
        let d = keyword_density(text, "acme");
        assert!((d - 25.0).abs() < 1e-9, "got {}", d);
    }

    #[test]
    fn test_structure_flags() {
        let text = "# Title\n\nIntro paragraph.\n\n- item one\n- item two\n\nQ: is it good?\nA: yes.";
        let m = analyze(text, "item");
        assert!(m.has_headers);
        assert!(m.has_lists);
        assert!(m.has_qa);
        assert_eq!(m.paragraph_count, 4);
    }

    #[test]
    fn test_plain_text_has_no_structure() {
        let m = analyze("Just a plain sentence without structure.", "plain");
        assert!(!m.has_headers);
        assert!(!m.has_lists);
        assert!(!m.has_qa);
    }
}
