//! Text helpers shared by the content tools

use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

static WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9][A-Za-z0-9+#.\-]*[A-Za-z0-9+#]|[A-Za-z0-9]").expect("valid regex")
});

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(\s+|$)").expect("valid regex"));

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "how",
    "if", "in", "into", "is", "it", "its", "just", "more", "new", "not", "now", "of", "on", "or", "our",
    "out", "over", "said", "says", "so", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "to", "up", "was", "we", "were", "what", "when", "which", "who",
    "will", "with", "would", "you", "your",
];

/// Lowercased content words, stopwords and one-letter tokens removed
pub fn tokens(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.len() > 1 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

pub fn token_set(text: &str) -> HashSet<String> {
    tokens(text).into_iter().collect()
}

/// Jaccard similarity of two token sets; 0 when both are empty
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Most frequent tokens, ties broken alphabetically
pub fn top_terms<'a, I>(tokens: I, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked.into_iter().take(n).map(|(t, _)| t.to_string()).collect()
}

/// Split text into trimmed, non-empty sentences
pub fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        let sentence = text[start..m.end()].trim();
        if !sentence.is_empty() {
            out.push(sentence.to_string());
        }
        start = m.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Truncate to at most `max` characters, ending with an ellipsis when cut
pub fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    if text.chars().count() <= max {
        return (text.to_string(), false);
    }
    if max == 0 {
        return (String::new(), true);
    }
    let mut cut: String = text.chars().take(max - 1).collect();
    // Prefer a word boundary when one is close
    if let Some(idx) = cut.rfind(char::is_whitespace) {
        if idx * 4 >= cut.len() * 3 {
            cut.truncate(idx);
        }
    }
    let mut cut = cut.trim_end().to_string();
    cut.push('…');
    (cut, true)
}

/// Lowercase, dash-separated identifier safe for file names
pub fn slug(text: &str) -> String {
    let mut out = String::new();
    let mut dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            dash = false;
        } else if !dash && !out.is_empty() {
            out.push('-');
            dash = true;
        }
        if out.len() >= 60 {
            break;
        }
    }
    let out = out.trim_end_matches('-').to_string();
    if out.is_empty() {
        "untitled".to_string()
    } else {
        out
    }
}

/// Normalize a URL for duplicate detection
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let without_fragment = url.split('#').next().unwrap_or(url);
    let (base, query) = match without_fragment.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (without_fragment, None),
    };

    let base = base
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .trim_end_matches('/')
        .to_lowercase();

    let params: Vec<&str> = query
        .map(|q| {
            let mut kept: Vec<&str> = q
                .split('&')
                .filter(|p| !p.is_empty() && !p.starts_with("utm_") && !p.starts_with("ref="))
                .collect();
            kept.sort();
            kept
        })
        .unwrap_or_default();

    if params.is_empty() {
        base
    } else {
        format!("{}?{}", base, params.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_drop_stopwords() {
        assert_eq!(
            tokens("The GPT-5 model is out, and it's fast"),
            vec!["gpt-5", "model", "fast"]
        );
    }

    #[test]
    fn test_jaccard() {
        let a = token_set("openai releases gpt-5");
        let b = token_set("OpenAI releases GPT-5 today");
        assert!((jaccard(&a, &b) - 0.75).abs() < 1e-9);
        assert_eq!(jaccard(&HashSet::new(), &HashSet::new()), 0.0);
    }

    #[test]
    fn test_top_terms() {
        let words: Vec<String> = ["b", "a", "b", "c", "a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(top_terms(&words, 2), vec!["b", "a"]);
    }

    #[test]
    fn test_sentences() {
        assert_eq!(
            sentences("First one. Second one!  Third"),
            vec!["First one.", "Second one!", "Third"]
        );
        assert!(sentences("   ").is_empty());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), ("short".to_string(), false));
        let (cut, truncated) = truncate_chars("one two three four five", 12);
        assert!(truncated);
        assert!(cut.chars().count() <= 12);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("OpenAI Releases GPT-5!"), "openai-releases-gpt-5");
        assert_eq!(slug("???"), "untitled");
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("https://www.Example.com/gpt5/?utm_source=x#top"),
            "example.com/gpt5"
        );
        assert_eq!(
            normalize_url("http://example.com/a?b=2&a=1"),
            "example.com/a?a=1&b=2"
        );
    }
}
