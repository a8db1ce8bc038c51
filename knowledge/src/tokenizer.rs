use std::collections::HashMap;

/// Common English stop words excluded from tokenization.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "then", "else", "of", "to", "in", "on", "at", "for", "with", "by", "from",
    "is", "are", "was", "were", "be", "been", "being", "this", "that", "these", "those", "it", "its", "as", "into", "about",
    "not", "no", "so", "than", "too", "very", "can", "will", "just", "do", "does", "did", "has", "have", "had",
];

/// Token frequency map: lowercased, non-alphanumeric-dash characters
/// stripped, tokens of length `<=1` and stop words dropped. Frequencies
/// (rather than a plain set) are kept because search uses weighted Jaccard.
#[must_use]
pub fn tokenize(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for word in text.to_lowercase().split_whitespace() {
        let token: String = word.chars().filter(|c| c.is_alphanumeric() || *c == '-').collect();
        if token.chars().count() > 1 && !STOP_WORDS.contains(&token.as_str()) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }
    counts
}

/// Weighted Jaccard similarity over two token-frequency maps:
/// `sum(min(freq)) / sum(max(freq))` across the union of terms.
#[must_use]
pub fn weighted_jaccard(a: &HashMap<String, u32>, b: &HashMap<String, u32>) -> f64 {
    let mut intersection = 0u64;
    let mut union = 0u64;
    let mut seen = std::collections::HashSet::new();

    for (term, count_a) in a {
        let count_b = b.get(term).copied().unwrap_or(0);
        intersection += u64::from((*count_a).min(count_b));
        union += u64::from((*count_a).max(count_b));
        seen.insert(term.clone());
    }
    for (term, count_b) in b {
        if seen.contains(term) {
            continue;
        }
        union += u64::from(*count_b);
    }

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
