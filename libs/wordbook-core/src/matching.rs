//! Answer checking for typed spellings.

use serde::{Deserialize, Serialize};

/// How strictly a typed spelling must match the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    /// Trimmed, case-sensitive equality.
    Exact,
    /// Trimmed, lowercased equality.
    CaseInsensitive,
    /// Lowercased Levenshtein similarity at or above a threshold.
    Fuzzy,
}

impl Default for MatchingMode {
    fn default() -> Self {
        Self::CaseInsensitive
    }
}

/// Result of comparing a typed answer to the target spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub is_correct: bool,
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
    pub matching_mode: MatchingMode,
    pub typed_normalized: String,
    pub correct_normalized: String,
}

/// Compare a typed answer to the correct spelling.
pub fn compare_answers(
    typed: &str,
    correct: &str,
    mode: MatchingMode,
    fuzzy_threshold: f64,
) -> MatchResult {
    let (typed_normalized, correct_normalized) = match mode {
        MatchingMode::Exact => (typed.trim().to_string(), correct.trim().to_string()),
        MatchingMode::CaseInsensitive | MatchingMode::Fuzzy => {
            (typed.trim().to_lowercase(), correct.trim().to_lowercase())
        }
    };

    let (is_correct, similarity) = match mode {
        MatchingMode::Exact | MatchingMode::CaseInsensitive => {
            let equal = typed_normalized == correct_normalized;
            (equal, if equal { 1.0 } else { 0.0 })
        }
        MatchingMode::Fuzzy => {
            let similarity = normalized_similarity(&typed_normalized, &correct_normalized);
            (!typed_normalized.is_empty() && similarity >= fuzzy_threshold, similarity)
        }
    };

    MatchResult {
        is_correct,
        similarity,
        matching_mode: mode,
        typed_normalized,
        correct_normalized,
    }
}

/// Calculate Levenshtein distance between two strings, counted in chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized similarity (0.0 to 1.0) based on Levenshtein distance.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}
