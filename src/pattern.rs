use crate::config::Config;
use serde::Serialize;

/// Pattern symbol matching any single letter.
pub const WILDCARD: char = '?';

/// Bucket used for answers whose first character is outside `[A-Z0-9]`.
pub const PLACEHOLDER_BUCKET: char = '_';

/// Map a first character to its shard bucket. Letters and digits map to
/// their uppercase form; anything else collapses to the placeholder bucket
/// so punctuation- or symbol-led answers still resolve to a valid shard.
pub fn sanitize_bucket(c: char) -> char {
    let u = c.to_ascii_uppercase();
    if u.is_ascii_uppercase() || u.is_ascii_digit() {
        u
    } else {
        PLACEHOLDER_BUCKET
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Literal first character: one shard, scanned inline.
    Direct,
    /// Wildcard first character: every shard of that length is a candidate,
    /// loaded concurrently with early stopping.
    ParallelOptimized,
}

/// Cost classification for a normalized pattern.
///
/// A wildcard-first pattern cannot narrow to one shard (every first-letter
/// bucket of that length is a candidate), so its cost grows with the number
/// of buckets; a literal-first pattern resolves to exactly one shard. This is
/// a first-class diagnostic surface for cost-estimation tooling, not an
/// internal detail.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub wildcard_count: usize,
    pub wildcard_positions: Vec<usize>,
    pub starts_with_wildcard: bool,
    pub is_high_cost_pattern: bool,
    pub search_strategy: SearchStrategy,
}

/// Classify a normalized (uppercase) pattern and pick a search strategy.
pub fn analyze(pattern: &str, cfg: &Config) -> PatternAnalysis {
    let len = pattern.chars().count();
    let wildcard_positions: Vec<usize> = pattern
        .chars()
        .enumerate()
        .filter(|(_, c)| *c == WILDCARD)
        .map(|(i, _)| i)
        .collect();
    let wildcard_count = wildcard_positions.len();
    let starts_with_wildcard = wildcard_positions.first() == Some(&0);
    let ratio = if len == 0 {
        0.0
    } else {
        wildcard_count as f64 / len as f64
    };
    let is_high_cost_pattern = starts_with_wildcard
        && (wildcard_count > cfg.high_cost_wildcards || ratio > cfg.high_cost_ratio);
    let search_strategy = if starts_with_wildcard {
        SearchStrategy::ParallelOptimized
    } else {
        SearchStrategy::Direct
    };
    PatternAnalysis {
        wildcard_count,
        wildcard_positions,
        starts_with_wildcard,
        is_high_cost_pattern,
        search_strategy,
    }
}

/// Full-string matcher compiled from a normalized pattern: each literal
/// position must match exactly, each wildcard matches exactly one character,
/// and the candidate must have the same length as the pattern.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    slots: Vec<Option<char>>,
}

impl CompiledPattern {
    pub fn compile(pattern: &str) -> Self {
        let slots = pattern
            .chars()
            .map(|c| if c == WILDCARD { None } else { Some(c) })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        let mut chars = candidate.chars();
        for slot in &self.slots {
            match (chars.next(), slot) {
                (Some(c), Some(lit)) if c == *lit => {}
                (Some(_), None) => {}
                _ => return false,
            }
        }
        // Reject candidates longer than the pattern.
        chars.next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_letters_digits_and_punctuation() {
        assert_eq!(sanitize_bucket('a'), 'A');
        assert_eq!(sanitize_bucket('Z'), 'Z');
        assert_eq!(sanitize_bucket('3'), '3');
        assert_eq!(sanitize_bucket('\''), PLACEHOLDER_BUCKET);
        assert_eq!(sanitize_bucket('é'), PLACEHOLDER_BUCKET);
    }

    #[test]
    fn analyze_literal_first_is_direct() {
        let cfg = Config::default();
        let a = analyze("A?PLE", &cfg);
        assert_eq!(a.wildcard_count, 1);
        assert_eq!(a.wildcard_positions, vec![1]);
        assert!(!a.starts_with_wildcard);
        assert!(!a.is_high_cost_pattern);
        assert_eq!(a.search_strategy, SearchStrategy::Direct);
    }

    #[test]
    fn analyze_wildcard_first_is_parallel() {
        let cfg = Config::default();
        let a = analyze("?PPLE", &cfg);
        assert!(a.starts_with_wildcard);
        assert_eq!(a.search_strategy, SearchStrategy::ParallelOptimized);
        // one wildcard out of five is below both high-cost thresholds
        assert!(!a.is_high_cost_pattern);
    }

    #[test]
    fn analyze_high_cost_by_count_and_by_ratio() {
        let cfg = Config::default();
        // 4 wildcards > 3
        assert!(analyze("????LE", &cfg).is_high_cost_pattern);
        // 2 of 3 positions: ratio 0.67 > 0.6
        assert!(analyze("??X", &cfg).is_high_cost_pattern);
        // wildcard-heavy but literal-first is never high cost
        assert!(!analyze("X?????", &cfg).is_high_cost_pattern);
    }

    #[test]
    fn matcher_requires_exact_length() {
        let m = CompiledPattern::compile("A?PLE");
        assert!(m.is_match("APPLE"));
        assert!(m.is_match("AMPLE"));
        assert!(!m.is_match("APPLES"));
        assert!(!m.is_match("APPL"));
        assert!(!m.is_match("BPPLE"));
    }

    #[test]
    fn matcher_all_wildcards_matches_any_word_of_that_length() {
        let m = CompiledPattern::compile("???");
        assert!(m.is_match("CAT"));
        assert!(m.is_match("DOG"));
        assert!(!m.is_match("GOAT"));
    }
}
