//! Aho-Corasick substring matcher (C4).
//!
//! Grounded on `original_source/role_normalization/api/models/
//! aho_corasick_matcher.py`'s `AhoCorasickMatcher.match`, built-then-queried
//! the same way as the rest of this crate's `aho-corasick` usage.

use aho_corasick::AhoCorasick;
use std::collections::HashSet;

const SENTINEL: char = ';';

pub struct SubstringMatcher {
    automaton: AhoCorasick,
    role_title_max_words: usize,
    min_len: usize,
    max_len: usize,
    single_word_blocklist: HashSet<String>,
}

impl SubstringMatcher {
    /// Build the automaton over `";" + normalized_title + ";"` for every
    /// distinct normalized catalog title.
    pub fn build(
        normalized_titles: impl IntoIterator<Item = String>,
        role_title_max_words: usize,
        min_len: usize,
        max_len: usize,
        single_word_blocklist: HashSet<String>,
    ) -> Self {
        let patterns: Vec<String> = normalized_titles
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .map(|title| format!("{SENTINEL}{title}{SENTINEL}"))
            .collect();

        let automaton = AhoCorasick::new(&patterns)
            .expect("substring automaton construction should never fail on well-formed patterns");

        tracing::info!(patterns = patterns.len(), "substring matcher built");

        Self {
            automaton,
            role_title_max_words,
            min_len,
            max_len,
            single_word_blocklist,
        }
    }

    /// Find the longest contiguous token sub-sequence of `norm_title` that is
    /// itself a catalog normalized title.
    pub fn find(&self, norm_title: &str) -> Option<String> {
        let tokens: Vec<&str> = norm_title
            .split_whitespace()
            .take(self.role_title_max_words)
            .collect();
        if tokens.is_empty() {
            return None;
        }

        let mut seen = HashSet::new();
        let mut subsequences: Vec<(usize, usize)> = Vec::new();
        for len in self.min_len..=self.max_len.min(tokens.len()) {
            for start in 0..=tokens.len().saturating_sub(len) {
                let key = (start, start + len);
                if seen.insert(key) {
                    subsequences.push(key);
                }
            }
        }

        subsequences.retain(|&(start, end)| {
            if end - start == 1 {
                !self.single_word_blocklist.contains(tokens[start])
            } else {
                true
            }
        });

        // Stable sort by descending length preserves the original
        // enumeration order among equal-length candidates.
        subsequences.sort_by_key(|&(start, end)| std::cmp::Reverse(end - start));

        for (start, end) in subsequences {
            let joined = tokens[start..end].join(" ");
            let query = format!("{SENTINEL}{joined}{SENTINEL}");
            if self.automaton.find(&query).is_some() {
                return Some(joined);
            }
        }
        None
    }
}
