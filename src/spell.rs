//! Spell correction index (C2): symmetric-delete lookup, max edit distance 2.
//!
//! Grounded on `original_source/role_normalization/api/models/
//! role_normalizer.py`'s `_correct_spelling`, which wraps a `SymSpell`
//! instance seeded from an NLTK `floresta`/`machado` frequency list plus
//! catalog-mined vocabulary. No symmetric-delete crate appears anywhere in
//! the retrieved corpus, so the index below is hand-rolled, following the
//! standard SymSpell construction (Garbe): every dictionary word is expanded
//! to all strings reachable by deleting up to `MAX_EDIT_DISTANCE` characters,
//! and those deletions index back to their source words.

use std::collections::HashMap;

const PT_BR_FREQUENCY_TXT: &str = include_str!("../data/dict/pt_br_frequency.txt");
const EN_WORDS_TXT: &str = include_str!("../data/dict/en_words.txt");

const MAX_EDIT_DISTANCE: usize = 2;

#[derive(serde::Serialize, serde::Deserialize)]
pub struct SpellIndex {
    /// word -> frequency, the corrected-word ranking key.
    frequencies: HashMap<String, u64>,
    /// delete-variant -> source words that produce it within MAX_EDIT_DISTANCE.
    deletes: HashMap<String, Vec<String>>,
}

impl SpellIndex {
    /// Build the index from the shipped pt-BR frequency list, the shipped
    /// English loanword list, and extra catalog-mined words. Sources are
    /// merged by summing frequencies where a word already exists, so a word
    /// appearing in more than one source outranks one seen only once.
    pub fn build(extra_words: impl IntoIterator<Item = String>) -> Self {
        let mut frequencies: HashMap<String, u64> = HashMap::new();

        for line in PT_BR_FREQUENCY_TXT.lines() {
            if line.trim_start().starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let mut parts = line.splitn(2, ',');
            let (word, freq) = match (parts.next(), parts.next()) {
                (Some(w), Some(f)) => (w.trim(), f.trim()),
                _ => {
                    tracing::warn!(line, "malformed frequency dictionary line, skipping");
                    continue;
                }
            };
            match freq.parse::<u64>() {
                Ok(freq) => {
                    frequencies.insert(word.to_string(), freq);
                }
                Err(_) => tracing::warn!(line, "non-numeric frequency, skipping"),
            }
        }

        for word in EN_WORDS_TXT.lines().map(str::trim).filter(|w| !w.is_empty()) {
            *frequencies.entry(word.to_string()).or_insert(0) += 1;
        }

        for word in extra_words {
            *frequencies.entry(word).or_insert(0) += 1;
        }

        let mut deletes: HashMap<String, Vec<String>> = HashMap::new();
        for word in frequencies.keys() {
            for variant in deletes_within(word, MAX_EDIT_DISTANCE) {
                deletes.entry(variant).or_default().push(word.clone());
            }
        }

        tracing::info!(
            dictionary_words = frequencies.len(),
            delete_variants = deletes.len(),
            "spell index built"
        );

        Self { frequencies, deletes }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.frequencies.contains_key(word)
    }

    /// Suggest a correction for `word`. Returns `None` if `word` is already
    /// known, or if no dictionary word is within edit distance 2. Among
    /// candidates, prefers the smallest edit distance, then the highest
    /// frequency (matching SymSpell's default ranking).
    pub fn correct(&self, word: &str) -> Option<String> {
        if word.is_empty() || self.frequencies.contains_key(word) {
            return None;
        }

        let mut candidates: HashMap<String, usize> = HashMap::new();

        if let Some(sources) = self.deletes.get(word) {
            for source in sources {
                let d = edit_distance(word, source);
                if d <= MAX_EDIT_DISTANCE {
                    candidates.entry(source.clone()).or_insert(d);
                }
            }
        }

        for variant in deletes_within(word, MAX_EDIT_DISTANCE) {
            if let Some(exact) = self.frequencies.get(&variant) {
                let d = edit_distance(word, &variant);
                if d <= MAX_EDIT_DISTANCE {
                    candidates.entry(variant.clone()).or_insert(d);
                    let _ = exact;
                }
            }
            if let Some(sources) = self.deletes.get(&variant) {
                for source in sources {
                    let d = edit_distance(word, source);
                    if d <= MAX_EDIT_DISTANCE {
                        candidates.entry(source.clone()).or_insert(d);
                    }
                }
            }
        }

        candidates
            .into_iter()
            .min_by(|(word_a, dist_a), (word_b, dist_b)| {
                dist_a
                    .cmp(dist_b)
                    .then_with(|| {
                        let freq_a = self.frequencies.get(word_a).copied().unwrap_or(0);
                        let freq_b = self.frequencies.get(word_b).copied().unwrap_or(0);
                        freq_b.cmp(&freq_a)
                    })
            })
            .map(|(word, _)| word)
    }
}

/// All strings reachable from `word` by deleting up to `max_distance`
/// characters (including `word` itself at distance 0).
fn deletes_within(word: &str, max_distance: usize) -> Vec<String> {
    let mut frontier = vec![word.to_string()];
    let mut all = vec![word.to_string()];
    for _ in 0..max_distance {
        let mut next = Vec::new();
        for s in &frontier {
            let chars: Vec<char> = s.chars().collect();
            for i in 0..chars.len() {
                let mut variant = String::with_capacity(s.len());
                for (j, c) in chars.iter().enumerate() {
                    if j != i {
                        variant.push(*c);
                    }
                }
                next.push(variant);
            }
        }
        next.sort();
        next.dedup();
        all.extend(next.iter().cloned());
        frontier = next;
        if frontier.is_empty() {
            break;
        }
    }
    all.sort();
    all.dedup();
    all
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
