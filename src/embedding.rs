//! Word2Vec-style embedding matcher (C5).
//!
//! Grounded on `original_source/role_normalization/api/models/w2v_matcher.py`
//! (`W2VMatcher.match`, `_calculate_embedding`). Accumulates in `f64`: summing
//! in `f32` loses precision over long token runs, and cosine similarity here
//! needs a wide mantissa to keep the 0.90/0.01 thresholds meaningful.

use crate::error::{EngineError, Result};
use std::collections::{HashMap, HashSet};

const WORD_VECTORS_TXT: &str = include_str!("../data/embeddings/word_vectors.txt");
const WORD_IDF_TXT: &str = include_str!("../data/embeddings/word_idf.txt");

const TOP_K: usize = 5;
const SIMILARITY_TIE_MARGIN: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct WordEmbeddings {
    vectors: HashMap<String, Vec<f64>>,
    idf: HashMap<String, f64>,
    dim: usize,
}

impl WordEmbeddings {
    pub fn load_shipped() -> Result<Self> {
        Self::parse(WORD_VECTORS_TXT, WORD_IDF_TXT)
    }

    /// Parses the vector and IDF tables. A malformed *line* is logged and
    /// skipped, matching the gazetteer loader's tolerance for bad input rows
    /// — but if more than half of a table's non-blank lines fail to parse,
    /// the table itself is considered structurally broken rather than
    /// merely containing a few bad rows, and this returns
    /// [`EngineError::MalformedEmbeddings`].
    fn parse(vectors_text: &str, idf_text: &str) -> Result<Self> {
        let mut vectors: HashMap<String, Vec<f64>> = HashMap::new();
        let mut dim = 0;
        let mut total = 0usize;
        let mut malformed = 0usize;
        for line in vectors_text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            total += 1;
            let mut parts = line.split_whitespace();
            let word = match parts.next() {
                Some(w) => w.to_string(),
                None => continue,
            };
            let values: std::result::Result<Vec<f64>, _> = parts.map(str::parse::<f64>).collect();
            match values {
                Ok(values) if !values.is_empty() => {
                    dim = dim.max(values.len());
                    vectors.insert(word, values);
                }
                _ => {
                    malformed += 1;
                    tracing::warn!(line, "malformed word vector line, skipping");
                }
            }
        }
        if total > 0 && malformed * 2 > total {
            return Err(EngineError::MalformedEmbeddings(format!(
                "{malformed} of {total} word vector lines failed to parse"
            )));
        }

        let mut idf: HashMap<String, f64> = HashMap::new();
        for line in idf_text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, ',');
            match (parts.next(), parts.next()) {
                (Some(word), Some(weight)) => match weight.trim().parse::<f64>() {
                    Ok(weight) => {
                        idf.insert(word.trim().to_string(), weight);
                    }
                    Err(_) => tracing::warn!(line, "non-numeric idf weight, skipping"),
                },
                _ => tracing::warn!(line, "malformed idf line, skipping"),
            }
        }

        Ok(Self { vectors, idf, dim })
    }

    /// IDF-weighted mean embedding of `tokens`. Returns `None` if any token
    /// is missing from either the vector or IDF table.
    pub fn embed(&self, tokens: &[&str]) -> Option<Vec<f64>> {
        if tokens.is_empty() {
            return None;
        }
        let mut acc = vec![0.0f64; self.dim];
        let mut weight_sum = 0.0f64;
        for token in tokens {
            let vector = self.vectors.get(*token)?;
            let weight = *self.idf.get(*token)?;
            for (a, v) in acc.iter_mut().zip(vector.iter()) {
                *a += weight * v;
            }
            weight_sum += weight;
        }
        if weight_sum == 0.0 {
            return None;
        }
        for a in acc.iter_mut() {
            *a /= weight_sum;
        }
        Some(acc)
    }

    pub fn knows(&self, token: &str) -> bool {
        self.vectors.contains_key(token) && self.idf.contains_key(token)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TitleEmbeddings {
    /// (normalized title, unit-normalized embedding) pairs. Stored as a
    /// vector, not a map, since nearest-neighbor search scans all of them.
    entries: Vec<(String, Vec<f64>)>,
}

impl TitleEmbeddings {
    /// Build the title-embedding index. Titles whose tokens are not fully
    /// covered by `words` are excluded.
    pub fn build(words: &WordEmbeddings, normalized_titles: impl IntoIterator<Item = String>) -> Self {
        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for title in normalized_titles.into_iter().collect::<HashSet<_>>() {
            let tokens: Vec<&str> = title.split_whitespace().collect();
            match words.embed(&tokens) {
                Some(vector) => entries.push((title, normalize(&vector))),
                None => skipped += 1,
            }
        }
        tracing::info!(titles = entries.len(), skipped, "title embeddings built");
        Self { entries }
    }

    fn top_k(&self, query: &[f64], k: usize) -> Vec<(&str, f64)> {
        let mut scored: Vec<(&str, f64)> = self
            .entries
            .iter()
            .map(|(title, vector)| (title.as_str(), cosine(query, vector)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

fn normalize(vector: &[f64]) -> Vec<f64> {
    let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm == 0.0 {
        return vector.to_vec();
    }
    vector.iter().map(|v| v / norm).collect()
}

fn cosine(a: &[f64], b: &[f64]) -> f64 {
    // `a` is assumed pre-normalized by the caller's embed+normalize step;
    // `b` is always pre-normalized (title embeddings are stored unit-norm).
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let a_norm = a.iter().map(|v| v * v).sum::<f64>().sqrt();
    if a_norm == 0.0 {
        return 0.0;
    }
    dot / a_norm
}

pub struct EmbeddingMatcher<'a> {
    words: &'a WordEmbeddings,
    titles: &'a TitleEmbeddings,
    min_len: usize,
    min_similarity: f64,
    starting_role_words: HashSet<String>,
}

impl<'a> EmbeddingMatcher<'a> {
    pub fn new(
        words: &'a WordEmbeddings,
        titles: &'a TitleEmbeddings,
        min_len: usize,
        min_similarity: f64,
        starting_role_words: HashSet<String>,
    ) -> Self {
        Self {
            words,
            titles,
            min_len,
            min_similarity,
            starting_role_words,
        }
    }

    pub fn find(&self, norm_title: &str) -> Option<String> {
        let tokens: Vec<&str> = norm_title.split_whitespace().collect();
        if tokens.is_empty() || !tokens.iter().all(|t| self.words.knows(t)) {
            return None;
        }

        let input_has_starting_role = tokens.iter().any(|t| self.starting_role_words.contains(*t));

        let mut best: Option<(f64, usize, String)> = None;

        for len in self.min_len..=tokens.len() {
            for start in 0..=tokens.len() - len {
                let subsequence = &tokens[start..start + len];
                let Some(embedding) = self.words.embed(subsequence) else {
                    continue;
                };
                let embedding = normalize(&embedding);

                for (title, similarity) in self.titles.top_k(&embedding, TOP_K) {
                    if !input_has_starting_role
                        && title
                            .split_whitespace()
                            .any(|w| self.starting_role_words.contains(w))
                    {
                        continue;
                    }
                    if similarity <= self.min_similarity {
                        continue;
                    }

                    let adopt = match &best {
                        None => true,
                        Some((best_sim, best_len, _)) => {
                            if similarity > best_sim + SIMILARITY_TIE_MARGIN {
                                true
                            } else if (similarity - best_sim).abs() <= SIMILARITY_TIE_MARGIN {
                                len > *best_len
                            } else {
                                false
                            }
                        }
                    };
                    if adopt {
                        best = Some((similarity, len, title.to_string()));
                    }
                }
            }
        }

        best.map(|(_, _, title)| title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> WordEmbeddings {
        let vectors = "advogado 1.0 0.0\nmedico 0.0 1.0\njunior 0.9 0.1\ntrainee 0.0 0.9\n";
        let idf = "advogado,1.0\nmedico,1.0\njunior,1.0\ntrainee,1.0\n";
        WordEmbeddings::parse(vectors, idf).unwrap()
    }

    #[test]
    fn mostly_malformed_vector_table_is_rejected() {
        let vectors = "advogado 1.0 0.0\nbroken not-a-number\nbroken2 ???\n";
        let idf = "advogado,1.0\n";
        assert!(matches!(
            WordEmbeddings::parse(vectors, idf),
            Err(EngineError::MalformedEmbeddings(_))
        ));
    }

    #[test]
    fn missing_token_has_no_embedding() {
        let w = words();
        assert!(w.embed(&["advogado", "unknown"]).is_none());
    }

    #[test]
    fn embed_is_idf_weighted_mean() {
        let w = words();
        let v = w.embed(&["advogado", "medico"]).unwrap();
        assert!((v[0] - 0.5).abs() < 1e-9);
        assert!((v[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn match_rejects_below_threshold_similarity() {
        let w = words();
        let titles = TitleEmbeddings::build(&w, ["medico".to_string()]);
        let matcher = EmbeddingMatcher::new(&w, &titles, 1, 0.90, HashSet::new());
        assert_eq!(matcher.find("advogado"), None);
    }

    #[test]
    fn match_accepts_strong_similarity() {
        let w = words();
        let titles = TitleEmbeddings::build(&w, ["advogado".to_string()]);
        let matcher = EmbeddingMatcher::new(&w, &titles, 1, 0.90, HashSet::new());
        assert_eq!(matcher.find("advogado").as_deref(), Some("advogado"));
    }

    #[test]
    fn starting_role_guard_skips_candidate_when_input_lacks_it() {
        let w = words();
        let titles = TitleEmbeddings::build(&w, ["trainee".to_string()]);
        let starting = ["trainee".to_string()].into_iter().collect();
        let matcher = EmbeddingMatcher::new(&w, &titles, 1, 0.5, starting);
        assert_eq!(matcher.find("medico"), None);
    }

    #[test]
    fn unknown_input_token_returns_none() {
        let w = words();
        let titles = TitleEmbeddings::build(&w, ["advogado".to_string()]);
        let matcher = EmbeddingMatcher::new(&w, &titles, 1, 0.90, HashSet::new());
        assert_eq!(matcher.find("desconhecido"), None);
    }
}
