//! Configuration for the normalizer (C3) and the engine as a whole.
//!
//! An explicit, serde-serializable policy struct with a documented
//! `Default`, so the pipeline's behavior is never implicit.

use std::collections::HashSet;

/// Per-call switches for [`crate::normalizer::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NormalizeOptions {
    pub correct_typos: bool,
    pub stemming: bool,
    pub remove_locations: bool,
    pub normalize_conjugation: bool,
    pub normalize_plural: bool,
    pub normalize_gender: bool,
    pub normalize_thesaurus: bool,
    pub normalize_special_character_terms: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            correct_typos: true,
            stemming: false,
            remove_locations: false,
            normalize_conjugation: true,
            normalize_plural: true,
            normalize_gender: true,
            normalize_thesaurus: true,
            normalize_special_character_terms: true,
        }
    }
}

impl NormalizeOptions {
    /// The options used when normalizing catalog titles themselves:
    /// `normalized_title` is computed with `correct_typos=false`.
    pub fn catalog_default() -> Self {
        Self {
            correct_typos: false,
            ..Self::default()
        }
    }
}

/// Engine-wide configuration: feature toggles and thresholds for the
/// substring and embedding matchers, plus the artifact directory and cache
/// capacity.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    pub aho_corasick_matching_enabled: bool,
    pub aho_corasick_role_title_max_words: usize,
    pub aho_corasick_word_combinations_min_length: usize,
    pub aho_corasick_word_combinations_max_length: usize,
    pub aho_corasick_single_word_titles_blocklist: HashSet<String>,

    pub w2v_matching_enabled: bool,
    pub w2v_word_combinations_min_length: usize,
    pub w2v_min_role_similarity: f64,
    pub w2v_starting_role_words: HashSet<String>,

    /// Directory used by the artifact cache (C7) to persist derived state.
    pub artifact_dir: std::path::PathBuf,

    /// When set, a cached artifact whose version tag doesn't match the
    /// binary's expectation is a fatal `ArtifactVersionMismatch` instead of
    /// a logged-and-rebuilt one. Off by default: an `artifact_dir` is
    /// usually process-local and rebuilding is cheaper than failing boot.
    pub strict_artifacts: bool,

    /// Capacity of the memoization LRU in C6 (and C3's own `normalize` LRU).
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            aho_corasick_matching_enabled: true,
            aho_corasick_role_title_max_words: 50,
            aho_corasick_word_combinations_min_length: 1,
            aho_corasick_word_combinations_max_length: 10,
            aho_corasick_single_word_titles_blocklist: [
                "arquiteto",
                "medico",
                "seguranca",
                "designer",
            ]
            .into_iter()
            .map(String::from)
            .collect(),

            w2v_matching_enabled: false,
            w2v_word_combinations_min_length: 1,
            w2v_min_role_similarity: 0.90,
            w2v_starting_role_words: ["estagiario", "trainee"]
                .into_iter()
                .map(String::from)
                .collect(),

            artifact_dir: std::path::PathBuf::from("./rolematch-artifacts"),
            strict_artifacts: false,
            cache_capacity: 8192,
        }
    }
}
