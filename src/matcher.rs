//! Matcher facade (C6): cascades Exact → Substring → Embedding, applies
//! profile filtering, and memoizes `(title, profile filter)` results.
//!
//! Grounded on `original_source/role_normalization/api/models/role_matcher.py`
//! (`RoleMatcher.match`) for the cascade order and profile-filter discipline,
//! and on `role_norm.py`'s `lru_cache`-wrapped entry point for the
//! memoization contract (an LRU keyed on `(string, sorted distinct integer
//! vector)` so the key is order-independent).

use crate::catalog::{CatalogRole, CatalogTier, ProfileMapping};
use crate::config::NormalizeOptions;
use crate::embedding::EmbeddingMatcher;
use crate::normalizer::{normalize, NormalizerContext};
use crate::substring::SubstringMatcher;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Which matcher produced a hit. Renders the legacy wire values used by the
/// out-of-scope HTTP layer's response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Substring,
    Embedding,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchKind::Exact => "database",
            MatchKind::Substring => "ahocorasick",
            MatchKind::Embedding => "word2vec",
        };
        f.write_str(s)
    }
}

/// The outcome of [`RoleMatcher::normalize_and_match`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub normalized_text: String,
    pub role: Option<CatalogRole>,
    pub match_kind: Option<MatchKind>,
}

/// An order-independent cache key for a profile filter: sorted and
/// deduplicated so two calls passing the same ids in different orders hash
/// identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ProfileFilterDigest(Vec<u64>);

impl ProfileFilterDigest {
    fn new(filter: &[u64]) -> Self {
        let mut sorted = filter.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        Self(sorted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    title: String,
    filter: ProfileFilterDigest,
}

/// The shared memoization table, keyed on `(title, canonicalized filter)`.
/// Handed to [`RoleMatcher`] as an `Arc` so a long-lived owner (e.g.
/// [`crate::engine::Engine`]) can keep one table alive across many
/// short-lived `RoleMatcher` values built from borrowed, per-call state.
pub type SharedCache = Arc<Mutex<LruCache<CacheKey, MatchResult>>>;

pub fn new_shared_cache(capacity: usize) -> SharedCache {
    let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
    Arc::new(Mutex::new(LruCache::new(capacity)))
}

pub struct RoleMatcher<'a> {
    main_roles: &'a HashMap<String, CatalogRole>,
    similar_roles: &'a HashMap<String, CatalogRole>,
    profile_mapping: &'a ProfileMapping,
    substring: Option<&'a SubstringMatcher>,
    embedding: Option<EmbeddingMatcher<'a>>,
    normalizer_ctx: NormalizerContext<'a>,
    normalize_options: NormalizeOptions,
    cache: SharedCache,
}

impl<'a> RoleMatcher<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        main_roles: &'a HashMap<String, CatalogRole>,
        similar_roles: &'a HashMap<String, CatalogRole>,
        profile_mapping: &'a ProfileMapping,
        substring: Option<&'a SubstringMatcher>,
        embedding: Option<EmbeddingMatcher<'a>>,
        normalizer_ctx: NormalizerContext<'a>,
        normalize_options: NormalizeOptions,
        cache_capacity: usize,
    ) -> Self {
        Self::with_shared_cache(
            main_roles,
            similar_roles,
            profile_mapping,
            substring,
            embedding,
            normalizer_ctx,
            normalize_options,
            new_shared_cache(cache_capacity),
        )
    }

    /// Like [`RoleMatcher::new`], but attaches an existing memoization table
    /// instead of starting a fresh one. Lets a caller rebuild the borrowed
    /// fields cheaply on every request while the cache itself persists.
    #[allow(clippy::too_many_arguments)]
    pub fn with_shared_cache(
        main_roles: &'a HashMap<String, CatalogRole>,
        similar_roles: &'a HashMap<String, CatalogRole>,
        profile_mapping: &'a ProfileMapping,
        substring: Option<&'a SubstringMatcher>,
        embedding: Option<EmbeddingMatcher<'a>>,
        normalizer_ctx: NormalizerContext<'a>,
        normalize_options: NormalizeOptions,
        cache: SharedCache,
    ) -> Self {
        Self {
            main_roles,
            similar_roles,
            profile_mapping,
            substring,
            embedding,
            normalizer_ctx,
            normalize_options,
            cache,
        }
    }

    pub fn normalize_and_match(&self, title: &str, profile_filter: &[u64]) -> MatchResult {
        let key = CacheKey {
            title: title.to_string(),
            filter: ProfileFilterDigest::new(profile_filter),
        };

        if let Some(hit) = self.cache.lock().get(&key).cloned() {
            return hit;
        }

        let result = self.compute(title, profile_filter);
        self.cache.lock().put(key, result.clone());
        result
    }

    fn compute(&self, title: &str, profile_filter: &[u64]) -> MatchResult {
        let normalized = normalize(title, &self.normalize_options, &self.normalizer_ctx);
        let norm = normalized.text;

        if let Some(role) = self.lookup_exact(&norm) {
            tracing::debug!(title, norm, "exact match");
            return self.apply_filter(norm, role, MatchKind::Exact, profile_filter);
        }

        if let Some(substring) = self.substring {
            if let Some(matched_title) = substring.find(&norm) {
                if let Some(role) = self.lookup_exact(&matched_title) {
                    tracing::debug!(title, norm, matched_title, "substring match");
                    return self.apply_filter(norm, role, MatchKind::Substring, profile_filter);
                }
            }
        }

        if let Some(embedding) = &self.embedding {
            if let Some(matched_title) = embedding.find(&norm) {
                if let Some(role) = self.lookup_exact(&matched_title) {
                    tracing::debug!(title, norm, matched_title, "embedding match");
                    return self.apply_filter(norm, role, MatchKind::Embedding, profile_filter);
                }
            }
        }

        MatchResult {
            normalized_text: norm,
            role: None,
            match_kind: None,
        }
    }

    fn lookup_exact(&self, normalized_title: &str) -> Option<CatalogRole> {
        self.main_roles
            .get(normalized_title)
            .or_else(|| self.similar_roles.get(normalized_title))
            .cloned()
    }

    fn apply_filter(
        &self,
        norm: String,
        role: CatalogRole,
        kind: MatchKind,
        profile_filter: &[u64],
    ) -> MatchResult {
        if profile_filter.is_empty() {
            return MatchResult {
                normalized_text: norm,
                role: Some(role),
                match_kind: Some(kind),
            };
        }

        if !profile_filter.iter().any(|id| role.profile_ids.contains(id)) {
            return MatchResult {
                normalized_text: norm,
                role: None,
                match_kind: None,
            };
        }

        let filtered = role.filter_by_profile(self.profile_mapping, profile_filter);
        MatchResult {
            normalized_text: norm,
            role: Some(filtered),
            match_kind: Some(kind),
        }
    }
}

/// The precedence between two roles sharing a `normalized_title`: main wins.
pub fn precedence(a: CatalogTier, b: CatalogTier) -> std::cmp::Ordering {
    a.cmp(&b)
}
