//! Top-level engine: wires C1–C7 into one `Send + Sync` value.
//!
//! Grounded on `original_source/role_normalization/api/role_norm.py`'s
//! `RoleNormalization` class, whose `__init__` builds (or reloads) every
//! derived artifact once and holds them for the process lifetime.

use crate::cache;
use crate::catalog::{CatalogRole, CatalogTier, ProfileMapping};
use crate::config::{EngineConfig, NormalizeOptions};
use crate::embedding::{EmbeddingMatcher, TitleEmbeddings, WordEmbeddings};
use crate::error::Result;
use crate::gazetteer::GazetteerStore;
use crate::matcher::{self, MatchResult, RoleMatcher, SharedCache};
use crate::normalizer::{normalize, NormalizerContext};
use crate::spell::SpellIndex;
use crate::substring::SubstringMatcher;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// One entry passed to [`Engine::build`]: a raw catalog row before
/// normalization.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub role_id: u64,
    pub title: String,
    pub tier: CatalogTier,
    pub area_ids: HashSet<u64>,
    pub hierarchy_level_ids: HashSet<u64>,
    pub profile_ids: HashSet<u64>,
}

/// One normalized result inside [`Engine::normalize_titles`]'s response map,
/// shaped after the wire model the matched `CatalogRole` is projected onto.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormalizedRoleTitle {
    pub normalized_role: String,
    pub role_id: u64,
    pub seniority: Vec<String>,
    pub hierarchy: Vec<String>,
    pub areap_ids: Vec<u64>,
    pub nivelh_ids: Vec<u64>,
    /// `Some` only when `profile_filter` was non-empty.
    pub perfil_ids: Option<Vec<u64>>,
    /// `Some` only when the caller requested `include_match_kind`.
    pub match_type: Option<String>,
}

/// Artifacts cached together since they're derived from the catalog in one
/// pass: the normalized main/similar role maps.
#[derive(serde::Serialize, serde::Deserialize)]
struct NormalizedCatalog {
    main_roles: HashMap<String, CatalogRole>,
    similar_roles: HashMap<String, CatalogRole>,
}

struct EngineInner {
    main_roles: HashMap<String, CatalogRole>,
    similar_roles: HashMap<String, CatalogRole>,
    profile_mapping: ProfileMapping,
    gazetteer: GazetteerStore,
    spell: SpellIndex,
    dictionary: HashSet<String>,
    substring: Option<SubstringMatcher>,
    word_embeddings: Option<WordEmbeddings>,
    title_embeddings: Option<TitleEmbeddings>,
    config: EngineConfig,
    /// Shared across every [`Engine::normalize_and_match`] call so the LRU
    /// memoization actually persists between requests instead of resetting
    /// each time.
    cache: SharedCache,
}

/// The normalize-and-match engine. Cheaply `Clone`-able (an `Arc` handle);
/// read-only after [`Engine::build`].
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    /// Build the engine from a raw catalog and configuration, persisting
    /// derived artifacts under `config.artifact_dir`.
    pub fn build(catalog: Vec<CatalogEntry>, config: EngineConfig) -> Result<Self> {
        let titles: Vec<String> = catalog.iter().map(|e| e.title.clone()).collect();
        let gazetteer = GazetteerStore::load(&titles);

        let catalog_default = NormalizeOptions::catalog_default();

        let mined_words: Vec<String> = cache::load_or_build_with(
            &config.artifact_dir,
            "mined_words",
            config.strict_artifacts,
            || mine_catalog_words(&catalog, &gazetteer),
        )?;

        let spell: SpellIndex = cache::load_or_build_with(
            &config.artifact_dir,
            "spell_index",
            config.strict_artifacts,
            || SpellIndex::build(mined_words.iter().cloned()),
        )?;

        let dictionary: HashSet<String> = cache::load_or_build_with(
            &config.artifact_dir,
            "dictionary",
            config.strict_artifacts,
            || {
                let mut dictionary: HashSet<String> = gazetteer.stopwords.iter().cloned().collect();
                dictionary.extend(gazetteer.conjugation_mapping.keys().cloned());
                dictionary.extend(gazetteer.conjugation_mapping.values().cloned());
                dictionary.extend(gazetteer.sorted_locations.iter().cloned());
                dictionary.extend(crate::gazetteer::SENIORITIES.iter().map(|s| s.to_string()));
                dictionary.extend(crate::gazetteer::HIERARCHIES.iter().map(|s| s.to_string()));
                dictionary.extend(mined_words.iter().cloned());
                dictionary
            },
        )?;

        let normalizer_ctx = NormalizerContext {
            gazetteer: &gazetteer,
            spell: &spell,
            dictionary: &dictionary,
        };

        let normalized: NormalizedCatalog = cache::load_or_build_with(
            &config.artifact_dir,
            "normalized_catalog",
            config.strict_artifacts,
            || {
                let normalized_catalog: Vec<CatalogRole> = catalog
                    .into_iter()
                    .map(|entry| {
                        let normalized = normalize(&entry.title, &catalog_default, &normalizer_ctx);
                        CatalogRole {
                            role_id: entry.role_id,
                            title: entry.title,
                            normalized_title: normalized.text,
                            seniorities: normalized.seniorities,
                            hierarchies: normalized.hierarchies,
                            tier: entry.tier,
                            area_ids: entry.area_ids,
                            hierarchy_level_ids: entry.hierarchy_level_ids,
                            profile_ids: entry.profile_ids,
                        }
                    })
                    .collect();
                let (main_roles, similar_roles) = split_by_tier(normalized_catalog);
                NormalizedCatalog { main_roles, similar_roles }
            },
        )?;
        let NormalizedCatalog { main_roles, similar_roles } = normalized;

        let profile_mapping = ProfileMapping::from_roles(
            &main_roles
                .values()
                .chain(similar_roles.values())
                .cloned()
                .collect::<Vec<_>>(),
        );

        let substring = if config.aho_corasick_matching_enabled {
            let all_titles = main_roles.keys().chain(similar_roles.keys()).cloned();
            Some(SubstringMatcher::build(
                all_titles,
                config.aho_corasick_role_title_max_words,
                config.aho_corasick_word_combinations_min_length,
                config.aho_corasick_word_combinations_max_length,
                config.aho_corasick_single_word_titles_blocklist.clone(),
            ))
        } else {
            None
        };

        let (word_embeddings, title_embeddings) = if config.w2v_matching_enabled {
            let words = WordEmbeddings::load_shipped()?;
            let all_titles: Vec<String> = main_roles.keys().chain(similar_roles.keys()).cloned().collect();
            let titles: TitleEmbeddings = cache::load_or_build_with(
                &config.artifact_dir,
                "title_embeddings",
                config.strict_artifacts,
                || TitleEmbeddings::build(&words, all_titles),
            )?;
            (Some(words), Some(titles))
        } else {
            (None, None)
        };

        tracing::info!(
            main_roles = main_roles.len(),
            similar_roles = similar_roles.len(),
            "engine built"
        );

        let cache = matcher::new_shared_cache(config.cache_capacity);

        Ok(Self {
            inner: Arc::new(EngineInner {
                main_roles,
                similar_roles,
                profile_mapping,
                gazetteer,
                spell,
                dictionary,
                substring,
                word_embeddings,
                title_embeddings,
                config,
                cache,
            }),
        })
    }

    /// `profile_filter` holds positive catalog profile ids; any non-positive
    /// value can never match a profile's taxonomy and is dropped before the
    /// cascade runs.
    pub fn normalize_and_match(&self, title: &str, profile_filter: &[i64]) -> MatchResult {
        let normalizer_ctx = NormalizerContext {
            gazetteer: &self.inner.gazetteer,
            spell: &self.inner.spell,
            dictionary: &self.inner.dictionary,
        };
        let embedding = match (&self.inner.word_embeddings, &self.inner.title_embeddings) {
            (Some(words), Some(titles)) => Some(EmbeddingMatcher::new(
                words,
                titles,
                self.inner.config.w2v_word_combinations_min_length,
                self.inner.config.w2v_min_role_similarity,
                self.inner.config.w2v_starting_role_words.clone(),
            )),
            _ => None,
        };

        let matcher = RoleMatcher::with_shared_cache(
            &self.inner.main_roles,
            &self.inner.similar_roles,
            &self.inner.profile_mapping,
            self.inner.substring.as_ref(),
            embedding,
            normalizer_ctx,
            NormalizeOptions::default(),
            self.inner.cache.clone(),
        );
        matcher.normalize_and_match(title, &to_internal_ids(profile_filter))
    }

    /// Splits `title` on `{ "/", ",", " ou ", ";", "|" }`, calls
    /// [`Engine::normalize_and_match`] on each piece, and groups the results
    /// under the original (unsplit) input string. Inputs with zero matches
    /// are omitted from the returned map. Preserves the documented `" ou "`
    /// quirk (it also splits loanword titles like "Tour Operator").
    ///
    /// `perfil_ids` is only populated on each result when `profile_filter`
    /// is non-empty; `match_type` is only populated when `include_match_kind`
    /// is set — mirroring the two query-parameter-gated wire fields.
    pub fn normalize_titles(
        &self,
        titles: &[String],
        profile_filter: &[i64],
        include_match_kind: bool,
    ) -> BTreeMap<String, Vec<NormalizedRoleTitle>> {
        let mut out = BTreeMap::new();
        for title in titles {
            let pieces = split_title(title);
            let results: Vec<NormalizedRoleTitle> = pieces
                .iter()
                .filter_map(|piece| {
                    let result = self.normalize_and_match(piece, profile_filter);
                    let MatchResult { role, match_kind, .. } = result;
                    let role = role?;
                    let mut areap_ids: Vec<u64> = role.area_ids.iter().copied().collect();
                    areap_ids.sort_unstable();
                    let mut nivelh_ids: Vec<u64> = role.hierarchy_level_ids.iter().copied().collect();
                    nivelh_ids.sort_unstable();
                    let perfil_ids = if profile_filter.is_empty() {
                        None
                    } else {
                        let mut ids: Vec<u64> = role.profile_ids.iter().copied().collect();
                        ids.sort_unstable();
                        Some(ids)
                    };
                    let match_type = if include_match_kind {
                        match_kind.map(|kind| kind.to_string())
                    } else {
                        None
                    };
                    Some(NormalizedRoleTitle {
                        normalized_role: role.title,
                        role_id: role.role_id,
                        seniority: role.seniorities,
                        hierarchy: role.hierarchies,
                        areap_ids,
                        nivelh_ids,
                        perfil_ids,
                        match_type,
                    })
                })
                .collect();
            if !results.is_empty() {
                out.insert(title.clone(), results);
            }
        }
        out
    }
}

/// Drops non-positive ids: the catalog's own invariant is `role_id > 0` and
/// the same holds for profile/area/hierarchy ids, so a non-positive filter
/// entry can never intersect a role's taxonomy.
fn to_internal_ids(filter: &[i64]) -> Vec<u64> {
    filter.iter().filter_map(|&id| u64::try_from(id).ok()).collect()
}

fn split_by_tier(
    roles: Vec<CatalogRole>,
) -> (HashMap<String, CatalogRole>, HashMap<String, CatalogRole>) {
    let mut main_roles = HashMap::new();
    let mut similar_roles = HashMap::new();
    for role in roles {
        match role.tier {
            CatalogTier::Main => {
                main_roles.insert(role.normalized_title.clone(), role);
            }
            CatalogTier::Similar => {
                similar_roles.entry(role.normalized_title.clone()).or_insert(role);
            }
        }
    }
    // Main entries always win a collision, even if a similar entry for the
    // same normalized title was inserted first.
    similar_roles.retain(|title, _| !main_roles.contains_key(title));
    (main_roles, similar_roles)
}

fn mine_catalog_words(catalog: &[CatalogEntry], gazetteer: &GazetteerStore) -> Vec<String> {
    let mut words = HashSet::new();
    for entry in catalog {
        for word in entry.title.to_lowercase().split_whitespace() {
            words.insert(word.trim_matches(|c: char| !c.is_alphanumeric()).to_string());
        }
    }
    words.extend(gazetteer.gazetteer_words.iter().cloned());
    words.retain(|w| !w.is_empty());
    words.into_iter().collect()
}

const SPLIT_SEPARATORS: &[&str] = &["/", ",", " ou ", ";", "|"];

fn split_title(title: &str) -> Vec<String> {
    let mut pieces = vec![title.to_string()];
    for sep in SPLIT_SEPARATORS {
        pieces = pieces
            .into_iter()
            .flat_map(|piece| piece.split(sep).map(str::to_string).collect::<Vec<_>>())
            .collect();
    }
    pieces
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
