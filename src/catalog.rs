//! Role catalog types (supporting C6): the canonical roles a normalized
//! title can bind to, and profile-based taxonomy filtering.
//!
//! Grounded on `original_source/role_normalization/api/models/role_matcher.py`
//! (`RoleCatalog`, `CatalogRole.filter_by_profile`) and `role_norm.py`'s
//! catalog loading, which builds the main/similar title maps and the
//! profile→taxonomy mapping once at startup.

use std::collections::HashSet;

/// Whether a role's normalized title came from the catalog's primary entry
/// or a known synonym ("similar role"). Main entries take precedence on a
/// normalized-title collision (main always wins, made an explicit ordering
/// key here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum CatalogTier {
    Main,
    Similar,
}

/// One row of the role catalog.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogRole {
    pub role_id: u64,
    /// Canonical display title: original case, accents preserved.
    pub title: String,
    /// `normalize(title, correct_typos=false)`'s text output.
    pub normalized_title: String,
    /// Seniority/hierarchy markers extracted while normalizing `title`.
    pub seniorities: Vec<String>,
    pub hierarchies: Vec<String>,
    pub tier: CatalogTier,
    pub area_ids: HashSet<u64>,
    pub hierarchy_level_ids: HashSet<u64>,
    pub profile_ids: HashSet<u64>,
}

impl CatalogRole {
    /// Returns a copy with `area_ids`, `hierarchy_level_ids`, `profile_ids`
    /// intersected with the union of those sets reachable from `filter` via
    /// `mapping`. Callers must check `profile_filter ∩ profile_ids` is
    /// non-empty before calling this (the facade never filters down to an
    /// empty role — that case returns `None` instead, one level up).
    pub fn filter_by_profile(&self, mapping: &ProfileMapping, filter: &[u64]) -> CatalogRole {
        let mut area_ids = HashSet::new();
        let mut hierarchy_level_ids = HashSet::new();
        let mut profile_ids = HashSet::new();

        for profile_id in filter {
            if let Some(taxonomy) = mapping.taxonomy_for(*profile_id) {
                area_ids.extend(taxonomy.area_ids.iter().copied());
                hierarchy_level_ids.extend(taxonomy.hierarchy_level_ids.iter().copied());
                profile_ids.extend(taxonomy.profile_ids.iter().copied());
            }
        }

        CatalogRole {
            area_ids: self.area_ids.intersection(&area_ids).copied().collect(),
            hierarchy_level_ids: self
                .hierarchy_level_ids
                .intersection(&hierarchy_level_ids)
                .copied()
                .collect(),
            profile_ids: self.profile_ids.intersection(&profile_ids).copied().collect(),
            ..self.clone()
        }
    }
}

/// A profile id's reachable taxonomy: the area/hierarchy-level/profile id
/// sets associated with it.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ProfileTaxonomy {
    pub area_ids: HashSet<u64>,
    pub hierarchy_level_ids: HashSet<u64>,
    pub profile_ids: HashSet<u64>,
}

/// Maps profile id -> its reachable taxonomy. Precomputed once from the
/// catalog so [`CatalogRole::filter_by_profile`] never has to scan roles.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ProfileMapping {
    taxonomy: std::collections::HashMap<u64, ProfileTaxonomy>,
}

impl ProfileMapping {
    pub fn from_roles(roles: &[CatalogRole]) -> Self {
        let mut taxonomy: std::collections::HashMap<u64, ProfileTaxonomy> =
            std::collections::HashMap::new();
        for role in roles {
            for profile_id in &role.profile_ids {
                let entry = taxonomy.entry(*profile_id).or_default();
                entry.area_ids.extend(role.area_ids.iter().copied());
                entry.hierarchy_level_ids.extend(role.hierarchy_level_ids.iter().copied());
                entry.profile_ids.extend(role.profile_ids.iter().copied());
            }
        }
        Self { taxonomy }
    }

    pub fn taxonomy_for(&self, profile_id: u64) -> Option<&ProfileTaxonomy> {
        self.taxonomy.get(&profile_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: u64, profile_ids: &[u64]) -> CatalogRole {
        CatalogRole {
            role_id: id,
            title: format!("Role {id}"),
            normalized_title: format!("role{id}"),
            seniorities: vec![],
            hierarchies: vec![],
            tier: CatalogTier::Main,
            area_ids: [id * 100].into_iter().collect(),
            hierarchy_level_ids: [id * 10].into_iter().collect(),
            profile_ids: profile_ids.iter().copied().collect(),
        }
    }

    #[test]
    fn main_precedes_similar() {
        assert!(CatalogTier::Main < CatalogTier::Similar);
    }

    #[test]
    fn filter_by_profile_intersects_taxonomy() {
        let roles = vec![role(1, &[10]), role(2, &[20])];
        let mapping = ProfileMapping::from_roles(&roles);
        let filtered = roles[0].filter_by_profile(&mapping, &[10]);
        assert_eq!(filtered.profile_ids, [10].into_iter().collect());
        assert_eq!(filtered.area_ids, [100].into_iter().collect());
    }

    #[test]
    fn filter_by_profile_with_unreachable_filter_empties_sets() {
        let roles = vec![role(1, &[10]), role(2, &[20])];
        let mapping = ProfileMapping::from_roles(&roles);
        let filtered = roles[0].filter_by_profile(&mapping, &[20]);
        assert!(filtered.profile_ids.is_empty());
    }
}
