use rolematch::catalog::CatalogTier;
use rolematch::config::EngineConfig;
use rolematch::engine::CatalogEntry;
use rolematch::{Engine, MatchKind};
use std::collections::HashSet;

fn build_engine() -> (Engine, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let catalog = vec![
        CatalogEntry {
            role_id: 1104,
            title: "Recepcionista".to_string(),
            tier: CatalogTier::Main,
            area_ids: HashSet::new(),
            hierarchy_level_ids: HashSet::new(),
            profile_ids: [6].into_iter().collect(),
        },
        CatalogEntry {
            role_id: 1105,
            title: "Secretaria".to_string(),
            tier: CatalogTier::Main,
            area_ids: HashSet::new(),
            hierarchy_level_ids: HashSet::new(),
            profile_ids: [6].into_iter().collect(),
        },
        CatalogEntry {
            role_id: 2001,
            title: "Advogado".to_string(),
            tier: CatalogTier::Main,
            area_ids: HashSet::new(),
            hierarchy_level_ids: HashSet::new(),
            profile_ids: [7].into_iter().collect(),
        },
        CatalogEntry {
            role_id: 3001,
            title: "Medico Intensivista".to_string(),
            tier: CatalogTier::Main,
            area_ids: HashSet::new(),
            hierarchy_level_ids: HashSet::new(),
            profile_ids: [6].into_iter().collect(),
        },
    ];

    let mut config = EngineConfig::default();
    config.artifact_dir = dir.path().to_path_buf();
    config.aho_corasick_matching_enabled = true;
    let engine = Engine::build(catalog, config).expect("engine builds");
    (engine, dir)
}

// Scenario #1: exact match.
#[test]
fn scenario_exact_recepcionista() {
    let (engine, _dir) = build_engine();
    let result = engine.normalize_and_match("recepcionista", &[]);
    assert_eq!(result.role.map(|r| r.role_id), Some(1104));
    assert_eq!(result.match_kind, Some(MatchKind::Exact));
}

// Scenario #2: exact match via spell correction.
#[test]
fn scenario_spell_corrected_recepicionista() {
    let (engine, _dir) = build_engine();
    let result = engine.normalize_and_match("Recepicionista", &[]);
    assert_eq!(result.role.map(|r| r.role_id), Some(1104));
    assert_eq!(result.match_kind, Some(MatchKind::Exact));
}

// Scenario #3: substring match inside a longer sentence.
#[test]
fn scenario_substring_advogado_junior() {
    let (engine, _dir) = build_engine();
    let result = engine.normalize_and_match("procuro vaga de advogado junior em empresa", &[]);
    assert_eq!(result.role.map(|r| r.role_id), Some(2001));
    assert_eq!(result.match_kind, Some(MatchKind::Substring));
}

// Scenario #4: splitter produces two entries keyed by the original input, both Exact.
#[test]
fn scenario_splitter_secretaria_recepcionista() {
    let (engine, _dir) = build_engine();
    let grouped = engine.normalize_titles(&["Secretaria/Recepcionista".to_string()], &[], true);

    let results = grouped
        .get("Secretaria/Recepcionista")
        .expect("original input retained as the grouping key");
    assert_eq!(results.len(), 2);
    let expected_match_type = MatchKind::Exact.to_string();
    assert!(results.iter().all(|r| r.match_type.as_deref() == Some(expected_match_type.as_str())));
    let role_ids: HashSet<u64> = results.iter().map(|r| r.role_id).collect();
    assert_eq!(role_ids, [1104, 1105].into_iter().collect());
}

// Scenario #5: profile filter gates an otherwise-exact hit.
#[test]
fn scenario_profile_filter_gates_exact_hit() {
    let (engine, _dir) = build_engine();

    let matched = engine.normalize_and_match("medico intensivista", &[6]);
    assert_eq!(matched.role.map(|r| r.role_id), Some(3001));
    assert_eq!(matched.match_kind, Some(MatchKind::Exact));

    let filtered_out = engine.normalize_and_match("medico intensivista", &[99]);
    assert_eq!(filtered_out.role, None);
    assert_eq!(filtered_out.match_kind, None);
}

// Scenario #6: no match for gibberish input.
#[test]
fn scenario_no_match_for_gibberish() {
    let (engine, _dir) = build_engine();
    let result = engine.normalize_and_match("asdqwerty", &[]);
    assert_eq!(result.role, None);
    assert_eq!(result.match_kind, None);
}

#[test]
fn normalize_titles_omits_inputs_with_zero_matches() {
    let (engine, _dir) = build_engine();
    let grouped = engine.normalize_titles(
        &["recepcionista".to_string(), "asdqwerty".to_string()],
        &[],
        false,
    );
    assert!(grouped.contains_key("recepcionista"));
    assert!(!grouped.contains_key("asdqwerty"));
}

#[test]
fn normalize_titles_gates_perfil_ids_and_match_type_on_request() {
    let (engine, _dir) = build_engine();

    let unfiltered = engine.normalize_titles(&["recepcionista".to_string()], &[], false);
    let result = &unfiltered.get("recepcionista").unwrap()[0];
    assert_eq!(result.role_id, 1104);
    assert_eq!(result.perfil_ids, None);
    assert_eq!(result.match_type, None);

    let filtered = engine.normalize_titles(&["recepcionista".to_string()], &[6], true);
    let result = &filtered.get("recepcionista").unwrap()[0];
    assert_eq!(result.perfil_ids, Some(vec![6]));
    assert_eq!(result.match_type, Some(MatchKind::Exact.to_string()));
}
