//! Gazetteer store (C1): immutable rewrite tables loaded once at
//! construction time.
//!
//! Grounded on `original_source/role_normalization/api/models/
//! role_normalizer.py`'s `_load_mapping`, `_load_conjugation_mapping`,
//! `_load_plural_mapping` and `_load_locations`. Gazetteer text is shipped as
//! `include_str!` assets under `data/gazetteers/ptbr/`.

use regex::Regex;
use std::collections::{HashMap, HashSet};

const STOPWORDS_TXT: &str = include_str!("../data/gazetteers/ptbr/stopwords.txt");
const SPECIAL_CHARACTER_TERMS_TXT: &str =
    include_str!("../data/gazetteers/ptbr/mapping_special_character_terms.txt");
const THESAURUS_TXT: &str = include_str!("../data/gazetteers/ptbr/mapping_thesaurus.txt");
const GENDER_TXT: &str = include_str!("../data/gazetteers/ptbr/mapping_gender.txt");
const PLURAL_TXT: &str = include_str!("../data/gazetteers/ptbr/mapping_plural.txt");
const CONJUGATION_TXT: &str = include_str!("../data/gazetteers/ptbr/mapping_conjugation.txt");
const LOCATIONS_TXT: &str = include_str!("../data/gazetteers/ptbr/locations.txt");
const RSLP_SUFFIXES_TXT: &str = include_str!("../data/gazetteers/ptbr/rslp_suffixes.txt");

/// A single ordered rewrite rule: `pattern` built from
/// `"( |^)+(<alternation>)( |$)+"`, `replacement` is `\1<canonical>\3`.
pub struct RewriteRule {
    pub pattern: Regex,
    pub replacement: String,
}

/// Tokens exempted from plural stripping before the plural rule table runs
/// (step 12's `--` tagging trick). Fixed, not gazetteer-driven — mirrors
/// `_load_plural_mapping`'s `add_skip_mark_pattern`.
pub const FALSE_PLURAL_EXEMPTIONS: &[&str] = &[
    "empregada",
    "ingles",
    "frances",
    "leis",
    "americanas",
    "fisica",
    "fisicas",
    "educacaofisica",
    "educadorafisica",
    "instrutorafisica",
    "fabrica",
    "fabricas",
    "bebida",
    "bebidas",
    "vida",
    "vidas",
];

pub const SENIORITIES: &[&str] = &[
    "trainee", "junior", "pleno", "senior", "plena", "jr", "pl", "sr",
];

pub const HIERARCHIES: &[&str] = &[
    "lider",
    "chefe",
    "gerente",
    "supervisor",
    "coordenador",
    "supervisora",
    "coordenadora",
];

pub struct GazetteerStore {
    pub stopwords: HashSet<String>,
    pub special_character_rules: Vec<RewriteRule>,
    pub thesaurus_rules: Vec<RewriteRule>,
    pub gender_rules: Vec<RewriteRule>,
    pub plural_rules: Vec<RewriteRule>,
    pub rslp_rules: Vec<RewriteRule>,
    pub conjugation_mapping: HashMap<String, String>,
    pub sorted_locations: Vec<String>,
    /// Plain words (canonical + variants) from the thesaurus and
    /// special-character-term tables, used to seed the spell-correction
    /// dictionary alongside catalog titles.
    pub gazetteer_words: HashSet<String>,
}

impl GazetteerStore {
    /// Load all gazetteer tables. `role_titles` is the set of catalog title
    /// strings, used only to remove location tokens that also occur in role
    /// titles (mirrors `_load_locations`'s `role_words` exclusion).
    pub fn load(role_titles: &[String]) -> Self {
        let mut stopwords = load_stopwords(STOPWORDS_TXT);
        // `sem` is kept even though it appears in the raw stopword file;
        // `in`/`of`/`on` are forced in (small English-preposition leakage
        // from loanword titles like "head of sales").
        stopwords.remove("sem");
        stopwords.insert("in".to_string());
        stopwords.insert("of".to_string());
        stopwords.insert("on".to_string());

        let special_character_rules = load_mapping(SPECIAL_CHARACTER_TERMS_TXT);
        let thesaurus_rules = load_mapping(THESAURUS_TXT);
        let gender_rules = load_mapping(GENDER_TXT);
        let plural_rules = load_plural_mapping(PLURAL_TXT);
        let rslp_rules = load_plural_mapping(RSLP_SUFFIXES_TXT);
        let conjugation_mapping = load_conjugation_mapping(CONJUGATION_TXT);
        let sorted_locations = load_locations(LOCATIONS_TXT, role_titles, &stopwords);

        let mut gazetteer_words = extract_words_from_mapping(THESAURUS_TXT, &stopwords);
        gazetteer_words.extend(extract_words_from_mapping(SPECIAL_CHARACTER_TERMS_TXT, &stopwords));

        tracing::info!(
            stopwords = stopwords.len(),
            special_character_rules = special_character_rules.len(),
            thesaurus_rules = thesaurus_rules.len(),
            gender_rules = gender_rules.len(),
            plural_rules = plural_rules.len(),
            conjugation_mapping = conjugation_mapping.len(),
            locations = sorted_locations.len(),
            "gazetteer store loaded"
        );

        Self {
            stopwords,
            special_character_rules,
            thesaurus_rules,
            gender_rules,
            plural_rules,
            rslp_rules,
            conjugation_mapping,
            sorted_locations,
            gazetteer_words,
        }
    }

    pub fn is_location(&self, token: &str) -> bool {
        self.sorted_locations.binary_search(&token.to_string()).is_ok()
    }
}

fn load_stopwords(text: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        out.insert(line.to_string());
    }
    out
}

/// Load an ordered `(pattern, replacement)` mapping file: `canonical,variant,
/// variant,...`. Variants are sorted by descending word count so multi-word
/// variants match before their single-word prefixes.
fn load_mapping(text: &str) -> Vec<RewriteRule> {
    let mut rules = Vec::new();
    for line in text.lines() {
        if line.trim_start().starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<String> = line
            .to_lowercase()
            .split(',')
            .map(|t| t.trim().to_string())
            .collect();
        if tokens.len() < 2 {
            tracing::warn!(line, "malformed gazetteer line, skipping");
            continue;
        }
        let canonical = &tokens[0];
        let mut variants: Vec<String> = tokens[1..].iter().cloned().collect::<HashSet<_>>().into_iter().collect();
        variants.sort_by_key(|v| std::cmp::Reverse(v.split_whitespace().count()));

        let alternation = variants
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|");
        let pattern_src = format!(r"( |^)+({})( |$)+", alternation);
        match Regex::new(&pattern_src) {
            Ok(pattern) => rules.push(RewriteRule {
                pattern,
                replacement: format!("${{1}}{}${{3}}", canonical),
            }),
            Err(e) => tracing::warn!(line, error = %e, "failed to compile gazetteer rule, skipping"),
        }
    }
    rules
}

/// Load the plural/RSLP-style suffix table: exactly two columns,
/// `suffix,replacement`, compiled into `(\D+)(suffix)$` -> `\1replacement`.
fn load_plural_mapping(text: &str) -> Vec<RewriteRule> {
    let mut rules = Vec::new();
    for line in text.lines() {
        if line.trim_start().starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<String> = line
            .to_lowercase()
            .split(',')
            .map(|t| t.trim().to_string())
            .collect();
        if tokens.len() != 2 {
            tracing::warn!(line, "malformed plural/suffix gazetteer line, skipping");
            continue;
        }
        let pattern_src = format!(r"(\D+)({})$", regex::escape(&tokens[0]));
        match Regex::new(&pattern_src) {
            Ok(pattern) => rules.push(RewriteRule {
                pattern,
                replacement: format!("${{1}}{}", tokens[1]),
            }),
            Err(e) => tracing::warn!(line, error = %e, "failed to compile suffix rule, skipping"),
        }
    }
    rules
}

fn load_conjugation_mapping(text: &str) -> HashMap<String, String> {
    let mut mapping = HashMap::new();
    for line in text.lines() {
        if line.trim_start().starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<String> = line
            .to_lowercase()
            .split(',')
            .map(|t| t.trim().to_string())
            .collect();
        if tokens.len() < 2 {
            tracing::warn!(line, "malformed conjugation gazetteer line, skipping");
            continue;
        }
        let base = tokens[0].clone();
        for conjugated in &tokens[1..] {
            mapping.insert(conjugated.clone(), base.clone());
        }
    }
    mapping
}

fn extract_words_from_mapping(text: &str, stopwords: &HashSet<String>) -> HashSet<String> {
    let mut words = HashSet::new();
    for line in text.lines() {
        if line.trim_start().starts_with('#') || line.trim().is_empty() {
            continue;
        }
        for token in line.to_lowercase().split(',') {
            for word in token.split_whitespace() {
                words.insert(word.to_string());
            }
        }
    }
    words.retain(|w| !stopwords.contains(w));
    words
}

fn load_locations(text: &str, role_titles: &[String], stopwords: &HashSet<String>) -> Vec<String> {
    let location_words = extract_words_from_mapping(text, stopwords);

    let separators: &[char] = &[
        ':', ',', ';', '.', '-', '\u{2013}', '\t', '\\', '(', ')', '[', ']', '{', '}', '&', '#',
        '*', '+', '<', '>', '\'', '"', '/', '?', '!', '|', '^', '~', '@', '$', '%', '=', '`',
        '\u{00B4}', '\u{00A8}', '_', ' ',
    ];

    let mut role_words: HashSet<String> = HashSet::new();
    for title in role_titles {
        for word in title.to_lowercase().split(|c: char| separators.contains(&c)) {
            let word = word.trim();
            if word.len() >= 2 && !stopwords.contains(word) {
                role_words.insert(word.to_string());
            }
        }
    }

    let mut locations: Vec<String> = location_words.difference(&role_words).cloned().collect();
    locations.sort();
    locations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwords_keep_sem_forces_in_of_on() {
        let store = GazetteerStore::load(&[]);
        assert!(!store.stopwords.contains("sem"));
        assert!(store.stopwords.contains("de"));
        assert!(store.stopwords.contains("in"));
        assert!(store.stopwords.contains("of"));
        assert!(store.stopwords.contains("on"));
    }

    #[test]
    fn gender_rule_rewrites_variant_to_canonical() {
        let store = GazetteerStore::load(&[]);
        let rule = store
            .gender_rules
            .iter()
            .find(|r| r.pattern.is_match(" advogada "))
            .expect("advogada gender rule present");
        let out = rule.pattern.replace_all(" advogada ", rule.replacement.as_str());
        assert_eq!(out, " advogado ");
    }

    #[test]
    fn locations_are_sorted_for_binary_search() {
        let store = GazetteerStore::load(&[]);
        let mut sorted = store.sorted_locations.clone();
        sorted.sort();
        assert_eq!(store.sorted_locations, sorted);
    }

    #[test]
    fn locations_exclude_words_present_in_role_titles() {
        let role_titles = vec!["Santos Motorista".to_string()];
        let store = GazetteerStore::load(&role_titles);
        assert!(!store.is_location("santos"));
    }

    #[test]
    fn conjugation_mapping_maps_forms_to_base() {
        let store = GazetteerStore::load(&[]);
        assert_eq!(store.conjugation_mapping.get("advogaria"), Some(&"advogar".to_string()));
    }

    #[test]
    fn malformed_line_is_skipped_not_fatal() {
        let text = "# comment\nonlyoneword\nok,variant\n";
        let rules = load_mapping(text);
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn gazetteer_words_excludes_stopwords() {
        let store = GazetteerStore::load(&[]);
        assert!(!store.gazetteer_words.contains("de"));
        assert!(!store.gazetteer_words.is_empty());
    }
}
