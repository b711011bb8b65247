//! Title normalizer (C3): the 16-step canonicalization pipeline.
//!
//! Grounded on `original_source/role_normalization/api/models/
//! role_normalizer.py`'s `RoleNormalizer.normalize`, step for step.

use crate::config::NormalizeOptions;
use crate::fold::{lower, strip_diacritics};
use crate::gazetteer::{GazetteerStore, FALSE_PLURAL_EXEMPTIONS, HIERARCHIES, SENIORITIES};
use crate::spell::SpellIndex;
use crate::unicode::{collapse_spaces, replace_line_breaks};
use std::collections::HashSet;

const SEPARATOR_CHARS: &[char] = &[':', ',', ';', '.', '-', '\u{2013}', '\t'];
const SYMBOL_CHARS: &[char] = &[
    '\\', '(', ')', '[', ']', '{', '}', '&', '#', '*', '+', '<', '>', '\'', '"', '/', '?', '!',
    '|', '^', '~', '@', '$', '%', '=', '`', '\u{00B4}', '\u{00A8}', '_',
];

const PLURAL_TAG: &str = "--";

/// The result of normalizing one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTitle {
    pub text: String,
    pub seniorities: Vec<String>,
    pub hierarchies: Vec<String>,
}

/// Everything `normalize` needs besides the title text and its options. A
/// short-lived borrow built once by the engine and handed to every call.
pub struct NormalizerContext<'a> {
    pub gazetteer: &'a GazetteerStore,
    pub spell: &'a SpellIndex,
    pub dictionary: &'a HashSet<String>,
}

/// Canonicalize `title` under `options`. Empty or whitespace-only input
/// returns the zero value; this is not an error, just an empty result.
pub fn normalize(title: &str, options: &NormalizeOptions, ctx: &NormalizerContext<'_>) -> NormalizedTitle {
    if title.trim().is_empty() {
        return NormalizedTitle {
            text: String::new(),
            seniorities: vec![],
            hierarchies: vec![],
        };
    }

    // Step 1: lower-case.
    let mut text = lower(title);

    // Step 2: line breaks -> single space.
    text = replace_line_breaks(&text);

    // Step 3: special-character-term rewrite, before symbol stripping.
    if options.normalize_special_character_terms {
        text = apply_rules(&text, &ctx.gazetteer.special_character_rules);
    }

    // Step 4: separator chars -> space, collapse, trim.
    text = text.replace(SEPARATOR_CHARS, " ");
    text = collapse_spaces(&text);

    // Step 5: strip special symbols outright.
    text.retain(|c| !SYMBOL_CHARS.contains(&c));
    text = collapse_spaces(&text);

    // Step 6: spell-correct unknown tokens.
    if options.correct_typos {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|token| {
                if ctx.dictionary.contains(token) {
                    token.to_string()
                } else {
                    ctx.spell.correct(token).unwrap_or_else(|| token.to_string())
                }
            })
            .collect();
        text = tokens.join(" ");
    }

    // Step 7: drop stopwords.
    text = text
        .split_whitespace()
        .filter(|token| !ctx.gazetteer.stopwords.contains(*token))
        .collect::<Vec<_>>()
        .join(" ");

    // Step 8: accent folding.
    text = strip_diacritics(&text);

    // Step 9: extract seniorities/hierarchies (non-destructive: tokens stay
    // in the stream for substring/embedding matching downstream).
    let seniorities: Vec<String> = text
        .split_whitespace()
        .filter(|token| SENIORITIES.contains(token))
        .map(str::to_string)
        .collect();
    let hierarchies: Vec<String> = text
        .split_whitespace()
        .filter(|token| HIERARCHIES.contains(token))
        .map(str::to_string)
        .collect();

    // Step 10: optional location removal.
    if options.remove_locations {
        text = text
            .split_whitespace()
            .filter(|token| !ctx.gazetteer.is_location(token))
            .collect::<Vec<_>>()
            .join(" ");
    }

    // Step 11: conjugation normalization.
    if options.normalize_conjugation {
        text = text
            .split_whitespace()
            .map(|token| {
                ctx.gazetteer
                    .conjugation_mapping
                    .get(token)
                    .cloned()
                    .unwrap_or_else(|| token.to_string())
            })
            .collect::<Vec<_>>()
            .join(" ");
    }

    // Step 12: plural normalization, with the false-plural exemption tag.
    if options.normalize_plural {
        text = text
            .split_whitespace()
            .map(|token| normalize_plural_token(token, &ctx.gazetteer.plural_rules))
            .collect::<Vec<_>>()
            .join(" ");
    }

    // Step 13: gender rewrites, whole-string.
    if options.normalize_gender {
        text = apply_rules(&text, &ctx.gazetteer.gender_rules);
    }

    // Step 14: thesaurus rewrites, whole-string.
    if options.normalize_thesaurus {
        text = apply_rules(&text, &ctx.gazetteer.thesaurus_rules);
    }

    // Step 15: optional stemming.
    if options.stemming {
        text = text
            .split_whitespace()
            .map(|token| normalize_plural_token(token, &ctx.gazetteer.rslp_rules))
            .collect::<Vec<_>>()
            .join(" ");
    }

    // Step 16: final whitespace normalization.
    text = collapse_spaces(&text);

    NormalizedTitle {
        text,
        seniorities,
        hierarchies,
    }
}

fn apply_rules(text: &str, rules: &[crate::gazetteer::RewriteRule]) -> String {
    let mut text = format!(" {text} ");
    for rule in rules {
        text = rule.pattern.replace_all(&text, rule.replacement.as_str()).into_owned();
    }
    collapse_spaces(&text)
}

fn normalize_plural_token(token: &str, rules: &[crate::gazetteer::RewriteRule]) -> String {
    let exempt = FALSE_PLURAL_EXEMPTIONS.contains(&token);
    let tagged = if exempt {
        format!("{token}{PLURAL_TAG}")
    } else {
        token.to_string()
    };

    let result = apply_rules(&tagged, rules);

    if exempt {
        result.trim_end_matches(PLURAL_TAG).to_string()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_owned() -> (GazetteerStore, SpellIndex, HashSet<String>) {
        let gazetteer = GazetteerStore::load(&[]);
        let spell = SpellIndex::build(std::iter::empty());
        let mut dictionary: HashSet<String> = gazetteer.stopwords.iter().cloned().collect();
        dictionary.extend(gazetteer.conjugation_mapping.keys().cloned());
        dictionary.extend(gazetteer.conjugation_mapping.values().cloned());
        dictionary.extend(gazetteer.sorted_locations.iter().cloned());
        dictionary.extend(SENIORITIES.iter().map(|s| s.to_string()));
        dictionary.extend(HIERARCHIES.iter().map(|s| s.to_string()));
        (gazetteer, spell, dictionary)
    }

    fn norm(title: &str, options: &NormalizeOptions) -> NormalizedTitle {
        let (gazetteer, spell, dictionary) = ctx_owned();
        let ctx = NormalizerContext {
            gazetteer: &gazetteer,
            spell: &spell,
            dictionary: &dictionary,
        };
        normalize(title, options, &ctx)
    }

    #[test]
    fn empty_input_returns_zero_value() {
        let result = norm("", &NormalizeOptions::default());
        assert_eq!(result.text, "");
        assert!(result.seniorities.is_empty());
        assert!(result.hierarchies.is_empty());
    }

    #[test]
    fn accent_folding_yields_ascii_only() {
        let result = norm("à", &NormalizeOptions::default());
        assert!(result.text.chars().all(|c| c.is_ascii()));
    }

    #[test]
    fn case_is_insensitive() {
        let opts = NormalizeOptions::default();
        assert_eq!(norm("ADVOGADO", &opts).text, norm("advogado", &opts).text);
    }

    #[test]
    fn whitespace_and_punctuation_are_normalized() {
        let opts = NormalizeOptions::default();
        assert_eq!(
            norm("\tadvogado,junior? ", &opts).text,
            norm("advogado junior", &opts).text
        );
    }

    #[test]
    fn gender_variants_normalize_to_the_same_form() {
        let opts = NormalizeOptions::default();
        assert_eq!(norm("advogada", &opts).text, norm("advogado", &opts).text);
    }

    #[test]
    fn plural_variants_normalize_to_the_same_form() {
        let opts = NormalizeOptions::default();
        assert_eq!(norm("advogados", &opts).text, norm("advogado", &opts).text);
    }

    #[test]
    fn conjugated_verb_normalizes_to_base_form() {
        let opts = NormalizeOptions::default();
        assert_eq!(norm("advogaria", &opts).text, norm("advogar", &opts).text);
    }

    #[test]
    fn spelling_typo_is_corrected() {
        let opts = NormalizeOptions::default();
        assert_eq!(
            norm("recepicionista", &opts).text,
            norm("recepcionista", &opts).text
        );
    }

    #[test]
    fn stopwords_are_removed() {
        let opts = NormalizeOptions::default();
        assert_eq!(
            norm("analista de banco de dados", &opts).text,
            norm("analista banco dados", &opts).text
        );
    }

    #[test]
    fn idempotent_when_typo_correction_is_disabled() {
        let opts = NormalizeOptions {
            correct_typos: false,
            ..NormalizeOptions::default()
        };
        let once = norm("Advogado Junior", &opts).text;
        let twice = norm(&once, &opts).text;
        assert_eq!(once, twice);
    }

    #[test]
    fn seniority_and_hierarchy_are_extracted_non_destructively() {
        let opts = NormalizeOptions::default();
        let result = norm("coordenador de vendas junior", &opts);
        assert!(result.seniorities.contains(&"junior".to_string()));
        assert!(result.hierarchies.contains(&"coordenador".to_string()));
        assert!(result.text.split_whitespace().any(|t| t == "junior"));
        assert!(result.text.split_whitespace().any(|t| t == "coordenador"));
    }

    #[test]
    fn false_plural_exemption_is_not_stripped() {
        let opts = NormalizeOptions::default();
        let result = norm("empregada domestica", &opts);
        assert!(result.text.split_whitespace().any(|t| t == "empregada"));
    }
}
