#![no_main]

use libfuzzer_sys::fuzz_target;
use rolematch::config::NormalizeOptions;
use rolematch::gazetteer::GazetteerStore;
use rolematch::normalizer::{normalize, NormalizerContext};
use rolematch::spell::SpellIndex;
use std::collections::HashSet;
use std::sync::OnceLock;

struct Fixture {
    gazetteer: GazetteerStore,
    spell: SpellIndex,
    dictionary: HashSet<String>,
}

static FIXTURE: OnceLock<Fixture> = OnceLock::new();

fn fixture() -> &'static Fixture {
    FIXTURE.get_or_init(|| {
        let gazetteer = GazetteerStore::load(&[]);
        let spell = SpellIndex::build(std::iter::empty());
        let dictionary = gazetteer.stopwords.iter().cloned().collect();
        Fixture {
            gazetteer,
            spell,
            dictionary,
        }
    })
}

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let fixture = fixture();
    let ctx = NormalizerContext {
        gazetteer: &fixture.gazetteer,
        spell: &fixture.spell,
        dictionary: &fixture.dictionary,
    };

    // No typo correction: normalize must be idempotent (spec invariant 1).
    let options = NormalizeOptions {
        correct_typos: false,
        ..NormalizeOptions::default()
    };
    let once = normalize(&s, &options, &ctx);
    let twice = normalize(&once.text, &options, &ctx);
    debug_assert_eq!(once.text, twice.text);

    // Never panics regardless of typo correction, and always yields ASCII
    // (accent folding runs unconditionally as step 8).
    let with_typos = normalize(&s, &NormalizeOptions::default(), &ctx);
    debug_assert!(with_typos.text.chars().all(|c| c.is_ascii()));
});
