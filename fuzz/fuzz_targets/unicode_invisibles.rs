#![no_main]

use libfuzzer_sys::fuzz_target;
use rolematch::fold::strip_diacritics;
use rolematch::unicode::replace_line_breaks;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    // Line breaks are fully replaced with plain spaces.
    let no_breaks = replace_line_breaks(&s);
    debug_assert!(!no_breaks.contains('\r'));
    debug_assert!(!no_breaks.contains('\n'));

    // Accent folding never reintroduces a combining mark.
    let folded = strip_diacritics(&no_breaks);
    debug_assert!(!folded.chars().any(|c| ('\u{0300}'..='\u{036F}').contains(&c)));

    // Idempotent: folding an already-folded string changes nothing.
    debug_assert_eq!(strip_diacritics(&folded), folded);
});
