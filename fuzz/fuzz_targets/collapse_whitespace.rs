#![no_main]

use libfuzzer_sys::fuzz_target;
use rolematch::unicode::collapse_spaces;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let out = collapse_spaces(&s);

    if !out.is_empty() {
        debug_assert!(!out.starts_with(' '));
        debug_assert!(!out.ends_with(' '));
        debug_assert!(!out.contains("  "));
    }

    // Idempotence.
    debug_assert_eq!(collapse_spaces(&out), out);
});
