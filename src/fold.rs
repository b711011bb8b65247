//! Case folding and diacritics stripping, used by the title normalizer.

use crate::unicode::nfd;

/// Decompose and drop combining marks, yielding an ASCII-only result where
/// the source was coverable by NFD (step 8, "accent folding").
pub fn strip_diacritics(text: &str) -> String {
    nfd(text).chars().filter(|c| !is_combining_mark(*c)).collect()
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}' | '\u{1DC0}'..='\u{1DFF}' | '\u{20D0}'..='\u{20FF}' | '\u{FE20}'..='\u{FE2F}')
}

pub fn lower(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("à"), "a");
        assert_eq!(strip_diacritics("júnior"), "junior");
        assert_eq!(strip_diacritics("médico"), "medico");
    }

    #[test]
    fn test_lower() {
        assert_eq!(lower("ADVOGADO"), "advogado");
    }
}
