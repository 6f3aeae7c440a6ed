//! Text normalization shared by catalog construction and message matching.

/// Quote and apostrophe variants that are dropped entirely (Hebrew geresh and
/// gershayim included), so `ז'רמן` and `זרמן` normalize the same way.
const DROPPED_QUOTES: [char; 9] = [
    '\'', '"', '`', '\u{05F3}', '\u{05F4}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}',
];

/// Cleans free text for matching.
///
/// Lowercases, removes quote characters, turns every other non-alphanumeric
/// character into a space, collapses whitespace runs and trims. Pure and
/// idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut spaced = String::with_capacity(text.len());
    for c in text.chars() {
        if DROPPED_QUOTES.contains(&c) {
            continue;
        }
        for lower in c.to_lowercase() {
            if lower.is_alphanumeric() {
                spaced.push(lower);
            } else {
                spaced.push(' ');
            }
        }
    }

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lowercases_latin_text() {
        assert_eq!(normalize("Real MADRID"), "real madrid");
    }

    #[test]
    fn strips_hebrew_geresh_and_ascii_quotes() {
        assert_eq!(normalize("פריז סן ז'רמן"), "פריז סן זרמן");
        assert_eq!(normalize("ז׳רמן"), "זרמן");
        assert_eq!(normalize("\"ארסנל\""), "ארסנל");
    }

    #[test]
    fn collapses_punctuation_to_single_spaces() {
        assert_eq!(normalize("ארסנל?!  נגד...ליברפול"), "ארסנל נגד ליברפול");
        assert_eq!(normalize("real-madrid"), "real madrid");
    }

    #[test]
    fn trims_and_handles_empty_input() {
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" !? "), "");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "\\PC{0,40}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalized_text_has_no_edge_or_double_spaces(s in "\\PC{0,40}") {
            let n = normalize(&s);
            prop_assert!(!n.starts_with(' '));
            prop_assert!(!n.ends_with(' '));
            prop_assert!(!n.contains("  "));
        }
    }
}
