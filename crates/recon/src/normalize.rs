//! Player name canonicalization.
//!
//! Sources disagree on diacritics ("Acuña" vs "Acuna"), punctuation ("J.D." vs "JD"),
//! hyphenation and generational suffixes. `normalize` folds all of those away so the
//! matcher only compares the letters that identify a player.

use deunicode::deunicode;

/// Trailing tokens dropped from a normalized name.
const GENERATIONAL_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv"];

/// Canonicalize a raw player name for comparison. Total: empty in, empty out.
pub fn normalize(raw_name: &str) -> String {
    let ascii = deunicode(raw_name).to_lowercase();

    let cleaned: String = ascii
        .chars()
        .filter(|c| *c != '.' && *c != '\'')
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    while tokens.len() > 1 && tokens.last().is_some_and(|t| GENERATIONAL_SUFFIXES.contains(t)) {
        tokens.pop();
    }

    tokens.join(" ")
}

/// Case- and whitespace-insensitive key for team/position comparisons.
pub fn field_key(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_and_suffix() {
        assert_eq!(normalize("Ronald Acuña Jr."), "ronald acuna");
        assert_eq!(normalize("Ronald Acuna Jr."), "ronald acuna");
    }

    #[test]
    fn removes_periods_and_apostrophes() {
        assert_eq!(normalize("J.D. Martinez"), "jd martinez");
        assert_eq!(normalize("Ryan O'Hearn"), "ryan ohearn");
        assert_eq!(normalize("Ryan O\u{2019}Hearn"), "ryan ohearn");
    }

    #[test]
    fn hyphens_become_spaces() {
        assert_eq!(normalize("Isiah Kiner-Falefa"), "isiah kiner falefa");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  Shohei    Ohtani  "), "shohei ohtani");
        assert_eq!(normalize("Ohtani,\tShohei"), "ohtani shohei");
    }

    #[test]
    fn strips_only_trailing_suffix_tokens() {
        assert_eq!(normalize("Vladimir Guerrero Jr"), "vladimir guerrero");
        assert_eq!(normalize("Cal Ripken Sr."), "cal ripken");
        assert_eq!(normalize("Ken Griffey III"), "ken griffey");
        // "Iv" inside a name is a real token
        assert_eq!(normalize("Ivan Rodriguez"), "ivan rodriguez");
        // Suffix-like token not at the end survives
        assert_eq!(normalize("Jr Smith Ortiz"), "jr smith ortiz");
    }

    #[test]
    fn lone_suffix_token_is_kept() {
        assert_eq!(normalize("Jr."), "jr");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  .. - "), "");
    }

    #[test]
    fn idempotent() {
        for name in ["Ronald Acuña Jr.", "J.D. Martinez", "Isiah Kiner-Falefa", "Ken Griffey III"] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn field_key_ignores_case_and_padding() {
        assert_eq!(field_key(" atl "), "ATL");
        assert_eq!(field_key("Of"), field_key("OF"));
    }
}
