use std::fmt;
use std::hash::{Hash, Hasher};
use unic_langid::LanguageIdentifier;

/// How a language code read from a file name or header cell is spelled.
///
/// Matching between codes is case-insensitive whatever the choice; this only
/// controls the spelling used for new files and new header cells.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LanguageCase {
    /// Flutter spelling: `en`, `pt_BR`, `zh_Hant_TW`.
    #[default]
    Canonical,
    /// Everything lower case: `pt_br`.
    Lower,
    /// Keep the spelling found first.
    Preserve,
}

/// A language code such as `en` or `pt_BR`.
///
/// Two codes are equal when they differ only in case or in the use of `-`
/// versus `_` as separator.
#[derive(Clone, Debug)]
pub struct LanguageCode {
    code: String,
    match_key: String,
}

impl LanguageCode {
    /// Parse a code from a file name suffix or a header cell.
    ///
    /// Returns `None` for blank input or anything that is not a language
    /// identifier with a two or three letter language subtag.
    pub fn parse(raw: &str, case: LanguageCase) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let langid: LanguageIdentifier = trimmed.replace('_', "-").parse().ok()?;
        // ISO 639 codes only; longer subtags are usually column labels like "notes"
        if langid.language.is_empty() || langid.language.as_str().len() > 3 {
            return None;
        }

        let code = match case {
            LanguageCase::Canonical => langid.to_string().replace('-', "_"),
            LanguageCase::Lower => trimmed.to_lowercase().replace('-', "_"),
            LanguageCase::Preserve => trimmed.to_string(),
        };

        Some(Self {
            match_key: match_key(&code),
            code,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.code
    }
}

fn match_key(code: &str) -> String {
    code.to_lowercase().replace('-', "_")
}

impl PartialEq for LanguageCode {
    fn eq(&self, other: &Self) -> bool {
        self.match_key == other.match_key
    }
}

impl Eq for LanguageCode {}

impl Hash for LanguageCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.match_key.hash(state);
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("en", "en")]
    #[case("EN", "en")]
    #[case("pt_br", "pt_BR")]
    #[case("pt-BR", "pt_BR")]
    #[case("zh_hant_tw", "zh_Hant_TW")]
    #[case("es_419", "es_419")]
    #[case(" fr ", "fr")]
    fn test_canonical_spelling(#[case] raw: &str, #[case] expected: &str) {
        let code = LanguageCode::parse(raw, LanguageCase::Canonical).unwrap();
        assert_eq!(code.as_str(), expected);
    }

    #[test]
    fn test_lower_spelling() {
        let code = LanguageCode::parse("pt-BR", LanguageCase::Lower).unwrap();
        assert_eq!(code.as_str(), "pt_br");
    }

    #[test]
    fn test_preserve_spelling() {
        let code = LanguageCode::parse("pt-BR", LanguageCase::Preserve).unwrap();
        assert_eq!(code.as_str(), "pt-BR");
    }

    #[rstest]
    #[case(LanguageCase::Canonical)]
    #[case(LanguageCase::Lower)]
    #[case(LanguageCase::Preserve)]
    fn test_matching_ignores_case_and_separator(#[case] case: LanguageCase) {
        let a = LanguageCode::parse("pt_BR", case).unwrap();
        let b = LanguageCode::parse("PT-br", case).unwrap();
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("description")]
    #[case("notes")]
    #[case("und")]
    #[case("en US")]
    #[case("1234")]
    fn test_rejects_non_languages(#[case] raw: &str) {
        assert!(LanguageCode::parse(raw, LanguageCase::Canonical).is_none());
    }

    #[test]
    fn test_first_spelling_wins_in_ordered_sets() {
        let mut set = indexmap::IndexSet::new();
        set.insert(LanguageCode::parse("EN", LanguageCase::Preserve).unwrap());
        set.insert(LanguageCode::parse("en", LanguageCase::Preserve).unwrap());

        assert_eq!(set.len(), 1);
        assert_eq!(set[0].as_str(), "EN");
    }
}
