use std::{collections::HashMap, sync::LazyLock};

use super::token::TokenKind;

/// How keyword text is compared against the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordMode {
    /// Only the upper-case spelling is a keyword; `select` is an identifier.
    CaseSensitive,
    #[default]
    CaseInsensitive,
}

static KEYWORDS: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    HashMap::from([
        ("SELECT", TokenKind::Select),
        ("FROM", TokenKind::From),
        ("WHERE", TokenKind::Where),
        ("LIMIT", TokenKind::Limit),
        ("ASC", TokenKind::Asc),
        ("DESC", TokenKind::Desc),
        ("MIN", TokenKind::Min),
        ("MAX", TokenKind::Max),
    ])
});

// `ORDER BY` is one keyword spelled as two words.
pub const ORDER: &str = "ORDER";
pub const BY: &str = "BY";

pub fn get(text: &str, mode: KeywordMode) -> Option<TokenKind> {
    match mode {
        KeywordMode::CaseSensitive => KEYWORDS.get(text).copied(),
        KeywordMode::CaseInsensitive => KEYWORDS.get(text.to_ascii_uppercase().as_str()).copied(),
    }
}

/// Compares a scanned word against one half of a multi-word keyword.
pub fn is_word(text: &str, word: &str, mode: KeywordMode) -> bool {
    match mode {
        KeywordMode::CaseSensitive => text == word,
        KeywordMode::CaseInsensitive => text.eq_ignore_ascii_case(word),
    }
}

/// True if `text` on its own would never scan as a plain identifier, or
/// could start the `ORDER BY` keyword.
pub fn is_reserved(text: &str, mode: KeywordMode) -> bool {
    get(text, mode).is_some() || is_word(text, ORDER, mode) || is_word(text, BY, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_sensitive_lookup() {
        assert_eq!(get("SELECT", KeywordMode::CaseSensitive), Some(TokenKind::Select));
        assert_eq!(get("select", KeywordMode::CaseSensitive), None);
        assert_eq!(get("Max", KeywordMode::CaseSensitive), None);
    }

    #[test]
    fn case_insensitive_lookup() {
        assert_eq!(get("select", KeywordMode::CaseInsensitive), Some(TokenKind::Select));
        assert_eq!(get("Max", KeywordMode::CaseInsensitive), Some(TokenKind::Max));
        assert_eq!(get("price", KeywordMode::CaseInsensitive), None);
    }

    #[test]
    fn order_by_halves_are_reserved() {
        assert!(is_reserved("order", KeywordMode::CaseInsensitive));
        assert!(!is_reserved("order", KeywordMode::CaseSensitive));
        assert!(is_reserved("BY", KeywordMode::CaseSensitive));
    }
}
