use thiserror::Error;

use crate::sql::{
    grammar::Rule,
    token::{Position, Token, TokenKind},
};

pub type Result<T> = std::result::Result<T, Error>;

/// The scanner could not produce a token at `position`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} '{unmatched}' at {position}")]
pub struct LexError {
    pub reason: LexErrorReason,
    pub position: Position,
    pub unmatched: String,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorReason {
    /// No token pattern matches these characters.
    #[error("unexpected character sequence")]
    UnexpectedCharacters,

    /// Digits that do not fit a 64-bit signed integer.
    #[error("integer literal out of range")]
    IntegerOutOfRange,
}

/// The recognizer could not continue inside `rule`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {} but found {found} at {} in {rule}", expected_list(.expected), .found.position)]
pub struct SyntaxError {
    pub expected: Vec<TokenKind>,
    pub found: Token,
    pub rule: Rule,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("lexing error: {0}")]
    Lex(#[from] LexError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

/// Raised by the one-time grammar validation pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("{rule}: {kinds:?} cannot be decided with one token of lookahead")]
    Ambiguous { rule: Rule, kinds: Vec<TokenKind> },

    #[error("{rule}: rule is referenced but not defined")]
    Undefined { rule: Rule },
}

fn expected_list(kinds: &[TokenKind]) -> String {
    match kinds {
        [] => "nothing".to_string(),
        [one] => one.to_string(),
        _ => {
            let names = kinds.iter().map(|k| k.to_string()).collect::<Vec<_>>();
            format!("one of {}", names.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_message_lists_expected_kinds() {
        let err = SyntaxError {
            expected: vec![TokenKind::Identifier, TokenKind::Min, TokenKind::Max],
            found: Token::new(
                TokenKind::From,
                "FROM".to_string(),
                Position { offset: 7, line: 1, column: 8 },
            ),
            rule: Rule::SelectClause,
        };
        assert_eq!(
            err.to_string(),
            "expected one of identifier, 'MIN', 'MAX' but found 'FROM' at line 1, column 8 in selectClause"
        );
    }

    #[test]
    fn lex_error_wraps_into_top_level_kind() {
        let err: Error = LexError {
            reason: LexErrorReason::UnexpectedCharacters,
            position: Position { offset: 4, line: 1, column: 5 },
            unmatched: "#".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Lex(_)));
        assert_eq!(
            err.to_string(),
            "lexing error: unexpected character sequence '#' at line 1, column 5"
        );
    }

    #[test]
    fn out_of_range_integer_has_its_own_message() {
        let err = LexError {
            reason: LexErrorReason::IntegerOutOfRange,
            position: Position { offset: 6, line: 1, column: 7 },
            unmatched: "9223372036854775808".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "integer literal out of range '9223372036854775808' at line 1, column 7"
        );
    }
}
