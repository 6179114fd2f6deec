use std::fmt;

use serde::Serialize;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize)]
pub enum TokenKind {
    // Keywords
    Select, From, Where, OrderBy, Limit, Asc, Desc, Min, Max,

    // Literals
    Identifier, Integer,

    // Punctuation
    Comma, LeftParen, RightParen,

    // Relational operators
    GreaterThanEqual, GreaterThan, LessThanEqual, LessThan, Equal, NotEqual,

    EOF
}

impl TokenKind {
    /// Name used as the child label in the concrete parse tree.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Select => "Select",
            TokenKind::From => "From",
            TokenKind::Where => "Where",
            TokenKind::OrderBy => "OrderBy",
            TokenKind::Limit => "Limit",
            TokenKind::Asc => "Asc",
            TokenKind::Desc => "Desc",
            TokenKind::Min => "Min",
            TokenKind::Max => "Max",
            TokenKind::Identifier => "Identifier",
            TokenKind::Integer => "Integer",
            TokenKind::Comma => "Comma",
            TokenKind::LeftParen => "LeftParen",
            TokenKind::RightParen => "RightParen",
            TokenKind::GreaterThanEqual => "GreaterThanEqual",
            TokenKind::GreaterThan => "GreaterThan",
            TokenKind::LessThanEqual => "LessThanEqual",
            TokenKind::LessThan => "LessThan",
            TokenKind::Equal => "Equal",
            TokenKind::NotEqual => "NotEqual",
            TokenKind::EOF => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Select => "'SELECT'",
            TokenKind::From => "'FROM'",
            TokenKind::Where => "'WHERE'",
            TokenKind::OrderBy => "'ORDER BY'",
            TokenKind::Limit => "'LIMIT'",
            TokenKind::Asc => "'ASC'",
            TokenKind::Desc => "'DESC'",
            TokenKind::Min => "'MIN'",
            TokenKind::Max => "'MAX'",
            TokenKind::Identifier => "identifier",
            TokenKind::Integer => "integer",
            TokenKind::Comma => "','",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::GreaterThanEqual => "'>='",
            TokenKind::GreaterThan => "'>'",
            TokenKind::LessThanEqual => "'<='",
            TokenKind::LessThan => "'<'",
            TokenKind::Equal => "'='",
            TokenKind::NotEqual => "'<>'",
            TokenKind::EOF => "end of input",
        };
        f.write_str(text)
    }
}

/// Location of a token in the source text. `offset` is a byte offset,
/// `line` and `column` are 1-based and count characters.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, position: Position) -> Self {
        Token {
            kind,
            lexeme,
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EOF => write!(f, "end of input"),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}
