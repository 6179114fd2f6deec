use super::{
    keywords::{self, KeywordMode},
    token::{Position, Token, TokenKind},
};
use crate::error::{LexError, LexErrorReason};

pub struct Scanner<'a> {
    source: &'a str,
    mode: KeywordMode,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    line_start: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, mode: KeywordMode) -> Self {
        Scanner {
            source,
            mode,
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
        }
    }

    /// Splits the whole input into tokens, terminated by an `EOF` token.
    /// Stops at the first character sequence no token pattern accepts.
    pub fn scan_tokens(mut self) -> Result<Vec<Token>, LexError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.start = self.current;
        let eof = Token::new(TokenKind::EOF, String::new(), self.position());
        self.tokens.push(eof);
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexError> {
        let c = self.advance();
        match c {
            ',' => self.add_token(TokenKind::Comma),
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '*' => self.add_token(TokenKind::Identifier),
            '=' => self.add_token(TokenKind::Equal),
            '>' => {
                let kind = if self.matches('=') {
                    TokenKind::GreaterThanEqual
                } else {
                    TokenKind::GreaterThan
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') {
                    TokenKind::LessThanEqual
                } else if self.matches('>') {
                    TokenKind::NotEqual
                } else {
                    TokenKind::LessThan
                };
                self.add_token(kind);
            }
            '\n' => self.newline(),
            c if c.is_whitespace() => (),
            '0' => self.add_token(TokenKind::Integer),
            '1'..='9' => self.number()?,
            c if c.is_ascii_alphabetic() => self.identifier(),
            _ => return Err(self.unmatched()),
        }
        Ok(())
    }

    fn number(&mut self) -> Result<(), LexError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let literal = &self.source[self.start..self.current];
        // Integer literals are converted to i64 downstream without a fallible path.
        if literal.parse::<i64>().is_err() {
            return Err(LexError {
                reason: LexErrorReason::IntegerOutOfRange,
                position: self.position(),
                unmatched: literal.to_string(),
            });
        }
        self.add_token(TokenKind::Integer);
        Ok(())
    }

    fn identifier(&mut self) {
        self.word();
        let text = &self.source[self.start..self.current];

        if keywords::is_word(text, keywords::ORDER, self.mode) && self.order_by() {
            self.add_token(TokenKind::OrderBy);
            return;
        }

        let token_type = keywords::get(text, self.mode).unwrap_or(TokenKind::Identifier);
        self.add_token(token_type);
    }

    /// Having just read `ORDER`, consumes whitespace and `BY` if they follow.
    /// Leaves the scanner untouched otherwise.
    fn order_by(&mut self) -> bool {
        let (current, line, line_start) = (self.current, self.line, self.line_start);

        let mut skipped = false;
        while self.peek().is_whitespace() {
            if self.advance() == '\n' {
                self.newline();
            }
            skipped = true;
        }
        if skipped && self.peek().is_ascii_alphabetic() {
            let word_start = self.current;
            self.word();
            if keywords::is_word(&self.source[word_start..self.current], keywords::BY, self.mode) {
                return true;
            }
        }

        self.current = current;
        self.line = line;
        self.line_start = line_start;
        false
    }

    fn word(&mut self) {
        let mut c = self.peek();
        while c.is_ascii_alphanumeric() || c == '_' {
            self.advance();
            c = self.peek();
        }
    }

    /// Collects the run of characters that cannot start any token.
    fn unmatched(&mut self) -> LexError {
        while !self.is_at_end() && !can_start_token(self.peek()) {
            self.advance();
        }
        LexError {
            reason: LexErrorReason::UnexpectedCharacters,
            position: self.position(),
            unmatched: self.source[self.start..self.current].to_string(),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        self.current += c.len_utf8();
        c
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.peek() != expected {
            return false;
        }
        self.advance();
        true
    }

    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn newline(&mut self) {
        self.line += 1;
        self.line_start = self.current;
    }

    /// Position of the token currently being scanned.
    fn position(&self) -> Position {
        Position {
            offset: self.start,
            line: self.line_of_start(),
            column: self.column_of_start(),
        }
    }

    fn line_of_start(&self) -> usize {
        if self.start >= self.line_start {
            self.line
        } else {
            // The token began before a newline it consumed (`ORDER\nBY`).
            self.line - self.source[self.start..self.line_start].matches('\n').count()
        }
    }

    fn column_of_start(&self) -> usize {
        let line_start = self.source[..self.start].rfind('\n').map_or(0, |i| i + 1);
        self.source[line_start..self.start].chars().count() + 1
    }

    fn add_token(&mut self, kind: TokenKind) {
        let text = self.source[self.start..self.current].to_string();
        let token = Token::new(kind, text, self.position());
        tracing::trace!(kind = ?token.kind, lexeme = %token.lexeme, offset = token.position.offset, "token");
        self.tokens.push(token);
    }
}

fn can_start_token(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || ",()*=<>".contains(c)
}

/// Convenience wrapper around [`Scanner`].
pub fn tokenize(text: &str, mode: KeywordMode) -> Result<Vec<Token>, LexError> {
    Scanner::new(text, mode).scan_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str, mode: KeywordMode) -> Vec<TokenKind> {
        tokenize(text, mode)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scans_full_statement() {
        use TokenKind::*;
        assert_eq!(
            kinds(
                "SELECT a, b FROM t WHERE a >= 10 ORDER BY b DESC LIMIT 5",
                KeywordMode::CaseSensitive
            ),
            vec![
                Select, Identifier, Comma, Identifier, From, Identifier, Where, Identifier,
                GreaterThanEqual, Integer, OrderBy, Identifier, Desc, Limit, Integer, EOF
            ]
        );
    }

    #[test]
    fn keyword_prefix_stays_identifier() {
        let tokens = tokenize("SELECTOR FROMAGE LIMIT2", KeywordMode::CaseSensitive).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "SELECTOR");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].lexeme, "LIMIT2");
    }

    #[test]
    fn keyword_case_follows_mode() {
        assert_eq!(
            kinds("select Min", KeywordMode::CaseInsensitive),
            vec![TokenKind::Select, TokenKind::Min, TokenKind::EOF]
        );
        assert_eq!(
            kinds("select Min", KeywordMode::CaseSensitive),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::EOF]
        );
    }

    #[test]
    fn relational_operators_prefer_longest_match() {
        use TokenKind::*;
        assert_eq!(
            kinds("<> <= < >= > =", KeywordMode::CaseSensitive),
            vec![NotEqual, LessThanEqual, LessThan, GreaterThanEqual, GreaterThan, Equal, EOF]
        );
        assert_eq!(kinds("a<>3", KeywordMode::CaseSensitive), vec![Identifier, NotEqual, Integer, EOF]);
    }

    #[test]
    fn order_by_spans_whitespace() {
        let tokens = tokenize("order\n  by x", KeywordMode::CaseInsensitive).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::OrderBy);
        assert_eq!(tokens[0].lexeme, "order\n  by");
        assert_eq!(tokens[0].position, Position { offset: 0, line: 1, column: 1 });
        assert_eq!(tokens[1].position, Position { offset: 11, line: 2, column: 6 });
    }

    #[test]
    fn order_without_by_is_identifier() {
        use TokenKind::*;
        assert_eq!(
            kinds("ORDER BYE ORDER, BY", KeywordMode::CaseSensitive),
            vec![Identifier, Identifier, Identifier, Comma, Identifier, EOF]
        );
    }

    #[test]
    fn star_is_identifier() {
        let tokens = tokenize("*", KeywordMode::CaseSensitive).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "*");
    }

    #[test]
    fn leading_zero_splits_integer() {
        let tokens = tokenize("01", KeywordMode::CaseSensitive).unwrap();
        assert_eq!(tokens[0].lexeme, "0");
        assert_eq!(tokens[1].lexeme, "1");
    }

    #[test]
    fn integer_out_of_range() {
        let err = tokenize("LIMIT 99999999999999999999", KeywordMode::CaseSensitive).unwrap_err();
        assert_eq!(err.reason, LexErrorReason::IntegerOutOfRange);
        assert_eq!(err.position.offset, 6);
        assert_eq!(err.unmatched, "99999999999999999999");
        assert_eq!(
            err.to_string(),
            "integer literal out of range '99999999999999999999' at line 1, column 7"
        );

        let tokens = tokenize("LIMIT 9223372036854775807", KeywordMode::CaseSensitive).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Integer);
    }

    #[test]
    fn skips_every_unicode_whitespace() {
        use TokenKind::*;
        assert_eq!(
            kinds("SELECT\x0Ba\x0CFROM\u{a0}t\u{2003}ORDER\x0BBY a", KeywordMode::CaseSensitive),
            vec![Select, Identifier, From, Identifier, OrderBy, Identifier, EOF]
        );

        let err = tokenize("SELECT a;\x0Bb", KeywordMode::CaseSensitive).unwrap_err();
        assert_eq!(err.unmatched, ";");
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = tokenize("SELECT a\nFROM t", KeywordMode::CaseSensitive).unwrap();
        assert_eq!(tokens[2].position, Position { offset: 9, line: 2, column: 1 });
        assert_eq!(tokens[3].position, Position { offset: 14, line: 2, column: 6 });
        assert_eq!(tokens[4].kind, TokenKind::EOF);
        assert_eq!(tokens[4].position.offset, 15);
    }

    #[test]
    fn reports_unmatched_run() {
        let err = tokenize("WHERE a = 'x'", KeywordMode::CaseSensitive).unwrap_err();
        assert_eq!(err.reason, LexErrorReason::UnexpectedCharacters);
        assert_eq!(err.unmatched, "'");
        assert_eq!(err.position.offset, 10);

        let err = tokenize("SELECT a; # FROM t", KeywordMode::CaseSensitive).unwrap_err();
        assert_eq!(err.unmatched, ";");
        assert_eq!(err.position, Position { offset: 8, line: 1, column: 9 });

        let err = tokenize("SELECT é", KeywordMode::CaseSensitive).unwrap_err();
        assert_eq!(err.unmatched, "é");
        assert_eq!(err.position.column, 8);
    }
}
