//! Parser for a small SELECT query language.
//!
//! ```text
//! SELECT (col[, col]* | (MIN|MAX)(col)) FROM table
//!     [WHERE operand op operand] [ORDER BY col [ASC|DESC]] [LIMIT int]
//! ```
//!
//! Text goes through three stages: [`sql::scanner`] splits it into tokens,
//! [`sql::parser`] checks them against the grammar and builds a concrete
//! parse tree, and [`sql::transform`] reduces that tree to the
//! [`SelectStatement`] AST. [`parse`] runs all three.

pub mod error;
pub mod sql;

pub use error::{Error, GrammarError, LexError, LexErrorReason, Result, SyntaxError};
pub use sql::ast::{
    AggregateOp, Direction, Expression, FromClause, LimitClause, Operand, OrderByClause, RelOp,
    SelectClause, SelectStatement, WhereClause,
};
pub use sql::grammar::{Grammar, Rule};
pub use sql::keywords::KeywordMode;
pub use sql::token::{Position, Token, TokenKind};

use sql::{cst::ParseNode, parser::Parser, scanner, transform};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserConfig {
    pub keyword_mode: KeywordMode,
}

/// A reusable parser. Holds no per-call state, so one value can serve any
/// number of threads.
#[derive(Debug, Clone, Copy)]
pub struct SelectParser {
    config: ParserConfig,
    grammar: &'static Grammar,
}

impl SelectParser {
    /// Also forces the one-time grammar validation if it has not run yet.
    pub fn new(config: ParserConfig) -> Self {
        SelectParser {
            config,
            grammar: Grammar::select(),
        }
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    pub fn grammar(&self) -> &'static Grammar {
        self.grammar
    }

    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        Ok(scanner::tokenize(text, self.config.keyword_mode)?)
    }

    /// Tokenizes and recognizes `text`, returning the concrete parse tree.
    pub fn parse_tree(&self, text: &str) -> Result<ParseNode> {
        let tokens = self.tokenize(text)?;
        tracing::debug!(tokens = tokens.len(), "tokenized query");
        Ok(Parser::new(self.grammar, tokens).parse()?)
    }

    pub fn parse(&self, text: &str) -> Result<SelectStatement> {
        let tree = self.parse_tree(text).inspect_err(|err| {
            tracing::debug!(%err, "query rejected");
        })?;
        let statement = transform::to_ast(&tree);
        tracing::debug!(table = %statement.from.table, "parsed select statement");
        Ok(statement)
    }
}

impl Default for SelectParser {
    fn default() -> Self {
        SelectParser::new(ParserConfig::default())
    }
}

/// Parses `text` with case-insensitive keywords.
pub fn parse(text: &str) -> Result<SelectStatement> {
    SelectParser::default().parse(text)
}
