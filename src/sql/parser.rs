use super::{
    cst::ParseNode,
    grammar::{Grammar, Production, Rule},
    token::{Position, Token, TokenKind},
};
use crate::error::SyntaxError;

type ParseResult = Result<ParseNode, SyntaxError>;

/// Recursive descent over a [`Grammar`], one token of lookahead.
pub struct Parser<'g> {
    grammar: &'g Grammar,
    tokens: Vec<Token>,
    current: usize,
    // Kinds tested at the current position, reported on failure.
    expected: Vec<TokenKind>,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EOF) {
            let position = tokens
                .last()
                .map(|t| Position {
                    offset: t.position.offset + t.lexeme.len(),
                    line: t.position.line,
                    column: t.position.column + t.lexeme.chars().count(),
                })
                .unwrap_or_default();
            tokens.push(Token::new(TokenKind::EOF, String::new(), position));
        }
        Parser {
            grammar,
            tokens,
            current: 0,
            expected: Vec::new(),
        }
    }

    pub fn parse(mut self) -> ParseResult {
        tracing::debug!(tokens = self.tokens.len(), start = %self.grammar.start, "parsing statement");
        let start = self.grammar.start;
        let statement = self.rule(start)?;
        self.consume(TokenKind::EOF, start)?;
        Ok(statement)
    }

    fn rule(&mut self, rule: Rule) -> ParseResult {
        let grammar = self.grammar;
        let Some(def) = grammar.rule(rule) else {
            panic!("grammar has no definition for {rule}; it must pass Grammar::validate");
        };
        let mut node = ParseNode::new(rule);
        self.production(rule, &def.body, &mut node)?;
        Ok(node)
    }

    fn production(
        &mut self,
        owner: Rule,
        production: &'g Production,
        node: &mut ParseNode,
    ) -> Result<(), SyntaxError> {
        match production {
            Production::Token { kind } => node.push_token(self.consume(*kind, owner)?),
            Production::Rule { rule, label } => {
                let child = self.rule(*rule)?;
                match label {
                    Some(label) => node.push_labeled(*label, child),
                    None => node.push_node(child),
                }
            }
            Production::Seq { items } => {
                for item in items {
                    self.production(owner, item, node)?;
                }
            }
            Production::Alt { alternatives } => {
                let next = self.peek().kind;
                let mut chosen = None;
                // Test every alternative so a failure lists all of them.
                for alternative in alternatives {
                    let first = self.grammar.first_of(alternative);
                    for kind in &first {
                        self.check(*kind);
                    }
                    if chosen.is_none() && first.contains(&next) {
                        chosen = Some(alternative);
                    }
                }
                match chosen {
                    Some(alternative) => self.production(owner, alternative, node)?,
                    None => return Err(self.error(owner)),
                }
            }
            Production::Optional { inner } => {
                let mut present = false;
                for kind in self.grammar.first_of(inner) {
                    present |= self.check(kind);
                }
                if present {
                    self.production(owner, inner, node)?;
                } else if let Production::Rule { rule, .. } = inner.as_ref() {
                    node.push_optional(*rule, None);
                }
            }
            Production::SeparatedList { item, separator } => {
                self.production(owner, item, node)?;
                while let Some(token) = self.matches(&[*separator]) {
                    node.push_token(token);
                    self.production(owner, item, node)?;
                }
            }
        }
        Ok(())
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        for kind in kinds {
            if self.check(*kind) {
                return Some(self.advance());
            }
        }
        None
    }

    fn check(&mut self, kind: TokenKind) -> bool {
        if !self.expected.contains(&kind) {
            self.expected.push(kind);
        }
        self.peek().kind == kind
    }

    fn consume(&mut self, kind: TokenKind, rule: Rule) -> Result<Token, SyntaxError> {
        match self.matches(&[kind]) {
            Some(token) => Ok(token),
            None => Err(self.error(rule)),
        }
    }

    fn error(&self, rule: Rule) -> SyntaxError {
        SyntaxError {
            expected: self.expected.clone(),
            found: self.peek().clone(),
            rule,
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        self.expected.clear();
        token
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EOF
    }
}
