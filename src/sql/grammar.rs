//! The SELECT grammar as data, with FIRST/FOLLOW sets and an LL(1) check.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::LazyLock,
};

use serde::Serialize;

use super::token::TokenKind;
use crate::error::GrammarError;

/// One variant per non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    SelectStatement,
    SelectClause,
    MinMaxExpression,
    FromClause,
    WhereClause,
    OrderByClause,
    OrderByExpression,
    LimitClause,
    Expression,
    AtomicExpression,
    RelationalOperator,
}

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Rule::SelectStatement => "selectStatement",
            Rule::SelectClause => "selectClause",
            Rule::MinMaxExpression => "minMaxExpression",
            Rule::FromClause => "fromClause",
            Rule::WhereClause => "whereClause",
            Rule::OrderByClause => "orderByClause",
            Rule::OrderByExpression => "orderByExpression",
            Rule::LimitClause => "limitClause",
            Rule::Expression => "expression",
            Rule::AtomicExpression => "atomicExpression",
            Rule::RelationalOperator => "relationalOperator",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Production {
    Token { kind: TokenKind },
    Rule {
        rule: Rule,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<&'static str>,
    },
    Seq { items: Vec<Production> },
    Alt { alternatives: Vec<Production> },
    Optional { inner: Box<Production> },
    /// One or more `item`s separated by `separator`.
    SeparatedList {
        item: Box<Production>,
        separator: TokenKind,
    },
}

fn token(kind: TokenKind) -> Production {
    Production::Token { kind }
}

fn rule(rule: Rule) -> Production {
    Production::Rule { rule, label: None }
}

fn labeled(rule: Rule, label: &'static str) -> Production {
    Production::Rule {
        rule,
        label: Some(label),
    }
}

fn seq(items: Vec<Production>) -> Production {
    Production::Seq { items }
}

fn alt(alternatives: Vec<Production>) -> Production {
    Production::Alt { alternatives }
}

fn optional(inner: Production) -> Production {
    Production::Optional {
        inner: Box::new(inner),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleDef {
    pub rule: Rule,
    pub body: Production,
}

#[derive(Debug, Clone, Serialize)]
pub struct Grammar {
    pub start: Rule,
    pub rules: Vec<RuleDef>,
    #[serde(skip)]
    first: BTreeMap<Rule, BTreeSet<TokenKind>>,
    #[serde(skip)]
    nullable: BTreeSet<Rule>,
    #[serde(skip)]
    follow: BTreeMap<Rule, BTreeSet<TokenKind>>,
}

static SELECT_GRAMMAR: LazyLock<Grammar> = LazyLock::new(|| {
    let grammar = Grammar::new(Rule::SelectStatement, select_rules());
    if let Err(err) = grammar.validate() {
        panic!("SELECT grammar failed validation: {err}");
    }
    tracing::debug!(rules = grammar.rules.len(), "SELECT grammar validated");
    grammar
});

fn select_rules() -> Vec<RuleDef> {
    use TokenKind as T;
    vec![
        RuleDef {
            rule: Rule::SelectStatement,
            body: seq(vec![
                rule(Rule::SelectClause),
                rule(Rule::FromClause),
                optional(rule(Rule::WhereClause)),
                optional(rule(Rule::OrderByClause)),
                optional(rule(Rule::LimitClause)),
            ]),
        },
        RuleDef {
            rule: Rule::SelectClause,
            body: seq(vec![
                token(T::Select),
                alt(vec![
                    Production::SeparatedList {
                        item: Box::new(token(T::Identifier)),
                        separator: T::Comma,
                    },
                    rule(Rule::MinMaxExpression),
                ]),
            ]),
        },
        RuleDef {
            rule: Rule::MinMaxExpression,
            body: seq(vec![
                alt(vec![token(T::Min), token(T::Max)]),
                token(T::LeftParen),
                token(T::Identifier),
                token(T::RightParen),
            ]),
        },
        RuleDef {
            rule: Rule::FromClause,
            body: seq(vec![token(T::From), token(T::Identifier)]),
        },
        RuleDef {
            rule: Rule::WhereClause,
            body: seq(vec![token(T::Where), rule(Rule::Expression)]),
        },
        RuleDef {
            rule: Rule::OrderByClause,
            body: seq(vec![
                token(T::OrderBy),
                token(T::Identifier),
                optional(rule(Rule::OrderByExpression)),
            ]),
        },
        RuleDef {
            rule: Rule::OrderByExpression,
            body: alt(vec![token(T::Asc), token(T::Desc)]),
        },
        RuleDef {
            rule: Rule::LimitClause,
            body: seq(vec![token(T::Limit), token(T::Integer)]),
        },
        RuleDef {
            rule: Rule::Expression,
            body: seq(vec![
                labeled(Rule::AtomicExpression, "lhs"),
                rule(Rule::RelationalOperator),
                labeled(Rule::AtomicExpression, "rhs"),
            ]),
        },
        RuleDef {
            rule: Rule::AtomicExpression,
            body: alt(vec![token(T::Integer), token(T::Identifier)]),
        },
        RuleDef {
            rule: Rule::RelationalOperator,
            body: alt(vec![
                token(T::GreaterThanEqual),
                token(T::GreaterThan),
                token(T::LessThanEqual),
                token(T::LessThan),
                token(T::Equal),
                token(T::NotEqual),
            ]),
        },
    ]
}

impl Grammar {
    /// The shared, validated SELECT grammar. Built on first use; an invalid
    /// grammar aborts at that point rather than failing individual parses.
    pub fn select() -> &'static Grammar {
        &SELECT_GRAMMAR
    }

    pub fn new(start: Rule, rules: Vec<RuleDef>) -> Self {
        let mut grammar = Grammar {
            start,
            rules,
            first: BTreeMap::new(),
            nullable: BTreeSet::new(),
            follow: BTreeMap::new(),
        };
        grammar.compute_first();
        grammar.compute_follow();
        grammar
    }

    pub fn rule(&self, rule: Rule) -> Option<&RuleDef> {
        self.rules.iter().find(|def| def.rule == rule)
    }

    /// Token kinds that can begin `rule`.
    pub fn first(&self, rule: Rule) -> BTreeSet<TokenKind> {
        self.first.get(&rule).cloned().unwrap_or_default()
    }

    /// Token kinds that can immediately follow `rule`.
    pub fn follow(&self, rule: Rule) -> BTreeSet<TokenKind> {
        self.follow.get(&rule).cloned().unwrap_or_default()
    }

    /// Checks that the grammar is LL(1): alternatives start with disjoint
    /// tokens, and optional or repeated parts never start with a token that
    /// could also follow them.
    pub fn validate(&self) -> Result<(), GrammarError> {
        for def in &self.rules {
            self.check_defined(&def.body)?;
        }
        for def in &self.rules {
            self.check_decidable(def.rule, &def.body, &self.follow(def.rule))?;
        }
        Ok(())
    }

    fn check_defined(&self, production: &Production) -> Result<(), GrammarError> {
        match production {
            Production::Token { .. } => Ok(()),
            Production::Rule { rule, .. } => match self.rule(*rule) {
                Some(_) => Ok(()),
                None => Err(GrammarError::Undefined { rule: *rule }),
            },
            Production::Seq { items } => items.iter().try_for_each(|p| self.check_defined(p)),
            Production::Alt { alternatives } => {
                alternatives.iter().try_for_each(|p| self.check_defined(p))
            }
            Production::Optional { inner } => self.check_defined(inner),
            Production::SeparatedList { item, .. } => self.check_defined(item),
        }
    }

    fn check_decidable(
        &self,
        owner: Rule,
        production: &Production,
        follow: &BTreeSet<TokenKind>,
    ) -> Result<(), GrammarError> {
        match production {
            Production::Token { .. } | Production::Rule { .. } => Ok(()),
            Production::Seq { items } => {
                let mut trailing = follow.clone();
                for item in items.iter().rev() {
                    self.check_decidable(owner, item, &trailing)?;
                    trailing = self.first_of_sequence(item, &trailing);
                }
                Ok(())
            }
            Production::Alt { alternatives } => {
                let mut seen = BTreeSet::new();
                for alternative in alternatives {
                    let first = self.first_of(alternative);
                    let overlap = first.intersection(&seen).copied().collect::<Vec<_>>();
                    if !overlap.is_empty() {
                        return Err(GrammarError::Ambiguous { rule: owner, kinds: overlap });
                    }
                    seen.extend(first);
                    self.check_decidable(owner, alternative, follow)?;
                }
                Ok(())
            }
            Production::Optional { inner } => {
                let overlap = self
                    .first_of(inner)
                    .intersection(follow)
                    .copied()
                    .collect::<Vec<_>>();
                if !overlap.is_empty() {
                    return Err(GrammarError::Ambiguous { rule: owner, kinds: overlap });
                }
                self.check_decidable(owner, inner, follow)
            }
            Production::SeparatedList { item, separator } => {
                if follow.contains(separator) {
                    return Err(GrammarError::Ambiguous {
                        rule: owner,
                        kinds: vec![*separator],
                    });
                }
                let mut inner_follow = follow.clone();
                inner_follow.insert(*separator);
                self.check_decidable(owner, item, &inner_follow)
            }
        }
    }

    fn is_nullable(&self, production: &Production) -> bool {
        match production {
            Production::Token { .. } => false,
            Production::Rule { rule, .. } => self.nullable.contains(rule),
            Production::Seq { items } => items.iter().all(|p| self.is_nullable(p)),
            Production::Alt { alternatives } => alternatives.iter().any(|p| self.is_nullable(p)),
            Production::Optional { .. } => true,
            Production::SeparatedList { item, .. } => self.is_nullable(item),
        }
    }

    /// Token kinds that can begin `production`.
    pub fn first_of(&self, production: &Production) -> BTreeSet<TokenKind> {
        match production {
            Production::Token { kind } => BTreeSet::from([*kind]),
            Production::Rule { rule, .. } => self.first(*rule),
            Production::Seq { items } => {
                let mut first = BTreeSet::new();
                for item in items {
                    first.extend(self.first_of(item));
                    if !self.is_nullable(item) {
                        break;
                    }
                }
                first
            }
            Production::Alt { alternatives } => {
                alternatives.iter().flat_map(|p| self.first_of(p)).collect()
            }
            Production::Optional { inner } => self.first_of(inner),
            Production::SeparatedList { item, .. } => self.first_of(item),
        }
    }

    /// FIRST of `production` followed by anything in `trailing`.
    fn first_of_sequence(
        &self,
        production: &Production,
        trailing: &BTreeSet<TokenKind>,
    ) -> BTreeSet<TokenKind> {
        let mut first = self.first_of(production);
        if self.is_nullable(production) {
            first.extend(trailing.iter().copied());
        }
        first
    }

    fn compute_first(&mut self) {
        loop {
            let updates = self
                .rules
                .iter()
                .map(|def| (def.rule, self.first_of(&def.body), self.is_nullable(&def.body)))
                .collect::<Vec<_>>();
            let mut changed = false;
            for (rule, first, nullable) in updates {
                let entry = self.first.entry(rule).or_default();
                for kind in first {
                    changed |= entry.insert(kind);
                }
                if nullable {
                    changed |= self.nullable.insert(rule);
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn compute_follow(&mut self) {
        self.follow.insert(self.start, BTreeSet::from([TokenKind::EOF]));
        loop {
            let mut additions = Vec::new();
            for def in &self.rules {
                let follow = self.follow(def.rule);
                self.collect_follow(&def.body, &follow, &mut additions);
            }
            let mut changed = false;
            for (rule, kinds) in additions {
                let entry = self.follow.entry(rule).or_default();
                for kind in kinds {
                    changed |= entry.insert(kind);
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn collect_follow(
        &self,
        production: &Production,
        follow: &BTreeSet<TokenKind>,
        additions: &mut Vec<(Rule, BTreeSet<TokenKind>)>,
    ) {
        match production {
            Production::Token { .. } => {}
            Production::Rule { rule, .. } => additions.push((*rule, follow.clone())),
            Production::Seq { items } => {
                let mut trailing = follow.clone();
                for item in items.iter().rev() {
                    self.collect_follow(item, &trailing, additions);
                    trailing = self.first_of_sequence(item, &trailing);
                }
            }
            Production::Alt { alternatives } => {
                for alternative in alternatives {
                    self.collect_follow(alternative, follow, additions);
                }
            }
            Production::Optional { inner } => self.collect_follow(inner, follow, additions),
            Production::SeparatedList { item, separator } => {
                let mut inner = follow.clone();
                inner.insert(*separator);
                self.collect_follow(item, &inner, additions);
            }
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Production::Token { kind } => f.write_str(kind.name()),
            Production::Rule { rule, label: None } => f.write_str(rule.name()),
            Production::Rule {
                rule,
                label: Some(label),
            } => write!(f, "{rule}:{label}"),
            Production::Seq { items } => {
                let parts = items.iter().map(|p| p.to_string()).collect::<Vec<_>>();
                f.write_str(&parts.join(" "))
            }
            Production::Alt { alternatives } => {
                let parts = alternatives.iter().map(|p| p.to_string()).collect::<Vec<_>>();
                write!(f, "( {} )", parts.join(" | "))
            }
            Production::Optional { inner } => match inner.as_ref() {
                Production::Seq { .. } => write!(f, "( {inner} )?"),
                _ => write!(f, "{inner}?"),
            },
            Production::SeparatedList { item, separator } => {
                write!(f, "{item} ( {} {item} )*", separator.name())
            }
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.rules.iter().map(|def| def.rule.name().len()).max().unwrap_or(0);
        for def in &self.rules {
            // Top-level alternatives read better without the surrounding parens.
            let body = match &def.body {
                Production::Alt { alternatives } => alternatives
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(" | "),
                body => body.to_string(),
            };
            writeln!(f, "{:<width$} := {body}", def.rule.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_grammar_is_ll1() {
        assert_eq!(Grammar::select().validate(), Ok(()));
    }

    #[test]
    fn every_rule_is_defined_once() {
        let grammar = Grammar::select();
        let mut names = grammar.rules.iter().map(|def| def.rule).collect::<Vec<_>>();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), grammar.rules.len());
        assert_eq!(names.len(), 11);
    }

    #[test]
    fn first_sets() {
        let grammar = Grammar::select();
        assert_eq!(grammar.first(Rule::SelectStatement), BTreeSet::from([TokenKind::Select]));
        assert_eq!(
            grammar.first(Rule::AtomicExpression),
            BTreeSet::from([TokenKind::Integer, TokenKind::Identifier])
        );
        assert_eq!(
            grammar.first(Rule::MinMaxExpression),
            BTreeSet::from([TokenKind::Min, TokenKind::Max])
        );
    }

    #[test]
    fn follow_of_clauses() {
        let grammar = Grammar::select();
        assert_eq!(
            grammar.follow(Rule::FromClause),
            BTreeSet::from([
                TokenKind::Where,
                TokenKind::OrderBy,
                TokenKind::Limit,
                TokenKind::EOF
            ])
        );
        assert_eq!(grammar.follow(Rule::LimitClause), BTreeSet::from([TokenKind::EOF]));
        assert_eq!(
            grammar.follow(Rule::OrderByExpression),
            BTreeSet::from([TokenKind::Limit, TokenKind::EOF])
        );
    }

    #[test]
    fn overlapping_alternatives_are_rejected() {
        let grammar = Grammar::new(
            Rule::AtomicExpression,
            vec![RuleDef {
                rule: Rule::AtomicExpression,
                body: alt(vec![token(TokenKind::Identifier), token(TokenKind::Identifier)]),
            }],
        );
        assert_eq!(
            grammar.validate(),
            Err(GrammarError::Ambiguous {
                rule: Rule::AtomicExpression,
                kinds: vec![TokenKind::Identifier],
            })
        );
    }

    #[test]
    fn optional_clashing_with_follow_is_rejected() {
        // orderByClause := ORDER BY Identifier Identifier? Identifier
        let grammar = Grammar::new(
            Rule::OrderByClause,
            vec![RuleDef {
                rule: Rule::OrderByClause,
                body: seq(vec![
                    token(TokenKind::OrderBy),
                    optional(token(TokenKind::Identifier)),
                    token(TokenKind::Identifier),
                ]),
            }],
        );
        assert!(matches!(
            grammar.validate(),
            Err(GrammarError::Ambiguous { rule: Rule::OrderByClause, .. })
        ));
    }

    #[test]
    fn undefined_rule_is_rejected() {
        let grammar = Grammar::new(
            Rule::WhereClause,
            vec![RuleDef {
                rule: Rule::WhereClause,
                body: seq(vec![token(TokenKind::Where), rule(Rule::Expression)]),
            }],
        );
        assert_eq!(
            grammar.validate(),
            Err(GrammarError::Undefined { rule: Rule::Expression })
        );
    }

    #[test]
    fn renders_as_ebnf() {
        let text = Grammar::select().to_string();
        assert!(text.contains(
            "selectStatement    := selectClause fromClause whereClause? orderByClause? limitClause?"
        ));
        assert!(text.contains(
            "selectClause       := Select ( Identifier ( Comma Identifier )* | minMaxExpression )"
        ));
        assert!(text.contains(
            "expression         := atomicExpression:lhs relationalOperator atomicExpression:rhs"
        ));
        assert!(text.contains("orderByExpression  := Asc | Desc"));
    }

    #[test]
    fn serializes_for_diagram_export() {
        let json = serde_json::to_value(Grammar::select()).unwrap();
        assert_eq!(json["start"], "selectStatement");
        assert_eq!(json["rules"][0]["rule"], "selectStatement");
        assert_eq!(json["rules"][0]["body"]["type"], "seq");
        assert_eq!(json["rules"][0]["body"]["items"][2]["type"], "optional");
    }
}
