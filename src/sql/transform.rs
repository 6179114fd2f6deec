//! Concrete parse tree to AST.
//!
//! One function per grammar rule, dispatched by a `match` on [`Rule`]. The
//! input must come from [`super::parser::Parser`]; a tree of any other shape
//! is a programming error and panics.

use super::{
    ast::{
        AggregateOp, Direction, Expression, FromClause, LimitClause, Operand, OrderByClause,
        RelOp, SelectClause, SelectStatement, WhereClause,
    },
    cst::{CstElement, ParseNode},
    grammar::Rule,
    token::{Token, TokenKind},
};

/// Result of visiting one node; the variant is determined by the node's rule.
#[derive(Debug)]
enum Fragment {
    Statement(SelectStatement),
    Select(SelectClause),
    Aggregate(AggregateOp, String),
    From(FromClause),
    Where(WhereClause),
    OrderBy(OrderByClause),
    Direction(Direction),
    Limit(LimitClause),
    Expression(Expression),
    Operand(Operand),
    Operator(RelOp),
}

pub fn to_ast(node: &ParseNode) -> SelectStatement {
    match visit(node) {
        Fragment::Statement(statement) => statement,
        other => malformed(node.rule, &format!("a statement root, got {other:?}")),
    }
}

fn visit(node: &ParseNode) -> Fragment {
    match node.rule {
        Rule::SelectStatement => Fragment::Statement(select_statement(node)),
        Rule::SelectClause => Fragment::Select(select_clause(node)),
        Rule::MinMaxExpression => {
            let (op, column) = min_max_expression(node);
            Fragment::Aggregate(op, column)
        }
        Rule::FromClause => Fragment::From(from_clause(node)),
        Rule::WhereClause => Fragment::Where(where_clause(node)),
        Rule::OrderByClause => Fragment::OrderBy(order_by_clause(node)),
        Rule::OrderByExpression => Fragment::Direction(order_by_expression(node)),
        Rule::LimitClause => Fragment::Limit(limit_clause(node)),
        Rule::Expression => Fragment::Expression(expression(node)),
        Rule::AtomicExpression => Fragment::Operand(atomic_expression(node)),
        Rule::RelationalOperator => Fragment::Operator(relational_operator(node)),
    }
}

fn select_statement(node: &ParseNode) -> SelectStatement {
    SelectStatement {
        select: required(node, "selectClause", |f| match f {
            Fragment::Select(select) => Some(select),
            _ => None,
        }),
        from: required(node, "fromClause", |f| match f {
            Fragment::From(from) => Some(from),
            _ => None,
        }),
        r#where: optional(node, "whereClause", |f| match f {
            Fragment::Where(clause) => Some(clause),
            _ => None,
        }),
        order_by: optional(node, "orderByClause", |f| match f {
            Fragment::OrderBy(clause) => Some(clause),
            _ => None,
        }),
        limit: optional(node, "limitClause", |f| match f {
            Fragment::Limit(clause) => Some(clause),
            _ => None,
        }),
    }
}

fn select_clause(node: &ParseNode) -> SelectClause {
    // The branch taken by the parser decides the shape, not the token text.
    if node.node("minMaxExpression").is_some() {
        let (op, column) = required(node, "minMaxExpression", |f| match f {
            Fragment::Aggregate(op, column) => Some((op, column)),
            _ => None,
        });
        return SelectClause::aggregate(op, column);
    }

    let columns = node
        .tokens("Identifier")
        .map(|token| token.lexeme.clone())
        .collect::<Vec<_>>();
    if columns.is_empty() {
        malformed(node.rule, "at least one column");
    }
    SelectClause::columns(columns)
}

fn min_max_expression(node: &ParseNode) -> (AggregateOp, String) {
    let op = match first_token(node).kind {
        TokenKind::Min => AggregateOp::Min,
        TokenKind::Max => AggregateOp::Max,
        kind => malformed(node.rule, &format!("MIN or MAX, got {kind:?}")),
    };
    (op, identifier(node))
}

fn from_clause(node: &ParseNode) -> FromClause {
    FromClause {
        table: identifier(node),
    }
}

fn where_clause(node: &ParseNode) -> WhereClause {
    WhereClause {
        condition: required(node, "expression", |f| match f {
            Fragment::Expression(expression) => Some(expression),
            _ => None,
        }),
    }
}

fn order_by_clause(node: &ParseNode) -> OrderByClause {
    let direction = optional(node, "orderByExpression", |f| match f {
        Fragment::Direction(direction) => Some(direction),
        _ => None,
    });
    OrderByClause {
        column: identifier(node),
        direction: direction.unwrap_or(Direction::Asc),
    }
}

fn order_by_expression(node: &ParseNode) -> Direction {
    match first_token(node).kind {
        TokenKind::Asc => Direction::Asc,
        TokenKind::Desc => Direction::Desc,
        kind => malformed(node.rule, &format!("ASC or DESC, got {kind:?}")),
    }
}

fn limit_clause(node: &ParseNode) -> LimitClause {
    let token = token(node, "Integer");
    let count = token
        .lexeme
        .parse::<u64>()
        .unwrap_or_else(|_| malformed(node.rule, "an integer literal"));
    LimitClause { count }
}

fn expression(node: &ParseNode) -> Expression {
    let operand = |f: Fragment| match f {
        Fragment::Operand(operand) => Some(operand),
        _ => None,
    };
    Expression {
        left: required(node, "lhs", operand),
        operator: required(node, "relationalOperator", |f| match f {
            Fragment::Operator(op) => Some(op),
            _ => None,
        }),
        right: required(node, "rhs", operand),
    }
}

fn atomic_expression(node: &ParseNode) -> Operand {
    let token = first_token(node);
    match token.kind {
        // The scanner only emits integer tokens that fit in an i64.
        TokenKind::Integer => match token.lexeme.parse::<i64>() {
            Ok(value) => Operand::IntegerLiteral(value),
            Err(_) => malformed(node.rule, "an integer literal"),
        },
        TokenKind::Identifier => Operand::ColumnReference(token.lexeme.clone()),
        kind => malformed(node.rule, &format!("an integer or identifier, got {kind:?}")),
    }
}

fn relational_operator(node: &ParseNode) -> RelOp {
    match first_token(node).kind {
        TokenKind::GreaterThanEqual => RelOp::GreaterThanOrEqual,
        TokenKind::GreaterThan => RelOp::GreaterThan,
        TokenKind::LessThanEqual => RelOp::LessThanOrEqual,
        TokenKind::LessThan => RelOp::LessThan,
        TokenKind::Equal => RelOp::Equal,
        TokenKind::NotEqual => RelOp::NotEqual,
        kind => malformed(node.rule, &format!("a relational operator, got {kind:?}")),
    }
}

fn required<T>(node: &ParseNode, label: &str, extract: fn(Fragment) -> Option<T>) -> T {
    match optional(node, label, extract) {
        Some(value) => value,
        None => malformed(node.rule, label),
    }
}

/// Visits the child under `label`; `None` if it is an absent optional.
fn optional<T>(node: &ParseNode, label: &str, extract: fn(Fragment) -> Option<T>) -> Option<T> {
    let child = node.node(label)?;
    match extract(visit(child)) {
        Some(value) => Some(value),
        None => malformed(child.rule, "a fragment of the expected kind"),
    }
}

fn identifier(node: &ParseNode) -> String {
    token(node, "Identifier").lexeme.clone()
}

fn token<'a>(node: &'a ParseNode, label: &str) -> &'a Token {
    match node.token(label) {
        Some(token) => token,
        None => malformed(node.rule, label),
    }
}

fn first_token(node: &ParseNode) -> &Token {
    let token = node.children.iter().find_map(|child| match &child.element {
        CstElement::Token(token) => Some(token),
        _ => None,
    });
    match token {
        Some(token) => token,
        None => malformed(node.rule, "a token"),
    }
}

fn malformed(rule: Rule, missing: &str) -> ! {
    panic!("{rule} node does not match the SELECT grammar: expected {missing}")
}
