//! Abstract syntax tree handed to consumers of the parser.
//!
//! These are plain values: every field is filled in by the time a
//! [`SelectStatement`] is returned, and `Display` renders each node back to
//! query text that parses to an equal tree.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectStatement {
    pub select: SelectClause,
    pub from: FromClause,
    pub r#where: Option<WhereClause>,
    pub order_by: Option<OrderByClause>,
    pub limit: Option<LimitClause>,
}

/// Either a list of plain columns, or a single column wrapped in an
/// aggregate. With `aggregate` set, `columns` holds exactly that one column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectClause {
    pub columns: Vec<String>,
    pub aggregate: Option<AggregateOp>,
}

impl SelectClause {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SelectClause {
            columns: columns.into_iter().map(Into::into).collect(),
            aggregate: None,
        }
    }

    pub fn aggregate(op: AggregateOp, column: impl Into<String>) -> Self {
        SelectClause {
            columns: vec![column.into()],
            aggregate: Some(op),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregateOp {
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FromClause {
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WhereClause {
    pub condition: Expression,
}

/// A single comparison `left operator right`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expression {
    pub left: Operand,
    pub operator: RelOp,
    pub right: Operand,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    IntegerLiteral(i64),
    ColumnReference(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelOp {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "<>")]
    NotEqual,
}

impl RelOp {
    pub fn symbol(self) -> &'static str {
        match self {
            RelOp::GreaterThan => ">",
            RelOp::GreaterThanOrEqual => ">=",
            RelOp::LessThan => "<",
            RelOp::LessThanOrEqual => "<=",
            RelOp::Equal => "=",
            RelOp::NotEqual => "<>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderByClause {
    pub column: String,
    pub direction: Direction,
}

/// Sort direction for ORDER BY. Omitted in the query text means `Asc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LimitClause {
    pub count: u64,
}

/// Renders query text with upper-case keywords. Identifiers are written
/// unquoted, so the text parses back only under the keyword mode that
/// produced the AST: a column named `from` is valid case-sensitive output
/// but a keyword to the default parser.
impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.select, self.from)?;
        if let Some(condition) = &self.r#where {
            write!(f, " {condition}")?;
        }
        if let Some(order_by) = &self.order_by {
            write!(f, " {order_by}")?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " {limit}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.aggregate {
            Some(op) => write!(f, "SELECT {op}({})", self.columns.join(", ")),
            None => write!(f, "SELECT {}", self.columns.join(", ")),
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateOp::Min => f.write_str("MIN"),
            AggregateOp::Max => f.write_str("MAX"),
        }
    }
}

impl fmt::Display for FromClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FROM {}", self.table)
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WHERE {}", self.condition)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::IntegerLiteral(value) => write!(f, "{value}"),
            Operand::ColumnReference(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for OrderByClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ORDER BY {} {}", self.column, self.direction)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("ASC"),
            Direction::Desc => f.write_str("DESC"),
        }
    }
}

impl fmt::Display for LimitClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LIMIT {}", self.count)
    }
}
