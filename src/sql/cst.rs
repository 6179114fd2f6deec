//! Concrete parse tree. Optional subrules that were skipped stay in the
//! tree as [`CstElement::Absent`].

use super::{grammar::Rule, token::Token};

#[derive(Debug, Clone, PartialEq)]
pub enum CstElement {
    Token(Token),
    Node(ParseNode),
    Absent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CstChild {
    /// Terminal kind name, subrule name, or an explicit label such as `lhs`.
    pub label: &'static str,
    pub element: CstElement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseNode {
    pub rule: Rule,
    pub children: Vec<CstChild>,
}

impl ParseNode {
    pub fn new(rule: Rule) -> Self {
        ParseNode {
            rule,
            children: Vec::new(),
        }
    }

    pub fn push_token(&mut self, token: Token) {
        self.children.push(CstChild {
            label: token.kind.name(),
            element: CstElement::Token(token),
        });
    }

    pub fn push_node(&mut self, node: ParseNode) {
        let label = node.rule.name();
        self.push_labeled(label, node);
    }

    pub fn push_labeled(&mut self, label: &'static str, node: ParseNode) {
        self.children.push(CstChild {
            label,
            element: CstElement::Node(node),
        });
    }

    /// Records an optional subrule, present or not.
    pub fn push_optional(&mut self, rule: Rule, node: Option<ParseNode>) {
        match node {
            Some(node) => self.push_node(node),
            None => self.children.push(CstChild {
                label: rule.name(),
                element: CstElement::Absent,
            }),
        }
    }

    /// All tokens stored under `label`, in source order.
    pub fn tokens<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Token> + 'a {
        self.children
            .iter()
            .filter(move |child| child.label == label)
            .filter_map(|child| match &child.element {
                CstElement::Token(token) => Some(token),
                _ => None,
            })
    }

    pub fn token(&self, label: &str) -> Option<&Token> {
        self.children.iter().find_map(|child| match &child.element {
            CstElement::Token(token) if child.label == label => Some(token),
            _ => None,
        })
    }

    /// The child node under `label`; `None` both when the label is unknown
    /// and when it marks an absent optional.
    pub fn node(&self, label: &str) -> Option<&ParseNode> {
        self.children.iter().find_map(|child| match &child.element {
            CstElement::Node(node) if child.label == label => Some(node),
            _ => None,
        })
    }

    pub fn is_absent(&self, label: &str) -> bool {
        self.children
            .iter()
            .any(|child| child.label == label && matches!(child.element, CstElement::Absent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::token::{Position, TokenKind};

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name.to_string(), Position::default())
    }

    #[test]
    fn keyed_access() {
        let mut node = ParseNode::new(Rule::SelectClause);
        node.push_token(Token::new(TokenKind::Select, "SELECT".to_string(), Position::default()));
        node.push_token(ident("a"));
        node.push_token(ident("b"));

        let names = node.tokens("Identifier").map(|t| t.lexeme.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(node.token("Select").map(|t| t.kind), Some(TokenKind::Select));
        assert!(node.token("Comma").is_none());
    }

    #[test]
    fn absent_optional_is_recorded() {
        let mut node = ParseNode::new(Rule::SelectStatement);
        node.push_optional(Rule::WhereClause, None);
        assert!(node.is_absent("whereClause"));
        assert!(node.node("whereClause").is_none());
        assert_eq!(node.children.len(), 1);
    }

    #[test]
    fn labeled_subrules() {
        let mut node = ParseNode::new(Rule::Expression);
        node.push_labeled("lhs", ParseNode::new(Rule::AtomicExpression));
        node.push_labeled("rhs", ParseNode::new(Rule::AtomicExpression));
        assert!(node.node("lhs").is_some());
        assert!(node.node("atomicExpression").is_none());
    }
}
