//! Filter Expressions
//!
//! Builder for the remote store's boolean-formula filter language. Only the
//! operators this portal queries with are modeled: field references, string
//! literals, equality, `FIND` substring containment, `LOWER`
//! case-normalization, `ARRAYJOIN` flattening of list columns, and `AND`
//! composition. String literals are escaped once, here, so query code never
//! interpolates raw user input into a formula.

use std::fmt;

/// One node of a filter formula
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column reference, rendered `{Name}`
    Field(String),
    /// A string literal, rendered double-quoted and escaped
    Str(String),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    /// Substring containment: `FIND(needle, haystack)`
    Find(Box<Expr>, Box<Expr>),
    Lower(Box<Expr>),
    /// Flattens a list column to comma-joined text
    ArrayJoin(Box<Expr>),
    And(Vec<Expr>),
}

pub fn field(name: &str) -> Expr {
    Expr::Field(name.to_string())
}

pub fn text(value: &str) -> Expr {
    Expr::Str(value.to_string())
}

impl Expr {
    pub fn eq(self, other: Expr) -> Expr {
        Expr::Eq(Box::new(self), Box::new(other))
    }

    pub fn ne(self, other: Expr) -> Expr {
        Expr::Ne(Box::new(self), Box::new(other))
    }

    pub fn lower(self) -> Expr {
        Expr::Lower(Box::new(self))
    }

    pub fn array_join(self) -> Expr {
        Expr::ArrayJoin(Box::new(self))
    }

    pub fn find(needle: Expr, haystack: Expr) -> Expr {
        Expr::Find(Box::new(needle), Box::new(haystack))
    }

    pub fn and(terms: Vec<Expr>) -> Expr {
        Expr::And(terms)
    }

    /// Render to the store's formula text
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Field(name) => write!(f, "{{{}}}", name),
            Expr::Str(value) => write!(f, "\"{}\"", escape(value)),
            Expr::Eq(lhs, rhs) => write!(f, "{} = {}", lhs, rhs),
            Expr::Ne(lhs, rhs) => write!(f, "{} != {}", lhs, rhs),
            Expr::Find(needle, haystack) => write!(f, "FIND({}, {})", needle, haystack),
            Expr::Lower(inner) => write!(f, "LOWER({})", inner),
            Expr::ArrayJoin(inner) => write!(f, "ARRAYJOIN({}, \",\")", inner),
            Expr::And(terms) => {
                write!(f, "AND(")?;
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", term)?;
                }
                write!(f, ")")
            }
        }
    }
}
