//! The expression tree. Both programs and values are [`Expression`]
//! nodes: an atom head, child expressions, and an optional property map
//! used by `set-property` / `get-property` and the plot primitives.

use std::collections::BTreeMap;
use std::fmt;

use num_complex::Complex64;

use crate::atom::Atom;

/// Head symbol carried by list values. Lists render without their head,
/// so this is only visible to code, never in output.
pub(crate) const LIST_HEAD: &str = "list";

/// Head symbol carried by lambda values.
pub(crate) const LAMBDA_HEAD: &str = "lambda";

#[derive(Debug, Clone, Default)]
pub struct Expression {
    head: Atom,
    tail: Vec<Expression>,
    properties: BTreeMap<String, Expression>,
    is_list: bool,
}

impl From<Atom> for Expression {
    fn from(head: Atom) -> Self {
        Expression {
            head,
            ..Expression::default()
        }
    }
}

impl Expression {
    /// The canonical no-value result.
    pub fn none() -> Self {
        Expression::default()
    }

    pub fn number(value: f64) -> Self {
        Expression::from(Atom::Number(value))
    }

    pub fn complex(value: Complex64) -> Self {
        Expression::from(Atom::Complex(value))
    }

    pub fn symbol(name: &str) -> Self {
        Expression::from(Atom::symbol(name))
    }

    pub fn string(text: &str) -> Self {
        Expression::from(Atom::string(text))
    }

    /// A list value over the given elements.
    pub fn list(items: Vec<Expression>) -> Self {
        Expression {
            head: Atom::symbol(LIST_HEAD),
            tail: items,
            properties: BTreeMap::new(),
            is_list: true,
        }
    }

    /// A lambda value: the parameter group followed by the unevaluated
    /// body.
    pub fn lambda(params: Expression, body: Expression) -> Self {
        Expression {
            head: Atom::symbol(LAMBDA_HEAD),
            tail: vec![params, body],
            properties: BTreeMap::new(),
            is_list: false,
        }
    }

    pub fn head(&self) -> &Atom {
        &self.head
    }

    pub fn tail(&self) -> &[Expression] {
        &self.tail
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    pub fn is_tail_empty(&self) -> bool {
        self.tail.is_empty()
    }

    /// True for the canonical no-value result.
    pub fn is_none_value(&self) -> bool {
        self.head.is_none() && self.tail.is_empty()
    }

    pub fn is_lambda_value(&self) -> bool {
        matches!(&self.head, Atom::Symbol(name) if name == LAMBDA_HEAD)
    }

    pub(crate) fn push(&mut self, child: Expression) {
        self.tail.push(child);
    }

    /// Store a property, replacing any previous value for the key.
    pub fn set_property(&mut self, key: &str, value: Expression) {
        self.properties.insert(key.to_string(), value);
    }

    pub fn property(&self, key: &str) -> Option<&Expression> {
        self.properties.get(key)
    }
}

/// Equality compares head and tail recursively. The property map and the
/// list mark are presentation metadata and do not participate.
impl PartialEq for Expression {
    fn eq(&self, other: &Expression) -> bool {
        self.head == other.head
            && self.tail.len() == other.tail.len()
            && self.tail.iter().zip(&other.tail).all(|(a, b)| a == b)
    }
}

fn write_exp(
    exp: &Expression,
    f: &mut fmt::Formatter<'_>,
    under_lambda: bool,
) -> fmt::Result {
    if exp.is_none_value() {
        return write!(f, "NONE");
    }
    write!(f, "(")?;
    if exp.is_lambda_value() {
        // Lambda values print their parameter group and body separated
        // by a single space; everything beneath gets spaced too.
        if let Some(params) = exp.tail.first() {
            write_exp(params, f, true)?;
            if let Some(body) = exp.tail.get(1) {
                write!(f, " ")?;
                write_exp(body, f, true)?;
            }
        }
    } else {
        if !exp.is_list {
            write!(f, "{}", exp.head)?;
        }
        if under_lambda && !exp.is_list && !exp.tail.is_empty() {
            write!(f, " ")?;
        }
        let last = exp.tail.len().saturating_sub(1);
        for (i, child) in exp.tail.iter().enumerate() {
            write_exp(child, f, under_lambda)?;
            if (under_lambda || exp.is_list) && i != last {
                write!(f, " ")?;
            }
        }
    }
    write!(f, ")")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_exp(self, f, false)
    }
}
