//! The leaf value type. Every expression node carries an [`Atom`] at its
//! head: nothing, a real or complex scalar, a symbol, or a string literal.

use std::fmt;

use num_complex::Complex64;

/// A single scalar value.
#[derive(Debug, Clone)]
pub enum Atom {
    /// The absence of a value. Unbound lookups and empty programs
    /// evaluate to this.
    None,
    Number(f64),
    Complex(Complex64),
    Symbol(String),
    String(String),
}

impl Default for Atom {
    fn default() -> Self {
        Atom::None
    }
}

impl Atom {
    /// Classify a raw literal token. The whole text must parse as a float
    /// to become a number; otherwise it is a symbol, unless it starts
    /// with a digit, which is not a valid atom at all.
    pub fn from_token(text: &str) -> Option<Atom> {
        if let Ok(value) = text.parse::<f64>() {
            return Some(Atom::Number(value));
        }
        match text.chars().next() {
            None => None,
            Some(first) if first.is_ascii_digit() => None,
            Some(_) => Some(Atom::Symbol(text.to_string())),
        }
    }

    /// Classify a literal that appeared between quote delimiters. No
    /// numeric reading is attempted, but the leading-digit restriction
    /// still applies.
    pub fn from_quoted(text: &str) -> Option<Atom> {
        match text.chars().next() {
            None => None,
            Some(first) if first.is_ascii_digit() => None,
            Some(_) => Some(Atom::String(text.to_string())),
        }
    }

    pub fn symbol(name: &str) -> Atom {
        Atom::Symbol(name.to_string())
    }

    pub fn string(text: &str) -> Atom {
        Atom::String(text.to_string())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Atom::None)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Atom::Number(_))
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Atom::Complex(_))
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Atom::Symbol(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Atom::String(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Atom::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Atom::Complex(z) => Some(*z),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Atom::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Atom::String(text) => Some(text),
            _ => None,
        }
    }
}

/// Absolute-epsilon comparison. A NaN on either side compares unequal,
/// as do two infinities of the same sign (their difference is NaN).
fn close(a: f64, b: f64) -> bool {
    let diff = (a - b).abs();
    !diff.is_nan() && diff <= f64::EPSILON
}

impl PartialEq for Atom {
    fn eq(&self, other: &Atom) -> bool {
        match (self, other) {
            (Atom::None, Atom::None) => true,
            (Atom::Number(a), Atom::Number(b)) => close(*a, *b),
            (Atom::Complex(a), Atom::Complex(b)) => {
                close(a.re, b.re) && close(a.im, b.im)
            }
            (Atom::Symbol(a), Atom::Symbol(b)) => a == b,
            (Atom::String(a), Atom::String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::None => write!(f, "NONE"),
            Atom::Number(n) => write!(f, "{n}"),
            Atom::Complex(z) => write!(f, "{},{}", z.re, z.im),
            Atom::Symbol(name) => write!(f, "{name}"),
            Atom::String(text) => write!(f, "\"{text}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_numbers() {
        for text in ["1", "6.02", "-12", "1e-4", "+4", ".5"] {
            match Atom::from_token(text) {
                Some(Atom::Number(_)) => {}
                other => panic!("expected number for {text:?}, found {other:?}"),
            }
        }
    }

    #[test]
    fn classifies_symbols() {
        for text in ["hello", "+", "define", "abc123"] {
            match Atom::from_token(text) {
                Some(Atom::Symbol(name)) => assert_eq!(name, text),
                other => panic!("expected symbol for {text:?}, found {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_leading_digit_nonsense() {
        assert_eq!(Atom::from_token("1abc"), None);
        assert_eq!(Atom::from_token("2def0"), None);
        assert_eq!(Atom::from_token(""), None);
    }

    #[test]
    fn quoted_literals_never_become_numbers() {
        match Atom::from_quoted("hello world") {
            Some(Atom::String(text)) => assert_eq!(text, "hello world"),
            other => panic!("expected string, found {other:?}"),
        }
        // Leading digits are invalid even inside quotes.
        assert_eq!(Atom::from_quoted("3"), None);
        assert_eq!(Atom::from_quoted("3abc"), None);
    }

    #[test]
    fn number_equality_uses_epsilon() {
        assert_eq!(Atom::Number(1.0), Atom::Number(1.0));
        assert_eq!(
            Atom::Number(1.0),
            Atom::Number(1.0 + f64::EPSILON / 2.0)
        );
        assert_ne!(Atom::Number(1.0), Atom::Number(1.0001));
    }

    #[test]
    fn nan_is_never_equal() {
        assert_ne!(Atom::Number(f64::NAN), Atom::Number(f64::NAN));
        assert_ne!(Atom::Number(f64::NAN), Atom::Number(1.0));
    }

    #[test]
    fn complex_equality_is_componentwise() {
        let i = Atom::Complex(Complex64::new(0.0, 1.0));
        assert_eq!(i, Atom::Complex(Complex64::new(0.0, 1.0)));
        assert_ne!(i, Atom::Complex(Complex64::new(1.0, 1.0)));
        assert_ne!(i, Atom::Number(1.0));
    }

    #[test]
    fn strings_and_symbols_are_distinct() {
        assert_ne!(Atom::symbol("foo"), Atom::string("foo"));
        assert_eq!(Atom::string("foo"), Atom::string("foo"));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Atom::None.to_string(), "NONE");
        assert_eq!(Atom::Number(1.0).to_string(), "1");
        assert_eq!(Atom::Number(0.5).to_string(), "0.5");
        assert_eq!(Atom::Number(-0.0).to_string(), "-0");
        assert_eq!(
            Atom::Complex(Complex64::new(-0.0, -1.0)).to_string(),
            "-0,-1"
        );
        assert_eq!(Atom::symbol("pi").to_string(), "pi");
        assert_eq!(Atom::string("foo").to_string(), "\"foo\"");
    }
}
