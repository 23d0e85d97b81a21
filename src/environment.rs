//! Flat symbol table mapping names to either value Expressions or builtin
//! procedures.
//!
//! There is no scope chain: closure semantics are implemented by cloning the
//! whole Environment at call time, so `Clone` here is the closure mechanism.

use std::collections::HashMap;

use num_complex::Complex64;

use crate::atom::Atom;
use crate::builtins;
use crate::error::SemanticError;
use crate::expression::Expression;
use crate::interrupt::InterruptFlag;
use crate::plot;

/// Signature shared by every builtin procedure: the cancellation flag of
/// the evaluating environment, then the already-evaluated arguments.
pub type Procedure =
    fn(&InterruptFlag, &[Expression]) -> Result<Expression, SemanticError>;

fn default_procedure(
    _interrupt: &InterruptFlag,
    _args: &[Expression],
) -> Result<Expression, SemanticError> {
    Ok(Expression::none())
}

#[derive(Clone)]
enum Entry {
    Exp(Expression),
    Proc(Procedure),
}

const BUILTIN_PROCEDURES: &[(&str, Procedure)] = &[
    ("+", builtins::add),
    ("-", builtins::sub),
    ("*", builtins::mul),
    ("/", builtins::div),
    ("sqrt", builtins::sqrt),
    ("^", builtins::pow),
    ("ln", builtins::ln),
    ("sin", builtins::sin),
    ("cos", builtins::cos),
    ("tan", builtins::tan),
    ("real", builtins::real),
    ("imag", builtins::imag),
    ("mag", builtins::mag),
    ("arg", builtins::arg),
    ("conj", builtins::conj),
    ("list", builtins::list),
    ("first", builtins::first),
    ("rest", builtins::rest),
    ("length", builtins::length),
    ("append", builtins::append),
    ("join", builtins::join),
    ("range", builtins::range),
    ("discrete-plot", plot::discrete_plot),
];

#[derive(Clone)]
pub struct Environment {
    entries: HashMap<String, Entry>,
    interrupt: InterruptFlag,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// A fresh environment holding the default constants and builtins,
    /// with its own cancellation flag.
    pub fn new() -> Self {
        Environment::with_interrupt(InterruptFlag::new())
    }

    /// A fresh environment polling the given cancellation flag. Cloning
    /// the environment shares the flag, so closure snapshots stay
    /// cancellable through the same handle.
    pub fn with_interrupt(interrupt: InterruptFlag) -> Self {
        let mut env = Environment {
            entries: HashMap::new(),
            interrupt,
        };
        env.reset();
        env
    }

    pub fn interrupt(&self) -> &InterruptFlag {
        &self.interrupt
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_exp(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(Entry::Exp(_)))
    }

    /// The expression bound to `name`, or the `None` expression when absent
    /// or bound to a procedure.
    pub fn get_exp(&self, name: &str) -> Expression {
        match self.entries.get(name) {
            Some(Entry::Exp(exp)) => exp.clone(),
            _ => Expression::none(),
        }
    }

    /// Bind `exp` to a symbol. Overwriting an existing binding is permitted;
    /// the later addition wins.
    pub fn add_exp(&mut self, sym: &Atom, exp: Expression) -> Result<(), SemanticError> {
        match sym.as_symbol() {
            Some(name) => {
                self.entries.insert(name.to_string(), Entry::Exp(exp));
                Ok(())
            }
            None => Err(SemanticError::new(
                "Attempt to add non-symbol to environment",
            )),
        }
    }

    pub fn is_proc(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(Entry::Proc(_)))
    }

    /// The procedure bound to `name`, or a default procedure returning the
    /// `None` expression when absent.
    pub fn get_proc(&self, name: &str) -> Procedure {
        match self.entries.get(name) {
            Some(Entry::Proc(proc)) => *proc,
            _ => default_procedure,
        }
    }

    /// Drop every binding and restore the default state.
    pub fn reset(&mut self) {
        self.entries.clear();

        self.entries.insert(
            "pi".to_string(),
            Entry::Exp(Expression::number(std::f64::consts::PI)),
        );
        self.entries.insert(
            "e".to_string(),
            Entry::Exp(Expression::number(std::f64::consts::E)),
        );
        self.entries.insert(
            "I".to_string(),
            Entry::Exp(Expression::complex(Complex64::i())),
        );

        for (name, proc) in BUILTIN_PROCEDURES {
            self.entries.insert(name.to_string(), Entry::Proc(*proc));
        }
    }
}
