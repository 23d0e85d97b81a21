//! plotscript: a small Lisp-family scripting language with real and
//! complex arithmetic, lists, and declarative 2-D plotting.
//!
//! The pipeline is text → [`tokenize`] → [`parse`] → [`Expression`] →
//! [`eval`] against an [`Environment`], yielding a result [`Expression`]
//! or a [`SemanticError`]. [`Interpreter`] bundles the pipeline for
//! single-threaded embedding; [`Kernel`] runs it on a worker thread
//! behind [`SyncQueue`]s for concurrent front ends.

pub mod atom;
mod builtins;
pub mod environment;
pub mod error;
pub mod eval;
pub mod expression;
pub mod interrupt;
pub mod kernel;
pub mod parse;
mod plot;
pub mod queue;
pub mod token;

pub use atom::Atom;
pub use environment::Environment;
pub use error::SemanticError;
pub use eval::eval;
pub use expression::Expression;
pub use interrupt::InterruptFlag;
pub use kernel::{Interpreter, Kernel, KernelRequest};
pub use parse::{parse, parse_source, ParseError};
pub use queue::SyncQueue;
pub use token::{tokenize, Token};

/// Maximum evaluation recursion depth. The tree walk is recursive, so
/// deeply nested programs and runaway lambda recursion are cut off here
/// rather than overflowing the call stack.
pub const MAX_EVAL_DEPTH: usize = 512;
