use thiserror::Error;

/// Error raised while evaluating an expression.
///
/// Most evaluation failures carry a pre-formatted message that is shown to
/// the user verbatim, so the payload is the full display string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("{0}")]
    Eval(String),
    #[error("Error: interpreter kernel interrupted")]
    Interrupted,
}

impl SemanticError {
    pub fn new(message: impl Into<String>) -> Self {
        SemanticError::Eval(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_errors_display_their_message() {
        let err = SemanticError::new("Error: unknown symbol");
        assert_eq!(err.to_string(), "Error: unknown symbol");
    }

    #[test]
    fn interrupt_has_a_fixed_message() {
        assert_eq!(
            SemanticError::Interrupted.to_string(),
            "Error: interpreter kernel interrupted"
        );
    }
}
