//! Builtin procedures registered in every default [`Environment`](crate::environment::Environment).
//!
//! Each procedure takes the evaluating environment's cancellation flag and its
//! already-evaluated arguments, and either produces a result Expression or
//! fails with a message naming the procedure and the violation. Arithmetic
//! folds run in real arithmetic until the first complex operand appears; from
//! that point the real accumulator is folded in once and the computation
//! continues in complex arithmetic.

use num_complex::Complex64;

use crate::atom::Atom;
use crate::error::SemanticError;
use crate::expression::Expression;
use crate::interrupt::InterruptFlag;

pub(crate) fn add(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    let mut real = 0.0;
    let mut complex = Complex64::new(0.0, 0.0);
    let mut promoted = false;

    for arg in args {
        match arg.head() {
            Atom::Number(n) if !promoted => real += *n,
            Atom::Number(n) => complex += *n,
            Atom::Complex(c) => {
                if !promoted {
                    complex += real;
                    promoted = true;
                }
                complex += *c;
            }
            _ => {
                return Err(SemanticError::new(
                    "Error in call to add, argument not a number",
                ))
            }
        }
    }

    if promoted {
        Ok(Expression::complex(complex))
    } else {
        Ok(Expression::number(real))
    }
}

pub(crate) fn mul(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    let mut real = 1.0;
    let mut complex = Complex64::new(1.0, 0.0);
    let mut promoted = false;

    for arg in args {
        match arg.head() {
            Atom::Number(n) if !promoted => real *= *n,
            Atom::Number(n) => complex *= *n,
            Atom::Complex(c) => {
                if !promoted {
                    complex *= real;
                    promoted = true;
                }
                complex *= *c;
            }
            _ => {
                return Err(SemanticError::new(
                    "Error in call to mul, argument not a number",
                ))
            }
        }
    }

    if promoted {
        Ok(Expression::complex(complex))
    } else {
        Ok(Expression::number(real))
    }
}

pub(crate) fn sub(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Number(n) => Ok(Expression::number(-n)),
            Atom::Complex(c) => Ok(Expression::complex(-*c)),
            _ => Err(SemanticError::new(
                "Error in call to negate: invalid argument.",
            )),
        },
        [lhs, rhs] => match (lhs.head(), rhs.head()) {
            (Atom::Number(a), Atom::Number(b)) => Ok(Expression::number(a - b)),
            (Atom::Complex(a), Atom::Number(b)) => Ok(Expression::complex(*a - *b)),
            (Atom::Number(a), Atom::Complex(b)) => Ok(Expression::complex(*a - *b)),
            (Atom::Complex(a), Atom::Complex(b)) => Ok(Expression::complex(*a - *b)),
            _ => Err(SemanticError::new(
                "Error in call to subtraction: invalid argument.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to subtraction or negation: invalid number of arguments.",
        )),
    }
}

pub(crate) fn div(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Number(n) => Ok(Expression::number(1.0 / n)),
            Atom::Complex(c) => Ok(Expression::complex(Complex64::new(1.0, 0.0) / *c)),
            _ => Err(SemanticError::new(
                "Error in call to division: argument not a number.",
            )),
        },
        [lhs, rhs] => match (lhs.head(), rhs.head()) {
            (Atom::Number(a), Atom::Number(b)) => Ok(Expression::number(a / b)),
            (Atom::Complex(a), Atom::Number(b)) => Ok(Expression::complex(*a / *b)),
            (Atom::Number(a), Atom::Complex(b)) => Ok(Expression::complex(*a / *b)),
            (Atom::Complex(a), Atom::Complex(b)) => Ok(Expression::complex(*a / *b)),
            _ => Err(SemanticError::new(
                "Error in call to division: argument not a number.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to division: invalid number of arguments.",
        )),
    }
}

pub(crate) fn sqrt(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Complex(c) => Ok(Expression::complex(c.sqrt())),
            Atom::Number(n) if *n < 0.0 => {
                Ok(Expression::complex(Complex64::new(*n, 0.0).sqrt()))
            }
            Atom::Number(n) => Ok(Expression::number(n.sqrt())),
            _ => Err(SemanticError::new(
                "Error in call to square root: invalid argument.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to square root: invalid number of arguments.",
        )),
    }
}

pub(crate) fn pow(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [lhs, rhs] => match (lhs.head(), rhs.head()) {
            (Atom::Number(a), Atom::Number(b)) => Ok(Expression::number(a.powf(*b))),
            (Atom::Complex(a), Atom::Number(b)) => Ok(Expression::complex(a.powf(*b))),
            (Atom::Number(a), Atom::Complex(b)) => {
                Ok(Expression::complex(Complex64::new(*a, 0.0).powc(*b)))
            }
            (Atom::Complex(a), Atom::Complex(b)) => Ok(Expression::complex(a.powc(*b))),
            _ => Err(SemanticError::new(
                "Error in call to exponential: invalid argument.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to exponential: invalid number of arguments.",
        )),
    }
}

pub(crate) fn ln(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Complex(c) => Ok(Expression::complex(c.ln())),
            Atom::Number(n) if *n > 0.0 => Ok(Expression::number(n.ln())),
            Atom::Number(n) if *n < 0.0 => {
                Ok(Expression::complex(Complex64::new(*n, 0.0).ln()))
            }
            // log of zero falls through to the zero default
            Atom::Number(_) => Ok(Expression::number(0.0)),
            _ => Err(SemanticError::new("Error in call to ln: invalid argument.")),
        },
        _ => Err(SemanticError::new(
            "Error in call to ln: invalid number of arguments.",
        )),
    }
}

pub(crate) fn sin(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Complex(c) => Ok(Expression::complex(c.sin())),
            Atom::Number(n) => Ok(Expression::number(n.sin())),
            _ => Err(SemanticError::new(
                "Error in call to sin: invalid argument.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to sin: invalid number of arguments.",
        )),
    }
}

pub(crate) fn cos(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Complex(c) => Ok(Expression::complex(c.cos())),
            Atom::Number(n) => Ok(Expression::number(n.cos())),
            _ => Err(SemanticError::new(
                "Error in call to cos: invalid argument.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to cos: invalid number of arguments.",
        )),
    }
}

pub(crate) fn tan(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Complex(c) => Ok(Expression::complex(c.tan())),
            Atom::Number(n) => Ok(Expression::number(n.tan())),
            _ => Err(SemanticError::new(
                "Error in call to tan: invalid argument.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to tan: invalid number of arguments.",
        )),
    }
}

pub(crate) fn real(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Complex(c) => Ok(Expression::number(c.re)),
            _ => Err(SemanticError::new(
                "Error in call to real: argument must be complex.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to real: invalid number of arguments.",
        )),
    }
}

pub(crate) fn imag(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Complex(c) => Ok(Expression::number(c.im)),
            _ => Err(SemanticError::new(
                "Error in call to imag: argument must be complex.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to imag: invalid number of arguments.",
        )),
    }
}

pub(crate) fn mag(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Complex(c) => Ok(Expression::number(c.norm())),
            _ => Err(SemanticError::new(
                "Error in call to mag: argument must be complex.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to mag: invalid number of arguments.",
        )),
    }
}

pub(crate) fn arg(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Complex(c) => Ok(Expression::number(c.arg())),
            _ => Err(SemanticError::new(
                "Error in call to arg: argument must be complex.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to arg: invalid number of arguments.",
        )),
    }
}

pub(crate) fn conj(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] => match only.head() {
            Atom::Complex(c) => Ok(Expression::complex(c.conj())),
            _ => Err(SemanticError::new(
                "Error in call to conj: argument must be complex.",
            )),
        },
        _ => Err(SemanticError::new(
            "Error in call to conj: invalid number of arguments.",
        )),
    }
}

pub(crate) fn list(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    Ok(Expression::list(args.to_vec()))
}

pub(crate) fn first(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] if only.is_list() => only.tail().first().cloned().ok_or_else(|| {
            SemanticError::new("Error in call to first: list cannot be empty.")
        }),
        [_] => Err(SemanticError::new(
            "Error in call to first: argument not a list.",
        )),
        _ => Err(SemanticError::new(
            "Error in call to first: invalid number of arguments.",
        )),
    }
}

pub(crate) fn rest(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] if only.is_list() => {
            if only.tail().is_empty() {
                Err(SemanticError::new(
                    "Error in call to rest: list cannot be empty.",
                ))
            } else {
                Ok(Expression::list(only.tail()[1..].to_vec()))
            }
        }
        [_] => Err(SemanticError::new(
            "Error in call to rest: argument not a list.",
        )),
        _ => Err(SemanticError::new(
            "Error in call to rest: invalid number of arguments.",
        )),
    }
}

pub(crate) fn length(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [only] if only.is_list() => Ok(Expression::number(only.tail().len() as f64)),
        [_] => Err(SemanticError::new(
            "Error in call to length: argument not a list.",
        )),
        _ => Err(SemanticError::new(
            "Error in call to length: invalid number of arguments.",
        )),
    }
}

pub(crate) fn append(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [target, item] if target.is_list() => {
            let mut items = target.tail().to_vec();
            items.push(item.clone());
            Ok(Expression::list(items))
        }
        [_, _] => Err(SemanticError::new(
            "Error in call to append: first argument is not a list.",
        )),
        _ => Err(SemanticError::new(
            "Error in call to append: invalid number of arguments.",
        )),
    }
}

pub(crate) fn join(
    _interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [lhs, rhs] if lhs.is_list() && rhs.is_list() => {
            let mut items = lhs.tail().to_vec();
            items.extend_from_slice(rhs.tail());
            Ok(Expression::list(items))
        }
        [_, _] => Err(SemanticError::new(
            "Error in call to join: argument to join is not a list.",
        )),
        _ => Err(SemanticError::new(
            "Error in call to join: invalid number of arguments.",
        )),
    }
}

pub(crate) fn range(
    interrupt: &InterruptFlag,
    args: &[Expression],
) -> Result<Expression, SemanticError> {
    match args {
        [low, high, step] => {
            let (low, high, step) = match (
                low.head().as_number(),
                high.head().as_number(),
                step.head().as_number(),
            ) {
                (Some(low), Some(high), Some(step)) => (low, high, step),
                _ => {
                    return Err(SemanticError::new(
                        "Error in call to range: arguments must be numbers.",
                    ))
                }
            };
            if low >= high {
                return Err(SemanticError::new(
                    "Error in call to range: first argument must be less than second argument.",
                ));
            }
            if step <= 0.0 {
                return Err(SemanticError::new(
                    "Error in call to range: third argument must be positive",
                ));
            }

            let mut items = Vec::new();
            let mut value = low;
            while value <= high {
                if interrupt.is_raised() {
                    return Err(SemanticError::Interrupted);
                }
                items.push(Expression::number(value));
                value += step;
            }
            Ok(Expression::list(items))
        }
        _ => Err(SemanticError::new(
            "Error in call to range: invalid number of arguments.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Expression {
        Expression::number(n)
    }

    fn cpx(re: f64, im: f64) -> Expression {
        Expression::complex(Complex64::new(re, im))
    }

    fn flag() -> InterruptFlag {
        InterruptFlag::new()
    }

    #[test]
    fn add_folds_reals() {
        let result = add(&flag(), &[num(1.0), num(2.0), num(3.0)]).unwrap();
        assert_eq!(result, num(6.0));
    }

    #[test]
    fn add_promotes_once_on_repeated_complex_arguments() {
        let result = add(&flag(), &[num(1.0), cpx(0.0, 1.0), cpx(0.0, 1.0)]).unwrap();
        assert_eq!(result, cpx(1.0, 2.0));
    }

    #[test]
    fn add_rejects_non_numbers() {
        let err = add(&flag(), &[num(1.0), Expression::string("two")]).unwrap_err();
        assert_eq!(err.to_string(), "Error in call to add, argument not a number");
    }

    #[test]
    fn mul_promotes_pending_real_product() {
        let result = mul(&flag(), &[num(2.0), num(3.0), cpx(0.0, 1.0)]).unwrap();
        assert_eq!(result, cpx(0.0, 6.0));
    }

    #[test]
    fn sub_negates_and_subtracts() {
        assert_eq!(sub(&flag(), &[num(4.0)]).unwrap(), num(-4.0));
        assert_eq!(sub(&flag(), &[num(4.0), num(1.0)]).unwrap(), num(3.0));
        assert_eq!(sub(&flag(), &[cpx(1.0, 1.0), num(1.0)]).unwrap(), cpx(0.0, 1.0));
    }

    #[test]
    fn sub_rejects_invalid_pairs() {
        let err = sub(&flag(), &[Expression::string("a"), Expression::string("b")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error in call to subtraction: invalid argument."
        );
    }

    #[test]
    fn div_takes_reciprocal_with_one_argument() {
        assert_eq!(div(&flag(), &[num(4.0)]).unwrap(), num(0.25));
        assert_eq!(div(&flag(), &[num(1.0), num(2.0)]).unwrap(), num(0.5));
    }

    #[test]
    fn sqrt_of_negative_real_is_complex() {
        assert_eq!(sqrt(&flag(), &[num(4.0)]).unwrap(), num(2.0));
        assert_eq!(sqrt(&flag(), &[num(-1.0)]).unwrap(), cpx(0.0, 1.0));
    }

    #[test]
    fn pow_promotes_on_complex_operands() {
        assert_eq!(pow(&flag(), &[num(2.0), num(3.0)]).unwrap(), num(8.0));
        let result = pow(&flag(), &[cpx(0.0, 1.0), num(2.0)]).unwrap();
        assert_eq!(result, cpx(-1.0, 0.0));
    }

    #[test]
    fn ln_handles_each_real_domain() {
        assert_eq!(ln(&flag(), &[num(1.0)]).unwrap(), num(0.0));
        let negative = ln(&flag(), &[num(-1.0)]).unwrap();
        assert_eq!(negative, cpx(0.0, std::f64::consts::PI));
        assert_eq!(ln(&flag(), &[num(0.0)]).unwrap(), num(0.0));
    }

    #[test]
    fn trig_accepts_real_and_complex() {
        assert_eq!(sin(&flag(), &[num(0.0)]).unwrap(), num(0.0));
        assert_eq!(cos(&flag(), &[num(0.0)]).unwrap(), num(1.0));
        assert_eq!(tan(&flag(), &[num(0.0)]).unwrap(), num(0.0));
        match sin(&flag(), &[cpx(0.0, 1.0)]).unwrap().head() {
            Atom::Complex(_) => {}
            other => panic!("expected complex result, found {other:?}"),
        }
    }

    #[test]
    fn complex_accessors_require_complex() {
        assert_eq!(real(&flag(), &[cpx(3.0, 4.0)]).unwrap(), num(3.0));
        assert_eq!(imag(&flag(), &[cpx(3.0, 4.0)]).unwrap(), num(4.0));
        assert_eq!(mag(&flag(), &[cpx(3.0, 4.0)]).unwrap(), num(5.0));
        assert_eq!(conj(&flag(), &[cpx(3.0, 4.0)]).unwrap(), cpx(3.0, -4.0));
        let err = real(&flag(), &[num(3.0)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error in call to real: argument must be complex."
        );
    }

    #[test]
    fn list_operations_round_trip() {
        let items = list(&flag(), &[num(1.0), num(2.0), num(3.0)]).unwrap();
        assert_eq!(first(&flag(), &[items.clone()]).unwrap(), num(1.0));
        assert_eq!(
            rest(&flag(), &[items.clone()]).unwrap(),
            Expression::list(vec![num(2.0), num(3.0)])
        );
        assert_eq!(length(&flag(), &[items.clone()]).unwrap(), num(3.0));
        assert_eq!(
            append(&flag(), &[items.clone(), num(4.0)]).unwrap(),
            Expression::list(vec![num(1.0), num(2.0), num(3.0), num(4.0)])
        );
        let joined = join(&flag(), &[items.clone(), list(&flag(), &[num(4.0)]).unwrap()]).unwrap();
        assert_eq!(
            joined,
            Expression::list(vec![num(1.0), num(2.0), num(3.0), num(4.0)])
        );
    }

    #[test]
    fn first_and_rest_report_precise_failures() {
        let empty = list(&flag(), &[]).unwrap();
        assert_eq!(
            first(&flag(), &[empty.clone()]).unwrap_err().to_string(),
            "Error in call to first: list cannot be empty."
        );
        assert_eq!(
            rest(&flag(), &[empty]).unwrap_err().to_string(),
            "Error in call to rest: list cannot be empty."
        );
        assert_eq!(
            first(&flag(), &[num(1.0)]).unwrap_err().to_string(),
            "Error in call to first: argument not a list."
        );
    }

    #[test]
    fn range_produces_inclusive_samples() {
        let result = range(&flag(), &[num(0.0), num(5.0), num(1.0)]).unwrap();
        assert_eq!(result.tail().len(), 6);
        assert_eq!(result.tail()[0], num(0.0));
        assert_eq!(result.tail()[5], num(5.0));
    }

    #[test]
    fn range_aborts_when_its_flag_is_raised() {
        let interrupt = flag();
        interrupt.raise();
        let err = range(&interrupt, &[num(0.0), num(10.0), num(1.0)]).unwrap_err();
        assert!(matches!(err, SemanticError::Interrupted));
    }

    #[test]
    fn range_validates_bounds_and_step() {
        assert_eq!(
            range(&flag(), &[num(3.0), num(-1.0), num(1.0)]).unwrap_err().to_string(),
            "Error in call to range: first argument must be less than second argument."
        );
        assert_eq!(
            range(&flag(), &[num(0.0), num(1.0), num(-1.0)]).unwrap_err().to_string(),
            "Error in call to range: third argument must be positive"
        );
        assert_eq!(
            range(&flag(), &[num(0.0), Expression::string("x"), num(1.0)])
                .unwrap_err()
                .to_string(),
            "Error in call to range: arguments must be numbers."
        );
    }
}
