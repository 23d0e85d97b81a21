//! The tree-walking evaluator. Dispatches on the head of each node:
//! special forms first, then lambda calls, then generic procedure
//! application over already-evaluated arguments.
//!
//! Closures use environment snapshots, not a lexical parent chain: calling
//! a lambda deep-copies the caller's entire environment, binds the formal
//! parameters in the copy, and evaluates the body there. Bindings made
//! inside the call never escape. This is observable language behavior and
//! must not be "fixed" into chained scopes.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::atom::Atom;
use crate::environment::Environment;
use crate::error::SemanticError;
use crate::expression::Expression;
use crate::plot;
use crate::MAX_EVAL_DEPTH;

/// Head symbols handled by dedicated logic rather than procedure dispatch.
/// `define` refuses to bind any of these.
static SPECIAL_FORMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "begin",
        "define",
        "lambda",
        "apply",
        "map",
        "set-property",
        "get-property",
        "continuous-plot",
    ]
    .into_iter()
    .collect()
});

/// Evaluate an expression against an environment.
pub fn eval(exp: &Expression, env: &mut Environment) -> Result<Expression, SemanticError> {
    eval_at(exp, env, 0)
}

fn eval_at(
    exp: &Expression,
    env: &mut Environment,
    depth: usize,
) -> Result<Expression, SemanticError> {
    if depth >= MAX_EVAL_DEPTH {
        return Err(SemanticError::new(
            "Error during evaluation: maximum recursion depth exceeded",
        ));
    }

    // List values are already evaluated; nothing inside them re-enters
    // the evaluator.
    if exp.is_list() {
        return Ok(exp.clone());
    }

    if exp.is_tail_empty() {
        // A bare `list` is a zero-argument call, not a symbol lookup.
        if exp.head().as_symbol() == Some("list") {
            let proc = env.get_proc("list");
            return proc(env.interrupt(), &[]);
        }
        return lookup(exp.head(), env);
    }

    match exp.head().as_symbol() {
        Some("begin") => handle_begin(exp, env, depth),
        Some("define") => handle_define(exp, env, depth),
        Some("lambda") => handle_lambda(exp),
        Some("apply") => handle_apply_map(exp, env, depth, false),
        Some("map") => handle_apply_map(exp, env, depth, true),
        Some("set-property") => handle_set_property(exp, env, depth),
        Some("get-property") => handle_get_property(exp, env, depth),
        Some("continuous-plot") => handle_continuous_plot(exp, env, depth),
        Some(name) if is_lambda_binding(env, name) => {
            let mut args = Vec::with_capacity(exp.tail().len());
            for child in exp.tail() {
                args.push(eval_at(child, env, depth + 1)?);
            }
            let lambda = env.get_exp(name);
            call_lambda(&lambda, &args, env, depth)
        }
        _ => {
            let mut args = Vec::with_capacity(exp.tail().len());
            for child in exp.tail() {
                args.push(eval_at(child, env, depth + 1)?);
            }
            apply_procedure(exp.head(), &args, env)
        }
    }
}

/// Terminal-node evaluation: strings, numbers and complex values are
/// self-evaluating; symbols resolve through the environment.
fn lookup(head: &Atom, env: &Environment) -> Result<Expression, SemanticError> {
    match head {
        Atom::String(_) | Atom::Number(_) | Atom::Complex(_) => {
            Ok(Expression::from(head.clone()))
        }
        Atom::Symbol(name) => {
            if env.is_exp(name) {
                Ok(env.get_exp(name))
            } else {
                Err(SemanticError::new(
                    "Error during evaluation: unknown symbol",
                ))
            }
        }
        Atom::None => Err(SemanticError::new(
            "Error during evaluation: Invalid type in terminal expression",
        )),
    }
}

fn apply_procedure(
    op: &Atom,
    args: &[Expression],
    env: &Environment,
) -> Result<Expression, SemanticError> {
    let name = op.as_symbol().ok_or_else(|| {
        SemanticError::new("Error during evaluation: procedure name not symbol")
    })?;
    if !env.is_proc(name) {
        return Err(SemanticError::new(
            "Error during evaluation: symbol does not name a procedure",
        ));
    }
    let proc = env.get_proc(name);
    proc(env.interrupt(), args)
}

fn handle_begin(
    exp: &Expression,
    env: &mut Environment,
    depth: usize,
) -> Result<Expression, SemanticError> {
    let mut result = Expression::none();
    for child in exp.tail() {
        result = eval_at(child, env, depth + 1)?;
    }
    Ok(result)
}

fn handle_define(
    exp: &Expression,
    env: &mut Environment,
    depth: usize,
) -> Result<Expression, SemanticError> {
    let (target, value) = match exp.tail() {
        [target, value] => (target, value),
        _ => {
            return Err(SemanticError::new(
                "Error during evaluation: invalid number of arguments to define",
            ))
        }
    };

    let name = target.head().as_symbol().ok_or_else(|| {
        SemanticError::new("Error during evaluation: first argument to define not symbol")
    })?;
    if SPECIAL_FORMS.contains(name) {
        return Err(SemanticError::new(
            "Error during evaluation: attempt to redefine a special-form",
        ));
    }
    if env.is_proc(name) {
        return Err(SemanticError::new(
            "Error during evaluation: attempt to redefine a built-in procedure",
        ));
    }
    if env.is_exp(name) {
        return Err(SemanticError::new(
            "Error during evaluation: attempt to redefine a previously defined symbol",
        ));
    }

    // All checks passed before evaluation, so a failing value expression
    // leaves the environment untouched.
    let result = eval_at(value, env, depth + 1)?;
    env.add_exp(target.head(), result.clone())?;
    Ok(result)
}

fn handle_lambda(exp: &Expression) -> Result<Expression, SemanticError> {
    let (params, body) = match exp.tail() {
        [params, body] => (params, body),
        _ => {
            return Err(SemanticError::new(
                "Error during evaluation: invalid number of arguments to lambda",
            ))
        }
    };

    // The parameter group parses with the first name in head position and
    // the rest in the tail; flatten it into one list of symbols.
    let mut names = Vec::with_capacity(1 + params.tail().len());
    names.push(params.head().clone());
    for rest in params.tail() {
        names.push(rest.head().clone());
    }
    let mut symbols = Vec::with_capacity(names.len());
    for name in names {
        if !name.is_symbol() {
            return Err(SemanticError::new(
                "Error during evaluation: lambda parameter not a symbol",
            ));
        }
        symbols.push(Expression::from(name));
    }

    Ok(Expression::lambda(Expression::list(symbols), body.clone()))
}

fn is_lambda_binding(env: &Environment, name: &str) -> bool {
    env.is_exp(name) && env.get_exp(name).is_lambda_value()
}

/// Invoke a lambda value: snapshot the caller's environment, bind the
/// formal parameters in the snapshot, evaluate the body there.
fn call_lambda(
    lambda: &Expression,
    args: &[Expression],
    env: &Environment,
    depth: usize,
) -> Result<Expression, SemanticError> {
    let (params, body) = match lambda.tail() {
        [params, body] => (params, body),
        _ => {
            return Err(SemanticError::new(
                "Error during evaluation: symbol does not name a procedure",
            ))
        }
    };
    if params.tail().len() != args.len() {
        return Err(SemanticError::new(
            "Error: incorrect number of arguments to lambda",
        ));
    }

    let mut call_env = env.clone();
    for (param, arg) in params.tail().iter().zip(args) {
        call_env.add_exp(param.head(), arg.clone())?;
    }
    eval_at(body, &mut call_env, depth + 1)
}

/// Shared body of `apply` and `map`. The first argument must be a bare
/// symbol naming a builtin procedure or a lambda binding; the second must
/// evaluate to a list, whose elements are passed on without being
/// re-evaluated.
fn handle_apply_map(
    exp: &Expression,
    env: &mut Environment,
    depth: usize,
    is_map: bool,
) -> Result<Expression, SemanticError> {
    let name = if is_map { "map" } else { "apply" };

    let (target, list_exp) = match exp.tail() {
        [target, list_exp] => (target, list_exp),
        _ => {
            return Err(SemanticError::new(format!(
                "Error: {name} takes two arguments"
            )))
        }
    };

    let op = match target.head().as_symbol() {
        Some(op)
            if target.is_tail_empty()
                && (env.is_proc(op) || is_lambda_binding(env, op)) =>
        {
            op.to_string()
        }
        _ => {
            return Err(SemanticError::new(format!(
                "Error: first argument to {name} not a procedure."
            )))
        }
    };

    let list = eval_at(list_exp, env, depth + 1)?;
    if !list.is_list() {
        return Err(SemanticError::new(format!(
            "Error: second argument to {name} not a list."
        )));
    }

    if is_map {
        let mut results = Vec::with_capacity(list.tail().len());
        for item in list.tail() {
            results.push(invoke(&op, std::slice::from_ref(item), env, depth)?);
        }
        Ok(Expression::list(results))
    } else {
        invoke(&op, list.tail(), env, depth)
    }
}

/// Call a procedure or lambda by name with pre-evaluated arguments.
fn invoke(
    op: &str,
    args: &[Expression],
    env: &Environment,
    depth: usize,
) -> Result<Expression, SemanticError> {
    if is_lambda_binding(env, op) {
        let lambda = env.get_exp(op);
        call_lambda(&lambda, args, env, depth)
    } else {
        let proc = env.get_proc(op);
        proc(env.interrupt(), args)
    }
}

fn handle_set_property(
    exp: &Expression,
    env: &mut Environment,
    depth: usize,
) -> Result<Expression, SemanticError> {
    let (key, value_exp, target_exp) = match exp.tail() {
        [key, value, target] => (key, value, target),
        _ => {
            return Err(SemanticError::new(
                "Error in call to set-property: invalid number of arguments.",
            ))
        }
    };

    let key = key.head().as_string().ok_or_else(|| {
        SemanticError::new(
            "Error in call to set-property: first argument must be a string.",
        )
    })?;
    let key = key.to_string();

    let value = eval_at(value_exp, env, depth + 1)?;
    let mut target = eval_at(target_exp, env, depth + 1)?;
    target.set_property(&key, value);

    // A bare bound symbol as target rebinds that symbol to the updated
    // value, so the property sticks across later lookups.
    if let Some(name) = target_exp.head().as_symbol() {
        if target_exp.is_tail_empty() && env.is_exp(name) {
            env.add_exp(target_exp.head(), target.clone())?;
        }
    }

    Ok(target)
}

fn handle_get_property(
    exp: &Expression,
    env: &mut Environment,
    depth: usize,
) -> Result<Expression, SemanticError> {
    let (key, target_exp) = match exp.tail() {
        [key, target] => (key, target),
        _ => {
            return Err(SemanticError::new(
                "Error in call to get-property: invalid number of arguments.",
            ))
        }
    };

    let key = key.head().as_string().ok_or_else(|| {
        SemanticError::new(
            "Error in call to get-property: first argument must be a string.",
        )
    })?;

    // Read from the current binding when the target is a bare bound
    // symbol, so a set-property rebind is visible here.
    let target = match target_exp.head().as_symbol() {
        Some(name) if target_exp.is_tail_empty() && env.is_exp(name) => env.get_exp(name),
        _ => eval_at(target_exp, env, depth + 1)?,
    };

    Ok(target.property(key).cloned().unwrap_or_else(Expression::none))
}

fn handle_continuous_plot(
    exp: &Expression,
    env: &mut Environment,
    depth: usize,
) -> Result<Expression, SemanticError> {
    if !(exp.tail().len() == 2 || exp.tail().len() == 3) {
        return Err(SemanticError::new(
            "Error in call to continuous-plot: incorrect number of arguments.",
        ));
    }

    let mut results = Vec::with_capacity(exp.tail().len());
    for child in exp.tail() {
        results.push(eval_at(child, env, depth + 1)?);
    }

    let invalid =
        || SemanticError::new("Error in call to continuous-plot: invalid arguments.");

    let lambda = &results[0];
    if !(lambda.is_lambda_value()
        && lambda.tail().len() == 2
        && lambda.tail()[0].tail().len() == 1)
    {
        return Err(invalid());
    }

    let bounds = &results[1];
    let (low, high) = match bounds.tail() {
        [low, high] if bounds.is_list() => match (
            low.head().as_number(),
            high.head().as_number(),
        ) {
            (Some(low), Some(high)) if low < high => (low, high),
            _ => return Err(invalid()),
        },
        _ => return Err(invalid()),
    };

    let options = results.get(2);

    let interrupt = env.interrupt().clone();
    let env_snapshot = &*env;
    let mut sample = |x: f64| -> Result<f64, SemanticError> {
        let value = call_lambda(lambda, &[Expression::number(x)], env_snapshot, depth)?;
        value.head().as_number().ok_or_else(invalid)
    };

    plot::continuous_plot(&interrupt, &mut sample, low, high, options)
}
