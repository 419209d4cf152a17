//! Expression-evaluation helpers shared by Node Job and Task Job.
//!
//! Thin wrappers around `Expression::eval` that add the bookkeeping every
//! caller needs: binding the result under a name, falling back to a
//! declaration's default expression (or `Null` for an optional with no
//! default), and evaluating a call's whole input map at once.

use crate::engine::error::EngineError;
use crate::env::Bindings;
use crate::expr::ExpressionBase;
use crate::stdlib::StdLib;
use crate::tree::{Call, Declaration};
use crate::value::Value;
use std::collections::HashMap;

/// Evaluate `expr` against `env` and bind the result under `name`,
/// returning the updated environment.
pub fn evaluate_named_expression(
    env: &Bindings<Value>,
    stdlib: &StdLib,
    name: &str,
    expr: &crate::expr::Expression,
) -> Result<Bindings<Value>, EngineError> {
    let value = expr.eval(env, stdlib)?;
    Ok(env.bind(name.to_string(), value, None))
}

/// Evaluate a declaration: its own default expression if the incoming
/// environment does not already bind its name, otherwise leave the
/// existing binding untouched (so workflow inputs supplied by the caller
/// take precedence over WDL-level defaults).
pub fn evaluate_decl(
    env: &Bindings<Value>,
    stdlib: &StdLib,
    decl: &Declaration,
) -> Result<Bindings<Value>, EngineError> {
    if env.has_binding(&decl.name) {
        return Ok(env.clone());
    }
    match &decl.expr {
        Some(expr) => evaluate_named_expression(env, stdlib, &decl.name, expr),
        None => evaluate_defaultable_decl(env, decl),
    }
}

/// Bind an unsupplied, defaultless declaration: `Null` if optional, a
/// caller-visible error otherwise (a required input reaching this point
/// means the pre-flight input check in `engine::run` was bypassed).
pub fn evaluate_defaultable_decl(
    env: &Bindings<Value>,
    decl: &Declaration,
) -> Result<Bindings<Value>, EngineError> {
    if decl.decl_type.is_optional() {
        Ok(env.bind(decl.name.clone(), Value::Null, None))
    } else {
        Err(EngineError::MissingRequiredInput {
            name: decl.name.clone(),
        })
    }
}

/// Evaluate every expression in a call's `input: ...` block against the
/// caller's environment, producing the bindings that become the callee's
/// own input environment (namespaced lookup happens one level up, in
/// `engine::jobs::NodeJob`).
pub fn evaluate_call_inputs(
    env: &Bindings<Value>,
    stdlib: &StdLib,
    call: &Call,
) -> Result<Bindings<Value>, EngineError> {
    let mut inputs = Bindings::new();
    let mut sorted: Vec<(&String, &crate::expr::Expression)> = call.inputs.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    for (name, expr) in sorted {
        let value = expr.eval(env, stdlib)?;
        inputs = inputs.bind(name.clone(), value, None);
    }
    Ok(inputs)
}

#[allow(dead_code)]
pub fn empty_inputs() -> HashMap<String, crate::expr::Expression> {
    HashMap::new()
}
