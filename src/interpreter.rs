use once_cell::sync::Lazy;

use crate::environment::Environment;
use crate::interner::InternedSymbol;
use crate::language::{ConsCell, LambdaCell, Value};
use crate::session::{Diagnostic, Session};

static QUOTE: Lazy<InternedSymbol> = Lazy::new(|| InternedSymbol::new("quote"));
static LAMBDA: Lazy<InternedSymbol> = Lazy::new(|| InternedSymbol::new("lambda"));

// ============================================================================
// Evaluator
// ============================================================================

/// Reduce `expr` to a value in `env`.
///
/// Evaluation never fails outright. Problems are reported to `session` and a
/// sentinel stands in for the result: `#nil` for an unresolved symbol,
/// `#error` for a form whose head cannot be applied.
pub fn eval(expr: &Value, env: &Environment, session: &mut Session) -> Value {
    match expr {
        // Self-evaluating forms
        Value::Integer(_)
        | Value::Float(_)
        | Value::Str(_)
        | Value::Sentinel(_)
        | Value::Native(_)
        | Value::Closure(_) => expr.clone(),

        // Symbol lookup
        Value::Symbol(name) => env.resolve(*name, session).unwrap_or_else(Value::nil),

        // List evaluation
        Value::Pair(cell) => eval_form(cell, env, session),
    }
}

fn eval_form(cell: &ConsCell, env: &Environment, session: &mut Session) -> Value {
    let operator = match &cell.car {
        Value::Symbol(name) if *name == *QUOTE => return quote(&cell.cdr),
        Value::Symbol(name) if *name == *LAMBDA => return make_lambda(&cell.cdr, env, session),
        Value::Symbol(name) => match env.resolve(*name, session) {
            Some(value) => value,
            None => return Value::error(),
        },
        head if head.is_constant() || matches!(head, Value::Sentinel(_)) => {
            return Value::error();
        }
        // A computed operator, e.g. ((lambda (x) x) 1)
        head => eval(head, env, session),
    };

    apply(&operator, &cell.cdr, env, session)
}

/// Apply a procedure value to an unevaluated argument list.
pub fn apply(operator: &Value, args: &Value, env: &Environment, session: &mut Session) -> Value {
    match operator {
        Value::Closure(lambda) => call_closure(lambda, args, env, session),
        Value::Native(primitive) => primitive.apply(args, env, session),
        other => {
            session.report(Diagnostic::NotCallable(other.to_string()));
            Value::error()
        }
    }
}

fn call_closure(lambda: &LambdaCell, args: &Value, env: &Environment, session: &mut Session) -> Value {
    tracing::trace!(params = %lambda.params, %args, "call closure");
    let frame = Environment::call_frame(&lambda.params, args, env, &lambda.env, session);
    eval_sequence(&lambda.body, &frame, session)
}

/// Evaluate each form of a body in order and return the last value.
pub fn eval_sequence(body: &Value, env: &Environment, session: &mut Session) -> Value {
    body.iter()
        .fold(Value::nil(), |_, form| eval(form, env, session))
}

// (quote x) yields x; with several arguments the whole list comes back
fn quote(args: &Value) -> Value {
    match args.as_pair() {
        Some(cell) if cell.cdr.is_nil() => cell.car.clone(),
        _ => args.clone(),
    }
}

// (lambda params body...)
fn make_lambda(args: &Value, env: &Environment, session: &mut Session) -> Value {
    match args.as_pair() {
        Some(cell) if matches!(cell.cdr, Value::Pair(_)) => {
            Value::closure(cell.car.clone(), cell.cdr.clone(), env.clone())
        }
        _ => {
            session.report(Diagnostic::MalformedForm {
                form: "lambda",
                reason: "expected a parameter list and a body",
            });
            Value::nil()
        }
    }
}
