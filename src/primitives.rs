//! Built-in procedures
//!
//! Every primitive receives its argument list unevaluated, together with the
//! calling environment, and decides for itself what to evaluate. Failures
//! never unwind: structural problems yield `#error`, and arithmetic or
//! comparison over anything but integers yields `#f`.

use crate::environment::Environment;
use crate::interpreter::{eval, eval_sequence};
use crate::language::{Sentinel, Value, cons};
use crate::session::{Diagnostic, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    If,
    Define,
    Setq,
    Begin,
    Car,
    Cdr,
    Cons,
    List,
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl Primitive {
    pub const ALL: [Primitive; 18] = [
        Primitive::If,
        Primitive::Define,
        Primitive::Setq,
        Primitive::Begin,
        Primitive::Car,
        Primitive::Cdr,
        Primitive::Cons,
        Primitive::List,
        Primitive::Add,
        Primitive::Sub,
        Primitive::Mul,
        Primitive::Div,
        Primitive::Gt,
        Primitive::Lt,
        Primitive::Ge,
        Primitive::Le,
        Primitive::Eq,
        Primitive::Ne,
    ];

    /// The name the primitive is bound to in the root environment
    pub fn name(self) -> &'static str {
        match self {
            Primitive::If => "if",
            Primitive::Define => "define",
            Primitive::Setq => "setq",
            Primitive::Begin => "begin",
            Primitive::Car => "car",
            Primitive::Cdr => "cdr",
            Primitive::Cons => "cons",
            Primitive::List => "list",
            Primitive::Add => "+",
            Primitive::Sub => "-",
            Primitive::Mul => "*",
            Primitive::Div => "/",
            Primitive::Gt => ">",
            Primitive::Lt => "<",
            Primitive::Ge => ">=",
            Primitive::Le => "<=",
            Primitive::Eq => "eq",
            Primitive::Ne => "ne",
        }
    }

    pub fn apply(self, args: &Value, env: &Environment, session: &mut Session) -> Value {
        tracing::trace!(primitive = self.name(), %args, "apply");
        match self {
            Primitive::If => eval_if(args, env, session),
            Primitive::Define => eval_set(args, env, session, true),
            Primitive::Setq => eval_set(args, env, session, false),
            Primitive::Begin => eval_sequence(args, env, session),
            Primitive::Car => eval_access(args, env, session, true),
            Primitive::Cdr => eval_access(args, env, session, false),
            Primitive::Cons => eval_cons(args, env, session),
            Primitive::List => eval_list(args, env, session),
            Primitive::Add => eval_arithmetic(args, env, session, i64::checked_add),
            Primitive::Sub => eval_arithmetic(args, env, session, i64::checked_sub),
            Primitive::Mul => eval_arithmetic(args, env, session, i64::checked_mul),
            Primitive::Div => eval_arithmetic(args, env, session, i64::checked_div),
            Primitive::Gt => eval_comparison(args, env, session, |a, b| a > b),
            Primitive::Lt => eval_comparison(args, env, session, |a, b| a < b),
            Primitive::Ge => eval_comparison(args, env, session, |a, b| a >= b),
            Primitive::Le => eval_comparison(args, env, session, |a, b| a <= b),
            Primitive::Eq => eval_comparison(args, env, session, |a, b| a == b),
            Primitive::Ne => eval_comparison(args, env, session, |a, b| a != b),
        }
    }
}

fn malformed(session: &mut Session, form: &'static str, reason: &'static str) -> Value {
    session.report(Diagnostic::MalformedForm { form, reason });
    Value::error()
}

// ============================================================================
// Control and binding forms
// ============================================================================

fn eval_if(args: &Value, env: &Environment, session: &mut Session) -> Value {
    let mut forms = args.iter();
    let (Some(test), Some(then)) = (forms.next(), forms.next()) else {
        return malformed(session, "if", "expected a test and a then-branch");
    };

    if eval(test, env, session).is_sentinel(Sentinel::False) {
        match forms.next() {
            Some(otherwise) => eval(otherwise, env, session),
            None => Value::nil(),
        }
    } else {
        eval(then, env, session)
    }
}

// Handles both
//  define: binds in the innermost scope, creating the name if needed
//  setq:   searches outward and never creates a binding
fn eval_set(args: &Value, env: &Environment, session: &mut Session, is_define: bool) -> Value {
    let form = if is_define { "define" } else { "setq" };
    let mut forms = args.iter();
    let (Some(target), Some(expr)) = (forms.next(), forms.next()) else {
        return malformed(session, form, "expected a name and a value");
    };
    let Some(name) = target.as_symbol() else {
        return malformed(session, form, "name must be a symbol");
    };

    let value = eval(expr, env, session);
    if env.bind(name, value.clone(), is_define) {
        value
    } else {
        session.report(Diagnostic::UndefinedVariable(name));
        Value::nil()
    }
}

// ============================================================================
// List processing
// ============================================================================

fn eval_access(args: &Value, env: &Environment, session: &mut Session, car: bool) -> Value {
    let Some(expr) = args.head() else {
        return Value::nil();
    };
    match eval(expr, env, session) {
        Value::Pair(cell) if car => cell.car.clone(),
        Value::Pair(cell) => cell.cdr.clone(),
        _ => Value::error(),
    }
}

fn eval_cons(args: &Value, env: &Environment, session: &mut Session) -> Value {
    let mut forms = args.iter();
    let car = match forms.next() {
        Some(expr) => eval(expr, env, session),
        None => Value::nil(),
    };
    let cdr = match forms.next() {
        Some(expr) => eval(expr, env, session),
        None => Value::nil(),
    };
    cons(car, cdr)
}

fn eval_list(args: &Value, env: &Environment, session: &mut Session) -> Value {
    let values: Vec<Value> = args.iter().map(|expr| eval(expr, env, session)).collect();
    Value::list(values)
}

// ============================================================================
// Arithmetic and comparison
// ============================================================================

/// An operand that is already an integer literal is used as is; anything
/// else is evaluated once and must produce an integer.
fn integer_operand(expr: &Value, env: &Environment, session: &mut Session) -> Option<i64> {
    expr.as_integer()
        .or_else(|| eval(expr, env, session).as_integer())
}

/// Operands fold left: `(- 10 3 2)` is `(10 - 3) - 2`, never the
/// right-nested `10 - (3 - 2)`.
fn eval_arithmetic(
    args: &Value,
    env: &Environment,
    session: &mut Session,
    op: fn(i64, i64) -> Option<i64>,
) -> Value {
    let mut operands = args.iter();
    let Some(mut acc) = operands
        .next()
        .and_then(|expr| integer_operand(expr, env, session))
    else {
        return Value::f();
    };

    for expr in operands {
        let Some(result) = integer_operand(expr, env, session).and_then(|n| op(acc, n)) else {
            return Value::f();
        };
        acc = result;
    }

    Value::int(acc)
}

fn eval_comparison(
    args: &Value,
    env: &Environment,
    session: &mut Session,
    op: fn(i64, i64) -> bool,
) -> Value {
    let mut operands = args.iter();
    let Some(mut prev) = operands
        .next()
        .and_then(|expr| integer_operand(expr, env, session))
    else {
        return Value::f();
    };

    for expr in operands {
        let Some(n) = integer_operand(expr, env, session) else {
            return Value::f();
        };
        if !op(prev, n) {
            return Value::f();
        }
        prev = n;
    }

    Value::t()
}
