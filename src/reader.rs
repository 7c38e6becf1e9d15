//! Top-level driver
//!
//! One call to [`Interpreter::eval_line`] is one top-level request: the text
//! is tokenized, checked for bracket balance, parsed into a single object and
//! evaluated against the persistent root environment.
//!
//! Diagnostics from every request stay queued on the interpreter until the
//! caller drains them with [`Interpreter::take_diagnostics`].

use thiserror::Error;

use crate::environment::Environment;
use crate::interpreter::eval;
use crate::language::Value;
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::session::{Diagnostic, Session};

/// Input rejected before evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("no input")]
    Empty,

    #[error("Unbalanced parentheses.")]
    UnbalancedParentheses { depth: i64 },
}

/// Net count of `(` over `)` tokens
fn bracket_depth(tokens: &[String]) -> i64 {
    tokens.iter().fold(0, |depth, token| match token.as_str() {
        "(" => depth + 1,
        ")" => depth - 1,
        _ => depth,
    })
}

#[derive(Debug)]
pub struct Interpreter {
    env: Environment,
    session: Session,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            env: Environment::with_globals(),
            session: Session::new(),
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.session.take_diagnostics()
    }

    fn read_tokens(&mut self, text: &str) -> Result<Vec<String>, ReadError> {
        let tokens = tokenize(text, &mut self.session);
        if tokens.is_empty() {
            return Err(ReadError::Empty);
        }
        match bracket_depth(&tokens) {
            0 => Ok(tokens),
            depth => Err(ReadError::UnbalancedParentheses { depth }),
        }
    }

    /// Evaluate an already parsed object as one top-level request.
    pub fn eval_parsed(&mut self, expr: &Value) -> Value {
        tracing::debug!(%expr, "evaluate");
        self.session.begin_request();
        eval(expr, &self.env, &mut self.session)
    }

    /// Evaluate the first object on `line`. Anything after it is reported
    /// as extraneous input and ignored.
    pub fn eval_line(&mut self, line: &str) -> Result<Value, ReadError> {
        self.eval_line_with(line, |_| {})
    }

    /// Like [`Interpreter::eval_line`], handing the parsed object to
    /// `on_parsed` before it is evaluated. The line is tokenized once.
    pub fn eval_line_with<F>(&mut self, line: &str, on_parsed: F) -> Result<Value, ReadError>
    where
        F: FnOnce(&Value),
    {
        let tokens = self.read_tokens(line)?;
        let mut parser = Parser::new(&tokens);
        let expr = parser.parse_object();
        on_parsed(&expr);
        let value = self.eval_parsed(&expr);

        if let Some(rest) = tokens.get(parser.position()) {
            self.session.report(Diagnostic::ExtraneousInput(rest.clone()));
        }
        Ok(value)
    }

    /// Evaluate every top-level object in `text` and return the last value.
    pub fn eval_source(&mut self, text: &str) -> Result<Value, ReadError> {
        let tokens = self.read_tokens(text)?;
        let mut parser = Parser::new(&tokens);
        let mut value = Value::nil();

        while !parser.is_exhausted() {
            let expr = parser.parse_object();
            value = self.eval_parsed(&expr);
        }
        Ok(value)
    }
}
