//! Evaluation session
//!
//! A `Session` is the diagnostic side channel of the interpreter. Nothing the
//! evaluator reports here aborts evaluation: the caller substitutes a
//! sentinel value and carries on. Undefined-symbol reports are deduplicated
//! per top-level request; the driver calls [`Session::begin_request`] before
//! each one.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::interner::InternedSymbol;

/// Advisory messages produced while reading or evaluating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("unknown character '{0}' ignored.")]
    UnknownCharacter(char),

    #[error("Undefined symbol '{0}'")]
    UndefinedSymbol(InternedSymbol),

    #[error("Variable '{0}' does not exist.")]
    UndefinedVariable(InternedSymbol),

    #[error("malformed '{form}' expression: {reason}")]
    MalformedForm { form: &'static str, reason: &'static str },

    #[error("cannot apply non-procedure: {0}")]
    NotCallable(String),

    #[error("extraneous input: {0}...")]
    ExtraneousInput(String),
}

#[derive(Debug, Default)]
pub struct Session {
    reported: FxHashSet<InternedSymbol>,
    diagnostics: Vec<Diagnostic>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new top-level request: forget which undefined symbols were
    /// already reported.
    pub fn begin_request(&mut self) {
        self.reported.clear();
    }

    /// Record a diagnostic. Diagnostics accumulate across requests until
    /// drained with [`Session::take_diagnostics`].
    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(%diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Report an undefined symbol unless it was already reported during the
    /// current request.
    pub fn report_undefined(&mut self, name: InternedSymbol) {
        if self.reported.insert(name) {
            self.report(Diagnostic::UndefinedSymbol(name));
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
