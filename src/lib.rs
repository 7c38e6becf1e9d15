//! A minimal Lisp interpreter
//!
//! Text is split into tokens by the [`lexer`], turned into cons-cell trees by
//! the [`parser`] and reduced by the tree-walking [`interpreter`] against a
//! chain of lexical [`environment`]s. Failures are values: the evaluator
//! substitutes the `#nil`, `#error` or `#f` sentinels and reports what went
//! wrong through a [`Session`].

pub mod config;
pub mod environment;
pub mod interner;
pub mod interpreter;
pub mod language;
pub mod lexer;
pub mod parser;
pub mod primitives;
pub mod reader;
pub mod session;
pub mod stdlib;

// Re-export commonly used items for convenience
pub use config::ReplConfig;
pub use environment::Environment;
pub use interner::InternedSymbol;
pub use interpreter::{apply, eval};
pub use language::{ConsCell, LambdaCell, Sentinel, Value, cons};
pub use lexer::tokenize;
pub use parser::{Parser, parse};
pub use primitives::Primitive;
pub use reader::{Interpreter, ReadError};
pub use session::{Diagnostic, Session};
pub use stdlib::register_globals;
