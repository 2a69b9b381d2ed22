//! Doma, a small lisp.
//!
//! Source text goes through the [`Lexer`], the [`Parser`] builds a
//! [`Program`] of [`TokenTree`]s and the [`Evaluator`] walks it against a
//! shared [`Env`].
//!
//! ```
//! let env = doma::new_environment();
//! let (value, errors) = doma::evaluate_source("(define sq (lambda (x) (* x x))) (sq 5)", &env);
//! assert!(errors.is_empty());
//! assert_eq!(value.inspect(), "25");
//! ```

pub mod asth;
pub mod binds;
pub mod builtins;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod token_type;

pub use asth::{Program, TokenTree};
pub use binds::Env;
pub use error::{RuntimeError, SyntaxError};
pub use evaluator::Evaluator;
pub use lexer::Lexer;
pub use object::Object;
pub use parser::Parser;

/// Maximum nesting of lists and forms the parser accepts.
pub const MAX_PARSE_DEPTH: usize = 256;

/// Default limit on nested evaluation before a recursion error is raised.
pub const MAX_EVAL_DEPTH: usize = 512;

/// A fresh global environment, shared by every evaluation of a session.
pub fn new_environment() -> Env {
	Env::new()
}

/// Parses and evaluates `source`, printing to stdout.
///
/// With syntax errors nothing is evaluated and their messages come back in
/// source order alongside [`Object::Nil`]. Runtime failures are returned as
/// an [`Object::Error`].
pub fn evaluate_source(
	source: &str,
	env: &Env,
) -> (Object, Vec<String>) {
	match Evaluator::stdout().run(source, env) {
		Ok(value) => (value, Vec::new()),
		Err(errors) => (Object::Nil, errors.iter().map(ToString::to_string).collect()),
	}
}
