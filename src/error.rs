//! Error types shared by the front end and the evaluator.

use miette::{Diagnostic, SourceSpan};
use std::fmt;
use thiserror::Error;

/// Problems found while scanning or parsing.
///
/// Every variant carries the whole source so it can be rendered as an
/// annotated report, but `Display` alone gives the one-line message.
#[derive(Diagnostic, Debug, Error, Clone, PartialEq)]
pub enum SyntaxError {
	#[error("Unexpected character: {token}")]
	UnexpectedCharacter {
		token: char,
		#[source_code]
		src: String,
		#[label("this character")]
		err_span: SourceSpan,
	},

	#[error("Unterminated string")]
	UnterminatedString {
		#[source_code]
		src: String,
		#[label("this string literal")]
		err_span: SourceSpan,
	},

	#[error("Could not parse {literal} as integer")]
	InvalidNumber {
		literal: String,
		#[source_code]
		src: String,
		#[label("this numeric literal")]
		err_span: SourceSpan,
	},

	#[error("Unexpected token {found}")]
	UnexpectedToken {
		found: String,
		#[source_code]
		src: String,
		#[label("here")]
		err_span: SourceSpan,
	},

	#[error("Missing ) to close form")]
	#[diagnostic(help("every ( needs a matching )"))]
	MissingCloseParen {
		#[source_code]
		src: String,
		#[label("this form is never closed")]
		err_span: SourceSpan,
	},

	#[error("Expected ( after ', got {found}")]
	ExpectedQuotedList {
		found: String,
		#[source_code]
		src: String,
		#[label("here")]
		err_span: SourceSpan,
	},

	#[error("Expression too deeply nested (max depth: {max})")]
	TooDeeplyNested {
		max: usize,
		#[source_code]
		src: String,
		#[label("nesting passes the limit here")]
		err_span: SourceSpan,
	},

	#[error("Malformed lambda: {reason}")]
	MalformedLambda {
		reason: String,
		#[source_code]
		src: String,
		#[label("in this lambda")]
		err_span: SourceSpan,
	},
}

/// Expected argument count of a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
	Exactly(usize),
	AtLeast(usize),
}

impl Arity {
	pub fn check(
		self,
		proc: impl fmt::Display,
		got: usize,
	) -> Result<(), RuntimeError> {
		let ok = match self {
			Arity::Exactly(n) => got == n,
			Arity::AtLeast(n) => got >= n,
		};

		if ok {
			Ok(())
		} else {
			Err(RuntimeError::Arity { proc: proc.to_string(), expected: self, got })
		}
	}
}

impl Arity {
	fn noun(&self) -> &'static str {
		match self {
			Arity::Exactly(1) | Arity::AtLeast(1) => "argument",
			_ => "arguments",
		}
	}
}

impl fmt::Display for Arity {
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		match self {
			Arity::Exactly(n) => write!(f, "{n}"),
			Arity::AtLeast(n) => write!(f, "at least {n}"),
		}
	}
}

/// Failures raised while walking the tree.
#[derive(Diagnostic, Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
	#[error("identifier not found: {0}")]
	IdentifierNotFound(String),

	#[error("type mismatch - {left} and {right}")]
	TypeMismatch { left: &'static str, right: &'static str },

	#[error("type mismatch - {proc} expects {expected}, got {got}")]
	ExpectedType { proc: String, expected: &'static str, got: &'static str },

	#[error("{proc} expects {expected} {}, got {got}", .expected.noun())]
	Arity { proc: String, expected: Arity, got: usize },

	#[error("{proc}: no arguments")]
	NoArguments { proc: String },

	#[error("unknown procedure: {0}")]
	UnknownProcedure(String),

	#[error("{proc} on invalid type {ty}")]
	UnsupportedType { proc: String, ty: &'static str },

	#[error("division by zero")]
	DivisionByZero,

	#[error("integer overflow in {proc}")]
	Overflow { proc: String },

	#[error("list-ref index {index} out of range for list of length {len}")]
	IndexOutOfRange { index: i64, len: usize },

	#[error("{proc} of empty list")]
	EmptyList { proc: String },

	#[error("define expects first argument to be identifier, got {0}")]
	MalformedDefine(String),

	#[error("malformed lambda: {0}")]
	MalformedLambda(String),

	#[error("unknown escape \\{0} in printf")]
	UnknownEscape(char),

	#[error("maximum recursion depth of {0} exceeded")]
	#[diagnostic(help("raise the limit with --max-depth"))]
	RecursionLimit(usize),

	#[error("failed writing output: {0}")]
	Output(String),
}

impl From<std::io::Error> for RuntimeError {
	fn from(e: std::io::Error) -> Self {
		RuntimeError::Output(e.to_string())
	}
}
