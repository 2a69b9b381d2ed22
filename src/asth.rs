/// src/asth.rs
/// helper module for the AST and parser
use crate::token_type::TokenType;
use std::fmt;

/// Built-in procedures, referenced by keyword or operator token.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
	PLUS,
	MINUS,
	STAR,
	SLASH,
	LESS,
	LESS_EQUAL,
	GREATER,
	GREATER_EQUAL,
	EQ,
	IF,
	DEFINE,
	LAMBDA,
	DISPLAY,
	PRINTF,
	LIST,
	FIRST,
	REST,
	CONS,
	LENGTH,
	LIST_REF,
	BEGIN,
}

impl Op {
	/// The builtin a token stands for, if any.
	pub fn from_token(kind: TokenType) -> Option<Op> {
		let op = match kind {
			TokenType::PLUS => Op::PLUS,
			TokenType::MINUS => Op::MINUS,
			TokenType::STAR => Op::STAR,
			TokenType::SLASH => Op::SLASH,
			TokenType::LESS => Op::LESS,
			TokenType::LESS_EQUAL => Op::LESS_EQUAL,
			TokenType::GREATER => Op::GREATER,
			TokenType::GREATER_EQUAL => Op::GREATER_EQUAL,
			TokenType::EQ => Op::EQ,
			TokenType::IF => Op::IF,
			TokenType::DEFINE => Op::DEFINE,
			TokenType::LAMBDA => Op::LAMBDA,
			TokenType::DISPLAY => Op::DISPLAY,
			TokenType::PRINTF => Op::PRINTF,
			TokenType::LIST => Op::LIST,
			TokenType::FIRST => Op::FIRST,
			TokenType::REST => Op::REST,
			TokenType::CONS => Op::CONS,
			TokenType::LENGTH => Op::LENGTH,
			TokenType::LIST_REF => Op::LIST_REF,
			TokenType::BEGIN => Op::BEGIN,
			_ => return None,
		};
		Some(op)
	}
}

impl fmt::Display for Op {
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		write!(
			f,
			"{}",
			match self {
				Op::PLUS => "+",
				Op::MINUS => "-",
				Op::STAR => "*",
				Op::SLASH => "/",
				Op::LESS => "<",
				Op::LESS_EQUAL => "<=",
				Op::GREATER => ">",
				Op::GREATER_EQUAL => ">=",
				Op::EQ => "eq",
				Op::IF => "if",
				Op::DEFINE => "define",
				Op::LAMBDA => "lambda",
				Op::DISPLAY => "display",
				Op::PRINTF => "printf",
				Op::LIST => "list",
				Op::FIRST => "first",
				Op::REST => "rest",
				Op::CONS => "cons",
				Op::LENGTH => "length",
				Op::LIST_REF => "list-ref",
				Op::BEGIN => "begin",
			}
		)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
	Number(i64),
	String(String),
	Bool(bool),
	/// a quoted name, `'foo`
	Symbol(String),
	/// an unquoted reference, resolved when evaluated
	Ident(String),
	/// a keyword or operator used as a value
	Builtin(Op),
}

impl fmt::Display for Atom {
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		match self {
			Atom::Number(n) => write!(f, "{n}"),
			Atom::String(s) => write!(f, "\"{s}\""),
			Atom::Bool(true) => write!(f, "#t"),
			Atom::Bool(false) => write!(f, "#f"),
			Atom::Symbol(s) => write!(f, "'{s}"),
			Atom::Ident(i) => write!(f, "{i}"),
			Atom::Builtin(op) => write!(f, "{op}"),
		}
	}
}

#[derive(Debug, PartialEq, Clone)]
pub enum TokenTree {
	Atom(Atom),
	/// `'( ... )`, names inside are taken as symbols
	Quoted(Vec<TokenTree>),
	/// `(head rest...)`, an application or special form
	Form { head: Box<TokenTree>, rest: Vec<TokenTree> },
}

impl TokenTree {
	/// Reads a lambda parameter list, `(a b c)` or `'(a b c)` or `()`.
	///
	/// On failure the error text says what was wrong with it.
	pub fn parameters(&self) -> Result<Vec<String>, String> {
		let names: Vec<&TokenTree> = match self {
			TokenTree::Form { head, rest } => std::iter::once(head.as_ref()).chain(rest).collect(),
			TokenTree::Quoted(items) => items.iter().collect(),
			TokenTree::Atom(_) => return Err(format!("lambda expects first argument to be a list, got {self}")),
		};

		names
			.into_iter()
			.map(|name| match name {
				TokenTree::Atom(Atom::Ident(ident)) => Ok(ident.clone()),
				other => Err(format!("all parameters should be identifiers, got {other}")),
			})
			.collect()
	}
}

impl fmt::Display for TokenTree {
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		match self {
			TokenTree::Atom(i) => write!(f, "{}", i),
			TokenTree::Quoted(items) => {
				write!(f, "'(")?;
				for (i, s) in items.iter().enumerate() {
					if i > 0 {
						write!(f, " ")?;
					}
					write!(f, "{s}")?;
				}
				write!(f, ")")
			},
			TokenTree::Form { head, rest } => {
				write!(f, "({}", head)?;
				for s in rest {
					write!(f, " {s}")?
				}
				write!(f, ")")
			},
		}
	}
}

/// The ordered top-level expressions of one source text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
	pub exprs: Vec<TokenTree>,
}

impl fmt::Display for Program {
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		for expr in &self.exprs {
			writeln!(f, "{expr}")?;
		}
		Ok(())
	}
}
