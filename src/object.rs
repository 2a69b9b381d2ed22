//! Runtime values.

use crate::asth::{Op, TokenTree};
use crate::binds::Env;
use crate::error::RuntimeError;
use std::fmt;
use std::rc::Rc;

/// A closure: parameters, body and the scope it was created in.
#[derive(Debug)]
pub struct Lambda {
	pub params: Vec<String>,
	pub body: Vec<TokenTree>,
	pub env: Env,
}

/// An immutable list.
///
/// Clones share storage, and so does [`List::rest`], which makes walking a
/// list with `first`/`rest` linear.
#[derive(Debug, Clone)]
pub struct List {
	items: Rc<[Object]>,
	start: usize,
}

impl List {
	pub fn as_slice(&self) -> &[Object] {
		&self.items[self.start..]
	}

	pub fn len(&self) -> usize {
		self.as_slice().len()
	}

	pub fn is_empty(&self) -> bool {
		self.as_slice().is_empty()
	}

	pub fn first(&self) -> Option<&Object> {
		self.as_slice().first()
	}

	pub fn get(
		&self,
		index: usize,
	) -> Option<&Object> {
		self.as_slice().get(index)
	}

	/// Everything after the first element; the rest of `'()` is `'()`.
	pub fn rest(&self) -> List {
		List { items: Rc::clone(&self.items), start: (self.start + 1).min(self.items.len()) }
	}

	/// A new list with `head` in front of this one.
	pub fn cons(
		&self,
		head: Object,
	) -> List {
		std::iter::once(head).chain(self.as_slice().iter().cloned()).collect()
	}
}

impl From<Vec<Object>> for List {
	fn from(items: Vec<Object>) -> Self {
		List { items: items.into(), start: 0 }
	}
}

impl FromIterator<Object> for List {
	fn from_iter<I: IntoIterator<Item = Object>>(iter: I) -> Self {
		List { items: iter.into_iter().collect(), start: 0 }
	}
}

impl PartialEq for List {
	fn eq(
		&self,
		other: &Self,
	) -> bool {
		self.as_slice() == other.as_slice()
	}
}

#[derive(Debug, Clone)]
pub enum Object {
	Number(i64),
	String(String),
	Bool(bool),
	Symbol(String),
	List(List),
	Lambda(Rc<Lambda>),
	/// a lambda bound by `define`, remembering its name
	Procedure { name: String, lambda: Rc<Lambda> },
	Builtin(Op),
	/// the absence of a value
	Nil,
	Error(String),
}

impl Object {
	/// The type name used in error messages.
	pub fn type_name(&self) -> &'static str {
		match self {
			Object::Number(_) => "NUMBER",
			Object::String(_) => "STRING",
			Object::Bool(_) => "BOOLEAN",
			Object::Symbol(_) => "SYMBOL",
			Object::List(_) => "LIST",
			Object::Lambda(_) => "LAMBDA",
			Object::Procedure { .. } => "PROCEDURE",
			Object::Builtin(_) => "BUILTIN",
			Object::Nil => "NIL",
			Object::Error(_) => "ERROR",
		}
	}

	/// Only `#f` and nil are false.
	pub fn is_truthy(&self) -> bool {
		!matches!(self, Object::Bool(false) | Object::Nil)
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Object::Error(_))
	}

	/// Human readable rendering, as printed by `display` and the REPL.
	pub fn inspect(&self) -> String {
		self.to_string()
	}

	/// Rendering of a list element, in the form it would be written inside `'( ... )`.
	///
	/// Nested lists keep their tick, a bare `( ... )` there would be a call.
	fn fmt_datum(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		match self {
			Object::String(s) => write!(f, "\"{s}\""),
			Object::Symbol(s) => write!(f, "{s}"),
			other => write!(f, "{other}"),
		}
	}
}

fn fmt_items(
	items: &[Object],
	f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
	for (i, item) in items.iter().enumerate() {
		if i > 0 {
			write!(f, " ")?;
		}
		item.fmt_datum(f)?;
	}
	Ok(())
}

impl fmt::Display for Object {
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		match self {
			Object::Number(n) => write!(f, "{n}"),
			Object::String(s) => write!(f, "{s}"),
			Object::Bool(true) => write!(f, "#t"),
			Object::Bool(false) => write!(f, "#f"),
			Object::Symbol(s) => write!(f, "'{s}"),
			Object::List(items) => {
				write!(f, "'(")?;
				fmt_items(items.as_slice(), f)?;
				write!(f, ")")
			},
			Object::Lambda(_) => write!(f, "#<procedure>"),
			Object::Procedure { name, .. } => write!(f, "#<procedure:{name}>"),
			Object::Builtin(op) => write!(f, "#<procedure:{op}>"),
			Object::Nil => write!(f, "nil"),
			Object::Error(msg) => write!(f, "ERROR: {msg}"),
		}
	}
}

impl PartialEq for Object {
	/// Structural for data, identity for closures.
	fn eq(
		&self,
		other: &Self,
	) -> bool {
		match (self, other) {
			(Object::Number(a), Object::Number(b)) => a == b,
			(Object::String(a), Object::String(b)) => a == b,
			(Object::Bool(a), Object::Bool(b)) => a == b,
			(Object::Symbol(a), Object::Symbol(b)) => a == b,
			(Object::List(a), Object::List(b)) => a == b,
			(Object::Lambda(a), Object::Lambda(b)) => Rc::ptr_eq(a, b),
			(Object::Procedure { name: n, lambda: a }, Object::Procedure { name: m, lambda: b }) => {
				n == m && Rc::ptr_eq(a, b)
			},
			(Object::Builtin(a), Object::Builtin(b)) => a == b,
			(Object::Nil, Object::Nil) => true,
			(Object::Error(a), Object::Error(b)) => a == b,
			_ => false,
		}
	}
}

impl From<RuntimeError> for Object {
	fn from(e: RuntimeError) -> Self {
		Object::Error(e.to_string())
	}
}
