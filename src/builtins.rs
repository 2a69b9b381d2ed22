//! Built-in procedures.
//!
//! Every builtin receives its argument trees unevaluated, so special forms
//! (`if`, `define`, `lambda`) and plain procedures share one calling
//! convention. Arity is checked before anything is evaluated.

use crate::asth::{Atom, Op, TokenTree};
use crate::binds::Env;
use crate::error::{Arity, RuntimeError};
use crate::evaluator::Evaluator;
use crate::object::{Lambda, List, Object};
use crate::token_type::Token;
use std::cmp::Ordering;
use std::io::Write;
use std::rc::Rc;

impl<W: Write> Evaluator<W> {
	pub(crate) fn apply_builtin(
		&mut self,
		op: Op,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		tracing::trace!(builtin = %op, args = args.len(), "apply");

		match op {
			Op::PLUS | Op::MINUS | Op::STAR | Op::SLASH => self.arithmetic(op, args, env),
			Op::LESS => self.compare(op, args, env, Ordering::is_lt),
			Op::LESS_EQUAL => self.compare(op, args, env, Ordering::is_le),
			Op::GREATER => self.compare(op, args, env, Ordering::is_gt),
			Op::GREATER_EQUAL => self.compare(op, args, env, Ordering::is_ge),
			Op::EQ => self.equal(args, env),
			Op::IF => self.if_form(args, env),
			Op::DEFINE => self.define(args, env),
			Op::LAMBDA => self.lambda(args, env),
			Op::DISPLAY => self.display(args, env),
			Op::PRINTF => self.printf(args, env),
			Op::LIST => self.eval_all(args, env).map(|items| Object::List(items.into())),
			Op::FIRST => self.first(op, args, env),
			Op::REST => self.rest(op, args, env),
			Op::LENGTH => {
				Arity::Exactly(1).check(op, args.len())?;
				let items = self.list_arg(op, &args[0], env)?;
				Ok(Object::Number(items.len() as i64))
			},
			Op::CONS => self.cons(op, args, env),
			Op::LIST_REF => self.list_ref(op, args, env),
			Op::BEGIN => {
				let mut last = Object::Nil;
				for arg in args {
					last = self.eval(arg, env)?;
				}
				Ok(last)
			},
		}
	}

	fn eval_all(
		&mut self,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Vec<Object>, RuntimeError> {
		args.iter().map(|arg| self.eval(arg, env)).collect()
	}

	fn list_arg(
		&mut self,
		op: Op,
		arg: &TokenTree,
		env: &Env,
	) -> Result<List, RuntimeError> {
		match self.eval(arg, env)? {
			Object::List(items) => Ok(items),
			other => Err(RuntimeError::ExpectedType { proc: op.to_string(), expected: "LIST", got: other.type_name() }),
		}
	}

	fn number_arg(
		&mut self,
		op: Op,
		arg: &TokenTree,
		env: &Env,
	) -> Result<i64, RuntimeError> {
		match self.eval(arg, env)? {
			Object::Number(n) => Ok(n),
			other => Err(RuntimeError::ExpectedType { proc: op.to_string(), expected: "NUMBER", got: other.type_name() }),
		}
	}

	/// Left fold over one or more numbers.
	fn arithmetic(
		&mut self,
		op: Op,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		let mut acc: Option<i64> = None;

		for arg in args {
			let n = self.number_arg(op, arg, env)?;

			acc = Some(match acc {
				None => n,
				Some(acc) => {
					let folded = match op {
						Op::PLUS => acc.checked_add(n),
						Op::MINUS => acc.checked_sub(n),
						Op::STAR => acc.checked_mul(n),
						_ if n == 0 => return Err(RuntimeError::DivisionByZero),
						// truncates toward zero
						_ => acc.checked_div(n),
					};
					folded.ok_or_else(|| RuntimeError::Overflow { proc: op.to_string() })?
				},
			});
		}

		acc.map(Object::Number).ok_or_else(|| RuntimeError::NoArguments { proc: op.to_string() })
	}

	fn compare(
		&mut self,
		op: Op,
		args: &[TokenTree],
		env: &Env,
		holds: fn(Ordering) -> bool,
	) -> Result<Object, RuntimeError> {
		Arity::Exactly(2).check(op, args.len())?;

		let left = self.eval(&args[0], env)?;
		let right = self.eval(&args[1], env)?;

		let ordering = match (&left, &right) {
			(Object::Number(a), Object::Number(b)) => a.cmp(b),
			(Object::String(a), Object::String(b)) => a.cmp(b),
			_ if left.type_name() != right.type_name() => {
				return Err(RuntimeError::TypeMismatch { left: left.type_name(), right: right.type_name() });
			},
			_ => return Err(RuntimeError::UnsupportedType { proc: op.to_string(), ty: left.type_name() }),
		};

		Ok(Object::Bool(holds(ordering)))
	}

	fn equal(
		&mut self,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		Arity::Exactly(2).check(Op::EQ, args.len())?;

		let left = self.eval(&args[0], env)?;
		let right = self.eval(&args[1], env)?;

		let same = match (&left, &right) {
			(Object::Number(a), Object::Number(b)) => a == b,
			(Object::String(a), Object::String(b)) => a == b,
			(Object::Bool(a), Object::Bool(b)) => a == b,
			(Object::Symbol(a), Object::Symbol(b)) => a == b,
			_ if left.type_name() != right.type_name() => {
				return Err(RuntimeError::TypeMismatch { left: left.type_name(), right: right.type_name() });
			},
			_ => return Err(RuntimeError::UnsupportedType { proc: Op::EQ.to_string(), ty: left.type_name() }),
		};

		Ok(Object::Bool(same))
	}

	fn if_form(
		&mut self,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		Arity::Exactly(3).check(Op::IF, args.len())?;

		if self.eval(&args[0], env)?.is_truthy() {
			self.eval(&args[1], env)
		} else {
			self.eval(&args[2], env)
		}
	}

	fn define(
		&mut self,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		Arity::Exactly(2).check(Op::DEFINE, args.len())?;

		let name = match &args[0] {
			TokenTree::Atom(Atom::Ident(name)) => name,
			other => return Err(RuntimeError::MalformedDefine(other.to_string())),
		};

		let value = match self.eval(&args[1], env)? {
			Object::Lambda(lambda) => Object::Procedure { name: name.clone(), lambda },
			value => value,
		};

		tracing::debug!(%name, value = %value, "define");
		env.set(name.clone(), value.clone());

		Ok(value)
	}

	fn lambda(
		&mut self,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		Arity::AtLeast(2).check(Op::LAMBDA, args.len())?;

		let params = args[0].parameters().map_err(RuntimeError::MalformedLambda)?;

		tracing::debug!(?params, "closure created");

		Ok(Object::Lambda(Rc::new(Lambda { params, body: args[1..].to_vec(), env: env.clone() })))
	}

	fn rendered(
		&mut self,
		args: &[TokenTree],
		env: &Env,
	) -> Result<String, RuntimeError> {
		let parts = self.eval_all(args, env)?.iter().map(Object::inspect).collect::<Vec<_>>();
		Ok(parts.join(" "))
	}

	fn display(
		&mut self,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		let line = self.rendered(args, env)?;

		if !args.is_empty() {
			writeln!(self.out, "{line}")?;
		}

		Ok(Object::Nil)
	}

	fn printf(
		&mut self,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		let text = self.rendered(args, env)?;
		let text = Token::unescape(&text).map_err(RuntimeError::UnknownEscape)?;

		write!(self.out, "{text}")?;
		self.out.flush()?;

		Ok(Object::Nil)
	}

	fn first(
		&mut self,
		op: Op,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		Arity::Exactly(1).check(op, args.len())?;

		self.list_arg(op, &args[0], env)?
			.first()
			.cloned()
			.ok_or_else(|| RuntimeError::EmptyList { proc: op.to_string() })
	}

	fn rest(
		&mut self,
		op: Op,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		Arity::Exactly(1).check(op, args.len())?;

		Ok(Object::List(self.list_arg(op, &args[0], env)?.rest()))
	}

	/// Builds a new list; the argument list is left as it was.
	fn cons(
		&mut self,
		op: Op,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		Arity::Exactly(2).check(op, args.len())?;

		let head = self.eval(&args[0], env)?;
		let items = self.list_arg(op, &args[1], env)?;

		Ok(Object::List(items.cons(head)))
	}

	fn list_ref(
		&mut self,
		op: Op,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		Arity::Exactly(2).check(op, args.len())?;

		let items = self.list_arg(op, &args[0], env)?;
		let index = self.number_arg(op, &args[1], env)?;

		usize::try_from(index)
			.ok()
			.and_then(|i| items.get(i))
			.cloned()
			.ok_or_else(|| RuntimeError::IndexOutOfRange { index, len: items.len() })
	}
}
