//! in src/evaluator.rs
//!
//! Contains the logic for the evaluator that walks the AST to form the result

use crate::asth::{Atom, Program, TokenTree};
use crate::binds::Env;
use crate::error::{Arity, RuntimeError, SyntaxError};
use crate::object::{Lambda, List, Object};
use crate::parser::Parser;
use crate::MAX_EVAL_DEPTH;
use std::io::{self, Write};

/// Walks trees against an environment.
///
/// `display` and `printf` write to `out`. Nested evaluation deeper than
/// `max_depth` fails instead of exhausting the native stack.
pub struct Evaluator<W> {
	pub(crate) out: W,
	depth: usize,
	max_depth: usize,
}

impl Evaluator<io::Stdout> {
	pub fn stdout() -> Self {
		Self::new(io::stdout())
	}
}

impl<W: Write> Evaluator<W> {
	pub fn new(out: W) -> Self {
		Self { out, depth: 0, max_depth: MAX_EVAL_DEPTH }
	}

	pub fn with_max_depth(
		mut self,
		max_depth: usize,
	) -> Self {
		self.max_depth = max_depth;
		self
	}

	pub fn into_output(self) -> W {
		self.out
	}

	/// Parses and evaluates `source`.
	///
	/// Nothing is evaluated when parsing reported errors. A runtime failure
	/// comes back as an [`Object::Error`].
	pub fn run(
		&mut self,
		source: &str,
		env: &Env,
	) -> Result<Object, Vec<SyntaxError>> {
		let (program, errors) = Parser::new(source).parse_program();

		if !errors.is_empty() {
			return Err(errors);
		}

		Ok(self.eval_program(&program, env).unwrap_or_else(Object::from))
	}

	/// Evaluates top-level expressions left to right, stopping at the first error.
	pub fn eval_program(
		&mut self,
		program: &Program,
		env: &Env,
	) -> Result<Object, RuntimeError> {
		let mut last = Object::Nil;

		for expr in &program.exprs {
			tracing::trace!(%expr, "top-level expression");
			last = self.eval(expr, env)?;
		}

		Ok(last)
	}

	pub fn eval(
		&mut self,
		tree: &TokenTree,
		env: &Env,
	) -> Result<Object, RuntimeError> {
		if self.depth >= self.max_depth {
			return Err(RuntimeError::RecursionLimit(self.max_depth));
		}

		self.depth += 1;
		let result = self.eval_tree(tree, env);
		self.depth -= 1;

		result
	}

	fn eval_tree(
		&mut self,
		tree: &TokenTree,
		env: &Env,
	) -> Result<Object, RuntimeError> {
		match tree {
			TokenTree::Atom(atom) => match atom {
				Atom::Number(n) => Ok(Object::Number(*n)),
				Atom::String(s) => Ok(Object::String(s.clone())),
				Atom::Bool(b) => Ok(Object::Bool(*b)),
				Atom::Symbol(s) => Ok(Object::Symbol(s.clone())),
				Atom::Builtin(op) => Ok(Object::Builtin(*op)),
				Atom::Ident(name) => env.get(name).ok_or_else(|| RuntimeError::IdentifierNotFound(name.clone())),
			},
			TokenTree::Quoted(items) => self.eval_quoted(items, env),
			TokenTree::Form { head, rest } => {
				let callee = self.eval(head, env)?;

				match callee {
					Object::Builtin(op) => self.apply_builtin(op, rest, env),
					Object::Lambda(ref lambda) => self.apply_lambda(&callee.inspect(), lambda, rest, env),
					Object::Procedure { ref name, ref lambda } => self.apply_lambda(name, lambda, rest, env),
					_ => Err(RuntimeError::UnknownProcedure(head.to_string())),
				}
			},
		}
	}

	/// Names inside a quoted list become symbols instead of being looked up.
	/// Every other element, including a nested form, is evaluated.
	fn eval_quoted(
		&mut self,
		items: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		items
			.iter()
			.map(|item| match item {
				TokenTree::Atom(Atom::Ident(name)) => Ok(Object::Symbol(name.clone())),
				TokenTree::Atom(Atom::Builtin(op)) => Ok(Object::Symbol(op.to_string())),
				other => self.eval(other, env),
			})
			.collect::<Result<List, _>>()
			.map(Object::List)
	}

	/// Calls a closure.
	///
	/// Arguments are evaluated in the caller's scope. Parameters without an
	/// argument are bound to nil; surplus arguments are an arity error.
	fn apply_lambda(
		&mut self,
		name: &str,
		lambda: &Lambda,
		args: &[TokenTree],
		env: &Env,
	) -> Result<Object, RuntimeError> {
		if args.len() > lambda.params.len() {
			Arity::Exactly(lambda.params.len()).check(name, args.len())?;
		}

		tracing::trace!(procedure = name, args = args.len(), "apply");

		let values = args.iter().map(|arg| self.eval(arg, env)).collect::<Result<Vec<_>, _>>()?;

		let scope = Env::new_enclosed(&lambda.env);
		let mut values = values.into_iter();
		for param in &lambda.params {
			scope.set(param.clone(), values.next().unwrap_or(Object::Nil));
		}

		let mut last = Object::Nil;
		for expr in &lambda.body {
			last = self.eval(expr, &scope)?;
		}

		Ok(last)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn eval(source: &str) -> Object {
		let env = Env::new();
		Evaluator::new(Vec::new()).run(source, &env).unwrap()
	}

	#[test]
	fn literals_evaluate_to_themselves() {
		assert_eq!(eval("42"), Object::Number(42));
		assert_eq!(eval("\"hi\""), Object::String("hi".into()));
		assert_eq!(eval("#f"), Object::Bool(false));
		assert_eq!(eval("'sym"), Object::Symbol("sym".into()));
		assert_eq!(eval("+"), Object::Builtin(crate::asth::Op::PLUS));
	}

	#[test]
	fn empty_program_is_nil() {
		assert_eq!(eval("; nothing here"), Object::Nil);
	}

	#[test]
	fn quoted_lists_turn_names_into_symbols() {
		assert_eq!(
			eval("'(a 1 + \"s\" '(b))"),
			Object::List(
				vec![
					Object::Symbol("a".into()),
					Object::Number(1),
					Object::Symbol("+".into()),
					Object::String("s".into()),
					Object::List(vec![Object::Symbol("b".into())].into()),
				]
				.into()
			)
		);
	}

	#[test]
	fn forms_inside_quoted_lists_are_evaluated() {
		assert_eq!(eval("'(1 (+ 1 2))").inspect(), "'(1 3)");
		assert_eq!(eval("(first '((+ 1 2)))"), Object::Number(3));
		assert_eq!(eval("'(())").inspect(), "'('())");
		assert_eq!(eval("'(1 (nope))").inspect(), "ERROR: identifier not found: nope");
	}

	#[test]
	fn unknown_identifier() {
		assert_eq!(eval("nope").inspect(), "ERROR: identifier not found: nope");
	}

	#[test]
	fn unknown_procedure() {
		assert_eq!(eval("(5 1 2)").inspect(), "ERROR: unknown procedure: 5");
	}

	#[test]
	fn program_stops_at_first_error() {
		let env = Env::new();
		let result = Evaluator::new(Vec::new()).run("(define a 1) (+ a \"x\") (define b 2)", &env).unwrap();
		assert!(result.is_error());
		assert_eq!(env.get("a"), Some(Object::Number(1)));
		assert_eq!(env.get("b"), None);
	}

	#[test]
	fn immediate_lambda_application() {
		assert_eq!(eval("((lambda (x y) (+ x y)) 3 4)"), Object::Number(7));
	}

	#[test]
	fn missing_arguments_bind_nil() {
		assert_eq!(eval("((lambda (x y) y) 1)"), Object::Nil);
		assert_eq!(eval("((lambda (x y) (if y 1 2)) 1)"), Object::Number(2));
	}

	#[test]
	fn surplus_arguments_are_an_arity_error() {
		assert_eq!(
			eval("(define f (lambda (x) x)) (f 1 2)").inspect(),
			"ERROR: f expects 1 argument, got 2"
		);
	}

	#[test]
	fn body_runs_in_sequence() {
		let env = Env::new();
		let mut evaluator = Evaluator::new(Vec::new());
		let result = evaluator.run("((lambda () (display 1) (display 2) 3))", &env).unwrap();
		assert_eq!(result, Object::Number(3));
		assert_eq!(String::from_utf8(evaluator.into_output()).unwrap(), "1\n2\n");
	}

	#[test]
	fn call_scope_does_not_leak() {
		let env = Env::new();
		let result = Evaluator::new(Vec::new()).run("(define f (lambda (x) x)) (f 1) x", &env).unwrap();
		assert_eq!(result.inspect(), "ERROR: identifier not found: x");
	}

	#[test]
	fn runaway_recursion_is_reported() {
		let env = Env::new();
		let mut evaluator = Evaluator::new(Vec::new()).with_max_depth(64);
		let result = evaluator.run("(define loop (lambda (n) (loop n))) (loop 1)", &env).unwrap();
		assert_eq!(result.inspect(), "ERROR: maximum recursion depth of 64 exceeded");

		// the depth counter unwinds with the error
		assert_eq!(evaluator.run("(+ 1 1)", &env).unwrap(), Object::Number(2));
	}

	#[test]
	fn syntax_errors_prevent_evaluation() {
		let env = Env::new();
		let errors = Evaluator::new(Vec::new()).run("(define a 1) (+ 1", &env).unwrap_err();
		assert_eq!(errors.len(), 1);
		assert_eq!(env.get("a"), None);
	}
}
