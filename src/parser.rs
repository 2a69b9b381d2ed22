// src/parser.rs
//
// Recursive descent over the token stream with one token of lookahead.
use crate::asth::{Atom, Op, Program, TokenTree};
use crate::error::SyntaxError;
use crate::lexer::Lexer;
use crate::token_type::{Token, TokenType};
use crate::MAX_PARSE_DEPTH;
use miette::SourceSpan;

/// defines the Parser Struct
///
/// Errors are collected instead of returned so one bad expression does not
/// hide the rest of the input.
pub struct Parser<'de> {
	/// contains the input string
	pub whole: &'de str,
	/// holds the lexer::Lexer
	pub lexer: Lexer<'de>,
	/// the token being parsed
	cur: Token<'de>,
	/// the token after `cur`
	peek: Token<'de>,
	/// lexical errors found just before `peek`
	peek_errors: Vec<SyntaxError>,
	errors: Vec<SyntaxError>,
	/// open lists and forms around `cur`
	depth: usize,
}

impl<'de> Parser<'de> {
	/// creates a new Parser, primed with the first two tokens
	pub fn new(input: &'de str) -> Self {
		let lexer = Lexer::new(input);
		let eof = lexer.eof();

		let mut parser = Self { whole: input, lexer, cur: eof.clone(), peek: eof, peek_errors: Vec::new(), errors: Vec::new(), depth: 0 };

		parser.next_token();
		parser.next_token();
		parser
	}

	/// Parses every top-level expression of the input.
	pub fn parse_program(mut self) -> (Program, Vec<SyntaxError>) {
		let mut program = Program::default();

		while self.cur.kind != TokenType::EOF {
			if let Some(expr) = self.parse_expression() {
				program.exprs.push(expr);
			}
			self.next_token();
		}

		(program, self.errors)
	}

	/// Shifts the lookahead window by one token.
	///
	/// Input the lexer could not read is skipped. Its errors are recorded once
	/// the token after it becomes `cur`, which keeps them in source order.
	fn next_token(&mut self) {
		let mut skipped = Vec::new();

		let upcoming = loop {
			match self.lexer.next() {
				Some(Ok(token)) => break token,
				Some(Err(e)) => skipped.push(e),
				None => break self.lexer.eof(),
			}
		};

		self.cur = std::mem::replace(&mut self.peek, upcoming);

		for e in std::mem::replace(&mut self.peek_errors, skipped) {
			self.record(e);
		}
	}

	fn record(
		&mut self,
		e: SyntaxError,
	) {
		tracing::debug!(error = %e, "syntax error");
		self.errors.push(e);
	}

	fn span_of(token: &Token<'_>) -> SourceSpan {
		SourceSpan::from(token.offset..token.offset + token.origin.len())
	}

	fn unexpected(
		&mut self,
		token: &Token<'de>,
	) {
		let found = if token.kind == TokenType::EOF { "end of input".to_string() } else { token.origin.to_string() };

		self.record(SyntaxError::UnexpectedToken { found, src: self.whole.to_string(), err_span: Self::span_of(token) });
	}

	/// Parses the expression starting at `cur`.
	///
	/// Leaves `cur` on the last token of the expression. Returns `None` when
	/// an error was recorded.
	fn parse_expression(&mut self) -> Option<TokenTree> {
		let token = self.cur.clone();

		let atom = match token.kind {
			TokenType::NUMBER => match token.origin.parse::<i64>() {
				Ok(n) => Atom::Number(n),
				Err(_) => {
					self.record(SyntaxError::InvalidNumber {
						literal: token.origin.to_string(),
						src: self.whole.to_string(),
						err_span: Self::span_of(&token),
					});
					return None;
				},
			},
			TokenType::STRING => Atom::String(token.literal().to_string()),
			TokenType::TRUE => Atom::Bool(true),
			TokenType::FALSE => Atom::Bool(false),
			TokenType::SYMBOL => Atom::Symbol(token.literal().to_string()),
			TokenType::IDENT => Atom::Ident(token.origin.to_string()),

			TokenType::TICK => return self.parse_quoted(),
			TokenType::LEFT_PAREN => return self.parse_nested(Self::parse_form),

			kind => match Op::from_token(kind) {
				Some(op) => Atom::Builtin(op),
				None => {
					self.unexpected(&token);
					return None;
				},
			},
		};

		Some(TokenTree::Atom(atom))
	}

	/// `'( ... )` with `cur` on the tick.
	fn parse_quoted(&mut self) -> Option<TokenTree> {
		if self.peek.kind != TokenType::LEFT_PAREN {
			let found = if self.peek.kind == TokenType::EOF { "end of input".to_string() } else { self.peek.origin.to_string() };

			self.record(SyntaxError::ExpectedQuotedList {
				found,
				src: self.whole.to_string(),
				err_span: Self::span_of(&self.cur),
			});
			return None;
		}

		self.next_token();
		self.parse_nested(Self::parse_datum_list)
	}

	/// Runs `parse` on the group opening at `cur`, one level deeper.
	///
	/// Past `MAX_PARSE_DEPTH` the whole group is skipped and reported once.
	fn parse_nested(
		&mut self,
		parse: fn(&mut Self) -> Option<TokenTree>,
	) -> Option<TokenTree> {
		if self.depth >= MAX_PARSE_DEPTH {
			let err_span = Self::span_of(&self.cur);
			self.record(SyntaxError::TooDeeplyNested { max: MAX_PARSE_DEPTH, src: self.whole.to_string(), err_span });
			self.skip_group();
			return None;
		}

		self.depth += 1;
		let tree = parse(self);
		self.depth -= 1;

		tree
	}

	/// Leaves `cur` on the `)` closing the group that opens at `cur`, or at
	/// the end of input.
	fn skip_group(&mut self) {
		let mut open = 0usize;

		loop {
			match self.cur.kind {
				TokenType::LEFT_PAREN => open += 1,
				TokenType::RIGHT_PAREN if open <= 1 => return,
				TokenType::RIGHT_PAREN => open -= 1,
				TokenType::EOF => return,
				_ => {},
			}
			self.next_token();
		}
	}

	/// Elements of a quoted list, with `cur` on its `(`.
	fn parse_datum_list(&mut self) -> Option<TokenTree> {
		let open = self.cur.clone();
		let mut items = Vec::new();
		let mut ok = true;

		self.next_token();

		loop {
			match self.cur.kind {
				TokenType::RIGHT_PAREN => break,
				TokenType::EOF => {
					self.missing_close(&open);
					return None;
				},
				_ => match self.parse_expression() {
					Some(item) => items.push(item),
					None => ok = false,
				},
			}
			self.next_token();
		}

		ok.then_some(TokenTree::Quoted(items))
	}

	/// `(head rest...)` with `cur` on the `(`.
	fn parse_form(&mut self) -> Option<TokenTree> {
		let open = self.cur.clone();

		self.next_token();

		match self.cur.kind {
			TokenType::RIGHT_PAREN => return Some(TokenTree::Quoted(Vec::new())),
			TokenType::EOF => {
				self.missing_close(&open);
				return None;
			},
			_ => {},
		}

		let head = self.parse_expression();
		let mut ok = head.is_some();
		let mut rest = Vec::new();

		self.next_token();

		loop {
			match self.cur.kind {
				TokenType::RIGHT_PAREN => break,
				TokenType::EOF => {
					self.missing_close(&open);
					return None;
				},
				_ => {},
			}

			match self.parse_expression() {
				Some(expr) => rest.push(expr),
				None => ok = false,
			}
			self.next_token();
		}

		let head = head.filter(|_| ok)?;

		if head == TokenTree::Atom(Atom::Builtin(Op::LAMBDA)) {
			let shape = match rest.first() {
				Some(params) if rest.len() >= 2 => params.parameters().map(|_| ()),
				_ => Err("lambda expects a parameter list followed by a body".to_string()),
			};

			if let Err(reason) = shape {
				let end = self.cur.offset + self.cur.origin.len();
				self.record(SyntaxError::MalformedLambda {
					reason,
					src: self.whole.to_string(),
					err_span: SourceSpan::from(open.offset..end),
				});
				return None;
			}
		}

		Some(TokenTree::Form { head: Box::new(head), rest })
	}

	fn missing_close(
		&mut self,
		open: &Token<'de>,
	) {
		self.record(SyntaxError::MissingCloseParen { src: self.whole.to_string(), err_span: Self::span_of(open) });
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(input: &str) -> (Program, Vec<SyntaxError>) {
		Parser::new(input).parse_program()
	}

	fn render(input: &str) -> String {
		let (program, errors) = parse(input);
		assert!(errors.is_empty(), "unexpected errors: {errors:?}");
		program.to_string()
	}

	#[test]
	fn atoms() {
		assert_eq!(render("1 -2 \"s\" #t false 'sym x +"), "1\n-2\n\"s\"\n#t\n#f\n'sym\nx\n+\n");
	}

	#[test]
	fn forms_and_nesting() {
		assert_eq!(render("(define sq (lambda (x) (* x x)))"), "(define sq (lambda (x) (* x x)))\n");
	}

	#[test]
	fn quoted_lists_hold_forms_and_nested_lists() {
		let (program, errors) = parse("'(1 '(2 3) a (+ 1 2))");
		assert!(errors.is_empty());
		assert_eq!(
			program.exprs[0],
			TokenTree::Quoted(vec![
				TokenTree::Atom(Atom::Number(1)),
				TokenTree::Quoted(vec![TokenTree::Atom(Atom::Number(2)), TokenTree::Atom(Atom::Number(3))]),
				TokenTree::Atom(Atom::Ident("a".into())),
				TokenTree::Form {
					head: Box::new(TokenTree::Atom(Atom::Builtin(Op::PLUS))),
					rest: vec![TokenTree::Atom(Atom::Number(1)), TokenTree::Atom(Atom::Number(2))],
				},
			])
		);
	}

	#[test]
	fn unclosed_deep_nesting_is_an_error() {
		let (program, errors) = parse(&"(".repeat(100_000));
		assert!(program.exprs.is_empty());
		assert!(matches!(errors[0], SyntaxError::TooDeeplyNested { max: MAX_PARSE_DEPTH, .. }));
		assert_eq!(errors.iter().filter(|e| matches!(e, SyntaxError::TooDeeplyNested { .. })).count(), 1);
	}

	#[test]
	fn balanced_deep_nesting_is_skipped_as_one_error() {
		let depth = 20_000;
		let source = format!("'{}{} 7", "(".repeat(depth), ")".repeat(depth));
		let (program, errors) = parse(&source);

		assert_eq!(errors.len(), 1);
		assert_eq!(errors[0].to_string(), format!("Expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"));
		assert_eq!(program.to_string(), "7\n");
	}

	#[test]
	fn nesting_up_to_the_limit_parses() {
		let depth = MAX_PARSE_DEPTH;
		let source = format!("{}+{}", "(".repeat(depth), ")".repeat(depth));
		let (program, errors) = parse(&source);

		assert!(errors.is_empty(), "{errors:?}");
		assert_eq!(program.exprs.len(), 1);

		let source = format!("{}+{}", "(".repeat(depth + 1), ")".repeat(depth + 1));
		let (_, errors) = parse(&source);
		assert_eq!(errors.len(), 1);
	}

	#[test]
	fn empty_parens_are_the_empty_list() {
		let (program, errors) = parse("()");
		assert!(errors.is_empty());
		assert_eq!(program.exprs, vec![TokenTree::Quoted(vec![])]);
	}

	#[test]
	fn bad_number_does_not_stop_parsing() {
		let (program, errors) = parse("99999999999999999999 (+ 1 2)");
		assert_eq!(errors.len(), 1);
		assert_eq!(errors[0].to_string(), "Could not parse 99999999999999999999 as integer");
		assert_eq!(program.exprs.len(), 1);
	}

	#[test]
	fn missing_close_paren_is_reported() {
		let (program, errors) = parse("(+ 1 2");
		assert!(program.exprs.is_empty());
		assert_eq!(errors.len(), 1);
		assert!(matches!(errors[0], SyntaxError::MissingCloseParen { .. }));
	}

	#[test]
	fn every_unclosed_paren_is_reported() {
		let (_, errors) = parse("(+ (* 2 3");
		assert_eq!(errors.len(), 2);
	}

	#[test]
	fn stray_close_paren() {
		let (program, errors) = parse(") 5");
		assert_eq!(errors.len(), 1);
		assert_eq!(errors[0].to_string(), "Unexpected token )");
		assert_eq!(program.exprs.len(), 1);
	}

	#[test]
	fn malformed_lambdas() {
		let (_, errors) = parse("(lambda x x)");
		assert_eq!(errors[0].to_string(), "Malformed lambda: lambda expects first argument to be a list, got x");

		let (_, errors) = parse("(lambda (x 1) x)");
		assert_eq!(errors[0].to_string(), "Malformed lambda: all parameters should be identifiers, got 1");

		let (_, errors) = parse("(lambda (x))");
		assert_eq!(errors[0].to_string(), "Malformed lambda: lambda expects a parameter list followed by a body");
	}

	#[test]
	fn illegal_characters_are_collected() {
		let (program, errors) = parse("(+ 1 @ 2) $");
		assert_eq!(errors.len(), 2);
		assert_eq!(program.to_string(), "(+ 1 2)\n");
	}

	#[test]
	fn tick_without_list() {
		let (_, errors) = parse("' 5");
		assert_eq!(errors[0].to_string(), "Expected ( after ', got 5");
	}
}
