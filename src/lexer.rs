use crate::error::SyntaxError;
use crate::token_type::{Token, TokenType};
use miette::SourceSpan;

/// The `Lexer` struct is responsible for tokenizing the input string.
/// It holds the entire input string, the remaining unprocessed part of the string,
/// and the current byte index for tracking the position in the string.
/// The `Lexer` struct implements the `Iterator` trait, allowing it to produce tokens one at a time.
///
/// Whitespace and `;` line comments are skipped. A character that starts no
/// token comes out as an `Err` item; the lexer keeps going after it.
#[derive(Debug)]
pub struct Lexer<'de> {
	/// holds the entire String
	whole: &'de str,
	/// holds the remainder of the String
	rest: &'de str,
	/// to keep track of the index we're at
	byte: usize,
	/// holds the peeked token -- used for lookahead
	peeked: Option<Result<Token<'de>, SyntaxError>>,
}

impl<'de> Lexer<'de> {
	/// Creates a new `Lexer` instance over the given input string.
	pub fn new(input: &'de str) -> Self {
		Self { whole: input, rest: input, byte: 0, peeked: None }
	}

	/// helper function for peeking into the Lexer tokens
	///
	/// peeks one Token not a character
	pub fn peek(&mut self) -> Option<&Result<Token<'de>, SyntaxError>> {
		if self.peeked.is_some() {
			return self.peeked.as_ref();
		}

		self.peeked = self.next();

		self.peeked.as_ref()
	}

	/// The end-of-input token, positioned after the last byte.
	pub fn eof(&self) -> Token<'de> {
		Token { origin: &self.whole[self.whole.len()..], offset: self.whole.len(), kind: TokenType::EOF }
	}

	/// Advances over `len` bytes of `self.rest` and returns them.
	fn consume(
		&mut self,
		len: usize,
	) -> &'de str {
		let taken = &self.rest[..len];
		self.rest = &self.rest[len..];
		self.byte += len;
		taken
	}
}

fn is_ident_start(c: char) -> bool {
	matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_ident_continue(c: char) -> bool {
	matches!(c, 'a'..='z' | 'A'..='Z' | '_' | '-' | '/')
}

impl<'de> Iterator for Lexer<'de> {
	type Item = Result<Token<'de>, SyntaxError>;

	/// actual lexing happens here
	fn next(&mut self) -> Option<Self::Item> {
		if let Some(next) = self.peeked.take() {
			return Some(next);
		}

		loop {
			// must be inside the loop .. since we use chars with byte_index and self.rest updates based on this
			let mut chars = self.rest.chars();

			let c = chars.next()?;
			// `c_at` is the byte-index where this character begins at the string
			let c_at = self.byte;
			let c_str = &self.rest[..c.len_utf8()];
			// holds self.rest, starting at c
			let c_onwards = self.rest;
			// the character right after c, for the two character decisions
			let c_next = chars.clone().next();

			self.rest = chars.as_str();
			self.byte += c.len_utf8();

			/// these are multi character tokens
			enum Started {
				/// String character tokens set
				String,
				/// set of number characters, possibly behind a `-`
				Number,
				/// set of characters forming an identifier or keyword
				Ident,
				/// a `'` directly followed by an identifier
				Symbol,
				/// `#t` and `#f`
				Hash,
				/// represents <=, <, >=, >
				IfEqualElse(TokenType, TokenType),
				/// a `;` comment running to the end of the line
				Comment,
			}

			let just = move |kind: TokenType| Some(Ok(Token { kind, offset: c_at, origin: c_str }));

			let started = match c {
				'(' => return just(TokenType::LEFT_PAREN),
				')' => return just(TokenType::RIGHT_PAREN),
				'+' => return just(TokenType::PLUS),
				'*' => return just(TokenType::STAR),
				'/' => return just(TokenType::SLASH),
				'=' => return just(TokenType::EQ),
				'-' if c_next.is_some_and(|n| n.is_ascii_digit()) => Started::Number,
				'-' => return just(TokenType::MINUS),
				'\'' if c_next.is_some_and(is_ident_start) => Started::Symbol,
				'\'' => return just(TokenType::TICK),
				c if c.is_whitespace() => continue,
				';' => Started::Comment,
				'"' => Started::String,
				'#' => Started::Hash,
				'0'..='9' => Started::Number,
				c if is_ident_start(c) => Started::Ident,
				'<' => Started::IfEqualElse(TokenType::LESS_EQUAL, TokenType::LESS),
				'>' => Started::IfEqualElse(TokenType::GREATER_EQUAL, TokenType::GREATER),

				_ => {
					return Some(Err(SyntaxError::UnexpectedCharacter {
						token: c,
						src: self.whole.to_string(),
						err_span: SourceSpan::from(c_at..self.byte),
					}));
				},
			};

			break match started {
				Started::Comment => {
					// the newline itself is whitespace and gets skipped on the next round
					let line_end = self.rest.find('\n').unwrap_or(self.rest.len());
					self.consume(line_end);

					continue;
				},
				Started::IfEqualElse(yes, no) => {
					if self.rest.starts_with('=') {
						self.consume(1);

						Some(Ok(Token { kind: yes, offset: c_at, origin: &c_onwards[..2] }))
					} else {
						Some(Ok(Token { kind: no, offset: c_at, origin: c_str }))
					}
				},
				Started::Hash => match c_next {
					Some('t') => {
						self.consume(1);
						Some(Ok(Token { kind: TokenType::TRUE, offset: c_at, origin: &c_onwards[..2] }))
					},
					Some('f') => {
						self.consume(1);
						Some(Ok(Token { kind: TokenType::FALSE, offset: c_at, origin: &c_onwards[..2] }))
					},
					_ => Some(Err(SyntaxError::UnexpectedCharacter {
						token: c,
						src: self.whole.to_string(),
						err_span: SourceSpan::from(c_at..self.byte),
					})),
				},
				Started::String => {
					if let Some(end) = self.rest.find('"') {
						// include the quotes on both ends
						self.consume(end + 1);
						let literal = &c_onwards[..end + 2];

						Some(Ok(Token { kind: TokenType::STRING, offset: c_at, origin: literal }))
					} else {
						let e = SyntaxError::UnterminatedString {
							src: self.whole.to_string(),
							err_span: SourceSpan::from(c_at..self.whole.len()),
						};

						self.consume(self.rest.len());

						Some(Err(e))
					}
				},
				Started::Symbol => {
					let len = self.rest.find(|c| !is_ident_continue(c)).unwrap_or(self.rest.len());
					self.consume(len);

					Some(Ok(Token { kind: TokenType::SYMBOL, offset: c_at, origin: &c_onwards[..len + 1] }))
				},
				Started::Ident => {
					let len = self.rest.find(|c| !is_ident_continue(c)).unwrap_or(self.rest.len());
					self.consume(len);

					let literal = &c_onwards[..len + c.len_utf8()];

					Some(Ok(Token { kind: TokenType::keyword(literal), offset: c_at, origin: literal }))
				},
				Started::Number => {
					// digits only, a leading `-` has already been consumed
					let len = self.rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(self.rest.len());
					self.consume(len);

					Some(Ok(Token { kind: TokenType::NUMBER, offset: c_at, origin: &c_onwards[..len + 1] }))
				},
			};
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(input: &str) -> Vec<TokenType> {
		Lexer::new(input).map(|t| t.unwrap().kind).collect()
	}

	#[test]
	fn punctuation_and_operators() {
		assert_eq!(kinds("( ) + - * / = '"), vec![
			TokenType::LEFT_PAREN,
			TokenType::RIGHT_PAREN,
			TokenType::PLUS,
			TokenType::MINUS,
			TokenType::STAR,
			TokenType::SLASH,
			TokenType::EQ,
			TokenType::TICK,
		]);
	}

	#[test]
	fn comparison_operators() {
		assert_eq!(kinds("< <= > >="), vec![
			TokenType::LESS,
			TokenType::LESS_EQUAL,
			TokenType::GREATER,
			TokenType::GREATER_EQUAL,
		]);
	}

	#[test]
	fn hash_booleans_are_not_comparisons() {
		assert_eq!(kinds(">#t #f"), vec![TokenType::GREATER, TokenType::TRUE, TokenType::FALSE]);
	}

	#[test]
	fn negative_numbers_and_minus() {
		let tokens: Vec<_> = Lexer::new("(- -12 3)").map(|t| t.unwrap()).collect();
		assert_eq!(tokens[1].kind, TokenType::MINUS);
		assert_eq!(tokens[2].kind, TokenType::NUMBER);
		assert_eq!(tokens[2].origin, "-12");
		assert_eq!(tokens[3].origin, "3");
	}

	#[test]
	fn keywords_and_identifiers() {
		assert_eq!(kinds("list-ref define my-var a/b true"), vec![
			TokenType::LIST_REF,
			TokenType::DEFINE,
			TokenType::IDENT,
			TokenType::IDENT,
			TokenType::TRUE,
		]);
	}

	#[test]
	fn digits_end_an_identifier() {
		let tokens: Vec<_> = Lexer::new("x1 'y2").map(|t| t.unwrap()).collect();
		let shape: Vec<_> = tokens.iter().map(|t| (t.kind, t.origin)).collect();
		assert_eq!(shape, vec![
			(TokenType::IDENT, "x"),
			(TokenType::NUMBER, "1"),
			(TokenType::SYMBOL, "'y"),
			(TokenType::NUMBER, "2"),
		]);
	}

	#[test]
	fn symbols_and_quoted_lists() {
		let tokens: Vec<_> = Lexer::new("'foo '(1)").map(|t| t.unwrap()).collect();
		assert_eq!(tokens[0].kind, TokenType::SYMBOL);
		assert_eq!(tokens[0].literal(), "foo");
		assert_eq!(tokens[1].kind, TokenType::TICK);
		assert_eq!(tokens[2].kind, TokenType::LEFT_PAREN);
	}

	#[test]
	fn strings_are_copied_raw() {
		let tokens: Vec<_> = Lexer::new(r#""a \n b" x"#).map(|t| t.unwrap()).collect();
		assert_eq!(tokens[0].kind, TokenType::STRING);
		assert_eq!(tokens[0].literal(), r"a \n b");
		assert_eq!(tokens[1].offset, 9);
	}

	#[test]
	fn comments_are_skipped() {
		assert_eq!(kinds("; a comment\n(+ 1 2) ; trailing\n; last"), vec![
			TokenType::LEFT_PAREN,
			TokenType::PLUS,
			TokenType::NUMBER,
			TokenType::NUMBER,
			TokenType::RIGHT_PAREN,
		]);
	}

	#[test]
	fn illegal_characters_do_not_stop_lexing() {
		let items: Vec<_> = Lexer::new("1 @ 2").collect();
		assert_eq!(items.len(), 3);
		assert!(matches!(items[1], Err(SyntaxError::UnexpectedCharacter { token: '@', .. })));
		assert_eq!(items[2].as_ref().unwrap().origin, "2");
	}

	#[test]
	fn unterminated_string() {
		let items: Vec<_> = Lexer::new("\"abc").collect();
		assert_eq!(items.len(), 1);
		assert!(matches!(items[0], Err(SyntaxError::UnterminatedString { .. })));
	}

	#[test]
	fn peek_does_not_consume() {
		let mut lexer = Lexer::new("a b");
		assert_eq!(lexer.peek().unwrap().as_ref().unwrap().origin, "a");
		assert_eq!(lexer.next().unwrap().unwrap().origin, "a");
		assert_eq!(lexer.next().unwrap().unwrap().origin, "b");
		assert!(lexer.next().is_none());
		assert_eq!(lexer.eof().kind, TokenType::EOF);
	}
}
