use std::borrow::Cow;
use std::fmt::{self};

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'de> {
	/// holds the characters as &str
	pub origin: &'de str,
	/// byte offset of `origin` inside the whole source
	pub offset: usize,
	/// holds the type
	pub kind: TokenType,
}

/// The `TokenType` enum represents the different types of tokens that can be recognized by the lexer.
/// Keywords and operators double as references to built-in procedures.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
	// Punctuation.
	LEFT_PAREN,
	RIGHT_PAREN,
	TICK,

	// Operators.
	PLUS,
	MINUS,
	STAR,
	SLASH,
	LESS,
	LESS_EQUAL,
	GREATER,
	GREATER_EQUAL,

	// Literals.
	IDENT,
	SYMBOL,
	STRING,
	NUMBER,
	TRUE,
	FALSE,

	// Keywords.
	LAMBDA,
	IF,
	DEFINE,
	DISPLAY,
	PRINTF,
	LIST,
	EQ,
	FIRST,
	REST,
	CONS,
	LENGTH,
	LIST_REF,
	BEGIN,

	EOF,
}

impl TokenType {
	/// Resolves an identifier against the fixed keyword table.
	pub fn keyword(ident: &str) -> TokenType {
		match ident {
			"true" => TokenType::TRUE,
			"false" => TokenType::FALSE,
			"lambda" => TokenType::LAMBDA,
			"if" => TokenType::IF,
			"define" => TokenType::DEFINE,
			"display" => TokenType::DISPLAY,
			"printf" => TokenType::PRINTF,
			"list" => TokenType::LIST,
			"eq" => TokenType::EQ,
			"first" => TokenType::FIRST,
			"rest" => TokenType::REST,
			"cons" => TokenType::CONS,
			"length" => TokenType::LENGTH,
			"list-ref" => TokenType::LIST_REF,
			"begin" => TokenType::BEGIN,
			_ => TokenType::IDENT,
		}
	}
}

impl Token<'_> {
	/// The meaningful text of the token.
	///
	/// Strings lose their surrounding quotes and symbols lose their tick,
	/// everything else is returned as written.
	pub fn literal(&self) -> &str {
		match self.kind {
			TokenType::STRING => {
				let inner = self.origin.strip_prefix('"').unwrap_or(self.origin);
				inner.strip_suffix('"').unwrap_or(inner)
			},
			TokenType::SYMBOL => self.origin.strip_prefix('\'').unwrap_or(self.origin),
			_ => self.origin,
		}
	}

	/// Processes backslash escapes used by `printf`.
	///
	/// Borrows when there is nothing to replace. Returns the offending
	/// character when an unknown escape is found.
	pub fn unescape(s: &str) -> Result<Cow<'_, str>, char> {
		if !s.contains('\\') {
			return Ok(Cow::Borrowed(s));
		}

		let mut out = String::with_capacity(s.len());
		let mut chars = s.chars();

		while let Some(c) = chars.next() {
			if c != '\\' {
				out.push(c);
				continue;
			}

			match chars.next() {
				Some('n') => out.push('\n'),
				Some('t') => out.push('\t'),
				Some('\\') => out.push('\\'),
				Some('"') => out.push('"'),
				Some(other) => return Err(other),
				None => return Err('\\'),
			}
		}

		Ok(Cow::Owned(out))
	}
}

impl fmt::Display for Token<'_> {
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		let origin = self.origin;
		match self.kind {
			TokenType::STRING | TokenType::SYMBOL | TokenType::NUMBER => {
				write!(f, "{:?} {origin} {}", self.kind, self.literal())
			},
			TokenType::EOF => write!(f, "EOF  null"),
			kind => write!(f, "{kind:?} {origin} null"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keywords_resolve() {
		assert_eq!(TokenType::keyword("list-ref"), TokenType::LIST_REF);
		assert_eq!(TokenType::keyword("true"), TokenType::TRUE);
		assert_eq!(TokenType::keyword("listref"), TokenType::IDENT);
	}

	#[test]
	fn literal_strips_quotes_and_tick() {
		let s = Token { origin: "\"hi there\"", offset: 0, kind: TokenType::STRING };
		assert_eq!(s.literal(), "hi there");

		let sym = Token { origin: "'abc", offset: 0, kind: TokenType::SYMBOL };
		assert_eq!(sym.literal(), "abc");
		assert_eq!(sym.to_string(), "SYMBOL 'abc abc");
	}

	#[test]
	fn unescape_handles_known_escapes() {
		assert!(matches!(Token::unescape("plain"), Ok(Cow::Borrowed("plain"))));
		assert_eq!(Token::unescape(r"a\nb\t\\").unwrap(), "a\nb\t\\");
		assert_eq!(Token::unescape(r"bad\q"), Err('q'));
	}
}
