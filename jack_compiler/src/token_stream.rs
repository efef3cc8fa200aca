//! Cursor over a lexed token sequence.
use crate::{
    error::SyntaxError,
    tokens::{Span, Token, TokenKind},
};

/// Token sequence with an explicit cursor, allowing the
/// parser to look ahead and consume tokens one at a time.
///
/// The sequence always ends with an end-of-source token. The
/// cursor never moves past it, so peeking is always valid.
pub struct TokenStream {
    tokens: Vec<Token>,
    /// Index of the current token.
    cursor: usize,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EOS) {
            let span = match tokens.last() {
                Some(last) => Span::new(last.span.end(), 0, last.span.line, last.span.column),
                None => Span::new(0, 0, 1, 1),
            };
            tokens.push(Token {
                kind: TokenKind::EOS,
                lexeme: Default::default(),
                span,
            });
        }

        Self { tokens, cursor: 0 }
    }

    /// Return the current token without advancing the cursor.
    #[inline]
    pub fn peek(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    /// Return the current token kind without advancing the cursor.
    #[inline]
    pub fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Look ahead `n` tokens past the current one.
    ///
    /// Clamps to the end-of-source token.
    pub fn peek_nth(&self, n: usize) -> &Token {
        let index = (self.cursor + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Consumes the current token regardless of kind.
    pub fn next_token(&mut self) -> Token {
        let token = self.tokens[self.cursor].clone();
        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }
        token
    }

    /// Consumes the current token if it matches the given token kind.
    ///
    /// Returns true when matched. Does not consume the token
    /// if the kinds do not match.
    pub fn match_token(&mut self, token_kind: TokenKind) -> bool {
        let is_match = self.peek_kind() == token_kind;
        if is_match {
            self.next_token();
        }
        is_match
    }

    /// Return the current token and advance the cursor.
    ///
    /// The consumed token must match the given token kind, otherwise
    /// a syntax error is returned and the cursor is not advanced.
    pub fn consume(&mut self, token_kind: TokenKind) -> Result<Token, SyntaxError> {
        if self.peek_kind() == token_kind {
            Ok(self.next_token())
        } else {
            Err(self.unexpected(token_kind))
        }
    }

    /// Consume an identifier, describing it as `expected` on failure.
    pub fn consume_ident(&mut self, expected: &str) -> Result<Token, SyntaxError> {
        if self.peek_kind() == TokenKind::Ident {
            Ok(self.next_token())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Build an error pointing at the current token.
    #[cold]
    pub fn unexpected(&self, expected: impl ToString) -> SyntaxError {
        let token = self.peek();
        SyntaxError {
            span: token.span.clone(),
            expected: expected.to_string(),
            found: token.describe(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        lex::tokenize,
        tokens::{Keyword, Symbol},
    };

    fn stream(source: &str) -> TokenStream {
        TokenStream::new(tokenize(source).unwrap())
    }

    #[test]
    fn test_consume() {
        let mut input = stream("let x;");
        assert!(input.consume(TokenKind::Keyword(Keyword::Let)).is_ok());
        assert_eq!(input.consume_ident("variable name").unwrap().lexeme, "x");

        let err = input.consume(TokenKind::Symbol(Symbol::Eq)).unwrap_err();
        assert_eq!(err.expected, "'='");
        assert_eq!(err.found, "';'");
        assert_eq!(err.span.column, 6);

        // Cursor was not advanced by the failed consume.
        assert!(input.match_token(TokenKind::Symbol(Symbol::Semicolon)));
        assert_eq!(input.peek_kind(), TokenKind::EOS);
    }

    #[test]
    fn test_cursor_stops_at_end() {
        let mut input = stream("x");
        assert_eq!(input.next_token().kind, TokenKind::Ident);
        assert_eq!(input.next_token().kind, TokenKind::EOS);
        assert_eq!(input.next_token().kind, TokenKind::EOS);
        assert_eq!(input.peek_nth(10).kind, TokenKind::EOS);

        let err = input.consume_ident("class name").unwrap_err();
        assert_eq!(err.expected, "class name");
        assert_eq!(err.found, "end of source");
    }

    #[test]
    fn test_peek_nth() {
        let input = stream("a . b");
        assert_eq!(input.peek_nth(1).kind, TokenKind::Symbol(Symbol::Dot));
        assert_eq!(input.peek_nth(2).lexeme, "b");
    }

    #[test]
    fn test_empty_sequence_gets_eos() {
        let input = TokenStream::new(vec![]);
        assert_eq!(input.peek_kind(), TokenKind::EOS);
    }
}
