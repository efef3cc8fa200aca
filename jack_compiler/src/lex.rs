//! Lexical analysis (tokenizer)
use crate::{
    error::{LexError, LexErrorKind},
    tokens::{Keyword, Span, Symbol, Token, TokenKind},
};

use itertools::{multipeek, MultiPeek};
use std::{
    iter::Iterator,
    str::{CharIndices, FromStr},
};

/// Largest integer constant that fits in a VM word.
pub const MAX_INT: u32 = 32767;

/// Scan the whole source into a sequence of tokens.
///
/// The sequence is always terminated by a single [`TokenKind::EOS`] token.
/// Scanning stops at the first malformed token.
pub fn tokenize(source_code: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source_code).collect()
}

/// Lexical analyzer.
pub struct Lexer<'a> {
    source: SourceText<'a>,
    token_start: SourcePos,
    /// Set once end-of-source or an error has been produced.
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        let source = SourceText::new(source_code);
        let token_start = source.pos;

        Self {
            source,
            token_start,
            done: false,
        }
    }

    /// Scan the source characters and construct the next token.
    ///
    /// Whitespace and comments preceding the token are erased. Once the
    /// source is exhausted every call returns an end-of-source token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        use TokenKind as T;

        self.skip_trivia()?;
        self.start_token();

        match self.source.next_char() {
            Some('"') => self.consume_string(),
            Some(c) if is_digit(c) => self.consume_number(),
            Some(c) if is_letter(c) => Ok(self.consume_ident()),
            Some(c) => match Symbol::from_char(c) {
                Some(symbol) => Ok(self.make_token(T::Symbol(symbol))),
                None => Err(self.error(LexErrorKind::UnknownCharacter(c))),
            },
            None => Ok(self.make_token(T::EOS)),
        }
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = self.source.pos;
    }

    fn make_span(&self) -> Span {
        let start = self.token_start;
        let end = self.source.pos;

        debug_assert!(end.offset >= start.offset);

        Span {
            index: start.offset as u32,
            size: (end.offset - start.offset) as u32,
            line: start.line,
            column: start.column,
        }
    }

    /// Source text from the start of the current token up to the cursor.
    fn fragment(&self) -> &'a str {
        &self.source.original[self.token_start.offset..self.source.pos.offset]
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            lexeme: self.fragment().into(),
            span: self.make_span(),
        }
    }

    #[cold]
    fn error(&self, reason: LexErrorKind) -> LexError {
        LexError {
            span: self.make_span(),
            reason,
        }
    }
}

/// Trivia
impl<'a> Lexer<'a> {
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.source.peek_char2() {
                (Some(c), _) if is_whitespace(c) => {
                    self.source.next_char();
                }
                (Some('/'), Some('/')) => self.erase_line_comment(),
                (Some('/'), Some('*')) => self.erase_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Erase comment line up to, but not including, the trailing newline.
    fn erase_line_comment(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if is_newline(c) {
                break;
            }
            self.source.next_char();
        }
    }

    /// Erase a `/* */` comment, which includes `/** */` doc comments.
    fn erase_block_comment(&mut self) -> Result<(), LexError> {
        self.start_token();

        // Opening `/*`
        self.source.next_char();
        self.source.next_char();

        loop {
            match self.source.next_char() {
                Some('*') if self.source.peek_char() == Some('/') => {
                    self.source.next_char();
                    return Ok(());
                }
                Some(_) => continue,
                None => return Err(self.error(LexErrorKind::UnterminatedComment)),
            }
        }
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Make a string constant token.
    ///
    /// The opening quote has already been consumed. The closing
    /// quote must appear on the same line.
    ///
    /// Strings are ASCII, and their length must fit in a VM word
    /// so it can be pushed as a constant.
    fn consume_string(&mut self) -> Result<Token, LexError> {
        let mut length = 0_u32;

        loop {
            match self.source.peek_char() {
                Some('"') => {
                    self.source.next_char();
                    if length > MAX_INT {
                        return Err(self.error(LexErrorKind::StringTooLong(length)));
                    }
                    return Ok(self.make_token(TokenKind::StringConst));
                }
                Some(c) if is_newline(c) => {
                    return Err(self.error(LexErrorKind::UnterminatedString));
                }
                Some(c) if !c.is_ascii() => {
                    // Point at the offending character, not the whole string.
                    self.start_token();
                    self.source.next_char();
                    return Err(self.error(LexErrorKind::UnknownCharacter(c)));
                }
                Some(_) => {
                    self.source.next_char();
                    length += 1;
                }
                None => return Err(self.error(LexErrorKind::UnterminatedString)),
            }
        }
    }

    /// Make an integer constant token.
    fn consume_number(&mut self) -> Result<Token, LexError> {
        while self.source.peek_char().map_or(false, is_digit) {
            self.source.next_char();
        }

        // Identifiers can't start with a digit, so a letter
        // directly after the digits is a malformed token.
        if self.source.peek_char().map_or(false, is_letter) {
            while self.source.peek_char().map_or(false, is_letter_or_digit) {
                self.source.next_char();
            }
            return Err(self.error(LexErrorKind::MalformedNumber(self.fragment().into())));
        }

        match self.fragment().parse::<u32>() {
            Ok(value) if value <= MAX_INT => Ok(self.make_token(TokenKind::IntConst)),
            _ => Err(self.error(LexErrorKind::IntegerOverflow(self.fragment().into()))),
        }
    }

    /// Make an identifier token.
    fn consume_ident(&mut self) -> Token {
        while self.source.peek_char().map_or(false, is_letter_or_digit) {
            self.source.next_char();
        }

        // If a valid keyword can be parsed from the source fragment, then
        // the token is a reserved keyword instead of a user defined identifier.
        let token_kind = Keyword::from_str(self.fragment())
            .map(TokenKind::Keyword)
            .unwrap_or(TokenKind::Ident);
        self.make_token(token_kind)
    }
}

/// Implement `Lexer` as an iterator for consuming
/// tokens lazily.
///
/// Yields the end-of-source token once, then stops.
/// An error also ends the iteration.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.next_token();
        self.done = match &result {
            Ok(token) => token.kind == TokenKind::EOS,
            Err(_) => true,
        };

        Some(result)
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
struct SourceText<'a> {
    /// Keep reference to the source so the lexer can
    /// slice fragments from it.
    original: &'a str,

    /// Iterator over UTF-8 encoded source code.
    ///
    /// `MultiPeek` advances an internal peek cursor on each `peek()`
    /// call. The peek cursor is restored when calling `next()` or
    /// `reset_peek()`.
    chars: MultiPeek<CharIndices<'a>>,

    /// Position of the next character to be consumed.
    pos: SourcePos,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            chars: multipeek(source.char_indices()),
            pos: SourcePos {
                offset: 0,
                line: 1,
                column: 1,
            },
        }
    }

    /// Advance the cursor and return the consumed character.
    fn next_char(&mut self) -> Option<char> {
        let (index, c) = self.chars.next()?;

        self.pos.offset = index + c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }

        Some(c)
    }

    /// Character under the cursor, without advancing.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.reset_peek();
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Two character lookahead.
    fn peek_char2(&mut self) -> (Option<char>, Option<char>) {
        self.chars.reset_peek();
        (
            self.chars.peek().map(|(_, c)| *c),
            self.chars.peek().map(|(_, c)| *c),
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct SourcePos {
    /// Byte offset into the source.
    offset: usize,
    line: u32,
    column: u32,
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{000C}')
}

fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

#[allow(clippy::manual_is_ascii_check)] // consistency with other functions
fn is_digit(c: char) -> bool {
    matches!(c, '0'..='9')
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || is_digit(c)
}
