//! Tokens
use smol_str::SmolStr;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal source text, including the quotes of string constants.
    pub lexeme: SmolStr,
    pub span: Span,
}

impl Token {
    /// Contents of a string constant without its surrounding quotes.
    pub fn string_value(&self) -> &str {
        let text = self.lexeme.as_str();
        let text = text.strip_prefix('"').unwrap_or(text);
        text.strip_suffix('"').unwrap_or(text)
    }

    /// Value of an integer constant.
    ///
    /// The lexer guarantees the range, so this only
    /// returns `None` for tokens of other kinds.
    pub fn int_value(&self) -> Option<u16> {
        match self.kind {
            TokenKind::IntConst => self.lexeme.parse().ok(),
            _ => None,
        }
    }

    /// Human readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Keyword(_) | TokenKind::Symbol(_) => format!("{}", self.kind),
            TokenKind::EOS => "end of source".to_owned(),
            _ => format!("{} '{}'", self.kind, self.lexeme),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier in the set of reserved words.
    Keyword(Keyword),
    Symbol(Symbol),
    Ident,
    /// Integer literal in the range `0..=32767`
    IntConst,
    /// Double quoted string literal
    StringConst,
    /// End-of-source
    EOS,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Keyword(keyword) => write!(f, "'{keyword}'"),
            Self::Symbol(symbol) => write!(f, "'{symbol}'"),
            Self::Ident => write!(f, "identifier"),
            Self::IntConst => write!(f, "integer constant"),
            Self::StringConst => write!(f, "string constant"),
            Self::EOS => write!(f, "end of source"),
        }
    }
}

/// Reserved words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Keyword {
    // ------------------------------------------------------------------------
    // Declarations
    Class,       // class
    Constructor, // constructor
    Function,    // function
    Method,      // method
    Field,       // field
    Static,      // static
    Var,         // var

    // ------------------------------------------------------------------------
    // Types
    Int,     // int
    Char,    // char
    Boolean, // boolean
    Void,    // void

    // ------------------------------------------------------------------------
    // Constants
    True,  // true
    False, // false
    Null,  // null
    This,  // this

    // ------------------------------------------------------------------------
    // Statements
    Let,    // let
    Do,     // do
    If,     // if
    Else,   // else
    While,  // while
    Return, // return
}

impl FromStr for Keyword {
    type Err = ();

    #[rustfmt::skip]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Keyword as K;
        match s {
            "class"       => Ok(K::Class),
            "constructor" => Ok(K::Constructor),
            "function"    => Ok(K::Function),
            "method"      => Ok(K::Method),
            "field"       => Ok(K::Field),
            "static"      => Ok(K::Static),
            "var"         => Ok(K::Var),
            "int"         => Ok(K::Int),
            "char"        => Ok(K::Char),
            "boolean"     => Ok(K::Boolean),
            "void"        => Ok(K::Void),
            "true"        => Ok(K::True),
            "false"       => Ok(K::False),
            "null"        => Ok(K::Null),
            "this"        => Ok(K::This),
            "let"         => Ok(K::Let),
            "do"          => Ok(K::Do),
            "if"          => Ok(K::If),
            "else"        => Ok(K::Else),
            "while"       => Ok(K::While),
            "return"      => Ok(K::Return),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Keyword {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Keyword as K;
        let text = match self {
            K::Class       => "class",
            K::Constructor => "constructor",
            K::Function    => "function",
            K::Method      => "method",
            K::Field       => "field",
            K::Static      => "static",
            K::Var         => "var",
            K::Int         => "int",
            K::Char        => "char",
            K::Boolean     => "boolean",
            K::Void        => "void",
            K::True        => "true",
            K::False       => "false",
            K::Null        => "null",
            K::This        => "this",
            K::Let         => "let",
            K::Do          => "do",
            K::If          => "if",
            K::Else        => "else",
            K::While       => "while",
            K::Return      => "return",
        };
        f.write_str(text)
    }
}

/// Single character symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Symbol {
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Dot,          // .
    Comma,        // ,
    Semicolon,    // ;
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Ampersand,    // &
    Pipe,         // |
    Less,         // <
    Greater,      // >
    Eq,           // =
    Tilde,        // ~
}

impl Symbol {
    #[rustfmt::skip]
    pub fn from_char(c: char) -> Option<Self> {
        use Symbol as S;
        match c {
            '{' => Some(S::LeftBrace),
            '}' => Some(S::RightBrace),
            '(' => Some(S::LeftParen),
            ')' => Some(S::RightParen),
            '[' => Some(S::LeftBracket),
            ']' => Some(S::RightBracket),
            '.' => Some(S::Dot),
            ',' => Some(S::Comma),
            ';' => Some(S::Semicolon),
            '+' => Some(S::Plus),
            '-' => Some(S::Minus),
            '*' => Some(S::Star),
            '/' => Some(S::Slash),
            '&' => Some(S::Ampersand),
            '|' => Some(S::Pipe),
            '<' => Some(S::Less),
            '>' => Some(S::Greater),
            '=' => Some(S::Eq),
            '~' => Some(S::Tilde),
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn as_char(&self) -> char {
        use Symbol as S;
        match self {
            S::LeftBrace    => '{',
            S::RightBrace   => '}',
            S::LeftParen    => '(',
            S::RightParen   => ')',
            S::LeftBracket  => '[',
            S::RightBracket => ']',
            S::Dot          => '.',
            S::Comma        => ',',
            S::Semicolon    => ';',
            S::Plus         => '+',
            S::Minus        => '-',
            S::Star         => '*',
            S::Slash        => '/',
            S::Ampersand    => '&',
            S::Pipe         => '|',
            S::Less         => '<',
            S::Greater      => '>',
            S::Eq           => '=',
            S::Tilde        => '~',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Chunk of source code, encoded as a starting byte
/// position and size, along with the line and column
/// where it starts.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Span {
    pub index: u32,
    pub size: u32,
    /// Line number, starting at 1.
    pub line: u32,
    /// Column number in characters, starting at 1.
    pub column: u32,
}

impl Span {
    pub fn new(index: u32, size: u32, line: u32, column: u32) -> Self {
        Self {
            index,
            size,
            line,
            column,
        }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.end() as usize)]
    }

    /// Ending index of the span, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.size
    }

    /// Source line that contains the start of the span, including
    /// its trailing newline, along with the byte range of the line.
    pub fn surrounding_line<'a>(&self, text: &'a str) -> (&'a str, std::ops::Range<usize>) {
        const NEWLINE: char = '\n';

        let index = (self.index as usize).min(text.len());
        let start = text[..index].rfind(NEWLINE).map(|i| i + 1).unwrap_or(0);
        let end = text[index..]
            .find(NEWLINE)
            .map(|i| index + i + 1)
            .unwrap_or(text.len());

        (&text[start..end], start..end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_span_fragment() {
        const CODE: &str = "let x = 42;";

        let spans = &[
            Span::new(0, 3, 1, 1),  // let
            Span::new(4, 1, 1, 5),  // x
            Span::new(6, 1, 1, 7),  // =
            Span::new(8, 2, 1, 9),  // 42
            Span::new(10, 1, 1, 11), // ;
        ];

        assert_eq!(spans[0].fragment(CODE), "let");
        assert_eq!(spans[1].fragment(CODE), "x");
        assert_eq!(spans[2].fragment(CODE), "=");
        assert_eq!(spans[3].fragment(CODE), "42");
        assert_eq!(spans[4].fragment(CODE), ";");
    }

    #[test]
    #[rustfmt::skip]
    fn test_span_surrounding_line() {
        const CODE: &str = "------------\n....here....\n------------";

        let span = Span::new(17, 4, 2, 5);
        assert_eq!(span.fragment(CODE), "here");

        let (line, range) = span.surrounding_line(CODE);
        assert_eq!(line, "....here....\n");
        assert_eq!(range, 13..26);
    }

    #[test]
    fn test_span_surrounding_full_text() {
        const CODE: &str = "....here....";

        let span = Span::new(4, 4, 1, 5);
        let (line, range) = span.surrounding_line(CODE);
        assert_eq!(line, "....here....");
        assert_eq!(range, 0..12);
    }

    #[test]
    fn test_keyword_roundtrip() {
        for text in ["class", "constructor", "method", "boolean", "while", "return"] {
            let keyword = Keyword::from_str(text).unwrap();
            assert_eq!(keyword.to_string(), text);
        }
        assert!(Keyword::from_str("Class").is_err());
        assert!(Keyword::from_str("foo").is_err());
    }

    #[test]
    fn test_string_value() {
        let token = Token {
            kind: TokenKind::StringConst,
            lexeme: "\"hello world\"".into(),
            span: Span::new(0, 13, 1, 1),
        };
        assert_eq!(token.string_value(), "hello world");
        assert_eq!(token.int_value(), None);
    }
}
