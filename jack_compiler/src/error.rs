//! Result and errors.
use std::fmt::{self, Display, Formatter};

use smol_str::SmolStr;

use crate::{
    compile::{Scope, SymbolKind},
    tokens::Span,
};

pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Terminal error of a single compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Lex(LexError),
    Syntax(SyntaxError),
    Semantic(SemanticError),
    DuplicateSymbol(DuplicateSymbolError),
    SymbolOverflow(SymbolOverflowError),
}

impl CompileError {
    /// Location in the source where the error was detected.
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::Lex(err) => Some(&err.span),
            Self::Syntax(err) => Some(&err.span),
            Self::Semantic(err) => Some(&err.span),
            Self::DuplicateSymbol(_) | Self::SymbolOverflow(_) => None,
        }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "{err}"),
            Self::Syntax(err) => write!(f, "{err}"),
            Self::Semantic(err) => write!(f, "{err}"),
            Self::DuplicateSymbol(err) => write!(f, "{err}"),
            Self::SymbolOverflow(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError::Lex(err)
    }
}

impl From<SyntaxError> for CompileError {
    fn from(err: SyntaxError) -> Self {
        CompileError::Syntax(err)
    }
}

impl From<SemanticError> for CompileError {
    fn from(err: SemanticError) -> Self {
        CompileError::Semantic(err)
    }
}

impl From<DuplicateSymbolError> for CompileError {
    fn from(err: DuplicateSymbolError) -> Self {
        CompileError::DuplicateSymbol(err)
    }
}

impl From<SymbolOverflowError> for CompileError {
    fn from(err: SymbolOverflowError) -> Self {
        CompileError::SymbolOverflow(err)
    }
}

/// Malformed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub span: Span,
    pub reason: LexErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnknownCharacter(char),
    /// String constant without a closing quote on the same line.
    UnterminatedString,
    /// Block comment without a closing `*/`.
    UnterminatedComment,
    /// String constant with more characters than the VM word allows.
    StringTooLong(u32),
    /// Integer constant larger than the VM word allows.
    IntegerOverflow(SmolStr),
    /// Digits immediately followed by identifier characters.
    MalformedNumber(SmolStr),
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: lexical error: {}", self.span, self.reason)
    }
}

impl Display for LexErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCharacter(c) => write!(f, "unknown character {c:?}"),
            Self::UnterminatedString => write!(f, "unterminated string constant"),
            Self::UnterminatedComment => write!(f, "unterminated block comment"),
            Self::StringTooLong(length) => {
                write!(f, "string constant of {length} characters exceeds 32767")
            }
            Self::IntegerOverflow(text) => write!(f, "integer constant {text} exceeds 32767"),
            Self::MalformedNumber(text) => write!(f, "malformed number {text:?}"),
        }
    }
}

impl std::error::Error for LexError {}

/// Grammar violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub span: Span,
    pub expected: String,
    pub found: String,
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: syntax error: expected {}, found {}",
            self.span, self.expected, self.found
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Identifier that can't be resolved to a storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub span: Span,
    pub name: SmolStr,
    pub reason: SemanticReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticReason {
    UndefinedVariable,
    /// Field referenced where no object is bound.
    FieldInFunction,
    /// `this` referenced where no object is bound.
    ThisInFunction,
    /// Method called on a variable of type `int`, `char` or `boolean`.
    PrimitiveReceiver,
}

impl Display for SemanticError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: semantic error: ", self.span)?;
        match self.reason {
            SemanticReason::UndefinedVariable => write!(f, "undefined variable '{}'", self.name),
            SemanticReason::FieldInFunction => {
                write!(f, "field '{}' cannot be accessed from a function", self.name)
            }
            SemanticReason::ThisInFunction => write!(f, "'this' cannot be used in a function"),
            SemanticReason::PrimitiveReceiver => {
                write!(f, "'{}' has a primitive type and no methods", self.name)
            }
        }
    }
}

impl std::error::Error for SemanticError {}

/// Name defined twice in the same scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSymbolError {
    pub name: SmolStr,
    pub scope: Scope,
}

impl Display for DuplicateSymbolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "symbol '{}' is already defined in {} scope",
            self.name, self.scope
        )
    }
}

impl std::error::Error for DuplicateSymbolError {}

/// More symbols of one kind than a segment index can address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolOverflowError {
    pub name: SmolStr,
    pub kind: SymbolKind,
}

impl Display for SymbolOverflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "too many {} variables, '{}' exceeds the segment size",
            self.kind, self.name
        )
    }
}

impl std::error::Error for SymbolOverflowError {}
