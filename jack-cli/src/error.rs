//! Driver errors
use std::{fmt, path::PathBuf};

use jack_compiler::CompileError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
}

impl std::error::Error for AppError {}

#[derive(Debug)]
pub enum ErrorKind {
    Compile(CompileError),
    Io(std::io::Error),
    Logger(log::SetLoggerError),
    /// Directory contains no `.jack` files.
    NoSources(PathBuf),
    /// Number of source files that failed to compile.
    Failed(usize),
}

impl AppError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "jackc error: {}", self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Logger(err) => write!(f, "{err}"),
            Self::NoSources(path) => write!(f, "no .jack files in {}", path.display()),
            Self::Failed(count) => write!(f, "{count} file(s) failed to compile"),
        }
    }
}

impl From<CompileError> for AppError {
    fn from(err: CompileError) -> Self {
        Self::new(ErrorKind::Compile(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err))
    }
}

impl From<log::SetLoggerError> for AppError {
    fn from(err: log::SetLoggerError) -> Self {
        Self::new(ErrorKind::Logger(err))
    }
}
