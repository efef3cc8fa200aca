use super::ir::Segment;
use crate::error::{CompileResult, DuplicateSymbolError, SymbolOverflowError};
use smol_str::SmolStr;
use std::{collections::HashMap, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Primitive type or class name.
    pub ty: SmolStr,
    pub kind: SymbolKind,
    pub index: u16,
}

/// Storage kind, which determines both the scope
/// and the segment of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Static,
    Field,
    /// Subroutine argument
    Arg,
    /// Local variable
    Var,
}

impl SymbolKind {
    pub fn scope(&self) -> Scope {
        match self {
            Self::Static | Self::Field => Scope::Class,
            Self::Arg | Self::Var => Scope::Subroutine,
        }
    }

    /// VM segment where values of this kind are stored.
    pub fn segment(&self) -> Segment {
        match self {
            Self::Static => Segment::Static,
            Self::Field => Segment::This,
            Self::Arg => Segment::Argument,
            Self::Var => Segment::Local,
        }
    }

    fn counter(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Field => write!(f, "field"),
            Self::Arg => write!(f, "argument"),
            Self::Var => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Lives for the whole class compilation.
    Class,
    /// Cleared at the start of every subroutine.
    Subroutine,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Subroutine => write!(f, "subroutine"),
        }
    }
}

/// Two level symbol table of one class.
///
/// Lookups search the subroutine scope first, so locals and
/// arguments shadow fields and statics of the same name.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class: HashMap<SmolStr, Symbol>,
    subroutine: HashMap<SmolStr, Symbol>,
    /// Next index of each kind, in [`SymbolKind`] order.
    counters: [u16; 4],
}

impl SymbolTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the subroutine scope and restart argument and
    /// local numbering from zero.
    pub fn start_subroutine(&mut self) {
        self.subroutine.clear();
        self.counters[SymbolKind::Arg.counter()] = 0;
        self.counters[SymbolKind::Var.counter()] = 0;
    }

    /// Add a symbol to the scope implied by its kind.
    ///
    /// Returns the index assigned to the symbol.
    pub fn define(
        &mut self,
        name: impl Into<SmolStr>,
        ty: impl Into<SmolStr>,
        kind: SymbolKind,
    ) -> CompileResult<u16> {
        let name = name.into();
        let scope = match kind.scope() {
            Scope::Class => &mut self.class,
            Scope::Subroutine => &mut self.subroutine,
        };

        if scope.contains_key(&name) {
            return Err(DuplicateSymbolError {
                name,
                scope: kind.scope(),
            }
            .into());
        }

        let index = self.counters[kind.counter()];
        self.counters[kind.counter()] = match index.checked_add(1) {
            Some(next) => next,
            None => return Err(SymbolOverflowError { name, kind }.into()),
        };
        scope.insert(
            name.clone(),
            Symbol {
                name,
                ty: ty.into(),
                kind,
                index,
            },
        );

        Ok(index)
    }

    /// Lookup the given symbol name according to the scope rules.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine.get(name).or_else(|| self.class.get(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.lookup(name).map(|symbol| symbol.kind)
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|symbol| symbol.ty.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|symbol| symbol.index)
    }

    /// Number of symbols of the given kind defined in the current scopes.
    #[inline]
    pub fn var_count(&self, kind: SymbolKind) -> u16 {
        self.counters[kind.counter()]
    }
}
