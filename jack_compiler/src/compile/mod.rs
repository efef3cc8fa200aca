//! Recursive descent compiler.
//!
//! Each grammar rule is a method on [`Compiler`] that consumes the tokens
//! of its construct and emits VM instructions directly, without building
//! a syntax tree.
mod class;
mod codegen;
mod expr;
mod ir;
mod stmts;
mod symbol;

pub use codegen::CodeGen;
pub use ir::{ArithOp, CompiledUnit, Instruction, Segment};
pub use symbol::{Scope, Symbol, SymbolKind, SymbolTable};

use crate::{
    error::{CompileResult, SemanticError, SemanticReason},
    token_stream::TokenStream,
    tokens::{Token, TokenKind},
};
use smol_str::SmolStr;

/// Names of the runtime library subroutines that
/// generated code calls into.
///
/// Defaults to the conventional operating system
/// library of the Hack virtual machine.
#[derive(Debug, Clone)]
pub struct CompilerConf {
    /// Allocates an object, given its size in words.
    pub alloc: SmolStr,
    pub multiply: SmolStr,
    pub divide: SmolStr,
    /// Creates a string, given its maximum length.
    pub string_new: SmolStr,
    /// Appends a character to a string and returns the string.
    pub string_append_char: SmolStr,
}

impl Default for CompilerConf {
    fn default() -> Self {
        Self {
            alloc: "Memory.alloc".into(),
            multiply: "Math.multiply".into(),
            divide: "Math.divide".into(),
            string_new: "String.new".into(),
            string_append_char: "String.appendChar".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

impl SubroutineKind {
    /// Whether an object is bound to the `this` pointer.
    #[inline]
    pub fn has_receiver(&self) -> bool {
        matches!(self, Self::Constructor | Self::Method)
    }
}

/// Compiles the tokens of one class into VM instructions.
///
/// A compiler owns all of its state and is consumed by
/// [`Compiler::compile`], so each class gets a fresh
/// symbol table, code buffer and label counter.
pub struct Compiler {
    input: TokenStream,
    symbols: SymbolTable,
    codegen: CodeGen,
    conf: CompilerConf,
    class_name: SmolStr,
    /// Kind of the subroutine currently being compiled.
    subroutine: SubroutineKind,
    /// Source of unique label numbers.
    label_counter: u32,
}

impl Compiler {
    pub fn with_conf(tokens: Vec<Token>, conf: CompilerConf) -> Self {
        Self {
            input: TokenStream::new(tokens),
            symbols: SymbolTable::new(),
            codegen: CodeGen::new(),
            conf,
            class_name: SmolStr::default(),
            subroutine: SubroutineKind::Function,
            label_counter: 0,
        }
    }

    pub fn compile(mut self) -> CompileResult<CompiledUnit> {
        self.compile_class()?;

        // Only one class per compilation unit.
        self.input.consume(TokenKind::EOS)?;

        Ok(CompiledUnit {
            class_name: self.class_name,
            code: self.codegen.into_code(),
        })
    }

    fn next_label_id(&mut self) -> u32 {
        let id = self.label_counter;
        self.label_counter += 1;
        id
    }

    /// Fully qualified VM name of a subroutine in the current class.
    fn qualified_name(&self, subroutine: &str) -> SmolStr {
        format!("{}.{}", self.class_name, subroutine).into()
    }

    /// Run `f` with a fresh instruction buffer, returning what it
    /// emitted without adding it to the output.
    fn detached(&mut self, f: impl FnOnce(&mut Self) -> CompileResult<()>) -> CompileResult<Vec<Instruction>> {
        let outer = self.codegen.detach();
        let result = f(self);
        let inner = self.codegen.reattach(outer);
        result.map(|_| inner)
    }

    /// Resolve a variable reference to its symbol.
    fn resolve_variable(&self, name: &Token) -> CompileResult<Symbol> {
        let symbol = self.symbols.lookup(&name.lexeme).ok_or_else(|| SemanticError {
            span: name.span.clone(),
            name: name.lexeme.clone(),
            reason: SemanticReason::UndefinedVariable,
        })?;

        // Fields live in the object bound to `this`,
        // which functions don't have.
        if symbol.kind == SymbolKind::Field && !self.subroutine.has_receiver() {
            return Err(SemanticError {
                span: name.span.clone(),
                name: name.lexeme.clone(),
                reason: SemanticReason::FieldInFunction,
            }
            .into());
        }

        Ok(symbol.clone())
    }

    fn push_symbol(&mut self, symbol: &Symbol) {
        self.codegen.emit_push(symbol.kind.segment(), symbol.index);
    }

    fn pop_symbol(&mut self, symbol: &Symbol) {
        self.codegen.emit_pop(symbol.kind.segment(), symbol.index);
    }
}

/// Built-in types that have no methods.
fn is_primitive(ty: &str) -> bool {
    matches!(ty, "int" | "char" | "boolean")
}
