//! Class and subroutine declarations.
use super::{ir::Segment, symbol::SymbolKind, Compiler, SubroutineKind};
use crate::{
    error::CompileResult,
    tokens::{Keyword as K, Symbol as S, TokenKind as T},
};
use log::{debug, trace};
use smol_str::SmolStr;

impl Compiler {
    /// `class` name `{` classVarDec* subroutineDec* `}`
    pub(super) fn compile_class(&mut self) -> CompileResult<()> {
        self.input.consume(T::Keyword(K::Class))?;
        self.class_name = self.input.consume_ident("class name")?.lexeme;
        self.input.consume(T::Symbol(S::LeftBrace))?;

        debug!("compiling class {}", self.class_name);

        // All class variables are collected before any subroutine is
        // compiled, so the object size is final when constructors allocate.
        while let T::Keyword(K::Static | K::Field) = self.input.peek_kind() {
            self.compile_class_var_dec()?;
        }

        loop {
            match self.input.peek_kind() {
                T::Keyword(K::Constructor | K::Function | K::Method) => self.compile_subroutine_dec()?,
                T::Symbol(S::RightBrace) => break,
                _ => return Err(self.input.unexpected("subroutine declaration or '}'").into()),
            }
        }

        self.input.consume(T::Symbol(S::RightBrace))?;

        Ok(())
    }

    /// `(static|field)` type name (`,` name)* `;`
    fn compile_class_var_dec(&mut self) -> CompileResult<()> {
        let kind = match self.input.peek_kind() {
            T::Keyword(K::Static) => SymbolKind::Static,
            T::Keyword(K::Field) => SymbolKind::Field,
            _ => return Err(self.input.unexpected("'static' or 'field'").into()),
        };
        self.input.next_token();

        let ty = self.compile_type()?;
        self.compile_var_names(&ty, kind)
    }

    /// `(constructor|function|method)` (`void`|type) name `(` parameterList `)` subroutineBody
    fn compile_subroutine_dec(&mut self) -> CompileResult<()> {
        let kind = match self.input.peek_kind() {
            T::Keyword(K::Constructor) => SubroutineKind::Constructor,
            T::Keyword(K::Function) => SubroutineKind::Function,
            T::Keyword(K::Method) => SubroutineKind::Method,
            _ => return Err(self.input.unexpected("subroutine declaration").into()),
        };
        self.input.next_token();

        if !self.input.match_token(T::Keyword(K::Void)) {
            self.compile_type()?;
        }

        let name = self.input.consume_ident("subroutine name")?;
        let qualified_name = self.qualified_name(&name.lexeme);

        debug!("compiling {:?} {}", kind, qualified_name);

        self.subroutine = kind;
        self.symbols.start_subroutine();

        // The receiver is passed as an invisible first argument.
        if kind == SubroutineKind::Method {
            let class_name = self.class_name.clone();
            self.symbols.define("this", class_name, SymbolKind::Arg)?;
        }

        self.input.consume(T::Symbol(S::LeftParen))?;
        self.compile_parameter_list()?;
        self.input.consume(T::Symbol(S::RightParen))?;

        self.compile_subroutine_body(qualified_name)
    }

    /// ((type name) (`,` type name)*)?
    fn compile_parameter_list(&mut self) -> CompileResult<()> {
        if self.input.peek_kind() == T::Symbol(S::RightParen) {
            return Ok(());
        }

        loop {
            let ty = self.compile_type()?;
            let name = self.input.consume_ident("parameter name")?;
            self.define(name.lexeme, ty, SymbolKind::Arg)?;

            if !self.input.match_token(T::Symbol(S::Comma)) {
                return Ok(());
            }
        }
    }

    /// `{` varDec* statements `}`
    fn compile_subroutine_body(&mut self, qualified_name: SmolStr) -> CompileResult<()> {
        self.input.consume(T::Symbol(S::LeftBrace))?;

        while self.input.peek_kind() == T::Keyword(K::Var) {
            self.compile_var_dec()?;
        }

        // Local count is only known once all declarations are read.
        let local_count = self.symbols.var_count(SymbolKind::Var);
        self.codegen.emit_function(qualified_name, local_count);

        match self.subroutine {
            SubroutineKind::Constructor => {
                let size = self.symbols.var_count(SymbolKind::Field);
                let alloc = self.conf.alloc.clone();
                self.codegen.emit_push(Segment::Constant, size);
                self.codegen.emit_call(alloc, 1);
                self.codegen.emit_pop(Segment::Pointer, 0);
            }
            SubroutineKind::Method => {
                self.codegen.emit_push(Segment::Argument, 0);
                self.codegen.emit_pop(Segment::Pointer, 0);
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements()?;
        self.input.consume(T::Symbol(S::RightBrace))?;

        Ok(())
    }

    /// `var` type name (`,` name)* `;`
    fn compile_var_dec(&mut self) -> CompileResult<()> {
        self.input.consume(T::Keyword(K::Var))?;
        let ty = self.compile_type()?;
        self.compile_var_names(&ty, SymbolKind::Var)
    }

    /// name (`,` name)* `;`
    fn compile_var_names(&mut self, ty: &SmolStr, kind: SymbolKind) -> CompileResult<()> {
        loop {
            let name = self.input.consume_ident("variable name")?;
            self.define(name.lexeme, ty.clone(), kind)?;

            if !self.input.match_token(T::Symbol(S::Comma)) {
                break;
            }
        }

        self.input.consume(T::Symbol(S::Semicolon))?;

        Ok(())
    }

    /// `int` | `char` | `boolean` | className
    fn compile_type(&mut self) -> CompileResult<SmolStr> {
        match self.input.peek_kind() {
            T::Keyword(K::Int | K::Char | K::Boolean) | T::Ident => Ok(self.input.next_token().lexeme),
            _ => Err(self.input.unexpected("type").into()),
        }
    }

    fn define(&mut self, name: SmolStr, ty: SmolStr, kind: SymbolKind) -> CompileResult<()> {
        let index = self.symbols.define(name.clone(), ty.clone(), kind)?;
        trace!("{} {}: {} {} {}", self.class_name, name, ty, kind, index);
        Ok(())
    }
}
