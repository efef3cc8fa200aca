//! Statement compilation.
use super::{
    ir::{ArithOp, Segment},
    Compiler, SubroutineKind,
};
use crate::{
    error::CompileResult,
    tokens::{Keyword as K, Symbol as S, TokenKind as T},
};

impl Compiler {
    /// statement*
    ///
    /// Statements run until the closing brace of the enclosing block.
    pub(super) fn compile_statements(&mut self) -> CompileResult<()> {
        loop {
            match self.input.peek_kind() {
                T::Keyword(keyword) => match keyword {
                    K::Let => self.compile_let()?,
                    K::If => self.compile_if()?,
                    K::While => self.compile_while()?,
                    K::Do => self.compile_do()?,
                    K::Return => self.compile_return()?,
                    _ => return Err(self.input.unexpected("statement").into()),
                },
                T::Symbol(S::RightBrace) => return Ok(()),
                _ => return Err(self.input.unexpected("statement").into()),
            }
        }
    }

    /// `{` statements `}`
    fn compile_block(&mut self) -> CompileResult<()> {
        self.input.consume(T::Symbol(S::LeftBrace))?;
        self.compile_statements()?;
        self.input.consume(T::Symbol(S::RightBrace))?;
        Ok(())
    }

    /// `let` name (`[` expression `]`)? `=` expression `;`
    fn compile_let(&mut self) -> CompileResult<()> {
        self.input.consume(T::Keyword(K::Let))?;
        let name = self.input.consume_ident("variable name")?;
        let target = self.resolve_variable(&name)?;

        if self.input.match_token(T::Symbol(S::LeftBracket)) {
            // The index is compiled aside and placed after the right-hand
            // side, so the value is already on the stack when the element
            // address is bound to `that`.
            let index = self.detached(|this| this.compile_expression())?;
            self.input.consume(T::Symbol(S::RightBracket))?;
            self.input.consume(T::Symbol(S::Eq))?;
            self.compile_expression()?;
            self.input.consume(T::Symbol(S::Semicolon))?;

            self.codegen.append(index);
            self.push_symbol(&target);
            self.codegen.emit_arithmetic(ArithOp::Add);
            self.codegen.emit_pop(Segment::Pointer, 1);
            self.codegen.emit_pop(Segment::That, 0);
        } else {
            self.input.consume(T::Symbol(S::Eq))?;
            self.compile_expression()?;
            self.input.consume(T::Symbol(S::Semicolon))?;

            self.pop_symbol(&target);
        }

        Ok(())
    }

    /// `if` `(` expression `)` `{` statements `}` (`else` `{` statements `}`)?
    fn compile_if(&mut self) -> CompileResult<()> {
        let id = self.next_label_id();
        let if_true = format!("IF_TRUE{id}");
        let if_false = format!("IF_FALSE{id}");
        let if_end = format!("IF_END{id}");

        self.input.consume(T::Keyword(K::If))?;
        self.input.consume(T::Symbol(S::LeftParen))?;
        self.compile_expression()?;
        self.input.consume(T::Symbol(S::RightParen))?;

        self.codegen.emit_if_goto(if_true.as_str());
        self.codegen.emit_goto(if_false.as_str());
        self.codegen.emit_label(if_true);

        self.compile_block()?;

        if self.input.match_token(T::Keyword(K::Else)) {
            self.codegen.emit_goto(if_end.as_str());
            self.codegen.emit_label(if_false);
            self.compile_block()?;
            self.codegen.emit_label(if_end);
        } else {
            self.codegen.emit_label(if_false);
        }

        Ok(())
    }

    /// `while` `(` expression `)` `{` statements `}`
    fn compile_while(&mut self) -> CompileResult<()> {
        let id = self.next_label_id();
        let top = format!("WHILE_EXP{id}");
        let end = format!("WHILE_END{id}");

        self.input.consume(T::Keyword(K::While))?;
        self.codegen.emit_label(top.as_str());

        self.input.consume(T::Symbol(S::LeftParen))?;
        self.compile_expression()?;
        self.input.consume(T::Symbol(S::RightParen))?;

        self.codegen.emit_arithmetic(ArithOp::Not);
        self.codegen.emit_if_goto(end.as_str());

        self.compile_block()?;

        self.codegen.emit_goto(top);
        self.codegen.emit_label(end);

        Ok(())
    }

    /// `do` subroutineCall `;`
    fn compile_do(&mut self) -> CompileResult<()> {
        self.input.consume(T::Keyword(K::Do))?;
        let name = self.input.consume_ident("subroutine name")?;
        self.compile_subroutine_call(&name)?;
        self.input.consume(T::Symbol(S::Semicolon))?;

        // Discard the return value.
        self.codegen.emit_pop(Segment::Temp, 0);

        Ok(())
    }

    /// `return` expression? `;`
    fn compile_return(&mut self) -> CompileResult<()> {
        self.input.consume(T::Keyword(K::Return))?;

        let is_bare = self.input.peek_kind() == T::Symbol(S::Semicolon);

        if self.subroutine == SubroutineKind::Constructor {
            // Constructors always hand back the new object. Any other
            // expression is still evaluated, for its side effects.
            let is_this = self.input.peek_kind() == T::Keyword(K::This)
                && self.input.peek_nth(1).kind == T::Symbol(S::Semicolon);

            if is_this {
                self.input.next_token();
            } else if !is_bare {
                self.compile_expression()?;
                self.codegen.emit_pop(Segment::Temp, 0);
            }
            self.codegen.emit_push(Segment::Pointer, 0);
        } else if is_bare {
            // Every subroutine returns a value on the VM.
            self.codegen.emit_push(Segment::Constant, 0);
        } else {
            self.compile_expression()?;
        }

        self.input.consume(T::Symbol(S::Semicolon))?;
        self.codegen.emit_return();

        Ok(())
    }
}
