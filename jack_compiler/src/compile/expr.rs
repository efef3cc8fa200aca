//! Expression compilation.
use super::{
    ir::{ArithOp, Segment},
    is_primitive, Compiler,
};
use crate::{
    error::{CompileResult, SemanticError, SemanticReason, SyntaxError},
    tokens::{Keyword as K, Symbol as S, Token, TokenKind as T},
};
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Lt,
    Gt,
    Eq,
}

impl BinaryOp {
    #[rustfmt::skip]
    fn from_symbol(symbol: S) -> Option<Self> {
        match symbol {
            S::Plus      => Some(Self::Add),
            S::Minus     => Some(Self::Sub),
            S::Star      => Some(Self::Mul),
            S::Slash     => Some(Self::Div),
            S::Ampersand => Some(Self::And),
            S::Pipe      => Some(Self::Or),
            S::Less      => Some(Self::Lt),
            S::Greater   => Some(Self::Gt),
            S::Eq        => Some(Self::Eq),
            _ => None,
        }
    }
}

impl Compiler {
    /// term (op term)*
    ///
    /// Operators have no precedence and are applied strictly from
    /// left to right, each directly after its right operand.
    pub(super) fn compile_expression(&mut self) -> CompileResult<()> {
        self.compile_term()?;

        while let Some(op) = self.peek_binary_op() {
            self.input.next_token();
            self.compile_term()?;
            self.emit_binary_op(op);
        }

        Ok(())
    }

    fn peek_binary_op(&self) -> Option<BinaryOp> {
        match self.input.peek_kind() {
            T::Symbol(symbol) => BinaryOp::from_symbol(symbol),
            _ => None,
        }
    }

    fn emit_binary_op(&mut self, op: BinaryOp) {
        match op {
            BinaryOp::Add => self.codegen.emit_arithmetic(ArithOp::Add),
            BinaryOp::Sub => self.codegen.emit_arithmetic(ArithOp::Sub),
            BinaryOp::And => self.codegen.emit_arithmetic(ArithOp::And),
            BinaryOp::Or => self.codegen.emit_arithmetic(ArithOp::Or),
            BinaryOp::Lt => self.codegen.emit_arithmetic(ArithOp::Lt),
            BinaryOp::Gt => self.codegen.emit_arithmetic(ArithOp::Gt),
            BinaryOp::Eq => self.codegen.emit_arithmetic(ArithOp::Eq),
            // The VM has no multiply or divide instructions.
            BinaryOp::Mul => {
                let name = self.conf.multiply.clone();
                self.codegen.emit_call(name, 2);
            }
            BinaryOp::Div => {
                let name = self.conf.divide.clone();
                self.codegen.emit_call(name, 2);
            }
        }
    }

    fn compile_term(&mut self) -> CompileResult<()> {
        let token = self.input.peek().clone();

        match token.kind {
            T::IntConst => {
                self.input.next_token();
                let value = token.int_value().ok_or_else(|| SyntaxError {
                    span: token.span.clone(),
                    expected: "integer constant".to_owned(),
                    found: token.describe(),
                })?;
                self.codegen.emit_push(Segment::Constant, value);
            }
            T::StringConst => {
                self.input.next_token();
                self.compile_string(token.string_value());
            }
            T::Keyword(K::True) => {
                self.input.next_token();
                // All bits set.
                self.codegen.emit_push(Segment::Constant, 0);
                self.codegen.emit_arithmetic(ArithOp::Not);
            }
            T::Keyword(K::False | K::Null) => {
                self.input.next_token();
                self.codegen.emit_push(Segment::Constant, 0);
            }
            T::Keyword(K::This) => {
                if !self.subroutine.has_receiver() {
                    return Err(SemanticError {
                        span: token.span.clone(),
                        name: token.lexeme.clone(),
                        reason: SemanticReason::ThisInFunction,
                    }
                    .into());
                }
                self.input.next_token();
                self.codegen.emit_push(Segment::Pointer, 0);
            }
            T::Ident => {
                self.input.next_token();

                match self.input.peek_kind() {
                    T::Symbol(S::LeftBracket) => self.compile_array_read(&token)?,
                    T::Symbol(S::LeftParen | S::Dot) => self.compile_subroutine_call(&token)?,
                    _ => {
                        let symbol = self.resolve_variable(&token)?;
                        self.push_symbol(&symbol);
                    }
                }
            }
            T::Symbol(S::LeftParen) => {
                self.input.next_token();
                self.compile_expression()?;
                self.input.consume(T::Symbol(S::RightParen))?;
            }
            T::Symbol(S::Minus) => {
                self.input.next_token();
                self.compile_term()?;
                self.codegen.emit_arithmetic(ArithOp::Neg);
            }
            T::Symbol(S::Tilde) => {
                self.input.next_token();
                self.compile_term()?;
                self.codegen.emit_arithmetic(ArithOp::Not);
            }
            _ => return Err(self.input.unexpected("term").into()),
        }

        Ok(())
    }

    /// Build a string object one character at a time.
    ///
    /// The lexer only accepts ASCII strings of at most [`crate::lex::MAX_INT`]
    /// characters, so the length and every character are valid constants.
    fn compile_string(&mut self, value: &str) {
        let string_new = self.conf.string_new.clone();
        let append_char = self.conf.string_append_char.clone();

        self.codegen.emit_push(Segment::Constant, value.len() as u16);
        self.codegen.emit_call(string_new, 1);

        for c in value.chars() {
            self.codegen.emit_push(Segment::Constant, c as u16);
            self.codegen.emit_call(append_char.clone(), 2);
        }
    }

    /// name `[` expression `]`
    ///
    /// The name has already been consumed.
    fn compile_array_read(&mut self, name: &Token) -> CompileResult<()> {
        let base = self.resolve_variable(name)?;

        self.input.consume(T::Symbol(S::LeftBracket))?;
        self.compile_expression()?;
        self.input.consume(T::Symbol(S::RightBracket))?;

        self.push_symbol(&base);
        self.codegen.emit_arithmetic(ArithOp::Add);
        self.codegen.emit_pop(Segment::Pointer, 1);
        self.codegen.emit_push(Segment::That, 0);

        Ok(())
    }

    /// name `(` expressionList `)` | (className|varName) `.` name `(` expressionList `)`
    ///
    /// The leading name has already been consumed.
    pub(super) fn compile_subroutine_call(&mut self, name: &Token) -> CompileResult<()> {
        let (callee, receiver_count): (SmolStr, u16) = if self.input.match_token(T::Symbol(S::Dot)) {
            let subroutine = self.input.consume_ident("subroutine name")?;

            // A known variable is an object receiving a method call,
            // anything else is taken to be a class name.
            match self.symbols.lookup(&name.lexeme).cloned() {
                Some(symbol) => {
                    if is_primitive(&symbol.ty) {
                        return Err(SemanticError {
                            span: name.span.clone(),
                            name: name.lexeme.clone(),
                            reason: SemanticReason::PrimitiveReceiver,
                        }
                        .into());
                    }
                    let receiver = self.resolve_variable(name)?;
                    self.push_symbol(&receiver);
                    (format!("{}.{}", symbol.ty, subroutine.lexeme).into(), 1)
                }
                None => (format!("{}.{}", name.lexeme, subroutine.lexeme).into(), 0),
            }
        } else if self.subroutine.has_receiver() {
            // Method of the current object.
            self.codegen.emit_push(Segment::Pointer, 0);
            (self.qualified_name(&name.lexeme), 1)
        } else {
            (self.qualified_name(&name.lexeme), 0)
        };

        self.input.consume(T::Symbol(S::LeftParen))?;
        let arg_count = self.compile_expression_list()?;
        self.input.consume(T::Symbol(S::RightParen))?;

        self.codegen.emit_call(callee, arg_count + receiver_count);

        Ok(())
    }

    /// (expression (`,` expression)*)?
    ///
    /// Returns the number of expressions.
    fn compile_expression_list(&mut self) -> CompileResult<u16> {
        if self.input.peek_kind() == T::Symbol(S::RightParen) {
            return Ok(0);
        }

        let mut count = 0;
        loop {
            self.compile_expression()?;
            count += 1;

            if !self.input.match_token(T::Symbol(S::Comma)) {
                return Ok(count);
            }
        }
    }
}
