use super::ir::{ArithOp, Instruction, Segment};
use smol_str::SmolStr;
use std::mem;

/// Code generator.
///
/// Appends one instruction per call. Operands are not validated;
/// that is the compiler's job.
#[derive(Debug, Default)]
pub struct CodeGen {
    /// Resulting generated code.
    code: Vec<Instruction>,
}

impl CodeGen {
    #[inline]
    pub fn new() -> Self {
        Self { code: vec![] }
    }

    /// Instructions emitted so far.
    #[inline]
    pub fn output(&self) -> &[Instruction] {
        &self.code
    }

    #[inline]
    pub fn into_code(self) -> Vec<Instruction> {
        self.code
    }

    /// Swap out the current buffer, so following instructions are
    /// emitted into a fresh one. Returns the previous buffer.
    pub fn detach(&mut self) -> Vec<Instruction> {
        mem::take(&mut self.code)
    }

    /// Put a buffer taken by [`CodeGen::detach`] back, returning
    /// the instructions emitted in the meantime.
    pub fn reattach(&mut self, code: Vec<Instruction>) -> Vec<Instruction> {
        mem::replace(&mut self.code, code)
    }

    /// Append previously generated instructions.
    pub fn append(&mut self, mut code: Vec<Instruction>) {
        self.code.append(&mut code);
    }

    fn emit(&mut self, instr: Instruction) {
        self.code.push(instr)
    }
}

/// Instruction forms
impl CodeGen {
    pub fn emit_push(&mut self, segment: Segment, index: u16) {
        self.emit(Instruction::Push(segment, index))
    }

    pub fn emit_pop(&mut self, segment: Segment, index: u16) {
        self.emit(Instruction::Pop(segment, index))
    }

    pub fn emit_arithmetic(&mut self, op: ArithOp) {
        self.emit(Instruction::Arithmetic(op))
    }

    pub fn emit_label(&mut self, name: impl Into<SmolStr>) {
        self.emit(Instruction::Label(name.into()))
    }

    pub fn emit_goto(&mut self, name: impl Into<SmolStr>) {
        self.emit(Instruction::Goto(name.into()))
    }

    pub fn emit_if_goto(&mut self, name: impl Into<SmolStr>) {
        self.emit(Instruction::IfGoto(name.into()))
    }

    pub fn emit_call(&mut self, name: impl Into<SmolStr>, argc: u16) {
        self.emit(Instruction::Call(name.into(), argc))
    }

    pub fn emit_function(&mut self, name: impl Into<SmolStr>, local_count: u16) {
        self.emit(Instruction::Function(name.into(), local_count))
    }

    pub fn emit_return(&mut self) {
        self.emit(Instruction::Return)
    }
}
