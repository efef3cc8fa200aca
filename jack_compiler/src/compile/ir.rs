use smol_str::SmolStr;
use std::fmt;

/// Virtual machine instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `push segment index`
    Push(Segment, u16),
    /// `pop segment index`
    Pop(Segment, u16),
    Arithmetic(ArithOp),
    /// `label name`
    Label(SmolStr),
    /// `goto name`
    Goto(SmolStr),
    /// `if-goto name`
    /// Pops the top of the stack and jumps if it is not zero.
    IfGoto(SmolStr),
    /// `call name argc`
    Call(SmolStr, u16),
    /// `function name nlocals`
    Function(SmolStr, u16),
    Return,
}

/// Named storage region of the virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

/// Outputs instruction as one line of VM text.
impl fmt::Display for Instruction {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Push(segment, index)  => write!(f, "push {} {}", segment, index),
            Self::Pop(segment, index)   => write!(f, "pop {} {}", segment, index),
            Self::Arithmetic(op)        => write!(f, "{}", op),
            Self::Label(name)           => write!(f, "label {}", name),
            Self::Goto(name)            => write!(f, "goto {}", name),
            Self::IfGoto(name)          => write!(f, "if-goto {}", name),
            Self::Call(name, argc)      => write!(f, "call {} {}", name, argc),
            Self::Function(name, count) => write!(f, "function {} {}", name, count),
            Self::Return                => write!(f, "return"),
        }
    }
}

impl fmt::Display for Segment {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Constant => "constant",
            Self::Argument => "argument",
            Self::Local    => "local",
            Self::Static   => "static",
            Self::This     => "this",
            Self::That     => "that",
            Self::Pointer  => "pointer",
            Self::Temp     => "temp",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ArithOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Neg => "neg",
            Self::Eq  => "eq",
            Self::Gt  => "gt",
            Self::Lt  => "lt",
            Self::And => "and",
            Self::Or  => "or",
            Self::Not => "not",
        };
        f.write_str(name)
    }
}

/// Instructions produced for one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
    pub class_name: SmolStr,
    /// In execution order.
    pub code: Vec<Instruction>,
}

impl CompiledUnit {
    /// Each instruction rendered as a line of VM text.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.code.iter().map(|instr| instr.to_string())
    }
}

/// Writes the whole unit as VM text, one instruction per line.
impl fmt::Display for CompiledUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for instr in &self.code {
            writeln!(f, "{}", instr)?;
        }
        Ok(())
    }
}
