pub mod compile;
pub mod error;
pub mod lex;
pub mod token_stream;
pub mod tokens;

pub use compile::{CompiledUnit, CompilerConf};
pub use error::{CompileError, CompileResult};

/// Compile the source text of one class, calling into the
/// default runtime library.
pub fn compile_str(source: &str) -> CompileResult<CompiledUnit> {
    compile_str_with(source, CompilerConf::default())
}

pub fn compile_str_with(source: &str, conf: CompilerConf) -> CompileResult<CompiledUnit> {
    // Lexical analysis
    let tokens = lex::tokenize(source)?;

    // Syntactic analysis and code generation, in one pass
    compile::Compiler::with_conf(tokens, conf).compile()
}
