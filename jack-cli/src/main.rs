//! Entrypoint for CLI
mod error;

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use jack_compiler::{compile_str, lex::Lexer, tokens::TokenKind, CompileError};
use log::{error, info};

use self::error::{AppError, AppResult, ErrorKind};

static USAGE: &str = r#"
usage: jackc CMD PATH

commands:
    compile     Compile a .jack file, or every .jack file in a
                directory, into .vm files next to the sources
    tokens      Print the tokens of the target .jack file

examples:
    jackc compile Main.jack
    jackc compile Pong/
    jackc tokens Main.jack
"#;

const SOURCE_EXT: &str = "jack";
const OUTPUT_EXT: &str = "vm";

fn run_compile(path: impl AsRef<Path>) -> AppResult<()> {
    let path = path.as_ref();
    let sources = collect_sources(path)?;
    info!("compiling {} file(s)", sources.len());

    // Keep going after a failure, so every broken file gets reported.
    let mut failed = 0;
    for source_path in &sources {
        if let Err(err) = compile_file(source_path) {
            error!("{}: {err}", source_path.display());
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(AppError::new(ErrorKind::Failed(failed)));
    }

    Ok(())
}

fn collect_sources(path: &Path) -> AppResult<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut sources = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_file() && entry_path.extension().map_or(false, |ext| ext == SOURCE_EXT) {
            sources.push(entry_path);
        }
    }

    if sources.is_empty() {
        return Err(AppError::new(ErrorKind::NoSources(path.to_path_buf())));
    }

    // Stable output order, regardless of the file system.
    sources.sort();

    Ok(sources)
}

fn compile_file(source_path: &Path) -> AppResult<()> {
    let source_code = fs::read_to_string(source_path)?;

    match compile_str(source_code.as_str()) {
        Ok(unit) => {
            let output_path = source_path.with_extension(OUTPUT_EXT);
            fs::write(&output_path, unit.to_string())?;
            info!("{} -> {}", source_path.display(), output_path.display());
            Ok(())
        }
        Err(err) => {
            print_diagnostic(source_path, &source_code, &err);
            Err(err.into())
        }
    }
}

/// Print the offending line with a caret under the error position.
fn print_diagnostic(source_path: &Path, source_code: &str, err: &CompileError) {
    match err.span() {
        Some(span) => {
            let (line, _) = span.surrounding_line(source_code);
            let line = line.trim_end();
            let gutter = span.line.to_string();
            let pad = " ".repeat(gutter.len());
            let caret = " ".repeat(span.column.saturating_sub(1) as usize);

            eprintln!("error: {err}");
            eprintln!("{pad}--> {}:{span}", source_path.display());
            eprintln!("{pad} |");
            eprintln!("{gutter} | {line}");
            eprintln!("{pad} | {caret}^");
        }
        None => {
            eprintln!("error: {err}");
            eprintln!(" --> {}", source_path.display());
        }
    }
}

fn run_tokens(filepath: impl AsRef<Path>) -> AppResult<()> {
    let source_path = filepath.as_ref();
    let source_code = fs::read_to_string(source_path)?;
    let lexer = Lexer::new(source_code.as_str());

    println!(" offset:len  line:col  token              fragment");
    for result in lexer {
        let token = match result {
            Ok(token) => token,
            Err(err) => {
                let err = CompileError::from(err);
                print_diagnostic(source_path, &source_code, &err);
                return Err(err.into());
            }
        };

        let offset = token.span.index;
        let len = token.span.size;
        let position = token.span.to_string();
        match token.kind {
            TokenKind::EOS => println!("{offset:7}:{len: <3} {position: >9}  {kind}", kind = token.kind),
            _ => {
                let kind = format!("{:?}", token.kind); // cannot format debug print {:?} into columns
                let fragment = token.span.fragment(&source_code);
                println!("{offset:7}:{len: <3} {position: >9}  {kind: <18} {fragment}")
            }
        }
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        std::process::exit(1)
    }
}

fn run() -> AppResult<()> {
    simple_logger::SimpleLogger::new().env().init()?;

    match parse_args() {
        Some(Cmd::Compile { path }) => run_compile(path),
        Some(Cmd::Tokens { filepath }) => run_tokens(filepath),
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    let cmd = args.next()?;

    let parsed = match cmd.as_str() {
        "compile" => Cmd::Compile { path: args.next()? },
        "tokens" => Cmd::Tokens {
            filepath: args.next()?,
        },
        _ => return None,
    };

    // Trailing arguments are a usage error.
    match args.next() {
        Some(_) => None,
        None => Some(parsed),
    }
}

fn print_usage() {
    println!("jackc v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}

enum Cmd {
    /// Compile a file or directory
    Compile { path: String },
    /// Dump tokens
    Tokens { filepath: String },
}
