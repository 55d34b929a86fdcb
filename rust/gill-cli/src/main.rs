//! GILL CLI — command-line interface for the GILL language.

mod error;
mod repl;

use clap::{Parser as ClapParser, Subcommand};
use error::GillError;
use gill_compiler::diagnostics::Diagnostic;
use gill_compiler::{compile_source, tokenize};
use gill_rt::Interpreter;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

// ANSI color helpers
fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{}\x1b[0m", s)
}
fn gray(s: &str) -> String {
    format!("\x1b[90m{}\x1b[0m", s)
}

#[derive(ClapParser)]
#[command(
    name = "gill",
    version,
    about = "The GILL scripting language — dynamically evaluated, statically named",
    help_template = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}

Examples:
  gill run script.gill        Evaluate a source file
  gill ast script.gill        Print the parsed tree as JSON
  gill tokens script.gill     Print the token stream
  gill repl                   Start an interactive session
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a source file (any extension is accepted)
    Run {
        /// Path to the source file
        file: PathBuf,
    },
    /// Parse a source file and emit its AST as JSON
    Ast {
        /// Path to the source file
        file: PathBuf,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Lex a source file and list its tokens with spans
    Tokens {
        /// Path to the source file
        file: PathBuf,
    },
    /// Start an interactive REPL
    Repl,
}

fn main() {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Run { file } => cmd_run(&file),
        Commands::Ast { file, output } => cmd_ast(&file, output.as_deref()),
        Commands::Tokens { file } => cmd_tokens(&file),
        Commands::Repl => {
            repl::run_repl();
            0
        }
    };
    process::exit(code);
}

/// Render a failure to stderr and turn the result into an exit code.
/// Front-end errors get the snippet diagnostic; everything else prints its
/// kind and message.
fn report(result: Result<(), GillError>, source: &str, file: &Path) -> i32 {
    match result {
        Ok(()) => 0,
        Err(GillError::Compile(err)) => {
            let diag = Diagnostic::from_compile_error(&err, source, file.to_str());
            eprintln!("{}", diag.render_ansi());
            1
        }
        Err(err) => {
            eprintln!("{}", red(&err.to_string()));
            1
        }
    }
}

fn read_source(file: &Path) -> Result<String, GillError> {
    fs::read_to_string(file).map_err(|err| GillError::read(file, err))
}

fn cmd_run(file: &Path) -> i32 {
    let source = match read_source(file) {
        Ok(source) => source,
        Err(err) => return report(Err(err), "", file),
    };
    report(run_source(&source), &source, file)
}

fn run_source(source: &str) -> Result<(), GillError> {
    let program = compile_source(source)?;
    let mut interp = Interpreter::new();
    interp.run(&program)?;
    Ok(())
}

fn cmd_ast(file: &Path, output: Option<&Path>) -> i32 {
    let source = match read_source(file) {
        Ok(source) => source,
        Err(err) => return report(Err(err), "", file),
    };
    report(emit_ast(&source, output), &source, file)
}

fn emit_ast(source: &str, output: Option<&Path>) -> Result<(), GillError> {
    let program = compile_source(source)?;
    let json = serde_json::to_string_pretty(&program)?;
    match output {
        Some(path) => {
            fs::write(path, json).map_err(|err| GillError::write(path, err))?;
            println!("{} wrote {}", cyan("ast:"), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_tokens(file: &Path) -> i32 {
    let source = match read_source(file) {
        Ok(source) => source,
        Err(err) => return report(Err(err), "", file),
    };
    report(list_tokens(&source), &source, file)
}

fn list_tokens(source: &str) -> Result<(), GillError> {
    for token in tokenize(source)? {
        println!("{} {}", gray(&format!("{:>4}", token.span.to_string())), token.kind);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
