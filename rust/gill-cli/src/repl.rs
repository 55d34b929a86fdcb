//! Interactive REPL for the GILL language.

use std::path::PathBuf;

use gill_compiler::compile_source;
use gill_rt::{Interpreter, Value};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

// ANSI color helpers
fn green(s: &str) -> String {
    format!("\x1b[32m{}\x1b[0m", s)
}
fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{}\x1b[0m", s)
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}
fn gray(s: &str) -> String {
    format!("\x1b[90m{}\x1b[0m", s)
}

/// All keywords for tab completion.
const KEYWORDS: &[&str] = &[
    "out", "if", "else", "while", "for", "foreach", "define", "assign",
    "function", "default", "return", "exec", "import", "namespace", "try",
    "catch", "finally", "switch", "case", "true", "false",
];

/// Type names for tab completion.
const TYPES: &[&str] = &["int", "float", "string", "char", "bool", "void"];

/// REPL commands for tab completion.
const COMMANDS: &[&str] = &[":help", ":quit", ":env", ":reset"];

/// Completer for the REPL.
struct GillCompleter;

impl Completer for GillCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == '(' || c == '[' || c == '{')
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &line[start..pos];

        if word.is_empty() {
            return Ok((start, Vec::new()));
        }

        let mut candidates = Vec::new();
        if line.trim_start() == word && word.starts_with(':') {
            for &cmd in COMMANDS {
                if cmd.starts_with(word) {
                    candidates.push(Pair {
                        display: cmd.to_string(),
                        replacement: cmd.to_string(),
                    });
                }
            }
        } else {
            for &kw in KEYWORDS.iter().chain(TYPES) {
                if kw.starts_with(word) {
                    candidates.push(Pair {
                        display: kw.to_string(),
                        replacement: kw.to_string(),
                    });
                }
            }
        }
        Ok((start, candidates))
    }
}

impl Hinter for GillCompleter {
    type Hint = String;
}

impl Highlighter for GillCompleter {}

impl Validator for GillCompleter {}

impl Helper for GillCompleter {}

pub fn run_repl() {
    println!("{}", bold(&cyan(&format!("GILL REPL v{}", env!("CARGO_PKG_VERSION")))));
    println!("{}\n", gray("Type :help for available commands, :quit to exit."));

    let config = rustyline::Config::builder().auto_add_history(true).build();
    let mut rl: Editor<GillCompleter, rustyline::history::DefaultHistory> =
        Editor::with_config(config).expect("Failed to create editor");
    rl.set_helper(Some(GillCompleter));

    let history_path = get_history_path();
    if let Some(ref path) = history_path {
        if path.exists() {
            let _ = rl.load_history(path);
        }
    }

    let mut interp = Interpreter::new();
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() {
            format!("{} ", green("gill>"))
        } else {
            format!("{}   ", gray("..."))
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                if buffer.is_empty() && line.trim_start().starts_with(':') {
                    match line.trim() {
                        ":quit" => break,
                        ":help" => print_help(),
                        ":reset" => {
                            interp = Interpreter::new();
                            println!("{}", gray("session reset"));
                        }
                        ":env" => print_env(&interp),
                        other => println!("{} unknown command {}", red("error:"), other),
                    }
                    continue;
                }

                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if needs_more_input(&buffer) {
                    continue;
                }

                let input = std::mem::take(&mut buffer);
                eval_input(&input, &mut interp);
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("{}", gray("(Ctrl-D to exit)"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} {:?}", red("error:"), err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = rl.save_history(path);
    }

    println!("\n{}", cyan("Goodbye!"));
}

fn eval_input(input: &str, interp: &mut Interpreter) {
    let program = match compile_source(input) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{}", red(&err.to_string()));
            return;
        }
    };
    match interp.run(&program) {
        Ok(Value::Null) => {}
        Ok(value) => println!("{}", value),
        Err(err) => eprintln!("{}", red(&err.to_string())),
    }
}

/// More lines are needed while a brace or string is still open.
fn needs_more_input(buffer: &str) -> bool {
    let mut depth: i64 = 0;
    let mut in_string = false;
    let mut in_comment = false;
    for ch in buffer.chars() {
        match ch {
            '\n' => in_comment = false,
            _ if in_comment => {}
            '"' => in_string = !in_string,
            _ if in_string => {}
            ';' => in_comment = true,
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }
    depth > 0
}

fn print_help() {
    println!("{}", bold("Commands:"));
    println!("  :help     show this help");
    println!("  :env      list global variables and functions");
    println!("  :reset    start a fresh session");
    println!("  :quit     exit the REPL");
    println!();
    println!("{}", bold("Anything else is evaluated as GILL source."));
}

fn print_env(interp: &Interpreter) {
    let globals = interp.globals().borrow();
    let vars = globals.var_names();
    let funcs = globals.function_names();
    if vars.is_empty() && funcs.is_empty() {
        println!("{}", gray("(empty)"));
        return;
    }
    if !vars.is_empty() {
        println!("{} {}", bold("variables:"), vars.join(", "));
    }
    if !funcs.is_empty() {
        println!("{} {}", bold("functions:"), funcs.join(", "));
    }
}

/// Path to the REPL history file (~/.gill/repl_history).
fn get_history_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let mut path = PathBuf::from(home);
    path.push(".gill");
    path.push("repl_history");
    Some(path)
}
