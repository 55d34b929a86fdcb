//! Error diagnostics with source snippets and ANSI colors.

use crate::compiler::lexer::LexError;
use crate::compiler::parser::ParseError;
use crate::CompileError;

/// A rendered diagnostic with source context.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub title: &'static str,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub col: Option<u32>,
    pub source_line: Option<String>,
}

impl Diagnostic {
    /// Build a diagnostic from a front-end error, pulling the offending
    /// source line out of the original buffer.
    pub fn from_compile_error(err: &CompileError, source: &str, file: Option<&str>) -> Self {
        let (title, line, col) = match err {
            CompileError::Lex(lex) => {
                let (line, col) = lex_location(lex);
                ("LEX ERROR", Some(line), Some(col))
            }
            CompileError::Parse(parse) => {
                let (line, col) = parse_location(parse);
                ("PARSE ERROR", Some(line), Some(col))
            }
        };
        let source_line = line
            .and_then(|l| source.lines().nth(l as usize - 1))
            .map(|l| l.to_string());
        Self {
            title,
            message: err.to_string(),
            file: file.map(|f| f.to_string()),
            line,
            col,
            source_line,
        }
    }

    /// Render with ANSI colors for the terminal.
    pub fn render_ansi(&self) -> String {
        let mut out = String::new();

        let location = match (&self.file, self.line, self.col) {
            (Some(file), Some(line), Some(col)) => format!(" {}:{}:{} ", file, line, col),
            (None, Some(line), Some(col)) => format!(" {}:{} ", line, col),
            _ => " ".to_string(),
        };
        let width: usize = 72;
        let dashes = width.saturating_sub(self.title.len() + location.len() + 5);
        out.push_str(&cyan(&format!(
            "── {} {}{}──\n",
            self.title,
            "─".repeat(dashes),
            location
        )));
        out.push('\n');
        out.push_str(&self.message);
        out.push('\n');

        if let (Some(src), Some(line), Some(col)) = (&self.source_line, self.line, self.col) {
            out.push('\n');
            let gutter = format!("{:>4} | ", line);
            out.push_str(&gray(&gutter));
            out.push_str(src);
            out.push('\n');
            let pad = " ".repeat(gutter.len() + col.saturating_sub(1) as usize);
            out.push_str(&pad);
            out.push_str(&red("^\n"));
        }
        out
    }
}

fn lex_location(err: &LexError) -> (u32, u32) {
    match err {
        LexError::UnexpectedChar { line, col, .. }
        | LexError::UnterminatedString { line, col }
        | LexError::MalformedChar { line, col }
        | LexError::InvalidNumber { line, col } => (*line, *col),
    }
}

fn parse_location(err: &ParseError) -> (u32, u32) {
    match err {
        ParseError::Unexpected { line, col, .. }
        | ParseError::ArrayTooLong { line, col, .. }
        | ParseError::DefaultNotLast { line, col } => (*line, *col),
    }
}

fn cyan(s: &str) -> String {
    format!("\x1b[36m{}\x1b[0m", s)
}
fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}
fn gray(s: &str) -> String {
    format!("\x1b[90m{}\x1b[0m", s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile_source;

    #[test]
    fn test_diagnostic_points_at_offending_line() {
        let src = "out 1\ndefine 1 int 2\n";
        let err = compile_source(src).unwrap_err();
        let diag = Diagnostic::from_compile_error(&err, src, Some("bad.gill"));
        assert_eq!(diag.title, "PARSE ERROR");
        assert_eq!(diag.line, Some(2));
        assert_eq!(diag.source_line.as_deref(), Some("define 1 int 2"));
        let rendered = diag.render_ansi();
        assert!(rendered.contains("bad.gill:2:8"));
    }
}
