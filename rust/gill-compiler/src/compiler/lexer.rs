//! Priority-ordered lexer for GILL source code.

use crate::compiler::tokens::{Span, Token, TokenKind, TypeTag};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at line {line}, col {col}")]
    UnexpectedChar { ch: char, line: u32, col: u32 },
    #[error("unterminated string at line {line}, col {col}")]
    UnterminatedString { line: u32, col: u32 },
    #[error("malformed character literal at line {line}, col {col}")]
    MalformedChar { line: u32, col: u32 },
    #[error("invalid number at line {line}, col {col}")]
    InvalidNumber { line: u32, col: u32 },
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn span_here(&self) -> Span {
        Span::new(self.line, self.col)
    }

    /// Skip whitespace and `;` line comments. Comments are erased here, in
    /// the scanner, before any pattern matching happens.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == ';' {
                while let Some(c) = self.current() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Tokenize the whole source, appending a final `Eof` token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let Some(ch) = self.current() else {
                tokens.push(Token::new(TokenKind::Eof, self.span_here()));
                return Ok(tokens);
            };
            let span = self.span_here();

            // Two-character operators take priority over their one-character
            // prefixes.
            if let Some(kind) = self.match_two_char(ch) {
                tokens.push(Token::new(kind, span));
                continue;
            }

            let token = if ch.is_ascii_digit() {
                self.read_number(span)?
            } else if ch == '"' {
                self.read_string(span)?
            } else if ch == '\'' {
                self.read_char(span)?
            } else if ch == '(' {
                // `(type)` folds into a single cast token; any other `(`
                // opens a parenthesized expression.
                if let Some(tag) = self.try_read_cast() {
                    Token::new(TokenKind::Cast(tag), span)
                } else {
                    self.advance();
                    Token::new(TokenKind::LParen, span)
                }
            } else if ch.is_ascii_alphabetic() || ch == '_' {
                self.read_word(span)
            } else {
                let kind = match ch {
                    '+' => TokenKind::Add,
                    '-' => TokenKind::Sub,
                    '*' => TokenKind::Mul,
                    '/' => TokenKind::Div,
                    '%' => TokenKind::Mod,
                    '<' => TokenKind::Lt,
                    '>' => TokenKind::Gt,
                    '!' => TokenKind::Not,
                    ',' => TokenKind::Comma,
                    ':' => TokenKind::Colon,
                    ')' => TokenKind::RParen,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    _ => {
                        return Err(LexError::UnexpectedChar {
                            ch,
                            line: span.line,
                            col: span.column,
                        })
                    }
                };
                self.advance();
                Token::new(kind, span)
            };
            tokens.push(token);
        }
    }

    fn match_two_char(&mut self, ch: char) -> Option<TokenKind> {
        let kind = match (ch, self.peek()?) {
            ('=', '=') => TokenKind::Eq,
            ('!', '=') => TokenKind::NotEq,
            ('<', '=') => TokenKind::LtEq,
            ('>', '=') => TokenKind::GtEq,
            ('&', '&') => TokenKind::And,
            ('|', '|') => TokenKind::Or,
            ('+', '+') => TokenKind::Inc,
            ('-', '-') => TokenKind::Dec,
            ('/', '/') => TokenKind::FloorDiv,
            (':', ':') => TokenKind::ScopeRes,
            _ => return None,
        };
        self.advance();
        self.advance();
        Some(kind)
    }

    /// Digits, optionally followed by `.` and more digits. No dot means an
    /// integer token; a dot means a float, so `1.` is the float 1.0.
    fn read_number(&mut self, span: Span) -> Result<Token, LexError> {
        let mut text = String::new();
        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let mut is_float = false;
        if self.current() == Some('.') {
            is_float = true;
            text.push('.');
            self.advance();
            while let Some(c) = self.current() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        let kind = if is_float {
            let value = text.parse::<f64>().map_err(|_| LexError::InvalidNumber {
                line: span.line,
                col: span.column,
            })?;
            TokenKind::FloatLit(value)
        } else {
            let value = text.parse::<i64>().map_err(|_| LexError::InvalidNumber {
                line: span.line,
                col: span.column,
            })?;
            TokenKind::IntLit(value)
        };
        Ok(Token::new(kind, span))
    }

    /// `"…"` with no embedded quotes; the surrounding quotes are stripped.
    fn read_string(&mut self, span: Span) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.current() {
                None => {
                    return Err(LexError::UnterminatedString {
                        line: span.line,
                        col: span.column,
                    })
                }
                Some('"') => {
                    self.advance();
                    return Ok(Token::new(TokenKind::StringLit(text), span));
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
    }

    /// `'c'` — exactly one character between the quotes.
    fn read_char(&mut self, span: Span) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let ch = match self.current() {
            Some(c) if c != '\'' && c != '\n' => c,
            _ => {
                return Err(LexError::MalformedChar {
                    line: span.line,
                    col: span.column,
                })
            }
        };
        self.advance();
        if self.current() != Some('\'') {
            return Err(LexError::MalformedChar {
                line: span.line,
                col: span.column,
            });
        }
        self.advance();
        Ok(Token::new(TokenKind::CharLit(ch), span))
    }

    /// Lookahead for the `(type)` cast form. Consumes it and returns the
    /// type tag only on a full match.
    fn try_read_cast(&mut self) -> Option<TypeTag> {
        let mut i = self.pos + 1;
        let mut word = String::new();
        while let Some(c) = self.source.get(i).copied() {
            if c.is_ascii_lowercase() {
                word.push(c);
                i += 1;
            } else {
                break;
            }
        }
        if self.source.get(i).copied() != Some(')') {
            return None;
        }
        let tag = TypeTag::from_keyword(&word)?;
        // `(` + word + `)`
        for _ in 0..word.len() + 2 {
            self.advance();
        }
        Some(tag)
    }

    /// Read a full identifier word, then classify it: keyword, type name,
    /// boolean literal, or plain identifier — in that order.
    fn read_word(&mut self, span: Span) -> Token {
        let mut word = String::new();
        while let Some(c) = self.current() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = if let Some(kw) = TokenKind::from_keyword(&word) {
            kw
        } else if let Some(tag) = TypeTag::from_keyword(&word) {
            TokenKind::Type(tag)
        } else if word == "true" || word == "false" {
            TokenKind::BoolLit(word)
        } else {
            TokenKind::Ident(word)
        };
        Token::new(kind, span)
    }
}
