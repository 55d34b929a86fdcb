//! Recursive descent parser for GILL.

use crate::compiler::ast::{BinOp, CaseArm, FunctionDef, Node, Number, Param, UnaryOp};
use crate::compiler::tokens::{Token, TokenKind, TypeTag};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected token {found} at line {line}, col {col}; expected {expected}")]
    Unexpected {
        found: String,
        expected: String,
        line: u32,
        col: u32,
    },
    #[error(
        "array literal has {got} elements but declares size {declared} at line {line}, col {col}"
    )]
    ArrayTooLong {
        declared: usize,
        got: usize,
        line: u32,
        col: u32,
    },
    #[error("default arm must come last in a switch at line {line}, col {col}")]
    DefaultNotLast { line: u32, col: u32 },
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));
        Self { tokens, pos: 0 }
    }

    // ── Cursor primitives ──

    fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn expect_type(&mut self) -> Result<TypeTag, ParseError> {
        match self.peek_kind() {
            TokenKind::Type(tag) => {
                let tag = tag.clone();
                self.advance();
                Ok(tag)
            }
            _ => Err(self.unexpected("type name")),
        }
    }

    fn expect_number(&mut self) -> Result<Number, ParseError> {
        match *self.peek_kind() {
            TokenKind::IntLit(n) => {
                self.advance();
                Ok(Number::Int(n))
            }
            TokenKind::FloatLit(n) => {
                self.advance();
                Ok(Number::Float(n))
            }
            _ => Err(self.unexpected("number")),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let tok = self.current();
        ParseError::Unexpected {
            found: tok.kind.to_string(),
            expected: expected.to_string(),
            line: tok.span.line,
            col: tok.span.column,
        }
    }

    // ── Entry point ──

    /// Parse the full token sequence into a top-level block.
    pub fn parse_program(&mut self) -> Result<Node, ParseError> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        Ok(Node::Block(statements))
    }

    // ── Statements ──

    fn parse_statement(&mut self) -> Result<Node, ParseError> {
        match self.peek_kind() {
            TokenKind::Define => self.parse_define(),
            TokenKind::Assign => self.parse_assign(),
            TokenKind::Function => self.parse_function_def(),
            TokenKind::Namespace => self.parse_namespace(),
            TokenKind::Import => self.parse_import(),
            TokenKind::Return => {
                self.advance();
                let expr = self.parse_boolean()?;
                Ok(Node::Return(Box::new(expr)))
            }
            TokenKind::Exec => self.parse_function_call(),
            TokenKind::Out => {
                self.advance();
                let expr = self.parse_boolean()?;
                Ok(Node::Output(Box::new(expr)))
            }
            TokenKind::LBrace => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Try => self.parse_try_catch(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::ForEach => self.parse_foreach(),
            TokenKind::Ident(_) => match self.peek_kind_at(1) {
                TokenKind::Inc => {
                    let name = self.expect_ident()?;
                    self.advance();
                    Ok(Node::Inc(name))
                }
                TokenKind::Dec => {
                    let name = self.expect_ident()?;
                    self.advance();
                    Ok(Node::Dec(name))
                }
                _ => self.parse_boolean(),
            },
            _ => self.parse_boolean(),
        }
    }

    /// `define name value-type value` or `define name [size] elem-type [e, …]`.
    fn parse_define(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::Define)?;
        let name = self.expect_ident()?;

        if self.check(&TokenKind::LBracket) {
            self.advance();
            let declared_size = if self.check(&TokenKind::IntLit(0)) {
                match self.expect_number()? {
                    Number::Int(n) => Some(n.max(0) as usize),
                    Number::Float(_) => unreachable!(),
                }
            } else {
                None
            };
            self.expect(&TokenKind::RBracket)?;
            let declared_type = self.expect_type()?;
            let value = self.parse_array(declared_size)?;
            return Ok(Node::Define {
                name,
                declared_type,
                value: Box::new(value),
            });
        }

        let declared_type = self.expect_type()?;
        let value = self.parse_boolean()?;
        Ok(Node::Define {
            name,
            declared_type,
            value: Box::new(value),
        })
    }

    fn parse_assign(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::Assign)?;
        let name = self.expect_ident()?;
        let value = self.parse_boolean()?;
        Ok(Node::Assign {
            name,
            value: Box::new(value),
        })
    }

    fn parse_if(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::If)?;
        let condition = self.parse_boolean()?;
        let then_block = self.parse_block()?;
        let else_block = if self.check(&TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_block()?))
        } else {
            None
        };
        Ok(Node::If {
            condition: Box::new(condition),
            then_block: Box::new(then_block),
            else_block,
        })
    }

    fn parse_switch(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::Switch)?;
        self.expect(&TokenKind::LParen)?;
        let scrutinee = self.parse_boolean()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBrace)?;

        let mut cases = Vec::new();
        let mut default = None;
        while !self.check(&TokenKind::RBrace) {
            if self.check(&TokenKind::Case) {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let value = self.parse_boolean()?;
                self.expect(&TokenKind::RParen)?;
                let body = self.parse_block()?;
                if default.is_some() {
                    let tok = self.current();
                    return Err(ParseError::DefaultNotLast {
                        line: tok.span.line,
                        col: tok.span.column,
                    });
                }
                cases.push(CaseArm { value, body });
            } else if self.check(&TokenKind::Default) {
                self.advance();
                default = Some(Box::new(self.parse_block()?));
            } else {
                return Err(self.unexpected("case or default"));
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Node::Switch {
            scrutinee: Box::new(scrutinee),
            cases,
            default,
        })
    }

    fn parse_try_catch(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::Try)?;
        let try_block = self.parse_block()?;
        self.expect(&TokenKind::Catch)?;
        let catch_block = self.parse_block()?;
        let finally_block = if self.check(&TokenKind::Finally) {
            self.advance();
            Some(Box::new(self.parse_block()?))
        } else {
            None
        };
        Ok(Node::TryCatch {
            try_block: Box::new(try_block),
            catch_block: Box::new(catch_block),
            finally_block,
        })
    }

    fn parse_while(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::While)?;
        let condition = self.parse_boolean()?;
        let body = self.parse_block()?;
        Ok(Node::While {
            condition: Box::new(condition),
            body: Box::new(body),
        })
    }

    /// `for (define name type N, cond, step) { … }`
    fn parse_for(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::For)?;
        self.expect(&TokenKind::LParen)?;
        self.expect(&TokenKind::Define)?;
        let init_name = self.expect_ident()?;
        self.expect_type()?; // the binding type is derived from the literal
        let init_value = self.expect_number()?;
        self.expect(&TokenKind::Comma)?;
        let condition = self.parse_boolean()?;
        self.expect(&TokenKind::Comma)?;
        let step = self.parse_statement()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Node::For {
            init_name,
            init_value,
            condition: Box::new(condition),
            step: Box::new(step),
            body: Box::new(body),
        })
    }

    /// `foreach (define name type : iterable) { … }`
    fn parse_foreach(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::ForEach)?;
        self.expect(&TokenKind::LParen)?;
        self.expect(&TokenKind::Define)?;
        let iter_name = self.expect_ident()?;
        self.expect_type()?;
        self.expect(&TokenKind::Colon)?;
        let iterable = self.parse_boolean()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Node::ForEach {
            iter_name,
            iterable: Box::new(iterable),
            body: Box::new(body),
        })
    }

    /// `function return-type name(type param [default expr], …) { … }`
    fn parse_function_def(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::Function)?;
        let return_type = match self.expect_type()? {
            TypeTag::Void => None,
            tag => Some(tag),
        };
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let declared_type = self.expect_type()?;
                let param_name = self.expect_ident()?;
                let default_value = if self.check(&TokenKind::Default) {
                    self.advance();
                    Some(self.parse_boolean()?)
                } else {
                    None
                };
                params.push(Param {
                    name: param_name,
                    declared_type,
                    default_value,
                });
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Node::FunctionDef(Rc::new(FunctionDef {
            name,
            params,
            body,
            return_type,
        })))
    }

    /// `exec name(args)` or `exec module::name(args)`.
    fn parse_function_call(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::Exec)?;
        if !self.check(&TokenKind::Ident(String::new())) {
            return Err(self.unexpected("function name"));
        }
        let (module, name) = if matches!(self.peek_kind_at(1), TokenKind::ScopeRes) {
            let module = self.expect_ident()?;
            self.expect(&TokenKind::ScopeRes)?;
            (Some(module), self.expect_ident()?)
        } else {
            (None, self.expect_ident()?)
        };

        let mut args = Vec::new();
        self.expect(&TokenKind::LParen)?;
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_boolean()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(Node::FunctionCall { name, args, module })
    }

    fn parse_import(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::Import)?;
        let name = self.expect_ident()?;
        Ok(Node::Import(name))
    }

    fn parse_namespace(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::Namespace)?;
        let name = self.expect_ident()?;
        let body = self.parse_block()?;
        Ok(Node::Namespace {
            name,
            body: Box::new(body),
        })
    }

    fn parse_block(&mut self) -> Result<Node, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.unexpected("}"));
            }
            statements.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Node::Block(statements))
    }

    /// `[e1, e2, …]` with an optional declared size from the define head.
    /// More literal elements than the declared size is a parse error.
    fn parse_array(&mut self, declared: Option<usize>) -> Result<Node, ParseError> {
        let open = self.expect(&TokenKind::LBracket)?;
        let mut elements = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                elements.push(self.parse_boolean()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RBracket)?;
        if let Some(size) = declared {
            if elements.len() > size {
                return Err(ParseError::ArrayTooLong {
                    declared: size,
                    got: elements.len(),
                    line: open.span.line,
                    col: open.span.column,
                });
            }
        }
        let declared_size = declared.unwrap_or(elements.len());
        Ok(Node::Array {
            elements,
            declared_size,
        })
    }

    fn parse_array_access(&mut self, array: String) -> Result<Node, ParseError> {
        self.expect(&TokenKind::LBracket)?;
        let index = self.parse_boolean()?;
        self.expect(&TokenKind::RBracket)?;
        Ok(Node::ArrayAccess {
            array,
            index: Box::new(index),
        })
    }

    // ── Expressions ──
    //
    // boolean    -> comparison ((AND|OR) comparison)*
    // comparison -> expr ((EQ|NEQ|LT|LTE|GT|GTE) expr)*
    // expr       -> term ((ADD|SUB) term)*
    // term       -> factor ((MUL|DIV|FDIV|MOD) factor)*
    //
    // All levels chain left-associatively.

    pub fn parse_boolean(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::And => BinOp::And,
                TokenKind::Or => BinOp::Or,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            node = Node::BinOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_comparison(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_expr()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Eq => BinOp::Eq,
                TokenKind::NotEq => BinOp::NotEq,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_expr()?;
            node = Node::BinOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_expr(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Add => BinOp::Add,
                TokenKind::Sub => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            node = Node::BinOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_factor()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Mul => BinOp::Mul,
                TokenKind::Div => BinOp::Div,
                TokenKind::FloorDiv => BinOp::FloorDiv,
                TokenKind::Mod => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            node = Node::BinOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_factor(&mut self) -> Result<Node, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::IntLit(n) => {
                self.advance();
                Ok(Node::Number(Number::Int(n)))
            }
            TokenKind::FloatLit(n) => {
                self.advance();
                Ok(Node::Number(Number::Float(n)))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Ok(Node::Str(s))
            }
            TokenKind::CharLit(c) => {
                self.advance();
                Ok(Node::Char(c))
            }
            TokenKind::BoolLit(s) => {
                self.advance();
                Ok(Node::Boolean(s))
            }
            TokenKind::Ident(name) => {
                if matches!(self.peek_kind_at(1), TokenKind::ScopeRes) {
                    self.advance();
                    self.advance();
                    let member = self.expect_ident()?;
                    return Ok(Node::ScopeRef { scope: name, member });
                }
                self.advance();
                if self.check(&TokenKind::LBracket) {
                    return self.parse_array_access(name);
                }
                // Postfix ++/-- in expression position is consumed but has
                // no side effect; the mutating forms are statements.
                if self.check(&TokenKind::Inc) || self.check(&TokenKind::Dec) {
                    self.advance();
                }
                Ok(Node::ident(&name))
            }
            TokenKind::LParen => {
                self.advance();
                let node = self.parse_boolean()?;
                self.expect(&TokenKind::RParen)?;
                Ok(node)
            }
            TokenKind::Not => {
                self.advance();
                let operand = self.parse_factor()?;
                Ok(Node::UnaryOp {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                })
            }
            TokenKind::Out => {
                self.advance();
                let expr = self.parse_factor()?;
                Ok(Node::Output(Box::new(expr)))
            }
            TokenKind::Exec => self.parse_function_call(),
            TokenKind::Cast(target) => {
                self.advance();
                let expr = self.parse_factor()?;
                Ok(Node::Cast {
                    target,
                    expr: Box::new(expr),
                })
            }
            _ => Err(self.unexpected("expression")),
        }
    }
}
