// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # LogQL lexer
//!
//! Spans are UTF-8 byte offsets into the source, half-open `[start, end)`.
//! Whitespace and `#` comments are skipped. The token list always ends with a
//! single [`TokenKind::Eof`] token whose span is empty and sits at the end of
//! input. Lexing never fails: characters that cannot start a token, and
//! unterminated strings, become [`TokenKind::Error`] tokens.

use crate::kind::NodeKind;

/// Half-open byte span into the source string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `=`
    Eq,
    /// `!=`
    Neq,
    /// `=~`
    Re,
    /// `!~`
    Nre,
    /// `==`
    CmpEq,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `|`
    Pipe,
    /// `|=`
    PipeExact,
    /// `|~`
    PipeMatch,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `^`
    Pow,
    /// Quoted literal, delimiters included
    String,
    Number,
    /// Number with time units, e.g. `5m` or `1h30m`
    Duration,
    /// Identifier or contextual keyword
    Identifier,
    /// `--strict` or `--keep-empty`
    ParserFlag,
    Error,
    Eof,
}

impl TokenKind {
    /// The tree node a token becomes when it is kept as a leaf.
    ///
    /// Punctuation is anonymous and has no node.
    pub fn leaf_kind(self) -> Option<NodeKind> {
        let kind = match self {
            TokenKind::Eq => NodeKind::Eq,
            TokenKind::Neq => NodeKind::Neq,
            TokenKind::Re => NodeKind::Re,
            TokenKind::Nre => NodeKind::Nre,
            TokenKind::CmpEq => NodeKind::CmpEq,
            TokenKind::Gt => NodeKind::Gt,
            TokenKind::Gte => NodeKind::Gte,
            TokenKind::Lt => NodeKind::Lt,
            TokenKind::Lte => NodeKind::Lte,
            TokenKind::Pipe => NodeKind::Pipe,
            TokenKind::PipeExact => NodeKind::PipeExact,
            TokenKind::PipeMatch => NodeKind::PipeMatch,
            TokenKind::Add => NodeKind::Add,
            TokenKind::Sub => NodeKind::Sub,
            TokenKind::Mul => NodeKind::Mul,
            TokenKind::Div => NodeKind::Div,
            TokenKind::Mod => NodeKind::Mod,
            TokenKind::Pow => NodeKind::Pow,
            TokenKind::String => NodeKind::String,
            TokenKind::Number => NodeKind::Number,
            TokenKind::Duration => NodeKind::Duration,
            TokenKind::Identifier => NodeKind::Identifier,
            TokenKind::ParserFlag => NodeKind::ParserFlag,
            _ => return None,
        };
        Some(kind)
    }
}

/// A token with its source span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

const DURATION_UNITS: &[&str] = &["ns", "us", "µs", "ms", "s", "m", "h", "d", "w", "y"];
const PARSER_FLAGS: &[&str] = &["--strict", "--keep-empty"];

/// Lex the input into tokens.
pub fn lex(input: &str) -> Vec<Token> {
    let mut lexer = Lexer { src: input, pos: 0 };
    let mut tokens = Vec::new();

    while let Some(ch) = lexer.peek() {
        let start = lexer.pos;

        if ch.is_whitespace() {
            lexer.bump();
            continue;
        }

        if ch == '#' {
            lexer.eat_while(|c| c != '\n');
            continue;
        }

        lexer.bump();
        let kind = match ch {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '=' => {
                if lexer.eat('~') {
                    TokenKind::Re
                } else if lexer.eat('=') {
                    TokenKind::CmpEq
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if lexer.eat('=') {
                    TokenKind::Neq
                } else if lexer.eat('~') {
                    TokenKind::Nre
                } else {
                    TokenKind::Error
                }
            }
            '|' => {
                if lexer.eat('=') {
                    TokenKind::PipeExact
                } else if lexer.eat('~') {
                    TokenKind::PipeMatch
                } else {
                    TokenKind::Pipe
                }
            }
            '>' => {
                if lexer.eat('=') {
                    TokenKind::Gte
                } else {
                    TokenKind::Gt
                }
            }
            '<' => {
                if lexer.eat('=') {
                    TokenKind::Lte
                } else {
                    TokenKind::Lt
                }
            }
            '-' if lexer.peek() == Some('-') => {
                lexer.eat_while(|c| c == '-' || c.is_ascii_alphanumeric());
                if PARSER_FLAGS.contains(&&input[start..lexer.pos]) {
                    TokenKind::ParserFlag
                } else {
                    TokenKind::Error
                }
            }
            '+' => TokenKind::Add,
            '-' => TokenKind::Sub,
            '*' => TokenKind::Mul,
            '/' => TokenKind::Div,
            '%' => TokenKind::Mod,
            '^' => TokenKind::Pow,
            '"' | '\'' => lexer.quoted(ch, true),
            '`' => lexer.quoted(ch, false),
            c if c.is_ascii_digit() => lexer.number(start),
            c if is_ident_start(c) => {
                lexer.eat_while(is_ident_continue);
                TokenKind::Identifier
            }
            _ => TokenKind::Error,
        };

        tokens.push(Token {
            kind,
            span: Span::new(start, lexer.pos),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(input.len(), input.len()),
    });
    tokens
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl Lexer<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
    }

    /// The opening delimiter has been consumed.
    fn quoted(&mut self, delimiter: char, escapes: bool) -> TokenKind {
        while let Some(ch) = self.bump() {
            if ch == delimiter {
                return TokenKind::String;
            }
            if escapes && ch == '\\' {
                self.bump();
            }
        }
        TokenKind::Error
    }

    /// The first digit has been consumed.
    fn number(&mut self, start: usize) -> TokenKind {
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.src[self.pos + 1..].starts_with(|c: char| c.is_ascii_digit()) {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }

        let number_end = self.pos;
        if !self.peek().is_some_and(char::is_alphabetic) {
            return TokenKind::Number;
        }

        // Try to extend the number into a duration such as `1h30m`.
        let rest = &self.src[start..];
        let run = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '.'))
            .unwrap_or(rest.len());
        if is_duration(&rest[..run]) {
            self.pos = start + run;
            TokenKind::Duration
        } else {
            self.pos = number_end;
            TokenKind::Number
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// `(<number><unit>)+`
fn is_duration(text: &str) -> bool {
    let mut rest = text;
    let mut groups = 0;

    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if digits == 0 {
            return false;
        }
        rest = &rest[digits..];

        let Some(unit) = DURATION_UNITS.iter().find(|unit| rest.starts_with(*unit)) else {
            return false;
        };
        rest = &rest[unit.len()..];
        groups += 1;
    }

    groups > 0
}
