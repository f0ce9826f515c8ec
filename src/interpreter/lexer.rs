use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::Chars;
use lazy_static::lazy_static;
use thiserror::Error;
use crate::util;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenPos {
    pub line: i32,
    pub column: i32,
}

impl TokenPos {
    pub fn new(line: i32, column: i32) -> TokenPos {
        TokenPos { line, column }
    }

    pub fn begin() -> TokenPos {
        TokenPos::new(1, 1)
    }
}

impl Display for TokenPos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {} column {}]", self.line, self.column)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenType {
    None,

    ParenthesisLeft, ParenthesisRight,
    BracketLeft, BracketRight,
    Comma,

    Assign, Equal, NotEqual,
    Greater, GreaterEqual,
    Less, LessEqual,

    Plus, Minus,
    Multiply, Divide, Modulo,

    Identifier,
    Number,
    String,

    // Keywords
    Say, Kas,
    If, Else,
    While, For, To, Step,
    Break, Continue,
    Function, Return,
    Input,
    True, False,
    And, Or, Not,

    Newline,
    Eof,
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenType> = HashMap::from([
        ("say", TokenType::Say),
        ("kas", TokenType::Kas),
        ("if", TokenType::If),
        ("else", TokenType::Else),
        ("while", TokenType::While),
        ("for", TokenType::For),
        ("to", TokenType::To),
        ("step", TokenType::Step),
        ("break", TokenType::Break),
        ("continue", TokenType::Continue),
        ("function", TokenType::Function),
        ("return", TokenType::Return),
        ("input", TokenType::Input),
        ("true", TokenType::True),
        ("false", TokenType::False),
        ("and", TokenType::And),
        ("or", TokenType::Or),
        ("not", TokenType::Not),
    ]);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    token_type: TokenType,
    source: String,
    start: TokenPos, end: TokenPos,
}

impl Token {
    pub fn new(token_type: TokenType, source: String, start: TokenPos, end: TokenPos) -> Token {
        Token {
            token_type, source,
            start, end
        }
    }

    pub fn empty() -> Token {
        Token {
            token_type: TokenType::None,
            source: String::from(""),
            start: TokenPos::begin(), end: TokenPos::begin(),
        }
    }

    pub fn token_type(&self) -> TokenType { self.token_type }
    pub fn source(&self) -> &str { &self.source }
    pub fn start(&self) -> &TokenPos { &self.start }
    pub fn end(&self) -> &TokenPos { &self.end }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.token_type {
            TokenType::None => f.write_str("None"),
            TokenType::Eof => f.write_str("Eof"),
            TokenType::Newline => f.write_str("Newline"),
            _ => write!(f, "`{}`", self.source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    #[error("{0} Unknown character '{1}'")]
    UnexpectedCharacter(TokenPos, char),
    #[error("{pos} Unterminated string")]
    UnterminatedString {
        pos: TokenPos,
    },
}

impl LexerError {
    pub fn get_pos(&self) -> TokenPos {
        match self {
            LexerError::UnexpectedCharacter(pos, _) => *pos,
            LexerError::UnterminatedString { pos } => *pos,
        }
    }
}

type LexerResult<T> = Result<T, LexerError>;

pub struct Lexer<'source> {
    input: &'source str,

    chars: Peekable<Chars<'source>>,

    start_index: usize,
    current_index: usize,

    start_pos: TokenPos,
    current_pos: TokenPos,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Lexer<'source> {
        Lexer {
            input: source,

            chars: source.chars().peekable(),

            start_index: 0,
            current_index: 0,

            start_pos: TokenPos::begin(),
            current_pos: TokenPos::begin(),
        }
    }

    /// Scans the whole input. The returned stream always ends with exactly one `Eof` token.
    pub fn tokenize(mut self) -> LexerResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.scan_token()?;
            let done = token.token_type() == TokenType::Eof;
            tokens.push(token);

            if done {
                break;
            }
        }

        tracing::trace!(count = tokens.len(), "tokenized source");
        Ok(tokens)
    }

    pub fn scan_token(&mut self) -> LexerResult<Token> {
        self.skip_whitespace();
        self.start_index = self.current_index;
        self.start_pos = self.current_pos;

        let c = match self.consume() {
            Some(c) => c,
            None => return Ok(self.make_token(TokenType::Eof)),
        };

        match c {
            '(' => Ok(self.make_token(TokenType::ParenthesisLeft)),
            ')' => Ok(self.make_token(TokenType::ParenthesisRight)),
            '{' => Ok(self.make_token(TokenType::BracketLeft)),
            '}' => Ok(self.make_token(TokenType::BracketRight)),
            ',' => Ok(self.make_token(TokenType::Comma)),
            '\n' => Ok(self.make_token(TokenType::Newline)),

            '=' => Ok(if self.expect('=') { self.make_token(TokenType::Equal) } else {
                self.make_token(TokenType::Assign)
            }),
            '!' => if self.expect('=') { Ok(self.make_token(TokenType::NotEqual)) } else {
                Err(LexerError::UnexpectedCharacter(self.start_pos, c))
            },
            '>' => Ok(if self.expect('=') { self.make_token(TokenType::GreaterEqual) } else {
                self.make_token(TokenType::Greater)
            }),
            '<' => Ok(if self.expect('=') { self.make_token(TokenType::LessEqual) } else {
                self.make_token(TokenType::Less)
            }),

            '+' => Ok(self.make_token(TokenType::Plus)),
            '-' => Ok(self.make_token(TokenType::Minus)),
            '*' => Ok(self.make_token(TokenType::Multiply)),
            '/' => Ok(self.make_token(TokenType::Divide)),
            '%' => Ok(self.make_token(TokenType::Modulo)),

            '"' | '\'' => self.scan_string(c),
            c if util::is_numeric(c) => self.scan_number(),
            c if util::is_alphabetic(c) => self.scan_identifier(),

            _ => Err(LexerError::UnexpectedCharacter(self.start_pos, c)),
        }
    }

    // The token keeps its quotes and escapes; the parser decodes them.
    fn scan_string(&mut self, quote: char) -> LexerResult<Token> {
        loop {
            match self.consume() {
                Some(c) if c == quote => break,
                Some('\\') => {
                    if self.consume().is_none() {
                        return Err(LexerError::UnterminatedString { pos: self.start_pos });
                    }
                },
                Some(_) => {},
                None => return Err(LexerError::UnterminatedString { pos: self.start_pos }),
            }
        }

        Ok(self.make_token(TokenType::String))
    }

    fn scan_number(&mut self) -> LexerResult<Token> {
        while let Some('0'..='9') = self.peek() {
            self.consume();
        }

        if let Some('.') = self.peek() {
            if let Some('0'..='9') = self.peek_next() {
                self.consume();

                while let Some('0'..='9') = self.peek() {
                    self.consume();
                }
            }
        }

        Ok(self.make_token(TokenType::Number))
    }

    fn scan_identifier(&mut self) -> LexerResult<Token> {
        while let Some(c) = self.peek() {
            if !util::is_alphanumeric(c) {
                break;
            }

            self.consume();
        }

        let name = &self.input[self.start_index..self.current_index];
        let token_type = KEYWORDS.get(name).copied().unwrap_or(TokenType::Identifier);

        Ok(Token { source: name.to_owned(), token_type, start: self.start_pos, end: self.current_pos })
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        Token {
            token_type,
            source: self.input[self.start_index..self.current_index].to_owned(),

            start: self.start_pos, end: self.current_pos,
        }
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.current_index += c.len_utf8();

        if c == '\n' {
            self.current_pos.line += 1;
            self.current_pos.column = 1;
        } else {
            self.current_pos.column += 1;
        }

        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_next(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next()
    }

    fn expect(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.consume();
            true
        } else {
            false
        }
    }

    // Newlines are tokens, so only horizontal whitespace and comments are skipped
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => { self.consume(); },
                '#' => self.skip_line(),
                _ => return,
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                return;
            }

            self.consume();
        }
    }
}

#[cfg(test)]
mod tests;
