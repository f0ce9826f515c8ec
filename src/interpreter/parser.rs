use std::rc::Rc;
use lazy_static::lazy_static;
use thiserror::Error;
use crate::interpreter::ast::{BinaryOperator, Expr, FunctionDecl, Program, Stmt, UnaryOperator};
use crate::interpreter::lexer::{Token, TokenPos, TokenType};

lazy_static! {
    static ref EQUALITY_OPERATORS: [(TokenType, BinaryOperator); 2] = [
        (TokenType::Equal, BinaryOperator::Equal),
        (TokenType::NotEqual, BinaryOperator::NotEqual),
    ];

    static ref COMPARISON_OPERATORS: [(TokenType, BinaryOperator); 4] = [
        (TokenType::Less, BinaryOperator::Less),
        (TokenType::LessEqual, BinaryOperator::LessEqual),
        (TokenType::Greater, BinaryOperator::Greater),
        (TokenType::GreaterEqual, BinaryOperator::GreaterEqual),
    ];

    static ref TERM_OPERATORS: [(TokenType, BinaryOperator); 2] = [
        (TokenType::Plus, BinaryOperator::Add),
        (TokenType::Minus, BinaryOperator::Subtract),
    ];

    static ref FACTOR_OPERATORS: [(TokenType, BinaryOperator); 3] = [
        (TokenType::Multiply, BinaryOperator::Multiply),
        (TokenType::Divide, BinaryOperator::Divide),
        (TokenType::Modulo, BinaryOperator::Modulo),
    ];

    static ref UNARY_OPERATORS: [(TokenType, UnaryOperator); 3] = [
        (TokenType::Minus, UnaryOperator::Negate),
        (TokenType::Plus, UnaryOperator::Plus),
        (TokenType::Not, UnaryOperator::Not),
    ];

    // Tokens after which a bare `return` carries no value
    static ref RETURN_TERMINATORS: [TokenType; 3] = [
        TokenType::Newline, TokenType::BracketRight, TokenType::Eof,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{pos} Error at {}: {message}", describe_found(.found))]
pub struct ParseError {
    pub pos: TokenPos,
    pub found: Option<String>,
    pub message: String,
}

fn describe_found(found: &Option<String>) -> String {
    match found {
        Some(source) if source == "\n" => String::from("newline"),
        Some(source) => format!("'{}'", source),
        None => String::from("EOF"),
    }
}

impl ParseError {
    fn at(token: &Token, message: impl Into<String>) -> ParseError {
        ParseError {
            pos: *token.start(),
            found: if token.token_type() == TokenType::Eof { None } else { Some(token.source().to_owned()) },
            message: message.into(),
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Deepest allowed nesting of statements and expressions.
pub const MAX_NESTING_DEPTH: usize = 256;

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    previous: Token, current: Token,

    loop_depth: usize,
    nesting: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Parser {
        Parser {
            tokens,
            index: 0,
            previous: Token::empty(), current: Token::empty(),
            loop_depth: 0,
            nesting: 0,
        }
    }

    // Statement parsing

    pub fn parse(mut self) -> ParseResult<Program> {
        self.consume();

        let mut statements = Vec::new();
        self.skip_newlines();

        while !self.is_eof() {
            statements.push(self.parse_statement()?);
            self.skip_newlines();
        }

        tracing::trace!(count = statements.len(), "parsed program");
        Ok(Program::new(statements))
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        self.nested(Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> ParseResult<Stmt> {
        if self.matches(TokenType::Function) {
            self.parse_function_definition()
        } else if self.matches(TokenType::If) {
            self.parse_if_statement()
        } else if self.matches(TokenType::While) {
            self.parse_while_statement()
        } else if self.matches(TokenType::For) {
            self.parse_for_statement()
        } else if self.matches(TokenType::Return) {
            self.parse_return_statement()
        } else if self.matches(TokenType::Say) {
            Ok(Stmt::Say(self.parse_expression()?))
        } else if self.matches(TokenType::Kas) {
            self.parse_assignment_statement()
        } else if self.matches(TokenType::BracketLeft) {
            Ok(Stmt::Block(self.parse_block()?))
        } else if self.matches(TokenType::Break) {
            self.parse_loop_control(Stmt::Break, "break")
        } else if self.matches(TokenType::Continue) {
            self.parse_loop_control(Stmt::Continue, "continue")
        } else {
            Err(self.error_at_current("Unexpected token"))
        }
    }

    fn parse_function_definition(&mut self) -> ParseResult<Stmt> {
        let name = self.expect(TokenType::Identifier, "Expected function name after 'function'")?;
        self.expect(TokenType::ParenthesisLeft, "Expected '(' after function name")?;

        let mut params: Vec<String> = vec![];

        if !self.check(TokenType::ParenthesisRight) {
            loop {
                let param = self.expect(TokenType::Identifier, "Expected parameter name")?;

                if params.iter().any(|existing| *existing == *param.source()) {
                    return Err(ParseError::at(&param, "Duplicate parameter"));
                }

                params.push(param.source().to_owned());

                if !self.matches(TokenType::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenType::ParenthesisRight, "Expected ')' after function parameters")?;
        self.skip_newlines();
        self.expect(TokenType::BracketLeft, "Expected '{' before function body")?;

        // `break` inside a function never refers to a loop around the definition
        let enclosing_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        let body = self.parse_block();
        self.loop_depth = enclosing_loop_depth;

        Ok(Stmt::FunctionDefinition(Rc::new(FunctionDecl {
            name: name.source().to_owned(),
            params,
            body: body?,
        })))
    }

    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        let condition = self.parse_expression()?;
        self.skip_newlines();
        let then = self.parse_statement()?;

        let otherwise = if self.matches_after_newlines(TokenType::Else) {
            self.skip_newlines();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If { condition, then: Box::new(then), otherwise })
    }

    fn parse_while_statement(&mut self) -> ParseResult<Stmt> {
        let condition = self.parse_expression()?;
        self.skip_newlines();

        self.loop_depth += 1;
        let body = self.parse_statement();
        self.loop_depth -= 1;

        Ok(Stmt::While { condition, body: Box::new(body?) })
    }

    fn parse_for_statement(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenType::Kas, "Expected 'kas' after 'for'")?;
        let variable = self.expect(TokenType::Identifier, "Expected loop variable name after 'kas'")?;
        self.expect(TokenType::Assign, "Expected '=' after loop variable name")?;

        let start = self.parse_expression()?;
        self.expect(TokenType::To, "Expected 'to' after loop start value")?;
        let end = self.parse_expression()?;

        let step = if self.matches(TokenType::Step) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.skip_newlines();
        self.expect(TokenType::BracketLeft, "Expected '{' before loop body")?;

        self.loop_depth += 1;
        let body = self.parse_block();
        self.loop_depth -= 1;

        Ok(Stmt::For { variable: variable.source().to_owned(), start, end, step, body: body? })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        if self.check_any(&*RETURN_TERMINATORS) {
            return Ok(Stmt::Return(None));
        }

        Ok(Stmt::Return(Some(self.parse_expression()?)))
    }

    fn parse_assignment_statement(&mut self) -> ParseResult<Stmt> {
        let name = self.expect(TokenType::Identifier, "Expected variable name after 'kas'")?;
        self.expect(TokenType::Assign, "Expected '=' after variable name")?;
        let expr = self.parse_expression()?;

        Ok(Stmt::Assignment { name: name.source().to_owned(), expr })
    }

    fn parse_loop_control(&mut self, stmt: Stmt, keyword: &str) -> ParseResult<Stmt> {
        if self.loop_depth == 0 {
            return Err(ParseError::at(&self.previous, format!("'{}' outside of a loop", keyword)));
        }

        Ok(stmt)
    }

    /// Parses the statements of a block whose `{` was already consumed.
    fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = vec![];
        self.skip_newlines();

        while !self.check(TokenType::BracketRight) && !self.is_eof() {
            statements.push(self.parse_statement()?);
            self.skip_newlines();
        }

        self.expect(TokenType::BracketRight, "Expected '}' to close block")?;
        Ok(statements)
    }

    // Expression parsing

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.nested(Self::parse_or)
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_and()?;

        while self.matches(TokenType::Or) {
            let right = self.parse_and()?;
            expr = Expr::BinaryOperation { left: Box::new(expr), operator: BinaryOperator::Or, right: Box::new(right) };
        }

        Ok(expr)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_equality()?;

        while self.matches(TokenType::And) {
            let right = self.parse_equality()?;
            expr = Expr::BinaryOperation { left: Box::new(expr), operator: BinaryOperator::And, right: Box::new(right) };
        }

        Ok(expr)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(&*EQUALITY_OPERATORS, Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(&*COMPARISON_OPERATORS, Self::parse_term)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(&*TERM_OPERATORS, Self::parse_factor)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(&*FACTOR_OPERATORS, Self::parse_unary)
    }

    fn parse_binary_level(&mut self, operators: &[(TokenType, BinaryOperator)],
                          mut parse_operand: impl FnMut(&mut Self) -> ParseResult<Expr>) -> ParseResult<Expr> {
        let mut expr = parse_operand(self)?;

        while let Some(operator) = self.match_operator(operators) {
            let right = parse_operand(self)?;
            expr = Expr::BinaryOperation { left: Box::new(expr), operator, right: Box::new(right) };
        }

        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if let Some(operator) = self.match_operator(&*UNARY_OPERATORS) {
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::UnaryOperation { operator, operand: Box::new(operand) });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        if self.matches(TokenType::ParenthesisLeft) {
            let expr = self.parse_expression()?;
            self.expect(TokenType::ParenthesisRight, "Expected ')' after expression")?;

            Ok(Expr::Parenthesized(Box::new(expr)))
        } else if self.matches(TokenType::Number) {
            let number = self.previous.clone();

            match number.source().parse::<f64>() {
                Ok(value) => Ok(Expr::NumberLiteral(value)),
                Err(err) => Err(ParseError::at(&number, format!("Failed to parse number literal: {}", err))),
            }
        } else if self.matches(TokenType::String) {
            Ok(Expr::StringLiteral(decode_string_literal(self.previous.source())))
        } else if self.matches(TokenType::True) {
            Ok(Expr::BooleanLiteral(true))
        } else if self.matches(TokenType::False) {
            Ok(Expr::BooleanLiteral(false))
        } else if self.matches(TokenType::Input) {
            self.parse_input_call()
        } else if self.matches(TokenType::Identifier) {
            let name = self.previous.source().to_owned();

            if self.matches(TokenType::ParenthesisLeft) {
                self.finish_call(name)
            } else {
                Ok(Expr::Identifier(name))
            }
        } else {
            Err(self.error_at_current("Expected expression"))
        }
    }

    fn parse_input_call(&mut self) -> ParseResult<Expr> {
        self.expect(TokenType::ParenthesisLeft, "Expected '(' after 'input'")?;

        let prompt = if self.check(TokenType::ParenthesisRight) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect(TokenType::ParenthesisRight, "Expected ')' after input prompt")?;
        Ok(Expr::InputCall(prompt))
    }

    fn finish_call(&mut self, name: String) -> ParseResult<Expr> {
        let mut args = vec![];

        if !self.check(TokenType::ParenthesisRight) {
            args.push(self.parse_expression()?);

            while self.matches(TokenType::Comma) {
                args.push(self.parse_expression()?);
            }
        }

        self.expect(TokenType::ParenthesisRight, "Expected ')' after function call arguments")?;
        Ok(Expr::FunctionCall { name, args })
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.nesting >= MAX_NESTING_DEPTH {
            return Err(self.error_at_current("Nesting too deep"));
        }

        self.nesting += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || parse(self));
        self.nesting -= 1;

        result
    }

    // Token handling

    fn consume(&mut self) {
        let next = match self.tokens.get(self.index) {
            Some(token) => {
                self.index += 1;
                token.clone()
            },
            // The stream ends with Eof; keep handing it out
            None => Token::new(TokenType::Eof, String::new(), *self.current.end(), *self.current.end()),
        };

        self.previous = std::mem::replace(&mut self.current, next);
    }

    fn expect(&mut self, token_type: TokenType, message: &str) -> ParseResult<Token> {
        if self.current.token_type() == token_type {
            self.consume();
            return Ok(self.previous.clone());
        }

        Err(self.error_at_current(message))
    }

    fn matches(&mut self, token_type: TokenType) -> bool { // Should be called "match", but that's a keyword
        if !self.check(token_type) {
            return false;
        }

        self.consume();
        true
    }

    fn match_operator<O: Copy>(&mut self, operators: &[(TokenType, O)]) -> Option<O> {
        let operator = operators.iter()
            .find(|(token_type, _)| self.check(*token_type))
            .map(|(_, operator)| *operator)?;

        self.consume();
        Some(operator)
    }

    // Looks past newlines without consuming them unless the token matches
    fn matches_after_newlines(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.consume();
            return true;
        }

        if !self.check(TokenType::Newline) {
            return false;
        }

        let next = self.tokens[self.index..].iter()
            .find(|token| token.token_type() != TokenType::Newline)
            .map(Token::token_type);

        if next == Some(token_type) {
            self.skip_newlines();
            self.consume();
            true
        } else {
            false
        }
    }

    #[inline]
    fn check(&self, token_type: TokenType) -> bool {
        self.current.token_type() == token_type
    }

    fn check_any(&self, token_types: &[TokenType]) -> bool {
        token_types.iter().any(|token_type| self.check(*token_type))
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenType::Newline) {
            self.consume();
        }
    }

    fn is_eof(&self) -> bool {
        self.current.token_type() == TokenType::Eof
    }

    // Error handling

    fn error_at_current(&self, message: &str) -> ParseError {
        ParseError::at(&self.current, message)
    }
}

/// Strips the quotes of a string token and decodes its escape sequences.
/// Unknown escapes are kept as written.
pub fn decode_string_literal(raw: &str) -> String {
    let mut chars = raw.chars();
    chars.next();
    chars.next_back();

    let mut decoded = String::with_capacity(raw.len());

    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => decoded.push('\n'),
            Some('t') => decoded.push('\t'),
            Some('r') => decoded.push('\r'),
            Some('\\') => decoded.push('\\'),
            Some('"') => decoded.push('"'),
            Some('\'') => decoded.push('\''),
            Some(other) => {
                decoded.push('\\');
                decoded.push(other);
            },
            None => decoded.push('\\'),
        }
    }

    decoded
}

#[cfg(test)]
mod tests;
