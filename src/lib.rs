pub mod util;
pub mod interpreter;
pub mod repl;

use std::path::PathBuf;
use anyhow::Context;
use clap::Parser as ClapParser;
use thiserror::Error;
use crate::interpreter::ast::Program;
use crate::interpreter::evaluator::{Interpreter, DEFAULT_MAX_CALL_DEPTH};
use crate::interpreter::host::{ConsoleHost, Host};
use crate::interpreter::lexer::{Lexer, LexerError};
use crate::interpreter::parser::{ParseError, Parser};

#[derive(ClapParser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    #[clap(help = "DoroLang source file to run; starts the interactive prompt when omitted")]
    pub input: Option<PathBuf>,

    #[clap(long, help = "Only check the syntax of the input file")]
    pub check: bool,
    #[clap(long, help = "Print the token stream before running")]
    pub tokens: bool,
    #[clap(long, help = "Print the syntax tree before running")]
    pub ast: bool,
    #[clap(long, default_value_t = DEFAULT_MAX_CALL_DEPTH, help = "Maximum function call depth")]
    pub max_depth: usize,

    #[clap(short, long, help = "Print verbose log output and the final variables")]
    pub verbose: bool,
}

/// Failure while turning source text into a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Lexes and parses `source` in one step.
pub fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = Lexer::new(source).tokenize()?;
    Ok(Parser::new(tokens).parse()?)
}

/// Runs the command line described by `config`. Program output goes to stdout as it
/// is produced; a runtime error is returned after its line has been printed.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let path = match &config.input {
        Some(path) => path,
        None => return repl::run(config.max_depth),
    };

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let tokens = Lexer::new(&source).tokenize()?;

    if config.tokens {
        for token in &tokens {
            println!("{} {:?} {}", token.start(), token.token_type(), token);
        }
    }

    let token_count = tokens.len();
    let program = Parser::new(tokens).parse()?;
    tracing::debug!(path = %path.display(), tokens = token_count, statements = program.statements.len(), "parsed file");

    if config.ast {
        println!("{:?}", program);
    }

    if config.check {
        println!("Syntax OK: {} statement(s)", program.statements.len());
        return Ok(());
    }

    let mut interpreter = Interpreter::with_host(ConsoleHost);
    interpreter.set_max_call_depth(config.max_depth);
    interpreter.interpret(&program);

    if config.verbose {
        println!("{}", run_details(token_count, &program, &interpreter));
    }

    match interpreter.last_error() {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}

/// Summary printed after a verbose run: pipeline counts and the final environment.
pub fn run_details<H: Host>(token_count: usize, program: &Program, interpreter: &Interpreter<H>) -> String {
    format!("Tokens: {}, statements: {}\n{}", token_count, program.statements.len(), repl::describe_environment(interpreter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::host::ScriptedHost;

    #[test]
    fn verbose_details() {
        let source = "kas total = 2 + 3\nsay total";
        let tokens = Lexer::new(source).tokenize().unwrap();
        let token_count = tokens.len();
        let program = Parser::new(tokens).parse().unwrap();

        let mut interpreter = Interpreter::with_host(ScriptedHost::default());
        interpreter.interpret(&program);

        assert_eq!(run_details(token_count, &program, &interpreter),
                   "Tokens: 10, statements: 2\nVariables:\n   total = 5 (number)");
    }

    #[test]
    fn parse_source_reports_both_stages() {
        assert!(parse_source("say 1").is_ok());
        assert!(matches!(parse_source("say #"), Err(Error::Parse(_))));
        assert!(matches!(parse_source("say \"x"), Err(Error::Lexer(_))));
    }
}
