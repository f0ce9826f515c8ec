pub mod ast;
pub mod lexer;
pub mod parser;
pub mod value;
pub mod environment;
pub mod host;
pub mod evaluator;
