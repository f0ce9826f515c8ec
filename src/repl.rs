use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use crate::interpreter::evaluator::Interpreter;
use crate::interpreter::host::{ConsoleHost, Host};

const PROMPT: &str = "DoroLang> ";

const HELP_TEXT: &str = r#"Commands:
  exit, quit        Leave the prompt
  vars              Show variables and functions
  clear             Forget all variables and functions
  help              Show this help

Language:
  say "text"                    Print a value
  kas x = 5                     Assign a variable
  + - * / %                     Arithmetic, + also joins text
  == != < <= > >=               Comparison
  and or not                    Logic
  if x > 1 { ... } else { ... }
  while x < 10 { ... }
  for kas i = 1 to 10 step 2 { ... }
  function add(a, b) { return a + b }
  kas name = input("Name: ")"#;

/// What the prompt should do after a line.
#[derive(Debug, PartialEq)]
pub enum Reply {
    /// Lines printed by the program, already shown by the host.
    Output(Vec<String>),
    /// Text produced by a prompt command.
    Text(String),
    Silent,
    Exit,
}

pub struct Repl<H: Host> {
    interpreter: Interpreter<H>,
}

impl<H: Host> Repl<H> {
    pub fn new(interpreter: Interpreter<H>) -> Repl<H> {
        Repl { interpreter }
    }

    pub fn interpreter(&self) -> &Interpreter<H> {
        &self.interpreter
    }

    /// Handles one line. Each line is lexed and parsed on its own but runs in the
    /// same interpreter. Lexer and parser errors are returned; runtime errors end
    /// up in the program's output.
    pub fn process_line(&mut self, line: &str) -> Result<Reply> {
        let trimmed = line.trim();

        match trimmed.to_lowercase().as_str() {
            "" => return Ok(Reply::Silent),
            "exit" | "quit" => return Ok(Reply::Exit),
            "vars" => return Ok(Reply::Text(describe_environment(&self.interpreter))),
            "clear" => {
                self.interpreter.reset();
                return Ok(Reply::Text(String::from("Variables cleared")));
            },
            "help" => return Ok(Reply::Text(String::from(HELP_TEXT))),
            _ => {},
        }

        let program = crate::parse_source(trimmed)?;
        Ok(Reply::Output(self.interpreter.interpret(&program)))
    }
}

/// Lists variables with their types, then functions with their parameters.
pub fn describe_environment<H: Host>(interpreter: &Interpreter<H>) -> String {
    let variables = interpreter.get_variables();
    let functions = interpreter.get_functions();

    if variables.is_empty() && functions.is_empty() {
        return String::from("No variables defined");
    }

    let mut lines = Vec::new();

    if !variables.is_empty() {
        lines.push(String::from("Variables:"));
        lines.extend(variables.iter()
            .map(|(name, value)| format!("   {} = {} ({})", name, value, value.type_name())));
    }

    if !functions.is_empty() {
        lines.push(String::from("Functions:"));
        lines.extend(functions.iter()
            .map(|(name, params)| format!("   {}({})", name, params.join(", "))));
    }

    lines.join("\n")
}

/// Runs the prompt on the terminal until `exit` or end of input.
pub fn run(max_call_depth: usize) -> Result<()> {
    println!("DoroLang v{} interactive mode", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for commands, 'exit' to leave.");

    let mut rl: Editor<(), DefaultHistory> = Editor::new()
        .context("Failed to create line editor")?;

    let mut interpreter = Interpreter::with_host(ConsoleHost);
    interpreter.set_max_call_depth(max_call_depth);
    let mut repl = Repl::new(interpreter);

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }

                match repl.process_line(&line) {
                    Ok(Reply::Output(_)) | Ok(Reply::Silent) => {},
                    Ok(Reply::Text(text)) => println!("{}", text),
                    Ok(Reply::Exit) => break,
                    Err(err) => eprintln!("Error: {}", err),
                }
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                tracing::debug!(%err, "failed to read line");
                return Err(err.into());
            },
        }
    }

    println!("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::host::ScriptedHost;

    fn repl() -> Repl<ScriptedHost> {
        Repl::new(Interpreter::with_host(ScriptedHost::default()))
    }

    #[test]
    fn state_persists_between_lines() {
        let mut repl = repl();

        assert_eq!(repl.process_line("kas x = 20").unwrap(), Reply::Output(vec![]));
        assert_eq!(repl.process_line("say x + 1").unwrap(), Reply::Output(vec![String::from("21")]));
    }

    #[test]
    fn host_words() {
        let mut repl = repl();

        assert_eq!(repl.process_line("  ").unwrap(), Reply::Silent);
        assert_eq!(repl.process_line("QUIT").unwrap(), Reply::Exit);
        assert_eq!(repl.process_line("exit").unwrap(), Reply::Exit);
        assert_eq!(repl.process_line("vars").unwrap(), Reply::Text(String::from("No variables defined")));
        assert!(matches!(repl.process_line("help").unwrap(), Reply::Text(text) if text.contains("vars")));
    }

    #[test]
    fn vars_lists_values_and_functions() {
        let mut repl = repl();
        repl.process_line("kas name = \"Doro\"").unwrap();
        repl.process_line("kas age = 3").unwrap();
        repl.process_line("function add(a, b) { return a + b }").unwrap();

        let expected = "Variables:\n   age = 3 (number)\n   name = Doro (string)\nFunctions:\n   add(a, b)";
        assert_eq!(repl.process_line("vars").unwrap(), Reply::Text(String::from(expected)));
    }

    #[test]
    fn clear_resets_interpreter() {
        let mut repl = repl();
        repl.process_line("kas x = 1").unwrap();

        assert_eq!(repl.process_line("clear").unwrap(), Reply::Text(String::from("Variables cleared")));
        assert!(repl.interpreter().get_variables().is_empty());
    }

    #[test]
    fn syntax_errors_keep_session() {
        let mut repl = repl();
        repl.process_line("kas x = 1").unwrap();

        let err = repl.process_line("kas = 2").unwrap_err();
        assert_eq!(err.to_string(), "[line 1 column 5] Error at '=': Expected variable name after 'kas'");
        assert!(repl.process_line("say 1 @ 2").is_err());

        assert_eq!(repl.process_line("say x").unwrap(), Reply::Output(vec![String::from("1")]));
    }

    #[test]
    fn describes_environment_after_a_run() {
        let mut interpreter = Interpreter::with_host(ScriptedHost::default());
        interpreter.interpret(&crate::parse_source("kas ok = 1 < 2\nkas label = \"007\"").unwrap());

        assert_eq!(describe_environment(&interpreter), "Variables:\n   label = 007 (string)\n   ok = true (boolean)");
    }

    #[test]
    fn runtime_errors_are_output() {
        let mut repl = repl();

        assert_eq!(repl.process_line("say 1 / 0").unwrap(),
                   Reply::Output(vec![String::from("Runtime error: Division by zero")]));
    }
}
