use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// What a running program may ask of its embedder.
pub trait Host {
    /// Answers `input(prompt)`.
    fn input(&mut self, prompt: &str) -> String;

    /// Called with every printed line as soon as it is produced.
    fn print(&mut self, _line: &str) {}
}

impl<F: FnMut(&str) -> String> Host for F {
    fn input(&mut self, prompt: &str) -> String {
        self(prompt)
    }
}

fn read_stdin_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();

    let mut line = String::new();

    if let Err(err) = io::stdin().lock().read_line(&mut line) {
        tracing::warn!(%err, "failed to read input");
    }

    line.trim_end_matches(['\n', '\r']).to_owned()
}

/// Reads answers from standard input and leaves printing to the caller.
#[derive(Debug, Default)]
pub struct StdinHost;

impl Host for StdinHost {
    fn input(&mut self, prompt: &str) -> String {
        read_stdin_line(prompt)
    }
}

/// Prints lines immediately and reads answers from standard input.
#[derive(Debug, Default)]
pub struct ConsoleHost;

impl Host for ConsoleHost {
    fn input(&mut self, prompt: &str) -> String {
        read_stdin_line(prompt)
    }

    fn print(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Answers prompts from a fixed queue and records what was asked.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedHost {
    pub fn new<I, S>(answers: I) -> ScriptedHost
        where I: IntoIterator<Item = S>, S: Into<String> {
        ScriptedHost {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }
}

impl Host for ScriptedHost {
    // An exhausted queue answers with empty text
    fn input(&mut self, prompt: &str) -> String {
        self.prompts.push(prompt.to_owned());
        self.answers.pop_front().unwrap_or_default()
    }
}
