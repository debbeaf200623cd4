//! Line-oriented terminal access.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Where prompts are shown and answers are read from.
pub trait Console {
    /// Show `message` and block until one line of input is read.
    ///
    /// The trailing newline is removed. Closed input is an
    /// [`io::ErrorKind::UnexpectedEof`] error.
    fn ask(&mut self, message: &str) -> io::Result<String>;

    /// Show a block of text.
    fn say(&mut self, text: &str);
}

/// Console over the process's stdin and stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for StdConsole {
    fn ask(&mut self, message: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{message}")?;
        stdout.flush()?;

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }

        Ok(input.trim_end_matches(['\n', '\r']).to_string())
    }

    fn say(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Console fed from a fixed list of answers, recording everything shown.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { answers: answers.into_iter().map(Into::into).collect(), transcript: Vec::new() }
    }

    /// Every prompt and message shown so far, in order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Prompts only, i.e. messages that waited for an answer.
    pub fn prompts(&self) -> Vec<&str> {
        self.transcript
            .iter()
            .filter_map(|line| line.strip_prefix("? "))
            .collect()
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Console for ScriptedConsole {
    fn ask(&mut self, message: &str) -> io::Result<String> {
        self.transcript.push(format!("? {message}"));
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn say(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_console_replays_answers() {
        let mut console = ScriptedConsole::new(["y", ""]);
        assert_eq!(console.ask("First? ").unwrap(), "y");
        console.say("between");
        assert_eq!(console.ask("Second? ").unwrap(), "");
        assert_eq!(console.remaining(), 0);

        let err = console.ask("Third? ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        assert_eq!(console.prompts(), vec!["First? ", "Second? ", "Third? "]);
        assert_eq!(console.transcript()[1], "between");
    }
}
