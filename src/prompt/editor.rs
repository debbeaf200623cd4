//! Manual editing through an external text editor.

use std::collections::VecDeque;
use std::io::Write;
use std::process::Command;

use anyhow::Context;

/// Opens text for manual editing and returns the result.
pub trait TextEditor {
    /// Edit `current`, blocking until the user is done.
    fn edit(&mut self, current: &str) -> anyhow::Result<String>;
}

/// Runs an editor command on a temporary file.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    /// Create an editor from a command line such as `vim` or `code --wait`.
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }
}

impl TextEditor for ExternalEditor {
    fn edit(&mut self, current: &str) -> anyhow::Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("autobook-")
            .suffix(".txt")
            .tempfile()
            .context("Failed to create temporary file for editing")?;
        file.write_all(current.as_bytes())?;
        file.flush()?;

        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or_else(|| anyhow::anyhow!("Editor command is empty"))?;

        tracing::debug!(editor = %self.command, path = %file.path().display(), "opening editor");
        let status = Command::new(program)
            .args(parts)
            .arg(file.path())
            .status()
            .with_context(|| format!("Failed to launch editor '{}'", self.command))?;

        if !status.success() {
            anyhow::bail!("Editor '{}' exited with {}", self.command, status);
        }

        let edited = std::fs::read_to_string(file.path())?;
        Ok(edited.trim().to_string())
    }
}

/// Editor that returns prepared results, recording what it was given.
#[derive(Debug, Default)]
pub struct ScriptedEditor {
    results: VecDeque<String>,
    seen: Vec<String>,
}

impl ScriptedEditor {
    pub fn new<I, S>(results: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { results: results.into_iter().map(Into::into).collect(), seen: Vec::new() }
    }

    /// Text the editor was opened with, one entry per call.
    pub fn seen(&self) -> &[String] {
        &self.seen
    }
}

impl TextEditor for ScriptedEditor {
    fn edit(&mut self, current: &str) -> anyhow::Result<String> {
        self.seen.push(current.to_string());
        self.results.pop_front().ok_or_else(|| anyhow::anyhow!("no scripted edit left"))
    }
}
