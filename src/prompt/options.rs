//! Option menus: an ordered key table with help text and prompt rendering.
//!
//! Every menu implicitly accepts `?` (print help) and `q` (quit). What an
//! action means is left to the caller.

use std::ops::RangeInclusive;

/// Key that prints the help text.
pub const HELP_KEY: &str = "?";

/// Key that quits the program.
pub const QUIT_KEY: &str = "q";

/// One selectable entry. An empty key is selected by pressing enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption<A> {
    pub key: String,
    pub action: A,
    pub help: String,
}

impl<A> MenuOption<A> {
    pub fn new(key: impl Into<String>, action: A, help: impl Into<String>) -> Self {
        Self { key: key.into(), action, help: help.into() }
    }
}

/// How input is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Keys only. Blank input selects the given default key.
    Default(String),
    /// A number in the inclusive range, or a key.
    Bounded(RangeInclusive<u32>),
}

impl InputMode {
    pub fn default_key(key: impl Into<String>) -> Self {
        Self::Default(key.into())
    }
}

/// What a key resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<A> {
    Action(A),
    Help,
    Quit,
}

/// An ordered menu of options.
#[derive(Debug, Clone)]
pub struct Options<A> {
    entries: Vec<MenuOption<A>>,
}

impl<A: Clone> Options<A> {
    pub fn new(entries: Vec<MenuOption<A>>) -> Self {
        Self { entries }
    }

    /// Displayable keys: every non-empty entry key, then `?` and `q`.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| !entry.key.is_empty())
            .map(|entry| entry.key.clone())
            .chain([HELP_KEY.to_string(), QUIT_KEY.to_string()])
            .collect()
    }

    /// Resolve a lower-cased key.
    pub fn dispatch(&self, key: &str) -> Option<Dispatch<A>> {
        match key {
            HELP_KEY => Some(Dispatch::Help),
            QUIT_KEY => Some(Dispatch::Quit),
            _ => self
                .entries
                .iter()
                .find(|entry| entry.key == key)
                .map(|entry| Dispatch::Action(entry.action.clone())),
        }
    }

    /// One `key - help` line per entry, followed by the built-in keys.
    pub fn help_text(&self) -> String {
        let mut text = String::new();
        for entry in &self.entries {
            let key = if entry.key.is_empty() { "<press enter>" } else { entry.key.as_str() };
            text.push_str(&format!("{key} - {}\n", entry.help));
        }
        text.push_str("? - display command help\nq - exit the program");
        text
    }

    /// Render the option suffix, e.g. `(Y/g/e/?/q): `.
    ///
    /// The default key moves to the front in upper case. A default that is
    /// not a letter is repeated in a separate `(default X)` clause.
    pub fn format(&self, mode: &InputMode) -> String {
        let mut keys = self.keys();
        let list = match mode {
            InputMode::Default(default) => {
                keys.retain(|key| key != default);
                keys.insert(0, default.to_uppercase());
                let list = format!("({})", keys.join("/"));
                if is_alphabetic(default) {
                    list
                } else {
                    format!("{list} (default {default})")
                }
            }
            InputMode::Bounded(range) => format!(
                "(enter a number from {} to {}) ({})",
                range.start(),
                range.end(),
                keys.join("/")
            ),
        };
        format!("{list}: ")
    }

    /// Full prompt line: message followed by the option suffix.
    pub fn message(&self, message: &str, mode: &InputMode) -> String {
        format!("{message} {}", self.format(mode))
    }
}

fn is_alphabetic(key: &str) -> bool {
    !key.is_empty() && key.chars().all(char::is_alphabetic)
}
