//! Blocking read-validate-reprompt loop over an option menu.

use super::console::Console;
use super::options::{Dispatch, InputMode, Options};
use crate::error::{SessionError, SessionResult};

/// A valid answer to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<A> {
    /// A menu entry was chosen.
    Action(A),
    /// A number inside the bounds was entered.
    Number(u32),
}

/// Outcome of interpreting one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Processed<A> {
    Selected(Selection<A>),
    Help,
    Quit,
    Reprompt,
}

impl<A> From<Dispatch<A>> for Processed<A> {
    fn from(dispatch: Dispatch<A>) -> Self {
        match dispatch {
            Dispatch::Action(action) => Self::Selected(Selection::Action(action)),
            Dispatch::Help => Self::Help,
            Dispatch::Quit => Self::Quit,
        }
    }
}

/// Interpret one line of input against a menu.
pub fn process_action<A: Clone>(
    input: &str,
    options: &Options<A>,
    mode: &InputMode,
) -> Processed<A> {
    let input = input.trim();
    match mode {
        InputMode::Default(default) => {
            let key = if input.is_empty() { default.to_lowercase() } else { input.to_lowercase() };
            options.dispatch(&key).map_or(Processed::Reprompt, Into::into)
        }
        InputMode::Bounded(range) => {
            if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
                return match input.parse::<u32>() {
                    Ok(number) if range.contains(&number) => {
                        Processed::Selected(Selection::Number(number))
                    }
                    _ => Processed::Reprompt,
                };
            }
            options.dispatch(&input.to_lowercase()).map_or(Processed::Reprompt, Into::into)
        }
    }
}

/// Ask until the user gives a valid answer.
///
/// `?` prints the menu help and asks again. `q` returns
/// [`SessionError::Quit`].
pub fn ask<A: Clone>(
    console: &mut dyn Console,
    message: &str,
    options: &Options<A>,
    mode: &InputMode,
) -> SessionResult<Selection<A>> {
    let prompt = options.message(message, mode);
    loop {
        let input = console.ask(&prompt)?;
        match process_action(&input, options, mode) {
            Processed::Selected(selection) => return Ok(selection),
            Processed::Help => console.say(&options.help_text()),
            Processed::Quit => return Err(SessionError::Quit),
            Processed::Reprompt => tracing::debug!(input = %input, "invalid option"),
        }
    }
}

/// Ask for a key from a menu with a default.
pub fn choose<A: Clone>(
    console: &mut dyn Console,
    message: &str,
    options: &Options<A>,
    default: &str,
) -> SessionResult<A> {
    let mode = InputMode::default_key(default);
    loop {
        // numbers are only produced in bounded mode
        if let Selection::Action(action) = ask(console, message, options, &mode)? {
            return Ok(action);
        }
    }
}
