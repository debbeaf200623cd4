//! Terminal interaction: option menus, input validation, console and editor.

mod action;
mod console;
mod editor;
mod options;

pub use action::{ask, choose, process_action, Processed, Selection};
pub use console::{Console, ScriptedConsole, StdConsole};
pub use editor::{ExternalEditor, ScriptedEditor, TextEditor};
pub use options::{Dispatch, InputMode, MenuOption, Options, HELP_KEY, QUIT_KEY};
