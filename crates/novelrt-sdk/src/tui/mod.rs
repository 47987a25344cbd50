//! Terminal front end using cliclack (Charm-style inline prompts)
//!
//! This module is optional and only available when the `tui` feature is enabled.

mod commands;
mod guard;
mod prompt;

pub use commands::{build, new_project, publish, versions};
pub use guard::{install_terminal_guards, restore_cursor};
pub use prompt::TerminalPrompt;
