//! Line prompts backed by the real terminal

use crate::error::Result;
use crate::prompt::Prompt;
use console::Term;
use std::io::{BufRead, ErrorKind};

/// Reads answers with a cliclack input when attached to a terminal and
/// plain stdin lines otherwise
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, message: &str) -> Result<Option<String>> {
        if Term::stdout().is_term() {
            return match cliclack::input(message.trim_end()).interact::<String>() {
                Ok(answer) => Ok(Some(answer)),
                Err(e) if e.kind() == ErrorKind::Interrupted => Ok(None),
                Err(e) => Err(e.into()),
            };
        }

        Term::stdout().write_str(message)?;
        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
