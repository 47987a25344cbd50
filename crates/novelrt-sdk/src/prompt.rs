//! Numbered-list selection shared by version and profile choice
//!
//! The line source is injected so the same loop can run against a terminal or
//! a scripted list of answers.

use crate::error::{Result, SdkError};
use log::{error, info};
use std::collections::VecDeque;

/// Source of answers for interactive questions
pub trait Prompt {
    /// Show `message` and read one line of input.
    /// `Ok(None)` means the input is exhausted.
    fn read_line(&mut self, message: &str) -> Result<Option<String>>;
}

/// Answers fed from a fixed list, for non-interactive runs and tests
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompt for ScriptedPrompt {
    fn read_line(&mut self, _message: &str) -> Result<Option<String>> {
        Ok(self.answers.pop_front())
    }
}

/// What a single line of input means against a list of `len` options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Zero-based index of the chosen option
    Selected(usize),
    Quit,
    Invalid,
}

/// Interpret one line: a 1-based in-range number, `q`/`Q`, or anything else
pub fn parse_choice(input: &str, len: usize) -> Choice {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    match trimmed.parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Choice::Selected(n - 1),
        _ => Choice::Invalid,
    }
}

fn print_options(options: &[String]) {
    for (i, option) in options.iter().enumerate() {
        info!("{}. {}", i + 1, option);
    }
}

/// Present `options` as a numbered list and loop until a valid pick.
///
/// Invalid input reprints the list. Quitting, or running out of input,
/// yields [`SdkError::UserCancelled`].
pub fn select_numbered<P: Prompt + ?Sized>(
    prompt: &mut P,
    message: &str,
    options: &[String],
) -> Result<usize> {
    print_options(options);

    loop {
        let Some(input) = prompt.read_line(message)? else {
            info!("Exiting...");
            return Err(SdkError::UserCancelled);
        };

        match parse_choice(&input, options.len()) {
            Choice::Selected(index) => return Ok(index),
            Choice::Quit => {
                info!("Exiting...");
                return Err(SdkError::UserCancelled);
            }
            Choice::Invalid => {
                error!("Invalid selection - please try again.");
                print_options(options);
            }
        }
    }
}
