//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - `spinner` - Progress while awaiting a remote operation
//! - This module - Interactive prompts and user input handling

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::Result;

pub mod formatter;
pub mod spinner;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_error, display_operation, display_release_outcome,
    display_status, display_success,
};
pub use spinner::SpinnerClock;

/// Yes/no decisions asked of the operator
pub trait Prompt {
    fn confirm(&self, question: &str) -> Result<bool>;
}

impl<P: Prompt + ?Sized> Prompt for &P {
    fn confirm(&self, question: &str) -> Result<bool> {
        (**self).confirm(question)
    }
}

/// Parse a y/n answer. `None` for anything else.
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prompts on stdout and reads answers from stdin.
///
/// There is no default answer; the question is asked again until the
/// operator types `y` or `n`. End of input counts as a decline.
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn ask<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> Result<bool> {
        loop {
            write!(output, "{} (y|n): ", question)?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            if let Some(answer) = parse_answer(&line) {
                return Ok(answer);
            }
        }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> Result<bool> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        TerminalPrompt::ask(question, &mut input, &mut io::stdout())
    }
}

/// Prompt with pre-recorded answers for testing.
/// Declines once the answers run out.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<bool>>,
    questions: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        ScriptedPrompt {
            answers: RefCell::new(answers.into_iter().collect()),
            questions: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far
    pub fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, question: &str) -> Result<bool> {
        self.questions.borrow_mut().push(question.to_string());
        Ok(self.answers.borrow_mut().pop_front().unwrap_or(false))
    }
}
