use crate::error::{ReleaseError, Result};
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Scripted runner for testing without spawning processes
///
/// Each call to `run` pops the next queued output. When the queue is empty
/// the runner answers with a successful empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: RefCell<VecDeque<Result<CommandOutput>>>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the output of the next command
    pub fn push(&self, output: CommandOutput) -> &Self {
        self.responses.borrow_mut().push_back(Ok(output));
        self
    }

    /// Queue a start-up failure for the next command
    pub fn push_error(&self, message: impl Into<String>) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(Err(ReleaseError::transport(message)));
        self
    }

    /// Every command received so far, in order
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Received commands rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.to_string()).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(command.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(CommandOutput::ok("")))
    }
}
