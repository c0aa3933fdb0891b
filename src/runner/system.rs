use crate::error::{ReleaseError, Result};
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};
use std::process::Command;

/// Runs commands as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        log::debug!("Shell command: {}", spec);

        let output = Command::new(&spec.program)
            .args(&spec.args)
            .output()
            .map_err(|e| ReleaseError::transport(format!("Failed to execute {}: {}", spec, e)))?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };

        if !result.success() {
            log::debug!("{} exited with {:?}:\n{}", spec, result.exit_code, result.combined());
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_transport_error() {
        let spec = CommandSpec::new("alis-definitely-not-a-program").arg("--help");
        let err = SystemRunner::new().run(&spec).unwrap_err();
        assert!(matches!(err, ReleaseError::Transport(_)));
        assert!(err.to_string().contains("alis-definitely-not-a-program"));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_exit_code_and_output() {
        let spec = CommandSpec::new("sh").args(["-c", "echo out; echo err 1>&2; exit 3"]);
        let out = SystemRunner::new().run(&spec).unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
    }
}
