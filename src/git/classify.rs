//! Translation of git's human-readable output into outcomes.
//!
//! git offers no structured result for these cases, so the text contract is
//! kept here and nowhere else:
//!
//! | step          | substring                                      | outcome            |
//! |---------------|------------------------------------------------|--------------------|
//! | pull          | `Already up to date.`                          | `UpToDate`         |
//! | commit        | `nothing to commit`, `nothing added to commit`, `no changes added to commit` | `NothingToCommit` |
//! | tag, push     | `already exists`                               | `TagExists`        |

use crate::runner::CommandOutput;

/// The git invocation whose output is being classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitStep {
    Pull,
    Add,
    Commit,
    Tag,
    TagDelete,
    Push,
    RevParse,
}

impl GitStep {
    pub fn name(&self) -> &'static str {
        match self {
            GitStep::Pull => "pull",
            GitStep::Add => "add",
            GitStep::Commit => "commit",
            GitStep::Tag => "tag",
            GitStep::TagDelete => "tag -d",
            GitStep::Push => "push",
            GitStep::RevParse => "rev-parse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitOutcome {
    Ok,
    UpToDate,
    NothingToCommit,
    TagExists,
    Failed,
}

const UP_TO_DATE: &str = "Already up to date.";
const TAG_EXISTS: &str = "already exists";
const NOTHING_TO_COMMIT: [&str; 3] = [
    "nothing to commit",
    "nothing added to commit",
    "no changes added to commit",
];

/// Classify the output of one git step
pub fn classify(step: GitStep, output: &CommandOutput) -> GitOutcome {
    let text = output.combined();

    match step {
        GitStep::Tag | GitStep::Push if text.contains(TAG_EXISTS) => GitOutcome::TagExists,
        GitStep::Commit if NOTHING_TO_COMMIT.iter().any(|s| text.contains(s)) => {
            GitOutcome::NothingToCommit
        }
        GitStep::Pull if output.success() && text.contains(UP_TO_DATE) => GitOutcome::UpToDate,
        _ if output.success() => GitOutcome::Ok,
        _ => GitOutcome::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_rejected_tag() {
        let out = CommandOutput::failed(
            1,
            " ! [rejected]        alis.in.1.2.4 -> alis.in.1.2.4 (already exists)\n\
             error: failed to push some refs",
        );
        assert_eq!(classify(GitStep::Push, &out), GitOutcome::TagExists);
    }

    #[test]
    fn test_local_tag_exists() {
        let out = CommandOutput::failed(128, "fatal: tag 'alis.in.1.2.4' already exists");
        assert_eq!(classify(GitStep::Tag, &out), GitOutcome::TagExists);
    }

    #[test]
    fn test_already_exists_on_other_steps_is_plain_failure() {
        let out = CommandOutput::failed(1, "fatal: destination path already exists");
        assert_eq!(classify(GitStep::Pull, &out), GitOutcome::Failed);
    }

    #[test]
    fn test_pull_up_to_date() {
        assert_eq!(
            classify(GitStep::Pull, &CommandOutput::ok("Already up to date.\n")),
            GitOutcome::UpToDate
        );
        assert_eq!(
            classify(GitStep::Pull, &CommandOutput::ok("Fast-forward\n")),
            GitOutcome::Ok
        );
    }

    #[test]
    fn test_commit_with_nothing_to_commit_exits_non_zero() {
        let out = CommandOutput {
            stdout: "On branch master\nnothing to commit, working tree clean\n".into(),
            stderr: String::new(),
            exit_code: Some(1),
        };
        assert_eq!(classify(GitStep::Commit, &out), GitOutcome::NothingToCommit);
    }

    #[test]
    fn test_failures() {
        let out = CommandOutput::failed(128, "fatal: not a git repository");
        for step in [GitStep::Pull, GitStep::Add, GitStep::Commit, GitStep::RevParse] {
            assert_eq!(classify(step, &out), GitOutcome::Failed, "{}", step.name());
        }
    }
}
