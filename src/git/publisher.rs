use crate::boundary::BoundaryWarning;
use crate::domain::RepositoryTarget;
use crate::error::{ReleaseError, Result};
use crate::git::{classify, CommitHash, GitOutcome, GitStep, Published, Publisher, SyncMode};
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};
use std::path::Path;

/// Publishes targets by running the `git` CLI
pub struct GitPublisher<R: CommandRunner> {
    runner: R,
    remote: String,
    branch: String,
    sync: SyncMode,
}

impl<R: CommandRunner> GitPublisher<R> {
    pub fn new(runner: R) -> Self {
        GitPublisher {
            runner,
            remote: "origin".to_string(),
            branch: "master".to_string(),
            sync: SyncMode::Strict,
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        self.remote = remote.into();
        self.branch = branch.into();
        self
    }

    pub fn with_sync(mut self, sync: SyncMode) -> Self {
        self.sync = sync;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn git(&self, repo: &Path) -> CommandSpec {
        CommandSpec::new("git").arg("-C").arg(repo.display().to_string())
    }

    fn run_step(&self, step: GitStep, spec: CommandSpec) -> Result<(GitOutcome, CommandOutput)> {
        let output = self.runner.run(&spec)?;
        let outcome = classify(step, &output);
        if outcome == GitOutcome::Failed {
            log::debug!("git {} failed:\n{}", step.name(), output.combined());
        }
        Ok((outcome, output))
    }

    fn step_failed(step: GitStep, spec_line: String, output: &CommandOutput) -> ReleaseError {
        ReleaseError::transport(format!(
            "git {} failed ({}):\n{}",
            step.name(),
            spec_line,
            output.combined()
        ))
    }

    fn sync(&self, target: &RepositoryTarget, warnings: &mut Vec<BoundaryWarning>) -> Result<()> {
        let spec = self
            .git(&target.path)
            .args(["pull", "--no-rebase", self.remote.as_str(), self.branch.as_str()]);
        let line = spec.to_string();
        let (outcome, output) = self.run_step(GitStep::Pull, spec)?;

        match (outcome, self.sync) {
            (GitOutcome::Ok | GitOutcome::UpToDate, _) => Ok(()),
            (_, SyncMode::BestEffort) => {
                let warning = BoundaryWarning::SyncSkipped {
                    path: target.path.clone(),
                    reason: output.combined(),
                };
                log::warn!("{}", warning);
                warnings.push(warning);
                Ok(())
            }
            (_, SyncMode::Strict) => Err(Self::step_failed(GitStep::Pull, line, &output)),
        }
    }

    fn path_args(target: &RepositoryTarget) -> Vec<String> {
        target
            .commit_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    }

    fn stage(&self, target: &RepositoryTarget) -> Result<()> {
        let spec = self
            .git(&target.path)
            .args(["add", "--"])
            .args(Self::path_args(target));
        let line = spec.to_string();
        match self.run_step(GitStep::Add, spec)? {
            (GitOutcome::Failed, output) => Err(Self::step_failed(GitStep::Add, line, &output)),
            _ => Ok(()),
        }
    }

    fn commit(&self, target: &RepositoryTarget, warnings: &mut Vec<BoundaryWarning>) -> Result<()> {
        let mut spec = self
            .git(&target.path)
            .args(["commit", "-m", target.message.as_str()]);
        if !target.commit_paths.is_empty() {
            spec = spec.arg("--").args(Self::path_args(target));
        }
        let line = spec.to_string();

        match self.run_step(GitStep::Commit, spec)? {
            (GitOutcome::NothingToCommit, _) => {
                let warning = BoundaryWarning::NothingToCommit {
                    path: target.path.clone(),
                };
                log::warn!("{}", warning);
                warnings.push(warning);
                Ok(())
            }
            (GitOutcome::Failed, output) => Err(Self::step_failed(GitStep::Commit, line, &output)),
            _ => Ok(()),
        }
    }

    fn tag_and_push(&self, target: &RepositoryTarget, tag: Option<&str>) -> Result<()> {
        if let Some(tag) = tag {
            let spec = self.git(&target.path).args(["tag", tag]);
            let line = spec.to_string();
            match self.run_step(GitStep::Tag, spec)? {
                (GitOutcome::TagExists, output) => {
                    return Err(ReleaseError::AlreadyExists(output.combined()))
                }
                (GitOutcome::Failed, output) => {
                    return Err(Self::step_failed(GitStep::Tag, line, &output))
                }
                _ => {}
            }
        }

        // Only this release's refs; other local tags are never pushed.
        let mut spec = self
            .git(&target.path)
            .args(["push", self.remote.as_str()])
            .arg(format!("refs/heads/{0}:{0}", self.branch));
        if let Some(tag) = tag {
            spec = spec.arg(format!("refs/tags/{}", tag));
        }
        let line = spec.to_string();

        let result = match self.run_step(GitStep::Push, spec)? {
            (GitOutcome::TagExists, output) => Err(ReleaseError::AlreadyExists(output.combined())),
            (GitOutcome::Failed, output) => Err(Self::step_failed(GitStep::Push, line, &output)),
            _ => Ok(()),
        };

        if let (Err(_), Some(tag)) = (&result, tag) {
            self.drop_local_tag(target, tag);
        }
        result
    }

    /// Remove a tag that was created locally but never reached the remote
    fn drop_local_tag(&self, target: &RepositoryTarget, tag: &str) {
        let spec = self.git(&target.path).args(["tag", "-d", tag]);
        match self.run_step(GitStep::TagDelete, spec) {
            Ok((GitOutcome::Failed, output)) => {
                log::warn!("could not delete local tag {}: {}", tag, output.combined())
            }
            Err(err) => log::warn!("could not delete local tag {}: {}", tag, err),
            Ok(_) => log::debug!("deleted local tag {}", tag),
        }
    }

    fn resolve(&self, target: &RepositoryTarget, tag: &str) -> Result<CommitHash> {
        let spec = self.git(&target.path).args(["rev-parse", tag]);
        let line = spec.to_string();
        let (outcome, output) = self.run_step(GitStep::RevParse, spec)?;

        let sha = output.stdout.trim().to_string();
        if outcome == GitOutcome::Failed || sha.is_empty() {
            return Err(ReleaseError::integrity(format!(
                "the following command did not return a valid sha:\n{}\n\
                 please run the following command to update the repo and try again:\n\
                 git -C {} pull --no-rebase",
                line,
                target.path.display()
            )));
        }
        Ok(sha)
    }
}

impl<R: CommandRunner> Publisher for GitPublisher<R> {
    fn publish(&self, target: &RepositoryTarget) -> Result<Published> {
        let mut warnings = Vec::new();
        let tag = target.tag.as_deref().filter(|t| !t.is_empty());

        log::info!("Updating repository {}", target.path.display());
        self.sync(target, &mut warnings)?;

        if target.stage {
            self.stage(target)?;
        }
        if target.commit {
            self.commit(target, &mut warnings)?;
        }

        log::info!("Pushing {} with tag {}", target.path.display(), tag.unwrap_or("-"));
        self.tag_and_push(target, tag)?;

        let commit = match tag {
            Some(tag) => Some(self.resolve(target, tag)?),
            None => None,
        };

        Ok(Published { commit, warnings })
    }
}
