//! Release orchestration
//!
//! A release bumps the version, tags and pushes the primary repository
//! (retrying on tag collisions), publishes the remaining repositories under
//! the same tag, records the version with the remote API and waits for the
//! resulting operation.

pub mod state;

pub use state::{ReleaseAttempt, ReleaseState};

use rand::thread_rng;

use crate::api::{CreateVersionRequest, Operation, ResourceApi};
use crate::boundary::BoundaryWarning;
use crate::domain::{random_salt, ReleaseKind, RepositoryTarget, ResourceId, TagPattern, Version};
use crate::error::{ReleaseError, Result};
use crate::git::{CommitHash, Publisher};
use crate::ui::Prompt;
use crate::waiter::{Clock, OperationWaiter, WaitOptions};

/// Whether a release blocks until the remote operation finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitMode {
    #[default]
    Wait,
    /// Return the operation handle as soon as it is submitted
    FireAndForget,
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseSettings {
    /// Length of the random suffix appended to tags; 0 keeps tags deterministic
    pub salt_length: usize,
    /// Continue past tag collisions without asking
    pub assume_yes: bool,
    pub mode: WaitMode,
    pub wait: WaitOptions,
}

/// Result of a release that reached the remote API
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    pub version: Version,
    pub tag: String,
    /// One hash per target, in target order
    pub commit_hashes: Vec<CommitHash>,
    pub operation: Operation,
    /// False when the operation was submitted but not awaited
    pub completed: bool,
    /// Tag collisions resolved along the way
    pub retries: u32,
    pub warnings: Vec<BoundaryWarning>,
}

/// Drives one release through publisher, prompt and remote API
pub struct Releaser<P: Publisher, A: ResourceApi, U: Prompt, C: Clock> {
    publisher: P,
    api: A,
    prompt: U,
    clock: C,
    settings: ReleaseSettings,
    history: Vec<ReleaseState>,
}

impl<P: Publisher, A: ResourceApi, U: Prompt, C: Clock> Releaser<P, A, U, C> {
    pub fn new(publisher: P, api: A, prompt: U, clock: C, settings: ReleaseSettings) -> Self {
        Releaser {
            publisher,
            api,
            prompt,
            clock,
            settings,
            history: Vec::new(),
        }
    }

    /// Current state; `None` before the first release starts
    pub fn state(&self) -> Option<ReleaseState> {
        self.history.last().copied()
    }

    /// Every state entered, in order
    pub fn history(&self) -> &[ReleaseState] {
        &self.history
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Release the version following `initial`.
    ///
    /// `targets[0]` is the primary repository; collisions there are resolved
    /// by patch bumps after operator confirmation. The other targets receive
    /// the same tag.
    pub fn release(
        &mut self,
        resource: &ResourceId,
        initial: Version,
        kind: ReleaseKind,
        targets: &[RepositoryTarget],
    ) -> Result<ReleaseOutcome> {
        self.enter(ReleaseState::Computing);
        let candidate = match initial.bump(kind) {
            Ok(candidate) => candidate,
            Err(err) => {
                self.enter(ReleaseState::Failed);
                return Err(err);
            }
        };
        log::debug!("{} {} -> {} ({})", resource, initial, candidate, kind);
        self.finish(resource, candidate, targets)
    }

    /// Release `candidate` as-is, for resources with no version yet
    pub fn release_initial(
        &mut self,
        resource: &ResourceId,
        candidate: Version,
        targets: &[RepositoryTarget],
    ) -> Result<ReleaseOutcome> {
        self.enter(ReleaseState::Computing);
        log::debug!("{} initial version {}", resource, candidate);
        self.finish(resource, candidate, targets)
    }

    fn enter(&mut self, state: ReleaseState) {
        log::debug!("release state: {}", state);
        self.history.push(state);
    }

    fn finish(
        &mut self,
        resource: &ResourceId,
        candidate: Version,
        targets: &[RepositoryTarget],
    ) -> Result<ReleaseOutcome> {
        match self.run(resource, candidate, targets) {
            Ok(outcome) => {
                self.enter(ReleaseState::Done);
                Ok(outcome)
            }
            Err(err) => {
                let state = match err {
                    ReleaseError::Aborted(_) => ReleaseState::Aborted,
                    _ => ReleaseState::Failed,
                };
                self.enter(state);
                Err(err)
            }
        }
    }

    fn salt(&self) -> Option<String> {
        match self.settings.salt_length {
            0 => None,
            len => Some(random_salt(len, &mut thread_rng())),
        }
    }

    fn run(
        &mut self,
        resource: &ResourceId,
        candidate: Version,
        targets: &[RepositoryTarget],
    ) -> Result<ReleaseOutcome> {
        let (primary, secondary) = targets
            .split_first()
            .ok_or_else(|| ReleaseError::invalid_argument("no repositories to release"))?;

        let pattern = TagPattern::for_resource(resource);
        let mut attempt = ReleaseAttempt::new(candidate);
        let mut warnings = Vec::new();

        self.enter(ReleaseState::Tagging);
        let primary_commit = loop {
            let salt = self.salt();
            attempt.retag(&pattern, salt.as_deref());
            let target = primary.for_release(&attempt.tag, &attempt.candidate);

            match self.publisher.publish(&target) {
                Ok(published) => {
                    warnings.extend(published.warnings);
                    break resolved(&target, published.commit)?;
                }
                Err(err) if err.is_tag_collision() => {
                    let rejected = attempt.tag.clone();
                    let next = attempt.escalate()?;
                    let warning = BoundaryWarning::TagCollision {
                        tag: rejected.clone(),
                        next,
                    };
                    log::warn!("{}", warning);

                    let question = format!(
                        "Tag {} already exists. Continue with version {}?",
                        rejected, next
                    );
                    if !self.settings.assume_yes && !self.prompt.confirm(&question)? {
                        return Err(ReleaseError::aborted(format!(
                            "release of {} stopped at version {}",
                            resource, next
                        )));
                    }
                    warnings.push(warning);
                    self.enter(ReleaseState::TaggingRetry);
                }
                Err(err) => return Err(err),
            }
        };

        let mut commit_hashes = vec![primary_commit];
        if !secondary.is_empty() {
            self.enter(ReleaseState::PublishingSecondary);
        }
        for target in secondary {
            let target = target.for_release(&attempt.tag, &attempt.candidate);
            let published = self.publisher.publish(&target).map_err(|err| {
                if err.is_tag_collision() {
                    ReleaseError::AlreadyExists(format!(
                        "{} in {} after the primary repository was tagged",
                        attempt.tag,
                        target.path.display()
                    ))
                } else {
                    err
                }
            })?;
            warnings.extend(published.warnings);
            commit_hashes.push(resolved(&target, published.commit)?);
        }

        self.enter(ReleaseState::Submitting);
        let request = CreateVersionRequest {
            resource: resource.clone(),
            version: attempt.candidate,
            commit_hashes: commit_hashes.clone(),
        };
        let operation = self.api.create_version(&request)?;
        log::info!("Submitted {} as operation {}", request.version, operation.name);

        let (operation, completed) = match self.settings.mode {
            WaitMode::FireAndForget => {
                if let Some(Err(err)) = operation.outcome() {
                    return Err(err);
                }
                let completed = operation.done;
                (operation, completed)
            }
            WaitMode::Wait => {
                self.enter(ReleaseState::Awaiting);
                let waiter = OperationWaiter::new(&self.api, &self.clock, self.settings.wait);
                (waiter.wait(operation)?, true)
            }
        };

        Ok(ReleaseOutcome {
            version: attempt.candidate,
            tag: attempt.tag,
            commit_hashes,
            operation,
            completed,
            retries: attempt.retries,
            warnings,
        })
    }
}

/// A tagged publish must resolve to a non-empty commit hash
fn resolved(target: &RepositoryTarget, commit: Option<CommitHash>) -> Result<CommitHash> {
    commit.filter(|c| !c.is_empty()).ok_or_else(|| {
        ReleaseError::integrity(format!(
            "tag {} in {} did not resolve to a commit",
            target.tag.as_deref().unwrap_or_default(),
            target.path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockResourceApi;
    use crate::git::{GitPublisher, MockPublisher};
    use crate::runner::{CommandOutput, ScriptedRunner};
    use crate::ui::ScriptedPrompt;
    use crate::waiter::ManualClock;

    type TestReleaser<'a, P> =
        Releaser<P, &'a MockResourceApi, &'a ScriptedPrompt, &'a ManualClock>;

    fn product() -> ResourceId {
        ResourceId::parse("alis.in").unwrap()
    }

    fn targets(n: usize) -> Vec<RepositoryTarget> {
        (0..n)
            .map(|i| RepositoryTarget::new(format!("/w/repo{}", i), "update(alis.in): {version}"))
            .collect()
    }

    fn releaser<'a, P: Publisher>(
        publisher: P,
        api: &'a MockResourceApi,
        prompt: &'a ScriptedPrompt,
        clock: &'a ManualClock,
        settings: ReleaseSettings,
    ) -> TestReleaser<'a, P> {
        Releaser::new(publisher, api, prompt, clock, settings)
    }

    #[test]
    fn test_minor_release_single_target() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let mut r = releaser(MockPublisher::new(), &api, &prompt, &clock, ReleaseSettings::default());

        let outcome = r
            .release(&product(), Version::new(1, 2, 3), ReleaseKind::Minor, &targets(1))
            .unwrap();

        assert_eq!(outcome.version, Version::new(1, 3, 3));
        assert_eq!(outcome.tag, "alis.in.1.3.3");
        assert!(outcome.completed);

        let created = api.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].version.to_string(), "1.3.3");
        assert_eq!(created[0].commit_hashes, vec!["sha-alis.in.1.3.3"]);
        assert_eq!(r.state(), Some(ReleaseState::Done));
        assert!(prompt.questions().is_empty());
    }

    #[test]
    fn test_collision_retries_with_patch_bump() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::new([true]);
        let clock = ManualClock::new();
        let publisher = MockPublisher::new().collide().succeed_with("abc");
        let mut r = releaser(publisher, &api, &prompt, &clock, ReleaseSettings::default());

        let outcome = r
            .release(&product(), Version::new(1, 2, 3), ReleaseKind::Minor, &targets(1))
            .unwrap();

        // Minor was requested, the collision escalates by patch only
        assert_eq!(outcome.version, Version::new(1, 3, 4));
        assert_eq!(outcome.retries, 1);
        assert_eq!(r.publisher().tags(), vec!["alis.in.1.3.3", "alis.in.1.3.4"]);
        assert_eq!(prompt.questions().len(), 1);
        assert!(r.history().contains(&ReleaseState::TaggingRetry));
        assert_eq!(api.created()[0].version, Version::new(1, 3, 4));
    }

    #[test]
    fn test_declined_collision_aborts_without_submission() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::new([false]);
        let clock = ManualClock::new();
        let publisher = MockPublisher::new().collide();
        let mut r = releaser(publisher, &api, &prompt, &clock, ReleaseSettings::default());

        let err = r
            .release(&product(), Version::new(1, 2, 3), ReleaseKind::Patch, &targets(2))
            .unwrap_err();

        assert!(matches!(err, ReleaseError::Aborted(_)));
        assert_eq!(prompt.questions().len(), 1);
        assert!(api.created().is_empty());
        assert_eq!(r.publisher().published().len(), 1);
        assert_eq!(r.state(), Some(ReleaseState::Aborted));
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let publisher = MockPublisher::new().collide().collide();
        let settings = ReleaseSettings {
            assume_yes: true,
            ..ReleaseSettings::default()
        };
        let mut r = releaser(publisher, &api, &prompt, &clock, settings);

        let outcome = r
            .release(&product(), Version::new(1, 2, 3), ReleaseKind::Patch, &targets(1))
            .unwrap();
        assert_eq!(outcome.version, Version::new(1, 2, 6));
        assert!(prompt.questions().is_empty());
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[test]
    fn test_empty_rev_parse_is_integrity_error() {
        // pull, commit, tag and push succeed; rev-parse prints nothing
        let runner = ScriptedRunner::new();
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let mut r = releaser(
            GitPublisher::new(&runner),
            &api,
            &prompt,
            &clock,
            ReleaseSettings::default(),
        );

        let err = r
            .release(&product(), Version::new(0, 0, 1), ReleaseKind::Patch, &targets(1))
            .unwrap_err();

        assert!(matches!(err, ReleaseError::Integrity(_)));
        assert!(api.created().is_empty());
        assert_eq!(r.state(), Some(ReleaseState::Failed));
        assert!(runner.command_lines().last().unwrap().ends_with("rev-parse alis.in.0.0.2"));
    }

    #[test]
    fn test_publisher_without_commit_is_integrity_error() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let publisher = MockPublisher::new().succeed_with("");
        let mut r = releaser(publisher, &api, &prompt, &clock, ReleaseSettings::default());

        let err = r
            .release(&product(), Version::new(1, 0, 0), ReleaseKind::Patch, &targets(1))
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Integrity(_)));
        assert!(api.created().is_empty());
    }

    #[test]
    fn test_other_failure_aborts_immediately() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let publisher = MockPublisher::new().fail_with(ReleaseError::transport("git push failed"));
        let mut r = releaser(publisher, &api, &prompt, &clock, ReleaseSettings::default());

        let err = r
            .release(&product(), Version::new(1, 0, 0), ReleaseKind::Patch, &targets(2))
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Transport(_)));
        assert_eq!(r.publisher().published().len(), 1);
        assert!(prompt.questions().is_empty());
    }

    #[test]
    fn test_secondary_targets_share_tag_and_collision_is_fatal() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::new([true]);
        let clock = ManualClock::new();
        let publisher = MockPublisher::new().succeed_with("p1").collide();
        let mut r = releaser(publisher, &api, &prompt, &clock, ReleaseSettings::default());

        let err = r
            .release(&product(), Version::new(1, 0, 0), ReleaseKind::Patch, &targets(2))
            .unwrap_err();

        assert!(err.is_tag_collision());
        assert_eq!(r.publisher().tags(), vec!["alis.in.1.0.1", "alis.in.1.0.1"]);
        assert!(prompt.questions().is_empty());
        assert!(api.created().is_empty());
    }

    #[test]
    fn test_secondary_hashes_are_collected_in_order() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let publisher = MockPublisher::new().succeed_with("p1").succeed_with("p2");
        let mut r = releaser(publisher, &api, &prompt, &clock, ReleaseSettings::default());

        let outcome = r
            .release(&product(), Version::new(1, 0, 0), ReleaseKind::Patch, &targets(2))
            .unwrap();
        assert_eq!(outcome.commit_hashes, vec!["p1", "p2"]);
        assert_eq!(
            r.history(),
            &[
                ReleaseState::Computing,
                ReleaseState::Tagging,
                ReleaseState::PublishingSecondary,
                ReleaseState::Submitting,
                ReleaseState::Awaiting,
                ReleaseState::Done,
            ]
        );
    }

    #[test]
    fn test_fire_and_forget_does_not_poll() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let settings = ReleaseSettings {
            mode: WaitMode::FireAndForget,
            ..ReleaseSettings::default()
        };
        let mut r = releaser(MockPublisher::new(), &api, &prompt, &clock, settings);

        let outcome = r
            .release(&product(), Version::new(1, 0, 0), ReleaseKind::Patch, &targets(1))
            .unwrap();
        assert!(!outcome.completed);
        assert!(!outcome.operation.done);
        assert_eq!(api.poll_count(), 0);
        assert_eq!(clock.sleeps(), 0);
        assert!(!r.history().contains(&ReleaseState::Awaiting));
    }

    #[test]
    fn test_operation_error_fails_release() {
        let api = MockResourceApi::new().poll(Ok(Operation::failed("operations/1", "quota exceeded")));
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let mut r = releaser(MockPublisher::new(), &api, &prompt, &clock, ReleaseSettings::default());

        let err = r
            .release(&product(), Version::new(1, 0, 0), ReleaseKind::Patch, &targets(1))
            .unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(r.state(), Some(ReleaseState::Failed));
    }

    #[test]
    fn test_release_initial_skips_bump() {
        let neuron = ResourceId::parse("alis.in.resources-events-v2").unwrap();
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let mut r = releaser(MockPublisher::new(), &api, &prompt, &clock, ReleaseSettings::default());

        let outcome = r
            .release_initial(&neuron, Version::new(2, 0, 0), &targets(2))
            .unwrap();
        assert_eq!(outcome.tag, "alis.in.resources-events-v2.2.0.0");
        assert_eq!(outcome.commit_hashes.len(), 2);
    }

    #[test]
    fn test_salted_tags() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let settings = ReleaseSettings {
            salt_length: 6,
            ..ReleaseSettings::default()
        };
        let mut r = releaser(MockPublisher::new(), &api, &prompt, &clock, settings);

        let outcome = r
            .release(&product(), Version::new(1, 0, 0), ReleaseKind::Patch, &targets(1))
            .unwrap();
        assert!(outcome.tag.starts_with("alis.in.1.0.1."));
        assert_eq!(outcome.tag.len(), "alis.in.1.0.1.".len() + 6);
        assert!(TagPattern::for_resource(&product()).matches(&outcome.tag).unwrap());
    }

    #[test]
    fn test_version_at_limit_fails_before_publishing() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let mut r = releaser(MockPublisher::new(), &api, &prompt, &clock, ReleaseSettings::default());

        let err = r
            .release(&product(), Version::new(1, 2, u64::MAX), ReleaseKind::Patch, &targets(1))
            .unwrap_err();

        assert!(matches!(err, ReleaseError::Parse(_)));
        assert_eq!(r.state(), Some(ReleaseState::Failed));
        assert!(r.publisher().published().is_empty());
        assert!(api.created().is_empty());
    }

    #[test]
    fn test_no_targets_is_invalid() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let mut r = releaser(MockPublisher::new(), &api, &prompt, &clock, ReleaseSettings::default());

        let err = r
            .release(&product(), Version::new(1, 0, 0), ReleaseKind::Patch, &[])
            .unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidArgument(_)));
    }

    #[test]
    fn test_publisher_warnings_forwarded() {
        let api = MockResourceApi::new();
        let prompt = ScriptedPrompt::default();
        let clock = ManualClock::new();
        let runner = ScriptedRunner::new();
        runner
            .push(CommandOutput::ok("Already up to date."))
            .push(CommandOutput::failed(1, "nothing to commit, working tree clean"))
            .push(CommandOutput::ok(""))
            .push(CommandOutput::ok(""))
            .push(CommandOutput::ok("4f2a9c1\n"));
        let mut r = releaser(GitPublisher::new(&runner), &api, &prompt, &clock, ReleaseSettings::default());

        let outcome = r
            .release(&product(), Version::new(1, 0, 0), ReleaseKind::Patch, &targets(1))
            .unwrap();
        assert_eq!(outcome.commit_hashes, vec!["4f2a9c1"]);
        assert!(matches!(
            outcome.warnings.as_slice(),
            [BoundaryWarning::NothingToCommit { .. }]
        ));
    }
}
