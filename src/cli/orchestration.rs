//! Main workflow orchestration logic
//!
//! Builds the collaborators for a command from the loaded [Config] and the
//! per-invocation [BuildWorkflowArgs], then hands over to the
//! [Releaser](crate::release::Releaser) or the
//! [OperationWaiter](crate::waiter::OperationWaiter).

use anyhow::{Context, Result};

use crate::api::{HttpResourceApi, Operation, ResourceApi};
use crate::config::{Config, GitConfig};
use crate::domain::{Layout, ReleaseKind, RepositoryTarget, ResourceId, ResourceKind, Version};
use crate::error::ReleaseError;
use crate::git::{GitPublisher, Publisher, WorkingCopy};
use crate::release::{ReleaseOutcome, ReleaseSettings, Releaser, WaitMode};
use crate::runner::SystemRunner;
use crate::ui::{self, Prompt, SpinnerClock, TerminalPrompt};
use crate::waiter::{Clock, OperationWaiter, SystemClock};

/// Arguments for `product build` and `neuron build`
///
/// Mirrors the CLI arguments in a form the workflow can be called with
/// without depending on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildWorkflowArgs {
    /// Dotted identifier of the product or neuron
    pub resource: String,

    /// Which kind of resource the identifier must name
    pub kind: ResourceKind,

    pub release: ReleaseKind,

    /// Return after submitting instead of awaiting the operation
    pub fire_and_forget: bool,

    /// Continue past tag collisions without prompting
    pub assume_yes: bool,
}

impl BuildWorkflowArgs {
    pub fn parse_resource(&self) -> crate::Result<ResourceId> {
        match self.kind {
            ResourceKind::Product => ResourceId::parse_product(&self.resource),
            ResourceKind::Neuron => ResourceId::parse_neuron(&self.resource),
            ResourceKind::Organisation => ResourceId::parse_organisation(&self.resource),
        }
    }
}

/// Release settings for one invocation
pub fn release_settings(args: &BuildWorkflowArgs, config: &Config) -> ReleaseSettings {
    ReleaseSettings {
        salt_length: config.tags.salt_length,
        assume_yes: args.assume_yes,
        mode: if args.fire_and_forget {
            WaitMode::FireAndForget
        } else {
            WaitMode::Wait
        },
        wait: config.wait.options(),
    }
}

/// Repositories released for a resource, primary first
pub fn targets_for(resource: &ResourceId, layout: &Layout) -> crate::Result<Vec<RepositoryTarget>> {
    match resource.kind() {
        ResourceKind::Product => layout.product_targets(resource),
        ResourceKind::Neuron => layout.neuron_targets(resource),
        ResourceKind::Organisation => Err(ReleaseError::invalid_argument(format!(
            "organisation {} cannot be built",
            resource
        ))),
    }
}

/// Check every target is a working copy with the configured remote and branch
pub fn preflight(targets: &[RepositoryTarget], git: &GitConfig) -> crate::Result<()> {
    for target in targets {
        let working_copy = WorkingCopy::open(&target.path, &git.remote, &git.branch)?;
        log::debug!(
            "{} -> {}",
            working_copy.path().display(),
            working_copy.remote_url()?.unwrap_or_default()
        );
    }
    Ok(())
}

/// Look up the current version and release the next one.
///
/// A neuron without versions starts at `{N}.0.0`, `N` being its `vN` suffix,
/// and that version is released as-is.
pub fn release_resource<P, A, U, C>(
    releaser: &mut Releaser<P, A, U, C>,
    resource: &ResourceId,
    kind: ReleaseKind,
    targets: &[RepositoryTarget],
) -> crate::Result<ReleaseOutcome>
where
    P: Publisher,
    A: ResourceApi,
    U: Prompt,
    C: Clock,
{
    match releaser.api().current_version(resource)? {
        Some(current) => {
            ui::display_status(&format!(
                "Updating {} from version {} to version {}...",
                resource,
                current,
                current.bump(kind)?
            ));
            releaser.release(resource, current, kind, targets)
        }
        None => match resource.neuron_major() {
            Some(major) => {
                let initial = Version::new(major, 0, 0);
                ui::display_status(&format!(
                    "No version of {} exists yet, releasing {}...",
                    resource, initial
                ));
                releaser.release_initial(resource, initial, targets)
            }
            None => Err(ReleaseError::parse(format!(
                "{} has no current version to bump",
                resource
            ))),
        },
    }
}

fn http_api(config: &Config) -> crate::Result<HttpResourceApi> {
    HttpResourceApi::new(
        config.api.products_endpoint.as_str(),
        config.api.operations_endpoint.as_str(),
        config.api.token.clone(),
    )
}

/// `product build` / `neuron build`
///
/// Orchestrates:
/// 1. Validate the identifier and derive the repositories to release
/// 2. Verify each repository is a publishable working copy
/// 3. Bump, tag, push and record the new version
/// 4. Await the resulting operation unless running fire-and-forget
pub fn run_build_workflow(args: BuildWorkflowArgs, config: &Config) -> Result<ReleaseOutcome> {
    let resource = args.parse_resource()?;
    let layout = Layout::new(&config.workspace.root);
    let targets = targets_for(&resource, &layout)?;

    preflight(&targets, &config.git)
        .with_context(|| format!("{} is not ready to release", resource))?;

    let publisher = GitPublisher::new(SystemRunner::new())
        .with_remote(config.git.remote.as_str(), config.git.branch.as_str())
        .with_sync(config.git.sync);
    let api = http_api(config)?;
    let clock = SpinnerClock::new(SystemClock::new(), format!("Releasing {}", resource));

    let mut releaser = Releaser::new(
        publisher,
        api,
        TerminalPrompt,
        clock,
        release_settings(&args, config),
    );
    let outcome = release_resource(&mut releaser, &resource, args.release, &targets)?;
    Ok(outcome)
}

/// `operation get`
pub fn run_operation_get(name: &str, config: &Config) -> Result<Operation> {
    let api = http_api(config)?;
    Ok(api.get_operation(name)?)
}

/// `operation wait`
pub fn run_operation_wait(name: &str, config: &Config) -> Result<Operation> {
    let api = http_api(config)?;
    let operation = api.get_operation(name)?;

    let clock = SpinnerClock::new(SystemClock::new(), format!("Waiting for {}", name));
    let waiter = OperationWaiter::new(&api, clock, config.wait.options());
    Ok(waiter.wait(operation)?)
}
