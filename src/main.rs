use anyhow::Result;
use clap::{Parser, Subcommand};

use alis::cli::{self, BuildWorkflowArgs};
use alis::config;
use alis::domain::{ReleaseKind, ResourceKind};
use alis::ui;

#[derive(Parser)]
#[command(
    name = "alis",
    version,
    about = "Build and release alis products and neurons"
)]
struct Cli {
    #[arg(long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, global = true, help = "Print debug output, including every shell command")]
    debug: bool,

    #[arg(short, long, global = true, help = "Continue past tag collisions without prompting")]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Product commands
    Product {
        #[command(subcommand)]
        command: BuildCommand,
    },
    /// Neuron commands
    Neuron {
        #[command(subcommand)]
        command: BuildCommand,
    },
    /// Long-running operation commands
    Operation {
        #[command(subcommand)]
        command: OperationCommand,
    },
}

#[derive(Subcommand)]
enum BuildCommand {
    /// Commit, tag and push the repositories and record a new version
    Build {
        /// Dotted identifier, e.g. alis.in or alis.in.resources-events-v1
        id: String,

        #[arg(short, long, default_value = "patch", help = "Release kind: patch, minor or major")]
        release: ReleaseKind,

        #[arg(short = 'a', long = "async", help = "Return once the new version is submitted")]
        fire_and_forget: bool,
    },
}

#[derive(Subcommand)]
enum OperationCommand {
    /// Show the state of an operation
    Get { name: String },
    /// Wait for an operation to finish
    Wait { name: String },
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(opts: Cli) -> Result<()> {
    let config = config::load_config(opts.config.as_deref())?;

    let (kind, build) = match opts.command {
        Command::Product { command } => (ResourceKind::Product, command),
        Command::Neuron { command } => (ResourceKind::Neuron, command),
        Command::Operation { command } => {
            match command {
                OperationCommand::Get { name } => {
                    let operation = cli::run_operation_get(&name, &config)?;
                    ui::display_operation(&operation);
                }
                OperationCommand::Wait { name } => {
                    let operation = cli::run_operation_wait(&name, &config)?;
                    ui::display_success(&format!("Operation {} completed", operation.name));
                }
            }
            return Ok(());
        }
    };

    let BuildCommand::Build {
        id,
        release,
        fire_and_forget,
    } = build;

    let args = BuildWorkflowArgs {
        resource: id,
        kind,
        release,
        fire_and_forget,
        assume_yes: opts.yes,
    };
    let outcome = cli::run_build_workflow(args, &config)?;
    ui::display_release_outcome(&outcome);
    Ok(())
}

fn main() {
    let opts = Cli::parse();
    init_logging(opts.debug);

    if let Err(e) = run(opts) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
