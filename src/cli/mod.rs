//! Host command workflows, decoupled from clap

pub mod orchestration;

pub use orchestration::{
    preflight, release_resource, release_settings, run_build_workflow, run_operation_get,
    run_operation_wait, targets_for, BuildWorkflowArgs,
};
