//! Build environment provisioning
//!
//! A [`Recipe`] is an ordered list of steps that turns a base image into the
//! toolchain image. Steps declare the capabilities they provide and require,
//! so a misordered recipe is rejected by [`Recipe::validate`] and, if run
//! anyway, fails at the offending step. A recipe can be rendered as a
//! Dockerfile or executed by a [`Provisioner`].

pub mod dockerfile;
pub mod error;
pub mod provisioner;
pub mod recipe;
pub mod runner;
pub mod state;

pub use error::ProvisionError;
pub use provisioner::{EventHandler, ProvisionEvent, Provisioner};
pub use recipe::{ProvisionStep, Recipe, DEFAULT_STEP_TIMEOUT_SECS};
pub use runner::{
    CommandContext, CommandOutput, CommandRunner, DryRunRunner, RecordedCommand, ShellRunner,
};
pub use state::{ProvisionRun, RunStatus, StepRecord, StepState};
