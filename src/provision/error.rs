//! Provisioning errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("Step '{step}' requires '{requirement}', which no completed step provides")]
    RequirementNotMet { step: String, requirement: String },

    #[error("Command `{command}` exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Step '{step}' timed out after {secs}s")]
    Timeout { step: String, secs: u64 },

    #[error("Failed to spawn `{command}`: {reason}")]
    Spawn { command: String, reason: String },
}
