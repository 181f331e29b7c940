//! Command runners used by the provisioner

use crate::provision::ProvisionError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Environment a command runs in, accumulated from earlier steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandContext {
    /// Step the command belongs to
    pub step: String,

    /// Active unprivileged user, `None` for the initial user
    pub user: Option<String>,

    /// Directories prepended to `PATH`, most recent first
    pub path_prefixes: Vec<String>,

    /// Timeout for the command in seconds
    pub timeout_secs: u64,
}

impl CommandContext {
    /// `PATH` value for a command, given the inherited one
    pub fn path_with(&self, inherited: &str) -> String {
        self.path_prefixes
            .iter()
            .map(String::as_str)
            .chain((!inherited.is_empty()).then_some(inherited))
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// Output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Trait for command execution - allows for different implementations
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run one shell command, failing on a non-zero exit
    async fn run(&self, command: &str, context: &CommandContext)
        -> Result<CommandOutput, ProvisionError>;
}

/// Runs commands through `sh -c` on the local machine
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
        }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    fn command(&self, command: &str, context: &CommandContext) -> Command {
        let inherited = std::env::var("PATH").unwrap_or_default();
        let path = context.path_with(&inherited);

        let mut cmd = match &context.user {
            // su resets PATH, so it is exported inside the command instead
            Some(user) => {
                let mut cmd = Command::new("su");
                cmd.args(["-s", self.shell.as_str(), "-c"])
                    .arg(format!("export PATH=\"{}\"; {}", path, command))
                    .arg(user);
                cmd
            }
            None => {
                let mut cmd = Command::new(&self.shell);
                cmd.arg("-c").arg(command).env("PATH", &path);
                cmd
            }
        };
        cmd.kill_on_drop(true);
        cmd
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(
        &self,
        command: &str,
        context: &CommandContext,
    ) -> Result<CommandOutput, ProvisionError> {
        debug!("[{}] $ {}", context.step, command);

        let result = timeout(
            Duration::from_secs(context.timeout_secs),
            self.command(command, context).output(),
        )
        .await
        .map_err(|_| ProvisionError::Timeout {
            step: context.step.clone(),
            secs: context.timeout_secs,
        })?;

        let output = result.map_err(|e| ProvisionError::Spawn {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            warn!("`{}` exited with code {}: {}", command, code, stderr.trim());
            return Err(ProvisionError::CommandFailed {
                command: command.to_string(),
                code,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// A command seen by [`DryRunRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub command: String,
    pub context: CommandContext,
}

/// Records commands without running them
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner {
    recorded: Arc<Mutex<Vec<RecordedCommand>>>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far, in order
    pub async fn recorded(&self) -> Vec<RecordedCommand> {
        self.recorded.lock().await.clone()
    }
}

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(
        &self,
        command: &str,
        context: &CommandContext,
    ) -> Result<CommandOutput, ProvisionError> {
        self.recorded.lock().await.push(RecordedCommand {
            command: command.to_string(),
            context: context.clone(),
        });
        Ok(CommandOutput::default())
    }
}
