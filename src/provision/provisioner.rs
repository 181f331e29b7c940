//! Sequential, fail-fast execution of a recipe

use crate::provision::{
    CommandContext, CommandRunner, ProvisionError, ProvisionRun, ProvisionStep, Recipe, RunStatus,
    StepState,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Events that can occur during a provisioning run
#[derive(Debug, Clone)]
pub enum ProvisionEvent {
    RunStarted {
        execution_id: Uuid,
        recipe: String,
        total_steps: usize,
    },
    StepStarted {
        step_id: String,
        index: usize,
    },
    CommandFinished {
        step_id: String,
        command: String,
        output: String,
    },
    StepCompleted {
        step_id: String,
    },
    StepFailed {
        step_id: String,
        error: String,
    },
    StepSkipped {
        step_id: String,
    },
    RunCompleted {
        execution_id: Uuid,
        status: RunStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ProvisionEvent) + Send + Sync>;

/// Runs recipe steps one after another through a [`CommandRunner`]
pub struct Provisioner<R> {
    runner: Arc<R>,
    event_handlers: Arc<Mutex<Vec<EventHandler>>>,
}

impl<R: CommandRunner + 'static> Provisioner<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner: Arc::new(runner),
            event_handlers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Add an event handler
    pub async fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(ProvisionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.lock().await.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    async fn emit_event(&self, event: ProvisionEvent) {
        let handlers = self.event_handlers.lock().await;
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }

    /// Execute every step of the recipe in order.
    ///
    /// The first failing step stops the run: later steps are marked skipped
    /// and none of their commands run. Requirements are checked against the
    /// capabilities of steps that actually completed, so an unvalidated
    /// recipe with a misordered step still fails before running it.
    pub async fn run(&self, recipe: &Recipe) -> ProvisionRun {
        let mut run = ProvisionRun::new(&recipe.name, recipe.steps.iter().map(ProvisionStep::id));
        let execution_id = run.execution_id;

        info!("Starting provisioning run: {} ({})", recipe.name, execution_id);
        self.emit_event(ProvisionEvent::RunStarted {
            execution_id,
            recipe: recipe.name.clone(),
            total_steps: recipe.steps.len(),
        })
        .await;
        run.start();

        let mut context = CommandContext::default();
        let mut provided: HashSet<String> = HashSet::new();

        for (index, step) in recipe.steps.iter().enumerate() {
            let step_id = step.id();
            let started_at = Utc::now();
            run.steps[index].state = StepState::Running { started_at };
            self.emit_event(ProvisionEvent::StepStarted {
                step_id: step_id.clone(),
                index,
            })
            .await;

            context.step = step_id.clone();
            context.timeout_secs = recipe.step_timeout(step);

            match self.execute_step(step, &context, &provided).await {
                Ok(output) => {
                    apply_step(step, &mut context);
                    provided.extend(step.provides().iter().cloned());
                    run.steps[index].state = StepState::Completed {
                        output,
                        started_at,
                        completed_at: Utc::now(),
                    };
                    self.emit_event(ProvisionEvent::StepCompleted { step_id }).await;
                }
                Err(err) => {
                    error!("Step {} failed: {}", step_id, err);
                    run.steps[index].state = StepState::Failed {
                        error: err.to_string(),
                        started_at,
                        failed_at: Utc::now(),
                    };
                    self.emit_event(ProvisionEvent::StepFailed {
                        step_id,
                        error: err.to_string(),
                    })
                    .await;
                    self.skip_remaining(&mut run, index + 1).await;
                    run.fail(err);
                    break;
                }
            }
        }

        if run.status == RunStatus::Running {
            run.complete();
        }

        info!(
            "Provisioning run finished: {} - {:?}",
            recipe.name, run.status
        );
        self.emit_event(ProvisionEvent::RunCompleted {
            execution_id,
            status: run.status,
        })
        .await;

        run
    }

    async fn execute_step(
        &self,
        step: &ProvisionStep,
        context: &CommandContext,
        provided: &HashSet<String>,
    ) -> Result<String, ProvisionError> {
        if let Some(missing) = step.requires().iter().find(|r| !provided.contains(*r)) {
            return Err(ProvisionError::RequirementNotMet {
                step: step.id(),
                requirement: missing.clone(),
            });
        }

        let mut output = String::new();
        for command in step.commands() {
            let result = self.runner.run(&command, context).await?;
            debug!("[{}] {} bytes of output", context.step, result.stdout.len());
            output.push_str(&result.stdout);
            self.emit_event(ProvisionEvent::CommandFinished {
                step_id: context.step.clone(),
                command,
                output: result.stdout,
            })
            .await;
        }
        Ok(output)
    }

    async fn skip_remaining(&self, run: &mut ProvisionRun, from: usize) {
        let failed = run.steps[from.saturating_sub(1)].id.clone();
        for record in run.steps.iter_mut().skip(from) {
            warn!("Skipping step {}", record.id);
            record.state = StepState::Skipped {
                reason: format!("step '{}' failed", failed),
            };
            self.emit_event(ProvisionEvent::StepSkipped {
                step_id: record.id.clone(),
            })
            .await;
        }
    }
}

/// Carry a completed step's effect over to later commands
fn apply_step(step: &ProvisionStep, context: &mut CommandContext) {
    match step {
        ProvisionStep::SwitchUser { name } => context.user = Some(name.clone()),
        ProvisionStep::PathPrefix { dir, .. } => context.path_prefixes.insert(0, dir.clone()),
        _ => {}
    }
}
