//! Provisioning run state

use crate::provision::ProvisionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run has not started
    Pending,
    /// Steps are being executed
    Running,
    /// Every step completed
    Completed,
    /// A step failed; later steps were skipped
    Failed,
}

/// State of a single step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepState {
    Pending,
    Running {
        started_at: DateTime<Utc>,
    },
    Completed {
        /// Combined stdout of the step's commands
        output: String,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    Failed {
        error: String,
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
    },
    Skipped {
        reason: String,
    },
}

impl StepState {
    /// Check if step is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepState::Completed { .. } | StepState::Failed { .. } | StepState::Skipped { .. }
        )
    }
}

/// A step of the run, by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub id: String,
    pub state: StepState,
}

/// State of one provisioning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionRun {
    /// Unique execution ID
    pub execution_id: Uuid,

    pub recipe: String,

    pub status: RunStatus,

    pub started_at: Option<DateTime<Utc>>,

    pub completed_at: Option<DateTime<Utc>>,

    /// Steps in recipe order
    pub steps: Vec<StepRecord>,

    /// The error that stopped the run
    #[serde(skip)]
    pub failure: Option<ProvisionError>,
}

impl ProvisionRun {
    pub fn new(recipe: &str, step_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            recipe: recipe.to_string(),
            status: RunStatus::Pending,
            started_at: None,
            completed_at: None,
            steps: step_ids
                .into_iter()
                .map(|id| StepRecord {
                    id,
                    state: StepState::Pending,
                })
                .collect(),
            failure: None,
        }
    }

    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: ProvisionError) {
        self.status = RunStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.failure = Some(error);
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn step(&self, id: &str) -> Option<&StepState> {
        self.steps.iter().find(|s| s.id == id).map(|s| &s.state)
    }

    pub fn completed_steps(&self) -> usize {
        self.count(|s| matches!(s, StepState::Completed { .. }))
    }

    pub fn skipped_steps(&self) -> usize {
        self.count(|s| matches!(s, StepState::Skipped { .. }))
    }

    /// Id of the step that failed, if any
    pub fn failed_step(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|s| matches!(s.state, StepState::Failed { .. }))
            .map(|s| s.id.as_str())
    }

    /// Calculate progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.count(StepState::is_terminal) as f64 / self.steps.len() as f64
    }

    fn count(&self, predicate: impl Fn(&StepState) -> bool) -> usize {
        self.steps.iter().filter(|s| predicate(&s.state)).count()
    }
}
