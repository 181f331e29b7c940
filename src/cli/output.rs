//! CLI output formatting

use crate::bundle::BundleReport;
use crate::provision::{ProvisionEvent, ProvisionRun, RunStatus, StepState};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "# ");

/// Create a progress bar
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a step state for display
pub fn format_step_state(state: &StepState) -> String {
    match state {
        StepState::Pending => style("PENDING").dim().to_string(),
        StepState::Running { .. } => style("RUNNING").yellow().to_string(),
        StepState::Completed { .. } => style("COMPLETED").green().to_string(),
        StepState::Failed { .. } => style("FAILED").red().to_string(),
        StepState::Skipped { .. } => style("SKIPPED").dim().to_string(),
    }
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format a provisioning event for display
pub fn format_provision_event(event: &ProvisionEvent) -> String {
    match event {
        ProvisionEvent::RunStarted {
            execution_id,
            recipe,
            total_steps,
        } => format!(
            "{} Provisioning {} ({} steps, {})",
            ROCKET,
            style(recipe).bold(),
            total_steps,
            style(&execution_id.to_string()[..8]).dim()
        ),
        ProvisionEvent::StepStarted { step_id, .. } => {
            format!("{} {}", SPINNER, style(step_id).cyan())
        }
        ProvisionEvent::CommandFinished {
            step_id, command, ..
        } => format!("{} {} $ {}", INFO, style(step_id).dim(), command),
        ProvisionEvent::StepCompleted { step_id } => {
            format!("{} {}", CHECK, style(step_id).green())
        }
        ProvisionEvent::StepFailed { step_id, error } => {
            format!("{} {}: {}", CROSS, style(step_id).red(), style(error).dim())
        }
        ProvisionEvent::StepSkipped { step_id } => {
            format!("{} {} skipped", WARN, style(step_id).dim())
        }
        ProvisionEvent::RunCompleted {
            execution_id,
            status,
        } => format!(
            "{} Run ({}) {}",
            INFO,
            style(&execution_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    }
}

/// Format the per-step table printed after a run
pub fn format_run_summary(run: &ProvisionRun) -> String {
    let width = run.steps.iter().map(|s| s.id.len()).max().unwrap_or(0);
    run.steps
        .iter()
        .map(|record| {
            format!(
                "  {:width$}  {}",
                record.id,
                format_step_state(&record.state),
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the result of a bundle step
pub fn format_bundle_report(report: &BundleReport) -> String {
    let mut lines = vec![format!(
        "{} {}",
        PACKAGE,
        style(report.script.display()).bold()
    )];
    for asset in &report.assets {
        lines.push(format!("  {} {}", style("asset").cyan(), asset));
    }
    for copied in &report.copied {
        lines.push(format!("  {} {}", style("copy").dim(), copied.display()));
    }
    lines.join("\n")
}
