//! Test: provisioning runs - ordering, fail-fast and the unprivileged user

use crate::helpers::*;
use pallet::provision::{ProvisionError, ProvisionEvent, ProvisionStep, Recipe, RunStatus};

fn move_step_to_front(recipe: &mut Recipe, step_id: &str) {
    let index = recipe
        .steps
        .iter()
        .position(|s| s.id() == step_id)
        .unwrap();
    let step = recipe.steps.remove(index);
    recipe.steps.insert(0, step);
}

/// The built-in recipe runs every step in order
#[tokio::test]
async fn test_builtin_recipe_completes() {
    let recipe = Recipe::wasm_toolchain();
    let result = run_recipe_with(&recipe, ScriptedRunner::new()).await;

    assert_eq!(result.run.status, RunStatus::Completed);
    for step in &recipe.steps {
        assert_step_completed(&result, &step.id());
    }

    let commands = result.runner.commands();
    let position = |needle: &str| {
        commands
            .iter()
            .position(|c| c.contains(needle))
            .unwrap_or_else(|| panic!("no command containing {}", needle))
    };
    assert!(position("apt-get update") < position("useradd"));
    assert!(position("useradd") < position("sh.rustup.rs"));
    assert!(position("sh.rustup.rs") < position("cargo install wasm-pack"));
    assert_eq!(commands.last().map(String::as_str), Some("mkdir -p /home/pallet/app"));
}

/// Commands after the user switch run as that user with cargo on PATH
#[tokio::test]
async fn test_toolchain_runs_unprivileged() {
    let result = run_recipe_with(&Recipe::wasm_toolchain(), ScriptedRunner::new()).await;

    let useradd = result
        .runner
        .context_of("useradd -m -s /bin/bash pallet")
        .unwrap();
    assert_eq!(useradd.user, None);

    let wasm_pack = result.runner.context_of("cargo install wasm-pack").unwrap();
    assert_eq!(wasm_pack.user.as_deref(), Some("pallet"));
    assert_eq!(wasm_pack.path_prefixes, vec!["/home/pallet/.cargo/bin"]);

    for command in result.runner.commands() {
        assert!(!command.contains("sudo"), "{}", command);
        assert!(!command.contains("usermod"), "{}", command);
    }
}

/// A failing step stops the run and skips everything after it
#[tokio::test]
async fn test_fail_fast_skips_remaining_steps() {
    let recipe = Recipe::wasm_toolchain();
    let result = run_recipe_with(&recipe, ScriptedRunner::failing_on("sh.rustup.rs", 22)).await;

    assert_eq!(result.run.status, RunStatus::Failed);
    assert_step_completed(&result, "system-packages");
    assert_step_failed(&result, "rustup", "exited with code 22");
    assert_skipped_after(&result, "rustup");
    assert_eq!(result.run.failed_step(), Some("rustup"));

    let commands = result.runner.commands();
    assert!(!commands.iter().any(|c| c.contains("wasm-pack")));
    assert!(!commands.iter().any(|c| c.starts_with("mkdir")));

    assert!(matches!(
        result.run.failure,
        Some(ProvisionError::CommandFailed { code: 22, .. })
    ));
}

/// A packaging step placed before the toolchain fails validation
#[test]
fn test_misordered_recipe_fails_validation() {
    let mut recipe = Recipe::wasm_toolchain();
    move_step_to_front(&mut recipe, "wasm-pack");

    let err = recipe.validate().unwrap_err();
    assert!(err.to_string().contains("wasm-pack"), "{}", err);
}

/// ...and fails at run time without running its commands
#[tokio::test]
async fn test_misordered_recipe_fails_at_runtime() {
    let mut recipe = Recipe::wasm_toolchain();
    move_step_to_front(&mut recipe, "wasm-pack");

    let result = run_recipe_with(&recipe, ScriptedRunner::new()).await;

    assert_eq!(result.run.status, RunStatus::Failed);
    assert_step_failed(&result, "wasm-pack", "requires 'cargo'");
    assert_skipped_after(&result, "wasm-pack");
    assert!(result.runner.commands().is_empty());
    assert_eq!(
        result.run.failure,
        Some(ProvisionError::RequirementNotMet {
            step: "wasm-pack".to_string(),
            requirement: "cargo".to_string(),
        })
    );
}

/// A requirement provided by a failed step is not available later
#[tokio::test]
async fn test_requirement_from_failed_step_is_not_met() {
    let recipe = Recipe::from_yaml(
        r#"
name: "chain"
base_image: "alpine:3"
steps:
  - kind: run
    id: "toolchain"
    commands: ["install-toolchain"]
    provides: ["cargo"]
  - kind: run
    id: "package"
    commands: ["cargo build"]
    requires: ["cargo"]
"#,
    )
    .unwrap();

    let result = run_recipe_with(&recipe, ScriptedRunner::failing_on("install-toolchain", 1)).await;
    assert_step_failed(&result, "toolchain", "install-toolchain");
    assert_skipped_after(&result, "toolchain");
    assert_eq!(result.runner.commands(), vec!["install-toolchain"]);
}

/// Events follow the run: start, steps, failure, skips, completion
#[tokio::test]
async fn test_events_on_failure() {
    let recipe = Recipe::from_yaml(
        r#"
name: "events"
base_image: "alpine:3"
steps:
  - kind: run
    id: "first"
    commands: ["ok"]
  - kind: run
    id: "second"
    commands: ["broken"]
  - kind: run
    id: "third"
    commands: ["ok again"]
"#,
    )
    .unwrap();

    let result = run_recipe_with(&recipe, ScriptedRunner::failing_on("broken", 2)).await;

    assert!(matches!(
        result.events.first(),
        Some(ProvisionEvent::RunStarted { total_steps: 3, .. })
    ));
    assert!(result
        .events
        .iter()
        .any(|e| matches!(e, ProvisionEvent::StepFailed { step_id, .. } if step_id == "second")));
    assert!(result
        .events
        .iter()
        .any(|e| matches!(e, ProvisionEvent::StepSkipped { step_id } if step_id == "third")));
    assert!(matches!(
        result.events.last(),
        Some(ProvisionEvent::RunCompleted {
            status: RunStatus::Failed,
            ..
        })
    ));
}

/// The rendered Dockerfile creates a plain user and works under its home
#[test]
fn test_dockerfile_user_and_workdir() {
    let recipe = Recipe::wasm_toolchain();
    let dockerfile = recipe.render_dockerfile();

    let useradd: Vec<_> = dockerfile
        .lines()
        .filter(|l| l.contains("useradd"))
        .collect();
    assert_eq!(useradd, vec!["RUN useradd -m -s /bin/bash pallet"]);
    assert!(!dockerfile.contains("sudo"));
    assert!(!dockerfile.contains(" -G "));

    let workdir = dockerfile
        .lines()
        .find_map(|l| l.strip_prefix("WORKDIR "))
        .unwrap();
    assert!(workdir.starts_with("/home/pallet/"));
    assert!(dockerfile.trim_end().ends_with(&format!("WORKDIR {}", workdir)));

    match recipe.steps.iter().find(|s| matches!(s, ProvisionStep::CreateUser { .. })) {
        Some(ProvisionStep::CreateUser { name, uid, .. }) => {
            assert_ne!(name, "root");
            assert_ne!(*uid, Some(0));
        }
        _ => panic!("recipe creates no user"),
    }
}

/// Recipes loaded from disk go through validation
#[test]
fn test_recipe_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipe.yaml");
    std::fs::write(
        &path,
        r#"
name: "bad"
base_image: "ubuntu:22.04"
steps:
  - kind: create-user
    name: "root"
"#,
    )
    .unwrap();

    let err = Recipe::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("root"), "{}", err);
}
