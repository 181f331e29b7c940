//! Test: command-line parsing and recipe selection

use pallet::cli::commands::{ProvisionCommand, RecipeArgs};
use pallet::cli::{Cli, Command};

#[test]
fn test_provision_without_recipe_uses_builtin() {
    let cli = Cli::try_parse_from(["pallet", "provision", "render"]).unwrap();
    let args = match cli.command {
        Command::Provision(ProvisionCommand::Render(args)) => args,
        other => panic!("unexpected command: {:?}", other),
    };

    let recipe = args.load().unwrap();
    assert_eq!(recipe.name, "wasm-toolchain");
}

#[test]
fn test_provision_with_recipe_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipe.yaml");
    std::fs::write(
        &path,
        r#"
name: "tiny"
base_image: "alpine:3"
steps:
  - kind: run
    id: "hello"
    commands: ["echo hello"]
"#,
    )
    .unwrap();

    let args = RecipeArgs {
        recipe: Some(path.to_string_lossy().to_string()),
    };
    let recipe = args.load().unwrap();
    assert_eq!(recipe.name, "tiny");
    assert_eq!(recipe.steps.len(), 1);
}

#[test]
fn test_missing_recipe_file_reports_path() {
    let args = RecipeArgs {
        recipe: Some("/nonexistent/recipe.yaml".to_string()),
    };
    let err = args.load().unwrap_err();
    assert!(err.to_string().contains("/nonexistent/recipe.yaml"), "{}", err);
}

#[test]
fn test_compose_defaults_to_bundle_yaml() {
    let cli = Cli::try_parse_from(["pallet", "compose"]).unwrap();
    match cli.command {
        Command::Compose(cmd) => assert_eq!(cmd.config, "bundle.yaml"),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_play_parses_moves_in_order() {
    let cli = Cli::try_parse_from(["pallet", "play", "--moves", "a1:down", "a6:up", "a2:down"])
        .unwrap();
    match cli.command {
        Command::Play(cmd) => {
            let moves: Vec<String> = cmd
                .moves
                .iter()
                .map(|a| format!("{}:{}", a.from, a.direction))
                .collect();
            assert_eq!(moves, vec!["a1:down", "a6:up", "a2:down"]);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}
