//! CLI command definitions

use crate::game::Action;
use crate::provision::Recipe;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};

/// Print the bundler descriptor
#[derive(Debug, Args, Clone)]
pub struct ComposeCommand {
    /// Path to bundle YAML file
    #[arg(short, long, default_value = "bundle.yaml")]
    pub config: String,
}

/// Run the bundle step
#[derive(Debug, Args, Clone)]
pub struct BundleCommand {
    /// Path to bundle YAML file
    #[arg(short, long, default_value = "bundle.yaml")]
    pub config: String,

    /// Project root (defaults to the config file's directory)
    #[arg(long)]
    pub root: Option<String>,
}

/// Recipe selection shared by the provision subcommands
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct RecipeArgs {
    /// Path to recipe YAML file (defaults to the built-in toolchain recipe)
    #[arg(short, long)]
    pub recipe: Option<String>,
}

impl RecipeArgs {
    pub fn load(&self) -> Result<Recipe> {
        match &self.recipe {
            Some(path) => Recipe::from_file(path)
                .with_context(|| format!("Failed to load recipe from {}", path)),
            None => Ok(Recipe::wasm_toolchain()),
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum ProvisionCommand {
    /// Check step ordering and user rules
    Validate(RecipeArgs),

    /// Print the recipe as a Dockerfile
    Render(RecipeArgs),

    /// Execute the recipe on this machine
    Run(ProvisionRunCommand),
}

#[derive(Debug, Args, Clone)]
pub struct ProvisionRunCommand {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Record the commands instead of running them
    #[arg(long)]
    pub dry_run: bool,
}

/// Replay a sequence of moves
#[derive(Debug, Args, Clone)]
pub struct PlayCommand {
    /// Moves as `<position>:<direction>`, e.g. `a1:down`
    #[arg(short, long, num_args = 0.., value_parser = parse_action)]
    pub moves: Vec<Action>,
}

/// Parse a move in board notation
pub fn parse_action(s: &str) -> Result<Action, String> {
    s.parse::<Action>()
        .map_err(|e| format!("Invalid move '{}': {}", s, e))
}
