use anyhow::{Context, Result};
use pallet::bundle::{BundleConfig, Bundler};
use pallet::cli::commands::{
    BundleCommand, ComposeCommand, PlayCommand, ProvisionCommand, ProvisionRunCommand, RecipeArgs,
};
use pallet::cli::output::*;
use pallet::cli::{Cli, Command};
use pallet::game::Battle;
use pallet::provision::{
    CommandRunner, DryRunRunner, ProvisionEvent, ProvisionRun, Provisioner, ShellRunner,
};
use std::path::{Path, PathBuf};
use tracing::{error, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.as_str())),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Compose(cmd) => compose(cmd)?,
        Command::Bundle(cmd) => bundle(cmd, cli.json)?,
        Command::Provision(ProvisionCommand::Validate(args)) => validate_recipe(args, cli.json)?,
        Command::Provision(ProvisionCommand::Render(args)) => render_recipe(args)?,
        Command::Provision(ProvisionCommand::Run(cmd)) => run_recipe(cmd, cli.json).await?,
        Command::Play(cmd) => play(cmd, cli.json)?,
    }

    Ok(())
}

fn compose(cmd: &ComposeCommand) -> Result<()> {
    let config = BundleConfig::from_file(&cmd.config)
        .with_context(|| format!("Failed to load bundle config from {}", cmd.config))?;
    println!("{}", serde_json::to_string_pretty(&config.to_descriptor())?);
    Ok(())
}

fn bundle(cmd: &BundleCommand, json: bool) -> Result<()> {
    let config = BundleConfig::from_file(&cmd.config)
        .with_context(|| format!("Failed to load bundle config from {}", cmd.config))?;

    let root = match &cmd.root {
        Some(root) => PathBuf::from(root),
        None => Path::new(&cmd.config)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    if !json {
        println!(
            "{} Bundling {} ({})",
            INFO,
            style(&config.name).bold(),
            config.mode.as_str()
        );
    }

    match Bundler::new(root).bundle(&config) {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", format_bundle_report(&report));
                println!(
                    "\n{} {} written to {}",
                    CHECK,
                    style(&config.name).bold(),
                    style(report.output_dir.display()).cyan()
                );
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Bundle failed:", CROSS);
            println!("  {}", style(&e).red());
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn validate_recipe(args: &RecipeArgs, json: bool) -> Result<()> {
    println!("{} Validating recipe...", INFO);

    let result = args.load().and_then(|recipe| {
        recipe.validate()?;
        Ok(recipe)
    });

    match result {
        Ok(recipe) => {
            println!("{} Recipe is valid!", CHECK);
            println!("  Name: {}", style(&recipe.name).bold());
            println!("  Base image: {}", style(&recipe.base_image).cyan());
            println!("  Steps: {}", style(recipe.steps.len()).cyan());

            if json {
                let json = serde_json::to_string_pretty(&recipe)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

fn render_recipe(args: &RecipeArgs) -> Result<()> {
    let recipe = args.load()?;
    print!("{}", recipe.render_dockerfile());
    Ok(())
}

async fn run_recipe(cmd: &ProvisionRunCommand, json: bool) -> Result<()> {
    let recipe = cmd.recipe.load()?;

    let run = if cmd.dry_run {
        let provisioner = Provisioner::new(DryRunRunner::new());
        let run = execute(&provisioner, &recipe, json).await;
        if !json {
            println!("\n{} Commands that would run:", INFO);
            for recorded in provisioner.runner().recorded().await {
                let user = recorded.context.user.as_deref().unwrap_or("root");
                println!("  {} $ {}", style(user).dim(), recorded.command);
            }
        }
        run
    } else {
        execute(&Provisioner::new(ShellRunner::new()), &recipe, json).await
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        println!("\n{}", format_run_summary(&run));
    }

    if run.is_success() {
        if !json {
            println!(
                "\n{} {} provisioned {}",
                CHECK,
                style(&recipe.name).bold(),
                style("successfully").green()
            );
        }
        Ok(())
    } else {
        if let Some(failure) = &run.failure {
            error!("{}", failure);
        }
        if !json {
            println!(
                "\n{} {} {} at step {}",
                CROSS,
                style(&recipe.name).bold(),
                style("failed").red(),
                style(run.failed_step().unwrap_or("?")).bold()
            );
        }
        std::process::exit(1);
    }
}

async fn execute<R: CommandRunner + 'static>(
    provisioner: &Provisioner<R>,
    recipe: &pallet::provision::Recipe,
    json: bool,
) -> ProvisionRun {
    if json {
        return provisioner.run(recipe).await;
    }

    let progress = create_progress_bar(recipe.steps.len());
    let bar = progress.clone();
    provisioner
        .add_event_handler(move |event| {
            match &event {
                ProvisionEvent::StepStarted { step_id, .. } => bar.set_message(step_id.clone()),
                ProvisionEvent::StepCompleted { .. }
                | ProvisionEvent::StepFailed { .. }
                | ProvisionEvent::StepSkipped { .. } => bar.inc(1),
                _ => {}
            }
            if !matches!(event, ProvisionEvent::StepStarted { .. }) {
                bar.println(format_provision_event(&event));
            }
        })
        .await;

    let run = provisioner.run(recipe).await;
    progress.finish_and_clear();
    run
}

fn play(cmd: &PlayCommand, json: bool) -> Result<()> {
    let mut battle = Battle::new();

    for action in &cmd.moves {
        if let Err(e) = battle.accept(action) {
            println!(
                "{} Move {} rejected on turn {}: {}",
                CROSS,
                style(format!("{}:{}", action.from, action.direction)).bold(),
                battle.turn(),
                style(&e).red()
            );
            print!("{}", battle.display_board());
            std::process::exit(1);
        }
    }

    if json {
        let state = serde_json::json!({
            "turn": battle.turn(),
            "current_player": battle.current_player().to_string(),
            "winner": battle.winner().map(|p| p.to_string()),
            "board": battle.game().board.render(),
        });
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print!("{}", battle.display_board());
    }

    Ok(())
}
