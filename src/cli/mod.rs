//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{BundleCommand, ComposeCommand, PlayCommand, ProvisionCommand};
use std::ffi::OsString;

/// Build glue and a terminal front end for the pallet game
#[derive(Debug, Parser, Clone)]
#[command(name = "pallet")]
#[command(author = "Pallet Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Bundle, provision and play the pallet board game", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of styled text
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the bundler descriptor for a bundle configuration
    Compose(ComposeCommand),

    /// Run the bundle step
    Bundle(BundleCommand),

    /// Validate, render or run the provisioning recipe
    #[command(subcommand)]
    Provision(ProvisionCommand),

    /// Replay moves and print the board
    Play(PlayCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
