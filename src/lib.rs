//! pallet - a two-player stacking board game and the glue that ships it
//!
//! The [`game`] engine is pure and builds for every target. The `native`
//! feature adds the bundle step, environment provisioning and the CLI; the
//! `wasm` feature exports the engine to JavaScript.

pub mod game;

#[cfg(feature = "native")]
pub mod bundle;
#[cfg(feature = "native")]
pub mod cli;
#[cfg(feature = "native")]
pub mod provision;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use game::{Action, Battle, Direction, Game, GameError, Player, Position};

#[cfg(feature = "native")]
pub use bundle::{BundleConfig, BundleError, BundleReport, Bundler, WasmStrategy};
#[cfg(feature = "native")]
pub use provision::{
    CommandRunner, DryRunRunner, ProvisionError, ProvisionEvent, ProvisionRun, Provisioner,
    Recipe, ShellRunner,
};
