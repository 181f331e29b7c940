//! Scenario-based tests for pallet

mod bundle;
mod cli;
mod game;
mod provision;
