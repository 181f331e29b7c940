//! Bundle configuration and the bundle step

pub mod bundler;
pub mod compose;
pub mod config;

pub use bundler::{BundleError, BundleReport, BundleResult, Bundler};
pub use config::{BundleConfig, CopyPattern, Mode, OutputConfig, WasmStrategy};
