//! Composition of the bundler's declarative descriptor
//!
//! The descriptor is the JSON object an external bundler consumes: mode,
//! entry, output, module rules, plugins and experiments. `.wasm` handling is
//! expressed either as a module rule or as the `asyncWebAssembly` experiment,
//! never both.

use crate::bundle::config::{BundleConfig, CopyPattern, Mode, OutputConfig, WasmStrategy};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::PathBuf;

pub const COPY_PLUGIN: &str = "CopyPlugin";

impl BundleConfig {
    /// Render the bundler descriptor for this configuration
    pub fn to_descriptor(&self) -> Value {
        let rules: Vec<Value> = match &self.wasm {
            WasmStrategy::Loader { test, loader } => vec![json!({
                "test": test,
                "use": loader,
            })],
            WasmStrategy::NativeAsync => vec![],
        };

        let patterns: Vec<Value> = self
            .copy
            .iter()
            .map(|p| json!({ "from": p.from, "to": p.to }))
            .collect();

        let mut descriptor = json!({
            "mode": self.mode.as_str(),
            "entry": self.entry.to_string_lossy(),
            "output": {
                "path": self.output.path.to_string_lossy(),
                "filename": self.output.filename,
            },
            "module": { "rules": rules },
            "plugins": [{ "name": COPY_PLUGIN, "patterns": patterns }],
        });

        if self.wasm.is_native() {
            descriptor["experiments"] = json!({ "asyncWebAssembly": true });
        }

        descriptor
    }

    /// Parse a bundler descriptor back into a configuration
    pub fn from_descriptor(descriptor: &Value) -> Result<Self> {
        let mode: Mode = serde_json::from_value(descriptor["mode"].clone())
            .context("Descriptor has no valid 'mode'")?;
        let entry = descriptor["entry"]
            .as_str()
            .context("Descriptor has no 'entry'")?;

        let output = &descriptor["output"];
        let output = OutputConfig {
            path: output["path"]
                .as_str()
                .map(PathBuf::from)
                .context("Descriptor has no 'output.path'")?,
            filename: output["filename"]
                .as_str()
                .context("Descriptor has no 'output.filename'")?
                .to_string(),
        };

        let loader_rule = descriptor["module"]["rules"]
            .as_array()
            .into_iter()
            .flatten()
            .find_map(|rule| {
                let test = rule["test"].as_str()?;
                let loader = rule["use"].as_str()?;
                test.contains("wasm")
                    .then(|| (test.to_string(), loader.to_string()))
            });
        let native_async = descriptor["experiments"]["asyncWebAssembly"]
            .as_bool()
            .unwrap_or(false);
        let wasm = WasmStrategy::from_flags(loader_rule, native_async)?;

        let copy = descriptor["plugins"]
            .as_array()
            .into_iter()
            .flatten()
            .filter(|plugin| plugin["name"] == COPY_PLUGIN)
            .flat_map(|plugin| plugin["patterns"].as_array().cloned().unwrap_or_default())
            .map(serde_json::from_value::<CopyPattern>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Invalid copy pattern in descriptor")?;

        let config = BundleConfig {
            name: "bundle".to_string(),
            mode,
            entry: PathBuf::from(entry),
            output,
            wasm,
            copy,
        };
        config.validate()?;
        Ok(config)
    }
}
