//! Bundle configuration from YAML

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Build mode passed through to the bundler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

/// How `.wasm` imports are made loadable. Only one strategy can be active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum WasmStrategy {
    /// Route `.wasm` imports through a dedicated asset loader
    Loader {
        /// Module rule pattern
        #[serde(default = "default_wasm_test")]
        test: String,

        /// Loader name
        #[serde(default = "default_wasm_loader")]
        loader: String,
    },
    /// Let the bundler instantiate wasm natively and asynchronously
    NativeAsync,
}

impl Default for WasmStrategy {
    fn default() -> Self {
        WasmStrategy::Loader {
            test: default_wasm_test(),
            loader: default_wasm_loader(),
        }
    }
}

impl WasmStrategy {
    /// Pick a strategy from the two bundler switches: a loader rule for
    /// `.wasm` and the native async flag. Exactly one must be on.
    pub fn from_flags(loader: Option<(String, String)>, native_async: bool) -> Result<Self> {
        match (loader, native_async) {
            (Some(_), true) => anyhow::bail!(
                "Both a .wasm loader rule and native async WebAssembly are enabled; pick one"
            ),
            (None, false) => anyhow::bail!(
                "No .wasm handling configured: add a loader rule or enable native async WebAssembly"
            ),
            (Some((test, loader)), false) => Ok(WasmStrategy::Loader { test, loader }),
            (None, true) => Ok(WasmStrategy::NativeAsync),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, WasmStrategy::NativeAsync)
    }
}

fn default_wasm_test() -> String {
    r"\.wasm$".to_string()
}

fn default_wasm_loader() -> String {
    "wasm-loader".to_string()
}

/// Where the bundle is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory, relative to the project root
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Name of the emitted script
    #[serde(default = "default_output_filename")]
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: default_output_filename(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("dist")
}

fn default_output_filename() -> String {
    "bundle.js".to_string()
}

/// A file (or glob) copied unchanged into the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPattern {
    pub from: String,

    /// Destination directory inside the output directory
    #[serde(default = "default_copy_to")]
    pub to: String,
}

fn default_copy_to() -> String {
    ".".to_string()
}

/// Top-level bundle configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Bundle name
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub mode: Mode,

    /// Script entry point, relative to the project root
    pub entry: PathBuf,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub wasm: WasmStrategy,

    /// Files copied into the output directory after the script is emitted
    #[serde(default)]
    pub copy: Vec<CopyPattern>,
}

fn default_name() -> String {
    "bundle".to_string()
}

impl BundleConfig {
    /// Load bundle configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse bundle configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: BundleConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the bundle configuration
    pub fn validate(&self) -> Result<()> {
        if self.entry.as_os_str().is_empty() {
            anyhow::bail!("Bundle '{}' has an empty entry", self.name);
        }

        let out = &self.output.path;
        let escapes = out
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        let names_dir = out.components().any(|c| matches!(c, Component::Normal(_)));
        if out.is_absolute() || escapes || !names_dir {
            anyhow::bail!(
                "Output path '{}' must be a subdirectory of the project",
                out.display()
            );
        }

        let filename = &self.output.filename;
        if filename.is_empty() {
            anyhow::bail!("Bundle '{}' has an empty output filename", self.name);
        }
        if filename.contains('/') || filename.contains('\\') {
            anyhow::bail!(
                "Output filename '{}' must not contain a path separator",
                filename
            );
        }

        if let WasmStrategy::Loader { test, loader } = &self.wasm {
            if test.is_empty() || loader.is_empty() {
                anyhow::bail!("Wasm loader rule needs both a test pattern and a loader");
            }
        }

        for pattern in &self.copy {
            if pattern.from.is_empty() {
                anyhow::bail!("Copy pattern has an empty 'from'");
            }
            let to = Path::new(&pattern.to);
            if to.is_absolute()
                || to
                    .components()
                    .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
            {
                anyhow::bail!(
                    "Copy destination '{}' must stay inside the output directory",
                    pattern.to
                );
            }
        }

        Ok(())
    }
}
