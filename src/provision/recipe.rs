//! Provisioning recipe: an ordered list of image build steps

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default timeout for a single step (in seconds)
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 1800;

/// One step of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProvisionStep {
    /// Shell commands, run in order
    Run {
        id: String,

        #[serde(default)]
        description: Option<String>,

        commands: Vec<String>,

        /// Capabilities this step makes available to later steps
        #[serde(default)]
        provides: Vec<String>,

        /// Capabilities earlier steps must have provided
        #[serde(default)]
        requires: Vec<String>,

        /// Timeout for this step (overrides the recipe default)
        #[serde(default)]
        timeout_secs: Option<u64>,
    },

    /// Create an unprivileged account with a home directory
    CreateUser {
        name: String,

        #[serde(default = "default_shell")]
        shell: String,

        #[serde(default)]
        uid: Option<u32>,
    },

    /// Run every later step as this user
    SwitchUser { name: String },

    /// Prepend a directory to `PATH` for every later step
    PathPrefix {
        dir: String,

        #[serde(default)]
        provides: Vec<String>,

        #[serde(default)]
        requires: Vec<String>,
    },

    /// Final working directory of the image
    Workdir { path: PathBuf },
}

fn default_shell() -> String {
    "/bin/bash".to_string()
}

impl ProvisionStep {
    /// Identifier used in events and run state
    pub fn id(&self) -> String {
        match self {
            ProvisionStep::Run { id, .. } => id.clone(),
            ProvisionStep::CreateUser { name, .. } => format!("create-user:{}", name),
            ProvisionStep::SwitchUser { name } => format!("switch-user:{}", name),
            ProvisionStep::PathPrefix { dir, .. } => format!("path-prefix:{}", dir),
            ProvisionStep::Workdir { .. } => "workdir".to_string(),
        }
    }

    pub fn provides(&self) -> &[String] {
        match self {
            ProvisionStep::Run { provides, .. } | ProvisionStep::PathPrefix { provides, .. } => {
                provides
            }
            _ => &[],
        }
    }

    pub fn requires(&self) -> &[String] {
        match self {
            ProvisionStep::Run { requires, .. } | ProvisionStep::PathPrefix { requires, .. } => {
                requires
            }
            _ => &[],
        }
    }

    /// Shell commands this step amounts to
    pub fn commands(&self) -> Vec<String> {
        match self {
            ProvisionStep::Run { commands, .. } => commands.clone(),
            ProvisionStep::CreateUser { name, shell, uid } => {
                vec![useradd_command(name, shell, *uid)]
            }
            ProvisionStep::SwitchUser { .. } | ProvisionStep::PathPrefix { .. } => vec![],
            ProvisionStep::Workdir { path } => vec![format!("mkdir -p {}", path.display())],
        }
    }
}

pub(crate) fn useradd_command(name: &str, shell: &str, uid: Option<u32>) -> String {
    match uid {
        Some(uid) => format!("useradd -m -u {} -s {} {}", uid, shell, name),
        None => format!("useradd -m -s {} {}", shell, name),
    }
}

/// An ordered provisioning recipe loaded from YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,

    /// Image the recipe starts from
    pub base_image: String,

    /// Default timeout for steps (in seconds)
    #[serde(default)]
    pub default_timeout_secs: Option<u64>,

    pub steps: Vec<ProvisionStep>,
}

impl Recipe {
    /// Load a recipe from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a recipe from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let recipe: Recipe = serde_yaml::from_str(yaml)?;
        recipe.validate()?;
        Ok(recipe)
    }

    pub fn step_timeout(&self, step: &ProvisionStep) -> u64 {
        let default = self.default_timeout_secs.unwrap_or(DEFAULT_STEP_TIMEOUT_SECS);
        match step {
            ProvisionStep::Run { timeout_secs, .. } => timeout_secs.unwrap_or(default),
            _ => default,
        }
    }

    /// Validate the recipe, walking the steps in order
    pub fn validate(&self) -> Result<()> {
        if self.base_image.trim().is_empty() {
            anyhow::bail!("Recipe '{}' has no base image", self.name);
        }

        let mut seen_ids = HashSet::new();
        let mut provided: HashSet<&str> = HashSet::new();
        let mut created_user: Option<&str> = None;
        let mut active_user: Option<&str> = None;

        for (index, step) in self.steps.iter().enumerate() {
            if !seen_ids.insert(step.id()) {
                anyhow::bail!("Duplicate step ID: {}", step.id());
            }

            for requirement in step.requires() {
                if !provided.contains(requirement.as_str()) {
                    anyhow::bail!(
                        "Step '{}' requires '{}', which no earlier step provides",
                        step.id(),
                        requirement
                    );
                }
            }

            match step {
                ProvisionStep::Run { commands, .. } if commands.is_empty() => {
                    anyhow::bail!("Step '{}' has no commands", step.id());
                }
                ProvisionStep::CreateUser { name, uid, .. } => {
                    if created_user.is_some() {
                        anyhow::bail!("Recipe creates more than one user");
                    }
                    if name == "root" || *uid == Some(0) {
                        anyhow::bail!("The created user must not be root");
                    }
                    if !is_valid_user_name(name) {
                        anyhow::bail!("Invalid user name: '{}'", name);
                    }
                    created_user = Some(name.as_str());
                }
                ProvisionStep::SwitchUser { name } => {
                    if created_user != Some(name.as_str()) {
                        anyhow::bail!("Cannot switch to user '{}' before it is created", name);
                    }
                    active_user = Some(name.as_str());
                }
                ProvisionStep::Workdir { path } => {
                    if index + 1 != self.steps.len() {
                        anyhow::bail!("The workdir must be the last step");
                    }
                    // components() drops interior "." so the raw segments are checked
                    let dotted = path
                        .to_string_lossy()
                        .split('/')
                        .any(|segment| segment == "." || segment == "..");
                    if !path.is_absolute() || dotted {
                        anyhow::bail!(
                            "Workdir {} must be an absolute path without '.' or '..'",
                            path.display()
                        );
                    }
                    if let Some(user) = active_user {
                        let home = PathBuf::from("/home").join(user);
                        if !path.starts_with(&home) {
                            anyhow::bail!(
                                "Workdir {} must live under {} to be owned by '{}'",
                                path.display(),
                                home.display(),
                                user
                            );
                        }
                    }
                }
                _ => {}
            }

            provided.extend(step.provides().iter().map(String::as_str));
        }

        Ok(())
    }

    /// The image used to build the game: browser, Node.js and a Rust
    /// toolchain with `wasm-pack`, owned by an unprivileged user
    pub fn wasm_toolchain() -> Self {
        let user = "pallet";
        let home = format!("/home/{}", user);
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Recipe {
            name: "wasm-toolchain".to_string(),
            base_image: "ubuntu:22.04".to_string(),
            default_timeout_secs: None,
            steps: vec![
                ProvisionStep::Run {
                    id: "system-packages".to_string(),
                    description: Some("Python, TLS headers and a C toolchain".to_string()),
                    commands: strings(&[
                        "apt-get update",
                        "DEBIAN_FRONTEND=noninteractive apt-get install -y --no-install-recommends \
                         python3 python3-dev libssl-dev pkg-config gcc curl ca-certificates",
                    ]),
                    provides: strings(&["python3", "openssl", "pkg-config", "gcc", "curl"]),
                    requires: vec![],
                    timeout_secs: None,
                },
                ProvisionStep::Run {
                    id: "chrome".to_string(),
                    description: Some("Headless Chrome and its shared libraries".to_string()),
                    commands: strings(&[
                        "curl -fsSL https://dl.google.com/linux/direct/google-chrome-stable_current_amd64.deb -o /tmp/chrome.deb",
                        "DEBIAN_FRONTEND=noninteractive apt-get install -y --no-install-recommends \
                         /tmp/chrome.deb fonts-liberation libasound2 libgbm1 libnss3 libxss1",
                        "rm /tmp/chrome.deb",
                    ]),
                    provides: strings(&["chrome"]),
                    requires: strings(&["curl"]),
                    timeout_secs: None,
                },
                ProvisionStep::Run {
                    id: "nodejs".to_string(),
                    description: Some("Node.js runtime".to_string()),
                    commands: strings(&[
                        "curl -fsSL https://deb.nodesource.com/setup_18.x | bash -",
                        "DEBIAN_FRONTEND=noninteractive apt-get install -y nodejs",
                    ]),
                    provides: strings(&["node", "npm"]),
                    requires: strings(&["curl"]),
                    timeout_secs: None,
                },
                ProvisionStep::CreateUser {
                    name: user.to_string(),
                    shell: default_shell(),
                    uid: None,
                },
                ProvisionStep::SwitchUser {
                    name: user.to_string(),
                },
                ProvisionStep::Run {
                    id: "rustup".to_string(),
                    description: Some("Rust toolchain for the unprivileged user".to_string()),
                    commands: strings(&[
                        "curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y",
                    ]),
                    provides: strings(&["rustup"]),
                    requires: strings(&["curl"]),
                    timeout_secs: None,
                },
                ProvisionStep::PathPrefix {
                    dir: format!("{}/.cargo/bin", home),
                    provides: strings(&["cargo"]),
                    requires: strings(&["rustup"]),
                },
                ProvisionStep::Run {
                    id: "wasm-pack".to_string(),
                    description: Some("WebAssembly packaging tool".to_string()),
                    commands: strings(&["cargo install wasm-pack"]),
                    provides: strings(&["wasm-pack"]),
                    requires: strings(&["cargo", "gcc", "openssl", "pkg-config"]),
                    timeout_secs: Some(3600),
                },
                ProvisionStep::Workdir {
                    path: PathBuf::from(format!("{}/app", home)),
                },
            ],
        }
    }
}

fn is_valid_user_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        && name.len() <= 32
}
