//! Dockerfile rendering

use crate::provision::{ProvisionStep, Recipe};

impl Recipe {
    /// Render the recipe as a Dockerfile. The output depends only on the
    /// recipe.
    pub fn render_dockerfile(&self) -> String {
        let mut out = String::new();
        let mut unprivileged = false;

        out.push_str(&format!("# {}\n", self.name));
        out.push_str(&format!("FROM {}\n", self.base_image));

        for step in &self.steps {
            out.push('\n');
            match step {
                ProvisionStep::Run {
                    id,
                    description,
                    commands,
                    ..
                } => {
                    match description {
                        Some(description) => {
                            out.push_str(&format!("# {}: {}\n", id, description))
                        }
                        None => out.push_str(&format!("# {}\n", id)),
                    }
                    out.push_str(&format!("RUN {}\n", commands.join(" \\\n    && ")));
                }
                ProvisionStep::CreateUser { .. } => {
                    for command in step.commands() {
                        out.push_str(&format!("RUN {}\n", command));
                    }
                }
                ProvisionStep::SwitchUser { name } => {
                    unprivileged = true;
                    out.push_str(&format!("USER {}\n", name));
                }
                ProvisionStep::PathPrefix { dir, .. } => {
                    out.push_str(&format!("ENV PATH=\"{}:${{PATH}}\"\n", dir));
                }
                ProvisionStep::Workdir { path } => {
                    // WORKDIR would create a missing directory owned by root
                    if unprivileged {
                        out.push_str(&format!("RUN mkdir -p {}\n", path.display()));
                    }
                    out.push_str(&format!("WORKDIR {}\n", path.display()));
                }
            }
        }

        out
    }
}
