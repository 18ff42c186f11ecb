//! Runtime configuration loaded from `nexus-sync.toml`.
//!
//! The configuration is read once at start-up and then passed by reference to
//! every component. When no config file is present the built-in defaults are
//! used: artifacts under `./deployment` and the default bucket names from
//! [`nexus_registry::Buckets`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nexus_registry::{Buckets, Environment};
use serde::Deserialize;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "nexus-sync.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the deployment artifact tree
    /// (`<deployment_dir>/<environment>/<chain_id>/<chain_name>.json`).
    pub deployment_dir: PathBuf,
    /// Environment to bucket mapping.
    pub buckets: Buckets,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deployment_dir: PathBuf::from("deployment"),
            buckets: Buckets::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Returns [`Config::default`] if the file does not exist,
    /// allowing the binary to work without any config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Path of the artifact for one chain.
    #[must_use]
    pub fn artifact_path(
        &self,
        environment: Environment,
        chain_id: u64,
        chain_name: &str,
    ) -> PathBuf {
        self.environment_dir(environment)
            .join(chain_id.to_string())
            .join(format!("{chain_name}.json"))
    }

    /// Directory holding all artifacts of `environment`.
    #[must_use]
    pub fn environment_dir(&self, environment: Environment) -> PathBuf {
        self.deployment_dir.join(environment.as_str())
    }
}
