use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ReleaseError, Result};
use crate::git::SyncMode;
use crate::waiter::WaitOptions;

pub const ENV_WORKSPACE_ROOT: &str = "ALIS_WORKSPACE_ROOT";
pub const ENV_PRODUCTS_ENDPOINT: &str = "ALIS_PRODUCTS_ENDPOINT";
pub const ENV_OPERATIONS_ENDPOINT: &str = "ALIS_OPERATIONS_ENDPOINT";

/// Represents the complete configuration for alis.
///
/// Every section is optional in the file; missing values take their defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub wait: WaitConfig,

    #[serde(default)]
    pub tags: TagsConfig,
}

/// Returns `$HOME/alis.exchange`, the conventional checkout location.
fn default_workspace_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("alis.exchange")
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        WorkspaceConfig {
            root: default_workspace_root(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

/// Remote, branch and pull behaviour used when publishing repositories.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default)]
    pub sync: SyncMode,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            branch: default_branch(),
            sync: SyncMode::default(),
        }
    }
}

fn default_products_endpoint() -> String {
    "resources-products-v1-ntaj7kcaca-ew.a.run.app".to_string()
}

fn default_operations_endpoint() -> String {
    "resources-operations-v1-ntaj7kcaca-ew.a.run.app".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_products_endpoint")]
    pub products_endpoint: String,

    #[serde(default = "default_operations_endpoint")]
    pub operations_endpoint: String,

    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            products_endpoint: default_products_endpoint(),
            operations_endpoint: default_operations_endpoint(),
            token: None,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    300
}

/// Polling of long-running operations. A timeout of 0 waits forever.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WaitConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        WaitConfig {
            poll_interval_secs: default_poll_interval_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl WaitConfig {
    pub fn options(&self) -> WaitOptions {
        WaitOptions {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: match self.timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct TagsConfig {
    /// Length of the random tag suffix; 0 keeps tags deterministic
    #[serde(default)]
    pub salt_length: usize,
}

impl Config {
    /// Replace file values with any set `ALIS_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = env::var(ENV_WORKSPACE_ROOT) {
            self.workspace.root = PathBuf::from(root);
        }
        if let Ok(endpoint) = env::var(ENV_PRODUCTS_ENDPOINT) {
            self.api.products_endpoint = endpoint;
        }
        if let Ok(endpoint) = env::var(ENV_OPERATIONS_ENDPOINT) {
            self.api.operations_endpoint = endpoint;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.wait.poll_interval_secs == 0 {
            return Err(ReleaseError::config("wait.poll_interval_secs must be positive"));
        }
        if self.git.remote.trim().is_empty() || self.git.branch.trim().is_empty() {
            return Err(ReleaseError::config("git.remote and git.branch must not be empty"));
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        ReleaseError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| ReleaseError::config(format!("invalid {}: {}", path.display(), e)))
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `alis.toml` in current directory
/// 3. `alis/config.toml` in user config directory
/// 4. Default configuration if no file found
///
/// Environment overrides are applied on top of whichever source was used.
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let mut config = if let Some(path) = config_path {
        read_config(Path::new(path))?
    } else if Path::new("./alis.toml").exists() {
        read_config(Path::new("./alis.toml"))?
    } else {
        match dirs::config_dir().map(|dir| dir.join("alis").join("config.toml")) {
            Some(path) if path.exists() => read_config(&path)?,
            _ => Config::default(),
        }
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
