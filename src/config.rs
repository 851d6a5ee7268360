use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_uptime_path")]
    pub uptime_path: PathBuf,
    #[serde(default)]
    pub kernels: KernelsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KernelsConfig {
    #[serde(default = "default_kernel_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
    #[serde(default = "default_exact_names")]
    pub exact_names: Vec<String>,
    #[serde(default)]
    pub track_creation_time: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uptime_path: default_uptime_path(),
            kernels: KernelsConfig::default(),
        }
    }
}

impl Default for KernelsConfig {
    fn default() -> Self {
        Self {
            dir: default_kernel_dir(),
            prefixes: default_prefixes(),
            exact_names: default_exact_names(),
            track_creation_time: false,
        }
    }
}

impl KernelsConfig {
    pub fn matches(&self, name: &str) -> bool {
        self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
            || self.exact_names.iter().any(|n| n == name)
    }

    // Shell-style description of what is searched, e.g. "/boot/vmlinuz* /boot/Image".
    pub fn search_paths(&self) -> String {
        let prefixes = self
            .prefixes
            .iter()
            .map(|p| format!("{}*", self.dir.join(p).display()));
        let exact = self
            .exact_names
            .iter()
            .map(|n| self.dir.join(n).display().to_string());
        prefixes.chain(exact).collect::<Vec<_>>().join(" ")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uptime_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "uptime_path must not be empty".to_string(),
            ));
        }
        validate_kernels(&self.kernels)
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn validate_kernels(cfg: &KernelsConfig) -> Result<(), ConfigError> {
    if cfg.dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "kernels.dir must not be empty".to_string(),
        ));
    }
    if cfg.prefixes.is_empty() && cfg.exact_names.is_empty() {
        return Err(ConfigError::Validation(
            "kernels.prefixes and kernels.exact_names must not both be empty".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for pattern in cfg.prefixes.iter().chain(&cfg.exact_names) {
        if pattern.trim().is_empty() {
            return Err(ConfigError::Validation(
                "kernel name patterns must not be empty".to_string(),
            ));
        }
        if pattern.contains('/') {
            return Err(ConfigError::Validation(format!(
                "kernel name pattern '{}' must not contain '/'",
                pattern
            )));
        }
        if !names.insert(pattern.as_str()) {
            return Err(ConfigError::Validation(format!(
                "kernel name pattern '{}' is listed twice",
                pattern
            )));
        }
    }
    Ok(())
}

fn default_uptime_path() -> PathBuf {
    PathBuf::from("/proc/uptime")
}

fn default_kernel_dir() -> PathBuf {
    PathBuf::from("/boot")
}

fn default_prefixes() -> Vec<String> {
    vec!["vmlinuz".to_string()]
}

fn default_exact_names() -> Vec<String> {
    vec!["Image".to_string()]
}
