use crate::identity::StaticIdentityResolver;
use crate::text_diff::{DiffOptions, DEFAULT_MERGE_GAP};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const LOCAL_CONFIG_FILE: &str = "verdiff.toml";
const GLOBAL_CONFIG_DIR: &str = ".verdiff";
const GLOBAL_CONFIG_FILE: &str = "global.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub store: StoreConfig,
    /// User id -> display name
    #[serde(default)]
    pub identities: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffConfig {
    #[serde(default = "default_merge_gap")]
    pub merge_gap: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    pub path: PathBuf,
}

fn default_merge_gap() -> usize {
    DEFAULT_MERGE_GAP
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            merge_gap: DEFAULT_MERGE_GAP,
            max_lines: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".verdiff"),
        }
    }
}

impl Config {
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            merge_gap: self.diff.merge_gap,
            max_lines: self.diff.max_lines,
        }
    }

    pub fn identity_resolver(&self) -> StaticIdentityResolver {
        StaticIdentityResolver::new(self.identities.clone())
    }

    /// Apply `VERDIFF_*` overrides from the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(gap) = lookup("VERDIFF_MERGE_GAP") {
            match gap.parse() {
                Ok(gap) => self.diff.merge_gap = gap,
                Err(_) => log::warn!("Ignoring invalid VERDIFF_MERGE_GAP value '{gap}'"),
            }
        }
        if let Some(max_lines) = lookup("VERDIFF_MAX_LINES") {
            match max_lines.parse() {
                Ok(max_lines) => self.diff.max_lines = Some(max_lines),
                Err(_) => log::warn!("Ignoring invalid VERDIFF_MAX_LINES value '{max_lines}'"),
            }
        }
        if let Some(path) = lookup("VERDIFF_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
    }
}

pub fn global_config_path() -> PathBuf {
    let config_dir = if let Some(home_dir) = dirs::home_dir() {
        home_dir.join(GLOBAL_CONFIG_DIR)
    } else {
        PathBuf::from(GLOBAL_CONFIG_DIR)
    };
    config_dir.join(GLOBAL_CONFIG_FILE)
}

/// Read a config file, returning `None` (with a warning) when it cannot be parsed
fn read_config_file(path: &Path) -> Option<Config> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("Failed to read config file {}: {e}", path.display());
            return None;
        }
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("Failed to parse config file {}: {e}", path.display());
            None
        }
    }
}

pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

pub fn get_config() -> Result<Config> {
    // Priority order (highest to lowest):
    // 1. Explicit config file via VERDIFF_CONFIG env var
    // 2. Local config file (verdiff.toml), replacing the global one
    // 3. Saved global config file (~/.verdiff/global.toml)
    // 4. Default configuration
    // VERDIFF_* variables are applied on top of whichever file won.

    let mut config = Config::default();

    if let Some(loaded) = env::var("VERDIFF_CONFIG")
        .ok()
        .and_then(|path| read_config_file(Path::new(&path)))
    {
        config = loaded;
    } else {
        let global_path = global_config_path();
        if global_path.exists() {
            if let Some(global) = read_config_file(&global_path) {
                config = global;
            }
        }

        let local_path = env::current_dir()?.join(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            if let Some(local) = read_config_file(&local_path) {
                config.diff = local.diff;
                config.store = local.store;
                // Identities accumulate: local entries win on conflict
                config.identities.extend(local.identities);
            }
        }
    }

    config.apply_env_overrides(|key| env::var(key).ok());
    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    let config_path = global_config_path();
    if let Some(config_dir) = config_path.parent() {
        fs::create_dir_all(config_dir)?;
    }

    let config_toml = toml::to_string_pretty(config)?;
    fs::write(&config_path, config_toml)?;
    log::info!("Saved configuration to {}", config_path.display());

    Ok(())
}

/// Configuration resolution information for debugging
#[derive(Debug, Clone)]
pub struct ConfigResolutionInfo {
    pub config_source: String,
    pub config_path: Option<String>,
    /// Files whose `[identities]` tables were merged, lowest priority first
    pub identity_sources: Vec<String>,
    pub resolution_order: Vec<String>,
}

/// Get detailed information about configuration resolution
pub fn get_config_resolution_info() -> Result<ConfigResolutionInfo> {
    Ok(describe_resolution(
        env::var("VERDIFF_CONFIG").ok(),
        &env::current_dir()?.join(LOCAL_CONFIG_FILE),
        &global_config_path(),
    ))
}

fn describe_resolution(
    env_config: Option<String>,
    local_path: &Path,
    global_path: &Path,
) -> ConfigResolutionInfo {
    let mut resolution_order = Vec::new();
    let mut config_source = "default".to_string();
    let mut config_path = None;
    let mut identity_sources = Vec::new();

    if let Some(env_config) = env_config {
        resolution_order.push(format!("VERDIFF_CONFIG environment variable: {env_config}"));
        if Path::new(&env_config).exists() {
            config_source = "environment_variable".to_string();
            identity_sources.push(env_config.clone());
            config_path = Some(env_config);
        }
    }

    resolution_order.push(format!("Current directory config: {}", local_path.display()));
    resolution_order.push(format!("Global config: {}", global_path.display()));
    resolution_order.push("Built-in defaults".to_string());

    if config_source == "default" {
        // Mirrors get_config: global is read first, local replaces its
        // settings and extends its identities.
        if global_path.exists() {
            config_source = "global".to_string();
            config_path = Some(global_path.to_string_lossy().to_string());
            identity_sources.push(global_path.to_string_lossy().to_string());
        }
        if local_path.exists() {
            config_source = "current_directory".to_string();
            config_path = Some(local_path.to_string_lossy().to_string());
            identity_sources.push(local_path.to_string_lossy().to_string());
        }
    }

    ConfigResolutionInfo {
        config_source,
        config_path,
        identity_sources,
        resolution_order,
    }
}
