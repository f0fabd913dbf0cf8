mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./mediacook.toml",
        "./config.toml",
        "~/.config/mediacook/config.toml",
        "/etc/mediacook/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.storage.root.as_os_str().is_empty() {
        anyhow::bail!("Storage root cannot be empty");
    }

    if config.processing.max_concurrent_jobs == 0 {
        anyhow::bail!("processing.max_concurrent_jobs must be at least 1");
    }

    for (tool, path) in mediacook_av::Tool::ALL
        .into_iter()
        .filter_map(|tool| config.tools.path(tool).map(|p| (tool, p)))
    {
        if path.as_os_str().is_empty() {
            anyhow::bail!("tools.{}_path cannot be empty", tool);
        }
    }

    let root = config.storage.expanded_root();
    if !root.exists() {
        tracing::debug!("Storage root {:?} does not exist yet, will be created", root);
    }

    Ok(())
}
