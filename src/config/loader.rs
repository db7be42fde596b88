use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::types::AppConfig;

/// Discover and load the app config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `$GH_PANEL_CONFIG` environment variable
/// 3. `$XDG_CONFIG_HOME/gh-panel/config.toml`
/// 4. `~/.config/gh-panel/config.toml`
///
/// Returns the parsed config together with the file it came from, or the
/// built-in defaults and `None` when no file exists.
pub fn load_config(explicit_path: Option<&Path>) -> Result<(AppConfig, Option<PathBuf>)> {
    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config(),
    };
    let Some(path) = path else {
        // No config found, use defaults.
        return Ok((AppConfig::default(), None));
    };
    let config = read_config(&path)?;
    Ok((config, Some(path)))
}

/// Read and parse one TOML config file.
pub fn read_config(path: &Path) -> Result<AppConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML from {}", path.display()))?;
    Ok(config)
}

/// Resolve which config file would be used, without reading it.
pub fn find_config() -> Option<PathBuf> {
    // $GH_PANEL_CONFIG
    if let Ok(path) = std::env::var("GH_PANEL_CONFIG") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    // $XDG_CONFIG_HOME/gh-panel/config.toml
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("gh-panel/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // ~/.config/gh-panel/config.toml
    if let Some(home) = home_dir() {
        let p = home.join(".config/gh-panel/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
