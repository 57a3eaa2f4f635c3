//! Configuration loading helper functions
//!
//! Layers a configuration file (format picked from its extension) under
//! environment variable overrides, using figment.

use anyhow::{anyhow, Context, Result};
use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

/// Separator between nested keys in environment variable names
///
/// `VOLTAGE_SLAVE_DATABASE__TABLE=foo` overrides `database.table`.
pub const ENV_NESTING_SEPARATOR: &str = "__";

/// Build a figment holding a single configuration file
pub fn file_figment(path: impl AsRef<Path>) -> Result<Figment> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Config file must have an extension: {}", path.display()))?;

    let figment = match extension {
        "toml" => Figment::new().merge(Toml::file(path)),
        "yaml" | "yml" => Figment::new().merge(Yaml::file(path)),
        "json" => Figment::new().merge(Json::file(path)),
        _ => {
            return Err(anyhow!(
                "Unsupported config file format: {}",
                extension
            ))
        },
    };

    Ok(figment)
}

/// Load configuration from a specific file
///
/// Priority (highest to lowest):
/// 1. Environment variables starting with `env_prefix` (when given)
/// 2. The file at `path`
/// 3. `Default` values of `T` for anything left unset (via `#[serde(default)]`)
pub fn load_config_from_file<T, P>(path: P, env_prefix: Option<&str>) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(anyhow!("Config file not found: {}", path.display()));
    }

    let mut figment = file_figment(path)?;
    if let Some(prefix) = env_prefix {
        figment = figment.merge(Env::prefixed(prefix).split(ENV_NESTING_SEPARATOR));
    }

    let config = figment
        .extract()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    info!("Configuration loaded from {}", path.display());
    Ok(config)
}
