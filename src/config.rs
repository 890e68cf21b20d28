use std::collections::HashMap;
use std::env;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::services::tree_builder::OrphanPolicy;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_ROOT_LABEL: &str = "Pack owner";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub orphan_policy: OrphanPolicy,
    pub page_size: usize,
    pub root_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orphan_policy: OrphanPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            root_label: DEFAULT_ROOT_LABEL.to_string(),
        }
    }
}

impl Config {
    /// Read `REFNET_*` variables, loading a `.env` file first if present.
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings from a specific dotenv file only.
    pub fn from_env_file(path: &Path) -> EngineResult<Self> {
        let vars = dotenvy::from_path_iter(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?
            .collect::<Result<HashMap<String, String>, _>>()
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let orphan_policy = match lookup("REFNET_ORPHAN_POLICY") {
            Some(value) => value.parse::<OrphanPolicy>().map_err(|_| {
                EngineError::Config(format!(
                    "REFNET_ORPHAN_POLICY must be 'drop' or 'attach_to_root', got '{}'",
                    value
                ))
            })?,
            None => defaults.orphan_policy,
        };

        let page_size = match lookup("REFNET_PAGE_SIZE") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(EngineError::Config(format!(
                        "REFNET_PAGE_SIZE must be a positive integer, got '{}'",
                        value
                    )))
                }
            },
            None => defaults.page_size,
        };

        let root_label = lookup("REFNET_ROOT_LABEL")
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .unwrap_or(defaults.root_label);

        Ok(Self {
            orphan_policy,
            page_size,
            root_label,
        })
    }
}
