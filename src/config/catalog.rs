//! Team catalog configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Where the team list is read from at startup
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// JSON or YAML file, chosen by extension
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("data/teams.json")
}
