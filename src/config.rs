use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::codegen::Target;
use crate::net::structure::DEFAULT_ROLE;

pub const DEFAULT_CONFIG_FILE: &str = "pflow.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PflowConfig {
    #[serde(default = "default_role")]
    pub default_role: String,
    #[serde(default)]
    pub target: Target,
    /// Overrides the net name taken from the input file stem.
    #[serde(default)]
    pub machine_name: Option<String>,
}

impl Default for PflowConfig {
    fn default() -> Self {
        Self {
            default_role: default_role(),
            target: Target::default(),
            machine_name: None,
        }
    }
}

impl PflowConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: PflowConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}
