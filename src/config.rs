use std::path::Path;

use serde::Deserialize;

use crate::prelude::*;

/// TOML file describing the rooftop sites to fetch, an alternative to
/// repeating `--site` on the command line.
#[derive(Debug, Deserialize)]
pub struct SitesFile {
    #[serde(default)]
    pub sites: Vec<Site>,
}

#[derive(Debug, Deserialize)]
pub struct Site {
    pub resource_id: String,

    /// Human-readable label, only used in logs.
    pub name: Option<String>,
}

impl SitesFile {
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse the sites file `{}`", path.display()))
    }
}
