//! Configuration file loading (quire.toml).

use std::fs;
use std::path::Path;

use anyhow::Result;
use quire_render::RenderConfig;

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<RenderConfig> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: RenderConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::debug!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(RenderConfig::default())
}
