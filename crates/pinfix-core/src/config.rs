use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Page-side resolution parameters (`[resolver]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum age of cached page metadata in milliseconds, even when the page key is unchanged.
    pub cache_ttl_ms: u64,
    /// Maximum number of CDN images inspected by the feed scan.
    pub scan_budget: usize,
    /// Images with either rendered dimension below this are treated as thumbnails/avatars.
    pub min_image_px: u32,
    /// Shortest title (in chars) accepted from the page.
    pub min_title_len: usize,
    /// Longest title (in chars) accepted from the page.
    pub max_title_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 1000,
            scan_budget: 30,
            min_image_px: 150,
            min_title_len: 2,
            max_title_len: 200,
        }
    }
}

impl ResolverConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

/// Filename derivation parameters (`[naming]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Folder (relative to the download root) that every image lands in.
    pub subfolder: String,
    /// Base name used when the page yields no usable name.
    pub fallback_name: String,
    /// Extension used when the image URL has none.
    pub fallback_extension: String,
    /// Maximum length of the sanitized base name, in chars.
    pub max_base_len: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            subfolder: "Pinterest".to_string(),
            fallback_name: "pinterest-image".to_string(),
            fallback_extension: "jpg".to_string(),
            max_base_len: 120,
        }
    }
}

/// Global configuration loaded from `~/.config/pinfix/config.toml`.
/// Every key is optional; missing ones take their default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PinfixConfig {
    /// Root directory for saved images (None = current directory).
    pub download_dir: Option<PathBuf>,
    /// Window in milliseconds during which repeated download clicks are ignored.
    pub debounce_ms: u64,
    /// Upper bound in milliseconds on a metadata pull from the page context.
    pub pull_timeout_ms: u64,
    /// Window in milliseconds during which the saver drops identical requests.
    pub dedupe_ms: u64,
    pub resolver: ResolverConfig,
    pub naming: NamingConfig,
}

impl Default for PinfixConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            debounce_ms: 500,
            pull_timeout_ms: 5000,
            dedupe_ms: 500,
            resolver: ResolverConfig::default(),
            naming: NamingConfig::default(),
        }
    }
}

impl PinfixConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn pull_timeout(&self) -> Duration {
        Duration::from_millis(self.pull_timeout_ms)
    }

    pub fn dedupe_window(&self) -> Duration {
        Duration::from_millis(self.dedupe_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pinfix")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PinfixConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PinfixConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PinfixConfig =
        toml::from_str(&data).with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(cfg)
}
