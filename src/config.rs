//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the documents directory overrides any
//! subset of keys.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! lang = "en"                  # <html lang> for default-locale pages
//! output_layout = "directory"  # "directory" or "file"
//!
//! [redirects]
//! status = 301                 # 301 (permanent) or 302 (temporary)
//!
//! [processing]
//! max_processes = 4            # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub redirects: RedirectConfig,
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.lang.trim().is_empty() {
            return Err(ConfigError::Validation("site.lang must not be empty".into()));
        }
        if !matches!(self.redirects.status, 301 | 302) {
            return Err(ConfigError::Validation(
                "redirects.status must be 301 or 302".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// `lang` attribute of default-locale pages. Other locales use their own code.
    pub lang: String,
    pub output_layout: OutputLayout,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            output_layout: OutputLayout::Directory,
        }
    }
}

/// How a page path maps onto the output directory.
///
/// - `Directory`: `/help/123` → `help/123/index.html`
/// - `File`: `/help/123` → `help/123.html`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLayout {
    #[default]
    Directory,
    File,
}

impl OutputLayout {
    /// Relative output file for an absolute page path.
    pub fn file_for(self, path: &str) -> String {
        let trimmed = path.trim_matches('/');
        match (self, trimmed.is_empty()) {
            (_, true) => "index.html".to_string(),
            (OutputLayout::Directory, false) => format!("{trimmed}/index.html"),
            (OutputLayout::File, false) => format!("{trimmed}.html"),
        }
    }

    /// `../` once per directory between the output file and the site root.
    pub fn relative_prefix_to_root(self, path: &str) -> String {
        let depth = self.file_for(path).matches('/').count();
        "../".repeat(depth)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedirectConfig {
    /// HTTP status recorded for redirect stubs.
    pub status: u16,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self { status: 301 }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel resolver workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(stock_defaults_value()?, overlay),
        None => stock_defaults_value()?,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# kg-pages Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file next to the stream documents (the --documents directory).
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# <html lang> for pages in a stream's default (first) locale.
lang = "en"

# How page paths map to files:
#   "directory"  /help/123 -> help/123/index.html
#   "file"       /help/123 -> help/123.html
output_layout = "directory"

# ---------------------------------------------------------------------------
# Redirects
# ---------------------------------------------------------------------------
[redirects]
# Status recorded on redirect stubs and in pages.json: 301 or 302.
status = 301

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel resolver workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.site.lang, "en");
        assert_eq!(config.site.output_layout, OutputLayout::Directory);
        assert_eq!(config.redirects.status, 301);
        assert!(config.processing.max_processes.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let config: SiteConfig = toml::from_str("[redirects]\nstatus = 302\n").unwrap();
        assert_eq!(config.redirects.status, 302);
        assert_eq!(config.site.lang, "en");
    }

    #[test]
    fn parse_output_layout() {
        let config: SiteConfig = toml::from_str("[site]\noutput_layout = \"file\"\n").unwrap();
        assert_eq!(config.site.output_layout, OutputLayout::File);
    }

    #[test]
    fn directory_layout_paths() {
        let layout = OutputLayout::Directory;
        assert_eq!(layout.file_for("/help/123"), "help/123/index.html");
        assert_eq!(layout.file_for("/secure"), "secure/index.html");
        assert_eq!(layout.file_for("/"), "index.html");
        assert_eq!(layout.relative_prefix_to_root("/help/123"), "../../");
        assert_eq!(layout.relative_prefix_to_root("/"), "");
    }

    #[test]
    fn file_layout_paths() {
        let layout = OutputLayout::File;
        assert_eq!(layout.file_for("/help/123"), "help/123.html");
        assert_eq!(layout.file_for("/secure"), "secure.html");
        assert_eq!(layout.relative_prefix_to_root("/help/123"), "../");
        assert_eq!(layout.relative_prefix_to_root("/secure"), "");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.redirects.status, 301);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[site]\nlang = \"fr\"\n[processing]\nmax_processes = 2\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.lang, "fr");
        assert_eq!(config.site.output_layout, OutputLayout::Directory);
        assert_eq!(config.processing.max_processes, Some(2));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not [valid").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[site]\nlnag = \"en\"\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn validate_redirect_status() {
        let mut config = SiteConfig::default();
        config.redirects.status = 307;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
        config.redirects.status = 302;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_zero_processes() {
        let mut config = SiteConfig::default();
        config.processing.max_processes = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("[site]\nlang = \"en\"\noutput_layout = \"file\"\n").unwrap();
        let overlay: toml::Value = toml::from_str("[site]\nlang = \"de\"\n").unwrap();
        let merged = merge_toml(base, overlay);
        let site = merged.get("site").unwrap();
        assert_eq!(site.get("lang").unwrap().as_str(), Some("de"));
        assert_eq!(site.get("output_layout").unwrap().as_str(), Some("file"));
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config.redirects.status, 301);
        assert_eq!(config.site.output_layout, OutputLayout::Directory);
    }
}
