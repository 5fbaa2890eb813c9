//! Site configuration.
//!
//! An optional `config.toml` in the input directory overrides the stock
//! defaults. Files are sparse: specify only the values you want to change.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_title = "Shaker Equipment Documentation"
//! # logo = "static/logo.svg"   # Path relative to the output root
//! images_dir = "images"        # Image directory inside the input directory
//! manuals_dir = "manuals"      # Manual directory inside the input directory
//!
//! [colors.light]
//! background = "#ffffff"
//! surface = "#f5f6f8"
//! text = "#1b1f24"
//! text_muted = "#5f6b7a"
//! border = "#d9dee5"
//! link = "#1f5fbf"
//! pass = "#1e7b34"
//! fail = "#b3261e"
//! pending = "#8a6d00"
//!
//! [colors.dark]
//! background = "#121417"
//! # ...same keys as light
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Title of the index page and suffix of every page title.
    pub site_title: String,
    /// Logo shown in the page header, relative to the output root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Directory (inside the input directory) holding equipment images.
    pub images_dir: String,
    /// Directory (inside the input directory) holding equipment manuals.
    pub manuals_dir: String,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_title: "Shaker Equipment Documentation".to_string(),
            logo: None,
            images_dir: "images".to_string(),
            manuals_dir: "manuals".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site_title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site_title must not be empty".into(),
            ));
        }
        for (key, dir) in [("images_dir", &self.images_dir), ("manuals_dir", &self.manuals_dir)] {
            if !is_plain_relative(dir) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a relative path inside the input directory, got '{dir}'"
                )));
            }
        }
        if let Some(logo) = &self.logo {
            if !is_plain_relative(logo) {
                return Err(ConfigError::Validation(format!(
                    "logo must be a relative path inside the output directory, got '{logo}'"
                )));
            }
        }
        Ok(())
    }
}

/// Non-empty, relative, and free of `..` components.
fn is_plain_relative(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Table header and striped row background.
    pub surface: String,
    /// Primary text color.
    pub text: String,
    /// Units, descriptions, footer.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    /// Badge color for passing checks.
    pub pass: String,
    /// Badge color for failing and errored checks.
    pub fail: String,
    /// Badge color for checks awaiting input.
    pub pending: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            surface: "#f5f6f8".to_string(),
            text: "#1b1f24".to_string(),
            text_muted: "#5f6b7a".to_string(),
            border: "#d9dee5".to_string(),
            link: "#1f5fbf".to_string(),
            pass: "#1e7b34".to_string(),
            fail: "#b3261e".to_string(),
            pending: "#8a6d00".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#121417".to_string(),
            surface: "#1c2025".to_string(),
            text: "#e8eaed".to_string(),
            text_muted: "#9aa4b1".to_string(),
            border: "#30363d".to_string(),
            link: "#79a8ff".to_string(),
            pass: "#5cc97a".to_string(),
            fail: "#ff7b72".to_string(),
            pending: "#e3b341".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
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

/// Load `config.toml` from `dir` as a raw TOML value, if present.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
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
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let merged = match load_raw_config(dir)? {
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
    r##"# shaker-docs configuration
# =========================
# Place this file in the input directory as config.toml.
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Title of the index page; also appended to every equipment page title.
site_title = "Shaker Equipment Documentation"

# Logo shown in the page header, relative to the output root.
# Files from templates/static/ are copied to <output>/static/.
# logo = "static/logo.svg"

# Asset directories inside the input directory.
images_dir = "images"
manuals_dir = "manuals"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
surface = "#f5f6f8"       # Table headers, striped rows
text = "#1b1f24"
text_muted = "#5f6b7a"    # Units, descriptions, footer
border = "#d9dee5"
link = "#1f5fbf"
pass = "#1e7b34"          # Passing checks
fail = "#b3261e"          # Failing or errored checks
pending = "#8a6d00"       # Checks awaiting input values

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#121417"
surface = "#1c2025"
text = "#e8eaed"
text_muted = "#9aa4b1"
border = "#30363d"
link = "#79a8ff"
pass = "#5cc97a"
fail = "#ff7b72"
pending = "#e3b341"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        ":root {{\n{}}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}    }}\n}}",
        scheme_properties(&colors.light, "    "),
        scheme_properties(&colors.dark, "        "),
    )
}

fn scheme_properties(scheme: &ColorScheme, indent: &str) -> String {
    [
        ("bg", &scheme.background),
        ("surface", &scheme.surface),
        ("text", &scheme.text),
        ("text-muted", &scheme.text_muted),
        ("border", &scheme.border),
        ("link", &scheme.link),
        ("pass", &scheme.pass),
        ("fail", &scheme.fail),
        ("pending", &scheme.pending),
    ]
    .iter()
    .map(|(name, value)| format!("{indent}--color-{name}: {value};\n"))
    .collect()
}
