//! Pipeline configuration.
//!
//! Loaded from an optional `trq-image.toml` in the project root. The file is
//! sparse: stock defaults are the base layer and user keys are merged on top,
//! so a config only needs the values it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! output_dir = "images"   # Subdirectory of the public dir receiving artifacts
//! quality = 80            # Lossy encoding quality (1-100)
//! formats = []            # Output formats; empty = keep each source's own format
//!
//! [[scales]]
//! suffix = ""             # Appended as `@suffix` to the artifact name (empty = none)
//! dpr = 1.0               # Multiplier on the source's native width
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the project root.
pub const CONFIG_FILENAME: &str = "trq-image.toml";

/// Suffix reserved for the verbatim fallback copy.
pub const RAW_SUFFIX: &str = "raw";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Output encoding for generated artifacts.
///
/// `Jpg` and `Jpeg` produce identical bytes; they only differ in the
/// extension written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Jpg,
    Jpeg,
    Png,
    Webp,
    Avif,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Jpg,
        Format::Jpeg,
        Format::Png,
        Format::Webp,
        Format::Avif,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Jpg => "jpg",
            Format::Jpeg => "jpeg",
            Format::Png => "png",
            Format::Webp => "webp",
            Format::Avif => "avif",
        }
    }

    /// Case-insensitive lookup by file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One output resolution tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScaleSpec {
    /// Name suffix; `""` writes `base.ext`, `"2x"` writes `base@2x.ext`.
    pub suffix: String,
    /// Multiplier applied to the source's native pixel width.
    pub dpr: f64,
}

impl ScaleSpec {
    pub fn new(suffix: impl Into<String>, dpr: f64) -> Self {
        Self {
            suffix: suffix.into(),
            dpr,
        }
    }
}

/// Resize pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeConfig {
    /// Directory under the public root that receives all output.
    pub output_dir: String,
    /// Resolution tiers to generate.
    pub scales: Vec<ScaleSpec>,
    /// Encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Output formats. Empty means "same format as the source".
    pub formats: Vec<Format>,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            output_dir: "images".to_string(),
            scales: vec![ScaleSpec::new("", 1.0)],
            quality: 80,
            formats: Vec::new(),
        }
    }
}

impl OptimizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        if self.scales.is_empty() {
            return Err(ConfigError::Validation("scales must not be empty".into()));
        }
        for (i, scale) in self.scales.iter().enumerate() {
            if !scale.dpr.is_finite() || scale.dpr <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "scales[{i}].dpr must be a positive number, got {}",
                    scale.dpr
                )));
            }
            if scale.suffix == RAW_SUFFIX {
                return Err(ConfigError::Validation(format!(
                    "scales[{i}].suffix '{RAW_SUFFIX}' is reserved for the raw copy"
                )));
            }
            if self.scales[..i].iter().any(|s| s.suffix == scale.suffix) {
                return Err(ConfigError::Validation(format!(
                    "scales[{i}].suffix '{}' is used more than once",
                    scale.suffix
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(OptimizeConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (including arrays) replace base values entirely.
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

/// Parse config TOML text, merge over stock defaults, and validate.
pub fn parse_config(content: &str) -> Result<OptimizeConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value(), overlay);
    let config: OptimizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`.
///
/// A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<OptimizeConfig, ConfigError> {
    if !path.exists() {
        return Ok(OptimizeConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# trq-image configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory under the public dir that receives generated images.
# Sources are read from <src>/images/ and mirrored here.
output_dir = "images"

# Lossy encoding quality (1 = worst, 100 = best).
# PNG and WebP output is lossless and ignores this value.
quality = 80

# Output formats: any of "jpg", "jpeg", "png", "webp", "avif".
# Leave empty to re-encode each image in its own format.
formats = []

# ---------------------------------------------------------------------------
# Scale tiers
# ---------------------------------------------------------------------------
# Each tier renders the source at `dpr` times its native width and writes
# <name>@<suffix>.<format> (or <name>.<format> when the suffix is empty).
#
# Sources named like `hero@2x.png` declare their native density; only tiers
# with dpr <= max(dpr) / declared ratio are generated for them.
#
# Example retina set:
#   [[scales]]
#   suffix = ""
#   dpr = 0.5
#   [[scales]]
#   suffix = "2x"
#   dpr = 1.0

[[scales]]
suffix = ""
dpr = 1.0
"##
}
