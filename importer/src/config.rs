//! Import configuration.
//!
//! Defines the YAML-serializable settings that control quality gating and
//! parsing behavior. Every field has a default, so an empty file is valid.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! quality:
//!   min_confidence: 0.6
//!   min_coverage: 0.2
//!   allow_low_quality: false
//! parsing:
//!   default_priority: medium
//!   automation_matching: first_match
//!   extended_automation_tiers: false
//!   require_hierarchical: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use qa_import_core::Priority;

use crate::error::{ImportError, Result};
use crate::parser::ParseOptions;
use crate::parser::assemble::{AssembleOptions, MatchStrategy};
use crate::quality::{DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_COVERAGE, ImportQualityPolicy};

pub const CONFIG_FORMAT_VERSION: &str = "1.0";

/// Quality thresholds for accepting a parsed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Minimum hierarchical confidence (0.0–1.0).
    pub min_confidence: f64,
    /// Minimum share of lines the parser attached to something (0.0–1.0).
    pub min_coverage: f64,
    /// Keep documents that fall below the thresholds.
    pub allow_low_quality: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_coverage: DEFAULT_MIN_COVERAGE,
            allow_low_quality: false,
        }
    }
}

/// Settings for the scan and the metadata merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    pub default_priority: Priority,
    pub automation_matching: MatchStrategy,
    /// Accept `Medium`/`Low Priority for Automation` headings.
    pub extended_automation_tiers: bool,
    /// Skip the hierarchical parse when classification picks another format.
    pub require_hierarchical: bool,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            default_priority: Priority::Medium,
            automation_matching: MatchStrategy::FirstMatch,
            extended_automation_tiers: false,
            require_hierarchical: true,
        }
    }
}

/// Top-level import configuration.
///
/// # Examples
///
/// ```
/// use qa_import::config::ImportConfig;
///
/// let config: ImportConfig = serde_yaml::from_str("quality: { min_confidence: 0.8 }").unwrap();
/// assert_eq!(config.quality.min_confidence, 0.8);
/// assert!(config.parsing.require_hierarchical);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    pub quality: QualityConfig,
    pub parsing: ParsingConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION.to_string(),
            quality: QualityConfig::default(),
            parsing: ParsingConfig::default(),
        }
    }
}

impl ImportConfig {
    /// Loads and validates configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ImportError::IoError) if the file cannot be read,
    /// [`YamlError`](ImportError::YamlError) if parsing fails, or
    /// [`InvalidConfig`](ImportError::InvalidConfig) if a threshold is out of
    /// range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks that thresholds lie in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("quality.min_confidence", self.quality.min_confidence),
            ("quality.min_coverage", self.quality.min_coverage),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ImportError::InvalidConfig(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn quality_policy(&self) -> ImportQualityPolicy {
        ImportQualityPolicy {
            min_confidence: self.quality.min_confidence,
            min_coverage: self.quality.min_coverage,
            allow_low_quality: self.quality.allow_low_quality,
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            extended_automation_tiers: self.parsing.extended_automation_tiers,
            assemble: AssembleOptions {
                default_priority: self.parsing.default_priority,
                matching: self.parsing.automation_matching,
            },
        }
    }
}
