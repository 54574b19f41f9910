use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::EnumIs;

use crate::error::{FormulaError, FormulaResult};

/// How a [`Registry`](crate::registry::Registry) treats structures that are not canonical when
/// they are paired with connectors into a formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIs, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicityPolicy {
    /// Formula construction fails with
    /// [`FormulaError::NonCanonicalStructure`].
    #[default]
    Reject,

    /// Formula construction succeeds. A warning is logged whenever such a formula takes part
    /// in an equivalence check.
    Permit,
}

/// Registry configuration.
///
/// Every field has a default, so a partial (or empty) TOML document is valid:
///
/// ```rust
/// # use hyformula::config::{CanonicityPolicy, RegistryConfig};
/// let config = RegistryConfig::from_toml_str("canonicity = \"permit\"").unwrap();
/// assert_eq!(config.canonicity, CanonicityPolicy::Permit);
/// assert_eq!(RegistryConfig::from_toml_str("").unwrap(), RegistryConfig::default());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub canonicity: CanonicityPolicy,
}

impl RegistryConfig {
    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(toml_str: &str) -> FormulaResult<Self> {
        toml::from_str(toml_str).map_err(|e| FormulaError::ConfigParse {
            source: e,
            file: toml_str.to_string(),
        })
    }

    /// Load a configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> FormulaResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;

        toml::from_str(&toml_str).map_err(|e| FormulaError::ConfigParse {
            source: e,
            file: path.display().to_string(),
        })
    }

    /// Save this configuration to a TOML file, creating parent directories as needed.
    pub fn save_to_toml(&self, path: &Path) -> FormulaResult<()> {
        let toml_str = toml::to_string(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, toml_str)?;
        Ok(())
    }
}
