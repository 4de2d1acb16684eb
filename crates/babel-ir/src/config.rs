//! IR build configuration.
//!
//! Example config.toml:
//! ```toml
//! [namespace]
//! duplicates = "reject"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IrError;

/// What a namespace does when a route or data type name is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep both entries in the ordered list; the name lookup points at the
    /// latest one.
    #[default]
    LastWriteWins,
    /// Fail the registration and leave the namespace unchanged.
    Reject,
}

/// Namespace configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    pub duplicates: DuplicatePolicy,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrConfig {
    pub namespace: NamespaceConfig,
}

impl IrConfig {
    /// Config that rejects duplicate names.
    pub fn strict() -> Self {
        Self {
            namespace: NamespaceConfig {
                duplicates: DuplicatePolicy::Reject,
            },
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, IrError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, IrError> {
        let content = std::fs::read_to_string(path).map_err(|source| IrError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
