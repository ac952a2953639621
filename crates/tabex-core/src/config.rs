//! Configuration management for tabex

use crate::error::{Result, TabexError};
use crate::presenter::MatchMode;
use crate::types::{TypeHierarchy, TypeTag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the project configuration file
pub const DEFAULT_CONFIG_PATH: &str = ".tabex/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Export settings
    pub export: ExportConfig,
    /// Presenter settings
    pub presenters: PresenterConfig,
    /// Format registry settings
    pub formats: FormatsConfig,
    /// Record kind declarations: kind = parent
    pub types: BTreeMap<String, String>,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| TabexError::Io(e).with_context(format!("reading {}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load from `path` when given, else the default location if present,
    /// else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TabexError::Toml(e.to_string()))
    }

    /// Build the type hierarchy from `[types]`
    ///
    /// Kinds are declared in name order; a parent may be declared later in
    /// the table.
    pub fn type_hierarchy(&self) -> Result<TypeHierarchy> {
        let mut hierarchy = TypeHierarchy::new();
        for (kind, parent) in &self.types {
            let parent: TypeTag = parent.parse()?;
            hierarchy.declare(kind.clone(), parent)?;
        }
        Ok(hierarchy)
    }
}

/// Export-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default export format
    pub default_format: String,
    /// JSON object key that names a record's kind
    pub kind_field: Option<String>,
    /// Enable built-in accessors (`to_s`, `split`, ...)
    pub builtin_accessors: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: "csv".to_string(),
            kind_field: None,
            builtin_accessors: true,
        }
    }
}

/// Presenter-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Matching mode (exact/polymorphic)
    pub matching: MatchMode,
    /// Render floats with this many decimal places
    pub float_places: Option<usize>,
    /// Strip markup tags from text
    pub strip_tags: bool,
    /// Replace null cells with this text
    pub null_text: Option<String>,
}

/// Format registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatsConfig {
    /// Reject a second registration for the same tag
    pub strict_registration: bool,
}
