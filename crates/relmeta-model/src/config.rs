//! Model configuration
//!
//! Provides [`ModelConfig`], the settings a model is created with. Loadable
//! from JSON so tooling can share one configuration file.

use relmeta_core::{MetadataError, Result};
use serde::{Deserialize, Serialize};

/// Model-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Schema used when a mapping does not configure one
    pub default_schema: Option<String>,
    /// Separator between owner name and operation in default procedure names
    pub name_separator: String,
    /// Maximum identifier length accepted from explicit configuration
    pub max_identifier_len: usize,
}

impl ModelConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default schema
    #[inline]
    #[must_use]
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    /// With default-name separator
    #[inline]
    #[must_use]
    pub fn with_name_separator(mut self, separator: impl Into<String>) -> Self {
        self.name_separator = separator.into();
        self
    }

    /// With maximum identifier length
    #[inline]
    #[must_use]
    pub fn with_max_identifier_len(mut self, max: usize) -> Self {
        self.max_identifier_len = max;
        self
    }

    /// Parse configuration from JSON
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    /// `MetadataError::InvalidConfiguration` on malformed input or an invalid
    /// setting.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings for consistency
    ///
    /// # Errors
    /// `MetadataError::InvalidConfiguration` when `max_identifier_len` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_identifier_len == 0 {
            return Err(MetadataError::InvalidConfiguration(
                "max_identifier_len must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Check an identifier against the configured length limit
    ///
    /// # Errors
    /// `MetadataError::InvalidIdentifier` when too long.
    pub fn validate_identifier(&self, identifier: &str) -> Result<()> {
        let len = identifier.chars().count();
        if len > self.max_identifier_len {
            return Err(MetadataError::invalid_identifier(
                identifier,
                format!("exceeds max length {}", self.max_identifier_len),
            ));
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default_schema: None,
            name_separator: "_".to_string(),
            max_identifier_len: 128,
        }
    }
}
