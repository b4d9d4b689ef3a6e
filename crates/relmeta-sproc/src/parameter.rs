//! Stored procedure parameters
//!
//! Parameters come from a fixed [`ProcedureSignature`] and are never created
//! ad hoc. Each carries its own source-tracked store type and type mapping.

use relmeta_core::{AnnotationStore, ConfigurationSource, DebugStringOptions, MetadataError, Tracked};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Provider-defined mapping between a value type and a store type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeMapping {
    /// Store type name, e.g. `nvarchar(max)`
    pub store_type: String,
    /// Maximum length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Numeric precision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    /// Numeric scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,
}

impl TypeMapping {
    /// Create mapping for a store type
    #[inline]
    #[must_use]
    pub fn new(store_type: impl Into<String>) -> Self {
        Self {
            store_type: store_type.into(),
            size: None,
            precision: None,
            scale: None,
        }
    }

    /// With size
    #[inline]
    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// With precision and scale
    #[inline]
    #[must_use]
    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }
}

/// Ordered parameter names of the mapped procedure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureSignature {
    parameters: Vec<String>,
}

impl ProcedureSignature {
    /// Create from parameter names
    #[must_use]
    pub fn new<I, S>(parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    /// Parameter names in declaration order
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// First name declared more than once, if any
    #[must_use]
    pub fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.parameters
            .iter()
            .find(|name| !seen.insert(name.as_str()))
            .map(String::as_str)
    }

    pub(crate) fn check_unique(&self, procedure: &str) -> Result<(), MetadataError> {
        match self.first_duplicate() {
            Some(parameter) => Err(MetadataError::DuplicateParameter {
                procedure: procedure.to_string(),
                parameter: parameter.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// A stored procedure parameter
///
/// Returned by value from views; mutation goes through parameter builders.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProcedureParameter {
    name: String,
    pub(crate) store_type: Tracked<Option<String>>,
    pub(crate) type_mapping: Tracked<Option<TypeMapping>>,
    configuration_source: ConfigurationSource,
    pub(crate) annotations: AnnotationStore,
}

impl StoredProcedureParameter {
    pub(crate) fn new(name: impl Into<String>, configuration_source: ConfigurationSource) -> Self {
        Self {
            name: name.into(),
            store_type: Tracked::default(),
            type_mapping: Tracked::default(),
            configuration_source,
            annotations: AnnotationStore::new(),
        }
    }

    /// Parameter name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective store type
    ///
    /// Falls back to the type mapping's store type when not configured.
    #[must_use]
    pub fn store_type(&self) -> Option<&str> {
        self.store_type
            .value()
            .as_deref()
            .or_else(|| self.type_mapping.value().as_ref().map(|m| m.store_type.as_str()))
    }

    /// Source that set the store type
    #[inline]
    #[must_use]
    pub fn store_type_configuration_source(&self) -> Option<ConfigurationSource> {
        self.store_type.source()
    }

    /// Type mapping
    #[inline]
    #[must_use]
    pub fn type_mapping(&self) -> Option<&TypeMapping> {
        self.type_mapping.value().as_ref()
    }

    /// Source that set the type mapping
    #[inline]
    #[must_use]
    pub fn type_mapping_configuration_source(&self) -> Option<ConfigurationSource> {
        self.type_mapping.source()
    }

    /// Source that declared the parameter
    #[inline]
    #[must_use]
    pub fn configuration_source(&self) -> ConfigurationSource {
        self.configuration_source
    }

    /// Parameter annotations
    #[inline]
    #[must_use]
    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    /// One-line rendering: `{indent}{name} {store type}`
    #[must_use]
    pub fn to_debug_string(&self, options: DebugStringOptions, indent: usize) -> String {
        let mut out = " ".repeat(indent);
        out.push_str(&self.name);

        if let Some(store_type) = self.store_type() {
            out.push(' ');
            out.push_str(store_type);
        }

        if !options.single_line && options.include_annotations {
            out.push_str(&self.annotations.to_debug_string(indent + 2));
        }

        out
    }
}
