//! Explicit configuration facade
//!
//! [`MutableStoredProcedure`] is what user code receives. Every write is made
//! at [`ConfigurationSource::Explicit`], so negotiation never fails; the only
//! errors are lifecycle errors and identifier validation.

use crate::builder::{InternalParameterBuilder, InternalStoredProcedureBuilder};
use crate::parameter::{ProcedureSignature, StoredProcedureParameter, TypeMapping};
use crate::view::StoredProcedureView;
use relmeta_core::{ConfigurationSource, Result};
use serde_json::Value;

const EXPLICIT: ConfigurationSource = ConfigurationSource::Explicit;

/// Explicitly configured stored procedure
#[derive(Debug, Clone)]
pub struct MutableStoredProcedure {
    builder: InternalStoredProcedureBuilder,
}

impl MutableStoredProcedure {
    pub(crate) fn new(builder: InternalStoredProcedureBuilder) -> Self {
        Self { builder }
    }

    fn validate_identifier(&self, identifier: &str) -> Result<()> {
        let procedure = self.builder.procedure().read();
        procedure.ensure_mutable()?;
        procedure.owner().model().config().validate_identifier(identifier)
    }

    /// Read-only view of the procedure
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> StoredProcedureView {
        self.builder.metadata()
    }

    /// Set the name
    ///
    /// # Errors
    /// `InvalidIdentifier` when longer than the model allows, plus the
    /// lifecycle errors.
    pub fn set_name(&self, name: &str) -> Result<&Self> {
        self.validate_identifier(name)?;
        self.builder.has_name(Some(name), EXPLICIT)?;
        Ok(self)
    }

    /// Clear the configured name so the default name applies
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn reset_name(&self) -> Result<&Self> {
        self.builder.has_name(None, EXPLICIT)?;
        Ok(self)
    }

    /// Set or clear the schema
    ///
    /// # Errors
    /// `InvalidIdentifier` when longer than the model allows, plus the
    /// lifecycle errors.
    pub fn set_schema(&self, schema: Option<&str>) -> Result<&Self> {
        if let Some(schema) = schema {
            self.validate_identifier(schema)?;
        }
        self.builder.has_schema(schema, EXPLICIT)?;
        Ok(self)
    }

    /// Bind the mapped procedure's parameter list
    ///
    /// # Errors
    /// `SignatureAlreadyBound`, `DuplicateParameter`, or the lifecycle errors.
    pub fn bind_signature(&self, signature: &ProcedureSignature) -> Result<&Self> {
        self.builder.bind_signature(signature, EXPLICIT)?;
        Ok(self)
    }

    /// Configure an existing parameter
    ///
    /// # Errors
    /// `InvalidParameterName` for an undeclared name, plus the lifecycle errors.
    pub fn parameter(&self, name: &str) -> Result<MutableParameter> {
        let builder = self.builder.has_parameter(name, EXPLICIT)?;
        Ok(MutableParameter { builder })
    }

    /// Set an annotation
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn set_annotation(&self, name: &str, value: impl Into<Value>) -> Result<&Self> {
        self.builder.has_annotation(name, value.into(), EXPLICIT)?;
        Ok(self)
    }

    /// Remove an annotation
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn remove_annotation(&self, name: &str) -> Result<&Self> {
        self.builder.has_no_annotation(name, EXPLICIT)?;
        Ok(self)
    }

    /// Source that created or last re-stamped the procedure
    #[must_use]
    pub fn configuration_source(&self) -> ConfigurationSource {
        self.metadata().configuration_source()
    }

    /// Source that configured the name
    #[must_use]
    pub fn name_configuration_source(&self) -> Option<ConfigurationSource> {
        self.metadata().name_configuration_source()
    }

    /// Source that configured the schema
    #[must_use]
    pub fn schema_configuration_source(&self) -> Option<ConfigurationSource> {
        self.metadata().schema_configuration_source()
    }
}

/// Explicitly configured parameter
#[derive(Debug, Clone)]
pub struct MutableParameter {
    builder: InternalParameterBuilder,
}

impl MutableParameter {
    /// Parameter name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.builder.name()
    }

    /// Snapshot of the parameter
    ///
    /// # Errors
    /// `InvalidParameterName` if the parameter is no longer declared.
    pub fn metadata(&self) -> Result<StoredProcedureParameter> {
        self.builder.metadata()
    }

    /// Set or clear the store type
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn set_store_type(&self, store_type: Option<&str>) -> Result<&Self> {
        self.builder.has_store_type(store_type, EXPLICIT)?;
        Ok(self)
    }

    /// Set or clear the type mapping
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn set_type_mapping(&self, mapping: Option<TypeMapping>) -> Result<&Self> {
        self.builder.has_type_mapping(mapping, EXPLICIT)?;
        Ok(self)
    }

    /// Set a parameter annotation
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn set_annotation(&self, name: &str, value: impl Into<Value>) -> Result<&Self> {
        self.builder.has_annotation(name, value.into(), EXPLICIT)?;
        Ok(self)
    }
}
