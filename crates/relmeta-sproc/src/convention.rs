//! Convention builders
//!
//! Conventions configure at [`ConfigurationSource::Convention`], or at
//! [`ConfigurationSource::DataAnnotation`] when they were triggered by an
//! attribute on the mapped type. They back off silently whenever a stronger
//! source already holds a different value.

use crate::builder::{InternalParameterBuilder, InternalStoredProcedureBuilder};
use crate::parameter::{ProcedureSignature, StoredProcedureParameter, TypeMapping};
use crate::view::StoredProcedureView;
use relmeta_core::{ConfigurationSource, Result};
use serde_json::Value;

#[inline]
const fn source(from_data_annotation: bool) -> ConfigurationSource {
    ConfigurationSource::from_data_annotation(from_data_annotation)
}

/// Stored procedure builder handed to conventions
#[derive(Debug, Clone)]
pub struct ConventionStoredProcedureBuilder {
    builder: InternalStoredProcedureBuilder,
}

impl ConventionStoredProcedureBuilder {
    pub(crate) fn new(builder: InternalStoredProcedureBuilder) -> Self {
        Self { builder }
    }

    /// Read-only view of the procedure
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> StoredProcedureView {
        self.builder.metadata()
    }

    /// Configure the name, backing off on conflict
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn has_name(&self, name: Option<&str>, from_data_annotation: bool) -> Result<Option<&Self>> {
        let applied = self.builder.has_name(name, source(from_data_annotation))?;
        Ok(applied.map(|_| self))
    }

    /// Whether [`has_name`](Self::has_name) would apply
    #[must_use]
    pub fn can_set_name(&self, name: Option<&str>, from_data_annotation: bool) -> bool {
        self.builder.can_set_name(name, source(from_data_annotation))
    }

    /// Configure the schema, backing off on conflict
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn has_schema(
        &self,
        schema: Option<&str>,
        from_data_annotation: bool,
    ) -> Result<Option<&Self>> {
        let applied = self.builder.has_schema(schema, source(from_data_annotation))?;
        Ok(applied.map(|_| self))
    }

    /// Whether [`has_schema`](Self::has_schema) would apply
    #[must_use]
    pub fn can_set_schema(&self, schema: Option<&str>, from_data_annotation: bool) -> bool {
        self.builder.can_set_schema(schema, source(from_data_annotation))
    }

    /// Builder for an existing parameter
    ///
    /// # Errors
    /// `InvalidParameterName` for an undeclared name, plus the lifecycle errors.
    pub fn has_parameter(
        &self,
        name: &str,
        from_data_annotation: bool,
    ) -> Result<ConventionParameterBuilder> {
        let builder = self.builder.has_parameter(name, source(from_data_annotation))?;
        Ok(ConventionParameterBuilder { builder })
    }

    /// Bind the mapped procedure's parameter list
    ///
    /// # Errors
    /// `SignatureAlreadyBound`, `DuplicateParameter`, or the lifecycle errors.
    pub fn bind_signature(
        &self,
        signature: &ProcedureSignature,
        from_data_annotation: bool,
    ) -> Result<&Self> {
        self.builder
            .bind_signature(signature, source(from_data_annotation))?;
        Ok(self)
    }

    /// Set an annotation, backing off on conflict
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn has_annotation(
        &self,
        name: &str,
        value: Value,
        from_data_annotation: bool,
    ) -> Result<Option<&Self>> {
        let applied = self
            .builder
            .has_annotation(name, value, source(from_data_annotation))?;
        Ok(applied.map(|_| self))
    }

    /// Whether [`has_annotation`](Self::has_annotation) would apply
    #[must_use]
    pub fn can_set_annotation(&self, name: &str, value: &Value, from_data_annotation: bool) -> bool {
        self.builder
            .can_set_annotation(name, value, source(from_data_annotation))
    }

    /// Remove an annotation, backing off when a stronger source owns it
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn has_no_annotation(&self, name: &str, from_data_annotation: bool) -> Result<Option<&Self>> {
        let applied = self
            .builder
            .has_no_annotation(name, source(from_data_annotation))?;
        Ok(applied.map(|_| self))
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

/// Parameter builder handed to conventions
#[derive(Debug, Clone)]
pub struct ConventionParameterBuilder {
    builder: InternalParameterBuilder,
}

impl ConventionParameterBuilder {
    /// Snapshot of the parameter
    ///
    /// # Errors
    /// `InvalidParameterName` if the parameter is no longer declared.
    pub fn metadata(&self) -> Result<StoredProcedureParameter> {
        self.builder.metadata()
    }

    /// Configure the store type, backing off on conflict
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn has_store_type(
        &self,
        store_type: Option<&str>,
        from_data_annotation: bool,
    ) -> Result<Option<&Self>> {
        let applied = self
            .builder
            .has_store_type(store_type, source(from_data_annotation))?;
        Ok(applied.map(|_| self))
    }

    /// Whether [`has_store_type`](Self::has_store_type) would apply
    #[must_use]
    pub fn can_set_store_type(&self, store_type: Option<&str>, from_data_annotation: bool) -> bool {
        self.builder
            .can_set_store_type(store_type, source(from_data_annotation))
    }

    /// Configure the type mapping, backing off on conflict
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn has_type_mapping(
        &self,
        mapping: Option<TypeMapping>,
        from_data_annotation: bool,
    ) -> Result<Option<&Self>> {
        let applied = self
            .builder
            .has_type_mapping(mapping, source(from_data_annotation))?;
        Ok(applied.map(|_| self))
    }

    /// Whether [`has_type_mapping`](Self::has_type_mapping) would apply
    #[must_use]
    pub fn can_set_type_mapping(
        &self,
        mapping: Option<&TypeMapping>,
        from_data_annotation: bool,
    ) -> bool {
        self.builder
            .can_set_type_mapping(mapping, source(from_data_annotation))
    }

    /// Set a parameter annotation, backing off on conflict
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn has_annotation(
        &self,
        name: &str,
        value: Value,
        from_data_annotation: bool,
    ) -> Result<Option<&Self>> {
        let applied = self
            .builder
            .has_annotation(name, value, source(from_data_annotation))?;
        Ok(applied.map(|_| self))
    }
}
