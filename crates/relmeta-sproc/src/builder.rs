//! Internal builders
//!
//! [`InternalStoredProcedureBuilder`] is the only path through which a stored
//! procedure changes. Every write is negotiated against the source recorded
//! for the attribute:
//!
//! - `can_set_*` answers without mutating
//! - `has_*` returns `Ok(None)` when the negotiation is lost, and an error only
//!   when the procedure was removed or the model finalized
//!
//! The facades in [`crate::mutable`] and [`crate::convention`] wrap these
//! builders with a fixed source.

use crate::parameter::{ProcedureSignature, StoredProcedureParameter, TypeMapping};
use crate::procedure::{ProcedureRef, StoredProcedure};
use crate::view::StoredProcedureView;
use relmeta_core::{ConfigurationSource, MetadataError, Result};
use serde_json::Value;

fn can_set_name(procedure: &StoredProcedure, name: Option<&str>, source: ConfigurationSource) -> bool {
    if !procedure.is_mutable() {
        return false;
    }
    if name.is_some_and(|name| name.trim().is_empty()) && source != ConfigurationSource::Explicit {
        return false;
    }

    source.overrides(procedure.name.source())
        || procedure.name.value().as_deref() == name
        || name.is_some_and(|name| procedure.name() == name)
}

fn can_set_schema(
    procedure: &StoredProcedure,
    schema: Option<&str>,
    source: ConfigurationSource,
) -> bool {
    procedure.is_mutable()
        && (source.overrides(procedure.schema.source()) || procedure.schema().as_deref() == schema)
}

/// Mutation gateway for one stored procedure
///
/// Clones share the same procedure.
#[derive(Debug, Clone)]
pub struct InternalStoredProcedureBuilder {
    procedure: ProcedureRef,
}

impl InternalStoredProcedureBuilder {
    pub(crate) fn new(procedure: ProcedureRef) -> Self {
        Self { procedure }
    }

    pub(crate) fn procedure(&self) -> &ProcedureRef {
        &self.procedure
    }

    /// Read-only view of the procedure being built
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> StoredProcedureView {
        StoredProcedureView::new(self.procedure.clone())
    }

    /// Whether the procedure is still attached to its model
    #[must_use]
    pub fn is_in_model(&self) -> bool {
        !self.procedure.read().is_removed()
    }

    /// Configure the name
    ///
    /// `None` clears the configured name so the default name applies again.
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`. A lost negotiation is `Ok(None)`.
    pub fn has_name(&self, name: Option<&str>, source: ConfigurationSource) -> Result<Option<&Self>> {
        let mut procedure = self.procedure.write();
        procedure.ensure_mutable()?;

        if !can_set_name(&procedure, name, source) {
            tracing::debug!(
                procedure = %procedure.display_name(),
                requested = ?name,
                %source,
                recorded = ?procedure.name.source(),
                "name change rejected"
            );
            return Ok(None);
        }

        procedure.name.set(name.map(str::to_string), source);
        tracing::trace!(procedure = %procedure.display_name(), %source, "name set");
        Ok(Some(self))
    }

    /// Whether [`has_name`](Self::has_name) would apply
    #[must_use]
    pub fn can_set_name(&self, name: Option<&str>, source: ConfigurationSource) -> bool {
        can_set_name(&self.procedure.read(), name, source)
    }

    /// Configure the schema
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`. A lost negotiation is `Ok(None)`.
    pub fn has_schema(
        &self,
        schema: Option<&str>,
        source: ConfigurationSource,
    ) -> Result<Option<&Self>> {
        let mut procedure = self.procedure.write();
        procedure.ensure_mutable()?;

        if !can_set_schema(&procedure, schema, source) {
            tracing::debug!(
                procedure = %procedure.display_name(),
                requested = ?schema,
                %source,
                recorded = ?procedure.schema.source(),
                "schema change rejected"
            );
            return Ok(None);
        }

        procedure.schema.set(schema.map(str::to_string), source);
        tracing::trace!(procedure = %procedure.display_name(), %source, "schema set");
        Ok(Some(self))
    }

    /// Whether [`has_schema`](Self::has_schema) would apply
    #[must_use]
    pub fn can_set_schema(&self, schema: Option<&str>, source: ConfigurationSource) -> bool {
        can_set_schema(&self.procedure.read(), schema, source)
    }

    /// Builder for an existing parameter
    ///
    /// Selecting a parameter records nothing. Only the writes made through the
    /// returned builder are negotiated at their own source.
    ///
    /// # Errors
    /// `InvalidParameterName` when the procedure has no parameter `name`,
    /// plus the lifecycle errors.
    pub fn has_parameter(
        &self,
        name: &str,
        _source: ConfigurationSource,
    ) -> Result<InternalParameterBuilder> {
        let procedure = self.procedure.read();
        procedure.ensure_mutable()?;

        if procedure.find_parameter(name).is_none() {
            return Err(MetadataError::invalid_parameter(procedure.display_name(), name));
        }

        Ok(InternalParameterBuilder {
            procedure: self.procedure.clone(),
            name: name.to_string(),
        })
    }

    /// Bind the parameter list of the mapped procedure
    ///
    /// Parameters are declared at `source`, in signature order.
    ///
    /// # Errors
    /// `SignatureAlreadyBound` on a second binding, `DuplicateParameter` when
    /// the signature repeats a name, plus the lifecycle errors.
    pub fn bind_signature(
        &self,
        signature: &ProcedureSignature,
        source: ConfigurationSource,
    ) -> Result<&Self> {
        let mut procedure = self.procedure.write();
        procedure.ensure_mutable()?;

        if procedure.signature_bound {
            return Err(MetadataError::SignatureAlreadyBound {
                procedure: procedure.display_name(),
            });
        }
        signature.check_unique(&procedure.display_name())?;

        for name in signature.parameters() {
            procedure
                .parameters
                .insert(name.clone(), StoredProcedureParameter::new(name.clone(), source));
        }
        procedure.signature_bound = true;

        tracing::debug!(
            procedure = %procedure.display_name(),
            parameters = signature.parameters().len(),
            "signature bound"
        );
        Ok(self)
    }

    /// Set an annotation
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`. A lost negotiation is `Ok(None)`.
    pub fn has_annotation(
        &self,
        name: &str,
        value: Value,
        source: ConfigurationSource,
    ) -> Result<Option<&Self>> {
        let mut procedure = self.procedure.write();
        procedure.ensure_mutable()?;

        let applied = procedure.annotations.set(name, value, source).is_some();
        Ok(applied.then_some(self))
    }

    /// Whether [`has_annotation`](Self::has_annotation) would apply
    #[must_use]
    pub fn can_set_annotation(&self, name: &str, value: &Value, source: ConfigurationSource) -> bool {
        let procedure = self.procedure.read();
        procedure.is_mutable() && procedure.annotations.can_set(name, value, source)
    }

    /// Remove an annotation
    ///
    /// Succeeds when the annotation is absent.
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`. A lost negotiation is `Ok(None)`.
    pub fn has_no_annotation(&self, name: &str, source: ConfigurationSource) -> Result<Option<&Self>> {
        let mut procedure = self.procedure.write();
        procedure.ensure_mutable()?;

        if !procedure.annotations.can_remove(name, source) {
            tracing::debug!(
                procedure = %procedure.display_name(),
                annotation = name,
                %source,
                "annotation removal rejected"
            );
            return Ok(None);
        }

        procedure.annotations.remove(name, source);
        Ok(Some(self))
    }

    /// Whether [`has_no_annotation`](Self::has_no_annotation) would apply
    #[must_use]
    pub fn can_remove_annotation(&self, name: &str, source: ConfigurationSource) -> bool {
        let procedure = self.procedure.read();
        procedure.is_mutable() && procedure.annotations.can_remove(name, source)
    }

    /// Ratchet the procedure's own configuration source
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`.
    pub fn update_configuration_source(&self, source: ConfigurationSource) -> Result<&Self> {
        let mut procedure = self.procedure.write();
        procedure.ensure_mutable()?;
        procedure.update_configuration_source(source);
        Ok(self)
    }
}

/// Mutation gateway for one parameter of a stored procedure
#[derive(Debug, Clone)]
pub struct InternalParameterBuilder {
    procedure: ProcedureRef,
    name: String,
}

impl InternalParameterBuilder {
    /// Parameter name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the parameter
    ///
    /// # Errors
    /// `InvalidParameterName` if the parameter is no longer declared.
    pub fn metadata(&self) -> Result<StoredProcedureParameter> {
        let procedure = self.procedure.read();
        procedure
            .find_parameter(&self.name)
            .cloned()
            .ok_or_else(|| MetadataError::invalid_parameter(procedure.display_name(), &self.name))
    }

    fn with_parameter<R>(
        &self,
        f: impl FnOnce(&mut StoredProcedureParameter, &str) -> R,
    ) -> Result<R> {
        let mut procedure = self.procedure.write();
        procedure.ensure_mutable()?;

        let display_name = procedure.display_name();
        let parameter = procedure
            .parameters
            .get_mut(&self.name)
            .ok_or_else(|| MetadataError::invalid_parameter(&display_name, &self.name))?;
        Ok(f(parameter, &display_name))
    }

    fn can_with_parameter(&self, f: impl FnOnce(&StoredProcedureParameter) -> bool) -> bool {
        let procedure = self.procedure.read();
        procedure.is_mutable() && procedure.find_parameter(&self.name).is_some_and(f)
    }

    /// Configure the store type
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`. A lost negotiation is `Ok(None)`.
    pub fn has_store_type(
        &self,
        store_type: Option<&str>,
        source: ConfigurationSource,
    ) -> Result<Option<&Self>> {
        let value = store_type.map(str::to_string);
        let applied = self.with_parameter(|parameter, procedure| {
            let applied = parameter.store_type.try_set(value, source);
            if !applied {
                tracing::debug!(
                    procedure,
                    parameter = parameter.name(),
                    %source,
                    "store type change rejected"
                );
            }
            applied
        })?;

        Ok(applied.then_some(self))
    }

    /// Whether [`has_store_type`](Self::has_store_type) would apply
    #[must_use]
    pub fn can_set_store_type(&self, store_type: Option<&str>, source: ConfigurationSource) -> bool {
        let value = store_type.map(str::to_string);
        self.can_with_parameter(|parameter| parameter.store_type.can_set(&value, source))
    }

    /// Configure the type mapping
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`. A lost negotiation is `Ok(None)`.
    pub fn has_type_mapping(
        &self,
        mapping: Option<TypeMapping>,
        source: ConfigurationSource,
    ) -> Result<Option<&Self>> {
        let applied = self.with_parameter(|parameter, procedure| {
            let applied = parameter.type_mapping.try_set(mapping, source);
            if !applied {
                tracing::debug!(
                    procedure,
                    parameter = parameter.name(),
                    %source,
                    "type mapping change rejected"
                );
            }
            applied
        })?;

        Ok(applied.then_some(self))
    }

    /// Whether [`has_type_mapping`](Self::has_type_mapping) would apply
    #[must_use]
    pub fn can_set_type_mapping(
        &self,
        mapping: Option<&TypeMapping>,
        source: ConfigurationSource,
    ) -> bool {
        let mapping = mapping.cloned();
        self.can_with_parameter(|parameter| parameter.type_mapping.can_set(&mapping, source))
    }

    /// Set a parameter annotation
    ///
    /// # Errors
    /// `RemovedFromModel` or `ReadOnlyModel`. A lost negotiation is `Ok(None)`.
    pub fn has_annotation(
        &self,
        name: &str,
        value: Value,
        source: ConfigurationSource,
    ) -> Result<Option<&Self>> {
        let applied = self
            .with_parameter(|parameter, _| parameter.annotations.set(name, value, source).is_some())?;
        Ok(applied.then_some(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::StoreOperation;
    use proptest::prelude::*;
    use relmeta_model::{Model, ModelConfig};

    fn any_source() -> impl Strategy<Value = ConfigurationSource> {
        prop_oneof![
            Just(ConfigurationSource::Convention),
            Just(ConfigurationSource::DataAnnotation),
            Just(ConfigurationSource::Explicit),
        ]
    }

    fn builder() -> (Model, InternalStoredProcedureBuilder) {
        let mut model = Model::new(ModelConfig::new());
        let blog = model.add_entity_type("Blog", None).unwrap();
        let procedure = ProcedureRef::new(StoredProcedure::new(
            blog,
            StoreOperation::Insert,
            ConfigurationSource::Convention,
        ));
        (model, InternalStoredProcedureBuilder::new(procedure))
    }

    #[test]
    fn stronger_source_wins_and_then_resists() {
        let (_model, builder) = builder();

        assert!(builder
            .has_name(Some("Proc1"), ConfigurationSource::Convention)
            .unwrap()
            .is_some());
        assert!(builder
            .has_name(Some("Proc2"), ConfigurationSource::Explicit)
            .unwrap()
            .is_some());
        assert!(builder
            .has_name(Some("Proc3"), ConfigurationSource::DataAnnotation)
            .unwrap()
            .is_none());

        assert_eq!(builder.metadata().name(), "Proc2");
        assert_eq!(
            builder.metadata().name_configuration_source(),
            Some(ConfigurationSource::Explicit)
        );
    }

    #[test]
    fn reaffirming_effective_name_is_accepted() {
        let (_model, builder) = builder();
        builder
            .has_name(Some("Upsert"), ConfigurationSource::Explicit)
            .unwrap();

        assert!(builder.can_set_name(Some("Upsert"), ConfigurationSource::Convention));
        assert!(!builder.can_set_name(Some("Other"), ConfigurationSource::Convention));
    }

    #[test]
    fn default_name_counts_as_current_value() {
        let (_model, builder) = builder();
        builder
            .has_schema(Some("dbo"), ConfigurationSource::Explicit)
            .unwrap();
        builder
            .has_name(None, ConfigurationSource::Explicit)
            .unwrap();

        assert!(builder.can_set_name(Some("Blog_Insert"), ConfigurationSource::Convention));
    }

    #[test]
    fn empty_name_needs_explicit_source() {
        let (_model, builder) = builder();

        assert!(!builder.can_set_name(Some(""), ConfigurationSource::Convention));
        assert!(!builder.can_set_name(Some(""), ConfigurationSource::DataAnnotation));
        assert!(builder.can_set_name(Some(""), ConfigurationSource::Explicit));

        assert!(!builder.can_set_name(Some("   "), ConfigurationSource::Convention));
        assert!(!builder.can_set_name(Some("\t\n"), ConfigurationSource::DataAnnotation));
        assert!(builder
            .has_name(Some(" "), ConfigurationSource::DataAnnotation)
            .unwrap()
            .is_none());
        assert!(builder.can_set_name(Some(" "), ConfigurationSource::Explicit));
        assert_eq!(builder.metadata().name(), "Blog_Insert");
    }

    #[test]
    fn unknown_parameter_is_error() {
        let (_model, builder) = builder();
        builder
            .bind_signature(&ProcedureSignature::new(["id"]), ConfigurationSource::Convention)
            .unwrap();

        let err = builder
            .has_parameter("nonexistent", ConfigurationSource::Explicit)
            .unwrap_err();
        assert!(matches!(
            err,
            MetadataError::InvalidParameterName { ref parameter, .. } if parameter == "nonexistent"
        ));
    }

    #[test]
    fn signature_binds_once() {
        let (_model, builder) = builder();
        let signature = ProcedureSignature::new(["id", "title"]);
        builder
            .bind_signature(&signature, ConfigurationSource::Convention)
            .unwrap();

        assert!(matches!(
            builder.bind_signature(&signature, ConfigurationSource::Explicit),
            Err(MetadataError::SignatureAlreadyBound { .. })
        ));
    }

    #[test]
    fn parameter_store_type_negotiation() {
        let (_model, builder) = builder();
        builder
            .bind_signature(&ProcedureSignature::new(["id"]), ConfigurationSource::Convention)
            .unwrap();
        let id = builder
            .has_parameter("id", ConfigurationSource::DataAnnotation)
            .unwrap();

        assert!(id
            .has_store_type(Some("int"), ConfigurationSource::DataAnnotation)
            .unwrap()
            .is_some());
        assert!(id
            .has_store_type(Some("bigint"), ConfigurationSource::Convention)
            .unwrap()
            .is_none());
        assert!(id.can_set_store_type(Some("int"), ConfigurationSource::Convention));

        let parameter = id.metadata().unwrap();
        assert_eq!(parameter.store_type(), Some("int"));
        assert_eq!(parameter.configuration_source(), ConfigurationSource::Convention);
    }

    #[test]
    fn selecting_parameter_records_nothing() {
        let (_model, builder) = builder();
        builder
            .bind_signature(&ProcedureSignature::new(["id"]), ConfigurationSource::Convention)
            .unwrap();

        builder
            .has_parameter("id", ConfigurationSource::Explicit)
            .unwrap();
        builder
            .has_parameter("id", ConfigurationSource::DataAnnotation)
            .unwrap();

        let parameter = builder.metadata().find_parameter("id").unwrap();
        assert_eq!(parameter.configuration_source(), ConfigurationSource::Convention);
        assert_eq!(parameter.store_type_configuration_source(), None);
    }

    #[test]
    fn annotation_removal_respects_source() {
        let (_model, builder) = builder();
        builder
            .has_annotation("Relational:Comment", Value::from("x"), ConfigurationSource::Explicit)
            .unwrap();

        assert!(!builder.can_remove_annotation("Relational:Comment", ConfigurationSource::Convention));
        assert!(builder
            .has_no_annotation("Relational:Comment", ConfigurationSource::Convention)
            .unwrap()
            .is_none());
        assert!(builder
            .has_no_annotation("Relational:Comment", ConfigurationSource::Explicit)
            .unwrap()
            .is_some());
        assert!(builder.metadata().annotations().is_empty());
    }

    #[test]
    fn removed_procedure_rejects_everything() {
        let (_model, builder) = builder();
        builder.procedure().write().set_removed();

        assert!(!builder.is_in_model());
        assert!(!builder.can_set_name(Some("x"), ConfigurationSource::Explicit));
        assert!(matches!(
            builder.has_name(Some("x"), ConfigurationSource::Explicit),
            Err(MetadataError::RemovedFromModel { .. })
        ));
        assert!(matches!(
            builder.update_configuration_source(ConfigurationSource::Explicit),
            Err(MetadataError::RemovedFromModel { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_reaffirming_name_is_idempotent(
            first in any_source(),
            second in any_source(),
            name in "[A-Za-z][A-Za-z0-9_]{0,16}",
        ) {
            let (_model, builder) = builder();

            prop_assert!(builder.has_name(Some(name.as_str()), first).unwrap().is_some());
            prop_assert!(builder.can_set_name(Some(name.as_str()), second));
            prop_assert!(builder.has_name(Some(name.as_str()), second).unwrap().is_some());
            prop_assert_eq!(builder.metadata().name(), name);
        }

        #[test]
        fn prop_name_source_is_monotonic(
            writes in proptest::collection::vec((any_source(), "[a-c]"), 1..24),
        ) {
            let (_model, builder) = builder();

            let mut previous = None;
            for (source, name) in writes {
                let before = builder.metadata().name();
                let accepted = builder.has_name(Some(name.as_str()), source).unwrap().is_some();

                let recorded = builder.metadata().name_configuration_source();
                prop_assert!(recorded >= previous);
                previous = recorded;

                if accepted {
                    prop_assert_eq!(builder.metadata().name(), name);
                } else {
                    prop_assert_eq!(builder.metadata().name(), before);
                }
            }
        }

        #[test]
        fn prop_weaker_source_cannot_displace(
            strong in any_source(),
            weak in any_source(),
        ) {
            prop_assume!(weak < strong);
            let (_model, builder) = builder();

            builder.has_schema(Some("strong"), strong).unwrap();
            prop_assert!(!builder.can_set_schema(Some("weak"), weak));
            prop_assert!(builder.has_schema(Some("weak"), weak).unwrap().is_none());
            prop_assert_eq!(builder.metadata().schema(), Some("strong".to_string()));
        }

        #[test]
        fn prop_blank_name_needs_explicit_source(
            blank in "[ \t\n]{0,6}",
            source in any_source(),
        ) {
            let (_model, builder) = builder();
            let accepted = builder.has_name(Some(blank.as_str()), source).unwrap().is_some();

            prop_assert_eq!(accepted, source == ConfigurationSource::Explicit);
        }
    }
}
