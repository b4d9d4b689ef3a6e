//! Stored procedure record
//!
//! [`StoredProcedure`] is the one concrete record behind every builder and
//! view. It is shared through [`ProcedureRef`]; no other component holds a
//! competing copy of its state.

use crate::operation::StoreOperation;
use crate::parameter::StoredProcedureParameter;
use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use relmeta_core::{
    AnnotationStore, ConfigurationSource, DebugStringOptions, MetadataError, Result, Tracked,
};
use relmeta_model::EntityTypeRef;
use std::sync::Arc;

/// Configured mapping of one operation of one entity type to a stored procedure
#[derive(Debug)]
pub(crate) struct StoredProcedure {
    owner: EntityTypeRef,
    operation: StoreOperation,
    pub(crate) name: Tracked<Option<String>>,
    pub(crate) schema: Tracked<Option<String>>,
    pub(crate) parameters: IndexMap<String, StoredProcedureParameter>,
    pub(crate) signature_bound: bool,
    configuration_source: ConfigurationSource,
    pub(crate) annotations: AnnotationStore,
    removed: bool,
}

impl StoredProcedure {
    pub(crate) fn new(
        owner: EntityTypeRef,
        operation: StoreOperation,
        configuration_source: ConfigurationSource,
    ) -> Self {
        Self {
            owner,
            operation,
            name: Tracked::default(),
            schema: Tracked::default(),
            parameters: IndexMap::new(),
            signature_bound: false,
            configuration_source,
            annotations: AnnotationStore::new(),
            removed: false,
        }
    }

    pub(crate) fn owner(&self) -> &EntityTypeRef {
        &self.owner
    }

    pub(crate) fn operation(&self) -> StoreOperation {
        self.operation
    }

    /// `{Owner}{separator}{Operation}`
    pub(crate) fn default_name(&self) -> String {
        let separator = &self.owner.model().config().name_separator;
        format!("{}{}{}", self.owner.name(), separator, self.operation)
    }

    /// Configured name, or the default name
    pub(crate) fn name(&self) -> String {
        self.name
            .value()
            .clone()
            .unwrap_or_else(|| self.default_name())
    }

    /// Configured schema, or the model default schema
    pub(crate) fn schema(&self) -> Option<String> {
        self.schema
            .value()
            .clone()
            .or_else(|| self.owner.default_schema())
    }

    /// `schema.name` or `name`
    pub(crate) fn display_name(&self) -> String {
        match self.schema() {
            Some(schema) => format!("{schema}.{}", self.name()),
            None => self.name(),
        }
    }

    pub(crate) fn configuration_source(&self) -> ConfigurationSource {
        self.configuration_source
    }

    pub(crate) fn update_configuration_source(&mut self, source: ConfigurationSource) {
        self.configuration_source = source.max(Some(self.configuration_source));
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removed
    }

    pub(crate) fn set_removed(&mut self) {
        self.removed = true;
    }

    /// Removed objects and finalized models reject all writes
    pub(crate) fn ensure_mutable(&self) -> Result<()> {
        if self.removed {
            return Err(MetadataError::removed(self.display_name()));
        }
        self.owner.model().ensure_mutable(self.display_name())
    }

    pub(crate) fn is_mutable(&self) -> bool {
        !self.removed && !self.owner.is_read_only()
    }

    pub(crate) fn find_parameter(&self, name: &str) -> Option<&StoredProcedureParameter> {
        self.parameters.get(name)
    }

    pub(crate) fn to_debug_string(&self, options: DebugStringOptions, indent: usize) -> String {
        let indent_string = " ".repeat(indent);
        let mut out = String::new();
        out.push_str(&indent_string);
        out.push_str("StoredProcedure: ");
        out.push_str(&self.display_name());

        if options.single_line {
            return out;
        }

        if !self.parameters.is_empty() {
            out.push('\n');
            out.push_str(&indent_string);
            out.push_str("  Parameters:");
            for parameter in self.parameters.values() {
                out.push('\n');
                out.push_str(&parameter.to_debug_string(options, indent + 4));
            }
        }

        if options.include_annotations {
            out.push_str(&self.annotations.to_debug_string(indent + 2));
        }

        out
    }
}

/// Shared handle to a [`StoredProcedure`]
#[derive(Debug, Clone)]
pub(crate) struct ProcedureRef(Arc<RwLock<StoredProcedure>>);

impl ProcedureRef {
    pub(crate) fn new(procedure: StoredProcedure) -> Self {
        Self(Arc::new(RwLock::new(procedure)))
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, StoredProcedure> {
        self.0.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, StoredProcedure> {
        self.0.write()
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmeta_model::{Model, ModelConfig};

    fn procedure(config: ModelConfig) -> (Model, StoredProcedure) {
        let mut model = Model::new(config);
        let blog = model.add_entity_type("Blog", None).unwrap();
        let procedure = StoredProcedure::new(blog, StoreOperation::Insert, ConfigurationSource::Convention);
        (model, procedure)
    }

    #[test]
    fn default_name_and_schema() {
        let (_model, procedure) = procedure(ModelConfig::new().with_default_schema("dbo"));

        assert_eq!(procedure.name(), "Blog_Insert");
        assert_eq!(procedure.schema().as_deref(), Some("dbo"));
        assert_eq!(procedure.display_name(), "dbo.Blog_Insert");
    }

    #[test]
    fn configured_values_win_over_defaults() {
        let (_model, mut procedure) = procedure(ModelConfig::new().with_name_separator("__"));
        assert_eq!(procedure.name(), "Blog__Insert");

        procedure.name.set(Some("Upsert".into()), ConfigurationSource::Explicit);
        procedure.schema.set(Some("sales".into()), ConfigurationSource::Explicit);
        assert_eq!(procedure.display_name(), "sales.Upsert");
    }

    #[test]
    fn configuration_source_ratchets() {
        let (_model, mut procedure) = procedure(ModelConfig::new());

        procedure.update_configuration_source(ConfigurationSource::Explicit);
        procedure.update_configuration_source(ConfigurationSource::Convention);
        assert_eq!(procedure.configuration_source(), ConfigurationSource::Explicit);
    }

    #[test]
    fn removed_rejects_writes() {
        let (_model, mut procedure) = procedure(ModelConfig::new());
        assert!(procedure.ensure_mutable().is_ok());

        procedure.set_removed();
        assert!(!procedure.is_mutable());
        assert!(matches!(
            procedure.ensure_mutable(),
            Err(MetadataError::RemovedFromModel { .. })
        ));
    }

    #[test]
    fn finalized_model_rejects_writes() {
        let (mut model, procedure) = procedure(ModelConfig::new());
        model.finalize();

        assert!(matches!(
            procedure.ensure_mutable(),
            Err(MetadataError::ReadOnlyModel { .. })
        ));
    }

    #[test]
    fn single_line_debug_string() {
        let (_model, procedure) = procedure(ModelConfig::new());
        assert_eq!(
            procedure.to_debug_string(DebugStringOptions::SINGLE_LINE_DEFAULT, 2),
            "  StoredProcedure: Blog_Insert"
        );
    }
}
