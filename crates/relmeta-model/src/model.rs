//! Model and type hierarchy
//!
//! Provides [`Model`], the single-writer container of entity types, and the
//! [`TypeHierarchy`] trait metadata lookups use to walk base types.
//!
//! # Build Phase
//!
//! A model accepts writes until [`Model::finalize`] is called. After that
//! every write anywhere in the model fails with `ReadOnlyModel`.

use crate::config::ModelConfig;
use crate::entity_type::{EntityTypeId, EntityTypeRef, ModelHandle};
use indexmap::IndexMap;
use relmeta_core::{AnnotationStore, ConfigurationSource, MetadataError, Result};
use serde_json::Value;

/// Single-inheritance type hierarchy
///
/// Base types are always registered before their derived types, so the
/// hierarchy is acyclic and every chain ends at a root.
pub trait TypeHierarchy {
    /// Direct base type, `None` for roots
    fn base_type(&self, entity_type: &EntityTypeRef) -> Option<EntityTypeRef>;

    /// Topmost ancestor (the type itself when it is a root)
    fn root_type(&self, entity_type: &EntityTypeRef) -> EntityTypeRef {
        let mut current = entity_type.clone();
        while let Some(base) = self.base_type(&current) {
            current = base;
        }
        current
    }
}

#[derive(Debug)]
struct EntityTypeEntry {
    entity_type: EntityTypeRef,
    base: Option<EntityTypeId>,
    annotations: AnnotationStore,
}

/// Container of entity types for one model-building session
#[derive(Debug)]
pub struct Model {
    handle: ModelHandle,
    entity_types: IndexMap<String, EntityTypeEntry>,
}

impl Model {
    /// Create empty model
    #[inline]
    #[must_use]
    pub fn new(config: ModelConfig) -> Self {
        Self {
            handle: ModelHandle::new(config),
            entity_types: IndexMap::new(),
        }
    }

    /// Shared model state
    #[inline]
    #[must_use]
    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    /// Model configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        self.handle.config()
    }

    /// Register an entity type
    ///
    /// `base` must already belong to this model.
    ///
    /// # Errors
    /// - `ReadOnlyModel` after finalization
    /// - `InvalidIdentifier` for an empty or over-long name
    /// - `DuplicateEntityType` if the name is taken
    /// - `UnknownEntityType` if `base` is not from this model
    pub fn add_entity_type(
        &mut self,
        name: &str,
        base: Option<&EntityTypeRef>,
    ) -> Result<EntityTypeRef> {
        self.handle.ensure_mutable(name)?;

        if name.trim().is_empty() {
            return Err(MetadataError::invalid_identifier(name, "entity type name is empty"));
        }
        self.config().validate_identifier(name)?;

        if self.entity_types.contains_key(name) {
            return Err(MetadataError::DuplicateEntityType(name.to_string()));
        }

        let base_id = match base {
            Some(base) if self.contains(base) => Some(base.id()),
            Some(base) => return Err(MetadataError::UnknownEntityType(base.name().to_string())),
            None => None,
        };

        let id = u32::try_from(self.entity_types.len())
            .map_err(|_| MetadataError::InvalidConfiguration("too many entity types".into()))?;
        let entity_type = EntityTypeRef::new(EntityTypeId(id), name, self.handle.clone());

        tracing::debug!(
            entity_type = name,
            base = base.map(EntityTypeRef::name),
            "entity type added"
        );

        self.entity_types.insert(
            name.to_string(),
            EntityTypeEntry {
                entity_type: entity_type.clone(),
                base: base_id,
                annotations: AnnotationStore::new(),
            },
        );

        Ok(entity_type)
    }

    /// Whether `entity_type` belongs to this model
    #[must_use]
    pub fn contains(&self, entity_type: &EntityTypeRef) -> bool {
        self.entry(entity_type).is_some()
    }

    /// Find entity type by name
    #[must_use]
    pub fn find_entity_type(&self, name: &str) -> Option<EntityTypeRef> {
        self.entity_types
            .get(name)
            .map(|entry| entry.entity_type.clone())
    }

    /// Find entity type by id
    #[must_use]
    pub fn entity_type_by_id(&self, id: EntityTypeId) -> Option<EntityTypeRef> {
        self.entity_types
            .get_index(id.index())
            .map(|(_, entry)| entry.entity_type.clone())
    }

    /// All entity types in registration order
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityTypeRef> {
        self.entity_types.values().map(|entry| &entry.entity_type)
    }

    /// Types whose direct base is `entity_type`
    #[must_use]
    pub fn direct_derived_types(&self, entity_type: &EntityTypeRef) -> Vec<EntityTypeRef> {
        self.entity_types
            .values()
            .filter(|entry| entry.base == Some(entity_type.id()))
            .map(|entry| entry.entity_type.clone())
            .collect()
    }

    /// Number of entity types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entity_types.len()
    }

    /// Whether the model has no entity types
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_types.is_empty()
    }

    /// Annotations on an entity type
    #[must_use]
    pub fn annotations(&self, entity_type: &EntityTypeRef) -> Option<&AnnotationStore> {
        self.entry(entity_type).map(|entry| &entry.annotations)
    }

    /// Set an annotation on an entity type
    ///
    /// Returns `Ok(false)` when a stronger source already holds a different value.
    ///
    /// # Errors
    /// `ReadOnlyModel` after finalization, `UnknownEntityType` for a foreign type.
    pub fn set_annotation(
        &mut self,
        entity_type: &EntityTypeRef,
        name: &str,
        value: Value,
        source: ConfigurationSource,
    ) -> Result<bool> {
        self.handle.ensure_mutable(entity_type)?;
        let entry = self.entry_mut(entity_type)?;
        Ok(entry.annotations.set(name, value, source).is_some())
    }

    /// Remove an annotation from an entity type
    ///
    /// Returns `Ok(false)` when absent or owned by a stronger source.
    ///
    /// # Errors
    /// `ReadOnlyModel` after finalization, `UnknownEntityType` for a foreign type.
    pub fn remove_annotation(
        &mut self,
        entity_type: &EntityTypeRef,
        name: &str,
        source: ConfigurationSource,
    ) -> Result<bool> {
        self.handle.ensure_mutable(entity_type)?;
        let entry = self.entry_mut(entity_type)?;
        Ok(entry.annotations.remove(name, source).is_some())
    }

    /// Current default schema
    #[inline]
    #[must_use]
    pub fn default_schema(&self) -> Option<String> {
        self.handle.default_schema()
    }

    /// Change the default schema under precedence rules
    ///
    /// Returns `Ok(false)` when a stronger source already set a different schema.
    ///
    /// # Errors
    /// `ReadOnlyModel` after finalization.
    pub fn set_default_schema(
        &mut self,
        schema: Option<String>,
        source: ConfigurationSource,
    ) -> Result<bool> {
        self.handle.ensure_mutable("model default schema")?;
        let accepted = self.handle.try_set_default_schema(schema, source);
        if !accepted {
            tracing::debug!(%source, "default schema change rejected");
        }
        Ok(accepted)
    }

    /// End the build phase
    ///
    /// Idempotent. After this call every write fails with `ReadOnlyModel`.
    pub fn finalize(&mut self) {
        if self.handle.mark_read_only() {
            tracing::info!(entity_types = self.entity_types.len(), "model finalized");
        }
    }

    /// Whether [`finalize`](Self::finalize) has been called
    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.handle.is_read_only()
    }

    fn entry(&self, entity_type: &EntityTypeRef) -> Option<&EntityTypeEntry> {
        if !entity_type.model().same_model(&self.handle) {
            return None;
        }
        self.entity_types
            .get_index(entity_type.id().index())
            .map(|(_, entry)| entry)
    }

    fn entry_mut(&mut self, entity_type: &EntityTypeRef) -> Result<&mut EntityTypeEntry> {
        if !entity_type.model().same_model(&self.handle) {
            return Err(MetadataError::UnknownEntityType(entity_type.name().to_string()));
        }
        self.entity_types
            .get_index_mut(entity_type.id().index())
            .map(|(_, entry)| entry)
            .ok_or_else(|| MetadataError::UnknownEntityType(entity_type.name().to_string()))
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

impl TypeHierarchy for Model {
    fn base_type(&self, entity_type: &EntityTypeRef) -> Option<EntityTypeRef> {
        let base = self.entry(entity_type)?.base?;
        self.entity_type_by_id(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn hierarchy() -> (Model, EntityTypeRef, EntityTypeRef, EntityTypeRef) {
        let mut model = Model::default();
        let animal = model.add_entity_type("Animal", None).unwrap();
        let cat = model.add_entity_type("Cat", Some(&animal)).unwrap();
        let lion = model.add_entity_type("Lion", Some(&cat)).unwrap();
        (model, animal, cat, lion)
    }

    #[test]
    fn add_and_find() {
        let (model, animal, cat, _) = hierarchy();

        assert_eq!(model.len(), 3);
        assert_eq!(model.find_entity_type("Cat"), Some(cat.clone()));
        assert_eq!(model.entity_type_by_id(animal.id()), Some(animal));
        assert!(model.find_entity_type("Dog").is_none());
    }

    #[test]
    fn duplicate_and_empty_names_are_rejected() {
        let (mut model, _, _, _) = hierarchy();

        assert!(matches!(
            model.add_entity_type("Cat", None),
            Err(MetadataError::DuplicateEntityType(_))
        ));
        assert!(matches!(
            model.add_entity_type("  ", None),
            Err(MetadataError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn foreign_base_is_rejected() {
        let (_, animal, _, _) = hierarchy();
        let mut other = Model::default();

        assert!(matches!(
            other.add_entity_type("Dog", Some(&animal)),
            Err(MetadataError::UnknownEntityType(_))
        ));
    }

    #[test]
    fn base_and_root() {
        let (model, animal, cat, lion) = hierarchy();

        assert_eq!(model.base_type(&lion), Some(cat.clone()));
        assert_eq!(model.base_type(&animal), None);
        assert_eq!(model.root_type(&lion), animal.clone());
        assert_eq!(model.root_type(&animal), animal);
        assert_eq!(model.direct_derived_types(&cat), vec![lion]);
    }

    #[test]
    fn annotations_negotiate() {
        let (mut model, animal, _, _) = hierarchy();

        assert!(model
            .set_annotation(&animal, "Relational:TableName", json!("Animals"), ConfigurationSource::Explicit)
            .unwrap());
        assert!(!model
            .set_annotation(&animal, "Relational:TableName", json!("Animal"), ConfigurationSource::Convention)
            .unwrap());
        assert_eq!(
            model.annotations(&animal).unwrap().value("Relational:TableName"),
            Some(&json!("Animals"))
        );
        assert!(!model
            .remove_annotation(&animal, "Relational:TableName", ConfigurationSource::Convention)
            .unwrap());
    }

    #[test]
    fn default_schema_precedence() {
        let mut model = Model::default();

        assert!(model.set_default_schema(Some("conv".into()), ConfigurationSource::Convention).unwrap());
        assert!(model.set_default_schema(Some("dbo".into()), ConfigurationSource::Explicit).unwrap());
        assert!(!model.set_default_schema(Some("conv".into()), ConfigurationSource::Convention).unwrap());
        assert_eq!(model.default_schema().as_deref(), Some("dbo"));
    }

    #[test]
    fn finalize_blocks_writes() {
        let (mut model, animal, _, _) = hierarchy();
        model.finalize();
        model.finalize();

        assert!(model.is_read_only());
        assert!(matches!(
            model.add_entity_type("Dog", None),
            Err(MetadataError::ReadOnlyModel { .. })
        ));
        assert!(matches!(
            model.set_annotation(&animal, "a", json!(1), ConfigurationSource::Explicit),
            Err(MetadataError::ReadOnlyModel { .. })
        ));
        assert!(animal.is_read_only());
    }

    proptest! {
        #[test]
        fn prop_chain_root_is_first_type(depth in 1..12usize) {
            let mut model = Model::default();
            let first = model.add_entity_type("T0", None).unwrap();
            let mut last = first.clone();
            for i in 1..depth {
                last = model.add_entity_type(&format!("T{i}"), Some(&last)).unwrap();
            }

            prop_assert_eq!(model.root_type(&last), first.clone());
            prop_assert_eq!(model.base_type(&first), None);
        }
    }
}
