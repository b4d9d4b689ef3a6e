//! Stored procedure registry
//!
//! Provides [`StoredProcedureRegistry`], the sole creator and remover of
//! stored procedures. Each (owner, operation) slot holds at most one
//! procedure.
//!
//! # Lookup
//!
//! [`find`](StoredProcedureRegistry::find) checks the owner's own slot first.
//! When that is empty and the owner has a base type, it checks the slot of the
//! hierarchy *root* only; intermediate ancestors are not consulted.

use crate::builder::InternalStoredProcedureBuilder;
use crate::convention::ConventionStoredProcedureBuilder;
use crate::mutable::MutableStoredProcedure;
use crate::operation::{EntityState, StoreOperation};
use crate::procedure::{ProcedureRef, StoredProcedure};
use crate::view::StoredProcedureView;
use relmeta_core::{ConfigurationSource, MetadataError, Result};
use relmeta_model::{EntityTypeId, EntityTypeRef, ModelHandle, TypeHierarchy};
use std::collections::BTreeMap;

type Slot = (EntityTypeId, StoreOperation);

/// Stored procedures of one model, keyed by owner and operation
#[derive(Debug)]
pub struct StoredProcedureRegistry {
    model: ModelHandle,
    slots: BTreeMap<Slot, ProcedureRef>,
}

impl StoredProcedureRegistry {
    /// Create an empty registry for `model`
    #[inline]
    #[must_use]
    pub fn new(model: ModelHandle) -> Self {
        Self {
            model,
            slots: BTreeMap::new(),
        }
    }

    /// Model the registry belongs to
    #[inline]
    #[must_use]
    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    fn check_owner(&self, owner: &EntityTypeRef) -> Result<()> {
        if owner.model().same_model(&self.model) {
            Ok(())
        } else {
            Err(MetadataError::UnknownEntityType(owner.name().to_string()))
        }
    }

    fn check_writable(&self, owner: &EntityTypeRef, operation: StoreOperation) -> Result<()> {
        self.check_owner(owner)?;
        self.model
            .ensure_mutable(format_args!("{owner} {operation} stored procedure"))
    }

    fn lookup(
        &self,
        hierarchy: &impl TypeHierarchy,
        owner: &EntityTypeRef,
        operation: StoreOperation,
    ) -> Option<&ProcedureRef> {
        if !owner.model().same_model(&self.model) {
            return None;
        }
        if let Some(found) = self.slots.get(&(owner.id(), operation)) {
            return Some(found);
        }

        if hierarchy.base_type(owner).is_none() {
            return None;
        }
        let root = hierarchy.root_type(owner);
        self.slots.get(&(root.id(), operation))
    }

    /// Procedure for `operation` on `owner`, falling back to the root type
    #[must_use]
    pub fn find(
        &self,
        hierarchy: &impl TypeHierarchy,
        owner: &EntityTypeRef,
        operation: StoreOperation,
    ) -> Option<StoredProcedureView> {
        self.lookup(hierarchy, owner, operation)
            .map(|procedure| StoredProcedureView::new(procedure.clone()))
    }

    /// Procedure the change-tracking `state` of an `owner` entity maps to
    ///
    /// # Errors
    /// `UnsupportedOperation` for states that issue no write.
    pub fn find_for_state(
        &self,
        hierarchy: &impl TypeHierarchy,
        owner: &EntityTypeRef,
        state: EntityState,
    ) -> Result<Option<StoredProcedureView>> {
        let operation = StoreOperation::try_from(state)?;
        Ok(self.find(hierarchy, owner, operation))
    }

    /// Procedure declared directly on `owner`, without fallback
    #[must_use]
    pub fn find_declared(
        &self,
        owner: &EntityTypeRef,
        operation: StoreOperation,
    ) -> Option<StoredProcedureView> {
        if !owner.model().same_model(&self.model) {
            return None;
        }
        self.slots
            .get(&(owner.id(), operation))
            .map(|procedure| StoredProcedureView::new(procedure.clone()))
    }

    /// Source of the procedure declared directly on `owner`
    #[must_use]
    pub fn configuration_source(
        &self,
        owner: &EntityTypeRef,
        operation: StoreOperation,
    ) -> Option<ConfigurationSource> {
        self.find_declared(owner, operation)
            .map(|procedure| procedure.configuration_source())
    }

    fn get_or_create(
        &mut self,
        owner: &EntityTypeRef,
        operation: StoreOperation,
        source: ConfigurationSource,
    ) -> Result<InternalStoredProcedureBuilder> {
        self.check_writable(owner, operation)?;

        if let Some(existing) = self.slots.get(&(owner.id(), operation)) {
            let builder = InternalStoredProcedureBuilder::new(existing.clone());
            builder.update_configuration_source(source)?;
            return Ok(builder);
        }

        let procedure = ProcedureRef::new(StoredProcedure::new(owner.clone(), operation, source));
        self.slots.insert((owner.id(), operation), procedure.clone());

        tracing::debug!(
            owner = owner.name(),
            slot = operation.annotation_name(),
            %source,
            "stored procedure created"
        );
        Ok(InternalStoredProcedureBuilder::new(procedure))
    }

    /// Map `operation` on `owner` to a stored procedure explicitly
    ///
    /// Creates the procedure, or re-stamps an existing one as explicit while
    /// keeping its configured values.
    ///
    /// # Errors
    /// `ReadOnlyModel` after finalization, `UnknownEntityType` for an owner
    /// from another model.
    pub fn set(
        &mut self,
        owner: &EntityTypeRef,
        operation: StoreOperation,
    ) -> Result<MutableStoredProcedure> {
        let builder = self.get_or_create(owner, operation, ConfigurationSource::Explicit)?;
        Ok(MutableStoredProcedure::new(builder))
    }

    /// Map `operation` on `owner` to a stored procedure from a convention
    ///
    /// Resolves like [`find`](Self::find): a procedure declared on `owner`, or
    /// else the one inherited from the root type, is reused and its source
    /// ratcheted. A new procedure is created on `owner` only when lookup finds
    /// nothing.
    ///
    /// # Errors
    /// `ReadOnlyModel` after finalization, `UnknownEntityType` for an owner
    /// from another model.
    pub fn set_convention(
        &mut self,
        hierarchy: &impl TypeHierarchy,
        owner: &EntityTypeRef,
        operation: StoreOperation,
        from_data_annotation: bool,
    ) -> Result<ConventionStoredProcedureBuilder> {
        self.check_writable(owner, operation)?;
        let source = ConfigurationSource::from_data_annotation(from_data_annotation);

        if let Some(existing) = self.lookup(hierarchy, owner, operation) {
            let builder = InternalStoredProcedureBuilder::new(existing.clone());
            builder.update_configuration_source(source)?;
            return Ok(ConventionStoredProcedureBuilder::new(builder));
        }

        let builder = self.get_or_create(owner, operation, source)?;
        Ok(ConventionStoredProcedureBuilder::new(builder))
    }

    /// Explicitly map the insert operation and configure it in `configure`
    ///
    /// # Errors
    /// Errors from [`set`](Self::set) or from `configure`.
    pub fn insert_using_stored_procedure<F>(
        &mut self,
        owner: &EntityTypeRef,
        configure: F,
    ) -> Result<MutableStoredProcedure>
    where
        F: FnOnce(&MutableStoredProcedure) -> Result<()>,
    {
        self.using_stored_procedure(owner, StoreOperation::Insert, configure)
    }

    /// Explicitly map the update operation and configure it in `configure`
    ///
    /// # Errors
    /// Errors from [`set`](Self::set) or from `configure`.
    pub fn update_using_stored_procedure<F>(
        &mut self,
        owner: &EntityTypeRef,
        configure: F,
    ) -> Result<MutableStoredProcedure>
    where
        F: FnOnce(&MutableStoredProcedure) -> Result<()>,
    {
        self.using_stored_procedure(owner, StoreOperation::Update, configure)
    }

    /// Explicitly map the delete operation and configure it in `configure`
    ///
    /// # Errors
    /// Errors from [`set`](Self::set) or from `configure`.
    pub fn delete_using_stored_procedure<F>(
        &mut self,
        owner: &EntityTypeRef,
        configure: F,
    ) -> Result<MutableStoredProcedure>
    where
        F: FnOnce(&MutableStoredProcedure) -> Result<()>,
    {
        self.using_stored_procedure(owner, StoreOperation::Delete, configure)
    }

    fn using_stored_procedure<F>(
        &mut self,
        owner: &EntityTypeRef,
        operation: StoreOperation,
        configure: F,
    ) -> Result<MutableStoredProcedure>
    where
        F: FnOnce(&MutableStoredProcedure) -> Result<()>,
    {
        let procedure = self.set(owner, operation)?;
        configure(&procedure)?;
        Ok(procedure)
    }

    /// Remove the procedure declared on `owner` for `operation`
    ///
    /// The removed procedure stays observable through views but rejects all
    /// further writes.
    ///
    /// # Errors
    /// `ReadOnlyModel` after finalization, `UnknownEntityType` for an owner
    /// from another model.
    pub fn remove(
        &mut self,
        owner: &EntityTypeRef,
        operation: StoreOperation,
    ) -> Result<Option<StoredProcedureView>> {
        self.check_writable(owner, operation)?;

        let Some(procedure) = self.slots.remove(&(owner.id(), operation)) else {
            return Ok(None);
        };
        procedure.write().set_removed();

        tracing::debug!(
            owner = owner.name(),
            slot = operation.annotation_name(),
            "stored procedure removed"
        );
        Ok(Some(StoredProcedureView::new(procedure)))
    }

    /// Remove the procedure if the convention's source overrides its own
    ///
    /// An explicitly configured procedure survives convention removal.
    ///
    /// # Errors
    /// `ReadOnlyModel` after finalization, `UnknownEntityType` for an owner
    /// from another model.
    pub fn remove_convention(
        &mut self,
        owner: &EntityTypeRef,
        operation: StoreOperation,
        from_data_annotation: bool,
    ) -> Result<Option<StoredProcedureView>> {
        self.check_writable(owner, operation)?;

        let source = ConfigurationSource::from_data_annotation(from_data_annotation);
        let Some(current) = self.configuration_source(owner, operation) else {
            return Ok(None);
        };

        if !source.overrides(Some(current)) {
            tracing::debug!(
                owner = owner.name(),
                slot = operation.annotation_name(),
                %source,
                %current,
                "stored procedure removal rejected"
            );
            return Ok(None);
        }

        self.remove(owner, operation)
    }

    /// Procedures declared directly on `owner`, in operation order
    #[must_use]
    pub fn declared_for(&self, owner: &EntityTypeRef) -> Vec<StoredProcedureView> {
        StoreOperation::ALL
            .into_iter()
            .filter_map(|operation| self.find_declared(owner, operation))
            .collect()
    }

    /// Iterate all procedures by owner then operation
    pub fn iter(&self) -> impl Iterator<Item = StoredProcedureView> + '_ {
        self.slots
            .values()
            .map(|procedure| StoredProcedureView::new(procedure.clone()))
    }

    /// Number of procedures
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
