//! Read-only stored procedure view
//!
//! [`StoredProcedureView`] exposes getters only. It is what lookups return
//! and what the mutable facades hand out through `metadata()`.

use crate::operation::StoreOperation;
use crate::parameter::StoredProcedureParameter;
use crate::procedure::ProcedureRef;
use relmeta_core::{Annotation, ConfigurationSource, DebugStringOptions};
use relmeta_model::EntityTypeRef;
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

/// Read-only view of a stored procedure
///
/// Observes the live record: changes made through any builder are visible
/// immediately. Equality is identity.
#[derive(Debug, Clone)]
pub struct StoredProcedureView {
    procedure: ProcedureRef,
}

impl StoredProcedureView {
    pub(crate) fn new(procedure: ProcedureRef) -> Self {
        Self { procedure }
    }

    /// Effective name (configured, or `{Owner}_{Operation}`)
    #[must_use]
    pub fn name(&self) -> String {
        self.procedure.read().name()
    }

    /// Name derived from the owner and operation
    #[must_use]
    pub fn default_name(&self) -> String {
        self.procedure.read().default_name()
    }

    /// Effective schema (configured, or the model default)
    #[must_use]
    pub fn schema(&self) -> Option<String> {
        self.procedure.read().schema()
    }

    /// Entity type the procedure is declared on
    #[must_use]
    pub fn owner(&self) -> EntityTypeRef {
        self.procedure.read().owner().clone()
    }

    /// Operation the procedure performs
    #[must_use]
    pub fn operation(&self) -> StoreOperation {
        self.procedure.read().operation()
    }

    /// Parameters in signature order
    #[must_use]
    pub fn parameters(&self) -> Vec<StoredProcedureParameter> {
        self.procedure.read().parameters.values().cloned().collect()
    }

    /// Parameter by name
    #[must_use]
    pub fn find_parameter(&self, name: &str) -> Option<StoredProcedureParameter> {
        self.procedure.read().find_parameter(name).cloned()
    }

    /// Annotations in name order
    #[must_use]
    pub fn annotations(&self) -> Vec<Annotation> {
        self.procedure.read().annotations.iter().cloned().collect()
    }

    /// Annotation value by name
    #[must_use]
    pub fn annotation_value(&self, name: &str) -> Option<Value> {
        self.procedure.read().annotations.value(name).cloned()
    }

    /// Source that created or last re-stamped the procedure
    #[must_use]
    pub fn configuration_source(&self) -> ConfigurationSource {
        self.procedure.read().configuration_source()
    }

    /// Source that configured the name, if any
    #[must_use]
    pub fn name_configuration_source(&self) -> Option<ConfigurationSource> {
        self.procedure.read().name.source()
    }

    /// Source that configured the schema, if any
    #[must_use]
    pub fn schema_configuration_source(&self) -> Option<ConfigurationSource> {
        self.procedure.read().schema.source()
    }

    /// Whether the procedure is still attached to its model
    #[must_use]
    pub fn is_in_model(&self) -> bool {
        !self.procedure.read().is_removed()
    }

    /// Render the procedure for diagnostics
    ///
    /// ```text
    /// StoredProcedure: dbo.Blog_Insert
    ///   Parameters:
    ///     id int
    /// ```
    #[must_use]
    pub fn to_debug_string(&self, options: DebugStringOptions, indent: usize) -> String {
        self.procedure.read().to_debug_string(options, indent)
    }
}

impl PartialEq for StoredProcedureView {
    fn eq(&self, other: &Self) -> bool {
        self.procedure.ptr_eq(&other.procedure)
    }
}

impl Eq for StoredProcedureView {}

impl Display for StoredProcedureView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_debug_string(DebugStringOptions::SINGLE_LINE_DEFAULT, 0))
    }
}
