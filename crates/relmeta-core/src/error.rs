//! Error types for relmeta
//!
//! Only integrity failures are errors. A write that loses a precedence
//! negotiation is reported through `false` / `None` results, never through
//! [`MetadataError`].

/// Integrity error raised by metadata operations
///
/// Every variant indicates a usage bug that aborts the current build step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// Object was detached from its model
    #[error("'{object}' has been removed from the model and can no longer be configured")]
    RemovedFromModel {
        /// Display name of the removed object
        object: String,
    },

    /// Model has been finalized
    #[error("cannot configure '{object}': the model is read-only")]
    ReadOnlyModel {
        /// Display name of the object being written
        object: String,
    },

    /// Parameter does not exist on the procedure signature
    #[error("stored procedure '{procedure}' has no parameter named '{parameter}'")]
    InvalidParameterName {
        /// Procedure display name
        procedure: String,
        /// Requested parameter name
        parameter: String,
    },

    /// Parameter name declared twice
    #[error("stored procedure '{procedure}' already declares a parameter named '{parameter}'")]
    DuplicateParameter {
        /// Procedure display name
        procedure: String,
        /// Duplicated parameter name
        parameter: String,
    },

    /// Signature already bound to the procedure
    #[error("stored procedure '{procedure}' already has a bound signature")]
    SignatureAlreadyBound {
        /// Procedure display name
        procedure: String,
    },

    /// Slot key built from an unsupported operation kind
    #[error("unsupported stored procedure operation: {0}")]
    UnsupportedOperation(String),

    /// Entity type name already used in the model
    #[error("entity type '{0}' already exists in the model")]
    DuplicateEntityType(String),

    /// Entity type id or name not found in the model
    #[error("entity type '{0}' was not found in the model")]
    UnknownEntityType(String),

    /// Identifier failed validation
    #[error("invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        /// Offending identifier
        identifier: String,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration could not be loaded
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl MetadataError {
    /// Create removed-from-model error
    #[inline]
    #[must_use]
    pub fn removed(object: impl Into<String>) -> Self {
        Self::RemovedFromModel {
            object: object.into(),
        }
    }

    /// Create read-only model error
    #[inline]
    #[must_use]
    pub fn read_only(object: impl Into<String>) -> Self {
        Self::ReadOnlyModel {
            object: object.into(),
        }
    }

    /// Create invalid parameter name error
    #[inline]
    #[must_use]
    pub fn invalid_parameter(procedure: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::InvalidParameterName {
            procedure: procedure.into(),
            parameter: parameter.into(),
        }
    }

    /// Create invalid identifier error
    #[inline]
    #[must_use]
    pub fn invalid_identifier(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error comes from writing to a model that no longer accepts writes
    #[inline]
    #[must_use]
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(self, Self::RemovedFromModel { .. } | Self::ReadOnlyModel { .. })
    }
}

impl From<serde_json::Error> for MetadataError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidConfiguration(value.to_string())
    }
}
