//! relmeta Stored Procedures
//!
//! Source-tracked mapping of entity insert/update/delete operations to stored
//! procedures.
//!
//! # Overview
//!
//! Several contributors configure the same procedure: conventions, data
//! annotations and explicit user code. Each attribute remembers the
//! [`ConfigurationSource`](relmeta_core::ConfigurationSource) that set it, so
//! the outcome does not depend on the order contributions arrive in.
//!
//! - [`StoredProcedureRegistry`]: creates, finds and removes procedures per (owner, operation)
//! - [`MutableStoredProcedure`]: explicit configuration, always wins
//! - [`ConventionStoredProcedureBuilder`]: convention configuration, backs off on conflict
//! - [`StoredProcedureView`]: read-only access and debug rendering
//! - [`InternalStoredProcedureBuilder`]: the negotiating gateway beneath all of them
//!
//! # Example
//!
//! ```rust
//! use relmeta_model::{Model, ModelConfig};
//! use relmeta_sproc::{ProcedureSignature, StoreOperation, StoredProcedureRegistry};
//!
//! let mut model = Model::new(ModelConfig::new().with_default_schema("dbo"));
//! let blog = model.add_entity_type("Blog", None).unwrap();
//! let mut registry = StoredProcedureRegistry::new(model.handle().clone());
//!
//! // A convention proposes a name...
//! let convention = registry
//!     .set_convention(&model, &blog, StoreOperation::Insert, false)
//!     .unwrap();
//! convention.has_name(Some("Blog_Add"), false).unwrap();
//!
//! // ...explicit configuration overrides it...
//! registry
//!     .insert_using_stored_procedure(&blog, |sp| {
//!         sp.set_name("Upsert")?;
//!         sp.bind_signature(&ProcedureSignature::new(["id"]))?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! // ...and the convention can no longer change it.
//! assert!(convention.has_name(Some("Blog_Add"), false).unwrap().is_none());
//!
//! let view = registry.find(&model, &blog, StoreOperation::Insert).unwrap();
//! assert_eq!(view.to_string(), "StoredProcedure: dbo.Upsert");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod builder;
mod convention;
mod mutable;
mod operation;
mod parameter;
mod procedure;
mod registry;
mod view;

// Re-exports
pub use builder::{InternalParameterBuilder, InternalStoredProcedureBuilder};
pub use convention::{ConventionParameterBuilder, ConventionStoredProcedureBuilder};
pub use mutable::{MutableParameter, MutableStoredProcedure};
pub use operation::{EntityState, StoreOperation};
pub use parameter::{ProcedureSignature, StoredProcedureParameter, TypeMapping};
pub use registry::StoredProcedureRegistry;
pub use view::StoredProcedureView;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
