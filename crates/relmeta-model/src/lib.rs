//! relmeta Model
//!
//! Entity types, their single-inheritance hierarchy and the build phase of a
//! metadata model.
//!
//! # Overview
//!
//! - [`Model`]: registers entity types, holds model-wide settings, finalizes
//! - [`EntityTypeRef`]: shared owner identity handed to metadata objects
//! - [`TypeHierarchy`]: base/root type queries
//! - [`ModelConfig`]: JSON-loadable settings
//!
//! # Example
//!
//! ```rust
//! use relmeta_model::{Model, ModelConfig, TypeHierarchy};
//!
//! let mut model = Model::new(ModelConfig::new().with_default_schema("dbo"));
//! let animal = model.add_entity_type("Animal", None).unwrap();
//! let cat = model.add_entity_type("Cat", Some(&animal)).unwrap();
//!
//! assert_eq!(model.root_type(&cat), animal);
//! assert_eq!(cat.default_schema().as_deref(), Some("dbo"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod entity_type;
mod model;

// Re-exports
pub use config::ModelConfig;
pub use entity_type::{EntityTypeId, EntityTypeRef, ModelHandle};
pub use model::{Model, TypeHierarchy};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
