//! relmeta Core
//!
//! Provenance primitives shared by every metadata object.
//!
//! # Core Concepts
//!
//! - [`ConfigurationSource`]: ordered provenance level (`Convention < DataAnnotation < Explicit`)
//! - [`Tracked<T>`]: a value plus the source that last set it
//! - [`AnnotationStore`]: key/value annotations with per-key sources
//! - [`MetadataError`]: integrity failures (removed objects, read-only models, bad names)
//!
//! # Example
//!
//! ```rust
//! use relmeta_core::{ConfigurationSource, Tracked};
//!
//! let mut name = Tracked::new(None::<String>);
//! assert!(name.try_set(Some("Proc1".into()), ConfigurationSource::Convention));
//! assert!(name.try_set(Some("Proc2".into()), ConfigurationSource::Explicit));
//! assert!(!name.try_set(Some("Proc3".into()), ConfigurationSource::Convention));
//! assert_eq!(name.value().as_deref(), Some("Proc2"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod annotation;
mod debug;
mod error;
mod source;
mod tracked;

// Re-exports
pub use annotation::{Annotation, AnnotationStore};
pub use debug::DebugStringOptions;
pub use error::MetadataError;
pub use source::ConfigurationSource;
pub use tracked::Tracked;

/// Result alias for metadata operations
pub type Result<T, E = MetadataError> = std::result::Result<T, E>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
