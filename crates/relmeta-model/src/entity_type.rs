//! Entity type handles
//!
//! Provides [`EntityTypeRef`], the shared owner identity that metadata objects
//! point at, and [`ModelHandle`], the model state every handle can reach
//! (default schema, naming settings, read-only flag).

use crate::config::ModelConfig;
use parking_lot::RwLock;
use relmeta_core::{ConfigurationSource, MetadataError, Result, Tracked};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Index of an entity type within its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityTypeId(pub(crate) u32);

impl EntityTypeId {
    /// Raw index
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for EntityTypeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct ModelCore {
    config: ModelConfig,
    default_schema: RwLock<Tracked<Option<String>>>,
    read_only: AtomicBool,
}

/// Shared model state
///
/// Cheap to clone; all clones observe the same state.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    core: Arc<ModelCore>,
}

impl ModelHandle {
    pub(crate) fn new(config: ModelConfig) -> Self {
        let default_schema = match config.default_schema.clone() {
            Some(schema) => Tracked::with_source(Some(schema), ConfigurationSource::Explicit),
            None => Tracked::new(None),
        };

        Self {
            core: Arc::new(ModelCore {
                config,
                default_schema: RwLock::new(default_schema),
                read_only: AtomicBool::new(false),
            }),
        }
    }

    /// Model configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.core.config
    }

    /// Current default schema
    #[must_use]
    pub fn default_schema(&self) -> Option<String> {
        self.core.default_schema.read().value().clone()
    }

    /// Source that set the default schema
    #[must_use]
    pub fn default_schema_configuration_source(&self) -> Option<ConfigurationSource> {
        self.core.default_schema.read().source()
    }

    pub(crate) fn try_set_default_schema(
        &self,
        schema: Option<String>,
        source: ConfigurationSource,
    ) -> bool {
        self.core.default_schema.write().try_set(schema, source)
    }

    /// Whether the model has been finalized
    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.core.read_only.load(Ordering::Acquire)
    }

    /// Fail with `ReadOnlyModel` once the model has been finalized
    ///
    /// # Errors
    /// `MetadataError::ReadOnlyModel` naming `object`.
    #[inline]
    pub fn ensure_mutable(&self, object: impl Display) -> Result<()> {
        if self.is_read_only() {
            return Err(MetadataError::read_only(object.to_string()));
        }
        Ok(())
    }

    pub(crate) fn mark_read_only(&self) -> bool {
        !self.core.read_only.swap(true, Ordering::AcqRel)
    }

    /// Whether two handles belong to the same model
    #[inline]
    #[must_use]
    pub fn same_model(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

/// Shared reference to an entity type
///
/// Metadata objects hold this to identify their owner without owning it.
/// Equality is identity: same model and same id.
#[derive(Debug, Clone)]
pub struct EntityTypeRef {
    id: EntityTypeId,
    name: Arc<str>,
    model: ModelHandle,
}

impl EntityTypeRef {
    pub(crate) fn new(id: EntityTypeId, name: &str, model: ModelHandle) -> Self {
        Self {
            id,
            name: Arc::from(name),
            model,
        }
    }

    /// Entity type id
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityTypeId {
        self.id
    }

    /// Entity type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning model state
    #[inline]
    #[must_use]
    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    /// Schema used when a mapping on this type configures none
    #[inline]
    #[must_use]
    pub fn default_schema(&self) -> Option<String> {
        self.model.default_schema()
    }

    /// Whether the owning model has been finalized
    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.model.is_read_only()
    }
}

impl PartialEq for EntityTypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.model.same_model(&other.model)
    }
}

impl Eq for EntityTypeRef {}

impl Hash for EntityTypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for EntityTypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
