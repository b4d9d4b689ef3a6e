//! Testing utilities for relmeta workspace
//!
//! Shared fixtures and tracing setup for integration tests.

#![allow(missing_docs)]

use relmeta_model::{EntityTypeRef, Model, ModelConfig};
use relmeta_sproc::{ProcedureSignature, StoredProcedureRegistry};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per process; honours `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Model with a three-level hierarchy plus an unrelated type
///
/// `Animal <- Cat <- Lion`, and `Blog`.
pub struct Fixture {
    pub model: Model,
    pub registry: StoredProcedureRegistry,
    pub animal: EntityTypeRef,
    pub cat: EntityTypeRef,
    pub lion: EntityTypeRef,
    pub blog: EntityTypeRef,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ModelConfig::new())
    }

    pub fn with_config(config: ModelConfig) -> Self {
        init_tracing();

        let mut model = Model::new(config);
        let animal = model.add_entity_type("Animal", None).unwrap();
        let cat = model.add_entity_type("Cat", Some(&animal)).unwrap();
        let lion = model.add_entity_type("Lion", Some(&cat)).unwrap();
        let blog = model.add_entity_type("Blog", None).unwrap();
        let registry = StoredProcedureRegistry::new(model.handle().clone());

        Self {
            model,
            registry,
            animal,
            cat,
            lion,
            blog,
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn upsert_signature() -> ProcedureSignature {
    ProcedureSignature::new(["id", "title", "rating"])
}
