//! Functional tests for stored procedure lifecycle.
//!
//! A procedure is created on first configuration, may be removed, and
//! becomes immutable once its model is finalized. This module checks:
//! - Removal is terminal for every held builder.
//! - Convention removal respects the procedure's source.
//! - Finalization turns every write into an error.

use relmeta_core::{ConfigurationSource, MetadataError};
use relmeta_sproc::{ProcedureSignature, StoreOperation, TypeMapping};
use relmeta_test_utils::{upsert_signature, Fixture};

/// Tenet: after removal, every setter on a held builder fails and nothing changes.
#[test]
fn removal_is_terminal() {
    let mut fx = Fixture::new();

    let explicit = fx.registry.set(&fx.blog, StoreOperation::Insert).unwrap();
    explicit.set_name("Upsert").unwrap();
    explicit.bind_signature(&upsert_signature()).unwrap();
    let convention = fx
        .registry
        .set_convention(&fx.model, &fx.blog, StoreOperation::Insert, false)
        .unwrap();
    let parameter = explicit.parameter("id").unwrap();

    let removed = fx
        .registry
        .remove(&fx.blog, StoreOperation::Insert)
        .unwrap()
        .unwrap();
    assert!(!removed.is_in_model());

    assert!(matches!(
        explicit.set_name("Other"),
        Err(MetadataError::RemovedFromModel { .. })
    ));
    assert!(matches!(
        explicit.set_schema(Some("dbo")),
        Err(MetadataError::RemovedFromModel { .. })
    ));
    assert!(matches!(
        explicit.set_annotation("Relational:Comment", "x"),
        Err(MetadataError::RemovedFromModel { .. })
    ));
    assert!(matches!(
        explicit.parameter("id"),
        Err(MetadataError::RemovedFromModel { .. })
    ));
    assert!(matches!(
        convention.has_name(Some("Other"), true),
        Err(MetadataError::RemovedFromModel { .. })
    ));
    assert!(!convention.can_set_name(Some("Upsert"), false));
    assert!(matches!(
        parameter.set_store_type(Some("int")),
        Err(MetadataError::RemovedFromModel { .. })
    ));
    assert!(matches!(
        parameter.set_type_mapping(Some(TypeMapping::new("int"))),
        Err(MetadataError::RemovedFromModel { .. })
    ));

    assert_eq!(removed.name(), "Upsert");
    assert_eq!(removed.find_parameter("id").unwrap().store_type(), None);
    assert!(fx.registry.find_declared(&fx.blog, StoreOperation::Insert).is_none());
}

/// Tenet: a removed slot can be configured again with a fresh procedure.
#[test]
fn slot_is_reusable_after_removal() {
    let mut fx = Fixture::new();

    let old = fx.registry.set(&fx.blog, StoreOperation::Update).unwrap();
    old.set_name("Old").unwrap();
    fx.registry.remove(&fx.blog, StoreOperation::Update).unwrap();

    let fresh = fx
        .registry
        .set_convention(&fx.model, &fx.blog, StoreOperation::Update, false)
        .unwrap();
    assert_ne!(fresh.metadata(), old.metadata());
    assert_eq!(fresh.metadata().name(), "Blog_Update");
    assert_eq!(fresh.configuration_source(), ConfigurationSource::Convention);
}

/// Tenet: conventions cannot remove what explicit code declared.
#[test]
fn convention_removal_respects_source() {
    let mut fx = Fixture::new();

    fx.registry.set(&fx.blog, StoreOperation::Delete).unwrap();
    assert!(fx
        .registry
        .remove_convention(&fx.blog, StoreOperation::Delete, true)
        .unwrap()
        .is_none());
    assert!(fx.registry.find_declared(&fx.blog, StoreOperation::Delete).is_some());

    fx.registry
        .set_convention(&fx.model, &fx.blog, StoreOperation::Insert, false)
        .unwrap();
    let removed = fx
        .registry
        .remove_convention(&fx.blog, StoreOperation::Insert, false)
        .unwrap();
    assert!(removed.is_some_and(|view| !view.is_in_model()));
    assert_eq!(fx.registry.len(), 1);
}

/// Tenet: the signature is bound once and must not repeat names.
#[test]
fn signature_misuse_is_an_integrity_error() {
    let mut fx = Fixture::new();
    let explicit = fx.registry.set(&fx.blog, StoreOperation::Insert).unwrap();

    assert!(matches!(
        explicit.bind_signature(&ProcedureSignature::new(["id", "id"])),
        Err(MetadataError::DuplicateParameter { parameter, .. }) if parameter == "id"
    ));
    assert!(explicit.metadata().parameters().is_empty());

    explicit.bind_signature(&upsert_signature()).unwrap();
    assert!(matches!(
        explicit.bind_signature(&upsert_signature()),
        Err(MetadataError::SignatureAlreadyBound { .. })
    ));

    let names: Vec<_> = explicit
        .metadata()
        .parameters()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(names, ["id", "title", "rating"]);
}

/// Tenet: asking for an undeclared parameter names both procedure and parameter.
#[test]
fn unknown_parameter_is_reported() {
    let mut fx = Fixture::new();
    let explicit = fx.registry.set(&fx.blog, StoreOperation::Insert).unwrap();
    explicit.set_schema(Some("dbo")).unwrap();
    explicit.set_name("Upsert").unwrap();
    explicit.bind_signature(&ProcedureSignature::new(["id"])).unwrap();

    let err = explicit.parameter("nonexistent").unwrap_err();
    assert_eq!(
        err,
        MetadataError::InvalidParameterName {
            procedure: "dbo.Upsert".to_string(),
            parameter: "nonexistent".to_string(),
        }
    );
    assert!(err.to_string().contains("nonexistent"));
}

/// Tenet: a finalized model rejects every write but keeps answering reads.
#[test]
fn finalized_model_is_read_only() {
    let mut fx = Fixture::new();
    let explicit = fx.registry.set(&fx.blog, StoreOperation::Insert).unwrap();
    explicit.set_name("Upsert").unwrap();
    explicit.bind_signature(&upsert_signature()).unwrap();
    let convention = fx
        .registry
        .set_convention(&fx.model, &fx.blog, StoreOperation::Insert, false)
        .unwrap();

    fx.model.finalize();

    assert!(matches!(
        explicit.set_name("Other"),
        Err(MetadataError::ReadOnlyModel { .. })
    ));
    assert!(matches!(
        convention.has_schema(Some("dbo"), false),
        Err(MetadataError::ReadOnlyModel { .. })
    ));
    assert!(!convention.can_set_name(Some("Upsert"), false));
    assert!(matches!(
        fx.registry.set(&fx.blog, StoreOperation::Update),
        Err(MetadataError::ReadOnlyModel { .. })
    ));
    assert!(matches!(
        fx.registry.remove(&fx.blog, StoreOperation::Insert),
        Err(MetadataError::ReadOnlyModel { .. })
    ));
    assert!(fx
        .registry
        .set_convention(&fx.model, &fx.blog, StoreOperation::Delete, true)
        .is_err_and(|err| err.is_lifecycle_error()));

    let view = fx
        .registry
        .find(&fx.model, &fx.blog, StoreOperation::Insert)
        .unwrap();
    assert_eq!(view.name(), "Upsert");
    assert!(view.is_in_model());
}

/// Tenet: explicit names longer than the model allows are rejected.
#[test]
fn overlong_explicit_name_is_rejected() {
    let mut fx = Fixture::with_config(relmeta_model::ModelConfig::new().with_max_identifier_len(8));
    let explicit = fx.registry.set(&fx.blog, StoreOperation::Insert).unwrap();

    assert!(matches!(
        explicit.set_name("BlogInsertProcedure"),
        Err(MetadataError::InvalidIdentifier { .. })
    ));
    assert!(explicit.set_name("Upsert").is_ok());
    assert_eq!(explicit.metadata().name(), "Upsert");
}
