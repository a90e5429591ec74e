//! Schema Invariant Tests
//!
//! - Malformed schemas fail fast at build or load time, never per call
//! - Declaration order is preserved through the loader
//! - Validation against a loaded schema is deterministic

use recval::lookup::MemoryLookup;
use recval::pipeline::{Mode, Pipeline};
use recval::record::RefKey;
use recval::schema::{FieldSpec, RecordSchema, SchemaError, SchemaLoader};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_loader() -> (TempDir, SchemaLoader) {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("blog.json"),
        r#"{
            "name": "blog",
            "fields": [
                {"name": "title", "kind": "text", "unique": true, "max_length": 100},
                {"name": "content", "kind": "text"},
                {"name": "author", "kind": "reference", "collection": "author"},
                {"name": "tags", "kind": "reference_list", "collection": "tags", "required": false},
                {"name": "updated_at", "kind": "datetime", "read_only": true}
            ]
        }"#,
    )
    .unwrap();

    let mut loader = SchemaLoader::new(tmp.path());
    loader.load_all().unwrap();
    (tmp, loader)
}

// =============================================================================
// Fail-Fast Construction
// =============================================================================

#[test]
fn duplicate_field_fails_at_build_time() {
    let result = RecordSchema::builder("blog")
        .field(FieldSpec::text("title"))
        .field(FieldSpec::text("title"))
        .build();
    assert!(matches!(result, Err(SchemaError::DuplicateField { .. })));
}

#[test]
fn reserved_non_field_key_rejected() {
    let result = RecordSchema::builder("blog")
        .field(FieldSpec::text("non_field_errors"))
        .build();
    assert!(matches!(result, Err(SchemaError::ReservedFieldName(_))));
}

#[test]
fn inapplicable_constraint_rejected() {
    let result = RecordSchema::builder("blog")
        .field(FieldSpec::datetime("created_at").max_length(10))
        .build();
    assert!(matches!(result, Err(SchemaError::ConstraintMismatch { .. })));
}

// =============================================================================
// Loader
// =============================================================================

#[test]
fn loaded_schema_preserves_declaration_order() {
    let (_tmp, loader) = setup_loader();
    let schema = loader.get("blog").unwrap();

    let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec!["title", "content", "author", "tags", "updated_at"]
    );
}

#[test]
fn loaded_schema_carries_flags_and_constraints() {
    let (_tmp, loader) = setup_loader();
    let schema = loader.get("blog").unwrap();

    assert!(schema.field("title").unwrap().constraints().unique);
    assert!(!schema.field("tags").unwrap().is_required());
    assert!(schema.field("updated_at").unwrap().is_read_only());
}

#[test]
fn malformed_schema_file_fails_load() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("bad.json"),
        r#"{"name": "bad", "fields": [{"name": "x", "kind": "mystery"}]}"#,
    )
    .unwrap();

    let mut loader = SchemaLoader::new(tmp.path());
    assert!(matches!(
        loader.load_all(),
        Err(SchemaError::UnknownKind { .. })
    ));
}

// =============================================================================
// Determinism Through a Loaded Schema
// =============================================================================

/// Same document validates the same way every time.
#[test]
fn validation_is_deterministic() {
    let (_tmp, loader) = setup_loader();
    let schema = loader.get("blog").unwrap();

    let mut lookup = MemoryLookup::new();
    lookup.add_key("author", RefKey::Int(1));
    lookup.add_key("tags", RefKey::Int(2));
    let pipeline = Pipeline::new(&lookup);

    let input = json!({
        "title": "A",
        "content": "B",
        "author": 1,
        "tags": [2]
    });

    for _ in 0..100 {
        assert!(pipeline.validate(schema, &input, Mode::Full).is_ok());
    }
}

/// Invalid document fails consistently with the same report.
#[test]
fn invalid_document_fails_consistently() {
    let (_tmp, loader) = setup_loader();
    let schema = loader.get("blog").unwrap();

    let lookup = MemoryLookup::new();
    let pipeline = Pipeline::new(&lookup);

    let input = json!({"title": "A", "content": "B", "author": 999});
    let first = pipeline.validate(schema, &input, Mode::Full).unwrap_err();
    for _ in 0..100 {
        let next = pipeline.validate(schema, &input, Mode::Full).unwrap_err();
        assert_eq!(first, next);
    }
}
