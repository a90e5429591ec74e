//! Schema loader and registry
//!
//! Schemas can be authored in code through the builder, or declared as
//! JSON files (one schema per file) and loaded from a directory at
//! startup. Declarative files carry fields, kinds, flags, and built-in
//! constraints; custom validator callables are code-only and attach at
//! build time through the builder.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldSpec, RecordSchema};
use crate::observability::Logger;

/// Loads schema files from disk and maintains an in-memory registry.
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Registered schemas indexed by name
    schemas: HashMap<String, RecordSchema>,
}

impl SchemaLoader {
    /// Creates a loader reading `*.json` schema files from `schema_dir`.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `*.json` file in the schema directory.
    ///
    /// A missing directory is not an error (no schemas to load).
    /// A malformed file is: schema problems fail fast.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| SchemaError::MalformedFile {
            path: self.schema_dir.display().to_string(),
            reason: format!("failed to read schema directory: {}", e),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| SchemaError::MalformedFile {
                path: self.schema_dir.display().to_string(),
                reason: format!("failed to read directory entry: {}", e),
            })?;

            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            self.load_schema_file(&path)?;
        }

        Ok(())
    }

    /// Loads a single schema file.
    fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| SchemaError::MalformedFile {
            path: path.display().to_string(),
            reason: format!("failed to read file: {}", e),
        })?;

        let decl: SchemaDecl =
            serde_json::from_str(&content).map_err(|e| SchemaError::MalformedFile {
                path: path.display().to_string(),
                reason: format!("invalid JSON: {}", e),
            })?;

        let schema = build_schema(decl)?;
        let name = schema.name().to_string();
        self.register(schema)?;

        Logger::info(
            "SCHEMA_LOADED",
            &[("path", &path.display().to_string()), ("schema", &name)],
        );

        Ok(())
    }

    /// Registers a schema built in code.
    pub fn register(&mut self, schema: RecordSchema) -> SchemaResult<()> {
        let name = schema.name().to_string();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::DuplicateSchema(name));
        }

        let field_count = schema.fields().len().to_string();
        self.schemas.insert(name.clone(), schema);
        Logger::info(
            "SCHEMA_REGISTERED",
            &[("field_count", &field_count), ("schema", &name)],
        );
        Ok(())
    }

    /// Returns a registered schema by name.
    pub fn get(&self, name: &str) -> Option<&RecordSchema> {
        self.schemas.get(name)
    }

    /// Returns whether a schema is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Names of all registered schemas (sorted for determinism).
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// On-disk schema declaration
#[derive(Debug, Deserialize)]
struct SchemaDecl {
    name: String,
    #[serde(default)]
    fields: Vec<FieldDecl>,
}

/// On-disk field declaration
#[derive(Debug, Deserialize)]
struct FieldDecl {
    name: String,
    kind: String,
    #[serde(default)]
    collection: Option<String>,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(default)]
    read_only: bool,
    #[serde(default)]
    unique: bool,
    #[serde(default)]
    min_length: Option<usize>,
    #[serde(default)]
    max_length: Option<usize>,
    #[serde(default)]
    min_value: Option<i64>,
    #[serde(default)]
    max_value: Option<i64>,
    #[serde(default)]
    pattern: Option<String>,
}

fn default_required() -> bool {
    true
}

fn build_schema(decl: SchemaDecl) -> SchemaResult<RecordSchema> {
    let mut builder = RecordSchema::builder(&decl.name);
    for field in decl.fields {
        builder = builder.field(build_field(field)?);
    }
    builder.build()
}

fn build_field(decl: FieldDecl) -> SchemaResult<FieldSpec> {
    let mut spec = match decl.kind.as_str() {
        "text" => FieldSpec::text(&decl.name),
        "integer" => FieldSpec::integer(&decl.name),
        "email" => FieldSpec::email(&decl.name),
        "datetime" => FieldSpec::datetime(&decl.name),
        "reference" | "reference_list" => {
            let collection = decl
                .collection
                .as_deref()
                .ok_or_else(|| SchemaError::MissingCollection(decl.name.clone()))?;
            if decl.kind == "reference" {
                FieldSpec::reference(&decl.name, collection)
            } else {
                FieldSpec::reference_list(&decl.name, collection)
            }
        }
        other => {
            return Err(SchemaError::UnknownKind {
                field: decl.name,
                kind: other.to_string(),
            });
        }
    };

    if !decl.required {
        spec = spec.optional();
    }
    if decl.read_only {
        spec = spec.read_only();
    }
    if decl.unique {
        spec = spec.unique();
    }
    if let Some(n) = decl.min_length {
        spec = spec.min_length(n);
    }
    if let Some(n) = decl.max_length {
        spec = spec.max_length(n);
    }
    if let Some(n) = decl.min_value {
        spec = spec.min_value(n);
    }
    if let Some(n) = decl.max_value {
        spec = spec.max_value(n);
    }
    if let Some(p) = decl.pattern {
        spec = spec.pattern(&p);
    }

    Ok(spec)
}
