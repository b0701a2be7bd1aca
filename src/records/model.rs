//! Record models
//!
//! A model binds a collection (the key prefix records live under) and a
//! catalog table name to the schema every record must satisfy.

use std::collections::HashMap;

use crate::schema::{FieldDef, Schema, SchemaError};

use super::errors::RecordResult;

/// A record collection and its schema
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    collection: String,
    table: String,
    schema: Schema,
}

impl Model {
    /// Build a model, checking that the schema can describe stored records
    pub fn new(
        collection: impl Into<String>,
        table: impl Into<String>,
        schema: Schema,
    ) -> RecordResult<Self> {
        let collection = collection.into();
        let table = table.into();

        if collection.is_empty() || collection.contains('/') {
            return Err(SchemaError::invalid_definition(
                &schema.name,
                format!("collection '{}' must be a single non-empty key segment", collection),
            )
            .into());
        }
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(SchemaError::invalid_definition(
                &schema.name,
                format!("table name '{}' must be alphanumeric or '_'", table),
            )
            .into());
        }
        schema
            .validate_structure()
            .map_err(|reason| SchemaError::invalid_definition(&schema.name, reason))?;

        Ok(Self {
            collection,
            table,
            schema,
        })
    }

    /// The `user` model: id, first_name, last_name and birthday, all required strings
    pub fn user() -> Self {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), FieldDef::required_string());
        fields.insert("first_name".to_string(), FieldDef::required_string());
        fields.insert("last_name".to_string(), FieldDef::required_string());
        fields.insert("birthday".to_string(), FieldDef::required_string());

        Self {
            collection: "user".to_string(),
            table: "users".to_string(),
            schema: Schema::new("user", fields),
        }
    }

    /// The `raw` model: any JSON object with a string id
    pub fn raw() -> Self {
        Self {
            collection: "raw".to_string(),
            table: "raw".to_string(),
            schema: Schema::open("raw"),
        }
    }

    /// Look up a built-in model by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "user" => Some(Self::user()),
            "raw" => Some(Self::raw()),
            _ => None,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Object key of the record with `id`
    pub fn key_for(&self, id: &str) -> String {
        format!("{}/{}", self.collection, id)
    }

    /// Key prefix covering every record of the collection
    pub fn prefix(&self) -> String {
        format!("{}/", self.collection)
    }
}
