//! Model descriptors and the registry backing `MongoDatabase::model`
//!
//! A [`Model`] is a named, schema-bound handle. Data operations run directly
//! against the driver collection it exposes; this layer only resolves and
//! registers the handle. Schemas are attached explicitly through
//! [`SchemaBuilder`] or [`ModelDef`] rather than through class-level
//! annotations.

use std::collections::HashMap;

use bson::{Bson, Document as BsonDocument};
use mongodb::{Collection, Database};
use parking_lot::RwLock;
use thiserror::Error;

/// Schema definition associated with a registered model
///
/// The definition document is driver-facing metadata (field specs, options);
/// this layer stores it verbatim and never validates documents against it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    definition: BsonDocument,
    collection: Option<String>,
}

impl Schema {
    /// Creates a schema from a raw definition document
    pub fn new(definition: BsonDocument) -> Self {
        Self {
            definition,
            collection: None,
        }
    }

    /// Starts building a schema field by field
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// The raw definition document
    pub fn definition(&self) -> &BsonDocument {
        &self.definition
    }

    /// Explicit collection name, if one was set
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }
}

/// Builder for [`Schema`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    definition: BsonDocument,
    collection: Option<String>,
}

impl SchemaBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field specification
    pub fn field(mut self, name: impl Into<String>, spec: impl Into<Bson>) -> Self {
        self.definition.insert(name.into(), spec.into());
        self
    }

    /// Sets an explicit collection name
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Finishes the schema
    pub fn build(self) -> Schema {
        Schema {
            definition: self.definition,
            collection: self.collection,
        }
    }
}

/// A registered model handle
///
/// Returned by the registry; data operations go through [`Model::collection`]
/// straight to the driver, not through this layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    schema: Schema,
}

impl Model {
    pub(crate) fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// The model name as registered
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema this model was registered with
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Collection name backing this model
    ///
    /// The schema's explicit collection wins; otherwise the lowercased model
    /// name is used.
    pub fn collection_name(&self) -> String {
        match self.schema.collection() {
            Some(collection) => collection.to_string(),
            None => self.name.to_lowercase(),
        }
    }

    /// The driver collection for direct data operations
    pub fn collection(&self, database: &Database) -> Collection<BsonDocument> {
        database.collection(&self.collection_name())
    }
}

/// Descriptor carrying a model name and an optionally attached schema
///
/// Replaces the annotation-on-class pattern: the schema is associated
/// explicitly at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDef {
    name: String,
    schema: Option<Schema>,
}

impl ModelDef {
    /// Creates a descriptor with no schema attached
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }

    /// Attaches a schema to this descriptor
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attached schema, if any
    pub fn get_schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub(crate) fn into_parts(self) -> (String, Option<Schema>) {
        (self.name, self.schema)
    }
}

/// The three accepted shapes for a model lookup argument
///
/// Resolution precedence is fixed: a bare name is looked up in the registry,
/// a handle or schema-bearing descriptor registers (or returns the existing
/// entry), and a schema-less descriptor fails.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelRef {
    /// Look up an already-registered model by name
    Name(String),
    /// A previously registered handle
    Handle(Model),
    /// A descriptor to register, or to reject if it carries no schema
    Def(ModelDef),
}

impl From<&str> for ModelRef {
    fn from(name: &str) -> Self {
        ModelRef::Name(name.to_string())
    }
}

impl From<String> for ModelRef {
    fn from(name: String) -> Self {
        ModelRef::Name(name)
    }
}

impl From<Model> for ModelRef {
    fn from(model: Model) -> Self {
        ModelRef::Handle(model)
    }
}

impl From<ModelDef> for ModelRef {
    fn from(def: ModelDef) -> Self {
        ModelRef::Def(def)
    }
}

/// Driver-level error for a name lookup that found nothing
///
/// Deliberately not a `DatabaseError`: lookup misses propagate as the
/// driver's own failure, untranslated.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("model \"{name}\" has not been registered")]
pub struct ModelNotRegistered {
    pub name: String,
}

/// Name-keyed model table owned by the driver
///
/// An explicit registry object rather than process-global state, so handles
/// (and their tests) stay independent.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Model>>,
}

impl ModelRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registered model, registering it first when a schema is
    /// supplied and the name is new
    ///
    /// An existing entry always wins, which makes re-registration under the
    /// same name idempotent. Without a schema, a missing name is a
    /// [`ModelNotRegistered`] error.
    pub fn register_or_get(
        &self,
        name: &str,
        schema: Option<Schema>,
    ) -> Result<Model, ModelNotRegistered> {
        let mut models = self.models.write();
        if let Some(existing) = models.get(name) {
            return Ok(existing.clone());
        }
        match schema {
            Some(schema) => {
                let model = Model::new(name, schema);
                models.insert(name.to_string(), model.clone());
                Ok(model)
            }
            None => Err(ModelNotRegistered {
                name: name.to_string(),
            }),
        }
    }

    /// Whether a model is registered under the given name
    pub fn contains(&self, name: &str) -> bool {
        self.models.read().contains_key(name)
    }

    /// Names of all registered models
    pub fn names(&self) -> Vec<String> {
        self.models.read().keys().cloned().collect()
    }

    /// Number of registered models
    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }
}
