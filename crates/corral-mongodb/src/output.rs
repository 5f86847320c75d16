//! JSON-facing cleanup of raw driver documents
//!
//! Documents come back from the driver carrying the internal `_id` primary
//! key and the `__v` revision counter. Before they reach a JSON surface
//! (RESTful responses and the like) the primary key is renamed to `id` and
//! the revision counter is dropped.

use bson::{Bson, Document as BsonDocument};

/// Internal primary-key field name used by the driver
pub const ID_FIELD: &str = "_id";
/// Public primary-key field name after cleanup
pub const OUTPUT_ID_FIELD: &str = "id";
/// Internal revision counter field name
pub const VERSION_FIELD: &str = "__v";

/// Prepares a fetched document for JSON output
///
/// Renames `_id` to `id` in place (field position preserved) and drops
/// `__v`. The input document is left untouched; everything else passes
/// through unchanged.
pub fn document_to_output(document: &BsonDocument) -> BsonDocument {
    let mut output = BsonDocument::new();
    for (key, value) in document {
        match key.as_str() {
            ID_FIELD => {
                output.insert(OUTPUT_ID_FIELD, value.clone());
            }
            VERSION_FIELD => {}
            _ => {
                output.insert(key.clone(), value.clone());
            }
        }
    }
    output
}

/// Cleans a document and renders it as relaxed extended JSON
pub fn document_to_json(document: &BsonDocument) -> serde_json::Value {
    Bson::Document(document_to_output(document)).into_relaxed_extjson()
}
