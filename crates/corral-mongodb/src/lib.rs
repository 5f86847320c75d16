//! Thin convenience layer over the MongoDB driver
//!
//! This crate wraps connection lifecycle management, error normalization and
//! model registration around the official `mongodb` driver. Everything
//! non-trivial (pooling, reconnection, wire protocol, query execution) stays
//! in the driver; this layer adds a friendlier error type, structured log
//! events around each lifecycle step, and a small model registry.
//!
//! # Features
//! - Connect / disconnect / readiness checks over a single driver connection
//! - Model registry with get-or-register semantics
//! - Schema descriptors built explicitly, no global state
//! - Credential masking for logged connection URLs
//! - Document cleanup for JSON output (`_id` -> `id`, revision counter dropped)

pub mod database;
pub mod driver;
pub mod model;
pub mod output;
pub mod util;

pub use corral_common::{BoxError, DatabaseError, Result};
pub use database::{DatabaseOptions, MongoDatabase};
pub use driver::{ConnectionState, Driver, MongoDriver};
pub use model::{
    Model, ModelDef, ModelNotRegistered, ModelRef, ModelRegistry, Schema, SchemaBuilder,
};
pub use output::{document_to_json, document_to_output};
pub use util::mask_auth_url;
