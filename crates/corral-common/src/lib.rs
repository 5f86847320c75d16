//! Common types for corral
//!
//! This crate provides the shared error type used across all corral modules.

pub mod error;

pub use error::{BoxError, DatabaseError, Result};
