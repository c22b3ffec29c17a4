//! Schema module for table_forge
//!
//! This module holds the canonical schema model and the loader that
//! populates it from a backend.

pub mod loader;
pub mod types;

// Re-export key types
pub use loader::SchemaLoader;
pub use types::{Column, Table, TypeCategory};
