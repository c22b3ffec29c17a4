//! Code generation module for table_forge
//!
//! This module turns the canonical schema model into generated Rust source.

pub mod emitter;
pub mod tagger;

// Re-export key types
pub use emitter::{GeneratedField, GeneratedStruct, StructEmitter};
pub use tagger::{resolve_taggers, Tagger};
