//! Utilities for table_forge

pub mod logging;
pub mod naming;

// Re-export key utility functions
pub use naming::{apply_naming_convention, field_name, struct_name};
