//! Type definitions for the canonical schema model
//!
//! Tables and columns are normalized into these structures regardless of the
//! source database product; product-specific interpretation (nullability
//! sentinels, constraint vocabulary, type classification) stays in the
//! backends.

use serde::{Deserialize, Serialize};

/// Represents one database column as reported by the product's catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// 1-based position within the table; unique and contiguous.
    pub ordinal_position: i32,
    pub name: String,
    /// Native data type name, e.g. `"varchar"` or `"NUMBER"`. Never empty.
    pub data_type: String,
    pub default_value: Option<String>,
    /// Raw nullability sentinel as reported by the product
    /// (`"YES"`/`"NO"`, `"Y"`/`"N"`, SQLite's `notnull` digit).
    pub is_nullable: String,
    pub char_max_length: Option<i64>,
    pub numeric_precision: Option<i64>,
    pub constraint_name: Option<String>,
    pub constraint_type: Option<String>,
    /// Product-specific marker column (MySQL `EXTRA`, e.g. `auto_increment`).
    pub extra: Option<String>,
}

/// Represents one database table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    /// Columns ordered by ordinal position; attached in a second pass.
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a new table with the given name and no columns yet
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }
}

/// Semantic category derived from a column's native data type
///
/// Computed on demand by the active backend, never stored. The order of the
/// variants mirrors the classification order: a native type present in more
/// than one of a product's type lists resolves to the earlier category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeCategory {
    String,
    Text,
    Integer,
    Float,
    Temporal,
    Unknown,
}
