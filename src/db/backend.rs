//! The per-product schema-introspection contract
//!
//! Every supported database product implements [`Backend`] independently:
//! the catalog shape, identifier casing and null/constraint sentinels differ
//! enough that a single shared SQL template cannot serve all products.
//! Adding a new product means implementing this trait once and registering
//! the constructor in [`crate::db`]; no other component changes.

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::types::{Column, Table, TypeCategory};

/// Capability contract implemented once per database product
#[async_trait]
pub trait Backend: Send + Sync {
    /// Product identifier used in logs and diagnostics
    fn name(&self) -> &'static str;

    /// Connection descriptor string for this product
    fn dsn(&self) -> String;

    /// Establish the pooled connection; call once per run
    async fn connect(&mut self) -> Result<()>;

    /// Release the connection; safe to call on every exit path
    async fn close(&mut self);

    /// Execute a single statement without scanning results
    async fn execute(&self, sql: &str) -> Result<()>;

    /// List base tables (never views) in the configured schema/owner scope,
    /// ordered by name ascending. A non-empty `filter` restricts the result
    /// to exactly those names, case-normalized per product convention.
    async fn list_tables(&self, filter: &[String]) -> Result<Vec<Table>>;

    /// Validate and cache the parameterized column-metadata query once
    async fn prepare_column_fetch(&mut self) -> Result<()>;

    /// Run the prepared column query for `table`, filling `table.columns`
    /// ordered by ordinal position
    async fn fetch_columns(&self, table: &mut Table) -> Result<()>;

    /// True iff the column's constraint metadata marks a primary key
    fn is_primary_key(&self, column: &Column) -> bool;

    /// True iff the product's identity/sequence convention is detected
    fn is_auto_increment(&self, column: &Column) -> bool;

    /// True iff the nullability flag matches the product's nullable sentinel
    fn is_nullable(&self, column: &Column) -> bool;

    fn string_datatypes(&self) -> &'static [&'static str];
    fn text_datatypes(&self) -> &'static [&'static str];
    fn integer_datatypes(&self) -> &'static [&'static str];
    fn float_datatypes(&self) -> &'static [&'static str];
    fn temporal_datatypes(&self) -> &'static [&'static str];

    fn is_string(&self, column: &Column) -> bool {
        matches_datatype(&column.data_type, self.string_datatypes())
    }

    fn is_text(&self, column: &Column) -> bool {
        matches_datatype(&column.data_type, self.text_datatypes())
    }

    fn is_integer(&self, column: &Column) -> bool {
        matches_datatype(&column.data_type, self.integer_datatypes())
    }

    fn is_float(&self, column: &Column) -> bool {
        matches_datatype(&column.data_type, self.float_datatypes())
    }

    fn is_temporal(&self, column: &Column) -> bool {
        matches_datatype(&column.data_type, self.temporal_datatypes())
    }

    /// Classify a column's native type into its semantic category.
    ///
    /// The checks run top-to-bottom and the first match wins. This order is
    /// a contract: Oracle lists `NUMBER` under both integer and float types
    /// and relies on the integer check running first.
    fn classify(&self, column: &Column) -> TypeCategory {
        let checks: [(TypeCategory, &dyn Fn(&Column) -> bool); 5] = [
            (TypeCategory::String, &|c| self.is_string(c)),
            (TypeCategory::Text, &|c| self.is_text(c)),
            (TypeCategory::Integer, &|c| self.is_integer(c)),
            (TypeCategory::Float, &|c| self.is_float(c)),
            (TypeCategory::Temporal, &|c| self.is_temporal(c)),
        ];

        for (category, test) in checks {
            if test(column) {
                return category;
            }
        }

        TypeCategory::Unknown
    }
}

impl std::fmt::Debug for dyn Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").field("name", &self.name()).finish()
    }
}

/// Case-insensitive prefix/exact match of a native type name against one of
/// a product's enumerated type lists.
///
/// Prefix matching covers parameterized spellings such as `varchar(100)`
/// that SQLite reports verbatim from the declaration.
pub fn matches_datatype(data_type: &str, list: &[&str]) -> bool {
    let data_type = data_type.to_ascii_lowercase();
    list.iter()
        .any(|candidate| data_type.starts_with(&candidate.to_ascii_lowercase()))
}
