//! Tag generators
//!
//! Each tagger is an independent, stateless annotator producing one
//! attribute fragment per field. Taggers receive the active backend because
//! some fragments depend on product-specific rules (nullability sentinels,
//! key detection). The emitter joins the fragments of the configured
//! taggers, in configured order, into one tag string per field.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::db::Backend;
use crate::error::{Error, Result};
use crate::schema::types::Column;

/// Capability contract for one tag generator
pub trait Tagger: Send + Sync {
    /// Registry name, as referenced from the configuration
    fn name(&self) -> &'static str;

    /// Derive paths this tagger's fragments rely on, added to the struct
    /// header (e.g. `sqlx::FromRow` for the db tag)
    fn derives(&self) -> &'static [&'static str];

    /// Produce the attribute fragment for one field; empty when the tagger
    /// has nothing to say about this column
    fn generate_tag(&self, backend: &dyn Backend, column: &Column) -> String;
}

impl std::fmt::Debug for dyn Tagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tagger").field("name", &self.name()).finish()
    }
}

/// The standard `db` tag: maps the field back to its column name
pub struct DbTag;

impl Tagger for DbTag {
    fn name(&self) -> &'static str {
        "db"
    }

    fn derives(&self) -> &'static [&'static str] {
        &["sqlx::FromRow"]
    }

    fn generate_tag(&self, _backend: &dyn Backend, column: &Column) -> String {
        format!("#[sqlx(rename = \"{}\")]", column.name)
    }
}

/// Serde tag: rename plus a skip rule for nullable columns
pub struct SerdeTag;

impl Tagger for SerdeTag {
    fn name(&self) -> &'static str {
        "serde"
    }

    fn derives(&self) -> &'static [&'static str] {
        &["serde::Serialize", "serde::Deserialize"]
    }

    fn generate_tag(&self, backend: &dyn Backend, column: &Column) -> String {
        if backend.is_nullable(column) {
            format!(
                "#[serde(rename = \"{}\", skip_serializing_if = \"Option::is_none\")]",
                column.name
            )
        } else {
            format!("#[serde(rename = \"{}\")]", column.name)
        }
    }
}

/// Key metadata tag: marks primary-key and identity columns for downstream
/// derive macros
pub struct OrmTag;

impl Tagger for OrmTag {
    fn name(&self) -> &'static str {
        "orm"
    }

    fn derives(&self) -> &'static [&'static str] {
        &[]
    }

    fn generate_tag(&self, backend: &dyn Backend, column: &Column) -> String {
        let mut markers = Vec::new();
        if backend.is_primary_key(column) {
            markers.push("primary_key");
        }
        if backend.is_auto_increment(column) {
            markers.push("auto_increment");
        }

        if markers.is_empty() {
            return String::new();
        }
        format!("#[orm({})]", markers.join(", "))
    }
}

/// Frozen tagger registry; built once, never mutated.
static TAGGERS: Lazy<HashMap<&'static str, fn() -> Box<dyn Tagger>>> = Lazy::new(|| {
    let mut taggers: HashMap<&'static str, fn() -> Box<dyn Tagger>> = HashMap::new();
    taggers.insert("db", || Box::new(DbTag));
    taggers.insert("serde", || Box::new(SerdeTag));
    taggers.insert("orm", || Box::new(OrmTag));
    taggers
});

/// Resolve the configured tagger names, preserving their order.
///
/// Unknown names fail here, at configuration time, not per column.
pub fn resolve_taggers(names: &[String]) -> Result<Vec<Box<dyn Tagger>>> {
    names
        .iter()
        .map(|name| {
            TAGGERS
                .get(name.as_str())
                .map(|constructor| constructor())
                .ok_or_else(|| Error::UnknownTagGenerator(name.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::SqliteBackend;

    fn backend() -> SqliteBackend {
        SqliteBackend::new(DatabaseConfig {
            driver: "sqlite".to_string(),
            host: String::new(),
            port: None,
            user: None,
            password: None,
            db_name: ":memory:".to_string(),
            schema: None,
            socket: None,
            ssl_mode: "disable".to_string(),
            verbose: false,
        })
    }

    fn column(name: &str) -> Column {
        Column {
            ordinal_position: 1,
            name: name.to_string(),
            data_type: "INTEGER".to_string(),
            default_value: None,
            is_nullable: "1".to_string(),
            char_max_length: None,
            numeric_precision: None,
            constraint_name: None,
            constraint_type: None,
            extra: None,
        }
    }

    #[test]
    fn test_db_tag() {
        let backend = backend();
        let tag = DbTag.generate_tag(&backend, &column("customer_id"));
        assert_eq!(tag, "#[sqlx(rename = \"customer_id\")]");
    }

    #[test]
    fn test_serde_tag_nullable_aware() {
        let backend = backend();
        let mut col = column("name");
        col.is_nullable = "0".to_string(); // sqlite: notnull = 0 means nullable
        assert_eq!(
            SerdeTag.generate_tag(&backend, &col),
            "#[serde(rename = \"name\", skip_serializing_if = \"Option::is_none\")]"
        );

        col.is_nullable = "1".to_string();
        assert_eq!(
            SerdeTag.generate_tag(&backend, &col),
            "#[serde(rename = \"name\")]"
        );
    }

    #[test]
    fn test_orm_tag_primary_key() {
        let backend = backend();
        let mut col = column("id");
        col.constraint_type = Some("PRIMARY KEY".to_string());
        assert_eq!(
            OrmTag.generate_tag(&backend, &col),
            "#[orm(primary_key)]"
        );

        col.constraint_type = None;
        assert_eq!(OrmTag.generate_tag(&backend, &col), "");
    }

    #[test]
    fn test_resolve_preserves_order() {
        let taggers =
            resolve_taggers(&["serde".to_string(), "db".to_string()]).unwrap();
        let names: Vec<_> = taggers.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["serde", "db"]);
    }

    #[test]
    fn test_resolve_unknown_tagger() {
        let err = resolve_taggers(&["yaml".to_string()]).unwrap_err();
        assert!(matches!(err, Error::UnknownTagGenerator(name) if name == "yaml"));
    }
}
