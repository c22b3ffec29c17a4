//! Struct emitter
//!
//! Walks the loaded tables in order and produces one generated declaration
//! per table. Field types come from the backend's semantic classification;
//! tag strings come from the active tag generators. Rendering is pure:
//! identical tables, taggers and naming configuration produce byte-identical
//! output, which keeps regeneration diffs clean.

use crate::codegen::tagger::Tagger;
use crate::config::GenerationConfig;
use crate::db::Backend;
use crate::schema::types::{Table, TypeCategory};
use crate::utils::naming;

/// One generated struct field: name, type and combined tag string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedField {
    pub name: String,
    pub rust_type: String,
    pub tags: String,
}

/// One generated struct declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStruct {
    pub name: String,
    pub fields: Vec<GeneratedField>,
}

/// Renders the canonical schema model into generated Rust source
pub struct StructEmitter<'a> {
    backend: &'a dyn Backend,
    taggers: &'a [Box<dyn Tagger>],
    config: &'a GenerationConfig,
}

impl<'a> StructEmitter<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        taggers: &'a [Box<dyn Tagger>],
        config: &'a GenerationConfig,
    ) -> Self {
        Self {
            backend,
            taggers,
            config,
        }
    }

    /// Build the structured (name, type, tag) triples for every table,
    /// preserving table order and column ordinal order.
    pub fn generate(&self, tables: &[Table]) -> Vec<GeneratedStruct> {
        tables
            .iter()
            .map(|table| GeneratedStruct {
                name: naming::struct_name(&table.name, &self.config.struct_style),
                fields: table
                    .columns
                    .iter()
                    .map(|column| GeneratedField {
                        name: naming::field_name(&column.name, &self.config.field_style),
                        rust_type: self.field_type(table, column),
                        tags: self.tag_string(column),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Render the generated declarations as Rust source text.
    pub fn render(&self, structs: &[GeneratedStruct]) -> String {
        let mut out = String::from("// Code generated by table_forge. Do not edit manually.\n");
        let derive_line = self.derive_line();

        for decl in structs {
            out.push('\n');
            out.push_str(&derive_line);
            out.push_str(&format!("pub struct {} {{\n", decl.name));
            for field in &decl.fields {
                if !field.tags.is_empty() {
                    out.push_str(&format!("    {}\n", field.tags));
                }
                out.push_str(&format!("    pub {}: {},\n", field.name, field.rust_type));
            }
            out.push_str("}\n");
        }

        out
    }

    /// Generate and render in one pass.
    pub fn emit(&self, tables: &[Table]) -> String {
        self.render(&self.generate(tables))
    }

    fn field_type(&self, table: &Table, column: &crate::schema::types::Column) -> String {
        let base = match self.backend.classify(column) {
            TypeCategory::String | TypeCategory::Text => "String",
            TypeCategory::Integer => "i64",
            TypeCategory::Float => "f64",
            TypeCategory::Temporal => "chrono::NaiveDateTime",
            TypeCategory::Unknown => {
                tracing::warn!(
                    table = %table.name,
                    column = %column.name,
                    data_type = %column.data_type,
                    "unknown data type, falling back to String"
                );
                "String"
            }
        };

        if self.backend.is_nullable(column) {
            format!("Option<{}>", base)
        } else {
            base.to_string()
        }
    }

    fn tag_string(&self, column: &crate::schema::types::Column) -> String {
        let fragments: Vec<String> = self
            .taggers
            .iter()
            .map(|tagger| tagger.generate_tag(self.backend, column))
            .filter(|fragment| !fragment.is_empty())
            .collect();

        fragments.join(" ")
    }

    fn derive_line(&self) -> String {
        let mut derives: Vec<&'static str> = vec!["Debug", "Clone"];
        for tagger in self.taggers {
            for derive in tagger.derives().iter().copied() {
                if !derives.contains(&derive) {
                    derives.push(derive);
                }
            }
        }
        format!("#[derive({})]\n", derives.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::tagger::resolve_taggers;
    use crate::config::DatabaseConfig;
    use crate::db::{Backend, SqliteBackend};
    use crate::schema::types::Column;
    use pretty_assertions::assert_eq;

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

    fn customers() -> Table {
        Table {
            name: "customers".to_string(),
            columns: vec![
                Column {
                    ordinal_position: 1,
                    name: "id".to_string(),
                    data_type: "INTEGER".to_string(),
                    default_value: None,
                    is_nullable: "1".to_string(),
                    char_max_length: None,
                    numeric_precision: None,
                    constraint_name: None,
                    constraint_type: Some("PRIMARY KEY".to_string()),
                    extra: None,
                },
                Column {
                    ordinal_position: 2,
                    name: "name".to_string(),
                    data_type: "VARCHAR(100)".to_string(),
                    default_value: None,
                    is_nullable: "0".to_string(),
                    char_max_length: None,
                    numeric_precision: None,
                    constraint_name: None,
                    constraint_type: None,
                    extra: None,
                },
            ],
        }
    }

    #[test]
    fn test_generate_customers() {
        let backend = backend();
        let taggers = resolve_taggers(&[
            "db".to_string(),
            "serde".to_string(),
            "orm".to_string(),
        ])
        .unwrap();
        let config = GenerationConfig::default();
        let emitter = StructEmitter::new(&backend as &dyn Backend, &taggers, &config);

        let structs = emitter.generate(&[customers()]);
        assert_eq!(structs.len(), 1);
        assert_eq!(structs[0].name, "Customers");
        assert_eq!(structs[0].fields.len(), 2);

        let id = &structs[0].fields[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.rust_type, "i64");
        assert!(id.tags.contains("#[orm(primary_key)]"));

        let name = &structs[0].fields[1];
        assert_eq!(name.rust_type, "Option<String>");
        assert!(name.tags.contains("skip_serializing_if"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let backend = backend();
        let taggers = resolve_taggers(&["db".to_string()]).unwrap();
        let config = GenerationConfig::default();
        let emitter = StructEmitter::new(&backend as &dyn Backend, &taggers, &config);
        let tables = [customers()];

        assert_eq!(emitter.emit(&tables), emitter.emit(&tables));
    }

    #[test]
    fn test_render_output_shape() {
        let backend = backend();
        let taggers = resolve_taggers(&["db".to_string()]).unwrap();
        let config = GenerationConfig::default();
        let emitter = StructEmitter::new(&backend as &dyn Backend, &taggers, &config);

        let output = emitter.emit(&[customers()]);
        assert!(output.starts_with("// Code generated by table_forge."));
        assert!(output.contains("#[derive(Debug, Clone, sqlx::FromRow)]"));
        assert!(output.contains("pub struct Customers {"));
        assert!(output.contains("    #[sqlx(rename = \"id\")]\n    pub id: i64,\n"));
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let backend = backend();
        let taggers = resolve_taggers(&[]).unwrap();
        let config = GenerationConfig::default();
        let emitter = StructEmitter::new(&backend as &dyn Backend, &taggers, &config);

        let mut table = customers();
        table.columns[1].data_type = "BLOB".to_string();
        let structs = emitter.generate(&[table]);
        assert_eq!(structs[0].fields[1].rust_type, "Option<String>");
    }
}
