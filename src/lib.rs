//! table_forge: generates Rust structs from live database schemas
//!
//! table_forge connects to a running database, introspects its catalog
//! (tables, columns, keys, nullability) and emits one Rust struct per table
//! with per-field attribute tags. One generic pipeline drives structurally
//! different catalogs — information_schema variants, the Oracle data
//! dictionary, SQLite pragmas — through a per-product backend contract that
//! normalizes everything into a single canonical schema model.

pub mod codegen;
pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod utils;

// Re-export main types for easier access
pub use codegen::{StructEmitter, Tagger};
pub use config::Config;
pub use db::Backend;
pub use error::{Error, Result};
pub use schema::{Column, SchemaLoader, Table, TypeCategory};

use codegen::resolve_taggers;

/// Initialize table_forge with the specified configuration file
pub async fn init(config_path: &str) -> Result<TableForgeClient> {
    let config = config::load_from_file(config_path)?;
    TableForgeClient::new(config).await
}

/// The main client for driving one generation run
pub struct TableForgeClient {
    config: Config,
    backend: Box<dyn Backend>,
    taggers: Vec<Box<dyn Tagger>>,
}

impl TableForgeClient {
    /// Create a new client from configuration.
    ///
    /// Dialect and tagger resolution happen here, before any query, so an
    /// unsupported driver or unknown tag generator fails at startup.
    pub async fn new(config: Config) -> Result<Self> {
        let taggers = resolve_taggers(&config.generation.taggers)?;
        let mut backend = db::new_backend(&config.database)?;

        tracing::info!(driver = backend.name(), "connecting");
        backend.connect().await?;

        Ok(Self {
            config,
            backend,
            taggers,
        })
    }

    /// Load the full schema: list tables, then attach columns table by table
    pub async fn load_schema(&mut self) -> Result<Vec<Table>> {
        let filter = self.config.generation.tables.clone();
        SchemaLoader::new(self.backend.as_mut()).load(&filter).await
    }

    /// Render generated source for the given tables
    pub fn generate(&self, tables: &[Table]) -> String {
        StructEmitter::new(self.backend.as_ref(), &self.taggers, &self.config.generation)
            .emit(tables)
    }

    /// Complete workflow: load the schema and emit generated source.
    ///
    /// The connection is released on every exit path, success or failure.
    pub async fn run(&mut self) -> Result<String> {
        let result = self.load_and_generate().await;
        self.backend.close().await;
        result
    }

    async fn load_and_generate(&mut self) -> Result<String> {
        let tables = self.load_schema().await?;
        tracing::info!(tables = tables.len(), "schema loaded");
        Ok(self.generate(&tables))
    }
}
