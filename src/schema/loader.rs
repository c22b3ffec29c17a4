//! Schema loader
//!
//! Drives a connected backend through the load sequence: list tables,
//! prepare the column query once, then fetch columns table by table. Any
//! failure aborts the whole load; a generation run with a table's fields
//! silently missing would produce incorrect code.

use crate::db::Backend;
use crate::error::Result;
use crate::schema::types::Table;

/// Orchestrates a full schema load over one backend
pub struct SchemaLoader<'a> {
    backend: &'a mut dyn Backend,
}

impl<'a> SchemaLoader<'a> {
    pub fn new(backend: &'a mut dyn Backend) -> Self {
        Self { backend }
    }

    /// Load all tables (optionally restricted to `filter`) with their
    /// columns attached.
    ///
    /// Tables come back in the name-ascending order the backend listed them
    /// in; that order carries through to the emitted output and is a
    /// user-visible contract.
    pub async fn load(&mut self, filter: &[String]) -> Result<Vec<Table>> {
        let mut tables = self.backend.list_tables(filter).await?;
        tracing::debug!(count = tables.len(), "listed tables");

        self.backend.prepare_column_fetch().await?;

        for table in &mut tables {
            self.backend.fetch_columns(table).await?;
            tracing::debug!(table = %table.name, columns = table.columns.len(), "fetched columns");
        }

        Ok(tables)
    }
}
