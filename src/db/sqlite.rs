//! SQLite backend
//!
//! SQLite has no information_schema; tables come from `sqlite_master` and
//! columns from the `pragma_table_info` table-valued function. Declared
//! types are reported verbatim (e.g. `VARCHAR(100)`), which the prefix
//! matcher in the classification layer accounts for.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Executor, FromRow, SqlitePool};

use crate::config::DatabaseConfig;
use crate::db::backend::Backend;
use crate::error::{Error, Result};
use crate::schema::types::{Column, Table};

const LIST_TABLES_SQL: &str = "
    SELECT name
    FROM sqlite_master
    WHERE type = 'table'
    AND name NOT LIKE 'sqlite_%'
";

const COLUMNS_SQL: &str = "
    SELECT
        cid,
        name AS column_name,
        type AS data_type,
        dflt_value,
        \"notnull\" AS not_null,
        pk
    FROM pragma_table_info(?)
    ORDER BY cid
";

#[derive(FromRow)]
struct ColumnRow {
    cid: i64,
    column_name: String,
    data_type: String,
    dflt_value: Option<String>,
    not_null: i64,
    pk: i64,
}

/// SQLite implementation of the [`Backend`] contract
pub struct SqliteBackend {
    config: DatabaseConfig,
    pool: Option<SqlitePool>,
    prepared: bool,
}

impl SqliteBackend {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: None,
            prepared: false,
        }
    }

    /// SQLite has no schema concept; the database path stands in as the
    /// scope for diagnostics.
    fn schema(&self) -> &str {
        &self.config.db_name
    }

    fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .as_ref()
            .ok_or_else(|| Error::Connection("not connected to SQLite".to_string()))
    }

    fn and_in_clause(field: &str, count: usize) -> String {
        if count == 0 {
            return String::new();
        }
        format!("AND {} IN ({})", field, vec!["?"; count].join(","))
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn dsn(&self) -> String {
        if self.config.db_name == ":memory:" {
            return "sqlite::memory:".to_string();
        }
        format!("sqlite://{}", self.config.db_name)
    }

    async fn connect(&mut self) -> Result<()> {
        // One connection only: an in-memory database exists per connection,
        // and the pipeline is sequential anyway.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&self.dsn())
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        self.pool = Some(pool);
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
        }
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        sqlx::query(sql)
            .execute(self.pool()?)
            .await
            .map_err(|e| Error::query(self.schema(), None, e))?;
        Ok(())
    }

    async fn list_tables(&self, filter: &[String]) -> Result<Vec<Table>> {
        let lowered: Vec<String> = filter.iter().map(|name| name.to_lowercase()).collect();
        let sql = format!(
            "{} {} ORDER BY name",
            LIST_TABLES_SQL,
            Self::and_in_clause("LOWER(name)", lowered.len())
        );

        let mut query = sqlx::query_scalar::<_, String>(&sql);
        for name in &lowered {
            query = query.bind(name);
        }

        let names = query.fetch_all(self.pool()?).await.map_err(|e| {
            tracing::error!(database = self.schema(), "failed to list tables");
            Error::query(self.schema(), None, e)
        })?;

        Ok(names.iter().map(|name| Table::new(name)).collect())
    }

    async fn prepare_column_fetch(&mut self) -> Result<()> {
        self.pool()?
            .prepare(COLUMNS_SQL)
            .await
            .map_err(|e| Error::Prepare(e.to_string()))?;
        self.prepared = true;
        Ok(())
    }

    async fn fetch_columns(&self, table: &mut Table) -> Result<()> {
        if !self.prepared {
            return Err(Error::Prepare(
                "column fetch statement has not been prepared".to_string(),
            ));
        }

        let rows = sqlx::query_as::<_, ColumnRow>(COLUMNS_SQL)
            .bind(&table.name)
            .fetch_all(self.pool()?)
            .await
            .map_err(|e| {
                tracing::error!(
                    database = self.schema(),
                    table = %table.name,
                    "failed to fetch columns"
                );
                Error::query(self.schema(), Some(&table.name), e)
            })?;

        table.columns = rows
            .into_iter()
            .map(|row| Column {
                // pragma_table_info numbers columns from zero
                ordinal_position: row.cid as i32 + 1,
                name: row.column_name,
                data_type: row.data_type,
                default_value: row.dflt_value,
                is_nullable: row.not_null.to_string(),
                char_max_length: None,
                numeric_precision: None,
                constraint_name: None,
                constraint_type: (row.pk > 0).then(|| "PRIMARY KEY".to_string()),
                extra: None,
            })
            .collect();

        Ok(())
    }

    fn is_primary_key(&self, column: &Column) -> bool {
        column
            .constraint_type
            .as_deref()
            .map_or(false, |constraint| constraint.contains("PRIMARY KEY"))
    }

    fn is_auto_increment(&self, _column: &Column) -> bool {
        // rowid aliasing is not visible through pragma_table_info
        false
    }

    fn is_nullable(&self, column: &Column) -> bool {
        column.is_nullable == "0"
    }

    fn string_datatypes(&self) -> &'static [&'static str] {
        &[
            "character",
            "varchar",
            "varying character",
            "nchar",
            "native character",
            "nvarchar",
        ]
    }

    fn text_datatypes(&self) -> &'static [&'static str] {
        &["text", "clob"]
    }

    fn integer_datatypes(&self) -> &'static [&'static str] {
        &[
            "int",
            "integer",
            "tinyint",
            "smallint",
            "mediumint",
            "bigint",
            "unsigned big int",
            "int2",
            "int8",
        ]
    }

    fn float_datatypes(&self) -> &'static [&'static str] {
        &["real", "double", "double precision", "float", "numeric", "decimal"]
    }

    fn temporal_datatypes(&self) -> &'static [&'static str] {
        &["date", "datetime", "timestamp"]
    }
}
