//! MySQL backend
//!
//! Reads information_schema scoped by database name (MySQL has no separate
//! schema concept). Key and identity metadata come from the `COLUMN_KEY`
//! and `EXTRA` catalog columns.

use async_trait::async_trait;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{Executor, FromRow, MySqlPool};

use crate::config::DatabaseConfig;
use crate::db::backend::Backend;
use crate::error::{Error, Result};
use crate::schema::types::{Column, Table};

const LIST_TABLES_SQL: &str = "
    SELECT table_name
    FROM information_schema.tables
    WHERE table_type = 'BASE TABLE'
    AND table_schema = ?
";

// Unsigned catalog counters are cast to signed so they scan into i64.
const COLUMNS_SQL: &str = "
    SELECT
        CAST(ordinal_position AS SIGNED) AS ordinal_position,
        column_name,
        data_type,
        column_default,
        is_nullable,
        CAST(character_maximum_length AS SIGNED) AS character_maximum_length,
        CAST(numeric_precision AS SIGNED) AS numeric_precision,
        column_key,
        extra
    FROM information_schema.columns
    WHERE table_name = ?
    AND table_schema = ?
    ORDER BY ordinal_position
";

#[derive(FromRow)]
struct ColumnRow {
    ordinal_position: i64,
    column_name: String,
    data_type: String,
    column_default: Option<String>,
    is_nullable: String,
    character_maximum_length: Option<i64>,
    numeric_precision: Option<i64>,
    column_key: Option<String>,
    extra: Option<String>,
}

/// MySQL implementation of the [`Backend`] contract
pub struct MySqlBackend {
    config: DatabaseConfig,
    pool: Option<MySqlPool>,
    prepared: bool,
}

impl MySqlBackend {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: None,
            prepared: false,
        }
    }

    fn user(&self) -> &str {
        self.config.user.as_deref().unwrap_or("root")
    }

    /// MySQL scopes the catalog by database name.
    fn schema(&self) -> &str {
        &self.config.db_name
    }

    fn pool(&self) -> Result<&MySqlPool> {
        self.pool
            .as_ref()
            .ok_or_else(|| Error::Connection("not connected to MySQL".to_string()))
    }

    fn and_in_clause(field: &str, count: usize) -> String {
        if count == 0 {
            return String::new();
        }
        format!("AND {} IN ({})", field, vec!["?"; count].join(","))
    }
}

#[async_trait]
impl Backend for MySqlBackend {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn dsn(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user(),
            self.config.password.as_deref().unwrap_or_default(),
            self.config.host,
            self.config.port.unwrap_or(3306),
            self.config.db_name
        )
    }

    async fn connect(&mut self) -> Result<()> {
        let pool = MySqlPoolOptions::new()
            .max_connections(5)
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
            "{} {} ORDER BY table_name",
            LIST_TABLES_SQL,
            Self::and_in_clause("LOWER(table_name)", lowered.len())
        );

        let mut query = sqlx::query_scalar::<_, String>(&sql).bind(self.schema());
        for name in &lowered {
            query = query.bind(name);
        }

        let names = query.fetch_all(self.pool()?).await.map_err(|e| {
            tracing::error!(schema = self.schema(), "failed to list tables");
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
            .bind(self.schema())
            .fetch_all(self.pool()?)
            .await
            .map_err(|e| {
                tracing::error!(
                    schema = self.schema(),
                    table = %table.name,
                    "failed to fetch columns"
                );
                Error::query(self.schema(), Some(&table.name), e)
            })?;

        table.columns = rows
            .into_iter()
            .map(|row| Column {
                ordinal_position: row.ordinal_position as i32,
                name: row.column_name,
                data_type: row.data_type,
                default_value: row.column_default,
                is_nullable: row.is_nullable,
                char_max_length: row.character_maximum_length,
                numeric_precision: row.numeric_precision,
                constraint_name: None,
                constraint_type: row.column_key.filter(|key| !key.is_empty()),
                extra: row.extra.filter(|extra| !extra.is_empty()),
            })
            .collect();

        Ok(())
    }

    fn is_primary_key(&self, column: &Column) -> bool {
        column
            .constraint_type
            .as_deref()
            .map_or(false, |constraint| constraint.contains("PRI"))
    }

    fn is_auto_increment(&self, column: &Column) -> bool {
        column
            .extra
            .as_deref()
            .map_or(false, |extra| extra.contains("auto_increment"))
    }

    fn is_nullable(&self, column: &Column) -> bool {
        column.is_nullable == "YES"
    }

    fn string_datatypes(&self) -> &'static [&'static str] {
        &["char", "varchar", "enum", "set"]
    }

    fn text_datatypes(&self) -> &'static [&'static str] {
        &["text", "tinytext", "mediumtext", "longtext"]
    }

    fn integer_datatypes(&self) -> &'static [&'static str] {
        &["tinyint", "smallint", "mediumint", "int", "bigint"]
    }

    fn float_datatypes(&self) -> &'static [&'static str] {
        &["decimal", "numeric", "float", "double", "real"]
    }

    fn temporal_datatypes(&self) -> &'static [&'static str] {
        &["date", "datetime", "timestamp", "time", "year"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::TypeCategory;

    fn column(data_type: &str) -> Column {
        Column {
            ordinal_position: 1,
            name: "col".to_string(),
            data_type: data_type.to_string(),
            default_value: None,
            is_nullable: "NO".to_string(),
            char_max_length: None,
            numeric_precision: None,
            constraint_name: None,
            constraint_type: None,
            extra: None,
        }
    }

    fn backend() -> MySqlBackend {
        MySqlBackend::new(DatabaseConfig {
            driver: "mysql".to_string(),
            host: "localhost".to_string(),
            port: None,
            user: None,
            password: None,
            db_name: "test".to_string(),
            schema: None,
            socket: None,
            ssl_mode: "disable".to_string(),
            verbose: false,
        })
    }

    #[test]
    fn test_classification() {
        let backend = backend();
        assert_eq!(backend.classify(&column("VARCHAR")), TypeCategory::String);
        assert_eq!(
            backend.classify(&column("mediumtext")),
            TypeCategory::Text
        );
        assert_eq!(backend.classify(&column("bigint")), TypeCategory::Integer);
        assert_eq!(backend.classify(&column("double")), TypeCategory::Float);
        assert_eq!(backend.classify(&column("datetime")), TypeCategory::Temporal);
        assert_eq!(backend.classify(&column("geometry")), TypeCategory::Unknown);
    }

    #[test]
    fn test_primary_key_vocabulary() {
        let backend = backend();
        let mut col = column("int");
        col.constraint_type = Some("PRI".to_string());
        assert!(backend.is_primary_key(&col));

        col.constraint_type = Some("MUL".to_string());
        assert!(!backend.is_primary_key(&col));
    }

    #[test]
    fn test_auto_increment_from_extra() {
        let backend = backend();
        let mut col = column("int");
        col.extra = Some("auto_increment".to_string());
        assert!(backend.is_auto_increment(&col));

        col.extra = None;
        assert!(!backend.is_auto_increment(&col));
    }

    #[test]
    fn test_and_in_clause() {
        assert_eq!(
            MySqlBackend::and_in_clause("LOWER(table_name)", 3),
            "AND LOWER(table_name) IN (?,?,?)"
        );
    }
}
