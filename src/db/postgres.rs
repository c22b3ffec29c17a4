//! PostgreSQL backend
//!
//! Reads the standard information_schema catalog views. Identifiers are
//! lower-cased by convention; the schema scope defaults to `public`.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, FromRow, PgPool};

use crate::config::DatabaseConfig;
use crate::db::backend::Backend;
use crate::error::{Error, Result};
use crate::schema::types::{Column, Table};

const LIST_TABLES_SQL: &str = "
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_type = 'BASE TABLE'
    AND table_schema = $1
";

// Casts normalize the information_schema domain types (sql_identifier,
// cardinal_number) into plain text/int4 for row scanning.
const COLUMNS_SQL: &str = "
    SELECT
        ic.ordinal_position::int4 AS ordinal_position,
        ic.column_name::text AS column_name,
        ic.data_type::text AS data_type,
        ic.column_default::text AS column_default,
        ic.is_nullable::text AS is_nullable,
        ic.character_maximum_length::int4 AS character_maximum_length,
        ic.numeric_precision::int4 AS numeric_precision,
        itc.constraint_name::text AS constraint_name,
        itc.constraint_type::text AS constraint_type
    FROM information_schema.columns AS ic
        LEFT JOIN information_schema.key_column_usage AS ikcu ON ic.table_name = ikcu.table_name
        AND ic.table_schema = ikcu.table_schema
        AND ic.column_name = ikcu.column_name
        LEFT JOIN information_schema.table_constraints AS itc ON ic.table_name = itc.table_name
        AND ic.table_schema = itc.table_schema
        AND ikcu.constraint_name = itc.constraint_name
    WHERE ic.table_name = $1
    AND ic.table_schema = $2
    ORDER BY ic.ordinal_position
";

#[derive(FromRow)]
struct ColumnRow {
    ordinal_position: i32,
    column_name: String,
    data_type: String,
    column_default: Option<String>,
    is_nullable: String,
    character_maximum_length: Option<i32>,
    numeric_precision: Option<i32>,
    constraint_name: Option<String>,
    constraint_type: Option<String>,
}

/// PostgreSQL implementation of the [`Backend`] contract
pub struct PostgresBackend {
    config: DatabaseConfig,
    pool: Option<PgPool>,
    prepared: bool,
}

impl PostgresBackend {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: None,
            prepared: false,
        }
    }

    fn user(&self) -> &str {
        self.config.user.as_deref().unwrap_or("postgres")
    }

    fn schema(&self) -> &str {
        self.config.schema.as_deref().unwrap_or("public")
    }

    fn pool(&self) -> Result<&PgPool> {
        self.pool
            .as_ref()
            .ok_or_else(|| Error::Connection("not connected to PostgreSQL".to_string()))
    }

    /// Build an `AND ... IN ($n,...)` clause continuing the positional
    /// placeholder numbering after `offset` bound arguments.
    fn and_in_clause(field: &str, count: usize, offset: usize) -> String {
        if count == 0 {
            return String::new();
        }
        let placeholders: Vec<String> = (1..=count).map(|i| format!("${}", offset + i)).collect();
        format!("AND {} IN ({})", field, placeholders.join(","))
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn dsn(&self) -> String {
        let user = self.user();
        let password = self.config.password.as_deref().unwrap_or_default();
        let port = self.config.port.unwrap_or(5432);

        if let Some(socket) = &self.config.socket {
            return format!(
                "postgres://{}:{}@?host={}&port={}&dbname={}&sslmode={}",
                user, password, socket, port, self.config.db_name, self.config.ssl_mode
            );
        }
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            user, password, self.config.host, port, self.config.db_name, self.config.ssl_mode
        )
    }

    async fn connect(&mut self) -> Result<()> {
        let pool = PgPoolOptions::new()
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
            Self::and_in_clause("LOWER(table_name)", lowered.len(), 1)
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
                ordinal_position: row.ordinal_position,
                name: row.column_name,
                data_type: row.data_type,
                default_value: row.column_default,
                is_nullable: row.is_nullable,
                char_max_length: row.character_maximum_length.map(i64::from),
                numeric_precision: row.numeric_precision.map(i64::from),
                constraint_name: row.constraint_name,
                constraint_type: row.constraint_type,
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

    fn is_auto_increment(&self, column: &Column) -> bool {
        column
            .default_value
            .as_deref()
            .map_or(false, |default| default.contains("nextval"))
    }

    fn is_nullable(&self, column: &Column) -> bool {
        column.is_nullable == "YES"
    }

    fn string_datatypes(&self) -> &'static [&'static str] {
        &["character varying", "varchar", "character", "char", "uuid"]
    }

    fn text_datatypes(&self) -> &'static [&'static str] {
        &["text"]
    }

    fn integer_datatypes(&self) -> &'static [&'static str] {
        &[
            "smallint",
            "integer",
            "bigint",
            "smallserial",
            "serial",
            "bigserial",
        ]
    }

    fn float_datatypes(&self) -> &'static [&'static str] {
        &["numeric", "decimal", "real", "double precision"]
    }

    fn temporal_datatypes(&self) -> &'static [&'static str] {
        &[
            "time",
            "timestamp",
            "time with time zone",
            "timestamp with time zone",
            "time without time zone",
            "timestamp without time zone",
            "date",
        ]
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

    fn backend() -> PostgresBackend {
        PostgresBackend::new(DatabaseConfig {
            driver: "postgres".to_string(),
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
        assert_eq!(
            backend.classify(&column("character varying")),
            TypeCategory::String
        );
        assert_eq!(backend.classify(&column("text")), TypeCategory::Text);
        assert_eq!(backend.classify(&column("bigint")), TypeCategory::Integer);
        assert_eq!(
            backend.classify(&column("double precision")),
            TypeCategory::Float
        );
        assert_eq!(
            backend.classify(&column("timestamp with time zone")),
            TypeCategory::Temporal
        );
        assert_eq!(backend.classify(&column("bytea")), TypeCategory::Unknown);
    }

    #[test]
    fn test_nullable_sentinel_is_exact() {
        let backend = backend();
        let mut col = column("integer");
        col.is_nullable = "YES".to_string();
        assert!(backend.is_nullable(&col));

        for other in ["NO", "yes", "Y", "", "1"] {
            col.is_nullable = other.to_string();
            assert!(!backend.is_nullable(&col));
        }
    }

    #[test]
    fn test_auto_increment_detects_sequence_default() {
        let backend = backend();
        let mut col = column("integer");
        col.default_value = Some("nextval('customers_id_seq'::regclass)".to_string());
        assert!(backend.is_auto_increment(&col));

        col.default_value = Some("0".to_string());
        assert!(!backend.is_auto_increment(&col));
    }

    #[test]
    fn test_and_in_clause_numbering() {
        assert_eq!(
            PostgresBackend::and_in_clause("LOWER(table_name)", 2, 1),
            "AND LOWER(table_name) IN ($2,$3)"
        );
        assert_eq!(PostgresBackend::and_in_clause("x", 0, 1), "");
    }

    #[test]
    fn test_dsn_with_socket() {
        let mut backend = backend();
        backend.config.socket = Some("/var/run/postgresql".to_string());
        assert!(backend.dsn().starts_with("postgres://postgres:@?host="));
    }
}
