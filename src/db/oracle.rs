//! Oracle backend
//!
//! Oracle has no information_schema; tables come from the `ALL_OBJECTS`
//! data dictionary view and columns from `ALL_TAB_COLUMNS`, with primary
//! keys joined in from `ALL_CONSTRAINTS` (constraint type `'P'`). The
//! catalog upper-cases identifiers, so filters and the owner scope are
//! upper-cased before binding.
//!
//! This backend drives the blocking `oracle` driver directly; the pipeline
//! issues one bounded batch of metadata queries, so no executor handoff is
//! needed.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use oracle::sql_type::ToSql;
use oracle::Connection;

use crate::config::DatabaseConfig;
use crate::db::backend::Backend;
use crate::error::{Error, Result};
use crate::schema::types::{Column, Table};

const LIST_TABLES_SQL: &str = "
    SELECT DISTINCT object_name
    FROM all_objects
    WHERE object_type = 'TABLE'
    AND owner = :1
";

const COLUMNS_SQL: &str = "
    SELECT
        c.column_id,
        c.column_name,
        c.data_type,
        c.data_default,
        c.nullable,
        c.char_length,
        c.data_precision,
        cons.constraint_name,
        cons.constraint_type
    FROM all_tab_columns c
    LEFT JOIN (
        SELECT acc.column_name, ac.constraint_name, ac.constraint_type
        FROM all_cons_columns acc
        JOIN all_constraints ac
            ON ac.constraint_name = acc.constraint_name
            AND ac.owner = acc.owner
        WHERE ac.constraint_type = 'P'
        AND ac.table_name = :1
        AND ac.owner = :2
    ) cons ON cons.column_name = c.column_name
    WHERE c.table_name = :3
    AND c.owner = :4
    ORDER BY c.column_id
";

/// Oracle implementation of the [`Backend`] contract
pub struct OracleBackend {
    config: DatabaseConfig,
    conn: Option<Mutex<Connection>>,
    prepared: bool,
}

impl OracleBackend {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            conn: None,
            prepared: false,
        }
    }

    fn user(&self) -> &str {
        self.config.user.as_deref().unwrap_or("system")
    }

    /// The owner scope defaults to the connected user, upper-cased per
    /// Oracle convention.
    fn owner(&self) -> String {
        self.config
            .schema
            .as_deref()
            .unwrap_or_else(|| self.user())
            .to_uppercase()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| Error::Connection("not connected to Oracle".to_string()))?;
        conn.lock()
            .map_err(|_| Error::Connection("Oracle connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl Backend for OracleBackend {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn dsn(&self) -> String {
        format!(
            "//{}:{}/{}",
            self.config.host,
            self.config.port.unwrap_or(1521),
            self.config.db_name
        )
    }

    async fn connect(&mut self) -> Result<()> {
        let password = self.config.password.clone().unwrap_or_default();
        let conn = Connection::connect(self.user(), password, self.dsn())
            .map_err(|e| Error::Connection(e.to_string()))?;

        self.conn = Some(Mutex::new(conn));
        Ok(())
    }

    async fn close(&mut self) {
        // dropping the connection closes the session
        self.conn = None;
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        self.conn()?
            .execute(sql, &[])
            .map_err(|e| Error::query(&self.owner(), None, e))?;
        Ok(())
    }

    async fn list_tables(&self, filter: &[String]) -> Result<Vec<Table>> {
        let owner = self.owner();
        let uppered: Vec<String> = filter.iter().map(|name| name.to_uppercase()).collect();

        let mut sql = LIST_TABLES_SQL.to_string();
        if !uppered.is_empty() {
            let placeholders: Vec<String> =
                (0..uppered.len()).map(|i| format!(":{}", i + 2)).collect();
            sql.push_str(&format!(
                "AND object_name IN ({})\n",
                placeholders.join(",")
            ));
        }
        sql.push_str("    ORDER BY object_name");

        let mut params: Vec<&dyn ToSql> = vec![&owner];
        for name in &uppered {
            params.push(name);
        }

        let conn = self.conn()?;
        let rows = conn.query(&sql, &params).map_err(|e| {
            tracing::error!(owner = %owner, "failed to list tables");
            Error::query(&owner, None, e)
        })?;

        let mut tables = Vec::new();
        for row in rows {
            let row = row.map_err(|e| Error::query(&owner, None, e))?;
            let name: String = row
                .get(0)
                .map_err(|e| Error::query(&owner, None, e))?;
            tables.push(Table::new(&name));
        }

        Ok(tables)
    }

    async fn prepare_column_fetch(&mut self) -> Result<()> {
        self.conn()?
            .statement(COLUMNS_SQL)
            .build()
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

        let owner = self.owner();
        let table_name = table.name.clone();
        let on_error = |e: oracle::Error| {
            tracing::error!(owner = %owner, table = %table_name, "failed to fetch columns");
            Error::query(&owner, Some(&table_name), e)
        };

        let conn = self.conn()?;
        let rows = conn
            .query(
                COLUMNS_SQL,
                &[&table_name, &owner, &table_name, &owner],
            )
            .map_err(on_error)?;

        let mut columns = Vec::new();
        for row in rows {
            let row = row.map_err(on_error)?;
            columns.push(Column {
                ordinal_position: row.get(0).map_err(on_error)?,
                name: row.get(1).map_err(on_error)?,
                data_type: row.get(2).map_err(on_error)?,
                default_value: row.get(3).map_err(on_error)?,
                is_nullable: row.get(4).map_err(on_error)?,
                char_max_length: row.get(5).map_err(on_error)?,
                numeric_precision: row.get(6).map_err(on_error)?,
                constraint_name: row.get(7).map_err(on_error)?,
                constraint_type: row.get(8).map_err(on_error)?,
                extra: None,
            });
        }

        table.columns = columns;
        Ok(())
    }

    fn is_primary_key(&self, column: &Column) -> bool {
        column
            .constraint_type
            .as_deref()
            .map_or(false, |constraint| constraint.contains('P'))
    }

    fn is_auto_increment(&self, _column: &Column) -> bool {
        // Oracle uses sequences and triggers instead of an identity marker
        false
    }

    fn is_nullable(&self, column: &Column) -> bool {
        column.is_nullable == "Y"
    }

    fn string_datatypes(&self) -> &'static [&'static str] {
        &["CHAR", "VARCHAR2", "NCHAR", "NVARCHAR2"]
    }

    fn text_datatypes(&self) -> &'static [&'static str] {
        &["CLOB", "NCLOB"]
    }

    fn integer_datatypes(&self) -> &'static [&'static str] {
        // NUMBER also appears in the float list; the ordered classification
        // resolves it as integer. A precision/scale-based split is a known
        // follow-up, not something to fix silently here.
        &["NUMBER", "INTEGER", "SMALLINT"]
    }

    fn float_datatypes(&self) -> &'static [&'static str] {
        &[
            "FLOAT",
            "BINARY_FLOAT",
            "BINARY_DOUBLE",
            "DECIMAL",
            "NUMBER",
            "REAL",
            "DOUBLE PRECISION",
        ]
    }

    fn temporal_datatypes(&self) -> &'static [&'static str] {
        &[
            "DATE",
            "TIMESTAMP",
            "TIMESTAMP WITH TIME ZONE",
            "TIMESTAMP WITH LOCAL TIME ZONE",
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
            name: "COL".to_string(),
            data_type: data_type.to_string(),
            default_value: None,
            is_nullable: "N".to_string(),
            char_max_length: None,
            numeric_precision: None,
            constraint_name: None,
            constraint_type: None,
            extra: None,
        }
    }

    fn backend() -> OracleBackend {
        OracleBackend::new(DatabaseConfig {
            driver: "oracle".to_string(),
            host: "localhost".to_string(),
            port: None,
            user: Some("scott".to_string()),
            password: None,
            db_name: "XEPDB1".to_string(),
            schema: None,
            socket: None,
            ssl_mode: "disable".to_string(),
            verbose: false,
        })
    }

    #[test]
    fn test_number_classifies_integer_before_float() {
        // NUMBER is listed under both integer and float datatypes; the
        // ordered checks must resolve it as integer.
        let backend = backend();
        assert!(backend.is_integer(&column("NUMBER")));
        assert!(backend.is_float(&column("NUMBER")));
        assert_eq!(backend.classify(&column("NUMBER")), TypeCategory::Integer);
    }

    #[test]
    fn test_classification() {
        let backend = backend();
        assert_eq!(backend.classify(&column("VARCHAR2")), TypeCategory::String);
        assert_eq!(backend.classify(&column("NCLOB")), TypeCategory::Text);
        assert_eq!(
            backend.classify(&column("BINARY_DOUBLE")),
            TypeCategory::Float
        );
        assert_eq!(
            backend.classify(&column("TIMESTAMP WITH TIME ZONE")),
            TypeCategory::Temporal
        );
        assert_eq!(backend.classify(&column("RAW")), TypeCategory::Unknown);
        // classification is case-insensitive even though Oracle upper-cases
        assert_eq!(backend.classify(&column("varchar2")), TypeCategory::String);
    }

    #[test]
    fn test_nullable_sentinel() {
        let backend = backend();
        let mut col = column("NUMBER");
        col.is_nullable = "Y".to_string();
        assert!(backend.is_nullable(&col));

        for other in ["N", "YES", "y", ""] {
            col.is_nullable = other.to_string();
            assert!(!backend.is_nullable(&col));
        }
    }

    #[test]
    fn test_owner_defaults_to_user_uppercased() {
        let backend = backend();
        assert_eq!(backend.owner(), "SCOTT");
    }
}
