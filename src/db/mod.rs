//! Database module for table_forge
//!
//! Holds the per-product backends and the dialect registry that maps a
//! configured driver identifier to its backend constructor.

pub mod backend;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

pub use backend::Backend;
pub use mysql::MySqlBackend;
pub use oracle::OracleBackend;
pub use postgres::PostgresBackend;
pub use sqlite::SqliteBackend;

/// One registered dialect: driver name plus backend constructor
pub struct DialectEntry {
    pub driver: &'static str,
    constructor: fn(DatabaseConfig) -> Box<dyn Backend>,
}

/// Frozen process-wide dialect registry; built once, never mutated.
static DIALECTS: Lazy<HashMap<&'static str, DialectEntry>> = Lazy::new(|| {
    let mut dialects: HashMap<&'static str, DialectEntry> = HashMap::new();
    dialects.insert(
        "postgres",
        DialectEntry {
            driver: "postgres",
            constructor: |config| Box::new(PostgresBackend::new(config)),
        },
    );
    dialects.insert(
        "mysql",
        DialectEntry {
            driver: "mysql",
            constructor: |config| Box::new(MySqlBackend::new(config)),
        },
    );
    dialects.insert(
        "sqlite",
        DialectEntry {
            driver: "sqlite",
            constructor: |config| Box::new(SqliteBackend::new(config)),
        },
    );
    dialects.insert(
        "oracle",
        DialectEntry {
            driver: "oracle",
            constructor: |config| Box::new(OracleBackend::new(config)),
        },
    );
    dialects
});

/// Look up the driver name for a configured database identifier
pub fn driver_name(db_type: &str) -> Option<&'static str> {
    DIALECTS.get(db_type).map(|entry| entry.driver)
}

/// Construct the backend for the configured database product.
///
/// Fails with [`Error::UnsupportedDatabase`] before any connection attempt
/// when the identifier has no registered dialect.
pub fn new_backend(config: &DatabaseConfig) -> Result<Box<dyn Backend>> {
    let entry = DIALECTS
        .get(config.driver.as_str())
        .ok_or_else(|| Error::UnsupportedDatabase(config.driver.clone()))?;

    Ok((entry.constructor)(config.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(driver: &str) -> DatabaseConfig {
        DatabaseConfig {
            driver: driver.to_string(),
            host: "localhost".to_string(),
            port: None,
            user: None,
            password: None,
            db_name: "test".to_string(),
            schema: None,
            socket: None,
            ssl_mode: "disable".to_string(),
            verbose: false,
        }
    }

    #[test]
    fn test_registered_dialects() {
        for driver in ["postgres", "mysql", "sqlite", "oracle"] {
            assert_eq!(driver_name(driver), Some(driver));
            let backend = new_backend(&config(driver)).unwrap();
            assert_eq!(backend.name(), driver);
        }
    }

    #[test]
    fn test_unsupported_database() {
        let err = new_backend(&config("mssql")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDatabase(name) if name == "mssql"));
    }
}
