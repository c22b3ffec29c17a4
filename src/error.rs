//! Error types for table_forge

use thiserror::Error;

/// Result type for table_forge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for table_forge
///
/// Schema generation is an all-or-nothing batch operation, so every variant
/// is fatal and propagated to the top-level caller unmodified.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unsupported database type: {0}")]
    UnsupportedDatabase(String),

    #[error("Prepare error: {0}")]
    Prepare(String),

    #[error("Query error ({scope}): {message}")]
    Query { scope: String, message: String },

    #[error("Unknown tag generator: {0}")]
    UnknownTagGenerator(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `Query` error scoped to a schema/owner and, optionally, a table.
    pub fn query(schema: &str, table: Option<&str>, message: impl ToString) -> Self {
        let scope = match table {
            Some(table) => format!("schema {:?}, table {:?}", schema, table),
            None => format!("schema {:?}", schema),
        };
        Error::Query {
            scope,
            message: message.to_string(),
        }
    }
}

/// Convert TOML deserialization errors to table_forge errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::Config(error.to_string())
    }
}
