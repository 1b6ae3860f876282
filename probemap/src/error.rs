use thiserror::Error;

/// Errors that can occur when writing to a probe table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// No slot could be resolved within one full probe cycle,
    /// or the load ceiling refused to extend a collision chain
    #[error("Table full: no free slot among {capacity} slots")]
    TableFull { capacity: usize },

    /// Keys must be non-negative
    #[error("Invalid key: {0}")]
    InvalidKey(i64),

    /// Invalid construction parameters
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TableError>;

impl From<String> for TableError {
    fn from(msg: String) -> Self {
        TableError::InvalidConfig(msg)
    }
}

impl From<&str> for TableError {
    fn from(msg: &str) -> Self {
        TableError::InvalidConfig(msg.to_string())
    }
}
