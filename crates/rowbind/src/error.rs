//! Error types for rowbind

use thiserror::Error;

/// Result type alias for rowbind operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Boxed driver error, kept as the `source` of connection/prepare/execute failures.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for mapping and database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// A field descriptor is neither a bare name nor a recognized options pair
    #[error("Invalid field spec: {0}")]
    InvalidFieldSpec(String),

    /// A row type declares no field descriptors
    #[error("Missing field metadata for record type {0}")]
    MissingFieldMetadata(&'static str),

    /// More than one field is marked as the primary key
    #[error("Duplicate primary key: both '{first}' and '{second}' are marked primary")]
    DuplicatePrimaryKey { first: String, second: String },

    /// No primary key value is available and the key is not auto-generated
    #[error("Missing primary key value for '{0}'")]
    MissingPrimaryKey(String),

    /// A required field has no value at save time
    #[error("Required field '{0}' has no value")]
    RequiredFieldMissing(String),

    /// The write set is empty or its columns and values disagree in length
    #[error("Invalid save state: {columns} column(s), {values} value(s)")]
    InvalidSaveState { columns: usize, values: usize },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(#[source] DriverError),

    /// Statement preparation error
    #[error("Prepare error: {0}")]
    Prepare(#[source] DriverError),

    /// Statement execution error
    #[error("Execute error: {0}")]
    Execute(#[source] DriverError),

    /// Value decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl OrmError {
    /// Create an invalid field spec error
    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self::InvalidFieldSpec(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a connection error from any driver error
    pub fn connection(err: impl Into<DriverError>) -> Self {
        Self::Connection(err.into())
    }

    /// Create a prepare error from any driver error
    pub fn prepare(err: impl Into<DriverError>) -> Self {
        Self::Prepare(err.into())
    }

    /// Create an execute error from any driver error
    pub fn execute(err: impl Into<DriverError>) -> Self {
        Self::Execute(err.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error came from the driver layer
    pub fn is_driver_error(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Prepare(_) | Self::Execute(_)
        )
    }
}
