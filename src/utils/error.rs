use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Store access failed for collection '{collection}': {message}")]
    StoreAccess { collection: String, message: String },

    #[error("Schema error: {table} table has no '{column}' column")]
    Schema { table: String, column: String },

    #[error("Cannot coerce field '{field}' from value '{value}'")]
    ValueCoercion { field: String, value: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Store,
    Schema,
    Data,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn store_access(collection: &str, message: impl Into<String>) -> Self {
        Self::StoreAccess {
            collection: collection.to_string(),
            message: message.into(),
        }
    }

    pub fn schema(table: &str, column: &str) -> Self {
        Self::Schema {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StoreAccess { .. } | Self::ApiError(_) => ErrorCategory::Store,
            Self::Schema { .. } => ErrorCategory::Schema,
            Self::ValueCoercion { .. } | Self::SerializationError(_) => ErrorCategory::Data,
            Self::ZipError(_) | Self::CsvError(_) | Self::IoError(_) => ErrorCategory::Output,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Store => ErrorSeverity::Medium,
            ErrorCategory::Schema | ErrorCategory::Output => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Store => "Check that the store is reachable and the credentials are valid, then retry",
            ErrorCategory::Schema => "Make sure both collections carry an animal_id field",
            ErrorCategory::Data => "Inspect the offending field in the source documents",
            ErrorCategory::Output => "Check that the output path exists and is writable",
            ErrorCategory::Configuration => "Review the command line flags or the TOML configuration file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::StoreAccess { collection, .. } => {
                format!("Could not read the '{}' collection", collection)
            }
            Self::Schema { table, column } => {
                format!("The {} records have no '{}' column, nothing can be joined", table, column)
            }
            Self::MissingConfigError { field } => format!("'{}' must be set", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
