//! Error types for tabex

use thiserror::Error;

/// Main error type for tabex
#[derive(Debug, Error)]
pub enum TabexError {
    /// No formatter registered under the requested tag
    #[error("Unknown export format: {0}")]
    UnknownExportFormat(String),

    /// Descriptor shape is not a list of leaves and single-key groups
    #[error("Malformed descriptor: {0}")]
    MalformedDescriptor(String),

    /// A chain segment could not be resolved against a record
    #[error("Accessor '{segment}' not found on record {record} (chain '{chain}')")]
    AccessorNotFound {
        record: usize,
        chain: String,
        segment: String,
    },

    /// Presenter registration without a usable target type
    #[error("Invalid presenter: {0} must declare a target type")]
    InvalidPresenter(String),

    /// Strict registry refused a second registration for a tag
    #[error("Format already registered: {0}")]
    DuplicateFormat(String),

    /// Type declaration would break the is-a hierarchy
    #[error("Invalid type hierarchy: {0}")]
    InvalidTypeHierarchy(String),

    /// Encoder failure
    #[error("Failed to encode {format}: {message}")]
    Encode { format: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<TabexError>,
    },
}

impl TabexError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        TabexError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build an encoder error for the given format
    pub fn encode(format: impl Into<String>, message: impl ToString) -> Self {
        TabexError::Encode {
            format: format.into(),
            message: message.to_string(),
        }
    }
}

impl From<toml::de::Error> for TabexError {
    fn from(err: toml::de::Error) -> Self {
        TabexError::Toml(err.to_string())
    }
}

/// Result type alias for tabex
pub type Result<T> = std::result::Result<T, TabexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TabexError::UnknownExportFormat("pdf".to_string());
        assert_eq!(err.to_string(), "Unknown export format: pdf");
    }

    #[test]
    fn test_accessor_not_found_display() {
        let err = TabexError::AccessorNotFound {
            record: 3,
            chain: "address.city".to_string(),
            segment: "city".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("record 3"));
        assert!(msg.contains("address.city"));
    }

    #[test]
    fn test_error_with_context() {
        let err = TabexError::MalformedDescriptor("empty name".to_string());
        let err = err.with_context("Failed to load descriptor");
        assert!(err.to_string().contains("Failed to load descriptor"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TabexError = io_err.into();
        assert!(matches!(err, TabexError::Io(_)));
    }
}
