use thiserror::Error;

/// Unified error type for bumpcalver operations
#[derive(Error, Debug)]
pub enum BumpCalverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version format error: {0}")]
    Template(String),

    #[error("Date format error: {0}")]
    DateFormat(String),

    #[error("File handler error: {0}")]
    Handler(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("History store error: {0}")]
    History(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in bumpcalver
pub type Result<T> = std::result::Result<T, BumpCalverError>;

impl BumpCalverError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        BumpCalverError::Config(msg.into())
    }

    /// Create a version-format template error with context
    pub fn template(msg: impl Into<String>) -> Self {
        BumpCalverError::Template(msg.into())
    }

    /// Create a date format error with context
    pub fn date_format(msg: impl Into<String>) -> Self {
        BumpCalverError::DateFormat(msg.into())
    }

    /// Create a file handler error with context
    pub fn handler(msg: impl Into<String>) -> Self {
        BumpCalverError::Handler(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BumpCalverError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BumpCalverError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: BumpCalverError = json_err.into();
        assert!(err.to_string().starts_with("History store error"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (BumpCalverError::config("x"), "Configuration error"),
            (BumpCalverError::template("x"), "Version format error"),
            (BumpCalverError::date_format("x"), "Date format error"),
            (BumpCalverError::handler("x"), "File handler error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_error_empty_messages() {
        let errors = vec![
            BumpCalverError::config(""),
            BumpCalverError::template(""),
            BumpCalverError::handler(""),
        ];

        for err in errors {
            // Even with empty message, the error type prefix should be present
            assert!(!err.to_string().is_empty());
        }
    }
}
