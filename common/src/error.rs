//! Error types for the matching core

use thiserror::Error;

/// Common error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Duplicate member id: {0}")]
    DuplicateMember(String),
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let error = Error::Config("min_confidence must be within 0.0..=1.0".to_string());
        let display = format!("{}", error);
        assert_eq!(display, "Config error: min_confidence must be within 0.0..=1.0");
    }

    #[test]
    fn test_error_display_duplicate_member() {
        let error = Error::DuplicateMember("M001".to_string());
        assert_eq!(error.to_string(), "Duplicate member id: M001");
    }

    #[test]
    fn test_error_debug() {
        let error = Error::Config("test".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("Config"));
        assert!(debug.contains("test"));
    }
}
