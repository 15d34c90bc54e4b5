//! Error types for the word book client.

use thiserror::Error;

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Not authenticated - please log in")]
    Unauthorized,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] wordbook_core::CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordbook_core::CoreError;

    #[test]
    fn test_error_display_backend() {
        let error = ClientError::Backend {
            status: 500,
            message: "数据库异常".to_string(),
        };
        assert_eq!(error.to_string(), "Backend error: 500 - 数据库异常");
    }

    #[test]
    fn test_error_display_unauthorized() {
        assert_eq!(
            ClientError::Unauthorized.to_string(),
            "Not authenticated - please log in"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let error: ClientError = CoreError::UnknownWord("42".to_string()).into();
        assert_eq!(error.to_string(), "unknown word 42");
    }
}
