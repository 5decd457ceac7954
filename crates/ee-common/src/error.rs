//! Error types for the imagery pipeline.

use thiserror::Error;

/// Result type alias using EeError.
pub type EeResult<T> = Result<T, EeError>;

/// Primary error type for expression building, service calls and map output.
#[derive(Debug, Clone, Error)]
pub enum EeError {
    // === Local Argument Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Remote Service Errors ===
    #[error("Service error {code} ({status}): {message}")]
    Service {
        code: u16,
        status: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode service response: {0}")]
    Decode(String),

    // === Region Selection ===
    #[error("No region matches {property} = '{value}'")]
    RegionNotFound { property: String, value: String },

    #[error("{count} regions match {property} = '{value}', expected exactly one")]
    RegionNotUnique {
        property: String,
        value: String,
        count: u64,
    },

    // === Output Errors ===
    #[error("Map rendering failed: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl EeError {
    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        EeError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// True when the failure was reported by (or while reaching) the remote service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            EeError::Service { .. } | EeError::Transport(_) | EeError::Decode(_)
        )
    }

    /// HTTP status code carried by a service error, if any.
    pub fn http_status_code(&self) -> Option<u16> {
        match self {
            EeError::Service { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EeError {
    fn from(err: std::io::Error) -> Self {
        EeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EeError {
    fn from(err: serde_json::Error) -> Self {
        EeError::Decode(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = EeError::Service {
            code: 400,
            status: "INVALID_ARGUMENT".to_string(),
            message: "Image.select: Pattern 'B9' did not match any bands.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Service error 400 (INVALID_ARGUMENT): Image.select: Pattern 'B9' did not match any bands."
        );
        assert!(err.is_remote());
        assert_eq!(err.http_status_code(), Some(400));
    }

    #[test]
    fn test_local_errors_are_not_remote() {
        let err = EeError::invalid("min", "must be finite");
        assert!(!err.is_remote());
        assert_eq!(err.http_status_code(), None);

        let err = EeError::RegionNotUnique {
            property: "country_na".to_string(),
            value: "Congo".to_string(),
            count: 2,
        };
        assert!(err.to_string().contains("expected exactly one"));
    }
}
