//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Failures from the inference services are classified so the user sees a
//! meaningful message instead of a raw transport error.
//!
//! ## Error Categories
//!
//! - **Network**: Connectivity issues (service down, timeout)
//! - **Auth**: Missing or rejected API token
//! - **RateLimit**: Service is throttling requests
//! - **Unavailable**: Model not loaded or server error
//! - **BadRequest**: Service rejected the request payload
//! - **ParseError**: Response body did not match the expected shape
//!
//! Nothing here triggers a retry. Every failure is scoped to one interaction
//! and the user decides whether to try again.

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for service failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network/connectivity issues
    Network,
    /// Authentication failed
    Auth,
    /// Rate limited by the service
    RateLimit,
    /// Service or model unavailable
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Response could not be parsed
    ParseError,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "NETWORK"),
            Self::Auth => write!(f, "AUTH"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Short hint shown next to the error in the CLI
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Network => Some("Is the inference service running and reachable?"),
            Self::Auth => Some("Check the API token in your configuration."),
            Self::RateLimit => Some("The service is throttling requests; wait a moment."),
            Self::Unavailable => Some("The model may still be loading; try again shortly."),
            _ => None,
        }
    }
}

// =============================================================================
// Service Error
// =============================================================================

/// Failure reported by an external classification or generation service
#[derive(Debug, Clone)]
pub struct ServiceError {
    /// Error category for display decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Service that produced the error
    pub service: Option<String>,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(service) = &self.service {
            write!(f, "[{}:{}] {}", service, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            service: None,
        }
    }

    pub fn with_service(
        category: ErrorCategory,
        message: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            service: Some(service.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps transport failures and HTTP statuses to categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code returned by a service
    pub fn classify_http_status(status: u16, message: &str, service: &str) -> ServiceError {
        let category = match status {
            401 | 403 => ErrorCategory::Auth,
            429 => ErrorCategory::RateLimit,
            400 | 404 | 413 | 422 => ErrorCategory::BadRequest,
            500..=599 => ErrorCategory::Unavailable,
            _ => ErrorCategory::Unknown,
        };
        ServiceError::with_service(category, message, service)
    }

    /// Classify a reqwest transport error
    pub fn classify_transport(err: &reqwest::Error, service: &str) -> ServiceError {
        let category = if err.is_connect() || err.is_timeout() {
            ErrorCategory::Network
        } else if err.is_decode() {
            ErrorCategory::ParseError
        } else if let Some(status) = err.status() {
            return Self::classify_http_status(status.as_u16(), &err.to_string(), service);
        } else {
            ErrorCategory::Unknown
        };
        ServiceError::with_service(category, err.to_string(), service)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum EchoError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Service Errors
    // -------------------------------------------------------------------------
    #[error("Classification error: {0}")]
    Classification(ServiceError),

    #[error("Generation error: {0}")]
    Generation(ServiceError),

    #[error("Service error: {0}")]
    Service(ServiceError),

    // -------------------------------------------------------------------------
    // Interaction Errors
    // -------------------------------------------------------------------------
    #[error("Please enter a prompt.")]
    EmptyInput,

    #[error("Invalid {name}: {value} (expected {expected})")]
    InvalidSetting {
        name: &'static str,
        value: String,
        expected: String,
    },

    #[error("Nothing to regenerate yet: send a message first")]
    NoInteraction,
}

impl From<ServiceError> for EchoError {
    fn from(err: ServiceError) -> Self {
        EchoError::Service(err)
    }
}

pub type Result<T> = std::result::Result<T, EchoError>;

impl EchoError {
    /// Errors the user can fix by changing their input (shown as warnings)
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::InvalidSetting { .. } | Self::NoInteraction
        )
    }

    /// Underlying service error, if this failure came from a service call
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Classification(e) | Self::Generation(e) | Self::Service(e) => Some(e),
            _ => None,
        }
    }

    /// Re-tag a generic service failure as a classification failure
    pub fn into_classification(self) -> Self {
        match self {
            Self::Service(e) | Self::Generation(e) => Self::Classification(e),
            other => other,
        }
    }

    /// Re-tag a generic service failure as a generation failure
    pub fn into_generation(self) -> Self {
        match self {
            Self::Service(e) | Self::Classification(e) => Self::Generation(e),
            other => other,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
