//! Error types and handling for the `EventCast` application

use thiserror::Error;

/// Main error type for the `EventCast` application
#[derive(Error, Debug)]
pub enum EventCastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Weather provider communication errors
    #[error("Weather data unavailable: {message}")]
    Provider { message: String },

    /// Weather provider rate limit hit; retry later
    #[error("Weather provider temporarily unavailable: {message}")]
    RateLimited { message: String },

    /// Location could not be resolved to coordinates
    #[error("Location not found: {location}")]
    LocationNotFound { location: String },

    /// A requested record does not exist
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Event store persistence errors
    #[error("Store error: {message}")]
    Store { message: String },

    /// Notification delivery errors
    #[error("Notification error: {message}")]
    Notification { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl EventCastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new weather provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new rate-limit error
    pub fn rate_limited<S: Into<String>>(message: S) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(location: S) -> Self {
        Self::LocationNotFound {
            location: location.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a new notification error
    pub fn notification<S: Into<String>>(message: S) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Whether this failure is transient and worth retrying later
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EventCastError::RateLimited { .. } | EventCastError::Provider { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            EventCastError::Config { .. } => {
                "Configuration error. Please check your config file and SMTP settings.".to_string()
            }
            EventCastError::Provider { .. } => {
                "Weather data is currently unavailable. Please try again later.".to_string()
            }
            EventCastError::RateLimited { .. } => {
                "The weather service is rate limiting requests. Please try again in a few minutes."
                    .to_string()
            }
            EventCastError::LocationNotFound { location } => {
                format!("No coordinates found for location '{location}'.")
            }
            EventCastError::NotFound { what } => {
                format!("{what} not found.")
            }
            EventCastError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            EventCastError::Store { .. } => {
                "Event storage failed. Please check file permissions.".to_string()
            }
            EventCastError::Notification { .. } => {
                "Email notification could not be delivered.".to_string()
            }
            EventCastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            EventCastError::General { message } => message.clone(),
        }
    }
}
