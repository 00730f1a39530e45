//! Error types for identity verification against the identity core.
//!
//! HTTP status codes are stored as [`HttpStatusCode`] and `is_retryable()`
//! classifies on them, never on message text.

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum IdentityError {
    #[error("No Credential Error: no signed-in user to verify {location}")]
    NoCredential { location: ErrorLocation },

    #[error("Identity Rejected Error: HTTP {status_code} - {message} {location}")]
    Rejected {
        status_code: HttpStatusCode,
        message: String,
        location: ErrorLocation,
    },

    #[error("Identity Network Error: {message} {location}")]
    Network {
        message: String,
        is_timeout: bool,
        is_connection: bool,
        location: ErrorLocation,
    },

    #[error("Identity Configuration Error: {message} {location}")]
    Configuration {
        message: String,
        location: ErrorLocation,
    },

    #[error("Identity Cancelled Error {location}")]
    Cancelled { location: ErrorLocation },
}

impl IdentityError {
    #[track_caller]
    pub fn no_credential() -> Self {
        IdentityError::NoCredential {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn cancelled() -> Self {
        IdentityError::Cancelled {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn configuration(message: impl Into<String>) -> Self {
        IdentityError::Configuration {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn rejected(status_code: u16, body: impl Into<String>) -> Self {
        IdentityError::Rejected {
            status_code: HttpStatusCode(status_code),
            message: body.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create from a reqwest error, classifying it before it is stringified.
    #[track_caller]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let is_timeout = error.is_timeout();
        let is_connect = error.is_connect();

        if !is_timeout && !is_connect {
            if let Some(status) = error.status() {
                return IdentityError::Rejected {
                    status_code: HttpStatusCode(status.as_u16()),
                    message: error.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                };
            }
        }

        IdentityError::Network {
            message: error.to_string(),
            is_timeout,
            is_connection: is_connect,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            IdentityError::Network {
                is_timeout,
                is_connection,
                ..
            } => *is_timeout || *is_connection,
            IdentityError::Rejected { status_code, .. } => status_code.is_retryable(),
            IdentityError::NoCredential { .. } => false,
            IdentityError::Configuration { .. } => false,
            IdentityError::Cancelled { .. } => false,
        }
    }

    pub fn error_category(&self) -> &'static str {
        match self {
            IdentityError::NoCredential { .. } => "no_credential",
            IdentityError::Rejected { status_code, .. } if status_code.is_client_error() => {
                "client_error"
            }
            IdentityError::Rejected { status_code, .. } if status_code.is_server_error() => {
                "server_error"
            }
            IdentityError::Rejected { .. } => "rejected",
            IdentityError::Network {
                is_timeout: true, ..
            } => "timeout",
            IdentityError::Network {
                is_connection: true,
                ..
            } => "connection",
            IdentityError::Network { .. } => "network",
            IdentityError::Configuration { .. } => "configuration",
            IdentityError::Cancelled { .. } => "cancelled",
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            IdentityError::Rejected { status_code, .. } => Some(status_code.0),
            _ => None,
        }
    }
}

impl From<url::ParseError> for IdentityError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        IdentityError::Configuration {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
