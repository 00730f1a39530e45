use hibiscus_core::error::{
    ConfigError, ConnectionError, CoreError, IdentityError, ServerListError,
};

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum HibiscusError {
    /// Error from this app
    #[error("Hibiscus Error: {message} {location}")]
    Hibiscus {
        message: String,
        location: ErrorLocation,
    },

    /// Error from hibiscus-core (config, server list, identity, connection)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// No address given and none configured
    #[error("No Server Error: {message} {location}")]
    NoServer {
        message: String,
        location: ErrorLocation,
    },

    /// Unparseable line on stdin
    #[error("Input Error: {message} {location}")]
    Input {
        message: String,
        location: ErrorLocation,
    },
}

impl HibiscusError {
    #[track_caller]
    pub fn hibiscus(message: impl Into<String>) -> Self {
        HibiscusError::Hibiscus {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn input(message: impl Into<String>) -> Self {
        HibiscusError::Input {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<CoreError> for HibiscusError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        HibiscusError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for HibiscusError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        HibiscusError::from(CoreError::from(error))
    }
}

impl From<ServerListError> for HibiscusError {
    #[track_caller]
    fn from(error: ServerListError) -> Self {
        HibiscusError::from(CoreError::from(error))
    }
}

impl From<IdentityError> for HibiscusError {
    #[track_caller]
    fn from(error: IdentityError) -> Self {
        HibiscusError::from(CoreError::from(error))
    }
}

impl From<ConnectionError> for HibiscusError {
    #[track_caller]
    fn from(error: ConnectionError) -> Self {
        HibiscusError::from(CoreError::from(error))
    }
}
