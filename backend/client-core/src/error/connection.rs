use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ConnectionError {
    #[error("Connect Error: {address}: {message} {location}")]
    Connect {
        address: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Address Error: {address}: {message} {location}")]
    InvalidAddress {
        address: String,
        message: String,
        location: ErrorLocation,
    },
}

impl ConnectionError {
    #[track_caller]
    pub fn connect(address: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectionError::Connect {
            address: address.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn send(message: impl Into<String>) -> Self {
        ConnectionError::Send {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_address(address: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectionError::InvalidAddress {
            address: address.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
