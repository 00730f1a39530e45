//! Refusals raised by redacted credential wrappers.

use crate::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RedactError {
    /// A credential reached a serializer, e.g. while saving config or the server list.
    #[error("Redacted Serialization Error: {type_name} is never written out; call expose() at the wire {location}")]
    Serialization {
        type_name: &'static str,
        location: ErrorLocation,
    },
}

impl RedactError {
    #[track_caller]
    pub fn serialization(type_name: &'static str) -> Self {
        RedactError::Serialization {
            type_name,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
