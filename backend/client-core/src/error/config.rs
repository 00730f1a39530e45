//! Errors loading, saving and validating `config.json`.

use common::ErrorLocation;

use std::io;
use std::panic::Location;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config Read Error: cannot read {path}: {source} {location}")]
    ReadError {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but is not valid client config JSON.
    #[error("Config Parse Error: {path} is not valid config JSON: {reason} {location}")]
    ParseError {
        location: ErrorLocation,
        path: PathBuf,
        reason: String,
    },

    #[error("Config Write Error: cannot write {path}: {source} {location}")]
    WriteError {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config Serialization Error: {reason} {location}")]
    SerializeError {
        location: ErrorLocation,
        reason: String,
    },

    /// Written by a newer client, or hand-edited to an unknown version.
    #[error("Config Version Error: version {found} is not supported (expected 1-{supported}) {location}")]
    UnsupportedVersion {
        location: ErrorLocation,
        found: u32,
        supported: u32,
    },

    /// `field` is the dotted JSON path, e.g. `probe.pool_size`.
    #[error("Config Validation Error: {field}: {reason} {location}")]
    ValidationError {
        location: ErrorLocation,
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    #[track_caller]
    pub fn read(path: &Path, source: io::Error) -> Self {
        ConfigError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            source,
        }
    }

    #[track_caller]
    pub fn parse(path: &Path, reason: impl Into<String>) -> Self {
        ConfigError::ParseError {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    #[track_caller]
    pub fn write(path: &Path, source: io::Error) -> Self {
        ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            source,
        }
    }

    #[track_caller]
    pub fn serialize(reason: impl Into<String>) -> Self {
        ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: reason.into(),
        }
    }

    #[track_caller]
    pub fn unsupported_version(found: u32, supported: u32) -> Self {
        ConfigError::UnsupportedVersion {
            location: ErrorLocation::from(Location::caller()),
            found,
            supported,
        }
    }

    #[track_caller]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            field,
            reason: reason.into(),
        }
    }
}
