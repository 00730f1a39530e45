//! Persistent list of known servers, stored as `servers.toml`.

use crate::error::server_list::ServerListError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const SERVER_LIST_FILE_NAME: &str = "servers.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_name: Option<String>,
}

impl ServerRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            last_known_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.last_known_name = Some(name.into());
        self
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ServerListFile {
    #[serde(default, rename = "server")]
    servers: Vec<ServerRecord>,
}

#[derive(Debug, Clone)]
pub struct ServerListStore {
    path: PathBuf,
}

impl ServerListStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(SERVER_LIST_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty list; a corrupt one is an error.
    pub fn load(&self) -> Result<Vec<ServerRecord>, ServerListError> {
        if !self.path.exists() {
            debug!(
                "Server list not found at {}, starting empty",
                self.path.display()
            );
            return Ok(Vec::new());
        }

        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| ServerListError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: self.path.clone(),
                source: e,
            })?;

        let file: ServerListFile =
            toml::from_str(&contents).map_err(|e| ServerListError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        info!(
            "Loaded {} servers from {}",
            file.servers.len(),
            self.path.display()
        );
        Ok(file.servers)
    }

    /// Write through a temp file and rename.
    pub fn save(&self, servers: &[ServerRecord]) -> Result<(), ServerListError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| ServerListError::WriteError {
                location: ErrorLocation::from(Location::caller()),
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let file = ServerListFile {
            servers: servers.to_vec(),
        };
        let contents = toml::to_string(&file).map_err(|e| ServerListError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        let temp_path = self.path.with_extension("toml.tmp");
        std::fs::write(&temp_path, contents).map_err(|e| ServerListError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| ServerListError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: self.path.clone(),
            source: e,
        })?;

        debug!("Saved {} servers to {}", servers.len(), self.path.display());
        Ok(())
    }
}
