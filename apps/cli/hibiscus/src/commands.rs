//! The `probe` and `connect` subcommands.

use crate::error::HibiscusError;
use crate::input::parse_line;

use hibiscus_core::config::AppConfig;
use hibiscus_core::connection::{Connection, ConnectionState, LocalCommand, WsConnector};
use hibiscus_core::identity::{Credential, HttpIdentityProvider, IdentityProvider};
use hibiscus_core::probe::{ProbePool, ProbeState, ServerEntry};
use hibiscus_core::protocol::HelloFlags;
use hibiscus_core::server_list::{ServerListStore, ServerRecord};
use hibiscus_core::sync::UiEvent;

use common::ErrorLocation;

use std::io::{BufRead, stdin};
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

fn identity_provider(config: &AppConfig) -> Result<Arc<dyn IdentityProvider>, HibiscusError> {
    let provider = HttpIdentityProvider::from_config(&config.identity, Credential::from_env())?;
    Ok(Arc::new(provider))
}

/// One line of `probe` output.
pub fn format_entry(entry: &ServerEntry) -> String {
    let ping = entry
        .last_measured_ping
        .map(|ping| format!("{ping}ms"))
        .unwrap_or_else(|| "-".to_string());
    let detail = match (&entry.last_known_name, &entry.last_failure) {
        (_, Some(failure)) => failure.to_string(),
        (Some(name), None) => name.clone(),
        (None, None) => String::new(),
    };
    format!(
        "{state:<12} {ping:>7}  {address}  {detail}",
        state = entry.state.to_string(),
        address = entry.address,
    )
}

/// Keeps `servers.toml` current while a probe run is still in flight.
pub(crate) struct ServerListRecorder {
    store: ServerListStore,
    records: Vec<ServerRecord>,
}

impl ServerListRecorder {
    pub(crate) fn new(store: ServerListStore, records: Vec<ServerRecord>) -> Self {
        Self { store, records }
    }

    /// Save the list when `entry` just became connectable. Returns whether it saved.
    pub(crate) fn record(&mut self, entry: &ServerEntry) -> Result<bool, HibiscusError> {
        if entry.state != ProbeState::Connectable {
            return Ok(false);
        }
        let updated = entry.to_record();
        match self
            .records
            .iter_mut()
            .find(|record| record.address == updated.address)
        {
            Some(record) => *record = updated,
            None => self.records.push(updated),
        }
        self.store.save(&self.records)?;
        Ok(true)
    }
}

/// Probe every stored server plus `addresses`, print the results and re-save the list.
pub async fn probe(
    config: &AppConfig,
    config_dir: &Path,
    addresses: Vec<String>,
) -> Result<(), HibiscusError> {
    let store = ServerListStore::new(config_dir);
    let mut pool = ProbePool::new(WsConnector, identity_provider(config)?, config.probe.pool_size)
        .with_timeout(Duration::from_secs(config.probe.timeout_secs))
        .with_device(HelloFlags::device(config.client.mobile));
    pool.seed(store.load()?);
    for address in addresses {
        if !pool.add_server(address.as_str()) {
            debug!("{} is already in the server list", address);
        }
    }

    let queued = pool.refresh_all();
    if queued == 0 {
        warn!("No servers to probe in {}", store.path().display());
        return Ok(());
    }
    info!("Probing {} servers, {} at a time", queued, pool.capacity());
    let mut recorder = ServerListRecorder::new(store.clone(), pool.records());
    pool.run(|entry| {
        println!("{}", format_entry(entry));
        if let Err(e) = recorder.record(entry) {
            warn!("Failed to save server list after {}: {}", entry.address, e);
        }
    })
    .await;

    store.save(&pool.records())?;
    Ok(())
}

/// Log in to `address` (or the configured default) and mirror the session until it ends.
pub async fn connect(
    config: &AppConfig,
    address: Option<String>,
) -> Result<ConnectionState, HibiscusError> {
    let address = address
        .or_else(|| config.server.default_address.clone())
        .ok_or_else(|| HibiscusError::NoServer {
            message: "no address given and server.default_address is unset".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let mut connection = Connection::new(WsConnector, identity_provider(config)?)
        .with_device(HelloFlags::device(config.client.mobile));

    let (sink, mut events) = unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event);
        }
    });

    let (commands, mut command_rx) = unbounded_channel();
    spawn_stdin_reader(commands);

    info!("Connecting to {}", address);
    let state = connection
        .login(&address, sink, Some(&mut command_rx))
        .await?;
    if printer.await.is_err() {
        warn!("Event printer stopped early");
    }
    info!("Session with {} ended in state {}", address, state);
    Ok(state)
}

fn log_event(event: &UiEvent) {
    match event {
        UiEvent::SessionEnded(end) => info!("Session ended: {:?}", end),
        UiEvent::Kicked { reason } => warn!("Kicked: {}", reason.as_deref().unwrap_or("no reason")),
        UiEvent::UnknownPage { page_id } => warn!("Unknown page {:?}", page_id),
        other => info!("{:?}", other),
    }
}

/// Blocking stdin lives on its own thread so it never holds up runtime shutdown.
fn spawn_stdin_reader(commands: UnboundedSender<LocalCommand>) {
    thread::spawn(move || {
        for line in stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            };
            match parse_line(&line) {
                Ok(Some(command)) => {
                    let quit = command == LocalCommand::Disconnect;
                    if commands.send(command).is_err() || quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{}", e),
            }
        }
    });
}
