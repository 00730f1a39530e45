//! Client core for Hibiscus server-driven UIs.
//!
//! A server pushes a catalog of pages built from typed components; this crate
//! speaks its binary protocol, runs the connection handshake, mirrors the
//! page catalog for a rendering surface and probes known servers.
//!
//! Layering, leaf first: [`codec`], [`protocol`], [`connection`],
//! [`sync`] and [`session`], [`probe`].

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod identity;
pub mod probe;
pub mod protocol;
pub mod server_list;
pub mod session;
pub mod sync;

#[cfg(test)]
mod tests;

pub const DEFAULT_SERVER_HOSTNAME: &str = "localhost";
pub const DEFAULT_SERVER_ADDRESS: &str =
    const_format::concatcp!("ws://", DEFAULT_SERVER_HOSTNAME, "/websocket");
pub const IDENTITY_CORE_HOSTNAME: &str = "hibiscus-player.ddns.net";
pub const IDENTITY_CORE_URL: &str = const_format::concatcp!("http://", IDENTITY_CORE_HOSTNAME);
