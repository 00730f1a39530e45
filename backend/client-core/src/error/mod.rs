pub mod codec;
pub mod config;
pub mod connection;
pub mod identity;
pub mod protocol;
pub mod server_list;

pub use codec::CodecError;
pub use config::ConfigError;
pub use connection::ConnectionError;
pub use identity::IdentityError;
pub use protocol::ProtocolError;
pub use server_list::ServerListError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ServerList(#[from] ServerListError),
}
