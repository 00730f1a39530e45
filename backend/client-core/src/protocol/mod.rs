//! Packet catalog of the Hibiscus wire protocol.
//!
//! One transport message carries exactly one packet: a one-byte packet id
//! followed by the payload. Client and server packet ids are separate spaces.

pub mod action;
pub mod client;
pub mod flags;
pub mod server;

pub use action::{ActionKind, ActionValue};
pub use client::ClientPacket;
pub use flags::HelloFlags;
pub use server::{
    AddedComponent, DeferredBlock, GroupRecord, PageListChange, PageRecord, ServerAction,
    ServerPacket, UpdatePage, UpdatedProperty,
};
