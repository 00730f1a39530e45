//! Component action payloads.
//!
//! Client-bound and server-bound string payloads differ only in the signedness
//! of their length prefix.

use crate::codec::{ByteReader, ByteWriter, sizes, utf16_len};
use crate::error::codec::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Void,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionValue {
    Void,
    Text(Option<String>),
}

impl ActionValue {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionValue::Void => ActionKind::Void,
            ActionValue::Text(_) => ActionKind::String,
        }
    }

    /// Encoded size of this value inside a client `PageAction`.
    pub fn client_size(&self) -> usize {
        match self {
            ActionValue::Void => 0,
            ActionValue::Text(text) => {
                sizes::U32 + text.as_deref().map_or(0, utf16_len) * sizes::UTF16_UNIT
            }
        }
    }

    pub fn write_client(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        match self {
            ActionValue::Void => Ok(()),
            ActionValue::Text(text) => writer.write_string_u32(text.as_deref()),
        }
    }
}

impl ActionKind {
    /// Decode a server-sent payload of this kind.
    pub fn read_server(&self, reader: &mut ByteReader<'_>) -> Result<ActionValue, CodecError> {
        match self {
            ActionKind::Void => Ok(ActionValue::Void),
            ActionKind::String => Ok(ActionValue::Text(reader.read_string_i32()?)),
        }
    }
}
