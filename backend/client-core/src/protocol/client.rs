use crate::codec::{ByteWriter, prefixed_string_size, sizes};
use crate::error::codec::CodecError;
use crate::protocol::action::ActionValue;
use crate::protocol::flags::HelloFlags;

/// Packets the client sends. The first byte of every frame is the packet id.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientPacket {
    /// Profile id is only written when GUEST is not set.
    Hello {
        flags: HelloFlags,
        profile_id: Option<String>,
    },
    IdentityComplete,
    Ping {
        echo: u64,
    },
    /// `None` asks for the default page.
    ChangePage {
        page_id: Option<String>,
    },
    PageAction {
        component_id: u32,
        action_id: u16,
        payload: ActionValue,
    },
}

impl ClientPacket {
    pub const HELLO: u8 = 0;
    pub const IDENTITY_COMPLETE: u8 = 1;
    pub const PING: u8 = 2;
    pub const CHANGE_PAGE: u8 = 3;
    pub const PAGE_ACTION: u8 = 4;

    pub fn packet_id(&self) -> u8 {
        match self {
            ClientPacket::Hello { .. } => Self::HELLO,
            ClientPacket::IdentityComplete => Self::IDENTITY_COMPLETE,
            ClientPacket::Ping { .. } => Self::PING,
            ClientPacket::ChangePage { .. } => Self::CHANGE_PAGE,
            ClientPacket::PageAction { .. } => Self::PAGE_ACTION,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientPacket::Hello { .. } => "Hello",
            ClientPacket::IdentityComplete => "IdentityComplete",
            ClientPacket::Ping { .. } => "Ping",
            ClientPacket::ChangePage { .. } => "ChangePage",
            ClientPacket::PageAction { .. } => "PageAction",
        }
    }

    /// Payload size in bytes, excluding the id byte.
    pub fn data_size(&self) -> usize {
        match self {
            ClientPacket::Hello { flags, profile_id } => {
                if flags.contains(HelloFlags::GUEST) {
                    sizes::U8
                } else {
                    sizes::U8 + prefixed_string_size(sizes::U8, profile_id.as_deref())
                }
            }
            ClientPacket::IdentityComplete => 0,
            ClientPacket::Ping { .. } => sizes::U64,
            ClientPacket::ChangePage { page_id } => {
                prefixed_string_size(sizes::U16, page_id.as_deref())
            }
            ClientPacket::PageAction { payload, .. } => {
                sizes::U32 + sizes::U16 + sizes::U32 + payload.client_size()
            }
        }
    }

    /// Serialize into a frame of exactly `1 + data_size()` bytes.
    pub fn compress(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = ByteWriter::with_size(sizes::U8 + self.data_size());
        writer.write_u8(self.packet_id())?;
        match self {
            ClientPacket::Hello { flags, profile_id } => {
                writer.write_u8(flags.bits())?;
                if !flags.contains(HelloFlags::GUEST) {
                    writer.write_string_u8(profile_id.as_deref())?;
                }
            }
            ClientPacket::IdentityComplete => {}
            ClientPacket::Ping { echo } => writer.write_u64(*echo)?,
            ClientPacket::ChangePage { page_id } => writer.write_string_u16(page_id.as_deref())?,
            ClientPacket::PageAction {
                component_id,
                action_id,
                payload,
            } => {
                let payload_len = u32::try_from(payload.client_size())
                    .map_err(|_| CodecError::string_too_long(payload.client_size(), 32))?;
                writer.write_u32(*component_id)?;
                writer.write_u16(*action_id)?;
                writer.write_u32(payload_len)?;
                payload.write_client(&mut writer)?;
            }
        }
        writer.finish()
    }
}
