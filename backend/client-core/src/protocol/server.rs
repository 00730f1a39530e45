use crate::codec::ByteReader;
use crate::error::codec::CodecError;
use crate::error::protocol::ProtocolError;

use log::trace;

/// Bytes of a field whose decoding waits until its type is known.
///
/// Owns its slice so it can outlive the frame it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeferredBlock {
    bytes: Vec<u8>,
}

impl DeferredBlock {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn declared_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn reader(&self) -> ByteReader<'_> {
        ByteReader::new(&self.bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: String,
    pub group_id: Option<String>,
    pub name: String,
    pub icon: String,
}

/// Catalog delta. Sections are applied in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageListChange {
    pub groups_added: Vec<GroupRecord>,
    pub groups_removed: Vec<String>,
    pub groups_updated: Vec<GroupRecord>,
    pub pages_added: Vec<PageRecord>,
    pub pages_removed: Vec<String>,
    pub pages_updated: Vec<PageRecord>,
}

impl PageListChange {
    pub const GROUPS_ADDED: u8 = 1;
    pub const GROUPS_REMOVED: u8 = 1 << 1;
    pub const GROUPS_UPDATED: u8 = 1 << 2;
    pub const PAGES_ADDED: u8 = 1 << 3;
    pub const PAGES_REMOVED: u8 = 1 << 4;
    pub const PAGES_UPDATED: u8 = 1 << 5;

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let mask = reader.read_u8()?;
        let mut change = PageListChange::default();
        if mask & Self::GROUPS_ADDED != 0 {
            change.groups_added = read_records(reader, read_group)?;
        }
        if mask & Self::GROUPS_REMOVED != 0 {
            change.groups_removed = read_records(reader, read_id)?;
        }
        if mask & Self::GROUPS_UPDATED != 0 {
            change.groups_updated = read_records(reader, read_group)?;
        }
        if mask & Self::PAGES_ADDED != 0 {
            change.pages_added = read_records(reader, read_page)?;
        }
        if mask & Self::PAGES_REMOVED != 0 {
            change.pages_removed = read_records(reader, read_id)?;
        }
        if mask & Self::PAGES_UPDATED != 0 {
            change.pages_updated = read_records(reader, read_page)?;
        }
        Ok(change)
    }
}

fn read_records<'a, T>(
    reader: &mut ByteReader<'a>,
    mut read: impl FnMut(&mut ByteReader<'a>) -> Result<T, CodecError>,
) -> Result<Vec<T>, CodecError> {
    let count = reader.read_u32()?;
    // Each record is at least a few bytes, so the remaining length caps the allocation.
    let mut records = Vec::with_capacity((count as usize).min(reader.remaining()));
    for _ in 0..count {
        records.push(read(reader)?);
    }
    Ok(records)
}

fn read_id(reader: &mut ByteReader<'_>) -> Result<String, CodecError> {
    Ok(reader.read_string_u32()?.unwrap_or_default())
}

fn read_group(reader: &mut ByteReader<'_>) -> Result<GroupRecord, CodecError> {
    Ok(GroupRecord {
        id: read_id(reader)?,
        name: read_id(reader)?,
    })
}

fn read_page(reader: &mut ByteReader<'_>) -> Result<PageRecord, CodecError> {
    Ok(PageRecord {
        id: read_id(reader)?,
        group_id: reader.read_string_u32()?,
        name: read_id(reader)?,
        icon: read_id(reader)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedComponent {
    pub component_id: u32,
    pub type_name: Option<String>,
    pub properties: DeferredBlock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedProperty {
    pub component_id: u32,
    pub property_id: u16,
    pub value: DeferredBlock,
}

/// Component delta for the current page.
///
/// Property blocks are captured with their declared length and decoded later
/// against the component type, so an unknown type never misaligns the frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdatePage {
    pub components_added: Vec<AddedComponent>,
    pub components_removed: Vec<u32>,
    pub properties_updated: Vec<UpdatedProperty>,
}

impl UpdatePage {
    pub const COMPONENTS_ADDED: u8 = 1;
    pub const COMPONENTS_REMOVED: u8 = 1 << 1;
    pub const PROPERTIES_UPDATED: u8 = 1 << 2;

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let mask = reader.read_u8()?;
        let mut update = UpdatePage::default();
        if mask & Self::COMPONENTS_ADDED != 0 {
            update.components_added = read_records(reader, |reader| {
                let component_id = reader.read_u32()?;
                let type_name = reader.read_string_u16()?;
                let declared = reader.read_u16()?;
                let properties = DeferredBlock::new(reader.take(usize::from(declared))?);
                Ok(AddedComponent {
                    component_id,
                    type_name,
                    properties,
                })
            })?;
        }
        if mask & Self::COMPONENTS_REMOVED != 0 {
            update.components_removed = read_records(reader, |reader| reader.read_u32())?;
        }
        if mask & Self::PROPERTIES_UPDATED != 0 {
            update.properties_updated = read_records(reader, |reader| {
                let component_id = reader.read_u32()?;
                let property_id = reader.read_u16()?;
                let declared = reader.read_u16()?;
                let value = DeferredBlock::new(reader.take(usize::from(declared))?);
                Ok(UpdatedProperty {
                    component_id,
                    property_id,
                    value,
                })
            })?;
        }
        Ok(update)
    }
}

/// Server-initiated component action; the payload runs to the end of the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAction {
    pub component_id: u32,
    pub action_id: u16,
    pub payload: DeferredBlock,
}

/// Packets the server sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPacket {
    Hello {
        server_name: Option<String>,
        motd: Option<String>,
    },
    IdentityRequest {
        challenge_key: Option<String>,
    },
    Kick {
        reason: Option<String>,
    },
    Pong {
        echo: u64,
    },
    Welcome {
        user_id: Option<String>,
        nickname: Option<String>,
    },
    PageListChange(PageListChange),
    ChangePage {
        page_id: Option<String>,
    },
    UpdatePage(UpdatePage),
    PageAction(ServerAction),
}

impl ServerPacket {
    pub const HELLO: u8 = 0;
    pub const IDENTITY_REQUEST: u8 = 1;
    pub const KICK: u8 = 2;
    pub const PONG: u8 = 3;
    pub const WELCOME: u8 = 4;
    pub const PAGE_LIST_CHANGE: u8 = 5;
    pub const CHANGE_PAGE: u8 = 6;
    pub const UPDATE_PAGE: u8 = 7;
    pub const PAGE_ACTION: u8 = 8;

    /// Decode one frame: the packet id byte, then that packet's payload.
    pub fn decode(frame: &[u8]) -> Result<ServerPacket, ProtocolError> {
        let mut reader = ByteReader::new(frame);
        if reader.is_empty() {
            return Err(ProtocolError::empty_frame());
        }
        let packet_id = reader.read_u8()?;
        let packet = Self::decode_payload(packet_id, &mut reader)?;
        if !reader.is_empty() {
            trace!(
                "{} frame carried {} trailing bytes",
                packet.name(),
                reader.remaining()
            );
        }
        Ok(packet)
    }

    fn decode_payload(
        packet_id: u8,
        reader: &mut ByteReader<'_>,
    ) -> Result<ServerPacket, ProtocolError> {
        let packet = match packet_id {
            Self::HELLO => ServerPacket::Hello {
                server_name: reader.read_string_u8()?,
                motd: reader.read_string_u8()?,
            },
            Self::IDENTITY_REQUEST => ServerPacket::IdentityRequest {
                challenge_key: reader.read_string_u8()?,
            },
            Self::KICK => ServerPacket::Kick {
                reason: reader.read_string_u16()?,
            },
            Self::PONG => ServerPacket::Pong {
                echo: reader.read_u64()?,
            },
            Self::WELCOME => ServerPacket::Welcome {
                user_id: reader.read_string_u8()?,
                nickname: reader.read_string_u8()?,
            },
            Self::PAGE_LIST_CHANGE => ServerPacket::PageListChange(PageListChange::decode(reader)?),
            Self::CHANGE_PAGE => ServerPacket::ChangePage {
                page_id: reader.read_string_u16()?,
            },
            Self::UPDATE_PAGE => ServerPacket::UpdatePage(UpdatePage::decode(reader)?),
            Self::PAGE_ACTION => ServerPacket::PageAction(ServerAction {
                component_id: reader.read_u32()?,
                action_id: reader.read_u16()?,
                payload: DeferredBlock::new(reader.take_rest()),
            }),
            unknown => return Err(ProtocolError::unknown_packet(unknown)),
        };
        Ok(packet)
    }

    pub fn packet_id(&self) -> u8 {
        match self {
            ServerPacket::Hello { .. } => Self::HELLO,
            ServerPacket::IdentityRequest { .. } => Self::IDENTITY_REQUEST,
            ServerPacket::Kick { .. } => Self::KICK,
            ServerPacket::Pong { .. } => Self::PONG,
            ServerPacket::Welcome { .. } => Self::WELCOME,
            ServerPacket::PageListChange(_) => Self::PAGE_LIST_CHANGE,
            ServerPacket::ChangePage { .. } => Self::CHANGE_PAGE,
            ServerPacket::UpdatePage(_) => Self::UPDATE_PAGE,
            ServerPacket::PageAction(_) => Self::PAGE_ACTION,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerPacket::Hello { .. } => "Hello",
            ServerPacket::IdentityRequest { .. } => "IdentityRequest",
            ServerPacket::Kick { .. } => "Kick",
            ServerPacket::Pong { .. } => "Pong",
            ServerPacket::Welcome { .. } => "Welcome",
            ServerPacket::PageListChange(_) => "PageListChange",
            ServerPacket::ChangePage { .. } => "ChangePage",
            ServerPacket::UpdatePage(_) => "UpdatePage",
            ServerPacket::PageAction(_) => "PageAction",
        }
    }
}
