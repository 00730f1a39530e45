//! Hand-assembled server frames.
//!
//! Built from raw bytes so tests never depend on the decoder they exercise.
#![allow(dead_code)]

pub const HELLO: u8 = 0;
pub const IDENTITY_REQUEST: u8 = 1;
pub const KICK: u8 = 2;
pub const PONG: u8 = 3;
pub const WELCOME: u8 = 4;
pub const PAGE_LIST_CHANGE: u8 = 5;
pub const CHANGE_PAGE: u8 = 6;
pub const UPDATE_PAGE: u8 = 7;
pub const PAGE_ACTION: u8 = 8;

#[derive(Debug, Default)]
pub struct FrameBuilder {
    bytes: Vec<u8>,
}

impl FrameBuilder {
    pub fn packet(packet_id: u8) -> Self {
        Self {
            bytes: vec![packet_id],
        }
    }

    pub fn raw() -> Self {
        Self::default()
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.bytes.push(value);
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn i32(mut self, value: i32) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn f32(mut self, value: f32) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Code units only, no prefix.
    pub fn utf16(mut self, text: &str) -> Self {
        for unit in text.encode_utf16() {
            self.bytes.extend_from_slice(&unit.to_be_bytes());
        }
        self
    }

    pub fn str8(self, text: Option<&str>) -> Self {
        let text = text.unwrap_or("");
        self.u8(text.encode_utf16().count() as u8).utf16(text)
    }

    pub fn str16(self, text: Option<&str>) -> Self {
        let text = text.unwrap_or("");
        self.u16(text.encode_utf16().count() as u16).utf16(text)
    }

    pub fn str32(self, text: Option<&str>) -> Self {
        let text = text.unwrap_or("");
        self.u32(text.encode_utf16().count() as u32).utf16(text)
    }

    /// u16 byte length, then the block.
    pub fn block16(self, block: &[u8]) -> Self {
        self.u16(block.len() as u16).bytes(block)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn server_hello(name: &str, motd: &str) -> Vec<u8> {
    FrameBuilder::packet(HELLO)
        .str8(Some(name))
        .str8(Some(motd))
        .build()
}

pub fn identity_request(challenge_key: &str) -> Vec<u8> {
    FrameBuilder::packet(IDENTITY_REQUEST)
        .str8(Some(challenge_key))
        .build()
}

pub fn kick(reason: &str) -> Vec<u8> {
    FrameBuilder::packet(KICK).str16(Some(reason)).build()
}

pub fn pong(echo: u64) -> Vec<u8> {
    FrameBuilder::packet(PONG).u64(echo).build()
}

pub fn welcome(user_id: &str, nickname: &str) -> Vec<u8> {
    FrameBuilder::packet(WELCOME)
        .str8(Some(user_id))
        .str8(Some(nickname))
        .build()
}

pub fn change_page(page_id: &str) -> Vec<u8> {
    FrameBuilder::packet(CHANGE_PAGE)
        .str16(Some(page_id))
        .build()
}

/// `(id, group, name, icon)`
pub type PageSpec<'a> = (&'a str, Option<&'a str>, &'a str, &'a str);

#[derive(Debug, Default)]
pub struct PageListFrame<'a> {
    pub groups_added: Vec<(&'a str, &'a str)>,
    pub groups_removed: Vec<&'a str>,
    pub groups_updated: Vec<(&'a str, &'a str)>,
    pub pages_added: Vec<PageSpec<'a>>,
    pub pages_removed: Vec<&'a str>,
    pub pages_updated: Vec<PageSpec<'a>>,
}

impl PageListFrame<'_> {
    /// Sets a mask bit only for non-empty sections.
    pub fn build(&self) -> Vec<u8> {
        let mut mask = 0u8;
        let sections = [
            !self.groups_added.is_empty(),
            !self.groups_removed.is_empty(),
            !self.groups_updated.is_empty(),
            !self.pages_added.is_empty(),
            !self.pages_removed.is_empty(),
            !self.pages_updated.is_empty(),
        ];
        for (bit, present) in sections.iter().enumerate() {
            if *present {
                mask |= 1 << bit;
            }
        }

        let mut frame = FrameBuilder::packet(PAGE_LIST_CHANGE).u8(mask);
        if sections[0] {
            frame = frame.u32(self.groups_added.len() as u32);
            for (id, name) in &self.groups_added {
                frame = frame.str32(Some(id)).str32(Some(name));
            }
        }
        if sections[1] {
            frame = frame.u32(self.groups_removed.len() as u32);
            for id in &self.groups_removed {
                frame = frame.str32(Some(id));
            }
        }
        if sections[2] {
            frame = frame.u32(self.groups_updated.len() as u32);
            for (id, name) in &self.groups_updated {
                frame = frame.str32(Some(id)).str32(Some(name));
            }
        }
        if sections[3] {
            frame = frame.u32(self.pages_added.len() as u32);
            for page in &self.pages_added {
                frame = page_record(frame, page);
            }
        }
        if sections[4] {
            frame = frame.u32(self.pages_removed.len() as u32);
            for id in &self.pages_removed {
                frame = frame.str32(Some(id));
            }
        }
        if sections[5] {
            frame = frame.u32(self.pages_updated.len() as u32);
            for page in &self.pages_updated {
                frame = page_record(frame, page);
            }
        }
        frame.build()
    }
}

fn page_record(frame: FrameBuilder, (id, group, name, icon): &PageSpec<'_>) -> FrameBuilder {
    frame
        .str32(Some(id))
        .str32(*group)
        .str32(Some(name))
        .str32(Some(icon))
}

/// One added-component record: id, u16-prefixed type, u16-prefixed property block.
pub fn added_component(component_id: u32, type_name: &str, properties: &[u8]) -> Vec<u8> {
    FrameBuilder::raw()
        .u32(component_id)
        .str16(Some(type_name))
        .block16(properties)
        .build()
}

pub fn updated_property(component_id: u32, property_id: u16, value: &[u8]) -> Vec<u8> {
    FrameBuilder::raw()
        .u32(component_id)
        .u16(property_id)
        .block16(value)
        .build()
}

pub fn update_page(added: &[Vec<u8>], removed: &[u32], updated: &[Vec<u8>]) -> Vec<u8> {
    let mut mask = 0u8;
    if !added.is_empty() {
        mask |= 1;
    }
    if !removed.is_empty() {
        mask |= 1 << 1;
    }
    if !updated.is_empty() {
        mask |= 1 << 2;
    }
    let mut frame = FrameBuilder::packet(UPDATE_PAGE).u8(mask);
    if !added.is_empty() {
        frame = frame.u32(added.len() as u32);
        for record in added {
            frame = frame.bytes(record);
        }
    }
    if !removed.is_empty() {
        frame = frame.u32(removed.len() as u32);
        for id in removed {
            frame = frame.u32(*id);
        }
    }
    if !updated.is_empty() {
        frame = frame.u32(updated.len() as u32);
        for record in updated {
            frame = frame.bytes(record);
        }
    }
    frame.build()
}

/// Property block of a `button`: text (u32 string), color (u16 theme id).
pub fn button_properties(text: &str, theme_id: u16) -> Vec<u8> {
    FrameBuilder::raw().str32(Some(text)).u16(theme_id).build()
}

/// Echo of a client `Ping` frame (id 2, then u64).
pub fn ping_echo(frame: &[u8]) -> Option<u64> {
    if frame.len() != 9 || frame[0] != 2 {
        return None;
    }
    let mut echo = [0u8; 8];
    echo.copy_from_slice(&frame[1..9]);
    Some(u64::from_be_bytes(echo))
}
