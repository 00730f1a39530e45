//! Positional big-endian binary codec.
//!
//! Strings travel as UTF-16BE code units behind a length prefix whose width
//! depends on the field. A length of zero decodes to `None`, so absent and
//! empty strings are indistinguishable on the wire.

mod reader;
mod writer;

pub use reader::ByteReader;
pub use writer::ByteWriter;

/// Encoded widths, in bytes, of the scalar kinds.
pub mod sizes {
    pub const U8: usize = 1;
    pub const U16: usize = 2;
    pub const U32: usize = 4;
    pub const U64: usize = 8;
    pub const F32: usize = 4;
    pub const UTF16_UNIT: usize = 2;
}

/// Number of UTF-16 code units `text` encodes to.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Bytes occupied by an optional string behind a prefix of `prefix_size` bytes.
pub fn prefixed_string_size(prefix_size: usize, text: Option<&str>) -> usize {
    prefix_size + text.map_or(0, |text| utf16_len(text) * sizes::UTF16_UNIT)
}
