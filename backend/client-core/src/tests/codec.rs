// Unit tests for the big-endian frame reader and writer

use crate::codec::{ByteReader, ByteWriter, prefixed_string_size, sizes, utf16_len};
use crate::error::codec::CodecError;

/// **VALUE**: Every fixed-width integer and float survives a write/read cycle big-endian.
///
/// **WHY THIS MATTERS**: All packet fields are built from these primitives; a byte-order
/// slip corrupts every frame on the wire.
///
/// **BUG THIS CATCHES**: Little-endian encoding or an off-by-one cursor advance.
#[test]
fn given_mixed_primitives_when_written_and_read_then_values_and_order_survive() {
    // GIVEN: A writer sized for one of each primitive
    let size = sizes::U8 + sizes::U16 + sizes::U32 + sizes::U32 + sizes::U64 + sizes::F32;
    let mut writer = ByteWriter::with_size(size);

    // WHEN: Writing then reading them back
    writer.write_u8(0xAB).unwrap();
    writer.write_u16(0x1234).unwrap();
    writer.write_u32(0xDEAD_BEEF).unwrap();
    writer.write_i32(-42).unwrap();
    writer.write_u64(1_700_000_000_123).unwrap();
    writer.write_f32(1.5).unwrap();
    let bytes = writer.finish().unwrap();
    let mut reader = ByteReader::new(&bytes);

    // THEN: Layout is big-endian and values come back unchanged
    assert_eq!(&bytes[..3], &[0xAB, 0x12, 0x34]);
    assert_eq!(reader.read_u8().unwrap(), 0xAB);
    assert_eq!(reader.read_u16().unwrap(), 0x1234);
    assert_eq!(reader.read_u32().unwrap(), 0xDEAD_BEEF);
    assert_eq!(reader.read_i32().unwrap(), -42);
    assert_eq!(reader.read_u64().unwrap(), 1_700_000_000_123);
    assert_eq!(reader.read_f32().unwrap(), 1.5);
    assert!(reader.is_empty());
}

/// **VALUE**: Zero-length strings and absent strings share the same encoding and decode to `None`.
///
/// **WHY THIS MATTERS**: The protocol has no separate null marker; a zero count is null.
///
/// **BUG THIS CATCHES**: Decoding a zero count as `Some("")`, which breaks default-page requests.
#[test]
fn given_empty_or_absent_string_when_round_tripped_then_decodes_as_none() {
    // GIVEN: An empty and an absent string behind u16 prefixes
    let mut writer = ByteWriter::with_size(sizes::U16 * 2);
    writer.write_string_u16(Some("")).unwrap();
    writer.write_string_u16(None).unwrap();
    let bytes = writer.finish().unwrap();

    // WHEN: Reading both back
    let mut reader = ByteReader::new(&bytes);
    let first = reader.read_string_u16().unwrap();
    let second = reader.read_string_u16().unwrap();

    // THEN: Both are null and encoded as bare zero prefixes
    assert_eq!(bytes, vec![0, 0, 0, 0]);
    assert_eq!(first, None);
    assert_eq!(second, None);
}

/// **VALUE**: Lengths are counted in UTF-16 code units, including surrogate pairs.
///
/// **WHY THIS MATTERS**: Page names and chat text carry emoji and accents.
///
/// **BUG THIS CATCHES**: Using byte or char counts as the length prefix.
#[test]
fn given_non_ascii_text_when_round_tripped_then_length_is_in_code_units() {
    // GIVEN: Text with an accent and a character outside the BMP
    let text = "héllo 🌺";
    assert_eq!(utf16_len(text), 8);
    let size = prefixed_string_size(sizes::U32, Some(text));
    assert_eq!(size, 4 + 16);

    // WHEN: Writing and reading it with a u32 prefix
    let mut writer = ByteWriter::with_size(size);
    writer.write_string_u32(Some(text)).unwrap();
    let bytes = writer.finish().unwrap();
    let decoded = ByteReader::new(&bytes).read_string_u32().unwrap();

    // THEN: The prefix is 8 and the text survives
    assert_eq!(&bytes[..4], &[0, 0, 0, 8]);
    assert_eq!(decoded.as_deref(), Some(text));
}

/// **VALUE**: Reading past the end fails with the offset and leaves the cursor untouched.
///
/// **WHY THIS MATTERS**: Truncated frames must be reported, never read as garbage.
///
/// **BUG THIS CATCHES**: Partial reads that advance the cursor before failing.
#[test]
fn given_short_buffer_when_reading_past_end_then_out_of_bounds_and_cursor_kept() {
    // GIVEN: Three bytes, one already consumed
    let bytes = [1u8, 2, 3];
    let mut reader = ByteReader::new(&bytes);
    reader.read_u8().unwrap();

    // WHEN: Asking for four more
    let result = reader.read_u32();

    // THEN: Bounds error naming the position; cursor unchanged
    match result {
        Err(CodecError::OutOfBounds {
            offset,
            needed,
            available,
            ..
        }) => {
            assert_eq!(offset, 1);
            assert_eq!(needed, 4);
            assert_eq!(available, 2);
        }
        other => panic!("Expected OutOfBounds, got {:?}", other),
    }
    assert_eq!(reader.offset(), 1);
    assert_eq!(reader.read_u16().unwrap(), 0x0203);
}

/// **VALUE**: A string prefix claiming more units than the frame holds is a bounds error.
///
/// **WHY THIS MATTERS**: A hostile length must not trigger a huge allocation or a panic.
///
/// **BUG THIS CATCHES**: Trusting the prefix before checking the remaining bytes.
#[test]
fn given_oversized_string_prefix_when_reading_then_out_of_bounds() {
    // GIVEN: A u32 prefix of 1000 units with only one unit behind it
    let bytes = [0u8, 0, 0x03, 0xE8, 0, b'a'];

    // WHEN: Reading the string
    let result = ByteReader::new(&bytes).read_string_u32();

    // THEN: Bounds error
    assert!(matches!(result, Err(CodecError::OutOfBounds { .. })));
}

/// **VALUE**: Negative signed lengths in server action payloads are rejected.
///
/// **WHY THIS MATTERS**: Server action strings use a signed prefix.
///
/// **BUG THIS CATCHES**: Casting -1 to a huge usize.
#[test]
fn given_negative_i32_prefix_when_reading_string_then_negative_length_error() {
    // GIVEN: An i32 prefix of -1
    let bytes = (-1i32).to_be_bytes();

    // WHEN: Reading a signed-prefix string
    let result = ByteReader::new(&bytes).read_string_i32();

    // THEN: Negative length error carrying the value
    assert!(matches!(
        result,
        Err(CodecError::NegativeLength { length: -1, .. })
    ));
}

/// **VALUE**: Unpaired surrogates decode lossily instead of failing the frame.
///
/// **WHY THIS MATTERS**: One bad character in a page name must not drop the whole catalog.
///
/// **BUG THIS CATCHES**: Strict UTF-16 decoding that turns a cosmetic fault into a disconnect.
#[test]
fn given_unpaired_surrogate_when_reading_then_replacement_character() {
    // GIVEN: 'a', a lone high surrogate, 'b'
    let bytes = [0u8, 3, 0, b'a', 0xD8, 0x00, 0, b'b'];

    // WHEN: Reading with a u8 prefix
    let decoded = ByteReader::new(&bytes).read_string_u8().unwrap();

    // THEN: The surrogate is replaced
    assert_eq!(decoded.as_deref(), Some("a\u{FFFD}b"));
}

/// **VALUE**: The writer refuses to grow past its declared size.
///
/// **WHY THIS MATTERS**: Frame sizes are computed up front; exceeding one means the size
/// calculation and the encoder disagree.
///
/// **BUG THIS CATCHES**: Silent buffer growth hiding a wrong `data_size`.
#[test]
fn given_full_writer_when_writing_more_then_write_overflow() {
    // GIVEN: A two-byte writer with one byte written
    let mut writer = ByteWriter::with_size(2);
    writer.write_u8(1).unwrap();

    // WHEN: Writing a u16
    let result = writer.write_u16(7);

    // THEN: Overflow, nothing written
    assert!(matches!(
        result,
        Err(CodecError::WriteOverflow {
            offset: 1,
            needed: 2,
            capacity: 2,
            ..
        })
    ));
    assert_eq!(writer.written(), 1);
}

/// **VALUE**: Finishing a partially filled writer reports the mismatch.
///
/// **WHY THIS MATTERS**: An underfilled frame would be sent with a wrong length.
///
/// **BUG THIS CATCHES**: Size calculations larger than what is actually encoded.
#[test]
fn given_underfilled_writer_when_finishing_then_size_mismatch() {
    // GIVEN: A four-byte writer holding one byte
    let mut writer = ByteWriter::with_size(4);
    writer.write_u8(9).unwrap();

    // WHEN: Finishing
    let result = writer.finish();

    // THEN: Declared vs written is reported
    assert!(matches!(
        result,
        Err(CodecError::SizeMismatch {
            declared: 4,
            written: 1,
            ..
        })
    ));
}

/// **VALUE**: Strings longer than their prefix can express are rejected.
///
/// **WHY THIS MATTERS**: A truncated prefix would desynchronize the server's reader.
///
/// **BUG THIS CATCHES**: Wrapping `256 as u8` to zero.
#[test]
fn given_string_longer_than_u8_prefix_when_writing_then_string_too_long() {
    // GIVEN: 256 code units
    let text = "a".repeat(256);
    let mut writer = ByteWriter::with_size(1 + 512);

    // WHEN: Writing with a u8 prefix
    let result = writer.write_string_u8(Some(&text));

    // THEN: Rejected, nothing written
    assert!(matches!(
        result,
        Err(CodecError::StringTooLong {
            length: 256,
            prefix_bits: 8,
            ..
        })
    ));
    assert_eq!(writer.written(), 0);
}
