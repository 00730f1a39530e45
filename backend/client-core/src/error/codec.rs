use common::ErrorLocation;

use thiserror::Error as ThisError;

/// Failures of the positional big-endian codec.
///
/// Any of these on an inbound frame means the cursor can no longer be trusted,
/// so callers treat them as fatal for the connection.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum CodecError {
    #[error("Bounds Error: needed {needed} bytes at offset {offset}, {available} available {location}")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
        location: ErrorLocation,
    },

    #[error("Overflow Error: writing {needed} bytes at offset {offset} exceeds buffer of {capacity} {location}")]
    WriteOverflow {
        offset: usize,
        needed: usize,
        capacity: usize,
        location: ErrorLocation,
    },

    #[error("Size Mismatch Error: declared {declared} bytes, wrote {written} {location}")]
    SizeMismatch {
        declared: usize,
        written: usize,
        location: ErrorLocation,
    },

    #[error("String Length Error: {length} code units do not fit a {prefix_bits}-bit prefix {location}")]
    StringTooLong {
        length: usize,
        prefix_bits: u8,
        location: ErrorLocation,
    },

    #[error("Negative Length Error: {length} {location}")]
    NegativeLength {
        length: i32,
        location: ErrorLocation,
    },
}

impl CodecError {
    #[track_caller]
    pub fn out_of_bounds(offset: usize, needed: usize, available: usize) -> Self {
        CodecError::OutOfBounds {
            offset,
            needed,
            available,
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn write_overflow(offset: usize, needed: usize, capacity: usize) -> Self {
        CodecError::WriteOverflow {
            offset,
            needed,
            capacity,
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn size_mismatch(declared: usize, written: usize) -> Self {
        CodecError::SizeMismatch {
            declared,
            written,
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn string_too_long(length: usize, prefix_bits: u8) -> Self {
        CodecError::StringTooLong {
            length,
            prefix_bits,
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn negative_length(length: i32) -> Self {
        CodecError::NegativeLength {
            length,
            location: ErrorLocation::caller(),
        }
    }
}
