use crate::error::codec::CodecError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Fatal decode faults on an inbound frame.
#[derive(Debug, Clone, ThisError)]
pub enum ProtocolError {
    #[error("Empty Frame Error: frame carried no packet id {location}")]
    EmptyFrame { location: ErrorLocation },

    #[error("Unknown Packet Error: no server packet registered for id {packet_id} {location}")]
    UnknownPacket {
        packet_id: u8,
        location: ErrorLocation,
    },

    #[error("Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
        #[source]
        source: CodecError,
    },
}

impl ProtocolError {
    #[track_caller]
    pub fn empty_frame() -> Self {
        ProtocolError::EmptyFrame {
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn unknown_packet(packet_id: u8) -> Self {
        ProtocolError::UnknownPacket {
            packet_id,
            location: ErrorLocation::caller(),
        }
    }
}

impl From<CodecError> for ProtocolError {
    #[track_caller]
    fn from(error: CodecError) -> Self {
        ProtocolError::Decode {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: error,
        }
    }
}
