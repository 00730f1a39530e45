// Unit tests for client packet encoding and server packet decoding

use crate::error::protocol::ProtocolError;
use crate::protocol::{ActionValue, ClientPacket, HelloFlags, PageListChange, ServerPacket};
use crate::tests::frames::{self, FrameBuilder, PageListFrame};

/// **VALUE**: `data_size` matches the encoded payload for every Hello flag combination.
///
/// **WHY THIS MATTERS**: The writer is allocated from `data_size`; any disagreement fails
/// the handshake before it starts.
///
/// **BUG THIS CATCHES**: Counting the profile id for guests, or forgetting its prefix.
#[test]
fn given_every_hello_flag_combination_when_compressed_then_size_matches_data_size() {
    for bits in 0u8..16 {
        for profile_id in [None, Some("player-7")] {
            // GIVEN: A Hello with these flags
            let flags = HelloFlags::from_bits(bits);
            let packet = ClientPacket::Hello {
                flags,
                profile_id: profile_id.map(str::to_string),
            };

            // WHEN: Compressing
            let frame = packet.compress().unwrap();

            // THEN: Exact size; guests never carry the profile id
            assert_eq!(frame.len(), 1 + packet.data_size(), "flags {}", flags);
            assert_eq!(frame[0], ClientPacket::HELLO);
            assert_eq!(frame[1], bits);
            if flags.contains(HelloFlags::GUEST) {
                assert_eq!(frame.len(), 2, "flags {}", flags);
            }
        }
    }
}

/// **VALUE**: A signed-in Hello writes the profile id behind a u8 prefix.
///
/// **WHY THIS MATTERS**: The server keys identity verification on this id.
///
/// **BUG THIS CATCHES**: Wrong prefix width for the profile id.
#[test]
fn given_signed_in_hello_when_compressed_then_profile_follows_flags() {
    // GIVEN: Login from the web without GUEST
    let packet = ClientPacket::Hello {
        flags: HelloFlags::LOGIN | HelloFlags::WEB,
        profile_id: Some("u1".to_string()),
    };

    // WHEN: Compressing
    let frame = packet.compress().unwrap();

    // THEN: id, flags, prefix, units
    assert_eq!(frame, vec![0, 0b101, 2, 0, b'u', 0, b'1']);
}

/// **VALUE**: ChangePage with no id encodes as a zero u16 prefix.
///
/// **WHY THIS MATTERS**: This is how the client asks for the server's default page.
///
/// **BUG THIS CATCHES**: Encoding `None` with a different width than `Some`.
#[test]
fn given_change_page_when_compressed_then_u16_prefixed_id() {
    // GIVEN: A default request and a named request
    let default = ClientPacket::ChangePage { page_id: None };
    let named = ClientPacket::ChangePage {
        page_id: Some("p1".to_string()),
    };

    // WHEN/THEN: Both use the u16 prefix
    assert_eq!(default.compress().unwrap(), vec![3, 0, 0]);
    assert_eq!(
        named.compress().unwrap(),
        vec![3, 0, 2, 0, b'p', 0, b'1']
    );
}

/// **VALUE**: PageAction writes component id, action id, payload length, then the payload.
///
/// **WHY THIS MATTERS**: Button clicks and text input are delivered through this packet.
///
/// **BUG THIS CATCHES**: Void actions writing a stray length or string actions missing one.
#[test]
fn given_page_actions_when_compressed_then_layout_matches_payload_kind() {
    // GIVEN: A void click and a string input
    let click = ClientPacket::PageAction {
        component_id: 7,
        action_id: 0,
        payload: ActionValue::Void,
    };
    let input = ClientPacket::PageAction {
        component_id: 7,
        action_id: 1,
        payload: ActionValue::Text(Some("hi".to_string())),
    };

    // WHEN: Compressing
    let click_frame = click.compress().unwrap();
    let input_frame = input.compress().unwrap();

    // THEN: Payload length then payload; void payloads are empty
    assert_eq!(click_frame, vec![4, 0, 0, 0, 7, 0, 0, 0, 0, 0, 0]);
    assert_eq!(
        input_frame,
        vec![
            4, 0, 0, 0, 7, 0, 1, 0, 0, 0, 8, 0, 0, 0, 2, 0, b'h', 0, b'i'
        ]
    );
}

/// **VALUE**: Ping carries the echo as a big-endian u64.
///
/// **WHY THIS MATTERS**: Latency is computed from the echoed value.
///
/// **BUG THIS CATCHES**: Truncating the timestamp to 32 bits.
#[test]
fn given_ping_when_compressed_then_echo_is_u64() {
    // GIVEN: A ping with a millisecond timestamp
    let packet = ClientPacket::Ping {
        echo: 1_700_000_000_123,
    };

    // WHEN: Compressing
    let frame = packet.compress().unwrap();

    // THEN: The echo is recoverable
    assert_eq!(frames::ping_echo(&frame), Some(1_700_000_000_123));
}

/// **VALUE**: Handshake packets decode to their fields.
///
/// **WHY THIS MATTERS**: Server name and MOTD feed the server list.
///
/// **BUG THIS CATCHES**: Wrong prefix widths on Hello, Kick or Welcome.
#[test]
fn given_handshake_frames_when_decoded_then_fields_match() {
    // GIVEN/WHEN: Each handshake frame decoded
    let hello = ServerPacket::decode(&frames::server_hello("MyServer", "Hi")).unwrap();
    let kick = ServerPacket::decode(&frames::kick("full")).unwrap();
    let welcome = ServerPacket::decode(&frames::welcome("u1", "Nick")).unwrap();
    let pong = ServerPacket::decode(&frames::pong(99)).unwrap();
    let request = ServerPacket::decode(&frames::identity_request("key")).unwrap();

    // THEN: Fields come through
    assert_eq!(
        hello,
        ServerPacket::Hello {
            server_name: Some("MyServer".to_string()),
            motd: Some("Hi".to_string()),
        }
    );
    assert_eq!(
        kick,
        ServerPacket::Kick {
            reason: Some("full".to_string())
        }
    );
    assert_eq!(
        welcome,
        ServerPacket::Welcome {
            user_id: Some("u1".to_string()),
            nickname: Some("Nick".to_string()),
        }
    );
    assert_eq!(pong, ServerPacket::Pong { echo: 99 });
    assert_eq!(
        request,
        ServerPacket::IdentityRequest {
            challenge_key: Some("key".to_string())
        }
    );
}

/// **VALUE**: Unknown ids and empty frames are distinct protocol errors.
///
/// **WHY THIS MATTERS**: Both are fatal and must surface with a useful cause.
///
/// **BUG THIS CATCHES**: Panicking on an empty frame or ignoring unknown ids.
#[test]
fn given_unknown_or_empty_frame_when_decoded_then_protocol_error() {
    // GIVEN/WHEN: An unknown id and an empty frame
    let unknown = ServerPacket::decode(&[42]);
    let empty = ServerPacket::decode(&[]);

    // THEN: Each has its own error
    assert!(matches!(
        unknown,
        Err(ProtocolError::UnknownPacket { packet_id: 42, .. })
    ));
    assert!(matches!(empty, Err(ProtocolError::EmptyFrame { .. })));
}

/// **VALUE**: A truncated payload is a decode error wrapping the codec fault.
///
/// **WHY THIS MATTERS**: The connection fails cleanly instead of acting on half a packet.
///
/// **BUG THIS CATCHES**: Accepting a Pong with fewer than eight echo bytes.
#[test]
fn given_truncated_pong_when_decoded_then_decode_error() {
    // GIVEN: A Pong with four bytes of echo
    let frame = FrameBuilder::packet(frames::PONG).u32(5).build();

    // WHEN: Decoding
    let result = ServerPacket::decode(&frame);

    // THEN: Decode error
    assert!(matches!(result, Err(ProtocolError::Decode { .. })));
}

/// **VALUE**: Only flagged sections of a PageListChange are read.
///
/// **WHY THIS MATTERS**: Absent sections carry no count; reading one would consume the
/// next section's bytes.
///
/// **BUG THIS CATCHES**: Reading sections unconditionally or in the wrong bit order.
#[test]
fn given_page_list_with_groups_and_pages_when_decoded_then_sections_follow_mask() {
    // GIVEN: Groups added and pages added, nothing else
    let frame = PageListFrame {
        groups_added: vec![("g1", "Main")],
        pages_added: vec![
            ("p1", Some("g1"), "Home", "home"),
            ("p2", None, "Loose", "star"),
        ],
        ..PageListFrame::default()
    }
    .build();

    // WHEN: Decoding
    let packet = ServerPacket::decode(&frame).unwrap();

    // THEN: Two sections populated, the rest empty
    let ServerPacket::PageListChange(change) = packet else {
        panic!("Expected PageListChange, got {:?}", packet);
    };
    assert_eq!(frame[1], PageListChange::GROUPS_ADDED | PageListChange::PAGES_ADDED);
    assert_eq!(change.groups_added.len(), 1);
    assert_eq!(change.groups_added[0].name, "Main");
    assert_eq!(change.pages_added.len(), 2);
    assert_eq!(change.pages_added[0].group_id.as_deref(), Some("g1"));
    assert_eq!(change.pages_added[1].group_id, None);
    assert!(change.groups_removed.is_empty());
    assert!(change.pages_removed.is_empty());
    assert!(change.pages_updated.is_empty());
}

/// **VALUE**: UpdatePage captures property blocks by declared length, whatever their content.
///
/// **WHY THIS MATTERS**: The decoder does not know component types; an unknown type must not
/// misalign the records that follow it.
///
/// **BUG THIS CATCHES**: Trying to interpret property bytes during frame decode.
#[test]
fn given_update_page_with_opaque_blocks_when_decoded_then_later_records_align() {
    // GIVEN: An unknown component type, a removal and a property update
    let frame = frames::update_page(
        &[frames::added_component(3, "mystery", &[9, 9, 9])],
        &[7],
        &[frames::updated_property(5, 1, &[0, 6])],
    );

    // WHEN: Decoding
    let packet = ServerPacket::decode(&frame).unwrap();

    // THEN: Every section decoded at the right offset
    let ServerPacket::UpdatePage(update) = packet else {
        panic!("Expected UpdatePage, got {:?}", packet);
    };
    assert_eq!(update.components_added.len(), 1);
    assert_eq!(update.components_added[0].component_id, 3);
    assert_eq!(
        update.components_added[0].type_name.as_deref(),
        Some("mystery")
    );
    assert_eq!(update.components_added[0].properties.as_bytes(), &[9, 9, 9]);
    assert_eq!(update.components_removed, vec![7]);
    assert_eq!(update.properties_updated[0].component_id, 5);
    assert_eq!(update.properties_updated[0].property_id, 1);
    assert_eq!(update.properties_updated[0].value.as_bytes(), &[0, 6]);
}

/// **VALUE**: A property block longer than the frame is a decode error.
///
/// **WHY THIS MATTERS**: Declared lengths come from the server and cannot be trusted.
///
/// **BUG THIS CATCHES**: Slicing past the frame end.
#[test]
fn given_block_length_past_frame_end_when_decoded_then_decode_error() {
    // GIVEN: A component record declaring 50 bytes but carrying 2
    let record = FrameBuilder::raw()
        .u32(1)
        .str16(Some("button"))
        .u16(50)
        .bytes(&[0, 0])
        .build();
    let frame = frames::update_page(&[record], &[], &[]);

    // WHEN: Decoding
    let result = ServerPacket::decode(&frame);

    // THEN: Decode error
    assert!(matches!(result, Err(ProtocolError::Decode { .. })));
}

/// **VALUE**: A server PageAction keeps everything after the ids as its payload.
///
/// **WHY THIS MATTERS**: The payload is decoded later against the component's action kind.
///
/// **BUG THIS CATCHES**: Dropping or truncating the trailing payload.
#[test]
fn given_server_page_action_when_decoded_then_payload_is_rest_of_frame() {
    // GIVEN: Component 4, action 0, a signed-prefix string
    let frame = FrameBuilder::packet(frames::PAGE_ACTION)
        .u32(4)
        .u16(0)
        .i32(1)
        .utf16("x")
        .build();

    // WHEN: Decoding
    let packet = ServerPacket::decode(&frame).unwrap();

    // THEN: Payload holds the string bytes
    let ServerPacket::PageAction(action) = packet else {
        panic!("Expected PageAction, got {:?}", packet);
    };
    assert_eq!(action.component_id, 4);
    assert_eq!(action.action_id, 0);
    assert_eq!(action.payload.as_bytes(), &[0, 0, 0, 1, 0, b'x']);
}
