//! Fuzz-style property tests for the container codec
//!
//! Decoders face untrusted client bytes and must never panic.

use mdcontainer_core::ItemStack;
use mdcontainer_net::{
    decode_client_message, decode_server_message, encode_client_message, encode_server_message,
    ClickEvent, ClientMessage, CreativeClickEvent, ServerMessage, ALIAS_CONTAINER_ID,
};
use proptest::prelude::*;

fn item_strategy() -> impl Strategy<Value = Option<ItemStack>> {
    prop::option::of((any::<u16>(), 1u32..=64).prop_map(|(id, count)| ItemStack::new(id, count)))
}

proptest! {
    /// Property: Arbitrary bytes don't crash client decoder
    #[test]
    fn arbitrary_bytes_dont_crash_client(
        random_bytes in prop::collection::vec(any::<u8>(), 0..2000),
    ) {
        let _result = decode_client_message(&random_bytes);
    }

    /// Property: Arbitrary bytes don't crash server decoder
    #[test]
    fn arbitrary_bytes_dont_crash_server(
        random_bytes in prop::collection::vec(any::<u8>(), 0..2000),
    ) {
        let _result = decode_server_message(&random_bytes);
    }

    /// Property: Clicks survive framing unchanged
    #[test]
    fn click_roundtrips(
        container_id in any::<i8>(),
        slot_index in any::<i16>(),
        mode in 0u8..=6,
        button in any::<u8>(),
    ) {
        let msg = ClientMessage::Click(ClickEvent { container_id, slot_index, mode, button });
        let decoded = decode_client_message(&encode_client_message(&msg).unwrap()).unwrap();
        prop_assert_eq!(msg, decoded);
    }

    /// Property: Creative overwrites survive framing unchanged
    #[test]
    fn creative_click_roundtrips(slot_index in any::<i16>(), item in item_strategy()) {
        let msg = ClientMessage::CreativeClick(CreativeClickEvent { slot_index, item });
        let decoded = decode_client_message(&encode_client_message(&msg).unwrap()).unwrap();
        prop_assert_eq!(msg, decoded);
    }

    /// Property: Silent slot updates keep their alias addressing
    #[test]
    fn silent_slot_update_roundtrips(slot_index in 0i16..36, item in item_strategy()) {
        let msg = ServerMessage::SlotUpdate {
            container_id: ALIAS_CONTAINER_ID,
            slot_index,
            item,
        };
        let decoded = decode_server_message(&encode_server_message(&msg).unwrap()).unwrap();
        prop_assert_eq!(msg, decoded);
    }

    /// Property: Truncated frames are rejected, never panic
    #[test]
    fn truncated_frames_are_rejected(cut in 0usize..9) {
        let msg = ClientMessage::Click(ClickEvent { container_id: 1, slot_index: 5, mode: 0, button: 1 });
        let encoded = encode_client_message(&msg).unwrap();
        let cut = cut.min(encoded.len() - 1);
        prop_assert!(decode_client_message(&encoded[..cut]).is_err());
    }
}
