//! Message encoding and decoding with framing.
//!
//! Provides length-prefixed encoding for container messages.

use crate::protocol::{ClientMessage, ServerMessage, PROTOCOL_MAGIC, PROTOCOL_VERSION};
use anyhow::{Context, Result};

/// Compute schema hash from protocol definitions.
///
/// Client and server refuse to talk when their hashes differ.
pub fn compute_schema_hash() -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&PROTOCOL_VERSION.to_le_bytes());
    hasher.update(PROTOCOL_MAGIC);

    // Message type names (deterministic order)
    for name in [
        "ClientMessage",
        "ServerMessage",
        "ClickEvent",
        "CreativeClickEvent",
        "PickEvent",
    ] {
        hasher.update(name.as_bytes());
    }

    let hash = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(prefix)
}

/// Encode a client message with length prefix.
///
/// Frame format: [length: u32][message_type: u8][payload: bytes]
pub fn encode_client_message(msg: &ClientMessage) -> Result<Vec<u8>> {
    let payload = postcard::to_allocvec(msg).context("Failed to serialize client message")?;
    Ok(frame(client_message_tag(msg), &payload))
}

/// Encode a server message with length prefix.
///
/// Frame format: [length: u32][message_type: u8][payload: bytes]
pub fn encode_server_message(msg: &ServerMessage) -> Result<Vec<u8>> {
    let payload = postcard::to_allocvec(msg).context("Failed to serialize server message")?;
    Ok(frame(server_message_tag(msg), &payload))
}

/// Decode a client message from frame data.
pub fn decode_client_message(data: &[u8]) -> Result<ClientMessage> {
    let payload = unframe(data)?;
    postcard::from_bytes(payload).context("Failed to deserialize client message")
}

/// Decode a server message from frame data.
pub fn decode_server_message(data: &[u8]) -> Result<ServerMessage> {
    let payload = unframe(data)?;
    postcard::from_bytes(payload).context("Failed to deserialize server message")
}

fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(4 + 1 + payload.len());
    // Length excludes the length field itself
    let length = (1 + payload.len()) as u32;
    frame.extend_from_slice(&length.to_le_bytes());
    frame.push(tag);
    frame.extend_from_slice(payload);
    frame
}

fn unframe(data: &[u8]) -> Result<&[u8]> {
    if data.len() < 5 {
        return Err(anyhow::anyhow!(
            "Frame too short: {} bytes (minimum 5)",
            data.len()
        ));
    }

    let length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if length == 0 {
        return Err(anyhow::anyhow!("Frame declares zero length"));
    }
    let end = length
        .checked_add(4)
        .ok_or_else(|| anyhow::anyhow!("Frame length overflow"))?;
    if data.len() < end {
        return Err(anyhow::anyhow!(
            "Incomplete frame: expected {} bytes, got {}",
            end,
            data.len()
        ));
    }

    // Skip message type tag (data[4])
    Ok(&data[5..end])
}

fn client_message_tag(msg: &ClientMessage) -> u8 {
    match msg {
        ClientMessage::Click(_) => 0,
        ClientMessage::CreativeClick(_) => 1,
        ClientMessage::Pick(_) => 2,
        ClientMessage::CloseWindow { .. } => 3,
    }
}

fn server_message_tag(msg: &ServerMessage) -> u8 {
    match msg {
        ServerMessage::OpenWindow { .. } => 0,
        ServerMessage::FullInventorySnapshot { .. } => 1,
        ServerMessage::SlotUpdate { .. } => 2,
        ServerMessage::CursorUpdate { .. } => 3,
        ServerMessage::PropertyUpdate { .. } => 4,
        ServerMessage::CloseWindow { .. } => 5,
    }
}
