#![warn(missing_docs)]
//! Container protocol messages, framing and click logs shared by client and server.

mod codec;
mod protocol;
mod replay;

pub use codec::{
    compute_schema_hash, decode_client_message, decode_server_message, encode_client_message,
    encode_server_message,
};
pub use protocol::*;
pub use replay::{ClickLogEntry, ClickLogger, ClickReplay};
