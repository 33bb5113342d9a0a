//! Codec 12 command exchange.
//!
//! Servers send textual commands to a device and the device answers with a
//! textual reply. Both directions share one packet shape, told apart by the
//! type byte, and are protected by a CRC-16/IBM over everything between the
//! size field and the checksum.

mod packet;
pub mod stream;

pub use packet::{
    MIN_RESPONSE_LEN, decode_command_request, decode_command_response, encode_command_request, encode_command_response,
};
pub use stream::{CommandStreamCodec, DEFAULT_MAX_PACKET_SIZE, StreamConfig};
