//! Codec 12 command request and response packets

use serde::{Deserialize, Serialize};

/// Codec id carried by every command packet.
pub const COMMAND_CODEC_ID: u8 = 0x0c;
/// Preamble of every command packet.
pub const COMMAND_PREAMBLE: u32 = 0x0000_0000;
/// Packet type byte of a command sent to the device.
pub const TYPE_REQUEST: u8 = 0x05;
/// Packet type byte of a reply sent by the device.
pub const TYPE_RESPONSE: u8 = 0x06;
/// Quantity byte written before and after the text.
pub const COMMAND_QUANTITY: u8 = 0x01;

/// Preamble (4) + data size (4).
pub const ENVELOPE_HEADER_LEN: usize = 8;
/// Codec id (1) + quantity (1) + type (1) + text size (4).
pub const BODY_HEADER_LEN: usize = 7;
/// Trailing quantity (1).
pub const BODY_TRAILER_LEN: usize = 1;
/// Checksum field (4).
pub const CHECKSUM_LEN: usize = 4;

/// Command sent to the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub preamble: u32,
    /// Bytes from the codec id through the trailing quantity.
    pub data_size: u32,
    pub codec_id: u8,
    pub quantity: u8,
    pub packet_type: u8,
    pub command: Vec<u8>,
    pub trailing_quantity: u8,
    /// CRC-16/IBM in the low 16 bits.
    pub checksum: u32,
}

impl CommandRequest {
    /// Command text, replacing invalid UTF-8.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.command).into_owned()
    }
}

/// Reply sent by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub preamble: u32,
    pub data_size: u32,
    pub codec_id: u8,
    pub quantity: u8,
    pub packet_type: u8,
    pub response: Vec<u8>,
    pub trailing_quantity: u8,
    pub checksum: u32,
}

impl CommandResponse {
    /// Response text, replacing invalid UTF-8.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.response).into_owned()
    }

    /// Response text if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.response).ok()
    }
}
