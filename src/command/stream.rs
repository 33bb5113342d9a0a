//! Codec 12 framing over a byte stream.
//!
//! [`CommandStreamCodec`] plugs into `tokio_util::codec::Framed` so a server
//! can write commands and read replies on a device connection:
//!
//! ```text
//! ┌──────────────┬───────────────┬──────────────────────┬──────────────┐
//! │ Preamble (4) │ Data size (4) │ Body (data size)     │ CRC (4)      │
//! └──────────────┴───────────────┴──────────────────────┴──────────────┘
//! ```
//!
//! The decoder waits for a whole packet, then hands it to
//! [`decode_command_response`]. Socket handling stays with the caller.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::binary::read_u32;
use crate::command::packet::{decode_command_response, encode_command_request};
use crate::types::command::{CHECKSUM_LEN, ENVELOPE_HEADER_LEN};
use crate::{CodecError, CommandResponse};

/// Default limit on the data size field: 64 KiB.
pub const DEFAULT_MAX_PACKET_SIZE: usize = 64 * 1024;

/// Configuration for [`CommandStreamCodec`].
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Largest accepted data size in bytes. Default: 64 KiB.
    pub max_packet_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { max_packet_size: DEFAULT_MAX_PACKET_SIZE }
    }
}

/// Frames codec 12 replies out of a byte stream and writes requests into it.
#[derive(Debug, Clone, Default)]
pub struct CommandStreamCodec {
    config: StreamConfig,
}

impl CommandStreamCodec {
    pub fn new(config: StreamConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl Decoder for CommandStreamCodec {
    type Item = CommandResponse;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < ENVELOPE_HEADER_LEN {
            return Ok(None);
        }

        let data_size = read_u32(src, 4)?.value as usize;
        if data_size > self.config.max_packet_size {
            return Err(CodecError::PacketTooLarge { size: data_size, max: self.config.max_packet_size });
        }

        let total = ENVELOPE_HEADER_LEN + data_size + CHECKSUM_LEN;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        let packet = src.split_to(total);
        trace!("Framed codec 12 packet of {} bytes, {} left buffered", total, src.remaining());
        decode_command_response(&packet).map(Some)
    }
}

impl Encoder<&str> for CommandStreamCodec {
    type Error = CodecError;

    fn encode(&mut self, command: &str, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let packet = encode_command_request(command)?;
        dst.extend_from_slice(&packet);
        Ok(())
    }
}
