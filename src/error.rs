//! Error types for frame and command decoding.
//!
//! Every failure aborts the current decode or encode call and is returned as a
//! [`CodecError`]. Nothing in this crate retries, logs at error level, or
//! terminates the process on malformed input; the caller decides whether to drop
//! the frame, ask the device to retransmit, or close the connection.
//!
//! ## Error Categories
//!
//! - **Framing Errors**: the buffer is not this protocol at all
//! - **Integrity Errors**: checksums, counters and trailers disagree with the content
//! - **Range Errors**: a decoded field is outside the range the device can report
//! - **Bounds Errors**: a declared length points past the end of the buffer
//! - **Catalogue Errors**: human-readable conversion of decoded elements failed
//!
//! ## Recovery
//!
//! ```rust
//! use avlcodec::{CodecError, decode_telemetry};
//!
//! let err = decode_telemetry(&[0u8; 12]).unwrap_err();
//! assert!(matches!(err, CodecError::FrameTooShort { .. }));
//! if !err.is_retryable() {
//!     for suggestion in err.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T, E = CodecError> = std::result::Result<T, E>;

/// Which checksum rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    /// Luhn check digit of a 15 digit identity number.
    Identity,
    /// CRC-16/IBM trailer of a command request or response packet.
    Crc16,
}

impl std::fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumKind::Identity => f.write_str("identity Luhn"),
            ChecksumKind::Crc16 => f.write_str("CRC-16/IBM"),
        }
    }
}

/// Coordinate axis reported by [`CodecError::CoordinateOutOfRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

/// Main error type for codec operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CodecError {
    #[error("Frame too short: {len} bytes, minimum is {min}")]
    FrameTooShort { len: usize, min: usize },

    #[error("Not a tracker telemetry frame: marker {found:02x?}, expected [ca, fe]")]
    NotThisProtocol { found: [u8; 2] },

    #[error("Invalid identity length {length}, expected 15 or 16")]
    InvalidIdentityLength { length: u8 },

    #[error("Non-digit byte {byte:#04x} in identity at offset {offset}")]
    InvalidIdentityDigit { offset: usize, byte: u8 },

    #[error("{kind} checksum mismatch: expected {expected:#x}, calculated {calculated:#x}")]
    ChecksumInvalid { kind: ChecksumKind, expected: u32, calculated: u32 },

    #[error("Identity length mismatch: declared {declared} digits, number has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Unknown codec id {codec_id:#04x}, expected 0x08 or 0x8e")]
    UnknownCodec { codec_id: u8 },

    #[error("Priority {priority} out of range, expected at most 2")]
    PriorityOutOfRange { priority: u8 },

    #[error("{axis} {value} out of range")]
    CoordinateOutOfRange { axis: Axis, value: i32 },

    #[error("Altitude {altitude} m out of range (-5000, 12000)")]
    AltitudeOutOfRange { altitude: i16 },

    #[error("Heading {heading} out of range, expected at most 360")]
    HeadingOutOfRange { heading: u16 },

    #[error("IO element count mismatch: declared {declared}, buckets hold {actual}")]
    ElementCountMismatch { declared: usize, actual: usize },

    #[error("Read of [{start}, {end}) out of bounds for {len} byte buffer")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("Record count mismatch: declared {declared}, decoded {actual}")]
    RecordCountMismatch { declared: usize, actual: usize },

    #[error("Trailer record count {found} does not match header count {expected}")]
    TrailerMismatch { expected: u8, found: u8 },

    #[error("Wrong preamble: {preamble:#010x}")]
    InvalidPreamble { preamble: u32 },

    #[error("Wrong codec id: {codec_id:#04x}")]
    InvalidCodec { codec_id: u8 },

    #[error("Wrong packet type: {packet_type:#04x}")]
    InvalidType { packet_type: u8 },

    #[error("Only {len} bytes received, not a command response packet")]
    NotAResponsePacket { len: usize },

    #[error("Command text of {len} bytes does not fit a 32-bit size field")]
    CommandTooLarge { len: usize },

    #[error("Packet of {size} bytes exceeds limit of {max}")]
    PacketTooLarge { size: usize, max: usize },

    #[error("Element {id} carries no value")]
    EmptyElement { id: u16 },

    #[error("Element {id} not catalogued for device family {family}")]
    UnknownElement { family: String, id: u16 },

    #[error("Element {id} ({name}): {details}")]
    ConversionMismatch { id: u16, name: String, details: String },

    #[error("Property table error: {details}")]
    PropertyTable { details: String },

    #[error("Stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Returns whether a retransmission of the same data could plausibly succeed.
    ///
    /// Integrity and bounds failures usually mean the bytes were damaged or cut
    /// short in transit. Protocol mismatches and range violations will be
    /// reproduced exactly by a retransmission.
    pub fn is_retryable(&self) -> bool {
        match self {
            CodecError::ChecksumInvalid { .. } => true,
            CodecError::ElementCountMismatch { .. } => true,
            CodecError::OutOfBounds { .. } => true,
            CodecError::RecordCountMismatch { .. } => true,
            CodecError::TrailerMismatch { .. } => true,
            CodecError::Io(_) => true,
            CodecError::FrameTooShort { .. } => false,
            CodecError::NotThisProtocol { .. } => false,
            CodecError::InvalidIdentityLength { .. } => false,
            CodecError::InvalidIdentityDigit { .. } => false,
            CodecError::LengthMismatch { .. } => false,
            CodecError::UnknownCodec { .. } => false,
            CodecError::PriorityOutOfRange { .. } => false,
            CodecError::CoordinateOutOfRange { .. } => false,
            CodecError::AltitudeOutOfRange { .. } => false,
            CodecError::HeadingOutOfRange { .. } => false,
            CodecError::InvalidPreamble { .. } => false,
            CodecError::InvalidCodec { .. } => false,
            CodecError::InvalidType { .. } => false,
            CodecError::NotAResponsePacket { .. } => false,
            CodecError::CommandTooLarge { .. } => false,
            CodecError::PacketTooLarge { .. } => false,
            CodecError::EmptyElement { .. } => false,
            CodecError::UnknownElement { .. } => false,
            CodecError::ConversionMismatch { .. } => false,
            CodecError::PropertyTable { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            CodecError::FrameTooShort { .. }
            | CodecError::NotThisProtocol { .. }
            | CodecError::UnknownCodec { .. }
            | CodecError::NotAResponsePacket { .. } => vec![
                "Check the device is configured for codec 8 / 8 extended over UDP",
                "Verify the listener port is not shared with another protocol",
                "Drop the datagram",
            ],
            CodecError::InvalidIdentityLength { .. }
            | CodecError::InvalidIdentityDigit { .. }
            | CodecError::LengthMismatch { .. } => vec![
                "Check the identity field encoding in the device firmware",
                "Drop the frame without acknowledging it",
            ],
            CodecError::ChecksumInvalid { .. }
            | CodecError::ElementCountMismatch { .. }
            | CodecError::OutOfBounds { .. }
            | CodecError::RecordCountMismatch { .. }
            | CodecError::TrailerMismatch { .. } => vec![
                "Do not acknowledge the frame so the device retransmits it",
                "Check for truncation by the transport (MTU, read buffer size)",
            ],
            CodecError::PriorityOutOfRange { .. }
            | CodecError::CoordinateOutOfRange { .. }
            | CodecError::AltitudeOutOfRange { .. }
            | CodecError::HeadingOutOfRange { .. } => vec![
                "Inspect the raw frame, the device reported values it cannot produce",
                "Drop the frame",
            ],
            CodecError::InvalidPreamble { .. }
            | CodecError::InvalidCodec { .. }
            | CodecError::InvalidType { .. } => vec![
                "Check the peer speaks codec 12",
                "Verify the reply is not a telemetry frame sent on the same connection",
            ],
            CodecError::CommandTooLarge { .. } | CodecError::PacketTooLarge { .. } => vec![
                "Split the command into smaller commands",
                "Raise StreamConfig::max_packet_size if the peer is trusted",
            ],
            CodecError::EmptyElement { .. }
            | CodecError::UnknownElement { .. }
            | CodecError::ConversionMismatch { .. } => vec![
                "Check the device family used for the lookup",
                "Extend the property table with the missing element",
            ],
            CodecError::PropertyTable { .. } => vec![
                "Check the property table YAML syntax",
                "Verify every entry declares name, bytes and conversion",
            ],
            CodecError::Io(_) => vec!["Reconnect to the device"],
        }
    }

    /// Helper constructor for bounds failures.
    pub fn out_of_bounds(start: usize, end: usize, len: usize) -> Self {
        CodecError::OutOfBounds { start, end, len }
    }

    /// Helper constructor for CRC failures on command packets.
    pub fn crc_mismatch(expected: u32, calculated: u16) -> Self {
        CodecError::ChecksumInvalid {
            kind: ChecksumKind::Crc16,
            expected,
            calculated: u32::from(calculated),
        }
    }

    /// Helper constructor for human-readable conversion failures.
    pub fn conversion_mismatch(id: u16, name: impl Into<String>, details: impl Into<String>) -> Self {
        CodecError::ConversionMismatch { id, name: name.into(), details: details.into() }
    }
}
